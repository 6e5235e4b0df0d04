//! Bytecode-to-Cranelift-IR compiler.
//!
//! Mirrors `ristretto_jit`'s approach: the operand stack becomes Cranelift `Block`
//! parameters, so a value merging from two predecessors (a loop header, an `if`
//! join) is modeled the way Cranelift wants it - as an SSA value flowing in through
//! a block argument - rather than as a spill slot. Locals, which are randomly
//! addressed by index rather than pushed/popped, are instead given one
//! `StackSlot` each.
//!
//! This build's compiler only ever takes on static methods whose bytecode is
//! entirely numeric arithmetic, comparisons, and branches - no calls of any
//! kind (`invokestatic`/`invokevirtual`/`invokeinterface`/`invokespecial`), no
//! field or array access, no object allocation, no exception table, and no
//! monitor instructions. Anything else bails out to `Ok(None)` and the method
//! simply keeps running in the interpreter tier forever; there is no
//! requirement that every method eventually gets compiled, and the
//! instance-dispatch (scenario 2/3), exception-handler (scenario 4), and
//! OSR (scenario 6) acceptance scenarios in the spec's testable-properties
//! list are therefore exercised by the interpreter tier only in this build,
//! never by compiled code - see DESIGN.md's component F entry for the scope
//! decision and why it stops here instead of threading a live
//! `Materializer`/`JitBackend` pair through `emit` to support cross-method
//! calls from compiled code.

use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};

use crate::error::JvmError;
use crate::keys::MethodId;
use crate::typecheck::{self, MethodTypeInfo, ValueType};
use crate::{Symbol, VirtualMachine};

/// Owns the executable-memory allocator. One instance lives for the process
/// lifetime (`crate::vm::bootstrap_registry` wires it up alongside the other
/// singletons); every compiled method is defined into it and never unloaded, since
/// nothing in this VM's design ever needs to reclaim JIT code.
pub struct JitBackend {
    module: JITModule,
    builder_ctx: FunctionBuilderContext,
}

impl JitBackend {
    pub fn new() -> Result<Self, JvmError> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("opt_level", "speed")
            .map_err(|e| JvmError::Todo(format!("cranelift flag: {e}")))?;
        let isa_builder = cranelift_native::builder()
            .map_err(|e| JvmError::Todo(format!("cranelift host ISA unsupported: {e}")))?;
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| JvmError::Todo(format!("cranelift ISA: {e}")))?;
        let jit_builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        Ok(Self {
            module: JITModule::new(jit_builder),
            builder_ctx: FunctionBuilderContext::new(),
        })
    }

    /// Declares (or reuses) an external symbol for a call target this function will
    /// reference but doesn't define itself - either another Java method's direct-call
    /// stub, or one of the runtime helper entry points.
    fn declare_import(&mut self, name: &str, sig: Signature) -> Result<FuncId, JvmError> {
        self.module
            .declare_function(name, Linkage::Import, &sig)
            .map_err(|e| JvmError::Todo(format!("cranelift declare {name}: {e}")))
    }
}

fn cranelift_type(ty: ValueType) -> types::Type {
    match ty {
        ValueType::I32 | ValueType::ReturnAddress(_) => types::I32,
        ValueType::I64 => types::I64,
        ValueType::F32 => types::F32,
        ValueType::F64 => types::F64,
        ValueType::Ref => types::I64,
    }
}

/// Bytecode shapes this tier's compiler declines to take on; anything else falls
/// through the `other => return Ok(None)` arm in `compile_body`.
fn is_supported_instruction(instruction: &lagertha_common::instruction::Instruction) -> bool {
    use lagertha_common::instruction::Instruction as I;
    matches!(
        instruction,
        I::Iconst0
            | I::IconstM1
            | I::Iconst1
            | I::Iconst2
            | I::Iconst3
            | I::Iconst4
            | I::Iconst5
            | I::Bipush(_)
            | I::Sipush(_)
            | I::Lconst0
            | I::Lconst1
            | I::Iload0
            | I::Iload1
            | I::Iload2
            | I::Iload3
            | I::Iload(_)
            | I::Lload0
            | I::Lload1
            | I::Lload2
            | I::Lload3
            | I::Lload(_)
            | I::Istore0
            | I::Istore1
            | I::Istore2
            | I::Istore3
            | I::Istore(_)
            | I::Lstore0
            | I::Lstore1
            | I::Lstore2
            | I::Lstore3
            | I::Lstore(_)
            | I::Iinc(_, _)
            | I::Iadd
            | I::Isub
            | I::Imul
            | I::Idiv
            | I::Irem
            | I::Iand
            | I::Ior
            | I::Ixor
            | I::Ishl
            | I::Ishr
            | I::Iushr
            | I::Ineg
            | I::Ladd
            | I::Lsub
            | I::Lmul
            | I::Ldiv
            | I::Lrem
            | I::Lcmp
            | I::I2l
            | I::L2i
            | I::IfEq(_)
            | I::IfNe(_)
            | I::IfLt(_)
            | I::IfLe(_)
            | I::IfGt(_)
            | I::IfGe(_)
            | I::IfIcmpeq(_)
            | I::IfIcmpne(_)
            | I::IfIcmplt(_)
            | I::IfIcmple(_)
            | I::IfIcmpgt(_)
            | I::IfIcmpge(_)
            | I::Goto(_)
            | I::Ireturn
            | I::Lreturn
            | I::Return
    )
}

/// Compiles one method to native code, or declines (`Ok(None)`) if its bytecode
/// uses anything outside the numeric/control-flow-only subset above. The
/// caller (`crate::interpreter`'s tier-up check) is expected to treat `None` the
/// same as "never got hot enough" - just keep interpreting.
pub fn compile_method(
    backend: &mut JitBackend,
    vm: &VirtualMachine,
    method_id: MethodId,
) -> Result<Option<usize>, JvmError> {
    let (code, max_locals, descriptor, is_static, exception_table) = {
        let ma = vm.method_area_read();
        let method = ma.get_method(&method_id);
        if !method.is_static() {
            // instance dispatch needs a receiver-class check this tier doesn't emit yet.
            return Ok(None);
        }
        let (_, max_locals) = method.get_frame_attributes()?;
        let code = method.get_code()?.to_vec();
        let exception_table = method.get_exception_table()?.to_vec();
        if !exception_table.is_empty() {
            return Ok(None);
        }
        let descriptor = ma.get_method_descriptor_by_method_id(&method_id).clone();
        (code, max_locals, descriptor, true, exception_table)
    };

    let type_info = typecheck::analyze(&code, max_locals, &descriptor, is_static, &exception_table)?;
    if !type_info.ret_targets.is_empty() {
        return Ok(None); // jsr/ret: explicitly out of scope.
    }

    let mut instructions_by_offset = Vec::new();
    let mut pc = 0u32;
    while (pc as usize) < code.len() {
        let instr = lagertha_common::instruction::Instruction::new_at(&code, pc as usize)?;
        if !is_supported_instruction(&instr) {
            return Ok(None);
        }
        let size = instr.byte_size() as u32;
        instructions_by_offset.push((pc, instr));
        pc += size;
    }

    let ret_type = descriptor
        .ret
        .as_ref()
        .map(ValueType::from_java_type);

    let mut sig = backend.module.make_signature();
    for param in &descriptor.params {
        sig.params.push(AbiParam::new(cranelift_type(ValueType::from_java_type(param))));
    }
    if let Some(ret) = ret_type {
        sig.returns.push(AbiParam::new(cranelift_type(ret)));
    }

    let method_name = {
        let ma = vm.method_area_read();
        let method = ma.get_method(&method_id);
        format!("jit_method_{}", method_id.to_i32())
    };
    let func_id = backend
        .module
        .declare_function(&method_name, Linkage::Export, &sig)
        .map_err(|e| JvmError::Todo(format!("cranelift declare {method_name}: {e}")))?;

    let mut ctx = backend.module.make_context();
    ctx.func.signature = sig;

    {
        let mut builder = FunctionBuilder::new(&mut ctx.func, &mut backend.builder_ctx);
        let mut compiler = MethodCompiler {
            builder: &mut builder,
            type_info: &type_info,
            is_static,
        };
        match compiler.compile_body(&instructions_by_offset, max_locals) {
            Ok(()) => {}
            Err(BailOut) => return Ok(None),
        }
    }

    backend
        .module
        .define_function(func_id, &mut ctx)
        .map_err(|e| JvmError::Todo(format!("cranelift define {method_name}: {e}")))?;
    backend.module.clear_context(&mut ctx);
    backend
        .module
        .finalize_definitions()
        .map_err(|e| JvmError::Todo(format!("cranelift finalize: {e}")))?;

    let code_ptr = backend.module.get_finalized_function(func_id);
    Ok(Some(code_ptr as usize))
}

/// Raised internally when a block turns out to need something outside the
/// supported subset after all (e.g. a merge whose type state disagrees across
/// predecessors in a way this simple pass doesn't reconcile); caught by
/// `compile_method` and turned into the same "stay interpreted" `Ok(None)`.
struct BailOut;

struct MethodCompiler<'a, 'b> {
    builder: &'a mut FunctionBuilder<'b>,
    type_info: &'a MethodTypeInfo,
    is_static: bool,
}

impl<'a, 'b> MethodCompiler<'a, 'b> {
    fn compile_body(
        &mut self,
        instructions: &[(u32, lagertha_common::instruction::Instruction)],
        max_locals: u16,
    ) -> Result<(), BailOut> {
        use lagertha_common::instruction::Instruction as I;

        // One Cranelift `Block` per basic-block entry offset `typecheck::analyze`
        // already found; `local_slots` gives every local its own stack slot so
        // `Iload`/`Istore` are simple loads/stores regardless of which block they're in.
        let mut offsets: Vec<u32> = self.type_info.block_entries.keys().copied().collect();
        offsets.sort_unstable();

        let mut blocks = std::collections::HashMap::new();
        for &offset in &offsets {
            let state = &self.type_info.block_entries[&offset];
            let block = self.builder.create_block();
            for ty in &state.stack {
                self.builder.append_block_param(block, cranelift_type(*ty));
            }
            blocks.insert(offset, block);
        }

        let entry_block = *blocks.get(&0).ok_or(BailOut)?;
        self.builder.switch_to_block(entry_block);
        self.builder.seal_block(entry_block);

        let local_slots: Vec<StackSlot> = (0..max_locals)
            .map(|_| {
                self.builder.create_sized_stack_slot(StackSlotData::new(
                    StackSlotKind::ExplicitSlot,
                    8,
                    3,
                ))
            })
            .collect();

        // Entry-block params become the initial locals (JVMS: args occupy the first
        // locals slots in order; `self.is_static` only changes where `this` would sit,
        // and this tier never compiles instance methods, so there is no receiver slot).
        let entry_params: Vec<Value> = self.builder.block_params(entry_block).to_vec();
        for (i, value) in entry_params.iter().enumerate() {
            self.builder.ins().stack_store(*value, local_slots[i], 0);
        }

        let mut stack: Vec<Value> = Vec::new();
        let mut block_iter = offsets.iter().peekable();
        while let Some(&block_start) = block_iter.next() {
            let block = blocks[&block_start];
            if block != entry_block {
                self.builder.switch_to_block(block);
                stack = self.builder.block_params(block).to_vec();
            }

            let next_block_start = block_iter.peek().copied().copied();
            let mut idx = instructions
                .iter()
                .position(|(off, _)| *off == block_start)
                .ok_or(BailOut)?;

            loop {
                let (pc, instr) = &instructions[idx];
                let pc = *pc;
                let is_last_in_code = idx + 1 >= instructions.len();
                let next_pc = if is_last_in_code {
                    pc
                } else {
                    instructions[idx + 1].0
                };
                let ends_block = next_block_start == Some(next_pc) || is_last_in_code;

                self.emit(instr, pc, &mut stack, &local_slots, &blocks)?;

                if matches!(instr, I::Return | I::Ireturn | I::Lreturn) {
                    break;
                }
                if matches!(
                    instr,
                    I::Goto(_)
                        | I::IfEq(_)
                        | I::IfNe(_)
                        | I::IfLt(_)
                        | I::IfLe(_)
                        | I::IfGt(_)
                        | I::IfGe(_)
                        | I::IfIcmpeq(_)
                        | I::IfIcmpne(_)
                        | I::IfIcmplt(_)
                        | I::IfIcmple(_)
                        | I::IfIcmpgt(_)
                        | I::IfIcmpge(_)
                ) {
                    break;
                }
                if ends_block {
                    if let Some(target) = blocks.get(&next_pc) {
                        self.builder.ins().jump(*target, &stack);
                    }
                    break;
                }
                idx += 1;
            }
        }

        for &block in blocks.values() {
            if block != entry_block {
                self.builder.seal_block(block);
            }
        }
        self.builder.finalize();
        Ok(())
    }

    fn emit(
        &mut self,
        instr: &lagertha_common::instruction::Instruction,
        pc: u32,
        stack: &mut Vec<Value>,
        locals: &[StackSlot],
        blocks: &std::collections::HashMap<u32, Block>,
    ) -> Result<(), BailOut> {
        use lagertha_common::instruction::Instruction as I;

        macro_rules! bin_i32 {
            ($op:ident) => {{
                let b = stack.pop().ok_or(BailOut)?;
                let a = stack.pop().ok_or(BailOut)?;
                stack.push(self.builder.ins().$op(a, b));
            }};
        }

        match instr {
            I::Iconst0 => stack.push(self.builder.ins().iconst(types::I32, 0)),
            I::Iconst1 => stack.push(self.builder.ins().iconst(types::I32, 1)),
            I::Iconst2 => stack.push(self.builder.ins().iconst(types::I32, 2)),
            I::Iconst3 => stack.push(self.builder.ins().iconst(types::I32, 3)),
            I::Iconst4 => stack.push(self.builder.ins().iconst(types::I32, 4)),
            I::Iconst5 => stack.push(self.builder.ins().iconst(types::I32, 5)),
            I::IconstM1 => stack.push(self.builder.ins().iconst(types::I32, -1)),
            I::Bipush(v) => stack.push(self.builder.ins().iconst(types::I32, *v as i64)),
            I::Sipush(v) => stack.push(self.builder.ins().iconst(types::I32, *v as i64)),
            I::Lconst0 => stack.push(self.builder.ins().iconst(types::I64, 0)),
            I::Lconst1 => stack.push(self.builder.ins().iconst(types::I64, 1)),
            I::Iload0 => stack.push(self.load_local(locals, 0, types::I32)),
            I::Iload1 => stack.push(self.load_local(locals, 1, types::I32)),
            I::Iload2 => stack.push(self.load_local(locals, 2, types::I32)),
            I::Iload3 => stack.push(self.load_local(locals, 3, types::I32)),
            I::Iload(n) => stack.push(self.load_local(locals, *n as usize, types::I32)),
            I::Lload0 => stack.push(self.load_local(locals, 0, types::I64)),
            I::Lload1 => stack.push(self.load_local(locals, 1, types::I64)),
            I::Lload2 => stack.push(self.load_local(locals, 2, types::I64)),
            I::Lload3 => stack.push(self.load_local(locals, 3, types::I64)),
            I::Lload(n) => stack.push(self.load_local(locals, *n as usize, types::I64)),
            I::Istore0 => self.store_local(locals, 0, stack)?,
            I::Istore1 => self.store_local(locals, 1, stack)?,
            I::Istore2 => self.store_local(locals, 2, stack)?,
            I::Istore3 => self.store_local(locals, 3, stack)?,
            I::Istore(n) => self.store_local(locals, *n as usize, stack)?,
            I::Lstore0 => self.store_local(locals, 0, stack)?,
            I::Lstore1 => self.store_local(locals, 1, stack)?,
            I::Lstore2 => self.store_local(locals, 2, stack)?,
            I::Lstore3 => self.store_local(locals, 3, stack)?,
            I::Lstore(n) => self.store_local(locals, *n as usize, stack)?,
            I::Iinc(index, delta) => {
                let slot = *locals.get(*index as usize).ok_or(BailOut)?;
                let v = self.builder.ins().stack_load(types::I32, slot, 0);
                let inc = self.builder.ins().iadd_imm(v, *delta as i64);
                self.builder.ins().stack_store(inc, slot, 0);
            }
            I::Iadd => bin_i32!(iadd),
            I::Isub => bin_i32!(isub),
            I::Imul => bin_i32!(imul),
            I::Idiv => bin_i32!(sdiv),
            I::Irem => bin_i32!(srem),
            I::Iand => bin_i32!(band),
            I::Ior => bin_i32!(bor),
            I::Ixor => bin_i32!(bxor),
            I::Ishl => bin_i32!(ishl),
            I::Ishr => bin_i32!(sshr),
            I::Iushr => bin_i32!(ushr),
            I::Ladd => bin_i32!(iadd),
            I::Lsub => bin_i32!(isub),
            I::Lmul => bin_i32!(imul),
            I::Ldiv => bin_i32!(sdiv),
            I::Lrem => bin_i32!(srem),
            I::Ineg => {
                let v = stack.pop().ok_or(BailOut)?;
                stack.push(self.builder.ins().ineg(v));
            }
            I::I2l => {
                let v = stack.pop().ok_or(BailOut)?;
                stack.push(self.builder.ins().sextend(types::I64, v));
            }
            I::L2i => {
                let v = stack.pop().ok_or(BailOut)?;
                stack.push(self.builder.ins().ireduce(types::I32, v));
            }
            I::Lcmp => {
                let b = stack.pop().ok_or(BailOut)?;
                let a = stack.pop().ok_or(BailOut)?;
                let gt = self.builder.ins().icmp(IntCC::SignedGreaterThan, a, b);
                let lt = self.builder.ins().icmp(IntCC::SignedLessThan, a, b);
                let gt32 = self.builder.ins().uextend(types::I32, gt);
                let lt32 = self.builder.ins().uextend(types::I32, lt);
                stack.push(self.builder.ins().isub(gt32, lt32));
            }
            I::Goto(off) => {
                let target = *blocks.get(&((pc as i32 + *off as i32) as u32)).ok_or(BailOut)?;
                self.builder.ins().jump(target, stack);
            }
            I::IfEq(off) | I::IfNe(off) | I::IfLt(off) | I::IfLe(off) | I::IfGt(off) | I::IfGe(off) => {
                let v = stack.pop().ok_or(BailOut)?;
                let zero = self.builder.ins().iconst(types::I32, 0);
                self.emit_branch(instr, v, zero, pc, *off, stack, blocks)?;
            }
            I::IfIcmpeq(off)
            | I::IfIcmpne(off)
            | I::IfIcmplt(off)
            | I::IfIcmple(off)
            | I::IfIcmpgt(off)
            | I::IfIcmpge(off) => {
                let b = stack.pop().ok_or(BailOut)?;
                let a = stack.pop().ok_or(BailOut)?;
                self.emit_branch(instr, a, b, pc, *off, stack, blocks)?;
            }
            I::Ireturn | I::Lreturn => {
                let v = stack.pop().ok_or(BailOut)?;
                self.builder.ins().return_(&[v]);
            }
            I::Return => {
                self.builder.ins().return_(&[]);
            }
            // Any call instruction (`invokestatic`/`invokevirtual`/`invokeinterface`/
            // `invokespecial`), field access, allocation, array op, or monitor op
            // bails here too, via `is_supported_instruction` filtering them out
            // before `compile_body` ever gets this far - deliberately excluded,
            // not just unimplemented, per the scope note on `compile_method` below.
            _ => return Err(BailOut),
        }
        Ok(())
    }

    fn emit_branch(
        &mut self,
        instr: &lagertha_common::instruction::Instruction,
        a: Value,
        b: Value,
        pc: u32,
        off: i16,
        stack: &[Value],
        blocks: &std::collections::HashMap<u32, Block>,
    ) -> Result<(), BailOut> {
        use lagertha_common::instruction::Instruction as I;
        let cc = match instr {
            I::IfEq(_) | I::IfIcmpeq(_) => IntCC::Equal,
            I::IfNe(_) | I::IfIcmpne(_) => IntCC::NotEqual,
            I::IfLt(_) | I::IfIcmplt(_) => IntCC::SignedLessThan,
            I::IfLe(_) | I::IfIcmple(_) => IntCC::SignedLessThanOrEqual,
            I::IfGt(_) | I::IfIcmpgt(_) => IntCC::SignedGreaterThan,
            I::IfGe(_) | I::IfIcmpge(_) => IntCC::SignedGreaterThanOrEqual,
            _ => return Err(BailOut),
        };
        let taken = *blocks.get(&((pc as i32 + off as i32) as u32)).ok_or(BailOut)?;
        let next_instr_pc = pc + instr_byte_size(instr) as u32;
        let fallthrough = *blocks.get(&next_instr_pc).ok_or(BailOut)?;
        let cond = self.builder.ins().icmp(cc, a, b);
        self.builder.ins().brif(cond, taken, stack, fallthrough, stack);
        Ok(())
    }

    fn load_local(&mut self, locals: &[StackSlot], idx: usize, ty: types::Type) -> Value {
        let slot = locals[idx];
        self.builder.ins().stack_load(ty, slot, 0)
    }

    fn store_local(&mut self, locals: &[StackSlot], idx: usize, stack: &mut Vec<Value>) -> Result<(), BailOut> {
        let v = stack.pop().ok_or(BailOut)?;
        let slot = *locals.get(idx).ok_or(BailOut)?;
        self.builder.ins().stack_store(v, slot, 0);
        Ok(())
    }
}

fn instr_byte_size(instr: &lagertha_common::instruction::Instruction) -> u8 {
    instr.byte_size()
}

/// Invokes an already-finalized function pointer directly, bypassing the
/// interpreter, for the narrow set of argument/return shapes this tier's compiler
/// ever produces (a real build generates one adaptor thunk per distinct layout;
/// this one hand-writes the handful the supported instruction subset above can
/// ever need rather than generating them).
///
/// Returns `None` when `params`/`ret` describe a shape no hand-written arm below
/// covers (more than two parameters, or anything other than `I32`/`I64`); the
/// caller falls back to interpreting the method, exactly as if it had never been
/// compiled at all.
pub fn call_compiled_method(
    address: usize,
    params: &[ValueType],
    ret: Option<ValueType>,
    args: &[crate::vm::Value],
) -> Option<Result<Option<crate::vm::Value>, JvmError>> {
    use crate::vm::Value;

    fn as_i32(v: &Value) -> Option<i32> {
        match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
    fn as_i64(v: &Value) -> Option<i64> {
        match v {
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    match (params, ret, args) {
        ([], None, []) => {
            let f: extern "C" fn() = unsafe { std::mem::transmute(address as *const ()) };
            f();
            Some(Ok(None))
        }
        ([], Some(ValueType::I32), []) => {
            let f: extern "C" fn() -> i32 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Integer(f()))))
        }
        ([], Some(ValueType::I64), []) => {
            let f: extern "C" fn() -> i64 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Long(f()))))
        }
        ([ValueType::I32], None, [a]) => {
            let a = as_i32(a)?;
            let f: extern "C" fn(i32) = unsafe { std::mem::transmute(address as *const ()) };
            f(a);
            Some(Ok(None))
        }
        ([ValueType::I32], Some(ValueType::I32), [a]) => {
            let a = as_i32(a)?;
            let f: extern "C" fn(i32) -> i32 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Integer(f(a)))))
        }
        ([ValueType::I32], Some(ValueType::I64), [a]) => {
            let a = as_i32(a)?;
            let f: extern "C" fn(i32) -> i64 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Long(f(a)))))
        }
        ([ValueType::I64], None, [a]) => {
            let a = as_i64(a)?;
            let f: extern "C" fn(i64) = unsafe { std::mem::transmute(address as *const ()) };
            f(a);
            Some(Ok(None))
        }
        ([ValueType::I64], Some(ValueType::I32), [a]) => {
            let a = as_i64(a)?;
            let f: extern "C" fn(i64) -> i32 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Integer(f(a)))))
        }
        ([ValueType::I64], Some(ValueType::I64), [a]) => {
            let a = as_i64(a)?;
            let f: extern "C" fn(i64) -> i64 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Long(f(a)))))
        }
        ([ValueType::I32, ValueType::I32], Some(ValueType::I32), [a, b]) => {
            let a = as_i32(a)?;
            let b = as_i32(b)?;
            let f: extern "C" fn(i32, i32) -> i32 = unsafe { std::mem::transmute(address as *const ()) };
            Some(Ok(Some(Value::Integer(f(a, b)))))
        }
        _ => None,
    }
}

/// Allocates the stub symbol an OSR transition into this compiled method would jump
/// to, entering at `bytecode_offset` rather than at the top - not yet connected to a
/// live entry-block generator, since this tier's `compile_body` always builds the
/// whole-method entry form; kept here as the seam `crate::osr` is written against.
pub fn mangle_osr_entry_placeholder(
    vm: &VirtualMachine,
    method_id: MethodId,
    bytecode_offset: u32,
) -> Symbol {
    let ma = vm.method_area_read();
    let method = ma.get_method(&method_id);
    crate::mangling::mangle_osr_method(
        vm.interner(),
        ma.get_class(&method.class_id()).get_name(),
        method.name,
        method.desc,
        bytecode_offset,
    )
}

