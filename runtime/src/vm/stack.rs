//! The per-thread call stack: a flat `Vec` of frames, each either a Java frame
//! (its own bounded operand stack + local variable array, per JVMS 2.6) or a
//! native frame (just enough bookkeeping to unwind through it).
//!
//! OSR re-enters a method mid-execution by constructing a `JavaFrame`
//! directly from the interpreter's locals/operands rather than by pushing a
//! fresh one, so the frame representation here is deliberately plain data with
//! no hidden invariants tying it to how it was pushed.

use crate::error::JvmError;
use crate::keys::MethodId;
use crate::vm::Value;

const MAX_FRAMES: usize = 4096;

pub struct JavaFrame {
    method_id: MethodId,
    locals: Vec<Value>,
    operands: Vec<Value>,
    pc: usize,
}

impl JavaFrame {
    pub fn new(method_id: MethodId, max_stack: u16, max_locals: u16, mut args: Vec<Value>) -> Self {
        args.resize(max_locals as usize, Value::Null);
        Self {
            method_id,
            locals: args,
            operands: Vec::with_capacity(max_stack as usize),
            pc: 0,
        }
    }

    pub fn method_id(&self) -> MethodId {
        self.method_id
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub fn increment_pc(&mut self, by: usize) {
        self.pc += by;
    }

    pub fn get_local(&self, idx: usize) -> Result<&Value, JvmError> {
        self.locals
            .get(idx)
            .ok_or(JvmError::LocalVariableNotFound(idx as u8))
    }

    pub fn locals(&self) -> &[Value] {
        &self.locals
    }

    pub fn operands(&self) -> &[Value] {
        &self.operands
    }

    pub fn set_local(&mut self, idx: usize, value: Value) {
        if idx >= self.locals.len() {
            self.locals.resize(idx + 1, Value::Null);
        }
        self.locals[idx] = value;
    }
}

pub struct NativeFrame {
    method_id: MethodId,
}

impl NativeFrame {
    pub fn new(method_id: MethodId) -> Self {
        Self { method_id }
    }

    pub fn method_id(&self) -> MethodId {
        self.method_id
    }
}

pub enum FrameType {
    JavaFrame(JavaFrame),
    NativeFrame(NativeFrame),
}

impl FrameType {
    pub fn is_native(&self) -> bool {
        matches!(self, FrameType::NativeFrame(_))
    }

    pub fn method_id(&self) -> MethodId {
        match self {
            FrameType::JavaFrame(f) => f.method_id(),
            FrameType::NativeFrame(f) => f.method_id(),
        }
    }
}

pub struct JavaStack {
    frames: Vec<FrameType>,
}

impl Default for JavaStack {
    fn default() -> Self {
        Self::new()
    }
}

impl JavaStack {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(256),
        }
    }

    pub fn push_frame(&mut self, frame: FrameType) -> Result<(), JvmError> {
        if self.frames.len() >= MAX_FRAMES {
            return Err(JvmError::StackOverflow);
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn cur_frame(&self) -> Result<&FrameType, JvmError> {
        self.frames.last().ok_or(JvmError::FrameStackIsEmpty)
    }

    pub fn cur_java_frame(&self) -> Result<&JavaFrame, JvmError> {
        match self.cur_frame()? {
            FrameType::JavaFrame(f) => Ok(f),
            FrameType::NativeFrame(_) => Err(JvmError::FrameStackIsEmpty),
        }
    }

    pub fn cur_java_frame_mut(&mut self) -> Result<&mut JavaFrame, JvmError> {
        match self.frames.last_mut().ok_or(JvmError::FrameStackIsEmpty)? {
            FrameType::JavaFrame(f) => Ok(f),
            FrameType::NativeFrame(_) => Err(JvmError::FrameStackIsEmpty),
        }
    }

    pub fn pop_java_frame(&mut self) -> Result<JavaFrame, JvmError> {
        match self.frames.pop().ok_or(JvmError::FrameStackIsEmpty)? {
            FrameType::JavaFrame(f) => Ok(f),
            other @ FrameType::NativeFrame(_) => {
                self.frames.push(other);
                Err(JvmError::FrameStackIsEmpty)
            }
        }
    }

    pub fn pop_native_frame(&mut self) -> Result<NativeFrame, JvmError> {
        match self.frames.pop().ok_or(JvmError::FrameStackIsEmpty)? {
            FrameType::NativeFrame(f) => Ok(f),
            other @ FrameType::JavaFrame(_) => {
                self.frames.push(other);
                Err(JvmError::FrameStackIsEmpty)
            }
        }
    }

    /// Top-down iterator over every frame currently pushed, for stack walking
    /// (`crate::frame::unwind_java_stack`).
    pub fn frames_top_down(&self) -> impl Iterator<Item = &FrameType> {
        self.frames.iter().rev()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pops frames until exactly `depth` remain, for OSR/exception-handler re-entry
    /// (`crate::frame::resume_execution_at_function`).
    pub fn truncate_to_depth(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub fn pc(&self) -> Result<usize, JvmError> {
        Ok(self.cur_java_frame()?.pc)
    }

    pub fn pc_mut(&mut self) -> Result<&mut usize, JvmError> {
        Ok(&mut self.cur_java_frame_mut()?.pc)
    }

    pub fn get_local(&self, idx: usize) -> Result<&Value, JvmError> {
        self.cur_java_frame()?.get_local(idx)
    }

    pub fn set_local(&mut self, idx: usize, value: Value) -> Result<(), JvmError> {
        self.cur_java_frame_mut()?.set_local(idx, value);
        Ok(())
    }

    pub fn get_local_int_val(&self, idx: usize) -> Result<&i32, JvmError> {
        match self.get_local(idx)? {
            Value::Integer(v) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected int local".to_string())),
        }
    }

    pub fn get_local_float(&self, idx: usize) -> Result<&Value, JvmError> {
        match self.get_local(idx)? {
            v @ Value::Float(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected float local".to_string())),
        }
    }

    pub fn get_local_double(&self, idx: usize) -> Result<&Value, JvmError> {
        match self.get_local(idx)? {
            v @ Value::Double(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected double local".to_string())),
        }
    }

    pub fn push_operand(&mut self, value: Value) -> Result<(), JvmError> {
        self.cur_java_frame_mut()?.operands.push(value);
        Ok(())
    }

    pub fn pop_operand(&mut self) -> Result<Value, JvmError> {
        self.cur_java_frame_mut()?
            .operands
            .pop()
            .ok_or(JvmError::OperandStackIsEmpty)
    }

    pub fn peek_operand(&self) -> Result<&Value, JvmError> {
        self.cur_java_frame()?
            .operands
            .last()
            .ok_or(JvmError::OperandStackIsEmpty)
    }

    pub fn peek_operand_at(&self, n: usize) -> Result<&Value, JvmError> {
        let ops = &self.cur_java_frame()?.operands;
        ops.len()
            .checked_sub(n + 1)
            .and_then(|idx| ops.get(idx))
            .ok_or(JvmError::OperandStackIsEmpty)
    }

    pub fn dup_top(&mut self) -> Result<(), JvmError> {
        let top = *self.peek_operand()?;
        self.push_operand(top)
    }

    pub fn pop_int(&mut self) -> Result<Value, JvmError> {
        match self.pop_operand()? {
            v @ Value::Integer(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected int operand".to_string())),
        }
    }

    pub fn pop_int_val(&mut self) -> Result<i32, JvmError> {
        self.pop_int()?.as_int()
    }

    pub fn pop_long(&mut self) -> Result<Value, JvmError> {
        match self.pop_operand()? {
            v @ Value::Long(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected long operand".to_string())),
        }
    }

    pub fn pop_long_val(&mut self) -> Result<i64, JvmError> {
        self.pop_long()?.as_long()
    }

    pub fn pop_float(&mut self) -> Result<Value, JvmError> {
        match self.pop_operand()? {
            v @ Value::Float(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected float operand".to_string())),
        }
    }

    pub fn pop_float_val(&mut self) -> Result<f32, JvmError> {
        match self.pop_float()? {
            Value::Float(v) => Ok(v),
            _ => unreachable!(),
        }
    }

    pub fn pop_double(&mut self) -> Result<Value, JvmError> {
        match self.pop_operand()? {
            v @ Value::Double(_) => Ok(v),
            _ => Err(JvmError::UnexpectedType("expected double operand".to_string())),
        }
    }

    pub fn pop_double_val(&mut self) -> Result<f64, JvmError> {
        self.pop_double()?.as_double()
    }

    pub fn pop_nullable_ref(&mut self) -> Result<Value, JvmError> {
        match self.pop_operand()? {
            v @ (Value::Ref(_) | Value::Null) => Ok(v),
            _ => Err(JvmError::UnexpectedType(
                "expected reference or null operand".to_string(),
            )),
        }
    }

    pub fn pop_nullable_ref_val(&mut self) -> Result<Option<crate::heap::HeapRef>, JvmError> {
        self.pop_nullable_ref()?.as_nullable_obj_ref()
    }

    pub fn pop_obj_val(&mut self) -> Result<crate::heap::HeapRef, JvmError> {
        self.pop_nullable_ref()?.as_obj_ref()
    }
}
