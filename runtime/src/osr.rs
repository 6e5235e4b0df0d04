//! On-stack replacement: moving one already-running method
//! activation from the interpreter to JIT code, or back, without returning from it.
//!
//! `OSRState` is the tier-neutral snapshot; `to_jit_buffer`/`to_interpreter_buffer`
//! lay it out the way the corresponding OSR-entry stub expects to read it. Producing
//! a snapshot from an interpreter frame is exact
//! (the interpreter's locals/operand stack are already `Value`s); producing one from
//! a JIT frame would read a `StackMapRecord` at the transition point instead - not
//! exercised yet since this build's JIT frames don't keep their own native stack
//! walkable, but `OSRState::from_stack_map` is kept as the seam exception dispatch
//! will eventually share with OSR for that case.

use crate::error::JvmError;
use crate::frame::{FrameValue, StackMapRecord, UnwindFrame};
use crate::heap::HeapRef;
use crate::typecheck::{MethodTypeInfo, ValueType};
use crate::vm::Value;

/// A method activation's state at one bytecode offset, tier-neutral.
#[derive(Debug, Clone)]
pub struct OSRState {
    pub bytecode_offset: u32,
    pub locals: Vec<Value>,
    pub locals_types: Vec<ValueType>,
    pub operand_stack: Vec<Value>,
    pub operand_types: Vec<ValueType>,
}

fn value_bits(v: Value) -> u64 {
    match v {
        Value::Integer(i) => i as u32 as u64,
        Value::Long(l) => l as u64,
        Value::Float(f) => f.to_bits() as u64,
        Value::Double(d) => d.to_bits(),
        Value::Ref(addr) => addr as u64,
        Value::Null => 0,
    }
}

fn bits_to_value(bits: u64, ty: ValueType) -> Value {
    match ty {
        ValueType::I32 => Value::Integer(bits as u32 as i32),
        ValueType::I64 => Value::Long(bits as i64),
        ValueType::F32 => Value::Float(f32::from_bits(bits as u32)),
        ValueType::F64 => Value::Double(f64::from_bits(bits)),
        ValueType::Ref => {
            if bits == 0 {
                Value::Null
            } else {
                Value::Ref(bits as HeapRef)
            }
        }
        ValueType::ReturnAddress(_) => Value::Integer(bits as u32 as i32),
    }
}

fn ref_bitmap(types: &[ValueType]) -> Vec<u64> {
    let words = types.len().div_ceil(64).max(1);
    let mut bitmap = vec![0u64; words];
    for (i, ty) in types.iter().enumerate() {
        if matches!(ty, ValueType::Ref) {
            bitmap[i / 64] |= 1 << (i % 64);
        }
    }
    bitmap
}

impl OSRState {
    /// Snapshots an interpreter frame at its current bytecode offset. `type_info` is
    /// the `crate::typecheck::analyze` output for the same method, used only to tag
    /// which stack/local slots hold references for the GC-ref bitmaps the
    /// interpreter-target buffer carries.
    pub fn from_interpreter_frame(
        frame: &UnwindFrame<'_>,
        type_info: &MethodTypeInfo,
    ) -> Result<Self, JvmError> {
        let offset = frame.bytecode_offset();
        let snapshot = type_info.snapshot_at(offset).ok_or_else(|| {
            JvmError::Todo(format!(
                "OSR requested at offset {offset} with no recorded block-entry type state"
            ))
        })?;
        Ok(OSRState {
            bytecode_offset: offset,
            locals: frame.read_locals().to_vec(),
            locals_types: snapshot.locals.clone(),
            operand_stack: frame.read_operand_stack().to_vec(),
            operand_types: snapshot.stack.clone(),
        })
    }

    /// Reconstructs a snapshot from a JIT frame's `StackMapRecord` at a safepoint,
    /// the path exception dispatch and OSR would share once the JIT backend keeps
    /// its own frames walkable. `read_frame_slot` pulls one raw value out of the
    /// native frame at the offset a `FrameValue` names.
    pub fn from_stack_map(
        bytecode_offset: u32,
        record: &StackMapRecord,
        locals_types: Vec<ValueType>,
        operand_types: Vec<ValueType>,
        mut read_frame_slot: impl FnMut(FrameValue) -> u64,
    ) -> Self {
        let locals = locals_types
            .iter()
            .zip(&record.locals)
            .map(|(ty, slot)| bits_to_value(read_frame_slot(*slot), *ty))
            .collect();
        let operand_stack = operand_types
            .iter()
            .zip(&record.operand_stack)
            .map(|(ty, slot)| bits_to_value(read_frame_slot(*slot), *ty))
            .collect();
        OSRState {
            bytecode_offset,
            locals,
            locals_types,
            operand_stack,
            operand_types,
        }
    }

    /// JIT-entry buffer layout: `u64 locals[num_locals]; u64
    /// operand_stack[num_stack]`, no header - the entry function already knows its
    /// own shape from the offset encoded into its mangled symbol.
    pub fn to_jit_buffer(&self) -> Vec<u64> {
        let mut buf = Vec::with_capacity(self.locals.len() + self.operand_stack.len());
        buf.extend(self.locals.iter().map(|v| value_bits(*v)));
        buf.extend(self.operand_stack.iter().map(|v| value_bits(*v)));
        buf
    }

    /// Interpreter-target buffer layout:
    /// `u64 first = bytecode_offset | (num_stack << 16);`
    /// `u64 locals[num_locals]; u64 operand_stack[num_stack];`
    /// `u64 locals_ref_bitmap[ceil(num_locals/64)]; u64 stack_ref_bitmap[ceil(num_stack/64)]`.
    /// Used when the JIT de-optimizes back into the interpreter (e.g. on an
    /// uncommon trap) rather than the usual interpreter-to-JIT direction.
    pub fn to_interpreter_buffer(&self) -> Vec<u64> {
        let num_locals = self.locals.len();
        let num_stack = self.operand_stack.len();
        let first = (self.bytecode_offset as u64) | ((num_stack as u64) << 16);

        let mut buf = Vec::with_capacity(1 + num_locals + num_stack + 2);
        buf.push(first);
        buf.extend(self.locals.iter().map(|v| value_bits(*v)));
        buf.extend(self.operand_stack.iter().map(|v| value_bits(*v)));
        buf.extend(ref_bitmap(&self.locals_types));
        buf.extend(ref_bitmap(&self.operand_types));
        buf
    }
}

/// Which tier an OSR transition is heading into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OSRTarget {
    Jit,
    Interpreter,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(offset: u32, locals: Vec<(Value, ValueType)>, stack: Vec<(Value, ValueType)>) -> OSRState {
        OSRState {
            bytecode_offset: offset,
            locals: locals.iter().map(|(v, _)| *v).collect(),
            locals_types: locals.iter().map(|(_, t)| *t).collect(),
            operand_stack: stack.iter().map(|(v, _)| *v).collect(),
            operand_types: stack.iter().map(|(_, t)| *t).collect(),
        }
    }

    #[test]
    fn jit_buffer_is_locals_then_stack_no_header() {
        let s = state(
            10,
            vec![(Value::Integer(7), ValueType::I32), (Value::Null, ValueType::Ref)],
            vec![(Value::Long(-1), ValueType::I64)],
        );
        let buf = s.to_jit_buffer();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf[0], 7u64);
        assert_eq!(buf[1], 0u64);
        assert_eq!(buf[2], u64::MAX);
    }

    #[test]
    fn interpreter_buffer_packs_offset_and_stack_depth_in_first_word() {
        let s = state(
            0x20,
            vec![(Value::Integer(1), ValueType::I32)],
            vec![(Value::Integer(2), ValueType::I32), (Value::Integer(3), ValueType::I32)],
        );
        let buf = s.to_interpreter_buffer();
        assert_eq!(buf[0], 0x20 | (2u64 << 16));
        assert_eq!(&buf[1..2], &[1u64]);
        assert_eq!(&buf[2..4], &[2u64, 3u64]);
    }

    #[test]
    fn ref_bitmap_marks_only_reference_slots() {
        let types = vec![ValueType::I32, ValueType::Ref, ValueType::F64, ValueType::Ref];
        let bitmap = ref_bitmap(&types);
        assert_eq!(bitmap.len(), 1);
        assert_eq!(bitmap[0], (1 << 1) | (1 << 3));
    }

    #[test]
    fn ref_bitmap_spans_multiple_words_past_64_slots() {
        let mut types = vec![ValueType::I32; 64];
        types.push(ValueType::Ref);
        let bitmap = ref_bitmap(&types);
        assert_eq!(bitmap.len(), 2);
        assert_eq!(bitmap[0], 0);
        assert_eq!(bitmap[1], 1);
    }

    #[test]
    fn value_bits_roundtrip_through_bits_to_value() {
        for (v, ty) in [
            (Value::Integer(-5), ValueType::I32),
            (Value::Long(i64::MIN), ValueType::I64),
            (Value::Float(1.5), ValueType::F32),
            (Value::Double(-2.5), ValueType::F64),
        ] {
            let back = bits_to_value(value_bits(v), ty);
            match (v, back) {
                (Value::Integer(a), Value::Integer(b)) => assert_eq!(a, b),
                (Value::Long(a), Value::Long(b)) => assert_eq!(a, b),
                (Value::Float(a), Value::Float(b)) => assert_eq!(a, b),
                (Value::Double(a), Value::Double(b)) => assert_eq!(a, b),
                other => panic!("type mismatch: {other:?}"),
            }
        }
    }

    #[test]
    fn null_ref_round_trips_as_zero_bits() {
        let back = bits_to_value(value_bits(Value::Null), ValueType::Ref);
        assert!(matches!(back, Value::Null));
    }
}
