//! Tier-agnostic stack-walking abstraction.
//!
//! The interpreter keeps its frames as a flat `Vec<FrameType>` (`crate::vm::stack`);
//! JIT-compiled code keeps its frames on the host call stack with a
//! `JavaMethodMetadata` prefix placed just before each function's code so a walker
//! can recognize it without DWARF. `UnwindFrame` hides that difference behind
//! one read-only view so exception dispatch (`crate::interpreter`, eventually
//! `crate::materialize`) and OSR (`crate::osr`) don't need to know which tier
//! produced a given frame.
//!
//! There is no real unwinder here - `unwind_java_stack` only ever walks the
//! interpreter's explicit frame `Vec`, since the JIT backend in this build emits
//! calls through mangled stubs rather than running compiled code on its own thread
//! stack. The abstraction is kept general so a future JIT-frame reader can be
//! plugged in without changing any call site.

use crate::error::JvmError;
use crate::keys::{ClassId, MethodId};
use crate::thread::JavaThreadState;
use crate::vm::Value;
use crate::vm::stack::FrameType;

/// Prefix record every compiled function places immediately before its code,
/// letting a stack walker identify `(class, method)` for a PC without a symbol
/// table lookup. The interpreter doesn't need one - it
/// already tracks `method_id` per `JavaFrame` - but a `JavaMethodMetadata` is
/// still attached to every interpreter frame it's asked for so callers that walk
/// across a tier boundary see one consistent shape.
#[derive(Debug, Clone, Copy)]
pub struct JavaMethodMetadata {
    pub class_object: ClassId,
    pub method: MethodId,
}

/// One GC-root/value location a `StackMapRecord` can describe for a given safepoint.
/// `Constant`/`Register` are representative of what a real codegen backend would
/// need; this build only ever produces `Direct` entries, since locals/operand-stack
/// slots are always stack-allocated rather than kept live in registers across
/// a safepoint.
#[derive(Debug, Clone, Copy)]
pub enum FrameValue {
    Constant(i64),
    Register(u16),
    Direct { frame_offset: i32 },
    Indirect { base_offset: i32, derived_offset: i32 },
}

/// A GC safepoint's root set, as the JIT would emit it next to a `statepoint` call.
#[derive(Debug, Clone, Default)]
pub struct StackMapRecord {
    pub locals: Vec<FrameValue>,
    pub operand_stack: Vec<FrameValue>,
}

/// A read-only view of one activation on the Java call stack, regardless of which
/// tier produced it.
pub enum UnwindFrame<'a> {
    Interpreted {
        method_id: MethodId,
        class_object: ClassId,
        bytecode_offset: u32,
        locals: &'a [Value],
        operand_stack: &'a [Value],
    },
}

impl<'a> UnwindFrame<'a> {
    pub fn method(&self) -> MethodId {
        match self {
            UnwindFrame::Interpreted { method_id, .. } => *method_id,
        }
    }

    pub fn class_object(&self) -> ClassId {
        match self {
            UnwindFrame::Interpreted { class_object, .. } => *class_object,
        }
    }

    pub fn bytecode_offset(&self) -> u32 {
        match self {
            UnwindFrame::Interpreted { bytecode_offset, .. } => *bytecode_offset,
        }
    }

    pub fn read_locals(&self) -> &'a [Value] {
        match self {
            UnwindFrame::Interpreted { locals, .. } => locals,
        }
    }

    pub fn read_operand_stack(&self) -> &'a [Value] {
        match self {
            UnwindFrame::Interpreted { operand_stack, .. } => operand_stack,
        }
    }

    pub fn metadata(&self) -> JavaMethodMetadata {
        JavaMethodMetadata {
            class_object: self.class_object(),
            method: self.method(),
        }
    }
}

/// What a per-frame callback passed to `unwind_java_stack` returns: keep walking
/// toward the caller, or stop (the caller found what it needed - a handler, an OSR
/// target, ...).
pub enum WalkControl {
    Continue,
    Stop,
}

/// Walks `thread`'s Java frames top-down (callee to caller), calling `f` on each.
/// Native frames are skipped - they carry no bytecode offset and can't catch a
/// Java exception or host an OSR entry.
///
/// This is the sole read path exception dispatch and OSR snapshotting should use
/// instead of reaching into `JavaStack` directly, so both keep working unchanged if
/// a JIT-frame reader is added later.
pub fn unwind_java_stack<F>(
    vm: &crate::VirtualMachine,
    thread: &JavaThreadState,
    mut f: F,
) -> Result<(), JvmError>
where
    F: FnMut(UnwindFrame<'_>) -> Result<WalkControl, JvmError>,
{
    for frame in thread.stack.frames_top_down() {
        let FrameType::JavaFrame(java_frame) = frame else {
            continue;
        };
        let method_id = java_frame.method_id();
        let class_object = vm.method_area_read().get_method(&method_id).class_id();
        let view = UnwindFrame::Interpreted {
            method_id,
            class_object,
            bytecode_offset: java_frame.pc() as u32,
            locals: java_frame.locals(),
            operand_stack: java_frame.operands(),
        };
        match f(view)? {
            WalkControl::Continue => continue,
            WalkControl::Stop => break,
        }
    }
    Ok(())
}

/// The sole OSR/exception-handler-entry primitive: pops frames down to
/// `target_depth` and hands control to `resume` with a freshly pushed frame.
///
/// In this build "transferring control" means invoking `resume` directly from the
/// unwind loop - there's no separate native thread stack to splice into, since JIT
/// code is reached only through mangled stub calls that themselves run on the one
/// interpreter-driven call stack. `resume` is responsible for pushing whatever frame
/// it needs (a `JavaFrame` for interpreter re-entry, nothing for a JIT entry whose
/// frame is the Rust/Cranelift call frame of `resume` itself) before it starts
/// executing at the target.
pub fn resume_execution_at_function<T>(
    thread: &mut JavaThreadState,
    target_depth: usize,
    resume: impl FnOnce(&mut JavaThreadState) -> Result<T, JvmError>,
) -> Result<T, JvmError> {
    thread.stack.truncate_to_depth(target_depth);
    resume(thread)
}
