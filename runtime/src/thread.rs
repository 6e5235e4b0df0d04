//! Per-thread execution state. The interpreter, the JIT's stack-map walker, and OSR
//! all mutate this same frame stack; `JavaThreadState` exists so there's one place
//! that owns it regardless of which tier is currently driving execution.

use crate::keys::ThreadId;
use crate::vm::stack::JavaStack;

pub struct JavaThreadState {
    pub id: ThreadId,
    pub stack: JavaStack,
}

impl JavaThreadState {
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            stack: JavaStack::new(),
        }
    }
}
