//! Native method registry: the table natives are looked up in at invocation time
//! (`Interpreter::invoke_native_method`), plus the bootstrap code that populates it.
//!
//! Two kinds of natives get in here:
//!   - "preregistered" natives, wired up once at VM startup before any class is
//!     loaded (`preregistered::register_all`), because the interpreter needs them
//!     available the moment `java.lang.Object`/`java.lang.Class` are initialized.
//!   - "registrable" natives, which are themselves invoked *as* a native method
//!     (a class's own `registerNatives()`) and register a further batch of natives
//!     the first time that class initializes. These take `&VirtualMachine` rather
//!     than `&mut NativeRegistry`, so the registry has to support registration
//!     through a shared reference.

use std::sync::Arc;

use dashmap::DashMap;
use lasso::ThreadedRodeo;

use crate::error::JvmError;
use crate::keys::FullyQualifiedMethodKey;
use crate::thread::JavaThreadState;
use crate::vm::Value;
use crate::VirtualMachine;

pub mod preregistered;
pub mod registrable;

/// What a native function returns: `Some(value)` for a non-void method, `None` for
/// `V`-returning ones, `Err` when the native itself raises a Java exception.
pub type NativeRet = Result<Option<Value>, JvmError>;

pub type NativeFn = fn(&VirtualMachine, &mut JavaThreadState, &[Value]) -> NativeRet;

/// Interior-mutable so `registrable` natives can add entries through a shared
/// `&VirtualMachine` while the VM is otherwise running.
pub struct NativeRegistry {
    table: DashMap<FullyQualifiedMethodKey, NativeFn>,
    pub string_interner: Arc<ThreadedRodeo>,
}

impl NativeRegistry {
    pub fn new(string_interner: Arc<ThreadedRodeo>) -> Self {
        Self {
            table: DashMap::new(),
            string_interner,
        }
    }

    pub fn register(&self, key: FullyQualifiedMethodKey, f: NativeFn) {
        self.table.insert(key, f);
    }

    pub fn get(&self, key: &FullyQualifiedMethodKey) -> Option<NativeFn> {
        self.table.get(key).map(|entry| *entry)
    }

    /// Registers every native known ahead of time, independent of class loading order.
    pub fn bootstrap(&mut self) {
        preregistered::register_all(self);
    }
}
