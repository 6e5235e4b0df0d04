//! The execution core: method area, heap, interpreter, JIT compiler and the
//! materialization pipeline gluing the two tiers together.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lasso::ThreadedRodeo;

pub use error::JvmError;
pub use keys::{MethodId, Symbol, ThreadId};

pub mod class_loader;
pub mod codegen;
pub mod error;
pub mod frame;
pub mod heap;
pub mod interpreter;
pub mod keys;
pub mod mangling;
pub mod materialize;
pub mod native;
pub mod osr;
pub mod rt;
pub mod thread;
pub mod typecheck;
pub mod vm;

use crate::error::{JavaExceptionFromJvm, JavaExceptionKind};
use crate::heap::{Heap, HeapRef};
use crate::heap::method_area::MethodArea;
use crate::keys::FieldKey;
use crate::native::NativeRegistry;
use crate::thread::JavaThreadState;
use crate::vm::bootstrap_registry::BootstrapRegistry;

/// Startup configuration collected from the CLI / environment.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// JAVA_HOME-equivalent: where `lib/modules` (the JImage) lives.
    pub home: PathBuf,
    pub class_path: Vec<PathBuf>,
    pub main_class: String,
    pub main_args: Vec<String>,
    pub heap_size_mb: usize,
    /// Tier-up threshold: number of interpreter invocations of a method before it
    /// is queued for JIT compilation.
    pub tier_up_threshold: u32,
    /// Number of interpreted loop back-edges taken within a single method activation
    /// before that activation is replaced in-place with JIT code via OSR.
    pub osr_backedge_threshold: u32,
    pub print_bytecode: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("/usr/lib/jvm/default"),
            class_path: Vec::new(),
            main_class: String::new(),
            main_args: Vec::new(),
            heap_size_mb: 256,
            tier_up_threshold: 1000,
            osr_backedge_threshold: 10_000,
            print_bytecode: false,
        }
    }
}

/// Root context threaded through every interpreter, native-method and compiled-code
/// entry point. There is one instance per running process.
pub struct VirtualMachine {
    pub config: VmConfig,
    method_area: RwLock<MethodArea>,
    /// `pub(crate)` rather than accessor-only: `MethodArea::get_mirror_ref_or_create`
    /// takes the raw lock itself (it needs to allocate on the heap while already
    /// holding the method area lock), so a handful of native-method call sites reach
    /// in through this field directly instead of through `heap_read`/`heap_write`.
    pub(crate) heap: RwLock<Heap>,
    /// Shared string interner; some native-method registration call sites reach in
    /// through this field directly rather than the `interner()` accessor.
    pub string_interner: Arc<ThreadedRodeo>,
    pub native_registry: NativeRegistry,
    /// Well-known classes/fields/methods resolved once at bootstrap. Exposed
    /// both as a field and through `br()` since call sites use either form.
    pub br: Arc<BootstrapRegistry>,
    /// Lazy-materialization symbol table and per-method compilation state.
    pub materializer: materialize::Materializer,
    /// The JIT backend's executable-memory allocator. Behind a `Mutex` rather than
    /// the `RwLock` the method area/heap use: there is exactly one Java thread,
    /// so this is never contended, but `cranelift_jit::JITModule` needs `&mut` for
    /// every `define_function` regardless of whether anything else could be reading
    /// concurrently.
    jit: Mutex<codegen::JitBackend>,
}

impl VirtualMachine {
    pub fn new(
        config: VmConfig,
        interner: Arc<ThreadedRodeo>,
        method_area: MethodArea,
        heap: Heap,
        native_registry: NativeRegistry,
        br: Arc<BootstrapRegistry>,
    ) -> Result<Self, JvmError> {
        Ok(Self {
            config,
            method_area: RwLock::new(method_area),
            heap: RwLock::new(heap),
            string_interner: interner,
            native_registry,
            br,
            materializer: materialize::Materializer::new(),
            jit: Mutex::new(codegen::JitBackend::new()?),
        })
    }

    pub fn br(&self) -> &BootstrapRegistry {
        &self.br
    }

    pub fn method_area_read(&self) -> RwLockReadGuard<'_, MethodArea> {
        self.method_area.read().unwrap()
    }

    pub fn method_area_write(&self) -> RwLockWriteGuard<'_, MethodArea> {
        self.method_area.write().unwrap()
    }

    pub fn heap_read(&self) -> RwLockReadGuard<'_, Heap> {
        self.heap.read().unwrap()
    }

    pub fn heap_write(&self) -> RwLockWriteGuard<'_, Heap> {
        self.heap.write().unwrap()
    }

    pub fn interner(&self) -> &ThreadedRodeo {
        &self.string_interner
    }

    pub fn jit_backend(&self) -> MutexGuard<'_, codegen::JitBackend> {
        self.jit.lock().unwrap()
    }

    /// Compiles `method_id` if it hasn't been already, installing the finalized
    /// address into `materializer.compiled` on success. A `None` (declined
    /// compilation, the supported-subset bail) or an `Err` both leave the method
    /// running in the interpreter tier - neither is a VM-level failure.
    pub fn tier_up(&self, method_id: MethodId) -> Result<(), JvmError> {
        if self.materializer.compiled.compiled_address(method_id).is_some() {
            return Ok(());
        }
        let mut backend = self.jit_backend();
        if let Some(addr) = codegen::compile_method(&mut backend, self, method_id)? {
            self.materializer.compiled.install(method_id, addr);
        }
        Ok(())
    }

    pub fn symbol_to_pretty_string(&self, sym: Symbol) -> String {
        self.string_interner.resolve(&sym).replace('/', ".")
    }

    pub fn pretty_method_not_found_message(&self, method_id: &MethodId) -> String {
        let ma = self.method_area_read();
        let method = ma.get_method(method_id);
        format!(
            "{}.{}",
            self.symbol_to_pretty_string(ma.get_class(&method.class_id()).get_name()),
            self.string_interner.resolve(&method.name())
        )
    }

    /// Turns a `JavaExceptionFromJvm` built deep inside some helper into a real
    /// `Throwable` instance on the heap, so interpreter and JIT frames unwind
    /// through ordinary Java exception-table dispatch rather than through
    /// a separate Rust-level error channel.
    pub fn map_rust_error_to_java_exception(
        &self,
        thread: &mut JavaThreadState,
        exception: JavaExceptionFromJvm,
    ) -> Result<HeapRef, JvmError> {
        let class_name = self.string_interner.get_or_intern(exception.kind.class_name());
        let class_id = self
            .method_area_write()
            .get_class_id_or_load(class_name, thread.id)?;
        crate::interpreter::Interpreter::ensure_initialized(thread, Some(class_id), self)?;

        let instance_size = self
            .method_area_read()
            .get_instance_class(&class_id)?
            .get_instance_size()?;
        let instance_ref = self.heap_write().alloc_instance(instance_size, class_id)?;

        let reference = exception.as_reference();
        let mut args = vec![vm::Value::Ref(instance_ref)];
        if let Some(message) = exception.message.clone() {
            let resolved = message.into_resolved(&self.string_interner);
            let message_ref = self.heap_write().alloc_string(&resolved)?;
            args.push(vm::Value::Ref(message_ref));
        }

        let ctor_key = crate::keys::MethodKey {
            name: self.string_interner.get_or_intern(reference.name),
            desc: self.string_interner.get_or_intern(reference.descriptor),
        };
        let ctor_id = self
            .method_area_read()
            .get_instance_class(&class_id)?
            .get_special_method_id(&ctor_key)?;
        crate::interpreter::Interpreter::invoke_instance_method(thread, ctor_id, self, args)?;

        Ok(instance_ref)
    }

    /// Symbol used by `VmConfig`'s `FieldKey`-based lookups during early bootstrap,
    /// before `BootstrapRegistry` has finished interning every field key it owns.
    pub fn field_key(&self, name: &str, desc: &str) -> FieldKey {
        FieldKey {
            name: self.string_interner.get_or_intern(name),
            desc: self.string_interner.get_or_intern(desc),
        }
    }
}

/// Boots a fresh VM from `config`: builds the method area and bootstrap registry,
/// sizes the heap off `java.lang.String`'s own layout, registers the native bridge,
/// runs `System.initPhase{1,2,3}` and finally invokes the main class's `main`.
///
/// Uncaught exceptions propagating out of `main` are printed (mirroring
/// `Throwable.printStackTrace`) and turned into a non-zero process exit rather than
/// a Rust panic, since reaching the top of the Java call stack with a live
/// exception is ordinary program termination, not a VM bug.
pub fn start(config: VmConfig) -> Result<(), JvmError> {
    let interner = Arc::new(ThreadedRodeo::new());
    let (mut method_area, br) = heap::method_area::MethodArea::init(&config, interner.clone())?;

    let bootstrap_thread = ThreadId::from_usize(1);
    let string_class_id = br.get_java_lang_string_id()?;
    let string_instance_size = method_area
        .get_instance_class(&string_class_id)?
        .get_instance_size()?;
    let char_array_sym = interner.get_or_intern("[C");
    let char_array_class_id = method_area.load_array_class(char_array_sym, bootstrap_thread)?;

    let heap = Heap::new(
        config.heap_size_mb,
        interner.clone(),
        string_class_id,
        string_instance_size,
        char_array_class_id,
    )?;

    let mut native_registry = native::NativeRegistry::new(interner.clone());
    native_registry.bootstrap();

    let vm = VirtualMachine::new(config, interner, method_area, heap, native_registry, br)?;
    let mut thread = JavaThreadState::new(bootstrap_thread);

    let system_class_id = vm
        .method_area_write()
        .get_class_id_or_load(vm.br.java_lang_system_sym, thread.id)?;
    crate::interpreter::Interpreter::ensure_initialized(&mut thread, Some(system_class_id), &vm)?;

    let phase1_id = vm
        .method_area_read()
        .get_static_method_id(&system_class_id, vm.br.system_init_phase1_mk)?;
    crate::interpreter::Interpreter::invoke_static_method(&mut thread, phase1_id, &vm, vec![])?;

    let phase2_id = vm
        .method_area_read()
        .get_static_method_id(&system_class_id, vm.br.system_init_phase2_mk)?;
    crate::interpreter::Interpreter::invoke_static_method(
        &mut thread,
        phase2_id,
        &vm,
        vec![vm::Value::Integer(1), vm::Value::Integer(1)],
    )?;

    let phase3_id = vm
        .method_area_read()
        .get_static_method_id(&system_class_id, vm.br.system_init_phase3_mk)?;
    crate::interpreter::Interpreter::invoke_static_method(&mut thread, phase3_id, &vm, vec![])?;

    let main_class_name = vm.string_interner.get_or_intern(&vm.config.main_class);
    let main_class_id = vm
        .method_area_write()
        .get_class_id_or_load(main_class_name, thread.id)?;
    crate::interpreter::Interpreter::ensure_initialized(&mut thread, Some(main_class_id), &vm)?;
    let main_method_id = vm
        .method_area_read()
        .get_static_method_id(&main_class_id, vm.br.main_mk)?;

    let args_array = vm
        .heap_write()
        .alloc_object_array(vm.br.get_java_lang_string_id()?, vm.config.main_args.len() as i32)?;
    for (idx, arg) in vm.config.main_args.iter().enumerate() {
        let arg_ref = vm.heap_write().alloc_string(arg)?;
        vm.heap_write()
            .write_array_element(args_array, idx as i32, vm::Value::Ref(arg_ref))?;
    }

    let result = crate::interpreter::Interpreter::invoke_static_method(
        &mut thread,
        main_method_id,
        &vm,
        vec![vm::Value::Ref(args_array)],
    );

    if let Err(JvmError::JavaExceptionThrown(exception_ref)) = result {
        let exception_class_id = vm.heap_read().get_class_id(exception_ref)?;
        let print_stack_trace_id = vm
            .method_area_read()
            .get_instance_class(&exception_class_id)?
            .get_vtable_method_id(&vm.br.print_stack_trace_mk)?;
        let _ = crate::interpreter::Interpreter::invoke_instance_method(
            &mut thread,
            print_stack_trace_id,
            &vm,
            vec![vm::Value::Ref(exception_ref)],
        );
        return Err(JvmError::JavaExceptionThrown(exception_ref));
    }
    result.map(|_| ())
}

/// Builds the bare `JvmError` value for a given exception shape, without wrapping it
/// in `Err(..)`. Used inside `.ok_or(..)` and as a plain match-arm value.
#[macro_export]
macro_rules! build_exception {
    ($kind:ident) => {
        $crate::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::new($crate::error::JavaExceptionKind::$kind),
        )
    };
    ($kind:ident, method_key: $mk:expr, class_sym: $cs:expr) => {
        $crate::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_method_not_found(
                $crate::error::JavaExceptionKind::$kind,
                $mk,
                $cs,
            ),
        )
    };
    ($kind:ident, pool_idx: $pi:expr, expected: $e:expr, actual: $a:expr) => {
        $crate::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_runtime_pool_incompatible_class_change(
                $crate::error::JavaExceptionKind::$kind,
                $pi,
                $e,
                $a,
            ),
        )
    };
    ($kind:ident, $fmt:literal $(, $arg:expr)+) => {
        $crate::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_message(
                $crate::error::JavaExceptionKind::$kind,
                format!($fmt $(, $arg)+),
            ),
        )
    };
    ($kind:ident, $msg:expr) => {
        $crate::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_message(
                $crate::error::JavaExceptionKind::$kind,
                $msg,
            ),
        )
    };
}

/// Same shapes as `build_exception!`, wrapped in `Err(..)` for use as a function
/// return value or with `?`.
#[macro_export]
macro_rules! throw_exception {
    ($($rest:tt)+) => {
        return Err($crate::build_exception!($($rest)+))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)+) => {
        tracing::debug!($($arg)+)
    };
}

#[macro_export]
macro_rules! debug_error_log {
    ($($arg:tt)+) => {
        tracing::error!($($arg)+)
    };
}

#[macro_export]
macro_rules! error_log_method {
    ($method_id:expr, $err:expr, $msg:expr) => {
        tracing::error!(method_id = ?$method_id, error = ?$err, $msg)
    };
}

/// Hook for per-instruction tracing; left as a no-op expansion since every call
/// site to it is currently commented out, but the `use` import still needs to
/// resolve against a real macro.
#[macro_export]
macro_rules! debug_log_instruction {
    ($instruction:expr, $thread:expr) => {
        tracing::trace!(instruction = ?$instruction, "executing")
    };
}
