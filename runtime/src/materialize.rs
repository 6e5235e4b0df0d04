//! Lazy materialization.
//!
//! Compiled code never holds a direct pointer to another method's code, a field's
//! byte offset, or a loaded class object - every cross-class reference JIT-compiled
//! code needs is instead a call to one of `crate::mangling`'s mangled stub symbols.
//! The first time such a call runs, the symbol is still `Undef`: the call
//! lands here, gets resolved against the method area exactly once, and the result is
//! cached in one of four namespaces so every later call through the same symbol is a
//! single indirect load:
//!
//! - `jit_cc_stubs` / `interp_cc_stubs`: per-tier trampolines installed for every
//!   concrete method at class-registration time (`MethodArea::register_materialization_stubs`).
//! - `class_and_method_objects`: `Class`/`Method` mirror loads and interned string
//!   globals.
//! - `jit_impl_details`: everything else a codegen-emitted call can reference -
//!   field access, method-resolution (virtual/interface) stubs, static/special calls.
//!
//! Compiling the target itself is `crate::codegen`'s job; this module only owns the
//! symbol table and the rule for *what* a given mangled name resolves to.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use lasso::ThreadedRodeo;

use crate::VirtualMachine;
use crate::error::JvmError;
use crate::keys::{ClassId, FieldKey, MethodId, MethodKey, Symbol};
use crate::mangling::{self, Demangled, MethodResolution};

/// What a resolved stub symbol actually points at. Field/static-field targets carry
/// enough to compute a concrete offset without re-walking the class hierarchy on
/// every subsequent call; method targets carry the resolved `MethodId` - whether
/// that method itself has been JIT-compiled yet is tracked separately by
/// `CompiledMethods`, since a method can be materialized (resolved) long before it
/// is ever hot enough to justify compiling.
#[derive(Debug, Clone, Copy)]
pub enum MaterializedTarget {
    Method(MethodId),
    InstanceField { class_id: ClassId, key: FieldKey },
    StaticField { class_id: ClassId, key: FieldKey },
    ClassObject(ClassId),
    /// The literal contents symbol; the caller interns/allocates the actual
    /// `java.lang.String` heap object (`Heap::get_str_from_pool_or_new`) since that
    /// needs heap access this table deliberately doesn't take a dependency on.
    StringConstant(Symbol),
}

/// Tracks which methods have actually been compiled, independent of whether their
/// call-site symbols have been resolved - resolution only needs a `MethodId`, tiering
/// decides separately whether that `MethodId` is worth compiling.
#[derive(Default)]
pub struct CompiledMethods {
    addresses: DashMap<MethodId, usize>,
    invocation_counts: DashMap<MethodId, AtomicU32>,
}

impl CompiledMethods {
    pub fn compiled_address(&self, method_id: MethodId) -> Option<usize> {
        self.addresses.get(&method_id).map(|a| *a)
    }

    pub fn install(&self, method_id: MethodId, address: usize) {
        self.addresses.insert(method_id, address);
    }

    /// Bumps the interpreter-invocation counter for `method_id` and reports whether
    /// it just crossed `threshold` - the caller (`crate::interpreter`) uses that to
    /// decide whether to hand the method to `crate::codegen` this call.
    pub fn note_invocation_and_check_tier_up(&self, method_id: MethodId, threshold: u32) -> bool {
        if self.addresses.contains_key(&method_id) {
            return false;
        }
        let counter = self
            .invocation_counts
            .entry(method_id)
            .or_insert_with(|| AtomicU32::new(0));
        let prev = counter.fetch_add(1, Ordering::Relaxed);
        prev + 1 == threshold
    }
}

/// The symbol table for lazily-materialized stubs, keyed by four namespaces.
/// Namespaces never collide with each other by construction: each
/// mangling function's output format is namespace-specific (see `crate::mangling`).
#[derive(Default)]
pub struct Materializer {
    jit_cc_stubs: DashMap<Symbol, MaterializedTarget>,
    interp_cc_stubs: DashMap<Symbol, MaterializedTarget>,
    class_and_method_objects: DashMap<Symbol, MaterializedTarget>,
    jit_impl_details: DashMap<Symbol, MaterializedTarget>,
    pub compiled: CompiledMethods,
}

impl Materializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains every stub symbol queued by `MethodArea::register_materialization_stubs`
    /// since the last call and installs them `Undef` in both per-tier call-stub
    /// namespaces - a freshly-loaded class's methods are callable from either tier
    /// before either tier has actually compiled them.
    pub fn install_pending_stubs(&self, vm: &VirtualMachine) {
        let pending = vm.method_area_write().take_pending_stub_symbols();
        for (method_id, symbol) in pending {
            self.jit_cc_stubs
                .entry(symbol)
                .or_insert(MaterializedTarget::Method(method_id));
            self.interp_cc_stubs
                .entry(symbol)
                .or_insert(MaterializedTarget::Method(method_id));
        }
    }

    fn table_for(&self, demangled: &Demangled) -> &DashMap<Symbol, MaterializedTarget> {
        match demangled {
            Demangled::LoadClassObject { .. }
            | Demangled::ClassObjectGlobal { .. }
            | Demangled::StringGlobal { .. } => &self.class_and_method_objects,
            _ => &self.jit_impl_details,
        }
    }

    /// The call-through resolver: resolves `symbol` against the method
    /// area on first call and caches the result, so every later call through the
    /// same symbol is a plain table lookup. A symbol absent from every namespace is
    /// implicitly `Undef`; inserting into one of them is the only state transition,
    /// and it only ever happens once per symbol.
    pub fn resolve(
        &self,
        vm: &VirtualMachine,
        caller_class: Option<ClassId>,
        symbol: Symbol,
    ) -> Result<MaterializedTarget, JvmError> {
        self.install_pending_stubs(vm);

        if let Some(target) = self.jit_cc_stubs.get(&symbol) {
            return Ok(*target);
        }
        if let Some(target) = self.interp_cc_stubs.get(&symbol) {
            return Ok(*target);
        }
        if let Some(target) = self.class_and_method_objects.get(&symbol) {
            return Ok(*target);
        }
        if let Some(target) = self.jit_impl_details.get(&symbol) {
            return Ok(*target);
        }

        let symbol_str = vm.interner().resolve(&symbol).to_string();
        let demangled = mangling::demangle_stub_symbol_name(&symbol_str).ok_or_else(|| {
            JvmError::Todo(format!(
                "materialize: symbol `{symbol_str}` is neither a registered stub nor a mangled name"
            ))
        })?;

        let target = self.resolve_demangled(vm, caller_class, &demangled)?;
        self.table_for(&demangled).insert(symbol, target);
        Ok(target)
    }

    fn resolve_demangled(
        &self,
        vm: &VirtualMachine,
        // Not yet needed: no symbol kind here re-checks caller identity beyond
        // `invokespecial`'s own ACC_SUPER rule, already enforced inside
        // `get_special_method_id`. Kept so a future symbol kind that does need it
        // (e.g. a `protected`-access check) doesn't require a signature change.
        _caller_class: Option<ClassId>,
        demangled: &Demangled,
    ) -> Result<MaterializedTarget, JvmError> {
        match demangled {
            Demangled::StaticCall {
                class_name,
                method_name,
                descriptor,
            } => {
                let key = intern_method_key(vm.interner(), method_name, descriptor);
                let class_id = load_class(vm, class_name)?;
                let method_id = vm
                    .method_area_read()
                    .get_static_method_id(&class_id, key)?;
                Ok(MaterializedTarget::Method(method_id))
            }
            Demangled::SpecialCall {
                class_name,
                method_name,
                descriptor,
                ..
            } => {
                let key = intern_method_key(vm.interner(), method_name, descriptor);
                let class_id = load_class(vm, class_name)?;
                let method_id = vm
                    .method_area_read()
                    .get_instance_class(&class_id)?
                    .get_special_method_id(&key)?;
                Ok(MaterializedTarget::Method(method_id))
            }
            // Virtual/interface resolution is against the *static* type
            // named in the symbol (the declared receiver type at the call site), not
            // against any particular runtime class. The actual indirect dispatch to
            // a specific override still has to re-check the live receiver's class at
            // the call site (codegen emits that check inline); what's cached here is
            // only that the declared signature resolves to a real, non-abstract
            // `MethodId` at all - equivalent to `crate::rt::class::InstanceClass::
            // get_vtable_method_id`/`get_interface_method_id`'s own lookup, just
            // memoized per static type instead of repeated on every call.
            Demangled::MethodResolutionCall {
                resolution,
                class_name,
                method_name,
                descriptor,
            } => {
                let key = intern_method_key(vm.interner(), method_name, descriptor);
                let class_id = load_class(vm, class_name)?;
                let ma = vm.method_area_read();
                let method_id = match resolution {
                    MethodResolution::Virtual => ma.get_instance_class(&class_id)?.get_vtable_method_id(&key)?,
                    MethodResolution::Interface => {
                        ma.get_instance_class(&class_id)?.get_interface_method_id(&key)?
                    }
                };
                Ok(MaterializedTarget::Method(method_id))
            }
            Demangled::FieldAccess {
                class_name,
                field_name,
                descriptor,
            } => {
                let key = FieldKey {
                    name: vm.interner().get_or_intern(field_name),
                    desc: vm.interner().get_or_intern(descriptor),
                };
                let class_id = load_class(vm, class_name)?;
                let ma = vm.method_area_read();
                if ma.get_instance_class(&class_id)?.get_instance_field(&key).is_ok() {
                    Ok(MaterializedTarget::InstanceField { class_id, key })
                } else {
                    let owner = ma.resolve_static_field_actual_class_id(class_id, &key)?;
                    Ok(MaterializedTarget::StaticField {
                        class_id: owner,
                        key,
                    })
                }
            }
            Demangled::LoadClassObject { descriptor } => {
                let class_id = load_class(vm, descriptor)?;
                Ok(MaterializedTarget::ClassObject(class_id))
            }
            Demangled::ClassObjectGlobal { descriptor } => {
                let class_id = load_class(vm, descriptor)?;
                Ok(MaterializedTarget::ClassObject(class_id))
            }
            Demangled::StringGlobal { contents } => {
                Ok(MaterializedTarget::StringConstant(vm.interner().get_or_intern(contents)))
            }
            // `&<direct-call>`: a raw reference to a method's identity rather than a
            // call through it - no vtable/itable indirection, same direct lookup
            // `invokespecial` uses (JVMS 5.4.3.5's "resolve like the static type"
            // half, without the ACC_SUPER re-check, since there is no caller to
            // re-check against for a bare global import).
            Demangled::MethodGlobal {
                class_name,
                method_name,
                descriptor,
            } => {
                let key = intern_method_key(vm.interner(), method_name, descriptor);
                let class_id = load_class(vm, class_name)?;
                let method_id = vm
                    .method_area_read()
                    .get_instance_class(&class_id)?
                    .get_special_method_id(&key)?;
                Ok(MaterializedTarget::Method(method_id))
            }
            // `<direct-call> '$' <offset>`: per spec §4.7/§4.12 this should compile a
            // fresh OSR-entry function for `method_id` at `offset` and cache its
            // address. `crate::codegen` only ever emits the whole-method entry form
            // (see its own module doc and DESIGN.md's component F/J entries for the
            // scope decision) - there is no OSR-entry generator to call into yet.
            // Failing loudly here rather than falling through to the generic
            // field-access branch (which would happily "resolve" e.g. `"(I)I"` as a
            // field descriptor) is the fix for the silent-misrouting bug this arm's
            // absence caused; the remaining gap - actually compiling an OSR entry -
            // is the disclosed one in DESIGN.md's "Known incompleteness" section.
            Demangled::OsrMethod {
                class_name,
                method_name,
                descriptor,
                offset,
            } => Err(JvmError::Todo(format!(
                "materialize: no OSR-entry generator for {class_name}.{method_name}:{descriptor}$\
                 {offset} - crate::codegen only emits whole-method entries"
            ))),
        }
    }

    pub fn mangle_osr_entry(
        &self,
        interner: &ThreadedRodeo,
        vm: &VirtualMachine,
        method_id: MethodId,
        bytecode_offset: u32,
    ) -> Symbol {
        let ma = vm.method_area_read();
        let method = ma.get_method(&method_id);
        let class_name = ma.get_class(&method.class_id()).get_name();
        mangling::mangle_osr_method(interner, class_name, method.name, method.desc, bytecode_offset)
    }
}

fn load_class(vm: &VirtualMachine, name: &str) -> Result<ClassId, JvmError> {
    let sym = vm.interner().get_or_intern(name);
    // There is exactly one Java thread in this build; materialization always
    // runs on it, so its `ThreadId` is whichever one is currently executing.
    vm.method_area_write()
        .get_class_id_or_load(sym, crate::keys::ThreadId::from_usize(1))
}

fn intern_method_key(interner: &ThreadedRodeo, name: &str, desc: &str) -> MethodKey {
    MethodKey {
        name: interner.get_or_intern(name),
        desc: interner.get_or_intern(desc),
    }
}
