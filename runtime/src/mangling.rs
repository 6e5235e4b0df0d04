//! Symbolic names used for lazily-materialized call targets.
//!
//! The compiler (`codegen`) never emits a direct pointer to a method's compiled code;
//! it instead emits a call to one of these mangled symbols and leaves resolving that
//! symbol to the materialization pipeline. A method-resolution call mangles the
//! resolution kind into the name so the JIT layer can tell, from the symbol alone,
//! whether to do virtual dispatch, interface dispatch, or a direct unresolved call -
//! without threading extra side-channel metadata through Cranelift IR.

use crate::keys::Symbol;
use lasso::ThreadedRodeo;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MethodResolution {
    /// JVMS 5.4.3.3 Method Resolution.
    Virtual,
    /// JVMS 5.4.3.4 Interface Method Resolution.
    Interface,
}

fn direct_call_string(interner: &ThreadedRodeo, class_name: Symbol, method_name: Symbol, desc: Symbol) -> String {
    format!(
        "{}.{}:{}",
        interner.resolve(&class_name),
        interner.resolve(&method_name),
        interner.resolve(&desc)
    )
}

/// `<class-name> '.' <method-name> ':' <descriptor>`
pub fn mangle_direct_method_call(
    interner: &ThreadedRodeo,
    class_name: Symbol,
    method_name: Symbol,
    desc: Symbol,
) -> Symbol {
    let s = direct_call_string(interner, class_name, method_name, desc);
    interner.get_or_intern(s)
}

/// `<direct-call> '$' <offset>`, a re-entry point used for on-stack replacement
/// from the interpreter into JIT code.
pub fn mangle_osr_method(
    interner: &ThreadedRodeo,
    class_name: Symbol,
    method_name: Symbol,
    desc: Symbol,
    offset: u32,
) -> Symbol {
    let s = format!(
        "{}${}",
        direct_call_string(interner, class_name, method_name, desc),
        offset
    );
    interner.get_or_intern(s)
}

/// `<class-name> '.' <field-name> ':' <descriptor>`
pub fn mangle_field_access(interner: &ThreadedRodeo, class_name: Symbol, field_name: Symbol, desc: Symbol) -> Symbol {
    let s = format!(
        "{}.{}:{}",
        interner.resolve(&class_name),
        interner.resolve(&field_name),
        interner.resolve(&desc)
    );
    interner.get_or_intern(s)
}

/// `('Virtual Call to ' | 'Interface Call to ') <direct-call>`
pub fn mangle_method_resolution_call(
    interner: &ThreadedRodeo,
    resolution: MethodResolution,
    class_name: Symbol,
    method_name: Symbol,
    desc: Symbol,
) -> Symbol {
    let prefix = match resolution {
        MethodResolution::Virtual => "Virtual Call to ",
        MethodResolution::Interface => "Interface Call to ",
    };
    let s = format!(
        "{prefix}{}",
        direct_call_string(interner, class_name, method_name, desc)
    );
    interner.get_or_intern(s)
}

/// `'Special Call to ' <direct-call> [':from ' <descriptor>]`. `caller_class` is set
/// to the calling class's own name when that class file has `ACC_SUPER` set, which is
/// what makes `invokespecial` on a superclass method re-check the caller's identity
/// (JVMS 5.4.3.5).
pub fn mangle_special_method_call(
    interner: &ThreadedRodeo,
    class_name: Symbol,
    method_name: Symbol,
    desc: Symbol,
    caller_class: Option<Symbol>,
) -> Symbol {
    let mut s = format!(
        "Special Call to {}",
        direct_call_string(interner, class_name, method_name, desc)
    );
    if let Some(caller) = caller_class {
        s.push_str(":from ");
        s.push_str(interner.resolve(&caller));
    }
    interner.get_or_intern(s)
}

/// `'Static Call to ' <direct-call>`
pub fn mangle_static_call(interner: &ThreadedRodeo, class_name: Symbol, method_name: Symbol, desc: Symbol) -> Symbol {
    let s = format!(
        "Static Call to {}",
        direct_call_string(interner, class_name, method_name, desc)
    );
    interner.get_or_intern(s)
}

/// `'Load ' <descriptor>`: a call target returning a loaded class object.
pub fn mangle_class_object_access(interner: &ThreadedRodeo, class_desc: Symbol) -> Symbol {
    let s = format!("Load {}", interner.resolve(&class_desc));
    interner.get_or_intern(s)
}

/// `<descriptor>`: global importing a class object.
pub fn mangle_class_object_global(class_desc: Symbol) -> Symbol {
    class_desc
}

/// `'&' <direct-call>`: global importing a method.
pub fn mangle_method_global(interner: &ThreadedRodeo, class_name: Symbol, method_name: Symbol, desc: Symbol) -> Symbol {
    let s = format!("&{}", direct_call_string(interner, class_name, method_name, desc));
    interner.get_or_intern(s)
}

/// `'\'' <string-contents>`: global interned string.
pub fn mangle_string_global(interner: &ThreadedRodeo, contents: &str) -> Symbol {
    interner.get_or_intern(format!("'{contents}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demangled {
    FieldAccess {
        class_name: String,
        field_name: String,
        descriptor: String,
    },
    MethodResolutionCall {
        resolution: MethodResolution,
        class_name: String,
        method_name: String,
        descriptor: String,
    },
    StaticCall {
        class_name: String,
        method_name: String,
        descriptor: String,
    },
    SpecialCall {
        class_name: String,
        method_name: String,
        descriptor: String,
        caller_class: Option<String>,
    },
    LoadClassObject {
        descriptor: String,
    },
    ClassObjectGlobal {
        descriptor: String,
    },
    MethodGlobal {
        class_name: String,
        method_name: String,
        descriptor: String,
    },
    OsrMethod {
        class_name: String,
        method_name: String,
        descriptor: String,
        offset: u32,
    },
    StringGlobal {
        contents: String,
    },
}

fn split_direct_call(s: &str) -> Option<(&str, &str, &str)> {
    let (class_name, rest) = s.rsplit_once('.')?;
    let (method_name, descriptor) = rest.split_once(':')?;
    Some((class_name, method_name, descriptor))
}

/// Mirrors `demangleStubSymbolName`; returns `None` for anything that isn't the
/// output of one of the `mangle_*` functions above (in particular, for a bare
/// direct-call symbol, which is intentionally not demangled here).
pub fn demangle_stub_symbol_name(symbol: &str) -> Option<Demangled> {
    if let Some(contents) = symbol.strip_prefix('\'') {
        return Some(Demangled::StringGlobal {
            contents: contents.to_string(),
        });
    }
    if let Some(rest) = symbol.strip_prefix('&') {
        let (class_name, method_name, descriptor) = split_direct_call(rest)?;
        return Some(Demangled::MethodGlobal {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }
    // `<direct-call> '$' <offset>`: must be checked before the generic field-access
    // fallback below, since `$` never appears in a field descriptor and an OSR
    // symbol otherwise has the same `<class>.<name>:<descriptor>` shape a field
    // access does.
    if let Some((direct, offset_str)) = symbol.rsplit_once('$') {
        if let Ok(offset) = offset_str.parse::<u32>() {
            if let Some((class_name, method_name, descriptor)) = split_direct_call(direct) {
                return Some(Demangled::OsrMethod {
                    class_name: class_name.to_string(),
                    method_name: method_name.to_string(),
                    descriptor: descriptor.to_string(),
                    offset,
                });
            }
        }
    }
    if let Some(rest) = symbol.strip_prefix("Virtual Call to ") {
        let (class_name, method_name, descriptor) = split_direct_call(rest)?;
        return Some(Demangled::MethodResolutionCall {
            resolution: MethodResolution::Virtual,
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }
    if let Some(rest) = symbol.strip_prefix("Interface Call to ") {
        let (class_name, method_name, descriptor) = split_direct_call(rest)?;
        return Some(Demangled::MethodResolutionCall {
            resolution: MethodResolution::Interface,
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }
    if let Some(rest) = symbol.strip_prefix("Static Call to ") {
        let (class_name, method_name, descriptor) = split_direct_call(rest)?;
        return Some(Demangled::StaticCall {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }
    if let Some(rest) = symbol.strip_prefix("Special Call to ") {
        let (direct, caller_class) = match rest.split_once(":from ") {
            Some((direct, caller)) => (direct, Some(caller.to_string())),
            None => (rest, None),
        };
        let (class_name, method_name, descriptor) = split_direct_call(direct)?;
        return Some(Demangled::SpecialCall {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            descriptor: descriptor.to_string(),
            caller_class,
        });
    }
    if let Some(descriptor) = symbol.strip_prefix("Load ") {
        return Some(Demangled::LoadClassObject {
            descriptor: descriptor.to_string(),
        });
    }
    if symbol.starts_with('(') || symbol.starts_with(['L', '[']) || symbol.len() == 1 {
        // Bare field-descriptor syntax used by `mangle_class_object_global`.
        return Some(Demangled::ClassObjectGlobal {
            descriptor: symbol.to_string(),
        });
    }
    if let Some((class_name, field_name, descriptor)) = symbol
        .rsplit_once('.')
        .and_then(|(c, rest)| rest.split_once(':').map(|(f, d)| (c, f, d)))
    {
        return Some(Demangled::FieldAccess {
            class_name: class_name.to_string(),
            field_name: field_name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interner() -> ThreadedRodeo {
        ThreadedRodeo::default()
    }

    #[test]
    fn direct_method_call_round_trips_through_static_call() {
        let rodeo = interner();
        let class = rodeo.get_or_intern("java/lang/Object");
        let method = rodeo.get_or_intern("hashCode");
        let desc = rodeo.get_or_intern("()I");
        let mangled = mangle_static_call(&rodeo, class, method, desc);
        let resolved = rodeo.resolve(&mangled);
        assert_eq!(resolved, "Static Call to java/lang/Object.hashCode:()I");
        match demangle_stub_symbol_name(resolved) {
            Some(Demangled::StaticCall {
                class_name,
                method_name,
                descriptor,
            }) => {
                assert_eq!(class_name, "java/lang/Object");
                assert_eq!(method_name, "hashCode");
                assert_eq!(descriptor, "()I");
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }
    }

    #[test]
    fn special_call_carries_optional_caller_class() {
        let rodeo = interner();
        let class = rodeo.get_or_intern("java/lang/Object");
        let method = rodeo.get_or_intern("<init>");
        let desc = rodeo.get_or_intern("()V");
        let caller = rodeo.get_or_intern("java/lang/String");
        let mangled = mangle_special_method_call(&rodeo, class, method, desc, Some(caller));
        let resolved = rodeo.resolve(&mangled);
        match demangle_stub_symbol_name(resolved) {
            Some(Demangled::SpecialCall { caller_class, .. }) => {
                assert_eq!(caller_class.as_deref(), Some("java/lang/String"));
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }
    }

    #[test]
    fn virtual_and_interface_calls_demangle_with_distinct_resolution() {
        let rodeo = interner();
        let class = rodeo.get_or_intern("java/lang/Object");
        let method = rodeo.get_or_intern("toString");
        let desc = rodeo.get_or_intern("()Ljava/lang/String;");

        let virtual_mangled = mangle_method_resolution_call(&rodeo, MethodResolution::Virtual, class, method, desc);
        let virtual_resolved = rodeo.resolve(&virtual_mangled);
        assert_eq!(virtual_resolved, "Virtual Call to java/lang/Object.toString:()Ljava/lang/String;");
        match demangle_stub_symbol_name(virtual_resolved) {
            Some(Demangled::MethodResolutionCall { resolution, .. }) => {
                assert_eq!(resolution, MethodResolution::Virtual);
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }

        let iface_mangled = mangle_method_resolution_call(&rodeo, MethodResolution::Interface, class, method, desc);
        let iface_resolved = rodeo.resolve(&iface_mangled);
        assert_eq!(iface_resolved, "Interface Call to java/lang/Object.toString:()Ljava/lang/String;");
        match demangle_stub_symbol_name(iface_resolved) {
            Some(Demangled::MethodResolutionCall { resolution, .. }) => {
                assert_eq!(resolution, MethodResolution::Interface);
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }
    }

    #[test]
    fn class_object_access_and_global_use_distinct_grammar() {
        let rodeo = interner();
        let desc = rodeo.get_or_intern("Ljava/lang/String;");

        let access = mangle_class_object_access(&rodeo, desc);
        assert_eq!(rodeo.resolve(&access), "Load Ljava/lang/String;");
        assert_eq!(
            demangle_stub_symbol_name(rodeo.resolve(&access)),
            Some(Demangled::LoadClassObject {
                descriptor: "Ljava/lang/String;".to_string()
            })
        );

        let global = mangle_class_object_global(desc);
        assert_eq!(rodeo.resolve(&global), "Ljava/lang/String;");
        assert_eq!(
            demangle_stub_symbol_name(rodeo.resolve(&global)),
            Some(Demangled::ClassObjectGlobal {
                descriptor: "Ljava/lang/String;".to_string()
            })
        );
    }

    #[test]
    fn osr_method_appends_dollar_offset_to_direct_call() {
        let rodeo = interner();
        let class = rodeo.get_or_intern("Loop");
        let method = rodeo.get_or_intern("run");
        let desc = rodeo.get_or_intern("(I)I");
        let mangled = mangle_osr_method(&rodeo, class, method, desc, 42);
        let resolved = rodeo.resolve(&mangled);
        assert_eq!(resolved, "Loop.run:(I)I$42");
        match demangle_stub_symbol_name(resolved) {
            Some(Demangled::OsrMethod {
                class_name,
                method_name,
                descriptor,
                offset,
            }) => {
                assert_eq!(class_name, "Loop");
                assert_eq!(method_name, "run");
                assert_eq!(descriptor, "(I)I");
                assert_eq!(offset, 42);
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }
    }

    #[test]
    fn method_global_demangles_distinctly_from_field_access() {
        let rodeo = interner();
        let class = rodeo.get_or_intern("java/lang/Object");
        let method = rodeo.get_or_intern("hashCode");
        let desc = rodeo.get_or_intern("()I");
        let mangled = mangle_method_global(&rodeo, class, method, desc);
        let resolved = rodeo.resolve(&mangled);
        assert_eq!(resolved, "&java/lang/Object.hashCode:()I");
        match demangle_stub_symbol_name(resolved) {
            Some(Demangled::MethodGlobal {
                class_name,
                method_name,
                descriptor,
            }) => {
                assert_eq!(class_name, "java/lang/Object");
                assert_eq!(method_name, "hashCode");
                assert_eq!(descriptor, "()I");
            }
            other => panic!("unexpected demangle result: {other:?}"),
        }
    }

    #[test]
    fn string_global_keeps_contents_verbatim() {
        let rodeo = interner();
        let mangled = mangle_string_global(&rodeo, "hello");
        let resolved = rodeo.resolve(&mangled);
        assert_eq!(resolved, "'hello");
        assert_eq!(
            demangle_stub_symbol_name(resolved),
            Some(Demangled::StringGlobal {
                contents: "hello".to_string()
            })
        );
    }
}
