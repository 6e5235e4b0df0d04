//! Natives wired up unconditionally at VM startup, before any class is loaded.

mod java_io;
mod java_lang;
mod java_lang_ref;

use crate::keys::FullyQualifiedMethodKey;
use crate::native::NativeRegistry;

/// Registers every preregistered native, plus the `registerNatives()` entry points
/// that themselves populate a further batch of natives the first time their
/// owning class initializes.
pub fn register_all(native_registry: &mut NativeRegistry) {
    java_io::do_register_java_io_preregistered_natives(native_registry);
    java_lang::do_register_java_lang_preregistered_natives(native_registry);
    java_lang_ref::do_register_java_lang_ref_preregistered_natives(native_registry);

    native_registry.register(
        FullyQualifiedMethodKey::new_with_str(
            "java/lang/Class",
            "registerNatives",
            "()V",
            &native_registry.string_interner,
        ),
        crate::native::registrable::java_lang_class::java_lang_class_register_natives,
    );
    native_registry.register(
        FullyQualifiedMethodKey::new_with_str(
            "jdk/internal/misc/Unsafe",
            "registerNatives",
            "()V",
            &native_registry.string_interner,
        ),
        crate::native::registrable::jdk_internal_misc_unsafe::jdk_internal_misc_unsafe_register_natives,
    );
}
