//! Natives that are themselves invoked as a native method (a class's own
//! `registerNatives()`) and register a further batch of natives on first call,
//! rather than being wired up unconditionally at startup.

pub(super) mod java_lang_class;
pub(super) mod jdk_internal_misc_unsafe;
