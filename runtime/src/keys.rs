//! Index newtypes and lookup keys shared across the method area, heap and codegen.
//!
//! Every table owned by `MethodArea` (classes, methods, field/method descriptors) is
//! addressed through one of these rather than a raw `usize`, so a `ClassId` can never be
//! used where a `MethodId` was meant and vice versa.

use std::fmt;
use std::num::NonZeroU32;

pub type Symbol = lasso::Spur;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn new(inner: NonZeroU32) -> Self {
                $name(inner)
            }

            pub fn into_inner(self) -> NonZeroU32 {
                self.0
            }

            /// `n` is the table length *after* pushing the new entry (1-based).
            pub fn from_usize(n: usize) -> Self {
                $name(NonZeroU32::new(n as u32).expect("index tables are 1-based"))
            }

            pub fn from_i32(v: i32) -> Self {
                $name(NonZeroU32::new(v as u32).expect("index tables are 1-based"))
            }

            pub fn to_index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            pub fn to_i32(self) -> i32 {
                self.0.get() as i32
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

index_id!(
    /// Index into `MethodArea::classes`.
    ClassId
);
index_id!(
    /// Index into `MethodArea::methods`.
    MethodId
);
index_id!(
    /// Index into `MethodArea::field_descriptors`.
    FieldDescriptorId
);
index_id!(
    /// Index into `MethodArea::method_descriptors`.
    MethodDescriptorId
);
index_id!(
    /// There is exactly one Java execution thread; this id
    /// still exists so thread-addressed data structures (frame stacks, OSR buffers)
    /// are keyed consistently and can grow a second thread later without a rewrite.
    ThreadId
);

/// Name + descriptor pair used to look up a field, independent of declaring class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub name: Symbol,
    pub desc: Symbol,
}

/// Name + descriptor pair used to look up a method, independent of declaring class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: Symbol,
    pub desc: Symbol,
}

/// A `MethodKey` plus the name of its declaring class; the unit mangling and
/// the native-method registry key off this triple rather than off `MethodId` because
/// native methods are registered before the owning class is ever loaded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedMethodKey {
    pub class: Option<Symbol>,
    pub method: Symbol,
    pub desc: Symbol,
}

impl FullyQualifiedMethodKey {
    pub fn new(class: Symbol, method: Symbol, desc: Symbol) -> Self {
        Self {
            class: Some(class),
            method,
            desc,
        }
    }

    pub fn new_with_str(
        class: &str,
        method: &str,
        desc: &str,
        interner: &lasso::ThreadedRodeo,
    ) -> Self {
        Self {
            class: Some(interner.get_or_intern(class)),
            method: interner.get_or_intern(method),
            desc: interner.get_or_intern(desc),
        }
    }
}
