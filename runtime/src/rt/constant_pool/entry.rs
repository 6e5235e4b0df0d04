//! Lazily-resolved views over raw constant pool entries.
//!
//! Each `*Entry` mirrors the raw indices stored in the classfile's constant pool;
//! resolving one to symbols (interning its UTF-8 strings, chasing `NameAndType`
//! indirections) happens once and is cached in a `OnceCell` so repeated bytecode
//! references to the same pool slot don't re-resolve it.

use crate::keys::{FieldKey, MethodKey, Symbol};
use std::cell::OnceCell;

pub struct Utf8Entry {
    pub value: String,
    pub utf8_sym: OnceCell<Symbol>,
}

impl Utf8Entry {
    pub fn new(value: String) -> Self {
        Self {
            value,
            utf8_sym: OnceCell::new(),
        }
    }
}

pub struct ClassEntry {
    pub name_idx: u16,
    pub name_sym: OnceCell<Symbol>,
}

impl ClassEntry {
    pub fn new(name_idx: u16) -> Self {
        Self {
            name_idx,
            name_sym: OnceCell::new(),
        }
    }
}

pub struct StringEntry {
    pub string_idx: u16,
    pub string_sym: OnceCell<Symbol>,
}

impl StringEntry {
    pub fn new(string_idx: u16) -> Self {
        Self {
            string_idx,
            string_sym: OnceCell::new(),
        }
    }
}

pub struct NameAndTypeEntry {
    pub name_idx: u16,
    pub descriptor_idx: u16,
    pub name_sym: OnceCell<Symbol>,
    pub descriptor_sym: OnceCell<Symbol>,
}

impl NameAndTypeEntry {
    pub fn new(name_idx: u16, descriptor_idx: u16) -> Self {
        Self {
            name_idx,
            descriptor_idx,
            name_sym: OnceCell::new(),
            descriptor_sym: OnceCell::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NameAndTypeEntryView {
    pub name_sym: Symbol,
    pub descriptor_sym: Symbol,
}

impl NameAndTypeEntryView {
    pub fn new(name_sym: Symbol, descriptor_sym: Symbol) -> Self {
        Self {
            name_sym,
            descriptor_sym,
        }
    }
}

impl From<NameAndTypeEntryView> for FieldKey {
    fn from(view: NameAndTypeEntryView) -> Self {
        FieldKey {
            name: view.name_sym,
            desc: view.descriptor_sym,
        }
    }
}

impl From<NameAndTypeEntryView> for MethodKey {
    fn from(view: NameAndTypeEntryView) -> Self {
        MethodKey {
            name: view.name_sym,
            desc: view.descriptor_sym,
        }
    }
}

pub struct MethodEntry {
    pub class_idx: u16,
    pub nat_idx: u16,
    pub class_sym: OnceCell<Symbol>,
}

impl MethodEntry {
    pub fn new(class_idx: u16, nat_idx: u16) -> Self {
        Self {
            class_idx,
            nat_idx,
            class_sym: OnceCell::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MethodEntryView {
    pub class_sym: Symbol,
    pub name_and_type: NameAndTypeEntryView,
}

impl MethodEntryView {
    pub fn new(class_sym: Symbol, name_and_type: NameAndTypeEntryView) -> Self {
        Self {
            class_sym,
            name_and_type,
        }
    }
}

pub struct FieldEntry {
    pub class_idx: u16,
    pub nat_idx: u16,
    pub class_sym: OnceCell<Symbol>,
}

impl FieldEntry {
    pub fn new(class_idx: u16, nat_idx: u16) -> Self {
        Self {
            class_idx,
            nat_idx,
            class_sym: OnceCell::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldEntryView {
    pub class_sym: Symbol,
    pub name_and_type: NameAndTypeEntryView,
}

impl FieldEntryView {
    pub fn new(class_sym: Symbol, name_and_type: NameAndTypeEntryView) -> Self {
        Self {
            class_sym,
            name_and_type,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MethodHandleEntryView {
    GetField(FieldEntryView),
    GetStatic(FieldEntryView),
    PutField(FieldEntryView),
    PutStatic(FieldEntryView),
    InvokeVirtual(MethodEntryView),
    InvokeStatic(MethodEntryView),
    InvokeSpecial(MethodEntryView),
    NewInvokeSpecial(MethodEntryView),
    InvokeInterface(MethodEntryView),
}

pub struct InvokeDynamicEntry {
    pub bootstrap_idx: u16,
    pub nat_idx: u16,
}

impl InvokeDynamicEntry {
    pub fn new(bootstrap_idx: u16, nat_idx: u16) -> Self {
        Self {
            bootstrap_idx,
            nat_idx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeDynamicEntryView {
    pub method_handle: MethodHandleEntryView,
    pub bootstrap_arguments: Vec<u16>,
    pub nat: NameAndTypeEntryView,
}

impl InvokeDynamicEntryView {
    pub fn new(
        method_handle: MethodHandleEntryView,
        bootstrap_arguments: Vec<u16>,
        nat: NameAndTypeEntryView,
    ) -> Self {
        Self {
            method_handle,
            bootstrap_arguments,
            nat,
        }
    }
}
