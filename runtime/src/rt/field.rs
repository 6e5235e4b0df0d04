use crate::keys::{ClassId, FieldDescriptorId};
use crate::vm::Value;
use lagertha_classfile::flags::FieldFlags;
use std::sync::RwLock;

#[derive(Debug, Copy, Clone)]
pub struct InstanceField {
    pub flags: FieldFlags,
    pub descriptor_id: FieldDescriptorId,
    pub offset: usize,
    pub declaring_class: ClassId,
}

#[derive(Debug)]
pub struct StaticField {
    pub flags: FieldFlags,
    pub descriptor: FieldDescriptorId,
    pub value: RwLock<Value>,
}
