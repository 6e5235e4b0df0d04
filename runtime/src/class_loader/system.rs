use crate::error::JvmError;
use crate::{debug_log, throw_exception};
use std::path::{Path, PathBuf};

/// Resolves classes against `-cp`-style directory entries, the way the system
/// class loader falls back to the classpath once the bootstrap loader's JImage
/// comes up empty.
pub struct SystemClassLoader {
    class_path: Vec<PathBuf>,
}

impl SystemClassLoader {
    pub fn new(class_path: &[PathBuf]) -> Result<Self, JvmError> {
        debug_log!("SystemClassLoader classpath entries: {:?}", class_path);
        Ok(Self {
            class_path: class_path.to_vec(),
        })
    }

    pub fn find_class(&self, name: &str) -> Result<Vec<u8>, JvmError> {
        let relative = format!("{name}.class");
        for entry in &self.class_path {
            let candidate = Self::resolve_within(entry, &relative);
            if let Ok(bytes) = std::fs::read(&candidate) {
                return Ok(bytes);
            }
        }
        throw_exception!(ClassNotFoundException, name.to_string())
    }

    fn resolve_within(root: &Path, relative: &str) -> PathBuf {
        root.join(relative)
    }
}
