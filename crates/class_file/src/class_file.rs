use std::{
    fs::File,
    io::{Cursor, Read},
    path::Path,
};

use crate::{
    attributes::{Attributes, CodeAttribute},
    class_loader::{ClassLoader, ClassPath},
    jstring,
    parser::Parser,
    AccessFlags, ClassFileError, ConstantPool, Result,
};

// Release names indexed by `major_version - 45`.
const VM_SPEC_VERSIONS: [&str; 7] = ["1.1", "1.2", "1.3", "1.4", "1.5", "6.0", "7.0"];
const OLDEST_MAJOR_VERSION: u16 = 45;

#[derive(Debug)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile> {
        Self::parse(Cursor::new(bytes))
    }

    pub fn from_file(file: File) -> Result<ClassFile> {
        Self::parse(file)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<ClassFile> {
        Self::from_file(File::open(path)?)
    }

    /// Loads a class by name through `loader`.
    ///
    /// A name ending in `.class` is treated as a file path and opened
    /// directly, anything else is looked up on `classpath`.
    pub fn load(name: &str, classpath: &ClassPath, loader: &dyn ClassLoader) -> Result<ClassFile> {
        if name.ends_with(".class") {
            log::trace!("Opening class file {}", name);
            return Self::open(name);
        }

        let bytes = loader
            .class_file(name, classpath)
            .ok_or_else(|| ClassFileError::ClassNotFound(name.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The class's own name, `java.lang.String` style.
    pub fn class_name(&self) -> Option<String> {
        self.constant_pool.class_name(self.this_class, true)
    }

    /// `None` for `java.lang.Object`, which has no super class.
    pub fn super_class_name(&self) -> Option<String> {
        if self.super_class == 0 {
            return None;
        }
        self.constant_pool.class_name(self.super_class, true)
    }

    pub fn package_name(&self) -> Option<String> {
        jstring::package_from_class_name(&self.class_name()?)
    }

    pub fn sourcefile_name(&self) -> Option<String> {
        let source_file = self.attributes.source_file_attribute(&self.constant_pool)?;
        self.constant_pool.utf8(source_file.sourcefile_index)
    }

    /// Names of the directly implemented interfaces. Unresolvable indices
    /// are skipped.
    pub fn interface_names(&self) -> Vec<String> {
        self.interfaces
            .iter()
            .filter_map(|index| self.constant_pool.class_name(*index, true))
            .collect()
    }

    /// The platform release that introduced `major_version`, `"ancient"`
    /// below the oldest and `"unknown"` past the newest known version.
    pub fn vm_spec_string(&self) -> &'static str {
        if self.major_version < OLDEST_MAJOR_VERSION {
            return "ancient";
        }

        VM_SPEC_VERSIONS
            .get((self.major_version - OLDEST_MAJOR_VERSION) as usize)
            .copied()
            .unwrap_or("unknown")
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| {
            m.name(&self.constant_pool).as_deref() == Some(name)
                && m.descriptor(&self.constant_pool).as_deref() == Some(descriptor)
        })
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.name(&self.constant_pool).as_deref() == Some(name))
    }
}

/// Everything a class file holds before its interfaces.
#[derive(Debug)]
pub struct ClassHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
}
impl ClassHeader {
    pub fn class_name(&self) -> Option<String> {
        self.constant_pool.class_name(self.this_class, true)
    }
}

/// How much of a class a member listing should reveal. Each level shows
/// everything the previous one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Package,
    Protected,
    Private,
    Synthetic,
}

/// A field or method; both share the same record layout.
#[derive(Debug)]
pub struct MemberInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
pub type FieldInfo = MemberInfo;
pub type MethodInfo = MemberInfo;

impl MemberInfo {
    pub fn name(&self, constant_pool: &ConstantPool) -> Option<String> {
        constant_pool.utf8(self.name_index)
    }

    pub fn descriptor(&self, constant_pool: &ConstantPool) -> Option<String> {
        constant_pool.utf8(self.descriptor_index)
    }

    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Option<CodeAttribute> {
        self.attributes.code_attribute(constant_pool)
    }

    pub fn is_synthetic(&self, constant_pool: &ConstantPool) -> bool {
        self.attributes
            .find_by_name("Synthetic", constant_pool)
            .is_some()
    }

    pub fn is_visible(&self, visibility: Visibility, constant_pool: &ConstantPool) -> bool {
        if visibility < Visibility::Synthetic && self.is_synthetic(constant_pool) {
            return false;
        }
        if visibility < Visibility::Private && self.access_flags.contains(AccessFlags::PRIVATE) {
            return false;
        }
        if visibility < Visibility::Protected && self.access_flags.contains(AccessFlags::PROTECTED)
        {
            return false;
        }
        visibility != Visibility::Public || self.access_flags.contains(AccessFlags::PUBLIC)
    }
}
