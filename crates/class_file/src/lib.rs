// https://docs.oracle.com/javase/specs/jvms/se7/html/jvms-4.html

mod access_flags;
pub mod attributes;
pub mod bytecode;
mod class_file;
pub mod class_loader;
#[macro_use]
pub mod constant_pool;
mod error;
pub mod jstring;
mod parser;

use std::fmt;

pub use self::class_file::{
    ClassFile, ClassHeader, FieldInfo, MemberInfo, MethodInfo, Visibility,
};
pub use access_flags::AccessFlags;
pub use attributes::{Attributes, TypedAttribute};
pub use class_loader::{ClassLoader, ClassPath, DefaultClassLoader};
pub use constant_pool::{ConstantPool, ConstantTag, CpInfo, IntType};
pub use error::ClassFileError;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// An attribute as stored in the class file. The body stays opaque until
/// [`Attribute::specialize`] is asked to decode it.
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
