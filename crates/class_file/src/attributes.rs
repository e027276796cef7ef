use std::io::Cursor;

use crate::{constant_pool::CpInfo, jstring, AccessFlags, Attribute, Result};

use super::{parser::Parser, ConstantPool};

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0.iter().find(|a| a.has_name(name, constant_pool))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the first Code attribute. Missing or malformed code is `None`.
    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Option<CodeAttribute> {
        Parser::new(Cursor::new(&self.find_by_name("Code", constant_pool)?.info))
            .parse_code_attribute()
            .ok()
    }

    pub fn source_file_attribute(&self, constant_pool: &ConstantPool) -> Option<SourceFileAttribute> {
        Parser::new(Cursor::new(&self.find_by_name("SourceFile", constant_pool)?.info))
            .parse_source_file_attribute()
            .ok()
    }
}

impl Attribute {
    /// The attribute's name, if its name index points at a Utf8 entry.
    pub fn name(&self, constant_pool: &ConstantPool) -> Option<String> {
        constant_pool.utf8(self.attribute_name_index)
    }

    pub fn has_name(&self, name: &str, constant_pool: &ConstantPool) -> bool {
        match constant_pool.get(self.attribute_name_index) {
            Some(CpInfo::Utf8(bytes)) => jstring::decode_modified_utf8(bytes) == name,
            _ => false,
        }
    }

    /// Decodes the raw bytes according to the attribute's name.
    ///
    /// Names this reader does not know come back as
    /// [`TypedAttribute::Unknown`]. The raw bytes are left untouched, so an
    /// attribute can be specialized any number of times.
    pub fn specialize(&self, constant_pool: &ConstantPool) -> Result<TypedAttribute> {
        let Some(name) = self.name(constant_pool) else {
            return Ok(TypedAttribute::Unknown);
        };

        let mut parser = Parser::new(Cursor::new(&self.info));
        Ok(match name.as_str() {
            "ConstantValue" => TypedAttribute::ConstantValue(parser.parse_constant_value_attribute()?),
            "SourceFile" => TypedAttribute::SourceFile(parser.parse_source_file_attribute()?),
            "Exceptions" => TypedAttribute::Exceptions(parser.parse_exceptions_attribute()?),
            "InnerClasses" => TypedAttribute::InnerClasses(parser.parse_inner_classes_attribute()?),
            "Code" => TypedAttribute::Code(parser.parse_code_attribute()?),
            "LineNumberTable" => {
                TypedAttribute::LineNumberTable(parser.parse_line_number_table_attribute()?)
            }
            "LocalVariableTable" => {
                TypedAttribute::LocalVariableTable(parser.parse_local_variable_table_attribute()?)
            }
            "Synthetic" => TypedAttribute::Synthetic,
            "Deprecated" => TypedAttribute::Deprecated,
            _ => TypedAttribute::Unknown,
        })
    }
}

#[derive(Debug)]
pub enum TypedAttribute {
    ConstantValue(ConstantValueAttribute),
    SourceFile(SourceFileAttribute),
    Exceptions(ExceptionsAttribute),
    InnerClasses(InnerClassesAttribute),
    Code(CodeAttribute),
    LineNumberTable(LineNumberTableAttribute),
    LocalVariableTable(LocalVariableTableAttribute),
    Synthetic,
    Deprecated,
    Unknown,
}

#[derive(Debug, PartialEq)]
pub struct ConstantValueAttribute {
    pub constant_value_index: u16,
}

#[derive(Debug, PartialEq)]
pub struct SourceFileAttribute {
    pub sourcefile_index: u16,
}

#[derive(Debug, PartialEq)]
pub struct ExceptionsAttribute {
    pub exception_index_table: Vec<u16>,
}
impl ExceptionsAttribute {
    /// Names of the declared exceptions; unresolvable entries are skipped.
    pub fn exception_names(&self, constant_pool: &ConstantPool) -> Vec<String> {
        self.exception_index_table
            .iter()
            .filter_map(|index| constant_pool.class_name(*index, false))
            .collect()
    }
}

#[derive(Debug, PartialEq)]
pub struct InnerClassInfo {
    pub inner_class_info_index: u16,
    // 0 for local and anonymous classes
    pub outer_class_info_index: u16,
    // 0 for anonymous classes
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Debug, PartialEq)]
pub struct InnerClassesAttribute {
    pub classes: Vec<InnerClassInfo>,
}

#[derive(Debug, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    // 0 catches everything (finally)
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    pub fn line_number_table(&self, constant_pool: &ConstantPool) -> Option<LineNumberTableAttribute> {
        Parser::new(Cursor::new(
            &self.attributes.find_by_name("LineNumberTable", constant_pool)?.info,
        ))
        .parse_line_number_table_attribute()
        .ok()
    }

    pub fn local_variable_table(
        &self,
        constant_pool: &ConstantPool,
    ) -> Option<LocalVariableTableAttribute> {
        Parser::new(Cursor::new(
            &self
                .attributes
                .find_by_name("LocalVariableTable", constant_pool)?
                .info,
        ))
        .parse_local_variable_table_attribute()
        .ok()
    }
}

#[derive(Debug, PartialEq)]
pub struct LineNumberInfo {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, PartialEq)]
pub struct LineNumberTableAttribute {
    pub line_number_table: Vec<LineNumberInfo>,
}
impl LineNumberTableAttribute {
    /// The source line of the instruction at `pc`, if the table covers it.
    pub fn line_at(&self, pc: u16) -> Option<u16> {
        self.line_number_table
            .iter()
            .filter(|info| info.start_pc <= pc)
            .max_by_key(|info| info.start_pc)
            .map(|info| info.line_number)
    }
}

#[derive(Debug, PartialEq)]
pub struct LocalVariableInfo {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, PartialEq)]
pub struct LocalVariableTableAttribute {
    pub local_variable_table: Vec<LocalVariableInfo>,
}
impl LocalVariableTableAttribute {
    /// Finds the variable occupying `slot` while `pc` is in its scope.
    pub fn variable_at(&self, slot: u16, pc: u16) -> Option<&LocalVariableInfo> {
        self.local_variable_table.iter().find(|info| {
            info.index == slot
                && info.start_pc <= pc
                && (pc as u32) < info.start_pc as u32 + info.length as u32
        })
    }
}

#[cfg(test)]
mod specialize_tests {
    use crate::constant_pool::ConstantPool;

    use super::*;

    fn pool() -> ConstantPool {
        let names = [
            "ConstantValue",
            "SourceFile",
            "Exceptions",
            "InnerClasses",
            "Code",
            "LineNumberTable",
            "LocalVariableTable",
            "Synthetic",
            "RuntimeVisibleAnnotations",
            "java/io/IOException",
        ];
        let mut cp_infos: Vec<CpInfo> = names
            .iter()
            .map(|n| CpInfo::Utf8(n.as_bytes().to_vec()))
            .collect();
        // 11: Class java/io/IOException
        cp_infos.push(CpInfo::Class(crate::constant_pool::ClassInfo { name_index: 10 }));
        ConstantPool::new(cp_infos)
    }

    fn attribute(attribute_name_index: u16, info: &[u8]) -> Attribute {
        Attribute {
            attribute_name_index,
            info: info.to_vec(),
        }
    }

    #[test]
    fn it_should_specialize_a_constant_value() {
        let typed = attribute(1, &[0x00, 0x07]).specialize(&pool()).unwrap();
        assert!(matches!(
            typed,
            TypedAttribute::ConstantValue(ConstantValueAttribute {
                constant_value_index: 7
            })
        ));
    }

    #[test]
    fn it_should_specialize_exceptions() {
        let cp = pool();
        let TypedAttribute::Exceptions(exceptions) = attribute(3, &[0x00, 0x01, 0x00, 0x0b])
            .specialize(&cp)
            .unwrap()
        else {
            panic!("expected Exceptions");
        };
        assert_eq!(exceptions.exception_index_table, vec![11]);
        assert_eq!(exceptions.exception_names(&cp), vec!["java.io.IOException"]);
    }

    #[test]
    fn it_should_specialize_inner_classes() {
        #[rustfmt::skip]
        let info = [
            0x00, 0x01,
            0x00, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x19,
        ];
        let TypedAttribute::InnerClasses(inner) = attribute(4, &info).specialize(&pool()).unwrap()
        else {
            panic!("expected InnerClasses");
        };
        assert_eq!(
            inner.classes,
            vec![InnerClassInfo {
                inner_class_info_index: 11,
                outer_class_info_index: 0,
                inner_name_index: 0,
                inner_class_access_flags: AccessFlags::PUBLIC
                    | AccessFlags::STATIC
                    | AccessFlags::FINAL,
            }]
        );
    }

    #[test]
    fn it_should_specialize_line_and_variable_tables() {
        let lines = attribute(6, &[0x00, 0x02, 0x00, 0x00, 0x00, 0x0a, 0x00, 0x04, 0x00, 0x0b])
            .specialize(&pool())
            .unwrap();
        let TypedAttribute::LineNumberTable(lines) = lines else {
            panic!("expected LineNumberTable");
        };
        assert_eq!(lines.line_at(0), Some(10));
        assert_eq!(lines.line_at(3), Some(10));
        assert_eq!(lines.line_at(9), Some(11));

        #[rustfmt::skip]
        let info = [
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x05, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00,
        ];
        let TypedAttribute::LocalVariableTable(locals) =
            attribute(7, &info).specialize(&pool()).unwrap()
        else {
            panic!("expected LocalVariableTable");
        };
        assert_eq!(locals.variable_at(0, 4).map(|v| v.name_index), Some(1));
        assert_eq!(locals.variable_at(0, 5), None);
        assert_eq!(locals.variable_at(1, 0), None);
    }

    #[test]
    fn it_should_leave_unknown_attributes_opaque() {
        let a = attribute(9, &[0xde, 0xad]);
        assert!(matches!(a.specialize(&pool()).unwrap(), TypedAttribute::Unknown));
        assert!(matches!(
            attribute(500, &[]).specialize(&pool()).unwrap(),
            TypedAttribute::Unknown
        ));
        assert_eq!(a.info, vec![0xde, 0xad]);
    }

    #[test]
    fn it_should_specialize_repeatedly() {
        let cp = pool();
        let a = attribute(2, &[0x00, 0x02]);
        for _ in 0..2 {
            assert!(matches!(
                a.specialize(&cp).unwrap(),
                TypedAttribute::SourceFile(SourceFileAttribute { sourcefile_index: 2 })
            ));
        }
    }

    #[test]
    fn it_should_fail_on_short_attribute_bodies() {
        assert!(attribute(1, &[0x00]).specialize(&pool()).is_err());
        assert!(attribute(3, &[0x00, 0x02, 0x00, 0x0b]).specialize(&pool()).is_err());
    }

    #[test]
    fn it_should_find_attributes_by_name() {
        let cp = pool();
        let attributes = Attributes(vec![attribute(8, &[]), attribute(2, &[0x00, 0x02])]);
        assert!(attributes.find_by_name("Synthetic", &cp).is_some());
        assert!(attributes.find_by_name("Code", &cp).is_none());
        assert_eq!(
            attributes.source_file_attribute(&cp),
            Some(SourceFileAttribute { sourcefile_index: 2 })
        );
        assert!(attributes.code_attribute(&cp).is_none());
    }
}
