use std::io::{BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    attributes::{
        Attributes, CodeAttribute, ConstantValueAttribute, ExceptionTableEntry,
        ExceptionsAttribute, InnerClassInfo, InnerClassesAttribute, LineNumberInfo,
        LineNumberTableAttribute, LocalVariableInfo, LocalVariableTableAttribute,
        SourceFileAttribute,
    },
    class_file::{ClassHeader, MemberInfo},
};

use super::{constant_pool::CpInfo, *};

type Endian = BigEndian;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

/// Reads the big-endian class file structures from any byte source.
pub struct Parser<R> {
    r: BufReader<R>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let ClassHeader {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
        } = self.parse_header()?;

        let interfaces_count = self.read_u16()?;
        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = self.parse_members(fields_count)?;

        let methods_count = self.read_u16()?;
        let methods = self.parse_members(methods_count)?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Reads everything up to and including the super class index.
    pub fn parse_header(&mut self) -> Result<ClassHeader> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        // access_flags, this_class and super_class follow the pool.
        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;

        Ok(ClassHeader {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
        })
    }

    fn parse_members(&mut self, count: u16) -> Result<Vec<MemberInfo>> {
        (0..count)
            .map(|_| self.parse_member_info())
            .collect::<Result<Vec<_>>>()
    }

    fn parse_member_info(&mut self) -> Result<MemberInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let declared_count = self.read_u16()?;
        let count = declared_count as usize;

        let mut res = Vec::with_capacity(count.saturating_sub(1));
        let mut unrecognized = Vec::new();
        // Slot 0 is never stored, so the pool is full at count - 1 entries.
        while res.len() + 1 < count {
            let slot = res.len() as u16 + 1;
            match self.parse_cp_info()? {
                Ok(cp_info) => {
                    let slot_size = cp_info.slot_size();
                    res.push(cp_info);
                    (1..slot_size).for_each(|_| res.push(CpInfo::Empty));
                }
                Err(tag) => {
                    log::warn!("Unrecognized constant pool tag {} at index {}", tag, slot);
                    unrecognized.push((slot, tag));
                    res.push(CpInfo::Empty);
                }
            }
        }
        // A Long/Double in the last slot is kept without its filler.
        res.truncate(count.saturating_sub(1));

        Ok(ConstantPool::new(res)
            .with_count(declared_count)
            .with_unrecognized(unrecognized))
    }

    /// Reads one tagged entry. An unknown tag is handed back to the caller
    /// instead of failing the decode.
    fn parse_cp_info(&mut self) -> Result<std::result::Result<CpInfo, u8>> {
        let tag = self.read_u8()?;
        let cp_info = match tag {
            1 => self.parse_utf8()?,
            3 => self.parse_integer()?,
            4 => self.parse_float()?,
            5 => self.parse_long()?,
            6 => self.parse_double()?,
            7 => self.parse_class_info()?,
            8 => self.parse_string()?,
            9 => self.parse_field_ref()?,
            10 => self.parse_method_ref()?,
            11 => self.parse_interface_method_ref()?,
            12 => self.parse_name_and_type_info()?,
            15 => self.parse_method_handle()?,
            16 => self.parse_method_type_info()?,
            18 => self.parse_invoke_dynamic_info()?,
            _ => return Ok(Err(tag)),
        };

        Ok(Ok(cp_info))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(bytes))
    }

    fn parse_integer(&mut self) -> Result<CpInfo> {
        let int = self.read_i32()?;

        Ok(CpInfo::Integer(int))
    }

    fn parse_float(&mut self) -> Result<CpInfo> {
        let bits = self.read_u32()?;

        Ok(CpInfo::Float(bits))
    }

    fn parse_long(&mut self) -> Result<CpInfo> {
        let long = self.read_u64()? as i64;

        Ok(CpInfo::Long(long))
    }

    fn parse_double(&mut self) -> Result<CpInfo> {
        let bits = self.read_u64()?;

        Ok(CpInfo::Double(bits))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(constant_pool::ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_field_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::FieldRef(ref_info))
    }

    fn parse_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::MethodRef(ref_info))
    }

    fn parse_interface_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::InterfaceMethodRef(ref_info))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(constant_pool::MethodTypeInfo {
            descriptor_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(CpInfo::InvokeDynamic(constant_pool::InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.read_bytes(attribute_length as usize)?;

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub(crate) fn parse_constant_value_attribute(&mut self) -> Result<ConstantValueAttribute> {
        let constant_value_index = self.read_u16()?;

        Ok(ConstantValueAttribute {
            constant_value_index,
        })
    }

    pub(crate) fn parse_source_file_attribute(&mut self) -> Result<SourceFileAttribute> {
        let sourcefile_index = self.read_u16()?;

        Ok(SourceFileAttribute { sourcefile_index })
    }

    pub(crate) fn parse_exceptions_attribute(&mut self) -> Result<ExceptionsAttribute> {
        let number_of_exceptions = self.read_u16()?;
        let mut exception_index_table = vec![0u16; number_of_exceptions as usize];
        self.r.read_u16_into::<Endian>(&mut exception_index_table)?;

        Ok(ExceptionsAttribute {
            exception_index_table,
        })
    }

    pub(crate) fn parse_inner_classes_attribute(&mut self) -> Result<InnerClassesAttribute> {
        let number_of_classes = self.read_u16()?;
        let classes = (0..number_of_classes)
            .map(|_| self.parse_inner_class_info())
            .collect::<Result<Vec<_>>>()?;

        Ok(InnerClassesAttribute { classes })
    }

    fn parse_inner_class_info(&mut self) -> Result<InnerClassInfo> {
        let inner_class_info_index = self.read_u16()?;
        let outer_class_info_index = self.read_u16()?;
        let inner_name_index = self.read_u16()?;
        let inner_class_access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);

        Ok(InnerClassInfo {
            inner_class_info_index,
            outer_class_info_index,
            inner_name_index,
            inner_class_access_flags,
        })
    }

    pub(crate) fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    pub(crate) fn parse_line_number_table_attribute(
        &mut self,
    ) -> Result<LineNumberTableAttribute> {
        let line_number_table_length = self.read_u16()?;
        let line_number_table = (0..line_number_table_length)
            .map(|_| self.parse_line_number_info())
            .collect::<Result<Vec<_>>>()?;

        Ok(LineNumberTableAttribute { line_number_table })
    }

    fn parse_line_number_info(&mut self) -> Result<LineNumberInfo> {
        let start_pc = self.read_u16()?;
        let line_number = self.read_u16()?;

        Ok(LineNumberInfo {
            start_pc,
            line_number,
        })
    }

    pub(crate) fn parse_local_variable_table_attribute(
        &mut self,
    ) -> Result<LocalVariableTableAttribute> {
        let local_variable_table_length = self.read_u16()?;
        let local_variable_table = (0..local_variable_table_length)
            .map(|_| self.parse_local_variable_info())
            .collect::<Result<Vec<_>>>()?;

        Ok(LocalVariableTableAttribute {
            local_variable_table,
        })
    }

    fn parse_local_variable_info(&mut self) -> Result<LocalVariableInfo> {
        let start_pc = self.read_u16()?;
        let length = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let index = self.read_u16()?;

        Ok(LocalVariableInfo {
            start_pc,
            length,
            name_index,
            descriptor_index,
            index,
        })
    }

    /// Reads exactly `len` bytes without trusting `len` for the allocation.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.r).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(ClassFileError::Truncated);
        }

        Ok(bytes)
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(self.r.read_u64::<Endian>()?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert!(Parser::new(&[0xca, 0xfe, 0xba, 0xbe][..])
            .parse_magic_identifier()
            .is_ok());
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba][..]).parse_magic_identifier(),
            Err(ClassFileError::Truncated)
        ));
    }

    #[test]
    fn it_should_fail_if_the_magic_identifier_is_incorrect() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xda, 0xda][..]).parse_magic_identifier(),
            Err(ClassFileError::InvalidMagicIdentifier(0xCAFEDADA))
        ));
    }
}


#[cfg(test)]
mod parse_constant_pool_tests {
    use super::*;

    #[test]
    fn it_should_reserve_a_slot_after_wide_entries() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x06,
            0x05, 0, 0, 0, 0, 0, 0, 0, 0x2a,
            0x06, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0,
            0x03, 0xff, 0xff, 0xff, 0xff,
        ];
        let cp = Parser::new(&bytes[..]).parse_constant_pool().unwrap();

        assert_eq!(cp.count(), 6);
        assert_eq!(cp.get(1), Some(&CpInfo::Long(42)));
        assert_eq!(cp.get(2), None);
        assert_eq!(cp.get(3), Some(&CpInfo::Double(1.5f64.to_bits())));
        assert_eq!(cp.get(4), None);
        assert_eq!(cp.get(5), Some(&CpInfo::Integer(-1)));
        assert_eq!(cp.iter().count(), 6 - 1 - 2);
    }

    #[test]
    fn it_should_mark_unrecognized_tags_and_carry_on() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x04,
            0x01, 0x00, 0x01, b'A',
            0x63,
            0x07, 0x00, 0x01,
        ];
        let cp = Parser::new(&bytes[..]).parse_constant_pool().unwrap();

        assert_eq!(cp.get(2), None);
        assert_eq!(cp.unrecognized(), &[(2, 0x63)]);
        assert!(cp.is_degraded());
        assert_eq!(cp.class_name(3, false).as_deref(), Some("A"));
    }

    #[test]
    fn it_should_accept_an_empty_pool() {
        let cp = Parser::new(&[0x00, 0x00][..]).parse_constant_pool().unwrap();
        assert_eq!(cp.count(), 0);
        assert_eq!(cp.iter().count(), 0);

        let cp = Parser::new(&[0x00, 0x01][..]).parse_constant_pool().unwrap();
        assert_eq!(cp.count(), 1);
        assert_eq!(cp.iter().count(), 0);
    }

    #[test]
    fn it_should_keep_a_wide_entry_in_the_last_slot() {
        let bytes = [0x00, 0x02, 0x05, 0, 0, 0, 0, 0, 0, 0, 0x07];
        let cp = Parser::new(&bytes[..]).parse_constant_pool().unwrap();

        assert_eq!(cp.count(), 2);
        assert_eq!(cp.get(1), Some(&CpInfo::Long(7)));
        assert_eq!(cp.get(2), None);
        assert_eq!(cp.iter().count(), 1);
    }

    #[test]
    fn it_should_fail_on_a_truncated_utf8_entry() {
        let bytes = [0x00, 0x02, 0x01, 0x00, 0x05, b'a', b'b'];
        assert!(matches!(
            Parser::new(&bytes[..]).parse_constant_pool(),
            Err(ClassFileError::Truncated)
        ));
    }
}
