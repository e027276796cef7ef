use crate::jstring;

/// Borrows the payload of the entry at an index if it has the given variant.
#[macro_export]
macro_rules! cp_entry {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Some($crate::constant_pool::CpInfo::$i(ref n)) => Some(n),
            _ => None,
        }
    };
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    // Slot 0 and the slot after every Long/Double are Empty.
    cp_infos: Vec<CpInfo>,
    count: u16,
    unrecognized: Vec<(u16, u8)>,
}
impl ConstantPool {
    /// Builds a pool from the entries at indices `1..`, in order.
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        let mut slots = Vec::with_capacity(cp_infos.len() + 1);
        slots.push(CpInfo::Empty);
        slots.extend(cp_infos);

        Self {
            count: slots.len() as u16,
            cp_infos: slots,
            unrecognized: Vec::new(),
        }
    }

    // Keeps the count as the class file declared it, which may be 0.
    pub(crate) fn with_count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }

    pub(crate) fn with_unrecognized(mut self, unrecognized: Vec<(u16, u8)>) -> Self {
        self.unrecognized = unrecognized;
        self
    }

    /// The `constant_pool_count` of the class file, slot 0 included.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Slots whose tag could not be decoded, with the offending tag.
    pub fn unrecognized(&self) -> &[(u16, u8)] {
        &self.unrecognized
    }

    pub fn is_degraded(&self) -> bool {
        !self.unrecognized.is_empty()
    }

    /// Returns the entry at `index`, or `None` for slot 0, filler slots,
    /// unrecognized entries and indices past the end.
    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        match self.cp_infos.get(index as usize)? {
            CpInfo::Empty => None,
            cp_info => Some(cp_info),
        }
    }

    pub fn entry_type(&self, index: u16) -> ConstantTag {
        self.get(index).map_or(ConstantTag::Empty, CpInfo::tag)
    }

    /// Iterates over the live entries and their indices.
    pub fn iter(&self) -> Entries<'_> {
        self.into_iter()
    }

    /// Decodes the Utf8 entry at `index`.
    pub fn utf8(&self, index: u16) -> Option<String> {
        cp_entry!(self, index, Utf8).map(|bytes| jstring::decode_modified_utf8(bytes))
    }

    /// Resolves a Class entry to its source form, `java/lang/String` becoming
    /// `java.lang.String`.
    ///
    /// Array classes are rendered by element type followed by one `[]` per
    /// dimension, unless `ignore_array_brackets` is set.
    pub fn class_name(&self, index: u16, ignore_array_brackets: bool) -> Option<String> {
        let ClassInfo { name_index } = cp_entry!(self, index, Class)?;
        // A zero name index marks an anonymous class.
        if *name_index == 0 {
            return None;
        }

        let class_name = self.utf8(*name_index)?.replace('/', ".");
        let element = class_name.trim_start_matches('[');
        let dimensions = class_name.len() - element.len();
        if dimensions == 0 {
            return Some(class_name);
        }

        let mut type_name = jstring::element_type_name(element);
        if !ignore_array_brackets {
            type_name.push_str(&"[]".repeat(dimensions));
        }
        Some(type_name)
    }

    /// Renders a Fieldref, Methodref or InterfaceMethodref as
    /// `<type> <Owner>.<name><params>`.
    ///
    /// Constructors are rendered as `<Owner><params>`.
    pub fn method_signature(&self, index: u16, include_return_type: bool) -> Option<String> {
        let RefInfo {
            class_index,
            name_and_type_index,
        } = match self.get(index)? {
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => r,
            _ => return None,
        };

        let class_name = self.class_name(*class_index, false)?;
        let NameAndTypeInfo {
            name_index,
            descriptor_index,
        } = cp_entry!(self, *name_and_type_index, NameAndType)?;
        let name = self.utf8(*name_index)?;
        let descriptor = self.utf8(*descriptor_index)?;
        let parameters = jstring::descriptor_parameters_string(&descriptor);

        if name == "<init>" {
            return Some(format!("{}{}", class_name, parameters));
        }

        if include_return_type {
            let return_type = jstring::descriptor_type(&descriptor);
            Some(format!("{} {}.{}{}", return_type, class_name, name, parameters))
        } else {
            Some(format!("{}.{}{}", class_name, name, parameters))
        }
    }

    /// Renders a numeric, String or Utf8 entry as text.
    ///
    /// `int_type` only affects Integer entries.
    pub fn constant_value(&self, index: u16, int_type: IntType) -> Option<String> {
        let value = match self.get(index)? {
            CpInfo::Float(bits) => jstring::float_to_string(*bits),
            CpInfo::Double(bits) => jstring::double_to_string(*bits),
            CpInfo::Long(value) => value.to_string(),
            CpInfo::Integer(value) => match int_type {
                IntType::Boolean => (*value != 0).to_string(),
                IntType::Char => {
                    let c = char::from_u32(*value as u32 & 0xffff).unwrap_or('\u{fffd}');
                    format!("'{}'", jstring::printable(&c.to_string()))
                }
                IntType::Int | IntType::Short | IntType::Byte => value.to_string(),
            },
            CpInfo::String { string_index } => jstring::printable(&self.utf8(*string_index)?),
            CpInfo::Utf8(bytes) => jstring::printable(&jstring::decode_modified_utf8(bytes)),
            _ => return None,
        };

        Some(value)
    }
}

pub struct Entries<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, CpInfo>>,
}
impl<'a> Iterator for Entries<'a> {
    type Item = (u16, &'a CpInfo);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|(index, cp_info)| match cp_info {
            CpInfo::Empty => None,
            cp_info => Some((index as u16, cp_info)),
        })
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (u16, &'a CpInfo);
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Entries {
            inner: self.cp_infos.iter().enumerate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConstantTag {
    Empty = 0,
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
}

/// How an Integer constant should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntType {
    #[default]
    Int,
    Boolean,
    Char,
    Short,
    Byte,
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(Vec<u8>),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
    Empty,
}
impl CpInfo {
    /// Long and Double take their own slot and the one after it.
    pub fn slot_size(&self) -> usize {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }

    pub fn tag(&self) -> ConstantTag {
        match self {
            CpInfo::Utf8(_) => ConstantTag::Utf8,
            CpInfo::Integer(_) => ConstantTag::Integer,
            CpInfo::Float(_) => ConstantTag::Float,
            CpInfo::Long(_) => ConstantTag::Long,
            CpInfo::Double(_) => ConstantTag::Double,
            CpInfo::Class(_) => ConstantTag::Class,
            CpInfo::String { .. } => ConstantTag::String,
            CpInfo::FieldRef(_) => ConstantTag::Fieldref,
            CpInfo::MethodRef(_) => ConstantTag::Methodref,
            CpInfo::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodref,
            CpInfo::NameAndType(_) => ConstantTag::NameAndType,
            CpInfo::MethodHandle(_) => ConstantTag::MethodHandle,
            CpInfo::MethodType(_) => ConstantTag::MethodType,
            CpInfo::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
            CpInfo::Empty => ConstantTag::Empty,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Index of a Utf8 entry holding the binary name in internal form, or 0
    // for an anonymous class.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
