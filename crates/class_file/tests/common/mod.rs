#![allow(dead_code)]

use std::collections::HashMap;

/// Assembles class files in memory, interning constant pool entries.
pub struct ClassBuilder {
    pub major_version: u16,
    pub access_flags: u16,
    constant_pool: Vec<u8>,
    next_index: u16,
    interned: HashMap<Vec<u8>, u16>,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    pub fn new(this_class: &str) -> Self {
        let mut res = Self {
            major_version: 50,
            access_flags: 0x0021,
            constant_pool: Vec::new(),
            next_index: 1,
            interned: HashMap::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        res.this_class = res.class(this_class);
        res
    }

    /// Appends an already encoded entry, tag included.
    pub fn raw_entry(&mut self, entry: &[u8]) -> u16 {
        let index = self.next_index;
        self.constant_pool.extend_from_slice(entry);
        self.next_index += match entry.first() {
            Some(5) | Some(6) => 2,
            _ => 1,
        };
        index
    }

    fn entry(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.interned.get(&entry) {
            return *index;
        }
        let index = self.raw_entry(&entry);
        self.interned.insert(entry, index);
        index
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        self.utf8_bytes(s.as_bytes())
    }

    pub fn utf8_bytes(&mut self, bytes: &[u8]) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        entry.extend_from_slice(bytes);
        self.entry(entry)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.entry(entry)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.entry(entry)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut entry = vec![6];
        entry.extend_from_slice(&value.to_bits().to_be_bytes());
        self.entry(entry)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.indexed_entry(7, &[name_index])
    }

    pub fn string(&mut self, s: &str) -> u16 {
        let string_index = self.utf8(s);
        self.indexed_entry(8, &[string_index])
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.indexed_entry(12, &[name_index, descriptor_index])
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.ref_entry(9, class, name, descriptor)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.ref_entry(10, class, name, descriptor)
    }

    fn ref_entry(&mut self, tag: u8, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.indexed_entry(tag, &[class_index, name_and_type_index])
    }

    fn indexed_entry(&mut self, tag: u8, indices: &[u16]) -> u16 {
        let mut entry = vec![tag];
        indices
            .iter()
            .for_each(|index| entry.extend_from_slice(&index.to_be_bytes()));
        self.entry(entry)
    }

    pub fn super_class(&mut self, name: &str) -> &mut Self {
        self.super_class = self.class(name);
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    /// Encodes an attribute, header included.
    pub fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        let mut res = self.utf8(name).to_be_bytes().to_vec();
        res.extend_from_slice(&(info.len() as u32).to_be_bytes());
        res.extend_from_slice(info);
        res
    }

    /// Encodes a Code attribute around `code`.
    pub fn code(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        exception_table: &[[u16; 4]],
        attributes: &[Vec<u8>],
    ) -> Vec<u8> {
        let mut info = Vec::new();
        info.extend_from_slice(&max_stack.to_be_bytes());
        info.extend_from_slice(&max_locals.to_be_bytes());
        info.extend_from_slice(&(code.len() as u32).to_be_bytes());
        info.extend_from_slice(code);
        info.extend_from_slice(&(exception_table.len() as u16).to_be_bytes());
        exception_table
            .iter()
            .flatten()
            .for_each(|v| info.extend_from_slice(&v.to_be_bytes()));
        push_attributes(&mut info, attributes);
        self.attribute("Code", &info)
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.fields.push(member);
        self
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.methods.push(member);
        self
    }

    fn member(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> Vec<u8> {
        let mut res = access_flags.to_be_bytes().to_vec();
        res.extend_from_slice(&self.utf8(name).to_be_bytes());
        res.extend_from_slice(&self.utf8(descriptor).to_be_bytes());
        push_attributes(&mut res, attributes);
        res
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn source_file(&mut self, name: &str) -> &mut Self {
        let info = self.utf8(name).to_be_bytes();
        let attribute = self.attribute("SourceFile", &info);
        self.class_attribute(attribute)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut res = vec![0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00];
        res.extend_from_slice(&self.major_version.to_be_bytes());
        res.extend_from_slice(&self.next_index.to_be_bytes());
        res.extend_from_slice(&self.constant_pool);
        res.extend_from_slice(&self.access_flags.to_be_bytes());
        res.extend_from_slice(&self.this_class.to_be_bytes());
        res.extend_from_slice(&self.super_class.to_be_bytes());
        res.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        self.interfaces
            .iter()
            .for_each(|i| res.extend_from_slice(&i.to_be_bytes()));
        push_attributes(&mut res, &self.fields);
        push_attributes(&mut res, &self.methods);
        push_attributes(&mut res, &self.attributes);
        res
    }
}

// Count-prefixed list of already encoded records.
fn push_attributes(out: &mut Vec<u8>, records: &[Vec<u8>]) {
    out.extend_from_slice(&(records.len() as u16).to_be_bytes());
    records.iter().for_each(|r| out.extend_from_slice(r));
}
