//! Opcode metadata and operand readers for the `code` array of a Code
//! attribute.
//!
//! All readers take the code array together with a program counter that
//! they advance past whatever they consume.

use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

/// Operand length of the instructions whose size depends on their operands.
pub const OP_LENGTH_UNPREDICTABLE: u8 = 0x10;
pub const MAX_LEGAL_OPCODE: u8 = 201;

pub const IINC: u8 = 132;
pub const TABLESWITCH: u8 = 170;
pub const LOOKUPSWITCH: u8 = 171;
pub const INVOKEINTERFACE: u8 = 185;
pub const INVOKEDYNAMIC: u8 = 186;
pub const WIDE: u8 = 196;
pub const MULTIANEWARRAY: u8 = 197;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    None,
    Byte,
    UnsignedByte,
    /// `newarray` element type, see [`array_type_name`].
    ByteArrayType,
    ByteConstantIndex,
    /// Present in the encoding but carrying nothing of interest, like the
    /// count byte of `invokeinterface`.
    UnsignedByteUseless,
    Short,
    UnsignedShort,
    ShortOffset,
    ShortClassIndex,
    ShortMethodIndex,
    ShortFieldIndex,
    ShortConstantIndex,
    Int,
    IntOffset,
    /// The operand of `wide` is the instruction it modifies.
    Instruction,
    TableSwitch,
    LookupSwitch,
    Error,
}

struct InstructionInfo {
    name: &'static str,
    operand_count: u8,
    operand_length: u8,
    // Type of the first operand. The others are fixed by the opcode.
    operand_type: OperandType,
}

const fn op(
    name: &'static str,
    operand_count: u8,
    operand_length: u8,
    operand_type: OperandType,
) -> InstructionInfo {
    InstructionInfo {
        name,
        operand_count,
        operand_length,
        operand_type,
    }
}

#[rustfmt::skip]
static INSTRUCTIONS: [InstructionInfo; MAX_LEGAL_OPCODE as usize + 1] = [
    op("nop", 0, 0, OperandType::None), // 0
    op("aconst_null", 0, 0, OperandType::None),
    op("iconst_m1", 0, 0, OperandType::None),
    op("iconst_0", 0, 0, OperandType::None),
    op("iconst_1", 0, 0, OperandType::None),
    op("iconst_2", 0, 0, OperandType::None),
    op("iconst_3", 0, 0, OperandType::None),
    op("iconst_4", 0, 0, OperandType::None),
    op("iconst_5", 0, 0, OperandType::None),
    op("lconst_0", 0, 0, OperandType::None),
    op("lconst_1", 0, 0, OperandType::None), // 10
    op("fconst_0", 0, 0, OperandType::None),
    op("fconst_1", 0, 0, OperandType::None),
    op("fconst_2", 0, 0, OperandType::None),
    op("dconst_0", 0, 0, OperandType::None),
    op("dconst_1", 0, 0, OperandType::None),
    op("bipush", 1, 1, OperandType::Byte),
    op("sipush", 1, 2, OperandType::Short),
    op("ldc", 1, 1, OperandType::ByteConstantIndex),
    op("ldc_w", 1, 2, OperandType::ShortConstantIndex),
    op("ldc2_w", 1, 2, OperandType::ShortConstantIndex), // 20
    op("iload", 1, 1, OperandType::Byte),
    op("lload", 1, 1, OperandType::Byte),
    op("fload", 1, 1, OperandType::Byte),
    op("dload", 1, 1, OperandType::Byte),
    op("aload", 1, 1, OperandType::Byte),
    op("iload_0", 0, 0, OperandType::None),
    op("iload_1", 0, 0, OperandType::None),
    op("iload_2", 0, 0, OperandType::None),
    op("iload_3", 0, 0, OperandType::None),
    op("lload_0", 0, 0, OperandType::None), // 30
    op("lload_1", 0, 0, OperandType::None),
    op("lload_2", 0, 0, OperandType::None),
    op("lload_3", 0, 0, OperandType::None),
    op("fload_0", 0, 0, OperandType::None),
    op("fload_1", 0, 0, OperandType::None),
    op("fload_2", 0, 0, OperandType::None),
    op("fload_3", 0, 0, OperandType::None),
    op("dload_0", 0, 0, OperandType::None),
    op("dload_1", 0, 0, OperandType::None),
    op("dload_2", 0, 0, OperandType::None), // 40
    op("dload_3", 0, 0, OperandType::None),
    op("aload_0", 0, 0, OperandType::None),
    op("aload_1", 0, 0, OperandType::None),
    op("aload_2", 0, 0, OperandType::None),
    op("aload_3", 0, 0, OperandType::None),
    op("iaload", 0, 0, OperandType::None),
    op("laload", 0, 0, OperandType::None),
    op("faload", 0, 0, OperandType::None),
    op("daload", 0, 0, OperandType::None),
    op("aaload", 0, 0, OperandType::None), // 50
    op("baload", 0, 0, OperandType::None),
    op("caload", 0, 0, OperandType::None),
    op("saload", 0, 0, OperandType::None),
    op("istore", 1, 1, OperandType::Byte),
    op("lstore", 1, 1, OperandType::Byte),
    op("fstore", 1, 1, OperandType::Byte),
    op("dstore", 1, 1, OperandType::Byte),
    op("astore", 1, 1, OperandType::Byte),
    op("istore_0", 0, 0, OperandType::None),
    op("istore_1", 0, 0, OperandType::None), // 60
    op("istore_2", 0, 0, OperandType::None),
    op("istore_3", 0, 0, OperandType::None),
    op("lstore_0", 0, 0, OperandType::None),
    op("lstore_1", 0, 0, OperandType::None),
    op("lstore_2", 0, 0, OperandType::None),
    op("lstore_3", 0, 0, OperandType::None),
    op("fstore_0", 0, 0, OperandType::None),
    op("fstore_1", 0, 0, OperandType::None),
    op("fstore_2", 0, 0, OperandType::None),
    op("fstore_3", 0, 0, OperandType::None), // 70
    op("dstore_0", 0, 0, OperandType::None),
    op("dstore_1", 0, 0, OperandType::None),
    op("dstore_2", 0, 0, OperandType::None),
    op("dstore_3", 0, 0, OperandType::None),
    op("astore_0", 0, 0, OperandType::None),
    op("astore_1", 0, 0, OperandType::None),
    op("astore_2", 0, 0, OperandType::None),
    op("astore_3", 0, 0, OperandType::None),
    op("iastore", 0, 0, OperandType::None),
    op("lastore", 0, 0, OperandType::None), // 80
    op("fastore", 0, 0, OperandType::None),
    op("dastore", 0, 0, OperandType::None),
    op("aastore", 0, 0, OperandType::None),
    op("bastore", 0, 0, OperandType::None),
    op("castore", 0, 0, OperandType::None),
    op("sastore", 0, 0, OperandType::None),
    op("pop", 0, 0, OperandType::None),
    op("pop2", 0, 0, OperandType::None),
    op("dup", 0, 0, OperandType::None),
    op("dup_x1", 0, 0, OperandType::None), // 90
    op("dup_x2", 0, 0, OperandType::None),
    op("dup2", 0, 0, OperandType::None),
    op("dup2_x1", 0, 0, OperandType::None),
    op("dup2_x2", 0, 0, OperandType::None),
    op("swap", 0, 0, OperandType::None),
    op("iadd", 0, 0, OperandType::None),
    op("ladd", 0, 0, OperandType::None),
    op("fadd", 0, 0, OperandType::None),
    op("dadd", 0, 0, OperandType::None),
    op("isub", 0, 0, OperandType::None), // 100
    op("lsub", 0, 0, OperandType::None),
    op("fsub", 0, 0, OperandType::None),
    op("dsub", 0, 0, OperandType::None),
    op("imul", 0, 0, OperandType::None),
    op("lmul", 0, 0, OperandType::None),
    op("fmul", 0, 0, OperandType::None),
    op("dmul", 0, 0, OperandType::None),
    op("idiv", 0, 0, OperandType::None),
    op("ldiv", 0, 0, OperandType::None),
    op("fdiv", 0, 0, OperandType::None), // 110
    op("ddiv", 0, 0, OperandType::None),
    op("irem", 0, 0, OperandType::None),
    op("lrem", 0, 0, OperandType::None),
    op("frem", 0, 0, OperandType::None),
    op("drem", 0, 0, OperandType::None),
    op("ineg", 0, 0, OperandType::None),
    op("lneg", 0, 0, OperandType::None),
    op("fneg", 0, 0, OperandType::None),
    op("dneg", 0, 0, OperandType::None),
    op("ishl", 0, 0, OperandType::None), // 120
    op("lshl", 0, 0, OperandType::None),
    op("ishr", 0, 0, OperandType::None),
    op("lshr", 0, 0, OperandType::None),
    op("iushr", 0, 0, OperandType::None),
    op("lushr", 0, 0, OperandType::None),
    op("iand", 0, 0, OperandType::None),
    op("land", 0, 0, OperandType::None),
    op("ior", 0, 0, OperandType::None),
    op("lor", 0, 0, OperandType::None),
    op("ixor", 0, 0, OperandType::None), // 130
    op("lxor", 0, 0, OperandType::None),
    op("iinc", 2, 2, OperandType::Byte),
    op("i2l", 0, 0, OperandType::None),
    op("i2f", 0, 0, OperandType::None),
    op("i2d", 0, 0, OperandType::None),
    op("l2i", 0, 0, OperandType::None),
    op("l2f", 0, 0, OperandType::None),
    op("l2d", 0, 0, OperandType::None),
    op("f2i", 0, 0, OperandType::None),
    op("f2l", 0, 0, OperandType::None), // 140
    op("f2d", 0, 0, OperandType::None),
    op("d2i", 0, 0, OperandType::None),
    op("d2l", 0, 0, OperandType::None),
    op("d2f", 0, 0, OperandType::None),
    op("i2b", 0, 0, OperandType::None),
    op("i2c", 0, 0, OperandType::None),
    op("i2s", 0, 0, OperandType::None),
    op("lcmp", 0, 0, OperandType::None),
    op("fcmpl", 0, 0, OperandType::None),
    op("fcmpg", 0, 0, OperandType::None), // 150
    op("dcmpl", 0, 0, OperandType::None),
    op("dcmpg", 0, 0, OperandType::None),
    op("ifeq", 1, 2, OperandType::ShortOffset),
    op("ifne", 1, 2, OperandType::ShortOffset),
    op("iflt", 1, 2, OperandType::ShortOffset),
    op("ifge", 1, 2, OperandType::ShortOffset),
    op("ifgt", 1, 2, OperandType::ShortOffset),
    op("ifle", 1, 2, OperandType::ShortOffset),
    op("if_icmpeq", 1, 2, OperandType::ShortOffset),
    op("if_icmpne", 1, 2, OperandType::ShortOffset), // 160
    op("if_icmplt", 1, 2, OperandType::ShortOffset),
    op("if_icmpge", 1, 2, OperandType::ShortOffset),
    op("if_icmpgt", 1, 2, OperandType::ShortOffset),
    op("if_icmple", 1, 2, OperandType::ShortOffset),
    op("if_acmpeq", 1, 2, OperandType::ShortOffset),
    op("if_acmpne", 1, 2, OperandType::ShortOffset),
    op("goto", 1, 2, OperandType::ShortOffset),
    op("jsr", 1, 2, OperandType::ShortOffset),
    op("ret", 1, 1, OperandType::Byte),
    op("tableswitch", 1, OP_LENGTH_UNPREDICTABLE, OperandType::TableSwitch), // 170
    op("lookupswitch", 1, OP_LENGTH_UNPREDICTABLE, OperandType::LookupSwitch),
    op("ireturn", 0, 0, OperandType::None),
    op("lreturn", 0, 0, OperandType::None),
    op("freturn", 0, 0, OperandType::None),
    op("dreturn", 0, 0, OperandType::None),
    op("areturn", 0, 0, OperandType::None),
    op("return", 0, 0, OperandType::None),
    op("getstatic", 1, 2, OperandType::ShortFieldIndex),
    op("putstatic", 1, 2, OperandType::ShortFieldIndex),
    op("getfield", 1, 2, OperandType::ShortFieldIndex), // 180
    op("putfield", 1, 2, OperandType::ShortFieldIndex),
    op("invokevirtual", 1, 2, OperandType::ShortMethodIndex),
    op("invokespecial", 1, 2, OperandType::ShortMethodIndex),
    op("invokestatic", 1, 2, OperandType::ShortMethodIndex),
    op("invokeinterface", 3, 4, OperandType::ShortMethodIndex),
    op("invokedynamic", 3, 4, OperandType::ShortMethodIndex),
    op("new", 1, 2, OperandType::ShortClassIndex),
    op("newarray", 1, 1, OperandType::ByteArrayType),
    op("anewarray", 1, 2, OperandType::ShortClassIndex),
    op("arraylength", 0, 0, OperandType::None), // 190
    op("athrow", 0, 0, OperandType::None),
    op("checkcast", 1, 2, OperandType::ShortClassIndex),
    op("instanceof", 1, 2, OperandType::ShortClassIndex),
    op("monitorenter", 0, 0, OperandType::None),
    op("monitorexit", 0, 0, OperandType::None),
    op("wide", 1, OP_LENGTH_UNPREDICTABLE, OperandType::Instruction),
    op("multianewarray", 2, 3, OperandType::ShortClassIndex),
    op("ifnull", 1, 2, OperandType::ShortOffset),
    op("ifnonnull", 1, 2, OperandType::ShortOffset),
    op("goto_w", 1, 4, OperandType::IntOffset), // 200
    op("jsr_w", 1, 4, OperandType::IntOffset),
];

fn instruction_info(opcode: u8) -> Option<&'static InstructionInfo> {
    INSTRUCTIONS.get(opcode as usize)
}

/// The mnemonic of `opcode`, `None` past the last legal opcode.
pub fn instruction_name(opcode: u8) -> Option<&'static str> {
    instruction_info(opcode).map(|i| i.name)
}

/// Number of operands following `opcode`; 0 for illegal opcodes.
pub fn operand_count(opcode: u8) -> u8 {
    instruction_info(opcode).map_or(0, |i| i.operand_count)
}

/// Combined byte length of the operands of `opcode`, doubled when widened.
///
/// Returns [`OP_LENGTH_UNPREDICTABLE`] for the switches and `wide`, and 0
/// for illegal opcodes.
pub fn operand_length(opcode: u8) -> u8 {
    instruction_info(opcode).map_or(0, |i| i.operand_length)
}

/// The type of operand `operand_index` of `opcode`.
///
/// Asking for the widened form of an instruction that has none, or for an
/// operand the instruction's shape does not define, gives
/// [`OperandType::Error`]. Indices past the operand count give
/// [`OperandType::None`].
pub fn operand_type(opcode: u8, operand_index: usize, is_wide: bool) -> OperandType {
    let Some(info) = instruction_info(opcode) else {
        return OperandType::Error;
    };
    if operand_index >= info.operand_count as usize {
        return OperandType::None;
    }

    match operand_index {
        0 if is_wide && is_widenable(opcode) => OperandType::UnsignedShort,
        0 if is_wide => OperandType::Error,
        0 => info.operand_type,
        1 => match opcode {
            IINC if is_wide => OperandType::UnsignedShort,
            IINC => OperandType::Byte,
            INVOKEINTERFACE | INVOKEDYNAMIC => OperandType::UnsignedByteUseless,
            MULTIANEWARRAY => OperandType::UnsignedByte,
            _ => OperandType::Error,
        },
        2 => match opcode {
            INVOKEINTERFACE | INVOKEDYNAMIC => OperandType::UnsignedByteUseless,
            _ => OperandType::Error,
        },
        _ => OperandType::Error,
    }
}

/// Whether `opcode` may follow a `wide` prefix.
pub fn is_widenable(opcode: u8) -> bool {
    // iload..aload, istore..astore, iinc, ret
    matches!(opcode, 21..=25 | 54..=58 | IINC | 169)
}

/// The element type named by a `newarray` operand.
pub fn array_type_name(code: u8) -> Option<&'static str> {
    const ARRAY_TYPES: [&str; 8] = [
        "boolean", "char", "float", "double", "byte", "short", "int", "long",
    ];
    ARRAY_TYPES.get((code as usize).checked_sub(4)?).copied()
}

/// Rounds `pc` up to the next multiple of 4.
pub fn align_pc(pc: u32) -> u32 {
    match pc % 4 {
        0 => pc,
        rem => pc + 4 - rem,
    }
}

fn take<'a>(code: &'a [u8], pc: &mut u32, len: usize) -> Result<&'a [u8]> {
    let start = *pc as usize;
    let bytes = code
        .get(start..start + len)
        .ok_or(ClassFileError::Truncated)?;
    *pc += len as u32;

    Ok(bytes)
}

pub fn read_byte(code: &[u8], pc: &mut u32) -> Result<i8> {
    Ok(take(code, pc, 1)?[0] as i8)
}

pub fn read_ubyte(code: &[u8], pc: &mut u32) -> Result<u8> {
    Ok(take(code, pc, 1)?[0])
}

pub fn read_short(code: &[u8], pc: &mut u32) -> Result<i16> {
    Ok(BigEndian::read_i16(take(code, pc, 2)?))
}

pub fn read_ushort(code: &[u8], pc: &mut u32) -> Result<u16> {
    Ok(BigEndian::read_u16(take(code, pc, 2)?))
}

pub fn read_int(code: &[u8], pc: &mut u32) -> Result<i32> {
    Ok(BigEndian::read_i32(take(code, pc, 4)?))
}

fn branch_target(instruction_pc: u32, offset: i32) -> u32 {
    instruction_pc.wrapping_add(offset as u32)
}

// Rejects tables that claim more entries than the code has room for.
fn check_room(code: &[u8], pc: u32, entries: i64, entry_len: i64) -> Result<()> {
    let remaining = code.len() as i64 - pc as i64;
    if entries * entry_len > remaining {
        return Err(ClassFileError::Truncated);
    }
    Ok(())
}

/// A decoded `tableswitch`. Targets are absolute code offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSwitch {
    pub default_target: u32,
    pub low: i32,
    pub high: i32,
    /// One target per value in `low..=high`.
    pub targets: Vec<u32>,
}

/// A decoded `lookupswitch`. Targets are absolute, match values are kept
/// as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSwitch {
    pub default_target: u32,
    pub pairs: Vec<(i32, u32)>,
}

/// Reads a `tableswitch` operand. `pc` must point just past the opcode.
pub fn read_tableswitch(code: &[u8], pc: &mut u32) -> Result<TableSwitch> {
    let instruction_pc = pc.saturating_sub(1);
    *pc = align_pc(*pc);

    let default_target = branch_target(instruction_pc, read_int(code, pc)?);
    let low = read_int(code, pc)?;
    let high = read_int(code, pc)?;
    if high < low {
        return Err(ClassFileError::InvalidSwitch(low, high));
    }

    let count = high as i64 - low as i64 + 1;
    check_room(code, *pc, count, 4)?;
    let targets = (0..count)
        .map(|_| -> Result<u32> { Ok(branch_target(instruction_pc, read_int(code, pc)?)) })
        .collect::<Result<Vec<_>>>()?;

    Ok(TableSwitch {
        default_target,
        low,
        high,
        targets,
    })
}

/// Reads a `lookupswitch` operand. `pc` must point just past the opcode.
pub fn read_lookupswitch(code: &[u8], pc: &mut u32) -> Result<LookupSwitch> {
    let instruction_pc = pc.saturating_sub(1);
    *pc = align_pc(*pc);

    let default_target = branch_target(instruction_pc, read_int(code, pc)?);
    let npairs = read_int(code, pc)?;
    if npairs < 0 {
        return Err(ClassFileError::InvalidSwitch(0, npairs));
    }

    check_room(code, *pc, npairs as i64, 8)?;
    let pairs = (0..npairs)
        .map(|_| -> Result<(i32, u32)> {
            let value = read_int(code, pc)?;
            let target = branch_target(instruction_pc, read_int(code, pc)?);
            Ok((value, target))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LookupSwitch {
        default_target,
        pairs,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A plain operand and how the instruction table says to read it.
    Value(OperandType, i32),
    /// An absolute branch target.
    Target(u32),
    TableSwitch(TableSwitch),
    LookupSwitch(LookupSwitch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub pc: u32,
    pub opcode: u8,
    /// Set when the instruction was prefixed by `wide`; `pc` is then the
    /// prefix's offset.
    pub wide: bool,
    pub operands: Vec<Operand>,
}
impl Instruction {
    pub fn name(&self) -> &'static str {
        instruction_name(self.opcode).unwrap_or("")
    }
}

/// Walks a code array one instruction at a time.
///
/// An illegal opcode or a truncated operand is yielded as an error, after
/// which the iterator is exhausted.
pub struct Instructions<'a> {
    code: &'a [u8],
    pc: u32,
    failed: bool,
}
impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            pc: 0,
            failed: false,
        }
    }

    fn read_instruction(&mut self) -> Result<Instruction> {
        let pc = self.pc;
        let mut opcode = read_ubyte(self.code, &mut self.pc)?;
        let wide = opcode == WIDE;
        if wide {
            opcode = read_ubyte(self.code, &mut self.pc)?;
        }
        if opcode > MAX_LEGAL_OPCODE || (wide && !is_widenable(opcode)) {
            return Err(ClassFileError::InvalidOpcode(opcode, pc));
        }

        let operands = (0..operand_count(opcode) as usize)
            .map(|i| self.read_operand(pc, operand_type(opcode, i, wide), opcode))
            .collect::<Result<Vec<_>>>()?;

        Ok(Instruction {
            pc,
            opcode,
            wide,
            operands,
        })
    }

    fn read_operand(&mut self, pc: u32, operand_type: OperandType, opcode: u8) -> Result<Operand> {
        let (code, cursor) = (self.code, &mut self.pc);
        let value = match operand_type {
            OperandType::Byte => read_byte(code, cursor)? as i32,
            OperandType::UnsignedByte
            | OperandType::ByteArrayType
            | OperandType::ByteConstantIndex
            | OperandType::UnsignedByteUseless => read_ubyte(code, cursor)? as i32,
            OperandType::Short => read_short(code, cursor)? as i32,
            OperandType::UnsignedShort
            | OperandType::ShortClassIndex
            | OperandType::ShortMethodIndex
            | OperandType::ShortFieldIndex
            | OperandType::ShortConstantIndex => read_ushort(code, cursor)? as i32,
            OperandType::Int => read_int(code, cursor)?,
            OperandType::ShortOffset => {
                let offset = read_short(code, cursor)?;
                return Ok(Operand::Target(branch_target(pc, offset as i32)));
            }
            OperandType::IntOffset => {
                let offset = read_int(code, cursor)?;
                return Ok(Operand::Target(branch_target(pc, offset)));
            }
            OperandType::TableSwitch => {
                return Ok(Operand::TableSwitch(read_tableswitch(code, cursor)?))
            }
            OperandType::LookupSwitch => {
                return Ok(Operand::LookupSwitch(read_lookupswitch(code, cursor)?))
            }
            // `wide` is folded into the instruction it modifies, so neither
            // of these can be read as an operand.
            OperandType::None | OperandType::Instruction | OperandType::Error => {
                return Err(ClassFileError::InvalidOpcode(opcode, pc))
            }
        };

        Ok(Operand::Value(operand_type, value))
    }
}
impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc as usize >= self.code.len() {
            return None;
        }

        let instruction = self.read_instruction();
        self.failed = instruction.is_err();
        Some(instruction)
    }
}



#[cfg(test)]
mod switch_tests {
    use super::*;

    #[test]
    fn it_should_align_a_tableswitch_from_the_code_start() {
        #[rustfmt::skip]
        let code = [
            0x00,                   // nop
            TABLESWITCH,            // pc 1
            0xee, 0xee,             // padding
            0x00, 0x00, 0x00, 0x1f, // default
            0x00, 0x00, 0x00, 0x01, // low
            0x00, 0x00, 0x00, 0x02, // high
            0x00, 0x00, 0x00, 0x1b,
            0xff, 0xff, 0xff, 0xff,
        ];
        let mut pc = 2;
        let switch = read_tableswitch(&code, &mut pc).unwrap();

        assert_eq!(
            switch,
            TableSwitch {
                default_target: 32,
                low: 1,
                high: 2,
                targets: vec![28, 0],
            }
        );
        assert_eq!(pc as usize, code.len());
    }

    #[test]
    fn it_should_not_pad_an_aligned_lookupswitch() {
        #[rustfmt::skip]
        let code = [
            0x00, 0x00, 0x00,
            LOOKUPSWITCH,           // pc 3
            0x00, 0x00, 0x00, 0x10, // default
            0x00, 0x00, 0x00, 0x02, // npairs
            0xff, 0xff, 0xff, 0xfb, 0x00, 0x00, 0x00, 0x15,
            0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x19,
        ];
        let mut pc = 4;
        let switch = read_lookupswitch(&code, &mut pc).unwrap();

        assert_eq!(switch.default_target, 19);
        assert_eq!(switch.pairs, vec![(-5, 24), (7, 28)]);
        assert_eq!(pc as usize, code.len());
    }

    #[test]
    fn it_should_reject_an_inverted_range() {
        #[rustfmt::skip]
        let code = [
            TABLESWITCH, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x05,
            0x00, 0x00, 0x00, 0x01,
        ];
        let mut pc = 1;
        assert!(matches!(
            read_tableswitch(&code, &mut pc),
            Err(ClassFileError::InvalidSwitch(5, 1))
        ));
    }

    #[test]
    fn it_should_fail_when_the_table_is_too_large() {
        #[rustfmt::skip]
        let code = [
            LOOKUPSWITCH, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x7f, 0xff, 0xff, 0xff,
        ];
        let mut pc = 1;
        assert!(matches!(
            read_lookupswitch(&code, &mut pc),
            Err(ClassFileError::Truncated)
        ));
    }
}
