use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(io::Error),
    #[error("Unexpected end of data")]
    Truncated,
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Class not found: {0}")]
    ClassNotFound(String),
    #[error("Invalid switch table bounds: {0}..={1}")]
    InvalidSwitch(i32, i32),
    #[error("Invalid opcode {0} at pc {1}")]
    InvalidOpcode(u8, u32),
}

impl From<io::Error> for ClassFileError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => ClassFileError::Truncated,
            _ => ClassFileError::IOError(e),
        }
    }
}
