use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Length {0} is past the end of a {1} byte buffer")]
    LengthOutOfRange(usize, usize),
}
