// https://docs.oracle.com/javase/7/docs/technotes/guides/jar/jar.html#JAR_Manifest

mod error;
mod manifest;

pub use error::ManifestError;
pub use manifest::{Manifest, ManifestEntry, Section};

pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
