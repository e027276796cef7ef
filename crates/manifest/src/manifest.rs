use std::{fs, path::Path};

use crate::{ManifestError, Result};

const SECTION_HEADER: &str = "Name:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub key: String,
    // Empty values are kept as `None`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: Option<String>,
    entries: Vec<ManifestEntry>,
}
impl Section {
    /// `None` for the main section.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// The value of the first entry named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)?
            .value
            .as_deref()
    }
}

/// A parsed JAR manifest.
///
/// The main section always comes first and is always present, even when
/// the text starts straight away with a `Name:` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    sections: Vec<Section>,
}
impl Manifest {
    /// Parses manifest text in two passes.
    ///
    /// The first pass splits the text on `\n`, collecting section names and
    /// how many entries each section holds. The second pass fills the
    /// sections, also treating a lone `\r` as the end of a line. Entries it
    /// finds beyond what the first pass counted are dropped.
    pub fn parse(text: &str) -> Self {
        let (mut sections, capacities) = Self::count_sections(text);
        Self::fill_sections(text, &mut sections, &capacities);

        Self { sections }
    }

    /// Parses the first `len` bytes of `buf`, or everything up to the first
    /// NUL byte when `len` is 0.
    pub fn from_bytes(buf: &[u8], len: usize) -> Result<Self> {
        let bytes = match len {
            0 => buf.split(|b| *b == 0).next().unwrap_or_default(),
            len => buf
                .get(..len)
                .ok_or(ManifestError::LengthOutOfRange(len, buf.len()))?,
        };

        Ok(Self::parse(std::str::from_utf8(bytes)?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?, 0)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn main_section(&self) -> &Section {
        &self.sections[0]
    }

    pub fn named_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().skip(1)
    }

    /// Finds a section by name; `None` selects the main section.
    pub fn section(&self, name: Option<&str>) -> Option<&Section> {
        match name {
            None => Some(self.main_section()),
            Some(name) => self.named_sections().find(|s| s.name() == Some(name)),
        }
    }

    pub fn get_entry(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    fn count_sections(text: &str) -> (Vec<Section>, Vec<usize>) {
        let mut sections = vec![Section {
            name: None,
            entries: Vec::new(),
        }];
        let mut capacities = vec![0];

        for line in text.split('\n') {
            let line = line.trim_start_matches(&[' ', '\r'][..]);
            if let Some(name) = line.strip_prefix(SECTION_HEADER) {
                let name = name.trim_start_matches(' ');
                let name = name.split('\r').next().unwrap_or_default();
                sections.push(Section {
                    name: Some(name.to_string()),
                    entries: Vec::new(),
                });
                capacities.push(0);
            } else if Self::split_entry(line).is_some() {
                if let Some(count) = capacities.last_mut() {
                    *count += 1;
                }
            }
        }

        (sections, capacities)
    }

    fn fill_sections(text: &str, sections: &mut [Section], capacities: &[usize]) {
        let mut current = 0;

        for line in text.split(&['\r', '\n'][..]) {
            let line = line.trim_start_matches(' ');
            if line.starts_with(SECTION_HEADER) {
                current += 1;
                continue;
            }
            let Some((key, value)) = Self::split_entry(line) else {
                continue;
            };

            match sections.get_mut(current) {
                Some(section) if section.entries.len() < capacities[current] => {
                    section.entries.push(ManifestEntry {
                        key: key.to_string(),
                        value: Some(value).filter(|v| !v.is_empty()).map(str::to_string),
                    })
                }
                _ => log::debug!("Dropping uncounted manifest entry {}", key),
            }
        }
    }

    fn split_entry(line: &str) -> Option<(&str, &str)> {
        let (key, value) = line.split_once(':')?;
        if key.is_empty() {
            return None;
        }
        Some((key, value.trim_start_matches(' ')))
    }
}
