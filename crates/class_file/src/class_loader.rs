use std::{
    env, fs,
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

use crate::jstring;

const CLASSPATH_SEPARATORS: [char; 2] = [':', ';'];

/// An ordered list of directories and archives to look classes up in.
/// Entries are unique; adding one that is already present does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPath {
    entries: Vec<String>,
}
impl ClassPath {
    /// Splits `classpath` on `:` and `;`, ignoring empty entries.
    pub fn new(classpath: &str) -> Self {
        let mut res = Self::default();
        res.extend(classpath);
        res
    }

    pub fn extend(&mut self, classpath: &str) {
        classpath
            .split(&CLASSPATH_SEPARATORS[..])
            .filter(|entry| !entry.is_empty())
            .for_each(|entry| self.push(entry));
    }

    pub fn push(&mut self, entry: &str) {
        if !self.entries.iter().any(|e| e == entry) {
            self.entries.push(entry.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strategy for finding classes on a class path.
///
/// Callers hand a loader to [`ClassFile::load`](crate::ClassFile::load);
/// [`DefaultClassLoader`] only searches plain directories.
pub trait ClassLoader {
    /// The file holding `class_name`, if one exists on `classpath`.
    fn class_filename(&self, class_name: &str, classpath: &ClassPath) -> Option<PathBuf>;

    /// The raw bytes of `class_name`.
    fn class_file(&self, class_name: &str, classpath: &ClassPath) -> Option<Vec<u8>> {
        let filename = self.class_filename(class_name, classpath)?;
        log::trace!("Reading {} from {}", class_name, filename.display());
        fs::read(filename).ok()
    }

    /// Builds the class path to search, boot class path first.
    fn classpath(&self, classpath: Option<&str>, bootclasspath: Option<&str>) -> ClassPath;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassLoader;

impl DefaultClassLoader {
    fn is_archive(entry: &str) -> bool {
        entry.len() > 4 && entry.ends_with(".jar")
    }

    fn bootstrap_library(java_home: &str) -> String {
        Path::new(java_home)
            .join("jre")
            .join("lib")
            .join("rt.jar")
            .to_string_lossy()
            .into_owned()
    }
}

impl ClassLoader for DefaultClassLoader {
    fn class_filename(&self, class_name: &str, classpath: &ClassPath) -> Option<PathBuf> {
        let relative = if class_name.len() > 6 && class_name.ends_with(".class") {
            class_name.to_string()
        } else {
            jstring::class_name_to_filename(class_name, MAIN_SEPARATOR)
        };

        classpath
            .iter()
            .filter(|entry| {
                if Self::is_archive(entry) {
                    log::debug!("Skipping archive {} while looking for {}", entry, class_name);
                    return false;
                }
                true
            })
            .map(|entry| Path::new(entry).join(&relative))
            .find(|path| path.is_file())
    }

    /// Falls back to `$CLASSPATH` and `$JAVA_HOME/jre/lib/rt.jar` for
    /// whichever of the two is not given.
    fn classpath(&self, classpath: Option<&str>, bootclasspath: Option<&str>) -> ClassPath {
        let bootclasspath = match bootclasspath {
            Some(bootclasspath) => Some(bootclasspath.to_string()),
            None => env::var("JAVA_HOME")
                .ok()
                .map(|java_home| Self::bootstrap_library(&java_home)),
        };
        let classpath = match classpath {
            Some(classpath) => Some(classpath.to_string()),
            None => env::var("CLASSPATH").ok(),
        };

        let mut res = ClassPath::default();
        bootclasspath.iter().for_each(|path| res.extend(path));
        classpath.iter().for_each(|path| res.extend(path));
        res
    }
}

#[cfg(test)]
mod classpath_tests {
    use super::*;

    #[test]
    fn it_should_split_on_both_separators() {
        let classpath = ClassPath::new("/a:/b;lib/c.jar");
        assert_eq!(classpath.iter().collect::<Vec<_>>(), vec!["/a", "/b", "lib/c.jar"]);
    }

    #[test]
    fn it_should_drop_duplicates_and_empty_entries() {
        let classpath = ClassPath::new("/a::/b:/a;;/b");
        assert_eq!(classpath.iter().collect::<Vec<_>>(), vec!["/a", "/b"]);
    }

    #[test]
    fn it_should_put_the_boot_class_path_first() {
        let classpath = DefaultClassLoader.classpath(Some("/user:/boot"), Some("/boot:/rt.jar"));
        assert_eq!(
            classpath.iter().collect::<Vec<_>>(),
            vec!["/boot", "/rt.jar", "/user"]
        );
    }
}
