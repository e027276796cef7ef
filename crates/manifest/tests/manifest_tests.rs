use std::{env, fs};

use jclass_manifest::Manifest;

const JAR_MANIFEST: &str = "Manifest-Version: 1.0\r\n\
Created-By: 1.4.2 (Sun Microsystems Inc.)\r\n\
Main-Class: org.example.Main\r\n\
\r\n\
Name: org/example/Main.class\r\n\
SHA1-Digest: l4PS3Zl2QqfOg9dWv7kV3Q0yLjg=\r\n\
\r\n\
Name: org/example/util/\r\n\
Sealed: true\r\n\
Implementation-Title: util\r\n";

#[test]
fn test_two_named_sections() {
    let manifest = Manifest::parse("Name: A\r\nK1: V1\r\n\r\nName: B\r\nK2: V2\r\n");

    let named: Vec<_> = manifest.named_sections().collect();
    assert_eq!(named.len(), 2);
    assert_eq!(named[0].name(), Some("A"));
    assert_eq!(named[0].entries().len(), 1);
    assert_eq!(named[1].name(), Some("B"));
    assert_eq!(named[1].entries().len(), 1);
    assert_eq!(manifest.get_entry(Some("B"), "K2"), Some("V2"));
    assert_eq!(manifest.get_entry(Some("A"), "K1"), Some("V1"));
    assert_eq!(manifest.get_entry(Some("A"), "K2"), None);
    assert!(manifest.main_section().entries().is_empty());
}

#[test]
fn test_jar_manifest() {
    let manifest = Manifest::parse(JAR_MANIFEST);

    assert_eq!(manifest.sections().len(), 3);
    assert_eq!(manifest.get_entry(None, "Main-Class"), Some("org.example.Main"));
    assert_eq!(
        manifest.get_entry(None, "Created-By"),
        Some("1.4.2 (Sun Microsystems Inc.)")
    );
    assert_eq!(
        manifest.get_entry(Some("org/example/Main.class"), "SHA1-Digest"),
        Some("l4PS3Zl2QqfOg9dWv7kV3Q0yLjg=")
    );
    assert_eq!(manifest.get_entry(Some("org/example/util/"), "Sealed"), Some("true"));

    let util = manifest.section(Some("org/example/util/")).unwrap();
    let keys: Vec<_> = util.entries().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["Sealed", "Implementation-Title"]);
}

#[test]
fn test_unix_line_endings() {
    let manifest = Manifest::parse(&JAR_MANIFEST.replace("\r\n", "\n"));
    assert_eq!(manifest, Manifest::parse(JAR_MANIFEST));
}

#[test]
fn test_bare_carriage_returns() {
    let _ = pretty_env_logger::try_init();

    let manifest = Manifest::parse("Name: A\nK1: V1\rK2: V2\n");
    assert_eq!(manifest.get_entry(Some("A"), "K1"), Some("V1"));
    assert_eq!(manifest.get_entry(Some("A"), "K2"), None);
}

#[test]
fn test_open() {
    let path = env::temp_dir().join(format!("jclass-MANIFEST-{}.MF", std::process::id()));
    fs::write(&path, JAR_MANIFEST).unwrap();

    let manifest = Manifest::open(&path).unwrap();
    assert_eq!(manifest.get_entry(None, "Manifest-Version"), Some("1.0"));

    fs::remove_file(path).unwrap();
}
