//! Text helpers: modified UTF-8 decoding, escaping and descriptor rendering.

/// Decodes the class file flavour of UTF-8.
///
/// A zero byte ends the string. Input that is not well-formed modified
/// UTF-8 is decoded run by run, malformed runs becoming U+FFFD.
pub fn decode_modified_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.split(|b| *b == 0).next().unwrap_or_default();

    match cesu8::from_java_cesu8(bytes) {
        Ok(text) => text.into_owned(),
        Err(_) => {
            log::debug!("Decoding malformed modified UTF-8 lossily");
            decode_lossy(bytes)
        }
    }
}

// Each 1, 2 or 3 byte run becomes one UTF-16 code unit.
fn decode_lossy(bytes: &[u8]) -> String {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 {
            units.push(b0 as u16);
            i += 1;
        } else if b0 & 0xe0 == 0xc0 {
            let Some(&b1) = bytes.get(i + 1) else {
                units.push(0xfffd);
                break;
            };
            units.push(((b0 as u16 & 0x1f) << 6) | (b1 as u16 & 0x3f));
            i += 2;
        } else if b0 & 0xf0 == 0xe0 {
            let (Some(&b1), Some(&b2)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                units.push(0xfffd);
                break;
            };
            units.push(
                ((b0 as u16 & 0x0f) << 12) | ((b1 as u16 & 0x3f) << 6) | (b2 as u16 & 0x3f),
            );
            i += 3;
        } else {
            units.push(0xfffd);
            i += 1;
        }
    }

    String::from_utf16_lossy(&units)
}

/// Escapes control characters, backslashes and double quotes.
pub fn printable(raw: &str) -> String {
    let mut s = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '\x07' => s.push_str("\\a"),
            '\x08' => s.push_str("\\b"),
            '\t' => s.push_str("\\t"),
            '\n' => s.push_str("\\n"),
            '\x0b' => s.push_str("\\v"),
            '\x0c' => s.push_str("\\f"),
            '\r' => s.push_str("\\r"),
            '\\' => s.push_str("\\\\"),
            '"' => s.push_str("\\\""),
            c if c < ' ' => {
                s.push('\\');
                s.push_str(&format!("{:02}", c as u32));
            }
            c => s.push(c),
        }
    }

    s
}

fn primitive_name(code: char) -> Option<&'static str> {
    Some(match code {
        'B' => "byte",
        'C' => "char",
        'D' => "double",
        'F' => "float",
        'I' => "int",
        'J' => "long",
        'S' => "short",
        'V' => "void",
        'Z' => "boolean",
        _ => return None,
    })
}

/// Renders a base type code or an `L...;` reference, without array dimensions.
pub(crate) fn element_type_name(descriptor: &str) -> String {
    let mut chars = descriptor.chars();
    match chars.next() {
        Some('L') => chars
            .take_while(|c| *c != ';')
            .map(|c| if c == '/' { '.' } else { c })
            .collect(),
        Some(c) => primitive_name(c)
            .map(str::to_owned)
            .unwrap_or_else(|| c.to_string()),
        None => String::new(),
    }
}

/// Gives the display type of a field descriptor, or the return type of a
/// method descriptor.
///
/// `"[[Ljava/lang/String;"` becomes `"java.lang.String[][]"`.
pub fn descriptor_type(descriptor: &str) -> String {
    let descriptor = match descriptor.strip_prefix('(') {
        Some(rest) => rest.split_once(')').map(|(_, ret)| ret).unwrap_or(""),
        None => descriptor,
    };

    let element = descriptor.trim_start_matches('[');
    let dimensions = descriptor.len() - element.len();

    let mut type_name = element_type_name(element);
    type_name.push_str(&"[]".repeat(dimensions));
    type_name
}

/// Splits the parameter section of a method descriptor into display types.
///
/// Anything that is not a method descriptor has no parameters.
pub fn descriptor_parameters(descriptor: &str) -> Vec<String> {
    let Some(mut rest) = descriptor.strip_prefix('(') else {
        return Vec::new();
    };

    let mut params = Vec::new();
    while let Some(c) = rest.chars().next() {
        if c == ')' {
            break;
        }

        let element = rest.trim_start_matches('[');
        let token_len = match element.chars().next() {
            Some('L') => element.find(';').map(|end| end + 1).unwrap_or(element.len()),
            Some(c) => c.len_utf8(),
            None => 0,
        };
        let token_end = rest.len() - element.len() + token_len;
        if token_end == 0 {
            break;
        }

        params.push(descriptor_type(&rest[..token_end]));
        rest = &rest[token_end..];
    }

    params
}

/// Renders the parameters of a method descriptor as `(int, java.lang.String)`.
///
/// Returns an empty string for field descriptors.
pub fn descriptor_parameters_string(descriptor: &str) -> String {
    if !descriptor.starts_with('(') {
        return String::new();
    }

    format!("({})", descriptor_parameters(descriptor).join(", "))
}

pub fn is_primitive_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "void" | "byte" | "char" | "double" | "float" | "int" | "long" | "short" | "boolean"
    )
}

/// `java.lang.String` lives in `java.lang`. Classes in the default package
/// have no package.
pub fn package_from_class_name(class_name: &str) -> Option<String> {
    let name = class_name.split('(').next().unwrap_or(class_name);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(last) => Some(name[..last].to_owned()),
    }
}

/// Extracts the owning class from a rendered method signature such as
/// `void java.lang.Object.wait(long)` or `java.lang.Object()`.
pub fn class_from_method_signature(signature: &str) -> Option<String> {
    let head = &signature[..signature.find('(')?];

    match head.split_once(' ') {
        Some((_, qualified)) => qualified
            .rsplit_once('.')
            .map(|(class, _)| class.to_owned())
            .filter(|class| !class.is_empty()),
        None if !head.is_empty() => Some(head.to_owned()),
        None => None,
    }
}

/// `java.lang.String` becomes `java/lang/String.class` for a `/` separator.
pub fn class_name_to_filename(class_name: &str, separator: char) -> String {
    let mut filename: String = class_name
        .chars()
        .map(|c| if c == '.' { separator } else { c })
        .collect();
    filename.push_str(".class");
    filename
}

pub fn float_to_string(bits: u32) -> String {
    match bits {
        0x7f80_0000 => "+infinity".to_owned(),
        0xff80_0000 => "-infinity".to_owned(),
        0x7f80_0001..=0x7fff_ffff | 0xff80_0001..=0xffff_ffff => "NaN".to_owned(),
        0x0000_0000 | 0x8000_0000 => "0".to_owned(),
        _ => f32::from_bits(bits).to_string(),
    }
}

pub fn double_to_string(bits: u64) -> String {
    match bits {
        0x7ff0_0000_0000_0000 => "+infinity".to_owned(),
        0xfff0_0000_0000_0000 => "-infinity".to_owned(),
        0x7ff0_0000_0000_0001..=0x7fff_ffff_ffff_ffff
        | 0xfff0_0000_0000_0001..=0xffff_ffff_ffff_ffff => "NaN".to_owned(),
        0 | 0x8000_0000_0000_0000 => "0".to_owned(),
        _ => f64::from_bits(bits).to_string(),
    }
}
