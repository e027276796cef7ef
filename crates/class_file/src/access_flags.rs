use bitflags::bitflags;

bitflags! {
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        // Shares its bit with SUPER on classes.
        const SYNCHRONIZED = 0x0020;
        const SUPER = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
    }
}

impl AccessFlags {
    /// Renders the flags the way they would be written in source, e.g.
    /// `public final class` or `private static`.
    pub fn modifiers(&self, is_class: bool) -> String {
        let mut words = Vec::new();

        if self.contains(Self::PUBLIC) {
            words.push("public");
        } else if self.contains(Self::PRIVATE) {
            words.push("private");
        } else if self.contains(Self::PROTECTED) {
            words.push("protected");
        }

        if self.contains(Self::STATIC) {
            words.push("static");
        }
        if self.contains(Self::FINAL) {
            words.push("final");
        }
        if self.contains(Self::SYNCHRONIZED) && !is_class {
            words.push("synchronized");
        }
        if self.contains(Self::VOLATILE) {
            words.push("volatile");
        }
        if self.contains(Self::TRANSIENT) {
            words.push("transient");
        }
        if self.contains(Self::NATIVE) {
            words.push("native");
        }
        if self.contains(Self::STRICT) {
            words.push("strictfp");
        }

        if self.contains(Self::INTERFACE) {
            words.push("interface");
        } else if is_class {
            if self.contains(Self::ABSTRACT) {
                words.push("abstract");
            }
            words.push("class");
        }

        words.join(" ")
    }
}
