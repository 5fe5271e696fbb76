//! Raw type codes of the D-Bus wire format.

wire_enum! {
    /// A type code as it appears inside of a signature.
    #[repr(u8)]
    pub enum Type {
        /// Not a valid type code, used to terminate signatures.
        INVALID = b'\0',
        /// 8-bit unsigned integer.
        BYTE = b'y',
        /// Boolean value, 0 is FALSE and 1 is TRUE. Everything else is
        /// invalid.
        BOOLEAN = b'b',
        /// 16-bit signed integer.
        INT16 = b'n',
        /// 16-bit unsigned integer.
        UINT16 = b'q',
        /// 32-bit signed integer.
        INT32 = b'i',
        /// 32-bit unsigned integer.
        UINT32 = b'u',
        /// 64-bit signed integer.
        INT64 = b'x',
        /// 64-bit unsigned integer.
        UINT64 = b't',
        /// IEEE 754 double.
        DOUBLE = b'd',
        /// UTF-8 string. Must be nul terminated and contain no other nul
        /// bytes.
        STRING = b's',
        /// Name of an object instance.
        OBJECT_PATH = b'o',
        /// A type signature.
        SIGNATURE = b'g',
        /// Array.
        ARRAY = b'a',
        /// Start of a struct.
        OPEN_PAREN = b'(',
        /// End of a struct.
        CLOSE_PAREN = b')',
        /// Variant type, the type of the value is part of the value
        /// itself.
        VARIANT = b'v',
        /// Start of a dict entry.
        OPEN_BRACE = b'{',
        /// End of a dict entry.
        CLOSE_BRACE = b'}',
        /// Index into an out-of-band array of file descriptors.
        UNIX_FD = b'h',
    }
}

impl Type {
    /// Test if the code is a basic (non-container) type, which is the
    /// requirement for a dict entry key.
    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            Type::BYTE
                | Type::BOOLEAN
                | Type::INT16
                | Type::UINT16
                | Type::INT32
                | Type::UINT32
                | Type::INT64
                | Type::UINT64
                | Type::DOUBLE
                | Type::STRING
                | Type::OBJECT_PATH
                | Type::SIGNATURE
                | Type::UNIX_FD
        )
    }

    /// The natural alignment of a value of this type.
    ///
    /// Container codes report the alignment of the container head: `8`
    /// for structs and dict entries, `4` for the length prefix of an
    /// array, `1` for the signature prefix of a variant.
    pub const fn alignment(self) -> usize {
        match self {
            Type::BYTE | Type::SIGNATURE | Type::VARIANT => 1,
            Type::INT16 | Type::UINT16 => 2,
            Type::BOOLEAN
            | Type::INT32
            | Type::UINT32
            | Type::STRING
            | Type::OBJECT_PATH
            | Type::UNIX_FD
            | Type::ARRAY => 4,
            Type::INT64
            | Type::UINT64
            | Type::DOUBLE
            | Type::OPEN_PAREN
            | Type::OPEN_BRACE => 8,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Type;

    #[test]
    fn alignments() {
        assert_eq!(Type::BYTE.alignment(), 1);
        assert_eq!(Type::BOOLEAN.alignment(), 4);
        assert_eq!(Type::INT16.alignment(), 2);
        assert_eq!(Type::UINT64.alignment(), 8);
        assert_eq!(Type::DOUBLE.alignment(), 8);
        assert_eq!(Type::STRING.alignment(), 4);
        assert_eq!(Type::SIGNATURE.alignment(), 1);
        assert_eq!(Type::ARRAY.alignment(), 4);
        assert_eq!(Type::OPEN_PAREN.alignment(), 8);
        assert_eq!(Type::OPEN_BRACE.alignment(), 8);
        assert_eq!(Type::VARIANT.alignment(), 1);
        assert_eq!(Type::UNIX_FD.alignment(), 4);
    }

    #[test]
    fn basic() {
        assert!(Type::STRING.is_basic());
        assert!(Type::UNIX_FD.is_basic());
        assert!(!Type::ARRAY.is_basic());
        assert!(!Type::VARIANT.is_basic());
        assert!(!Type::OPEN_PAREN.is_basic());
    }
}
