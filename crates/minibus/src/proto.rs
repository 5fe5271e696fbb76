//! Low level details of the D-Bus wire protocol.

use minibus_core::{wire_enum, wire_flags};

pub(crate) use minibus_core::proto::Type;

/// The protocol major version spoken by this library.
pub(crate) const VERSION: u8 = 1;

wire_enum! {
    /// The endianness of a message.
    #[repr(u8)]
    pub enum Endianness {
        /// Little endian, the `l` flag.
        LITTLE = b'l',
        /// Big endian, the `B` flag.
        BIG = b'B',
    }
}

impl Endianness {
    /// The endianness of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::LITTLE;
    /// The endianness of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::BIG;
}

wire_enum! {
    /// The type of a message.
    #[repr(u8)]
    pub enum MessageType {
        /// This is an invalid type.
        INVALID = 0,
        /// Method call. This message type may prompt a reply.
        METHOD_CALL = 1,
        /// Method reply with returned data.
        METHOD_RETURN = 2,
        /// Error reply. If the first argument exists and is a string, it
        /// is an error message.
        ERROR = 3,
        /// Signal emission.
        SIGNAL = 4,
    }
}

wire_flags! {
    /// Flags inside of a D-Bus message.
    #[repr(u8)]
    pub enum Flags {
        /// An empty set of flags.
        EMPTY = 0,
        /// This message does not expect method return replies or error
        /// replies, even if it is of a type that can have a reply; the
        /// reply should be omitted.
        NO_REPLY_EXPECTED = 1,
        /// The bus must not launch an owner for the destination name in
        /// response to this message.
        NO_AUTO_START = 2,
        /// The caller is prepared to wait for interactive authorization,
        /// which might take a considerable time to complete.
        ALLOW_INTERACTIVE_AUTHORIZATION = 4,
    }
}

wire_enum! {
    /// A header field code.
    #[repr(u8)]
    pub(crate) enum HeaderField {
        /// The object to send a call to, or the object a signal is
        /// emitted from.
        PATH = 1,
        /// The interface to invoke a method call on, or that a signal is
        /// emitted from.
        INTERFACE = 2,
        /// The member, either the method name or signal name.
        MEMBER = 3,
        /// The name of the error that occurred, for errors.
        ERROR_NAME = 4,
        /// The serial number of the message this message is a reply to.
        REPLY_SERIAL = 5,
        /// The name of the connection this message is intended for.
        DESTINATION = 6,
        /// Unique name of the sending connection, controlled by the
        /// message bus.
        SENDER = 7,
        /// The signature of the message body. If omitted, the body must
        /// be empty.
        SIGNATURE = 8,
        /// The number of Unix file descriptors that accompany the
        /// message.
        UNIX_FDS = 9,
    }
}

/// The maximum length of an array in bytes.
pub(crate) const MAX_ARRAY_LENGTH: u32 = 1u32 << 26;

/// The maximum length of a body in bytes.
pub(crate) const MAX_BODY_LENGTH: u32 = 1u32 << 27;

/// Padding needed to bring `len` up to the given power-of-two alignment.
#[inline(always)]
pub(crate) fn padding_to(align: usize, len: usize) -> usize {
    let mask = align - 1;
    (align - (len & mask)) & mask
}

#[cfg(test)]
mod tests {
    use super::padding_to;

    #[test]
    fn padding() {
        assert_eq!(padding_to(8, 0), 0);
        assert_eq!(padding_to(8, 1), 7);
        assert_eq!(padding_to(8, 8), 0);
        assert_eq!(padding_to(8, 12), 4);
        assert_eq!(padding_to(4, 2), 2);
        assert_eq!(padding_to(2, 1), 1);
        assert_eq!(padding_to(1, 17), 0);
    }
}
