//! Names and types associated with the `org.freedesktop.DBus`
//! interface.

use minibus_core::{wire_enum, wire_flags};

use crate::ObjectPath;

/// Well known destination of the message bus itself.
pub const DESTINATION: &str = "org.freedesktop.DBus";

/// Well known interface of the message bus itself.
pub const INTERFACE: &str = "org.freedesktop.DBus";

/// Well known path of the message bus itself.
pub const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");

/// The standard interface for introspection.
pub const INTROSPECTABLE: &str = "org.freedesktop.DBus.Introspectable";

/// The standard interface for property access.
pub const PROPERTIES: &str = "org.freedesktop.DBus.Properties";

/// Error name replied when a method does not exist.
pub const ERROR_UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";

/// Error name replied when an interface does not exist.
pub const ERROR_UNKNOWN_INTERFACE: &str = "org.freedesktop.DBus.Error.UnknownInterface";

/// Error name replied when no object lives at the requested path.
pub const ERROR_UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";

/// Error name replied when arguments do not match what was expected.
pub const ERROR_INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";

/// Error name replied when a handler fails internally.
pub const ERROR_FAILED: &str = "org.freedesktop.DBus.Error.Failed";

wire_flags! {
    /// The flags of a `RequestName` call.
    #[repr(u32)]
    pub enum NameFlag {
        /// Allow another application which asks for replacement to take
        /// the name over.
        ALLOW_REPLACEMENT = 1,
        /// Try to replace the current owner if there is one.
        REPLACE_EXISTING = 2,
        /// Fail the request instead of queueing when the name is
        /// already owned.
        DO_NOT_QUEUE = 4,
    }
}

wire_enum! {
    /// The reply of a `RequestName` call.
    #[repr(u32)]
    pub enum NameReply {
        /// The caller is now the primary owner of the name.
        PRIMARY_OWNER = 1,
        /// The name already had an owner and the request was queued.
        IN_QUEUE = 2,
        /// The name already has an owner and the request failed.
        EXISTS = 3,
        /// The caller already owns the name.
        ALREADY_OWNER = 4,
    }
}
