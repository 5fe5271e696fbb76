//! The blocking connection to a message bus.

pub use self::connection::{Connection, ObjectHandle};
mod connection;

pub use self::transport::Bus;
pub(crate) use self::transport::Transport;
mod transport;
