//! A blocking client and server implementation of the D-Bus protocol
//! over Unix domain sockets.
//!
//! The library lets a process connect to a session, system or
//! accessibility bus, authenticate, request well-known names, issue
//! synchronous method calls with typed replies, subscribe to signals,
//! and export local objects whose methods, properties and signals are
//! dispatched automatically to remote callers.
//!
//! # Examples
//!
//! Calling a method on the bus itself:
//!
//! ```no_run
//! use minibus::{Bus, BodyBuf, Connection, ObjectPath};
//!
//! const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
//!
//! let mut c = Connection::new(Bus::Session)?;
//!
//! let reply = c.method_call(
//!     "org.freedesktop.DBus",
//!     PATH,
//!     Some("org.freedesktop.DBus"),
//!     "GetId",
//!     BodyBuf::new(),
//! )?;
//!
//! let id = reply.body().load::<&str>()?;
//! println!("bus id: {id}");
//! # Ok::<_, minibus::Error>(())
//! ```
//!
//! The connection is deliberately single-threaded: all blocking happens
//! in the socket read and write primitives, and signal handlers run
//! synchronously on the calling thread. Concurrency, if needed, must be
//! layered on top by the caller.

#[doc(inline)]
pub use self::error::{Error, Result};
mod error;

#[doc(inline)]
pub use self::proto::{Endianness, Flags};
pub(crate) mod proto;

#[doc(inline)]
pub use minibus_core::signature::{Signature, SignatureBuf, SignatureError};

#[doc(inline)]
pub use self::object_path::{ObjectPath, ObjectPathBuf, ObjectPathError};
mod object_path;

#[doc(inline)]
pub use self::arg::{Arg, BasicArg, Load, Store, UnixFd};
mod arg;

#[doc(inline)]
pub use self::variant::Variant;
mod variant;

#[doc(inline)]
pub use self::body::{Body, BodyBuf};
mod body;

#[doc(inline)]
pub use self::message::{Message, MessageKind};
mod message;

pub(crate) mod sasl;

#[doc(inline)]
pub use self::connection::{Bus, Connection, ObjectHandle};
mod connection;

#[doc(inline)]
pub use self::object::{Access, ObjectBuilder};
mod object;

#[doc(inline)]
pub use self::proxy::{Proxy, Reply};
mod proxy;

pub mod org_freedesktop_dbus;
