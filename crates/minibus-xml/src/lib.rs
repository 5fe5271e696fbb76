//! Introspection XML support for the `minibus` D-Bus implementation.
//!
//! Documents follow the freedesktop introspection DTD: a `<node>`
//! holds zero or more `<interface>` elements with their methods,
//! signals and properties, and zero or more named child `<node>`
//! elements.
//!
//! [`parse_node`] turns a document received from a remote peer into an
//! element tree, and [`emit_node`] renders the tree of a locally
//! exported object back into a document.

#[cfg(test)]
mod tests;

pub use self::elements::{Access, Argument, Direction, Interface, Method, Node, Property, Signal};
mod elements;

pub use self::error::{Error, Result};
mod error;

pub use self::parser::parse_node;
mod parser;

pub use self::emit::emit_node;
mod emit;

/// The DOCTYPE preamble expected on introspection documents.
pub const DOCTYPE: &str = "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n \"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">";
