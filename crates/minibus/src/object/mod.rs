//! Exporting local objects to remote callers.
//!
//! Objects are described through an [`ObjectBuilder`] which collects
//! the methods, properties and signals of one interface. Registration
//! computes the introspection document once; incoming calls are then
//! routed to the registered handlers, with the standard
//! `org.freedesktop.DBus.Introspectable` and
//! `org.freedesktop.DBus.Properties` interfaces answered internally.

#[cfg(test)]
mod tests;

pub use minibus_xml::Access;

pub use self::builder::ObjectBuilder;
mod builder;

pub(crate) use self::registered::{Dispatch, RegisteredObject, Reply};
mod registered;
