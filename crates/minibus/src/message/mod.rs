//! D-Bus messages and their wire representation.

#[cfg(test)]
mod tests;

pub use self::message::{Message, MessageKind};
mod message;

pub(crate) mod wire;
