//! Core types for the `minibus` D-Bus implementation.
//!
//! This crate contains the pieces which are shared between the main
//! library and the introspection XML tooling: the raw protocol type
//! codes and the validated [`Signature`] model.
//!
//! [`Signature`]: crate::signature::Signature

#[macro_use]
mod macros;

pub mod proto;

pub mod signature;
