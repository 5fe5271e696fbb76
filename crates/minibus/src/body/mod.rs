//! Reading and writing of message bodies.

#[cfg(test)]
mod tests;

pub use self::body_buf::BodyBuf;
mod body_buf;

pub use self::body::Body;
mod body;
