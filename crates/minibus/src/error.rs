use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;

use minibus_core::signature::SignatureError;

use crate::SignatureBuf;
use crate::object_path::ObjectPathError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised by this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Self { kind }
    }

    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The error name reported by the remote peer, if this error was
    /// produced from a reply of type `Error`.
    pub fn remote_name(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Remote { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The first string argument of a remote error reply, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Remote { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<SignatureError> for Error {
    #[inline]
    fn from(error: SignatureError) -> Self {
        Self::new(ErrorKind::Signature(error))
    }
}

impl From<ObjectPathError> for Error {
    #[inline]
    fn from(error: ObjectPathError) -> Self {
        Self::new(ErrorKind::ObjectPath(error))
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(error: io::Error) -> Self {
        Self::new(ErrorKind::Io(error))
    }
}

impl From<Utf8Error> for Error {
    #[inline]
    fn from(error: Utf8Error) -> Self {
        Self::new(ErrorKind::Utf8(error))
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io(..) => write!(f, "I/O error"),
            ErrorKind::Utf8(..) => write!(f, "UTF-8 error"),
            ErrorKind::Signature(..) => write!(f, "Signature error"),
            ErrorKind::ObjectPath(..) => write!(f, "Object path error"),
            ErrorKind::MissingBus => write!(f, "Missing bus to connect to"),
            ErrorKind::InvalidAddress => write!(f, "Invalid D-Bus address"),
            ErrorKind::HandshakeFail(line) => {
                write!(f, "Authentication rejected by peer: {line}")
            }
            ErrorKind::BadEndianFlag(b) => {
                write!(f, "Bad endianness flag {:?} in message", *b as char)
            }
            ErrorKind::BadProtocolVersion(v) => {
                write!(f, "Unsupported protocol version {v}")
            }
            ErrorKind::UnknownHeaderField(code) => {
                write!(f, "Malformed header field with code {code}")
            }
            ErrorKind::InvalidMessageType(ty) => {
                write!(f, "Invalid message type {ty}")
            }
            ErrorKind::NotNullTerminated => write!(f, "String is not nul terminated"),
            ErrorKind::ArrayTooLong(len) => {
                write!(f, "Array of length {len} is too long (max is 67108864)")
            }
            ErrorKind::BodyTooLong(len) => {
                write!(f, "Body of length {len} is too long (max is 134217728)")
            }
            ErrorKind::SignatureMismatch { expected, actual } => {
                write!(f, "Expected signature `{expected}`, but found `{actual}`")
            }
            ErrorKind::SignatureEnd => {
                write!(f, "Signature ended while values remain")
            }
            ErrorKind::EndOfBody => write!(f, "Unexpected end of message body"),
            ErrorKind::InvalidBoolean(v) => {
                write!(f, "Boolean must be 0 or 1, found {v}")
            }
            ErrorKind::NoMatchingUnionField(signature) => {
                write!(f, "No union field matching signature `{signature}`")
            }
            ErrorKind::ZeroSerial => write!(f, "Zero serial in message header"),
            ErrorKind::MissingPath => write!(f, "Missing required PATH header field"),
            ErrorKind::MissingMember => write!(f, "Missing required MEMBER header field"),
            ErrorKind::MissingInterface => {
                write!(f, "Missing required INTERFACE header field")
            }
            ErrorKind::MissingReplySerial => {
                write!(f, "Missing required REPLY_SERIAL header field")
            }
            ErrorKind::MissingErrorName => {
                write!(f, "Missing required ERROR_NAME header field")
            }
            ErrorKind::InvalidHandle(handle) => {
                write!(f, "No registered object for handle {handle}")
            }
            ErrorKind::SignalNotBound(member) => {
                write!(f, "Signal `{member}` is not declared by the registered object")
            }
            ErrorKind::Remote { name, message } => match message {
                Some(message) => write!(f, "{name}: {message}"),
                None => write!(f, "{name}"),
            },
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(error) => Some(error),
            ErrorKind::Utf8(error) => Some(error),
            ErrorKind::Signature(error) => Some(error),
            ErrorKind::ObjectPath(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    Io(io::Error),
    Utf8(Utf8Error),
    Signature(SignatureError),
    ObjectPath(ObjectPathError),
    MissingBus,
    InvalidAddress,
    HandshakeFail(Box<str>),
    BadEndianFlag(u8),
    BadProtocolVersion(u8),
    UnknownHeaderField(u8),
    InvalidMessageType(u8),
    NotNullTerminated,
    ArrayTooLong(u32),
    BodyTooLong(u32),
    SignatureMismatch {
        expected: SignatureBuf,
        actual: SignatureBuf,
    },
    SignatureEnd,
    EndOfBody,
    InvalidBoolean(u32),
    NoMatchingUnionField(SignatureBuf),
    ZeroSerial,
    MissingPath,
    MissingMember,
    MissingInterface,
    MissingReplySerial,
    MissingErrorName,
    InvalidHandle(usize),
    SignalNotBound(Box<str>),
    Remote {
        name: Box<str>,
        message: Option<Box<str>>,
    },
}
