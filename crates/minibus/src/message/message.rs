use std::num::NonZeroU32;

use crate::body::{Body, BodyBuf};
use crate::error::{Error, ErrorKind, Result};
use crate::object_path::{ObjectPath, ObjectPathBuf};
use crate::proto::{Endianness, Flags, MessageType};
use crate::{Signature, SignatureBuf};

/// The kind of a [`Message`], and the header fields required by that
/// kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A method call to `path`.
    MethodCall {
        /// The path of the object the call is directed at.
        path: ObjectPathBuf,
        /// The member being called.
        member: Box<str>,
    },
    /// A reply to the message carrying the given serial.
    MethodReturn {
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// An error reply to the message carrying the given serial.
    Error {
        /// The name of the error.
        error_name: Box<str>,
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// A signal emission.
    Signal {
        /// The path of the object the signal is emitted from.
        path: ObjectPathBuf,
        /// The member of the emitted signal.
        member: Box<str>,
    },
}

/// An owned D-Bus message: a kind, the optional header fields, and the
/// encoded body with its signature and endianness.
///
/// Messages are constructed through [`Message::method_call`],
/// [`Message::signal`], or derived from a received message through
/// [`Message::method_return`] and [`Message::error`], which swap the
/// sender and destination.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU32;
///
/// use minibus::{Message, MessageKind, ObjectPath};
///
/// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
/// const SERIAL: NonZeroU32 = NonZeroU32::MIN;
///
/// let m = Message::method_call(PATH.into(), "Hello", SERIAL)
///     .with_destination("org.freedesktop.DBus");
///
/// assert!(matches!(m.kind(), MessageKind::MethodCall { .. }));
/// assert_eq!(m.destination(), Some("org.freedesktop.DBus"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub(crate) kind: MessageKind,
    pub(crate) serial: NonZeroU32,
    pub(crate) flags: Flags,
    pub(crate) interface: Option<Box<str>>,
    pub(crate) destination: Option<Box<str>>,
    pub(crate) sender: Option<Box<str>>,
    pub(crate) signature: SignatureBuf,
    pub(crate) body: Vec<u8>,
    pub(crate) endianness: Endianness,
}

impl Message {
    fn new(kind: MessageKind, serial: NonZeroU32) -> Self {
        Self {
            kind,
            serial,
            flags: Flags::EMPTY,
            interface: None,
            destination: None,
            sender: None,
            signature: SignatureBuf::new(),
            body: Vec::new(),
            endianness: Endianness::NATIVE,
        }
    }

    /// Construct a method call message.
    pub fn method_call(path: ObjectPathBuf, member: &str, serial: NonZeroU32) -> Self {
        Self::new(
            MessageKind::MethodCall {
                path,
                member: member.into(),
            },
            serial,
        )
    }

    /// Construct a signal message.
    pub fn signal(path: ObjectPathBuf, member: &str, serial: NonZeroU32) -> Self {
        Self::new(
            MessageKind::Signal {
                path,
                member: member.into(),
            },
            serial,
        )
    }

    /// Construct a method return replying to this message.
    ///
    /// The reply serial is taken from this message and the sender and
    /// destination are swapped.
    pub fn method_return(&self, serial: NonZeroU32) -> Self {
        Self {
            destination: self.sender.clone(),
            sender: self.destination.clone(),
            ..Self::new(
                MessageKind::MethodReturn {
                    reply_serial: self.serial,
                },
                serial,
            )
        }
    }

    /// Construct an error replying to this message.
    ///
    /// The reply serial is taken from this message and the sender and
    /// destination are swapped.
    pub fn error(&self, error_name: &str, serial: NonZeroU32) -> Self {
        Self {
            destination: self.sender.clone(),
            sender: self.destination.clone(),
            ..Self::new(
                MessageKind::Error {
                    error_name: error_name.into(),
                    reply_serial: self.serial,
                },
                serial,
            )
        }
    }

    /// The kind of the message.
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// The serial of the message.
    pub fn serial(&self) -> NonZeroU32 {
        self.serial
    }

    /// The flags of the message.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Modify the flags of the message.
    pub fn with_flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// The interface of the message, if any.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Modify the interface of the message.
    pub fn with_interface(self, interface: &str) -> Self {
        Self {
            interface: Some(interface.into()),
            ..self
        }
    }

    /// The destination of the message, if any.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Modify the destination of the message.
    pub fn with_destination(self, destination: &str) -> Self {
        Self {
            destination: Some(destination.into()),
            ..self
        }
    }

    /// The sender of the message, if any.
    ///
    /// On messages received through a bus this is filled in by the bus
    /// itself.
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Modify the sender of the message.
    pub fn with_sender(self, sender: &str) -> Self {
        Self {
            sender: Some(sender.into()),
            ..self
        }
    }

    /// The signature of the body.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Replace the body and signature of the message with the contents
    /// of the given body buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroU32;
    ///
    /// use minibus::{BodyBuf, Message, ObjectPath};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
    /// const SERIAL: NonZeroU32 = NonZeroU32::MIN;
    ///
    /// let mut body = BodyBuf::new();
    /// body.store("Hello World!")?;
    ///
    /// let m = Message::method_call(PATH.into(), "Hello", SERIAL).with_body(&body);
    ///
    /// assert_eq!(m.signature(), "s");
    /// # Ok::<_, minibus::Error>(())
    /// ```
    pub fn with_body(self, body: &BodyBuf) -> Self {
        Self {
            signature: body.signature().to_owned(),
            body: body.get().to_vec(),
            endianness: body.endianness(),
            ..self
        }
    }

    /// Get a reader over the body of the message.
    pub fn body(&self) -> Body<'_> {
        Body::new(&self.body, &self.signature, self.endianness)
    }

    /// The path of a method call or signal message.
    pub(crate) fn path(&self) -> Option<&ObjectPath> {
        match &self.kind {
            MessageKind::MethodCall { path, .. } | MessageKind::Signal { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Convert an error reply into an [`Error`] carrying the remote
    /// error name and its first string argument, passing every other
    /// kind of message through.
    pub(crate) fn into_result(self) -> Result<Message> {
        let MessageKind::Error { error_name, .. } = &self.kind else {
            return Ok(self);
        };

        let name = error_name.clone();
        let text = self.body().load::<&str>().ok().map(Box::from);

        Err(Error::new(ErrorKind::Remote {
            name,
            message: text,
        }))
    }

    pub(crate) fn message_type(&self) -> MessageType {
        match &self.kind {
            MessageKind::MethodCall { .. } => MessageType::METHOD_CALL,
            MessageKind::MethodReturn { .. } => MessageType::METHOD_RETURN,
            MessageKind::Error { .. } => MessageType::ERROR,
            MessageKind::Signal { .. } => MessageType::SIGNAL,
        }
    }
}
