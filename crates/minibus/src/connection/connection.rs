use std::collections::VecDeque;
use std::io::Write;
use std::num::NonZeroU32;
use std::os::unix::net::UnixStream;

use minibus_xml as xml;

use crate::body::BodyBuf;
use crate::error::{Error, ErrorKind, Result};
use crate::message::wire;
use crate::object::{Dispatch, ObjectBuilder, RegisteredObject, Reply};
use crate::object_path::ObjectPath;
use crate::org_freedesktop_dbus::{self as fdo, NameFlag, NameReply};
use crate::proto::Flags;
use crate::sasl;
use crate::{Message, MessageKind};

use super::{Bus, Transport};

/// A handle to an object registered with [`Connection::register_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHandle(pub(crate) usize);

struct SignalHandler {
    interface: Box<str>,
    member: Box<str>,
    callback: Box<dyn FnMut(&Message) + Send>,
}

/// A blocking connection to a D-Bus message bus.
///
/// The connection owns the socket, the serial counter, a queue of
/// messages read while waiting for something else, the registered
/// signal handlers and the registered objects. It is deliberately not
/// internally synchronised: all operations block the calling thread
/// until their completion condition is met, and signal handlers run
/// synchronously on that same thread.
///
/// # Examples
///
/// ```no_run
/// use minibus::{BodyBuf, Bus, Connection};
/// use minibus::org_freedesktop_dbus as fdo;
///
/// let mut c = Connection::new(Bus::Session)?;
///
/// let reply = c.method_call(
///     fdo::DESTINATION,
///     fdo::PATH,
///     Some(fdo::INTERFACE),
///     "ListNames",
///     BodyBuf::new(),
/// )?;
///
/// let names = reply.body().load::<Vec<String>>()?;
/// # Ok::<_, minibus::Error>(())
/// ```
pub struct Connection {
    transport: Transport,
    /// The serial assigned to the next outgoing message.
    serial: u32,
    unique_name: Option<Box<str>>,
    /// Messages read while waiting for a reply, in arrival order.
    pending: VecDeque<Message>,
    handlers: Vec<SignalHandler>,
    objects: Vec<RegisteredObject>,
}

impl Connection {
    /// Connect to the given bus.
    ///
    /// This resolves the socket address of the bus, authenticates with
    /// SASL `EXTERNAL`, and performs the mandatory `Hello` call which
    /// assigns the connection its unique name.
    pub fn new(bus: Bus) -> Result<Self> {
        let mut transport = Transport::connect(bus)?;
        sasl::authenticate(&mut transport)?;

        let mut connection = Self::with_transport(transport);
        connection.hello()?;
        Ok(connection)
    }

    /// Construct a connection over an already connected and
    /// authenticated stream, such as one side of a socket pair.
    ///
    /// No `Hello` is performed: direct peer-to-peer connections have
    /// no bus to assign unique names.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self::with_transport(Transport::from_stream(stream))
    }

    fn with_transport(transport: Transport) -> Self {
        Self {
            transport,
            serial: 1,
            unique_name: None,
            pending: VecDeque::new(),
            handlers: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// The unique name assigned by the bus at `Hello` time, such as
    /// `:1.131`.
    pub fn unique_name(&self) -> Option<&str> {
        self.unique_name.as_deref()
    }

    /// Close the connection, dropping any queued messages and
    /// registered objects.
    pub fn close(self) {}

    fn hello(&mut self) -> Result<()> {
        let message = Message::method_call(fdo::PATH.into(), "Hello", self.next_serial())
            .with_interface(fdo::INTERFACE)
            .with_destination(fdo::DESTINATION);

        let serial = message.serial();
        self.send_message(&message)?;

        let reply = self.wait_for_reply(serial)?.into_result()?;
        let name = reply.body().load::<&str>()?;

        tracing::debug!(name, "connected");
        self.unique_name = Some(name.into());
        Ok(())
    }

    fn next_serial(&mut self) -> NonZeroU32 {
        loop {
            let serial = self.serial;
            self.serial = self.serial.wrapping_add(1);

            if let Some(serial) = NonZeroU32::new(serial) {
                return serial;
            }
        }
    }

    /// Send a message without waiting for anything in return.
    pub fn send_message(&mut self, message: &Message) -> Result<()> {
        let bytes = wire::pack(message)?;
        self.transport.write_all(&bytes)?;
        self.transport.flush()?;

        tracing::trace!(
            serial = message.serial().get(),
            kind = ?message.kind(),
            "sent message"
        );

        Ok(())
    }

    /// Perform a synchronous method call and return its reply.
    ///
    /// The reply may be of kind [`MessageKind::Error`]; it is returned
    /// as-is rather than converted, so that callers can inspect the
    /// full message. [`Proxy`] converts error replies into errors.
    ///
    /// [`Proxy`]: crate::Proxy
    pub fn method_call(
        &mut self,
        destination: &str,
        path: &ObjectPath,
        interface: Option<&str>,
        member: &str,
        body: BodyBuf,
    ) -> Result<Message> {
        let mut message = Message::method_call(path.into(), member, self.next_serial())
            .with_destination(destination)
            .with_body(&body);

        if let Some(interface) = interface {
            message = message.with_interface(interface);
        }

        let serial = message.serial();
        self.send_message(&message)?;
        self.wait_for_reply(serial)
    }

    /// Wait for the reply to the request with the given serial,
    /// buffering unrelated messages and dispatching registered
    /// signals along the way.
    fn wait_for_reply(&mut self, serial: NonZeroU32) -> Result<Message> {
        let mut found = None;

        for (at, message) in self.pending.iter().enumerate() {
            if is_reply_to(message, serial) {
                found = Some(at);
                break;
            }
        }

        if let Some(at) = found {
            if let Some(message) = self.pending.remove(at) {
                return Ok(message);
            }
        }

        loop {
            let message = wire::read_message(&mut self.transport)?;

            if is_reply_to(&message, serial) {
                return Ok(message);
            }

            if self.dispatch_signal(&message) {
                continue;
            }

            self.pending.push_back(message);
        }
    }

    /// Return the next message which is not consumed by a registered
    /// signal handler.
    ///
    /// Messages buffered while waiting for replies are delivered
    /// first, in arrival order.
    pub fn wait_message(&mut self) -> Result<Message> {
        if let Some(message) = self.pending.pop_front() {
            return Ok(message);
        }

        loop {
            let message = wire::read_message(&mut self.transport)?;

            if self.dispatch_signal(&message) {
                continue;
            }

            return Ok(message);
        }
    }

    /// Invoke every registered handler matching a signal. Returns
    /// whether at least one handler consumed the message.
    fn dispatch_signal(&mut self, message: &Message) -> bool {
        let MessageKind::Signal { member, .. } = message.kind() else {
            return false;
        };

        let interface = message.interface().unwrap_or_default();
        let mut matched = false;

        for handler in &mut self.handlers {
            if *handler.interface == *interface && *handler.member == **member {
                (handler.callback)(message);
                matched = true;
            }
        }

        if matched {
            tracing::trace!(interface, member = &**member, "dispatched signal");
        }

        matched
    }

    /// Register a callback for signals matching the given interface
    /// and member.
    ///
    /// Handlers run synchronously on the calling thread, from inside
    /// [`wait_message`], [`serve`] or any synchronous call waiting
    /// for its reply.
    ///
    /// [`wait_message`]: Self::wait_message
    /// [`serve`]: Self::serve
    pub fn register_signal_handler<F>(&mut self, interface: &str, member: &str, callback: F)
    where
        F: FnMut(&Message) + Send + 'static,
    {
        self.handlers.push(SignalHandler {
            interface: interface.into(),
            member: member.into(),
            callback: Box::new(callback),
        });
    }

    /// Subscribe to signals matching a match rule, such as
    /// `type='signal',interface='org.freedesktop.DBus'`.
    pub fn add_match(&mut self, rule: &str) -> Result<()> {
        let mut body = BodyBuf::new();
        body.store(rule)?;

        self.method_call(fdo::DESTINATION, fdo::PATH, Some(fdo::INTERFACE), "AddMatch", body)?
            .into_result()?;

        Ok(())
    }

    /// Request a well-known name, without queueing and replacing an
    /// existing owner where permitted.
    pub fn request_name(&mut self, name: &str) -> Result<NameReply> {
        let flags = NameFlag::DO_NOT_QUEUE | NameFlag::REPLACE_EXISTING;

        let mut body = BodyBuf::new();
        body.store(name)?;
        body.store(flags.get())?;

        let reply = self
            .method_call(
                fdo::DESTINATION,
                fdo::PATH,
                Some(fdo::INTERFACE),
                "RequestName",
                body,
            )?
            .into_result()?;

        let reply = NameReply::new(reply.body().load::<u32>()?);
        tracing::debug!(name, ?reply, "requested name");
        Ok(reply)
    }

    /// Export an object at the given path under the given well-known
    /// bus name.
    ///
    /// The bus name is requested first; the introspection document of
    /// the object is computed once at registration. Calls are
    /// dispatched by [`serve`].
    ///
    /// On a peer-to-peer connection established through
    /// [`from_stream`] there is no bus to own names, and the name
    /// request is skipped.
    ///
    /// [`serve`]: Self::serve
    /// [`from_stream`]: Self::from_stream
    pub fn register_object(
        &mut self,
        bus_name: &str,
        path: &ObjectPath,
        builder: ObjectBuilder,
    ) -> Result<ObjectHandle> {
        if self.unique_name.is_some() {
            self.request_name(bus_name)?;
        }

        let object = RegisteredObject::new(path, builder)?;
        tracing::debug!(path = %object.path(), interface = object.interface(), "registered object");

        self.objects.push(object);
        Ok(ObjectHandle(self.objects.len() - 1))
    }

    /// Reply to a method call with the given body.
    pub fn send_reply(&mut self, request: &Message, body: &BodyBuf) -> Result<()> {
        let reply = request.method_return(self.next_serial()).with_body(body);
        self.send_message(&reply)
    }

    /// Reply to a method call with an error.
    pub fn send_error(&mut self, request: &Message, name: &str, text: &str) -> Result<()> {
        let mut body = BodyBuf::new();
        body.store(text)?;

        let reply = request.error(name, self.next_serial()).with_body(&body);
        self.send_message(&reply)
    }

    /// Emit a signal declared by a registered object.
    ///
    /// # Errors
    ///
    /// Errors with `SignalNotBound` if the member is not declared by
    /// the object, and with a signature mismatch if the body does not
    /// match the declared payload.
    pub fn emit_signal(&mut self, handle: ObjectHandle, member: &str, body: &BodyBuf) -> Result<()> {
        let object = self
            .objects
            .get(handle.0)
            .ok_or_else(|| Error::new(ErrorKind::InvalidHandle(handle.0)))?;

        let Some(expected) = object.signal_signature(member) else {
            return Err(Error::new(ErrorKind::SignalNotBound(member.into())));
        };

        if *body.signature() != *expected {
            return Err(Error::new(ErrorKind::SignatureMismatch {
                expected: expected.to_owned(),
                actual: body.signature().to_owned(),
            }));
        }

        let path = object.path().to_owned();
        let interface = object.interface().to_owned();

        let message = Message::signal(path, member, self.next_serial())
            .with_interface(&interface)
            .with_body(body);

        self.send_message(&message)
    }

    /// Serve incoming method calls on the registered objects,
    /// indefinitely.
    ///
    /// Calls are routed to registered objects by exact path match,
    /// with the standard `Introspectable` and `Properties` interfaces
    /// answered internally. An `Introspect` call on a path which has
    /// registered objects below it is answered with a node
    /// enumerating the first-level children.
    pub fn serve(&mut self, handle: ObjectHandle) -> Result<()> {
        if handle.0 >= self.objects.len() {
            return Err(Error::new(ErrorKind::InvalidHandle(handle.0)));
        }

        loop {
            let message = self.wait_message()?;

            match message.kind() {
                MessageKind::MethodCall { .. } => {
                    self.handle_method_call(&message)?;
                }
                kind => {
                    tracing::trace!(?kind, "ignoring message");
                }
            }
        }
    }

    fn handle_method_call(&mut self, message: &Message) -> Result<()> {
        let MessageKind::MethodCall { path, member } = message.kind() else {
            return Ok(());
        };

        let found = self.objects.iter().position(|object| *object.path() == **path);

        let Some(at) = found else {
            return self.handle_unregistered_path(message, path, member);
        };

        let outcome = {
            let object = &mut self.objects[at];
            object.dispatch(message.interface(), member, message.body())
        };

        // A decoding failure in the request surfaces to the caller
        // instead of tearing the serving loop down.
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => Dispatch {
                reply: Reply::Error {
                    name: fdo::ERROR_INVALID_ARGS,
                    message: error.to_string(),
                },
                properties_changed: None,
            },
        };

        let no_reply = message.flags() & Flags::NO_REPLY_EXPECTED;

        match outcome.reply {
            Reply::Return(body) if !no_reply => self.send_reply(message, &body)?,
            Reply::Error { name, message: text } if !no_reply => {
                tracing::debug!(member = &**member, name, "replying with error");
                self.send_error(message, name, &text)?;
            }
            _ => {}
        }

        if let Some(changed) = outcome.properties_changed {
            let path = self.objects[at].path().to_owned();

            let signal = Message::signal(path, "PropertiesChanged", self.next_serial())
                .with_interface(fdo::PROPERTIES)
                .with_body(&changed);

            self.send_message(&signal)?;
        }

        Ok(())
    }

    /// `Introspect` on an unregistered path enumerates the first-level
    /// children among registered objects; everything else is an
    /// unknown object.
    fn handle_unregistered_path(
        &mut self,
        message: &Message,
        path: &ObjectPath,
        member: &str,
    ) -> Result<()> {
        let introspectable = matches!(message.interface(), None | Some(fdo::INTROSPECTABLE));

        if introspectable && member == "Introspect" {
            let mut children: Vec<String> = Vec::new();

            for object in &self.objects {
                if object.path().starts_with(path) {
                    let rest = match path.as_str() {
                        "/" => &object.path().as_str()[1..],
                        prefix => &object.path().as_str()[prefix.len() + 1..],
                    };

                    let name = rest.split('/').next().unwrap_or(rest);

                    if !children.iter().any(|c| c == name) {
                        children.push(name.to_owned());
                    }
                }
            }

            if !children.is_empty() {
                let mut node = xml::Node::root();

                for child in &children {
                    node.children.push(xml::Node::named(child));
                }

                let document = xml::emit_node(&node);

                let mut body = BodyBuf::new();
                body.store(document.as_str())?;
                return self.send_reply(message, &body);
            }
        }

        self.send_error(
            message,
            fdo::ERROR_UNKNOWN_OBJECT,
            &format!("No object at {path}"),
        )
    }
}

fn is_reply_to(message: &Message, serial: NonZeroU32) -> bool {
    match message.kind() {
        MessageKind::MethodReturn { reply_serial } | MessageKind::Error { reply_serial, .. } => {
            *reply_serial == serial
        }
        _ => false,
    }
}
