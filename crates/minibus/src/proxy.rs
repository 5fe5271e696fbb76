use crate::arg::Load;
use crate::body::{Body, BodyBuf};
use crate::connection::Connection;
use crate::error::{Error, ErrorKind, Result};
use crate::object_path::{ObjectPath, ObjectPathBuf};
use crate::org_freedesktop_dbus as fdo;
use crate::{Message, SignatureBuf, Variant};

/// A client-side helper bundling a destination, a path and an
/// interface, performing typed calls against them.
///
/// # Examples
///
/// ```no_run
/// use minibus::{BodyBuf, Bus, Connection, ObjectPath, Proxy};
///
/// let mut c = Connection::new(Bus::Session)?;
///
/// let mut proxy = Proxy::new(
///     &mut c,
///     "org.freedesktop.DBus",
///     ObjectPath::new_const("/org/freedesktop/DBus"),
///     "org.freedesktop.DBus",
/// );
///
/// let reply = proxy.call("GetId", BodyBuf::new())?;
/// let id: String = reply.expect()?;
/// # Ok::<_, minibus::Error>(())
/// ```
pub struct Proxy<'c> {
    connection: &'c mut Connection,
    destination: Box<str>,
    path: ObjectPathBuf,
    interface: Box<str>,
}

impl<'c> Proxy<'c> {
    /// Construct a new proxy over the given connection.
    pub fn new(
        connection: &'c mut Connection,
        destination: &str,
        path: &ObjectPath,
        interface: &str,
    ) -> Self {
        Self {
            connection,
            destination: destination.into(),
            path: path.to_owned(),
            interface: interface.into(),
        }
    }

    /// Call a method on the interface of the proxy.
    ///
    /// An error reply from the peer surfaces as an [`Error`] carrying
    /// the remote error name and message.
    pub fn call(&mut self, member: &str, body: BodyBuf) -> Result<Reply> {
        let message = self.connection.method_call(
            &self.destination,
            &self.path,
            Some(&self.interface),
            member,
            body,
        )?;

        Ok(Reply {
            message: message.into_result()?,
        })
    }

    /// Call a method on an explicitly given interface.
    pub fn call_on(&mut self, interface: &str, member: &str, body: BodyBuf) -> Result<Reply> {
        let message = self.connection.method_call(
            &self.destination,
            &self.path,
            Some(interface),
            member,
            body,
        )?;

        Ok(Reply {
            message: message.into_result()?,
        })
    }

    /// Read a property of the proxied interface into an owned value.
    pub fn get_property<T>(&mut self, name: &str) -> Result<T>
    where
        T: for<'de> Load<'de>,
    {
        let mut body = BodyBuf::new();
        body.store(&*self.interface)?;
        body.store(name)?;

        let reply = self.call_on(fdo::PROPERTIES, "Get", body)?;
        let mut body = reply.body();
        body.load_variant::<T>()
    }

    /// Write a property of the proxied interface.
    pub fn set_property(&mut self, name: &str, value: Variant) -> Result<()> {
        let mut body = BodyBuf::new();
        body.store(&*self.interface)?;
        body.store(name)?;
        body.store(value)?;

        self.call_on(fdo::PROPERTIES, "Set", body)?;
        Ok(())
    }
}

/// A successful method reply, owning the message it arrived in.
#[derive(Debug)]
pub struct Reply {
    message: Message,
}

impl Reply {
    /// The full reply message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// A reader over the reply body.
    pub fn body(&self) -> Body<'_> {
        self.message.body()
    }

    /// Decode the body as exactly one value of type `T`.
    ///
    /// # Errors
    ///
    /// Errors if the body does not decode as `T`, or if values remain
    /// after it.
    pub fn expect<'de, T>(&'de self) -> Result<T>
    where
        T: Load<'de>,
    {
        let mut body = self.message.body();
        let value = body.load::<T>()?;

        if !body.is_empty() {
            let mut expected = SignatureBuf::new();
            T::signature(&mut expected)?;

            return Err(Error::new(ErrorKind::SignatureMismatch {
                expected,
                actual: self.message.signature().to_owned(),
            }));
        }

        Ok(value)
    }
}
