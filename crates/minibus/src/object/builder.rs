use minibus_xml::Access;

use crate::body::{Body, BodyBuf};
use crate::error::Result;
use crate::{Signature, SignatureBuf, Variant};

pub(crate) type Handler = Box<dyn FnMut(&mut Body<'_>, &mut BodyBuf) -> Result<()> + Send>;

/// The description of one exported object: the methods, properties and
/// signals of its interface, collected before registration.
///
/// # Examples
///
/// ```
/// use minibus::{Access, ObjectBuilder, Signature, Variant};
///
/// let object = ObjectBuilder::new("dev.myinterface.test")
///     .method("Testing", Signature::EMPTY, Signature::STRING, |_, out| {
///         out.store("Hello")
///     })
///     .property("Count", Access::ReadWrite, Variant::I32(0))
///     .signal("Changed", Signature::INT32);
/// ```
pub struct ObjectBuilder {
    pub(crate) interface: Box<str>,
    pub(crate) methods: Vec<MethodDecl>,
    pub(crate) properties: Vec<PropertyDecl>,
    pub(crate) signals: Vec<SignalDecl>,
}

pub(crate) struct MethodDecl {
    pub(crate) name: Box<str>,
    pub(crate) args: SignatureBuf,
    pub(crate) returns: SignatureBuf,
    pub(crate) handler: Handler,
}

pub(crate) struct PropertyDecl {
    pub(crate) name: Box<str>,
    pub(crate) access: Access,
    pub(crate) value: Variant,
}

pub(crate) struct SignalDecl {
    pub(crate) name: Box<str>,
    pub(crate) args: SignatureBuf,
}

impl ObjectBuilder {
    /// Start describing an object implementing the given interface.
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.into(),
            methods: Vec::new(),
            properties: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Declare a method.
    ///
    /// The handler receives a reader over the call arguments, whose
    /// signature has already been checked against `args`, and a buffer
    /// to store the results into. Returning an error produces an error
    /// reply to the caller.
    pub fn method<F>(mut self, name: &str, args: &Signature, returns: &Signature, handler: F) -> Self
    where
        F: FnMut(&mut Body<'_>, &mut BodyBuf) -> Result<()> + Send + 'static,
    {
        self.methods.push(MethodDecl {
            name: name.into(),
            args: args.to_owned(),
            returns: returns.to_owned(),
            handler: Box::new(handler),
        });

        self
    }

    /// Declare a property with its access mode and initial value.
    ///
    /// The type of the property is the type of the initial value.
    pub fn property(mut self, name: &str, access: Access, value: Variant) -> Self {
        self.properties.push(PropertyDecl {
            name: name.into(),
            access,
            value,
        });

        self
    }

    /// Declare a signal and the signature of its payload.
    pub fn signal(mut self, name: &str, args: &Signature) -> Self {
        self.signals.push(SignalDecl {
            name: name.into(),
            args: args.to_owned(),
        });

        self
    }
}
