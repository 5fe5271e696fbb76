use std::collections::HashMap;

use minibus_xml as xml;
use minibus_xml::Access;

use crate::body::{Body, BodyBuf};
use crate::error::Result;
use crate::object_path::{ObjectPath, ObjectPathBuf};
use crate::org_freedesktop_dbus as fdo;
use crate::{Signature, SignatureBuf, Variant};

use super::builder::{MethodDecl, ObjectBuilder, PropertyDecl, SignalDecl};

/// What dispatching one method call produced.
pub(crate) struct Dispatch {
    /// The reply to send back to the caller.
    pub(crate) reply: Reply,
    /// The body of a `PropertiesChanged` signal to emit after the
    /// reply, produced by a successful `Set`.
    pub(crate) properties_changed: Option<BodyBuf>,
}

pub(crate) enum Reply {
    Return(BodyBuf),
    Error {
        name: &'static str,
        message: String,
    },
}

impl Dispatch {
    fn reply(body: BodyBuf) -> Self {
        Self {
            reply: Reply::Return(body),
            properties_changed: None,
        }
    }

    fn error(name: &'static str, message: String) -> Self {
        Self {
            reply: Reply::Error { name, message },
            properties_changed: None,
        }
    }
}

/// An object bound to a path, with its registration-time introspection
/// document.
pub(crate) struct RegisteredObject {
    path: ObjectPathBuf,
    interface: Box<str>,
    methods: Vec<MethodDecl>,
    properties: Vec<PropertySlot>,
    signals: Vec<SignalDecl>,
    introspection: String,
}

struct PropertySlot {
    name: Box<str>,
    signature: SignatureBuf,
    access: Access,
    value: Variant,
}

impl RegisteredObject {
    pub(crate) fn new(path: &ObjectPath, builder: ObjectBuilder) -> Result<Self> {
        let mut properties = Vec::with_capacity(builder.properties.len());

        for PropertyDecl {
            name,
            access,
            value,
        } in builder.properties
        {
            properties.push(PropertySlot {
                signature: value.value_signature()?,
                name,
                access,
                value,
            });
        }

        let mut object = Self {
            path: path.to_owned(),
            interface: builder.interface,
            methods: builder.methods,
            properties,
            signals: builder.signals,
            introspection: String::new(),
        };

        object.introspection = xml::emit_node(&object.describe());
        Ok(object)
    }

    pub(crate) fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub(crate) fn interface(&self) -> &str {
        &self.interface
    }

    pub(crate) fn introspection(&self) -> &str {
        &self.introspection
    }

    /// The declared payload signature of a signal, if it is declared.
    pub(crate) fn signal_signature(&self, member: &str) -> Option<&Signature> {
        self.signals
            .iter()
            .find(|signal| &*signal.name == member)
            .map(|signal| &*signal.args)
    }

    /// Route one method call to this object.
    ///
    /// `args` is the body of the request. The reply, and possibly a
    /// `PropertiesChanged` signal body, are handed back to the
    /// connection for sending.
    pub(crate) fn dispatch(
        &mut self,
        interface: Option<&str>,
        member: &str,
        mut args: Body<'_>,
    ) -> Result<Dispatch> {
        match interface {
            Some(fdo::INTROSPECTABLE) => {
                if member != "Introspect" {
                    return Ok(unknown_method(member));
                }

                let mut out = BodyBuf::new();
                out.store(self.introspection.as_str())?;
                Ok(Dispatch::reply(out))
            }
            Some(fdo::PROPERTIES) => match member {
                "Get" => self.get_property(&mut args),
                "GetAll" => self.get_all_properties(&mut args),
                "Set" => self.set_property(&mut args),
                _ => Ok(unknown_method(member)),
            },
            None => self.call_method(member, args),
            Some(interface) if interface == &*self.interface => self.call_method(member, args),
            Some(interface) => Ok(Dispatch::error(
                fdo::ERROR_UNKNOWN_INTERFACE,
                format!("Unknown interface {interface}"),
            )),
        }
    }

    fn call_method(&mut self, member: &str, mut args: Body<'_>) -> Result<Dispatch> {
        let Some(method) = self.methods.iter_mut().find(|m| &*m.name == member) else {
            return Ok(unknown_method(member));
        };

        if *args.signature() != *method.args {
            return Ok(Dispatch::error(
                fdo::ERROR_INVALID_ARGS,
                format!(
                    "Expected arguments `{}`, got `{}`",
                    method.args,
                    args.signature()
                ),
            ));
        }

        let mut out = BodyBuf::new();

        match (method.handler)(&mut args, &mut out) {
            Ok(()) => Ok(Dispatch::reply(out)),
            Err(error) => {
                tracing::warn!(member, %error, "method handler failed");
                Ok(Dispatch::error(fdo::ERROR_FAILED, error.to_string()))
            }
        }
    }

    fn get_property(&mut self, args: &mut Body<'_>) -> Result<Dispatch> {
        let interface = args.load::<&str>()?;
        let name = args.load::<&str>()?;

        if interface != &*self.interface {
            return Ok(invalid_args(format!("Unknown interface {interface}")));
        }

        let Some(property) = self.properties.iter().find(|p| &*p.name == name) else {
            return Ok(invalid_args(format!("Unknown property {name}")));
        };

        if !property.access.is_readable() {
            return Ok(invalid_args(format!("Property {name} is not readable")));
        }

        let mut out = BodyBuf::new();
        out.store(property.value.clone())?;
        Ok(Dispatch::reply(out))
    }

    fn get_all_properties(&mut self, args: &mut Body<'_>) -> Result<Dispatch> {
        let interface = args.load::<&str>()?;

        let mut values = HashMap::new();

        // Requests for other interfaces yield an empty dictionary
        // rather than an error.
        if interface == &*self.interface {
            for property in &self.properties {
                if property.access.is_readable() {
                    values.insert(property.name.to_string(), property.value.clone());
                }
            }
        }

        let mut out = BodyBuf::new();
        out.store(values)?;
        Ok(Dispatch::reply(out))
    }

    fn set_property(&mut self, args: &mut Body<'_>) -> Result<Dispatch> {
        let interface = args.load::<&str>()?.to_owned();
        let name = args.load::<&str>()?.to_owned();
        let value = args.load::<Variant>()?;

        if interface != *self.interface {
            return Ok(invalid_args(format!("Unknown interface {interface}")));
        }

        let Some(property) = self.properties.iter_mut().find(|p| *p.name == name) else {
            return Ok(invalid_args(format!("Unknown property {name}")));
        };

        if !property.access.is_writable() {
            return Ok(invalid_args(format!("Property {name} is not writable")));
        }

        if *value.value_signature()? != *property.signature {
            return Ok(invalid_args(format!(
                "Property {name} expects type `{}`",
                property.signature
            )));
        }

        property.value = value.clone();

        let mut changed = BodyBuf::new();
        changed.store(interface.as_str())?;

        let mut values = HashMap::new();
        values.insert(name, value);
        changed.store(values)?;
        changed.store(Vec::<String>::new())?;

        Ok(Dispatch {
            reply: Reply::Return(BodyBuf::new()),
            properties_changed: Some(changed),
        })
    }

    /// Produce the introspection tree of this object: its own
    /// interface plus the two standard interfaces every exported
    /// object answers for.
    fn describe(&self) -> xml::Node {
        let mut interface = xml::Interface::new(&self.interface);

        for method in &self.methods {
            let mut args = Vec::new();

            for ty in method.args.iter() {
                args.push(xml::Argument {
                    name: None,
                    ty: ty.to_owned(),
                    direction: Some(xml::Direction::In),
                });
            }

            for ty in method.returns.iter() {
                args.push(xml::Argument {
                    name: None,
                    ty: ty.to_owned(),
                    direction: Some(xml::Direction::Out),
                });
            }

            interface.methods.push(xml::Method {
                name: method.name.to_string(),
                args,
            });
        }

        for signal in &self.signals {
            let args = signal
                .args
                .iter()
                .map(|ty| xml::Argument {
                    name: None,
                    ty: ty.to_owned(),
                    direction: None,
                })
                .collect();

            interface.signals.push(xml::Signal {
                name: signal.name.to_string(),
                args,
            });
        }

        for property in &self.properties {
            interface.properties.push(xml::Property {
                name: property.name.to_string(),
                ty: property.signature.clone(),
                access: property.access,
            });
        }

        let mut node = xml::Node::root();
        node.interfaces.push(interface);
        node.interfaces.push(introspectable_interface());
        node.interfaces.push(properties_interface());
        node
    }
}

fn unknown_method(member: &str) -> Dispatch {
    Dispatch::error(
        fdo::ERROR_UNKNOWN_METHOD,
        format!("Unknown method {member}"),
    )
}

fn invalid_args(message: String) -> Dispatch {
    Dispatch::error(fdo::ERROR_INVALID_ARGS, message)
}

fn introspectable_interface() -> xml::Interface {
    let mut interface = xml::Interface::new(fdo::INTROSPECTABLE);

    interface.methods.push(xml::Method {
        name: "Introspect".to_owned(),
        args: vec![out_arg("xml_data", Signature::STRING)],
    });

    interface
}

fn properties_interface() -> xml::Interface {
    let mut interface = xml::Interface::new(fdo::PROPERTIES);

    interface.methods.push(xml::Method {
        name: "Get".to_owned(),
        args: vec![
            in_arg("interface_name", Signature::STRING),
            in_arg("property_name", Signature::STRING),
            out_arg("value", Signature::VARIANT),
        ],
    });

    interface.methods.push(xml::Method {
        name: "GetAll".to_owned(),
        args: vec![
            in_arg("interface_name", Signature::STRING),
            out_arg("properties", Signature::new_const(b"a{sv}")),
        ],
    });

    interface.methods.push(xml::Method {
        name: "Set".to_owned(),
        args: vec![
            in_arg("interface_name", Signature::STRING),
            in_arg("property_name", Signature::STRING),
            in_arg("value", Signature::VARIANT),
        ],
    });

    interface.signals.push(xml::Signal {
        name: "PropertiesChanged".to_owned(),
        args: vec![
            xml::Argument {
                name: Some("interface_name".to_owned()),
                ty: Signature::STRING.to_owned(),
                direction: None,
            },
            xml::Argument {
                name: Some("changed_properties".to_owned()),
                ty: Signature::new_const(b"a{sv}").to_owned(),
                direction: None,
            },
            xml::Argument {
                name: Some("invalidated_properties".to_owned()),
                ty: Signature::new_const(b"as").to_owned(),
                direction: None,
            },
        ],
    });

    interface
}

fn in_arg(name: &str, ty: &Signature) -> xml::Argument {
    xml::Argument {
        name: Some(name.to_owned()),
        ty: ty.to_owned(),
        direction: Some(xml::Direction::In),
    }
}

fn out_arg(name: &str, ty: &Signature) -> xml::Argument {
    xml::Argument {
        name: Some(name.to_owned()),
        ty: ty.to_owned(),
        direction: Some(xml::Direction::Out),
    }
}
