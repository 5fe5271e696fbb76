use minibus_core::signature::Signature;
use xmlparser::{ElementEnd, Token, Tokenizer};

use crate::error::ErrorKind;
use crate::{Access, Argument, Direction, Error, Interface, Method, Node, Property, Result, Signal};

/// Parse an introspection document into its root [`Node`].
///
/// Elements which are not part of the introspection DTD, such as
/// `<annotation>` or inline documentation, are skipped together with
/// their content.
pub fn parse_node(document: &str) -> Result<Node> {
    let mut stack: Vec<State> = Vec::new();
    let mut path = String::new();
    let mut root = None;

    for token in Tokenizer::from(document) {
        let token = match token {
            Ok(token) => token,
            Err(error) => return Err(Error::new(path, error)),
        };

        match token {
            Token::ElementStart { local, .. } => {
                let state = match (stack.last(), local.as_str()) {
                    // Anything below an unsupported element is skipped
                    // wholesale.
                    (Some(State::Skip), _) => State::Skip,
                    (None | Some(State::Node(..)), "node") => State::Node(NodeBuilder::default()),
                    (Some(State::Node(..)), "interface") => {
                        State::Interface(InterfaceBuilder::default())
                    }
                    (Some(State::Interface(..)), "method") => {
                        State::Method(MemberBuilder::default())
                    }
                    (Some(State::Interface(..)), "signal") => {
                        State::Signal(MemberBuilder::default())
                    }
                    (Some(State::Interface(..)), "property") => {
                        State::Property(PropertyBuilder::default())
                    }
                    (Some(State::Method(..) | State::Signal(..)), "arg") => {
                        State::Argument(ArgumentBuilder::default())
                    }
                    _ => State::Skip,
                };

                if !path.is_empty() {
                    path.push('/');
                }

                path.push_str(local.as_str());
                stack.push(state);
            }
            Token::ElementEnd { end, .. } => {
                let name = match end {
                    ElementEnd::Open => continue,
                    ElementEnd::Close(_, name) => Some(name.as_str()),
                    ElementEnd::Empty => None,
                };

                let Some(top) = stack.pop() else {
                    return Err(Error::new(path, ErrorKind::UnexpectedElementEnd));
                };

                if let (Some(actual), Some(expected)) = (name, top.tag()) {
                    if actual != expected {
                        return Err(Error::new(
                            path,
                            ErrorKind::MismatchingEnd {
                                expected: expected.into(),
                                actual: actual.into(),
                            },
                        ));
                    }
                }

                match (stack.last_mut(), top) {
                    (_, State::Skip) => {}
                    (None, State::Node(builder)) => {
                        root = Some(builder.build_root());
                    }
                    (Some(State::Node(parent)), State::Node(builder)) => {
                        let node = builder
                            .build_child()
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.children.push(node);
                    }
                    (Some(State::Node(parent)), State::Interface(builder)) => {
                        let interface = builder
                            .build()
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.interfaces.push(interface);
                    }
                    (Some(State::Interface(parent)), State::Method(builder)) => {
                        let (name, args) = builder
                            .build(ErrorKind::MissingMethodName)
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.methods.push(Method { name, args });
                    }
                    (Some(State::Interface(parent)), State::Signal(builder)) => {
                        let (name, args) = builder
                            .build(ErrorKind::MissingSignalName)
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.signals.push(Signal { name, args });
                    }
                    (Some(State::Interface(parent)), State::Property(builder)) => {
                        let property = builder
                            .build()
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.properties.push(property);
                    }
                    (Some(State::Method(parent) | State::Signal(parent)), State::Argument(builder)) => {
                        let argument = builder
                            .build()
                            .map_err(|kind| Error::new(path.as_str(), kind))?;
                        parent.args.push(argument);
                    }
                    _ => return Err(Error::new(path, ErrorKind::UnexpectedElementEnd)),
                }

                if let Some(index) = path.rfind('/') {
                    path.truncate(index);
                } else {
                    path.clear();
                }
            }
            Token::Attribute { local, value, .. } => {
                let result = match stack.last_mut() {
                    Some(State::Node(builder)) => {
                        if local.as_str() == "name" {
                            builder.name = Some(value.as_str().to_owned());
                        }

                        Ok(())
                    }
                    Some(State::Interface(builder)) => {
                        if local.as_str() == "name" {
                            builder.name = Some(value.as_str().to_owned());
                        }

                        Ok(())
                    }
                    Some(State::Method(builder) | State::Signal(builder)) => {
                        if local.as_str() == "name" {
                            builder.name = Some(value.as_str().to_owned());
                        }

                        Ok(())
                    }
                    Some(State::Property(builder)) => {
                        builder.attribute(local.as_str(), value.as_str())
                    }
                    Some(State::Argument(builder)) => {
                        builder.attribute(local.as_str(), value.as_str())
                    }
                    _ => Ok(()),
                };

                result.map_err(|kind| Error::new(path.as_str(), kind))?;
            }
            _ => {}
        }
    }

    Ok(root.unwrap_or_default())
}

enum State {
    Node(NodeBuilder),
    Interface(InterfaceBuilder),
    Method(MemberBuilder),
    Signal(MemberBuilder),
    Property(PropertyBuilder),
    Argument(ArgumentBuilder),
    Skip,
}

impl State {
    fn tag(&self) -> Option<&'static str> {
        match self {
            State::Node(..) => Some("node"),
            State::Interface(..) => Some("interface"),
            State::Method(..) => Some("method"),
            State::Signal(..) => Some("signal"),
            State::Property(..) => Some("property"),
            State::Argument(..) => Some("arg"),
            State::Skip => None,
        }
    }
}

#[derive(Default)]
struct NodeBuilder {
    name: Option<String>,
    interfaces: Vec<Interface>,
    children: Vec<Node>,
}

impl NodeBuilder {
    fn build_root(self) -> Node {
        Node {
            name: self.name,
            interfaces: self.interfaces,
            children: self.children,
        }
    }

    fn build_child(self) -> Result<Node, ErrorKind> {
        if self.name.is_none() {
            return Err(ErrorKind::MissingNodeName);
        }

        Ok(self.build_root())
    }
}

#[derive(Default)]
struct InterfaceBuilder {
    name: Option<String>,
    methods: Vec<Method>,
    signals: Vec<Signal>,
    properties: Vec<Property>,
}

impl InterfaceBuilder {
    fn build(self) -> Result<Interface, ErrorKind> {
        Ok(Interface {
            name: self.name.ok_or(ErrorKind::MissingInterfaceName)?,
            methods: self.methods,
            signals: self.signals,
            properties: self.properties,
        })
    }
}

#[derive(Default)]
struct MemberBuilder {
    name: Option<String>,
    args: Vec<Argument>,
}

impl MemberBuilder {
    fn build(self, missing: ErrorKind) -> Result<(String, Vec<Argument>), ErrorKind> {
        Ok((self.name.ok_or(missing)?, self.args))
    }
}

#[derive(Default)]
struct PropertyBuilder {
    name: Option<String>,
    ty: Option<minibus_core::signature::SignatureBuf>,
    access: Option<Access>,
}

impl PropertyBuilder {
    fn attribute(&mut self, name: &str, value: &str) -> Result<(), ErrorKind> {
        match name {
            "name" => self.name = Some(value.to_owned()),
            "type" => self.ty = Some(Signature::new(value)?.to_owned()),
            "access" => {
                self.access = Some(match value {
                    "read" => Access::Read,
                    "write" => Access::Write,
                    "readwrite" => Access::ReadWrite,
                    other => return Err(ErrorKind::UnsupportedAccess(other.into())),
                });
            }
            _ => {}
        }

        Ok(())
    }

    fn build(self) -> Result<Property, ErrorKind> {
        Ok(Property {
            name: self.name.ok_or(ErrorKind::MissingPropertyName)?,
            ty: self.ty.ok_or(ErrorKind::MissingPropertyType)?,
            access: self.access.ok_or(ErrorKind::MissingPropertyAccess)?,
        })
    }
}

#[derive(Default)]
struct ArgumentBuilder {
    name: Option<String>,
    ty: Option<minibus_core::signature::SignatureBuf>,
    direction: Option<Direction>,
}

impl ArgumentBuilder {
    fn attribute(&mut self, name: &str, value: &str) -> Result<(), ErrorKind> {
        match name {
            "name" => self.name = Some(value.to_owned()),
            "type" => self.ty = Some(Signature::new(value)?.to_owned()),
            "direction" => {
                self.direction = Some(match value {
                    "in" => Direction::In,
                    "out" => Direction::Out,
                    other => return Err(ErrorKind::UnsupportedDirection(other.into())),
                });
            }
            _ => {}
        }

        Ok(())
    }

    fn build(self) -> Result<Argument, ErrorKind> {
        Ok(Argument {
            name: self.name,
            ty: self.ty.ok_or(ErrorKind::MissingArgumentType)?,
            direction: self.direction,
        })
    }
}
