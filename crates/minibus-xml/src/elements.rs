use minibus_core::signature::SignatureBuf;

/// A `<node>` element: the description of one object, with the
/// interfaces it implements and its immediate children.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    /// The name of the node. Absent on the root node of a document,
    /// a single path element on children.
    pub name: Option<String>,
    /// The interfaces implemented by the object.
    pub interfaces: Vec<Interface>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Node {
    /// Construct an empty root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Construct a named child node.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }
}

/// An `<interface>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// The name of the interface.
    pub name: String,
    /// The methods of the interface.
    pub methods: Vec<Method>,
    /// The signals of the interface.
    pub signals: Vec<Signal>,
    /// The properties of the interface.
    pub properties: Vec<Property>,
}

impl Interface {
    /// Construct an empty interface with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            methods: Vec::new(),
            signals: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// A `<method>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// The name of the method.
    pub name: String,
    /// The arguments of the method, in declaration order.
    pub args: Vec<Argument>,
}

/// A `<signal>` element.
///
/// Signal arguments carry no direction, they are always outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// The name of the signal.
    pub name: String,
    /// The arguments of the signal.
    pub args: Vec<Argument>,
}

/// A `<property>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// The name of the property.
    pub name: String,
    /// The type of the property.
    pub ty: SignatureBuf,
    /// The access mode of the property.
    pub access: Access,
}

/// An `<arg>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// The optional name of the argument.
    pub name: Option<String>,
    /// The type of the argument.
    pub ty: SignatureBuf,
    /// The direction of the argument, absent on signal arguments.
    pub direction: Option<Direction>,
}

/// The direction of a method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// An input, passed by the caller.
    In,
    /// An output, produced by the callee.
    Out,
}

impl Direction {
    /// The attribute value of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// The access mode of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The property can only be read.
    Read,
    /// The property can only be written.
    Write,
    /// The property can be both read and written.
    ReadWrite,
}

impl Access {
    /// The attribute value of the access mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
            Access::ReadWrite => "readwrite",
        }
    }

    /// Test if the property may be read.
    pub fn is_readable(&self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// Test if the property may be written.
    pub fn is_writable(&self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}
