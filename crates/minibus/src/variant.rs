use minibus_core::signature::SignatureError;

use crate::arg::{Arg, Load, Store, UnixFd};
use crate::body::{Body, BodyBuf};
use crate::error::{Error, ErrorKind, Result};
use crate::object_path::ObjectPathBuf;
use crate::proto::Type;
use crate::{Signature, SignatureBuf};

/// A dynamically typed D-Bus value, the `v` type.
///
/// On the wire a variant carries the signature of its payload followed
/// by the payload itself. [`Variant`] mirrors that: it can hold any
/// single complete value and knows the signature describing it.
///
/// # Examples
///
/// ```
/// use minibus::{BodyBuf, Variant};
///
/// let mut buf = BodyBuf::new();
/// buf.store(Variant::U32(7))?;
///
/// assert_eq!(buf.signature(), "v");
///
/// let mut body = buf.as_body();
/// assert_eq!(body.load::<Variant>()?, Variant::U32(7));
/// # Ok::<_, minibus::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// A `y` value.
    Byte(u8),
    /// A `b` value.
    Bool(bool),
    /// An `n` value.
    I16(i16),
    /// A `q` value.
    U16(u16),
    /// An `i` value.
    I32(i32),
    /// A `u` value.
    U32(u32),
    /// An `x` value.
    I64(i64),
    /// A `t` value.
    U64(u64),
    /// A `d` value.
    F64(f64),
    /// An `s` value.
    String(String),
    /// An `o` value.
    ObjectPath(ObjectPathBuf),
    /// A `g` value.
    Signature(SignatureBuf),
    /// An `h` value.
    UnixFd(UnixFd),
    /// An array of uniformly typed values.
    Array {
        /// The signature of the element type.
        element: SignatureBuf,
        /// The values of the array.
        values: Vec<Variant>,
    },
    /// An array of dict entries.
    Dict {
        /// The signature of the key type.
        key: SignatureBuf,
        /// The signature of the value type.
        value: SignatureBuf,
        /// The entries of the dictionary in storage order.
        entries: Vec<(Variant, Variant)>,
    },
    /// An ordered fixed-arity record.
    Struct(Vec<Variant>),
    /// A nested variant.
    Variant(Box<Variant>),
}

impl Variant {
    /// The signature of the contained value.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::Variant;
    ///
    /// let v = Variant::Struct(vec![Variant::I32(1), Variant::String("x".into())]);
    /// assert_eq!(v.value_signature()?, "(is)");
    /// # Ok::<_, minibus::SignatureError>(())
    /// ```
    pub fn value_signature(&self) -> Result<SignatureBuf, SignatureError> {
        let mut signature = SignatureBuf::new();
        self.append_signature(&mut signature)?;
        Ok(signature)
    }

    fn append_signature(&self, sig: &mut SignatureBuf) -> Result<(), SignatureError> {
        match self {
            Variant::Byte(..) => sig.push(Type::BYTE),
            Variant::Bool(..) => sig.push(Type::BOOLEAN),
            Variant::I16(..) => sig.push(Type::INT16),
            Variant::U16(..) => sig.push(Type::UINT16),
            Variant::I32(..) => sig.push(Type::INT32),
            Variant::U32(..) => sig.push(Type::UINT32),
            Variant::I64(..) => sig.push(Type::INT64),
            Variant::U64(..) => sig.push(Type::UINT64),
            Variant::F64(..) => sig.push(Type::DOUBLE),
            Variant::String(..) => sig.push(Type::STRING),
            Variant::ObjectPath(..) => sig.push(Type::OBJECT_PATH),
            Variant::Signature(..) => sig.push(Type::SIGNATURE),
            Variant::UnixFd(..) => sig.push(Type::UNIX_FD),
            Variant::Array { element, .. } => {
                sig.push(Type::ARRAY)?;
                sig.extend_from_signature(element)
            }
            Variant::Dict { key, value, .. } => {
                sig.push(Type::ARRAY)?;
                sig.push(Type::OPEN_BRACE)?;
                sig.extend_from_signature(key)?;
                sig.extend_from_signature(value)?;
                sig.push(Type::CLOSE_BRACE)
            }
            Variant::Struct(fields) => {
                sig.push(Type::OPEN_PAREN)?;

                for field in fields {
                    field.append_signature(sig)?;
                }

                sig.push(Type::CLOSE_PAREN)
            }
            Variant::Variant(..) => sig.push(Type::VARIANT),
        }
    }

    /// Write the payload of the variant, without the leading signature.
    pub(crate) fn store_value(&self, buf: &mut BodyBuf) -> Result<()> {
        match self {
            Variant::Byte(v) => {
                buf.put_u8(*v);
            }
            Variant::Bool(v) => {
                buf.put_u32(*v as u32);
            }
            Variant::I16(v) => {
                buf.put_i16(*v);
            }
            Variant::U16(v) => {
                buf.put_u16(*v);
            }
            Variant::I32(v) => {
                buf.put_i32(*v);
            }
            Variant::U32(v) => {
                buf.put_u32(*v);
            }
            Variant::I64(v) => {
                buf.put_i64(*v);
            }
            Variant::U64(v) => {
                buf.put_u64(*v);
            }
            Variant::F64(v) => {
                buf.put_f64(*v);
            }
            Variant::String(v) => {
                buf.put_str(v);
            }
            Variant::ObjectPath(v) => {
                buf.put_str(v.as_str());
            }
            Variant::Signature(v) => {
                buf.put_signature(v);
            }
            Variant::UnixFd(v) => {
                buf.put_u32(v.0);
            }
            Variant::Array { element, values } => {
                let align = element.first().map(Type::alignment).unwrap_or(1);

                buf.write_array(align, |buf| {
                    for value in values {
                        value.store_value(buf)?;
                    }

                    Ok(())
                })?;
            }
            Variant::Dict { entries, .. } => {
                buf.write_array(8, |buf| {
                    for (key, value) in entries {
                        buf.pad_to(8);
                        key.store_value(buf)?;
                        value.store_value(buf)?;
                    }

                    Ok(())
                })?;
            }
            Variant::Struct(fields) => {
                buf.pad_to(8);

                for field in fields {
                    field.store_value(buf)?;
                }
            }
            Variant::Variant(inner) => {
                let signature = inner.value_signature()?;
                buf.put_signature(&signature);
                inner.store_value(buf)?;
            }
        }

        Ok(())
    }

    /// Read a payload described by `signature`.
    pub(crate) fn load_value(body: &mut Body<'_>, signature: &Signature) -> Result<Variant> {
        let Some(first) = signature.first() else {
            return Err(Error::new(ErrorKind::SignatureEnd));
        };

        let value = match first {
            Type::BYTE => Variant::Byte(body.take_u8()?),
            Type::BOOLEAN => match body.take_u32()? {
                0 => Variant::Bool(false),
                1 => Variant::Bool(true),
                other => return Err(Error::new(ErrorKind::InvalidBoolean(other))),
            },
            Type::INT16 => Variant::I16(body.take_i16()?),
            Type::UINT16 => Variant::U16(body.take_u16()?),
            Type::INT32 => Variant::I32(body.take_i32()?),
            Type::UINT32 => Variant::U32(body.take_u32()?),
            Type::INT64 => Variant::I64(body.take_i64()?),
            Type::UINT64 => Variant::U64(body.take_u64()?),
            Type::DOUBLE => Variant::F64(body.take_f64()?),
            Type::STRING => Variant::String(body.take_str()?.to_owned()),
            Type::OBJECT_PATH => {
                Variant::ObjectPath(crate::ObjectPath::new(body.take_str()?)?.to_owned())
            }
            Type::SIGNATURE => Variant::Signature(body.take_signature()?.to_owned()),
            Type::UNIX_FD => Variant::UnixFd(UnixFd(body.take_u32()?)),
            Type::VARIANT => {
                let contained = body.take_signature()?;
                Variant::Variant(Box::new(Self::load_value(body, contained)?))
            }
            Type::ARRAY => {
                let element = Signature::new(&signature.as_bytes()[1..])?;

                if let Some(Type::OPEN_BRACE) = element.first() {
                    let bytes = element.as_bytes();
                    let fields = Signature::new(&bytes[1..bytes.len() - 1])?;
                    let (key, value) = fields.split_first().ok_or_else(|| {
                        Error::new(ErrorKind::SignatureEnd)
                    })?;

                    let end = body.take_array(8)?;
                    let mut entries = Vec::new();

                    while body.cursor() < end {
                        body.align_to(8)?;
                        let k = Self::load_value(body, key)?;
                        let v = Self::load_value(body, value)?;
                        entries.push((k, v));
                    }

                    Variant::Dict {
                        key: key.to_owned(),
                        value: value.to_owned(),
                        entries,
                    }
                } else {
                    let align = element.first().map(Type::alignment).unwrap_or(1);
                    let end = body.take_array(align)?;
                    let mut values = Vec::new();

                    while body.cursor() < end {
                        values.push(Self::load_value(body, element)?);
                    }

                    Variant::Array {
                        element: element.to_owned(),
                        values,
                    }
                }
            }
            Type::OPEN_PAREN => {
                let bytes = signature.as_bytes();
                let fields = Signature::new(&bytes[1..bytes.len() - 1])?;

                body.align_to(8)?;

                let mut values = Vec::new();

                for field in fields.iter() {
                    values.push(Self::load_value(body, field)?);
                }

                Variant::Struct(values)
            }
            _ => {
                return Err(Error::new(ErrorKind::NoMatchingUnionField(
                    signature.to_owned(),
                )));
            }
        };

        Ok(value)
    }
}

impl Arg for Variant {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::VARIANT)
    }
}

impl Store for Variant {
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        let signature = self.value_signature()?;
        buf.put_signature(&signature);
        self.store_value(buf)
    }
}

impl<'de> Load<'de> for Variant {
    fn load(body: &mut Body<'de>) -> Result<Self> {
        let contained = body.take_signature()?;
        Self::load_value(body, contained)
    }
}

macro_rules! impl_from {
    ($($from:ty => $variant:ident;)*) => {
        $(
            impl From<$from> for Variant {
                #[inline]
                fn from(value: $from) -> Self {
                    Variant::$variant(value.into())
                }
            }
        )*
    }
}

impl_from! {
    u8 => Byte;
    bool => Bool;
    i16 => I16;
    u16 => U16;
    i32 => I32;
    u32 => U32;
    i64 => I64;
    u64 => U64;
    f64 => F64;
    String => String;
    &str => String;
    ObjectPathBuf => ObjectPath;
    SignatureBuf => Signature;
    UnixFd => UnixFd;
}
