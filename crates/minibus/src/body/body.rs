use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::arg::{Arg, Load};
use crate::error::{Error, ErrorKind, Result};
use crate::proto::{Endianness, MAX_ARRAY_LENGTH, Type, padding_to};
use crate::{Signature, SignatureBuf};

/// A reader over an encoded message body.
///
/// Decoding is directed by the signature: every [`load`] verifies that
/// the next single complete type in the signature matches the requested
/// type before touching the bytes.
///
/// [`load`]: Self::load
///
/// # Examples
///
/// ```
/// use minibus::BodyBuf;
///
/// let mut buf = BodyBuf::new();
/// buf.store(42u32)?;
/// buf.store("Hello World!")?;
///
/// let mut body = buf.as_body();
/// assert_eq!(body.load::<u32>()?, 42);
/// assert_eq!(body.load::<&str>()?, "Hello World!");
/// assert!(body.is_empty());
/// # Ok::<_, minibus::Error>(())
/// ```
#[derive(Clone)]
pub struct Body<'de> {
    data: &'de [u8],
    cursor: usize,
    signature: &'de Signature,
    remaining: &'de Signature,
    endianness: Endianness,
}

impl<'de> Body<'de> {
    /// Construct a new body reader.
    pub fn new(data: &'de [u8], signature: &'de Signature, endianness: Endianness) -> Self {
        Self {
            data,
            cursor: 0,
            signature,
            remaining: signature,
            endianness,
        }
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::new(&[], Signature::EMPTY, Endianness::NATIVE)
    }

    /// The signature of the full body.
    pub fn signature(&self) -> &'de Signature {
        self.signature
    }

    /// The signature of the values not yet loaded.
    pub fn remaining_signature(&self) -> &'de Signature {
        self.remaining
    }

    /// The endianness values are decoded with.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Test if every byte and every signature element has been
    /// consumed.
    pub fn is_empty(&self) -> bool {
        self.cursor == self.data.len() && self.remaining.is_empty()
    }

    /// Load the next value out of the body.
    ///
    /// # Errors
    ///
    /// Errors with a signature mismatch if the next single complete
    /// type in the signature is not the signature of `T`, and with
    /// `SignatureEnd` if the signature is exhausted.
    pub fn load<T>(&mut self) -> Result<T>
    where
        T: Load<'de>,
    {
        self.expect_signature::<T>()?;
        T::load(self)
    }

    /// Load a variant whose payload is expected to be of type `T`.
    ///
    /// This consumes a `v` from the signature and errors with
    /// `NoMatchingUnionField` if the signature carried inside of the
    /// variant is not the signature of `T`.
    pub fn load_variant<T>(&mut self) -> Result<T>
    where
        T: Load<'de>,
    {
        let (head, tail) = self.remaining.split_first().ok_or_else(|| {
            Error::new(ErrorKind::SignatureEnd)
        })?;

        if head != Signature::VARIANT {
            return Err(Error::new(ErrorKind::SignatureMismatch {
                expected: Signature::VARIANT.to_owned(),
                actual: head.to_owned(),
            }));
        }

        self.remaining = tail;
        self.read_variant_payload()
    }

    /// Load a variant payload without signature bookkeeping, for use
    /// where the surrounding container dictates a `v`.
    pub(crate) fn read_variant_payload<T>(&mut self) -> Result<T>
    where
        T: Load<'de>,
    {
        let mut expected = SignatureBuf::new();
        T::signature(&mut expected)?;

        let contained = self.take_signature()?;

        if contained != *expected {
            return Err(Error::new(ErrorKind::NoMatchingUnionField(
                contained.to_owned(),
            )));
        }

        T::load(self)
    }

    fn expect_signature<T>(&mut self) -> Result<()>
    where
        T: Arg,
    {
        let mut expected = SignatureBuf::new();
        T::signature(&mut expected)?;

        let Some((head, tail)) = self.remaining.split_first() else {
            return Err(Error::new(ErrorKind::SignatureEnd));
        };

        if head != *expected {
            return Err(Error::new(ErrorKind::SignatureMismatch {
                expected,
                actual: head.to_owned(),
            }));
        }

        self.remaining = tail;
        Ok(())
    }

    /// Advance the cursor to the given alignment, which is computed
    /// relative to the start of the body.
    pub(crate) fn align_to(&mut self, align: usize) -> Result<()> {
        let at = self.cursor + padding_to(align, self.cursor);

        if at > self.data.len() {
            return Err(Error::new(ErrorKind::EndOfBody));
        }

        self.cursor = at;
        Ok(())
    }

    pub(crate) fn take_u8(&mut self) -> Result<u8> {
        let [b] = *self.take_slice(1)? else {
            return Err(Error::new(ErrorKind::EndOfBody));
        };

        Ok(b)
    }

    pub(crate) fn take_slice(&mut self, len: usize) -> Result<&'de [u8]> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::new(ErrorKind::EndOfBody))?;

        let bytes = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(bytes)
    }

    /// Read a length-prefixed, nul-terminated string.
    pub(crate) fn take_str(&mut self) -> Result<&'de str> {
        let len = self.take_u32()? as usize;
        let bytes = self.take_slice(len)?;

        if self.take_u8()? != 0 {
            return Err(Error::new(ErrorKind::NotNullTerminated));
        }

        Ok(std::str::from_utf8(bytes)?)
    }

    /// Read a length-prefixed, nul-terminated signature, validating it.
    pub(crate) fn take_signature(&mut self) -> Result<&'de Signature> {
        let len = self.take_u8()? as usize;
        let bytes = self.take_slice(len)?;

        if self.take_u8()? != 0 {
            return Err(Error::new(ErrorKind::NotNullTerminated));
        }

        Ok(Signature::new(bytes)?)
    }

    /// Read the length prefix of an array and return the end position
    /// of its payload, with the cursor left at the first element.
    pub(crate) fn take_array(&mut self, element_align: usize) -> Result<usize> {
        let len = self.take_u32()?;

        if len > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(len)));
        }

        self.align_to(element_align)?;
        let end = self.cursor + len as usize;

        if end > self.data.len() {
            return Err(Error::new(ErrorKind::EndOfBody));
        }

        Ok(end)
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Skip one complete value described by `signature`.
    ///
    /// Used to parse past values which are not statically expected,
    /// such as the payload of an unrecognised header field.
    pub(crate) fn skip_value(&mut self, signature: &Signature) -> Result<()> {
        let Some(first) = signature.first() else {
            return Err(Error::new(ErrorKind::SignatureEnd));
        };

        match first {
            Type::BYTE => {
                self.take_u8()?;
            }
            Type::BOOLEAN | Type::UINT32 | Type::UNIX_FD => {
                self.take_u32()?;
            }
            Type::INT16 | Type::UINT16 => {
                self.take_u16()?;
            }
            Type::INT32 => {
                self.take_i32()?;
            }
            Type::INT64 | Type::UINT64 => {
                self.take_u64()?;
            }
            Type::DOUBLE => {
                self.take_f64()?;
            }
            Type::STRING | Type::OBJECT_PATH => {
                self.align_to(4)?;
                let len = self.take_u32()? as usize;
                self.take_slice(len + 1)?;
            }
            Type::SIGNATURE => {
                let len = self.take_u8()? as usize;
                self.take_slice(len + 1)?;
            }
            Type::VARIANT => {
                let contained = self.take_signature()?;
                self.skip_value(contained)?;
            }
            Type::ARRAY => {
                let element = Signature::new(&signature.as_bytes()[1..])?;
                let align = element.first().map(Type::alignment).unwrap_or(1);
                let end = self.take_array(align)?;
                self.cursor = end;
            }
            Type::OPEN_PAREN | Type::OPEN_BRACE => {
                let bytes = signature.as_bytes();
                let fields = Signature::new(&bytes[1..bytes.len() - 1])?;

                self.align_to(8)?;

                for field in fields.iter() {
                    self.skip_value(field)?;
                }
            }
            other => {
                return Err(Error::new(ErrorKind::UnknownHeaderField(other.get())));
            }
        }

        Ok(())
    }
}

macro_rules! take_number {
    ($($name:ident, $ty:ty, $read:ident, $align:literal;)*) => {
        impl<'de> Body<'de> {
            $(
                pub(crate) fn $name(&mut self) -> Result<$ty> {
                    self.align_to($align)?;
                    let bytes = self.take_slice($align)?;

                    Ok(match self.endianness {
                        Endianness::BIG => BigEndian::$read(bytes),
                        _ => LittleEndian::$read(bytes),
                    })
                }
            )*
        }
    }
}

take_number! {
    take_u16, u16, read_u16, 2;
    take_i16, i16, read_i16, 2;
    take_u32, u32, read_u32, 4;
    take_i32, i32, read_i32, 4;
    take_u64, u64, read_u64, 8;
    take_i64, i64, read_i64, 8;
    take_f64, f64, read_f64, 8;
}
