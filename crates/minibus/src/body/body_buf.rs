use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::arg::Store;
use crate::error::{Error, ErrorKind, Result};
use crate::proto::{Endianness, MAX_ARRAY_LENGTH, padding_to};
use crate::{Body, Signature, SignatureBuf};

/// A buffer that a message body is written into.
///
/// Every [`store`] appends the signature of the stored value, so that
/// after a sequence of stores the buffer carries both halves of an
/// encoded body: the concatenated signature and the aligned bytes.
///
/// [`store`]: Self::store
///
/// # Examples
///
/// ```
/// use minibus::BodyBuf;
///
/// let mut body = BodyBuf::new();
///
/// body.store(10u16)?;
/// body.store(10u32)?;
///
/// assert_eq!(body.signature(), "qu");
/// assert_eq!(body.len(), 8);
/// # Ok::<_, minibus::Error>(())
/// ```
#[derive(Clone)]
pub struct BodyBuf {
    buf: Vec<u8>,
    endianness: Endianness,
    signature: SignatureBuf,
}

impl Default for BodyBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BodyBuf {
    /// Construct a new empty body buffer using the native endianness.
    pub fn new() -> Self {
        Self::with_endianness(Endianness::NATIVE)
    }

    /// Construct a new empty body buffer with the given endianness.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::{BodyBuf, Endianness};
    ///
    /// let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
    /// body.store(256u16)?;
    /// assert_eq!(body.get(), &[0, 1]);
    /// # Ok::<_, minibus::Error>(())
    /// ```
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            buf: Vec::new(),
            endianness,
            signature: SignatureBuf::new(),
        }
    }

    /// Clear the buffer and its signature.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.signature.clear();
    }

    /// The signature of the values stored so far.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The endianness values are encoded with.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Test if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Get the bytes written so far.
    pub fn get(&self) -> &[u8] {
        &self.buf
    }

    /// Store a value, appending its signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::BodyBuf;
    ///
    /// let mut body = BodyBuf::new();
    /// body.store("Hello")?;
    /// body.store(42i32)?;
    ///
    /// assert_eq!(body.signature(), "si");
    /// # Ok::<_, minibus::Error>(())
    /// ```
    pub fn store<T>(&mut self, value: T) -> Result<()>
    where
        T: Store,
    {
        T::signature(&mut self.signature)?;
        value.store_into(self)
    }

    /// Get a reader over the encoded body.
    pub fn as_body(&self) -> Body<'_> {
        Body::new(&self.buf, &self.signature, self.endianness)
    }

    /// Pad the buffer with zeros up to the given alignment.
    ///
    /// Padding is relative to the start of the buffer, which coincides
    /// with the start of the message body on the wire.
    pub(crate) fn pad_to(&mut self, align: usize) {
        let padding = padding_to(align, self.buf.len());
        self.buf.extend(std::iter::repeat(0).take(padding));
    }

    pub(crate) fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn extend_from_slice_nul(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);
    }

    /// Overwrite four bytes at an earlier position.
    ///
    /// Used to backpatch the length of an array once its payload has
    /// been written.
    pub(crate) fn put_u32_at(&mut self, at: usize, value: u32) {
        let bytes = &mut self.buf[at..at + 4];

        match self.endianness {
            Endianness::BIG => BigEndian::write_u32(bytes, value),
            _ => LittleEndian::write_u32(bytes, value),
        }
    }

    /// Write a length-prefixed, nul-terminated string.
    pub(crate) fn put_str(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.extend_from_slice_nul(value.as_bytes());
    }

    /// Write a length-prefixed, nul-terminated signature.
    pub(crate) fn put_signature(&mut self, value: &Signature) {
        self.put_u8(value.len() as u8);
        self.extend_from_slice_nul(value.as_bytes());
    }

    /// Write an array: a reserved length slot, padding to the element
    /// alignment, then the payload produced by `f`, then the length
    /// backpatched to the payload span.
    pub(crate) fn write_array<F>(&mut self, element_align: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.pad_to(4);
        let length_at = self.buf.len();
        self.put_u32(0);
        self.pad_to(element_align);
        let start = self.buf.len();

        f(self)?;

        let length = self.buf.len() - start;

        if length > MAX_ARRAY_LENGTH as usize {
            return Err(Error::new(ErrorKind::ArrayTooLong(length as u32)));
        }

        self.put_u32_at(length_at, length as u32);
        Ok(())
    }

}

macro_rules! put_number {
    ($($name:ident, $ty:ty, $write:ident, $align:literal;)*) => {
        impl BodyBuf {
            $(
                pub(crate) fn $name(&mut self, value: $ty) {
                    self.pad_to($align);
                    let mut bytes = [0u8; $align];

                    match self.endianness {
                        Endianness::BIG => BigEndian::$write(&mut bytes, value),
                        _ => LittleEndian::$write(&mut bytes, value),
                    }

                    self.buf.extend_from_slice(&bytes);
                }
            )*
        }
    }
}

put_number! {
    put_u16, u16, write_u16, 2;
    put_i16, i16, write_i16, 2;
    put_u32, u32, write_u32, 4;
    put_i32, i32, write_i32, 4;
    put_u64, u64, write_u64, 8;
    put_i64, i64, write_i64, 8;
    put_f64, f64, write_f64, 8;
}
