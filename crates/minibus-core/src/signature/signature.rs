use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::from_utf8_unchecked;

use crate::proto::Type;

use super::{Iter, SignatureBuf, SignatureError, validate};

/// A validated D-Bus signature.
///
/// A signature is a sequence of zero or more single complete types, such
/// as `i`, `as`, `(sv)` or `a{sv}`. This is the borrowed form, the owned
/// form is [`SignatureBuf`].
///
/// # Examples
///
/// ```
/// use minibus_core::signature::Signature;
///
/// const STRING_MAP: &Signature = Signature::new_const(b"a{ss}");
///
/// let sig = Signature::new(b"a{ss}")?;
/// assert_eq!(sig, STRING_MAP);
/// # Ok::<_, minibus_core::signature::SignatureError>(())
/// ```
#[derive(PartialEq, Eq)]
#[repr(transparent)]
pub struct Signature([u8]);

impl Signature {
    /// The empty signature.
    pub const EMPTY: &'static Self = Self::new_const(b"");
    /// The signature of a byte.
    pub const BYTE: &'static Self = Self::new_const(b"y");
    /// The signature of a boolean.
    pub const BOOLEAN: &'static Self = Self::new_const(b"b");
    /// The signature of a 16-bit signed integer.
    pub const INT16: &'static Self = Self::new_const(b"n");
    /// The signature of a 16-bit unsigned integer.
    pub const UINT16: &'static Self = Self::new_const(b"q");
    /// The signature of a 32-bit signed integer.
    pub const INT32: &'static Self = Self::new_const(b"i");
    /// The signature of a 32-bit unsigned integer.
    pub const UINT32: &'static Self = Self::new_const(b"u");
    /// The signature of a 64-bit signed integer.
    pub const INT64: &'static Self = Self::new_const(b"x");
    /// The signature of a 64-bit unsigned integer.
    pub const UINT64: &'static Self = Self::new_const(b"t");
    /// The signature of a double.
    pub const DOUBLE: &'static Self = Self::new_const(b"d");
    /// The signature of a string.
    pub const STRING: &'static Self = Self::new_const(b"s");
    /// The signature of an object path.
    pub const OBJECT_PATH: &'static Self = Self::new_const(b"o");
    /// The signature of a signature.
    pub const SIGNATURE: &'static Self = Self::new_const(b"g");
    /// The signature of a variant.
    pub const VARIANT: &'static Self = Self::new_const(b"v");
    /// The signature of a file descriptor index.
    pub const UNIX_FD: &'static Self = Self::new_const(b"h");

    /// Construct a signature from a byte slice, validating it.
    ///
    /// # Errors
    ///
    /// Errors if the slice is not a valid signature.
    pub fn new<B>(bytes: &B) -> Result<&Self, SignatureError>
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let bytes = bytes.as_ref();
        validate(bytes)?;
        // SAFETY: Just validated and repr(transparent) over [u8].
        Ok(unsafe { Self::new_unchecked(bytes) })
    }

    /// Construct a signature from a literal.
    ///
    /// # Panics
    ///
    /// Panics at compile time if the argument is not a valid signature.
    #[track_caller]
    pub const fn new_const(bytes: &[u8]) -> &Self {
        if validate(bytes).is_err() {
            panic!("Invalid D-Bus signature");
        }

        // SAFETY: Just validated and repr(transparent) over [u8].
        unsafe { Self::new_unchecked(bytes) }
    }

    /// Construct a signature without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the bytes are a valid signature.
    pub(crate) const unsafe fn new_unchecked(bytes: &[u8]) -> &Self {
        &*(bytes as *const [u8] as *const Self)
    }

    /// The length of the signature in bytes.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Test if the signature is empty.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the signature as a byte slice.
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the signature as a string.
    pub const fn as_str(&self) -> &str {
        // SAFETY: Validation only accepts ASCII type codes.
        unsafe { from_utf8_unchecked(&self.0) }
    }

    /// Test if this signature starts with `other`.
    pub fn starts_with(&self, other: &Signature) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Iterate over the single complete types of the signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus_core::signature::Signature;
    ///
    /// let sig = Signature::new(b"ia{sv}as")?;
    /// let mut it = sig.iter();
    ///
    /// assert_eq!(it.next().map(Signature::as_str), Some("i"));
    /// assert_eq!(it.next().map(Signature::as_str), Some("a{sv}"));
    /// assert_eq!(it.next().map(Signature::as_str), Some("as"));
    /// assert!(it.next().is_none());
    /// # Ok::<_, minibus_core::signature::SignatureError>(())
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Split off the first single complete type of the signature.
    ///
    /// Returns `None` if the signature is empty.
    pub fn split_first(&self) -> Option<(&Signature, &Signature)> {
        let n = complete_len(&self.0)?;
        let (head, tail) = self.0.split_at(n);
        // SAFETY: Both halves of a split at a complete type boundary are
        // valid signatures.
        unsafe { Some((Self::new_unchecked(head), Self::new_unchecked(tail))) }
    }

    /// The leading type code of the signature, if any.
    pub fn first(&self) -> Option<Type> {
        Some(Type::new(*self.0.first()?))
    }
}

/// The byte length of the first single complete type in `bytes`.
///
/// Assumes `bytes` is a suffix of a validated signature, in which case
/// every container is balanced.
pub(super) fn complete_len(bytes: &[u8]) -> Option<usize> {
    let mut n = 0;

    while let Some(&b'a') = bytes.get(n) {
        n += 1;
    }

    match *bytes.get(n)? {
        b'(' | b'{' => {
            let mut depth = 0usize;

            loop {
                match *bytes.get(n)? {
                    b'(' | b'{' => depth += 1,
                    b')' | b'}' => {
                        depth -= 1;

                        if depth == 0 {
                            return Some(n + 1);
                        }
                    }
                    _ => {}
                }

                n += 1;
            }
        }
        _ => Some(n + 1),
    }
}

impl fmt::Display for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Debug for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl Hash for Signature {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl AsRef<Signature> for Signature {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl ToOwned for Signature {
    type Owned = SignatureBuf;

    #[inline]
    fn to_owned(&self) -> SignatureBuf {
        SignatureBuf::from_signature(self)
    }
}

impl PartialEq<str> for Signature {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &self.0 == other.as_bytes()
    }
}

impl PartialEq<Signature> for str {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        self.as_bytes() == &other.0
    }
}

impl PartialEq<&Signature> for Signature {
    #[inline]
    fn eq(&self, other: &&Signature) -> bool {
        self.0 == other.0
    }
}

impl PartialEq<Signature> for &Signature {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        self.0 == other.0
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Signature;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
