use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;

use crate::proto::Type;

use super::{MAX_SIGNATURE, Signature, SignatureError, SignatureErrorKind};

/// An owned D-Bus signature.
///
/// The borrowed form is [`Signature`], which this dereferences to.
///
/// # Examples
///
/// ```
/// use minibus_core::signature::{Signature, SignatureBuf};
///
/// let mut sig = SignatureBuf::new();
/// sig.extend_from_signature(Signature::UINT32)?;
/// sig.extend_from_signature(Signature::STRING)?;
///
/// assert_eq!(*sig, *Signature::new(b"us")?);
/// # Ok::<_, minibus_core::signature::SignatureError>(())
/// ```
#[derive(Default, Clone)]
pub struct SignatureBuf {
    bytes: Vec<u8>,
}

impl SignatureBuf {
    /// Construct a new empty signature.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Construct an owned copy of a borrowed signature.
    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            bytes: signature.as_bytes().to_vec(),
        }
    }

    /// Clear the signature.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append a borrowed signature.
    ///
    /// # Errors
    ///
    /// Errors if the signature would grow beyond the maximum permitted
    /// length of 255 bytes.
    pub fn extend_from_signature(&mut self, other: &Signature) -> Result<(), SignatureError> {
        self.reserve(other.len())?;
        self.bytes.extend_from_slice(other.as_bytes());
        Ok(())
    }

    /// Append a single raw type code.
    ///
    /// Callers are responsible for producing a balanced signature, as is
    /// done when a composite type emits its own parentheses.
    #[doc(hidden)]
    pub fn push(&mut self, ty: Type) -> Result<(), SignatureError> {
        self.reserve(1)?;
        self.bytes.push(ty.get());
        Ok(())
    }

    fn reserve(&mut self, extra: usize) -> Result<(), SignatureError> {
        if self.bytes.len() + extra > MAX_SIGNATURE {
            return Err(SignatureError::new(SignatureErrorKind::SignatureTooLong));
        }

        Ok(())
    }
}

impl Deref for SignatureBuf {
    type Target = Signature;

    #[inline]
    fn deref(&self) -> &Signature {
        // SAFETY: The buffer is only ever extended with validated
        // signature fragments.
        unsafe { Signature::new_unchecked(&self.bytes) }
    }
}

impl Borrow<Signature> for SignatureBuf {
    #[inline]
    fn borrow(&self) -> &Signature {
        self
    }
}

impl AsRef<Signature> for SignatureBuf {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl From<&Signature> for SignatureBuf {
    #[inline]
    fn from(signature: &Signature) -> Self {
        Self::from_signature(signature)
    }
}

impl TryFrom<&str> for SignatureBuf {
    type Error = SignatureError;

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Signature::new(value)?.to_owned())
    }
}

impl fmt::Display for SignatureBuf {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Debug for SignatureBuf {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl PartialEq for SignatureBuf {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for SignatureBuf {}

impl Hash for SignatureBuf {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Signature::hash(self, state);
    }
}

impl PartialEq<Signature> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        **self == *other
    }
}

impl PartialEq<&Signature> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &&Signature) -> bool {
        **self == **other
    }
}

impl PartialEq<SignatureBuf> for Signature {
    #[inline]
    fn eq(&self, other: &SignatureBuf) -> bool {
        *self == **other
    }
}

impl PartialEq<str> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        **self == *other
    }
}

impl PartialEq<&str> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        **self == **other
    }
}
