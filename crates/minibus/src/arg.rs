//! The mapping between host types and D-Bus types.
//!
//! [`Arg`] ties a Rust type to its D-Bus signature and alignment,
//! [`Store`] writes values of the type into a [`BodyBuf`], and
//! [`Load`] reads them back out of a [`Body`].
//!
//! Four distinct string-like types keep the `s`, `o`, `g` and `h` type
//! codes from colliding: plain strings map to `s`, [`ObjectPath`] to
//! `o`, [`Signature`] to `g` and [`UnixFd`] to `h`. There are no
//! implementations for `i8` or `f32`, which have no D-Bus
//! representation.

use std::collections::HashMap;
use std::hash::Hash;

use minibus_core::signature::SignatureError;

use crate::body::{Body, BodyBuf};
use crate::error::{Error, ErrorKind, Result};
use crate::object_path::{ObjectPath, ObjectPathBuf};
use crate::proto::Type;
use crate::{Signature, SignatureBuf};

/// A type with a D-Bus representation.
///
/// Every implementor maps to exactly one single complete type: tuples
/// map to structs, `Vec<T>` to arrays, maps to arrays of dict entries
/// and [`Variant`] to `v`.
///
/// [`Variant`]: crate::Variant
pub trait Arg {
    /// The alignment of the encoded value.
    const ALIGNMENT: usize;

    /// Append the signature of the type to `signature`.
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError>;
}

/// Marker trait for basic types, which are the only legal dict entry
/// keys.
pub trait BasicArg: Arg {}

/// A type whose values can be stored into a [`BodyBuf`].
pub trait Store: Arg {
    /// Write the encoded value, padding to its alignment first.
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()>;
}

/// A type whose values can be loaded from a [`Body`].
pub trait Load<'de>: Arg + Sized {
    /// Read a value, aligning the cursor to its alignment first.
    fn load(body: &mut Body<'de>) -> Result<Self>;
}

impl<T> Arg for &T
where
    T: ?Sized + Arg,
{
    const ALIGNMENT: usize = T::ALIGNMENT;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        T::signature(signature)
    }
}

impl<T> BasicArg for &T where T: ?Sized + BasicArg {}

impl<T> Store for &T
where
    T: ?Sized + Store,
{
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        (**self).store_into(buf)
    }
}

macro_rules! impl_number {
    ($($ty:ty, $signature:ident, $align:literal, $put:ident, $take:ident;)*) => {
        $(
            impl Arg for $ty {
                const ALIGNMENT: usize = $align;

                #[inline]
                fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
                    signature.push(Type::$signature)
                }
            }

            impl BasicArg for $ty {}

            impl Store for $ty {
                #[inline]
                fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
                    buf.$put(*self);
                    Ok(())
                }
            }

            impl<'de> Load<'de> for $ty {
                #[inline]
                fn load(body: &mut Body<'de>) -> Result<Self> {
                    body.$take()
                }
            }
        )*
    }
}

impl_number! {
    i16, INT16, 2, put_i16, take_i16;
    u16, UINT16, 2, put_u16, take_u16;
    i32, INT32, 4, put_i32, take_i32;
    u32, UINT32, 4, put_u32, take_u32;
    i64, INT64, 8, put_i64, take_i64;
    u64, UINT64, 8, put_u64, take_u64;
    f64, DOUBLE, 8, put_f64, take_f64;
}

impl Arg for u8 {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::BYTE)
    }
}

impl BasicArg for u8 {}

impl Store for u8 {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u8(*self);
        Ok(())
    }
}

impl<'de> Load<'de> for u8 {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        body.take_u8()
    }
}

/// Booleans are encoded as a `u32` which must be `0` or `1`; any other
/// value read off the wire is rejected.
impl Arg for bool {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::BOOLEAN)
    }
}

impl BasicArg for bool {}

impl Store for bool {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u32(*self as u32);
        Ok(())
    }
}

impl<'de> Load<'de> for bool {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        match body.take_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::new(ErrorKind::InvalidBoolean(other))),
        }
    }
}

/// An index into the out-of-band file descriptor array accompanying a
/// message, the `h` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct UnixFd(pub u32);

impl Arg for UnixFd {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::UNIX_FD)
    }
}

impl BasicArg for UnixFd {}

impl Store for UnixFd {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u32(self.0);
        Ok(())
    }
}

impl<'de> Load<'de> for UnixFd {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        Ok(UnixFd(body.take_u32()?))
    }
}

impl Arg for str {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::STRING)
    }
}

impl BasicArg for str {}

impl Store for str {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_str(self);
        Ok(())
    }
}

impl<'de> Load<'de> for &'de str {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        body.take_str()
    }
}

impl Arg for String {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        str::signature(signature)
    }
}

impl BasicArg for String {}

impl Store for String {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        self.as_str().store_into(buf)
    }
}

impl<'de> Load<'de> for String {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        Ok(body.take_str()?.to_owned())
    }
}

impl Arg for Signature {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::SIGNATURE)
    }
}

impl BasicArg for Signature {}

impl Store for Signature {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_signature(self);
        Ok(())
    }
}

impl<'de> Load<'de> for &'de Signature {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        body.take_signature()
    }
}

impl Arg for SignatureBuf {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        Signature::signature(signature)
    }
}

impl BasicArg for SignatureBuf {}

impl Store for SignatureBuf {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        Signature::store_into(self, buf)
    }
}

impl<'de> Load<'de> for SignatureBuf {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        Ok(body.take_signature()?.to_owned())
    }
}

impl Arg for ObjectPath {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::OBJECT_PATH)
    }
}

impl BasicArg for ObjectPath {}

impl Store for ObjectPath {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_str(self.as_str());
        Ok(())
    }
}

impl<'de> Load<'de> for &'de ObjectPath {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        Ok(ObjectPath::new(body.take_str()?)?)
    }
}

impl Arg for ObjectPathBuf {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        ObjectPath::signature(signature)
    }
}

impl BasicArg for ObjectPathBuf {}

impl Store for ObjectPathBuf {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        ObjectPath::store_into(self, buf)
    }
}

impl<'de> Load<'de> for ObjectPathBuf {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        Ok(ObjectPath::new(body.take_str()?)?.to_owned())
    }
}

/// Byte slices are encoded as `ay` without per-element processing.
impl Arg for [u8] {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::ARRAY)?;
        signature.push(Type::BYTE)
    }
}

impl Store for [u8] {
    #[inline]
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.write_array(1, |buf| {
            buf.extend_from_slice(self);
            Ok(())
        })
    }
}

impl<'de> Load<'de> for &'de [u8] {
    #[inline]
    fn load(body: &mut Body<'de>) -> Result<Self> {
        let end = body.take_array(1)?;
        body.take_slice(end - body.cursor())
    }
}

impl<T> Arg for Vec<T>
where
    T: Arg,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::ARRAY)?;
        T::signature(signature)
    }
}

impl<T> Store for Vec<T>
where
    T: Store,
{
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.write_array(T::ALIGNMENT, |buf| {
            for value in self {
                value.store_into(buf)?;
            }

            Ok(())
        })
    }
}

impl<'de, T> Load<'de> for Vec<T>
where
    T: Load<'de>,
{
    fn load(body: &mut Body<'de>) -> Result<Self> {
        let end = body.take_array(T::ALIGNMENT)?;
        let mut values = Vec::new();

        while body.cursor() < end {
            values.push(T::load(body)?);
        }

        if body.cursor() != end {
            return Err(Error::new(ErrorKind::EndOfBody));
        }

        Ok(values)
    }
}

impl<K, V> Arg for HashMap<K, V>
where
    K: BasicArg,
    V: Arg,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
        signature.push(Type::ARRAY)?;
        signature.push(Type::OPEN_BRACE)?;
        K::signature(signature)?;
        V::signature(signature)?;
        signature.push(Type::CLOSE_BRACE)
    }
}

impl<K, V> Store for HashMap<K, V>
where
    K: BasicArg + Store,
    V: Store,
{
    fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.write_array(8, |buf| {
            for (key, value) in self {
                buf.pad_to(8);
                key.store_into(buf)?;
                value.store_into(buf)?;
            }

            Ok(())
        })
    }
}

impl<'de, K, V> Load<'de> for HashMap<K, V>
where
    K: BasicArg + Load<'de> + Eq + Hash,
    V: Load<'de>,
{
    fn load(body: &mut Body<'de>) -> Result<Self> {
        let end = body.take_array(8)?;
        let mut map = HashMap::new();

        while body.cursor() < end {
            body.align_to(8)?;
            let key = K::load(body)?;
            let value = V::load(body)?;
            map.insert(key, value);
        }

        if body.cursor() != end {
            return Err(Error::new(ErrorKind::EndOfBody));
        }

        Ok(map)
    }
}

macro_rules! impl_tuple {
    ($($field:ident),*) => {
        impl<$($field,)*> Arg for ($($field,)*)
        where
            $($field: Arg,)*
        {
            const ALIGNMENT: usize = 8;

            #[inline]
            fn signature(signature: &mut SignatureBuf) -> Result<(), SignatureError> {
                signature.push(Type::OPEN_PAREN)?;
                $($field::signature(signature)?;)*
                signature.push(Type::CLOSE_PAREN)
            }
        }

        impl<$($field,)*> Store for ($($field,)*)
        where
            $($field: Store,)*
        {
            fn store_into(&self, buf: &mut BodyBuf) -> Result<()> {
                #[allow(non_snake_case)]
                let ($($field,)*) = self;
                buf.pad_to(8);
                $($field.store_into(buf)?;)*
                Ok(())
            }
        }

        impl<'de, $($field,)*> Load<'de> for ($($field,)*)
        where
            $($field: Load<'de>,)*
        {
            fn load(body: &mut Body<'de>) -> Result<Self> {
                body.align_to(8)?;
                Ok(($($field::load(body)?,)*))
            }
        }
    }
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
impl_tuple!(A, B, C, D, E, F, G);
impl_tuple!(A, B, C, D, E, F, G, H);
