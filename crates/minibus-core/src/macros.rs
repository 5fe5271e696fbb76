/// Declare a transparent wrapper around a wire representation with named
/// constants for the values defined by the protocol.
///
/// Unlike a Rust `enum`, values outside of the defined set remain
/// representable, which is required when parsing untrusted input.
#[doc(hidden)]
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[doc = $doc:literal])*
        #[repr($repr:ty)]
        $vis:vis enum $name:ident {
            $(
                $(#[$($variant_meta:meta)*])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $name($repr);

        impl $name {
            /// Construct from the raw wire representation.
            #[doc(hidden)]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Get the raw wire representation.
            #[doc(hidden)]
            pub const fn get(self) -> $repr {
                self.0
            }

            $(
                $(#[$($variant_meta)*])*
                $vis const $variant: Self = Self($value);
            )*
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match *self {
                    $(Self::$variant => f.write_str(stringify!($variant)),)*
                    other => write!(f, "INVALID({:#04x})", other.0),
                }
            }
        }
    }
}

/// Declare a transparent bit set around a wire representation.
#[doc(hidden)]
#[macro_export]
macro_rules! wire_flags {
    (
        $(#[doc = $doc:literal])*
        #[repr($repr:ty)]
        $vis:vis enum $name:ident {
            $(
                $(#[$($variant_meta:meta)*])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Default, Clone, Copy, PartialEq, Eq)]
        #[repr(transparent)]
        $vis struct $name($repr);

        impl $name {
            /// Construct from the raw wire representation.
            #[doc(hidden)]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Get the raw wire representation.
            #[doc(hidden)]
            pub const fn get(self) -> $repr {
                self.0
            }

            $(
                $(#[$($variant_meta)*])*
                $vis const $variant: Self = Self($value);
            )*
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut f = f.debug_set();
                let mut rest = self.0;

                $(
                    if $value != 0 && self.0 & $value == $value {
                        f.entry(&format_args!("{}", stringify!($variant)));
                        rest &= !$value;
                    }
                )*

                if rest != 0 {
                    f.entry(&format_args!("{rest:#b}"));
                }

                f.finish()
            }
        }

        impl ::core::ops::BitOr<$name> for $name {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: $name) -> Self::Output {
                Self(self.0 | rhs.0)
            }
        }

        impl ::core::ops::BitAnd<$name> for $name {
            type Output = bool;

            #[inline]
            fn bitand(self, rhs: $name) -> Self::Output {
                self.0 & rhs.0 != 0
            }
        }

        impl ::core::ops::BitXor<$name> for $name {
            type Output = Self;

            #[inline]
            fn bitxor(self, rhs: $name) -> Self::Output {
                Self(self.0 ^ rhs.0)
            }
        }
    }
}
