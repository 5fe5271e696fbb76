use std::error;
use std::fmt;

/// An error raised when validating a D-Bus signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureError {
    kind: SignatureErrorKind,
}

impl SignatureError {
    pub(crate) const fn new(kind: SignatureErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SignatureErrorKind::*;

        match self.kind {
            SignatureTooLong => write!(f, "Signature is longer than 255 bytes"),
            UnknownTypeCode(code) => {
                write!(f, "Unknown type code `{}`", code.escape_ascii())
            }
            MissingArrayElementType => write!(f, "Array is missing its element type"),
            StructEndedButNotStarted => write!(f, "Struct ended but was never started"),
            StructStartedButNotEnded => write!(f, "Struct started but never ended"),
            StructHasNoFields => write!(f, "Struct has no fields"),
            DictEndedButNotStarted => write!(f, "Dict entry ended but was never started"),
            DictStartedButNotEnded => write!(f, "Dict entry started but never ended"),
            DictEntryHasNoFields => write!(f, "Dict entry has no fields"),
            DictEntryHasOnlyOneField => write!(f, "Dict entry has only one field"),
            DictEntryHasTooManyFields => write!(f, "Dict entry has more than two fields"),
            DictEntryNotInsideArray => write!(f, "Dict entry is only valid inside an array"),
            DictKeyMustBeBasicType => write!(f, "Dict entry key must be a basic type"),
            ExceededMaximumDepth => write!(f, "Exceeded maximum container depth"),
        }
    }
}

impl error::Error for SignatureError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignatureErrorKind {
    SignatureTooLong,
    UnknownTypeCode(u8),
    MissingArrayElementType,
    StructEndedButNotStarted,
    StructStartedButNotEnded,
    StructHasNoFields,
    DictEndedButNotStarted,
    DictStartedButNotEnded,
    DictEntryHasNoFields,
    DictEntryHasOnlyOneField,
    DictEntryHasTooManyFields,
    DictEntryNotInsideArray,
    DictKeyMustBeBasicType,
    ExceededMaximumDepth,
}
