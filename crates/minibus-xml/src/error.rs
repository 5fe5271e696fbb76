use std::fmt;

use minibus_core::signature::SignatureError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised while processing an introspection document.
///
/// Carries the element path at which the problem was found, such as
/// `node/interface[0]/method[2]`.
#[derive(Debug)]
pub struct Error {
    path: Box<str>,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new<P, K>(path: P, kind: K) -> Self
    where
        Box<str>: From<P>,
        ErrorKind: From<K>,
    {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error(transparent)]
    Xml(#[from] xmlparser::Error),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("Unexpected end of element")]
    UnexpectedElementEnd,
    #[error("Mismatching end: expected `{expected}`, found `{actual}`")]
    MismatchingEnd { expected: Box<str>, actual: Box<str> },
    #[error("Missing `name` attribute on interface")]
    MissingInterfaceName,
    #[error("Missing `name` attribute on method")]
    MissingMethodName,
    #[error("Missing `name` attribute on signal")]
    MissingSignalName,
    #[error("Missing `name` attribute on property")]
    MissingPropertyName,
    #[error("Missing `name` attribute on child node")]
    MissingNodeName,
    #[error("Missing `type` attribute on argument")]
    MissingArgumentType,
    #[error("Missing `type` attribute on property")]
    MissingPropertyType,
    #[error("Missing `access` attribute on property")]
    MissingPropertyAccess,
    #[error("Unsupported argument direction `{0}`")]
    UnsupportedDirection(Box<str>),
    #[error("Unsupported property access `{0}`")]
    UnsupportedAccess(Box<str>),
}
