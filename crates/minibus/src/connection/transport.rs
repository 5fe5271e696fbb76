use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;

use crate::error::{Error, ErrorKind, Result};

const ENV_SESSION_BUS: &str = "DBUS_SESSION_BUS_ADDRESS";
const ENV_SYSTEM_BUS: &str = "DBUS_SYSTEM_BUS_ADDRESS";
const ENV_A11Y_BUS: &str = "AT_SPI_BUS_ADDRESS";

const DEFAULT_SYSTEM_BUS: &str = "unix:path=/var/run/dbus/system_bus_socket";

/// The well-known message buses a [`Connection`] can be established
/// to.
///
/// [`Connection`]: crate::Connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    /// The per-login-session bus, located through
    /// `DBUS_SESSION_BUS_ADDRESS`.
    Session,
    /// The system-wide bus, located through `DBUS_SYSTEM_BUS_ADDRESS`
    /// with a fallback to `/var/run/dbus/system_bus_socket`.
    System,
    /// The accessibility bus, located through `AT_SPI_BUS_ADDRESS`
    /// with a fallback to `/run/user/<uid>/at-spi/bus_0`.
    Accessibility,
}

/// The stream a connection talks over.
pub(crate) struct Transport {
    stream: UnixStream,
}

impl Transport {
    /// Resolve the address of the given bus and connect to it.
    pub(crate) fn connect(bus: Bus) -> Result<Self> {
        let address = resolve_address(bus)?;
        let path = parse_address(address.as_bytes())?;

        tracing::debug!(path = ?OsStr::from_bytes(path), "connecting");

        let stream = UnixStream::connect(OsStr::from_bytes(path))?;
        Ok(Self::from_stream(stream))
    }

    pub(crate) fn from_stream(stream: UnixStream) -> Self {
        Self { stream }
    }
}

impl Read for Transport {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Transport {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

fn resolve_address(bus: Bus) -> Result<OsString> {
    match bus {
        Bus::Session => {
            env::var_os(ENV_SESSION_BUS).ok_or_else(|| Error::new(ErrorKind::MissingBus))
        }
        Bus::System => Ok(env::var_os(ENV_SYSTEM_BUS)
            .unwrap_or_else(|| OsString::from(DEFAULT_SYSTEM_BUS))),
        Bus::Accessibility => Ok(env::var_os(ENV_A11Y_BUS).unwrap_or_else(|| {
            // SAFETY: getuid is always safe to call.
            let uid = unsafe { libc::getuid() };
            OsString::from(format!("unix:path=/run/user/{uid}/at-spi/bus_0"))
        })),
    }
}

/// Parse a `unix:path=PATH` bus address.
fn parse_address(bytes: &[u8]) -> Result<&[u8]> {
    let Some(at) = bytes.iter().position(|&b| b == b'=') else {
        return Err(Error::new(ErrorKind::InvalidAddress));
    };

    let (head, tail) = bytes.split_at(at);

    match head {
        b"unix:path" => Ok(&tail[1..]),
        _ => Err(Error::new(ErrorKind::InvalidAddress)),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_address;

    #[test]
    fn addresses() {
        assert_eq!(
            parse_address(b"unix:path=/run/user/1000/bus").unwrap(),
            b"/run/user/1000/bus"
        );

        assert!(parse_address(b"unix:abstract=/tmp/x").is_err());
        assert!(parse_address(b"tcp:host=localhost,port=1234").is_err());
        assert!(parse_address(b"garbage").is_err());
    }
}
