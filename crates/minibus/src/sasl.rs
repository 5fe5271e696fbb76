//! The SASL handshake D-Bus performs before speaking its binary
//! protocol.
//!
//! Only the `EXTERNAL` mechanism is supported: the connecting side
//! announces its UID and the peer verifies it against the socket
//! credentials.

use std::io::{Read, Write};

use crate::error::{Error, ErrorKind, Result};

/// The longest SASL response line accepted before the peer is
/// considered broken.
const MAX_LINE: usize = 4096;

/// Perform the blocking SASL `EXTERNAL` handshake for the current UID.
///
/// After this returns the stream carries only D-Bus messages.
pub(crate) fn authenticate<S>(stream: &mut S) -> Result<()>
where
    S: ?Sized + Read + Write,
{
    // SAFETY: getuid is always safe to call.
    let uid = unsafe { libc::getuid() };
    authenticate_as(stream, uid)
}

pub(crate) fn authenticate_as<S>(stream: &mut S, uid: u32) -> Result<()>
where
    S: ?Sized + Read + Write,
{
    let mut buf = [0u8; 32];
    let uid = uid_ascii_hex(&mut buf, uid);

    let mut auth = Vec::with_capacity(64);
    // The leading nul transmits the credentials byte the server
    // expects before any command.
    auth.push(0);
    auth.extend_from_slice(b"AUTH EXTERNAL ");
    auth.extend_from_slice(uid);
    auth.extend_from_slice(b"\r\n");

    stream.write_all(&auth)?;
    stream.flush()?;

    let line = read_line(stream)?;

    if !line.starts_with("OK") {
        return Err(Error::new(ErrorKind::HandshakeFail(line.into())));
    }

    tracing::debug!(response = line.as_str(), "authenticated");

    stream.write_all(b"BEGIN\r\n")?;
    stream.flush()?;
    Ok(())
}

/// Encode a UID the way `EXTERNAL` wants it: the decimal digits of the
/// UID, each hex-encoded as ASCII.
fn uid_ascii_hex(buf: &mut [u8; 32], mut uid: u32) -> &[u8] {
    const HEX: [u8; 16] = *b"0123456789abcdef";

    let mut n = buf.len();

    loop {
        let digit = b'0' + (uid % 10) as u8;
        n -= 1;
        buf[n] = HEX[(digit & 0xf) as usize];
        n -= 1;
        buf[n] = HEX[(digit >> 4) as usize];
        uid /= 10;

        if uid == 0 {
            break;
        }
    }

    &buf[n..]
}

/// Read one CRLF-terminated response line.
///
/// Bytes are read one at a time so that nothing past the line is ever
/// pulled off the stream, which would desynchronise the message
/// protocol that follows.
fn read_line<S>(stream: &mut S) -> Result<String>
where
    S: ?Sized + Read,
{
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        stream.read_exact(&mut byte)?;

        if byte[0] == b'\n' {
            break;
        }

        line.push(byte[0]);

        if line.len() > MAX_LINE {
            return Err(Error::new(ErrorKind::HandshakeFail("line too long".into())));
        }
    }

    if line.last() == Some(&b'\r') {
        line.pop();
    }

    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;
    use std::thread;

    use super::{authenticate_as, uid_ascii_hex};

    fn hex(uid: u32) -> String {
        let mut buf = [0u8; 32];
        String::from_utf8(uid_ascii_hex(&mut buf, uid).to_vec()).unwrap()
    }

    #[test]
    fn uid_encoding() {
        assert_eq!(hex(0), "30");
        assert_eq!(hex(1), "31");
        assert_eq!(hex(1000), "31303030");
        assert_eq!(hex(65534), "3635353334");
    }

    #[test]
    fn handshake() {
        let (mut ours, mut theirs) = UnixStream::pair().unwrap();

        let server = thread::spawn(move || {
            let mut line = Vec::new();
            let mut byte = [0u8; 1];

            loop {
                theirs.read_exact(&mut byte).unwrap();
                line.push(byte[0]);

                if byte[0] == b'\n' {
                    break;
                }
            }

            assert_eq!(line[0], 0);
            assert_eq!(&line[1..], b"AUTH EXTERNAL 31303030\r\n");

            theirs
                .write_all(b"OK 1234deadbeef5678\r\n")
                .unwrap();

            let mut begin = [0u8; 7];
            theirs.read_exact(&mut begin).unwrap();
            assert_eq!(&begin, b"BEGIN\r\n");
        });

        authenticate_as(&mut ours, 1000).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn handshake_rejected() {
        let (mut ours, mut theirs) = UnixStream::pair().unwrap();

        let server = thread::spawn(move || {
            let mut line = Vec::new();
            let mut byte = [0u8; 1];

            loop {
                theirs.read_exact(&mut byte).unwrap();
                line.push(byte[0]);

                if byte[0] == b'\n' {
                    break;
                }
            }

            theirs.write_all(b"REJECTED EXTERNAL\r\n").unwrap();
        });

        let error = authenticate_as(&mut ours, 1000).unwrap_err();
        assert!(format!("{error}").contains("REJECTED"));
        server.join().unwrap();
    }
}
