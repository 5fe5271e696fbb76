//! Packing and unpacking of messages.
//!
//! A message on the wire is a fixed 16 byte header block, an array of
//! `(u8, variant)` header fields, padding up to an 8 byte boundary, and
//! the body. Everything after the endianness flag is encoded in the
//! endianness it announces.

use std::io::Read;
use std::num::NonZeroU32;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::body::{Body, BodyBuf};
use crate::error::{Error, ErrorKind, Result};
use crate::object_path::ObjectPath;
use crate::proto::{
    Endianness, Flags, HeaderField, MAX_ARRAY_LENGTH, MAX_BODY_LENGTH, MessageType, VERSION,
    padding_to,
};
use crate::{Message, MessageKind, Signature, SignatureBuf};

/// Encode a message into wire format.
pub(crate) fn pack(message: &Message) -> Result<Vec<u8>> {
    if message.body.len() > MAX_BODY_LENGTH as usize {
        return Err(Error::new(ErrorKind::BodyTooLong(message.body.len() as u32)));
    }

    // The buffer starts at the start of the message, which shares its
    // 8-alignment with the body, so body-relative padding holds.
    let mut buf = BodyBuf::with_endianness(message.endianness);

    buf.put_u8(message.endianness.get());
    buf.put_u8(message.message_type().get());
    buf.put_u8(message.flags.get());
    buf.put_u8(VERSION);
    buf.put_u32(message.body.len() as u32);
    buf.put_u32(message.serial.get());

    buf.write_array(8, |buf| {
        match &message.kind {
            MessageKind::MethodCall { path, member } => {
                put_path_field(buf, path);
                put_str_field(buf, HeaderField::MEMBER, member);
            }
            MessageKind::MethodReturn { reply_serial } => {
                put_u32_field(buf, HeaderField::REPLY_SERIAL, reply_serial.get());
            }
            MessageKind::Error {
                error_name,
                reply_serial,
            } => {
                put_str_field(buf, HeaderField::ERROR_NAME, error_name);
                put_u32_field(buf, HeaderField::REPLY_SERIAL, reply_serial.get());
            }
            MessageKind::Signal { path, member } => {
                put_path_field(buf, path);
                put_str_field(buf, HeaderField::MEMBER, member);
            }
        }

        if let Some(interface) = &message.interface {
            put_str_field(buf, HeaderField::INTERFACE, interface);
        }

        if let Some(destination) = &message.destination {
            put_str_field(buf, HeaderField::DESTINATION, destination);
        }

        if let Some(sender) = &message.sender {
            put_str_field(buf, HeaderField::SENDER, sender);
        }

        if !message.signature.is_empty() {
            buf.pad_to(8);
            buf.put_u8(HeaderField::SIGNATURE.get());
            buf.put_signature(Signature::SIGNATURE);
            buf.put_signature(&message.signature);
        }

        Ok(())
    })?;

    buf.pad_to(8);
    buf.extend_from_slice(&message.body);
    Ok(buf.get().to_vec())
}

fn put_path_field(buf: &mut BodyBuf, path: &ObjectPath) {
    buf.pad_to(8);
    buf.put_u8(HeaderField::PATH.get());
    buf.put_signature(Signature::OBJECT_PATH);
    buf.put_str(path.as_str());
}

fn put_str_field(buf: &mut BodyBuf, field: HeaderField, value: &str) {
    buf.pad_to(8);
    buf.put_u8(field.get());
    buf.put_signature(Signature::STRING);
    buf.put_str(value);
}

fn put_u32_field(buf: &mut BodyBuf, field: HeaderField, value: u32) {
    buf.pad_to(8);
    buf.put_u8(field.get());
    buf.put_signature(Signature::UINT32);
    buf.put_u32(value);
}

/// The header fields collected while parsing.
#[derive(Default)]
struct Fields {
    path: Option<crate::ObjectPathBuf>,
    interface: Option<Box<str>>,
    member: Option<Box<str>>,
    error_name: Option<Box<str>>,
    reply_serial: Option<NonZeroU32>,
    destination: Option<Box<str>>,
    sender: Option<Box<str>>,
    signature: SignatureBuf,
}

/// Decode a full message from wire format.
pub(crate) fn unpack(data: &[u8]) -> Result<Message> {
    let endianness = endianness_of(data)?;
    let mut cursor = Body::new(data, Signature::EMPTY, endianness);

    cursor.take_u8()?;
    let message_type = MessageType::new(cursor.take_u8()?);
    let flags = Flags::new(cursor.take_u8()?);
    let version = cursor.take_u8()?;

    if version != VERSION {
        return Err(Error::new(ErrorKind::BadProtocolVersion(version)));
    }

    let body_length = cursor.take_u32()?;

    if body_length > MAX_BODY_LENGTH {
        return Err(Error::new(ErrorKind::BodyTooLong(body_length)));
    }

    let serial = NonZeroU32::new(cursor.take_u32()?)
        .ok_or_else(|| Error::new(ErrorKind::ZeroSerial))?;

    let fields = parse_fields(&mut cursor)?;

    cursor.align_to(8)?;
    let body = cursor.take_slice(body_length as usize)?;

    let kind = match message_type {
        MessageType::METHOD_CALL => MessageKind::MethodCall {
            path: fields
                .path
                .ok_or_else(|| Error::new(ErrorKind::MissingPath))?,
            member: fields
                .member
                .ok_or_else(|| Error::new(ErrorKind::MissingMember))?,
        },
        MessageType::METHOD_RETURN => MessageKind::MethodReturn {
            reply_serial: fields
                .reply_serial
                .ok_or_else(|| Error::new(ErrorKind::MissingReplySerial))?,
        },
        MessageType::ERROR => MessageKind::Error {
            error_name: fields
                .error_name
                .ok_or_else(|| Error::new(ErrorKind::MissingErrorName))?,
            reply_serial: fields
                .reply_serial
                .ok_or_else(|| Error::new(ErrorKind::MissingReplySerial))?,
        },
        MessageType::SIGNAL => {
            if fields.interface.is_none() {
                return Err(Error::new(ErrorKind::MissingInterface));
            }

            MessageKind::Signal {
                path: fields
                    .path
                    .ok_or_else(|| Error::new(ErrorKind::MissingPath))?,
                member: fields
                    .member
                    .ok_or_else(|| Error::new(ErrorKind::MissingMember))?,
            }
        }
        other => return Err(Error::new(ErrorKind::InvalidMessageType(other.get()))),
    };

    Ok(Message {
        kind,
        serial,
        flags,
        interface: fields.interface,
        destination: fields.destination,
        sender: fields.sender,
        signature: fields.signature,
        body: body.to_vec(),
        endianness,
    })
}

fn parse_fields(cursor: &mut Body<'_>) -> Result<Fields> {
    let mut fields = Fields::default();

    let length = cursor.take_u32()?;

    if length > MAX_ARRAY_LENGTH {
        return Err(Error::new(ErrorKind::ArrayTooLong(length)));
    }

    cursor.align_to(8)?;
    let end = cursor.cursor() + length as usize;

    while cursor.cursor() < end {
        cursor.align_to(8)?;

        let code = HeaderField::new(cursor.take_u8()?);
        let contained = cursor.take_signature()?;

        // The variant signature of a known field is dictated by its
        // code; a disagreement means the header cannot be trusted.
        match code {
            HeaderField::PATH => {
                expect_field(code, contained, Signature::OBJECT_PATH)?;
                fields.path = Some(ObjectPath::new(cursor.take_str()?)?.to_owned());
            }
            HeaderField::INTERFACE => {
                expect_field(code, contained, Signature::STRING)?;
                fields.interface = Some(cursor.take_str()?.into());
            }
            HeaderField::MEMBER => {
                expect_field(code, contained, Signature::STRING)?;
                fields.member = Some(cursor.take_str()?.into());
            }
            HeaderField::ERROR_NAME => {
                expect_field(code, contained, Signature::STRING)?;
                fields.error_name = Some(cursor.take_str()?.into());
            }
            HeaderField::REPLY_SERIAL => {
                expect_field(code, contained, Signature::UINT32)?;
                let serial = NonZeroU32::new(cursor.take_u32()?)
                    .ok_or_else(|| Error::new(ErrorKind::ZeroSerial))?;
                fields.reply_serial = Some(serial);
            }
            HeaderField::DESTINATION => {
                expect_field(code, contained, Signature::STRING)?;
                fields.destination = Some(cursor.take_str()?.into());
            }
            HeaderField::SENDER => {
                expect_field(code, contained, Signature::STRING)?;
                fields.sender = Some(cursor.take_str()?.into());
            }
            HeaderField::SIGNATURE => {
                expect_field(code, contained, Signature::SIGNATURE)?;
                fields.signature = cursor.take_signature()?.to_owned();
            }
            HeaderField::UNIX_FDS => {
                expect_field(code, contained, Signature::UINT32)?;
                // File descriptor passing is not supported; the count
                // is parsed past.
                cursor.take_u32()?;
            }
            unknown => {
                // Skip one complete value per the declared signature so
                // that fields defined by future protocol revisions do
                // not desynchronise the stream.
                tracing::trace!(code = unknown.get(), "skipping unknown header field");
                cursor.skip_value(contained)?;
            }
        }
    }

    if cursor.cursor() != end {
        return Err(Error::new(ErrorKind::UnknownHeaderField(0)));
    }

    Ok(fields)
}

fn expect_field(code: HeaderField, actual: &Signature, expected: &Signature) -> Result<()> {
    if actual != expected {
        return Err(Error::new(ErrorKind::UnknownHeaderField(code.get())));
    }

    Ok(())
}

fn endianness_of(data: &[u8]) -> Result<Endianness> {
    match data.first().copied() {
        Some(b) if b == Endianness::LITTLE.get() => Ok(Endianness::LITTLE),
        Some(b) if b == Endianness::BIG.get() => Ok(Endianness::BIG),
        Some(b) => Err(Error::new(ErrorKind::BadEndianFlag(b))),
        None => Err(Error::new(ErrorKind::EndOfBody)),
    }
}

/// Read one complete message off a blocking stream.
///
/// Reads the fixed 16 byte prefix first to learn the length of the
/// header field array and the body, then reads exactly the rest, so
/// that no partial message is ever left behind on the stream.
pub(crate) fn read_message<R>(reader: &mut R) -> Result<Message>
where
    R: ?Sized + Read,
{
    let mut fixed = [0u8; 16];
    reader.read_exact(&mut fixed)?;

    let endianness = endianness_of(&fixed)?;

    let (body_length, fields_length) = match endianness {
        Endianness::BIG => (
            BigEndian::read_u32(&fixed[4..8]),
            BigEndian::read_u32(&fixed[12..16]),
        ),
        _ => (
            LittleEndian::read_u32(&fixed[4..8]),
            LittleEndian::read_u32(&fixed[12..16]),
        ),
    };

    if body_length > MAX_BODY_LENGTH {
        return Err(Error::new(ErrorKind::BodyTooLong(body_length)));
    }

    if fields_length > MAX_ARRAY_LENGTH {
        return Err(Error::new(ErrorKind::ArrayTooLong(fields_length)));
    }

    let fields_length = fields_length as usize;
    let body_length = body_length as usize;

    // Header fields, padding up to the body, and the body itself.
    let rest = fields_length + padding_to(8, 16 + fields_length) + body_length;

    let mut data = vec![0u8; 16 + rest];
    data[..16].copy_from_slice(&fixed);
    reader.read_exact(&mut data[16..])?;

    unpack(&data)
}
