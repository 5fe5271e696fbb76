use std::io::Cursor;
use std::num::NonZeroU32;

use crate::message::wire;
use crate::proto::Flags;
use crate::{BodyBuf, Endianness, Message, MessageKind, ObjectPath};

const SERIAL_2: NonZeroU32 = match NonZeroU32::new(2) {
    Some(serial) => serial,
    None => unreachable!(),
};

const SERIAL_3: NonZeroU32 = match NonZeroU32::new(3) {
    Some(serial) => serial,
    None => unreachable!(),
};

#[rustfmt::skip]
const LE_BLOB: [u8; 36] = [
    // endianness, method return, no reply expected, version 1
    b'l', 0x02, 0x01, 0x01,
    // body length = 4
    0x04, 0x00, 0x00, 0x00,
    // serial = 3
    0x03, 0x00, 0x00, 0x00,
    // header field array, 15 bytes
    0x0f, 0x00, 0x00, 0x00,
    // REPLY_SERIAL, variant signature u
    0x05, 0x01, b'u', 0x00,
    // reply serial = 2
    0x02, 0x00, 0x00, 0x00,
    // SIGNATURE, variant signature g
    0x08, 0x01, b'g', 0x00,
    // signature "u"
    0x01, b'u', 0x00,
    // pad to 8 for the body
    0x00,
    // body: 0xdeadbeef
    0xef, 0xbe, 0xad, 0xde,
];

#[rustfmt::skip]
const BE_BLOB: [u8; 36] = [
    // endianness, method return, no reply expected, version 1
    b'B', 0x02, 0x01, 0x01,
    // body length = 4
    0x00, 0x00, 0x00, 0x04,
    // serial = 3
    0x00, 0x00, 0x00, 0x03,
    // header field array, 15 bytes
    0x00, 0x00, 0x00, 0x0f,
    // REPLY_SERIAL, variant signature u
    0x05, 0x01, b'u', 0x00,
    // reply serial = 2
    0x00, 0x00, 0x00, 0x02,
    // SIGNATURE, variant signature g
    0x08, 0x01, b'g', 0x00,
    // signature "u"
    0x01, b'u', 0x00,
    // pad to 8 for the body
    0x00,
    // body: 0xdeadbeef
    0xde, 0xad, 0xbe, 0xef,
];

fn blob_message(endianness: Endianness) -> Message {
    let mut body = BodyBuf::with_endianness(endianness);
    body.store(0xdeadbeefu32).unwrap();

    let request = Message::method_call(ObjectPath::ROOT.into(), "Anything", SERIAL_2);

    request
        .method_return(SERIAL_3)
        .with_flags(Flags::NO_REPLY_EXPECTED)
        .with_body(&body)
}

#[test]
fn pack_blobs() {
    let packed = wire::pack(&blob_message(Endianness::LITTLE)).unwrap();
    assert_eq!(packed, LE_BLOB);

    let packed = wire::pack(&blob_message(Endianness::BIG)).unwrap();
    assert_eq!(packed, BE_BLOB);
}

#[test]
fn unpack_blobs() {
    let message = wire::unpack(&LE_BLOB).unwrap();
    assert_eq!(message, blob_message(Endianness::LITTLE));
    assert_eq!(message.body().load::<u32>().unwrap(), 0xdeadbeef);

    let message = wire::unpack(&BE_BLOB).unwrap();
    assert_eq!(message, blob_message(Endianness::BIG));
    assert_eq!(message.body().load::<u32>().unwrap(), 0xdeadbeef);
}

#[test]
fn method_call_round_trip() -> crate::Result<()> {
    let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
    body.store("org.freedesktop.DBus")?;

    let message = Message::method_call(
        ObjectPath::new_const("/org/freedesktop/DBus").into(),
        "NameHasOwner",
        SERIAL_2,
    )
    .with_interface("org.freedesktop.DBus")
    .with_destination("org.freedesktop.DBus")
    .with_body(&body);

    let unpacked = wire::unpack(&wire::pack(&message)?)?;
    assert_eq!(unpacked, message);
    Ok(())
}

#[test]
fn signal_round_trip() -> crate::Result<()> {
    let mut body = BodyBuf::with_endianness(Endianness::BIG);
    body.store(7i32)?;

    let message = Message::signal(
        ObjectPath::new_const("/dev/myinterface/test").into(),
        "Changed",
        SERIAL_3,
    )
    .with_interface("dev.myinterface.test")
    .with_body(&body);

    let unpacked = wire::unpack(&wire::pack(&message)?)?;
    assert_eq!(unpacked, message);

    assert!(matches!(
        unpacked.kind(),
        MessageKind::Signal { member, .. } if &**member == "Changed"
    ));
    Ok(())
}

#[test]
fn signal_requires_interface() -> crate::Result<()> {
    let message = Message::signal(ObjectPath::ROOT.into(), "Changed", SERIAL_3);
    let packed = wire::pack(&message)?;
    assert!(wire::unpack(&packed).is_err());
    Ok(())
}

#[test]
fn error_round_trip() -> crate::Result<()> {
    let request = Message::method_call(ObjectPath::ROOT.into(), "Missing", SERIAL_2)
        .with_sender(":1.7");

    let mut body = BodyBuf::new();
    body.store("no such member")?;

    let message = request
        .error("org.freedesktop.DBus.Error.UnknownMethod", SERIAL_3)
        .with_body(&body);

    // Replies are directed back at the sender of the request.
    assert_eq!(message.destination(), Some(":1.7"));

    let unpacked = wire::unpack(&wire::pack(&message)?)?;
    assert_eq!(unpacked, message);
    Ok(())
}

#[rustfmt::skip]
const UNKNOWN_FIELD_BLOB: [u8; 40] = [
    // endianness, method return, no flags, version 1
    b'l', 0x02, 0x00, 0x01,
    // body length = 0
    0x00, 0x00, 0x00, 0x00,
    // serial = 3
    0x03, 0x00, 0x00, 0x00,
    // header field array, 24 bytes
    0x18, 0x00, 0x00, 0x00,
    // unknown code 100 carrying a string
    0x64, 0x01, b's', 0x00,
    // string "abc"
    0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c', 0x00,
    // pad to the next field
    0x00, 0x00, 0x00, 0x00,
    // REPLY_SERIAL, variant signature u
    0x05, 0x01, b'u', 0x00,
    // reply serial = 2
    0x02, 0x00, 0x00, 0x00,
    // no padding, no body
];

#[test]
fn unknown_header_field_is_skipped() {
    let message = wire::unpack(&UNKNOWN_FIELD_BLOB).unwrap();

    assert_eq!(
        *message.kind(),
        MessageKind::MethodReturn {
            reply_serial: SERIAL_2
        }
    );
}

#[test]
fn known_field_with_wrong_signature_is_rejected() {
    #[rustfmt::skip]
    let blob: [u8; 24] = [
        // endianness, method return, no flags, version 1
        b'l', 0x02, 0x00, 0x01,
        // body length = 0
        0x00, 0x00, 0x00, 0x00,
        // serial = 3
        0x03, 0x00, 0x00, 0x00,
        // header field array, 8 bytes
        0x08, 0x00, 0x00, 0x00,
        // REPLY_SERIAL declaring a string payload
        0x05, 0x01, b's', 0x00,
        // bogus string length
        0x00, 0x00, 0x00, 0x00,
    ];

    let error = wire::unpack(&blob).unwrap_err();
    assert!(format!("{error}").contains("header field"));
}

#[test]
fn bad_endian_flag() {
    let mut blob = LE_BLOB;
    blob[0] = b'x';
    assert!(wire::unpack(&blob).is_err());
}

#[test]
fn bad_protocol_version() {
    let mut blob = LE_BLOB;
    blob[3] = 2;
    assert!(wire::unpack(&blob).is_err());
}

#[test]
fn zero_serial_is_rejected() {
    let mut blob = LE_BLOB;
    blob[8..12].copy_from_slice(&[0, 0, 0, 0]);
    assert!(wire::unpack(&blob).is_err());
}

#[test]
fn read_message_framing() -> crate::Result<()> {
    let first = wire::pack(&blob_message(Endianness::LITTLE))?;
    let second = wire::pack(
        &Message::method_call(ObjectPath::ROOT.into(), "Ping", SERIAL_2)
            .with_destination("org.freedesktop.DBus"),
    )?;

    let mut stream = Cursor::new([first, second].concat());

    let message = wire::read_message(&mut stream)?;
    assert_eq!(message, blob_message(Endianness::LITTLE));

    let message = wire::read_message(&mut stream)?;
    assert!(matches!(
        message.kind(),
        MessageKind::MethodCall { member, .. } if &**member == "Ping"
    ));

    // The stream is fully drained, a further read hits EOF.
    assert!(wire::read_message(&mut stream).is_err());
    Ok(())
}
