use std::collections::HashMap;

use crate::{Body, BodyBuf, Endianness, Signature, Variant};

#[test]
fn numbers_little_endian() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(10u16)?;
    buf.store(10u32)?;

    assert_eq!(buf.signature(), "qu");
    assert_eq!(buf.get(), &[10, 0, 0, 0, 10, 0, 0, 0]);

    let mut body = buf.as_body();
    assert_eq!(body.load::<u16>()?, 10);
    assert_eq!(body.load::<u32>()?, 10);
    assert!(body.is_empty());
    Ok(())
}

#[test]
fn numbers_big_endian() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::BIG);
    buf.store(256u16)?;
    buf.store(1u64)?;

    // The u64 is padded from offset 2 up to 8.
    assert_eq!(
        buf.get(),
        &[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]
    );

    let mut body = buf.as_body();
    assert_eq!(body.load::<u16>()?, 256);
    assert_eq!(body.load::<u64>()?, 1);
    Ok(())
}

#[test]
fn string_encoding() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store("foo")?;

    assert_eq!(buf.signature(), "s");
    assert_eq!(buf.get(), &[3, 0, 0, 0, b'f', b'o', b'o', 0]);
    Ok(())
}

#[test]
fn empty_string() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store("")?;

    assert_eq!(buf.get(), &[0, 0, 0, 0, 0]);

    let mut body = buf.as_body();
    assert_eq!(body.load::<&str>()?, "");
    Ok(())
}

#[test]
fn non_ascii_string() -> crate::Result<()> {
    let mut buf = BodyBuf::new();
    buf.store("héllo wörld")?;

    let mut body = buf.as_body();
    assert_eq!(body.load::<&str>()?, "héllo wörld");
    Ok(())
}

#[test]
fn long_string() -> crate::Result<()> {
    let long = "x".repeat(1 << 16);

    let mut buf = BodyBuf::new();
    buf.store(long.as_str())?;

    let mut body = buf.as_body();
    assert_eq!(body.load::<&str>()?, long);
    Ok(())
}

#[test]
fn empty_array_keeps_element_padding() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(Vec::<u64>::new())?;

    // Length 0, then padding up to the 8-byte element alignment even
    // though no elements follow.
    assert_eq!(buf.signature(), "at");
    assert_eq!(buf.get(), &[0, 0, 0, 0, 0, 0, 0, 0]);

    let mut body = buf.as_body();
    assert_eq!(body.load::<Vec<u64>>()?, Vec::<u64>::new());
    assert!(body.is_empty());
    Ok(())
}

#[test]
fn array_length_is_payload_span() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(vec![1u32, 2, 3])?;

    assert_eq!(buf.signature(), "au");
    assert_eq!(
        buf.get(),
        &[12, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]
    );
    Ok(())
}

#[test]
fn array_of_struct_pads_elements() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(vec![(1u32, 2u8), (3u32, 4u8)])?;

    assert_eq!(buf.signature(), "a(uy)");

    // Each struct element is aligned to 8, so the second element is
    // preceded by three bytes of padding which count towards the
    // payload length.
    assert_eq!(
        buf.get(),
        &[
            13, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4
        ]
    );

    let mut body = buf.as_body();
    assert_eq!(body.load::<Vec<(u32, u8)>>()?, [(1, 2), (3, 4)]);
    Ok(())
}

#[test]
fn byte_slices() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(&b"foo"[..])?;

    assert_eq!(buf.signature(), "ay");
    assert_eq!(buf.get(), &[3, 0, 0, 0, b'f', b'o', b'o']);

    let mut body = buf.as_body();
    assert_eq!(body.load::<&[u8]>()?, b"foo");
    Ok(())
}

#[test]
fn record_round_trip() -> crate::Result<()> {
    let scores: HashMap<String, i32> =
        [("A".to_owned(), 10), ("B".to_owned(), 20)].into_iter().collect();

    let record = (
        42i32,
        vec!["zig".to_owned(), "dbus".to_owned()],
        scores,
    );

    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(record.clone())?;

    assert_eq!(buf.signature(), "(iasa{si})");

    let mut body = buf.as_body();
    let loaded = body.load::<(i32, Vec<String>, HashMap<String, i32>)>()?;
    assert_eq!(loaded, record);
    assert!(body.is_empty());
    Ok(())
}

#[test]
fn dict_of_variants() -> crate::Result<()> {
    let mut map = HashMap::new();
    map.insert("Count".to_owned(), Variant::I32(7));

    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(map.clone())?;

    assert_eq!(buf.signature(), "a{sv}");

    let mut body = buf.as_body();
    assert_eq!(body.load::<HashMap<String, Variant>>()?, map);
    Ok(())
}

#[test]
fn variant_signature_selects_payload() -> crate::Result<()> {
    let values = [
        Variant::Byte(7),
        Variant::Bool(true),
        Variant::U32(42),
        Variant::String("hello".into()),
        Variant::Array {
            element: crate::SignatureBuf::from_signature(Signature::INT32),
            values: vec![Variant::I32(1), Variant::I32(2)],
        },
        Variant::Struct(vec![Variant::String("x".into()), Variant::U64(9)]),
        Variant::Variant(Box::new(Variant::I16(-3))),
    ];

    for value in values {
        let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
        buf.store(value.clone())?;
        assert_eq!(buf.signature(), "v");

        let mut body = buf.as_body();
        assert_eq!(body.load::<Variant>()?, value);
        assert!(body.is_empty(), "left over bytes for {value:?}");
    }

    Ok(())
}

#[test]
fn signature_mismatch() -> crate::Result<()> {
    let mut buf = BodyBuf::new();
    buf.store(42u32)?;

    let mut body = buf.as_body();
    assert!(body.load::<&str>().is_err());
    Ok(())
}

#[test]
fn signature_end() -> crate::Result<()> {
    let mut buf = BodyBuf::new();
    buf.store(42u32)?;

    let mut body = buf.as_body();
    assert_eq!(body.load::<u32>()?, 42);
    assert!(body.load::<u32>().is_err());
    Ok(())
}

#[test]
fn rejects_boolean_out_of_range() {
    let data = [2u8, 0, 0, 0];
    let mut body = Body::new(&data, Signature::BOOLEAN, Endianness::LITTLE);
    assert!(body.load::<bool>().is_err());

    let data = [1u8, 0, 0, 0];
    let mut body = Body::new(&data, Signature::BOOLEAN, Endianness::LITTLE);
    assert_eq!(body.load::<bool>().unwrap(), true);
}

#[test]
fn rejects_missing_nul() {
    let data = [3u8, 0, 0, 0, b'f', b'o', b'o', 1];
    let mut body = Body::new(&data, Signature::STRING, Endianness::LITTLE);
    assert!(body.load::<&str>().is_err());
}

#[test]
fn rejects_truncated_array() {
    // Array claims 8 bytes of payload but only 4 are present.
    let data = [8u8, 0, 0, 0, 1, 0, 0, 0];
    let sig = Signature::new(b"au").unwrap();
    let mut body = Body::new(&data, sig, Endianness::LITTLE);
    assert!(body.load::<Vec<u32>>().is_err());
}

#[test]
fn rejects_wrong_variant_payload() -> crate::Result<()> {
    let mut buf = BodyBuf::new();
    buf.store(Variant::String("seven".into()))?;

    let mut body = buf.as_body();
    assert!(body.load_variant::<u32>().is_err());

    let mut buf = BodyBuf::new();
    buf.store(Variant::U32(7))?;

    let mut body = buf.as_body();
    assert_eq!(body.load_variant::<u32>()?, 7);
    Ok(())
}

#[test]
fn skip_value_by_signature() -> crate::Result<()> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store((1u32, vec!["a".to_owned()], 2u8))?;
    buf.store(99u32)?;

    let mut body = buf.as_body();
    body.skip_value(Signature::new(b"(uasy)")?)?;

    assert_eq!(body.take_u32()?, 99);
    Ok(())
}
