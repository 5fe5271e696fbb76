use super::{MAX_SIGNATURE, Signature, SignatureBuf, SignatureError};

fn ok(bytes: &[u8]) {
    assert!(
        Signature::new(bytes).is_ok(),
        "expected valid signature: {:?}",
        bytes.escape_ascii().to_string()
    );
}

fn err(bytes: &[u8]) {
    assert!(
        Signature::new(bytes).is_err(),
        "expected invalid signature: {:?}",
        bytes.escape_ascii().to_string()
    );
}

#[test]
fn valid_signatures() {
    ok(b"");
    ok(b"y");
    ok(b"bnqiuxtd");
    ok(b"sogh");
    ok(b"v");
    ok(b"as");
    ok(b"aas");
    ok(b"(i)");
    ok(b"(ii)");
    ok(b"(isv)");
    ok(b"a(ii)");
    ok(b"a{sv}");
    ok(b"a{s(ii)}");
    ok(b"aa{ss}");
    ok(b"(iasa{si})");
    ok(b"ia{sv}as");
}

#[test]
fn invalid_signatures() {
    err(b"z");
    err(b"a");
    err(b"aa");
    err(b"(");
    err(b"()");
    err(b")");
    err(b"(i");
    err(b"i)");
    err(b"a)");
    err(b"{sv}");
    err(b"a{}");
    err(b"a{s}");
    err(b"a{svv}");
    err(b"a{vs}");
    err(b"a{(i)s}");
    err(b"a{");
    err(b"a{sv");
}

#[test]
fn too_long() {
    let long = vec![b'i'; MAX_SIGNATURE + 1];
    err(&long);

    let max = vec![b'i'; MAX_SIGNATURE];
    ok(&max);
}

#[test]
fn excessive_nesting() {
    let mut deep = vec![b'a'; 33];
    deep.push(b'i');
    err(&deep);

    let mut deep = vec![b'a'; 32];
    deep.push(b'i');
    ok(&deep);

    let mut deep = vec![b'('; 33];
    deep.extend_from_slice(b"i");
    deep.extend(vec![b')'; 33]);
    err(&deep);
}

#[test]
fn iteration() -> Result<(), SignatureError> {
    let sig = Signature::new(b"ia{sv}as(id)")?;
    let parts: Vec<&str> = sig.iter().map(Signature::as_str).collect();
    assert_eq!(parts, ["i", "a{sv}", "as", "(id)"]);

    assert!(Signature::EMPTY.iter().next().is_none());
    Ok(())
}

#[test]
fn split_first() -> Result<(), SignatureError> {
    let sig = Signature::new(b"aa{s(ii)}x")?;
    let (head, tail) = sig.split_first().unwrap();
    assert_eq!(head.as_str(), "aa{s(ii)}");
    assert_eq!(tail.as_str(), "x");
    Ok(())
}

#[test]
fn building() -> Result<(), SignatureError> {
    let mut buf = SignatureBuf::new();
    buf.extend_from_signature(Signature::INT32)?;
    buf.extend_from_signature(Signature::new(b"a{si}")?)?;
    assert_eq!(buf, "ia{si}");

    buf.clear();
    assert!(buf.is_empty());
    Ok(())
}

#[test]
fn length_cap_on_extend() {
    let long = vec![b'i'; MAX_SIGNATURE];
    let long = Signature::new(&long).unwrap();

    let mut buf = SignatureBuf::new();
    buf.extend_from_signature(long).unwrap();
    assert!(buf.extend_from_signature(Signature::INT32).is_err());
}
