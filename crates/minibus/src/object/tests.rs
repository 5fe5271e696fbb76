use std::collections::HashMap;

use minibus_xml::Access;

use crate::object::registered::{RegisteredObject, Reply};
use crate::org_freedesktop_dbus as fdo;
use crate::{Body, BodyBuf, ObjectBuilder, ObjectPath, Signature, Variant};

const INTERFACE: &str = "dev.myinterface.test";
const PATH: &ObjectPath = ObjectPath::new_const("/dev/myinterface/test");

fn test_object() -> RegisteredObject {
    let builder = ObjectBuilder::new(INTERFACE)
        .method("Testing", Signature::EMPTY, Signature::STRING, |_, out| {
            out.store("Hello")
        })
        .property("Count", Access::ReadWrite, Variant::I32(0))
        .property("Hidden", Access::Write, Variant::Bool(false))
        .signal("Changed", Signature::INT32);

    RegisteredObject::new(PATH, builder).unwrap()
}

fn expect_return(object: &mut RegisteredObject, interface: Option<&str>, member: &str, args: Body<'_>) -> BodyBuf {
    let dispatch = object.dispatch(interface, member, args).unwrap();

    match dispatch.reply {
        Reply::Return(body) => body,
        Reply::Error { name, message } => panic!("unexpected error {name}: {message}"),
    }
}

fn expect_error(object: &mut RegisteredObject, interface: Option<&str>, member: &str, args: Body<'_>) -> &'static str {
    let dispatch = object.dispatch(interface, member, args).unwrap();

    match dispatch.reply {
        Reply::Return(..) => panic!("expected an error reply"),
        Reply::Error { name, .. } => name,
    }
}

#[test]
fn introspection_document() {
    let object = test_object();
    let xml = object.introspection();

    assert!(xml.starts_with("<!DOCTYPE node"));
    assert!(xml.contains("<interface name=\"dev.myinterface.test\">"));
    assert!(xml.contains("<method name=\"Testing\">"));
    assert!(xml.contains("<arg type=\"s\" direction=\"out\"/>"));
    assert!(xml.contains("<property name=\"Count\" type=\"i\" access=\"readwrite\"/>"));
    assert!(xml.contains("<signal name=\"Changed\">"));
    assert!(xml.contains("<interface name=\"org.freedesktop.DBus.Introspectable\">"));
    assert!(xml.contains("<interface name=\"org.freedesktop.DBus.Properties\">"));
}

#[test]
fn introspect_method() {
    let mut object = test_object();

    let reply = expect_return(
        &mut object,
        Some(fdo::INTROSPECTABLE),
        "Introspect",
        Body::empty(),
    );

    let mut body = reply.as_body();
    let xml = body.load::<&str>().unwrap();
    assert!(xml.contains("dev.myinterface.test"));
}

#[test]
fn calls_registered_method() {
    let mut object = test_object();

    let reply = expect_return(&mut object, Some(INTERFACE), "Testing", Body::empty());
    assert_eq!(reply.signature(), "s");
    assert_eq!(reply.as_body().load::<&str>().unwrap(), "Hello");

    // Interface-less calls route to the registered interface as well.
    let reply = expect_return(&mut object, None, "Testing", Body::empty());
    assert_eq!(reply.as_body().load::<&str>().unwrap(), "Hello");
}

#[test]
fn unknown_member_and_interface() {
    let mut object = test_object();

    let name = expect_error(&mut object, Some(INTERFACE), "Nonexistent", Body::empty());
    assert_eq!(name, fdo::ERROR_UNKNOWN_METHOD);

    let name = expect_error(&mut object, Some("com.example.Other"), "Testing", Body::empty());
    assert_eq!(name, fdo::ERROR_UNKNOWN_INTERFACE);
}

#[test]
fn mismatched_arguments() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(1u32).unwrap();

    let name = expect_error(&mut object, Some(INTERFACE), "Testing", args.as_body());
    assert_eq!(name, fdo::ERROR_INVALID_ARGS);
}

#[test]
fn get_property() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();
    args.store("Count").unwrap();

    let reply = expect_return(&mut object, Some(fdo::PROPERTIES), "Get", args.as_body());
    assert_eq!(reply.signature(), "v");
    assert_eq!(reply.as_body().load::<Variant>().unwrap(), Variant::I32(0));
}

#[test]
fn get_unreadable_property_is_invalid_args() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();
    args.store("Hidden").unwrap();

    let name = expect_error(&mut object, Some(fdo::PROPERTIES), "Get", args.as_body());
    assert_eq!(name, fdo::ERROR_INVALID_ARGS);
}

#[test]
fn get_all_properties() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();

    let reply = expect_return(&mut object, Some(fdo::PROPERTIES), "GetAll", args.as_body());
    assert_eq!(reply.signature(), "a{sv}");

    let values = reply.as_body().load::<HashMap<String, Variant>>().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values["Count"], Variant::I32(0));

    // A foreign interface yields an empty dictionary.
    let mut args = BodyBuf::new();
    args.store("com.example.Other").unwrap();

    let reply = expect_return(&mut object, Some(fdo::PROPERTIES), "GetAll", args.as_body());
    let values = reply.as_body().load::<HashMap<String, Variant>>().unwrap();
    assert!(values.is_empty());
}

#[test]
fn set_property_emits_properties_changed() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();
    args.store("Count").unwrap();
    args.store(Variant::I32(7)).unwrap();

    let dispatch = object
        .dispatch(Some(fdo::PROPERTIES), "Set", args.as_body())
        .unwrap();

    assert!(matches!(dispatch.reply, Reply::Return(ref body) if body.is_empty()));

    let changed = dispatch.properties_changed.expect("PropertiesChanged body");
    let mut body = changed.as_body();

    assert_eq!(body.load::<&str>().unwrap(), INTERFACE);

    let values = body.load::<HashMap<String, Variant>>().unwrap();
    assert_eq!(values["Count"], Variant::I32(7));

    assert_eq!(body.load::<Vec<String>>().unwrap(), Vec::<String>::new());
    assert!(body.is_empty());

    // The new value is observable through Get.
    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();
    args.store("Count").unwrap();

    let reply = expect_return(&mut object, Some(fdo::PROPERTIES), "Get", args.as_body());
    assert_eq!(reply.as_body().load::<Variant>().unwrap(), Variant::I32(7));
}

#[test]
fn set_property_type_mismatch() {
    let mut object = test_object();

    let mut args = BodyBuf::new();
    args.store(INTERFACE).unwrap();
    args.store("Count").unwrap();
    args.store(Variant::String("seven".into())).unwrap();

    let name = expect_error(&mut object, Some(fdo::PROPERTIES), "Set", args.as_body());
    assert_eq!(name, fdo::ERROR_INVALID_ARGS);
}

#[test]
fn signal_signatures() {
    let object = test_object();

    assert_eq!(
        object.signal_signature("Changed").map(Signature::as_str),
        Some("i")
    );
    assert!(object.signal_signature("Missing").is_none());
}
