//! Connection behaviour exercised against a scripted peer over a
//! socket pair, without a message bus.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex};
use std::thread;

use minibus::org_freedesktop_dbus as fdo;
use minibus::{
    Access, BodyBuf, Connection, Message, MessageKind, ObjectBuilder, ObjectPath, Proxy, Signature,
    Variant,
};

const INTERFACE: &str = "dev.myinterface.test";
const PATH: &ObjectPath = ObjectPath::new_const("/dev/myinterface/test");

fn serial(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero serial")
}

#[test]
fn correlates_replies_and_buffers_unrelated_messages() -> anyhow::Result<()> {
    let (ours, theirs) = UnixStream::pair()?;

    let peer = thread::spawn(move || -> minibus::Result<()> {
        let mut peer = Connection::from_stream(theirs);

        let request = peer.wait_message()?;
        assert!(matches!(
            request.kind(),
            MessageKind::MethodCall { member, .. } if &**member == "GetId"
        ));

        // First an unrelated reply, which the caller must buffer, then
        // the reply it is actually waiting for.
        let unrelated = Message::method_call(ObjectPath::ROOT.into(), "Other", serial(999));
        peer.send_message(&unrelated.method_return(serial(100)))?;

        let mut body = BodyBuf::new();
        body.store("0123deadbeef")?;
        peer.send_message(&request.method_return(serial(101)).with_body(&body))?;
        Ok(())
    });

    let mut c = Connection::from_stream(ours);

    let reply = c.method_call(
        "org.freedesktop.DBus",
        ObjectPath::new_const("/org/freedesktop/DBus"),
        Some("org.freedesktop.DBus"),
        "GetId",
        BodyBuf::new(),
    )?;

    assert_eq!(reply.body().load::<&str>()?, "0123deadbeef");

    // The unrelated message is observable afterwards.
    let buffered = c.wait_message()?;
    assert!(matches!(
        buffered.kind(),
        MessageKind::MethodReturn { reply_serial } if reply_serial.get() == 999
    ));

    peer.join().unwrap()?;
    Ok(())
}

#[test]
fn dispatches_registered_signals_during_calls() -> anyhow::Result<()> {
    let (ours, theirs) = UnixStream::pair()?;

    let peer = thread::spawn(move || -> minibus::Result<()> {
        let mut peer = Connection::from_stream(theirs);
        let request = peer.wait_message()?;

        let mut payload = BodyBuf::new();
        payload.store(7i32)?;

        // A signal with a registered handler, one without, then the
        // reply.
        peer.send_message(
            &Message::signal(PATH.into(), "Changed", serial(50))
                .with_interface(INTERFACE)
                .with_body(&payload),
        )?;

        peer.send_message(
            &Message::signal(PATH.into(), "Unhandled", serial(51)).with_interface(INTERFACE),
        )?;

        peer.send_message(&request.method_return(serial(52)))?;
        Ok(())
    });

    let mut c = Connection::from_stream(ours);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    c.register_signal_handler(INTERFACE, "Changed", move |message| {
        if let Ok(value) = message.body().load::<i32>() {
            sink.lock().unwrap().push(value);
        }
    });

    c.method_call(INTERFACE, PATH, Some(INTERFACE), "Poke", BodyBuf::new())?;

    // The matching signal was consumed by the handler during the call.
    assert_eq!(*seen.lock().unwrap(), [7]);

    // The unmatched signal is delivered as a plain message.
    let unhandled = c.wait_message()?;
    assert!(matches!(
        unhandled.kind(),
        MessageKind::Signal { member, .. } if &**member == "Unhandled"
    ));

    peer.join().unwrap()?;
    Ok(())
}

fn exported_object() -> ObjectBuilder {
    ObjectBuilder::new(INTERFACE)
        .method("Testing", Signature::EMPTY, Signature::STRING, |_, out| {
            out.store("Hello")
        })
        .property("Count", Access::ReadWrite, Variant::I32(0))
        .signal("Changed", Signature::INT32)
}

#[test]
fn serves_exported_object() -> anyhow::Result<()> {
    let (ours, theirs) = UnixStream::pair()?;

    let server = thread::spawn(move || {
        let mut server = Connection::from_stream(theirs);
        let handle = server
            .register_object(INTERFACE, PATH, exported_object())
            .expect("register object");

        // Serving ends with an error once the client hangs up.
        let _ = server.serve(handle);
    });

    let mut c = Connection::from_stream(ours);

    // Introspection names the method, the property and the standard
    // interfaces.
    let reply = c.method_call(
        INTERFACE,
        PATH,
        Some(fdo::INTROSPECTABLE),
        "Introspect",
        BodyBuf::new(),
    )?;

    let xml = reply.body().load::<String>()?;
    assert!(xml.contains("<method name=\"Testing\">"));
    assert!(xml.contains("<arg type=\"s\" direction=\"out\"/>"));
    assert!(xml.contains("<property name=\"Count\" type=\"i\" access=\"readwrite\"/>"));
    assert!(xml.contains("org.freedesktop.DBus.Introspectable"));
    assert!(xml.contains("org.freedesktop.DBus.Properties"));

    // Introspection on an unregistered parent path enumerates child
    // nodes.
    let reply = c.method_call(
        INTERFACE,
        ObjectPath::new_const("/dev"),
        Some(fdo::INTROSPECTABLE),
        "Introspect",
        BodyBuf::new(),
    )?;

    let xml = reply.body().load::<String>()?;
    assert!(xml.contains("<node name=\"myinterface\"/>"));

    // A plain method call.
    let mut proxy = Proxy::new(&mut c, INTERFACE, PATH, INTERFACE);
    let reply = proxy.call("Testing", BodyBuf::new())?;
    assert_eq!(reply.expect::<String>()?, "Hello");

    // Setting a property triggers a PropertiesChanged signal, which is
    // buffered while the following calls wait for their replies.
    proxy.set_property("Count", Variant::I32(7))?;
    assert_eq!(proxy.get_property::<i32>("Count")?, 7);

    // Calling a missing member surfaces the remote error.
    let error = proxy.call("Missing", BodyBuf::new()).unwrap_err();
    assert_eq!(error.remote_name(), Some(fdo::ERROR_UNKNOWN_METHOD));

    drop(proxy);

    let signal = c.wait_message()?;
    assert!(matches!(
        signal.kind(),
        MessageKind::Signal { member, .. } if &**member == "PropertiesChanged"
    ));
    assert_eq!(signal.interface(), Some(fdo::PROPERTIES));

    let mut body = signal.body();
    assert_eq!(body.load::<&str>()?, INTERFACE);

    let changed = body.load::<HashMap<String, Variant>>()?;
    assert_eq!(changed["Count"], Variant::I32(7));
    assert_eq!(body.load::<Vec<String>>()?, Vec::<String>::new());

    drop(c);
    server.join().unwrap();
    Ok(())
}
