use anyhow::Result;
use minibus::org_freedesktop_dbus as fdo;
use minibus::{BodyBuf, Bus, Connection, Proxy};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut c = Connection::new(Bus::Session)?;
    println!("unique name: {}", c.unique_name().unwrap_or("<none>"));

    let mut proxy = Proxy::new(&mut c, fdo::DESTINATION, fdo::PATH, fdo::INTERFACE);

    let reply = proxy.call("GetId", BodyBuf::new())?;
    println!("bus id: {}", reply.expect::<String>()?);

    let reply = proxy.call("ListNames", BodyBuf::new())?;

    for name in reply.expect::<Vec<String>>()? {
        println!("{name}");
    }

    // Fetch and parse the introspection document of the bus itself.
    let reply = proxy.call_on(fdo::INTROSPECTABLE, "Introspect", BodyBuf::new())?;
    let node = minibus_xml::parse_node(reply.expect::<&str>()?)?;

    for interface in &node.interfaces {
        println!("interface {}", interface.name);
    }

    Ok(())
}
