use anyhow::Result;
use minibus::{Access, Bus, Connection, ObjectBuilder, ObjectPath, Signature, Variant};

const NAME: &str = "dev.myinterface.test";
const PATH: &ObjectPath = ObjectPath::new_const("/dev/myinterface/test");

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut c = Connection::new(Bus::Session)?;

    let object = ObjectBuilder::new(NAME)
        .method("Testing", Signature::EMPTY, Signature::STRING, |_, out| {
            out.store("Hello")
        })
        .method("Add", Signature::new(b"ii")?, Signature::INT32, |args, out| {
            let a = args.load::<i32>()?;
            let b = args.load::<i32>()?;
            out.store(a.wrapping_add(b))
        })
        .property("Count", Access::ReadWrite, Variant::I32(0))
        .signal("Changed", Signature::INT32);

    let handle = c.register_object(NAME, PATH, object)?;
    c.serve(handle)?;
    Ok(())
}
