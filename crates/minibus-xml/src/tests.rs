use minibus_core::signature::Signature;

use crate::{
    Access, Argument, Direction, Interface, Method, Node, Property, Signal, emit_node, parse_node,
};

fn example_node() -> Node {
    Node {
        name: None,
        interfaces: vec![Interface {
            name: "dev.myinterface.test".to_owned(),
            methods: vec![Method {
                name: "Testing".to_owned(),
                args: vec![Argument {
                    name: None,
                    ty: Signature::STRING.to_owned(),
                    direction: Some(Direction::Out),
                }],
            }],
            signals: vec![Signal {
                name: "Changed".to_owned(),
                args: vec![Argument {
                    name: Some("value".to_owned()),
                    ty: Signature::INT32.to_owned(),
                    direction: None,
                }],
            }],
            properties: vec![Property {
                name: "Count".to_owned(),
                ty: Signature::INT32.to_owned(),
                access: Access::ReadWrite,
            }],
        }],
        children: vec![Node::named("child")],
    }
}

#[test]
fn round_trip() {
    let node = example_node();
    let document = emit_node(&node);

    assert!(document.starts_with("<!DOCTYPE node"));
    assert!(document.contains("<method name=\"Testing\">"));
    assert!(document.contains("<arg type=\"s\" direction=\"out\"/>"));
    assert!(document.contains("<property name=\"Count\" type=\"i\" access=\"readwrite\"/>"));
    assert!(document.contains("<node name=\"child\"/>"));

    let parsed = parse_node(&document).unwrap();
    assert_eq!(parsed, node);
}

#[test]
fn parses_remote_document_shape() {
    let document = r#"
        <!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
         "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
        <node>
          <interface name="org.freedesktop.DBus.Introspectable">
            <method name="Introspect">
              <arg name="xml_data" type="s" direction="out"/>
            </method>
          </interface>
          <node name="org"/>
        </node>
    "#;

    let node = parse_node(document).unwrap();
    assert_eq!(node.interfaces.len(), 1);
    assert_eq!(node.interfaces[0].name, "org.freedesktop.DBus.Introspectable");
    assert_eq!(node.interfaces[0].methods[0].name, "Introspect");
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.children[0].name.as_deref(), Some("org"));
}

#[test]
fn skips_annotations_and_docs() {
    let document = r#"
        <node>
          <interface name="com.example.Annotated">
            <annotation name="org.freedesktop.DBus.Deprecated" value="true"/>
            <method name="Frobnicate">
              <annotation name="com.example.Nested" value="x"/>
              <arg type="u" direction="in"/>
            </method>
          </interface>
        </node>
    "#;

    let node = parse_node(document).unwrap();
    let interface = &node.interfaces[0];
    assert_eq!(interface.methods.len(), 1);
    assert_eq!(interface.methods[0].args.len(), 1);
}

#[test]
fn rejects_bad_signature_type() {
    let document = r#"
        <node>
          <interface name="com.example.Bad">
            <method name="M">
              <arg type="zz" direction="in"/>
            </method>
          </interface>
        </node>
    "#;

    assert!(parse_node(document).is_err());
}

#[test]
fn rejects_missing_interface_name() {
    let document = "<node><interface></interface></node>";
    assert!(parse_node(document).is_err());
}

#[test]
fn empty_document_is_empty_root() {
    let node = parse_node("<node/>").unwrap();
    assert_eq!(node, Node::root());
}
