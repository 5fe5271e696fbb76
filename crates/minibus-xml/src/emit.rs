use std::fmt::Write;

use crate::{DOCTYPE, Interface, Node};

/// Render a [`Node`] tree into an introspection document.
///
/// The document starts with the freedesktop DOCTYPE preamble and is
/// indented with one space per level, which is how the reference bus
/// daemon formats its own output.
pub fn emit_node(node: &Node) -> String {
    let mut out = String::new();
    out.push_str(DOCTYPE);
    out.push('\n');
    emit_into(&mut out, node, 0);
    out
}

fn emit_into(out: &mut String, node: &Node, depth: usize) {
    indent(out, depth);
    out.push_str("<node");

    if let Some(name) = &node.name {
        write_attr(out, "name", name);
    }

    if node.interfaces.is_empty() && node.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");

    for interface in &node.interfaces {
        emit_interface(out, interface, depth + 1);
    }

    for child in &node.children {
        emit_into(out, child, depth + 1);
    }

    indent(out, depth);
    out.push_str("</node>\n");
}

fn emit_interface(out: &mut String, interface: &Interface, depth: usize) {
    indent(out, depth);
    out.push_str("<interface");
    write_attr(out, "name", &interface.name);
    out.push_str(">\n");

    for method in &interface.methods {
        indent(out, depth + 1);
        out.push_str("<method");
        write_attr(out, "name", &method.name);

        if method.args.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");

            for arg in &method.args {
                emit_arg(out, arg, depth + 2);
            }

            indent(out, depth + 1);
            out.push_str("</method>\n");
        }
    }

    for signal in &interface.signals {
        indent(out, depth + 1);
        out.push_str("<signal");
        write_attr(out, "name", &signal.name);

        if signal.args.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");

            for arg in &signal.args {
                emit_arg(out, arg, depth + 2);
            }

            indent(out, depth + 1);
            out.push_str("</signal>\n");
        }
    }

    for property in &interface.properties {
        indent(out, depth + 1);
        out.push_str("<property");
        write_attr(out, "name", &property.name);
        write_attr(out, "type", property.ty.as_str());
        write_attr(out, "access", property.access.as_str());
        out.push_str("/>\n");
    }

    indent(out, depth);
    out.push_str("</interface>\n");
}

fn emit_arg(out: &mut String, arg: &crate::Argument, depth: usize) {
    indent(out, depth);
    out.push_str("<arg");

    if let Some(name) = &arg.name {
        write_attr(out, "name", name);
    }

    write_attr(out, "type", arg.ty.as_str());

    if let Some(direction) = arg.direction {
        write_attr(out, "direction", direction.as_str());
    }

    out.push_str("/>\n");
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push(' ');
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"");

    // Names and signatures are drawn from restricted alphabets, but a
    // document must stay well-formed for any input.
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }

    out.push('"');
}
