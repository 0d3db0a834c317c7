use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;

use crate::error::Result;
use crate::model::{ApiType, Catalog, Kind, Parameter, Shape};
use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

/// Write the accumulated catalog in the chosen format.
pub fn write<W: Write>(catalog: &Catalog, format: Format, out: W) -> Result<()> {
    match format {
        Format::Json => write_json(catalog, out),
        Format::Xml => write_xml(catalog, out),
    }
}

// ── JSON ──

#[derive(Serialize)]
struct CatalogView<'a> {
    types: Vec<TypeView<'a>>,
}

#[derive(Serialize)]
struct TypeView<'a> {
    namespace: &'a str,
    name: &'a str,
    kind: Kind,
    path: &'a str,
    messages: Vec<MessageView<'a>>,
}

#[derive(Serialize)]
struct MessageView<'a> {
    name: &'a str,
    shapes: Vec<ShapeView<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShapeView<'a> {
    minimum_version: &'a Version,
    maximum_version: &'a Version,
    #[serde(rename = "static")]
    is_static: bool,
    #[serde(rename = "coroutine")]
    is_coroutine: bool,
    description: &'a str,
    path: &'a str,
    returns: ReturnsView<'a>,
    parameters: &'a [Parameter],
}

#[derive(Serialize)]
struct ReturnsView<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
}

fn type_view(ty: &ApiType) -> TypeView<'_> {
    TypeView {
        namespace: &ty.namespace,
        name: &ty.name,
        kind: ty.kind,
        path: &ty.path,
        messages: ty
            .entries()
            .map(|entry| MessageView {
                name: &entry.name,
                shapes: entry.shapes().iter().map(shape_view).collect(),
            })
            .collect(),
    }
}

fn shape_view(shape: &Shape) -> ShapeView<'_> {
    ShapeView {
        minimum_version: &shape.min_version,
        maximum_version: &shape.max_version,
        is_static: shape.is_static,
        is_coroutine: shape.is_coroutine,
        description: &shape.description,
        path: &shape.path,
        returns: ReturnsView {
            type_name: &shape.return_type,
        },
        parameters: &shape.parameters,
    }
}

fn write_json<W: Write>(catalog: &Catalog, mut out: W) -> Result<()> {
    let view = CatalogView {
        types: catalog.types().map(type_view).collect(),
    };
    serde_json::to_writer_pretty(&mut out, &view)?;
    writeln!(out)?;
    Ok(())
}

// ── XML ──

fn write_xml<W: Write>(catalog: &Catalog, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("api")))?;

    for ty in catalog.types() {
        let mut type_el = BytesStart::new("type");
        type_el.push_attribute(("kind", ty.kind.as_str()));
        type_el.push_attribute(("name", ty.name.as_str()));
        type_el.push_attribute(("ns", ty.namespace.as_str()));
        type_el.push_attribute(("path", ty.path.as_str()));
        writer.write_event(Event::Start(type_el))?;

        for entry in ty.entries() {
            for shape in entry.shapes() {
                let min = shape.min_version.to_string();
                let max = shape.max_version.to_string();
                let mut message = BytesStart::new("message");
                message.push_attribute(("name", entry.name.as_str()));
                message.push_attribute(("static", bool_str(shape.is_static)));
                message.push_attribute(("coroutine", bool_str(shape.is_coroutine)));
                message.push_attribute(("minimumVersion", min.as_str()));
                message.push_attribute(("maximumVersion", max.as_str()));
                message.push_attribute(("description", shape.description.as_str()));
                message.push_attribute(("path", shape.path.as_str()));
                writer.write_event(Event::Start(message))?;

                let mut returns = BytesStart::new("returns");
                returns.push_attribute(("type", shape.return_type.as_str()));
                writer.write_event(Event::Empty(returns))?;

                if !shape.parameters.is_empty() {
                    writer.write_event(Event::Start(BytesStart::new("parameters")))?;
                    for p in &shape.parameters {
                        let mut param = BytesStart::new("parameter");
                        param.push_attribute(("type", p.type_name.as_str()));
                        param.push_attribute(("name", p.name.as_str()));
                        param.push_attribute(("description", p.description.as_str()));
                        writer.write_event(Event::Empty(param))?;
                    }
                    writer.write_event(Event::End(BytesEnd::new("parameters")))?;
                }

                writer.write_event(Event::End(BytesEnd::new("message")))?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("type")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("api")))?;
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

// ── Tests ──
