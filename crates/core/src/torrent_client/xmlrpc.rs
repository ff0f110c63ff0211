//! Minimal XML-RPC encoding and decoding.
//!
//! Covers the value types rTorrent actually sends back: strings (typed or
//! untyped), integers, booleans, arrays, structs and faults.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

use super::TorrentClientError;

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</string>");
            }
            Value::Int(i) => {
                if let Ok(small) = i32::try_from(*i) {
                    out.push_str(&format!("<i4>{}</i4>", small));
                } else {
                    out.push_str(&format!("<i8>{}</i8>", i));
                }
            }
            Value::Bool(b) => {
                out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b)));
            }
            Value::Array(values) => {
                out.push_str("<array><data>");
                for value in values {
                    value.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name.as_str()));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
        }
        out.push_str("</value>");
    }
}

/// Build a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Decode a `methodResponse` document into its single return value.
pub fn decode_response(xml: &str) -> Result<Value, TorrentClientError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(protocol(format!("unexpected root element <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| protocol("fault without value"))
            .and_then(decode_value)?;
        return Err(fault_from_value(value));
    }

    root.child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .ok_or_else(|| protocol("response without params"))
        .and_then(decode_value)
}

fn fault_from_value(value: Value) -> TorrentClientError {
    let Value::Struct(members) = value else {
        return protocol("fault value is not a struct");
    };
    let code = match members.get("faultCode") {
        Some(Value::Int(code)) => *code,
        _ => 0,
    };
    let message = members
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    TorrentClientError::Fault { code, message }
}

fn protocol(message: impl Into<String>) -> TorrentClientError {
    TorrentClientError::Protocol(message.into())
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Element, TorrentClientError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(Element {
                name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                ..Default::default()
            }),
            Ok(Event::Empty(ref e)) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| protocol(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| protocol("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Eof) => return Err(protocol("unexpected end of document")),
            Ok(_) => {}
            Err(e) => return Err(protocol(e.to_string())),
        }
    }
}

fn decode_value(value: &Element) -> Result<Value, TorrentClientError> {
    let Some(typed) = value.children.first() else {
        // Untyped values are strings.
        return Ok(Value::String(value.text.clone()));
    };

    match typed.name.as_str() {
        "string" => Ok(Value::String(typed.text.clone())),
        "int" | "i4" | "i8" => typed
            .text
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| protocol(format!("invalid integer '{}'", typed.text))),
        "boolean" => match typed.text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(protocol(format!("invalid boolean '{}'", other))),
        },
        "array" => {
            let data = typed
                .child("data")
                .ok_or_else(|| protocol("array without data"))?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| protocol("struct member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| protocol("struct member without value"))?;
                members.insert(name.text.clone(), decode_value(value)?);
            }
            Ok(Value::Struct(members))
        }
        other => Err(protocol(format!("unsupported value type <{}>", other))),
    }
}
