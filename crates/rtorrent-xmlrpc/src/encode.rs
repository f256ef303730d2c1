//! Request and response document encoder.
//!
//! Encoding never fails: text is escaped, bytes are base64 encoded, and struct
//! members come out in key order, so identical input gives identical bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::escape::escape;

use crate::value::Value;

const XML_DECL: &str = r#"<?xml version="1.0"?>"#;

/// Encodes a `methodCall` document.
pub fn encode_call(name: &str, args: &[Value]) -> Vec<u8> {
    let mut out = String::with_capacity(128);
    out.push_str(XML_DECL);
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(name));
    out.push_str("</methodName><params>");
    for arg in args {
        write_param(&mut out, arg);
    }
    out.push_str("</params></methodCall>");
    out.into_bytes()
}

/// Encodes a successful `methodResponse` carrying one value.
pub fn encode_response(value: &Value) -> Vec<u8> {
    let mut out = String::with_capacity(128);
    out.push_str(XML_DECL);
    out.push_str("<methodResponse><params>");
    write_param(&mut out, value);
    out.push_str("</params></methodResponse>");
    out.into_bytes()
}

/// Encodes a fault `methodResponse`.
pub fn encode_fault(code: i32, message: &str) -> Vec<u8> {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECL);
    out.push_str("<methodResponse><fault><value><struct>");
    out.push_str("<member><name>faultCode</name><value><i4>");
    out.push_str(&code.to_string());
    out.push_str("</i4></value></member>");
    out.push_str("<member><name>faultString</name><value><string>");
    out.push_str(&escape(message));
    out.push_str("</string></value></member>");
    out.push_str("</struct></value></fault></methodResponse>");
    out.into_bytes()
}

fn write_param(out: &mut String, value: &Value) {
    out.push_str("<param>");
    write_value(out, value);
    out.push_str("</param>");
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(v) => write_scalar(out, "i4", &v.to_string()),
        Value::Long(v) => write_scalar(out, "i8", &v.to_string()),
        Value::Bool(v) => write_scalar(out, "boolean", if *v { "1" } else { "0" }),
        Value::String(s) => write_scalar(out, "string", &escape(s.as_str())),
        Value::Double(v) => write_scalar(out, "double", &v.to_string()),
        Value::DateTime(dt) => write_scalar(out, "dateTime.iso8601", &dt.to_string()),
        Value::Binary(bytes) => write_scalar(out, "base64", &STANDARD.encode(bytes)),
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

fn write_scalar(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(text);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
