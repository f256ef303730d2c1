//! Response and request document decoder.
//!
//! The envelope (`methodResponse`, `params`, `fault`, ...) is walked directly. The
//! `<value>` tree underneath is decoded with an explicit frame stack instead of
//! recursion, so nesting depth is only bounded by memory.
//!
//! Input that ends before the document is complete yields
//! [`Error::IncompleteInput`], never a partially filled value.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::{Reader, events::Event};

use crate::{
    error::{Error, Result},
    message::{Fault, MethodCall, MethodResponse},
    value::{DateTime, Value},
};

/// Decodes a `methodResponse` document.
pub fn decode_response(input: &[u8]) -> Result<MethodResponse> {
    let mut doc = Document::new(input);
    doc.expect_open("methodResponse")?;

    let response = match doc.next_tag()? {
        Tag::Open(name) if name == "params" => MethodResponse::Success(doc.single_param()?),
        Tag::Empty(name) if name == "params" => {
            return Err(Error::protocol("response contains no param"));
        }
        Tag::Open(name) if name == "fault" => {
            doc.expect_open("value")?;
            let value = doc.value()?;
            doc.expect_close("fault")?;
            MethodResponse::Fault(fault_from_value(&value)?)
        }
        other => {
            return Err(Error::protocol(format!(
                "expected <params> or <fault> in methodResponse, found {other}"
            )));
        }
    };

    doc.expect_close("methodResponse")?;
    doc.expect_end()?;
    Ok(response)
}

/// Decodes a `methodCall` document.
pub fn decode_call(input: &[u8]) -> Result<MethodCall> {
    let mut doc = Document::new(input);
    doc.expect_open("methodCall")?;
    doc.expect_open("methodName")?;
    let name = doc.text_until("methodName")?.trim().to_owned();
    if name.is_empty() {
        return Err(Error::protocol("empty methodName"));
    }

    let mut params = Vec::new();
    match doc.next_tag()? {
        Tag::Close(name) if name == "methodCall" => {}
        Tag::Empty(name) if name == "params" => doc.expect_close("methodCall")?,
        Tag::Open(name) if name == "params" => {
            loop {
                match doc.next_tag()? {
                    Tag::Open(name) if name == "param" => {
                        params.push(doc.param_value()?);
                    }
                    Tag::Close(name) if name == "params" => break,
                    other => {
                        return Err(Error::protocol(format!("expected <param>, found {other}")));
                    }
                }
            }
            doc.expect_close("methodCall")?;
        }
        other => {
            return Err(Error::protocol(format!(
                "expected <params> in methodCall, found {other}"
            )));
        }
    }

    doc.expect_end()?;
    Ok(MethodCall { name, params })
}

fn fault_from_value(value: &Value) -> Result<Fault> {
    let members = value
        .as_struct()
        .map_err(|_| Error::protocol(format!("fault value must be a struct, found {}", value.kind())))?;
    let code = members
        .get("faultCode")
        .ok_or_else(|| Error::protocol("fault is missing faultCode"))?
        .as_int()?;
    let message = members
        .get("faultString")
        .ok_or_else(|| Error::protocol("fault is missing faultString"))?
        .as_str()?
        .to_owned();
    Ok(Fault { code, message })
}

/// One markup token with owned names and unescaped text.
#[derive(Debug)]
enum Token {
    Open(String),
    Empty(String),
    Close(String),
    Text(String),
    Eof,
}

/// A structural token; text has already been ruled out.
#[derive(Debug)]
enum Tag {
    Open(String),
    Empty(String),
    Close(String),
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(name) => write!(f, "<{name}>"),
            Self::Empty(name) => write!(f, "<{name}/>"),
            Self::Close(name) => write!(f, "</{name}>"),
        }
    }
}

/// Partially decoded container in the value stack.
#[derive(Debug)]
enum Frame {
    /// Inside `<value>`: untyped text so far, plus the typed child once seen.
    Value { text: String, typed: Option<Value> },
    /// Inside `<array>`; `data` tracks the `<data>` wrapper.
    Array { items: Vec<Value>, data: DataState },
    Struct(BTreeMap<String, Value>),
    Member { name: Option<String>, value: Option<Value> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataState {
    Before,
    Open,
    Closed,
}

impl Frame {
    fn value() -> Self {
        Self::Value {
            text: String::new(),
            typed: None,
        }
    }
}

struct Document<'a> {
    reader: Reader<&'a [u8]>,
    len: usize,
}

impl<'a> Document<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::from_reader(input),
            len: input.len(),
        }
    }

    /// Whether the reader has consumed the whole input.
    fn at_end(&self) -> bool {
        self.reader.buffer_position() as usize >= self.len
    }

    /// Undecodable text that runs to the end of the input was cut short, e.g.
    /// inside an entity reference or a multi-byte character.
    fn text_error(&self, err: impl std::fmt::Display) -> Error {
        if self.at_end() {
            Error::IncompleteInput
        } else {
            Error::Parse(err.to_string())
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            let token = match self.reader.read_event()? {
                Event::Start(e) => Token::Open(element_name(e.local_name().as_ref())?),
                Event::Empty(e) => Token::Empty(element_name(e.local_name().as_ref())?),
                Event::End(e) => Token::Close(element_name(e.local_name().as_ref())?),
                Event::Text(t) => match t.unescape() {
                    Ok(text) => Token::Text(text.into_owned()),
                    Err(e) => return Err(self.text_error(e)),
                },
                Event::CData(c) => match String::from_utf8(c.into_inner().into_owned()) {
                    Ok(text) => Token::Text(text),
                    Err(e) => return Err(self.text_error(format!("CDATA is not UTF-8: {e}"))),
                },
                Event::Eof => Token::Eof,
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => continue,
            };
            return Ok(token);
        }
    }

    /// Next element boundary, skipping whitespace. Running out of input here is
    /// always premature.
    fn next_tag(&mut self) -> Result<Tag> {
        loop {
            match self.next_token()? {
                Token::Open(name) => return Ok(Tag::Open(name)),
                Token::Empty(name) => return Ok(Tag::Empty(name)),
                Token::Close(name) => return Ok(Tag::Close(name)),
                Token::Text(text) if is_blank(&text) => continue,
                Token::Text(text) => {
                    return Err(Error::protocol(format!("unexpected text {text:?}")));
                }
                Token::Eof => return Err(Error::IncompleteInput),
            }
        }
    }

    fn expect_open(&mut self, expected: &str) -> Result<()> {
        match self.next_tag()? {
            Tag::Open(name) if name == expected => Ok(()),
            other => Err(Error::protocol(format!("expected <{expected}>, found {other}"))),
        }
    }

    fn expect_close(&mut self, expected: &str) -> Result<()> {
        match self.next_tag()? {
            Tag::Close(name) if name == expected => Ok(()),
            other => Err(Error::protocol(format!("expected </{expected}>, found {other}"))),
        }
    }

    /// Only whitespace and comments may follow the root element.
    fn expect_end(&mut self) -> Result<()> {
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(()),
                Token::Text(text) if is_blank(&text) => continue,
                other => {
                    return Err(Error::protocol(format!(
                        "trailing content after root element: {other:?}"
                    )));
                }
            }
        }
    }

    /// Reads the one `<param>` of a response through `</params>`, positioned just
    /// after `<params>`.
    fn single_param(&mut self) -> Result<Value> {
        match self.next_tag()? {
            Tag::Open(name) if name == "param" => {}
            Tag::Close(name) if name == "params" => {
                return Err(Error::protocol("response contains no param"));
            }
            other => return Err(Error::protocol(format!("expected <param>, found {other}"))),
        }
        let value = self.param_value()?;
        match self.next_tag()? {
            Tag::Close(name) if name == "params" => {}
            Tag::Open(name) if name == "param" => {
                return Err(Error::protocol("response contains more than one param"));
            }
            other => return Err(Error::protocol(format!("expected </params>, found {other}"))),
        }
        Ok(value)
    }

    /// Reads `<value>...</value></param>`, positioned just after `<param>`.
    fn param_value(&mut self) -> Result<Value> {
        let value = match self.next_tag()? {
            Tag::Open(name) if name == "value" => self.value()?,
            Tag::Empty(name) if name == "value" => Value::Nil,
            other => return Err(Error::protocol(format!("expected <value>, found {other}"))),
        };
        self.expect_close("param")?;
        Ok(value)
    }

    /// Collects character data up to `</tag>`; nested elements are rejected.
    fn text_until(&mut self, tag: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::Close(name) if name == tag => return Ok(text),
                Token::Eof => return Err(Error::IncompleteInput),
                other => {
                    return Err(Error::protocol(format!(
                        "unexpected {other:?} inside <{tag}>"
                    )));
                }
            }
        }
    }

    /// Decodes one value tree, positioned just after its opening `<value>`.
    /// Consumes the matching `</value>`.
    fn value(&mut self) -> Result<Value> {
        let mut stack = vec![Frame::value()];
        loop {
            let token = self.next_token()?;
            let Some(top) = stack.last_mut() else {
                return Err(Error::protocol("value stack underflow"));
            };
            match token {
                Token::Eof => return Err(Error::IncompleteInput),
                Token::Text(t) => match top {
                    Frame::Value { text, .. } => text.push_str(&t),
                    _ if is_blank(&t) => {}
                    _ => return Err(Error::protocol(format!("unexpected text {t:?}"))),
                },
                Token::Open(name) => match top {
                    Frame::Value { typed: Some(v), .. } => {
                        return Err(Error::protocol(format!(
                            "<value> holds {} and <{name}>",
                            v.kind()
                        )));
                    }
                    Frame::Value { typed, .. } => match name.as_str() {
                        "array" => stack.push(Frame::Array {
                            items: Vec::new(),
                            data: DataState::Before,
                        }),
                        "struct" => stack.push(Frame::Struct(BTreeMap::new())),
                        _ if SCALAR_TAGS.contains(&name.as_str()) => {
                            let text = self.text_until(&name)?;
                            *typed = Some(scalar(&name, text)?);
                        }
                        _ => {
                            return Err(Error::protocol(format!("unknown value type <{name}>")));
                        }
                    },
                    Frame::Array { data, .. } => match (name.as_str(), *data) {
                        ("data", DataState::Before) => *data = DataState::Open,
                        ("value", DataState::Open) => stack.push(Frame::value()),
                        _ => return Err(unexpected_in("array", &name)),
                    },
                    Frame::Struct(_) => match name.as_str() {
                        "member" => stack.push(Frame::Member {
                            name: None,
                            value: None,
                        }),
                        _ => return Err(unexpected_in("struct", &name)),
                    },
                    Frame::Member { name: member, value } => match name.as_str() {
                        "name" if member.is_none() => *member = Some(self.text_until("name")?),
                        "value" if value.is_none() => stack.push(Frame::value()),
                        _ => return Err(unexpected_in("member", &name)),
                    },
                },
                Token::Empty(name) => match top {
                    Frame::Value { typed: Some(v), .. } => {
                        return Err(Error::protocol(format!(
                            "<value> holds {} and <{name}/>",
                            v.kind()
                        )));
                    }
                    Frame::Value { typed, .. } => {
                        *typed = Some(match name.as_str() {
                            "array" => Value::Array(Vec::new()),
                            "struct" => Value::Struct(BTreeMap::new()),
                            _ => scalar(&name, String::new())?,
                        });
                    }
                    Frame::Array { items, data } => match (name.as_str(), *data) {
                        ("data", DataState::Before) => *data = DataState::Closed,
                        ("value", DataState::Open) => items.push(Value::Nil),
                        _ => return Err(unexpected_in("array", &name)),
                    },
                    Frame::Struct(_) => return Err(unexpected_in("struct", &name)),
                    Frame::Member { name: member, value } => match name.as_str() {
                        "name" if member.is_none() => *member = Some(String::new()),
                        "value" if value.is_none() => *value = Some(Value::Nil),
                        _ => return Err(unexpected_in("member", &name)),
                    },
                },
                Token::Close(name) => {
                    if let Frame::Array { data, .. } = top {
                        if name == "data" && *data == DataState::Open {
                            *data = DataState::Closed;
                            continue;
                        }
                    }
                    let closes_top = matches!(
                        (stack.last(), name.as_str()),
                        (Some(Frame::Value { .. }), "value")
                            | (Some(Frame::Array { data: DataState::Closed, .. }), "array")
                            | (Some(Frame::Struct(_)), "struct")
                            | (Some(Frame::Member { .. }), "member")
                    );
                    if !closes_top {
                        return Err(Error::protocol(format!("unexpected </{name}>")));
                    }
                    let Some(frame) = stack.pop() else {
                        return Err(Error::protocol("value stack underflow"));
                    };
                    match frame {
                        Frame::Value { text, typed } => {
                            let value = match typed {
                                Some(v) if is_blank(&text) => v,
                                Some(_) => {
                                    return Err(Error::protocol(format!(
                                        "mixed text and typed content in <value>: {text:?}"
                                    )));
                                }
                                None => Value::String(text),
                            };
                            if stack.is_empty() {
                                return Ok(value);
                            }
                            attach(&mut stack, value)?;
                        }
                        Frame::Array { items, .. } => attach(&mut stack, Value::Array(items))?,
                        Frame::Struct(members) => attach(&mut stack, Value::Struct(members))?,
                        Frame::Member { name, value } => {
                            let name =
                                name.ok_or_else(|| Error::protocol("struct member is missing <name>"))?;
                            let value = value.ok_or_else(|| {
                                Error::protocol(format!("struct member {name:?} is missing <value>"))
                            })?;
                            let Some(Frame::Struct(members)) = stack.last_mut() else {
                                return Err(Error::protocol("<member> outside <struct>"));
                            };
                            if members.contains_key(&name) {
                                return Err(Error::protocol(format!(
                                    "duplicate struct member {name:?}"
                                )));
                            }
                            members.insert(name, value);
                        }
                    }
                }
            }
        }
    }
}

/// Hands a finished value to the frame below it.
fn attach(stack: &mut [Frame], value: Value) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Value { typed, .. }) if typed.is_none() => *typed = Some(value),
        Some(Frame::Array { items, .. }) => items.push(value),
        Some(Frame::Member { value: slot, .. }) if slot.is_none() => *slot = Some(value),
        _ => return Err(Error::protocol("value in unexpected position")),
    }
    Ok(())
}

const SCALAR_TAGS: &[&str] = &[
    "i4",
    "int",
    "i8",
    "boolean",
    "string",
    "double",
    "dateTime.iso8601",
    "base64",
    "nil",
];

fn scalar(tag: &str, text: String) -> Result<Value> {
    let invalid = |text: &str| Error::protocol(format!("invalid <{tag}> content {text:?}"));
    let trimmed = text.trim();
    let value = match tag {
        "i4" | "int" => Value::Int(trimmed.parse().map_err(|_| invalid(&text))?),
        "i8" => Value::Long(trimmed.parse().map_err(|_| invalid(&text))?),
        "boolean" => match trimmed {
            "0" => Value::Bool(false),
            "1" => Value::Bool(true),
            _ => return Err(invalid(&text)),
        },
        "string" => Value::String(text),
        "double" => Value::Double(trimmed.parse().map_err(|_| invalid(&text))?),
        "dateTime.iso8601" => Value::DateTime(trimmed.parse::<DateTime>()?),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            Value::Binary(STANDARD.decode(compact).map_err(|_| invalid(&text))?)
        }
        "nil" if trimmed.is_empty() => Value::Nil,
        "nil" => return Err(invalid(&text)),
        other => return Err(Error::protocol(format!("unknown value type <{other}>"))),
    };
    Ok(value)
}

fn unexpected_in(parent: &str, child: &str) -> Error {
    Error::protocol(format!("unexpected <{child}> inside <{parent}>"))
}

fn element_name(raw: &[u8]) -> Result<String> {
    String::from_utf8(raw.to_vec()).map_err(|e| Error::Parse(format!("element name is not UTF-8: {e}")))
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
