//! `methodCall` encoder and `methodResponse` decoder.
//!
//! The decoder walks the event stream with a small recursive-descent
//! parser. Whitespace between structural tags is ignored; text directly
//! inside `<value>` with no type tag is an implicit `string`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Write};
use std::str;

use super::value::{Value, DATETIME_FORMAT};
use super::{XmlRpcError, XmlRpcResult};

// ── Encoding ────────────────────────────────────────────────────────

/// Serialize a method call to an XML-RPC request body.
pub fn encode_call(method: &str, params: &[Value]) -> XmlRpcResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(write_error)?;
    start(&mut writer, "methodCall")?;
    text_element(&mut writer, "methodName", method)?;

    start(&mut writer, "params")?;
    for param in params {
        start(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        end(&mut writer, "param")?;
    }
    end(&mut writer, "params")?;
    end(&mut writer, "methodCall")?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| XmlRpcError::Xml(e.to_string()))
}

fn write_value<W: Write>(writer: &mut Writer<W>, value: &Value) -> XmlRpcResult<()> {
    start(writer, "value")?;
    match value {
        Value::Int(i) => {
            let tag = if i32::try_from(*i).is_ok() { "int" } else { "i8" };
            text_element(writer, tag, &i.to_string())?;
        }
        Value::Bool(b) => text_element(writer, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => text_element(writer, "string", s)?,
        Value::Double(d) => text_element(writer, "double", &d.to_string())?,
        Value::DateTime(dt) => {
            text_element(writer, "dateTime.iso8601", &dt.format(DATETIME_FORMAT).to_string())?
        }
        Value::Base64(bytes) => text_element(writer, "base64", &BASE64.encode(bytes))?,
        Value::Struct(members) => {
            start(writer, "struct")?;
            for (name, member) in members {
                start(writer, "member")?;
                text_element(writer, "name", name)?;
                write_value(writer, member)?;
                end(writer, "member")?;
            }
            end(writer, "struct")?;
        }
        Value::Array(items) => {
            start(writer, "array")?;
            start(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            end(writer, "data")?;
            end(writer, "array")?;
        }
        Value::Nil => {
            writer
                .write_event(Event::Empty(BytesStart::new("nil")))
                .map_err(write_error)?;
        }
    }
    end(writer, "value")
}

fn start<W: Write>(writer: &mut Writer<W>, tag: &str) -> XmlRpcResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(write_error)
}

fn end<W: Write>(writer: &mut Writer<W>, tag: &str) -> XmlRpcResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(write_error)
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> XmlRpcResult<()> {
    start(writer, tag)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    end(writer, tag)
}

fn write_error(e: impl fmt::Display) -> XmlRpcError {
    XmlRpcError::Xml(format!("failed to write request: {e}"))
}

// ── Decoding ────────────────────────────────────────────────────────

/// Parse an XML-RPC response body.
///
/// Returns the single return value, `Value::Nil` for an empty `<params>`,
/// or `XmlRpcError::Fault` when the server answered with `<fault>`.
pub fn decode_response(xml: &str) -> XmlRpcResult<Value> {
    let mut decoder = Decoder::new(xml);
    decoder.expect_start("methodResponse")?;

    let outcome = match decoder.next_significant()? {
        Token::Start(tag) if tag == "params" => match decoder.next_significant()? {
            Token::Start(tag) if tag == "param" => {
                let value = decoder.value()?;
                decoder.expect_end("param")?;
                decoder.expect_end("params")?;
                Ok(value)
            }
            Token::End(tag) if tag == "params" => Ok(Value::Nil),
            other => return Err(unexpected("<param>", &other)),
        },
        Token::Empty(tag) if tag == "params" => Ok(Value::Nil),
        Token::Start(tag) if tag == "fault" => {
            let value = decoder.value()?;
            decoder.expect_end("fault")?;
            Err(fault_from(&value))
        }
        other => return Err(unexpected("<params> or <fault>", &other)),
    };

    decoder.expect_end("methodResponse")?;
    outcome
}

fn fault_from(value: &Value) -> XmlRpcError {
    let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(-1);
    let message = value
        .get("faultString")
        .and_then(Value::to_text)
        .unwrap_or_else(|| "unknown fault".to_string());
    XmlRpcError::Fault { code, message }
}

/// Flattened view of the quick-xml event stream.
#[derive(Debug, PartialEq)]
enum Token {
    Start(String),
    End(String),
    Empty(String),
    Text(String),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(tag) => write!(f, "<{tag}>"),
            Self::End(tag) => write!(f, "</{tag}>"),
            Self::Empty(tag) => write!(f, "<{tag}/>"),
            Self::Text(text) => write!(f, "text {:?}", truncate(text, 40)),
            Self::Eof => f.write_str("end of document"),
        }
    }
}

fn unexpected(wanted: &str, found: &Token) -> XmlRpcError {
    XmlRpcError::Decode(format!("expected {wanted}, found {found}"))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn tag_name(raw: &[u8]) -> XmlRpcResult<String> {
    str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| XmlRpcError::Xml("Invalid UTF-8 in tag name".into()))
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn new(xml: &'a str) -> Self {
        Self { reader: Reader::from_str(xml) }
    }

    fn next_token(&mut self) -> XmlRpcResult<Token> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(XmlRpcError::Xml(format!(
                        "at position {}: {e}",
                        self.reader.buffer_position()
                    )))
                }
            };

            match event {
                Event::Start(e) => return Ok(Token::Start(tag_name(e.name().as_ref())?)),
                Event::End(e) => return Ok(Token::End(tag_name(e.name().as_ref())?)),
                Event::Empty(e) => return Ok(Token::Empty(tag_name(e.name().as_ref())?)),
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| XmlRpcError::Xml(e.to_string()))?;
                    return Ok(Token::Text(text.into_owned()));
                }
                Event::CData(c) => {
                    return String::from_utf8(c.into_inner().into_owned())
                        .map(Token::Text)
                        .map_err(|e| XmlRpcError::Xml(e.to_string()));
                }
                Event::Eof => return Ok(Token::Eof),
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }
    }

    /// Next token that is not inter-element whitespace.
    fn next_significant(&mut self) -> XmlRpcResult<Token> {
        loop {
            match self.next_token()? {
                Token::Text(t) if t.trim().is_empty() => continue,
                token => return Ok(token),
            }
        }
    }

    fn expect_start(&mut self, tag: &str) -> XmlRpcResult<()> {
        match self.next_significant()? {
            Token::Start(found) if found == tag => Ok(()),
            other => Err(unexpected(&format!("<{tag}>"), &other)),
        }
    }

    fn expect_end(&mut self, tag: &str) -> XmlRpcResult<()> {
        match self.next_significant()? {
            Token::End(found) if found == tag => Ok(()),
            other => Err(unexpected(&format!("</{tag}>"), &other)),
        }
    }

    /// Character data up to the closing `</tag>`.
    fn text_until(&mut self, tag: &str) -> XmlRpcResult<String> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::End(found) if found == tag => return Ok(text),
                other => return Err(unexpected(&format!("text or </{tag}>"), &other)),
            }
        }
    }

    /// A complete `<value>…</value>` or `<value/>`.
    fn value(&mut self) -> XmlRpcResult<Value> {
        match self.next_significant()? {
            Token::Start(tag) if tag == "value" => self.value_body(),
            Token::Empty(tag) if tag == "value" => Ok(Value::String(String::new())),
            other => Err(unexpected("<value>", &other)),
        }
    }

    /// Contents of a `<value>` whose start tag was already consumed.
    fn value_body(&mut self) -> XmlRpcResult<Value> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::End(tag) if tag == "value" => return Ok(Value::String(text)),
                Token::Start(tag) => {
                    let value = self.typed(&tag)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                Token::Empty(tag) => {
                    let value = empty_typed(&tag)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                other => return Err(unexpected("value contents", &other)),
            }
        }
    }

    fn typed(&mut self, tag: &str) -> XmlRpcResult<Value> {
        match tag {
            "string" => Ok(Value::String(self.text_until(tag)?)),
            "int" | "i4" | "i8" => {
                let raw = self.text_until(tag)?;
                raw.trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| XmlRpcError::Decode(format!("invalid <{tag}> {raw:?}: {e}")))
            }
            "boolean" => {
                let raw = self.text_until(tag)?;
                match raw.trim() {
                    "1" => Ok(Value::Bool(true)),
                    "0" => Ok(Value::Bool(false)),
                    other => Err(XmlRpcError::Decode(format!("invalid <boolean> {other:?}"))),
                }
            }
            "double" => {
                let raw = self.text_until(tag)?;
                raw.trim()
                    .parse::<f64>()
                    .map(Value::Double)
                    .map_err(|e| XmlRpcError::Decode(format!("invalid <double> {raw:?}: {e}")))
            }
            "dateTime.iso8601" => {
                let raw = self.text_until(tag)?;
                parse_datetime(raw.trim()).map(Value::DateTime)
            }
            "base64" => {
                let raw = self.text_until(tag)?;
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                BASE64
                    .decode(compact.as_bytes())
                    .map(Value::Base64)
                    .map_err(|e| XmlRpcError::Decode(format!("invalid <base64>: {e}")))
            }
            "nil" => {
                self.expect_end("nil")?;
                Ok(Value::Nil)
            }
            "struct" => self.struct_body(),
            "array" => self.array_body(),
            other => Err(XmlRpcError::Decode(format!("unsupported value type <{other}>"))),
        }
    }

    fn struct_body(&mut self) -> XmlRpcResult<Value> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_significant()? {
                Token::Start(tag) if tag == "member" => {
                    let name = match self.next_significant()? {
                        Token::Start(tag) if tag == "name" => self.text_until("name")?,
                        Token::Empty(tag) if tag == "name" => String::new(),
                        other => return Err(unexpected("<name>", &other)),
                    };
                    let value = self.value()?;
                    self.expect_end("member")?;
                    members.insert(name, value);
                }
                Token::End(tag) if tag == "struct" => return Ok(Value::Struct(members)),
                other => return Err(unexpected("<member> or </struct>", &other)),
            }
        }
    }

    fn array_body(&mut self) -> XmlRpcResult<Value> {
        match self.next_significant()? {
            Token::Start(tag) if tag == "data" => {}
            Token::Empty(tag) if tag == "data" => {
                self.expect_end("array")?;
                return Ok(Value::Array(Vec::new()));
            }
            other => return Err(unexpected("<data>", &other)),
        }

        let mut items = Vec::new();
        loop {
            match self.next_significant()? {
                Token::Start(tag) if tag == "value" => items.push(self.value_body()?),
                Token::Empty(tag) if tag == "value" => items.push(Value::String(String::new())),
                Token::End(tag) if tag == "data" => break,
                other => return Err(unexpected("<value> or </data>", &other)),
            }
        }
        self.expect_end("array")?;
        Ok(Value::Array(items))
    }
}

/// Self-closing type tags, e.g. `<string/>` or `<nil/>`.
fn empty_typed(tag: &str) -> XmlRpcResult<Value> {
    match tag {
        "string" => Ok(Value::String(String::new())),
        "nil" => Ok(Value::Nil),
        "struct" => Ok(Value::Struct(BTreeMap::new())),
        "array" => Ok(Value::Array(Vec::new())),
        "base64" => Ok(Value::Base64(Vec::new())),
        other => Err(XmlRpcError::Decode(format!("empty <{other}/> carries no value"))),
    }
}

fn parse_datetime(raw: &str) -> XmlRpcResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| XmlRpcError::Decode(format!("invalid <dateTime.iso8601> {raw:?}: {e}")))
}
