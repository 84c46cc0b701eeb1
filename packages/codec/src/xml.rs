//! XML documents built with `quick-xml`.
//!
//! Values are lowered into a [`Node`] tree and written as one element per
//! node, named after the node's kind:
//!
//! ```text
//! <value>
//!   <map>
//!     <field name="player"><string>  Alice </string></field>
//!     <field name="best"><none/></field>
//!     <field name="inventory"><seq/></field>
//!   </map>
//! </value>
//! ```
//!
//! (Shown indented; encoded documents have no whitespace between elements.)
//!
//! Text is written verbatim apart from markup characters and control
//! characters, which become character references. Nothing is trimmed on read.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::str::FromStr;

use bytes::Bytes;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use serde::de::DeserializeSeed;

use crate::node::{to_node, Node, NodeError};
use crate::traits::{Codec, DecodeSink, SinkSeed};
use crate::{Error, Format};

/// XML via `quick-xml`.
///
/// The root element name carries no data, so every document is wrapped in the
/// same configurable root element (`<value>` unless set otherwise) and the
/// name is ignored on decode. Everything after the root element other than
/// whitespace and comments is rejected.
///
/// # Example
///
/// ```rust
/// use savefs_codec::{decode, encode, XmlCodec};
///
/// let codec = XmlCodec::new();
/// let bytes = encode(&codec, &Some(" padded ")).unwrap();
/// assert_eq!(&bytes[..], b"<value><some><string> padded </string></some></value>");
///
/// let back: Option<String> = decode(&codec, &bytes).unwrap();
/// assert_eq!(back.as_deref(), Some(" padded "));
/// ```
#[derive(Debug, Clone)]
pub struct XmlCodec {
    root: Cow<'static, str>,
}

impl XmlCodec {
    pub const DEFAULT_ROOT: &'static str = "value";

    pub fn new() -> Self {
        Self {
            root: Cow::Borrowed(Self::DEFAULT_ROOT),
        }
    }

    /// Use a different root element name for encoded documents.
    pub fn with_root(root: impl Into<Cow<'static, str>>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl Default for XmlCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for XmlCodec {
    fn format(&self) -> Format {
        Format::XML
    }

    fn encode(&self, value: &dyn erased_serde::Serialize) -> Result<Bytes, Error> {
        let xml = to_node(value)
            .and_then(|node| write_document(&self.root, &node))
            .map_err(|e| Error::encode(Format::XML, e))?;
        Ok(Bytes::from(xml))
    }

    fn decode_into<'de>(
        &self,
        bytes: &'de [u8],
        sink: &mut DecodeSink<'_, 'de>,
    ) -> Result<(), Error> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::decode(Format::XML, e))?;
        let node = read_document(text).map_err(|e| Error::decode(Format::XML, e))?;
        SinkSeed(sink)
            .deserialize(node)
            .map_err(|e| Error::decode(Format::XML, e))
    }
}

/// Element names, one per node kind plus the two map entry forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Unit,
    Bool,
    Int,
    Uint,
    Int128,
    Uint128,
    Float,
    String,
    Bytes,
    None,
    Some,
    Seq,
    Map,
    /// A map entry with a string key, stored in the `name` attribute.
    Field,
    /// A map entry with any other key: two child nodes.
    Entry,
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Unit => "unit",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::Uint => "uint",
            Tag::Int128 => "int128",
            Tag::Uint128 => "uint128",
            Tag::Float => "float",
            Tag::String => "string",
            Tag::Bytes => "bytes",
            Tag::None => "none",
            Tag::Some => "some",
            Tag::Seq => "seq",
            Tag::Map => "map",
            Tag::Field => "field",
            Tag::Entry => "entry",
        }
    }

    fn parse(name: &[u8]) -> Option<Tag> {
        Some(match name {
            b"unit" => Tag::Unit,
            b"bool" => Tag::Bool,
            b"int" => Tag::Int,
            b"uint" => Tag::Uint,
            b"int128" => Tag::Int128,
            b"uint128" => Tag::Uint128,
            b"float" => Tag::Float,
            b"string" => Tag::String,
            b"bytes" => Tag::Bytes,
            b"none" => Tag::None,
            b"some" => Tag::Some,
            b"seq" => Tag::Seq,
            b"map" => Tag::Map,
            b"field" => Tag::Field,
            b"entry" => Tag::Entry,
            _ => return None,
        })
    }
}

const NAME_ATTR: &[u8] = b"name";

fn write_document(root: &str, node: &Node) -> Result<Vec<u8>, NodeError> {
    let mut writer = DocumentWriter {
        writer: Writer::new(Vec::new()),
    };
    writer.emit(Event::Start(BytesStart::new(root)))?;
    writer.node(node)?;
    writer.emit(Event::End(BytesEnd::new(root)))?;
    Ok(writer.writer.into_inner())
}

struct DocumentWriter {
    writer: Writer<Vec<u8>>,
}

impl DocumentWriter {
    fn emit(&mut self, event: Event<'_>) -> Result<(), NodeError> {
        self.writer.write_event(event).map_err(NodeError::new)
    }

    fn open(&mut self, tag: Tag) -> Result<(), NodeError> {
        self.emit(Event::Start(BytesStart::new(tag.name())))
    }

    fn close(&mut self, tag: Tag) -> Result<(), NodeError> {
        self.emit(Event::End(BytesEnd::new(tag.name())))
    }

    fn empty(&mut self, tag: Tag) -> Result<(), NodeError> {
        self.emit(Event::Empty(BytesStart::new(tag.name())))
    }

    fn leaf(&mut self, tag: Tag, text: &str) -> Result<(), NodeError> {
        if text.is_empty() {
            return self.empty(tag);
        }
        self.open(tag)?;
        self.emit(Event::Text(BytesText::from_escaped(escape(text))))?;
        self.close(tag)
    }

    fn node(&mut self, node: &Node) -> Result<(), NodeError> {
        match node {
            Node::Unit => self.empty(Tag::Unit),
            Node::Bool(v) => self.leaf(Tag::Bool, if *v { "true" } else { "false" }),
            Node::Int(v) => self.leaf(Tag::Int, &v.to_string()),
            Node::Uint(v) => self.leaf(Tag::Uint, &v.to_string()),
            Node::Int128(v) => self.leaf(Tag::Int128, &v.to_string()),
            Node::Uint128(v) => self.leaf(Tag::Uint128, &v.to_string()),
            Node::Float(v) => self.leaf(Tag::Float, &v.to_string()),
            Node::String(v) => self.leaf(Tag::String, v),
            Node::Bytes(v) => self.leaf(Tag::Bytes, &hex::encode(v)),
            Node::Option(None) => self.empty(Tag::None),
            Node::Option(Some(inner)) => {
                self.open(Tag::Some)?;
                self.node(inner)?;
                self.close(Tag::Some)
            }
            Node::Seq(items) if items.is_empty() => self.empty(Tag::Seq),
            Node::Seq(items) => {
                self.open(Tag::Seq)?;
                for item in items {
                    self.node(item)?;
                }
                self.close(Tag::Seq)
            }
            Node::Map(entries) if entries.is_empty() => self.empty(Tag::Map),
            Node::Map(entries) => {
                self.open(Tag::Map)?;
                for (key, value) in entries {
                    self.entry(key, value)?;
                }
                self.close(Tag::Map)
            }
        }
    }

    fn entry(&mut self, key: &Node, value: &Node) -> Result<(), NodeError> {
        match key {
            Node::String(name) => {
                let mut field = BytesStart::new(Tag::Field.name());
                field.push_attribute(Attribute {
                    key: QName(NAME_ATTR),
                    value: Cow::Owned(escape(name).into_bytes()),
                });
                self.emit(Event::Start(field))?;
                self.node(value)?;
                self.close(Tag::Field)
            }
            key => {
                self.open(Tag::Entry)?;
                self.node(key)?;
                self.node(value)?;
                self.close(Tag::Entry)
            }
        }
    }
}

fn read_document(text: &str) -> Result<Node, NodeError> {
    let mut reader = DocumentReader {
        reader: Reader::from_str(text),
    };

    match reader.next_markup()? {
        Event::Start(_) => {}
        other => return Err(unexpected(&other, "a root element with a value")),
    }
    let node = reader.child()?;
    reader.expect_end()?;

    match reader.next_markup()? {
        Event::Eof => Ok(node),
        other => Err(unexpected(&other, "end of input after the root element")),
    }
}

struct DocumentReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> DocumentReader<'a> {
    /// The next event that is not a comment, declaration, processing
    /// instruction or doctype.
    fn next_event(&mut self) -> Result<Event<'a>, NodeError> {
        loop {
            match self.reader.read_event().map_err(NodeError::new)? {
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                event => return Ok(event),
            }
        }
    }

    /// Like `next_event`, also skipping whitespace between elements.
    fn next_markup(&mut self) -> Result<Event<'a>, NodeError> {
        loop {
            match self.next_event()? {
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
                event => return Ok(event),
            }
        }
    }

    fn expect_end(&mut self) -> Result<(), NodeError> {
        match self.next_markup()? {
            Event::End(_) => Ok(()),
            other => Err(unexpected(&other, "a closing tag")),
        }
    }

    fn child(&mut self) -> Result<Node, NodeError> {
        match self.next_markup()? {
            Event::Empty(start) => empty_node(&start),
            Event::Start(start) => self.element(&start),
            other => Err(unexpected(&other, "an element")),
        }
    }

    fn element(&mut self, start: &BytesStart<'a>) -> Result<Node, NodeError> {
        let tag = Tag::parse(start.name().as_ref()).ok_or_else(|| unknown_element(start))?;
        match tag {
            Tag::Unit => self.expect_end().map(|()| Node::Unit),
            Tag::None => self.expect_end().map(|()| Node::Option(None)),
            Tag::Bool => match self.text()?.as_str() {
                "true" => Ok(Node::Bool(true)),
                "false" => Ok(Node::Bool(false)),
                other => Err(NodeError::new(format!("invalid <bool> {:?}", other))),
            },
            Tag::Int => parse_text(tag, &self.text()?).map(Node::Int),
            Tag::Uint => parse_text(tag, &self.text()?).map(Node::Uint),
            Tag::Int128 => parse_text(tag, &self.text()?).map(Node::Int128),
            Tag::Uint128 => parse_text(tag, &self.text()?).map(Node::Uint128),
            Tag::Float => parse_text(tag, &self.text()?).map(Node::Float),
            Tag::String => self.text().map(Node::String),
            Tag::Bytes => hex::decode(self.text()?)
                .map(Node::Bytes)
                .map_err(|e| NodeError::new(format!("invalid <bytes>: {}", e))),
            Tag::Some => {
                let inner = self.child()?;
                self.expect_end()?;
                Ok(Node::Option(Some(Box::new(inner))))
            }
            Tag::Seq => {
                let mut items = Vec::new();
                loop {
                    match self.next_markup()? {
                        Event::End(_) => return Ok(Node::Seq(items)),
                        Event::Empty(start) => items.push(empty_node(&start)?),
                        Event::Start(start) => items.push(self.element(&start)?),
                        other => return Err(unexpected(&other, "an element or </seq>")),
                    }
                }
            }
            Tag::Map => {
                let mut entries = Vec::new();
                loop {
                    match self.next_markup()? {
                        Event::End(_) => return Ok(Node::Map(entries)),
                        Event::Start(start) => entries.push(self.entry(&start)?),
                        other => return Err(unexpected(&other, "<field>, <entry> or </map>")),
                    }
                }
            }
            Tag::Field | Tag::Entry => Err(NodeError::new(format!(
                "<{}> outside of <map>",
                tag.name()
            ))),
        }
    }

    fn entry(&mut self, start: &BytesStart<'a>) -> Result<(Node, Node), NodeError> {
        let key = match Tag::parse(start.name().as_ref()) {
            Some(Tag::Field) => Node::String(field_name(start)?),
            Some(Tag::Entry) => self.child()?,
            _ => return Err(unknown_element(start)),
        };
        let value = self.child()?;
        self.expect_end()?;
        Ok((key, value))
    }

    /// The text content of a leaf element, up to and including its end tag.
    fn text(&mut self) -> Result<String, NodeError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(raw) => {
                    let raw = std::str::from_utf8(&raw).map_err(NodeError::new)?;
                    text.push_str(&unescape(raw)?);
                }
                Event::CData(data) => {
                    text.push_str(std::str::from_utf8(&data).map_err(NodeError::new)?);
                }
                Event::End(_) => return Ok(text),
                other => return Err(unexpected(&other, "text")),
            }
        }
    }
}

fn empty_node(start: &BytesStart<'_>) -> Result<Node, NodeError> {
    match Tag::parse(start.name().as_ref()) {
        Some(Tag::Unit) => Ok(Node::Unit),
        Some(Tag::None) => Ok(Node::Option(None)),
        Some(Tag::String) => Ok(Node::String(String::new())),
        Some(Tag::Bytes) => Ok(Node::Bytes(Vec::new())),
        Some(Tag::Seq) => Ok(Node::Seq(Vec::new())),
        Some(Tag::Map) => Ok(Node::Map(Vec::new())),
        Some(tag) => Err(NodeError::new(format!("<{}/> has no value", tag.name()))),
        None => Err(unknown_element(start)),
    }
}

fn field_name(start: &BytesStart<'_>) -> Result<String, NodeError> {
    for attribute in start.attributes() {
        let attribute = attribute.map_err(NodeError::new)?;
        if attribute.key == QName(NAME_ATTR) {
            let raw = std::str::from_utf8(&attribute.value).map_err(NodeError::new)?;
            return unescape(raw);
        }
    }
    Err(NodeError::new("<field> without a name attribute"))
}

fn parse_text<T>(tag: Tag, text: &str) -> Result<T, NodeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.parse()
        .map_err(|e| NodeError::new(format!("invalid <{}> {:?}: {}", tag.name(), text, e)))
}

fn unknown_element(start: &BytesStart<'_>) -> NodeError {
    NodeError::new(format!(
        "unknown element <{}>",
        String::from_utf8_lossy(start.name().as_ref())
    ))
}

fn unexpected(event: &Event<'_>, expected: &str) -> NodeError {
    let found = match event {
        Event::Start(e) | Event::Empty(e) => {
            format!("<{}>", String::from_utf8_lossy(e.name().as_ref()))
        }
        Event::End(e) => format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Eof => "end of input".to_string(),
        _ => "text".to_string(),
    };
    NodeError::new(format!("expected {}, found {}", expected, found))
}

/// Escape markup and control characters. Everything else is kept verbatim,
/// including leading and trailing whitespace.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => {
                // Writing to a String cannot fail.
                let _ = write!(escaped, "&#x{:X};", u32::from(c));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape(raw: &str) -> Result<String, NodeError> {
    let mut text = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        text.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let semi = tail
            .find(';')
            .ok_or_else(|| NodeError::new("unterminated reference"))?;
        text.push(resolve_reference(&tail[..semi])?);
        rest = &tail[semi + 1..];
    }
    text.push_str(rest);
    Ok(text)
}

fn resolve_reference(reference: &str) -> Result<char, NodeError> {
    let code = match reference {
        "amp" => return Ok('&'),
        "lt" => return Ok('<'),
        "gt" => return Ok('>'),
        "quot" => return Ok('"'),
        "apos" => return Ok('\''),
        _ => match reference.strip_prefix("#x") {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference.strip_prefix('#').and_then(|dec| dec.parse().ok()),
        },
    };
    code.and_then(char::from_u32)
        .ok_or_else(|| NodeError::new(format!("unknown reference &{};", reference)))
}
