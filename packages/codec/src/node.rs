//! An owned tree of the serde data model.
//!
//! Formats without native types lower values into a `Node` first. Every serde
//! shape gets its own variant, so `None`, empty sequences and unit values stay
//! distinguishable after a round-trip.

use std::fmt;

use serde::de::{self, Unexpected};
use serde::ser::{self, Serialize};

/// One value of the serde data model.
///
/// Enums use the external tagging of `serde_json`: a unit variant is its name
/// as a string, any other variant is a one-entry map from its name to its
/// content.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Unit,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Int128(i128),
    Uint128(u128),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Option(Option<Box<Node>>),
    Seq(Vec<Node>),
    /// Entries in serialization order. Keys may be any node.
    Map(Vec<(Node, Node)>),
}

impl Node {
    pub(crate) fn unexpected(&self) -> Unexpected<'_> {
        match self {
            Node::Unit => Unexpected::Unit,
            Node::Bool(v) => Unexpected::Bool(*v),
            Node::Int(v) => Unexpected::Signed(*v),
            Node::Uint(v) => Unexpected::Unsigned(*v),
            Node::Int128(_) | Node::Uint128(_) => Unexpected::Other("128-bit integer"),
            Node::Float(v) => Unexpected::Float(*v),
            Node::String(v) => Unexpected::Str(v),
            Node::Bytes(v) => Unexpected::Bytes(v),
            Node::Option(_) => Unexpected::Option,
            Node::Seq(_) => Unexpected::Seq,
            Node::Map(_) => Unexpected::Map,
        }
    }
}

/// Lower any serializable value into a tree.
pub(crate) fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node, NodeError> {
    value.serialize(NodeSerializer)
}

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub(crate) struct NodeError(String);

impl NodeError {
    pub(crate) fn new(message: impl fmt::Display) -> Self {
        NodeError(message.to_string())
    }
}

impl ser::Error for NodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        NodeError::new(msg)
    }
}

impl de::Error for NodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        NodeError::new(msg)
    }
}

fn tagged(variant: &str, content: Node) -> Node {
    Node::Map(vec![(Node::String(variant.to_owned()), content)])
}

pub(crate) struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = NodeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantBuilder<SeqBuilder>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantBuilder<MapBuilder>;

    fn serialize_bool(self, v: bool) -> Result<Node, NodeError> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Node, NodeError> {
        Ok(Node::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Node, NodeError> {
        Ok(Node::Int128(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Node, NodeError> {
        Ok(Node::Uint(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Node, NodeError> {
        Ok(Node::Uint(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Node, NodeError> {
        Ok(Node::Uint(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Node, NodeError> {
        Ok(Node::Uint(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Node, NodeError> {
        Ok(Node::Uint128(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Node, NodeError> {
        Ok(Node::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Node, NodeError> {
        Ok(Node::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Node, NodeError> {
        Ok(Node::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node, NodeError> {
        Ok(Node::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, NodeError> {
        Ok(Node::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Node, NodeError> {
        Ok(Node::Option(None))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, NodeError> {
        Ok(Node::Option(Some(Box::new(to_node(value)?))))
    }

    fn serialize_unit(self) -> Result<Node, NodeError> {
        Ok(Node::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, NodeError> {
        Ok(Node::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, NodeError> {
        Ok(Node::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, NodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, NodeError> {
        Ok(tagged(variant, to_node(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder(Vec::with_capacity(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder(Vec::with_capacity(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<SeqBuilder>, NodeError> {
        Ok(VariantBuilder {
            variant,
            content: SeqBuilder(Vec::with_capacity(len)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, NodeError> {
        Ok(MapBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, NodeError> {
        Ok(MapBuilder::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<MapBuilder>, NodeError> {
        Ok(VariantBuilder {
            variant,
            content: MapBuilder::with_capacity(len),
        })
    }
}

pub(crate) struct SeqBuilder(Vec<Node>);

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.0.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(Node::Seq(self.0))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, NodeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, NodeError> {
        ser::SerializeSeq::end(self)
    }
}

pub(crate) struct MapBuilder {
    entries: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

impl MapBuilder {
    fn with_capacity(len: usize) -> Self {
        MapBuilder {
            entries: Vec::with_capacity(len),
            pending_key: None,
        }
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), NodeError> {
        self.entries
            .push((Node::String(key.to_owned()), to_node(value)?));
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), NodeError> {
        self.pending_key = Some(to_node(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| NodeError::new("map value serialized before its key"))?;
        self.entries.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(Node::Map(self.entries))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), NodeError> {
        self.field(key, value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(Node::Map(self.entries))
    }
}

/// Content of a tuple or struct variant, tagged with the variant name on `end`.
pub(crate) struct VariantBuilder<B> {
    variant: &'static str,
    content: B,
}

impl ser::SerializeTupleVariant for VariantBuilder<SeqBuilder> {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        ser::SerializeSeq::serialize_element(&mut self.content, value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(tagged(self.variant, Node::Seq(self.content.0)))
    }
}

impl ser::SerializeStructVariant for VariantBuilder<MapBuilder> {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), NodeError> {
        self.content.field(key, value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(tagged(self.variant, Node::Map(self.content.entries)))
    }
}
