//! Reading typed values back out of a `Node` tree.

use std::vec;

use serde::de::{self, DeserializeSeed, Unexpected, Visitor};
use serde::forward_to_deserialize_any;

use crate::node::{Node, NodeError};

impl<'de> de::Deserializer<'de> for Node {
    type Error = NodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, NodeError> {
        match self {
            Node::Unit => visitor.visit_unit(),
            Node::Bool(v) => visitor.visit_bool(v),
            Node::Int(v) => visitor.visit_i64(v),
            Node::Uint(v) => visitor.visit_u64(v),
            Node::Int128(v) => visitor.visit_i128(v),
            Node::Uint128(v) => visitor.visit_u128(v),
            Node::Float(v) => visitor.visit_f64(v),
            Node::String(v) => visitor.visit_string(v),
            Node::Bytes(v) => visitor.visit_byte_buf(v),
            Node::Option(None) => visitor.visit_none(),
            Node::Option(Some(v)) => visitor.visit_some(*v),
            Node::Seq(items) => visit_seq(items, visitor),
            Node::Map(entries) => visit_map(entries, visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, NodeError> {
        match self {
            Node::Option(None) => visitor.visit_none(),
            Node::Option(Some(v)) => visitor.visit_some(*v),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, NodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, NodeError> {
        match self {
            Node::String(variant) => visitor.visit_enum(EnumNode {
                variant: Node::String(variant),
                content: None,
            }),
            Node::Map(mut entries) if entries.len() == 1 => {
                let (variant, content) = entries.remove(0);
                visitor.visit_enum(EnumNode {
                    variant,
                    content: Some(content),
                })
            }
            other => Err(de::Error::invalid_type(other.unexpected(), &"an enum variant")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn visit_seq<'de, V: Visitor<'de>>(items: Vec<Node>, visitor: V) -> Result<V::Value, NodeError> {
    let len = items.len();
    let mut seq = SeqNodes {
        items: items.into_iter(),
    };
    let value = visitor.visit_seq(&mut seq)?;
    if seq.items.as_slice().is_empty() {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer elements"))
    }
}

fn visit_map<'de, V: Visitor<'de>>(
    entries: Vec<(Node, Node)>,
    visitor: V,
) -> Result<V::Value, NodeError> {
    let len = entries.len();
    let mut map = MapNodes {
        entries: entries.into_iter(),
        value: None,
    };
    let value = visitor.visit_map(&mut map)?;
    if map.entries.as_slice().is_empty() {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer entries"))
    }
}

struct SeqNodes {
    items: vec::IntoIter<Node>,
}

impl<'de> de::SeqAccess<'de> for SeqNodes {
    type Error = NodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, NodeError> {
        self.items
            .next()
            .map(|node| seed.deserialize(node))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapNodes {
    entries: vec::IntoIter<(Node, Node)>,
    value: Option<Node>,
}

impl<'de> de::MapAccess<'de> for MapNodes {
    type Error = NodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, NodeError> {
        match self.entries.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, NodeError> {
        let value = self
            .value
            .take()
            .ok_or_else(|| NodeError::new("map value requested before its key"))?;
        seed.deserialize(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct EnumNode {
    variant: Node,
    content: Option<Node>,
}

impl<'de> de::EnumAccess<'de> for EnumNode {
    type Error = NodeError;
    type Variant = VariantNode;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantNode), NodeError> {
        let variant = seed.deserialize(self.variant)?;
        Ok((variant, VariantNode(self.content)))
    }
}

/// Content of a variant; `None` for a variant written as a bare name.
struct VariantNode(Option<Node>);

impl<'de> de::VariantAccess<'de> for VariantNode {
    type Error = NodeError;

    fn unit_variant(self) -> Result<(), NodeError> {
        match self.0 {
            None | Some(Node::Unit) => Ok(()),
            Some(other) => Err(de::Error::invalid_type(other.unexpected(), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, NodeError> {
        match self.0 {
            Some(content) => seed.deserialize(content),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, NodeError> {
        match self.0 {
            Some(Node::Seq(items)) => visit_seq(items, visitor),
            Some(other) => Err(de::Error::invalid_type(other.unexpected(), &"tuple variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, NodeError> {
        match self.0 {
            Some(Node::Map(entries)) => visit_map(entries, visitor),
            Some(Node::Seq(items)) => visit_seq(items, visitor),
            Some(other) => Err(de::Error::invalid_type(other.unexpected(), &"struct variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"struct variant",
            )),
        }
    }
}
