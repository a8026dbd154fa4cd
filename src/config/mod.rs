//! Cascading configuration.
//!
//! Configuration is a generic [`ConfigNode`] tree (the loader that parses
//! some file format into it is the host's business). Controls resolve
//! properties against it through the [`ConfigResolver`], which cascades
//! over candidate paths built from the control's name chain and kind
//! chains, decodes hits per semantic type, and caches successes.

pub mod convert;
pub mod resolve;

pub use convert::{FromConfig, Semantic, Value};
pub use resolve::{ConfigResolver, ScopeLevel};

use rustc_hash::FxHashMap;

/// A format-agnostic configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// String key to node; key order carries no meaning.
    Mapping(FxHashMap<String, ConfigNode>),
    /// Ordered sequence, indexable by decimal path segments.
    Collection(Vec<ConfigNode>),
    /// Leaf string.
    Value(String),
}

impl ConfigNode {
    /// An empty mapping, the usual root.
    pub fn mapping() -> ConfigNode {
        ConfigNode::Mapping(FxHashMap::default())
    }

    pub fn value(raw: impl Into<String>) -> ConfigNode {
        ConfigNode::Value(raw.into())
    }

    /// Inserts a leaf at a dotted path, creating intermediate mappings.
    ///
    /// Replaces any non-mapping node along the way; handy for building
    /// trees in tests and demos.
    pub fn set(&mut self, dotted: &str, raw: &str) {
        let mut node = self;
        let mut segments = dotted.split('.').peekable();
        while let Some(segment) = segments.next() {
            if !matches!(node, ConfigNode::Mapping(_)) {
                *node = ConfigNode::mapping();
            }
            let ConfigNode::Mapping(map) = node else {
                unreachable!()
            };
            let entry = map
                .entry(segment.to_string())
                .or_insert_with(ConfigNode::mapping);
            if segments.peek().is_none() {
                *entry = ConfigNode::value(raw);
                return;
            }
            node = entry;
        }
    }

    /// Walks a dotted path. Decimal segments index collections.
    pub fn get_path(&self, dotted: &str) -> Option<&ConfigNode> {
        let mut node = self;
        for segment in dotted.split('.') {
            node = match node {
                ConfigNode::Mapping(map) => map.get(segment)?,
                ConfigNode::Collection(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                ConfigNode::Value(_) => return None,
            };
        }
        Some(node)
    }

    /// The leaf string at a dotted path, if the path lands on a value.
    pub fn string_at(&self, dotted: &str) -> Option<&str> {
        match self.get_path(dotted)? {
            ConfigNode::Value(raw) => Some(raw),
            _ => None,
        }
    }
}
