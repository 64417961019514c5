//! Ordered name → tag maps.

use crate::{Tag, TagList};

/// An ordered map of named tags.
///
/// Insertion order is preserved and is the order written on the wire, so two
/// documents compare equal only if they hold the same entries in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Tag)>,
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a tag, returning the previous tag stored under `name`.
    ///
    /// Replacing an entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        let name = name.into();
        let tag = tag.into();
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            return Some(std::mem::replace(&mut slot.1, tag));
        }
        self.entries.push((name, tag));
        None
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        self.insert(name, tag);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, tag)| tag)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    /// Nesting depth as counted by [`decode_document`](crate::decode_document).
    ///
    /// The document itself counts as 1; every nested compound and every list
    /// adds one level.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.iter().map(|(_, tag)| tag_depth(tag)).max().unwrap_or(0)
    }
}

fn tag_depth(tag: &Tag) -> usize {
    match tag {
        Tag::Compound(document) => document.depth(),
        Tag::List(list) => list_depth(list),
        _ => 0,
    }
}

fn list_depth(list: &TagList) -> usize {
    1 + list.iter().map(tag_depth).max().unwrap_or(0)
}
