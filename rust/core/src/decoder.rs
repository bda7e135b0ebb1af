// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Entities are located once by byte range and only tokenized when something
//! asks for them. Decoded entities are cached behind `Arc` so repeated lookups
//! of shared resources (points, directions, profiles) are cheap.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::parser::{parse_entity, EntityScanner};
use crate::schema::{AttributeValue, DecodedEntity, IfcType};

/// Entity id -> byte range `(start, end)` of its `#id=...;` statement
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build the entity index with a single scan of the DATA section.
///
/// Later duplicates of an id overwrite earlier ones.
pub fn build_entity_index(content: &str) -> EntityIndex {
    let mut index =
        FxHashMap::with_capacity_and_hasher(content.len() / 50, Default::default());
    for entity in EntityScanner::new(content) {
        index.insert(entity.id, (entity.start, entity.end));
    }
    index
}

/// Lazy entity decoder. Not `Sync`: create one per worker and share the index.
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    entity_index: Option<Arc<EntityIndex>>,
}

impl<'a> EntityDecoder<'a> {
    /// Create a decoder; the index is built on first lookup
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: None,
        }
    }

    /// Create a decoder over a shared, pre-built index
    pub fn with_index(content: &'a str, index: Arc<EntityIndex>) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: Some(index),
        }
    }

    fn index(&mut self) -> &EntityIndex {
        let content = self.content;
        self.entity_index
            .get_or_insert_with(|| Arc::new(build_entity_index(content)))
    }

    /// Decode the statement at a byte range
    pub fn decode_at(&mut self, start: usize, end: usize) -> Result<Arc<DecodedEntity>> {
        let line = self
            .content
            .get(start..end)
            .ok_or_else(|| Error::parse(start, "entity range out of bounds"))?;
        let (id, type_name, tokens) = parse_entity(line)
            .map_err(|e| Error::parse(start, e.to_string()))?;

        if let Some(cached) = self.cache.get(&id) {
            return Ok(Arc::clone(cached));
        }

        let attributes = tokens.iter().map(AttributeValue::from_token).collect();
        let entity = Arc::new(DecodedEntity::new(
            id,
            IfcType::from_step_name(type_name),
            attributes,
        ));
        self.cache.insert(id, Arc::clone(&entity));
        Ok(entity)
    }

    /// Decode entity by id (O(1) index lookup, cached)
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<Arc<DecodedEntity>> {
        if let Some(cached) = self.cache.get(&entity_id) {
            return Ok(Arc::clone(cached));
        }

        let (start, end) = self
            .index()
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        self.decode_at(start, end)
    }

    /// Resolve every reference in a list attribute
    pub fn resolve_ref_list(&mut self, attr: &AttributeValue) -> Result<Vec<Arc<DecodedEntity>>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::parse(0, "expected a list of references"))?;

        list.iter()
            .filter_map(|item| item.as_entity_ref())
            .map(|id| self.decode_by_id(id))
            .collect()
    }

    /// Raw statement text `#id=...;`
    pub fn get_raw_content(&mut self, entity_id: u32) -> Option<&'a str> {
        let (start, end) = self.index().get(&entity_id).copied()?;
        self.content.get(start..end)
    }

    /// Get cached entity (without decoding)
    pub fn get_cached(&self, entity_id: u32) -> Option<Arc<DecodedEntity>> {
        self.cache.get(&entity_id).cloned()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
