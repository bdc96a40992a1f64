//! Id-keyed particle collection.
//!
//! The registry is the only owner of [`ParticleRecord`]s. Everything else
//! (the focus slot, the renderer, the pointer hit-test) refers to particles
//! by [`ParticleId`]. Ids increase monotonically and are never reused.

use std::collections::HashMap;

use crate::particle::{ParticleId, ParticleKind, ParticleLayout, ParticleRecord};
use crate::photos::PhotoHandle;

/// Ordered collection of particles with O(1) lookup by id.
#[derive(Debug, Default)]
pub struct ParticleRegistry {
    records: Vec<ParticleRecord>,
    index: HashMap<ParticleId, usize>,
    next_id: u32,
}

impl ParticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Register a new particle and return its id.
    pub fn insert(&mut self, kind: ParticleKind, layout: ParticleLayout, payload: Option<PhotoHandle>) -> ParticleId {
        let id = ParticleId::new(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.records.len());
        self.records.push(ParticleRecord::new(id, kind, layout, payload));
        id
    }

    /// Remove a particle, keeping the relative order of the rest.
    pub fn remove(&mut self, id: ParticleId) -> Option<ParticleRecord> {
        let slot = self.index.remove(&id)?;
        let record = self.records.remove(slot);
        for record in &self.records[slot..] {
            if let Some(i) = self.index.get_mut(&record.id()) {
                *i -= 1;
            }
        }
        Some(record)
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    #[inline]
    pub fn contains(&self, id: ParticleId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.records.iter()
    }

    /// Mutable access for the engine tick.
    pub(crate) fn records_mut(&mut self) -> &mut [ParticleRecord] {
        &mut self.records
    }

    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// Ids of all PHOTO particles, in insertion order.
    pub fn photo_ids(&self) -> Vec<ParticleId> {
        self.records
            .iter()
            .filter(|r| r.is_photo())
            .map(|r| r.id())
            .collect()
    }

    pub fn count_of(&self, kind: ParticleKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }
}
