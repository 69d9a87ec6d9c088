//! Simulated entities and the capability sets they expose.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Vec3;
use crate::devices::{ControllerNode, MobileAgent, ProducerNode, StorageNode};

/// Stable identifier of an entity within a [`super::World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A role an entity can play in the power-balancing domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Controller,
    Producer,
    Storage,
    Agent,
}

/// One simulated assembly and the capabilities it carries.
///
/// A single entity may expose several capabilities at once; each one is an
/// optional component rather than a subtype.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    /// Number of physical parts in the assembly. Only single-part entities
    /// take part in membership queries.
    pub parts: usize,
    pub controller: Option<ControllerNode>,
    pub producer: Option<ProducerNode>,
    pub storage: Option<StorageNode>,
    pub agent: Option<MobileAgent>,
}

impl Entity {
    /// Creates a single-part entity with no capabilities.
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            parts: 1,
            controller: None,
            producer: None,
            storage: None,
            agent: None,
        }
    }

    pub fn with_parts(mut self, parts: usize) -> Self {
        self.parts = parts;
        self
    }

    pub fn with_controller(mut self, controller: ControllerNode) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn with_producer(mut self, producer: ProducerNode) -> Self {
        self.producer = Some(producer);
        self
    }

    pub fn with_storage(mut self, storage: StorageNode) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_agent(mut self, agent: MobileAgent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Returns `true` when the entity currently exposes `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Controller => self.controller.is_some(),
            Capability::Producer => self.producer.is_some(),
            Capability::Storage => self.storage.is_some(),
            Capability::Agent => self.agent.is_some(),
        }
    }

    /// Distance from this entity to `point`.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// Capability predicate: entity declares demand and a discovery range.
pub fn is_controller(entity: &Entity) -> bool {
    entity.has(Capability::Controller)
}

/// Capability predicate: entity yields power.
pub fn is_producer(entity: &Entity) -> bool {
    entity.has(Capability::Producer)
}

/// Capability predicate: entity is a storage node that counts toward peers.
pub fn is_storage(entity: &Entity) -> bool {
    entity
        .storage
        .as_ref()
        .is_some_and(StorageNode::counts_as_storage)
}

/// Capability predicate: entity is a mobile agent.
pub fn is_agent(entity: &Entity) -> bool {
    entity.has(Capability::Agent)
}
