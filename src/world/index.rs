//! Membership queries over the set of known entities.

use super::entity::{Entity, EntityId};
use crate::devices::StorageNode;

/// Read-only query interface over every entity known to the simulation.
///
/// Implementations yield only single-part entities; assemblies with zero or
/// several parts are never members. No ordering is guaranteed.
pub trait MembershipIndex {
    /// Returns every single-part entity for which `predicate` holds.
    fn find_matching<P>(&self, predicate: P) -> Vec<&Entity>
    where
        P: Fn(&Entity) -> bool;
}

/// In-memory entity registry.
///
/// Storage nodes are lent out one at a time while they tick so that no node
/// ever holds a mutable reference into another node.
#[derive(Debug, Default, Clone)]
pub struct World {
    entities: Vec<Entity>,
    next_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next entity identifier.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts an entity and returns its identifier.
    ///
    /// # Panics
    ///
    /// Panics if an entity with the same identifier is already present.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        assert!(
            self.get(entity.id).is_none(),
            "duplicate entity id {}",
            entity.id
        );
        self.next_id = self.next_id.max(entity.id.0 + 1);
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Identifiers of all entities carrying a storage node, in insertion order.
    pub fn storage_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.storage.is_some())
            .map(|e| e.id)
            .collect()
    }

    /// Removes the storage node from entity `id` so it can be updated
    /// against a read-only view of the rest of the world.
    pub fn take_storage(&mut self, id: EntityId) -> Option<StorageNode> {
        self.get_mut(id).and_then(|e| e.storage.take())
    }

    /// Returns a storage node previously obtained with [`World::take_storage`].
    pub fn restore_storage(&mut self, id: EntityId, node: StorageNode) {
        if let Some(e) = self.get_mut(id) {
            e.storage = Some(node);
        }
    }
}

impl MembershipIndex for World {
    fn find_matching<P>(&self, predicate: P) -> Vec<&Entity>
    where
        P: Fn(&Entity) -> bool,
    {
        self.entities
            .iter()
            .filter(|e| e.parts == 1 && predicate(e))
            .collect()
    }
}
