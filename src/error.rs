//! Error types shared across the simulator.

use thiserror::Error;

use crate::world::EntityId;

/// Node-level faults that stop a single storage node from operating.
#[derive(Debug, Error, PartialEq)]
pub enum NodeError {
    /// The node's designated resource key is not present in its ledger.
    #[error("node {node}: resource \"{key}\" is not defined in the ledger")]
    UnknownResource {
        /// Node that owns the ledger.
        node: EntityId,
        /// Missing resource key.
        key: String,
    },

    /// A second bootstrap binding was attempted.
    #[error("node {0}: performance modifier is already bound")]
    ModifierAlreadyBound(EntityId),

    /// A saved value cannot be applied to the node.
    #[error("node {node}: saved {field} = {value} is out of range")]
    InvalidSavedState {
        /// Node the state was meant for.
        node: EntityId,
        /// Name of the offending saved field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}

/// A controller's declared power need could not be read as a number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot parse power need \"{raw}\": leading token \"{token}\" is not a number")]
pub struct DemandParseError {
    /// The complete declared value.
    pub raw: String,
    /// The token that failed to parse.
    pub token: String,
}

/// Saving or loading storage-node state failed.
#[derive(Debug, Error)]
pub enum PersistError {
    /// File access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized state could not be produced.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Serialized state could not be read back.
    #[error("TOML parse error: {0}")]
    Deserialize(#[from] toml::de::Error),

    /// A storage node could not report or accept its state.
    #[error(transparent)]
    Node(#[from] NodeError),
}
