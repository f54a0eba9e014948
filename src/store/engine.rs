use crate::attribute::{
    validate_ref, AttributeRef, AttributeState, Metadata, RefError, UpdateError, UpdateOutcome,
};
use crate::store::events::{AttributeRemoved, AttributeUpdate};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// Rejected attribute definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum DefineError {
    InvalidRef(RefError),
    AlreadyDefined(AttributeRef),
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::InvalidRef(e) => write!(f, "invalid attribute ref: {}", e),
            DefineError::AlreadyDefined(r) => {
                write!(f, "attribute '{}' is already defined", r)
            }
        }
    }
}

impl std::error::Error for DefineError {}

impl From<RefError> for DefineError {
    fn from(e: RefError) -> Self {
        DefineError::InvalidRef(e)
    }
}

/// In-memory attribute store.
///
/// Holds one [`AttributeState`] snapshot per [`AttributeRef`] and applies the
/// two-slot shift discipline on update. Reads hand out cloned snapshots, so
/// readers never observe a half-applied transition; writes to one attribute
/// are serialized by the map's per-entry lock.
pub struct AttributeStore {
    /// Lock-free concurrent map for fast reads
    attributes: Arc<DashMap<AttributeRef, AttributeState>>,

    /// Broadcast channel for attribute change events
    update_tx: broadcast::Sender<AttributeUpdate>,

    /// Broadcast channel for attribute removal events
    removal_tx: broadcast::Sender<AttributeRemoved>,
}

impl AttributeStore {
    /// Create new attribute store with broadcast channels
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(1000);
        let (removal_tx, _) = broadcast::channel(100);

        Self {
            attributes: Arc::new(DashMap::new()),
            update_tx,
            removal_tx,
        }
    }

    /// Define a new attribute: validates the ref and creates a fresh state
    /// with no value and `timestamp` set to the current time.
    ///
    /// Fails if an attribute already exists under this ref.
    pub fn define(
        &self,
        attribute_ref: AttributeRef,
        metadata: Metadata,
    ) -> Result<AttributeState, DefineError> {
        validate_ref(&attribute_ref)?;

        let now = Utc::now().timestamp_millis();

        match self.attributes.entry(attribute_ref.clone()) {
            Entry::Occupied(_) => Err(DefineError::AlreadyDefined(attribute_ref)),
            Entry::Vacant(vacant) => {
                let state = AttributeState::new(attribute_ref.clone(), now).with_metadata(metadata);
                vacant.insert(state.clone());
                info!(attribute = %attribute_ref, "Attribute defined");
                Ok(state)
            }
        }
    }

    /// Update an attribute's value (core state mutation).
    ///
    /// Applies the shift under the entry lock — one writer at a time per
    /// attribute — then publishes the new snapshot and broadcasts the change.
    ///
    /// Returns `Ok(None)` for a duplicate write (same value at the current
    /// timestamp): state unchanged, nothing broadcast.
    pub fn update(
        &self,
        attribute_ref: &AttributeRef,
        value: Value,
        timestamp: i64,
    ) -> Result<Option<AttributeUpdate>, UpdateError> {
        let mut entry = self
            .attributes
            .get_mut(attribute_ref)
            .ok_or_else(|| UpdateError::Undefined(attribute_ref.clone()))?;

        match entry.apply(value, timestamp) {
            Ok(UpdateOutcome::Applied(next)) => {
                let update = AttributeUpdate {
                    update_id: Uuid::now_v7().to_string(),
                    attribute_ref: attribute_ref.clone(),
                    old_value: next.old_value.clone(),
                    old_value_timestamp: next.old_value_timestamp,
                    // the value slot is always filled after a shift
                    new_value: next.value.clone().unwrap_or(Value::Null),
                    timestamp: next.timestamp,
                };
                *entry = next;
                // Send while the entry guard is held so per-attribute
                // broadcast order matches application order; broadcast::send
                // never blocks
                let _ = self.update_tx.send(update.clone());
                Ok(Some(update))
            }
            Ok(UpdateOutcome::Unchanged) => Ok(None),
            Err(e) => {
                warn!(attribute = %attribute_ref, error = %e, "Update rejected");
                Err(e)
            }
        }
    }

    /// Get a snapshot of one attribute's state.
    pub fn get(&self, attribute_ref: &AttributeRef) -> Option<AttributeState> {
        self.attributes.get(attribute_ref).map(|s| s.clone())
    }

    /// Get all attribute snapshots, sorted by identity (owner id, then name)
    /// so bulk reads are deterministic regardless of insertion order.
    pub fn all(&self) -> Vec<AttributeState> {
        let mut states: Vec<AttributeState> =
            self.attributes.iter().map(|s| s.value().clone()).collect();
        states.sort_by(|a, b| a.compare(b));
        states
    }

    /// Get all attribute snapshots for one owning entity, sorted by name.
    pub fn for_owner(&self, owner_id: &str) -> Vec<AttributeState> {
        let mut states: Vec<AttributeState> = self
            .attributes
            .iter()
            .filter(|s| s.key().owner_id == owner_id)
            .map(|s| s.value().clone())
            .collect();
        states.sort_by(|a, b| a.compare(b));
        states
    }

    /// Remove an attribute definition.
    pub fn remove(&self, attribute_ref: &AttributeRef) -> Option<AttributeState> {
        let removed = self
            .attributes
            .remove(attribute_ref)
            .map(|(_, state)| state);

        if removed.is_some() {
            let _ = self.removal_tx.send(AttributeRemoved {
                attribute_ref: attribute_ref.clone(),
                timestamp: Utc::now().timestamp_millis(),
            });
            info!(attribute = %attribute_ref, "Attribute removed");
        }

        removed
    }

    /// Remove every attribute belonging to one owning entity (the owning
    /// asset was deleted). Returns the number of attributes removed.
    pub fn remove_owner(&self, owner_id: &str) -> usize {
        let refs: Vec<AttributeRef> = self
            .attributes
            .iter()
            .filter(|s| s.key().owner_id == owner_id)
            .map(|s| s.key().clone())
            .collect();

        refs.iter().filter(|r| self.remove(r).is_some()).count()
    }

    /// Subscribe to attribute change events
    pub fn subscribe(&self) -> broadcast::Receiver<AttributeUpdate> {
        self.update_tx.subscribe()
    }

    /// Subscribe to attribute removal events
    pub fn subscribe_removals(&self) -> broadcast::Receiver<AttributeRemoved> {
        self.removal_tx.subscribe()
    }

    /// Number of defined attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}
