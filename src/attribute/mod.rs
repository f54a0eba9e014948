use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

mod traits;
mod validation;

pub use traits::{HasIdentity, HasMetadata, HasValue};
pub use validation::{is_valid_attribute_name, validate_ref, RefError, UpdateError};

/// Auxiliary key-value annotations attached to an attribute, orthogonal to
/// its value. Keys are unique; insertion order is preserved across reads and
/// serde round trips (serde_json `preserve_order`).
pub type Metadata = serde_json::Map<String, Value>;

/// Identity of an attribute: the owning entity id plus the attribute name.
///
/// Ordering is lexicographic on owner id, then name, which gives collections
/// of attributes a deterministic sort independent of values and timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    /// Owning entity id (e.g., "asset-42")
    pub owner_id: String,

    /// Attribute name (e.g., "temperature")
    pub name: String,
}

impl AttributeRef {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.name)
    }
}

/// One attribute's current value and its immediately-prior value, each with
/// an epoch-millisecond timestamp, plus attached metadata.
///
/// A state is an immutable snapshot: [`AttributeState::apply`] never mutates
/// in place, it produces the successor snapshot. History is deliberately
/// one-step deep (current + previous); anything longer belongs to a
/// datastore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeState {
    /// Attribute identity; fixed at construction
    #[serde(rename = "ref")]
    pub attribute_ref: AttributeRef,

    /// Current value; `None` means no value has been assigned yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Epoch milliseconds of the last transition (creation time if none)
    pub timestamp: i64,

    /// Value immediately prior to the current one; `None` if no prior update
    #[serde(rename = "oldValue", default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    /// Epoch milliseconds of `old_value`; 0 until the first shift
    #[serde(rename = "oldValueTimestamp")]
    pub old_value_timestamp: i64,

    /// Metadata entries, in insertion order
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Result of applying an update to an [`AttributeState`].
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The two-slot shift ran; contains the successor snapshot.
    Applied(AttributeState),

    /// Duplicate write (same value at the current timestamp); no shift.
    Unchanged,
}

impl AttributeState {
    /// Fresh state for a newly defined attribute: no value, no history,
    /// `timestamp` set to the definition time.
    pub fn new(attribute_ref: AttributeRef, created_at: i64) -> Self {
        Self {
            attribute_ref,
            value: None,
            timestamp: created_at,
            old_value: None,
            old_value_timestamp: 0,
            metadata: Metadata::new(),
        }
    }

    /// Attaches metadata at definition time.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Applies an update `(value, timestamp)` and returns the successor
    /// snapshot; `self` is left untouched.
    ///
    /// Transition rules:
    /// - `timestamp <= 0` is rejected as `InvalidTimestamp`
    /// - `timestamp` older than the current one is rejected as `OutOfOrder`
    ///   (stale-write guard)
    /// - the same value at the current timestamp is a no-op (`Unchanged`),
    ///   so retried writes never duplicate a shift
    /// - otherwise the old slot takes the current value/timestamp pair and
    ///   the new pair replaces it, as one transition
    pub fn apply(&self, value: Value, timestamp: i64) -> Result<UpdateOutcome, UpdateError> {
        if timestamp <= 0 {
            return Err(UpdateError::InvalidTimestamp(timestamp));
        }
        if timestamp < self.timestamp {
            return Err(UpdateError::OutOfOrder {
                current: self.timestamp,
                attempted: timestamp,
            });
        }
        if timestamp == self.timestamp && self.value.as_ref() == Some(&value) {
            return Ok(UpdateOutcome::Unchanged);
        }

        Ok(UpdateOutcome::Applied(Self {
            attribute_ref: self.attribute_ref.clone(),
            old_value: self.value.clone(),
            old_value_timestamp: self.timestamp,
            value: Some(value),
            timestamp,
            metadata: self.metadata.clone(),
        }))
    }

    /// Value immediately prior to the current one.
    pub fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    /// Typed view of the prior value; same collapse of "absent" and "wrong
    /// type" as [`HasValue::value_as`].
    pub fn old_value_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.old_value
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Timestamp of the prior value; 0 before the first shift.
    pub fn old_value_timestamp(&self) -> i64 {
        self.old_value_timestamp
    }

    /// Total order by attribute identity (owner id, then name), independent
    /// of values and timestamps. Kept separate from `PartialEq`, which
    /// compares the full snapshot.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.attribute_ref.cmp(&other.attribute_ref)
    }
}

impl HasIdentity for AttributeState {
    fn attribute_ref(&self) -> &AttributeRef {
        &self.attribute_ref
    }
}

impl HasValue for AttributeState {
    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl HasMetadata for AttributeState {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
