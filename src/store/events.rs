use crate::attribute::AttributeRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute change broadcast to subscribers after a shift is applied.
///
/// Carries the old/new pair that actually transitioned together, so
/// consumers never see an old-slot/new-slot combination that did not exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeUpdate {
    /// UUIDv7 identifier (time-ordered, globally unique)
    #[serde(rename = "updateId")]
    pub update_id: String,

    /// Identity of the attribute that changed
    #[serde(rename = "ref")]
    pub attribute_ref: AttributeRef,

    /// Value before the shift; `None` on the first update
    #[serde(rename = "oldValue", skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    /// Timestamp of the pre-shift value (epoch millis)
    #[serde(rename = "oldValueTimestamp")]
    pub old_value_timestamp: i64,

    /// Value after the shift
    #[serde(rename = "newValue")]
    pub new_value: Value,

    /// Timestamp of the new value (epoch millis)
    pub timestamp: i64,
}

/// Removal event broadcast when an attribute definition is deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRemoved {
    #[serde(rename = "ref")]
    pub attribute_ref: AttributeRef,

    /// Removal time (epoch millis)
    pub timestamp: i64,
}
