use crate::attribute::{AttributeRef, Metadata};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Identity capability: anything that belongs to an owning entity under an
/// attribute name.
///
/// `id` and `name` are projections of the ref (default methods), so they can
/// never disagree with it.
pub trait HasIdentity {
    fn attribute_ref(&self) -> &AttributeRef;

    /// Owning entity id.
    fn id(&self) -> &str {
        &self.attribute_ref().owner_id
    }

    /// Attribute name.
    fn name(&self) -> &str {
        &self.attribute_ref().name
    }
}

/// Value capability: a current value with its timestamp.
pub trait HasValue {
    /// Current value; `None` means no value has been assigned yet.
    fn value(&self) -> Option<&Value>;

    /// Epoch milliseconds of the last transition.
    fn timestamp(&self) -> i64;

    /// Typed view of the current value.
    ///
    /// Returns `None` both when no value is set and when the value does not
    /// deserialize as `T` — the two cases are indistinguishable to callers.
    fn value_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.value()
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Metadata capability: read-only view over the attached metadata entries.
pub trait HasMetadata {
    fn metadata(&self) -> &Metadata;

    /// Looks up a single metadata entry by key.
    fn meta_item(&self, key: &str) -> Option<&Value> {
        self.metadata().get(key)
    }
}
