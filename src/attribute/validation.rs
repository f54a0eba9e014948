use crate::attribute::AttributeRef;
use std::fmt;

/// Rejected attribute updates. State is left unchanged in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// No attribute is defined under this ref.
    Undefined(AttributeRef),

    /// Timestamp was zero or negative.
    InvalidTimestamp(i64),

    /// Stale write: the update's timestamp is older than the state's.
    OutOfOrder { current: i64, attempted: i64 },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::Undefined(r) => {
                write!(f, "attribute '{}' is not defined", r)
            }
            UpdateError::InvalidTimestamp(ts) => {
                write!(f, "timestamp must be positive, got {}", ts)
            }
            UpdateError::OutOfOrder { current, attempted } => {
                write!(
                    f,
                    "out-of-order update: timestamp {} is older than current {}",
                    attempted, current
                )
            }
        }
    }
}

impl std::error::Error for UpdateError {}

/// Rejected attribute identities.
#[derive(Debug, Clone, PartialEq)]
pub enum RefError {
    EmptyOwnerId,
    InvalidName(String),
}

impl fmt::Display for RefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefError::EmptyOwnerId => write!(f, "owner id is required"),
            RefError::InvalidName(name) => {
                write!(
                    f,
                    "invalid attribute name '{}': must start with a letter and contain only letters, digits, underscores",
                    name
                )
            }
        }
    }
}

impl std::error::Error for RefError {}

/// Validates an attribute ref before it enters the store.
pub fn validate_ref(attribute_ref: &AttributeRef) -> Result<(), RefError> {
    if attribute_ref.owner_id.is_empty() {
        return Err(RefError::EmptyOwnerId);
    }
    if !is_valid_attribute_name(&attribute_ref.name) {
        return Err(RefError::InvalidName(attribute_ref.name.clone()));
    }
    Ok(())
}

/// Validates attribute name format.
///
/// Valid attribute names:
/// - Start with an ASCII letter
/// - Continue with ASCII letters, digits, underscores
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();

    // First character must be a letter
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
