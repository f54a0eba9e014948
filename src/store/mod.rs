// Attribute store and change broadcasting

mod engine;
mod events;

pub use engine::{AttributeStore, DefineError};
pub use events::{AttributeRemoved, AttributeUpdate};
