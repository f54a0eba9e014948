// Attribute state model and validation
pub mod attribute;

// In-memory attribute store and change broadcasting
pub mod store;
