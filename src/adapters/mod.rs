// Adapters layer: concrete implementations for external systems (storage, versioned archive).

pub mod github;
pub mod local;
