// Adapters layer: concrete implementations for external systems (key-value storage, http).

pub mod kv;

#[cfg(feature = "server")]
pub mod http;
