//! Connector configuration loading and resolution.

pub mod loader;

pub use loader::{
    load_source_settings, resolve_retry, resolve_sink, resolve_source, ResolvedSink,
    ResolvedSource,
};
