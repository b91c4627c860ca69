//! Access/create telemetry pipeline
//!
//! Derives a structured event record from an inbound request (geolocation,
//! client identity, device/browser classification, referrer, language) and
//! encodes it into the positional blob/double row format of the columnar
//! analytics sink. Extraction and encoding are pure and stateless; the only
//! shared state is the immutable column schema built at startup.

pub mod codec;
pub mod context;
pub mod country;
pub mod logger;
pub mod schema;
pub mod sink;
pub mod user_agent;

pub use codec::EventRecord;
pub use context::RequestContext;
pub use logger::{EventKind, EventLogger};
pub use schema::ColumnSchema;
pub use sink::{AnalyticsSink, DataPoint, MemorySink, TraceSink};
