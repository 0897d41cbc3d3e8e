// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notice;
pub mod sorter;
pub mod telemetry;
pub mod transport;

// ---- Re-exports for stable public API ----
pub use crate::config::{ClientConfig, VariantConfig};
pub use crate::controller::{classify, RequestController, RequestState};
pub use crate::error::{AnalysisError, ErrorKind};
pub use crate::model::{AnalysisRequest, Article, Language, ResultSet, WireRequest};
pub use crate::sorter::{ResultSorter, SortKey, SortState};
pub use crate::transport::{HttpTransport, Transport, TransportResponse};
