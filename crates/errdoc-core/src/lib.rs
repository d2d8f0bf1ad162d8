//! Error document engine
//!
//! Turns an inbound request into a rendered error document: the status code
//! and representation are extracted from the request, the message comes from
//! the [`ErrorCatalog`], and the body is rendered from the layered
//! [`TemplateStore`]. Nothing here depends on a particular HTTP server; the
//! serving layer hands over request parts and gets back an [`ErrorPage`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod catalog;
mod error;
pub mod metrics;
mod negotiate;
mod render;
mod templates;

pub use catalog::{ErrorCatalog, coerce_status, reason_phrase};
pub use error::{Error, Result};
pub use metrics::{MetricsSink, NoopMetrics, protocol_label};
pub use negotiate::{CODE_HEADER, FORMAT_HEADER, MediaRange, Representation, extract_code, negotiate, parse_accept};
pub use render::{ErrorPage, ErrorPageRenderer, Payload, TemplateTable};
pub use templates::{FALLBACK_TEMPLATE, TemplateStore};
