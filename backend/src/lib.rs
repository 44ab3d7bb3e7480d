//! REST backend tracking per-day lottery draw results.
//!
//! Layering: `domain` holds entities, ports, and services; `inbound::http`
//! maps HTTP onto the domain; `outbound::persistence` implements the ports
//! against PostgreSQL; `security` wraps credential mechanics.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod security;

pub use doc::ApiDoc;
pub use middleware::Trace;
