//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup, longest prefix first)
//!     → matcher.rs (segment-boundary prefix match, prefix strip)
//!     → Return: matched Route + rewritten path, or NoMatch
//!
//! Route Compilation (at startup):
//!     services: name → base URL
//!     → one Route per service, prefix /api/<name>
//!     → reject duplicate/overlapping prefixes, bad URLs
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{Route, RouteMatch, RouteTable, RouteTableError};

/// Namespace every route lives under.
pub const API_PREFIX: &str = "/api/";

/// Name reserved for the gateway's own endpoints.
pub const GATEWAY_SERVICE: &str = "gateway";
