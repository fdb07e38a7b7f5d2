//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Compile the service map into routes with `/api/<name>` prefixes
//! - Reject ambiguous or malformed routes before the server starts
//! - Look up the route for a request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins, independent of registration order
//! - Explicit NoMatch (`None`) rather than silent default

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;
use url::Url;

use crate::config::GatewayConfig;
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::{API_PREFIX, GATEWAY_SERVICE};

/// Reasons a route table cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("invalid service name {0:?}")]
    InvalidName(String),

    #[error("service name {0:?} is reserved by the gateway")]
    ReservedName(String),

    #[error("duplicate route prefix {0}")]
    DuplicatePrefix(String),

    #[error("route prefix {shorter} is a prefix of {longer}")]
    OverlappingPrefix { shorter: String, longer: String },

    #[error("invalid target {url:?} for {service}: {reason}")]
    InvalidTarget {
        service: String,
        url: String,
        reason: String,
    },
}

/// A compiled route: one backend service mounted under `/api/<name>`.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    matcher: PathPrefixMatcher,
    /// Target URL without a trailing slash; the rewritten path is appended.
    base: String,
    authority: Authority,
}

impl Route {
    fn new(name: &str, target: &str) -> Result<Self, RouteTableError> {
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
        if !valid_name {
            return Err(RouteTableError::InvalidName(name.to_string()));
        }
        if name == GATEWAY_SERVICE {
            return Err(RouteTableError::ReservedName(name.to_string()));
        }

        let invalid = |reason: &str| RouteTableError::InvalidTarget {
            service: name.to_string(),
            url: target.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(target).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid("only http:// targets are supported"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("target must not carry a query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("target must not carry credentials"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| invalid(&e.to_string()))?;

        let base = url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            name: name.to_string(),
            matcher: PathPrefixMatcher::new(format!("{API_PREFIX}{name}")),
            base,
            authority,
        })
    }

    /// Service name, used in error bodies, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// Normalized target base URL.
    pub fn target(&self) -> &str {
        &self.base
    }

    /// Host (and explicit port) the forwarded `Host` header is set to.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Full upstream URL for an already rewritten path and optional query.
    pub fn upstream_url(&self, rewritten_path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => format!("{}{}?{}", self.base, rewritten_path, q),
            None => format!("{}{}", self.base, rewritten_path),
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    /// Path with the route prefix removed; `/` when nothing is left.
    pub path: &'a str,
}

/// Immutable prefix → backend table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Sorted longest prefix first.
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from `(service name, base URL)` pairs.
    pub fn build<I, N, U>(services: I) -> Result<Self, RouteTableError>
    where
        I: IntoIterator<Item = (N, U)>,
        N: AsRef<str>,
        U: AsRef<str>,
    {
        let mut routes: Vec<Route> = Vec::new();

        for (name, target) in services {
            let route = Route::new(name.as_ref(), target.as_ref())?;

            for existing in &routes {
                let (a, b) = (existing.prefix(), route.prefix());
                if a == b {
                    return Err(RouteTableError::DuplicatePrefix(a.to_string()));
                }
                if b.starts_with(a) || a.starts_with(b) {
                    let (shorter, longer) = if a.len() < b.len() { (a, b) } else { (b, a) };
                    return Err(RouteTableError::OverlappingPrefix {
                        shorter: shorter.to_string(),
                        longer: longer.to_string(),
                    });
                }
            }

            routes.push(route);
        }

        routes.sort_by(|a, b| {
            b.prefix()
                .len()
                .cmp(&a.prefix().len())
                .then_with(|| a.prefix().cmp(b.prefix()))
        });

        Ok(Self { routes })
    }

    /// Build the table from the `services` section of the config.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, RouteTableError> {
        Self::build(&config.services)
    }

    /// Find the route serving `path`, preferring the longest prefix.
    pub fn match_path<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a>> {
        self.routes.iter().find_map(|route| {
            route
                .matcher
                .rewrite(path)
                .map(|path| RouteMatch { route, path })
        })
    }

    /// Service name → target URL, as reported by the health endpoint.
    pub fn targets(&self) -> BTreeMap<String, String> {
        self.routes
            .iter()
            .map(|r| (r.name.clone(), r.base.clone()))
            .collect()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
