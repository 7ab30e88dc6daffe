//! Path-pattern firewall: matches requests against ordered protection
//! areas and runs the area's authenticator before letting a handler run.

use std::sync::Arc;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::SecurityError;
use crate::http::{Handler, Request, Response};
use crate::oauth::authenticator::BearerAuthenticator;
use crate::security::{GuardToken, SecurityContext};

/// The closed set of authentication strategies an area can use.
pub enum Authenticator {
    /// Resolve a bearer token through the access token store.
    Bearer(BearerAuthenticator),
    /// Always succeeds with an anonymous identity. Declared-open areas use
    /// this so the firewall never special-cases a missing authenticator.
    Open,
}

impl Authenticator {
    pub async fn authenticate(&self, request: &Request) -> Result<GuardToken, SecurityError> {
        match self {
            Authenticator::Bearer(bearer) => bearer.authenticate(request).await,
            Authenticator::Open => Ok(GuardToken::anonymous()),
        }
    }
}

/// One protection rule: a compiled path pattern, a secure flag and the
/// authenticator guarding it. Immutable after startup.
pub struct Area {
    pattern: Regex,
    secure: bool,
    authenticator: Option<Arc<Authenticator>>,
}

impl Area {
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn secure(&self) -> bool {
        self.secure
    }
}

/// Configuration problems caught before traffic is served.
#[derive(Debug, Error)]
pub enum FirewallConfigError {
    #[error("invalid area pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("secure area {pattern:?} has no authenticator")]
    MissingAuthenticator { pattern: String },
}

struct AreaSpec {
    pattern: String,
    secure: bool,
    authenticator: Option<Arc<Authenticator>>,
}

/// Collects areas in evaluation order and validates the whole
/// configuration in [`FirewallBuilder::build`].
pub struct FirewallBuilder {
    enabled: bool,
    areas: Vec<AreaSpec>,
}

impl FirewallBuilder {
    pub fn new() -> Self {
        FirewallBuilder {
            enabled: true,
            areas: Vec::new(),
        }
    }

    /// A disabled firewall forwards every request untouched. Development
    /// toggle; leave enabled in production.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds an area that lets matching requests pass without identity
    /// resolution.
    pub fn open_area(self, pattern: impl Into<String>) -> Self {
        self.area(pattern, false, None)
    }

    /// Adds an area that requires the given authenticator to succeed.
    pub fn secure_area(
        self,
        pattern: impl Into<String>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        self.area(pattern, true, Some(authenticator))
    }

    /// Raw form for configuration loaded from outside; `build` verifies the
    /// combination.
    pub fn area(
        mut self,
        pattern: impl Into<String>,
        secure: bool,
        authenticator: Option<Arc<Authenticator>>,
    ) -> Self {
        self.areas.push(AreaSpec {
            pattern: pattern.into(),
            secure,
            authenticator,
        });
        self
    }

    /// Compiles every pattern once and rejects a secure area without an
    /// authenticator, so a misconfiguration fails at startup rather than on
    /// the first matching request.
    pub fn build(self) -> Result<Firewall, FirewallConfigError> {
        let mut areas = Vec::with_capacity(self.areas.len());
        for spec in self.areas {
            if spec.secure && spec.authenticator.is_none() {
                return Err(FirewallConfigError::MissingAuthenticator {
                    pattern: spec.pattern,
                });
            }
            let pattern =
                Regex::new(&spec.pattern).map_err(|source| FirewallConfigError::InvalidPattern {
                    pattern: spec.pattern.clone(),
                    source,
                })?;
            areas.push(Area {
                pattern,
                secure: spec.secure,
                authenticator: spec.authenticator,
            });
        }
        Ok(Firewall {
            enabled: self.enabled,
            areas,
        })
    }
}

impl Default for FirewallBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware deciding, per request, whether the wrapped handler may run.
pub struct Firewall {
    enabled: bool,
    areas: Vec<Area>,
}

impl Firewall {
    pub fn builder() -> FirewallBuilder {
        FirewallBuilder::new()
    }

    /// Evaluates areas in configured order; the first pattern matching the
    /// request path wins. A path no area claims is denied.
    pub async fn handle(&self, mut request: Request, next: Handler) -> Response {
        if !self.enabled {
            return next(request).await;
        }
        for area in &self.areas {
            if !area.matches(request.path()) {
                continue;
            }
            if !area.secure {
                return next(request).await;
            }
            let Some(authenticator) = &area.authenticator else {
                // Unreachable through the builder; refuse rather than allow
                // if it is ever constructed another way.
                warn!(pattern = area.pattern(), "secure area without authenticator, refusing");
                return SecurityError::AccessDenied.into_response();
            };
            return match authenticator.authenticate(&request).await {
                Ok(token) => {
                    debug!(provider = token.provider(), "authentication succeeded");
                    request.params.set(SecurityContext { token });
                    next(request).await
                }
                Err(err) => err.into_response(),
            };
        }
        SecurityError::AccessDenied.into_response()
    }
}
