//! Strategy registration and dispatch
//!
//! Strategies are registered once at construction; there is no implicit
//! discovery. Dispatch walks descriptors in the order the server advertised
//! them and, within each descriptor, strategies in registration order, so
//! tie-breaks are deterministic.

use tracing::{debug, warn};
use url::Url;

use moodle_ws::HttpSession;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::strategy::{IdpDescriptor, RwthSingleSignOn, Strategy};

/// How to treat a login failure from a matching provider.
///
/// `Strict` is the default: the first matching provider decides the attempt,
/// so credential problems surface immediately. `BestEffort` keeps trying
/// further matching providers when one fails to authenticate, trading
/// strictness for resilience against partially broken providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    #[default]
    Strict,
    BestEffort,
}

/// Ordered set of registered strategy variants
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    strategies: Vec<Strategy>,
}

impl ProviderRegistry {
    /// Empty registry, for callers composing their own set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in strategy. Registration order (which is
    /// dispatch tie-break order): RWTH single sign-on.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Strategy::RwthSingleSignOn(RwthSingleSignOn));
        registry
    }

    /// Append a strategy; it is considered after everything registered so far.
    pub fn register(&mut self, strategy: Strategy) {
        self.strategies.push(strategy);
    }

    /// Strict dispatch: the first `(strategy, descriptor)` pair where the
    /// strategy is responsible for the descriptor.
    pub fn select<'a>(
        &'a self,
        descriptors: &'a [IdpDescriptor],
    ) -> Result<(&'a Strategy, &'a IdpDescriptor)> {
        for descriptor in descriptors {
            for strategy in &self.strategies {
                if strategy.is_responsible(descriptor) {
                    debug!(
                        provider = %descriptor.name,
                        strategy = strategy.name(),
                        "matched identity provider"
                    );
                    return Ok((strategy, descriptor));
                }
            }
        }
        Err(Error::NoProvider)
    }

    /// Best-effort dispatch: run login for every matching pair in dispatch
    /// order until one succeeds.
    ///
    /// Authentication and parse failures end only that candidate and the
    /// next one is tried; transport failures propagate immediately. With no
    /// match, or every candidate failed, this is [`Error::NoProvider`].
    pub async fn login_any(
        &self,
        session: &HttpSession,
        credentials: &Credentials,
        descriptors: &[IdpDescriptor],
        platform: &Url,
    ) -> Result<Option<String>> {
        for descriptor in descriptors {
            for strategy in &self.strategies {
                if !strategy.is_responsible(descriptor) {
                    continue;
                }
                match strategy.login(session, credentials, descriptor, platform).await {
                    Ok(outcome) => return Ok(outcome),
                    Err(err @ (Error::Auth(_) | Error::Parse(_))) => {
                        warn!(
                            provider = %descriptor.name,
                            strategy = strategy.name(),
                            error = %err,
                            "provider login failed, trying next candidate"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Err(Error::NoProvider)
    }
}
