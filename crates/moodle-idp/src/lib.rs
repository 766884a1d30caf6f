//! Federated identity provider strategies
//!
//! A Moodle site that delegates login to external identity providers
//! advertises them in its public configuration. Each strategy here knows
//! how to drive one provider's browser login flow against a shared
//! [`moodle_ws::HttpSession`], leaving the session cookies authenticated so
//! the caller can finish the token handshake. The [`ProviderRegistry`]
//! matches advertised providers to strategies, either strictly (first match
//! decides) or best-effort (keep trying candidates on login failure).

pub mod credentials;
pub mod form;
pub mod registry;
pub mod strategy;

mod error;

pub use credentials::Credentials;
pub use error::{Error, Result};
pub use form::{LoginForm, extract_csrf_token, extract_login_form, unescape};
pub use registry::{DispatchMode, ProviderRegistry};
pub use strategy::{IdpDescriptor, RwthSingleSignOn, Strategy};
