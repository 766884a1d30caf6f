//! HTTP plumbing for Moodle web-service endpoints
//!
//! Three thin wrappers over one cookie-bearing client pair:
//! 1. [`HttpSession`] - shared cookie jar behind a redirect-following and a
//!    redirect-capturing client (login flows need both).
//! 2. [`AjaxClient`] - the `/lib/ajax/service.php` batch protocol, usable
//!    without a token (public site configuration lives here).
//! 3. [`WsClient`] - the `/webservice/rest/server.php` protocol, which
//!    requires an acquired `wstoken`.
//!
//! Request parameters nest arbitrarily; [`flatten`] turns them into the
//! PHP-style bracketed form keys the server expects.

pub mod ajax;
pub mod params;
pub mod rest;
pub mod session;

mod error;

pub use ajax::{AjaxClient, AjaxRequest};
pub use error::{Error, Result, WsFault};
pub use params::flatten;
pub use rest::WsClient;
pub use session::HttpSession;
