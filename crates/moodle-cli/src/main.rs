//! Moodle token CLI
//!
//! Single-binary tool that:
//! 1. Loads site and account configuration
//! 2. Logs in (directly or through the site's identity provider) and
//!    acquires a verified web-service token
//! 3. Prints the token to stdout
//!
//! Logs go to stderr so the token stays alone on stdout.

mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodle_auth::acquire_token_with;
use moodle_idp::{Credentials, DispatchMode, ProviderRegistry};
use moodle_ws::{HttpSession, WsClient};

use crate::config::Config;

/// Command-line flags
struct CliArgs {
    config_path: Option<String>,
    best_effort: bool,
    site_info: bool,
}

fn parse_args(args: &[String]) -> CliArgs {
    CliArgs {
        config_path: args
            .iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1))
            .map(|s| s.to_string()),
        best_effort: args.iter().any(|a| a == "--best-effort"),
        site_info: args.iter().any(|a| a == "--site-info"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    info!("starting moodle-token");

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);

    let config_path = Config::resolve_path(cli.config_path.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let password = config
        .auth
        .password
        .as_ref()
        .context("no password configured: set MOODLE_PASSWORD or password_file")?;

    info!(
        wwwroot = %config.server.wwwroot,
        service = %config.server.service,
        username = %config.auth.username,
        "configuration loaded"
    );

    let mode = if cli.best_effort {
        DispatchMode::BestEffort
    } else {
        DispatchMode::Strict
    };

    let session = HttpSession::new().context("failed to build HTTP session")?;
    let credentials = Credentials::new(config.auth.username.as_str(), password.expose().clone());

    let token = acquire_token_with(
        &session,
        &config.server.wwwroot,
        &credentials,
        &config.server.service,
        &ProviderRegistry::with_defaults(),
        mode,
    )
    .await
    .context("token acquisition failed")?;

    println!("{token}");

    if cli.site_info {
        let ws = WsClient::new(&session, config.server.wwwroot.as_str(), token.as_str());
        let site_info = ws
            .call("core_webservice_get_site_info", &serde_json::json!({}))
            .await
            .context("site info call failed")?;
        let sitename = site_info
            .get("sitename")
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        let release = site_info
            .get("release")
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        let username = site_info
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        eprintln!("site: {sitename} ({release}), logged in as {username}");
    }

    Ok(())
}
