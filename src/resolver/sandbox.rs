//! Cloud dev-sandbox hostname rewriting.
//!
//! Sandboxes expose each forwarded port as its own subdomain, e.g.
//! `name-5173.app.github.dev` for the front-end and `name-8000.app.github.dev`
//! for the backend. Only HTTPS is forwarded.

use crate::config::EnvironmentConfig;
use crate::resolver::origin::Origin;

/// Whether `hostname` belongs to the configured sandbox domain.
///
/// Only a bare host qualifies: anything carrying a path, port, userinfo or
/// inner whitespace is rejected.
pub fn is_sandbox_host(hostname: &str, env: &EnvironmentConfig) -> bool {
    let host = hostname.trim();
    let suffix = env.sandbox_domain_suffix.to_ascii_lowercase();
    is_bare_host(host) && !suffix.is_empty() && host.to_ascii_lowercase().ends_with(&suffix)
}

fn is_bare_host(host: &str) -> bool {
    !host.is_empty()
        && !host
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '@' | '?' | '#') || c.is_whitespace())
}

/// Derive the backend origin for a sandbox-hosted page, if `hostname` is one.
pub fn sandbox_backend_origin(hostname: &str, env: &EnvironmentConfig) -> Option<Origin> {
    if !is_sandbox_host(hostname, env) {
        return None;
    }

    let host = hostname.trim().to_ascii_lowercase();
    let frontend = format!("-{}.", env.sandbox_frontend_port);
    let backend = format!("-{}.", env.sandbox_backend_port);
    let rewritten = host.replacen(&frontend, &backend, 1);

    match Origin::parse(&format!("https://{}", rewritten)) {
        Ok(origin) => Some(origin),
        Err(e) => {
            tracing::warn!(hostname = %hostname, error = %e, "Sandbox hostname did not form a valid origin");
            None
        }
    }
}
