//! Rejects requests whose `Host` header is not on the allow-list.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;

/// Host patterns: `*` matches anything, `*.example.com` matches any
/// subdomain of example.com, anything else must match exactly.
#[derive(Debug, Clone)]
pub struct TrustedHosts {
    patterns: Arc<Vec<String>>,
}

impl TrustedHosts {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: Arc::new(patterns.iter().map(|p| p.to_ascii_lowercase()).collect()),
        }
    }

    pub fn allows(&self, host: &str) -> bool {
        let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();
        self.patterns.iter().any(|pattern| {
            pattern == "*"
                || match pattern.strip_prefix('*') {
                    Some(suffix) => host.ends_with(suffix),
                    None => *pattern == host,
                }
        })
    }
}

pub async fn enforce_trusted_host(
    State(hosts): State<TrustedHosts>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !hosts.allows(host) {
        return Err(AppError::InvalidHost);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(patterns: &[&str]) -> TrustedHosts {
        TrustedHosts::new(&patterns.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_exact_match_ignores_port_and_case() {
        let trusted = hosts(&["api.example.com"]);
        assert!(trusted.allows("api.example.com"));
        assert!(trusted.allows("API.example.com:443"));
        assert!(!trusted.allows("example.com"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let trusted = hosts(&["*.example.com"]);
        assert!(trusted.allows("www.example.com"));
        assert!(!trusted.allows("example.com"));
        assert!(!trusted.allows("evil-example.com"));
    }

    #[test]
    fn test_star_allows_everything() {
        let trusted = hosts(&["*"]);
        assert!(trusted.allows("anything.test"));
        assert!(trusted.allows(""));
    }

    #[test]
    fn test_empty_host_rejected_without_star() {
        assert!(!hosts(&["example.com"]).allows(""));
    }
}
