//! Per-client fixed-window rate limiting, keyed by peer IP address.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::AppError;

pub const CHAT_REQUESTS_PER_MINUTE: u32 = 10;
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Clone)]
pub struct RateLimiter {
    limit: u32,
    windows: Arc<DashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self {
            limit,
            windows: Arc::new(DashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Counts one request from `client`; false once the window is used up.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut window = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }

    /// Drops windows that have fully elapsed.
    pub fn sweep(&self) {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < WINDOW);
        let removed = before.saturating_sub(self.windows.len());
        debug!("Rate limiter sweep: {removed} of {before} windows expired");
    }

    #[cfg(test)]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Peer address from the connection; requests without one share a single bucket.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !limiter.check(client_ip(&request)) {
        return Err(AppError::RateLimited {
            limit: limiter.limit(),
        });
    }
    Ok(next.run(request).await)
}
