//! Per-IP fixed-window rate limiting
//!
//! Each route group owns a limiter with its own budget. Counts reset when
//! the 15-minute window rolls over; a stale-bucket purge task runs on the
//! scheduler.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;

use crate::error::AppError;

pub const WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<IpAddr, Window>>>,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(max_requests: u32) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
        }
    }

    pub fn send_otp() -> Self {
        Self::new(5)
    }

    pub fn verify_otp() -> Self {
        Self::new(10)
    }

    pub fn general() -> Self {
        Self::new(100)
    }

    /// Count a request. On rejection returns the seconds until the window
    /// resets.
    pub async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;

        let window = buckets.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.count = 0;
            window.started = now;
        }

        if window.count >= self.max_requests {
            let retry_after = WINDOW
                .saturating_sub(now.duration_since(window.started))
                .as_secs()
                .max(1);
            return Err(retry_after);
        }

        window.count += 1;
        Ok(())
    }

    /// Drop buckets whose window has fully elapsed
    pub async fn purge_stale(&self) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        buckets.retain(|_, window| now.duration_since(window.started) < WINDOW);
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(ip) = extract_client_ip(&req) {
        if let Err(retry_after) = limiter.check(ip).await {
            tracing::warn!(ip = %ip, "Rate limit exceeded");
            return Err(AppError::RateLimited { retry_after });
        }
    }

    Ok(next.run(req).await)
}

/// Try ConnectInfo first, then X-Forwarded-For, then X-Real-IP.
fn extract_client_ip(req: &Request) -> Option<IpAddr> {
    if let Some(connect_info) = req.extensions().get::<ConnectInfo<std::net::SocketAddr>>() {
        return Some(connect_info.0.ip());
    }

    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if let Ok(ip) = value.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    None
}
