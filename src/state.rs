use std::time::Instant;

use crate::db::DbConn;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::sms::SmsNotifier;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub sms: SmsNotifier,

    // Per-route-group fixed-window limiters
    pub otp_limiter: RateLimiter,
    pub verify_limiter: RateLimiter,
    pub general_limiter: RateLimiter,

    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: DbConn, sms: SmsNotifier) -> Self {
        Self {
            db,
            sms,
            otp_limiter: RateLimiter::send_otp(),
            verify_limiter: RateLimiter::verify_otp(),
            general_limiter: RateLimiter::general(),
            started_at: Instant::now(),
        }
    }
}
