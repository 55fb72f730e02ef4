//! Periodic task scheduler
//!
//! Background maintenance runs at fixed intervals. Add new tasks by
//! implementing the `PeriodicTask` trait. The scheduler owns its spawned
//! handles so shutdown paths and tests can stop it.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::db::DbConn;
use crate::middleware::rate_limit::RateLimiter;

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// How often to run (e.g., every 1 hour)
    fn interval(&self) -> Duration;

    /// Execute the task
    async fn run(&self, db: &DbConn) -> anyhow::Result<()>;
}

pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the standard maintenance tasks
    pub fn start(db: Arc<DbConn>, limiters: Vec<RateLimiter>) -> Self {
        let tasks: Vec<Box<dyn PeriodicTask>> = vec![
            Box::new(OtpCleanupTask),
            Box::new(RateLimiterPurgeTask { limiters }),
        ];

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                run_task(task, db).await;
            }));
        }

        tracing::info!("Periodic task scheduler started");
        Self { handles }
    }

    /// Stop all spawned tasks
    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
        tracing::info!("Periodic task scheduler stopped");
    }
}

/// Run a single task on its interval
async fn run_task(task: Box<dyn PeriodicTask>, db: Arc<DbConn>) {
    let mut ticker = interval(task.interval());

    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        ticker.tick().await;

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run(&db).await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

// ============================================================================
// OTP Cleanup Task
// ============================================================================

use crate::models::otp_code;
use crate::models::prelude::*;
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

/// Deletes OTP rows whose validity window has passed
struct OtpCleanupTask;

#[async_trait]
impl PeriodicTask for OtpCleanupTask {
    fn name(&self) -> &'static str {
        "otp_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60 * 60) // Every hour
    }

    async fn run(&self, db: &DbConn) -> anyhow::Result<()> {
        let deleted = OtpCode::delete_many()
            .filter(otp_code::Column::ExpiresAt.lt(Utc::now()))
            .exec(db)
            .await?;

        if deleted.rows_affected > 0 {
            tracing::info!(deleted = deleted.rows_affected, "Cleaned up expired OTPs");
        }

        Ok(())
    }
}

// ============================================================================
// Rate Limiter Purge Task
// ============================================================================

/// Drops request-count buckets whose window has rolled over
struct RateLimiterPurgeTask {
    limiters: Vec<RateLimiter>,
}

#[async_trait]
impl PeriodicTask for RateLimiterPurgeTask {
    fn name(&self) -> &'static str {
        "rate_limiter_purge"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(15 * 60)
    }

    async fn run(&self, _db: &DbConn) -> anyhow::Result<()> {
        for limiter in &self.limiters {
            limiter.purge_stale().await;
        }
        Ok(())
    }
}
