use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of "now" for time-based policies
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Suspension used by loops that back off between platform calls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
