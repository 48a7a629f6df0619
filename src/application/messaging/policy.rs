//! Response policies - wrappers that decide whether a handler gets to run

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::context::{Context, Handler, HandlerResult, Outcome};
use crate::application::errors::BotError;
use crate::domain::traits::Clock;

/// Rolls are drawn from `0..ROLL_RANGE`, so a probability of 99 or more always fires
pub const ROLL_RANGE: u32 = 99;

type Roller = Box<dyn Fn() -> u32 + Send + Sync>;

fn thread_roll() -> u32 {
    rand::thread_rng().gen_range(0..ROLL_RANGE)
}

/// Where a policy reads its probability and interval from.
///
/// Both are asked for on every call, so a source backed by a file sees
/// edits on the next message.
#[async_trait]
pub trait PolicyLimits: Send + Sync {
    async fn probability(&self) -> Result<u32, BotError>;
    async fn interval(&self) -> Result<Duration, BotError>;
}

/// Limits that never change
#[derive(Debug, Clone, Copy)]
pub struct FixedLimits {
    pub probability: u32,
    pub interval: Duration,
}

impl FixedLimits {
    pub fn new(probability: u32, interval: Duration) -> Self {
        Self { probability, interval }
    }
}

#[async_trait]
impl PolicyLimits for FixedLimits {
    async fn probability(&self) -> Result<u32, BotError> {
        Ok(self.probability)
    }

    async fn interval(&self) -> Result<Duration, BotError> {
        Ok(self.interval)
    }
}

/// Fires the inner handler with a percent chance per call. Keeps no state.
pub struct ProbabilityGate<H> {
    inner: H,
    limits: Arc<dyn PolicyLimits>,
    roll: Roller,
}

impl<H: Handler> ProbabilityGate<H> {
    pub fn new(inner: H, probability: u32) -> Self {
        Self::with_limits(inner, Arc::new(FixedLimits::new(probability, Duration::ZERO)))
    }

    pub fn with_limits(inner: H, limits: Arc<dyn PolicyLimits>) -> Self {
        Self {
            inner,
            limits,
            roll: Box::new(thread_roll),
        }
    }

    /// Replace the random roll, e.g. with a fixed sequence in tests
    pub fn with_roller<F>(mut self, roll: F) -> Self
    where
        F: Fn() -> u32 + Send + Sync + 'static,
    {
        self.roll = Box::new(roll);
        self
    }
}

#[async_trait]
impl<H: Handler> Handler for ProbabilityGate<H> {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let probability = self.limits.probability().await?;
        let roll = (self.roll)();
        if roll < probability {
            self.inner.handle(ctx).await
        } else {
            tracing::debug!(
                "[{}] probability gate closed (rolled {} against {})",
                ctx.channel(),
                roll,
                probability
            );
            Ok(Outcome::Skipped)
        }
    }
}

/// Fires the inner handler at most once per interval.
///
/// The last-fired stamp starts at the epoch and only moves forward, and only
/// after the inner handler returned `Outcome::Responded`.
pub struct Throttle<H> {
    inner: H,
    limits: Arc<dyn PolicyLimits>,
    clock: Arc<dyn Clock>,
    last_fired_ms: Mutex<i64>,
}

impl<H: Handler> Throttle<H> {
    pub fn new(inner: H, interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(inner, Arc::new(FixedLimits::new(100, interval)), clock)
    }

    pub fn with_limits(inner: H, limits: Arc<dyn PolicyLimits>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            limits,
            clock,
            last_fired_ms: Mutex::new(0),
        }
    }

    /// Milliseconds since the epoch of the last successful response
    pub async fn last_fired_ms(&self) -> i64 {
        *self.last_fired_ms.lock().await
    }
}

#[async_trait]
impl<H: Handler> Handler for Throttle<H> {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        // Held across the inner call so concurrent dispatches of the same
        // category see one consistent stamp.
        let mut last = self.last_fired_ms.lock().await;

        let now = self.clock.now().timestamp_millis();
        let interval = self.limits.interval().await?;
        let interval = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        if now.saturating_sub(*last) < interval {
            tracing::debug!(
                "[{}] throttled, {}ms left",
                ctx.channel(),
                interval - now.saturating_sub(*last)
            );
            return Ok(Outcome::Skipped);
        }

        let outcome = self.inner.handle(ctx).await?;
        if outcome == Outcome::Responded {
            *last = (*last).max(now);
        }
        Ok(outcome)
    }
}

/// Throttle around a probability gate.
///
/// The time window is checked first, so a throttled call never spends a
/// roll, and the window is only restarted when the roll succeeded and the
/// handler responded. Both layers read from the same `limits`.
pub fn throttled_probabilistic<H: Handler>(
    inner: H,
    limits: Arc<dyn PolicyLimits>,
    clock: Arc<dyn Clock>,
) -> Throttle<ProbabilityGate<H>> {
    Throttle::with_limits(ProbabilityGate::with_limits(inner, limits.clone()), limits, clock)
}
