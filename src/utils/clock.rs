use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// Wall clock time in the user's timezone. Paydays and working hours are all local.
    fn local_time(&self) -> NaiveDateTime {
        self.time().with_timezone(&Local).naive_local()
    }

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: tokio::time::Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock frozen at a local moment for tests. Sleeping still goes through tokio, so paused time
/// drives the tick loop.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedClock {
    local: NaiveDateTime,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self { local }
    }
}

#[cfg(test)]
#[async_trait]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.local
            .and_local_timezone(Local)
            .earliest()
            .map(|v| v.with_timezone(&Utc))
            .unwrap_or_else(|| self.local.and_utc())
    }

    fn local_time(&self) -> NaiveDateTime {
        self.local
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
