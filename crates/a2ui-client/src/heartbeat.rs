//! Keep-alive timer.
//!
//! Exists only while the channel is Connected: created on open, dropped on
//! close or disconnect. The first beat fires one full period after open.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Periodic keep-alive schedule.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Interval,
    period: Duration,
}

impl Heartbeat {
    /// Start a schedule whose first beat is `period` from now.
    pub fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    /// The beat period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next beat.
    pub async fn tick(&mut self) {
        let _ = self.interval.tick().await;
    }
}

/// Next beat of an optional schedule; never resolves when there is none.
pub(crate) async fn next_beat(heartbeat: &mut Option<Heartbeat>) {
    match heartbeat {
        Some(hb) => hb.tick().await,
        None => std::future::pending().await,
    }
}
