//! Repeating tasks and the promotion clock driver

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::domain::aggregates::{ClockReading, PromotionClock};

/// Wall-clock source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A closure run on a fixed period until cancelled or dropped.
#[derive(Debug)]
pub struct RepeatingTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawns `f` on the current runtime. The first run happens immediately; `f`
    /// receives the tick count. Late ticks are skipped rather than replayed.
    pub fn spawn<F>(name: &'static str, period: Duration, mut f: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut tick = 0u64;
            loop {
                interval.tick().await;
                f(tick);
                tick = tick.wrapping_add(1);
            }
        });
        tracing::debug!(task = name, ?period, "repeating task started");
        Self { name, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool { self.handle.as_ref().is_some_and(|h| !h.is_finished()) }

    /// Stops the task. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(task = self.name, "repeating task cancelled");
        }
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) { self.cancel(); }
}

/// Sampling rates for a driven promotion clock.
#[derive(Debug, Clone, Copy)]
pub struct SamplingPlan {
    /// Countdown refresh period.
    pub tick: Duration,
    /// Phase is re-evaluated on every n-th tick.
    pub phase_check_every: u64,
}

impl Default for SamplingPlan {
    fn default() -> Self { Self { tick: Duration::from_secs(1), phase_check_every: 60 } }
}

/// Drives a [`PromotionClock`] from one repeating task and publishes its readings.
#[derive(Debug)]
pub struct ClockDriver {
    task: RepeatingTask,
    readings: watch::Receiver<ClockReading>,
}

impl ClockDriver {
    pub fn start(mut clock: PromotionClock, source: Arc<dyn Clock>, plan: SamplingPlan) -> Self {
        let (tx, readings) = watch::channel(clock.observe(source.now()));
        let every = plan.phase_check_every.max(1);
        let task = RepeatingTask::spawn("promotion-clock", plan.tick, move |tick| {
            let now = source.now();
            let reading = if tick % every == 0 { clock.observe(now) } else { clock.sample(now) };
            for event in clock.take_events() {
                tracing::info!(?event, "promotion event");
            }
            tx.send_replace(reading);
        });
        Self { task, readings }
    }

    pub fn current(&self) -> ClockReading { *self.readings.borrow() }
    pub fn subscribe(&self) -> watch::Receiver<ClockReading> { self.readings.clone() }
    pub fn is_running(&self) -> bool { self.task.is_running() }
    pub fn stop(&mut self) { self.task.cancel(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Phase, PromotionWindow};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn set(&self, t: DateTime<Utc>) { *self.0.lock().unwrap() = t; }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> { *self.0.lock().unwrap() }
    }

    fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 11, 11, 0, 0, 0).unwrap() }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_until_cancelled() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = count.clone();
        let mut task = RepeatingTask::spawn("counter", Duration::from_secs(1), move |_| { seen.fetch_add(1, Ordering::SeqCst); });
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);

        task.cancel();
        task.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(!task.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = count.clone();
        let task = RepeatingTask::spawn("counter", Duration::from_secs(1), move |_| { seen.fetch_add(1, Ordering::SeqCst); });
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(task);
        let before = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_checked_at_slow_rate() {
        let window = PromotionWindow::new(t0() + chrono::Duration::seconds(5), t0() + chrono::Duration::hours(1)).unwrap();
        let source = Arc::new(ManualClock(Mutex::new(t0())));
        let mut driver = ClockDriver::start(
            PromotionClock::new(window),
            source.clone(),
            SamplingPlan { tick: Duration::from_secs(1), phase_check_every: 3 },
        );
        assert_eq!(driver.current().phase, Phase::Before);
        assert_eq!(driver.current().remaining.seconds, 5);

        let mut rx = driver.subscribe();
        rx.changed().await.unwrap(); // tick 0
        source.set(t0() + chrono::Duration::seconds(6));

        let mut ticks = 0;
        while rx.borrow_and_update().phase != Phase::During {
            rx.changed().await.unwrap();
            ticks += 1;
        }
        // ticks 1 and 2 only refresh the countdown, tick 3 re-evaluates phase
        assert_eq!(ticks, 3);

        driver.stop();
        driver.stop();
        assert!(rx.changed().await.is_err());
    }
}
