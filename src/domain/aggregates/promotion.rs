//! Promotion window and clock
//!
//! A [`PromotionWindow`] is the `[start, end]` span of a scheduled promotion. The free
//! functions classify an instant against it and price goods accordingly; the
//! [`PromotionClock`] wraps them for a caller that samples wall-clock time repeatedly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::events::{DomainEvent, PromotionEvent};
use crate::domain::value_objects::{Countdown, DiscountPercent, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct PromotionWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked window boundaries as they arrive from configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct WindowBounds { pub start: DateTime<Utc>, pub end: DateTime<Utc> }

impl TryFrom<WindowBounds> for PromotionWindow {
    type Error = WindowError;
    fn try_from(b: WindowBounds) -> Result<Self, Self::Error> { Self::new(b.start, b.end) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase { Before, During, After }

impl PromotionWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start >= end { return Err(WindowError::EndNotAfterStart { start, end }); }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }

    /// Both boundary instants belong to [`Phase::During`].
    pub fn phase_at(&self, now: DateTime<Utc>) -> Phase {
        if now < self.start { Phase::Before }
        else if now > self.end { Phase::After }
        else { Phase::During }
    }

    /// Time left until the boundary that ends `phase`.
    pub fn remaining(&self, now: DateTime<Utc>, phase: Phase) -> Countdown {
        let distance = match phase {
            Phase::Before => self.start.timestamp_millis() - now.timestamp_millis(),
            Phase::During => self.end.timestamp_millis() - now.timestamp_millis(),
            Phase::After => return Countdown::ZERO,
        };
        Countdown::from_millis(distance)
    }
}

/// The original price outside the window, the discounted one inside it.
pub fn discounted_price(original: &Money, percent: DiscountPercent, phase: Phase) -> Money {
    match phase {
        Phase::During => original.discounted(percent),
        Phase::Before | Phase::After => original.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("promotion end {end} is not after start {start}")]
    EndNotAfterStart { start: DateTime<Utc>, end: DateTime<Utc> },
}

/// One observation of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    pub at: DateTime<Utc>,
    pub phase: Phase,
    pub remaining: Countdown,
}

/// Stateful observer over a window that never lets its view of time run backward.
#[derive(Clone, Debug)]
pub struct PromotionClock {
    window: PromotionWindow,
    last_seen: Option<DateTime<Utc>>,
    last_phase: Option<Phase>,
    events: Vec<DomainEvent>,
}

impl PromotionClock {
    pub fn new(window: PromotionWindow) -> Self {
        Self { window, last_seen: None, last_phase: None, events: vec![] }
    }

    pub fn window(&self) -> &PromotionWindow { &self.window }
    pub fn phase(&self) -> Option<Phase> { self.last_phase }

    /// Samples the clock at `now`. An instant earlier than the previous sample is
    /// replaced by that sample.
    pub fn observe(&mut self, now: DateTime<Utc>) -> ClockReading {
        let at = match self.last_seen {
            Some(prev) if now < prev => {
                tracing::warn!(%now, %prev, "clock moved backward, holding last instant");
                prev
            }
            _ => now,
        };
        self.last_seen = Some(at);

        let phase = self.window.phase_at(at);
        if let Some(from) = self.last_phase.filter(|p| *p != phase) {
            tracing::info!(?from, to = ?phase, %at, "promotion phase changed");
            self.raise_event(DomainEvent::Promotion(PromotionEvent::PhaseChanged { from, to: phase, at }));
        }
        self.last_phase = Some(phase);

        ClockReading { at, phase, remaining: self.window.remaining(at, phase) }
    }

    /// Countdown-only sample: advances time but keeps the phase from the last
    /// [`observe`](Self::observe). Falls back to a full observation before the first one.
    pub fn sample(&mut self, now: DateTime<Utc>) -> ClockReading {
        let Some(phase) = self.last_phase else { return self.observe(now) };
        let at = self.last_seen.map_or(now, |prev| prev.max(now));
        self.last_seen = Some(at);
        ClockReading { at, phase, remaining: self.window.remaining(at, phase) }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 11, 11, 0, 0, 0).unwrap() }
    fn hour_window() -> PromotionWindow { PromotionWindow::new(t0(), t0() + Duration::hours(1)).unwrap() }

    #[test]
    fn test_phase_boundaries() {
        let w = hour_window();
        assert_eq!(w.phase_at(t0() - Duration::milliseconds(1)), Phase::Before);
        assert_eq!(w.phase_at(t0()), Phase::During);
        assert_eq!(w.phase_at(w.end()), Phase::During);
        assert_eq!(w.phase_at(w.end() + Duration::milliseconds(1)), Phase::After);
    }

    #[test]
    fn test_remaining() {
        let w = hour_window();
        let now = t0() + Duration::minutes(30);
        assert_eq!(w.remaining(now, w.phase_at(now)), Countdown { hours: 0, minutes: 30, seconds: 0 });
        let early = t0() - Duration::seconds(90);
        assert_eq!(w.remaining(early, Phase::Before), Countdown { hours: 0, minutes: 1, seconds: 30 });
        assert_eq!(w.remaining(w.end() + Duration::hours(3), Phase::After), Countdown::ZERO);
    }

    #[test]
    fn test_discounted_price() {
        let p = Money::vnd(Decimal::new(1000, 0));
        let d = DiscountPercent::new(20).unwrap();
        assert_eq!(discounted_price(&p, d, Phase::During).amount(), Decimal::new(800, 0));
        assert_eq!(discounted_price(&p, d, Phase::Before), p);
        assert_eq!(discounted_price(&p, d, Phase::After), p);
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert!(PromotionWindow::new(t0(), t0()).is_err());
        let json = serde_json::json!({ "start": t0() + Duration::hours(1), "end": t0() });
        assert!(serde_json::from_value::<PromotionWindow>(json).is_err());
    }

    #[test]
    fn test_clock_never_moves_backward() {
        let mut clock = PromotionClock::new(hour_window());
        let r = clock.observe(t0() + Duration::hours(2));
        assert_eq!(r.phase, Phase::After);
        let r = clock.observe(t0() + Duration::minutes(10));
        assert_eq!(r.phase, Phase::After);
        assert_eq!(r.at, t0() + Duration::hours(2));
    }

    #[test]
    fn test_sample_keeps_phase_until_observed() {
        let mut clock = PromotionClock::new(hour_window());
        assert_eq!(clock.sample(t0() - Duration::seconds(2)).phase, Phase::Before);
        let r = clock.sample(t0() + Duration::seconds(1));
        assert_eq!(r.phase, Phase::Before);
        assert_eq!(r.remaining, Countdown::ZERO);
        assert_eq!(clock.observe(t0() + Duration::seconds(1)).phase, Phase::During);
    }

    #[test]
    fn test_clock_raises_phase_events() {
        let mut clock = PromotionClock::new(hour_window());
        clock.observe(t0() - Duration::seconds(1));
        assert!(clock.take_events().is_empty());
        clock.observe(t0());
        clock.observe(t0() + Duration::seconds(1));
        let events = clock.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::Promotion(PromotionEvent::PhaseChanged { from: Phase::Before, to: Phase::During, .. })));
    }
}
