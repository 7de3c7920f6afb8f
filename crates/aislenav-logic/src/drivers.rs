//! The two time-based progressions of a navigation session.
//!
//! | Driver | Cadence | Advances |
//! |--------|---------|----------|
//! | [`PositionDriver`] | every display frame | `current_location`, continuously |
//! | [`StepTicker`] | fixed period (3 s) | `current_step_index`, by one |
//!
//! The two are deliberately unsynchronized: the ticker does not look at how
//! far the position has travelled. Each reports completion exactly once as a
//! [`DriverEvent`]; [`CompletionCoordinator`] joins the two reports.
//!
//! Drivers never read a wall clock. The host passes a monotonic timestamp in
//! milliseconds to every call.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Monotonic host time in milliseconds.
pub type Millis = u64;

/// Completion report from one of the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverEvent {
    PositionComplete,
    StepsComplete,
}

// ── Position interpolation ──────────────────────────────────────────────

/// Walks `current_location` along a polyline, one fixed-duration segment at
/// a time.
///
/// Segment start times are chained (`start[i+1] = start[i] + duration`), so a
/// late frame carries its overshoot into the next segment and the walk ends
/// exactly `(N-1) * duration` after it began.
#[derive(Debug, Clone)]
pub struct PositionDriver {
    path: Vec<Point>,
    segment_ms: Millis,
    segment: usize,
    segment_started_at: Millis,
    location: Option<Point>,
    finished: bool,
}

impl PositionDriver {
    pub fn new(path: Vec<Point>, segment_ms: Millis, now: Millis) -> Self {
        let location = path.first().copied();
        Self {
            path,
            segment_ms,
            segment: 0,
            segment_started_at: now,
            location,
            finished: false,
        }
    }

    /// Advance to `now`. Returns `true` exactly once, on the frame the final
    /// waypoint is reached. Paths shorter than two points finish on the first
    /// frame without moving.
    pub fn on_frame(&mut self, now: Millis) -> bool {
        if self.finished {
            return false;
        }
        if self.path.len() < 2 {
            self.finished = true;
            return true;
        }

        let last_segment = self.path.len() - 2;
        loop {
            let from = self.path[self.segment];
            let to = self.path[self.segment + 1];
            let elapsed = now.saturating_sub(self.segment_started_at);
            let progress = if self.segment_ms == 0 {
                1.0
            } else {
                (elapsed as f32 / self.segment_ms as f32).min(1.0)
            };

            if progress < 1.0 {
                self.location = Some(from.lerp(to, progress));
                return false;
            }

            if self.segment == last_segment {
                // Snap to the exact waypoint; no interpolation residue.
                self.location = Some(to);
                self.finished = true;
                return true;
            }
            self.segment += 1;
            self.segment_started_at += self.segment_ms;
        }
    }

    pub fn location(&self) -> Option<Point> {
        self.location
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index of the segment currently being walked.
    pub fn segment(&self) -> usize {
        self.segment
    }
}

// ── Step progression ────────────────────────────────────────────────────

/// Fixed-cadence ticker over the instruction steps.
#[derive(Debug, Clone)]
pub struct StepTicker {
    step_count: usize,
    period_ms: Millis,
    index: usize,
    next_due: Millis,
    finished: bool,
}

impl StepTicker {
    pub fn new(step_count: usize, period_ms: Millis, now: Millis) -> Self {
        Self {
            step_count,
            period_ms,
            index: 0,
            next_due: now + period_ms,
            finished: false,
        }
    }

    /// Apply every tick due by `now`. Returns `true` exactly once, on the
    /// first tick after the last step became current, so the last step stays
    /// on screen for a full period. A route with zero or one step finishes on
    /// the first due tick.
    pub fn on_tick(&mut self, now: Millis) -> bool {
        if self.finished {
            return false;
        }
        let last = self.step_count.saturating_sub(1);
        while now >= self.next_due {
            if self.index >= last {
                self.finished = true;
                return true;
            }
            self.index += 1;
            self.next_due += self.period_ms;
        }
        false
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// When the next tick is due, or `None` once the ticker has stopped.
    pub fn next_due(&self) -> Option<Millis> {
        if self.finished {
            None
        } else {
            Some(self.next_due)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

// ── Completion join ─────────────────────────────────────────────────────

/// Joins the two completion reports. Order of arrival does not matter; the
/// second report triggers the stop, and only once.
#[derive(Debug, Clone, Default)]
pub struct CompletionCoordinator {
    position_done: bool,
    steps_done: bool,
    fired: bool,
}

impl CompletionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report. Returns `true` the first time both have arrived.
    pub fn record(&mut self, event: DriverEvent) -> bool {
        match event {
            DriverEvent::PositionComplete => self.position_done = true,
            DriverEvent::StepsComplete => self.steps_done = true,
        }
        if self.fired || !(self.position_done && self.steps_done) {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn position_done(&self) -> bool {
        self.position_done
    }

    pub fn steps_done(&self) -> bool {
        self.steps_done
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGMENT: Millis = 2000;
    const PERIOD: Millis = 3000;

    fn square() -> Vec<Point> {
        vec![
            Point::new(50.0, 85.0),
            Point::new(50.0, 15.0),
            Point::new(42.5, 15.0),
            Point::new(52.5, 25.0),
        ]
    }

    #[test]
    fn test_position_interpolates_midway() {
        let mut driver = PositionDriver::new(square(), SEGMENT, 0);
        assert!(!driver.on_frame(1000));
        assert_eq!(driver.location(), Some(Point::new(50.0, 50.0)));
        assert_eq!(driver.segment(), 0);
    }

    #[test]
    fn test_position_advances_segments_at_frame_rate() {
        let mut driver = PositionDriver::new(square(), SEGMENT, 0);
        let mut now = 0;
        let mut completions = 0;
        while now <= 7000 {
            if driver.on_frame(now) {
                completions += 1;
            }
            now += 16;
        }
        assert_eq!(completions, 1);
        assert!(driver.is_finished());
        assert_eq!(driver.location(), Some(Point::new(52.5, 25.0)));
    }

    #[test]
    fn test_position_exact_at_total_duration() {
        let path = square();
        let total = (path.len() as Millis - 1) * SEGMENT;
        let mut driver = PositionDriver::new(path, SEGMENT, 500);
        assert!(!driver.on_frame(500 + total - 1));
        assert!(driver.on_frame(500 + total));
        assert_eq!(driver.location(), Some(Point::new(52.5, 25.0)));
    }

    #[test]
    fn test_position_long_frame_skips_segments() {
        let mut driver = PositionDriver::new(square(), SEGMENT, 0);
        assert!(!driver.on_frame(4500));
        assert_eq!(driver.segment(), 2);
        // Quarter of the way along the last segment.
        let loc = driver.location().unwrap();
        assert!((loc.x - 45.0).abs() < 1e-4);
        assert!((loc.y - 17.5).abs() < 1e-4);
    }

    #[test]
    fn test_position_short_paths_complete_immediately() {
        let mut single = PositionDriver::new(vec![Point::new(1.0, 2.0)], SEGMENT, 0);
        assert!(single.on_frame(0));
        assert_eq!(single.location(), Some(Point::new(1.0, 2.0)));
        assert!(!single.on_frame(16));

        let mut empty = PositionDriver::new(Vec::new(), SEGMENT, 0);
        assert!(empty.on_frame(0));
        assert_eq!(empty.location(), None);
    }

    #[test]
    fn test_position_zero_length_segments_terminate() {
        let p = Point::new(82.5, 25.0);
        let mut driver = PositionDriver::new(vec![p, p, p], SEGMENT, 0);
        assert!(!driver.on_frame(3999));
        assert!(driver.on_frame(4000));
        assert_eq!(driver.location(), Some(p));
    }

    #[test]
    fn test_ticker_reaches_last_step() {
        let mut ticker = StepTicker::new(5, PERIOD, 0);
        assert!(!ticker.on_tick(2999));
        assert_eq!(ticker.index(), 0);
        assert!(!ticker.on_tick(3000));
        assert_eq!(ticker.index(), 1);
        assert_eq!(ticker.next_due(), Some(6000));
        assert!(!ticker.on_tick(12000));
        assert_eq!(ticker.index(), 4);
        assert_eq!(ticker.next_due(), Some(15000));
        assert!(ticker.on_tick(15000));
        assert_eq!(ticker.next_due(), None);
        assert!(!ticker.on_tick(60000));
        assert_eq!(ticker.index(), 4);
    }

    #[test]
    fn test_ticker_holds_last_step_for_one_period() {
        let mut ticker = StepTicker::new(3, PERIOD, 0);
        assert!(!ticker.on_tick(6000));
        assert_eq!(ticker.index(), 2);
        assert!(!ticker.on_tick(8999));
        assert!(!ticker.is_finished());
        assert!(ticker.on_tick(9000));
        assert_eq!(ticker.index(), 2);
    }

    #[test]
    fn test_ticker_catches_up_but_stops_at_last() {
        let mut ticker = StepTicker::new(3, PERIOD, 0);
        assert!(ticker.on_tick(100_000));
        assert_eq!(ticker.index(), 2);
    }

    #[test]
    fn test_ticker_single_step_finishes_after_one_period() {
        let mut ticker = StepTicker::new(1, PERIOD, 0);
        assert!(!ticker.on_tick(0));
        assert!(ticker.on_tick(3000));
        assert_eq!(ticker.index(), 0);
        let mut none = StepTicker::new(0, PERIOD, 0);
        assert!(none.on_tick(3000));
    }

    #[test]
    fn test_coordinator_position_first() {
        let mut c = CompletionCoordinator::new();
        assert!(!c.record(DriverEvent::PositionComplete));
        assert!(c.record(DriverEvent::StepsComplete));
        assert!(!c.record(DriverEvent::StepsComplete));
        assert!(!c.record(DriverEvent::PositionComplete));
        assert!(c.has_fired());
    }

    #[test]
    fn test_coordinator_steps_first() {
        let mut c = CompletionCoordinator::new();
        assert!(!c.record(DriverEvent::StepsComplete));
        assert!(c.steps_done() && !c.position_done());
        assert!(c.record(DriverEvent::PositionComplete));
    }

    #[test]
    fn test_coordinator_duplicate_reports_do_not_fire() {
        let mut c = CompletionCoordinator::new();
        assert!(!c.record(DriverEvent::StepsComplete));
        assert!(!c.record(DriverEvent::StepsComplete));
        assert!(!c.has_fired());
    }
}
