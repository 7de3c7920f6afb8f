//! Navigation session owner.
//!
//! `NavigationSimulator` holds the run state the map, instruction panel and
//! AR overlay read from, and owns at most one active session. A session is
//! a synthesized [`Route`] plus its two drivers and the completion join.
//!
//! # Lifecycle
//!
//! 1. `start*` stops any running session, synthesizes a route from the
//!    current location/floor, applies the route's final floor, and opens a
//!    new session with a fresh [`SessionId`].
//! 2. The host calls [`on_frame`](NavigationSimulator::on_frame) every display
//!    frame and [`on_step_tick`](NavigationSimulator::on_step_tick) whenever
//!    the ticker is due (or just [`update`](NavigationSimulator::update)).
//! 3. When both drivers have reported, the session stops itself. Explicit
//!    stop, a floor switch, or a new destination stop it early.
//!
//! Callbacks carry the session id they were scheduled for. A callback for
//! anything but the active session is discarded without touching state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Language, SimulatorConfig};
use crate::drivers::{CompletionCoordinator, DriverEvent, Millis, PositionDriver, StepTicker};
use crate::error::{NavError, Result};
use crate::geometry::Point;
use crate::route::{synthesize_route, NavigationStep, Route};
use crate::store::{StoreCatalog, StoreSection};
use crate::view::{ArGuidance, MapSnapshot, NavigationPanel};

/// Generation number of a navigation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Mutable state read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRunState {
    pub is_navigating: bool,
    pub current_location: Point,
    pub current_step_index: usize,
    pub current_floor: i32,
    pub navigation_path: Vec<Point>,
    pub navigation_steps: Vec<NavigationStep>,
    /// Name of the section being navigated to.
    pub destination: Option<String>,
    pub ar_active: bool,
}

impl NavigationRunState {
    fn idle(config: &SimulatorConfig) -> Self {
        Self {
            is_navigating: false,
            current_location: config.default_location,
            current_step_index: 0,
            current_floor: config.default_floor,
            navigation_path: Vec::new(),
            navigation_steps: Vec::new(),
            destination: None,
            ar_active: false,
        }
    }

    /// The step currently shown, if navigating.
    pub fn current_step(&self) -> Option<&NavigationStep> {
        self.navigation_steps.get(self.current_step_index)
    }
}

struct ActiveSession {
    id: SessionId,
    position: PositionDriver,
    ticker: StepTicker,
    coordinator: CompletionCoordinator,
}

pub struct NavigationSimulator {
    config: SimulatorConfig,
    catalog: StoreCatalog,
    state: NavigationRunState,
    session: Option<ActiveSession>,
    next_session: u64,
    /// Sessions that ran to arrival (not stopped early).
    completed: u64,
}

impl NavigationSimulator {
    pub fn new(config: SimulatorConfig, catalog: StoreCatalog) -> Self {
        let state = NavigationRunState::idle(&config);
        Self {
            config,
            catalog,
            state,
            session: None,
            next_session: 1,
            completed: 0,
        }
    }

    /// Simulator over the sample store with default settings.
    pub fn with_sample_store() -> Self {
        Self::new(SimulatorConfig::default(), StoreCatalog::sample())
    }

    // ── Starting ────────────────────────────────────────────────────────

    /// Navigate to `section`, replacing any running session.
    pub fn start(&mut self, section: &StoreSection, now: Millis) -> SessionId {
        self.stop();

        let route = synthesize_route(
            self.state.current_location,
            self.state.current_floor,
            section,
            self.config.accessibility_mode,
        );
        self.open_session(route, &section.name, now)
    }

    /// Navigate to the section with catalog id `id`. Unknown ids leave the
    /// simulator untouched.
    pub fn start_by_id(&mut self, id: &str, now: Millis) -> Result<SessionId> {
        match self.catalog.find_by_id(id).cloned() {
            Some(section) => Ok(self.start(&section, now)),
            None => {
                log::warn!("Navigation not started: no section with id {:?}", id);
                Err(NavError::UnknownSection(id.to_string()))
            }
        }
    }

    /// Navigate to the section named `name`. Unknown names leave the
    /// simulator untouched.
    pub fn start_by_name(&mut self, name: &str, now: Millis) -> Result<SessionId> {
        match self.catalog.find_by_name(name).cloned() {
            Some(section) => Ok(self.start(&section, now)),
            None => {
                log::warn!("Navigation not started: no section named {:?}", name);
                Err(NavError::UnknownSection(name.to_string()))
            }
        }
    }

    /// Start navigating and switch the AR overlay on.
    pub fn start_with_ar(&mut self, section: &StoreSection, now: Millis) -> SessionId {
        let id = self.start(section, now);
        self.state.ar_active = true;
        id
    }

    fn open_session(&mut self, route: Route, destination: &str, now: Millis) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;

        let Route {
            path,
            steps,
            final_floor,
        } = route;

        log::info!(
            "{} started: {} → {} (floor {} → {}), {} waypoints, {} steps",
            id,
            fmt_point(self.state.current_location),
            destination,
            self.state.current_floor,
            final_floor,
            path.len(),
            steps.len()
        );

        self.session = Some(ActiveSession {
            id,
            position: PositionDriver::new(path.clone(), self.config.segment_duration_ms, now),
            ticker: StepTicker::new(steps.len(), self.config.step_period_ms, now),
            coordinator: CompletionCoordinator::new(),
        });

        // Floor applies atomically with the rest of the session state.
        self.state.current_floor = final_floor;
        self.state.navigation_path = path;
        self.state.navigation_steps = steps;
        self.state.current_step_index = 0;
        self.state.destination = Some(destination.to_string());
        self.state.is_navigating = true;
        id
    }

    // ── Stopping ────────────────────────────────────────────────────────

    /// Cancel both drivers and reset to idle. Safe to call at any time.
    ///
    /// Location goes back to the entry point; the floor is left as is.
    pub fn stop(&mut self) {
        if let Some(active) = self.session.take() {
            log::info!(
                "{} stopped at step {}/{}",
                active.id,
                self.state.current_step_index + 1,
                self.state.navigation_steps.len()
            );
        }
        self.state.is_navigating = false;
        self.state.ar_active = false;
        self.state.navigation_steps.clear();
        self.state.navigation_path.clear();
        self.state.destination = None;
        self.state.current_step_index = 0;
        self.state.current_location = self.config.default_location;
    }

    /// Move to another floor. Any running navigation stops.
    pub fn switch_floor(&mut self, floor: i32) {
        log::info!("Switching to floor {}", floor);
        self.stop();
        self.state.current_floor = floor;
        self.state.current_location = self.config.default_location;
    }

    /// Put the location marker back at the entry point.
    pub fn recenter(&mut self) {
        self.state.current_location = self.config.default_location;
    }

    // ── Driver callbacks ────────────────────────────────────────────────

    /// Display-frame callback for `session`. Returns whether state changed.
    pub fn on_frame(&mut self, session: SessionId, now: Millis) -> bool {
        let Some(active) = self.session.as_mut().filter(|a| a.id == session) else {
            log::trace!("Discarding frame for inactive {}", session);
            return false;
        };
        if active.position.is_finished() {
            return false;
        }

        let arrived = active.position.on_frame(now);
        if let Some(location) = active.position.location() {
            self.state.current_location = location;
        }
        if arrived {
            log::debug!("{} reached the final waypoint", session);
            self.report(DriverEvent::PositionComplete);
        }
        true
    }

    /// Step-ticker callback for `session`. Returns whether state changed.
    pub fn on_step_tick(&mut self, session: SessionId, now: Millis) -> bool {
        let Some(active) = self.session.as_mut().filter(|a| a.id == session) else {
            log::trace!("Discarding step tick for inactive {}", session);
            return false;
        };
        if active.ticker.is_finished() {
            return false;
        }

        let last_reached = active.ticker.on_tick(now);
        self.state.current_step_index = active.ticker.index();
        if last_reached {
            log::debug!("{} finished showing its steps", session);
            self.report(DriverEvent::StepsComplete);
        }
        true
    }

    /// Run both callbacks for the active session, frame first.
    pub fn update(&mut self, now: Millis) {
        if let Some(id) = self.active_session() {
            self.on_frame(id, now);
            self.on_step_tick(id, now);
        }
    }

    fn report(&mut self, event: DriverEvent) {
        let both_done = self
            .session
            .as_mut()
            .is_some_and(|active| active.coordinator.record(event));
        if both_done {
            self.completed += 1;
            log::info!(
                "Arrived at {}",
                self.state.destination.as_deref().unwrap_or("destination")
            );
            self.stop();
        }
    }

    // ── Scheduling queries ──────────────────────────────────────────────

    pub fn active_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|a| a.id)
    }

    /// Whether `session` still needs display frames.
    pub fn wants_frames(&self, session: SessionId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|a| a.id == session && !a.position.is_finished())
    }

    /// When `session`'s ticker is next due, if it is still ticking.
    pub fn next_step_due(&self, session: SessionId) -> Option<Millis> {
        self.session
            .as_ref()
            .filter(|a| a.id == session)
            .and_then(|a| a.ticker.next_due())
    }

    // ── Toggles ─────────────────────────────────────────────────────────

    pub fn set_ar_active(&mut self, active: bool) {
        self.state.ar_active = active;
    }

    pub fn toggle_ar(&mut self) -> bool {
        self.state.ar_active = !self.state.ar_active;
        self.state.ar_active
    }

    /// Flip accessibility mode. Applies to routes synthesized afterwards.
    pub fn toggle_accessibility(&mut self) -> bool {
        self.config.accessibility_mode = !self.config.accessibility_mode;
        log::info!(
            "Accessibility mode {}",
            if self.config.accessibility_mode {
                "enabled"
            } else {
                "disabled"
            }
        );
        self.config.accessibility_mode
    }

    pub fn cycle_language(&mut self) -> Language {
        self.config.language = self.config.language.next();
        self.config.language
    }

    // ── Accessors and views ─────────────────────────────────────────────

    pub fn state(&self) -> &NavigationRunState {
        &self.state
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &StoreCatalog {
        &self.catalog
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed
    }

    pub fn panel(&self) -> NavigationPanel {
        NavigationPanel::from_state(&self.state)
    }

    pub fn ar_guidance(&self) -> ArGuidance {
        ArGuidance::from_state(&self.state)
    }

    pub fn map_snapshot(&self) -> MapSnapshot {
        MapSnapshot::capture(&self.state, &self.catalog)
    }
}

fn fmt_point(p: Point) -> String {
    format!("({:.1}, {:.1})", p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> NavigationSimulator {
        NavigationSimulator::with_sample_store()
    }

    fn sim_with(step_period_ms: u64) -> NavigationSimulator {
        let config = SimulatorConfig {
            step_period_ms,
            ..SimulatorConfig::default()
        };
        NavigationSimulator::new(config, StoreCatalog::sample())
    }

    #[test]
    fn test_start_populates_state() {
        let mut sim = sim();
        let id = sim.start_by_id("2", 0).unwrap();
        let state = sim.state();
        assert!(state.is_navigating);
        assert_eq!(state.destination.as_deref(), Some("Meat & Seafood"));
        assert_eq!(state.navigation_path.len(), 4);
        assert_eq!(state.navigation_steps.len(), 5);
        assert_eq!(state.current_step_index, 0);
        assert_eq!(sim.active_session(), Some(id));
        assert!(sim.wants_frames(id));
        assert_eq!(sim.next_step_due(id), Some(3000));
    }

    #[test]
    fn test_unknown_section_is_noop() {
        let mut sim = sim();
        let before = sim.state().clone();
        assert_eq!(
            sim.start_by_id("404", 0),
            Err(NavError::UnknownSection("404".into()))
        );
        assert!(sim.start_by_name("Garden Center", 0).is_err());
        assert_eq!(sim.state(), &before);
        assert_eq!(sim.active_session(), None);
    }

    #[test]
    fn test_cross_floor_applies_floor_at_start() {
        let mut sim = sim();
        assert_eq!(sim.state().current_floor, 1);
        sim.start_by_name("Apparel", 0).unwrap();
        assert_eq!(sim.state().current_floor, 2);
        assert_eq!(sim.state().navigation_steps.len(), 7);
        // Position starts where the shopper stood.
        assert_eq!(sim.state().current_location, Point::new(50.0, 85.0));
    }

    #[test]
    fn test_stop_resets_but_keeps_floor() {
        let mut sim = sim();
        let id = sim.start_by_name("Apparel", 0).unwrap();
        sim.set_ar_active(true);
        sim.update(1000);
        assert_ne!(sim.state().current_location, Point::new(50.0, 85.0));

        sim.stop();
        let state = sim.state();
        assert!(!state.is_navigating);
        assert!(!state.ar_active);
        assert!(state.navigation_path.is_empty());
        assert!(state.navigation_steps.is_empty());
        assert_eq!(state.destination, None);
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.current_location, Point::new(50.0, 85.0));
        assert_eq!(state.current_floor, 2);
        assert!(!sim.wants_frames(id));

        // Idempotent.
        sim.stop();
        assert_eq!(sim.state().current_floor, 2);
        assert_eq!(sim.completed_sessions(), 0);
    }

    #[test]
    fn test_stale_callbacks_do_not_mutate() {
        let mut sim = sim();
        let id = sim.start_by_id("2", 0).unwrap();
        sim.update(1000);
        sim.stop();
        let after_stop = sim.state().clone();

        assert!(!sim.on_frame(id, 5000));
        assert!(!sim.on_step_tick(id, 9000));
        sim.update(20_000);
        assert_eq!(sim.state(), &after_stop);
    }

    #[test]
    fn test_new_destination_restarts() {
        let mut sim = sim();
        let first = sim.start_by_id("1", 0).unwrap();
        sim.update(3000);
        assert_eq!(sim.state().current_step_index, 1);

        let second = sim.start_by_id("3", 3000).unwrap();
        assert_ne!(first, second);
        assert_eq!(sim.state().destination.as_deref(), Some("Dairy"));
        assert_eq!(sim.state().current_step_index, 0);
        // Restart begins from the reset entry point.
        assert_eq!(sim.state().navigation_path[0], Point::new(50.0, 85.0));
        assert!(!sim.on_step_tick(first, 60_000));
        assert_eq!(sim.state().current_step_index, 0);
    }

    #[test]
    fn test_switch_floor_stops_navigation() {
        let mut sim = sim();
        let id = sim.start_by_id("2", 0).unwrap();
        sim.update(500);
        sim.switch_floor(3);
        assert!(!sim.state().is_navigating);
        assert_eq!(sim.state().current_floor, 3);
        assert_eq!(sim.state().current_location, Point::new(50.0, 85.0));
        assert!(!sim.on_frame(id, 1000));
    }

    #[test]
    fn test_completion_when_steps_finish_last() {
        // 3 segments = 6 s of walking; 5 periods = 15 s of steps.
        let mut sim = sim();
        let id = sim.start_by_id("2", 0).unwrap();

        sim.on_frame(id, 6000);
        assert_eq!(sim.state().current_location, Point::new(52.5, 25.0));
        assert!(!sim.wants_frames(id));
        assert!(sim.state().is_navigating);

        sim.on_step_tick(id, 11_999);
        assert!(sim.state().is_navigating);
        assert_eq!(sim.state().current_step_index, 3);

        sim.on_step_tick(id, 12_000);
        assert!(sim.state().is_navigating);
        assert_eq!(sim.state().current_step_index, 4);

        sim.on_step_tick(id, 15_000);
        assert!(!sim.state().is_navigating);
        assert_eq!(sim.completed_sessions(), 1);
    }

    #[test]
    fn test_completion_when_position_finishes_last() {
        let mut sim = sim_with(100);
        let id = sim.start_by_id("2", 0).unwrap();

        sim.on_step_tick(id, 400);
        assert_eq!(sim.state().current_step_index, 4);
        assert_eq!(sim.next_step_due(id), Some(500));
        sim.on_step_tick(id, 500);
        assert_eq!(sim.next_step_due(id), None);
        assert!(sim.state().is_navigating);

        sim.on_frame(id, 5999);
        assert!(sim.state().is_navigating);
        sim.on_frame(id, 6000);
        assert!(!sim.state().is_navigating);
        assert_eq!(sim.completed_sessions(), 1);
    }

    #[test]
    fn test_arrival_step_visible_while_navigating() {
        let mut sim = sim();
        sim.start_by_id("2", 0).unwrap();
        sim.update(12_000);
        assert!(sim.state().is_navigating);
        assert_eq!(
            sim.state().current_step().map(|s| s.instruction.as_str()),
            Some("You've arrived at Meat & Seafood")
        );
        assert_eq!(sim.panel().current().map(|s| s.id.as_str()), Some("4"));
        assert_eq!(sim.ar_guidance().distance, "0 feet");

        sim.update(14_999);
        assert!(sim.state().is_navigating);
        sim.update(15_000);
        assert!(!sim.state().is_navigating);
        assert_eq!(sim.completed_sessions(), 1);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut sim = sim();
        let id = sim.start_by_id("2", 0).unwrap();
        for now in (0..=30_000).step_by(16) {
            sim.update(now);
        }
        assert_eq!(sim.completed_sessions(), 1);
        assert!(!sim.on_frame(id, 40_000));
        assert_eq!(sim.completed_sessions(), 1);
    }

    #[test]
    fn test_start_with_ar_and_toggles() {
        let mut sim = sim();
        let dairy = sim.catalog().find_by_id("3").cloned().unwrap();
        sim.start_with_ar(&dairy, 0);
        assert!(sim.state().ar_active);
        assert!(!sim.toggle_ar());
        assert!(sim.toggle_accessibility());
        assert_eq!(sim.cycle_language(), Language::Spanish);
    }

    #[test]
    fn test_accessibility_applies_to_next_route() {
        let mut sim = sim();
        sim.toggle_accessibility();
        sim.start_by_id("4", 0).unwrap();
        assert!(sim
            .state()
            .navigation_steps
            .iter()
            .all(|s| s.instruction.starts_with("Audio guidance: ")));
    }

    #[test]
    fn test_recenter_only_moves_marker() {
        let mut sim = sim();
        sim.start_by_id("2", 0).unwrap();
        sim.update(1000);
        sim.recenter();
        assert_eq!(sim.state().current_location, Point::new(50.0, 85.0));
        assert!(sim.state().is_navigating);
    }
}
