//! Pure in-store navigation logic for AisleNav.
//!
//! This crate contains the navigation core of the store app, independent of
//! any renderer or UI toolkit. Route synthesis is a pure function; the
//! session drivers take host timestamps instead of reading a clock, so the
//! whole subsystem is unit-testable and replayable in a headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Timing constants, entry point, accessibility and language toggles |
//! | [`drivers`] | Frame-driven position walk, fixed-cadence step ticker, completion join |
//! | [`error`] | `NavError` / `ConfigError` |
//! | [`geometry`] | Percentage-space points and rectangles |
//! | [`route`] | Route synthesis: start, optional elevator hop, L-shaped approach |
//! | [`scheduler`] | Virtual-time cooperative event loop driving a simulator |
//! | [`simulator`] | Run-state owner: start/stop/floor switch, stale-callback filtering |
//! | [`store`] | Store sections, traffic levels, sample catalog |
//! | [`view`] | Instruction panel, AR overlay and map view models |

pub mod config;
pub mod drivers;
pub mod error;
pub mod geometry;
pub mod route;
pub mod scheduler;
pub mod simulator;
pub mod store;
pub mod view;

