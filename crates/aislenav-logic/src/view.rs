//! Read-only view models for the presentation layer.
//!
//! The instruction panel, AR overlay and map renderer live outside this
//! crate. These structs are the exact data each of them consumes, built from
//! the run state so the renderers stay free of navigation logic.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::route::{Direction, NavigationStep};
use crate::simulator::NavigationRunState;
use crate::store::{ShopperMarker, StoreCatalog, StoreSection};

/// Literal distance label shown on the panel for every route.
pub const TOTAL_DISTANCE_LABEL: &str = "~165 feet";

/// How many upcoming steps the panel lists.
pub const UPCOMING_STEP_LIMIT: usize = 3;

/// Instruction panel contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPanel {
    pub is_active: bool,
    pub destination: String,
    pub steps: Vec<NavigationStep>,
    pub current_step: usize,
    /// Seconds, summed over all steps.
    pub total_time: u32,
    pub total_distance: String,
}

impl NavigationPanel {
    pub fn from_state(state: &NavigationRunState) -> Self {
        Self {
            is_active: state.is_navigating,
            destination: state.destination.clone().unwrap_or_default(),
            steps: state.navigation_steps.clone(),
            current_step: state.current_step_index,
            total_time: state.navigation_steps.iter().map(|s| s.estimated_time).sum(),
            total_distance: TOTAL_DISTANCE_LABEL.to_string(),
        }
    }

    pub fn current(&self) -> Option<&NavigationStep> {
        self.steps.get(self.current_step)
    }

    /// Steps after the current one, at most [`UPCOMING_STEP_LIMIT`].
    pub fn upcoming(&self) -> &[NavigationStep] {
        let from = (self.current_step + 1).min(self.steps.len());
        let to = (from + UPCOMING_STEP_LIMIT).min(self.steps.len());
        &self.steps[from..to]
    }

    /// Whole minutes, rounded up.
    pub fn remaining_minutes(&self) -> u32 {
        self.total_time.div_ceil(60)
    }

    /// Subtitle line, e.g. `~165 feet • 1 min remaining`.
    pub fn subtitle(&self) -> String {
        format!(
            "{} • {} min remaining",
            self.total_distance,
            self.remaining_minutes()
        )
    }
}

/// AR overlay contents for the current step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArGuidance {
    pub is_active: bool,
    pub destination: String,
    pub distance: String,
    pub direction: Direction,
    pub instruction: String,
}

impl ArGuidance {
    pub fn from_state(state: &NavigationRunState) -> Self {
        let step = state.current_step();
        Self {
            is_active: state.ar_active,
            destination: state
                .destination
                .clone()
                .unwrap_or_else(|| "Your Destination".to_string()),
            distance: step
                .and_then(|s| s.distance.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            direction: step.and_then(|s| s.direction).unwrap_or_default(),
            instruction: step
                .map(|s| s.instruction.clone())
                .unwrap_or_else(|| "Follow the path.".to_string()),
        }
    }

    /// Instruction with a heading prefix and a proximity suffix.
    pub fn enhanced_instruction(&self) -> String {
        let prefix = match self.direction {
            Direction::Left => "Turn left ahead: ",
            Direction::Right => "Turn right ahead: ",
            Direction::Up => "Go up to the next floor: ",
            Direction::Down => "Go down to the floor below: ",
            Direction::Straight => "Continue straight: ",
        };
        let suffix = match leading_number(&self.distance) {
            Some(d) if d < 20.0 => " - You are almost there!",
            Some(d) if d < 50.0 => " - Stay on track!",
            _ => "",
        };
        format!("{}{}{}", prefix, self.instruction, suffix)
    }
}

/// Map renderer inputs for the current floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub current_floor: i32,
    pub current_location: Point,
    pub is_navigating: bool,
    pub navigation_path: Vec<Point>,
    pub selected_destination: Option<String>,
    pub sections: Vec<StoreSection>,
    pub people: Vec<ShopperMarker>,
}

impl MapSnapshot {
    pub fn capture(state: &NavigationRunState, catalog: &StoreCatalog) -> Self {
        let floor = state.current_floor;
        Self {
            current_floor: floor,
            current_location: state.current_location,
            is_navigating: state.is_navigating,
            navigation_path: state.navigation_path.clone(),
            selected_destination: state.destination.clone(),
            sections: catalog.sections_on_floor(floor).cloned().collect(),
            people: catalog.people_on_floor(floor).cloned().collect(),
        }
    }
}

/// Leading decimal number of a label like `"40 feet"`.
fn leading_number(label: &str) -> Option<f32> {
    let trimmed = label.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}
