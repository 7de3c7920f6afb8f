//! Route synthesis between the shopper and a store section.
//!
//! This is a cosmetic approximation, not a pathfinder: every route is the
//! start point, an optional elevator hop, then an L-shaped approach into the
//! destination's center. Left/right is a plain sign test on x.
//!
//! Synthesis is pure. The floor the shopper ends up on is returned as
//! [`Route::final_floor`] and applied by the caller when navigation starts.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::store::StoreSection;

/// Elevator/escalator location. The same coordinates are used on every floor.
pub const FLOOR_TRANSITION_POINT: Point = Point::new(15.0, 75.0);

/// How far before the section center the L-shaped approach turns, in percent.
pub const APPROACH_OFFSET: f32 = 10.0;

/// Prefix added to every instruction in accessibility mode.
pub const AUDIO_GUIDANCE_PREFIX: &str = "Audio guidance: ";

/// Which way the shopper should head for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Straight,
    Left,
    Right,
    Up,
    Down,
}

/// One human-readable instruction of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStep {
    pub id: String,
    pub instruction: String,
    pub location: String,
    /// Seconds.
    pub estimated_time: u32,
    pub distance: Option<String>,
    pub direction: Option<Direction>,
    pub floor: Option<i32>,
}

/// Synthesized route: a waypoint polyline plus the instruction sequence.
///
/// `path` and `steps` describe the same journey at different granularities
/// and do not have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub path: Vec<Point>,
    pub steps: Vec<NavigationStep>,
    pub final_floor: i32,
}

impl Route {
    /// Sum of every step's estimated time, in seconds.
    pub fn total_estimated_time(&self) -> u32 {
        self.steps.iter().map(|s| s.estimated_time).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.steps.is_empty()
    }

    /// True when the route contains an elevator hop.
    pub fn changes_floor(&self) -> bool {
        self.steps.iter().any(|s| s.id == STEP_TRANSITION_START)
    }
}

const STEP_TRANSITION_START: &str = "floor-transition-start";
const STEP_TRANSITION_END: &str = "floor-transition-end";

/// Build a route from `start` on `start_floor` to the center of `destination`.
pub fn synthesize_route(
    start: Point,
    start_floor: i32,
    destination: &StoreSection,
    accessibility: bool,
) -> Route {
    let name = destination.name.as_str();
    let dest_floor = destination.floor;
    let end = destination.center();
    let phrase = |text: String| instruction(text, accessibility);

    let mut path = vec![start];
    let mut steps = vec![NavigationStep {
        id: "0".into(),
        instruction: phrase("Starting navigation from your current location.".into()),
        location: format!("Current Spot (Floor {})", start_floor),
        estimated_time: 2,
        distance: Some("0 feet".into()),
        direction: Some(Direction::Straight),
        floor: Some(start_floor),
    }];

    if start_floor != dest_floor {
        let heading = if start_floor < dest_floor {
            Direction::Up
        } else {
            Direction::Down
        };

        path.push(FLOOR_TRANSITION_POINT);
        steps.push(NavigationStep {
            id: STEP_TRANSITION_START.into(),
            instruction: phrase(format!(
                "Proceed to the elevator/escalator for Floor {}.",
                dest_floor
            )),
            location: format!("Elevator/Escalator (Floor {})", start_floor),
            estimated_time: 10,
            distance: Some("50 feet".into()),
            direction: Some(heading),
            floor: Some(start_floor),
        });

        // Same coordinates, now on the destination floor.
        path.push(FLOOR_TRANSITION_POINT);
        steps.push(NavigationStep {
            id: STEP_TRANSITION_END.into(),
            instruction: phrase(format!(
                "You are now on Floor {}. Exit the elevator/escalator.",
                dest_floor
            )),
            location: format!("Elevator/Escalator (Floor {})", dest_floor),
            estimated_time: 5,
            distance: Some("10 feet".into()),
            direction: Some(Direction::Straight),
            floor: Some(dest_floor),
        });
    }

    // L-shaped approach: down the corridor, across, then into the section.
    let pivot = path[path.len() - 1];
    path.push(Point::new(pivot.x, end.y - APPROACH_OFFSET));
    path.push(Point::new(end.x - APPROACH_OFFSET, end.y - APPROACH_OFFSET));
    path.push(end);

    let turn = if end.x > pivot.x {
        Direction::Right
    } else {
        Direction::Left
    };
    let turn_word = if turn == Direction::Right {
        "right"
    } else {
        "left"
    };
    let first_aisle = destination
        .aisles
        .first()
        .map(String::as_str)
        .unwrap_or_default();

    steps.push(NavigationStep {
        id: "1".into(),
        instruction: phrase("Navigate through the main corridor".into()),
        location: format!("Main Corridor (Floor {})", dest_floor),
        estimated_time: 5,
        distance: Some("50 feet".into()),
        direction: Some(Direction::Straight),
        floor: Some(dest_floor),
    });
    steps.push(NavigationStep {
        id: "2".into(),
        instruction: phrase(format!(
            "Turn {} into the aisle towards {} section",
            turn_word, name
        )),
        location: format!("Aisle Intersection (Floor {})", dest_floor),
        estimated_time: 7,
        distance: Some("75 feet".into()),
        direction: Some(turn),
        floor: Some(dest_floor),
    });
    steps.push(NavigationStep {
        id: "3".into(),
        instruction: phrase(format!("Continue straight to {}", name)),
        location: format!("Aisle {} Area (Floor {})", first_aisle, dest_floor),
        estimated_time: 4,
        distance: Some("40 feet".into()),
        direction: Some(Direction::Straight),
        floor: Some(dest_floor),
    });
    steps.push(NavigationStep {
        id: "4".into(),
        instruction: phrase(if accessibility {
            format!("You have arrived at {}", name)
        } else {
            format!("You've arrived at {}", name)
        }),
        location: name.to_string(),
        estimated_time: 0,
        distance: Some("0 feet".into()),
        direction: Some(Direction::Straight),
        floor: Some(dest_floor),
    });

    Route {
        path,
        steps,
        final_floor: dest_floor,
    }
}

/// Screen-reader phrasing: explicit prefix, always a full sentence.
fn instruction(text: String, accessibility: bool) -> String {
    if !accessibility {
        return text;
    }
    let mut spoken = format!("{}{}", AUDIO_GUIDANCE_PREFIX, text);
    if !spoken.ends_with('.') {
        spoken.push('.');
    }
    spoken
}
