//! Pointer gesture to action translation
//!
//! A gesture runs from `begin` to `end`. Short, still gestures are taps and
//! rotate. Once the pointer travels past the tap radius the gesture becomes a
//! drag: every full step of accumulated movement on an axis emits exactly one
//! move and removes that step from the axis. A fast downward release is a
//! flick and hard-drops instead.
//!
//! The translator never looks at the board. It only produces [`Action`]s for
//! the session to validate.

use crate::game::Action;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds for gesture classification, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Rendered size of one board cell
    pub cell_size: f32,
    /// Multiplier on `cell_size` for one move step
    pub sensitivity: f32,
    /// Farthest a tap may wander from its start
    pub tap_max_distance: f32,
    /// Longest a tap may last
    pub tap_max_duration_ms: u64,
    /// Downward release speed, in pixels per millisecond, that counts as a flick
    pub flick_min_velocity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            sensitivity: 1.0,
            tap_max_distance: 10.0,
            tap_max_duration_ms: 200,
            flick_min_velocity: 1.5,
        }
    }
}

impl GestureConfig {
    /// Pointer travel that produces one discrete move
    pub fn step(&self) -> f32 {
        (self.cell_size * self.sensitivity).max(1.0)
    }
}

/// A pointer location in screen pixels, y down
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone)]
struct Tracking {
    start: Point,
    started_at: Duration,
    last: Point,
    last_at: Duration,
    acc_x: f32,
    acc_y: f32,
    dragging: bool,
    /// Vertical speed over the most recent segment, px/ms
    velocity_y: f32,
}

/// Reduces pointer samples to discrete actions
#[derive(Debug, Clone, Default)]
pub struct GestureTranslator {
    config: GestureConfig,
    active: Option<Tracking>,
}

impl GestureTranslator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the current gesture has been classified as a drag
    pub fn is_dragging(&self) -> bool {
        self.active.as_ref().is_some_and(|t| t.dragging)
    }

    /// Start a gesture, discarding any unfinished one
    pub fn begin(&mut self, point: Point, at: Duration) {
        self.active = Some(Tracking {
            start: point,
            started_at: at,
            last: point,
            last_at: at,
            acc_x: 0.0,
            acc_y: 0.0,
            dragging: false,
            velocity_y: 0.0,
        });
    }

    /// Feed a pointer sample, returning the moves it completes
    pub fn update(&mut self, point: Point, at: Duration) -> Vec<Action> {
        let config = self.config;
        let Some(tracking) = self.active.as_mut() else {
            self.begin(point, at);
            return Vec::new();
        };
        advance(tracking, &config, point, at)
    }

    /// Finish the gesture
    pub fn end(&mut self, point: Point, at: Duration) -> Vec<Action> {
        let config = self.config;
        let Some(mut tracking) = self.active.take() else {
            return Vec::new();
        };
        let mut actions = advance(&mut tracking, &config, point, at);

        if tracking.dragging {
            let flick = tracking.velocity_y >= config.flick_min_velocity
                && (point.y - tracking.start.y) > (point.x - tracking.start.x).abs();
            if flick {
                actions.retain(|a| *a != Action::SoftDrop);
                actions.push(Action::HardDrop);
            }
            return actions;
        }

        let held = at.saturating_sub(tracking.started_at);
        let still = point.distance(tracking.start) <= config.tap_max_distance;
        if still && held <= Duration::from_millis(config.tap_max_duration_ms) {
            actions.push(Action::Rotate);
        }
        actions
    }

    /// Drop the current gesture without emitting anything
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

fn advance(
    tracking: &mut Tracking,
    config: &GestureConfig,
    point: Point,
    at: Duration,
) -> Vec<Action> {
    let dx = point.x - tracking.last.x;
    let dy = point.y - tracking.last.y;
    let dt = at.saturating_sub(tracking.last_at).as_secs_f32() * 1000.0;
    if dt > 0.0 {
        tracking.velocity_y = dy / dt;
    }
    tracking.last = point;
    tracking.last_at = at;

    tracking.acc_x += dx;
    // Upward travel has no action
    tracking.acc_y = (tracking.acc_y + dy).max(0.0);

    if !tracking.dragging && point.distance(tracking.start) > config.tap_max_distance {
        tracking.dragging = true;
    }
    if !tracking.dragging {
        return Vec::new();
    }

    let step = config.step();
    let mut actions = Vec::new();
    while tracking.acc_x >= step {
        actions.push(Action::MoveRight);
        tracking.acc_x -= step;
    }
    while tracking.acc_x <= -step {
        actions.push(Action::MoveLeft);
        tracking.acc_x += step;
    }
    while tracking.acc_y >= step {
        actions.push(Action::SoftDrop);
        tracking.acc_y -= step;
    }
    actions
}
