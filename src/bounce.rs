//! The position updater: straight-line motion with clamp-and-flip
//! reflection at the container edges.
//!
//! [`step_axis`] is the pure per-axis rule; [`BounceState`] owns the
//! animation state of one widget instance and applies the rule to both axes
//! once per tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{Point, Size};
use crate::scheduler::FrameHandle;

/// Travel direction along one axis. Offsets grow towards the right/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {
    fn signum(self) -> f32 {
        match self {
            Direction::Increasing => 1.0,
            Direction::Decreasing => -1.0,
        }
    }
}

/// Outcome of one axis update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStep {
    pub position: f32,
    pub direction: Direction,
    pub struck: bool,
}

/// Advance one axis by `delta` and reflect at the boundaries.
///
/// The valid offset range is `[0, container_span - element_span]`. A
/// candidate position at or past either end is clamped onto it, the
/// direction flips away from the edge and the step reports a strike. An
/// element larger than its container collapses the range to `[0, 0]`: the
/// offset pins at zero and every tick strikes.
pub fn step_axis(
    container_span: f32,
    element_span: f32,
    prev_pos: f32,
    direction: Direction,
    delta: f32,
) -> AxisStep {
    let bound = (container_span - element_span).max(0.0);
    let candidate = prev_pos + direction.signum() * delta;

    if candidate <= 0.0 {
        AxisStep {
            position: 0.0,
            direction: Direction::Increasing,
            struck: true,
        }
    } else if candidate >= bound {
        AxisStep {
            position: bound,
            direction: Direction::Decreasing,
            struck: true,
        }
    } else {
        AxisStep {
            position: candidate,
            direction,
            struck: false,
        }
    }
}

/// Mutable animation state of one bouncing widget.
///
/// Owned exclusively by a single widget instance and touched only from tick
/// and event callbacks on the host thread.
#[derive(Debug)]
pub struct BounceState {
    /// Top-left offset of the element relative to its container.
    pub position: Point,
    pub direction_x: Direction,
    pub direction_y: Direction,
    /// Cumulative boundary strikes across both axes; never decreases.
    pub impact_count: u64,
    /// Distance travelled per tick on each axis. Fixed at construction.
    pub speed: f32,
    /// The pending scheduled frame, if any. `None` while paused or torn
    /// down; at most one is outstanding per instance.
    pub scheduled: Option<FrameHandle>,
    /// Whether the pseudo-random start position has been applied.
    pub seeded: bool,
    seed: u64,
}

impl BounceState {
    pub fn new(speed: f32, seed: u64) -> Self {
        Self {
            position: Point::ZERO,
            direction_x: Direction::Increasing,
            direction_y: Direction::Increasing,
            impact_count: 0,
            speed,
            scheduled: None,
            seeded: false,
            seed,
        }
    }

    /// Place the element at a pseudo-random offset within `extent`.
    ///
    /// Called once, on the first tick that has geometry available. An
    /// out-of-range draw (the extent is the container, not the travel range)
    /// is pulled back by the first [`step_axis`] clamp, like any overshoot.
    pub fn seed_within(&mut self, extent: Size) {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        self.position = Point::new(
            random_span(&mut rng, extent.width),
            random_span(&mut rng, extent.height),
        );
        self.seeded = true;
    }

    /// Advance both axes one tick and return the number of boundary strikes
    /// (0, 1, or 2; a corner hit strikes both axes at once).
    pub fn advance(&mut self, container: Size, element: Size) -> u8 {
        let x = step_axis(
            container.width,
            element.width,
            self.position.x,
            self.direction_x,
            self.speed,
        );
        let y = step_axis(
            container.height,
            element.height,
            self.position.y,
            self.direction_y,
            self.speed,
        );

        self.position = Point::new(x.position, y.position);
        self.direction_x = x.direction;
        self.direction_y = y.direction;

        let strikes = u8::from(x.struck) + u8::from(y.struck);
        self.impact_count += u64::from(strikes);
        strikes
    }
}

fn random_span(rng: &mut SmallRng, span: f32) -> f32 {
    if span > 0.0 {
        rng.random_range(0.0..span)
    } else {
        0.0
    }
}
