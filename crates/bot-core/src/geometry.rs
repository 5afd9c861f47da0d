//! Targeting math: orientation toward a point expressed as continuous turn rates.
//!
//! Angles follow the simulator's conventions. Yaw is in degrees, normalized to `[0, 360)`,
//! with 0 facing +z and 90 facing -x. Pitch is in degrees, positive when looking down.
//! A positive yaw rate increases yaw and a positive pitch rate increases pitch.

use serde::{Deserialize, Serialize};

/// Tolerance used for approximate float comparisons.
pub const EPSILON: f64 = 1e-4;

/// Beyond this distance the facing test uses the far-range rate threshold.
pub const FAR_FACING_DISTANCE: f64 = 7.0;
const FAR_FACING_MAX_RATE: f64 = 0.25;
const NEAR_FACING_MAX_RATE: f64 = 0.8;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector normalizes to itself.
    pub fn normalized(self) -> Vec3 {
        let m = self.magnitude();
        if m < EPSILON {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / m, self.y / m, self.z / m)
    }

    /// Projection onto the horizontal (x/z) plane.
    pub fn horizontal(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    pub fn is_zero(self) -> bool {
        self.approx_eq(Vec3::ZERO)
    }

    pub fn approx_eq(self, other: Vec3) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y) && approx_eq(self.z, other.z)
    }

    pub fn distance(self, other: Vec3) -> f64 {
        other.sub(self).magnitude()
    }

    /// Distance ignoring height.
    pub fn distance_xz(self, other: Vec3) -> f64 {
        other.sub(self).horizontal().magnitude()
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Wraps any angle in degrees into `[0, 360)`.
pub fn normalize_yaw(yaw: f64) -> f64 {
    let y = yaw.rem_euclid(360.0);
    if approx_eq(y, 360.0) { 0.0 } else { y }
}

/// Signed shortest sweep from `current` to `target`, in `(-180, 180]`.
pub fn signed_yaw_delta(current: f64, target: f64) -> f64 {
    let d = (normalize_yaw(target) - normalize_yaw(current)).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Unsigned angular difference, the smaller of the clockwise and counterclockwise sweeps.
pub fn yaw_difference(a: f64, b: f64) -> f64 {
    signed_yaw_delta(a, b).abs()
}

/// Stepped rate magnitude for an angular error in degrees.
///
/// Full speed far from the goal, then slow steps, then a linear taper to zero below 2
/// degrees so the agent settles instead of oscillating around the target.
pub fn rate_for_difference(diff: f64) -> f64 {
    let diff = diff.abs();
    if diff > 10.0 {
        1.0
    } else if diff > 5.0 {
        0.25
    } else if diff > 2.0 {
        0.5
    } else {
        diff / 180.0
    }
}

/// Yaw (degrees, `[0, 360)`) that faces along `direction`, or `None` when the direction has
/// no horizontal component.
pub fn target_yaw(direction: Vec3) -> Option<f64> {
    let flat = direction.horizontal();
    if flat.is_zero() {
        return None;
    }
    Some(normalize_yaw((-flat.x).atan2(flat.z).to_degrees()))
}

/// Pitch (degrees, `(-90, 90)`) that faces along `direction`. Negative means up. `None` when
/// the direction has no horizontal component.
pub fn target_pitch(direction: Vec3) -> Option<f64> {
    let dir = direction.normalized();
    let flat = dir.horizontal();
    if flat.is_zero() {
        return None;
    }
    let cos = (dir.dot(flat) / (dir.magnitude() * flat.magnitude())).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();
    Some(if dir.y > 0.0 { -angle } else { angle })
}

/// Current orientation of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
}

/// Turn rates in `[-1, 1]` that move an orientation toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TurnRates {
    pub pitch: f64,
    pub yaw: f64,
}

pub fn pitch_rate(eye: Vec3, orientation: Orientation, target: Vec3) -> f64 {
    let Some(goal) = target_pitch(target.sub(eye)) else {
        return 0.0;
    };
    let delta = goal - orientation.pitch;
    rate_for_difference(delta) * delta.signum()
}

pub fn yaw_rate(eye: Vec3, orientation: Orientation, target: Vec3) -> f64 {
    let Some(goal) = target_yaw(target.sub(eye)) else {
        return 0.0;
    };
    let delta = signed_yaw_delta(orientation.yaw, goal);
    if approx_eq(delta, 0.0) {
        return 0.0;
    }
    rate_for_difference(delta) * delta.signum()
}

pub fn turn_rates(eye: Vec3, orientation: Orientation, target: Vec3) -> TurnRates {
    TurnRates {
        pitch: pitch_rate(eye, orientation, target),
        yaw: yaw_rate(eye, orientation, target),
    }
}

/// Facing test with a distance-dependent rate threshold.
pub fn is_facing(distance: f64, rates: TurnRates) -> bool {
    let max = if distance > FAR_FACING_DISTANCE {
        FAR_FACING_MAX_RATE
    } else {
        NEAR_FACING_MAX_RATE
    };
    rates.pitch.abs() < max && rates.yaw.abs() < max
}
