/**
* Euclidean primitives for the detection and band cores.
*
* All vectors live in a local East-North-Up frame, in SI units: meters for
* positions, meters per second for velocities. Angles are radians; tracks
* are measured clockwise from true north, so a velocity is rebuilt from
* navigation values as (gs·sin(trk), gs·cos(trk), vs).
*/
pub mod project;

use libm::{atan2, cos, fabs, sin, sqrt};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Two pi, the period of the direction axis.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Normalize an angle to [0, 2π).
pub fn to_2pi(rad: f64) -> f64 {
    let r = rad % TWO_PI;
    if r < 0.0 {
        r + TWO_PI
    } else {
        r
    }
}

/// Normalize an angle to (-π, π].
pub fn to_pi(rad: f64) -> f64 {
    let r = to_2pi(rad);
    if r > std::f64::consts::PI {
        r - TWO_PI
    } else {
        r
    }
}

/// Signed modular distance from `from` to `to`, in (-π, π].
pub fn angle_delta(from: f64, to: f64) -> f64 {
    to_pi(to - from)
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Vect2 {
    pub x: f64,
    pub y: f64,
}

impl Vect2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vect2 { x, y }
    }

    pub fn dot(&self, other: &Vect2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the cross product, positive when `other` lies
    /// counterclockwise of `self`.
    pub fn det(&self, other: &Vect2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm_sq(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        sqrt(self.norm_sq())
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vect2 {
    type Output = Vect2;
    fn add(self, rhs: Vect2) -> Vect2 {
        Vect2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vect2 {
    type Output = Vect2;
    fn sub(self, rhs: Vect2) -> Vect2 {
        Vect2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vect2 {
    type Output = Vect2;
    fn mul(self, k: f64) -> Vect2 {
        Vect2::new(self.x * k, self.y * k)
    }
}

impl Neg for Vect2 {
    type Output = Vect2;
    fn neg(self) -> Vect2 {
        Vect2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Vect3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vect3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vect3 { x, y, z }
    }

    /// Rebuild a velocity vector from track (rad, clockwise from north),
    /// ground speed (m/s) and vertical speed (m/s, positive up).
    pub fn from_trk_gs_vs(trk: f64, gs: f64, vs: f64) -> Self {
        Vect3::new(gs * sin(trk), gs * cos(trk), vs)
    }

    pub fn vect2(&self) -> Vect2 {
        Vect2::new(self.x, self.y)
    }

    pub fn dot(&self, other: &Vect3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        sqrt(self.dot(self))
    }

    /// Track of this velocity in [0, 2π), clockwise from north. Zero for a
    /// vector with no horizontal component.
    pub fn track(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            to_2pi(atan2(self.x, self.y))
        }
    }

    pub fn ground_speed(&self) -> f64 {
        self.vect2().norm()
    }

    pub fn vertical_speed(&self) -> f64 {
        self.z
    }

    /// Same horizontal direction and vertical speed, new ground speed.
    pub fn with_ground_speed(&self, gs: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(self.track(), gs, self.z)
    }

    /// Same speeds, new track.
    pub fn with_track(&self, trk: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(trk, self.ground_speed(), self.z)
    }

    pub fn with_vertical_speed(&self, vs: f64) -> Vect3 {
        Vect3::new(self.x, self.y, vs)
    }

    /// Position advanced along this vector interpreted as a velocity.
    pub fn linear(&self, pos: &Vect3, t: f64) -> Vect3 {
        Vect3::new(pos.x + self.x * t, pos.y + self.y * t, pos.z + self.z * t)
    }
}

impl Add for Vect3 {
    type Output = Vect3;
    fn add(self, rhs: Vect3) -> Vect3 {
        Vect3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vect3 {
    type Output = Vect3;
    fn sub(self, rhs: Vect3) -> Vect3 {
        Vect3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vect3 {
    type Output = Vect3;
    fn mul(self, k: f64) -> Vect3 {
        Vect3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Vect3 {
    type Output = Vect3;
    fn neg(self) -> Vect3 {
        Vect3::new(-self.x, -self.y, -self.z)
    }
}

/// Time of horizontal closest point of approach for relative state (s, v),
/// clamped to be non-negative. Zero for non-moving geometry.
pub fn tcpa(s: &Vect2, v: &Vect2) -> f64 {
    let a = v.norm_sq();
    if a == 0.0 {
        return 0.0;
    }
    let t = -s.dot(v) / a;
    if t > 0.0 {
        t
    } else {
        0.0
    }
}

/// Horizontal distance at closest point of approach, looking forward only.
pub fn dcpa(s: &Vect2, v: &Vect2) -> f64 {
    let t = tcpa(s, v);
    (*s + *v * t).norm()
}

/// Standard-rate turn: bank angle (rad) implied by a turn rate (rad/s) at
/// ground speed `gs` (m/s), and back.
pub fn bank_angle_from_turn_rate(turn_rate: f64, gs: f64) -> f64 {
    if turn_rate == 0.0 || gs == 0.0 {
        return 0.0;
    }
    libm::atan(turn_rate * gs / crate::units::G)
}

pub fn turn_rate_from_bank_angle(bank: f64, gs: f64) -> f64 {
    if bank == 0.0 || gs == 0.0 {
        return 0.0;
    }
    crate::units::G * libm::tan(bank) / gs
}

/// Absolute modular distance between two directions, in [0, π].
pub fn track_distance(a: f64, b: f64) -> f64 {
    fabs(angle_delta(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn track_conventions() {
        let east = Vect3::from_trk_gs_vs(PI / 2.0, 100.0, 0.0);
        assert_relative_eq!(east.x, 100.0, max_relative = 1e-12);
        assert_relative_eq!(east.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(east.track(), PI / 2.0, max_relative = 1e-12);

        let north = Vect3::from_trk_gs_vs(0.0, 50.0, -3.0);
        assert_relative_eq!(north.y, 50.0, max_relative = 1e-12);
        assert_relative_eq!(north.vertical_speed(), -3.0);
    }

    #[test]
    fn angle_wrapping() {
        assert_relative_eq!(to_2pi(-0.1), TWO_PI - 0.1, max_relative = 1e-12);
        assert_relative_eq!(to_pi(TWO_PI - 0.1), -0.1, max_relative = 1e-9);
        assert_relative_eq!(
            angle_delta(0.1, TWO_PI - 0.1),
            -0.2,
            max_relative = 1e-9
        );
        assert_relative_eq!(track_distance(0.05, TWO_PI - 0.05), 0.1);
    }

    #[test]
    fn cpa_head_on() {
        // 10 km apart, closing at 200 m/s
        let s = Vect2::new(10_000.0, 0.0);
        let v = Vect2::new(-200.0, 0.0);
        assert_relative_eq!(tcpa(&s, &v), 50.0, max_relative = 1e-12);
        assert_relative_eq!(dcpa(&s, &v), 0.0, epsilon = 1e-9);
        // diverging: CPA is now
        let v = Vect2::new(200.0, 0.0);
        assert_relative_eq!(tcpa(&s, &v), 0.0);
        assert_relative_eq!(dcpa(&s, &v), 10_000.0);
    }

    #[test]
    fn standard_rate_turn() {
        // 3 deg/s at 200 kt is close to a 25 deg bank
        let rate = 3.0_f64.to_radians();
        let gs = 102.9; // 200 kt in m/s
        let bank = bank_angle_from_turn_rate(rate, gs);
        assert!(bank.to_degrees() > 20.0 && bank.to_degrees() < 30.0);
        let back = turn_rate_from_bank_angle(bank, gs);
        assert_relative_eq!(back, rate, max_relative = 1e-12);
    }
}
