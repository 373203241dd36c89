/**
* Sensor Uncertainty Mitigation buffers.
*
* SUM detector variants enlarge the well-clear thresholds by z-score scaled
* standard deviations of the reported position and velocity. Position
* buffers are constant; velocity buffers grow linearly with projection
* time. The horizontal deviations of a pair combine as independent
* variances; the horizontal σ of one aircraft is the square root of the
* largest eigenvalue of its 2×2 EW/NS/EN covariance.
*/
use crate::params::Parameters;
use libm::sqrt;
use serde::{Deserialize, Serialize};

/// Reported standard deviations of one aircraft's sensed state. All values
/// are SI and non-negative; a zeroed block disables SUM inflation for the
/// pair.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct SensorUncertainty {
    /// Horizontal position, east-west component
    pub s_ew_std: f64,
    /// Horizontal position, north-south component
    pub s_ns_std: f64,
    /// Horizontal position, east-north cross component
    pub s_en_std: f64,
    /// Vertical position
    pub sz_std: f64,
    /// Horizontal velocity, east-west component
    pub v_ew_std: f64,
    /// Horizontal velocity, north-south component
    pub v_ns_std: f64,
    /// Horizontal velocity, east-north cross component
    pub v_en_std: f64,
    /// Vertical speed
    pub vz_std: f64,
}

impl SensorUncertainty {
    pub fn is_zero(&self) -> bool {
        *self == SensorUncertainty::default()
    }

    /// Largest-eigenvalue σ of the horizontal position covariance.
    fn horizontal_position_sigma(&self) -> f64 {
        largest_eigenvalue_sigma(self.s_ew_std, self.s_ns_std, self.s_en_std)
    }

    fn horizontal_velocity_sigma(&self) -> f64 {
        largest_eigenvalue_sigma(self.v_ew_std, self.v_ns_std, self.v_en_std)
    }
}

fn largest_eigenvalue_sigma(ew: f64, ns: f64, en: f64) -> f64 {
    let a = ew * ew;
    let c = ns * ns;
    let b = en * en;
    let mid = (a + c) / 2.0;
    let off = (a - c) / 2.0;
    sqrt(mid + sqrt(off * off + b * b))
}

/// z-scaled buffers for one ownship/intruder pair, in meters and meters
/// per second.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct SumBuffers {
    pub h_pos: f64,
    pub h_vel: f64,
    pub v_pos: f64,
    pub v_vel: f64,
}

impl SumBuffers {
    /// Combine both aircraft's uncertainty blocks under the configured
    /// z-scores. `range` is the current horizontal separation; the
    /// horizontal-velocity z-score interpolates from its min to its max as
    /// range drops below the configured scaling distance.
    pub fn new(
        own: &SensorUncertainty,
        intruder: &SensorUncertainty,
        params: &Parameters,
        range: f64,
    ) -> SumBuffers {
        let sigma_h_pos = sqrt(
            sq(own.horizontal_position_sigma())
                + sq(intruder.horizontal_position_sigma()),
        );
        let sigma_h_vel = sqrt(
            sq(own.horizontal_velocity_sigma())
                + sq(intruder.horizontal_velocity_sigma()),
        );
        let sigma_v_pos = sqrt(sq(own.sz_std) + sq(intruder.sz_std));
        let sigma_v_vel = sqrt(sq(own.vz_std) + sq(intruder.vz_std));

        let z_h_vel = horizontal_velocity_z_score(params, range);
        SumBuffers {
            h_pos: params.h_pos_z_score * sigma_h_pos,
            h_vel: z_h_vel * sigma_h_vel,
            v_pos: params.v_pos_z_score * sigma_v_pos,
            v_vel: params.v_speed_z_score * sigma_v_vel,
        }
    }
}

fn sq(x: f64) -> f64 {
    x * x
}

fn horizontal_velocity_z_score(params: &Parameters, range: f64) -> f64 {
    let min = params.h_vel_z_score_min;
    let max = params.h_vel_z_score_max;
    let distance = params.h_vel_z_distance;
    if distance <= 0.0 || range >= distance {
        min
    } else {
        min + (max - min) * (1.0 - range / distance)
    }
}
