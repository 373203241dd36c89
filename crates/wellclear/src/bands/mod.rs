/**
* Maneuver guidance bands.
*
* One band engine exists per maneuver axis (horizontal direction,
* horizontal speed, vertical speed, altitude). Each engine sweeps a
* family of candidate ownship trajectories, composes the conflict-free
* sets across intruders and alert levels, and orders the result as a
* sequence of coloured ranges covering the axis domain.
*/
pub mod engine;
pub mod hysteresis;
pub mod interval;
pub mod sweep;

use crate::alert::Region;
use interval::Interval;
use serde::Serialize;

/// One coloured range of an axis domain. Adjacent ranges of the output
/// carry distinct regions.
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub struct BandsRange {
    pub interval: Interval,
    pub region: Region,
}

/// Outcome of the recovery search on one axis. `time_to_recovery` is NaN
/// while the axis is not in recovery and −∞ when no recovery exists even
/// inside the NMAC cylinder.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct RecoveryInformation {
    pub time_to_recovery: f64,
    /// Horizontal separation the recovery cylinder guarantees
    pub recovery_horizontal_distance: f64,
    /// Vertical separation the recovery cylinder guarantees
    pub recovery_vertical_distance: f64,
    /// Number of multiplicative shrinkages toward the NMAC cylinder
    pub recovery_nfactor: u32,
}

impl RecoveryInformation {
    pub fn inactive() -> Self {
        RecoveryInformation {
            time_to_recovery: f64::NAN,
            recovery_horizontal_distance: f64::NAN,
            recovery_vertical_distance: f64::NAN,
            recovery_nfactor: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.time_to_recovery.is_nan()
    }
}
