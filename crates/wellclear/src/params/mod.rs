/**
* The flat parameter record driving alerting and band generation.
*
* All values are SI (meters, meters per second, seconds, radians). The
* record groups axis bounds and steps, the kinematic maneuver profile,
* recovery and collision-avoidance settings, hysteresis and persistence,
* SUM z-scores and the logic switches. Defaults follow the DO-365 phase 1
* well-clear choices.
*/
pub mod file;

use crate::alert::{Alerter, AlerterList, Region};
use crate::geometry::{
    bank_angle_from_turn_rate, turn_rate_from_bank_angle,
};
use serde::{Deserialize, Serialize};

const NMI: f64 = 1852.0;
const FT: f64 = 0.3048;
const KNOT: f64 = 1852.0 / 3600.0;
const FPM: f64 = 0.3048 / 60.0;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Parameters {
    /// Conflict bands and alerting lookahead time
    pub lookahead_time: f64,

    // Horizontal direction axis: maximum turn to the left/right of the
    // current track, each in [0, π]. Both at π makes the axis circular.
    pub left_hdir: f64,
    pub right_hdir: f64,
    pub step_hdir: f64,

    // Horizontal speed axis
    pub min_hs: f64,
    pub max_hs: f64,
    pub step_hs: f64,
    /// Relative window below/above the current value; both zero selects
    /// the absolute range, −1 substitutes the absolute bound on that side
    pub below_relative_hs: f64,
    pub above_relative_hs: f64,

    // Vertical speed axis
    pub min_vs: f64,
    pub max_vs: f64,
    pub step_vs: f64,
    pub below_relative_vs: f64,
    pub above_relative_vs: f64,

    // Altitude axis
    pub min_alt: f64,
    pub max_alt: f64,
    pub step_alt: f64,
    pub below_relative_alt: f64,
    pub above_relative_alt: f64,

    // Kinematic profile. Turn rate and bank angle imply one another
    // through the standard-rate turn formula; setting either through the
    // typed setters zeroes the other.
    pub turn_rate: f64,
    pub bank_angle: f64,
    pub horizontal_accel: f64,
    pub vertical_accel: f64,
    pub vertical_rate: f64,

    // Recovery and collision avoidance
    pub min_horizontal_recovery: f64,
    pub min_vertical_recovery: f64,
    pub recovery_hdir: bool,
    pub recovery_hs: bool,
    pub recovery_vs: bool,
    pub recovery_alt: bool,
    pub recovery_stability_time: f64,
    pub ca_bands: bool,
    /// Multiplicative cylinder reduction per recovery retry, in (0, 1]
    pub ca_factor: f64,
    pub horizontal_nmac: f64,
    pub vertical_nmac: f64,

    // Hysteresis, persistence, M-of-N
    pub hysteresis_time: f64,
    pub persistence_time: f64,
    pub bands_persistence: bool,
    /// Per-axis escape-distance margin before a preferred direction flips
    pub persistence_preferred_hdir: f64,
    pub persistence_preferred_hs: f64,
    pub persistence_preferred_vs: f64,
    pub persistence_preferred_alt: f64,
    pub alerting_m: usize,
    pub alerting_n: usize,

    // SUM z-scores
    pub h_pos_z_score: f64,
    pub h_vel_z_score_min: f64,
    pub h_vel_z_score_max: f64,
    /// Range below which the horizontal-velocity z-score interpolates
    /// toward its max
    pub h_vel_z_distance: f64,
    pub v_pos_z_score: f64,
    pub v_speed_z_score: f64,

    // Logic switches
    pub ownship_centric_alerting: bool,
    /// Most severe region considered resolvable rather than avoid-only
    pub corrective_region: Region,
    pub conflict_crit: bool,
    pub recovery_crit: bool,

    // Designated Terminal Area
    pub dta_logic: i32,
    pub dta_latitude: f64,
    pub dta_longitude: f64,
    pub dta_radius: f64,
    pub dta_height: f64,
    /// 1-based alerter index active inside the DTA, 0 for none
    pub dta_alerter: usize,

    pub alerters: AlerterList,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            lookahead_time: 180.0,

            left_hdir: std::f64::consts::PI,
            right_hdir: std::f64::consts::PI,
            step_hdir: 1.0_f64.to_radians(),

            min_hs: 10.0 * KNOT,
            max_hs: 700.0 * KNOT,
            step_hs: 5.0 * KNOT,
            below_relative_hs: 0.0,
            above_relative_hs: 0.0,

            min_vs: -5000.0 * FPM,
            max_vs: 5000.0 * FPM,
            step_vs: 100.0 * FPM,
            below_relative_vs: 0.0,
            above_relative_vs: 0.0,

            min_alt: 100.0 * FT,
            max_alt: 50_000.0 * FT,
            step_alt: 100.0 * FT,
            below_relative_alt: 0.0,
            above_relative_alt: 0.0,

            turn_rate: 3.0_f64.to_radians(),
            bank_angle: 0.0,
            horizontal_accel: 2.0,
            vertical_accel: 0.25 * crate::units::G,
            vertical_rate: 500.0 * FPM,

            min_horizontal_recovery: 0.66 * NMI,
            min_vertical_recovery: 450.0 * FT,
            recovery_hdir: true,
            recovery_hs: true,
            recovery_vs: true,
            recovery_alt: true,
            recovery_stability_time: 3.0,
            ca_bands: false,
            ca_factor: 0.2,
            horizontal_nmac: 500.0 * FT,
            vertical_nmac: 100.0 * FT,

            hysteresis_time: 0.0,
            persistence_time: 0.0,
            bands_persistence: false,
            persistence_preferred_hdir: 0.0,
            persistence_preferred_hs: 0.0,
            persistence_preferred_vs: 0.0,
            persistence_preferred_alt: 0.0,
            alerting_m: 0,
            alerting_n: 0,

            h_pos_z_score: 0.0,
            h_vel_z_score_min: 0.0,
            h_vel_z_score_max: 0.0,
            h_vel_z_distance: 5.0 * NMI,
            v_pos_z_score: 0.0,
            v_speed_z_score: 0.0,

            ownship_centric_alerting: true,
            corrective_region: Region::Mid,
            conflict_crit: false,
            recovery_crit: false,

            dta_logic: 0,
            dta_latitude: 0.0,
            dta_longitude: 0.0,
            dta_radius: 0.0,
            dta_height: 0.0,
            dta_alerter: 0,

            alerters: AlerterList::single(Alerter::standard("default")),
        }
    }
}

impl Parameters {
    /// Setters below validate and leave the record unchanged on a bad
    /// value, returning `false`.
    pub fn set_lookahead_time(&mut self, t: f64) -> bool {
        if !(t > 0.0) {
            return false;
        }
        self.lookahead_time = t;
        true
    }

    pub fn set_left_hdir(&mut self, rad: f64) -> bool {
        if !(0.0..=std::f64::consts::PI).contains(&rad) {
            return false;
        }
        self.left_hdir = rad;
        true
    }

    pub fn set_right_hdir(&mut self, rad: f64) -> bool {
        if !(0.0..=std::f64::consts::PI).contains(&rad) {
            return false;
        }
        self.right_hdir = rad;
        true
    }

    pub fn set_step_hdir(&mut self, rad: f64) -> bool {
        if !(rad > 0.0) || rad >= crate::geometry::TWO_PI {
            return false;
        }
        self.step_hdir = rad;
        true
    }

    pub fn set_step_hs(&mut self, v: f64) -> bool {
        if !(v > 0.0) {
            return false;
        }
        self.step_hs = v;
        true
    }

    pub fn set_step_vs(&mut self, v: f64) -> bool {
        if !(v > 0.0) {
            return false;
        }
        self.step_vs = v;
        true
    }

    pub fn set_step_alt(&mut self, v: f64) -> bool {
        if !(v > 0.0) {
            return false;
        }
        self.step_alt = v;
        true
    }

    pub fn set_below_relative_vs(&mut self, v: f64) -> bool {
        if v < 0.0 && v != -1.0 {
            return false;
        }
        self.below_relative_vs = v;
        true
    }

    /// Setting the turn rate zeroes the bank angle, and conversely; the
    /// band engine derives whichever is zero from the other at the
    /// current ground speed.
    pub fn set_turn_rate(&mut self, rad_per_s: f64) -> bool {
        if rad_per_s < 0.0 {
            return false;
        }
        self.turn_rate = rad_per_s;
        self.bank_angle = 0.0;
        true
    }

    pub fn set_bank_angle(&mut self, rad: f64) -> bool {
        if !(0.0..std::f64::consts::FRAC_PI_2).contains(&rad) {
            return false;
        }
        self.bank_angle = rad;
        self.turn_rate = 0.0;
        true
    }

    pub fn set_ca_factor(&mut self, f: f64) -> bool {
        if !(f > 0.0 && f <= 1.0) {
            return false;
        }
        self.ca_factor = f;
        true
    }

    pub fn set_alerting_mofn(&mut self, m: usize, n: usize) -> bool {
        if m > n {
            return false;
        }
        self.alerting_m = m;
        self.alerting_n = n;
        true
    }

    /// Any positive value collapses to +1 and any negative to −1; this
    /// clamping is the intended semantics of the mode switch.
    pub fn set_dta_logic(&mut self, mode: i32) {
        self.dta_logic = mode.signum();
    }

    /// Effective turn rate at a ground speed, deriving from the bank
    /// angle when the turn rate is unset.
    pub fn effective_turn_rate(&self, gs: f64) -> f64 {
        if self.turn_rate > 0.0 {
            self.turn_rate
        } else if self.bank_angle > 0.0 {
            turn_rate_from_bank_angle(self.bank_angle, gs)
        } else {
            0.0
        }
    }

    pub fn effective_bank_angle(&self, gs: f64) -> f64 {
        if self.bank_angle > 0.0 {
            self.bank_angle
        } else if self.turn_rate > 0.0 {
            bank_angle_from_turn_rate(self.turn_rate, gs)
        } else {
            0.0
        }
    }

    /// Sanity report used after a file load; each entry is a violated
    /// invariant.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];
        if self.min_hs > self.max_hs {
            issues.push("min_hs above max_hs".to_string());
        }
        if self.min_vs > self.max_vs {
            issues.push("min_vs above max_vs".to_string());
        }
        if self.min_alt > self.max_alt {
            issues.push("min_alt above max_alt".to_string());
        }
        for (name, step) in [
            ("step_hdir", self.step_hdir),
            ("step_hs", self.step_hs),
            ("step_vs", self.step_vs),
            ("step_alt", self.step_alt),
        ] {
            if !(step > 0.0) {
                issues.push(format!("{name} must be positive"));
            }
        }
        if !(self.ca_factor > 0.0 && self.ca_factor <= 1.0) {
            issues.push("ca_factor outside (0, 1]".to_string());
        }
        if self.alerting_m > self.alerting_n {
            issues.push("alerting_m above alerting_n".to_string());
        }
        if !matches!(
            self.corrective_region,
            Region::Far | Region::Mid | Region::Near
        ) {
            issues.push("corrective_region must be FAR, MID or NEAR".into());
        }
        for alerter in self.alerters.iter() {
            if alerter.alert_level_for_region(self.corrective_region) == 0 {
                issues.push(format!(
                    "alerter {} has no level at or above the corrective \
                     region",
                    alerter.id
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        assert!(Parameters::default().validate().is_empty());
    }

    #[test]
    fn invalid_setter_keeps_value() {
        let mut p = Parameters::default();
        let step = p.step_hs;
        assert!(!p.set_step_hs(-1.0));
        assert_relative_eq!(p.step_hs, step);
        assert!(p.set_step_hs(2.0));
        assert_relative_eq!(p.step_hs, 2.0);
    }

    #[test]
    fn turn_rate_and_bank_are_exclusive() {
        let mut p = Parameters::default();
        assert!(p.set_bank_angle(0.35));
        assert_relative_eq!(p.turn_rate, 0.0);
        assert!(p.effective_turn_rate(100.0) > 0.0);
        assert!(p.set_turn_rate(0.05));
        assert_relative_eq!(p.bank_angle, 0.0);
        assert_relative_eq!(p.effective_turn_rate(100.0), 0.05);
    }

    #[test]
    fn dta_logic_clamps() {
        let mut p = Parameters::default();
        p.set_dta_logic(7);
        assert_eq!(p.dta_logic, 1);
        p.set_dta_logic(-3);
        assert_eq!(p.dta_logic, -1);
        p.set_dta_logic(0);
        assert_eq!(p.dta_logic, 0);
    }

    #[test]
    fn mofn_invariant() {
        let mut p = Parameters::default();
        assert!(!p.set_alerting_mofn(4, 2));
        assert!(p.set_alerting_mofn(2, 4));
        assert_eq!((p.alerting_m, p.alerting_n), (2, 4));
    }
}
