/**
* The public detect-and-avoid façade.
*
* A stateful, single-threaded API meant to be driven by a flight
* computer loop: set the ownship, add or update traffic, set the wind,
* then query alerts, bands, resolutions and recovery information. Every
* setter marks the caches stale; getters refresh on demand, so they take
* `&mut self`. Setters that can invalidate sliding windows (hysteresis,
* persistence, M-of-N) also clear the hysteresis state.
*
* Values cross the API in SI; `_in` variants convert from and to any
* recognized unit. Recoverable errors accumulate in an error log the
* client can drain; they never prevent subsequent calls.
*/
use crate::alert::Region;
use crate::bands::engine::{Axis, BandsEngine};
use crate::bands::hysteresis::BandsDirection;
use crate::bands::interval::Interval;
use crate::bands::{BandsRange, RecoveryInformation};
use crate::core::{DaaCore, TrafficState, UrgencyStrategy};
use crate::detect::SensorUncertainty;
use crate::geometry::project::Position;
use crate::geometry::Vect3;
use crate::params::file::{format_parameters, parse_parameters_with};
use crate::params::Parameters;
use crate::units;
use std::path::Path;
use tracing::warn;

#[derive(Debug)]
pub struct WellClear {
    core: DaaCore,
    hdir: BandsEngine,
    hs: BandsEngine,
    vs: BandsEngine,
    alt: BandsEngine,
}

impl Default for WellClear {
    fn default() -> Self {
        WellClear::new()
    }
}

impl WellClear {
    pub fn new() -> Self {
        WellClear::with_parameters(Parameters::default())
    }

    pub fn with_parameters(params: Parameters) -> Self {
        WellClear {
            core: DaaCore::new(params),
            hdir: BandsEngine::new(Axis::HorizontalDirection),
            hs: BandsEngine::new(Axis::HorizontalSpeed),
            vs: BandsEngine::new(Axis::VerticalSpeed),
            alt: BandsEngine::new(Axis::Altitude),
        }
    }

    fn ensure_fresh(&mut self) {
        if self.core.refresh() {
            self.hdir.refresh(&self.core);
            self.hs.refresh(&self.core);
            self.vs.refresh(&self.core);
            self.alt.refresh(&self.core);
        }
    }

    fn engine(&self, axis: Axis) -> &BandsEngine {
        match axis {
            Axis::HorizontalDirection => &self.hdir,
            Axis::HorizontalSpeed => &self.hs,
            Axis::VerticalSpeed => &self.vs,
            Axis::Altitude => &self.alt,
        }
    }

    fn clear_engine_hysteresis(&mut self) {
        self.hdir.clear_hysteresis();
        self.hs.clear_hysteresis();
        self.vs.clear_hysteresis();
        self.alt.clear_hysteresis();
    }

    // ---- parameters ----------------------------------------------------

    pub fn parameters(&self) -> &Parameters {
        &self.core.params
    }

    pub fn set_parameters(&mut self, params: Parameters) {
        for issue in params.validate() {
            self.core.log_error(format!("parameters: {issue}"));
        }
        self.core.params = params;
        self.core.mark_stale();
        self.clear_engine_hysteresis();
        self.core.clear_hysteresis();
    }

    /// Tolerant load: warnings are logged, malformed files are rejected
    /// as a whole and the previous parameters stay in force.
    pub fn load_parameters_from_str(&mut self, text: &str) -> bool {
        match parse_parameters_with(&self.core.params, text) {
            Ok((params, warnings)) => {
                for w in warnings {
                    warn!("{w}");
                    self.core.errors.push(w);
                }
                self.set_parameters(params);
                true
            }
            Err(err) => {
                for line in err.lines {
                    self.core.log_error(format!(
                        "parameters line {}: {} ({})",
                        line.line, line.text, line.reason
                    ));
                }
                false
            }
        }
    }

    pub fn load_parameters_from_file(&mut self, path: &Path) -> bool {
        match std::fs::read_to_string(path) {
            Ok(text) => self.load_parameters_from_str(&text),
            Err(err) => {
                self.core
                    .log_error(format!("cannot read {path:?}: {err}"));
                false
            }
        }
    }

    pub fn save_parameters_to_string(&self) -> String {
        format_parameters(&self.core.params)
    }

    pub fn save_parameters_to_file(&mut self, path: &Path) -> bool {
        match std::fs::write(path, self.save_parameters_to_string()) {
            Ok(()) => true,
            Err(err) => {
                self.core
                    .log_error(format!("cannot write {path:?}: {err}"));
                false
            }
        }
    }

    fn apply(&mut self, ok: bool, what: &str) -> bool {
        if ok {
            self.core.mark_stale();
        } else {
            self.core.log_error(format!("invalid value for {what}"));
        }
        ok
    }

    fn apply_hysteresis(&mut self, ok: bool, what: &str) -> bool {
        let ok = self.apply(ok, what);
        if ok {
            self.clear_engine_hysteresis();
            self.core.clear_hysteresis();
        }
        ok
    }

    pub fn set_lookahead_time(&mut self, t: f64) -> bool {
        let ok = self.core.params.set_lookahead_time(t);
        self.apply(ok, "lookahead_time")
    }

    pub fn set_lookahead_time_in(&mut self, t: f64, unit: &str) -> bool {
        match units::from_unit(t, unit) {
            Some(si) => self.set_lookahead_time(si),
            None => self.apply(false, "lookahead_time unit"),
        }
    }

    pub fn set_left_hdir(&mut self, rad: f64) -> bool {
        let ok = self.core.params.set_left_hdir(rad);
        self.apply(ok, "left_hdir")
    }

    pub fn set_right_hdir(&mut self, rad: f64) -> bool {
        let ok = self.core.params.set_right_hdir(rad);
        self.apply(ok, "right_hdir")
    }

    pub fn set_step_hdir(&mut self, rad: f64) -> bool {
        let ok = self.core.params.set_step_hdir(rad);
        self.apply(ok, "step_hdir")
    }

    pub fn set_step_hs(&mut self, v: f64) -> bool {
        let ok = self.core.params.set_step_hs(v);
        self.apply(ok, "step_hs")
    }

    pub fn set_step_vs(&mut self, v: f64) -> bool {
        let ok = self.core.params.set_step_vs(v);
        self.apply(ok, "step_vs")
    }

    pub fn set_step_alt(&mut self, v: f64) -> bool {
        let ok = self.core.params.set_step_alt(v);
        self.apply(ok, "step_alt")
    }

    /// Writes the vertical-speed window, not the horizontal-speed one.
    pub fn set_below_relative_vertical_speed(&mut self, v: f64) -> bool {
        let ok = self.core.params.set_below_relative_vs(v);
        self.apply(ok, "below_relative_vs")
    }

    pub fn set_turn_rate(&mut self, rad_per_s: f64) -> bool {
        let ok = self.core.params.set_turn_rate(rad_per_s);
        self.apply(ok, "turn_rate")
    }

    pub fn set_bank_angle(&mut self, rad: f64) -> bool {
        let ok = self.core.params.set_bank_angle(rad);
        self.apply(ok, "bank_angle")
    }

    pub fn set_ca_bands(&mut self, enabled: bool) {
        self.core.params.ca_bands = enabled;
        self.core.mark_stale();
    }

    pub fn set_ca_factor(&mut self, f: f64) -> bool {
        let ok = self.core.params.set_ca_factor(f);
        self.apply(ok, "ca_factor")
    }

    pub fn set_corrective_region(&mut self, region: Region) -> bool {
        if !region.is_conflict() {
            return self.apply(false, "corrective_region");
        }
        self.core.params.corrective_region = region;
        self.apply(true, "corrective_region")
    }

    pub fn set_alerting_mofn(&mut self, m: usize, n: usize) -> bool {
        let ok = self.core.params.set_alerting_mofn(m, n);
        self.apply_hysteresis(ok, "alerting_mofn")
    }

    pub fn set_hysteresis_time(&mut self, t: f64) -> bool {
        if t < 0.0 {
            return self.apply(false, "hysteresis_time");
        }
        self.core.params.hysteresis_time = t;
        self.apply_hysteresis(true, "hysteresis_time")
    }

    pub fn set_persistence_time(&mut self, t: f64) -> bool {
        if t < 0.0 {
            return self.apply(false, "persistence_time");
        }
        self.core.params.persistence_time = t;
        self.apply_hysteresis(true, "persistence_time")
    }

    pub fn set_bands_persistence(&mut self, enabled: bool) {
        self.core.params.bands_persistence = enabled;
        self.core.mark_stale();
        self.clear_engine_hysteresis();
        self.core.clear_hysteresis();
    }

    /// Any positive mode collapses to +1 and any negative to −1.
    pub fn set_dta_logic(&mut self, mode: i32) {
        self.core.params.set_dta_logic(mode);
        self.core.mark_stale();
    }

    pub fn set_dta_geofence(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        height: f64,
    ) -> bool {
        if radius < 0.0 || height < 0.0 {
            return self.apply(false, "dta geofence");
        }
        self.core.params.dta_latitude = latitude;
        self.core.params.dta_longitude = longitude;
        self.core.params.dta_radius = radius;
        self.core.params.dta_height = height;
        self.apply(true, "dta geofence")
    }

    pub fn set_dta_alerter(&mut self, index: usize) -> bool {
        if index > self.core.params.alerters.len() {
            return self.apply(false, "dta_alerter");
        }
        self.core.params.dta_alerter = index;
        self.apply(true, "dta_alerter")
    }

    pub fn set_ownship_centric_alerting(&mut self, enabled: bool) {
        self.core.params.ownship_centric_alerting = enabled;
        self.core.mark_stale();
    }

    pub fn set_conflict_criteria(&mut self, enabled: bool) {
        self.core.params.conflict_crit = enabled;
        self.core.mark_stale();
    }

    pub fn set_recovery_criteria(&mut self, enabled: bool) {
        self.core.params.recovery_crit = enabled;
        self.core.mark_stale();
    }

    pub fn set_urgency_strategy(&mut self, strategy: UrgencyStrategy) {
        self.core.urgency = strategy;
        self.core.mark_stale();
    }

    // ---- ownship, traffic, wind ---------------------------------------

    pub fn set_ownship_euclidean(
        &mut self,
        id: &str,
        pos: Vect3,
        vel: Vect3,
        time: f64,
    ) {
        let cleared = self
            .core
            .set_ownship(TrafficState::euclidean(id, pos, vel, time));
        if cleared {
            self.clear_engine_hysteresis();
        }
    }

    pub fn set_ownship_geodetic(
        &mut self,
        id: &str,
        position: Position,
        vel: Vect3,
        time: f64,
    ) {
        let mut state = TrafficState::euclidean(id, Vect3::default(), vel, time);
        state.geodetic = Some(position);
        let cleared = self.core.set_ownship(state);
        if cleared {
            self.clear_engine_hysteresis();
        }
    }

    /// 1-based index of the inserted or updated intruder, 0 on
    /// rejection.
    pub fn set_traffic_euclidean(
        &mut self,
        id: &str,
        pos: Vect3,
        vel: Vect3,
        time: f64,
    ) -> usize {
        self.core
            .set_traffic(TrafficState::euclidean(id, pos, vel, time))
    }

    pub fn set_traffic_geodetic(
        &mut self,
        id: &str,
        position: Position,
        vel: Vect3,
        time: f64,
    ) -> usize {
        if self.core.projection().is_none() {
            self.core.log_error(format!(
                "geodetic traffic {id} before a geodetic ownship"
            ));
            return 0;
        }
        let mut state =
            TrafficState::euclidean(id, Vect3::default(), vel, time);
        state.geodetic = Some(position);
        self.core.set_traffic(state)
    }

    pub fn set_traffic_uncertainty(
        &mut self,
        name: &str,
        uncertainty: SensorUncertainty,
    ) -> bool {
        match self.core.find_traffic(name) {
            Some(i) => {
                self.core.traffic[i].uncertainty = uncertainty;
                self.core.mark_stale();
                true
            }
            None => {
                self.core
                    .log_error(format!("unknown aircraft {name}"));
                false
            }
        }
    }

    pub fn set_traffic_alerter(&mut self, name: &str, alerter: &str) -> bool {
        let index = self.core.params.alerters.index_of(alerter);
        if index == 0 {
            self.core
                .log_error(format!("unknown alerter {alerter}"));
            return false;
        }
        match self.core.find_traffic(name) {
            Some(i) => {
                self.core.traffic[i].alerter = index;
                self.core.mark_stale();
                true
            }
            None => {
                self.core
                    .log_error(format!("unknown aircraft {name}"));
                false
            }
        }
    }

    pub fn remove_traffic(&mut self, name: &str) -> bool {
        self.core.remove_traffic(name)
    }

    pub fn set_wind_velocity(&mut self, wind: Vect3) {
        self.core.set_wind(wind);
    }

    pub fn linear_projection(&mut self, dt: f64) {
        self.core.linear_projection(dt);
    }

    /// Ownship plus intruders.
    pub fn number_of_aircraft(&self) -> usize {
        match self.core.ownship {
            Some(_) => 1 + self.core.traffic.len(),
            None => self.core.traffic.len(),
        }
    }

    /// 0 for the ownship, 1-based for intruders, −1 when absent.
    pub fn aircraft_index(&self, name: &str) -> isize {
        if let Some(own) = &self.core.ownship {
            if own.id == name {
                return 0;
            }
        }
        match self.core.find_traffic(name) {
            Some(i) => i as isize + 1,
            None => -1,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.core.current_time
    }

    // ---- alerting ------------------------------------------------------

    /// Smoothed alert level of the 1-based intruder index, −1 when the
    /// index is out of range.
    pub fn alert_level(&mut self, ac_idx: usize) -> i32 {
        self.ensure_fresh();
        if ac_idx == 0 || ac_idx > self.core.traffic.len() {
            self.core
                .log_error(format!("aircraft index {ac_idx} out of range"));
            return -1;
        }
        self.core
            .alert_status(ac_idx - 1)
            .map(|status| status.level as i32)
            .unwrap_or(-1)
    }

    /// Entry time into the corrective volume, +∞ when clear, NaN for a
    /// bad index.
    pub fn time_to_corrective_volume(&mut self, ac_idx: usize) -> f64 {
        self.ensure_fresh();
        if ac_idx == 0 || ac_idx > self.core.traffic.len() {
            self.core
                .log_error(format!("aircraft index {ac_idx} out of range"));
            return f64::NAN;
        }
        self.core
            .alert_status(ac_idx - 1)
            .map(|status| status.time_to_corrective)
            .unwrap_or(f64::NAN)
    }

    pub fn nmac(&mut self, ac_idx: usize) -> bool {
        self.ensure_fresh();
        ac_idx >= 1
            && self
                .core
                .alert_status(ac_idx - 1)
                .map(|status| status.nmac)
                .unwrap_or(false)
    }

    pub fn dta_status(&mut self) -> i32 {
        self.ensure_fresh();
        self.core.dta_status()
    }

    /// 1-based index of the most urgent intruder, −1 when the strategy
    /// designates none.
    pub fn most_urgent_aircraft(&mut self) -> isize {
        self.ensure_fresh();
        self.core
            .most_urgent_intruder()
            .map(|i| i as isize + 1)
            .unwrap_or(-1)
    }

    // ---- bands ---------------------------------------------------------

    pub fn band_length(&mut self, axis: Axis) -> isize {
        self.ensure_fresh();
        self.engine(axis).length()
    }

    pub fn bands(&mut self, axis: Axis) -> &[BandsRange] {
        self.ensure_fresh();
        self.engine(axis).ranges()
    }

    pub fn horizontal_direction_bands(&mut self) -> &[BandsRange] {
        self.bands(Axis::HorizontalDirection)
    }

    pub fn horizontal_speed_bands(&mut self) -> &[BandsRange] {
        self.bands(Axis::HorizontalSpeed)
    }

    pub fn vertical_speed_bands(&mut self) -> &[BandsRange] {
        self.bands(Axis::VerticalSpeed)
    }

    pub fn altitude_bands(&mut self) -> &[BandsRange] {
        self.bands(Axis::Altitude)
    }

    pub fn band_interval(&mut self, axis: Axis, i: usize) -> Option<Interval> {
        self.ensure_fresh();
        self.engine(axis).interval(i)
    }

    pub fn band_region(&mut self, axis: Axis, i: usize) -> Region {
        self.ensure_fresh();
        self.engine(axis).region(i)
    }

    pub fn band_index_of(&mut self, axis: Axis, value: f64) -> Option<usize> {
        self.ensure_fresh();
        self.engine(axis).index_of(value)
    }

    pub fn region_at(&mut self, axis: Axis, value: f64) -> Region {
        self.ensure_fresh();
        self.engine(axis).region_at(value)
    }

    /// Nearest conflict-free value in a direction: NaN without a
    /// conflict, ±∞ when the half-window is saturated.
    pub fn resolution(&mut self, axis: Axis, dir: BandsDirection) -> f64 {
        self.ensure_fresh();
        self.engine(axis).resolution(dir)
    }

    pub fn resolution_in(
        &mut self,
        axis: Axis,
        dir: BandsDirection,
        unit: &str,
    ) -> f64 {
        let si = self.resolution(axis, dir);
        units::to_unit(si, unit).unwrap_or(f64::NAN)
    }

    pub fn preferred_direction(
        &mut self,
        axis: Axis,
    ) -> Option<BandsDirection> {
        self.ensure_fresh();
        self.engine(axis).preferred_direction()
    }

    pub fn recovery_information(&mut self, axis: Axis) -> RecoveryInformation {
        self.ensure_fresh();
        self.engine(axis).recovery_information()
    }

    pub fn peripheral_aircraft(
        &mut self,
        axis: Axis,
        region: Region,
    ) -> Vec<String> {
        self.ensure_fresh();
        self.engine(axis).acs_peripheral_bands(region).to_vec()
    }

    /// Largest delay before the maneuver against a 1-based intruder
    /// stops working. NaN without a current conflict or for a bad index,
    /// −∞ when it is already too late.
    pub fn last_time_to_maneuver(
        &mut self,
        axis: Axis,
        ac_idx: usize,
    ) -> f64 {
        self.ensure_fresh();
        if ac_idx == 0 || ac_idx > self.core.traffic.len() {
            self.core
                .log_error(format!("aircraft index {ac_idx} out of range"));
            return f64::NAN;
        }
        self.engine(axis)
            .last_time_to_maneuver(&self.core, ac_idx - 1)
    }

    /// Red heading contours of a 1-based intruder at one alert level.
    pub fn horizontal_contours(
        &mut self,
        ac_idx: usize,
        level: usize,
    ) -> Vec<Interval> {
        self.ensure_fresh();
        if ac_idx == 0 || ac_idx > self.core.traffic.len() {
            self.core
                .log_error(format!("aircraft index {ac_idx} out of range"));
            return vec![];
        }
        self.core.contours(ac_idx - 1, level)
    }

    pub fn drain_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.core.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const NMI: f64 = 1852.0;
    const FT: f64 = 0.3048;
    const KNOT: f64 = 1852.0 / 3600.0;

    const CD3D_CONF: &str = "\
lookahead_time = 180 [s]
alerters = cd3d
cd3d_alert_1_detector = CD3D
cd3d_alert_1_D = 5 [nmi]
cd3d_alert_1_H = 1000 [ft]
cd3d_alert_1_alerting_time = 60 [s]
cd3d_alert_1_early_alerting_time = 60 [s]
cd3d_alert_1_region = NEAR
";

    fn cd3d_daa() -> WellClear {
        let mut daa = WellClear::new();
        assert!(daa.load_parameters_from_str(CD3D_CONF));
        daa
    }

    fn east(gs_knot: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(FRAC_PI_2, gs_knot * KNOT, 0.0)
    }

    #[test]
    fn converging_head_on() {
        // ownship eastbound at 10 000 ft, intruder 10 nmi ahead coming
        // back at the same altitude: 400 kt closure, violation of the
        // 5 nmi cylinder in (10 − 5)/400 h = 45 s
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        let idx = daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        assert_eq!(idx, 1);
        assert_eq!(daa.alert_level(1), 1);
        assert_relative_eq!(
            daa.time_to_corrective_volume(1),
            45.0,
            max_relative = 1e-9
        );
        // a NEAR band covers the nose, symmetric about east
        assert_eq!(daa.region_at(Axis::HorizontalDirection, FRAC_PI_2), Region::Near);
        let low = daa.resolution(Axis::HorizontalDirection, BandsDirection::Lower);
        let up = daa.resolution(Axis::HorizontalDirection, BandsDirection::Upper);
        assert!(low.is_finite() || up.is_finite());
        if low.is_finite() && up.is_finite() {
            assert_relative_eq!(
                FRAC_PI_2 - low,
                up - FRAC_PI_2,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn diverging_traffic_is_quiet() {
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        assert_eq!(daa.alert_level(1), 0);
        assert!(daa.time_to_corrective_volume(1).is_infinite());
        let ranges = daa.horizontal_direction_bands().to_vec();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].region, Region::None);
        assert!(daa
            .last_time_to_maneuver(Axis::HorizontalDirection, 1)
            .is_nan());
    }

    #[test]
    fn crossing_traffic_prefers_the_open_side() {
        // intruder crossing from the left at a right angle: every left
        // heading stays in conflict, the right side opens up
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(0.0, 6.0 * NMI, 10_000.0 * FT),
            Vect3::from_trk_gs_vs(std::f64::consts::PI, 200.0 * KNOT, 0.0),
            0.0,
        );
        assert_eq!(daa.alert_level(1), 1);
        assert_eq!(
            daa.region_at(Axis::HorizontalDirection, FRAC_PI_2),
            Region::Near
        );
        let up = daa.resolution(Axis::HorizontalDirection, BandsDirection::Upper);
        assert!(up.is_finite());
        assert!(up > FRAC_PI_2);
        assert_eq!(
            daa.preferred_direction(Axis::HorizontalDirection),
            Some(BandsDirection::Upper)
        );
    }

    #[test]
    fn recovery_inside_the_well_clear_volume() {
        // co-speed intruder parked half a mile ahead, slightly above:
        // the corrective region saturates and recovery reports an
        // escape toward the configured recovery cylinder
        let mut daa = WellClear::new();
        daa.set_ca_bands(true);
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(0.5 * NMI, 0.0, 10_000.0 * FT + 200.0 * FT),
            east(200.0),
            0.0,
        );
        assert!(daa.alert_level(1) > 0);
        let info = daa.recovery_information(Axis::HorizontalDirection);
        assert!(info.is_active());
        if info.time_to_recovery.is_finite() {
            assert!(info.time_to_recovery >= 0.0);
            assert!(
                info.recovery_horizontal_distance
                    <= daa.parameters().min_horizontal_recovery
            );
            let has_recovery_band = daa
                .horizontal_direction_bands()
                .iter()
                .any(|r| r.region == Region::Recovery);
            assert!(has_recovery_band);
        }
    }

    #[test]
    fn speed_axis_prefers_slowing_down() {
        // head-on: every faster speed reaches the cylinder sooner, only
        // slowing down delays the loss past the 60 s horizon
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        let val = 200.0 * KNOT;
        assert_eq!(daa.region_at(Axis::HorizontalSpeed, val), Region::Near);
        let low = daa.resolution(Axis::HorizontalSpeed, BandsDirection::Lower);
        let up = daa.resolution(Axis::HorizontalSpeed, BandsDirection::Upper);
        assert!(low.is_finite());
        assert!(low < val);
        assert_eq!(up, f64::INFINITY);
        assert_eq!(
            daa.preferred_direction(Axis::HorizontalSpeed),
            Some(BandsDirection::Lower)
        );
    }

    #[test]
    fn vertical_speed_escapes_are_symmetric() {
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        assert_eq!(daa.region_at(Axis::VerticalSpeed, 0.0), Region::Near);
        let low = daa.resolution(Axis::VerticalSpeed, BandsDirection::Lower);
        let up = daa.resolution(Axis::VerticalSpeed, BandsDirection::Upper);
        // climb or descend fast enough to open 1000 ft before the loss
        assert!(low.is_finite() && up.is_finite());
        assert!(up > 0.0 && low < 0.0);
        assert_relative_eq!(-low, up, max_relative = 1e-6);
        // the domain is covered
        let total: f64 = daa
            .vertical_speed_bands()
            .iter()
            .map(|r| r.interval.up - r.interval.low)
            .sum();
        let p = daa.parameters();
        assert_relative_eq!(
            total,
            p.max_vs - p.min_vs,
            max_relative = 1e-9
        );
    }

    #[test]
    fn altitude_axis_recovers_through_a_climb() {
        // the 500 fpm vertical rate cannot open 1000 ft before the loss,
        // so every altitude target is red; the recovery cylinder only
        // asks for 450 ft, which a level-off 500 ft above provides
        let mut daa = cd3d_daa();
        assert!(daa.set_step_alt(500.0 * FT));
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        let info = daa.recovery_information(Axis::Altitude);
        assert!(info.is_active());
        // recovery is possible right away: the reported time is exactly
        // the stability dwell
        assert_relative_eq!(
            info.time_to_recovery,
            daa.parameters().recovery_stability_time,
            max_relative = 1e-9
        );
        assert_eq!(info.recovery_nfactor, 0);
        assert_relative_eq!(
            info.recovery_vertical_distance,
            450.0 * FT,
            max_relative = 1e-9
        );
        assert!(daa
            .altitude_bands()
            .iter()
            .any(|r| r.region == Region::Recovery));
    }

    #[test]
    fn contours_are_saturated_inside_the_volume() {
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(2.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        // inside a position-only cylinder every heading is red now
        let red = daa.horizontal_contours(1, 1);
        assert!(!red.is_empty());
        assert!(red.iter().any(|iv| iv.contains(FRAC_PI_2)));
        assert!(daa.horizontal_contours(9, 1).is_empty());
    }

    #[test]
    fn mofn_smooths_the_first_tick() {
        let mut daa = cd3d_daa();
        assert!(daa.set_alerting_mofn(2, 4));
        // the window survives 1 Hz ticks only within the hysteresis time
        assert!(daa.set_hysteresis_time(10.0));
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            0.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 10_000.0 * FT),
            -east(200.0),
            0.0,
        );
        // one raw hit among the last four is not enough
        assert_eq!(daa.alert_level(1), 0);
        // second consecutive hit raises the alert
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            east(200.0),
            1.0,
        );
        daa.set_traffic_euclidean(
            "intruder",
            Vect3::new(10.0 * NMI - 205.78, 0.0, 10_000.0 * FT),
            -east(200.0),
            1.0,
        );
        assert_eq!(daa.alert_level(1), 1);
    }

    #[test]
    fn modular_direction_window() {
        // ownship heading 5°: 355° sits in the same logical interval
        let mut daa = cd3d_daa();
        daa.set_ownship_euclidean(
            "own",
            Vect3::new(0.0, 0.0, 10_000.0 * FT),
            Vect3::from_trk_gs_vs(5.0_f64.to_radians(), 200.0 * KNOT, 0.0),
            0.0,
        );
        assert_eq!(daa.band_length(Axis::HorizontalDirection), 1);
        assert_eq!(
            daa.band_index_of(
                Axis::HorizontalDirection,
                355.0_f64.to_radians()
            ),
            Some(0)
        );
    }

    #[test]
    fn error_log_drains() {
        let mut daa = cd3d_daa();
        assert_eq!(daa.alert_level(7), -1);
        let errors = daa.drain_errors();
        assert!(!errors.is_empty());
        assert!(daa.drain_errors().is_empty());
    }

    #[test]
    fn bad_parameter_file_is_rejected_whole() {
        let mut daa = WellClear::new();
        let before = daa.parameters().clone();
        assert!(!daa.load_parameters_from_str("step_hs = giraffe\n"));
        assert_eq!(daa.parameters(), &before);
        assert!(!daa.drain_errors().is_empty());
    }

    #[test]
    fn setters_validate_and_log() {
        let mut daa = WellClear::new();
        assert!(!daa.set_lookahead_time(-10.0));
        assert!(!daa.set_ca_factor(1.5));
        assert!(!daa.set_alerting_mofn(5, 2));
        assert!(daa.set_lookahead_time_in(2.0, "s"));
        assert!(!daa.set_lookahead_time_in(2.0, "parsec"));
        assert_eq!(daa.drain_errors().len(), 4);
    }

    #[test]
    fn dta_overrides_the_alerter_inside_the_fence() {
        let mut daa = WellClear::new();
        // terminal alerter with a tight cylinder
        let mut params = Parameters::default();
        params.alerters.push(crate::alert::Alerter::single(
            "terminal",
            crate::detect::DetectorVolume::Cd3d {
                d: 1.0 * NMI,
                h: 450.0 * FT,
            },
            30.0,
        ));
        daa.set_parameters(params);
        daa.set_dta_logic(5); // clamps to +1
        assert_eq!(daa.parameters().dta_logic, 1);
        assert!(daa.set_dta_alerter(2));
        assert!(daa.set_dta_geofence(40.0, -105.0, 5.0 * NMI, 2000.0 * FT));
        // geodetic ownship inside the fence, low
        daa.set_ownship_geodetic(
            "own",
            Position {
                latitude: 40.0,
                longitude: -105.0,
                altitude: 500.0 * FT,
            },
            east(120.0),
            0.0,
        );
        assert_eq!(daa.dta_status(), 1);
        // outside the fence the status drops back to 0
        daa.set_ownship_geodetic(
            "own",
            Position {
                latitude: 41.0,
                longitude: -105.0,
                altitude: 500.0 * FT,
            },
            east(120.0),
            0.0,
        );
        assert_eq!(daa.dta_status(), 0);
    }
}
