/**
* The core orchestrator.
*
* Owns the ownship, the traffic list (insertion order, indices stable
* until removal), the wind, the parameters and the per-tick alerting
* results. Band engines receive the core by reference for each operation
* and own nothing but their caches, so the ownership graph stays acyclic.
*
* A refresh computes, per intruder: the raw alert level through the
* alerter selected by the ownship-centric or intruder-centric rule (or
* the terminal-area override), the M-of-N smoothed level, the time to
* corrective volume and the NMAC flag; plus the active-conflict sets per
* region, the terminal-area status and the most-urgent intruder.
*/
pub mod traffic;

use crate::alert::{mofn::MofNWindow, Alerter, Region};
use crate::bands::interval::Interval;
use crate::detect::{DetectorVolume, SumBuffers};
use crate::geometry::project::{Position, Projection};
use crate::geometry::{to_2pi, Vect3};
use crate::params::Parameters;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error};
pub use traffic::TrafficState;

/// Rule selecting the single intruder used for coordination epsilons.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Clone, Copy)]
pub enum UrgencyStrategy {
    /// No intruder is ever singled out
    #[default]
    None,
    /// Smallest horizontal distance at closest point of approach
    NearestCpa,
    /// Earliest time of loss of well clear at the corrective level
    SoonestViolation,
}

/// Per-intruder alerting outcome of the last refresh.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct AlertStatus {
    /// Raw alert level before smoothing
    pub raw: usize,
    /// Reported alert level after M-of-N and persistence
    pub level: usize,
    /// Entry time into the corrective-level volume, +∞ when clear
    pub time_to_corrective: f64,
    /// Current separation inside the NMAC cylinder
    pub nmac: bool,
}

impl AlertStatus {
    fn clear() -> Self {
        AlertStatus {
            raw: 0,
            level: 0,
            time_to_corrective: f64::INFINITY,
            nmac: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct DaaCore {
    pub params: Parameters,
    pub wind: Vect3,
    pub ownship: Option<TrafficState>,
    pub traffic: Vec<TrafficState>,
    pub current_time: f64,
    pub urgency: UrgencyStrategy,
    projection: Option<Projection>,
    stale: bool,
    alerts: Vec<AlertStatus>,
    /// Active-conflict intruder indices, one set per conflict region in
    /// FAR, MID, NEAR order
    conflict_acs: [Vec<usize>; 3],
    dta_status: i32,
    most_urgent: Option<usize>,
    mofn: BTreeMap<String, MofNWindow>,
    pub errors: Vec<String>,
}

fn region_slot(region: Region) -> usize {
    match region {
        Region::Far => 0,
        Region::Mid => 1,
        _ => 2,
    }
}

impl DaaCore {
    pub fn new(params: Parameters) -> Self {
        DaaCore {
            params,
            stale: true,
            ..DaaCore::default()
        }
    }

    pub fn log_error(&mut self, message: String) {
        error!("{message}");
        self.errors.push(message);
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn clear_hysteresis(&mut self) {
        self.mofn.clear();
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Set or replace the ownship. Returns `true` when hysteresis state
    /// was invalidated: identifier change, time regression, or a gap
    /// above the hysteresis time.
    pub fn set_ownship(&mut self, mut state: TrafficState) -> bool {
        let clear = match &self.ownship {
            None => true,
            Some(prev) => {
                prev.id != state.id
                    || state.time < self.current_time
                    || state.time - self.current_time
                        > self.params.hysteresis_time
            }
        };
        let new_frame = clear
            || self.projection.is_none() && state.geodetic.is_some();
        if new_frame {
            if let Some(geo) = &state.geodetic {
                self.projection =
                    Some(Projection::new(geo.latitude, geo.longitude));
            }
        }
        if let (Some(projection), Some(geo)) =
            (&self.projection, &state.geodetic)
        {
            state.pos = projection.project(geo);
        }
        state.apply_wind(&self.wind);
        self.current_time = state.time;
        self.ownship = Some(state);
        if clear {
            self.clear_hysteresis();
        }
        self.mark_stale();
        clear
    }

    /// Insert or overwrite an intruder by name; 1-based index, 0 on
    /// rejection. The ownship cannot be overwritten through this path.
    pub fn set_traffic(&mut self, mut state: TrafficState) -> usize {
        if let Some(own) = &self.ownship {
            if own.id == state.id {
                self.log_error(format!(
                    "traffic {} would overwrite the ownship",
                    state.id
                ));
                return 0;
            }
        }
        if let (Some(projection), Some(geo)) =
            (&self.projection, &state.geodetic)
        {
            state.pos = projection.project(geo);
        }
        state.apply_wind(&self.wind);
        self.mark_stale();
        if let Some(i) =
            self.traffic.iter().position(|ac| ac.id == state.id)
        {
            self.traffic[i] = state;
            i + 1
        } else {
            self.traffic.push(state);
            self.traffic.len()
        }
    }

    /// O(n) removal by name; later indices decrement.
    pub fn remove_traffic(&mut self, name: &str) -> bool {
        match self.traffic.iter().position(|ac| ac.id == name) {
            Some(i) => {
                self.traffic.remove(i);
                self.mofn.remove(name);
                self.mark_stale();
                true
            }
            None => false,
        }
    }

    pub fn find_traffic(&self, name: &str) -> Option<usize> {
        self.traffic.iter().position(|ac| ac.id == name)
    }

    pub fn set_wind(&mut self, wind: Vect3) {
        self.wind = wind;
        if let Some(own) = &mut self.ownship {
            own.apply_wind(&wind);
        }
        for ac in &mut self.traffic {
            ac.apply_wind(&wind);
        }
        self.mark_stale();
    }

    /// Advance every state along its air velocity.
    pub fn linear_projection(&mut self, dt: f64) {
        if let Some(own) = &mut self.ownship {
            own.linear_projection(dt);
        }
        for ac in &mut self.traffic {
            ac.linear_projection(dt);
        }
        self.current_time += dt;
        self.mark_stale();
    }

    /// The alerter in force for an intruder: the terminal-area override
    /// inside the fence, otherwise the ownship's or the intruder's table
    /// depending on the alerting mode.
    pub fn alerter_for(&self, intruder: &TrafficState) -> Option<&Alerter> {
        if self.dta_status != 0 && self.params.dta_alerter != 0 {
            return self.params.alerters.alerter_at(self.params.dta_alerter);
        }
        let index = if self.params.ownship_centric_alerting {
            self.ownship.as_ref().map(|own| own.alerter).unwrap_or(0)
        } else {
            intruder.alerter
        };
        self.params.alerters.alerter_at(index)
    }

    /// Combined SUM buffers of the pair, `None` when both uncertainty
    /// blocks are zero.
    pub fn buffers_for(&self, intruder: &TrafficState) -> Option<SumBuffers> {
        let own = self.ownship.as_ref()?;
        if own.uncertainty.is_zero() && intruder.uncertainty.is_zero() {
            return None;
        }
        Some(SumBuffers::new(
            &own.uncertainty,
            &intruder.uncertainty,
            &self.params,
            own.horizontal_range(intruder),
        ))
    }

    /// Raw alert level of one intruder: the largest level whose volume is
    /// entered at or before its alerting time within the band horizon.
    pub fn raw_alert_level(&self, intruder: &TrafficState) -> usize {
        let Some(own) = &self.ownship else { return 0 };
        let Some(alerter) = self.alerter_for(intruder) else {
            return 0;
        };
        let (s, v) = own.relative(intruder);
        let buffers = self.buffers_for(intruder);
        for li in (1..=alerter.most_severe_level()).rev() {
            let level = alerter.level(li).expect("level index in range");
            let horizon = self
                .params
                .lookahead_time
                .min(level.early_alerting_time);
            let cd = level.detector.conflict_data(
                &s,
                &v,
                buffers.as_ref(),
                0.0,
                horizon,
            );
            if cd.conflict_before(level.alerting_time) {
                return li;
            }
        }
        0
    }

    fn corrective_conflict_data(
        &self,
        intruder: &TrafficState,
    ) -> Option<crate::detect::ConflictData> {
        let own = self.ownship.as_ref()?;
        let alerter = self.alerter_for(intruder)?;
        let li = alerter.alert_level_for_region(self.params.corrective_region);
        let level = alerter.level(li)?;
        let (s, v) = own.relative(intruder);
        let buffers = self.buffers_for(intruder);
        Some(level.detector.conflict_data(
            &s,
            &v,
            buffers.as_ref(),
            0.0,
            self.params.lookahead_time,
        ))
    }

    /// Recompute alerting state when stale. Returns `true` when work was
    /// done, so callers know dependent caches need a refresh too.
    pub fn refresh(&mut self) -> bool {
        if !self.stale {
            return false;
        }
        self.dta_status = self.compute_dta_status();
        self.most_urgent = self.compute_most_urgent();
        let mut acs: [Vec<usize>; 3] = [vec![], vec![], vec![]];
        let mut alerts = Vec::with_capacity(self.traffic.len());
        let nmac = DetectorVolume::Cd3d {
            d: self.params.horizontal_nmac,
            h: self.params.vertical_nmac,
        };
        for i in 0..self.traffic.len() {
            let (raw, time_to_corrective, nmac_now) = {
                let intruder = &self.traffic[i];
                let Some(own) = &self.ownship else {
                    alerts.push(AlertStatus::clear());
                    continue;
                };
                let raw = self.raw_alert_level(intruder);
                let time_to_corrective = self
                    .corrective_conflict_data(intruder)
                    .map(|cd| cd.time_in)
                    .unwrap_or(f64::INFINITY);
                let (s, v) = own.relative(intruder);
                let nmac_now = nmac.violation_at(&s, &v, None);

                // active-conflict sets per region
                if let Some(alerter) = self.alerter_for(intruder) {
                    for region in [Region::Far, Region::Mid, Region::Near] {
                        let li = alerter.alert_level_for_region(region);
                        let Some(level) = alerter.level(li) else {
                            continue;
                        };
                        let horizon = self
                            .params
                            .lookahead_time
                            .min(level.early_alerting_time);
                        let buffers = self.buffers_for(intruder);
                        let cd = level.detector.conflict_data(
                            &s,
                            &v,
                            buffers.as_ref(),
                            0.0,
                            horizon,
                        );
                        if cd.conflict_before(level.alerting_time) {
                            acs[region_slot(region)].push(i);
                        }
                    }
                }
                (raw, time_to_corrective, nmac_now)
            };

            let id = self.traffic[i].id.clone();
            let window =
                self.mofn.entry(id).or_insert_with(MofNWindow::new);
            let level = window.update(
                raw,
                self.current_time,
                self.params.alerting_m,
                self.params.alerting_n,
                self.params.hysteresis_time,
                self.params.persistence_time,
            );
            alerts.push(AlertStatus {
                raw,
                level,
                time_to_corrective,
                nmac: nmac_now,
            });
        }
        self.conflict_acs = acs;
        self.alerts = alerts;
        debug!(
            "refresh: {} intruders, dta status {}",
            self.traffic.len(),
            self.dta_status
        );
        self.stale = false;
        true
    }

    pub fn alert_status(&self, idx: usize) -> Option<&AlertStatus> {
        self.alerts.get(idx)
    }

    pub fn dta_status(&self) -> i32 {
        self.dta_status
    }

    pub fn most_urgent_intruder(&self) -> Option<usize> {
        self.most_urgent
    }

    pub fn is_active_conflict(&self, idx: usize, region: Region) -> bool {
        region.is_conflict()
            && self.conflict_acs[region_slot(region)].contains(&idx)
    }

    fn compute_dta_status(&self) -> i32 {
        if self.params.dta_logic == 0 || self.params.dta_radius <= 0.0 {
            return 0;
        }
        let (Some(own), Some(projection)) =
            (&self.ownship, &self.projection)
        else {
            return 0;
        };
        let center = projection.project(&Position {
            latitude: self.params.dta_latitude,
            longitude: self.params.dta_longitude,
            altitude: 0.0,
        });
        let horizontal =
            (own.pos.vect2() - center.vect2()).norm();
        let inside = horizontal <= self.params.dta_radius
            && own.altitude() <= self.params.dta_height;
        if inside {
            self.params.dta_logic
        } else {
            0
        }
    }

    fn compute_most_urgent(&self) -> Option<usize> {
        let own = self.ownship.as_ref()?;
        match self.urgency {
            UrgencyStrategy::None => None,
            UrgencyStrategy::NearestCpa => self
                .traffic
                .iter()
                .enumerate()
                .map(|(i, ac)| {
                    let (s, v) = own.relative(ac);
                    (i, crate::geometry::dcpa(&s.vect2(), &v.vect2()))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i),
            UrgencyStrategy::SoonestViolation => self
                .traffic
                .iter()
                .enumerate()
                .map(|(i, ac)| {
                    let t = self
                        .corrective_conflict_data(ac)
                        .map(|cd| cd.time_in)
                        .unwrap_or(f64::INFINITY);
                    (i, t)
                })
                .filter(|(_, t)| t.is_finite())
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i),
        }
    }

    fn eps_h_raw(&self, intruder: &TrafficState) -> i32 {
        let Some(own) = &self.ownship else { return 0 };
        let r = (intruder.pos - own.pos).vect2();
        let v = own.gnd_vel.vect2();
        // intruder on the right of track: resolve left, and conversely
        if v.det(&r) < 0.0 {
            -1
        } else {
            1
        }
    }

    fn eps_v_raw(&self, intruder: &TrafficState) -> i32 {
        let Some(own) = &self.ownship else { return 0 };
        let dz = own.altitude() - intruder.altitude();
        if dz > 0.0 {
            1
        } else if dz < 0.0 {
            -1
        } else {
            0
        }
    }

    /// Coordination epsilon for conflict bands on a horizontal axis;
    /// non-zero only for the most-urgent intruder under the repulsive
    /// criteria flag.
    pub fn conflict_eps_h(&self, idx: usize) -> i32 {
        if !self.params.conflict_crit || self.most_urgent != Some(idx) {
            return 0;
        }
        self.traffic
            .get(idx)
            .map(|ac| self.eps_h_raw(ac))
            .unwrap_or(0)
    }

    pub fn conflict_eps_v(&self, idx: usize) -> i32 {
        if !self.params.conflict_crit || self.most_urgent != Some(idx) {
            return 0;
        }
        self.traffic
            .get(idx)
            .map(|ac| self.eps_v_raw(ac))
            .unwrap_or(0)
    }

    pub fn recovery_eps_h(&self, idx: usize) -> i32 {
        if !self.params.recovery_crit || self.most_urgent != Some(idx) {
            return 0;
        }
        self.traffic
            .get(idx)
            .map(|ac| self.eps_h_raw(ac))
            .unwrap_or(0)
    }

    pub fn recovery_eps_v(&self, idx: usize) -> i32 {
        if !self.params.recovery_crit || self.most_urgent != Some(idx) {
            return 0;
        }
        self.traffic
            .get(idx)
            .map(|ac| self.eps_v_raw(ac))
            .unwrap_or(0)
    }

    /// Headings around the current track that are in violation at the
    /// current time against one intruder at one alert level, as intervals
    /// of the unwrapped direction axis. Visualization aid; accuracy is
    /// advisory.
    pub fn contours(&self, idx: usize, level: usize) -> Vec<Interval> {
        let (Some(own), Some(intruder)) =
            (&self.ownship, self.traffic.get(idx))
        else {
            return vec![];
        };
        let Some(alerter) = self.alerter_for(intruder) else {
            return vec![];
        };
        let Some(alert_level) = alerter.level(level) else {
            return vec![];
        };
        let buffers = self.buffers_for(intruder);
        let step = self.params.step_hdir;
        let trk = own.air_vel.track();
        let steps = (std::f64::consts::PI / step).floor() as i32;
        let s = own.pos - intruder.pos;
        let mut red = vec![];
        let mut run: Option<(f64, f64)> = None;
        for k in -steps..=steps {
            let heading = trk + k as f64 * step;
            let candidate =
                own.air_vel.with_track(to_2pi(heading)) + self.wind;
            let v = candidate - intruder.gnd_vel;
            let violating =
                alert_level.detector.violation_at(&s, &v, buffers.as_ref());
            match (&mut run, violating) {
                (None, true) => run = Some((heading, heading)),
                (Some(r), true) => r.1 = heading,
                (Some(r), false) => {
                    red.push(Interval::new(r.0, r.1));
                    run = None;
                }
                (None, false) => {}
            }
        }
        if let Some(r) = run {
            red.push(Interval::new(r.0, r.1));
        }
        red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NMI: f64 = 1852.0;
    const KNOT: f64 = 1852.0 / 3600.0;

    fn east(gs_knot: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(std::f64::consts::FRAC_PI_2, gs_knot * KNOT, 0.0)
    }

    fn core_with_head_on(distance_nmi: f64) -> DaaCore {
        let mut core = DaaCore::new(Parameters::default());
        core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            0.0,
        ));
        core.set_traffic(TrafficState::euclidean(
            "intruder",
            Vect3::new(distance_nmi * NMI, 0.0, 3048.0),
            -east(200.0),
            0.0,
        ));
        core
    }

    #[test]
    fn traffic_indices_are_one_based_and_stable() {
        let mut core = core_with_head_on(40.0);
        assert_eq!(
            core.set_traffic(TrafficState::euclidean(
                "second",
                Vect3::new(10.0 * NMI, 5.0 * NMI, 3048.0),
                east(150.0),
                0.0,
            )),
            2
        );
        // overwrite keeps the slot
        assert_eq!(
            core.set_traffic(TrafficState::euclidean(
                "intruder",
                Vect3::new(39.0 * NMI, 0.0, 3048.0),
                -east(200.0),
                0.0,
            )),
            1
        );
        assert!(core.remove_traffic("intruder"));
        assert_eq!(core.find_traffic("second"), Some(0));
        // the ownship name is rejected
        assert_eq!(
            core.set_traffic(TrafficState::euclidean(
                "own",
                Vect3::default(),
                east(100.0),
                0.0,
            )),
            0
        );
        assert!(!core.errors.is_empty());
    }

    #[test]
    fn head_on_raw_alert() {
        // close head-on pair alerts at the most severe level
        let core = core_with_head_on(3.0);
        let raw = core.raw_alert_level(&core.traffic[0]);
        assert_eq!(raw, 3);
        // distant pair does not alert
        let core = core_with_head_on(40.0);
        assert_eq!(core.raw_alert_level(&core.traffic[0]), 0);
    }

    #[test]
    fn refresh_populates_alerts() {
        let mut core = core_with_head_on(3.0);
        assert!(core.refresh());
        let status = core.alert_status(0).unwrap();
        assert_eq!(status.level, 3);
        assert!(status.time_to_corrective.is_finite());
        assert!(!core.refresh());
    }

    #[test]
    fn diverging_pair_is_clear() {
        let mut core = DaaCore::new(Parameters::default());
        core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            0.0,
        ));
        core.set_traffic(TrafficState::euclidean(
            "intruder",
            Vect3::new(40.0 * NMI, 0.0, 3048.0),
            east(200.0),
            0.0,
        ));
        core.refresh();
        let status = core.alert_status(0).unwrap();
        assert_eq!(status.level, 0);
        assert!(status.time_to_corrective.is_infinite());
    }

    #[test]
    fn ownship_change_clears_hysteresis() {
        let mut core = core_with_head_on(4.0);
        core.params.hysteresis_time = 5.0;
        assert!(!core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            1.0,
        )));
        // a different identifier invalidates sliding windows
        assert!(core.set_ownship(TrafficState::euclidean(
            "other",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            2.0,
        )));
        // time regression as well
        assert!(core.set_ownship(TrafficState::euclidean(
            "other",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            1.0,
        )));
    }

    #[test]
    fn urgency_strategies() {
        let mut core = core_with_head_on(10.0);
        core.set_traffic(TrafficState::euclidean(
            "far",
            Vect3::new(30.0 * NMI, 0.2 * NMI, 3048.0),
            -east(200.0),
            0.0,
        ));
        core.urgency = UrgencyStrategy::None;
        core.mark_stale();
        core.refresh();
        assert_eq!(core.most_urgent_intruder(), None);
        core.urgency = UrgencyStrategy::SoonestViolation;
        core.mark_stale();
        core.refresh();
        assert_eq!(core.most_urgent_intruder(), Some(0));
        core.urgency = UrgencyStrategy::NearestCpa;
        core.mark_stale();
        core.refresh();
        assert_eq!(core.most_urgent_intruder(), Some(0));
    }

    #[test]
    fn head_on_contours_cover_the_nose() {
        let mut core = core_with_head_on(0.5);
        core.refresh();
        let red = core.contours(0, 3);
        assert!(!red.is_empty());
        // the current heading (east) is inside a red contour
        let trk = std::f64::consts::FRAC_PI_2;
        assert!(red.iter().any(|iv| iv.contains(trk)));
    }
}
