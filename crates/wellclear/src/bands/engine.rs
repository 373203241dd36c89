/**
* The real-band engine, one instance per maneuver axis.
*
* Wraps the integer-band sweeper with axis semantics: scales integer
* steps back to SI values, works in an unwrapped window around the
* current value so the direction axis crosses the 0/2π seam as a single
* logical interval, composes per-region none sets across all intruders
* at all alert levels, computes recovery bands by a bisection on a time
* pivot, and orders the output as coloured ranges.
*
* For the direction axis the reported intervals live in the window
* `[val − left, val + right]`; values may run below 0 or above 2π and
* wrap onto the compass accordingly.
*/
use super::hysteresis::{BandsDirection, DirectionHysteresis, ResolutionPersistence};
use super::interval::{Interval, IntervalSet};
use super::sweep::{none_integer_bands, Trajectory};
use super::{BandsRange, RecoveryInformation};
use crate::alert::Region;
use crate::core::{DaaCore, TrafficState};
use crate::detect::DetectorVolume;
use crate::geometry::{to_2pi, Vect3, TWO_PI};
use crate::params::Parameters;
use serde::Serialize;

/// Integration step of kinematic trajectories, seconds.
const TRAJ_STEP: f64 = 1.0;
/// Granularity of the recovery and last-time-to-maneuver bisections.
const TIME_GRAIN: f64 = 0.5;

const TINY: f64 = 1e-8;

#[derive(Debug, PartialEq, Eq, Serialize, Clone, Copy)]
pub enum Axis {
    HorizontalDirection,
    HorizontalSpeed,
    VerticalSpeed,
    Altitude,
}

impl Axis {
    pub fn own_value(&self, own: &TrafficState) -> f64 {
        match self {
            Axis::HorizontalDirection => own.air_vel.track(),
            Axis::HorizontalSpeed => own.air_vel.ground_speed(),
            Axis::VerticalSpeed => own.air_vel.vertical_speed(),
            Axis::Altitude => own.altitude(),
        }
    }

    pub fn step(&self, p: &Parameters) -> f64 {
        match self {
            Axis::HorizontalDirection => p.step_hdir,
            Axis::HorizontalSpeed => p.step_hs,
            Axis::VerticalSpeed => p.step_vs,
            Axis::Altitude => p.step_alt,
        }
    }

    fn absolute_range(&self, p: &Parameters) -> (f64, f64) {
        match self {
            Axis::HorizontalDirection => (0.0, TWO_PI),
            Axis::HorizontalSpeed => (p.min_hs, p.max_hs),
            Axis::VerticalSpeed => (p.min_vs, p.max_vs),
            Axis::Altitude => (p.min_alt, p.max_alt),
        }
    }

    fn relative_pair(&self, p: &Parameters) -> (f64, f64) {
        match self {
            Axis::HorizontalDirection => (p.left_hdir, p.right_hdir),
            Axis::HorizontalSpeed => {
                (p.below_relative_hs, p.above_relative_hs)
            }
            Axis::VerticalSpeed => (p.below_relative_vs, p.above_relative_vs),
            Axis::Altitude => (p.below_relative_alt, p.above_relative_alt),
        }
    }

    fn recovery_allowed(&self, p: &Parameters) -> bool {
        match self {
            Axis::HorizontalDirection => p.recovery_hdir,
            Axis::HorizontalSpeed => p.recovery_hs,
            Axis::VerticalSpeed => p.recovery_vs,
            Axis::Altitude => p.recovery_alt,
        }
    }

    fn max_delta_preferred(&self, p: &Parameters) -> f64 {
        match self {
            Axis::HorizontalDirection => p.persistence_preferred_hdir,
            Axis::HorizontalSpeed => p.persistence_preferred_hs,
            Axis::VerticalSpeed => p.persistence_preferred_vs,
            Axis::Altitude => p.persistence_preferred_alt,
        }
    }

    /// Coordination epsilon applicable to this axis for one intruder.
    fn conflict_eps(&self, core: &DaaCore, idx: usize) -> i32 {
        match self {
            Axis::HorizontalDirection | Axis::HorizontalSpeed => {
                core.conflict_eps_h(idx)
            }
            Axis::VerticalSpeed | Axis::Altitude => core.conflict_eps_v(idx),
        }
    }

    fn recovery_eps(&self, core: &DaaCore, idx: usize) -> i32 {
        match self {
            Axis::HorizontalDirection | Axis::HorizontalSpeed => {
                core.recovery_eps_h(idx)
            }
            Axis::VerticalSpeed | Axis::Altitude => core.recovery_eps_v(idx),
        }
    }
}

/// Resolved axis window for one refresh, linear even for the direction
/// axis (unwrapped around the current value).
#[derive(Debug, Clone, Copy)]
struct Domain {
    val: f64,
    min_val: f64,
    max_val: f64,
    step: f64,
    mino: i32,
    maxo: i32,
    circular: bool,
}

impl Domain {
    /// Map a raw axis value into the unwrapped window when modular.
    fn unwrap_value(&self, value: f64) -> f64 {
        if self.circular {
            self.val + crate::geometry::angle_delta(self.val, value)
        } else {
            value
        }
    }
}

fn region_slot(region: Region) -> usize {
    match region {
        Region::Far => 0,
        Region::Mid => 1,
        _ => 2,
    }
}

#[derive(Debug)]
pub struct BandsEngine {
    pub axis: Axis,
    valid: bool,
    domain: Option<Domain>,
    ranges: Vec<BandsRange>,
    recovery: RecoveryInformation,
    resolution_low: f64,
    resolution_up: f64,
    preferred: Option<BandsDirection>,
    peripheral: [Vec<String>; 3],
    dir_hysteresis: DirectionHysteresis,
    persistence: ResolutionPersistence,
}

impl BandsEngine {
    pub fn new(axis: Axis) -> Self {
        BandsEngine {
            axis,
            valid: false,
            domain: None,
            ranges: vec![],
            recovery: RecoveryInformation::inactive(),
            resolution_low: f64::NAN,
            resolution_up: f64::NAN,
            preferred: None,
            peripheral: [vec![], vec![], vec![]],
            dir_hysteresis: DirectionHysteresis::default(),
            persistence: ResolutionPersistence::default(),
        }
    }

    pub fn clear_hysteresis(&mut self) {
        self.dir_hysteresis.reset();
        self.persistence.reset();
    }

    /// Number of coloured ranges, −1 while no ownship is set or the axis
    /// window is empty.
    pub fn length(&self) -> isize {
        if self.valid {
            self.ranges.len() as isize
        } else {
            -1
        }
    }

    pub fn interval(&self, i: usize) -> Option<Interval> {
        self.ranges.get(i).map(|r| r.interval)
    }

    pub fn region(&self, i: usize) -> Region {
        self.ranges
            .get(i)
            .map(|r| r.region)
            .unwrap_or(Region::Unknown)
    }

    pub fn ranges(&self) -> &[BandsRange] {
        &self.ranges
    }

    pub fn index_of(&self, value: f64) -> Option<usize> {
        let dom = self.domain.as_ref()?;
        let v = dom.unwrap_value(value);
        self.ranges.iter().position(|r| r.interval.contains(v))
    }

    pub fn region_at(&self, value: f64) -> Region {
        self.index_of(value)
            .map(|i| self.region(i))
            .unwrap_or(Region::Unknown)
    }

    /// Nearest conflict-free value on one side of the current value. NaN
    /// when the current value is already conflict-free, ±∞ when the
    /// whole half-window is red.
    pub fn resolution(&self, dir: BandsDirection) -> f64 {
        match dir {
            BandsDirection::Lower => self.resolution_low,
            BandsDirection::Upper => self.resolution_up,
        }
    }

    pub fn preferred_direction(&self) -> Option<BandsDirection> {
        self.preferred
    }

    pub fn recovery_information(&self) -> RecoveryInformation {
        self.recovery
    }

    /// Aircraft that restrict this axis for a region without being
    /// active conflicts.
    pub fn acs_peripheral_bands(&self, region: Region) -> &[String] {
        if region.is_conflict() {
            &self.peripheral[region_slot(region)]
        } else {
            &[]
        }
    }

    fn resolve_domain(
        &self,
        own: &TrafficState,
        p: &Parameters,
    ) -> Option<Domain> {
        let val = self.axis.own_value(own);
        let step = self.axis.step(p);
        if !(step > 0.0) {
            return None;
        }
        let (abs_min, abs_max) = self.axis.absolute_range(p);
        let (below, above) = self.axis.relative_pair(p);
        let (min_val, max_val, circular) = match self.axis {
            Axis::HorizontalDirection => {
                let circular = below + above >= TWO_PI - TINY;
                (val - below, val + above, circular)
            }
            _ => {
                if below == 0.0 && above == 0.0 {
                    (abs_min, abs_max, false)
                } else {
                    let low = if below < 0.0 {
                        abs_min
                    } else {
                        (val - below).max(abs_min)
                    };
                    let up = if above < 0.0 {
                        abs_max
                    } else {
                        (val + above).min(abs_max)
                    };
                    (low, up, false)
                }
            }
        };
        if min_val > max_val {
            return None;
        }
        let mino = -libm::floor((val - min_val) / step + TINY) as i32;
        let maxo = libm::floor((max_val - val) / step + TINY) as i32;
        if maxo < mino {
            return None;
        }
        Some(Domain {
            val,
            min_val,
            max_val,
            step,
            mino,
            maxo,
            circular,
        })
    }

    /// Candidate trajectory for a target value on this axis.
    fn candidate(
        &self,
        own: &TrafficState,
        wind: &Vect3,
        p: &Parameters,
        target: f64,
        horizon: f64,
    ) -> Trajectory {
        match self.axis {
            Axis::HorizontalDirection => Trajectory::turn(
                own.pos,
                own.air_vel,
                *wind,
                to_2pi(target),
                p.effective_turn_rate(own.air_vel.ground_speed()),
                TRAJ_STEP,
                horizon,
            ),
            Axis::HorizontalSpeed => Trajectory::speed(
                own.pos,
                own.air_vel,
                *wind,
                target.max(0.0),
                p.horizontal_accel,
                TRAJ_STEP,
                horizon,
            ),
            Axis::VerticalSpeed => Trajectory::vertical_speed(
                own.pos,
                own.air_vel,
                *wind,
                target,
                p.vertical_accel,
                TRAJ_STEP,
                horizon,
            ),
            Axis::Altitude => Trajectory::altitude(
                own.pos,
                own.air_vel,
                *wind,
                target,
                p.vertical_accel,
                p.vertical_rate,
                TRAJ_STEP,
                horizon,
            ),
        }
    }

    /// Conflict-free value set contributed by one intruder under one
    /// detector, lifted from integer steps to axis values.
    #[allow(clippy::too_many_arguments)]
    fn intruder_none_set(
        &self,
        core: &DaaCore,
        own: &TrafficState,
        intruder: &TrafficState,
        detector: &DetectorVolume,
        b: f64,
        t: f64,
        recovery: Option<(&DetectorVolume, f64)>,
        eps: i32,
        dom: &Domain,
    ) -> IntervalSet {
        let buffers = core.buffers_for(intruder);
        let bands = none_integer_bands(
            detector,
            recovery,
            buffers.as_ref(),
            dom.mino,
            dom.maxo,
            eps,
            b,
            t,
            |k| {
                self.candidate(
                    own,
                    &core.wind,
                    &core.params,
                    dom.val + k as f64 * dom.step,
                    t,
                )
            },
            &intruder.pos,
            &intruder.gnd_vel,
        );
        let mut set = IntervalSet::empty();
        for band in bands {
            let low = if band.lb == dom.mino {
                dom.min_val
            } else {
                dom.val + band.lb as f64 * dom.step
            };
            let up = if band.ub == dom.maxo {
                dom.max_val
            } else {
                dom.val + band.ub as f64 * dom.step
            };
            set.union_interval(&Interval::new(low, up));
        }
        set
    }

    /// Intersection over all intruders of the recovery none set for a
    /// cylinder, with the conflict window starting at `pivot` and the
    /// NMAC volume enforced on `[0, pivot]` when CA is enabled.
    fn recovery_none_set(
        &self,
        core: &DaaCore,
        own: &TrafficState,
        dom: &Domain,
        det: &DetectorVolume,
        nmac: &DetectorVolume,
        pivot: f64,
    ) -> IntervalSet {
        let mut set =
            IntervalSet::single(dom.min_val, dom.max_val);
        let rec = if core.params.ca_bands {
            Some((nmac, pivot))
        } else {
            None
        };
        for (i, intruder) in core.traffic.iter().enumerate() {
            if core.alerter_for(intruder).is_none() {
                continue;
            }
            let eps = self.axis.recovery_eps(core, i);
            let iset = self.intruder_none_set(
                core,
                own,
                intruder,
                det,
                pivot,
                core.params.lookahead_time,
                rec,
                eps,
                dom,
            );
            set.intersect(&iset);
            if set.is_empty() {
                break;
            }
        }
        set
    }

    /// Recovery search: smallest time pivot whose none set is non-empty,
    /// shrinking the recovery cylinder multiplicatively toward NMAC when
    /// collision avoidance is enabled.
    fn compute_recovery(
        &self,
        core: &DaaCore,
        own: &TrafficState,
        dom: &Domain,
    ) -> (RecoveryInformation, IntervalSet) {
        let p = &core.params;
        let t_look = p.lookahead_time;
        let nmac = DetectorVolume::Cd3d {
            d: p.horizontal_nmac,
            h: p.vertical_nmac,
        };
        let mut d = p.min_horizontal_recovery.max(p.horizontal_nmac);
        let mut h = p.min_vertical_recovery.max(p.vertical_nmac);
        let mut nfactor = 0u32;
        loop {
            let det = DetectorVolume::Cd3d { d, h };
            let at_horizon =
                self.recovery_none_set(core, own, dom, &det, &nmac, t_look);
            if at_horizon.is_empty() {
                let can_shrink = p.ca_bands
                    && (d > p.horizontal_nmac || h > p.vertical_nmac);
                if can_shrink {
                    d = (d * p.ca_factor).max(p.horizontal_nmac);
                    h = (h * p.ca_factor).max(p.vertical_nmac);
                    nfactor += 1;
                    continue;
                }
                return (
                    RecoveryInformation {
                        time_to_recovery: f64::NEG_INFINITY,
                        recovery_horizontal_distance: d,
                        recovery_vertical_distance: h,
                        recovery_nfactor: nfactor,
                    },
                    IntervalSet::empty(),
                );
            }
            let now =
                self.recovery_none_set(core, own, dom, &det, &nmac, 0.0);
            let (pivot, set) = if !now.is_empty() {
                (0.0, now)
            } else {
                let mut lo = 0.0;
                let mut hi = t_look;
                let mut best = at_horizon;
                while hi - lo > TIME_GRAIN {
                    let mid = 0.5 * (lo + hi);
                    let s = self
                        .recovery_none_set(core, own, dom, &det, &nmac, mid);
                    if s.is_empty() {
                        lo = mid;
                    } else {
                        hi = mid;
                        best = s;
                    }
                }
                (hi, best)
            };
            return (
                RecoveryInformation {
                    time_to_recovery: pivot + p.recovery_stability_time,
                    recovery_horizontal_distance: d,
                    recovery_vertical_distance: h,
                    recovery_nfactor: nfactor,
                },
                set,
            );
        }
    }

    pub fn refresh(&mut self, core: &DaaCore) {
        self.valid = false;
        self.ranges.clear();
        self.recovery = RecoveryInformation::inactive();
        self.resolution_low = f64::NAN;
        self.resolution_up = f64::NAN;
        self.preferred = None;
        self.peripheral = [vec![], vec![], vec![]];
        self.domain = None;

        let Some(own) = core.ownship.as_ref() else {
            self.clear_hysteresis();
            return;
        };
        let Some(dom) = self.resolve_domain(own, &core.params) else {
            return;
        };
        self.domain = Some(dom);

        // none sets per conflict region, most severe first
        let full = IntervalSet::single(dom.min_val, dom.max_val);
        let mut none: [IntervalSet; 3] =
            [full.clone(), full.clone(), full.clone()];
        for region in Region::CONFLICT {
            let slot = region_slot(region);
            for (i, intruder) in core.traffic.iter().enumerate() {
                let Some(alerter) = core.alerter_for(intruder) else {
                    continue;
                };
                let li = alerter.alert_level_for_region(region);
                let Some(level) = alerter.level(li) else {
                    continue;
                };
                let detector = level.detector;
                let horizon = core
                    .params
                    .lookahead_time
                    .min(level.early_alerting_time);
                let eps = self.axis.conflict_eps(core, i);
                let iset = self.intruder_none_set(
                    core, own, intruder, &detector, 0.0, horizon, None, eps,
                    &dom,
                );
                if iset != full {
                    none[slot].intersect(&iset);
                    if !core.is_active_conflict(i, region) {
                        self.peripheral[slot].push(intruder.id.clone());
                    }
                }
            }
        }

        // band persistence re-asserts the previous conflict interval
        let corrective = core.params.corrective_region;
        let cslot = region_slot(corrective);
        if core.params.bands_persistence {
            if let Some((low, up)) = self.persistence.containing(dom.val) {
                let keep_out = IntervalSet::single(
                    low.max(dom.min_val),
                    up.min(dom.max_val),
                )
                .complement_within(dom.min_val, dom.max_val);
                none[cslot].intersect(&keep_out);
            }
        } else {
            self.persistence.clear();
        }

        // recovery when the corrective region saturates
        let mut recovery_none: Option<IntervalSet> = None;
        if none[cslot].is_empty()
            && self.axis.recovery_allowed(&core.params)
            && !(self.axis == Axis::HorizontalDirection
                && core.dta_status() == -1)
        {
            let (info, set) = self.compute_recovery(core, own, &dom);
            self.recovery = info;
            if info.time_to_recovery.is_finite() {
                recovery_none = Some(set);
            }
        }

        // coloured ranges from the elementary breakpoints
        let mut cuts = vec![dom.min_val, dom.max_val];
        for set in none.iter().chain(recovery_none.iter()) {
            for iv in set.iter() {
                cuts.push(iv.low);
                cuts.push(iv.up);
            }
        }
        cuts.retain(|c| (dom.min_val..=dom.max_val).contains(c));
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() < TINY);
        for pair in cuts.windows(2) {
            let (low, up) = (pair[0], pair[1]);
            let mid = 0.5 * (low + up);
            let region = if recovery_none
                .as_ref()
                .is_some_and(|set| set.contains(mid))
            {
                Region::Recovery
            } else if !none[region_slot(Region::Near)].contains(mid) {
                Region::Near
            } else if !none[region_slot(Region::Mid)].contains(mid) {
                Region::Mid
            } else if !none[region_slot(Region::Far)].contains(mid) {
                Region::Far
            } else {
                Region::None
            };
            match self.ranges.last_mut() {
                Some(last) if last.region == region => {
                    last.interval.up = up;
                }
                _ => self.ranges.push(BandsRange {
                    interval: Interval::new(low, up),
                    region,
                }),
            }
        }

        // resolutions and the preferred direction
        let effective = recovery_none.as_ref().unwrap_or(&none[cslot]);
        if effective.contains(dom.val) {
            self.persistence.clear();
        } else {
            let up = effective.nearest_above(dom.val);
            let low = effective.nearest_below(dom.val);
            self.resolution_up = up.unwrap_or(f64::INFINITY);
            self.resolution_low = low.unwrap_or(f64::NEG_INFINITY);
            self.persistence
                .store(self.resolution_low, self.resolution_up);
            let dist_up = self.resolution_up - dom.val;
            let dist_low = dom.val - self.resolution_low;
            let actual = if (dist_up - dist_low).abs() < TINY {
                self.dir_hysteresis
                    .held()
                    .unwrap_or(BandsDirection::Upper)
            } else if dist_up < dist_low {
                BandsDirection::Upper
            } else {
                BandsDirection::Lower
            };
            self.preferred = Some(self.dir_hysteresis.update(
                actual,
                dist_low,
                dist_up,
                self.axis.max_delta_preferred(&core.params),
                core.params.persistence_time,
                core.current_time,
            ));
        }
        self.valid = true;
    }

    /// Largest time at which delaying the maneuver still leaves an
    /// escape: both aircraft are projected linearly to the pivot, which
    /// must show no violation and a non-empty integer band. NaN without
    /// a current corrective conflict, −∞ when it is already too late.
    pub fn last_time_to_maneuver(&self, core: &DaaCore, idx: usize) -> f64 {
        let Some(own) = core.ownship.as_ref() else {
            return f64::NAN;
        };
        let Some(intruder) = core.traffic.get(idx) else {
            return f64::NAN;
        };
        let Some(alerter) = core.alerter_for(intruder) else {
            return f64::NAN;
        };
        let li =
            alerter.alert_level_for_region(core.params.corrective_region);
        let Some(level) = alerter.level(li) else {
            return f64::NAN;
        };
        let detector = level.detector;
        let buffers = core.buffers_for(intruder);
        let horizon =
            core.params.lookahead_time.min(level.early_alerting_time);
        let (s, v) = own.relative(intruder);
        let cd =
            detector.conflict_data(&s, &v, buffers.as_ref(), 0.0, horizon);
        if !cd.conflict_before(level.alerting_time) {
            return f64::NAN;
        }

        let feasible = |t: f64| -> bool {
            let mut own2 = own.clone();
            own2.linear_projection(t);
            let mut intr2 = intruder.clone();
            intr2.linear_projection(t);
            let (s2, v2) = own2.relative(&intr2);
            if detector.violation_at(&s2, &v2, buffers.as_ref()) {
                return false;
            }
            let Some(dom2) = self.resolve_domain(&own2, &core.params)
            else {
                return false;
            };
            let free = none_integer_bands(
                &detector,
                None,
                buffers.as_ref(),
                dom2.mino,
                dom2.maxo,
                0,
                0.0,
                horizon,
                |k| {
                    self.candidate(
                        &own2,
                        &core.wind,
                        &core.params,
                        dom2.val + k as f64 * dom2.step,
                        horizon,
                    )
                },
                &intr2.pos,
                &intr2.gnd_vel,
            );
            !free.is_empty()
        };

        if !feasible(0.0) {
            return f64::NEG_INFINITY;
        }
        // the search ends at the conflict entry: past it the question is
        // moot, and post-encounter times would look feasible again
        let t_end = core.params.lookahead_time.min(cd.time_in);
        if feasible(t_end) {
            return t_end;
        }
        let mut lo = 0.0;
        let mut hi = t_end;
        while hi - lo > TIME_GRAIN {
            let mid = 0.5 * (lo + hi);
            if feasible(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DaaCore;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const NMI: f64 = 1852.0;
    const KNOT: f64 = 1852.0 / 3600.0;

    fn east(gs_knot: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(FRAC_PI_2, gs_knot * KNOT, 0.0)
    }

    fn head_on_core(distance_nmi: f64) -> DaaCore {
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
        core.refresh();
        core
    }

    #[test]
    fn no_ownship_yields_sentinel() {
        let mut core = DaaCore::new(Parameters::default());
        core.refresh();
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert_eq!(engine.length(), -1);
        assert!(engine.resolution(BandsDirection::Upper).is_nan());
    }

    #[test]
    fn ranges_cover_the_direction_circle() {
        let core = head_on_core(10.0);
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert!(engine.length() > 0);
        let total: f64 = engine
            .ranges()
            .iter()
            .map(|r| r.interval.up - r.interval.low)
            .sum();
        assert_relative_eq!(total, TWO_PI, max_relative = 1e-9);
        // adjacent ranges carry distinct regions
        for pair in engine.ranges().windows(2) {
            assert_ne!(pair[0].region, pair[1].region);
            assert_relative_eq!(
                pair[0].interval.up,
                pair[1].interval.low,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn head_on_paints_the_nose_red() {
        let core = head_on_core(10.0);
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        let at_val = engine.region_at(FRAC_PI_2);
        assert!(at_val.is_conflict());
        // a hard turn is conflict free
        assert_eq!(engine.region_at(FRAC_PI_2 + 2.0), Region::None);
        // resolutions exist on both sides
        assert!(engine.resolution(BandsDirection::Upper).is_finite());
        assert!(engine.resolution(BandsDirection::Lower).is_finite());
        assert!(engine.preferred_direction().is_some());
    }

    #[test]
    fn clear_geometry_has_no_bands() {
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
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert_eq!(engine.length(), 1);
        assert_eq!(engine.region(0), Region::None);
        assert!(engine.resolution(BandsDirection::Upper).is_nan());
        assert!(engine
            .last_time_to_maneuver(&core, 0)
            .is_nan());
    }

    #[test]
    fn modular_window_crosses_the_seam() {
        // ownship heading 5°: the full circle window spans the seam
        let mut core = DaaCore::new(Parameters::default());
        core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            Vect3::from_trk_gs_vs(5.0_f64.to_radians(), 100.0, 0.0),
            0.0,
        ));
        core.refresh();
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert_eq!(engine.length(), 1);
        // 355° unwraps to −5° and lands in the single range
        let index = engine.index_of(355.0_f64.to_radians());
        assert_eq!(index, Some(0));
        assert_eq!(engine.region_at(355.0_f64.to_radians()), Region::None);
    }

    #[test]
    fn recovery_on_saturated_corrective_region() {
        // intruder well inside the recovery volume with zero relative
        // speed: no conflict-free maneuver remains, recovery kicks in
        let mut params = Parameters::default();
        params.ca_bands = true;
        let mut core = DaaCore::new(params);
        core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            0.0,
        ));
        core.set_traffic(TrafficState::euclidean(
            "intruder",
            Vect3::new(0.5 * NMI, 0.0, 3048.0 + 200.0 * 0.3048),
            east(200.0),
            0.0,
        ));
        core.refresh();
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        let info = engine.recovery_information();
        assert!(info.is_active());
        assert!(
            engine
                .ranges()
                .iter()
                .any(|r| r.region == Region::Recovery)
                || info.time_to_recovery == f64::NEG_INFINITY
        );
    }

    #[test]
    fn vertical_offset_paints_a_far_ring() {
        // 550 ft of separation sits between the preventive (700 ft) and
        // corrective (450 ft) vertical thresholds: only the FAR level
        // fires, so the current track is FAR-coloured
        let mut core = DaaCore::new(Parameters::default());
        core.set_ownship(TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3048.0),
            east(200.0),
            0.0,
        ));
        core.set_traffic(TrafficState::euclidean(
            "intruder",
            Vect3::new(10.0 * NMI, 0.0, 3048.0 + 550.0 * 0.3048),
            -east(200.0),
            0.0,
        ));
        core.refresh();
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert_eq!(engine.region_at(FRAC_PI_2), Region::Far);
        // the corrective region stays open: no resolution is needed
        assert!(engine.resolution(BandsDirection::Upper).is_nan());
    }

    #[test]
    fn peripheral_aircraft_restrict_without_alerting() {
        // head-on at 11 nmi: the loss is inside the early horizon (75 s)
        // but past the alerting time (55 s), so the intruder restricts
        // the bands without raising an alert
        let core = head_on_core(11.0);
        assert_eq!(core.alert_status(0).unwrap().raw, 0);
        let mut engine = BandsEngine::new(Axis::HorizontalDirection);
        engine.refresh(&core);
        assert_eq!(engine.region_at(FRAC_PI_2), Region::Mid);
        let mid: Vec<_> =
            engine.acs_peripheral_bands(Region::Mid).to_vec();
        assert_eq!(mid, vec!["intruder".to_string()]);
        // the warning level's shorter horizon never sees the conflict
        assert!(engine.acs_peripheral_bands(Region::Near).is_empty());
    }

    #[test]
    fn last_time_to_maneuver_decreases_with_urgency() {
        let far = head_on_core(15.0);
        let near = head_on_core(6.0);
        let engine = BandsEngine::new(Axis::HorizontalDirection);
        let t_far = engine.last_time_to_maneuver(&far, 0);
        let t_near = engine.last_time_to_maneuver(&near, 0);
        assert!(t_far.is_nan() || t_far >= 0.0);
        // the closer encounter leaves less time
        if t_far.is_finite() && t_near.is_finite() {
            assert!(t_near <= t_far);
        }
    }
}
