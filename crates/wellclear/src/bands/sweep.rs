/**
* The integer-band sweeper.
*
* Candidate maneuvers along one axis form a one-parameter family indexed
* by signed integer steps around the current value. For each step the
* ownship trajectory is built either instantaneously (the new value holds
* from t = 0) or kinematically (a finite-rate profile to the target, then
* cruise), and checked conflict-free against one intruder over a window
* [B, T] under a detector volume, plus an optional recovery volume over
* [0, B].
*
* Kinematic trajectories are piecewise-linear sample chains: closed-form
* positions at each integration step during the maneuver phase, chord
* velocities on the inner segments, and an analytic linear tail from the
* last sample. Maneuvers change the air velocity; positions drift with
* air velocity plus wind.
*/
use crate::detect::{DetectorVolume, SumBuffers};
use crate::geometry::{angle_delta, Vect3};
use serde::Serialize;

/// A maximal run of conflict-free integer steps.
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub struct IntegerBand {
    pub lb: i32,
    pub ub: i32,
}

/// Sampled ownship motion: `(time, position, velocity)` knots of a
/// piecewise-linear path. The last sample's velocity is the cruise
/// velocity, valid forever after.
#[derive(Debug, Clone)]
pub struct Trajectory {
    samples: Vec<(f64, Vect3, Vect3)>,
}

impl Trajectory {
    /// A single linear segment from t = 0.
    pub fn linear(pos: Vect3, vel: Vect3) -> Self {
        Trajectory {
            samples: vec![(0.0, pos, vel)],
        }
    }

    /// Constant turn rate from the current air track to `target_trk`,
    /// then straight flight. Falls back to an instantaneous track change
    /// when the turn rate or the integration step is degenerate.
    pub fn turn(
        pos: Vect3,
        air: Vect3,
        wind: Vect3,
        target_trk: f64,
        turn_rate: f64,
        dt: f64,
        horizon: f64,
    ) -> Self {
        let wind = Vect3::new(wind.x, wind.y, 0.0);
        let gs = air.ground_speed();
        let trk0 = air.track();
        let delta = angle_delta(trk0, target_trk);
        if turn_rate <= 0.0 || dt <= 0.0 || gs <= 0.0 || delta == 0.0 {
            let new_air = air.with_track(target_trk);
            return Trajectory::linear(pos, new_air + wind);
        }
        let omega = turn_rate * delta.signum();
        let duration = (delta / omega).min(horizon);
        let mut samples = vec![];
        let mut t = 0.0;
        loop {
            let trk = trk0 + omega * t;
            // exact circular arc in the air mass, drifting with the wind
            let arc = Vect3::new(
                (gs / omega) * (libm::cos(trk0) - libm::cos(trk)),
                (gs / omega) * (libm::sin(trk) - libm::sin(trk0)),
                air.z * t,
            );
            let here = pos + wind * t + arc;
            let vel = Vect3::from_trk_gs_vs(trk, gs, air.z) + wind;
            samples.push((t, here, vel));
            if t >= duration {
                break;
            }
            t = (t + dt).min(duration);
        }
        Trajectory { samples }
    }

    /// Constant horizontal acceleration to `target_gs`, then cruise.
    pub fn speed(
        pos: Vect3,
        air: Vect3,
        wind: Vect3,
        target_gs: f64,
        accel: f64,
        dt: f64,
        horizon: f64,
    ) -> Self {
        let wind = Vect3::new(wind.x, wind.y, 0.0);
        let gs0 = air.ground_speed();
        let delta = target_gs - gs0;
        if accel <= 0.0 || dt <= 0.0 || delta == 0.0 {
            return Trajectory::linear(
                pos,
                air.with_ground_speed(target_gs) + wind,
            );
        }
        let trk = air.track();
        let dir = Vect3::from_trk_gs_vs(trk, 1.0, 0.0);
        let a = accel * delta.signum();
        let duration = (delta / a).min(horizon);
        let mut samples = vec![];
        let mut t = 0.0;
        loop {
            let dist = gs0 * t + 0.5 * a * t * t;
            let here = pos + wind * t + dir * dist + Vect3::new(0.0, 0.0, air.z * t);
            let vel = dir * (gs0 + a * t) + wind + Vect3::new(0.0, 0.0, air.z);
            samples.push((t, here, vel));
            if t >= duration {
                break;
            }
            t = (t + dt).min(duration);
        }
        Trajectory { samples }
    }

    /// Constant vertical acceleration to `target_vs`, then cruise.
    pub fn vertical_speed(
        pos: Vect3,
        air: Vect3,
        wind: Vect3,
        target_vs: f64,
        vaccel: f64,
        dt: f64,
        horizon: f64,
    ) -> Self {
        let wind = Vect3::new(wind.x, wind.y, 0.0);
        let vz0 = air.z;
        let delta = target_vs - vz0;
        if vaccel <= 0.0 || dt <= 0.0 || delta == 0.0 {
            return Trajectory::linear(
                pos,
                air.with_vertical_speed(target_vs) + wind,
            );
        }
        let a = vaccel * delta.signum();
        let duration = (delta / a).min(horizon);
        let horizontal = Vect3::new(air.x, air.y, 0.0) + wind;
        let mut samples = vec![];
        let mut t = 0.0;
        loop {
            let dz = vz0 * t + 0.5 * a * t * t;
            let here = horizontal.linear(&pos, t) + Vect3::new(0.0, 0.0, dz);
            let vel = Vect3::new(
                horizontal.x,
                horizontal.y,
                vz0 + a * t,
            );
            samples.push((t, here, vel));
            if t >= duration {
                break;
            }
            t = (t + dt).min(duration);
        }
        Trajectory { samples }
    }

    /// Vertical acceleration to the configured climb or descent rate,
    /// constant rate toward the target altitude, deceleration to level
    /// off. Integrated numerically at the step.
    pub fn altitude(
        pos: Vect3,
        air: Vect3,
        wind: Vect3,
        target_alt: f64,
        vaccel: f64,
        vrate: f64,
        dt: f64,
        horizon: f64,
    ) -> Self {
        let wind = Vect3::new(wind.x, wind.y, 0.0);
        if vaccel <= 0.0 || vrate <= 0.0 || dt <= 0.0 {
            // level flight at the target altitude from t = 0
            let here = Vect3::new(pos.x, pos.y, target_alt);
            return Trajectory::linear(
                here,
                air.with_vertical_speed(0.0) + wind,
            );
        }
        let horizontal = Vect3::new(air.x, air.y, 0.0) + wind;
        let mut samples = vec![];
        let mut t = 0.0;
        let mut z = pos.z;
        let mut vz = air.z;
        loop {
            let here = Vect3::new(
                pos.x + horizontal.x * t,
                pos.y + horizontal.y * t,
                z,
            );
            let level = (target_alt - z).abs() < 1e-9 && vz.abs() < 1e-9;
            let vel = Vect3::new(
                horizontal.x,
                horizontal.y,
                if level { 0.0 } else { vz },
            );
            samples.push((t, here, vel));
            if level || t >= horizon {
                break;
            }
            let sign = (target_alt - z).signum();
            let remaining = (target_alt - z).abs();
            // decelerate when the braking arc plus one step reaches the
            // target, never reversing through zero
            let braking = vz * vz / (2.0 * vaccel);
            let want = if vz.signum() == sign
                && remaining <= braking + vz.abs() * dt
            {
                let slower = vz - sign * vaccel * dt;
                if slower.signum() == vz.signum() {
                    slower
                } else {
                    0.0
                }
            } else {
                (vz + sign * vaccel * dt).clamp(-vrate, vrate)
            };
            let dz = (vz + want) / 2.0 * dt;
            if dz.signum() == sign && remaining <= dz.abs() {
                z = target_alt;
                vz = 0.0;
            } else {
                z += dz;
                vz = want;
            }
            t += dt;
        }
        if let Some(last) = samples.last_mut() {
            // cruise level at the captured altitude
            last.2 = Vect3::new(horizontal.x, horizontal.y, 0.0);
        }
        Trajectory { samples }
    }

    /// Position of the maneuver end.
    pub fn final_sample(&self) -> (f64, Vect3, Vect3) {
        *self.samples.last().expect("trajectory has samples")
    }

    /// No conflict under `det` anywhere on `[b, t]`, testing each linear
    /// piece against the linearly-moving intruder.
    pub fn conflict_free(
        &self,
        det: &DetectorVolume,
        buffers: Option<&SumBuffers>,
        b: f64,
        t: f64,
        intr_pos: &Vect3,
        intr_vel: &Vect3,
    ) -> bool {
        if t <= b {
            return true;
        }
        for (i, (ti, pos, vel)) in self.samples.iter().enumerate() {
            let last = i + 1 == self.samples.len();
            let seg_end = if last { t } else { self.samples[i + 1].0 };
            let lo = b.max(*ti);
            let hi = t.min(seg_end);
            if lo >= hi {
                continue;
            }
            let v_own = if last {
                *vel
            } else {
                let (tn, pn, _) = self.samples[i + 1];
                (pn - *pos) * (1.0 / (tn - ti))
            };
            let s = *pos - intr_vel.linear(intr_pos, *ti);
            let v = v_own - *intr_vel;
            if det
                .conflict_data(&s, &v, buffers, lo - ti, hi - ti)
                .conflict()
            {
                return false;
            }
        }
        true
    }
}

/// Sweep the integer steps `[mino, maxo]` and report the maximal runs of
/// conflict-free candidates. `eps` rejects steps on the forbidden side
/// of a coordinated resolution (0 leaves the sweep unconstrained);
/// `recovery` additionally requires the candidate free of the recovery
/// volume on `[0, rb]`.
pub fn none_integer_bands<F>(
    det: &DetectorVolume,
    recovery: Option<(&DetectorVolume, f64)>,
    buffers: Option<&SumBuffers>,
    mino: i32,
    maxo: i32,
    eps: i32,
    b: f64,
    t: f64,
    trajectory_for: F,
    intr_pos: &Vect3,
    intr_vel: &Vect3,
) -> Vec<IntegerBand>
where
    F: Fn(i32) -> Trajectory,
{
    let mut bands: Vec<IntegerBand> = vec![];
    let mut run: Option<IntegerBand> = None;
    for k in mino..=maxo {
        let allowed = eps == 0 || k == 0 || k.signum() == eps;
        let free = allowed && {
            let traj = trajectory_for(k);
            traj.conflict_free(det, buffers, b, t, intr_pos, intr_vel)
                && recovery.map_or(true, |(volume, rb)| {
                    rb <= 0.0
                        || traj.conflict_free(
                            volume, buffers, 0.0, rb, intr_pos, intr_vel,
                        )
                })
        };
        match (&mut run, free) {
            (None, true) => run = Some(IntegerBand { lb: k, ub: k }),
            (Some(r), true) => r.ub = k,
            (Some(r), false) => {
                bands.push(*r);
                run = None;
            }
            (None, false) => {}
        }
    }
    if let Some(r) = run {
        bands.push(r);
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const NMI: f64 = 1852.0;

    fn east(gs: f64) -> Vect3 {
        Vect3::from_trk_gs_vs(FRAC_PI_2, gs, 0.0)
    }

    #[test]
    fn turn_trajectory_reaches_target() {
        let traj = Trajectory::turn(
            Vect3::new(0.0, 0.0, 3000.0),
            east(100.0),
            Vect3::default(),
            PI, // from east to south
            3.0_f64.to_radians(),
            1.0,
            300.0,
        );
        let (t_end, _, vel) = traj.final_sample();
        assert_relative_eq!(t_end, 30.0, max_relative = 1e-9);
        assert_relative_eq!(vel.track(), PI, max_relative = 1e-9);
        assert_relative_eq!(vel.ground_speed(), 100.0, max_relative = 1e-9);
    }

    #[test]
    fn speed_trajectory_covers_the_right_distance() {
        let traj = Trajectory::speed(
            Vect3::default(),
            east(100.0),
            Vect3::default(),
            120.0,
            2.0,
            1.0,
            300.0,
        );
        let (t_end, pos, vel) = traj.final_sample();
        assert_relative_eq!(t_end, 10.0, max_relative = 1e-9);
        // 100·10 + ½·2·10²
        assert_relative_eq!(pos.x, 1100.0, max_relative = 1e-9);
        assert_relative_eq!(vel.ground_speed(), 120.0, max_relative = 1e-9);
    }

    #[test]
    fn altitude_trajectory_levels_off() {
        let traj = Trajectory::altitude(
            Vect3::new(0.0, 0.0, 3000.0),
            east(100.0),
            Vect3::default(),
            3300.0,
            2.0,
            5.0,
            1.0,
            600.0,
        );
        let (_, pos, vel) = traj.final_sample();
        assert_relative_eq!(pos.z, 3300.0, epsilon = 1e-6);
        assert_relative_eq!(vel.z, 0.0);
    }

    #[test]
    fn head_on_sweep_clears_the_sides() {
        // ownship east at 100 m/s, intruder 15 nmi ahead coming back
        let det = DetectorVolume::Cd3d {
            d: 2.0 * NMI,
            h: 300.0,
        };
        let own_pos = Vect3::new(0.0, 0.0, 3000.0);
        let own_air = east(100.0);
        let intr_pos = Vect3::new(15.0 * NMI, 0.0, 3000.0);
        let intr_vel = Vect3::new(-100.0, 0.0, 0.0);
        let step = 15.0_f64.to_radians();
        let bands = none_integer_bands(
            &det,
            None,
            None,
            -6,
            6,
            0,
            0.0,
            300.0,
            |k| {
                Trajectory::linear(
                    own_pos,
                    own_air.with_track(FRAC_PI_2 + k as f64 * step),
                )
            },
            &intr_pos,
            &intr_vel,
        );
        // straight ahead conflicts, sharp turns are free
        assert!(!bands.is_empty());
        assert!(bands.iter().all(|band| !(band.lb <= 0 && 0 <= band.ub)));
        let free: Vec<i32> = bands
            .iter()
            .flat_map(|band| band.lb..=band.ub)
            .collect();
        assert!(free.contains(&-6));
        assert!(free.contains(&6));
    }

    #[test]
    fn epsilon_rejects_one_side() {
        let det = DetectorVolume::Cd3d {
            d: 2.0 * NMI,
            h: 300.0,
        };
        let own_pos = Vect3::new(0.0, 0.0, 3000.0);
        let own_air = east(100.0);
        let intr_pos = Vect3::new(15.0 * NMI, 0.0, 3000.0);
        let intr_vel = Vect3::new(-100.0, 0.0, 0.0);
        let step = 15.0_f64.to_radians();
        let bands = none_integer_bands(
            &det,
            None,
            None,
            -6,
            6,
            1,
            0.0,
            300.0,
            |k| {
                Trajectory::linear(
                    own_pos,
                    own_air.with_track(FRAC_PI_2 + k as f64 * step),
                )
            },
            &intr_pos,
            &intr_vel,
        );
        let free: Vec<i32> = bands
            .iter()
            .flat_map(|band| band.lb..=band.ub)
            .collect();
        assert!(free.iter().all(|k| *k >= 0));
        assert!(free.contains(&6));
    }
}
