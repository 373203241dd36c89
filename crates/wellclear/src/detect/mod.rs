/**
* Detector volumes.
*
* A detector evaluates, for a relative state over a time window, whether a
* pair of aircraft enters a loss-of-well-clear region, and reports entry
* and exit times together with the closest point of approach. The volume
* variants form a tagged union: the plain 3-D cylinder, the cylinder with a
* modified-tau threshold, and their SUM counterparts that inflate the
* thresholds with sensor uncertainty buffers.
*
* Every variant is monotone under shrinking of its distance thresholds: a
* smaller volume yields a subset conflict region. The recovery search
* relies on this.
*/
pub mod cd3d;
pub mod sum;
pub mod taumod;

use crate::geometry::{tcpa, Vect3};
use cd3d::{clip, quadratic_band};
use serde::{Deserialize, Serialize};
pub use sum::{SensorUncertainty, SumBuffers};

/// Outcome of a conflict probe over `[B, T]`. Times are seconds from now;
/// `time_in = +∞` (and an empty interval) means the pair stays clear.
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub struct ConflictData {
    pub time_in: f64,
    pub time_out: f64,
    pub time_cpa: f64,
    pub dist_cpa: f64,
}

impl ConflictData {
    pub fn clear() -> Self {
        ConflictData {
            time_in: f64::INFINITY,
            time_out: f64::NEG_INFINITY,
            time_cpa: 0.0,
            dist_cpa: f64::INFINITY,
        }
    }

    pub fn conflict(&self) -> bool {
        self.time_in < self.time_out
    }

    /// In conflict with entry at or before `t`.
    pub fn conflict_before(&self, t: f64) -> bool {
        self.conflict() && self.time_in <= t
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "detector")]
pub enum DetectorVolume {
    /// Plain cylinder: horizontal range below `d`, vertical below `h`.
    #[serde(rename = "CD3D")]
    Cd3d { d: f64, h: f64 },
    /// Cylinder extended with a modified-tau time threshold.
    #[serde(rename = "WCV_TAUMOD")]
    TauMod { dthr: f64, zthr: f64, tthr: f64 },
    #[serde(rename = "CD3D_SUM")]
    Cd3dSum { d: f64, h: f64 },
    #[serde(rename = "WCV_TAUMOD_SUM")]
    TauModSum { dthr: f64, zthr: f64, tthr: f64 },
}

impl DetectorVolume {
    pub fn name(&self) -> &'static str {
        match self {
            DetectorVolume::Cd3d { .. } => "CD3D",
            DetectorVolume::TauMod { .. } => "WCV_TAUMOD",
            DetectorVolume::Cd3dSum { .. } => "CD3D_SUM",
            DetectorVolume::TauModSum { .. } => "WCV_TAUMOD_SUM",
        }
    }

    pub fn uses_uncertainty(&self) -> bool {
        matches!(
            self,
            DetectorVolume::Cd3dSum { .. } | DetectorVolume::TauModSum { .. }
        )
    }

    pub fn horizontal_threshold(&self) -> f64 {
        match self {
            DetectorVolume::Cd3d { d, .. }
            | DetectorVolume::Cd3dSum { d, .. } => *d,
            DetectorVolume::TauMod { dthr, .. }
            | DetectorVolume::TauModSum { dthr, .. } => *dthr,
        }
    }

    pub fn vertical_threshold(&self) -> f64 {
        match self {
            DetectorVolume::Cd3d { h, .. }
            | DetectorVolume::Cd3dSum { h, .. } => *h,
            DetectorVolume::TauMod { zthr, .. }
            | DetectorVolume::TauModSum { zthr, .. } => *zthr,
        }
    }

    /// Conflict probe for relative position `s` and relative velocity `v`
    /// (ownship minus intruder) over the window `[b, t]`. SUM variants read
    /// the pair's combined uncertainty buffers; the other variants ignore
    /// them.
    pub fn conflict_data(
        &self,
        s: &Vect3,
        v: &Vect3,
        buffers: Option<&SumBuffers>,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let s2 = s.vect2();
        let v2 = v.vect2();
        let zero = SumBuffers::default();
        let buf = buffers.copied().unwrap_or(zero);

        let (hin, hout, vin, vout) = match self {
            DetectorVolume::Cd3d { d, h } => {
                let hb = cd3d::horizontal_band(&s2, &v2, *d);
                let vb = cd3d::vertical_band(s.z, v.z, *h);
                (hb.0, hb.1, vb.0, vb.1)
            }
            DetectorVolume::Cd3dSum { d, h } => {
                let dd = d + buf.h_pos;
                let hb = clip(
                    quadratic_band(
                        v2.norm_sq() - buf.h_vel * buf.h_vel,
                        s2.dot(&v2) - dd * buf.h_vel,
                        s2.norm_sq() - dd * dd,
                    ),
                    b,
                    t,
                );
                let hh = h + buf.v_pos;
                let vb = clip(
                    quadratic_band(
                        v.z * v.z - buf.v_vel * buf.v_vel,
                        s.z * v.z - hh * buf.v_vel,
                        s.z * s.z - hh * hh,
                    ),
                    b,
                    t,
                );
                (hb.0, hb.1, vb.0, vb.1)
            }
            DetectorVolume::TauMod { dthr, zthr, tthr } => {
                let hb = taumod::horizontal_interval(&s2, &v2, *dthr, *tthr);
                let vb = cd3d::vertical_band(s.z, v.z, *zthr);
                (hb.0, hb.1, vb.0, vb.1)
            }
            DetectorVolume::TauModSum { dthr, zthr, tthr } => {
                let dthr_eff = dthr + buf.h_pos + buf.h_vel * tthr;
                let zthr_eff = zthr + buf.v_pos + buf.v_vel * tthr;
                let hb =
                    taumod::horizontal_interval(&s2, &v2, dthr_eff, *tthr);
                let vb = cd3d::vertical_band(s.z, v.z, zthr_eff);
                (hb.0, hb.1, vb.0, vb.1)
            }
        };

        let (time_in, time_out) = cd3d::intersect(
            cd3d::intersect((hin, hout), (vin, vout)),
            (b, t),
        );
        let tc = tcpa(&s2, &v2).clamp(b, t);
        let dc = (s2 + v2 * tc).norm();
        if time_in < time_out {
            ConflictData {
                time_in,
                time_out,
                time_cpa: tc,
                dist_cpa: dc,
            }
        } else {
            ConflictData {
                time_cpa: tc,
                dist_cpa: dc,
                ..ConflictData::clear()
            }
        }
    }

    /// Instantaneous membership test at the current state.
    pub fn violation_at(
        &self,
        s: &Vect3,
        v: &Vect3,
        buffers: Option<&SumBuffers>,
    ) -> bool {
        let s2 = s.vect2();
        let v2 = v.vect2();
        let zero = SumBuffers::default();
        let buf = buffers.copied().unwrap_or(zero);
        match self {
            DetectorVolume::Cd3d { d, h } => {
                s2.norm() < *d && s.z.abs() < *h
            }
            DetectorVolume::Cd3dSum { d, h } => {
                s2.norm() < d + buf.h_pos && s.z.abs() < h + buf.v_pos
            }
            DetectorVolume::TauMod { dthr, zthr, tthr } => {
                taumod::horizontal_wcv(&s2, &v2, *dthr, *tthr)
                    && s.z.abs() <= *zthr
            }
            DetectorVolume::TauModSum { dthr, zthr, tthr } => {
                let dthr_eff = dthr + buf.h_pos + buf.h_vel * tthr;
                let zthr_eff = zthr + buf.v_pos + buf.v_vel * tthr;
                taumod::horizontal_wcv(&s2, &v2, dthr_eff, *tthr)
                    && s.z.abs() <= zthr_eff
            }
        }
    }

    /// The same volume with both thresholds scaled by `factor`, floored at
    /// the NMAC cylinder. Used by the recovery search.
    pub fn shrink(&self, factor: f64, nmac_d: f64, nmac_h: f64) -> Self {
        let d = (self.horizontal_threshold() * factor).max(nmac_d);
        let h = (self.vertical_threshold() * factor).max(nmac_h);
        match self {
            DetectorVolume::Cd3d { .. } => DetectorVolume::Cd3d { d, h },
            DetectorVolume::Cd3dSum { .. } => DetectorVolume::Cd3dSum { d, h },
            DetectorVolume::TauMod { tthr, .. } => DetectorVolume::TauMod {
                dthr: d,
                zthr: h,
                tthr: *tthr,
            },
            DetectorVolume::TauModSum { tthr, .. } => {
                DetectorVolume::TauModSum {
                    dthr: d,
                    zthr: h,
                    tthr: *tthr,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NMI: f64 = 1852.0;
    const FT: f64 = 0.3048;

    #[test]
    fn head_on_conflict_window() {
        // 40 nmi apart, 400 kt closure, 5 nmi / 1000 ft cylinder
        let det = DetectorVolume::Cd3d {
            d: 5.0 * NMI,
            h: 1000.0 * FT,
        };
        let s = Vect3::new(40.0 * NMI, 0.0, 0.0);
        let v = Vect3::new(-400.0 * NMI / 3600.0, 0.0, 0.0);
        let cd = det.conflict_data(&s, &v, None, 0.0, 400.0);
        assert!(cd.conflict());
        // entry at (40 - 5) / 400 hours
        assert_relative_eq!(cd.time_in, 315.0, max_relative = 1e-9);
        assert_relative_eq!(cd.dist_cpa, 0.0, epsilon = 1e-6);
        // window shorter than the entry time: no conflict
        let cd = det.conflict_data(&s, &v, None, 0.0, 180.0);
        assert!(!cd.conflict());
    }

    #[test]
    fn vertical_separation_blocks_conflict() {
        let det = DetectorVolume::Cd3d {
            d: 5.0 * NMI,
            h: 1000.0 * FT,
        };
        let s = Vect3::new(10.0 * NMI, 0.0, 2000.0 * FT);
        let v = Vect3::new(-200.0, 0.0, 0.0);
        assert!(!det.conflict_data(&s, &v, None, 0.0, 300.0).conflict());
    }

    #[test]
    fn sum_inflation_is_monotone() {
        let plain = DetectorVolume::Cd3d {
            d: 5.0 * NMI,
            h: 1000.0 * FT,
        };
        let summed = DetectorVolume::Cd3dSum {
            d: 5.0 * NMI,
            h: 1000.0 * FT,
        };
        let buffers = SumBuffers {
            h_pos: 300.0,
            h_vel: 2.0,
            v_pos: 30.0,
            v_vel: 0.5,
        };
        // grazing pass just outside the plain cylinder
        let s = Vect3::new(20.0 * NMI, 5.05 * NMI, 0.0);
        let v = Vect3::new(-200.0, 0.0, 0.0);
        assert!(!plain.conflict_data(&s, &v, None, 0.0, 400.0).conflict());
        assert!(summed
            .conflict_data(&s, &v, Some(&buffers), 0.0, 400.0)
            .conflict());
        // zero buffers reduce SUM to the plain volume
        let zero = SumBuffers::default();
        let a = plain.conflict_data(&s, &v, None, 0.0, 400.0);
        let b = summed.conflict_data(&s, &v, Some(&zero), 0.0, 400.0);
        assert_eq!(a.conflict(), b.conflict());
    }

    #[test]
    fn shrink_floors_at_nmac() {
        let det = DetectorVolume::Cd3d {
            d: 4000.0,
            h: 200.0,
        };
        let shrunk = det.shrink(0.1, 500.0, 30.0);
        assert_relative_eq!(shrunk.horizontal_threshold(), 500.0);
        assert_relative_eq!(shrunk.vertical_threshold(), 30.0);
    }

    #[test]
    fn violation_now() {
        let det = DetectorVolume::Cd3d {
            d: 5.0 * NMI,
            h: 1000.0 * FT,
        };
        let inside = Vect3::new(2.0 * NMI, 0.0, 100.0 * FT);
        let outside = Vect3::new(6.0 * NMI, 0.0, 0.0);
        let v = Vect3::new(-100.0, 0.0, 0.0);
        assert!(det.violation_at(&inside, &v, None));
        assert!(!det.violation_at(&outside, &v, None));
    }
}
