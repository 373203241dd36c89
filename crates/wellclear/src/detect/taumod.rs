/**
* Conflict interval math for the modified-tau well-clear volume.
*
* The horizontal condition holds when range is already below DTHR, or when
* the pair is closing with a projected miss distance below DTHR and the
* modified tau
*
*   τ_mod = (DTHR² − |s|²) / (s·v)       for s·v < 0
*
* sits in [0, TTHR]. The τ boundary is the root set of
*
*   Φ(t) = |s + t·v|² + TTHR·((s + t·v)·v) − DTHR²
*
* so entry is the earlier root of Φ and exit is the cylinder exit; once the
* pair is past closest approach the τ condition is off and only the DTHR
* cylinder keeps the volume occupied.
*/
use super::cd3d::{self, EMPTY};
use crate::geometry::{dcpa, Vect2};
use libm::sqrt;

const TINY: f64 = 1e-12;

/// Pointwise horizontal membership test.
pub fn horizontal_wcv(s: &Vect2, v: &Vect2, dthr: f64, tthr: f64) -> bool {
    if s.norm() <= dthr {
        return true;
    }
    let sv = s.dot(v);
    if sv < 0.0 && dcpa(s, v) <= dthr {
        let taumod = (dthr * dthr - s.norm_sq()) / sv;
        return (0.0..=tthr).contains(&taumod);
    }
    false
}

/// Horizontal loss interval over all time, `EMPTY` when the pair never
/// enters the volume.
pub fn horizontal_interval(
    s: &Vect2,
    v: &Vect2,
    dthr: f64,
    tthr: f64,
) -> (f64, f64) {
    let a = v.norm_sq();
    if a < TINY {
        return if s.norm() <= dthr {
            cd3d::FULL
        } else {
            EMPTY
        };
    }
    if dcpa(s, v) > dthr {
        return EMPTY;
    }
    let b = s.dot(v);
    let c = s.norm_sq() - dthr * dthr;
    // cylinder exit; the discriminant is non-negative when dcpa ≤ dthr
    let disc_cyl = b * b - a * c;
    if disc_cyl < 0.0 {
        return EMPTY;
    }
    let exit = (-b + sqrt(disc_cyl)) / a;
    // τ entry: earlier root of Φ
    let bh = b + tthr * a / 2.0;
    let cphi = c + tthr * b;
    let disc_phi = bh * bh - a * cphi;
    let entry = if disc_phi >= 0.0 {
        (-bh - sqrt(disc_phi)) / a
    } else {
        // inside the cylinder with no τ prelude
        (-b - sqrt(disc_cyl)) / a
    };
    if entry < exit {
        (entry, exit)
    } else {
        EMPTY
    }
}
