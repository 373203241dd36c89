/**
* Conflict interval math for the plain cylinder volume.
*
* A pair is in loss of separation when horizontal range is strictly below D
* and vertical range strictly below H. Entry and exit times come from the
* roots of the horizontal range quadratic and the vertical linear band;
* degenerate geometry (no relative motion on an axis) reduces to a constant
* membership test.
*/
use crate::geometry::Vect2;
use libm::sqrt;

pub const FULL: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);
pub const EMPTY: (f64, f64) = (f64::INFINITY, f64::NEG_INFINITY);

const TINY: f64 = 1e-12;

/// Solution of `a·t² + 2·b·t + c < 0`.
pub enum QuadBand {
    Empty,
    Full,
    /// Between the two roots
    Inside(f64, f64),
    /// Outside the two roots (downward parabola)
    Outside(f64, f64),
}

pub fn quadratic_band(a: f64, b: f64, c: f64) -> QuadBand {
    if a.abs() < TINY {
        if b.abs() < TINY {
            return if c < 0.0 { QuadBand::Full } else { QuadBand::Empty };
        }
        let t = -c / (2.0 * b);
        return if b > 0.0 {
            QuadBand::Inside(f64::NEG_INFINITY, t)
        } else {
            QuadBand::Inside(t, f64::INFINITY)
        };
    }
    let disc = b * b - a * c;
    if a > 0.0 {
        if disc <= 0.0 {
            return QuadBand::Empty;
        }
        let sq = sqrt(disc);
        QuadBand::Inside((-b - sq) / a, (-b + sq) / a)
    } else {
        if disc <= 0.0 {
            return QuadBand::Full;
        }
        let sq = sqrt(disc);
        // roots in increasing order for a < 0
        QuadBand::Outside((-b + sq) / a, (-b - sq) / a)
    }
}

/// Clip a quadratic band to the window `[lo, hi]`, returning a single
/// interval. An `Outside` band intersecting the window on both tails is
/// answered by its hull, which over-approximates the conflict (and thus
/// never certifies a conflicting window as free).
pub fn clip(band: QuadBand, lo: f64, hi: f64) -> (f64, f64) {
    match band {
        QuadBand::Empty => EMPTY,
        QuadBand::Full => (lo, hi),
        QuadBand::Inside(t1, t2) => {
            let low = t1.max(lo);
            let up = t2.min(hi);
            if low < up {
                (low, up)
            } else {
                EMPTY
            }
        }
        QuadBand::Outside(t1, t2) => {
            let left = lo < t1;
            let right = hi > t2;
            match (left, right) {
                (true, true) => (lo, hi),
                (true, false) => (lo, t1.min(hi)),
                (false, true) => (t2.max(lo), hi),
                (false, false) => EMPTY,
            }
        }
    }
}

/// Times for which `|sz + t·vz| < h`.
pub fn vertical_band(sz: f64, vz: f64, h: f64) -> (f64, f64) {
    if vz.abs() < TINY {
        return if sz.abs() < h { FULL } else { EMPTY };
    }
    let t1 = (-h - sz) / vz;
    let t2 = (h - sz) / vz;
    if t1 < t2 {
        (t1, t2)
    } else {
        (t2, t1)
    }
}

/// Times for which `|s + t·v| < d`.
pub fn horizontal_band(s: &Vect2, v: &Vect2, d: f64) -> (f64, f64) {
    match quadratic_band(v.norm_sq(), s.dot(v), s.norm_sq() - d * d) {
        QuadBand::Empty => EMPTY,
        QuadBand::Full => FULL,
        QuadBand::Inside(t1, t2) => (t1, t2),
        // unreachable for a ≥ 0
        QuadBand::Outside(..) => FULL,
    }
}

pub fn intersect(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let low = a.0.max(b.0);
    let up = a.1.min(b.1);
    if low < up {
        (low, up)
    } else {
        EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn head_on_cylinder() {
        // 20 km apart, 200 m/s closure, 5 km cylinder
        let s = Vect2::new(20_000.0, 0.0);
        let v = Vect2::new(-200.0, 0.0);
        let (tin, tout) = horizontal_band(&s, &v, 5_000.0);
        assert_relative_eq!(tin, 75.0, max_relative = 1e-12);
        assert_relative_eq!(tout, 125.0, max_relative = 1e-12);
    }

    #[test]
    fn miss_distance_above_threshold() {
        let s = Vect2::new(20_000.0, 6_000.0);
        let v = Vect2::new(-200.0, 0.0);
        let (tin, tout) = horizontal_band(&s, &v, 5_000.0);
        assert!(tin > tout);
    }

    #[test]
    fn static_geometry() {
        let s = Vect2::new(1_000.0, 0.0);
        let v = Vect2::new(0.0, 0.0);
        assert_eq!(horizontal_band(&s, &v, 5_000.0), FULL);
        assert_eq!(horizontal_band(&s, &v, 500.0), EMPTY);
    }

    #[test]
    fn vertical_crossing() {
        // 300 m below, climbing through at 5 m/s, 150 m half-height
        let (tin, tout) = vertical_band(-300.0, 5.0, 150.0);
        assert_relative_eq!(tin, 30.0);
        assert_relative_eq!(tout, 90.0);
    }
}
