/**
* The closed table of recognized units.
*
* Internal state is always SI (meters, seconds, radians and compositions
* thereof); every conversion in the table is linear. Unit strings appear in
* parameter files as a trailing token, e.g. `det_1_WCV_DTHR = 0.66 [nmi]`.
*/
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Standard gravity, used by the G unit and the standard-rate turn formula.
pub const G: f64 = 9.80665;

static FACTORS: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    // distances
    m.insert("m", 1.0);
    m.insert("ft", 0.3048);
    m.insert("km", 1000.0);
    m.insert("nmi", 1852.0);
    // speeds
    m.insert("m/s", 1.0);
    m.insert("knot", 1852.0 / 3600.0);
    m.insert("kt", 1852.0 / 3600.0);
    m.insert("kph", 1000.0 / 3600.0);
    m.insert("fpm", 0.3048 / 60.0);
    // accelerations
    m.insert("m/s^2", 1.0);
    m.insert("G", G);
    // angles and angular rates
    m.insert("rad", 1.0);
    m.insert("deg", std::f64::consts::PI / 180.0);
    m.insert("rad/s", 1.0);
    m.insert("deg/s", std::f64::consts::PI / 180.0);
    // time
    m.insert("s", 1.0);
    m
});

/// Linear factor to SI for a recognized unit string, `None` otherwise.
pub fn factor(unit: &str) -> Option<f64> {
    FACTORS.get(unit).copied()
}

pub fn is_unit(unit: &str) -> bool {
    FACTORS.contains_key(unit)
}

/// Convert `value` expressed in `unit` into SI.
pub fn from_unit(value: f64, unit: &str) -> Option<f64> {
    factor(unit).map(|f| value * f)
}

/// Convert an SI `value` into `unit`.
pub fn to_unit(value: f64, unit: &str) -> Option<f64> {
    factor(unit).map(|f| value / f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn si_factors() {
        assert_relative_eq!(from_unit(1.0, "nmi").unwrap(), 1852.0);
        assert_relative_eq!(from_unit(1000.0, "ft").unwrap(), 304.8);
        assert_relative_eq!(
            from_unit(200.0, "knot").unwrap(),
            102.88888888888889
        );
        assert_relative_eq!(from_unit(90.0, "deg").unwrap(), FRAC_PI_2);
        assert!(from_unit(1.0, "furlong").is_none());
    }

    #[test]
    fn round_trip() {
        for unit in ["m", "ft", "km", "nmi", "knot", "fpm", "kph", "deg", "G"]
        {
            for value in [0.0, 1.0, 0.66, 450.0, 1e4, -35.5] {
                let si = from_unit(value, unit).unwrap();
                let back = to_unit(si, unit).unwrap();
                assert_relative_eq!(back, value, max_relative = 1e-15);
            }
        }
    }
}
