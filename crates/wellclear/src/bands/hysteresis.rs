/**
* Tick-to-tick stabilization of resolutions.
*
* Small stateful nodes owned by each band engine: the preferred-direction
* hysteresis keeps a resolution from flapping between sides, and the
* resolution persistence re-asserts the previous conflict interval while
* the ownship value is still inside it.
*/
use serde::Serialize;

/// Side of the current value a resolution escapes to: `Lower` is left or
/// down, `Upper` is right or up.
#[derive(Debug, PartialEq, Eq, Serialize, Clone, Copy)]
pub enum BandsDirection {
    Lower,
    Upper,
}

#[derive(Debug, Default, Clone)]
pub struct DirectionHysteresis {
    last_preferred: Option<BandsDirection>,
    last_flip_time: f64,
}

impl DirectionHysteresis {
    pub fn reset(&mut self) {
        *self = DirectionHysteresis::default();
    }

    pub fn held(&self) -> Option<BandsDirection> {
        self.last_preferred
    }

    /// `actual` is the closer escape this tick; the preferred direction
    /// follows it unless neither the escape-distance margin nor the
    /// persistence time justifies a flip.
    pub fn update(
        &mut self,
        actual: BandsDirection,
        dist_lower: f64,
        dist_upper: f64,
        max_delta: f64,
        persistence_time: f64,
        time: f64,
    ) -> BandsDirection {
        match self.last_preferred {
            None => {
                self.last_preferred = Some(actual);
                self.last_flip_time = time;
                actual
            }
            Some(held) if held == actual => actual,
            Some(held) => {
                let margin = (dist_upper - dist_lower).abs();
                if margin > max_delta
                    || time - self.last_flip_time > persistence_time
                {
                    self.last_preferred = Some(actual);
                    self.last_flip_time = time;
                    actual
                } else {
                    held
                }
            }
        }
    }
}

/// The conflict interval `(low, up)` around the ownship value from the
/// previous tick. While the value stays inside it and band persistence
/// is enabled, the interval is subtracted again from the corrective
/// none set.
#[derive(Debug, Default, Clone)]
pub struct ResolutionPersistence {
    interval: Option<(f64, f64)>,
}

impl ResolutionPersistence {
    pub fn reset(&mut self) {
        self.interval = None;
    }

    pub fn store(&mut self, low: f64, up: f64) {
        self.interval = Some((low, up));
    }

    pub fn clear(&mut self) {
        self.interval = None;
    }

    /// The persisted conflict interval, when it still contains `val`.
    pub fn containing(&self, val: f64) -> Option<(f64, f64)> {
        self.interval.filter(|(low, up)| *low < val && val < *up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_actual_without_constraints() {
        let mut h = DirectionHysteresis::default();
        // zero persistence: every tick may flip
        assert_eq!(
            h.update(BandsDirection::Upper, 10.0, 5.0, 0.0, 0.0, 0.0),
            BandsDirection::Upper
        );
        assert_eq!(
            h.update(BandsDirection::Lower, 5.0, 10.0, 0.0, 0.0, 1.0),
            BandsDirection::Lower
        );
    }

    #[test]
    fn holds_on_jitter() {
        let mut h = DirectionHysteresis::default();
        h.update(BandsDirection::Upper, 10.0, 9.0, 5.0, 60.0, 0.0);
        // the sides swap by a hair: held
        assert_eq!(
            h.update(BandsDirection::Lower, 9.0, 10.0, 5.0, 60.0, 1.0),
            BandsDirection::Upper
        );
        // a clear margin flips immediately
        assert_eq!(
            h.update(BandsDirection::Lower, 2.0, 20.0, 5.0, 60.0, 2.0),
            BandsDirection::Lower
        );
    }

    #[test]
    fn flips_after_persistence_time() {
        let mut h = DirectionHysteresis::default();
        h.update(BandsDirection::Upper, 10.0, 9.0, 5.0, 10.0, 0.0);
        assert_eq!(
            h.update(BandsDirection::Lower, 9.0, 10.0, 5.0, 10.0, 5.0),
            BandsDirection::Upper
        );
        assert_eq!(
            h.update(BandsDirection::Lower, 9.0, 10.0, 5.0, 10.0, 11.0),
            BandsDirection::Lower
        );
    }

    #[test]
    fn persistence_interval_tracks_value() {
        let mut p = ResolutionPersistence::default();
        p.store(80.0, 120.0);
        assert_eq!(p.containing(100.0), Some((80.0, 120.0)));
        assert_eq!(p.containing(130.0), None);
        p.clear();
        assert_eq!(p.containing(100.0), None);
    }
}
