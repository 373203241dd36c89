/**
* Aircraft state records.
*
* The ownship is the first traffic state; once it is set, a projection
* frame is fixed at its latitude and longitude and every geodetic traffic
* position goes through it. Positions are kept in ENU meters; the original
* geodetic coordinates, when given, ride along for the terminal-area
* fence test and for clients that want them back.
*/
use crate::detect::SensorUncertainty;
use crate::geometry::project::{Position, Projection};
use crate::geometry::Vect3;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TrafficState {
    pub id: String,
    /// ENU position in meters, in the ownship projection frame
    pub pos: Vect3,
    /// Ground velocity in m/s
    pub gnd_vel: Vect3,
    /// Air velocity: ground velocity minus wind
    pub air_vel: Vect3,
    /// Geodetic position as reported, when the client gave one
    pub geodetic: Option<Position>,
    /// 1-based alerter index, 0 for none
    pub alerter: usize,
    pub uncertainty: SensorUncertainty,
    /// Time of the state, seconds
    pub time: f64,
}

impl TrafficState {
    pub fn euclidean(id: &str, pos: Vect3, vel: Vect3, time: f64) -> Self {
        TrafficState {
            id: id.to_string(),
            pos,
            gnd_vel: vel,
            air_vel: vel,
            geodetic: None,
            alerter: 1,
            uncertainty: SensorUncertainty::default(),
            time,
        }
    }

    pub fn geodetic(
        id: &str,
        position: Position,
        vel: Vect3,
        projection: &Projection,
        time: f64,
    ) -> Self {
        TrafficState {
            id: id.to_string(),
            pos: projection.project(&position),
            gnd_vel: vel,
            air_vel: vel,
            geodetic: Some(position),
            alerter: 1,
            uncertainty: SensorUncertainty::default(),
            time,
        }
    }

    /// Re-derive the air velocity for a wind change.
    pub fn apply_wind(&mut self, wind: &Vect3) {
        self.air_vel = self.gnd_vel - *wind;
    }

    /// Advance the state along its air velocity.
    pub fn linear_projection(&mut self, dt: f64) {
        self.pos = self.air_vel.linear(&self.pos, dt);
        self.time += dt;
    }

    pub fn altitude(&self) -> f64 {
        self.pos.z
    }

    pub fn horizontal_range(&self, other: &TrafficState) -> f64 {
        (self.pos.vect2() - other.pos.vect2()).norm()
    }

    /// Relative position and ground velocity, self minus other.
    pub fn relative(&self, other: &TrafficState) -> (Vect3, Vect3) {
        (self.pos - other.pos, self.gnd_vel - other.gnd_vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wind_splits_air_and_ground() {
        let mut state = TrafficState::euclidean(
            "own",
            Vect3::new(0.0, 0.0, 3000.0),
            Vect3::new(100.0, 0.0, 0.0),
            0.0,
        );
        // 20 m/s tailwind from the west
        state.apply_wind(&Vect3::new(20.0, 0.0, 0.0));
        assert_relative_eq!(state.air_vel.x, 80.0);
        assert_relative_eq!(state.gnd_vel.x, 100.0);
    }

    #[test]
    fn projection_advances_time() {
        let mut state = TrafficState::euclidean(
            "ac1",
            Vect3::new(0.0, 0.0, 1000.0),
            Vect3::new(50.0, 0.0, -2.0),
            10.0,
        );
        state.linear_projection(20.0);
        assert_relative_eq!(state.pos.x, 1000.0);
        assert_relative_eq!(state.pos.z, 960.0);
        assert_relative_eq!(state.time, 30.0);
    }
}
