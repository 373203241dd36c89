/**
* Flat-earth projection between geodetic and local ENU coordinates.
*
* The engine fixes a projection frame at the ownship latitude and longitude
* when the ownship is assigned; all traffic positions and velocities go
* through that frame. The projection is equirectangular around the origin,
* which is adequate for the encounter ranges the engine works at. Beyond
* [`MAX_PROJECTION_RANGE`] the accuracy is advisory only and a warning is
* emitted.
*/
use super::Vect3;
use libm::cos;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Earth's radius in meters.
const R: f64 = 6_371_000.0;

/// Advisory limit for the flat-earth approximation.
pub const MAX_PROJECTION_RANGE: f64 = 330.0 * 1852.0; // 330 nmi

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Position {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude above the reference surface, in meters
    pub altitude: f64,
}

fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos()
            * lat2.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    R * c
}

/// A projection frame anchored at a geodetic origin.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Projection {
    pub origin_latitude: f64,
    pub origin_longitude: f64,
}

impl Projection {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Projection {
            origin_latitude: latitude,
            origin_longitude: longitude,
        }
    }

    /// Geodetic position to ENU meters relative to the origin.
    pub fn project(&self, pos: &Position) -> Vect3 {
        let range = haversine(
            self.origin_latitude,
            self.origin_longitude,
            pos.latitude,
            pos.longitude,
        );
        if range > MAX_PROJECTION_RANGE {
            warn!(
                "position {:.4},{:.4} is {:.0} m from the projection \
                 origin, beyond the flat-earth validity range",
                pos.latitude, pos.longitude, range
            );
        }
        let lat0 = self.origin_latitude.to_radians();
        let x = R
            * (pos.longitude - self.origin_longitude).to_radians()
            * cos(lat0);
        let y = R * (pos.latitude - self.origin_latitude).to_radians();
        Vect3::new(x, y, pos.altitude)
    }

    /// ENU meters back to a geodetic position.
    pub fn unproject(&self, v: &Vect3) -> Position {
        let lat0 = self.origin_latitude.to_radians();
        let latitude = self.origin_latitude + (v.y / R).to_degrees();
        let longitude =
            self.origin_longitude + (v.x / (R * cos(lat0))).to_degrees();
        Position {
            latitude,
            longitude,
            altitude: v.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn origin_projects_to_zero() {
        let proj = Projection::new(43.6, 1.45);
        let v = proj.project(&Position {
            latitude: 43.6,
            longitude: 1.45,
            altitude: 3048.0,
        });
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(v.z, 3048.0);
    }

    #[test]
    fn one_degree_north() {
        let proj = Projection::new(0.0, 0.0);
        let v = proj.project(&Position {
            latitude: 1.0,
            longitude: 0.0,
            altitude: 0.0,
        });
        // one degree of latitude is roughly 60 nmi
        assert_relative_eq!(v.y, 111_194.9, max_relative = 1e-4);
    }

    #[test]
    fn round_trip() {
        let proj = Projection::new(52.0, 4.5);
        let pos = Position {
            latitude: 52.3,
            longitude: 4.1,
            altitude: 1000.0,
        };
        let back = proj.unproject(&proj.project(&pos));
        assert_relative_eq!(back.latitude, pos.latitude, max_relative = 1e-9);
        assert_relative_eq!(
            back.longitude,
            pos.longitude,
            max_relative = 1e-9
        );
    }
}
