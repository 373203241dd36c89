#![doc = include_str!("../readme.md")]
pub mod alert;
pub mod bands;
pub mod core;
pub mod daa;
pub mod detect;
pub mod geometry;
pub mod params;
pub mod units;

pub mod prelude {
    pub use crate::alert::{AlertLevel, Alerter, AlerterList, Region};
    pub use crate::bands::engine::Axis;
    pub use crate::bands::hysteresis::BandsDirection;
    pub use crate::bands::interval::{Interval, IntervalSet};
    pub use crate::bands::{BandsRange, RecoveryInformation};
    pub use crate::core::{TrafficState, UrgencyStrategy};
    pub use crate::daa::WellClear;
    pub use crate::detect::{
        ConflictData, DetectorVolume, SensorUncertainty,
    };
    pub use crate::geometry::project::Position;
    pub use crate::geometry::Vect3;
    pub use crate::params::Parameters;
}
