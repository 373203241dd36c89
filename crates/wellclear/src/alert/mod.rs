/**
* Alerters: named, ordered lists of increasingly severe alert thresholds.
*
* Each alert level binds a detector volume, an alerting time, an early
* alerting time and a region tag. Severity grows with the level index.
* The corrective level of an alerter is its first level whose region is at
* least as severe as the configured corrective region.
*/
pub mod mofn;

use crate::detect::DetectorVolume;
use serde::{Deserialize, Serialize};
use std::fmt;

const NMI: f64 = 1852.0;
const FT: f64 = 0.3048;

/// Band and alert regions, ordered by severity.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Clone, Copy,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Unknown,
    None,
    Far,
    Mid,
    Near,
    Recovery,
}

impl Region {
    /// Conflict regions only, by decreasing severity.
    pub const CONFLICT: [Region; 3] = [Region::Near, Region::Mid, Region::Far];

    pub fn is_conflict(&self) -> bool {
        matches!(self, Region::Far | Region::Mid | Region::Near)
    }

    pub fn from_name(name: &str) -> Option<Region> {
        match name {
            "NONE" => Some(Region::None),
            "FAR" => Some(Region::Far),
            "MID" => Some(Region::Mid),
            "NEAR" => Some(Region::Near),
            "RECOVERY" => Some(Region::Recovery),
            "UNKNOWN" => Some(Region::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Unknown => "UNKNOWN",
            Region::None => "NONE",
            Region::Far => "FAR",
            Region::Mid => "MID",
            Region::Near => "NEAR",
            Region::Recovery => "RECOVERY",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct AlertLevel {
    pub detector: DetectorVolume,
    /// Conflict entry at or before this time raises the level
    pub alerting_time: f64,
    /// Band horizon for the level; at least the alerting time
    pub early_alerting_time: f64,
    pub region: Region,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Alerter {
    pub id: String,
    pub levels: Vec<AlertLevel>,
}

impl Alerter {
    pub fn new(id: &str) -> Self {
        Alerter {
            id: id.to_string(),
            levels: vec![],
        }
    }

    /// The DO-365 phase 1 three-level alerter over the modified-tau
    /// volume: preventive, corrective, warning.
    pub fn standard(id: &str) -> Self {
        let dthr = 0.66 * NMI;
        let tthr = 35.0;
        Alerter {
            id: id.to_string(),
            levels: vec![
                AlertLevel {
                    detector: DetectorVolume::TauMod {
                        dthr,
                        zthr: 700.0 * FT,
                        tthr,
                    },
                    alerting_time: 55.0,
                    early_alerting_time: 75.0,
                    region: Region::Far,
                },
                AlertLevel {
                    detector: DetectorVolume::TauMod {
                        dthr,
                        zthr: 450.0 * FT,
                        tthr,
                    },
                    alerting_time: 55.0,
                    early_alerting_time: 75.0,
                    region: Region::Mid,
                },
                AlertLevel {
                    detector: DetectorVolume::TauMod {
                        dthr,
                        zthr: 450.0 * FT,
                        tthr,
                    },
                    alerting_time: 25.0,
                    early_alerting_time: 55.0,
                    region: Region::Near,
                },
            ],
        }
    }

    /// A single-level alerter around one detector volume, used by simple
    /// setups and the terminal-area override.
    pub fn single(id: &str, detector: DetectorVolume, t: f64) -> Self {
        Alerter {
            id: id.to_string(),
            levels: vec![AlertLevel {
                detector,
                alerting_time: t,
                early_alerting_time: t,
                region: Region::Near,
            }],
        }
    }

    /// 1-based level access.
    pub fn level(&self, i: usize) -> Option<&AlertLevel> {
        if i == 0 {
            None
        } else {
            self.levels.get(i - 1)
        }
    }

    pub fn most_severe_level(&self) -> usize {
        self.levels.len()
    }

    /// 1-based index of the first level whose region is at least as
    /// severe as `region`, 0 when none qualifies.
    pub fn alert_level_for_region(&self, region: Region) -> usize {
        self.levels
            .iter()
            .position(|level| level.region >= region)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

/// The ordered, name-addressable collection of configured alerters.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone)]
pub struct AlerterList {
    alerters: Vec<Alerter>,
}

impl AlerterList {
    pub fn empty() -> Self {
        AlerterList { alerters: vec![] }
    }

    pub fn single(alerter: Alerter) -> Self {
        AlerterList {
            alerters: vec![alerter],
        }
    }

    pub fn len(&self) -> usize {
        self.alerters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerters.is_empty()
    }

    /// Append or overwrite by name; returns the 1-based index.
    pub fn push(&mut self, alerter: Alerter) -> usize {
        if let Some(i) =
            self.alerters.iter().position(|a| a.id == alerter.id)
        {
            self.alerters[i] = alerter;
            i + 1
        } else {
            self.alerters.push(alerter);
            self.alerters.len()
        }
    }

    /// 1-based access, `None` for 0 or out of range.
    pub fn alerter_at(&self, i: usize) -> Option<&Alerter> {
        if i == 0 {
            None
        } else {
            self.alerters.get(i - 1)
        }
    }

    /// 1-based index for a name, 0 when absent.
    pub fn index_of(&self, name: &str) -> usize {
        self.alerters
            .iter()
            .position(|a| a.id == name)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alerter> {
        self.alerters.iter()
    }
}
