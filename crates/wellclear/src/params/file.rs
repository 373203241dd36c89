/**
* Parameter file reading and writing.
*
* The format is line oriented: `key = value [unit]`, with `#` or `//`
* starting a comment. Legacy key aliases are accepted on input. Alerters
* are serialized through a top-level list key
*
*   alerters = default, terminal
*
* and per-alerter prefixed keys such as `default_alert_1_detector` or
* `default_alert_1_DTHR`. Loading is tolerant: unknown keys produce
* warnings, missing keys keep their current values, and malformed lines
* are collected into a structured error that leaves the previous record
* untouched.
*/
use super::Parameters;
use crate::alert::{AlertLevel, Alerter, AlerterList, Region};
use crate::detect::DetectorVolume;
use crate::units;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;
use tracing::warn;

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").unwrap()
});

static VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*(?:\[([^\]]+)\]|([A-Za-z/^0-9]+))?$",
    )
    .unwrap()
});

static ALIASES: Lazy<BTreeMap<&'static str, &'static str>> =
    Lazy::new(|| {
        let mut m = BTreeMap::new();
        m.insert("left_trk", "left_hdir");
        m.insert("right_trk", "right_hdir");
        m.insert("trk_step", "step_hdir");
        m.insert("hdir_step", "step_hdir");
        m.insert("gs_step", "step_hs");
        m.insert("hs_step", "step_hs");
        m.insert("vs_step", "step_vs");
        m.insert("alt_step", "step_alt");
        m.insert("min_gs", "min_hs");
        m.insert("max_gs", "max_hs");
        m.insert("below_relative_gs", "below_relative_hs");
        m.insert("above_relative_gs", "above_relative_hs");
        m.insert("recovery_trk", "recovery_hdir");
        m.insert("recovery_gs", "recovery_hs");
        m.insert("persistence_preferred_trk", "persistence_preferred_hdir");
        m.insert("persistence_preferred_gs", "persistence_preferred_hs");
        m.insert("conflict_criteria", "conflict_crit");
        m.insert("recovery_criteria", "recovery_crit");
        m
    });

/// Keys holding plain degrees or counts, exempt from SI conversion.
const RAW_KEYS: [&str; 8] = [
    "dta_latitude",
    "dta_longitude",
    "dta_logic",
    "dta_alerter",
    "alerting_m",
    "alerting_n",
    "ca_factor",
    "corrective_region",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Error)]
#[error("parameter file rejected: {} malformed line(s)", .lines.len())]
pub struct ParseErrors {
    pub lines: Vec<BadLine>,
}

struct Entry {
    line: usize,
    value: String,
}

fn strip_comment(line: &str) -> &str {
    let cut = line
        .find('#')
        .into_iter()
        .chain(line.find("//"))
        .min()
        .unwrap_or(line.len());
    &line[..cut]
}

fn parse_si(value: &str) -> Result<f64, String> {
    let caps = VALUE
        .captures(value)
        .ok_or_else(|| format!("cannot parse value `{value}`"))?;
    let number: f64 = caps[1]
        .parse()
        .map_err(|_| format!("cannot parse number `{}`", &caps[1]))?;
    let unit = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim());
    match unit {
        None | Some("") => Ok(number),
        Some(unit) => {
            // the -1 sentinel of relative windows stays unscaled
            if number == -1.0 {
                return Ok(-1.0);
            }
            units::from_unit(number, unit)
                .ok_or_else(|| format!("unknown unit `{unit}`"))
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("cannot parse boolean `{other}`")),
    }
}

fn parse_raw(value: &str) -> Result<f64, String> {
    let caps = VALUE
        .captures(value)
        .ok_or_else(|| format!("cannot parse value `{value}`"))?;
    caps[1]
        .parse()
        .map_err(|_| format!("cannot parse number `{}`", &caps[1]))
}

/// Parse a parameter file on top of `base`. Returns the updated record
/// and the warnings for unknown keys; malformed lines reject the whole
/// file.
pub fn parse_parameters_with(
    base: &Parameters,
    text: &str,
) -> Result<(Parameters, Vec<String>), ParseErrors> {
    let mut entries: BTreeMap<String, Entry> = BTreeMap::new();
    let mut bad = vec![];
    for (i, raw_line) in text.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some(caps) = LINE.captures(line) else {
            bad.push(BadLine {
                line: i + 1,
                text: raw_line.to_string(),
                reason: "expected `key = value [unit]`".to_string(),
            });
            continue;
        };
        let key = caps[1].to_string();
        let key = ALIASES
            .get(key.as_str())
            .map(|canonical| canonical.to_string())
            .unwrap_or(key);
        entries.insert(
            key,
            Entry {
                line: i + 1,
                value: caps[2].to_string(),
            },
        );
    }

    let mut params = base.clone();
    let mut warnings = vec![];

    // alerters first: their prefixed keys are consumed here
    if let Some(list) = entries.remove("alerters") {
        let mut alerters = AlerterList::empty();
        for name in list.value.split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            match parse_alerter(name, &mut entries, &mut bad) {
                Some(alerter) => {
                    alerters.push(alerter);
                }
                None => bad.push(BadLine {
                    line: list.line,
                    text: name.to_string(),
                    reason: format!("alerter `{name}` has no levels"),
                }),
            }
        }
        if !alerters.is_empty() {
            params.alerters = alerters;
        }
    }

    for (key, entry) in entries {
        if let Err(reason) = apply_entry(&mut params, &key, &entry.value) {
            match reason {
                ApplyError::Unknown => {
                    warn!("unknown parameter key `{key}`");
                    warnings.push(format!(
                        "line {}: unknown key `{key}`",
                        entry.line
                    ));
                }
                ApplyError::Bad(reason) => bad.push(BadLine {
                    line: entry.line,
                    text: format!("{key} = {}", entry.value),
                    reason,
                }),
            }
        }
    }

    if bad.is_empty() {
        Ok((params, warnings))
    } else {
        Err(ParseErrors { lines: bad })
    }
}

pub fn parse_parameters(
    text: &str,
) -> Result<(Parameters, Vec<String>), ParseErrors> {
    parse_parameters_with(&Parameters::default(), text)
}

fn parse_alerter(
    name: &str,
    entries: &mut BTreeMap<String, Entry>,
    bad: &mut Vec<BadLine>,
) -> Option<Alerter> {
    let mut alerter = Alerter::new(name);
    for i in 1.. {
        let prefix = format!("{name}_alert_{i}_");
        let Some(detector_entry) = entries.remove(&format!("{prefix}detector"))
        else {
            break;
        };
        let mut take = |suffix: &str| -> Option<f64> {
            let entry = entries.remove(&format!("{prefix}{suffix}"))?;
            match parse_si(&entry.value) {
                Ok(v) => Some(v),
                Err(reason) => {
                    bad.push(BadLine {
                        line: entry.line,
                        text: format!("{prefix}{suffix} = {}", entry.value),
                        reason,
                    });
                    None
                }
            }
        };
        let detector = match detector_entry.value.as_str() {
            "CD3D" => DetectorVolume::Cd3d {
                d: take("D").unwrap_or(5.0 * 1852.0),
                h: take("H").unwrap_or(1000.0 * 0.3048),
            },
            "CD3D_SUM" => DetectorVolume::Cd3dSum {
                d: take("D").unwrap_or(5.0 * 1852.0),
                h: take("H").unwrap_or(1000.0 * 0.3048),
            },
            "WCV_TAUMOD" => DetectorVolume::TauMod {
                dthr: take("DTHR").unwrap_or(0.66 * 1852.0),
                zthr: take("ZTHR").unwrap_or(450.0 * 0.3048),
                tthr: take("TTHR").unwrap_or(35.0),
            },
            "WCV_TAUMOD_SUM" => DetectorVolume::TauModSum {
                dthr: take("DTHR").unwrap_or(0.66 * 1852.0),
                zthr: take("ZTHR").unwrap_or(450.0 * 0.3048),
                tthr: take("TTHR").unwrap_or(35.0),
            },
            other => {
                bad.push(BadLine {
                    line: detector_entry.line,
                    text: format!("{prefix}detector = {other}"),
                    reason: format!("unknown detector `{other}`"),
                });
                break;
            }
        };
        let alerting_time = take("alerting_time").unwrap_or(55.0);
        let early = take("early_alerting_time")
            .unwrap_or(alerting_time)
            .max(alerting_time);
        let region = match entries.remove(&format!("{prefix}region")) {
            Some(entry) => match Region::from_name(entry.value.as_str()) {
                Some(region) => region,
                None => {
                    bad.push(BadLine {
                        line: entry.line,
                        text: format!("{prefix}region = {}", entry.value),
                        reason: "unknown region".to_string(),
                    });
                    Region::Near
                }
            },
            None => Region::Near,
        };
        alerter.levels.push(AlertLevel {
            detector,
            alerting_time,
            early_alerting_time: early,
            region,
        });
    }
    if alerter.levels.is_empty() {
        None
    } else {
        Some(alerter)
    }
}

enum ApplyError {
    Unknown,
    Bad(String),
}

fn apply_entry(
    p: &mut Parameters,
    key: &str,
    value: &str,
) -> Result<(), ApplyError> {
    let bad = ApplyError::Bad;
    if RAW_KEYS.contains(&key) {
        match key {
            "dta_latitude" => p.dta_latitude = parse_raw(value).map_err(bad)?,
            "dta_longitude" => {
                p.dta_longitude = parse_raw(value).map_err(bad)?
            }
            "dta_logic" => {
                p.set_dta_logic(parse_raw(value).map_err(bad)? as i32)
            }
            "dta_alerter" => {
                p.dta_alerter = parse_raw(value).map_err(bad)? as usize
            }
            "alerting_m" => {
                p.alerting_m = parse_raw(value).map_err(bad)? as usize
            }
            "alerting_n" => {
                p.alerting_n = parse_raw(value).map_err(bad)? as usize
            }
            "ca_factor" => {
                let f = parse_raw(value).map_err(bad)?;
                if !p.set_ca_factor(f) {
                    return Err(ApplyError::Bad(format!(
                        "ca_factor {f} outside (0, 1]"
                    )));
                }
            }
            "corrective_region" => {
                p.corrective_region = Region::from_name(value)
                    .filter(Region::is_conflict)
                    .ok_or_else(|| {
                        ApplyError::Bad(format!(
                            "`{value}` is not a conflict region"
                        ))
                    })?
            }
            _ => unreachable!(),
        }
        return Ok(());
    }

    // booleans
    match key {
        "recovery_hdir" => {
            p.recovery_hdir = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "recovery_hs" => {
            p.recovery_hs = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "recovery_vs" => {
            p.recovery_vs = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "recovery_alt" => {
            p.recovery_alt = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "ca_bands" => {
            p.ca_bands = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "bands_persistence" => {
            p.bands_persistence = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "ownship_centric_alerting" => {
            p.ownship_centric_alerting = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "conflict_crit" => {
            p.conflict_crit = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        "recovery_crit" => {
            p.recovery_crit = parse_bool(value).map_err(bad)?;
            return Ok(());
        }
        _ => {}
    }

    let field: &mut f64 = match key {
        "lookahead_time" => &mut p.lookahead_time,
        "left_hdir" => &mut p.left_hdir,
        "right_hdir" => &mut p.right_hdir,
        "step_hdir" => &mut p.step_hdir,
        "min_hs" => &mut p.min_hs,
        "max_hs" => &mut p.max_hs,
        "step_hs" => &mut p.step_hs,
        "below_relative_hs" => &mut p.below_relative_hs,
        "above_relative_hs" => &mut p.above_relative_hs,
        "min_vs" => &mut p.min_vs,
        "max_vs" => &mut p.max_vs,
        "step_vs" => &mut p.step_vs,
        "below_relative_vs" => &mut p.below_relative_vs,
        "above_relative_vs" => &mut p.above_relative_vs,
        "min_alt" => &mut p.min_alt,
        "max_alt" => &mut p.max_alt,
        "step_alt" => &mut p.step_alt,
        "below_relative_alt" => &mut p.below_relative_alt,
        "above_relative_alt" => &mut p.above_relative_alt,
        "turn_rate" => &mut p.turn_rate,
        "bank_angle" => &mut p.bank_angle,
        "horizontal_accel" => &mut p.horizontal_accel,
        "vertical_accel" => &mut p.vertical_accel,
        "vertical_rate" => &mut p.vertical_rate,
        "min_horizontal_recovery" => &mut p.min_horizontal_recovery,
        "min_vertical_recovery" => &mut p.min_vertical_recovery,
        "recovery_stability_time" => &mut p.recovery_stability_time,
        "horizontal_nmac" => &mut p.horizontal_nmac,
        "vertical_nmac" => &mut p.vertical_nmac,
        "hysteresis_time" => &mut p.hysteresis_time,
        "persistence_time" => &mut p.persistence_time,
        "persistence_preferred_hdir" => &mut p.persistence_preferred_hdir,
        "persistence_preferred_hs" => &mut p.persistence_preferred_hs,
        "persistence_preferred_vs" => &mut p.persistence_preferred_vs,
        "persistence_preferred_alt" => &mut p.persistence_preferred_alt,
        "h_pos_z_score" => &mut p.h_pos_z_score,
        "h_vel_z_score_min" => &mut p.h_vel_z_score_min,
        "h_vel_z_score_max" => &mut p.h_vel_z_score_max,
        "h_vel_z_distance" => &mut p.h_vel_z_distance,
        "v_pos_z_score" => &mut p.v_pos_z_score,
        "v_speed_z_score" => &mut p.v_speed_z_score,
        "dta_radius" => &mut p.dta_radius,
        "dta_height" => &mut p.dta_height,
        _ => return Err(ApplyError::Unknown),
    };
    *field = parse_si(value).map_err(bad)?;
    Ok(())
}

fn fmt_float(out: &mut String, value: f64) {
    if value == value.trunc() && value.abs() < 1e15 {
        let _ = write!(out, "{:.1}", value);
    } else {
        let _ = write!(out, "{}", value);
    }
}

fn push_key(out: &mut String, key: &str, value: f64, unit: &str) {
    let _ = write!(out, "{key} = ");
    fmt_float(out, value);
    if unit.is_empty() {
        out.push('\n');
    } else {
        let _ = writeln!(out, " [{unit}]");
    }
}

/// Serialize the full record. Values are written in SI so that a load of
/// the output reproduces the record exactly; float formatting is the
/// shortest digit string that round-trips.
pub fn format_parameters(p: &Parameters) -> String {
    let mut out = String::new();
    out.push_str("# WellClear parameters\n");
    push_key(&mut out, "lookahead_time", p.lookahead_time, "s");
    out.push('\n');

    push_key(&mut out, "left_hdir", p.left_hdir, "rad");
    push_key(&mut out, "right_hdir", p.right_hdir, "rad");
    push_key(&mut out, "step_hdir", p.step_hdir, "rad");
    push_key(&mut out, "min_hs", p.min_hs, "m/s");
    push_key(&mut out, "max_hs", p.max_hs, "m/s");
    push_key(&mut out, "step_hs", p.step_hs, "m/s");
    push_key(&mut out, "below_relative_hs", p.below_relative_hs, "m/s");
    push_key(&mut out, "above_relative_hs", p.above_relative_hs, "m/s");
    push_key(&mut out, "min_vs", p.min_vs, "m/s");
    push_key(&mut out, "max_vs", p.max_vs, "m/s");
    push_key(&mut out, "step_vs", p.step_vs, "m/s");
    push_key(&mut out, "below_relative_vs", p.below_relative_vs, "m/s");
    push_key(&mut out, "above_relative_vs", p.above_relative_vs, "m/s");
    push_key(&mut out, "min_alt", p.min_alt, "m");
    push_key(&mut out, "max_alt", p.max_alt, "m");
    push_key(&mut out, "step_alt", p.step_alt, "m");
    push_key(&mut out, "below_relative_alt", p.below_relative_alt, "m");
    push_key(&mut out, "above_relative_alt", p.above_relative_alt, "m");
    out.push('\n');

    push_key(&mut out, "turn_rate", p.turn_rate, "rad/s");
    push_key(&mut out, "bank_angle", p.bank_angle, "rad");
    push_key(&mut out, "horizontal_accel", p.horizontal_accel, "m/s^2");
    push_key(&mut out, "vertical_accel", p.vertical_accel, "m/s^2");
    push_key(&mut out, "vertical_rate", p.vertical_rate, "m/s");
    out.push('\n');

    push_key(
        &mut out,
        "min_horizontal_recovery",
        p.min_horizontal_recovery,
        "m",
    );
    push_key(
        &mut out,
        "min_vertical_recovery",
        p.min_vertical_recovery,
        "m",
    );
    let _ = writeln!(out, "recovery_hdir = {}", p.recovery_hdir);
    let _ = writeln!(out, "recovery_hs = {}", p.recovery_hs);
    let _ = writeln!(out, "recovery_vs = {}", p.recovery_vs);
    let _ = writeln!(out, "recovery_alt = {}", p.recovery_alt);
    push_key(
        &mut out,
        "recovery_stability_time",
        p.recovery_stability_time,
        "s",
    );
    let _ = writeln!(out, "ca_bands = {}", p.ca_bands);
    push_key(&mut out, "ca_factor", p.ca_factor, "");
    push_key(&mut out, "horizontal_nmac", p.horizontal_nmac, "m");
    push_key(&mut out, "vertical_nmac", p.vertical_nmac, "m");
    out.push('\n');

    push_key(&mut out, "hysteresis_time", p.hysteresis_time, "s");
    push_key(&mut out, "persistence_time", p.persistence_time, "s");
    let _ = writeln!(out, "bands_persistence = {}", p.bands_persistence);
    push_key(
        &mut out,
        "persistence_preferred_hdir",
        p.persistence_preferred_hdir,
        "rad",
    );
    push_key(
        &mut out,
        "persistence_preferred_hs",
        p.persistence_preferred_hs,
        "m/s",
    );
    push_key(
        &mut out,
        "persistence_preferred_vs",
        p.persistence_preferred_vs,
        "m/s",
    );
    push_key(
        &mut out,
        "persistence_preferred_alt",
        p.persistence_preferred_alt,
        "m",
    );
    let _ = writeln!(out, "alerting_m = {}", p.alerting_m);
    let _ = writeln!(out, "alerting_n = {}", p.alerting_n);
    out.push('\n');

    push_key(&mut out, "h_pos_z_score", p.h_pos_z_score, "");
    push_key(&mut out, "h_vel_z_score_min", p.h_vel_z_score_min, "");
    push_key(&mut out, "h_vel_z_score_max", p.h_vel_z_score_max, "");
    push_key(&mut out, "h_vel_z_distance", p.h_vel_z_distance, "m");
    push_key(&mut out, "v_pos_z_score", p.v_pos_z_score, "");
    push_key(&mut out, "v_speed_z_score", p.v_speed_z_score, "");
    out.push('\n');

    let _ = writeln!(
        out,
        "ownship_centric_alerting = {}",
        p.ownship_centric_alerting
    );
    let _ = writeln!(out, "corrective_region = {}", p.corrective_region);
    let _ = writeln!(out, "conflict_crit = {}", p.conflict_crit);
    let _ = writeln!(out, "recovery_crit = {}", p.recovery_crit);
    let _ = writeln!(out, "dta_logic = {}", p.dta_logic);
    push_key(&mut out, "dta_latitude", p.dta_latitude, "");
    push_key(&mut out, "dta_longitude", p.dta_longitude, "");
    push_key(&mut out, "dta_radius", p.dta_radius, "m");
    push_key(&mut out, "dta_height", p.dta_height, "m");
    let _ = writeln!(out, "dta_alerter = {}", p.dta_alerter);
    out.push('\n');

    let names: Vec<&str> =
        p.alerters.iter().map(|a| a.id.as_str()).collect();
    let _ = writeln!(out, "alerters = {}", names.join(", "));
    for alerter in p.alerters.iter() {
        for (i, level) in alerter.levels.iter().enumerate() {
            let prefix = format!("{}_alert_{}", alerter.id, i + 1);
            let _ = writeln!(
                out,
                "{prefix}_detector = {}",
                level.detector.name()
            );
            match level.detector {
                DetectorVolume::Cd3d { d, h }
                | DetectorVolume::Cd3dSum { d, h } => {
                    push_key(&mut out, &format!("{prefix}_D"), d, "m");
                    push_key(&mut out, &format!("{prefix}_H"), h, "m");
                }
                DetectorVolume::TauMod { dthr, zthr, tthr }
                | DetectorVolume::TauModSum { dthr, zthr, tthr } => {
                    push_key(&mut out, &format!("{prefix}_DTHR"), dthr, "m");
                    push_key(&mut out, &format!("{prefix}_ZTHR"), zthr, "m");
                    push_key(&mut out, &format!("{prefix}_TTHR"), tthr, "s");
                }
            }
            push_key(
                &mut out,
                &format!("{prefix}_alerting_time"),
                level.alerting_time,
                "s",
            );
            push_key(
                &mut out,
                &format!("{prefix}_early_alerting_time"),
                level.early_alerting_time,
                "s",
            );
            let _ =
                writeln!(out, "{prefix}_region = {}", level.region);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parse_with_units_and_comments() {
        let text = "\
# well clear volume
lookahead_time = 180 [s]
min_horizontal_recovery = 0.66 [nmi]  // legacy value
left_trk = 90 [deg]
max_gs = 600 knot
ca_bands = true
";
        let (p, warnings) = parse_parameters(text).unwrap();
        assert!(warnings.is_empty());
        assert_relative_eq!(p.lookahead_time, 180.0);
        assert_relative_eq!(p.min_horizontal_recovery, 0.66 * 1852.0);
        // alias resolves to the hdir field
        assert_relative_eq!(p.left_hdir, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(p.max_hs, 600.0 * 1852.0 / 3600.0);
        assert!(p.ca_bands);
    }

    #[test]
    fn unknown_keys_warn_but_load() {
        let (p, warnings) =
            parse_parameters("no_such_key = 42\nlookahead_time = 60 [s]\n")
                .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_relative_eq!(p.lookahead_time, 60.0);
    }

    #[test]
    fn malformed_lines_reject_the_file() {
        let err = parse_parameters(
            "lookahead_time = 60 [s]\nmax_gs = banana\nstep_hs = 1 [lightyear]\n",
        )
        .unwrap_err();
        assert_eq!(err.lines.len(), 2);
        assert_eq!(err.lines[0].line, 2);
        assert_eq!(err.lines[1].line, 3);
    }

    #[test]
    fn relative_window_sentinel_survives_units() {
        let (p, _) =
            parse_parameters("below_relative_hs = -1 [knot]\n").unwrap();
        assert_relative_eq!(p.below_relative_hs, -1.0);
    }

    #[test]
    fn alerter_round_trip() {
        let mut base = Parameters::default();
        base.alerters.push(Alerter::single(
            "terminal",
            DetectorVolume::Cd3d {
                d: 1852.0,
                h: 100.0,
            },
            30.0,
        ));
        let text = format_parameters(&base);
        let (parsed, warnings) = parse_parameters(&text).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(parsed, base);
    }

    #[test]
    fn full_round_trip_of_defaults() {
        let base = Parameters::default();
        let (parsed, warnings) =
            parse_parameters(&format_parameters(&base)).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(parsed, base);
    }

    #[test]
    fn alerter_keys_build_levels() {
        let text = "\
alerters = tcas
tcas_alert_1_detector = CD3D
tcas_alert_1_D = 9260 [m]
tcas_alert_1_H = 304.8 [m]
tcas_alert_1_alerting_time = 60 [s]
tcas_alert_1_early_alerting_time = 60 [s]
tcas_alert_1_region = NEAR
";
        let (p, _) = parse_parameters(text).unwrap();
        assert_eq!(p.alerters.len(), 1);
        let alerter = p.alerters.alerter_at(1).unwrap();
        assert_eq!(alerter.id, "tcas");
        assert_eq!(alerter.levels.len(), 1);
        assert_eq!(alerter.levels[0].region, Region::Near);
        assert_relative_eq!(
            alerter.levels[0].detector.horizontal_threshold(),
            9260.0
        );
    }
}
