#![doc = include_str!("../readme.md")]

use ansi_term::Colour;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use wellclear::bands::engine::Axis;
use wellclear::bands::hysteresis::BandsDirection;
use wellclear::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncounterPosition {
    Local {
        x_nmi: f64,
        y_nmi: f64,
        alt_ft: f64,
    },
    Geodetic {
        lat: f64,
        lon: f64,
        alt_ft: f64,
    },
}

#[derive(Debug, Deserialize)]
struct EncounterVelocity {
    trk_deg: f64,
    gs_kt: f64,
    #[serde(default)]
    vs_fpm: f64,
}

impl EncounterVelocity {
    fn vect3(&self) -> Vect3 {
        Vect3::from_trk_gs_vs(
            self.trk_deg.to_radians(),
            self.gs_kt * 1852.0 / 3600.0,
            self.vs_fpm * 0.3048 / 60.0,
        )
    }
}

#[derive(Debug, Deserialize)]
struct EncounterAircraft {
    id: String,
    position: EncounterPosition,
    velocity: EncounterVelocity,
    #[serde(default)]
    alerter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Encounter {
    #[serde(default)]
    time: f64,
    ownship: EncounterAircraft,
    #[serde(default)]
    traffic: Vec<EncounterAircraft>,
    /// Wind in m/s ENU components
    #[serde(default)]
    wind: Option<[f64; 3]>,
}

#[derive(Debug, Serialize)]
struct AircraftReport {
    id: String,
    alert_level: i32,
    time_to_corrective: f64,
    nmac: bool,
}

#[derive(Debug, Serialize)]
struct AxisReport {
    bands: Vec<BandsRange>,
    resolution_lower: f64,
    resolution_upper: f64,
    preferred_upper: Option<bool>,
    recovery: RecoveryInformation,
}

#[derive(Debug, Serialize)]
struct TickReport {
    time: f64,
    alerts: Vec<AircraftReport>,
    horizontal_direction: AxisReport,
    horizontal_speed: AxisReport,
    vertical_speed: AxisReport,
    altitude: AxisReport,
}

#[derive(Debug, Parser)]
#[command(
    name = "wcbands",
    version,
    about = "Compute detect-and-avoid alerts and guidance bands"
)]
struct Options {
    /// Parameter file (key = value [unit])
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of the colored listing
    #[arg(long, default_value = "false")]
    json: bool,

    /// Number of ticks to run
    #[arg(long, default_value = "1")]
    ticks: u32,

    /// Seconds between ticks
    #[arg(long, default_value = "1.0")]
    dt: f64,

    /// Encounter file (JSON)
    encounter: PathBuf,
}

fn place(daa: &mut WellClear, encounter: &Encounter) -> Result<(), String> {
    let own = &encounter.ownship;
    match &own.position {
        EncounterPosition::Local { x_nmi, y_nmi, alt_ft } => {
            daa.set_ownship_euclidean(
                &own.id,
                Vect3::new(x_nmi * 1852.0, y_nmi * 1852.0, alt_ft * 0.3048),
                own.velocity.vect3(),
                encounter.time,
            );
        }
        EncounterPosition::Geodetic { lat, lon, alt_ft } => {
            daa.set_ownship_geodetic(
                &own.id,
                Position {
                    latitude: *lat,
                    longitude: *lon,
                    altitude: alt_ft * 0.3048,
                },
                own.velocity.vect3(),
                encounter.time,
            );
        }
    }
    if let Some([wx, wy, wz]) = encounter.wind {
        daa.set_wind_velocity(Vect3::new(wx, wy, wz));
    }
    for ac in &encounter.traffic {
        let index = match &ac.position {
            EncounterPosition::Local { x_nmi, y_nmi, alt_ft } => daa
                .set_traffic_euclidean(
                    &ac.id,
                    Vect3::new(
                        x_nmi * 1852.0,
                        y_nmi * 1852.0,
                        alt_ft * 0.3048,
                    ),
                    ac.velocity.vect3(),
                    encounter.time,
                ),
            EncounterPosition::Geodetic { lat, lon, alt_ft } => daa
                .set_traffic_geodetic(
                    &ac.id,
                    Position {
                        latitude: *lat,
                        longitude: *lon,
                        altitude: alt_ft * 0.3048,
                    },
                    ac.velocity.vect3(),
                    encounter.time,
                ),
        };
        if index == 0 {
            return Err(format!("aircraft {} was rejected", ac.id));
        }
        if let Some(alerter) = &ac.alerter {
            daa.set_traffic_alerter(&ac.id, alerter);
        }
    }
    Ok(())
}

fn axis_report(daa: &mut WellClear, axis: Axis) -> AxisReport {
    AxisReport {
        bands: daa.bands(axis).to_vec(),
        resolution_lower: daa.resolution(axis, BandsDirection::Lower),
        resolution_upper: daa.resolution(axis, BandsDirection::Upper),
        preferred_upper: daa
            .preferred_direction(axis)
            .map(|dir| dir == BandsDirection::Upper),
        recovery: daa.recovery_information(axis),
    }
}

fn tick_report(daa: &mut WellClear, encounter: &Encounter) -> TickReport {
    let alerts = encounter
        .traffic
        .iter()
        .enumerate()
        .map(|(i, ac)| AircraftReport {
            id: ac.id.clone(),
            alert_level: daa.alert_level(i + 1),
            time_to_corrective: daa.time_to_corrective_volume(i + 1),
            nmac: daa.nmac(i + 1),
        })
        .collect();
    TickReport {
        time: daa.current_time(),
        alerts,
        horizontal_direction: axis_report(daa, Axis::HorizontalDirection),
        horizontal_speed: axis_report(daa, Axis::HorizontalSpeed),
        vertical_speed: axis_report(daa, Axis::VerticalSpeed),
        altitude: axis_report(daa, Axis::Altitude),
    }
}

fn paint(region: Region) -> ansi_term::ANSIGenericString<'static, str> {
    let name = region.to_string();
    match region {
        Region::None => Colour::Green.paint(name),
        Region::Far | Region::Mid => Colour::Yellow.paint(name),
        Region::Near => Colour::Red.bold().paint(name),
        Region::Recovery => Colour::Cyan.bold().paint(name),
        Region::Unknown => Colour::Purple.paint(name),
    }
}

fn axis_unit(axis: Axis, value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    match axis {
        Axis::HorizontalDirection => {
            format!("{:.1} deg", value.to_degrees())
        }
        Axis::HorizontalSpeed => {
            format!("{:.1} kt", value / (1852.0 / 3600.0))
        }
        Axis::VerticalSpeed => {
            format!("{:.0} fpm", value / (0.3048 / 60.0))
        }
        Axis::Altitude => format!("{:.0} ft", value / 0.3048),
    }
}

fn print_axis(daa: &mut WellClear, name: &str, axis: Axis) {
    println!("  {name}:");
    for range in daa.bands(axis).to_vec() {
        println!(
            "    [{} .. {}] {}",
            axis_unit(axis, range.interval.low),
            axis_unit(axis, range.interval.up),
            paint(range.region),
        );
    }
    let lower = daa.resolution(axis, BandsDirection::Lower);
    let upper = daa.resolution(axis, BandsDirection::Upper);
    if lower.is_nan() && upper.is_nan() {
        return;
    }
    let preferred = match daa.preferred_direction(axis) {
        Some(BandsDirection::Upper) => "up/right",
        Some(BandsDirection::Lower) => "down/left",
        None => "-",
    };
    println!(
        "    resolution: {} / {} (preferred {preferred})",
        axis_unit(axis, lower),
        axis_unit(axis, upper),
    );
    let recovery = daa.recovery_information(axis);
    if recovery.is_active() {
        println!(
            "    recovery in {:.1} s, cylinder {:.2} nmi / {:.0} ft (n = {})",
            recovery.time_to_recovery,
            recovery.recovery_horizontal_distance / 1852.0,
            recovery.recovery_vertical_distance / 0.3048,
            recovery.recovery_nfactor,
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env(),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();

    let mut daa = WellClear::new();
    if let Some(config) = &options.config {
        if !daa.load_parameters_from_file(config) {
            for error in daa.drain_errors() {
                eprintln!("{error}");
            }
            std::process::exit(1);
        }
        info!("parameters loaded from {:?}", config);
    }

    let text = match std::fs::read_to_string(&options.encounter) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("cannot read {:?}: {err}", options.encounter);
            std::process::exit(1);
        }
    };
    let encounter: Encounter = match serde_json::from_str(&text) {
        Ok(encounter) => encounter,
        Err(err) => {
            eprintln!("cannot parse {:?}: {err}", options.encounter);
            std::process::exit(1);
        }
    };
    if let Err(err) = place(&mut daa, &encounter) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    for tick in 0..options.ticks {
        if tick > 0 {
            daa.linear_projection(options.dt);
        }
        if options.json {
            let report = tick_report(&mut daa, &encounter);
            println!(
                "{}",
                serde_json::to_string(&report).expect("JSON error")
            );
        } else {
            println!("t = {:.1} s", daa.current_time());
            for (i, ac) in encounter.traffic.iter().enumerate() {
                let level = daa.alert_level(i + 1);
                let ttc = daa.time_to_corrective_volume(i + 1);
                println!(
                    "  {}: alert {} (time to corrective: {:.1} s){}",
                    ac.id,
                    level,
                    ttc,
                    if daa.nmac(i + 1) { " NMAC" } else { "" },
                );
            }
            print_axis(&mut daa, "direction", Axis::HorizontalDirection);
            print_axis(&mut daa, "horizontal speed", Axis::HorizontalSpeed);
            print_axis(&mut daa, "vertical speed", Axis::VerticalSpeed);
            print_axis(&mut daa, "altitude", Axis::Altitude);
        }
        for error in daa.drain_errors() {
            eprintln!("{error}");
        }
    }
}
