use wellclear::bands::engine::Axis;
use wellclear::prelude::*;

fn main() {
    let mut daa = WellClear::new();
    daa.set_ownship_euclidean(
        "ownship",
        Vect3::new(0.0, 0.0, 3048.0),
        Vect3::from_trk_gs_vs(90.0_f64.to_radians(), 102.9, 0.0),
        0.0,
    );
    daa.set_traffic_euclidean(
        "intruder",
        Vect3::new(10.0 * 1852.0, 0.0, 3048.0),
        Vect3::from_trk_gs_vs(270.0_f64.to_radians(), 102.9, 0.0),
        0.0,
    );

    println!("alert level: {}", daa.alert_level(1));
    for range in daa.bands(Axis::HorizontalDirection).to_vec() {
        // JSON output
        let json = serde_json::to_string(&range).expect("JSON error");
        println!("{}", json);
    }
}
