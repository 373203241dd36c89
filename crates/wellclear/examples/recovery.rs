use wellclear::bands::engine::Axis;
use wellclear::prelude::*;

/// An intruder already inside the well-clear volume: the corrective
/// region saturates and the engine reports recovery guidance.
fn main() {
    let mut daa = WellClear::new();
    daa.set_ca_bands(true);
    daa.set_ownship_euclidean(
        "ownship",
        Vect3::new(0.0, 0.0, 3048.0),
        Vect3::from_trk_gs_vs(90.0_f64.to_radians(), 102.9, 0.0),
        0.0,
    );
    daa.set_traffic_euclidean(
        "intruder",
        Vect3::new(0.5 * 1852.0, 0.0, 3048.0 + 60.0),
        Vect3::from_trk_gs_vs(90.0_f64.to_radians(), 102.9, 0.0),
        0.0,
    );

    let info = daa.recovery_information(Axis::HorizontalDirection);
    println!(
        "time to recovery: {:.1} s (cylinder {:.2} nmi / {:.0} ft, n = {})",
        info.time_to_recovery,
        info.recovery_horizontal_distance / 1852.0,
        info.recovery_vertical_distance / 0.3048,
        info.recovery_nfactor,
    );
    for range in daa.bands(Axis::HorizontalDirection).to_vec() {
        println!(
            "[{:6.1} .. {:6.1}] deg {:?}",
            range.interval.low.to_degrees(),
            range.interval.up.to_degrees(),
            range.region,
        );
    }
}
