//! Distance command - print the geodesic distance between two points.

use lbs_bridge::{distance, Coordinate};

/// Arguments for the distance command.
pub struct DistanceArgs {
    pub lat1: f64,
    pub lon1: f64,
    pub lat2: f64,
    pub lon2: f64,
}

/// Run the distance command.
pub fn run(args: DistanceArgs) {
    let meters = compute(&args);
    println!("{:.3}", meters);
}

fn compute(args: &DistanceArgs) -> f64 {
    distance(
        Coordinate::new(args.lat1, args.lon1),
        Coordinate::new(args.lat2, args.lon2),
    )
}
