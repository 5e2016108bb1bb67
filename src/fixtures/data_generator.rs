use crate::config::constant::HUB;
use crate::setup::init_types::{LocationRecord, PackageRecord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

const STREETS: [&str; 12] = [
    "Main St",
    "Oak Ave",
    "Pine Rd",
    "Elm St",
    "Cedar Blvd",
    "Maple Dr",
    "River Rd",
    "Hill St",
    "Lake Ave",
    "Park Way",
    "Canyon Rd",
    "Union Ave",
];

const HUB_ADDRESS: &str = "4001 South 700 East";

/// Street address for a generated location. Location 0 is the hub.
fn address_for(id: usize) -> String {
    if id == HUB {
        return HUB_ADDRESS.to_string();
    }
    format!("{} {}", 100 + id * 17, STREETS[id % STREETS.len()])
}

/// Random planar points turned into a lower-triangular distance table,
/// rounded to one decimal like the hand-maintained tables.
fn generate_locations(count: usize, rng: &mut ChaCha8Rng) -> Vec<LocationRecord> {
    let points: Vec<(f64, f64)> = (0..count)
        .map(|_| (rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
        .collect();

    points
        .iter()
        .enumerate()
        .map(|(i, &(xi, yi))| {
            let distances = points[..=i]
                .iter()
                .map(|&(xj, yj)| {
                    let d = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                    Some((d * 10.0).round() / 10.0)
                })
                .collect();
            LocationRecord {
                description: address_for(i),
                distances,
            }
        })
        .collect()
}

/// Deadline mix: mostly end of day with a few morning deadlines.
fn random_deadline(rng: &mut ChaCha8Rng) -> &'static str {
    match rng.gen_range(0..10) {
        0 => "9:00 AM",
        1 | 2 => "10:30 AM",
        _ => "EOD",
    }
}

fn random_notes(id: usize, rng: &mut ChaCha8Rng) -> String {
    match rng.gen_range(0..20) {
        0 => "Can only be on truck 2".to_string(),
        1 => "Delayed on flight---will not arrive to depot until 9:05 am".to_string(),
        2 => "Wrong address listed".to_string(),
        3 if id > 2 => {
            let first = rng.gen_range(1..id);
            let mut second = rng.gen_range(1..id);
            if second == first {
                second = if first + 1 < id { first + 1 } else { first - 1 };
            }
            format!(
                "Must be delivered with {}, {}",
                first.min(second),
                first.max(second)
            )
        }
        _ => String::new(),
    }
}

fn generate_packages(
    location_count: usize,
    package_count: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<PackageRecord> {
    if location_count < 2 {
        warn!("No delivery locations besides the hub, generating no packages");
        return Vec::new();
    }

    (1..=package_count)
        .map(|id| {
            let location = rng.gen_range(1..location_count);
            PackageRecord {
                id,
                street: address_for(location),
                city: "Salt Lake City".to_string(),
                state: "UT".to_string(),
                zip: format!("{}", 84100 + location),
                deadline: random_deadline(rng).to_string(),
                mass: rng.gen_range(1..=88) as f64,
                notes: random_notes(id, rng),
            }
        })
        .collect()
}

/// Generate a consistent location table and package file for demo runs and
/// tests. The same seed always yields the same data.
pub fn generate_random_inputs(
    location_count: usize,
    package_count: usize,
    seed: u64,
) -> (Vec<LocationRecord>, Vec<PackageRecord>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let locations = generate_locations(location_count, &mut rng);
    let packages = generate_packages(location_count, package_count, &mut rng);

    let constrained = packages.iter().filter(|p| !p.notes.is_empty()).count();
    info!(
        "Generated {} locations and {} packages ({} with notes)",
        locations.len(),
        packages.len(),
        constrained
    );
    debug!(
        "Generated addresses: {:?}",
        locations.iter().map(|l| &l.description).collect::<Vec<_>>()
    );

    (locations, packages)
}
