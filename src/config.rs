use std::env;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, warn};

pub mod constant {
    use chrono::NaiveTime;

    use crate::clock::hm;

    /// Packages a single truck can carry.
    pub const TRUCK_CAPACITY: usize = 16;
    /// Randomized loads tried per truck before picking the shortest tour.
    pub const TRIALS: usize = 30;
    /// Distance units covered per hour.
    pub const SPEED: f64 = 18.0;
    /// Minutes ahead of a deadline at which the next stop is forced.
    pub const DEADLINE_WINDOW_MINUTES: i64 = 30;
    pub const HUB: usize = 0;
    pub const SEED: u64 = 12345;

    /// Wrong-address packages have been corrected from this time on.
    pub const ADDRESS_CORRECTION: NaiveTime = hm(10, 5);
    /// Delayed packages reach the hub at this time.
    pub const DELAYED_ARRIVAL: NaiveTime = hm(9, 5);
    /// Check times outside this window are rejected.
    pub const DAY_START: NaiveTime = hm(8, 0);
    pub const DAY_END: NaiveTime = hm(17, 0);

    /// Trucks in dispatch order: (truck number, departure clock).
    pub const FLEET: [(u8, &str); 3] = [(1, "08:00:01"), (3, "09:05:01"), (2, "10:05:01")];

    pub const LOCATION_CSV_PATH: &str = "data/locations.csv";
    pub const PACKAGE_CSV_PATH: &str = "data/packages.csv";
    pub const DEMO_LOCATION_COUNT: usize = 27;
    pub const DEMO_PACKAGE_COUNT: usize = 40;
}

#[derive(Parser, Debug)]
#[command(name = "parcel-sim")]
#[command(about = "Plan truck routes and report package status at a given time")]
pub struct Cli {
    /// Status check time, HHMM between 0800 and 1700 (prompted for when omitted)
    #[arg(long)]
    pub at: Option<String>,

    /// Location distance table CSV
    #[arg(long)]
    pub locations: Option<PathBuf>,

    /// Package file CSV
    #[arg(long)]
    pub packages: Option<PathBuf>,

    /// Seed for load sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use generated data instead of the CSV files
    #[arg(long)]
    pub demo: bool,

    /// Write the package status table to this CSV file
    #[arg(long)]
    pub status_csv: Option<PathBuf>,
}

/// Effective run settings: CLI flags, then `.env` / environment, then defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub location_csv: PathBuf,
    pub package_csv: PathBuf,
    pub seed: u64,
    pub demo: bool,
    pub status_csv: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Self {
        let location_csv = cli.locations.clone().unwrap_or_else(|| {
            env::var("LOCATION_CSV_PATH")
                .unwrap_or_else(|_| constant::LOCATION_CSV_PATH.to_string())
                .into()
        });
        let package_csv = cli.packages.clone().unwrap_or_else(|| {
            env::var("PACKAGE_CSV_PATH")
                .unwrap_or_else(|_| constant::PACKAGE_CSV_PATH.to_string())
                .into()
        });
        let seed = cli.seed.unwrap_or_else(seed_from_env);

        let settings = Self {
            location_csv,
            package_csv,
            seed,
            demo: cli.demo,
            status_csv: cli.status_csv.clone(),
        };
        debug!("Resolved settings: {:?}", settings);
        settings
    }
}

fn seed_from_env() -> u64 {
    match env::var("ROUTE_SEED") {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ROUTE_SEED {:?} is not a u64, using {}", raw, constant::SEED);
            constant::SEED
        }),
        Err(_) => constant::SEED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn cli_flags_take_precedence() {
        let cli = Cli::parse_from([
            "parcel-sim",
            "--at",
            "0930",
            "--locations",
            "a.csv",
            "--packages",
            "b.csv",
            "--seed",
            "7",
        ]);
        let settings = Settings::resolve(&cli);
        assert_eq!(settings.location_csv, PathBuf::from("a.csv"));
        assert_eq!(settings.package_csv, PathBuf::from("b.csv"));
        assert_eq!(settings.seed, 7);
        assert!(!settings.demo);
        assert_eq!(cli.at.as_deref(), Some("0930"));
    }

    #[rstest]
    fn fleet_is_dispatched_earliest_first() {
        let departures: Vec<&str> = constant::FLEET.iter().map(|(_, d)| *d).collect();
        let mut sorted = departures.clone();
        sorted.sort_unstable();
        assert_eq!(departures, sorted);
    }
}
