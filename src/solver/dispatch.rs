use std::error::Error;
use std::io::{self, BufRead, Write};

use chrono::NaiveTime;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::clock::{format_clock, parse_check_time};
use crate::config::constant::FLEET;
use crate::config::{Cli, Settings};
use crate::domain::{FleetReport, RoutingContext};
use crate::error::Result;
use crate::report::{print_report, write_status_csv};
use crate::setup::init::setup;
use crate::solver::sampler::RouteSampler;
use crate::solver::truck::Truck;
use dotenv::dotenv;

/// Initialize tracing and environment
fn init_tracing_and_env() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::CLOSE))
        .init();

    dotenv().ok();
    Ok(())
}

/// Trucks in dispatch order, as configured.
pub fn fleet_from_config() -> Result<Vec<Truck>> {
    FLEET
        .iter()
        .map(|&(number, departure)| Truck::with_departure(number, departure))
        .collect()
}

/// Plan and drive every truck in order against the shared context. Each truck
/// sees the package statuses left behind by the trucks before it.
pub fn dispatch_fleet<R: Rng>(
    ctx: &mut RoutingContext,
    fleet: &mut [Truck],
    check_time: NaiveTime,
    sampler: &RouteSampler,
    rng: &mut R,
) -> Result<FleetReport> {
    let span = span!(Level::INFO, "dispatch", check_time = %format_clock(check_time));
    let _guard = span.enter();

    let mut report = FleetReport::default();
    for truck in fleet.iter_mut() {
        truck.create_route(ctx, sampler, rng)?;
        report.trips.push(truck.deliver_packages(ctx, check_time)?);
    }

    info!(
        "Dispatched {} trucks, {:.1} total miles",
        report.trips.len(),
        report.total_distance()
    );
    Ok(report)
}

/// Ask on stdin until a valid check time is given. `None` when the user quits
/// or input ends.
fn prompt_check_time() -> std::result::Result<Option<NaiveTime>, Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("To check delivery status, enter time in format HHMM between 0800 & 1700 (enter 'q' to exit): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line?;
        let entry = line.trim();
        if entry.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match parse_check_time(entry) {
            Ok(time) => return Ok(Some(time)),
            Err(e) => println!("{}", e),
        }
    }
}

pub fn run() -> std::result::Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let cli = Cli::parse();

    let check_time = match cli.at.as_deref() {
        Some(raw) => parse_check_time(raw)?,
        None => match prompt_check_time()? {
            Some(time) => time,
            None => {
                warn!("No check time given, exiting");
                return Ok(());
            }
        },
    };
    println!("Checking delivery status as of {}...\n", check_time.format("%H:%M"));

    let settings = Settings::resolve(&cli);
    let mut ctx = setup(&settings)?;

    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let mut fleet = fleet_from_config()?;
    let report = dispatch_fleet(
        &mut ctx,
        &mut fleet,
        check_time,
        &RouteSampler::default(),
        &mut rng,
    )?;

    let rows = ctx.registry.status_rows();
    print_report(&report, &rows, check_time);

    if let Some(path) = &settings.status_csv {
        write_status_csv(&rows, path)?;
    }
    Ok(())
}
