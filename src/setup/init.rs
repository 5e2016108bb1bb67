use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, span, Level};

use crate::config::constant::{DEMO_LOCATION_COUNT, DEMO_PACKAGE_COUNT};
use crate::config::Settings;
use crate::domain::{Deadline, DeliveryStatus, Location, Package, PackageConstraints, RoutingContext};
use crate::error::{Result, RoutingError};
use crate::fixtures::data_generator::generate_random_inputs;
use crate::setup::init_types::{LocationRecord, PackageRecord};

/// Build the routing context from the configured CSV files, or from generated
/// data for demo runs.
pub fn setup(settings: &Settings) -> Result<RoutingContext> {
    let span = span!(Level::INFO, "setup");
    let _guard = span.enter();

    let (locations, packages) = if settings.demo {
        info!(
            "Generating demo data: {} locations, {} packages (seed {})",
            DEMO_LOCATION_COUNT, DEMO_PACKAGE_COUNT, settings.seed
        );
        generate_random_inputs(DEMO_LOCATION_COUNT, DEMO_PACKAGE_COUNT, settings.seed)
    } else {
        (
            load_locations(&settings.location_csv)?,
            load_packages(&settings.package_csv)?,
        )
    };

    let ctx = build_context(locations, packages)?;
    info!(
        "Setup completed: {} locations, {} packages",
        ctx.graph.len(),
        ctx.registry.len()
    );
    Ok(ctx)
}

pub fn load_locations(path: &Path) -> Result<Vec<LocationRecord>> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| RoutingError::Csv {
        path: source.clone(),
        source: e.into(),
    })?;
    read_locations(file, &source)
}

pub fn load_packages(path: &Path) -> Result<Vec<PackageRecord>> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| RoutingError::Csv {
        path: source.clone(),
        source: e.into(),
    })?;
    read_packages(file, &source)
}

/// Read a distance table: a header row, then one row per location with the
/// address first and distances after it.
pub fn read_locations<R: io::Read>(reader: R, source: &str) -> Result<Vec<LocationRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|source_err| RoutingError::Csv {
            path: source.to_string(),
            source: source_err,
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(location_record(row, &record)?);
    }

    debug!("Read {} location rows from {}", records.len(), source);
    Ok(records)
}

fn location_record(row: usize, record: &StringRecord) -> Result<LocationRecord> {
    let description = record.get(0).unwrap_or_default().to_string();
    let distances = record
        .iter()
        .skip(1)
        .enumerate()
        .map(|(column, cell)| {
            if cell.is_empty() {
                return Ok(None);
            }
            cell.parse::<f64>()
                .map(Some)
                .map_err(|_| RoutingError::InvalidDistance {
                    location: row,
                    column,
                    raw: cell.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LocationRecord {
        description,
        distances,
    })
}

pub fn read_packages<R: io::Read>(reader: R, source: &str) -> Result<Vec<PackageRecord>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<PackageRecord>, _>>()
        .map_err(|e| RoutingError::Csv {
            path: source.to_string(),
            source: e,
        })?;

    debug!("Read {} package rows from {}", records.len(), source);
    Ok(records)
}

/// Turn distance rows into locations, filling blank cells from the mirrored
/// cell so lower-triangular tables load as full matrices.
pub fn locations_from_records(records: Vec<LocationRecord>) -> Result<Vec<Location>> {
    let n = records.len();
    if n == 0 {
        return Err(RoutingError::NoLocations);
    }

    let cell = |i: usize, j: usize| records[i].distances.get(j).copied().flatten();

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        if records[i].distances.len() > n {
            return Err(RoutingError::MalformedMatrix {
                from: i,
                to: records[i].distances.len(),
                reason: "more distance cells than locations",
            });
        }
        for (j, value) in row.iter_mut().enumerate() {
            *value = match (cell(i, j), cell(j, i)) {
                (Some(d), _) | (None, Some(d)) => d,
                (None, None) if i == j => 0.0,
                (None, None) => {
                    return Err(RoutingError::MalformedMatrix {
                        from: i,
                        to: j,
                        reason: "distance missing in both directions",
                    })
                }
            };
        }
    }

    Ok(records
        .into_iter()
        .zip(matrix)
        .enumerate()
        .map(|(id, (record, distances))| Location {
            id,
            description: record.description,
            distances,
        })
        .collect())
}

pub fn packages_from_records(records: Vec<PackageRecord>) -> Result<Vec<Package>> {
    records
        .into_iter()
        .map(|r| {
            if r.id == 0 {
                return Err(RoutingError::InvalidPackageId {
                    raw: r.id.to_string(),
                });
            }
            let deadline = Deadline::parse(&r.deadline).ok_or_else(|| RoutingError::InvalidDeadline {
                package_id: r.id,
                raw: r.deadline.clone(),
            })?;
            let constraints = PackageConstraints::from_notes(&r.notes);
            Ok(Package {
                id: r.id,
                street: r.street,
                city: r.city,
                state: r.state,
                zip: r.zip,
                deadline,
                mass: r.mass,
                notes: r.notes,
                constraints,
                status: DeliveryStatus::AtHub,
            })
        })
        .collect()
}

pub fn build_context(
    locations: Vec<LocationRecord>,
    packages: Vec<PackageRecord>,
) -> Result<RoutingContext> {
    RoutingContext::new(
        locations_from_records(locations)?,
        packages_from_records(packages)?,
    )
}
