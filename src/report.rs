//! Console and CSV output for a finished run.

use std::path::Path;

use chrono::NaiveTime;
use colored::*;
use csv::Writer;
use itertools::Itertools;
use tracing::info;

use crate::config::constant::SPEED;
use crate::domain::{FleetReport, PackageStatusRow, TripReport};
use crate::error::{Result, RoutingError};

/// Route line for one truck, e.g. `Truck 1 - Location IDs: [0, 4, 0] 12 miles. 40 minutes.`
pub fn trip_line(trip: &TripReport) -> String {
    let stops = format!("[{}]", trip.visited.iter().join(", "));
    let minutes = trip.distance / SPEED * 60.0;
    format!(
        "{} - Location IDs: {:<60}{:.0} miles.\t{:.0} minutes.",
        trip.name, stops, trip.distance, minutes
    )
}

pub fn print_trip(trip: &TripReport) {
    let line = trip_line(trip);
    if trip.still_underway() {
        println!("{}", line.yellow());
        println!("{}", "Delivery still underway...".yellow());
    } else if trip.is_complete() {
        println!("{}", line.green());
    } else {
        println!("{}", line);
    }
}

pub fn status_line(row: &PackageStatusRow) -> String {
    let street: String = row.street.chars().take(30).collect();
    format!(
        "{:<4}{:<30}{:<18}{:<8}{:<5}{:<11}{}",
        row.id, street, row.city, row.zip, row.mass, row.deadline, row.status
    )
}

pub fn print_status_table(rows: &[PackageStatusRow], check_time: NaiveTime) {
    println!("Package status as of {} ...\n", check_time.format("%H:%M:%S"));
    println!(
        "{}",
        format!(
            "{:<4}{:<30}{:<18}{:<8}{:<5}{:<11}{}",
            "ID", "Street", "City", "Zip", "Kgs", "Deadline", "Delivery Status"
        )
        .bold()
    );
    for row in rows {
        let line = status_line(row);
        if row.status.starts_with("Delivered") {
            println!("{}", line);
        } else {
            println!("{}", line.red());
        }
    }
}

/// Everything the binary prints after dispatch.
pub fn print_report(report: &FleetReport, rows: &[PackageStatusRow], check_time: NaiveTime) {
    for trip in &report.trips {
        print_trip(trip);
    }
    println!("\n{:.1} total miles.\n", report.total_distance());
    print_status_table(rows, check_time);
}

pub fn write_status_csv(rows: &[PackageStatusRow], path: &Path) -> Result<()> {
    let export_err = |source: csv::Error| RoutingError::Export {
        path: path.display().to_string(),
        source,
    };

    let mut wtr = Writer::from_path(path).map_err(export_err)?;
    for row in rows {
        wtr.serialize(row).map_err(export_err)?;
    }
    wtr.flush().map_err(|e| export_err(e.into()))?;

    info!("Wrote {} status rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::hm;
    use crate::domain::{TripOutcome, TruckId};
    use rstest::rstest;

    fn trip(outcome: TripOutcome) -> TripReport {
        TripReport {
            truck: TruckId(1),
            name: "Truck 1".to_string(),
            distance: 36.0,
            visited: vec![0, 3, 1, 0],
            outcome,
            clock: hm(10, 0),
        }
    }

    fn row(id: usize, status: &str) -> PackageStatusRow {
        PackageStatusRow {
            id,
            street: "195 W Oakland Ave".to_string(),
            city: "Salt Lake City".to_string(),
            zip: "84115".to_string(),
            mass: 21.0,
            deadline: "10:30".to_string(),
            status: status.to_string(),
        }
    }

    #[rstest]
    fn trip_line_reports_miles_and_minutes() {
        let line = trip_line(&trip(TripOutcome::Complete));
        assert!(line.starts_with("Truck 1 - Location IDs: [0, 3, 1, 0]"));
        assert!(line.contains("36 miles."));
        assert!(line.ends_with("120 minutes."));
    }

    #[rstest]
    fn status_line_truncates_long_streets() {
        let mut r = row(7, "At hub");
        r.street = "x".repeat(45);
        let line = status_line(&r);
        assert!(!line.contains(&"x".repeat(31)));
        assert!(line.ends_with("At hub"));
    }

    #[rstest]
    fn status_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.csv");
        write_status_csv(&[row(1, "Delivered at 08:30:00"), row(2, "At hub")], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Street,City,Zip,Kgs,Deadline,Delivery Status")
        );
        assert_eq!(
            lines.next(),
            Some("1,195 W Oakland Ave,Salt Lake City,84115,21.0,10:30,Delivered at 08:30:00")
        );
        assert_eq!(lines.count(), 1);
    }
}
