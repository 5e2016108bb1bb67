use std::fmt;

use chrono::NaiveTime;

use crate::clock::format_clock;

pub type LocationId = usize;
pub type PackageId = usize;

/// A delivery address with its distance to every other location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub description: String,
    pub distances: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Deadline {
    At(NaiveTime),
    EndOfDay,
}

impl Deadline {
    /// Parse a deadline cell such as `EOD`, `9:00 AM` or `10:30`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("eod") || trimmed.eq_ignore_ascii_case("end of day") {
            return Some(Deadline::EndOfDay);
        }

        let upper = trimmed.to_ascii_uppercase();
        ["%I:%M %p", "%I:%M%p", "%H:%M:%S", "%H:%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&upper, fmt).ok())
            .map(Deadline::At)
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Deadline::At(t) => Some(*t),
            Deadline::EndOfDay => None,
        }
    }

    pub fn is_before_end_of_day(&self) -> bool {
        matches!(self, Deadline::At(_))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::At(t) => write!(f, "{}", t.format("%H:%M")),
            Deadline::EndOfDay => write!(f, "EOD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    AtHub,
    InRoute,
    Delivered(NaiveTime),
}

impl DeliveryStatus {
    pub fn is_at_hub(&self) -> bool {
        matches!(self, DeliveryStatus::AtHub)
    }

    pub fn delivered_at(&self) -> Option<NaiveTime> {
        match self {
            DeliveryStatus::Delivered(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::AtHub => write!(f, "At hub"),
            DeliveryStatus::InRoute => write!(f, "In route to destination"),
            DeliveryStatus::Delivered(t) => write!(f, "Delivered at {}", format_clock(*t)),
        }
    }
}

/// Handling constraints read from a package's free-text notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageConstraints {
    /// Listed address is wrong until the correction time.
    pub wrong_address: bool,
    /// Not at the hub until the delayed arrival time.
    pub delayed: bool,
    /// Only this truck number may carry the package.
    pub truck_only: Option<u8>,
    /// Packages that must ride on the same truck.
    pub deliver_with: Vec<PackageId>,
}

impl PackageConstraints {
    pub fn from_notes(notes: &str) -> Self {
        let lower = notes.to_ascii_lowercase();

        let truck_only = lower.find("truck").and_then(|pos| {
            lower[pos + "truck".len()..]
                .trim_start()
                .split(|c: char| !c.is_ascii_digit())
                .next()
                .and_then(|digits| digits.parse().ok())
        });

        let deliver_with = lower
            .find("delivered with")
            .map(|pos| {
                lower[pos..]
                    .split(|c: char| !c.is_ascii_digit())
                    .filter_map(|tok| tok.parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            wrong_address: lower.contains("wrong address"),
            delayed: lower.contains("delayed"),
            truck_only,
            deliver_with,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: PackageId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub deadline: Deadline,
    pub mass: f64,
    pub notes: String,
    pub constraints: PackageConstraints,
    pub status: DeliveryStatus,
}

/// Fleet identity; restrictions in package notes refer to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TruckId(pub u8);

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Truck {}", self.0)
    }
}
