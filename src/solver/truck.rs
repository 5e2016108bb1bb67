use chrono::NaiveTime;
use rand::Rng;
use tracing::{info, span, Level};

use crate::clock::{format_clock, parse_departure};
use crate::domain::{PlannedRoute, RoutingContext, TripReport, TruckId};
use crate::error::{Result, RoutingError};
use crate::solver::sampler::RouteSampler;
use crate::solver::screening::screen_packages;
use crate::solver::simulator::simulate_delivery;

/// One truck's state for a single run: departure clock, chosen route and
/// progress so far.
#[derive(Debug, Clone)]
pub struct Truck {
    pub id: TruckId,
    pub name: String,
    pub departure: NaiveTime,
    pub clock: NaiveTime,
    pub tour_distance: f64,
    route: Option<PlannedRoute>,
}

impl Truck {
    pub fn new(number: u8, departure: NaiveTime) -> Self {
        let id = TruckId(number);
        Self {
            id,
            name: id.to_string(),
            departure,
            clock: departure,
            tour_distance: 0.0,
            route: None,
        }
    }

    /// Truck leaving at an `HH:MM:SS` clock.
    pub fn with_departure(number: u8, departure: &str) -> Result<Self> {
        Ok(Self::new(number, parse_departure(departure)?))
    }

    pub fn route(&self) -> Option<&PlannedRoute> {
        self.route.as_ref()
    }

    /// Screen the shared packages for this truck and keep the best sampled
    /// route.
    pub fn create_route<R: Rng>(
        &mut self,
        ctx: &RoutingContext,
        sampler: &RouteSampler,
        rng: &mut R,
    ) -> Result<&PlannedRoute> {
        let span = span!(Level::INFO, "create_route", truck = %self.id);
        let _guard = span.enter();

        let screened = screen_packages(ctx, self.id, self.departure)?;
        let route = sampler.best_route(ctx, &screened, rng)?;
        info!(
            "{} planned {} packages over {:.1} miles",
            self.name,
            route.load.len(),
            route.tour.distance
        );
        Ok(self.route.insert(route))
    }

    /// Drive the planned route until `check_time` and record the result.
    pub fn deliver_packages(
        &mut self,
        ctx: &mut RoutingContext,
        check_time: NaiveTime,
    ) -> Result<TripReport> {
        let span = span!(Level::INFO, "deliver_packages", truck = %self.id);
        let _guard = span.enter();

        let route = self.route.as_ref().ok_or_else(|| RoutingError::NoRoute {
            truck: self.name.clone(),
        })?;
        let walk = simulate_delivery(ctx, route, self.departure, check_time)?;

        self.tour_distance = walk.distance;
        self.clock = walk.clock;
        info!(
            "{} stopped at {} after {:.1} miles ({:?})",
            self.name,
            format_clock(self.clock),
            self.tour_distance,
            walk.outcome
        );

        Ok(TripReport {
            truck: self.id,
            name: self.name.clone(),
            distance: walk.distance,
            visited: walk.visited,
            outcome: walk.outcome,
            clock: walk.clock,
        })
    }
}
