use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::config::constant::{ADDRESS_CORRECTION, DELAYED_ARRIVAL};
use crate::domain::{Package, PackageId, RoutingContext, TruckId};
use crate::error::{Result, RoutingError};

/// Disjoint partition of every registered package for one truck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenedPackages {
    pub ineligible: BTreeSet<PackageId>,
    pub mandatory: BTreeSet<PackageId>,
    pub deadline: BTreeSet<PackageId>,
    pub regular: BTreeSet<PackageId>,
}

impl ScreenedPackages {
    /// Mandatory co-delivery groups and deadline packages.
    pub fn priority_pool(&self) -> BTreeSet<PackageId> {
        self.mandatory.union(&self.deadline).copied().collect()
    }

    pub fn regular_pool(&self) -> &BTreeSet<PackageId> {
        &self.regular
    }
}

/// Whether `truck`, leaving at `at`, may not carry `package` at all.
fn is_ineligible(package: &Package, truck: TruckId, at: NaiveTime) -> bool {
    let c = &package.constraints;
    (c.wrong_address && at < ADDRESS_CORRECTION)
        || (c.delayed && at < DELAYED_ARRIVAL)
        || c.truck_only.is_some_and(|only| only != truck.0)
        || !package.status.is_at_hub()
}

/// Add the whole location group of `package` to `into`.
fn take_group(ctx: &RoutingContext, package: PackageId, into: &mut BTreeSet<PackageId>) -> Result<()> {
    let group = ctx
        .index
        .group_of(package)
        .ok_or(RoutingError::UnknownPackage { package_id: package })?;
    into.extend(group.iter().copied());
    Ok(())
}

/// Partition all packages into ineligible, mandatory-group, deadline and
/// regular sets for `truck` departing at `at`.
///
/// Each step claims whole location groups, so no location is ever split
/// between two sets.
pub fn screen_packages(ctx: &RoutingContext, truck: TruckId, at: NaiveTime) -> Result<ScreenedPackages> {
    let registry = &ctx.registry;
    let mut screened = ScreenedPackages::default();
    let mut remaining: BTreeSet<PackageId> = registry.ids().into_iter().collect();

    for &id in &remaining {
        let package = registry
            .get(id)
            .ok_or(RoutingError::UnknownPackage { package_id: id })?;
        if is_ineligible(package, truck, at) {
            take_group(ctx, id, &mut screened.ineligible)?;
        }
    }
    remaining.retain(|id| !screened.ineligible.contains(id));

    for component in co_delivery_components(ctx, &remaining)? {
        screened.mandatory.extend(component);
    }
    remaining.retain(|id| !screened.mandatory.contains(id));

    for &id in &remaining {
        let before_eod = registry
            .get(id)
            .is_some_and(|p| p.deadline.is_before_end_of_day());
        if before_eod {
            take_group(ctx, id, &mut screened.deadline)?;
        }
    }
    remaining.retain(|id| !screened.deadline.contains(id));

    screened.regular = remaining;

    debug!(
        "{} at {}: ineligible {:?}, mandatory {:?}, deadline {:?}, regular {:?}",
        truck, at, screened.ineligible, screened.mandatory, screened.deadline, screened.regular
    );
    Ok(screened)
}

/// Co-delivery groups among `remaining`.
///
/// A group starts from a package whose notes name other packages and grows
/// through named ids (in either direction) and shared locations until closed.
/// Only partners still in `remaining` are linked. A partner that already left
/// the hub can no longer ride along, and one held back for this truck keeps
/// its own location in the ineligible set without dragging the group with it.
fn co_delivery_components(
    ctx: &RoutingContext,
    remaining: &BTreeSet<PackageId>,
) -> Result<Vec<BTreeSet<PackageId>>> {
    let mut links: BTreeMap<PackageId, BTreeSet<PackageId>> = BTreeMap::new();
    for &id in remaining {
        let named = ctx
            .registry
            .get(id)
            .map(|p| p.constraints.deliver_with.clone())
            .unwrap_or_default();
        for other in named {
            if ctx.registry.get(other).is_none() {
                warn!("package {} names unknown co-delivery package {}", id, other);
                continue;
            }
            if !remaining.contains(&other) {
                debug!("package {} rides without partner {}, which is unavailable", id, other);
                continue;
            }
            links.entry(id).or_default().insert(other);
            links.entry(other).or_default().insert(id);
        }
    }

    let mut seen: BTreeSet<PackageId> = BTreeSet::new();
    let mut components = Vec::new();

    for &start in links.keys() {
        if seen.contains(&start) {
            continue;
        }

        let mut component = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !component.insert(id) {
                continue;
            }
            let group = ctx
                .index
                .group_of(id)
                .ok_or(RoutingError::UnknownPackage { package_id: id })?;
            let linked = links.get(&id).into_iter().flatten();
            for &next in group.iter().chain(linked) {
                if remaining.contains(&next) && !component.contains(&next) {
                    queue.push_back(next);
                }
            }
        }

        seen.extend(component.iter().copied());
        components.push(component);
    }

    Ok(components)
}
