//! Property-based tests for the store, the sampler and the tour builder.
//!
//! # Invariants tested
//!
//! - **Store round trip:** inserted values are found, removed keys are gone.
//! - **Capacity:** no trial load exceeds the truck capacity.
//! - **Closed tours:** every tour starts and ends at the hub and visits each
//!   destination of its subgraph exactly once.
//! - **Whole locations:** a load never carries only part of a location's packages.

mod common;

use std::collections::BTreeMap;

use parcel_routing::clock::hm;
use parcel_routing::config::constant::TRUCK_CAPACITY;
use parcel_routing::domain::TruckId;
use parcel_routing::evaluation::fitness::{find_distance, is_closed_tour};
use parcel_routing::fixtures::data_generator::generate_random_inputs;
use parcel_routing::setup::init::build_context;
use parcel_routing::solver::sampler::RouteSampler;
use parcel_routing::solver::screening::screen_packages;
use parcel_routing::store::ChainingTable;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn store_round_trip(
        entries in prop::collection::vec((0_usize..500, any::<i64>()), 0..80),
        buckets in 1_usize..40,
    ) {
        let mut table = ChainingTable::new(buckets);
        let mut expected = BTreeMap::new();
        for &(k, v) in &entries {
            table.insert(k, v);
            expected.insert(k, v);
        }

        prop_assert_eq!(table.len(), expected.len());
        prop_assert_eq!(table.keys(), expected.keys().copied().collect::<Vec<_>>());
        for (k, v) in &expected {
            prop_assert_eq!(table.lookup(*k), Some(v));
        }

        for k in expected.keys() {
            prop_assert!(table.remove(*k));
            prop_assert_eq!(table.lookup(*k), None);
        }
        prop_assert!(table.is_empty());
    }

    #[test]
    fn trials_respect_capacity_and_form_closed_tours(
        data_seed in 0_u64..1_000,
        rng_seed in any::<u64>(),
        package_count in 1_usize..60,
    ) {
        let (locations, packages) = generate_random_inputs(27, package_count, data_seed);
        let ctx = build_context(locations, packages).unwrap();
        let screened = screen_packages(&ctx, TruckId(3), hm(9, 5)).unwrap();

        let sampler = RouteSampler::new(TRUCK_CAPACITY, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        let trials = sampler.sample_trials(&ctx, &screened, &mut rng).unwrap();

        for trial in &trials {
            prop_assert!(trial.load.len() <= TRUCK_CAPACITY);
            prop_assert!(trial.load.is_disjoint(&screened.ineligible));
            prop_assert!(is_closed_tour(&trial.tour.stops, &trial.destinations));

            let walked = find_distance(&trial.tour.stops, &trial.destinations).unwrap();
            prop_assert!((walked - trial.tour.distance).abs() < 1e-9);

            for (_, group) in ctx.index.groups() {
                prop_assert!(group.is_subset(&trial.load) || group.is_disjoint(&trial.load));
            }
        }
    }
}
