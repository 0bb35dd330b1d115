//! Algebraic laws of the price calculation

use garage::pricing::{GarageConfiguration, PriceCatalog, base_price, calculate};
use proptest::prelude::*;
use proptest::test_runner::Config;
use std::collections::BTreeSet;

const KNOWN_EXTRAS: [&str; 8] = [
    "door",
    "window",
    "gutters",
    "ventilation",
    "insulation",
    "electricity",
    "reinforcement",
    "security",
];

fn dimension(min: u32, max: u32) -> impl Strategy<Value = u32> {
    (0..=(max - min) / 10).prop_map(move |steps| min + steps * 10)
}

fn configuration() -> impl Strategy<Value = GarageConfiguration> {
    (
        dimension(250, 800),
        dimension(400, 1200),
        dimension(200, 350),
        prop::sample::select(vec!["standard", "elevated", "flat", "asymmetric", "pent"]),
        prop::sample::select(vec!["rollup", "sectional", "swing", "double"]),
        prop::sample::select(vec!["concrete", "point", "screw", "none"]),
        prop::sample::subsequence(KNOWN_EXTRAS.to_vec(), 0..=KNOWN_EXTRAS.len()),
    )
        .prop_map(|(width, length, height, roof, gate, foundation, extras)| {
            GarageConfiguration {
                width,
                length,
                height,
                roof_type: roof.to_string(),
                gate_type: gate.to_string(),
                foundation: foundation.to_string(),
                extras: extras.into_iter().map(str::to_string).collect(),
                ..GarageConfiguration::default()
            }
        })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn total_is_base_plus_surcharges(config in configuration()) {
        let catalog = PriceCatalog::standard();
        let breakdown = calculate(&config, &catalog);
        prop_assert!(breakdown.total >= breakdown.base);
        let items = breakdown.roof
            + breakdown.gate
            + breakdown.gate_position
            + breakdown.wall_thickness
            + breakdown.foundation
            + breakdown.extras;
        prop_assert!((breakdown.surcharges() - items).abs() < 1e-6);
        prop_assert_eq!(breakdown.base, base_price(&config, &catalog));
    }

    #[test]
    fn extras_order_and_duplicates_do_not_matter(
        config in configuration(),
        picks in prop::collection::vec(prop::sample::select(KNOWN_EXTRAS.to_vec()), 0..16),
    ) {
        let catalog = PriceCatalog::standard();

        let mut forward = config.clone();
        forward.extras = picks.iter().map(|s| s.to_string()).collect();

        let mut backward = config;
        backward.extras = picks.iter().rev().chain(picks.iter()).map(|s| s.to_string()).collect();

        prop_assert_eq!(calculate(&forward, &catalog), calculate(&backward, &catalog));
    }

    #[test]
    fn unknown_options_add_nothing(
        config in configuration(),
        unknown in "[a-z]{3,10}_custom",
    ) {
        let catalog = PriceCatalog::standard();
        let before = calculate(&config, &catalog).total;

        let mut with_unknown = config.clone();
        with_unknown.extras.insert(unknown.clone());
        prop_assert_eq!(calculate(&with_unknown, &catalog).total, before);

        let mut unknown_roof = config.clone();
        unknown_roof.roof_type = unknown;
        let roof_free = GarageConfiguration { roof_type: "standard".to_string(), ..config };
        prop_assert_eq!(
            calculate(&unknown_roof, &catalog).total,
            calculate(&roof_free, &catalog).total
        );
    }

    #[test]
    fn larger_footprint_never_costs_less(config in configuration()) {
        prop_assume!(config.width <= 790);
        let catalog = PriceCatalog::standard();
        let wider = GarageConfiguration { width: config.width + 10, ..config.clone() };
        prop_assert!(calculate(&wider, &catalog).total > calculate(&config, &catalog).total);
    }
}

#[test]
fn extras_collapse_into_a_set() {
    let extras: BTreeSet<String> = ["door", "door", "window"]
        .into_iter()
        .map(str::to_string)
        .collect();
    let config = GarageConfiguration {
        extras,
        ..GarageConfiguration::default()
    };
    assert_eq!(calculate(&config, &PriceCatalog::standard()).extras, 498.0);
}
