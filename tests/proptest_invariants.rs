//! Property tests: invariants that must hold for any seed and parameters.

use proptest::prelude::*;
use restock_engine::io::demand::DemandModel;
use restock_engine::model::supplier::FillModel;
use restock_engine::{ScenarioConfig, StrategyConfig, Warehouse};

fn arb_strategy() -> impl Strategy<Value = StrategyConfig> {
    prop_oneof![
        Just(StrategyConfig::Eoq),
        (0.0..2.0f64, 1.0..30.0f64).prop_map(|(safety_factor, coverage_days)| {
            StrategyConfig::Heuristic {
                safety_factor,
                coverage_days,
            }
        }),
        (
            proptest::option::of(0.0..20_000.0f64),
            proptest::option::of(0.0..3_000.0f64),
            0.0..20.0f64,
            proptest::option::of(0.0..500.0f64),
        )
            .prop_map(|(budget, additional_storage, safety_days, shortage_penalty)| {
                StrategyConfig::Lp {
                    budget,
                    additional_storage,
                    safety_days,
                    shortage_penalty,
                }
            }),
    ]
}

fn arb_fill() -> impl Strategy<Value = FillModel> {
    prop_oneof![
        Just(FillModel::Fixed),
        Just(FillModel::Bernoulli),
        (1.0..50.0f64).prop_map(|concentration| FillModel::Beta { concentration }),
    ]
}

fn arb_demand() -> impl Strategy<Value = DemandModel> {
    prop_oneof![
        Just(DemandModel::Poisson),
        (0.0..2.0f64).prop_map(|cv| DemandModel::Normal { cv }),
        (0.0..1.0f64).prop_map(|spread| DemandModel::Uniform { spread }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn stock_and_cost_invariants_hold(
        seed in any::<u64>(),
        strategy in arb_strategy(),
        fill in arb_fill(),
        demand in arb_demand(),
        reliability in 0.0..=1.0f64,
        horizon in 1u32..60,
    ) {
        let mut scenario = ScenarioConfig::demo().with_strategy(strategy);
        scenario.simulation.seed = seed;
        scenario.simulation.horizon_days = horizon;
        scenario.simulation.demand = demand;
        for supplier in scenario.suppliers.iter_mut() {
            supplier.reliability = reliability;
            supplier.fill = fill;
        }

        let mut warehouse = Warehouse::from_config(&scenario).unwrap();
        warehouse.run().unwrap();

        prop_assert_eq!(warehouse.history().len(), horizon as usize * scenario.items.len());
        for record in warehouse.history() {
            let capacity = scenario.items.iter().find(|i| i.id == record.item_id).unwrap().capacity;
            prop_assert!(record.stock >= 0.0 && record.stock <= capacity);
            prop_assert!(record.order_quantity >= 0.0);
            prop_assert!(record.daily_cost >= 0.0);
        }
        prop_assert!(warehouse.total_cost() >= 0.0);
        for (item, config) in warehouse.items().iter().zip(&scenario.items) {
            prop_assert!((item.costs.ordering - item.orders_placed as f64 * config.ordering_cost).abs() < 1e-6);
        }
    }

    #[test]
    fn lp_orders_stay_within_budget_and_storage(
        seed in any::<u64>(),
        budget in 0.0..3_000.0f64,
        additional_storage in 0.0..400.0f64,
        safety_days in 0.0..20.0f64,
        horizon in 1u32..40,
    ) {
        let mut scenario = ScenarioConfig::demo().with_strategy(StrategyConfig::Lp {
            budget: Some(budget),
            additional_storage: Some(additional_storage),
            safety_days,
            shortage_penalty: None,
        });
        scenario.simulation.seed = seed;
        scenario.simulation.horizon_days = horizon;

        let mut warehouse = Warehouse::from_config(&scenario).unwrap();
        warehouse.run().unwrap();

        for day in 0..horizon {
            let mut units = 0.0;
            let mut spend = 0.0;
            for record in warehouse.history().iter().filter(|r| r.day == day) {
                let unit_cost = scenario.items.iter().find(|i| i.id == record.item_id).unwrap().unit_cost;
                units += record.order_quantity;
                spend += record.order_quantity * unit_cost;
            }
            prop_assert!(units <= additional_storage + 1e-3, "day {}: {} units", day, units);
            prop_assert!(spend <= budget + 1e-3, "day {}: spend {}", day, spend);
        }
    }
}
