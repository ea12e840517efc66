// src/simulation/config.rs

use crate::error::RestockError;
use crate::io::demand::DemandModel;
use crate::model::supplier::FillModel;
use crate::strategy::implementations::{EoqStrategy, HeuristicStrategy, LpStrategy};
use crate::strategy::traits::RestockStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// What the warehouse does with an order its supplier refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidOrderPolicy {
    /// Clamp the quantity into `[min_order, max_order]` and resubmit.
    #[default]
    Clamp,
    /// Drop the order for the day.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub horizon_days: u32,
    pub seed: u64,
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
    #[serde(default)]
    pub demand: DemandModel,
    #[serde(default)]
    pub invalid_orders: InvalidOrderPolicy,
}

fn default_days_per_year() -> f64 {
    365.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            seed: 42,
            days_per_year: default_days_per_year(),
            demand: DemandModel::default(),
            invalid_orders: InvalidOrderPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplierConfig {
    pub id: String,
    pub lead_time_days: u32,
    pub reliability: f64,
    pub min_order: f64,
    pub max_order: f64,
    #[serde(default)]
    pub fill: FillModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemConfig {
    pub id: String,
    pub name: String,
    pub initial_stock: f64,
    pub annual_demand: f64,
    pub unit_cost: f64,
    pub ordering_cost: f64,
    /// Annual holding cost per unit.
    pub holding_cost: f64,
    pub capacity: f64,
    pub supplier: String,
}

/// Strategy selection with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Eoq,
    Heuristic {
        safety_factor: f64,
        coverage_days: f64,
    },
    Lp {
        #[serde(default)]
        budget: Option<f64>,
        #[serde(default)]
        additional_storage: Option<f64>,
        safety_days: f64,
        #[serde(default)]
        shortage_penalty: Option<f64>,
    },
}

impl StrategyConfig {
    pub fn build(&self) -> Box<dyn RestockStrategy> {
        match *self {
            StrategyConfig::Eoq => Box::new(EoqStrategy::new()),
            StrategyConfig::Heuristic {
                safety_factor,
                coverage_days,
            } => Box::new(HeuristicStrategy::new(safety_factor, coverage_days)),
            StrategyConfig::Lp {
                budget,
                additional_storage,
                safety_days,
                shortage_penalty,
            } => {
                let lp = LpStrategy::new(budget, additional_storage, safety_days);
                match shortage_penalty {
                    Some(penalty) => Box::new(lp.with_shortage_penalty(penalty)),
                    None => Box::new(lp),
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::Eoq => "eoq",
            StrategyConfig::Heuristic { .. } => "heuristic",
            StrategyConfig::Lp { .. } => "lp",
        }
    }

    /// The three strategies with the parameters used in the demo comparison.
    pub fn defaults() -> Vec<StrategyConfig> {
        vec![
            StrategyConfig::Eoq,
            StrategyConfig::Lp {
                budget: None,
                additional_storage: None,
                safety_days: 7.0,
                shortage_penalty: Some(150.0),
            },
            StrategyConfig::Heuristic {
                safety_factor: 0.3,
                coverage_days: 14.0,
            },
        ]
    }
}

/// Full description of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub suppliers: Vec<SupplierConfig>,
    pub items: Vec<ItemConfig>,
    pub strategy: StrategyConfig,
}

impl ScenarioConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, RestockError> {
        let config: ScenarioConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RestockError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Four FMCG lines served by a fast and a slow supplier.
    pub fn demo() -> Self {
        let supplier = |id: &str, lead_time_days, reliability, min_order, max_order| SupplierConfig {
            id: id.to_string(),
            lead_time_days,
            reliability,
            min_order,
            max_order,
            fill: FillModel::Fixed,
        };
        let item = |id: &str,
                    name: &str,
                    initial_stock,
                    annual_demand,
                    unit_cost,
                    holding_cost,
                    ordering_cost,
                    capacity,
                    supplier: &str| ItemConfig {
            id: id.to_string(),
            name: name.to_string(),
            initial_stock,
            annual_demand,
            unit_cost,
            ordering_cost,
            holding_cost,
            capacity,
            supplier: supplier.to_string(),
        };

        Self {
            simulation: SimulationConfig::default(),
            suppliers: vec![
                supplier("FastSup", 2, 0.98, 10.0, 500.0),
                supplier("SlowSup", 5, 0.9, 20.0, 300.0),
            ],
            items: vec![
                item("S1", "Soap", 150.0, 1200.0, 10.0, 1.5, 20.0, 1000.0, "FastSup"),
                item("S2", "Shampoo", 120.0, 1500.0, 25.0, 3.0, 40.0, 800.0, "FastSup"),
                item("B1", "Biscuits", 200.0, 2000.0, 5.0, 0.8, 15.0, 1500.0, "SlowSup"),
                item("T1", "Toothpaste", 100.0, 1000.0, 12.0, 1.8, 30.0, 700.0, "FastSup"),
            ],
            strategy: StrategyConfig::Eoq,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    /// Checks every static parameter. Runs before the first simulated day.
    pub fn validate(&self) -> Result<(), RestockError> {
        let sim = &self.simulation;
        if sim.horizon_days == 0 {
            return Err(RestockError::invalid_parameter(
                "simulation.horizon_days",
                "must be at least one day",
            ));
        }
        if !(sim.days_per_year > 0.0) || !sim.days_per_year.is_finite() {
            return Err(RestockError::invalid_parameter(
                "simulation.days_per_year",
                format!("must be > 0, got {}", sim.days_per_year),
            ));
        }
        sim.demand
            .validate()
            .map_err(|reason| RestockError::invalid_parameter("simulation.demand", reason))?;

        let mut supplier_ids = HashSet::new();
        for s in &self.suppliers {
            if !supplier_ids.insert(s.id.as_str()) {
                return Err(RestockError::DuplicateId(s.id.clone()));
            }
            let field = |name: &str| format!("suppliers.{}.{}", s.id, name);
            if !(0.0..=1.0).contains(&s.reliability) {
                return Err(RestockError::invalid_parameter(
                    field("reliability"),
                    format!("must be within [0, 1], got {}", s.reliability),
                ));
            }
            if !(s.min_order >= 0.0) || !s.min_order.is_finite() {
                return Err(RestockError::invalid_parameter(
                    field("min_order"),
                    format!("must be finite and >= 0, got {}", s.min_order),
                ));
            }
            if !(s.max_order > 0.0) || !s.max_order.is_finite() || s.max_order < s.min_order {
                return Err(RestockError::invalid_parameter(
                    field("max_order"),
                    format!("must be finite, > 0 and >= min_order, got {}", s.max_order),
                ));
            }
            if let FillModel::Beta { concentration } = s.fill {
                if !(concentration > 0.0) {
                    return Err(RestockError::invalid_parameter(
                        field("fill.concentration"),
                        format!("must be > 0, got {}", concentration),
                    ));
                }
            }
        }

        let mut item_ids = HashSet::new();
        for i in &self.items {
            if !item_ids.insert(i.id.as_str()) {
                return Err(RestockError::DuplicateId(i.id.clone()));
            }
            if !supplier_ids.contains(i.supplier.as_str()) {
                return Err(RestockError::UnknownSupplier(i.supplier.clone()));
            }
            let field = |name: &str| format!("items.{}.{}", i.id, name);
            if !(i.annual_demand > 0.0) || !i.annual_demand.is_finite() {
                return Err(RestockError::invalid_parameter(
                    field("annual_demand"),
                    format!("must be finite and > 0, got {}", i.annual_demand),
                ));
            }
            for (name, value) in [
                ("unit_cost", i.unit_cost),
                ("ordering_cost", i.ordering_cost),
                ("holding_cost", i.holding_cost),
            ] {
                if !(value >= 0.0) || !value.is_finite() {
                    return Err(RestockError::invalid_parameter(
                        field(name),
                        format!("must be finite and >= 0, got {}", value),
                    ));
                }
            }
            if !(i.capacity > 0.0) || !i.capacity.is_finite() {
                return Err(RestockError::invalid_parameter(
                    field("capacity"),
                    format!("must be finite and > 0, got {}", i.capacity),
                ));
            }
            if !(i.initial_stock >= 0.0) || i.initial_stock > i.capacity {
                return Err(RestockError::invalid_parameter(
                    field("initial_stock"),
                    format!("must be within [0, capacity], got {}", i.initial_stock),
                ));
            }
        }
        Ok(())
    }
}
