// src/simulation/engine.rs

use crate::error::RestockError;
use crate::io::demand::DemandModel;
use crate::model::item::InventoryItem;
use crate::model::supplier::SupplierAgent;
use crate::simulation::config::{InvalidOrderPolicy, ScenarioConfig};
use crate::strategy::traits::{ItemSnapshot, OrderPlan, RestockStrategy, WarehouseSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One item's outcome for one simulated day.
///
/// Serialize so the history can be written straight to CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub day: u32,
    pub item_id: String,
    pub delivered: f64,
    pub demand: f64,
    pub sold: f64,
    pub lost_sales: f64,
    pub order_quantity: f64,
    pub stock: f64,
    pub daily_cost: f64,
    pub cumulative_cost: f64,
    pub warning: Option<String>,
}

/// End-of-run figures for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item_id: String,
    pub name: String,
    pub final_stock: f64,
    pub total_cost: f64,
    pub purchase_cost: f64,
    pub ordering_cost: f64,
    pub holding_cost: f64,
    pub total_orders: u32,
    pub units_ordered: f64,
    pub units_received: f64,
    pub units_discarded: f64,
    pub average_stock: f64,
    pub stockout_days: u32,
    pub lost_sales: f64,
    pub service_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Uninitialized,
    Running,
    Completed,
}

/// Simulation settings the warehouse needs at every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSettings {
    pub horizon_days: u32,
    pub days_per_year: f64,
    pub demand: DemandModel,
    pub invalid_orders: InvalidOrderPolicy,
}

/// Per-item scratch state for the day being simulated.
#[derive(Debug, Clone, Default)]
struct DayLedger {
    delivered: f64,
    demand: f64,
    sold: f64,
    lost: f64,
    ordered: f64,
    cost: f64,
    warnings: Vec<String>,
}

pub struct Warehouse {
    settings: TickSettings,

    // The Actors
    items: Vec<InventoryItem>,
    /// Supplier registry keyed by id; items refer to suppliers by id.
    suppliers: BTreeMap<String, SupplierAgent>,

    // The Brain
    strategy: Box<dyn RestockStrategy>,
    rng: StdRng,

    current_day: u32,
    phase: SimulationPhase,
    history: Vec<DayRecord>,
}

impl Warehouse {
    /// Builds a warehouse and validates it. Nothing is simulated yet.
    pub fn new(
        settings: TickSettings,
        items: Vec<InventoryItem>,
        suppliers: Vec<SupplierAgent>,
        strategy: Box<dyn RestockStrategy>,
        seed: u64,
    ) -> Result<Self, RestockError> {
        let mut registry = BTreeMap::new();
        for supplier in suppliers {
            let name = supplier.name.clone();
            if registry.insert(name.clone(), supplier).is_some() {
                return Err(RestockError::DuplicateId(name));
            }
        }
        for item in &items {
            if !registry.contains_key(&item.supplier) {
                return Err(RestockError::UnknownSupplier(item.supplier.clone()));
            }
        }
        if settings.horizon_days == 0 {
            return Err(RestockError::invalid_parameter(
                "simulation.horizon_days",
                "must be at least one day",
            ));
        }
        if !(settings.days_per_year > 0.0) || !settings.days_per_year.is_finite() {
            return Err(RestockError::invalid_parameter(
                "simulation.days_per_year",
                format!("must be > 0, got {}", settings.days_per_year),
            ));
        }

        let warehouse = Self {
            settings,
            items,
            suppliers: registry,
            strategy,
            rng: StdRng::seed_from_u64(seed),
            current_day: 0,
            phase: SimulationPhase::Uninitialized,
            history: Vec::new(),
        };
        warehouse.strategy.validate(&warehouse.snapshot())?;
        Ok(warehouse)
    }

    pub fn from_config(config: &ScenarioConfig) -> Result<Self, RestockError> {
        config.validate()?;

        let suppliers = config
            .suppliers
            .iter()
            .map(|s| {
                SupplierAgent::new(&s.id, s.lead_time_days, s.reliability, s.min_order, s.max_order)
                    .with_fill_model(s.fill)
            })
            .collect();
        let items = config
            .items
            .iter()
            .map(|i| {
                InventoryItem::new(
                    &i.id,
                    &i.name,
                    &i.supplier,
                    i.initial_stock,
                    i.annual_demand,
                    i.unit_cost,
                    i.ordering_cost,
                    i.holding_cost,
                    i.capacity,
                )
            })
            .collect();
        let settings = TickSettings {
            horizon_days: config.simulation.horizon_days,
            days_per_year: config.simulation.days_per_year,
            demand: config.simulation.demand,
            invalid_orders: config.simulation.invalid_orders,
        };

        Self::new(
            settings,
            items,
            suppliers,
            config.strategy.build(),
            config.simulation.seed,
        )
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Next day to simulate; equals the horizon once completed.
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn suppliers(&self) -> &BTreeMap<String, SupplierAgent> {
        &self.suppliers
    }

    /// Every published day record, in day then item order.
    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }

    /// Runs every remaining day up to the horizon.
    pub fn run(&mut self) -> Result<&[DayRecord], RestockError> {
        if self.phase == SimulationPhase::Uninitialized {
            info!(
                strategy = self.strategy.name(),
                items = self.items.len(),
                horizon = self.settings.horizon_days,
                "simulation started"
            );
        }
        while self.phase != SimulationPhase::Completed {
            self.step()?;
        }
        Ok(&self.history)
    }

    /// Advances the simulation by exactly one day.
    ///
    /// Order of work: receive deliveries, apply demand, plan, place orders,
    /// receive zero-lead-time orders, record. Records for the day are
    /// published only once the whole tick has finished.
    pub fn step(&mut self) -> Result<(), RestockError> {
        if self.phase == SimulationPhase::Completed {
            return Ok(());
        }
        self.phase = SimulationPhase::Running;
        let day = self.current_day;
        let days_per_year = self.settings.days_per_year;
        let mut ledgers = vec![DayLedger::default(); self.items.len()];

        // =================================================================
        // PHASE 1: RECEIVING DELIVERIES
        // =================================================================
        self.receive_deliveries(day, &mut ledgers);

        // =================================================================
        // PHASE 2: APPLYING DEMAND
        // =================================================================
        for (item, ledger) in self.items.iter_mut().zip(ledgers.iter_mut()) {
            let mean = item.daily_demand_mean(days_per_year);
            let demand = self.settings.demand.sample(mean, &mut self.rng);
            let outcome = item.apply_demand(demand);
            ledger.demand = demand;
            ledger.sold = outcome.sold;
            ledger.lost = outcome.lost;
        }

        // =================================================================
        // PHASE 3: PLANNING
        // Every item is read from one snapshot before any order is placed.
        // =================================================================
        let snapshot = self.snapshot();
        let plan = match self.strategy.plan(&snapshot) {
            Ok(plan) => plan,
            Err(RestockError::Infeasible { reason, .. }) => {
                warn!(day, strategy = self.strategy.name(), %reason, "infeasible plan, ordering nothing");
                for ledger in ledgers.iter_mut() {
                    ledger.warnings.push(format!("infeasible: {}", reason));
                }
                OrderPlan::zeros(self.items.len())
            }
            Err(e) => return Err(e),
        };
        if let Some(note) = plan.warning() {
            warn!(day, strategy = self.strategy.name(), note, "degraded plan");
            for ledger in ledgers.iter_mut() {
                ledger.warnings.push(note.to_string());
            }
        }

        // =================================================================
        // PHASE 4: PLACING ORDERS
        // =================================================================
        for (index, ledger) in ledgers.iter_mut().enumerate() {
            let requested = plan.get(index).round();
            if requested <= 0.0 {
                continue;
            }
            if let Some(placed) = self.place_order(index, requested, day, ledger)? {
                ledger.ordered = placed;
                ledger.cost += self.items[index].record_order(placed);
            }
        }

        // Orders with a zero lead time resolve on the day they are placed.
        self.receive_deliveries(day, &mut ledgers);

        // =================================================================
        // PHASE 5: RECORDING
        // =================================================================
        let mut records = Vec::with_capacity(self.items.len());
        for (item, ledger) in self.items.iter_mut().zip(ledgers) {
            let cost = ledger.cost + item.close_day(days_per_year);
            records.push(DayRecord {
                day,
                item_id: item.id.clone(),
                delivered: ledger.delivered,
                demand: ledger.demand,
                sold: ledger.sold,
                lost_sales: ledger.lost,
                order_quantity: ledger.ordered,
                stock: item.stock,
                daily_cost: cost,
                cumulative_cost: item.total_cost(),
                warning: if ledger.warnings.is_empty() {
                    None
                } else {
                    Some(ledger.warnings.join("; "))
                },
            });
        }
        self.history.extend(records);

        if (day + 1) % 30 == 0 {
            info!(
                day,
                total_cost = self.total_cost(),
                lost_sales = self.items.iter().map(|i| i.lost_sales).sum::<f64>(),
                "progress"
            );
        }

        self.current_day += 1;
        if self.current_day >= self.settings.horizon_days {
            self.phase = SimulationPhase::Completed;
            info!(
                strategy = self.strategy.name(),
                days = self.current_day,
                total_cost = self.total_cost(),
                service_level = self.service_level(),
                "simulation completed"
            );
        }
        Ok(())
    }

    /// Resolves every order due on `day` into the items' stock.
    fn receive_deliveries(&mut self, day: u32, ledgers: &mut [DayLedger]) {
        for supplier in self.suppliers.values_mut() {
            for delivery in supplier.deliver(day, &mut self.rng) {
                let item = &mut self.items[delivery.item];
                let receipt = item.receive_delivery(delivery.delivered);
                let ledger = &mut ledgers[delivery.item];
                ledger.delivered += delivery.delivered;
                ledger.cost += item.charge_purchase(delivery.delivered);

                if delivery.delivered < delivery.ordered {
                    ledger.warnings.push(format!(
                        "partial delivery {} of {}",
                        delivery.delivered, delivery.ordered
                    ));
                }
                if receipt.discarded > 0.0 {
                    warn!(day, item = %item.id, discarded = receipt.discarded, "delivery exceeds capacity");
                    ledger
                        .warnings
                        .push(format!("discarded {} units over capacity", receipt.discarded));
                }
            }
        }
    }

    /// Submits an order, applying the invalid-order policy if the supplier
    /// refuses it. Returns the quantity actually placed.
    fn place_order(
        &mut self,
        index: usize,
        quantity: f64,
        day: u32,
        ledger: &mut DayLedger,
    ) -> Result<Option<f64>, RestockError> {
        let item_id = self.items[index].id.clone();
        let supplier_id = &self.items[index].supplier;
        let supplier = self
            .suppliers
            .get_mut(supplier_id)
            .ok_or_else(|| RestockError::UnknownSupplier(supplier_id.clone()))?;

        match supplier.accept_order(index, quantity, day) {
            Ok(arrival_day) => {
                debug!(day, item = %item_id, quantity, arrival_day, "order placed");
                Ok(Some(quantity))
            }
            Err(err @ RestockError::InvalidOrder { .. }) => match self.settings.invalid_orders {
                InvalidOrderPolicy::Reject => {
                    warn!(day, item = %item_id, %err, "order rejected");
                    ledger.warnings.push(err.to_string());
                    Ok(None)
                }
                InvalidOrderPolicy::Clamp => {
                    let bounded = quantity.max(supplier.min_order).min(supplier.max_order);
                    let clamped = if bounded.ceil() <= supplier.max_order {
                        bounded.ceil()
                    } else {
                        bounded.floor()
                    };
                    match supplier.accept_order(index, clamped, day) {
                        Ok(arrival_day) => {
                            warn!(day, item = %item_id, requested = quantity, placed = clamped, "order clamped");
                            debug!(day, item = %item_id, quantity = clamped, arrival_day, "order placed");
                            ledger.warnings.push(format!("{}; clamped to {}", err, clamped));
                            Ok(Some(clamped))
                        }
                        Err(RestockError::InvalidOrder { .. }) => {
                            warn!(day, item = %item_id, %err, "order rejected after clamping");
                            ledger.warnings.push(err.to_string());
                            Ok(None)
                        }
                        Err(other) => Err(other),
                    }
                }
            },
            Err(other) => Err(other),
        }
    }

    /// Consistent view of every item, taken between demand and planning.
    pub fn snapshot(&self) -> WarehouseSnapshot {
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let supplier = self.suppliers.get(&item.supplier);
                ItemSnapshot {
                    id: item.id.clone(),
                    stock: item.stock,
                    in_transit: supplier.map_or(0.0, |s| s.in_transit_for(index)),
                    annual_demand: item.annual_demand,
                    daily_demand_mean: item.daily_demand_mean(self.settings.days_per_year),
                    unit_cost: item.unit_cost,
                    ordering_cost: item.ordering_cost,
                    holding_cost: item.holding_cost,
                    capacity: item.capacity,
                    lead_time_days: supplier.map_or(0, |s| s.lead_time_days),
                    min_order: supplier.map_or(0.0, |s| s.min_order),
                    max_order: supplier.map_or(f64::INFINITY, |s| s.max_order),
                }
            })
            .collect();
        WarehouseSnapshot {
            day: self.current_day,
            items,
        }
    }

    /// History for one item, in day order.
    pub fn item_history<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a DayRecord> + 'a {
        self.history.iter().filter(move |r| r.item_id == item_id)
    }

    pub fn summary(&self) -> Vec<ItemSummary> {
        self.items
            .iter()
            .map(|item| ItemSummary {
                item_id: item.id.clone(),
                name: item.name.clone(),
                final_stock: item.stock,
                total_cost: item.total_cost(),
                purchase_cost: item.costs.purchase,
                ordering_cost: item.costs.ordering,
                holding_cost: item.costs.holding,
                total_orders: item.orders_placed,
                units_ordered: item.units_ordered,
                units_received: item.units_received,
                units_discarded: item.units_discarded,
                average_stock: item.average_stock(),
                stockout_days: item.stockout_days,
                lost_sales: item.lost_sales,
                service_level: item.service_level(),
            })
            .collect()
    }

    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|item| item.total_cost()).sum()
    }

    /// Warehouse-wide service level: 1 - total lost / total demand.
    pub fn service_level(&self) -> f64 {
        let lost: f64 = self.items.iter().map(|i| i.lost_sales).sum();
        let demand: f64 = self.items.iter().map(|i| i.demand_total).sum();
        if demand <= 0.0 {
            1.0
        } else {
            1.0 - lost / demand
        }
    }
}
