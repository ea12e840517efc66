// src/strategy/traits.rs

use crate::error::RestockError;
use std::fmt::Debug;

/// Read-only view of one item as a strategy sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub id: String,
    pub stock: f64,
    /// Ordered but not yet delivered.
    pub in_transit: f64,
    pub annual_demand: f64,
    pub daily_demand_mean: f64,
    pub unit_cost: f64,
    pub ordering_cost: f64,
    pub holding_cost: f64,
    pub capacity: f64,
    pub lead_time_days: u32,
    pub min_order: f64,
    pub max_order: f64,
}

impl ItemSnapshot {
    /// On hand plus in transit.
    pub fn inventory_position(&self) -> f64 {
        self.stock + self.in_transit
    }

    /// Room left under capacity once everything in transit has landed.
    pub fn headroom(&self) -> f64 {
        (self.capacity - self.inventory_position()).max(0.0)
    }
}

/// Consistent view of the whole warehouse taken after demand is applied.
///
/// Joint strategies read every item from the same snapshot, so no decision
/// is applied before the whole plan is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseSnapshot {
    pub day: u32,
    pub items: Vec<ItemSnapshot>,
}

/// Order quantities, one per item in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    quantities: Vec<f64>,
    warning: Option<String>,
}

impl OrderPlan {
    pub fn zeros(len: usize) -> Self {
        Self {
            quantities: vec![0.0; len],
            warning: None,
        }
    }

    /// Builds a plan, clamping negative or non-finite entries to zero.
    pub fn from_quantities(quantities: Vec<f64>) -> Self {
        Self {
            quantities: quantities
                .into_iter()
                .map(|q| if q.is_finite() && q > 0.0 { q } else { 0.0 })
                .collect(),
            warning: None,
        }
    }

    /// Marks the plan as a degraded answer; the warehouse records the note.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.quantities.get(index).copied().unwrap_or(0.0)
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// True if nothing is to be ordered.
    pub fn is_idle(&self) -> bool {
        self.quantities.iter().all(|q| *q <= 0.0)
    }
}

/// Defines the reorder logic for the warehouse.
///
/// A strategy only returns a decision; the warehouse applies it.
pub trait RestockStrategy: Debug + Send + Sync {
    /// Short label used in logs and report file names.
    fn name(&self) -> &'static str;

    /// Checks static parameters before the first simulated day.
    fn validate(&self, _snapshot: &WarehouseSnapshot) -> Result<(), RestockError> {
        Ok(())
    }

    /// Returns a non-negative order quantity for every item in the snapshot.
    fn plan(&mut self, snapshot: &WarehouseSnapshot) -> Result<OrderPlan, RestockError>;
}
