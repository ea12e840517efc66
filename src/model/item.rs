// src/model/item.rs

use serde::Serialize;

/// What happened when a day's demand hit the shelf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandOutcome {
    pub sold: f64,
    pub lost: f64,
}

/// What happened when a delivery reached the dock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receipt {
    pub accepted: f64,
    pub discarded: f64,
}

/// Running cost components for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostLedger {
    pub purchase: f64,
    pub ordering: f64,
    pub holding: f64,
}

impl CostLedger {
    pub fn total(&self) -> f64 {
        self.purchase + self.ordering + self.holding
    }
}

/// A single product on the warehouse floor.
///
/// Stock never goes negative (unmet demand is a lost sale) and never exceeds
/// `capacity` (overflow from a delivery is discarded).
#[derive(Debug, Clone)]
pub struct InventoryItem {
    // Identity
    pub id: String,
    pub name: String,
    pub supplier: String,

    // State Variables
    pub stock: f64,

    // Static parameters
    pub annual_demand: f64,
    pub unit_cost: f64,
    pub ordering_cost: f64,
    /// Annual holding cost per unit.
    pub holding_cost: f64,
    pub capacity: f64,

    // Tracking for Analysis/Logging
    pub costs: CostLedger,
    pub orders_placed: u32,
    pub units_ordered: f64,
    pub units_received: f64,
    pub units_discarded: f64,
    pub demand_total: f64,
    pub units_sold: f64,
    pub lost_sales: f64,
    pub stockout_days: u32,
    stock_sum: f64,
    days_recorded: u32,
}

impl InventoryItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        supplier: impl Into<String>,
        initial_stock: f64,
        annual_demand: f64,
        unit_cost: f64,
        ordering_cost: f64,
        holding_cost: f64,
        capacity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supplier: supplier.into(),
            stock: initial_stock.clamp(0.0, capacity.max(0.0)),
            annual_demand,
            unit_cost,
            ordering_cost,
            holding_cost,
            capacity,
            costs: CostLedger::default(),
            orders_placed: 0,
            units_ordered: 0.0,
            units_received: 0.0,
            units_discarded: 0.0,
            demand_total: 0.0,
            units_sold: 0.0,
            lost_sales: 0.0,
            stockout_days: 0,
            stock_sum: 0.0,
            days_recorded: 0,
        }
    }

    /// Mean demand per day given the number of trading days in a year.
    pub fn daily_demand_mean(&self, days_per_year: f64) -> f64 {
        self.annual_demand / days_per_year
    }

    /// Sells what is on hand; whatever is left over is a lost sale.
    pub fn apply_demand(&mut self, realized_demand: f64) -> DemandOutcome {
        let demand = realized_demand.max(0.0);
        let sold = self.stock.min(demand);
        let lost = demand - sold;

        self.stock -= sold;
        self.demand_total += demand;
        self.units_sold += sold;
        self.lost_sales += lost;
        if lost > 0.0 {
            self.stockout_days += 1;
        }

        DemandOutcome { sold, lost }
    }

    /// Puts a delivery on the shelf, discarding whatever does not fit.
    pub fn receive_delivery(&mut self, quantity: f64) -> Receipt {
        let quantity = quantity.max(0.0);
        let room = (self.capacity - self.stock).max(0.0);
        let accepted = quantity.min(room);

        self.stock += accepted;
        self.units_received += accepted;
        self.units_discarded += quantity - accepted;

        Receipt {
            accepted,
            discarded: quantity - accepted,
        }
    }

    /// Books a placed order. The fixed ordering cost is charged once per order.
    pub fn record_order(&mut self, quantity: f64) -> f64 {
        self.orders_placed += 1;
        self.units_ordered += quantity;
        self.costs.ordering += self.ordering_cost;
        self.ordering_cost
    }

    /// Pays for delivered units at the unit cost.
    pub fn charge_purchase(&mut self, delivered: f64) -> f64 {
        let cost = delivered * self.unit_cost;
        self.costs.purchase += cost;
        cost
    }

    /// Accrues one day of holding cost on end-of-day stock and updates the
    /// running stock average.
    pub fn close_day(&mut self, days_per_year: f64) -> f64 {
        let cost = self.holding_cost / days_per_year * self.stock;
        self.costs.holding += cost;
        self.stock_sum += self.stock;
        self.days_recorded += 1;
        cost
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.total()
    }

    pub fn average_stock(&self) -> f64 {
        if self.days_recorded == 0 {
            self.stock
        } else {
            self.stock_sum / self.days_recorded as f64
        }
    }

    /// Fraction of demand that was served: 1 - lost / demand.
    pub fn service_level(&self) -> f64 {
        if self.demand_total <= 0.0 {
            1.0
        } else {
            1.0 - self.lost_sales / self.demand_total
        }
    }
}
