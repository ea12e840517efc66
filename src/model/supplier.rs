// src/model/supplier.rs

use crate::error::{OrderViolation, RestockError};
use crate::model::queues::{OrderPipeline, PendingOrder};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a supplier's reliability turns into a delivered fraction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FillModel {
    /// Every delivery carries exactly `reliability` of the order.
    #[default]
    Fixed,
    /// All-or-nothing: the order arrives in full with probability `reliability`.
    Bernoulli,
    /// Fill fraction drawn from Beta(r * k, (1 - r) * k), mean `reliability`.
    Beta { concentration: f64 },
}

impl FillModel {
    /// Draws the fraction of an order that actually ships, in [0, 1].
    pub fn sample_fraction<R: Rng + ?Sized>(&self, reliability: f64, rng: &mut R) -> f64 {
        let r = reliability.clamp(0.0, 1.0);
        match *self {
            FillModel::Fixed => r,
            FillModel::Bernoulli => {
                if rng.gen_bool(r) {
                    1.0
                } else {
                    0.0
                }
            }
            FillModel::Beta { concentration } => {
                if r <= 0.0 || r >= 1.0 {
                    return r;
                }
                match Beta::new(r * concentration, (1.0 - r) * concentration) {
                    Ok(beta) => beta.sample(rng).clamp(0.0, 1.0),
                    // Degenerate shape parameters collapse to the mean.
                    Err(_) => r,
                }
            }
        }
    }
}

/// A resolved order.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub item: usize,
    pub ordered: f64,
    pub delivered: f64,
    pub placed_day: u32,
}

/// One supplier: lead time, fill rate and per-order bounds.
///
/// Suppliers are shared by many items through the warehouse's registry; the
/// pending pipeline tags every order with the item it belongs to.
#[derive(Debug, Clone)]
pub struct SupplierAgent {
    pub name: String,
    pub lead_time_days: u32,
    pub reliability: f64,
    pub min_order: f64,
    pub max_order: f64,
    pub fill_model: FillModel,
    pending: OrderPipeline,
}

impl SupplierAgent {
    pub fn new(
        name: impl Into<String>,
        lead_time_days: u32,
        reliability: f64,
        min_order: f64,
        max_order: f64,
    ) -> Self {
        Self {
            name: name.into(),
            lead_time_days,
            reliability,
            min_order,
            max_order,
            fill_model: FillModel::Fixed,
            pending: OrderPipeline::new(),
        }
    }

    pub fn with_fill_model(mut self, fill_model: FillModel) -> Self {
        self.fill_model = fill_model;
        self
    }

    /// Checks an order against the supplier's bounds without enqueueing it.
    pub fn check_order(&self, quantity: f64) -> Result<(), RestockError> {
        let violation = if !(quantity > 0.0) {
            Some(OrderViolation::NotPositive)
        } else if quantity < self.min_order {
            Some(OrderViolation::BelowMinimum {
                min: self.min_order,
            })
        } else if quantity > self.max_order {
            Some(OrderViolation::AboveMaximum {
                max: self.max_order,
            })
        } else {
            None
        };

        match violation {
            Some(violation) => Err(RestockError::InvalidOrder {
                supplier: self.name.clone(),
                quantity,
                violation,
            }),
            None => Ok(()),
        }
    }

    /// Enqueues an order for `item`, due `lead_time_days` after `day`.
    ///
    /// Returns the arrival day.
    pub fn accept_order(&mut self, item: usize, quantity: f64, day: u32) -> Result<u32, RestockError> {
        self.check_order(quantity)?;

        let order = PendingOrder {
            item,
            quantity,
            placed_day: day,
            arrival_day: day + self.lead_time_days,
        };
        debug!(
            supplier = %self.name,
            item,
            quantity,
            arrival_day = order.arrival_day,
            "order accepted"
        );
        let arrival_day = order.arrival_day;
        self.pending.push_departure(order);
        Ok(arrival_day)
    }

    /// Resolves every order due today, exactly once each.
    ///
    /// The delivered quantity is `round(ordered * fraction)`, never more than
    /// the order or the supplier's per-order maximum.
    pub fn deliver<R: Rng + ?Sized>(&mut self, day: u32, rng: &mut R) -> Vec<Delivery> {
        self.pending
            .pop_arrivals(day)
            .into_iter()
            .map(|order| {
                let fraction = self.fill_model.sample_fraction(self.reliability, rng);
                let delivered = (order.quantity * fraction)
                    .round()
                    .clamp(0.0, order.quantity.min(self.max_order));
                debug!(
                    supplier = %self.name,
                    item = order.item,
                    ordered = order.quantity,
                    delivered,
                    "order resolved"
                );
                Delivery {
                    item: order.item,
                    ordered: order.quantity,
                    delivered,
                    placed_day: order.placed_day,
                }
            })
            .collect()
    }

    /// Quantity ordered for `item` that has not arrived yet.
    pub fn in_transit_for(&self, item: usize) -> f64 {
        self.pending.in_transit_for(item)
    }

    pub fn pending_orders(&self) -> usize {
        self.pending.len()
    }
}
