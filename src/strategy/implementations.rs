// src/strategy/implementations.rs

use crate::error::RestockError;
use crate::strategy::optimization::{
    economic_order_quantity, near_term_demand, reorder_point, safety_stock,
};
use crate::strategy::simplex::{LinearProgram, Relation, SolveError};
use crate::strategy::traits::{ItemSnapshot, OrderPlan, RestockStrategy, WarehouseSnapshot};
use tracing::debug;

// =========================================================================
// 1. EOQ Policy (Reorder Point / Reorder Quantity)
// =========================================================================

/// Classic (R, Q) policy.
///
/// When the inventory position drops below `R = daily mean * lead time`, order
/// the Economic Order Quantity `Q* = sqrt(2DS/H)`. Otherwise order nothing.
#[derive(Debug, Clone, Default)]
pub struct EoqStrategy;

impl EoqStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn order_for(&self, item: &ItemSnapshot) -> Result<f64, RestockError> {
        let q = economic_order_quantity(item.annual_demand, item.ordering_cost, item.holding_cost)?;
        let r = reorder_point(item.daily_demand_mean, item.lead_time_days);
        if item.inventory_position() < r {
            Ok(q.round())
        } else {
            Ok(0.0)
        }
    }
}

impl RestockStrategy for EoqStrategy {
    fn name(&self) -> &'static str {
        "eoq"
    }

    fn validate(&self, snapshot: &WarehouseSnapshot) -> Result<(), RestockError> {
        for item in &snapshot.items {
            economic_order_quantity(item.annual_demand, item.ordering_cost, item.holding_cost)
                .map_err(|e| match e {
                    RestockError::InvalidParameter { name, reason } => {
                        RestockError::InvalidParameter {
                            name: format!("items.{}.{}", item.id, name),
                            reason,
                        }
                    }
                    other => other,
                })?;
        }
        Ok(())
    }

    fn plan(&mut self, snapshot: &WarehouseSnapshot) -> Result<OrderPlan, RestockError> {
        let quantities = snapshot
            .items
            .iter()
            .map(|item| self.order_for(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderPlan::from_quantities(quantities))
    }
}

// =========================================================================
// 2. Safety-Stock Heuristic
// =========================================================================

/// Rule of thumb used on many shop floors.
///
/// Safety stock is `alpha` days of mean demand. Reorder once the position
/// falls below one day of demand plus safety stock, and order enough to cover
/// `coverage_days` of demand plus safety stock, clipped to free capacity.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    safety_factor: f64,
    coverage_days: f64,
}

impl HeuristicStrategy {
    pub fn new(safety_factor: f64, coverage_days: f64) -> Self {
        Self {
            safety_factor,
            coverage_days,
        }
    }

    pub fn reorder_level(&self, daily_demand_mean: f64) -> f64 {
        daily_demand_mean * (1.0 + self.safety_factor)
    }

    pub fn order_for(&self, item: &ItemSnapshot) -> f64 {
        let position = item.inventory_position();
        if position >= self.reorder_level(item.daily_demand_mean) {
            return 0.0;
        }
        let ss = safety_stock(item.daily_demand_mean, self.safety_factor);
        let target = item.daily_demand_mean * self.coverage_days + ss;
        (target - position).min(item.headroom()).max(0.0).round()
    }
}

impl Default for HeuristicStrategy {
    fn default() -> Self {
        Self::new(0.3, 14.0)
    }
}

impl RestockStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn validate(&self, _snapshot: &WarehouseSnapshot) -> Result<(), RestockError> {
        if !(self.safety_factor >= 0.0) {
            return Err(RestockError::invalid_parameter(
                "strategy.safety_factor",
                format!("must be >= 0, got {}", self.safety_factor),
            ));
        }
        if !(self.coverage_days > 0.0) {
            return Err(RestockError::invalid_parameter(
                "strategy.coverage_days",
                format!("must be > 0, got {}", self.coverage_days),
            ));
        }
        Ok(())
    }

    fn plan(&mut self, snapshot: &WarehouseSnapshot) -> Result<OrderPlan, RestockError> {
        Ok(OrderPlan::from_quantities(
            snapshot.items.iter().map(|item| self.order_for(item)).collect(),
        ))
    }
}

// =========================================================================
// 3. Linear Programming Policy (joint decision)
// =========================================================================

/// Solves one LP over every item each day.
///
/// Variables are `q_i` (and `s_i` shortages when a penalty is set). Objective:
/// `Σ (unit_cost + holding/2 + ordering_cost/ub_i) q_i + penalty Σ s_i`, the
/// middle term being the relaxation of the fixed charge `S y_i` with
/// `y_i >= q_i / ub_i`.
///
/// Constraints:
/// * demand: `position_i + q_i (+ s_i) >= daily mean * (lead time + safety_days)`
/// * supplier and capacity: `q_i <= min(max_order, capacity - position_i)`
/// * storage: `Σ q_i <= additional_storage`
/// * budget: `Σ unit_cost_i q_i <= budget`
///
/// A hard demand row never asks for more than the item's own upper bound. If
/// budget or storage still make the program infeasible, it is re-solved with
/// shortage slacks and the best-effort plan carries a warning.
#[derive(Debug, Clone)]
pub struct LpStrategy {
    budget: Option<f64>,
    additional_storage: Option<f64>,
    safety_days: f64,
    shortage_penalty: Option<f64>,
}

impl LpStrategy {
    pub fn new(budget: Option<f64>, additional_storage: Option<f64>, safety_days: f64) -> Self {
        Self {
            budget,
            additional_storage,
            safety_days,
            shortage_penalty: None,
        }
    }

    /// Turns the demand constraint soft: unmet requirement costs `penalty` per unit.
    pub fn with_shortage_penalty(mut self, penalty: f64) -> Self {
        self.shortage_penalty = Some(penalty);
        self
    }

    /// Units needed to cover near-term demand beyond the current position.
    pub fn requirement(&self, item: &ItemSnapshot) -> f64 {
        let need = near_term_demand(item.daily_demand_mean, item.lead_time_days, self.safety_days);
        (need - item.inventory_position()).max(0.0)
    }

    fn upper_bound(item: &ItemSnapshot) -> f64 {
        item.max_order.min(item.headroom()).max(0.0)
    }

    /// Per-unit objective coefficient: price, half-period holding and the
    /// fixed charge spread over the largest feasible order.
    fn unit_price(item: &ItemSnapshot) -> f64 {
        let ub = Self::upper_bound(item);
        let fixed_charge = if ub > 0.0 { item.ordering_cost / ub } else { 0.0 };
        item.unit_cost + item.holding_cost / 2.0 + fixed_charge
    }

    /// Shortage price used when the hard plan cannot be met. Dominates every
    /// unit price so the solver still orders whatever the joint limits allow.
    fn fallback_penalty(items: &[ItemSnapshot]) -> f64 {
        items.iter().map(Self::unit_price).fold(1.0, f64::max) * 10.0
    }

    /// Builds the joint program. With a penalty every demand row gets a
    /// shortage slack; without one the rows are hard but never ask for more
    /// than the item's own upper bound, so only the joint rows can conflict.
    fn build_program(&self, items: &[ItemSnapshot], penalty: Option<f64>) -> LinearProgram {
        let n = items.len();
        let vars = if penalty.is_some() { 2 * n } else { n };

        let mut objective = vec![0.0; vars];
        for (i, item) in items.iter().enumerate() {
            objective[i] = Self::unit_price(item);
            if let Some(penalty) = penalty {
                objective[n + i] = penalty;
            }
        }

        let mut lp = LinearProgram::minimize(objective);
        for (i, item) in items.iter().enumerate() {
            let ub = Self::upper_bound(item);
            lp.upper_bound(i, ub);

            let mut requirement = self.requirement(item);
            if penalty.is_none() {
                requirement = requirement.min(ub);
            }
            if requirement > 0.0 {
                let mut row = vec![0.0; vars];
                row[i] = 1.0;
                if penalty.is_some() {
                    row[n + i] = 1.0;
                }
                lp.constrain(row, Relation::GreaterEq, requirement);
            }
        }
        if let Some(storage) = self.additional_storage {
            let mut row = vec![0.0; vars];
            row[..n].fill(1.0);
            lp.constrain(row, Relation::LessEq, storage.max(0.0));
        }
        if let Some(budget) = self.budget {
            let mut row = vec![0.0; vars];
            for (i, item) in items.iter().enumerate() {
                row[i] = item.unit_cost;
            }
            lp.constrain(row, Relation::LessEq, budget.max(0.0));
        }
        lp
    }

    /// Turns solver values into whole-unit orders that still respect every
    /// limit. Quantities are floored against what is left of the budget and
    /// storage; orders below the supplier minimum are lifted when the lift
    /// fits, dropped otherwise. Items are settled in snapshot order.
    fn finalize(&self, items: &[ItemSnapshot], values: &[f64]) -> Vec<f64> {
        let mut storage_left = self.additional_storage.map(|s| s.max(0.0));
        let mut budget_left = self.budget.map(|b| b.max(0.0));

        items
            .iter()
            .zip(values)
            .map(|(item, &value)| {
                let mut cap = Self::upper_bound(item);
                if let Some(storage) = storage_left {
                    cap = cap.min(storage);
                }
                if let Some(budget) = budget_left {
                    if item.unit_cost > 0.0 {
                        cap = cap.min(budget / item.unit_cost);
                    }
                }
                let cap = (cap + ROUNDING_SLACK).floor().max(0.0);

                let mut q = value.round().min(cap).max(0.0);
                if q > 0.0 && q < item.min_order {
                    q = if item.min_order <= cap { item.min_order } else { 0.0 };
                }

                if let Some(storage) = storage_left.as_mut() {
                    *storage -= q;
                }
                if let Some(budget) = budget_left.as_mut() {
                    *budget -= q * item.unit_cost;
                }
                q
            })
            .collect()
    }

    fn infeasible(day: u32, err: SolveError) -> RestockError {
        RestockError::Infeasible {
            day,
            reason: match err {
                SolveError::Infeasible => {
                    "demand requirements exceed budget, storage or supplier limits".to_string()
                }
                other => other.to_string(),
            },
        }
    }
}

/// Absorbs solver round-off before flooring to whole units.
const ROUNDING_SLACK: f64 = 1e-6;

impl Default for LpStrategy {
    fn default() -> Self {
        Self::new(None, None, 7.0)
    }
}

impl RestockStrategy for LpStrategy {
    fn name(&self) -> &'static str {
        "lp"
    }

    fn validate(&self, _snapshot: &WarehouseSnapshot) -> Result<(), RestockError> {
        if let Some(budget) = self.budget {
            if !(budget >= 0.0) || !budget.is_finite() {
                return Err(RestockError::invalid_parameter(
                    "strategy.budget",
                    format!("must be finite and >= 0, got {}", budget),
                ));
            }
        }
        if let Some(storage) = self.additional_storage {
            if !(storage >= 0.0) || !storage.is_finite() {
                return Err(RestockError::invalid_parameter(
                    "strategy.additional_storage",
                    format!("must be finite and >= 0, got {}", storage),
                ));
            }
        }
        if !(self.safety_days >= 0.0) || !self.safety_days.is_finite() {
            return Err(RestockError::invalid_parameter(
                "strategy.safety_days",
                format!("must be >= 0, got {}", self.safety_days),
            ));
        }
        if let Some(penalty) = self.shortage_penalty {
            if !(penalty >= 0.0) || !penalty.is_finite() {
                return Err(RestockError::invalid_parameter(
                    "strategy.shortage_penalty",
                    format!("must be >= 0, got {}", penalty),
                ));
            }
        }
        Ok(())
    }

    fn plan(&mut self, snapshot: &WarehouseSnapshot) -> Result<OrderPlan, RestockError> {
        let items = &snapshot.items;
        if items.is_empty() {
            return Ok(OrderPlan::zeros(0));
        }

        let (solution, warning) = match self.build_program(items, self.shortage_penalty).solve() {
            Ok(solution) => (solution, None),
            Err(SolveError::Infeasible) if self.shortage_penalty.is_none() => {
                let penalty = Self::fallback_penalty(items);
                let solution = self
                    .build_program(items, Some(penalty))
                    .solve()
                    .map_err(|e| Self::infeasible(snapshot.day, e))?;
                (
                    solution,
                    Some("infeasible: budget or storage cannot cover every requirement, best-effort plan"),
                )
            }
            Err(e) => return Err(Self::infeasible(snapshot.day, e)),
        };
        debug!(
            day = snapshot.day,
            objective = solution.objective,
            best_effort = warning.is_some(),
            "lp solved"
        );

        let plan = OrderPlan::from_quantities(self.finalize(items, &solution.values));
        Ok(match warning {
            Some(warning) => plan.with_warning(warning),
            None => plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: f64, daily_mean: f64, lead_time_days: u32) -> ItemSnapshot {
        ItemSnapshot {
            id: "X1".to_string(),
            stock,
            in_transit: 0.0,
            annual_demand: daily_mean * 365.0,
            daily_demand_mean: daily_mean,
            unit_cost: 10.0,
            ordering_cost: 50.0,
            holding_cost: 2.0,
            capacity: 1000.0,
            lead_time_days,
            min_order: 1.0,
            max_order: 500.0,
        }
    }

    fn snapshot(items: Vec<ItemSnapshot>) -> WarehouseSnapshot {
        WarehouseSnapshot { day: 3, items }
    }

    #[test]
    fn eoq_triggers_only_below_reorder_point() {
        let strategy = EoqStrategy::new();
        let mut x = item(0.0, 1000.0 / 365.0, 10);
        x.annual_demand = 1000.0;
        let r = reorder_point(x.daily_demand_mean, 10);

        x.stock = r - 0.5;
        assert_eq!(strategy.order_for(&x).unwrap(), 224.0);
        x.stock = r;
        assert_eq!(strategy.order_for(&x).unwrap(), 0.0);
        x.stock = r + 5.0;
        assert_eq!(strategy.order_for(&x).unwrap(), 0.0);
    }

    #[test]
    fn eoq_counts_stock_in_transit() {
        let strategy = EoqStrategy::new();
        let mut x = item(5.0, 10.0, 3);
        assert!(strategy.order_for(&x).unwrap() > 0.0);
        x.in_transit = 100.0;
        assert_eq!(strategy.order_for(&x).unwrap(), 0.0);
    }

    #[test]
    fn eoq_validation_flags_zero_holding_cost() {
        let mut x = item(0.0, 10.0, 3);
        x.holding_cost = 0.0;
        let err = EoqStrategy::new().validate(&snapshot(vec![x])).unwrap_err();
        match err {
            RestockError::InvalidParameter { name, .. } => assert_eq!(name, "items.X1.holding_cost"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn heuristic_reorders_below_level() {
        let strategy = HeuristicStrategy::new(0.2, 14.0);
        let x = item(11.0, 10.0, 2);
        assert!((strategy.reorder_level(10.0) - 12.0).abs() < 1e-12);

        let q = strategy.order_for(&x);
        assert!(q > 0.0);
        let ss = safety_stock(10.0, 0.2);
        assert!(x.stock + q >= ss);
        assert_eq!(q, 131.0);

        let idle = item(12.0, 10.0, 2);
        assert_eq!(strategy.order_for(&idle), 0.0);
    }

    #[test]
    fn heuristic_respects_capacity() {
        let strategy = HeuristicStrategy::new(0.5, 60.0);
        let mut x = item(5.0, 10.0, 2);
        x.capacity = 100.0;
        assert_eq!(strategy.order_for(&x), 95.0);
    }

    #[test]
    fn lp_covers_requirement_with_ample_budget() {
        let x = item(0.0, 10.0, 5);
        let mut lp = LpStrategy::new(Some(10.0 * 10.0 * 100.0), None, 5.0);
        assert_eq!(lp.requirement(&x), 100.0);

        let plan = lp.plan(&snapshot(vec![x.clone()])).unwrap();
        let q = plan.get(0);
        assert!(q >= 100.0);
        assert!(q * x.unit_cost <= 10_000.0);
    }

    #[test]
    fn lp_zero_budget_orders_nothing_and_warns() {
        let x = item(0.0, 10.0, 5);
        let mut lp = LpStrategy::new(Some(0.0), None, 5.0);
        let plan = lp.plan(&snapshot(vec![x])).unwrap();
        assert!(plan.is_idle());
        assert!(plan.warning().is_some_and(|w| w.starts_with("infeasible")));
    }

    #[test]
    fn lp_unreachable_item_does_not_block_others() {
        let mut a = item(0.0, 10.0, 10);
        a.max_order = 100.0;
        let mut b = item(0.0, 10.0, 10);
        b.id = "X2".to_string();
        let mut lp = LpStrategy::new(None, None, 7.0);
        assert_eq!(lp.requirement(&a), 170.0);

        let plan = lp.plan(&snapshot(vec![a, b])).unwrap();
        assert_eq!(plan.get(0), 100.0);
        assert!(plan.get(1) >= 170.0);
        assert!(plan.warning().is_none());
    }

    #[test]
    fn lp_budget_holds_after_minimum_order_lift() {
        let mut x = item(95.0, 10.0, 5);
        x.min_order = 20.0;
        let mut lp = LpStrategy::new(Some(60.0), None, 5.0);
        let plan = lp.plan(&snapshot(vec![x.clone()])).unwrap();
        assert!(plan.get(0) * x.unit_cost <= 60.0);
        assert_eq!(plan.get(0), 0.0);
    }

    #[test]
    fn lp_storage_holds_after_minimum_order_lift() {
        let mut x = item(95.0, 10.0, 5);
        x.min_order = 20.0;
        let mut lp = LpStrategy::new(None, Some(5.0), 5.0);
        let plan = lp.plan(&snapshot(vec![x])).unwrap();
        assert!(plan.get(0) <= 5.0);
    }

    #[test]
    fn lp_best_effort_plan_stays_within_joint_limits() {
        let mut a = item(0.0, 10.0, 5);
        a.min_order = 20.0;
        let mut b = item(0.0, 10.0, 5);
        b.id = "X2".to_string();
        b.min_order = 20.0;
        b.unit_cost = 7.0;
        let mut lp = LpStrategy::new(Some(1_234.0), Some(150.0), 5.0);

        let snap = snapshot(vec![a, b]);
        let plan = lp.plan(&snap).unwrap();
        assert!(plan.warning().is_some());
        let spend: f64 = snap
            .items
            .iter()
            .zip(plan.quantities())
            .map(|(item, q)| item.unit_cost * q)
            .sum();
        let units: f64 = plan.quantities().iter().sum();
        assert!(spend <= 1_234.0);
        assert!(units <= 150.0);
        assert!(units > 0.0);
        for (item, q) in snap.items.iter().zip(plan.quantities()) {
            assert!(*q == 0.0 || *q >= item.min_order);
            assert_eq!(q.fract(), 0.0);
        }
    }

    #[test]
    fn lp_shortage_penalty_degrades_to_zero_order() {
        let x = item(0.0, 10.0, 5);
        let mut lp = LpStrategy::new(Some(0.0), None, 5.0).with_shortage_penalty(150.0);
        let plan = lp.plan(&snapshot(vec![x])).unwrap();
        assert_eq!(plan.get(0), 0.0);
    }

    #[test]
    fn lp_orders_nothing_when_covered() {
        let x = item(500.0, 10.0, 5);
        let mut lp = LpStrategy::new(None, None, 5.0);
        let plan = lp.plan(&snapshot(vec![x])).unwrap();
        assert!(plan.is_idle());
    }

    #[test]
    fn lp_shares_storage_between_items() {
        let a = item(0.0, 10.0, 5);
        let mut b = item(0.0, 5.0, 5);
        b.id = "X2".to_string();
        b.unit_cost = 1.0;
        let mut lp = LpStrategy::new(None, Some(120.0), 5.0).with_shortage_penalty(1000.0);

        let plan = lp.plan(&snapshot(vec![a, b])).unwrap();
        let total: f64 = plan.quantities().iter().sum();
        assert!(total <= 120.0 + 1e-6);
        assert!(plan.quantities().iter().all(|q| *q >= 0.0));
    }

    #[test]
    fn lp_lifts_small_orders_to_minimum() {
        let mut x = item(95.0, 10.0, 5);
        x.min_order = 20.0;
        let mut lp = LpStrategy::new(None, None, 5.0);
        let plan = lp.plan(&snapshot(vec![x])).unwrap();
        assert_eq!(plan.get(0), 20.0);
    }

    #[test]
    fn strategies_are_interchangeable() {
        let snap = snapshot(vec![item(3.0, 10.0, 2), item(400.0, 10.0, 2)]);
        let mut strategies: Vec<Box<dyn RestockStrategy>> = vec![
            Box::new(EoqStrategy::new()),
            Box::new(HeuristicStrategy::default()),
            Box::new(LpStrategy::default()),
        ];
        for strategy in strategies.iter_mut() {
            strategy.validate(&snap).unwrap();
            let plan = strategy.plan(&snap).unwrap();
            assert_eq!(plan.len(), 2, "{}", strategy.name());
            assert!(plan.quantities().iter().all(|q| *q >= 0.0));
            assert!(plan.get(0) > 0.0, "{} should restock the empty item", strategy.name());
            assert_eq!(plan.get(1), 0.0, "{} should leave the full item", strategy.name());
        }
    }
}
