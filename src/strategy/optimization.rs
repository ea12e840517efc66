// src/strategy/optimization.rs

//! Closed-form inventory formulas shared by the reorder strategies.

use crate::error::RestockError;

/// Economic Order Quantity.
///
/// # Formula
/// Q* = sqrt(2 * D * S / H)
///
/// # Arguments
/// * `annual_demand` - D, units per year.
/// * `ordering_cost` - S, fixed cost per order.
/// * `holding_cost` - H, cost of holding one unit for a year.
///
/// Fails with `InvalidParameter` when D or H is not strictly positive or S
/// is negative, instead of dividing by zero.
pub fn economic_order_quantity(
    annual_demand: f64,
    ordering_cost: f64,
    holding_cost: f64,
) -> Result<f64, RestockError> {
    if !(annual_demand > 0.0) {
        return Err(RestockError::invalid_parameter(
            "annual_demand",
            format!("EOQ needs annual demand > 0, got {}", annual_demand),
        ));
    }
    if !(holding_cost > 0.0) {
        return Err(RestockError::invalid_parameter(
            "holding_cost",
            format!("EOQ needs holding cost > 0, got {}", holding_cost),
        ));
    }
    if !(ordering_cost >= 0.0) {
        return Err(RestockError::invalid_parameter(
            "ordering_cost",
            format!("EOQ needs ordering cost >= 0, got {}", ordering_cost),
        ));
    }
    Ok((2.0 * annual_demand * ordering_cost / holding_cost).sqrt())
}

/// Stock level that triggers a new order: demand expected over the lead time.
pub fn reorder_point(daily_demand_mean: f64, lead_time_days: u32) -> f64 {
    daily_demand_mean * lead_time_days as f64
}

/// Buffer of `safety_factor` days of mean demand.
pub fn safety_stock(daily_demand_mean: f64, safety_factor: f64) -> f64 {
    safety_factor * daily_demand_mean
}

/// Demand expected over the lead time plus `safety_days`.
pub fn near_term_demand(daily_demand_mean: f64, lead_time_days: u32, safety_days: f64) -> f64 {
    daily_demand_mean * (lead_time_days as f64 + safety_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eoq_textbook_value() {
        let q = economic_order_quantity(1000.0, 50.0, 2.0).unwrap();
        assert!((q - 50_000f64.sqrt()).abs() < 1e-9);
        assert!((q - 223.6).abs() < 0.01);
    }

    #[test]
    fn eoq_rejects_zero_holding_or_demand() {
        assert!(matches!(
            economic_order_quantity(1000.0, 50.0, 0.0),
            Err(RestockError::InvalidParameter { .. })
        ));
        assert!(matches!(
            economic_order_quantity(0.0, 50.0, 2.0),
            Err(RestockError::InvalidParameter { .. })
        ));
        assert!(economic_order_quantity(1000.0, -1.0, 2.0).is_err());
        assert!(economic_order_quantity(f64::NAN, 50.0, 2.0).is_err());
    }

    #[test]
    fn reorder_point_and_buffers() {
        assert_eq!(reorder_point(10.0, 4), 40.0);
        assert_eq!(reorder_point(10.0, 0), 0.0);
        assert!((safety_stock(10.0, 0.2) - 2.0).abs() < 1e-12);
        assert_eq!(near_term_demand(10.0, 5, 5.0), 100.0);
    }
}
