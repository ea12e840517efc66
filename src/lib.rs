//! Day-by-day inventory replenishment simulation with interchangeable
//! reorder policies (EOQ, linear programming, safety-stock heuristic).

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use crate::error::{OrderViolation, RestockError};
pub use crate::model::item::InventoryItem;
pub use crate::model::supplier::{FillModel, SupplierAgent};
pub use crate::simulation::config::{ScenarioConfig, StrategyConfig};
pub use crate::simulation::engine::{DayRecord, ItemSummary, SimulationPhase, Warehouse};
pub use crate::strategy::implementations::{EoqStrategy, HeuristicStrategy, LpStrategy};
pub use crate::strategy::traits::{ItemSnapshot, OrderPlan, RestockStrategy, WarehouseSnapshot};
