// src/error.rs

/// Why a supplier refused an order.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OrderViolation {
    #[error("quantity must be positive")]
    NotPositive,

    #[error("below minimum order of {min}")]
    BelowMinimum { min: f64 },

    #[error("above maximum order of {max}")]
    AboveMaximum { max: f64 },
}

/// Errors raised by the restocking engine.
///
/// `InvalidParameter` is fatal and always surfaces before the first simulated day.
/// `InvalidOrder` and `Infeasible` are recovered inside the day tick and only
/// show up as warnings in the recorded history.
#[derive(Debug, thiserror::Error)]
pub enum RestockError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("supplier '{supplier}' rejected order of {quantity} units: {violation}")]
    InvalidOrder {
        supplier: String,
        quantity: f64,
        violation: OrderViolation,
    },

    #[error("no feasible restock plan on day {day}: {reason}")]
    Infeasible { day: u32, reason: String },

    #[error("unknown supplier '{0}'")]
    UnknownSupplier(String),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl RestockError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        RestockError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
