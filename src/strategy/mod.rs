pub mod implementations;
pub mod optimization;
pub mod simplex;
pub mod traits;
