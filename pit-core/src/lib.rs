pub mod calculations;
pub mod models;
pub mod regimes;

pub use calculations::{CalculationResult, Taxpayer, TaxpayerError};
pub use models::*;
