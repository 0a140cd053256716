//! Plant models driven by the predictive controller

pub mod first_order_lag;

pub use first_order_lag::*;
