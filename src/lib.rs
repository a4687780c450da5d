//! cdi-calc - CDI-indexed investment projection
//!
//! This library counts Brazilian business days, compounds the daily CDI
//! over them and derives the monthly rate implied by two payment amounts.

pub mod calendar;
pub mod config;
pub mod error;
pub mod projection;
pub mod rates;
pub mod utils;
