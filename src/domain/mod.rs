//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod indicator;
pub mod indicator_config;
pub mod indicator_helpers;
pub mod signal;
pub mod processor;
pub mod comparison;
pub mod portfolio;
pub mod metrics;
pub mod universe;
pub mod data_config;
pub mod config_validation;
pub mod error;
