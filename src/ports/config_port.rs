//! Configuration access port.
//!
//! Sections and keys are plain strings (`[data] max_retries`). Typed getters
//! return `Ok(None)` for a missing key and `ConfigInvalid` for a value that
//! does not parse as the requested type.

use crate::domain::error::StockscopeError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, StockscopeError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, StockscopeError>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, StockscopeError>;
}
