//! INI file configuration adapter.

use crate::domain::error::StockscopeError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockscopeError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| parse_error(&path.display().to_string(), reason))?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StockscopeError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| parse_error(INLINE_SOURCE, reason))?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, StockscopeError> {
        self.config
            .getint(section, key)
            .map_err(|_| invalid_value(section, key, self.config.get(section, key), "an integer"))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, StockscopeError> {
        self.config
            .getfloat(section, key)
            .map_err(|_| invalid_value(section, key, self.config.get(section, key), "a number"))
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, StockscopeError> {
        match self.config.get(section, key) {
            Some(value) => Self::parse_bool(&value)
                .map(Some)
                .ok_or_else(|| invalid_value(section, key, Some(value), "a boolean")),
            None => Ok(None),
        }
    }
}

fn invalid_value(section: &str, key: &str, value: Option<String>, expected: &str) -> StockscopeError {
    StockscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("'{}' is not {}", value.unwrap_or_default(), expected),
    }
}

fn parse_error(file: &str, reason: String) -> StockscopeError {
    StockscopeError::ConfigParse {
        file: file.to_string(),
        reason,
    }
}
