//! Configuration access port.

use crate::domain::error::FoliobackError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Non-blank string value, or `ConfigMissing`.
    fn require_string(&self, section: &str, key: &str) -> Result<String, FoliobackError> {
        self.get_non_blank(section, key)
            .ok_or_else(|| FoliobackError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }

    /// Optional string value with blanks treated as absent.
    fn get_non_blank(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
