//! Configuration access port trait.
//!
//! Typed getters return the `default` only when the key is missing or blank.
//! A present value that does not parse is `ConfigInvalid`. Range checks
//! happen later, on the merged config structs, in `domain::config_validation`.

use crate::domain::error::MacrossError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, MacrossError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, MacrossError>;
}
