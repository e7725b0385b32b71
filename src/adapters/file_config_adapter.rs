//! INI file configuration adapter.

use crate::domain::error::MacrossError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// No file given: every getter returns its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_value<T: FromStr>(
        &self,
        section: &str,
        key: &str,
        default: T,
        expected: &str,
    ) -> Result<T, MacrossError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| MacrossError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected {}, got '{}'", expected, raw.trim()),
            }),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|value| !value.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, MacrossError> {
        self.parse_value(section, key, default, "an integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, MacrossError> {
        let value = self.parse_value(section, key, default, "a number")?;
        if !value.is_finite() {
            return Err(MacrossError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected a finite number, got {}", value),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
symbol = 7203.T
source = csv
csv_dir = ./data

[backtest]
fast = 10
fee_bps = 2.5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), Some("7203.T".to_string()));
        assert_eq!(adapter.get_string("data", "csv_dir"), Some("./data".to_string()));
        assert_eq!(adapter.get_int("backtest", "fast", 5).unwrap(), 10);
        assert_eq!(adapter.get_double("backtest", "fee_bps", 5.0).unwrap(), 2.5);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[data]\nsymbol = AAPL\n").unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_string_treats_blank_as_missing() {
        let adapter = FileConfigAdapter::from_string("[data]\nsymbol =\n").unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_blank() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nfast =\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "slow", 20).unwrap(), 20);
        assert_eq!(adapter.get_int("backtest", "fast", 5).unwrap(), 5);
    }

    #[test]
    fn get_int_tolerates_surrounding_whitespace() {
        let adapter = FileConfigAdapter::from_string("[predict]\nseed =   42  \n").unwrap();
        assert_eq!(adapter.get_int("predict", "seed", 0).unwrap(), 42);
    }

    #[test]
    fn get_int_rejects_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nslow = abc\n").unwrap();
        match adapter.get_int("backtest", "slow", 20) {
            Err(MacrossError::ConfigInvalid { section, key, reason }) => {
                assert_eq!(section, "backtest");
                assert_eq!(key, "slow");
                assert!(reason.contains("abc"));
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn get_int_rejects_fractional_value() {
        let adapter = FileConfigAdapter::from_string("[chart]\nsma_window = 20.5\n").unwrap();
        assert!(matches!(
            adapter.get_int("chart", "sma_window", 20),
            Err(MacrossError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[predict]\ntrain_fraction = most\n").unwrap();
        assert!(matches!(
            adapter.get_double("predict", "train_fraction", 0.8),
            Err(MacrossError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn get_double_rejects_non_finite() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nfee_bps = inf\n").unwrap();
        assert!(matches!(
            adapter.get_double("backtest", "fee_bps", 5.0),
            Err(MacrossError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn adapter_debug_output_names_type() {
        let adapter = FileConfigAdapter::empty();
        assert!(format!("{:?}", adapter).starts_with("FileConfigAdapter"));
    }

    #[test]
    fn empty_adapter_uses_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("data", "symbol"), None);
        assert_eq!(adapter.get_int("chart", "sma_window", 20).unwrap(), 20);
        assert_eq!(adapter.get_double("backtest", "fee_bps", 5.0).unwrap(), 5.0);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[predict]\ntrees = 50\nseed = 7\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("predict", "trees", 200).unwrap(), 50);
        assert_eq!(adapter.get_int("predict", "seed", 0).unwrap(), 7);
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/macross.ini");
        assert!(result.is_err());
    }
}
