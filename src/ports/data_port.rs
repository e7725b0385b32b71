//! Market data access port.

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Adjusted bars for `symbol` over `period` at `interval`, oldest first,
    /// one bar per date, incomplete rows already dropped. An unknown symbol
    /// may yield an empty vector rather than an error.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MacrossError>;
}
