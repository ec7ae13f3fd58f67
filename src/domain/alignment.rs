//! Common start date across a basket's price histories.

use crate::domain::error::FoliobackError;
use crate::domain::series::AssetSeries;
use chrono::NaiveDate;

/// Latest of the per-asset earliest dates: the day the last asset comes online.
///
/// Fails with [`FoliobackError::PeriodMismatch`] if any series is empty or
/// there are no series at all.
pub fn common_start_date(series: &[AssetSeries]) -> Result<NaiveDate, FoliobackError> {
    let mut start: Option<NaiveDate> = None;
    for s in series {
        let first = s.first_date().ok_or(FoliobackError::PeriodMismatch)?;
        start = Some(start.map_or(first, |current| current.max(first)));
    }
    start.ok_or(FoliobackError::PeriodMismatch)
}
