//! Report output port.

use crate::domain::analysis::BacktestResponse;
use crate::domain::error::FoliobackError;

/// Port for writing an analysis response somewhere durable.
pub trait ReportPort {
    fn write(&self, response: &BacktestResponse, output_path: &str) -> Result<(), FoliobackError>;
}
