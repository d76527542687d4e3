//! Output writer trait definition.

use crate::error::Result;
use crate::output::DetectionResult;

/// Trait for writing detection results.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write all rows for one image.
    fn write_result(&mut self, result: &DetectionResult) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
