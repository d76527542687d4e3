//! Output format writers.

mod csv;
mod export;
mod naming;
pub mod progress;
mod report;
mod species_list;
mod summary;
pub(crate) mod types;
mod writer;

pub use csv::{CsvWriter, RESULTS_HEADER, write_results_csv};
pub use export::export_all;
pub use naming::{OutputFiles, file_stamp};
pub use report::{ResultsAnalysis, analyze_results_csv};
pub use species_list::{SpeciesStats, species_stats, write_species_list_csv};
pub use summary::{SummaryRow, summary_rows, write_summary_csv};
pub use types::{BoundingBox, Category, Detection, DetectionResult};
pub use writer::OutputWriter;
