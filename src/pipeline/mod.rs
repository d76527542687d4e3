//! Processing pipeline components.

mod batch;
mod coordinator;

pub use batch::{BatchOutcome, BatchProcessor, ProcessingStats, save_results_summary};
pub use coordinator::{collect_input_files, resolve_output_dir, restore_input_order};
