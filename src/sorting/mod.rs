//! Sorting of processed images into species folders.

mod organizer;

pub use organizer::{
    FileOrganizer, OrganizationSummary, SpeciesFolder, TransferMode, avoid_collision,
    clean_empty_folders, render_report, sanitize_folder_name,
};
