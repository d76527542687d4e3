//! Miscellaneous helpers.

pub mod species_list;
