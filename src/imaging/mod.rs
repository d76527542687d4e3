//! Image file discovery helpers and header validation.

mod validate;

pub use validate::{ImageInfo, image_dimensions, is_image_file, validate_image, validate_images};
