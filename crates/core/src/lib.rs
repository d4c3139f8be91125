//! Email-to-image conversion core.
//!
//! Detects the container format from a filename, pulls the readable body out
//! of `.msg` and `.eml` files, and rasterizes it to a JPEG. Nothing here knows
//! about HTTP; the API crate wraps [`convert::convert_upload`].

pub mod convert;
pub mod error;
pub mod extract;
pub mod format;
pub mod render;
pub mod scratch;
