//! Output writers for profile data and flamegraphs.
//!
//! This module handles writing data to disk:
//! - JSON profiles
//! - SVG flamegraphs

pub mod json;
pub mod svg;

pub use json::{read_profile, write_profile};
pub use svg::write_svg;
