pub mod target;

pub use target::{normalize_section, Target, SECTION_WIDTH};
