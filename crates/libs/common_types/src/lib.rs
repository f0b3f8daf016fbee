#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools
)]
mod detection;
mod detection_record;
mod engine;

pub use detection::*;
pub use detection_record::*;
pub use engine::*;
