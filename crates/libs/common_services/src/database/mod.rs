mod detection_record_store;
mod error;
mod utils;

pub use detection_record_store::*;
pub use error::*;
pub use utils::*;
