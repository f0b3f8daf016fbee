pub mod orchestration_utils;
pub mod test_context;
