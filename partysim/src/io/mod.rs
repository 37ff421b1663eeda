pub mod run_log;
pub mod weights;
