pub mod result_handlers;
pub mod run_handlers;
