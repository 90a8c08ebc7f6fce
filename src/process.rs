pub mod signal;
pub mod task;
