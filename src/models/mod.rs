pub mod calendar;
pub mod plan;
pub mod settings;
pub mod task;
