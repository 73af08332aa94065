pub mod block_packer;
pub mod daily_planner;
pub mod gap_enumerator;
pub mod occupancy;
pub mod plan_assembler;
pub mod planning_service;
pub mod schedule_utils;
pub mod settings_service;
pub mod task_scorer;
