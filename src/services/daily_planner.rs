use std::collections::HashSet;

use serde_json::json;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::plan::{ContextPack, DailyPlanResponse};
use crate::models::settings::ResolvedSettings;
use crate::services::block_packer;
use crate::services::gap_enumerator;
use crate::services::occupancy;
use crate::services::plan_assembler::{self, Assembly};
use crate::services::schedule_utils::{self, WorkingWindow};
use crate::services::task_scorer;

/// Deterministic planner: scores tasks, finds the free gaps around buffered
/// meetings and packs tasks into them first-fit. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlanner;

impl HeuristicPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, context: &ContextPack) -> AppResult<DailyPlanResponse> {
        let settings = context.settings.resolve()?;
        self.generate_with(context, &settings)
    }

    /// Same as [`generate`](Self::generate) with settings resolved by the caller.
    pub fn generate_with(
        &self,
        context: &ContextPack,
        settings: &ResolvedSettings,
    ) -> AppResult<DailyPlanResponse> {
        let plan_date = schedule_utils::parse_date(&context.date)?;
        ensure_unique_ids(
            "taskId",
            context.tasks.iter().map(|task| task.id.as_str()),
        )?;
        // cancelled events produce no block, so only live ids must be distinct
        ensure_unique_ids(
            "eventId",
            context
                .events
                .iter()
                .filter(|event| !event.is_cancelled())
                .map(|event| event.id.as_str()),
        )?;

        let window = WorkingWindow::for_day(plan_date, settings)?;
        let ranked = task_scorer::rank_tasks(&context.tasks, settings, plan_date)?;

        let occupied = occupancy::build_occupancy(
            &context.events,
            settings.prep_minutes,
            settings.post_minutes,
            settings.timezone,
        )?;
        let merged = occupancy::coalesce(&occupied);
        debug!(
            target: "planner::engine",
            occupied = occupied.len(),
            merged = merged.len(),
            "occupancy built"
        );

        let gaps = gap_enumerator::enumerate_gaps(&merged, window, settings.min_block_minutes);
        let meeting_blocks = context
            .events
            .iter()
            .filter(|event| !event.is_cancelled())
            .count();
        let packed = block_packer::pack(gaps, &ranked, settings, meeting_blocks)?;

        let plan = plan_assembler::assemble(
            Assembly {
                plan_date,
                settings,
                window,
                events: &context.events,
                tasks: &context.tasks,
                occupied: &occupied,
            },
            packed,
        )?;

        info!(
            target: "planner::engine",
            date = %plan.date,
            tasks = context.tasks.len(),
            events = context.events.len(),
            blocks = plan.blocks.len(),
            free_minutes = plan.summary.free_minutes,
            "heuristic plan generated"
        );

        Ok(plan)
    }
}

/// Block ids are derived from task and event ids, so both must be distinct.
fn ensure_unique_ids<'a>(field: &str, ids: impl Iterator<Item = &'a str>) -> AppResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::invalid_input_with_details(
                format!("{field} values must be unique"),
                json!({"field": field, "id": id}),
            ));
        }
    }
    Ok(())
}
