use chrono::NaiveDate;
use tracing::debug;

use crate::error::AppResult;
use crate::models::settings::ResolvedSettings;
use crate::models::task::Task;
use crate::services::schedule_utils;

const REVENUE_TAGS: [&str; 2] = ["revenue", "client"];

/// Open task paired with its priority score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub score: f64,
}

/// Priority score of a single task. `due` is the task's parsed due date.
pub fn score(
    task: &Task,
    due: Option<NaiveDate>,
    settings: &ResolvedSettings,
    plan_date: NaiveDate,
) -> f64 {
    let weights = &settings.weights;
    let mut total = 0.0;

    if task.is_high_priority() {
        total += weights.priority_high;
    }

    if let Some(due) = due {
        let diff_days = (due - plan_date).num_days();
        if diff_days <= 0 {
            total += weights.due_today;
        } else if diff_days == 1 {
            total += weights.due_tomorrow;
        }
    }

    if REVENUE_TAGS.iter().any(|tag| task.has_tag(tag)) {
        total += weights.revenue_tag;
    }

    if let Some(estimate) = task.declared_estimate() {
        if estimate <= settings.quick_win_max_minutes {
            total += weights.short_estimate;
        }
    }

    total
}

/// Filters open tasks and orders them by descending score. Equal scores keep
/// their input order.
pub fn rank_tasks<'a>(
    tasks: &'a [Task],
    settings: &ResolvedSettings,
    plan_date: NaiveDate,
) -> AppResult<Vec<ScoredTask<'a>>> {
    let mut ranked = Vec::with_capacity(tasks.len());
    for task in tasks.iter().filter(|task| task.is_open()) {
        let due = task
            .due_date
            .as_deref()
            .map(schedule_utils::parse_date)
            .transpose()?;
        ranked.push(ScoredTask {
            task,
            score: score(task, due, settings, plan_date),
        });
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        target: "planner::scorer",
        eligible = ranked.len(),
        total = tasks.len(),
        "tasks ranked"
    );

    Ok(ranked)
}
