use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::calendar::CalendarEvent;
use crate::models::plan::{
    BlockRelations, BlockStatus, BlockType, DailyPlanResponse, DailyPlanSummary, ScheduledBlock,
};
use crate::models::settings::ResolvedSettings;
use crate::models::task::Task;
use crate::services::occupancy::{self, OccupiedInterval};
use crate::services::schedule_utils::{self, WorkingWindow};

pub const HEURISTIC_NOTES: &str = "Plan generated with the basic heuristic (no AI)";
pub const HEURISTIC_WARNING: &str = "AI unavailable: using the basic planner";
const MAX_CRITICAL: usize = 3;
const DEFAULT_MEETING_TITLE: &str = "Meeting";
const ALL_DAY_REASON: &str = "All-day event (does not block time)";
const CALENDAR_REASON: &str = "Calendar event";

/// Inputs to the final assembly step of a planning call.
pub struct Assembly<'a> {
    pub plan_date: NaiveDate,
    pub settings: &'a ResolvedSettings,
    pub window: WorkingWindow,
    pub events: &'a [CalendarEvent],
    pub tasks: &'a [Task],
    pub occupied: &'a [OccupiedInterval],
}

/// Merges fixed meeting blocks with packed blocks and builds the summary.
pub fn assemble(input: Assembly<'_>, packed: Vec<ScheduledBlock>) -> AppResult<DailyPlanResponse> {
    let tz = input.settings.timezone;
    let mut timed: Vec<(DateTime<FixedOffset>, ScheduledBlock)> = Vec::new();

    for event in input.events.iter().filter(|event| !event.is_cancelled()) {
        let start = schedule_utils::parse_event_instant(&event.start, event.all_day, tz)?;
        let end = schedule_utils::parse_event_instant(&event.end, event.all_day, tz)?;
        timed.push((start, meeting_block(event, start, end)));
    }
    let meetings_count = timed.len();

    for block in packed {
        let start = schedule_utils::parse_datetime(&block.start)?;
        timed.push((start, block));
    }
    timed.sort_by_key(|(start, _)| *start);

    // summed over the unmerged intervals, so overlaps subtract twice
    let free_minutes =
        (input.window.minutes() - occupancy::occupied_minutes(input.occupied)).max(0);
    let critical_count = input
        .tasks
        .iter()
        .filter(|task| task.is_high_priority())
        .count()
        .min(MAX_CRITICAL);

    Ok(DailyPlanResponse {
        date: schedule_utils::format_date(input.plan_date),
        summary: DailyPlanSummary {
            meetings_count,
            free_minutes,
            critical_count,
            notes: Some(HEURISTIC_NOTES.to_string()),
        },
        blocks: timed.into_iter().map(|(_, block)| block).collect(),
        follow_ups: Vec::new(),
        warnings: vec![HEURISTIC_WARNING.to_string()],
    })
}

fn meeting_block(
    event: &CalendarEvent,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> ScheduledBlock {
    let title = if event.title.trim().is_empty() {
        DEFAULT_MEETING_TITLE.to_string()
    } else {
        event.title.clone()
    };

    ScheduledBlock {
        id: format!("meeting-{}", event.id),
        block_type: BlockType::Meeting,
        status: BlockStatus::Fixed,
        start: schedule_utils::format_datetime(start),
        end: schedule_utils::format_datetime(end),
        title,
        reason: if event.all_day {
            ALL_DAY_REASON
        } else {
            CALENDAR_REASON
        }
        .to_string(),
        confidence: 1.0,
        relations: BlockRelations {
            task_id: None,
            meeting_id: Some(event.id.clone()),
        },
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    InvalidTimes,
    Overlap,
    OutsideWorkingHours,
    DuplicateTask,
    TooManyBlocks,
    OversizedQuickWin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanViolation {
    pub kind: ViolationKind,
    pub message: String,
    #[serde(default)]
    pub block_ids: Vec<String>,
}

impl PlanViolation {
    fn new(kind: ViolationKind, message: String, block_ids: Vec<String>) -> Self {
        Self {
            kind,
            message,
            block_ids,
        }
    }
}

/// Checks a plan from any source against the scheduling invariants. All-day
/// meetings are ignored for overlap checks, and two fixed meetings may overlap
/// since the calendar owns them.
pub fn audit_plan(
    plan: &DailyPlanResponse,
    events: &[CalendarEvent],
    settings: &ResolvedSettings,
    window: WorkingWindow,
) -> Vec<PlanViolation> {
    let mut violations = Vec::new();
    let all_day: HashSet<&str> = events
        .iter()
        .filter(|event| event.all_day)
        .map(|event| event.id.as_str())
        .collect();

    let mut spans = Vec::new();
    for block in &plan.blocks {
        match (
            schedule_utils::parse_datetime(&block.start),
            schedule_utils::parse_datetime(&block.end),
        ) {
            (Ok(start), Ok(end)) if start < end => spans.push((block, start, end)),
            (Ok(start), Ok(end)) if start == end && block.is_fixed_meeting() => {
                spans.push((block, start, end))
            }
            _ => violations.push(PlanViolation::new(
                ViolationKind::InvalidTimes,
                format!("block {} has unusable start/end", block.id),
                vec![block.id.clone()],
            )),
        }
    }

    let consumes_time = |block: &ScheduledBlock| {
        !(block.is_fixed_meeting()
            && block
                .relations
                .meeting_id
                .as_deref()
                .is_some_and(|id| all_day.contains(id)))
    };

    for (idx, (a, a_start, a_end)) in spans.iter().enumerate() {
        for (b, b_start, b_end) in spans.iter().skip(idx + 1) {
            if a.is_fixed_meeting() && b.is_fixed_meeting() {
                continue;
            }
            if !consumes_time(*a) || !consumes_time(*b) {
                continue;
            }
            if schedule_utils::overlaps(*a_start, *a_end, *b_start, *b_end) {
                violations.push(PlanViolation::new(
                    ViolationKind::Overlap,
                    format!("blocks {} and {} overlap", a.id, b.id),
                    vec![a.id.clone(), b.id.clone()],
                ));
            }
        }
    }

    let mut suggested = 0usize;
    let mut task_blocks: HashMap<&str, Vec<String>> = HashMap::new();
    for (block, start, end) in &spans {
        if block.is_fixed_meeting() {
            continue;
        }
        suggested += 1;

        if !window.contains(*start, *end) {
            violations.push(PlanViolation::new(
                ViolationKind::OutsideWorkingHours,
                format!("block {} lies outside working hours", block.id),
                vec![block.id.clone()],
            ));
        }

        if block.block_type == BlockType::Quickwin {
            let minutes = schedule_utils::minutes_between(*start, *end);
            if minutes > settings.quick_win_max_minutes {
                violations.push(PlanViolation::new(
                    ViolationKind::OversizedQuickWin,
                    format!(
                        "quick win {} lasts {} minutes (limit {})",
                        block.id, minutes, settings.quick_win_max_minutes
                    ),
                    vec![block.id.clone()],
                ));
            }
        }

        if let Some(task_id) = block.task_id() {
            task_blocks
                .entry(task_id)
                .or_default()
                .push(block.id.clone());
        }
    }

    let mut duplicates: Vec<(&str, Vec<String>)> = task_blocks
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    duplicates.sort_by(|a, b| a.0.cmp(b.0));
    for (task_id, ids) in duplicates {
        violations.push(PlanViolation::new(
            ViolationKind::DuplicateTask,
            format!("task {} is scheduled {} times", task_id, ids.len()),
            ids,
        ));
    }

    // meetings are never dropped, so only suggested blocks can break the cap
    if suggested > 0 && plan.blocks.len() > settings.max_blocks {
        violations.push(PlanViolation::new(
            ViolationKind::TooManyBlocks,
            format!(
                "{} blocks ({} suggested) exceed the limit of {}",
                plan.blocks.len(),
                suggested,
                settings.max_blocks
            ),
            Vec::new(),
        ));
    }

    violations
}
