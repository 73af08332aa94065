use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

use crate::error::AppResult;
use crate::models::plan::{BlockRelations, BlockStatus, BlockType, ScheduledBlock};
use crate::models::settings::ResolvedSettings;
use crate::services::gap_enumerator::FreeGap;
use crate::services::schedule_utils;
use crate::services::task_scorer::ScoredTask;

pub const SUGGESTED_CONFIDENCE: f32 = 0.55;
pub const FALLBACK_REASON: &str = "Scheduled automatically (fallback)";

/// Whether a task of `estimate` minutes may start in a span of `remaining`
/// minutes: short spans take quick wins, long spans take deep work, and
/// anything in between takes whatever fits.
pub fn fits(estimate: i64, remaining: i64, settings: &ResolvedSettings) -> bool {
    if remaining <= 0 || remaining < settings.min_block_minutes.min(estimate) {
        return false;
    }
    if remaining <= settings.quick_win_max_minutes {
        estimate <= settings.quick_win_max_minutes
    } else if remaining >= settings.deep_work_min_minutes {
        estimate >= settings.deep_work_min_minutes.min(remaining)
    } else {
        estimate <= remaining
    }
}

pub fn classify(allocated_minutes: i64, settings: &ResolvedSettings) -> BlockType {
    if allocated_minutes <= settings.quick_win_max_minutes {
        BlockType::Quickwin
    } else {
        BlockType::Focus
    }
}

/// First-fit placement of ranked tasks into free gaps, in gap order. Each task
/// is placed at most once. `fixed_blocks` meeting blocks already count toward
/// `max_blocks`, so at most `max_blocks - fixed_blocks` blocks are produced.
pub fn pack<I>(
    gaps: I,
    ranked: &[ScoredTask<'_>],
    settings: &ResolvedSettings,
    fixed_blocks: usize,
) -> AppResult<Vec<ScheduledBlock>>
where
    I: IntoIterator<Item = FreeGap>,
{
    let capacity = settings.max_blocks.saturating_sub(fixed_blocks);
    let mut pool: Vec<&ScoredTask<'_>> = ranked.iter().collect();
    let mut blocks = Vec::new();

    for gap in gaps {
        if blocks.len() >= capacity || pool.is_empty() {
            break;
        }

        let mut cursor = gap.start;
        while cursor < gap.end && blocks.len() < capacity {
            let remaining = schedule_utils::minutes_between(cursor, gap.end);
            if remaining <= 0 {
                break;
            }
            let Some(position) = pool
                .iter()
                .position(|entry| fits(entry.task.effective_estimate(), remaining, settings))
            else {
                trace!(target: "planner::packer", remaining, "no task fits the rest of the gap");
                break;
            };

            let entry = pool.remove(position);
            let allocated = entry.task.effective_estimate().min(remaining);
            let end = schedule_utils::add_minutes(cursor, allocated)?;
            blocks.push(suggested_block(entry, cursor, end, classify(allocated, settings)));
            cursor = end;
        }
    }

    debug!(
        target: "planner::packer",
        placed = blocks.len(),
        unplaced = pool.len(),
        "tasks packed"
    );

    Ok(blocks)
}

fn suggested_block(
    entry: &ScoredTask<'_>,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    block_type: BlockType,
) -> ScheduledBlock {
    ScheduledBlock {
        id: format!("{}-{}", block_type.as_str(), entry.task.id),
        block_type,
        status: BlockStatus::Suggested,
        start: schedule_utils::format_datetime(start),
        end: schedule_utils::format_datetime(end),
        title: entry.task.title.clone(),
        reason: FALLBACK_REASON.to_string(),
        confidence: SUGGESTED_CONFIDENCE,
        relations: BlockRelations {
            task_id: Some(entry.task.id.clone()),
            meeting_id: None,
        },
    }
}
