use std::collections::HashMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};

pub const WEIGHT_PRIORITY_HIGH: &str = "priorityHigh";
pub const WEIGHT_DUE_TODAY: &str = "dueToday";
pub const WEIGHT_DUE_TOMORROW: &str = "dueTomorrow";
pub const WEIGHT_REVENUE_TAG: &str = "revenueTag";
pub const WEIGHT_SHORT_ESTIMATE: &str = "shortEstimate";

const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_WORKDAY_START: &str = "09:00";
const DEFAULT_WORKDAY_END: &str = "18:00";

/// Planner settings as they arrive from the settings store or the request
/// body. Every section is optional; missing values take the product defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerSettings {
    pub timezone: String,
    pub working_hours: WorkingHours,
    pub buffers: Buffers,
    pub blocks: BlockSettings,
    pub quick_wins: QuickWinSettings,
    pub deep_work: DeepWorkSettings,
    pub plan: PlanLimits,
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Buffers {
    pub prep_minutes: i64,
    pub post_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockSettings {
    pub min_block_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickWinSettings {
    pub max_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeepWorkSettings {
    pub min_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanLimits {
    pub max_blocks: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringSettings {
    pub weights: HashMap<String, f64>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            working_hours: WorkingHours::default(),
            buffers: Buffers::default(),
            blocks: BlockSettings::default(),
            quick_wins: QuickWinSettings::default(),
            deep_work: DeepWorkSettings::default(),
            plan: PlanLimits::default(),
            scoring: ScoringSettings::default(),
        }
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: DEFAULT_WORKDAY_START.to_string(),
            end: DEFAULT_WORKDAY_END.to_string(),
        }
    }
}

impl Default for Buffers {
    fn default() -> Self {
        Self {
            prep_minutes: 10,
            post_minutes: 5,
        }
    }
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            min_block_minutes: 10,
        }
    }
}

impl Default for QuickWinSettings {
    fn default() -> Self {
        Self { max_minutes: 15 }
    }
}

impl Default for DeepWorkSettings {
    fn default() -> Self {
        Self { min_minutes: 60 }
    }
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self { max_blocks: 20 }
    }
}

/// Weights used by the task scorer, with defaults merged in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub priority_high: f64,
    pub due_today: f64,
    pub due_tomorrow: f64,
    pub revenue_tag: f64,
    pub short_estimate: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            priority_high: 3.0,
            due_today: 3.0,
            due_tomorrow: 2.0,
            revenue_tag: 2.0,
            short_estimate: 1.0,
        }
    }
}

impl ScoringWeights {
    fn from_map(weights: &HashMap<String, f64>) -> AppResult<Self> {
        let defaults = Self::default();
        let pick = |key: &str, fallback: f64| -> AppResult<f64> {
            match weights.get(key) {
                Some(value) if value.is_finite() => Ok(*value),
                Some(value) => Err(AppError::configuration_with_details(
                    "scoring weight must be a finite number",
                    json!({"weight": key, "value": value.to_string()}),
                )),
                None => Ok(fallback),
            }
        };

        Ok(Self {
            priority_high: pick(WEIGHT_PRIORITY_HIGH, defaults.priority_high)?,
            due_today: pick(WEIGHT_DUE_TODAY, defaults.due_today)?,
            due_tomorrow: pick(WEIGHT_DUE_TOMORROW, defaults.due_tomorrow)?,
            revenue_tag: pick(WEIGHT_REVENUE_TAG, defaults.revenue_tag)?,
            short_estimate: pick(WEIGHT_SHORT_ESTIMATE, defaults.short_estimate)?,
        })
    }
}

/// Settings validated and converted once at the start of a planning call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub timezone: Tz,
    pub workday_start: NaiveTime,
    pub workday_end: NaiveTime,
    pub prep_minutes: i64,
    pub post_minutes: i64,
    pub min_block_minutes: i64,
    pub quick_win_max_minutes: i64,
    pub deep_work_min_minutes: i64,
    pub max_blocks: usize,
    pub weights: ScoringWeights,
}

impl PlannerSettings {
    pub fn resolve(&self) -> AppResult<ResolvedSettings> {
        let timezone = self.timezone.trim().parse::<Tz>().map_err(|err| {
            AppError::configuration_with_details(
                "unknown timezone",
                json!({"timezone": self.timezone, "error": err.to_string()}),
            )
        })?;

        let workday_start = parse_hhmm("workingHours.start", &self.working_hours.start)?;
        let workday_end = parse_hhmm("workingHours.end", &self.working_hours.end)?;
        if workday_start >= workday_end {
            return Err(AppError::configuration_with_details(
                "working hours must start before they end",
                json!({"start": self.working_hours.start, "end": self.working_hours.end}),
            ));
        }

        let max_blocks = ensure_non_negative("plan.maxBlocks", self.plan.max_blocks)?;

        Ok(ResolvedSettings {
            timezone,
            workday_start,
            workday_end,
            prep_minutes: ensure_non_negative("buffers.prepMinutes", self.buffers.prep_minutes)?,
            post_minutes: ensure_non_negative("buffers.postMinutes", self.buffers.post_minutes)?,
            min_block_minutes: ensure_non_negative(
                "blocks.minBlockMinutes",
                self.blocks.min_block_minutes,
            )?,
            quick_win_max_minutes: ensure_non_negative(
                "quickWins.maxMinutes",
                self.quick_wins.max_minutes,
            )?,
            deep_work_min_minutes: ensure_non_negative(
                "deepWork.minMinutes",
                self.deep_work.min_minutes,
            )?,
            max_blocks: usize::try_from(max_blocks).map_err(|_| {
                AppError::configuration("plan.maxBlocks does not fit in memory")
            })?,
            weights: ScoringWeights::from_map(&self.scoring.weights)?,
        })
    }
}

impl ResolvedSettings {
    pub fn working_minutes(&self) -> i64 {
        (self.workday_end - self.workday_start).num_minutes()
    }
}

fn parse_hhmm(field: &str, value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        AppError::configuration_with_details(
            "time of day must use HH:mm",
            json!({"field": field, "value": value, "error": err.to_string()}),
        )
    })
}

fn ensure_non_negative(field: &str, value: i64) -> AppResult<i64> {
    if value < 0 {
        Err(AppError::configuration_with_details(
            "minute values must not be negative",
            json!({"field": field, "value": value}),
        ))
    } else {
        Ok(value)
    }
}
