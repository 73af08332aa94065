use serde::{Deserialize, Serialize};

use crate::models::calendar::CalendarEvent;
use crate::models::settings::PlannerSettings;
use crate::models::task::Task;

/// Input snapshot for one planning call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextPack {
    /// Day to plan, `YYYY-MM-DD` or an ISO timestamp whose date part is used.
    pub date: String,
    #[serde(default)]
    pub settings: PlannerSettings,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Meeting,
    Event,
    Prep,
    Post,
    Focus,
    Followup,
    Call,
    Quickwin,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Meeting => "meeting",
            BlockType::Event => "event",
            BlockType::Prep => "prep",
            BlockType::Post => "post",
            BlockType::Focus => "focus",
            BlockType::Followup => "followup",
            BlockType::Call => "call",
            BlockType::Quickwin => "quickwin",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Suggested,
    Fixed,
    Accepted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockRelations {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub meeting_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub status: BlockStatus,
    pub start: String,
    pub end: String,
    pub title: String,
    #[serde(default)]
    pub reason: String,
    pub confidence: f32,
    #[serde(default)]
    pub relations: BlockRelations,
}

impl ScheduledBlock {
    pub fn is_fixed_meeting(&self) -> bool {
        self.block_type == BlockType::Meeting && self.status == BlockStatus::Fixed
    }

    pub fn task_id(&self) -> Option<&str> {
        self.relations.task_id.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanSummary {
    pub meetings_count: usize,
    pub free_minutes: i64,
    pub critical_count: usize,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpChannel {
    Email,
    Call,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpDraft {
    pub subject: String,
    pub body: String,
}

/// Follow-up suggestion. Only external planners produce these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanFollowUp {
    pub person_id: String,
    #[serde(default)]
    pub company_id: Option<String>,
    pub channel: FollowUpChannel,
    pub subject: String,
    pub reason: String,
    pub urgency: u8,
    #[serde(default)]
    pub suggested_window: Option<FollowUpWindow>,
    #[serde(default)]
    pub draft: Option<FollowUpDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanResponse {
    pub date: String,
    pub summary: DailyPlanSummary,
    pub blocks: Vec<ScheduledBlock>,
    #[serde(default)]
    pub follow_ups: Vec<DailyPlanFollowUp>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
