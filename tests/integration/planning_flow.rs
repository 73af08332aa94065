use myday_planner_lib::error::AppResult;
use myday_planner_lib::models::calendar::{CalendarEvent, EventStatus};
use myday_planner_lib::models::plan::{BlockStatus, BlockType, ContextPack};
use myday_planner_lib::models::settings::PlannerSettings;
use myday_planner_lib::models::task::{Task, TaskPriority, TaskStatus};
use myday_planner_lib::services::daily_planner::HeuristicPlanner;
use myday_planner_lib::services::plan_assembler::HEURISTIC_WARNING;

fn office_hours() -> PlannerSettings {
    let mut settings = PlannerSettings::default();
    settings.working_hours.start = "09:00".into();
    settings.working_hours.end = "17:00".into();
    settings
}

fn meeting(id: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        title: format!("Meeting {id}"),
        start: start.into(),
        end: end.into(),
        all_day: false,
        status: EventStatus::Confirmed,
    }
}

fn task(id: &str, priority: TaskPriority, estimate: Option<i64>) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        priority,
        due_date: None,
        estimate_minutes: estimate,
        tags: Vec::new(),
        status: TaskStatus::Open,
    }
}

#[test]
fn quick_win_before_meeting_and_focus_after_it() -> AppResult<()> {
    let mut settings = office_hours();
    settings.buffers.prep_minutes = 10;
    settings.buffers.post_minutes = 0;
    settings.quick_wins.max_minutes = 30;

    let context = ContextPack {
        date: "2025-05-01".into(),
        settings,
        events: vec![meeting("standup", "2025-05-01T10:00:00Z", "2025-05-01T10:30:00Z")],
        tasks: vec![
            task("report", TaskPriority::H, Some(20)),
            task("roadmap", TaskPriority::M, Some(90)),
        ],
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    let layout: Vec<(BlockType, &str, &str, Option<&str>)> = plan
        .blocks
        .iter()
        .map(|block| {
            (
                block.block_type,
                block.start.as_str(),
                block.end.as_str(),
                block.task_id(),
            )
        })
        .collect();

    assert_eq!(
        layout,
        vec![
            (
                BlockType::Quickwin,
                "2025-05-01T09:00:00+00:00",
                "2025-05-01T09:20:00+00:00",
                Some("report")
            ),
            (
                BlockType::Meeting,
                "2025-05-01T10:00:00+00:00",
                "2025-05-01T10:30:00+00:00",
                None
            ),
            (
                BlockType::Focus,
                "2025-05-01T10:30:00+00:00",
                "2025-05-01T12:00:00+00:00",
                Some("roadmap")
            ),
        ]
    );
    assert_eq!(plan.summary.meetings_count, 1);
    assert_eq!(plan.summary.free_minutes, 8 * 60 - 40);
    assert_eq!(plan.summary.critical_count, 1);
    Ok(())
}

#[test]
fn meetings_only_when_there_are_no_tasks() -> AppResult<()> {
    let context = ContextPack {
        date: "2025-05-01".into(),
        settings: office_hours(),
        events: vec![
            meeting("a", "2025-05-01T10:00:00Z", "2025-05-01T11:00:00Z"),
            meeting("b", "2025-05-01T14:00:00Z", "2025-05-01T14:30:00Z"),
        ],
        tasks: Vec::new(),
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    assert_eq!(plan.blocks.len(), 2);
    assert!(plan
        .blocks
        .iter()
        .all(|block| block.block_type == BlockType::Meeting && block.status == BlockStatus::Fixed));
    // default buffers are 10 minutes before and 5 after
    assert_eq!(plan.summary.free_minutes, 8 * 60 - (75 + 45));
    assert_eq!(plan.summary.meetings_count, 2);
    assert_eq!(plan.summary.critical_count, 0);
    Ok(())
}

#[test]
fn meetings_fill_the_block_cap_first() -> AppResult<()> {
    let mut settings = office_hours();
    settings.plan.max_blocks = 1;
    let context = ContextPack {
        date: "2025-05-01".into(),
        settings,
        events: vec![
            meeting("a", "2025-05-01T10:00:00Z", "2025-05-01T11:00:00Z"),
            meeting("b", "2025-05-01T14:00:00Z", "2025-05-01T14:30:00Z"),
        ],
        tasks: vec![
            task("one", TaskPriority::H, Some(60)),
            task("two", TaskPriority::H, Some(60)),
        ],
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    let meetings = plan
        .blocks
        .iter()
        .filter(|block| block.block_type == BlockType::Meeting)
        .count();
    let suggested = plan
        .blocks
        .iter()
        .filter(|block| block.status == BlockStatus::Suggested)
        .count();
    // meetings are kept even past the cap, and nothing else is added
    assert_eq!(meetings, 2);
    assert_eq!(suggested, 0);
    Ok(())
}

#[test]
fn block_cap_counts_meetings_and_tasks_together() -> AppResult<()> {
    let mut settings = office_hours();
    settings.plan.max_blocks = 2;
    let context = ContextPack {
        date: "2025-05-01".into(),
        settings,
        events: vec![meeting("m", "2025-05-01T12:00:00Z", "2025-05-01T13:00:00Z")],
        tasks: vec![
            task("a", TaskPriority::H, Some(60)),
            task("b", TaskPriority::H, Some(60)),
            task("c", TaskPriority::H, Some(60)),
        ],
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    let ids: Vec<&str> = plan.blocks.iter().map(|block| block.id.as_str()).collect();
    assert_eq!(plan.blocks.len(), 2);
    assert_eq!(ids, vec!["focus-a", "meeting-m"]);
    Ok(())
}

#[test]
fn overlapping_meetings_each_reduce_free_minutes() -> AppResult<()> {
    let mut settings = PlannerSettings::default();
    settings.buffers.prep_minutes = 0;
    settings.buffers.post_minutes = 0;
    let context = ContextPack {
        date: "2025-05-01".into(),
        settings,
        events: vec![
            meeting("a", "2025-05-01T10:00:00Z", "2025-05-01T11:00:00Z"),
            meeting("b", "2025-05-01T10:30:00Z", "2025-05-01T11:00:00Z"),
        ],
        tasks: Vec::new(),
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    assert_eq!(plan.summary.free_minutes, 9 * 60 - (60 + 30));
    Ok(())
}

#[test]
fn seconds_precision_meeting_leaves_no_empty_block() -> AppResult<()> {
    let mut settings = office_hours();
    settings.blocks.min_block_minutes = 0;
    settings.buffers.prep_minutes = 0;
    settings.buffers.post_minutes = 0;
    let context = ContextPack {
        date: "2025-05-01".into(),
        settings,
        events: vec![meeting("m", "2025-05-01T09:29:30Z", "2025-05-01T17:00:00Z")],
        tasks: vec![
            task("a", TaskPriority::H, Some(29)),
            task("b", TaskPriority::M, Some(5)),
        ],
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    let suggested: Vec<(&str, &str, &str)> = plan
        .blocks
        .iter()
        .filter(|block| block.status == BlockStatus::Suggested)
        .map(|block| (block.id.as_str(), block.start.as_str(), block.end.as_str()))
        .collect();
    assert_eq!(
        suggested,
        vec![(
            "focus-a",
            "2025-05-01T09:00:00+00:00",
            "2025-05-01T09:29:00+00:00"
        )]
    );
    Ok(())
}

#[test]
fn all_day_event_is_listed_but_takes_no_time() -> AppResult<()> {
    let mut holiday = meeting("holiday", "2025-05-01", "2025-05-02");
    holiday.all_day = true;
    holiday.title = "Company offsite".into();

    let context = ContextPack {
        date: "2025-05-01".into(),
        settings: office_hours(),
        events: vec![holiday],
        tasks: Vec::new(),
    };

    let plan = HeuristicPlanner::new().generate(&context)?;
    assert_eq!(plan.blocks.len(), 1);
    let block = &plan.blocks[0];
    assert_eq!(block.block_type, BlockType::Meeting);
    assert_eq!(block.confidence, 1.0);
    assert_eq!(block.relations.meeting_id.as_deref(), Some("holiday"));
    assert_eq!(plan.summary.free_minutes, 8 * 60);
    Ok(())
}

#[test]
fn json_context_produces_camel_case_plan() -> AppResult<()> {
    let context: ContextPack = serde_json::from_str(
        r#"{
            "date": "2025-05-01T00:00:00.000Z",
            "settings": {
                "workingHours": {"start": "09:00", "end": "12:00"},
                "buffers": {"prepMinutes": 0, "postMinutes": 0}
            },
            "events": [],
            "tasks": [
                {"id": "t1", "title": "Call the client", "priority": "H", "tags": ["client"], "estimateMinutes": 60},
                {"id": "t2", "title": "Archive", "status": "done"}
            ]
        }"#,
    )?;

    let plan = HeuristicPlanner::new().generate(&context)?;
    let value = serde_json::to_value(&plan)?;

    assert_eq!(value["date"], "2025-05-01");
    assert_eq!(value["summary"]["freeMinutes"], 180);
    assert_eq!(value["blocks"][0]["type"], "focus");
    assert_eq!(value["blocks"][0]["status"], "suggested");
    assert_eq!(value["blocks"][0]["relations"]["taskId"], "t1");
    assert_eq!(value["blocks"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["followUps"], serde_json::json!([]));
    assert_eq!(value["warnings"][0], HEURISTIC_WARNING);
    Ok(())
}

#[test]
fn identical_input_gives_identical_output() -> AppResult<()> {
    let mut tasks: Vec<Task> = (0..8)
        .map(|idx| {
            let priority = if idx % 3 == 0 {
                TaskPriority::H
            } else {
                TaskPriority::M
            };
            task(&format!("t{idx}"), priority, Some(10 + idx * 15))
        })
        .collect();
    tasks[2].due_date = Some("2025-05-02".into());
    tasks[5].tags = vec!["revenue".into()];

    let context = ContextPack {
        date: "2025-05-01".into(),
        settings: office_hours(),
        events: vec![
            meeting("a", "2025-05-01T09:45:00Z", "2025-05-01T10:15:00Z"),
            meeting("b", "2025-05-01T13:00:00Z", "2025-05-01T14:00:00Z"),
        ],
        tasks,
    };

    let planner = HeuristicPlanner::new();
    let first = serde_json::to_string(&planner.generate(&context)?)?;
    let second = serde_json::to_string(&planner.generate(&context)?)?;
    assert_eq!(first, second);
    Ok(())
}
