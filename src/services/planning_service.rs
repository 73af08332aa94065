use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::plan::{ContextPack, DailyPlanResponse};
use crate::services::daily_planner::HeuristicPlanner;
use crate::services::plan_assembler;
use crate::services::schedule_utils::{self, WorkingWindow};

const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(20);

/// A plan producer other than the heuristic engine, such as an optimizer
/// service or a language model. Building its request and parsing its reply
/// happen on the implementor's side.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, context: &ContextPack) -> AppResult<DailyPlanResponse>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum PlanSource {
    External(String),
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub plan: DailyPlanResponse,
    pub source: PlanSource,
}

/// Tries each registered generator in order and falls back to the heuristic
/// engine when none of them returns a usable plan.
#[derive(Clone)]
pub struct PlanningService {
    heuristic: HeuristicPlanner,
    generators: Vec<Arc<dyn PlanGenerator>>,
    timeout: Duration,
}

impl Default for PlanningService {
    fn default() -> Self {
        Self::new(HeuristicPlanner::new())
    }
}

impl PlanningService {
    pub fn new(heuristic: HeuristicPlanner) -> Self {
        Self {
            heuristic,
            generators: Vec::new(),
            timeout: DEFAULT_GENERATOR_TIMEOUT,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn PlanGenerator>) -> Self {
        self.generators.push(generator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate_plan(&self, context: &ContextPack) -> AppResult<PlanOutcome> {
        let settings = context.settings.resolve()?;
        let plan_date = schedule_utils::parse_date(&context.date)?;
        let window = WorkingWindow::for_day(plan_date, &settings)?;

        let mut warnings = Vec::new();
        for generator in &self.generators {
            let name = generator.name().to_string();
            debug!(target: "planner::service", planner = %name, "trying external planner");

            let result = match tokio::time::timeout(self.timeout, generator.generate(context)).await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::timeout(
                    name.clone(),
                    u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };

            match result {
                Ok(plan) => {
                    let violations =
                        plan_assembler::audit_plan(&plan, &context.events, &settings, window);
                    if violations.is_empty() {
                        info!(
                            target: "planner::service",
                            planner = %name,
                            blocks = plan.blocks.len(),
                            "external plan accepted"
                        );
                        return Ok(PlanOutcome {
                            plan,
                            source: PlanSource::External(name),
                        });
                    }
                    warn!(
                        target: "planner::service",
                        planner = %name,
                        violations = violations.len(),
                        first = %violations[0].message,
                        "external plan rejected"
                    );
                    warnings.push(format!("{name} returned an invalid plan"));
                }
                Err(AppError::Timeout { .. }) => {
                    warnings.push(format!("{name} timed out"));
                }
                Err(err) => {
                    warnings.push(format!("{name} error: {}", failure_message(&err)));
                }
            }
        }

        let mut plan = self.heuristic.generate_with(context, &settings)?;
        plan.warnings.extend(warnings);
        Ok(PlanOutcome {
            plan,
            source: PlanSource::Heuristic,
        })
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Planner { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
