//! Action guard - typed rules over proposed executor actions.
//!
//! Rules are explicit predicates rather than free-form substring
//! checks, so each one can be tested on its own and a rejection names
//! the rule that caused it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use overseer_core::TaskId;

/// A proposed action submitted for validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    /// What the executor wants to do.
    pub action: String,

    /// Why, with reference to the current task.
    #[serde(default)]
    pub justification: Option<String>,

    /// Filesystem paths the action would touch.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Context the rules evaluate against.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// The orchestrator's current task, if one is assigned.
    pub current_task: Option<TaskId>,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub allowed: bool,

    /// Name of the rule that rejected the action, when not allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
}

impl Verdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            rejected_by: None,
        }
    }

    fn reject(rule: &str) -> Self {
        Self {
            allowed: false,
            rejected_by: Some(rule.to_owned()),
        }
    }
}

/// A single named predicate over an action.
pub trait ActionRule: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, action: &ActionRequest, ctx: &ActionContext) -> bool;
}

/// Requires a current task, and that the action or its justification
/// reference that task's id.
pub struct TaskScopeRule;

impl ActionRule for TaskScopeRule {
    fn name(&self) -> &str {
        "task_scope"
    }

    fn check(&self, action: &ActionRequest, ctx: &ActionContext) -> bool {
        let Some(task_id) = &ctx.current_task else {
            return false;
        };
        let id = task_id.as_str();
        action.action.contains(id)
            || action
                .justification
                .as_deref()
                .is_some_and(|j| j.contains(id))
    }
}

/// Requires a non-empty justification.
pub struct JustificationRule;

impl ActionRule for JustificationRule {
    fn name(&self) -> &str {
        "justification"
    }

    fn check(&self, action: &ActionRequest, _ctx: &ActionContext) -> bool {
        action
            .justification
            .as_deref()
            .is_some_and(|j| !j.trim().is_empty())
    }
}

/// Rejects parent-directory escapes and absolute paths.
pub struct PathConstraintRule;

impl ActionRule for PathConstraintRule {
    fn name(&self) -> &str {
        "path_constraint"
    }

    fn check(&self, action: &ActionRequest, _ctx: &ActionContext) -> bool {
        action.paths.iter().all(|p| {
            let path = std::path::Path::new(p);
            !path.is_absolute()
                && !path
                    .components()
                    .any(|c| matches!(c, std::path::Component::ParentDir))
        })
    }
}

/// Ordered rule set. Evaluation short-circuits on the first rejection.
pub struct ActionGuard {
    rules: Vec<Box<dyn ActionRule>>,
}

impl ActionGuard {
    /// Guard with no rules; everything passes.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Guard with the built-in rule set.
    pub fn with_default_rules() -> Self {
        Self {
            rules: vec![
                Box::new(JustificationRule),
                Box::new(TaskScopeRule),
                Box::new(PathConstraintRule),
            ],
        }
    }

    /// Add a rule to the end of the evaluation order.
    pub fn add_rule(&mut self, rule: Box<dyn ActionRule>) {
        self.rules.push(rule);
    }

    /// Evaluate an action against every rule in order.
    pub fn evaluate(&self, action: &ActionRequest, ctx: &ActionContext) -> Verdict {
        for rule in &self.rules {
            if !rule.check(action, ctx) {
                warn!(
                    rule = rule.name(),
                    action = %action.action,
                    "Action rejected"
                );
                return Verdict::reject(rule.name());
            }
        }
        debug!(action = %action.action, "Action validated");
        Verdict::allow()
    }
}

impl Default for ActionGuard {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
