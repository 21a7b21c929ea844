//! Structural agent validation, run before deployment.

use crate::agent::Agent;
use praxis_core::{ConditionDetermination, ValidationCode};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub code: ValidationCode,
    pub severity: Severity,
    pub message: String,
    /// The action or goal the issue points at, when there is one.
    pub subject: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            subject: None,
        }
    }

    pub fn warning(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "valid");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", issue.code, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Keys whose value is decided at runtime rather than by action effects:
/// binding conditions, execution markers, named conditions, and anything
/// explicitly settable.
fn runtime_determined(agent: &Agent, key: &str) -> bool {
    key.contains(':')
        || key.starts_with(crate::determiner::HAS_RUN_PREFIX)
        || agent.condition(key).is_some()
}

pub fn validate_agent(agent: &Agent) -> ValidationReport {
    let mut report = ValidationReport::default();
    let system = agent.planning_system();

    if system.actions.is_empty() && system.goals.is_empty() {
        report.add(ValidationIssue::error(
            ValidationCode::EmptyAgent,
            format!("agent `{}` declares no actions and no goals", agent.name),
        ));
        return report;
    }
    if system.goals.is_empty() {
        report.add(ValidationIssue::error(
            ValidationCode::MissingGoals,
            format!("agent `{}` declares no goals", agent.name),
        ));
    }
    if system.actions.is_empty() && !system.goals.is_empty() {
        report.add(ValidationIssue::error(
            ValidationCode::NoActionsToGoals,
            format!("agent `{}` has goals but no actions to reach them", agent.name),
        ));
    }
    if let Some(name) = system.duplicate_action_name() {
        report.add(
            ValidationIssue::error(
                ValidationCode::DuplicateActionName,
                format!("action name `{name}` is declared more than once"),
            )
            .with_subject(name),
        );
    }

    // Effect coverage: which (condition, value) pairs any action can produce.
    let achievable: HashSet<(&str, ConditionDetermination)> = system
        .actions
        .iter()
        .flat_map(|action| {
            action
                .effects
                .iter()
                .map(|(key, value)| (key.as_str(), *value))
        })
        .collect();

    for goal in &system.goals {
        for (key, value) in &goal.preconditions {
            if runtime_determined(agent, key) {
                continue;
            }
            if !achievable.contains(&(key.as_str(), *value)) && !system.actions.is_empty() {
                report.add(
                    ValidationIssue::warning(
                        ValidationCode::NoPathToGoal,
                        format!(
                            "no action effect can make `{key}` {value} for goal `{}`",
                            goal.name
                        ),
                    )
                    .with_subject(goal.name.clone()),
                );
            }
        }
    }

    for action in &system.actions {
        for (key, value) in &action.preconditions {
            if runtime_determined(agent, key) {
                continue;
            }
            if !achievable.contains(&(key.as_str(), *value)) {
                report.add(
                    ValidationIssue::warning(
                        ValidationCode::MissingPrecondition,
                        format!(
                            "precondition `{key}` = {value} of action `{}` is never produced; \
                             it must hold in the initial state",
                            action.name
                        ),
                    )
                    .with_subject(action.name.clone()),
                );
            }
        }
    }

    report
}
