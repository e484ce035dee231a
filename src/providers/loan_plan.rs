//! Rule-based checks for loan product planning.
//!
//! All rules come from [`PlanningRules`], built once at startup and shared
//! read-only.

use super::{bind, text};
use crate::tools::{ParamSpec, ParamType, ToolDef, ToolProvider};
use crate::types::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const CORE_SYSTEM_UPGRADE: &str = "Core system upgrade";
pub const FLASH_LOAN: &str = "Flash Loan";
pub const TECHNOLOGY_TEAM: &str = "Technology Team";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Static planning knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningRules {
    /// System change -> systems it directly depends on.
    pub dependency_graph: BTreeMap<String, Vec<String>>,
    /// Technology team is booked until this date.
    pub conflict_end_date: NaiveDate,
    /// Largest target amount the risk model was validated for.
    pub risk_threshold: f64,
    pub default_regulation: String,
}

impl Default for PlanningRules {
    fn default() -> Self {
        let mut dependency_graph = BTreeMap::new();
        dependency_graph.insert(
            CORE_SYSTEM_UPGRADE.to_string(),
            vec![
                "Risk model integration".to_string(),
                "Channel interface development".to_string(),
            ],
        );
        dependency_graph.insert(
            "Credit bureau interface".to_string(),
            vec!["Anti-fraud system integration".to_string()],
        );
        dependency_graph.insert(
            "Risk model integration".to_string(),
            vec!["Data platform integration".to_string()],
        );

        Self {
            dependency_graph,
            conflict_end_date: NaiveDate::from_ymd_opt(2023, 11, 10).unwrap_or_default(),
            risk_threshold: 30_000_000.0,
            default_regulation: "Small and Micro Enterprise Loan Management Measures".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheckResult {
    pub success: bool,
    pub issues: Vec<String>,
    pub suggested_fix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResult {
    pub success: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchedulerResult {
    pub success: bool,
    /// Earliest date the team is free; `None` when available now.
    pub available_date: Option<String>,
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDependencyResult {
    pub success: bool,
    pub critical_path: Vec<String>,
    pub historical_issues: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoanProductPlanProvider {
    rules: Arc<PlanningRules>,
}

impl LoanProductPlanProvider {
    pub const COMPONENT_ID: &'static str = "loan_product_plan_provider";

    pub fn new(rules: Arc<PlanningRules>) -> Self {
        Self { rules }
    }

    /// Flags approval-time and interest-rate steps that break the regulation.
    /// An empty regulation falls back to the default one.
    pub fn compliance_check(&self, plan_step: &str, regulation: &str) -> ComplianceCheckResult {
        let regulation = if regulation.is_empty() {
            self.rules.default_regulation.as_str()
        } else {
            regulation
        };
        let step = plan_step.to_lowercase();

        if step.contains("approval time limit") && !step.contains("5 working days") {
            return ComplianceCheckResult {
                success: false,
                issues: vec![format!(
                    "Approval time limit violates Article 15 of the {}",
                    regulation
                )],
                suggested_fix: "Limit the approval time to at most 5 working days".to_string(),
            };
        }

        if step.contains("interest rate") && !step.contains("lpr+150bp") {
            return ComplianceCheckResult {
                success: false,
                issues: vec!["Interest rate setting exceeds the regulatory cap".to_string()],
                suggested_fix: "Keep the interest rate at or below LPR+150BP".to_string(),
            };
        }

        ComplianceCheckResult {
            success: true,
            issues: Vec::new(),
            suggested_fix: String::new(),
        }
    }

    pub fn default_compliance_check(&self, plan_step: &str) -> ComplianceCheckResult {
        self.compliance_check(plan_step, &self.rules.default_regulation)
    }

    pub fn risk_assessment(&self, product_type: &str, target_amount: f64) -> RiskAssessmentResult {
        if product_type == FLASH_LOAN && target_amount > self.rules.risk_threshold {
            return RiskAssessmentResult {
                success: false,
                issues: vec![
                    "Target amount exceeds the validated range of the risk model".to_string(),
                ],
                suggestions: vec![format!(
                    "Roll out in phases with a first-phase target of {:.0}",
                    self.rules.risk_threshold
                )],
            };
        }

        RiskAssessmentResult {
            success: true,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Fails on empty arguments or a start date not in `yyyy-MM-dd` form.
    pub fn resource_scheduler(
        &self,
        team: &str,
        required_tasks: &str,
        start_date: &str,
    ) -> Result<ResourceSchedulerResult> {
        if team.is_empty() {
            return Err(Error::invocation("team must not be empty"));
        }
        if required_tasks.is_empty() {
            return Err(Error::invocation("required tasks must not be empty"));
        }
        if start_date.is_empty() {
            return Err(Error::invocation("start date must not be empty"));
        }

        let start = NaiveDate::parse_from_str(start_date, DATE_FORMAT).map_err(|e| {
            Error::invocation(format!(
                "start date '{}' must be formatted as yyyy-MM-dd: {}",
                start_date, e
            ))
        })?;

        if team == TECHNOLOGY_TEAM
            && required_tasks.to_lowercase().contains("system upgrade")
            && start < self.rules.conflict_end_date
        {
            tracing::debug!(team, %start, "Resource conflict");
            return Ok(ResourceSchedulerResult {
                success: false,
                available_date: Some(
                    self.rules.conflict_end_date.format(DATE_FORMAT).to_string(),
                ),
                conflicts: vec!["Core system upgrade project occupies the resources".to_string()],
            });
        }

        Ok(ResourceSchedulerResult {
            success: true,
            available_date: None,
            conflicts: Vec::new(),
        })
    }

    /// Union of direct dependencies, sorted and deduplicated.
    pub fn system_dependency(
        &self,
        system_changes: Option<&[String]>,
    ) -> Result<SystemDependencyResult> {
        let changes =
            system_changes.ok_or_else(|| Error::invocation("system changes must not be empty"))?;

        let critical_path: BTreeSet<&String> = changes
            .iter()
            .filter_map(|change| self.rules.dependency_graph.get(change))
            .flatten()
            .collect();

        let mut historical_issues = Vec::new();
        if changes.iter().any(|c| c == CORE_SYSTEM_UPGRADE) {
            historical_issues.push(
                "Core system upgrades often disturb other modules through table structure changes"
                    .to_string(),
            );
        }

        Ok(SystemDependencyResult {
            success: true,
            critical_path: critical_path.into_iter().cloned().collect(),
            historical_issues,
        })
    }
}

impl ToolProvider for LoanProductPlanProvider {
    fn component_id(&self) -> &str {
        Self::COMPONENT_ID
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn tools(&self) -> Result<Vec<ToolDef>> {
        let plan_step = || text("plan_step", "Planning step to check");

        Ok(vec![
            ToolDef::new(
                "compliance_check",
                "Check a loan product planning step against a regulation",
                bind(self, |p: Self, args| async move {
                    let result = p.compliance_check(args.text(0)?, args.text(1)?);
                    Ok(serde_json::to_value(result)?)
                }),
            )
            .param(plan_step())
            .param(text("regulation", "Applicable regulation")),
            ToolDef::new(
                "default_compliance_check",
                "Check a loan product planning step against the default regulation",
                bind(self, |p: Self, args| async move {
                    Ok(serde_json::to_value(p.default_compliance_check(args.text(0)?))?)
                }),
            )
            .param(plan_step()),
            ToolDef::new(
                "risk_assessment",
                "Assess the risk of a loan product",
                bind(self, |p: Self, args| async move {
                    let result = p.risk_assessment(args.text(0)?, args.f64(1)?);
                    Ok(serde_json::to_value(result)?)
                }),
            )
            .param(text("product_type", "Product type"))
            .param(
                ParamSpec::new(ParamType::Double)
                    .named("target_amount")
                    .described("Target lending amount"),
            ),
            ToolDef::new(
                "resource_scheduler",
                "Check technical resource availability",
                bind(self, |p: Self, args| async move {
                    let (team, tasks) = (args.text(0)?, args.text(1)?);
                    let result = p.resource_scheduler(team, tasks, args.text(2)?)?;
                    Ok(serde_json::to_value(result)?)
                }),
            )
            .param(text("team", "Team to coordinate"))
            .param(text("required_tasks", "Tasks to complete"))
            .param(text("start_date", "Planned start date (yyyy-MM-dd)")),
            ToolDef::new(
                "system_dependency",
                "Analyse dependencies of planned system changes",
                bind(self, |p: Self, args| async move {
                    let changes = args.string_list(0)?;
                    let result = p.system_dependency(changes.as_deref())?;
                    Ok(serde_json::to_value(result)?)
                }),
            )
            .param(
                ParamSpec::new(ParamType::StringList)
                    .named("system_changes")
                    .described("Planned system changes"),
            ),
        ])
    }
}
