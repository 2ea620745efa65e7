//! Ensemble roster and decision settings from TOML (`[ensemble]` section)
//!
//! ```toml
//! [ensemble]
//! workers = ["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.5-flash-lite"]
//! judge = "gemini-2.5-pro"
//! primary = "gemini-2.5-flash"     # preferred fallback when the judge fails
//! mode = "ensemble"                # or "single"
//! rule = "atleast:2"               # or "majority", "unanimous", "75%"
//! single_min_confidence = 80
//!
//! [ensemble.reliability]
//! max_letters = 4
//! confidence_cap = 40
//! scale_with_options = false
//! ```

use ensemble_domain::{
    ConfigIssue, ConfigIssueCode, Model, QuorumRule, ReliabilityPolicy, ResolutionMode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEnsembleConfig {
    /// Worker models, in roster order
    pub workers: Vec<String>,
    /// Judge model, consulted on disagreement
    pub judge: String,
    /// Preferred fallback worker
    pub primary: Option<String>,
    /// Second preferred fallback worker
    pub secondary: Option<String>,
    /// "ensemble" or "single"
    pub mode: String,
    /// Agreement rule: "atleast:N", "majority", "unanimous", "N%"
    pub rule: String,
    /// Single mode answers alone at or above this confidence
    pub single_min_confidence: u8,
    pub reliability: FileReliabilityConfig,
}

impl Default for FileEnsembleConfig {
    fn default() -> Self {
        Self {
            workers: Model::default_workers()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            judge: Model::default_judge().to_string(),
            primary: None,
            secondary: None,
            mode: ResolutionMode::default().to_string(),
            rule: QuorumRule::default().as_config_str(),
            single_min_confidence: 80,
            reliability: FileReliabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReliabilityConfig {
    pub max_letters: usize,
    pub confidence_cap: u8,
    pub scale_with_options: bool,
}

impl Default for FileReliabilityConfig {
    fn default() -> Self {
        let policy = ReliabilityPolicy::default();
        Self {
            max_letters: policy.max_letters,
            confidence_cap: policy.confidence_cap,
            scale_with_options: policy.scale_with_options,
        }
    }
}

impl FileReliabilityConfig {
    pub fn to_policy(&self) -> ReliabilityPolicy {
        ReliabilityPolicy {
            max_letters: self.max_letters.max(1),
            confidence_cap: self.confidence_cap.min(100),
            scale_with_options: self.scale_with_options,
        }
    }
}

impl FileEnsembleConfig {
    fn parse_single_model(field: &str, value: Option<&str>) -> (Option<Model>, Vec<ConfigIssue>) {
        match value {
            None => (None, Vec::new()),
            Some(s) if s.trim().is_empty() => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName,
                    format!("ensemble.{}: model name cannot be empty", field),
                )],
            ),
            Some(s) => (Some(Model::from(s)), Vec::new()),
        }
    }

    /// Parse worker names in order, reporting empty names and duplicates
    pub fn parse_workers(&self) -> (Vec<Model>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut workers: Vec<Model> = Vec::new();

        for name in &self.workers {
            if name.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName,
                    "ensemble.workers: model name cannot be empty in list",
                ));
                continue;
            }
            let model = Model::from(name.as_str());
            if workers.contains(&model) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateWorker,
                    format!("ensemble.workers: '{}' is listed more than once", model),
                ));
                continue;
            }
            workers.push(model);
        }

        if workers.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyRoster,
                "ensemble.workers: at least one worker model is required",
            ));
        }

        (workers, issues)
    }

    pub fn parse_judge(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        Self::parse_single_model("judge", Some(self.judge.as_str()))
    }

    pub fn parse_primary(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        Self::parse_single_model("primary", self.primary.as_deref())
    }

    pub fn parse_secondary(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        Self::parse_single_model("secondary", self.secondary.as_deref())
    }

    pub fn parse_mode(&self) -> (ResolutionMode, Vec<ConfigIssue>) {
        match self.mode.parse() {
            Ok(mode) => (mode, Vec::new()),
            Err(e) => (
                ResolutionMode::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownMode,
                    format!("ensemble.mode: {}", e),
                )],
            ),
        }
    }

    pub fn parse_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.rule.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(e) => (
                QuorumRule::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownRule,
                    format!("ensemble.rule: {}", e),
                )],
            ),
        }
    }

    /// Cross-field checks: judge independence, fallback designations, rule reachability
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (workers, mut issues) = self.parse_workers();
        let (judge, judge_issues) = self.parse_judge();
        let (primary, primary_issues) = self.parse_primary();
        let (secondary, secondary_issues) = self.parse_secondary();
        let (rule, rule_issues) = self.parse_rule();
        issues.extend(judge_issues);
        issues.extend(primary_issues);
        issues.extend(secondary_issues);
        issues.extend(self.parse_mode().1);
        issues.extend(rule_issues.iter().cloned());

        if let Some(judge) = &judge
            && workers.contains(judge)
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::JudgeIsWorker,
                format!(
                    "ensemble.judge: '{}' is also a worker, so its arbitration is not independent",
                    judge
                ),
            ));
        }

        if let Some(primary) = &primary
            && !workers.contains(primary)
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::PrimaryNotWorker,
                format!("ensemble.primary: '{}' is not a worker and will never be used", primary),
            ));
        }

        if let Some(secondary) = &secondary
            && !workers.contains(secondary)
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::SecondaryNotWorker,
                format!(
                    "ensemble.secondary: '{}' is not a worker and will never be used",
                    secondary
                ),
            ));
        }

        if rule_issues.is_empty() && !workers.is_empty() {
            let needed = rule.min_agreement_needed(workers.len());
            if needed > workers.len() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnreachableRule,
                    format!(
                        "ensemble.rule: {} needs {} agreeing workers but only {} are configured",
                        rule.as_config_str(),
                        needed,
                        workers.len()
                    ),
                ));
            }
        }

        issues
    }
}
