use serde::{Deserialize, Serialize};

/// Persisted dependency information of one branch.
///
/// A record missing `base` or `rebase_tip` still parses; hydration reports
/// the gap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebase_tip: Option<String>,
    #[serde(default, alias = "pr", skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

impl DependencyRecord {
    pub fn new(
        base: impl Into<String>,
        deps: Vec<String>,
        rebase_tip: impl Into<String>,
    ) -> Self {
        Self {
            base: Some(base.into()),
            deps,
            rebase_tip: Some(rebase_tip.into()),
            external_reference: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationAction {
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationPhase {
    Merge,
    Rebase,
}

impl OperationPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Rebase => "rebase",
        }
    }
}

impl std::fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single in-flight operation, written when a merge or rebase stops on
/// a conflict and consumed by `--continue` / `--abort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub action: OperationAction,
    pub phase: OperationPhase,
    pub branch: String,
    pub base: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(default)]
    pub already_done: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_rebase_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

impl OperationState {
    pub fn merge(
        branch: impl Into<String>,
        base: impl Into<String>,
        deps: Vec<String>,
        conflict: impl Into<String>,
        already_done: Vec<String>,
    ) -> Self {
        Self {
            action: OperationAction::Update,
            phase: OperationPhase::Merge,
            branch: branch.into(),
            base: base.into(),
            deps,
            conflict: Some(conflict.into()),
            already_done,
            new_rebase_tip: None,
            started_at: Some(crate::time::now_iso8601()),
        }
    }

    pub fn rebase(
        branch: impl Into<String>,
        base: impl Into<String>,
        deps: Vec<String>,
        new_rebase_tip: impl Into<String>,
    ) -> Self {
        Self {
            action: OperationAction::Update,
            phase: OperationPhase::Rebase,
            branch: branch.into(),
            base: base.into(),
            deps,
            conflict: None,
            already_done: Vec::new(),
            new_rebase_tip: Some(new_rebase_tip.into()),
            started_at: Some(crate::time::now_iso8601()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_pr_key_reads_as_external_reference() {
        let record: DependencyRecord = serde_json::from_str(
            r##"{"base": "master", "deps": ["lib"], "rebase_tip": "abc", "pr": "#42"}"##,
        )
        .unwrap();
        assert_eq!(record.external_reference.as_deref(), Some("#42"));
        assert_eq!(record.deps, vec!["lib".to_string()]);
    }

    #[test]
    fn record_without_base_still_parses() {
        let record: DependencyRecord = serde_json::from_str(r#"{"deps": []}"#).unwrap();
        assert!(record.base.is_none());
        assert!(record.rebase_tip.is_none());
    }

    #[test]
    fn operation_state_uses_lowercase_tags() {
        let state = OperationState::merge("feature", "main", vec!["lib".into()], "lib", vec![]);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["action"], "update");
        assert_eq!(json["phase"], "merge");
        assert_eq!(json["conflict"], "lib");
        assert!(json.get("new_rebase_tip").is_none());
    }

    #[test]
    fn unknown_phase_is_rejected() {
        let parsed: Result<OperationState, _> = serde_json::from_str(
            r#"{"action": "update", "phase": "cherry-pick", "branch": "a", "base": "b"}"#,
        );
        assert!(parsed.is_err());
    }
}
