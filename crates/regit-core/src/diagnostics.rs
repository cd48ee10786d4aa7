use tracing::warn;

/// Non-fatal findings raised while loading or synchronizing branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A dependency names the branch's own base; it is dropped.
    DependsOnBase,
    /// A dependency names the branch itself; it is dropped.
    DependsOnSelf,
    /// The same dependency is declared twice; the repeat is dropped.
    DuplicateDependency,
    /// A dependency is not based on the current head of the base.
    NotRebasedOnBase,
    /// A dependency is already fully contained in the base; not merged.
    RedundantWithBase,
}

impl DiagnosticKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DependsOnBase => "depends_on_base",
            Self::DependsOnSelf => "depends_on_self",
            Self::DuplicateDependency => "duplicate_dependency",
            Self::NotRebasedOnBase => "not_rebased_on_base",
            Self::RedundantWithBase => "redundant_with_base",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub branch: String,
    pub subject: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (branch, subject) = (&self.branch, &self.subject);
        match self.kind {
            DiagnosticKind::DependsOnBase => {
                write!(f, "branch `{branch}` depends on its base branch `{subject}`")
            }
            DiagnosticKind::DependsOnSelf => write!(f, "branch `{branch}` depends on itself"),
            DiagnosticKind::DuplicateDependency => {
                write!(f, "branch `{branch}` has duplicate dependency `{subject}`")
            }
            DiagnosticKind::NotRebasedOnBase => {
                write!(f, "dependency `{subject}` of `{branch}` is not based on its base")
            }
            DiagnosticKind::RedundantWithBase => write!(
                f,
                "skipping dependency `{subject}` of `{branch}`: already part of its base"
            ),
        }
    }
}

/// Ordered list of diagnostics collected during one invocation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        branch: impl Into<String>,
        subject: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            branch: branch.into(),
            subject: subject.into(),
        };
        warn!(kind = kind.as_str(), "{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_declaration_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::DuplicateDependency, "feature", "lib");
        diagnostics.push(DiagnosticKind::DependsOnSelf, "feature", "feature");

        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::DuplicateDependency,
                DiagnosticKind::DependsOnSelf
            ]
        );
        assert!(diagnostics.contains(DiagnosticKind::DependsOnSelf));
        assert!(!diagnostics.contains(DiagnosticKind::RedundantWithBase));
    }

    #[test]
    fn redundant_dependency_message() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.push(DiagnosticKind::RedundantWithBase, "feature", "lib");
        assert_eq!(diagnostics.len(), 1);
        let first = diagnostics.iter().next().unwrap();
        assert_eq!(
            first.to_string(),
            "skipping dependency `lib` of `feature`: already part of its base"
        );
    }
}
