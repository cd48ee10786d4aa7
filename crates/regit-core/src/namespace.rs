//! Names of the transient branches the tool creates for itself.
//!
//! Every such branch lives below [`RESERVED_PREFIX`]; constructing and
//! recognizing them goes through [`ReservedBranch`].

use crate::constants::RESERVED_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKind {
    /// Base head plus all merged dependencies (`regit/base/<branch>`).
    Integration,
    /// Disposable copy of the branch being rebased (`regit/tmp/<branch>`).
    Workspace,
    /// Default export target (`regit/export/<branch>`).
    Export,
}

impl ReservedKind {
    const fn segment(self) -> &'static str {
        match self {
            Self::Integration => "base",
            Self::Workspace => "tmp",
            Self::Export => "export",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "base" => Some(Self::Integration),
            "tmp" => Some(Self::Workspace),
            "export" => Some(Self::Export),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservedBranch {
    kind: ReservedKind,
    owner: String,
}

impl ReservedBranch {
    pub fn integration(owner: impl Into<String>) -> Self {
        Self::new(ReservedKind::Integration, owner)
    }

    pub fn workspace(owner: impl Into<String>) -> Self {
        Self::new(ReservedKind::Workspace, owner)
    }

    pub fn export(owner: impl Into<String>) -> Self {
        Self::new(ReservedKind::Export, owner)
    }

    fn new(kind: ReservedKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
        }
    }

    /// Parse a branch name created by [`ReservedBranch::name`].
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(RESERVED_PREFIX)?;
        let (segment, owner) = rest.split_once('/')?;
        if owner.is_empty() {
            return None;
        }
        ReservedKind::from_segment(segment).map(|kind| Self::new(kind, owner))
    }

    /// True for any name inside the reserved namespace, parseable or not.
    pub fn is_reserved(name: &str) -> bool {
        name.starts_with(RESERVED_PREFIX)
    }

    pub fn kind(&self) -> ReservedKind {
        self.kind
    }

    /// The user branch this transient branch belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> String {
        format!("{RESERVED_PREFIX}{}/{}", self.kind.segment(), self.owner)
    }

    /// Full ref name, as recorded by git in `rebase-merge/head-name`.
    pub fn ref_name(&self) -> String {
        format!("refs/heads/{}", self.name())
    }
}

impl std::fmt::Display for ReservedBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_reserved_layout() {
        assert_eq!(
            ReservedBranch::integration("feat/auth").name(),
            "regit/base/feat/auth"
        );
        assert_eq!(ReservedBranch::workspace("feature").name(), "regit/tmp/feature");
        assert_eq!(
            ReservedBranch::export("feature").ref_name(),
            "refs/heads/regit/export/feature"
        );
    }

    #[test]
    fn parse_recovers_kind_and_owner() {
        let parsed = ReservedBranch::parse("regit/tmp/feat/auth").unwrap();
        assert_eq!(parsed.kind(), ReservedKind::Workspace);
        assert_eq!(parsed.owner(), "feat/auth");
        assert_eq!(parsed, ReservedBranch::workspace("feat/auth"));
    }

    #[test]
    fn parse_rejects_user_branches() {
        assert!(ReservedBranch::parse("feature").is_none());
        assert!(ReservedBranch::parse("regit/unknown/feature").is_none());
        assert!(ReservedBranch::parse("regit/base/").is_none());
        assert!(ReservedBranch::parse("myregit/base/x").is_none());
    }

    #[test]
    fn reserved_check_covers_whole_prefix() {
        assert!(ReservedBranch::is_reserved("regit/anything"));
        assert!(!ReservedBranch::is_reserved("regit"));
        assert!(!ReservedBranch::is_reserved("feature/regit/base/x"));
    }
}
