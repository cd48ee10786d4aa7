use crate::graph::BranchId;
use crate::orchestrator::Orchestrator;
use regit_core::error::{GraphError, StateError, UpdateError};
use regit_core::namespace::ReservedBranch;
use regit_core::types::DependencyRecord;
use regit_state::RecordStore;
use regit_vcs::VcsAdapter;
use tracing::{info, warn};

/// Where `set-rebase-tip` takes the new tip from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseTipSource {
    Commit(String),
    BaseHead,
}

/// Stored information about one managed branch, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub branch: String,
    pub base: String,
    pub deps: Vec<String>,
    pub rebase_tip: String,
}

/// `123` and `#123` both become `#123`; other labels are kept verbatim.
pub fn normalize_reference(label: &str) -> String {
    let trimmed = label.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        format!("#{digits}")
    } else {
        trimmed.to_string()
    }
}

/// Branches under the reserved prefix are never valid operands.
fn refuse_reserved<'n>(names: impl IntoIterator<Item = &'n str>) -> Result<(), GraphError> {
    match names.into_iter().find(|name| ReservedBranch::is_reserved(name)) {
        Some(name) => Err(GraphError::ReservedBranch {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

impl<V: VcsAdapter, R: RecordStore> Orchestrator<'_, V, R> {
    fn current_name(&self) -> Result<String, UpdateError> {
        let id = self.current_or_detached()?;
        Ok(self.graph.name(id).to_string())
    }

    fn load_record(&self, branch: &str) -> Result<DependencyRecord, UpdateError> {
        self.records.load(branch)?.ok_or_else(|| {
            GraphError::NotManaged {
                branch: branch.to_string(),
            }
            .into()
        })
    }

    fn check_dependencies(&self, branch: &str, deps: &[String]) -> Result<(), GraphError> {
        refuse_reserved(deps.iter().map(String::as_str))?;
        for dep in deps {
            if self.graph.lookup(dep).is_none() {
                return Err(GraphError::UnknownDependency {
                    branch: branch.to_string(),
                    dependency: dep.clone(),
                });
            }
        }
        Ok(())
    }

    /// Start managing the checked-out branch.
    ///
    /// The branch must sit on the current head of `base`: its rebase tip is
    /// their merge base and nothing else is trustworthy.
    pub fn init(&mut self, base: &str, deps: &[String]) -> Result<DependencyRecord, UpdateError> {
        let branch = self.current_name()?;
        if self.records.exists(&branch) {
            return Err(StateError::RecordExists {
                path: self.records.location(&branch).display().to_string(),
            }
            .into());
        }
        refuse_reserved([base])?;
        if self.graph.lookup(base).is_none() {
            return Err(GraphError::UnknownBase {
                branch,
                base: base.to_string(),
            }
            .into());
        }
        self.check_dependencies(&branch, deps)?;

        let rebase_tip = self.vcs.merge_base(&branch, base)?;
        if rebase_tip != self.vcs.head_of(base)? {
            return Err(GraphError::NeedsRebase {
                branch,
                base: base.to_string(),
            }
            .into());
        }

        let record = DependencyRecord::new(base, deps.to_vec(), rebase_tip);
        self.records.save(&branch, &record)?;
        info!(branch = %branch, base, "initialized dependency record");
        Ok(record)
    }

    pub fn add_deps(&mut self, deps: &[String]) -> Result<DependencyRecord, UpdateError> {
        let branch = self.current_name()?;
        let mut record = self.load_record(&branch)?;
        self.check_dependencies(&branch, deps)?;
        for dep in deps {
            if record.deps.contains(dep) {
                info!(branch = %branch, dependency = %dep, "already a dependency");
            } else {
                info!(branch = %branch, dependency = %dep, "adding dependency");
                record.deps.push(dep.clone());
            }
        }
        self.records.save(&branch, &record)?;
        Ok(record)
    }

    pub fn remove_deps(&mut self, deps: &[String]) -> Result<DependencyRecord, UpdateError> {
        refuse_reserved(deps.iter().map(String::as_str))?;
        let branch = self.current_name()?;
        let mut record = self.load_record(&branch)?;
        for dep in deps {
            if !record.deps.contains(dep) {
                warn!(branch = %branch, dependency = %dep, "not a dependency");
            }
        }
        record.deps.retain(|dep| !deps.contains(dep));
        self.records.save(&branch, &record)?;
        Ok(record)
    }

    pub fn set_deps(&mut self, deps: &[String]) -> Result<DependencyRecord, UpdateError> {
        let branch = self.current_name()?;
        let mut record = self.load_record(&branch)?;
        self.check_dependencies(&branch, deps)?;
        record.deps = deps.to_vec();
        self.records.save(&branch, &record)?;
        Ok(record)
    }

    /// Operator override of the rebase tip; the only way to set it by hand.
    pub fn set_rebase_tip(&mut self, source: RebaseTipSource) -> Result<String, UpdateError> {
        let branch = self.current_name()?;
        let mut record = self.load_record(&branch)?;
        let tip = match source {
            RebaseTipSource::Commit(reference) => self
                .vcs
                .rev_parse(&reference)?
                .ok_or(GraphError::InvalidCommit { reference })?,
            RebaseTipSource::BaseHead => {
                let base = record.base.as_deref().ok_or_else(|| GraphError::MissingBase {
                    branch: branch.clone(),
                })?;
                self.vcs.head_of(base)?
            }
        };
        record.rebase_tip = Some(tip.clone());
        self.records.save(&branch, &record)?;
        info!(branch = %branch, rebase_tip = %tip, "set rebase tip");
        Ok(tip)
    }

    pub fn set_external_reference(&mut self, label: &str) -> Result<String, UpdateError> {
        let branch = self.current_name()?;
        let mut record = self.load_record(&branch)?;
        let reference = normalize_reference(label);
        if reference.is_empty() {
            return Err(UpdateError::InvalidArgument(
                "external reference must not be empty".to_string(),
            ));
        }
        record.external_reference = Some(reference.clone());
        self.records.save(&branch, &record)?;
        info!(branch = %branch, reference = %reference, "set external reference");
        Ok(reference)
    }

    /// Stored record of `id` (the checked-out branch when `None`).
    pub fn show(&mut self, id: Option<BranchId>) -> Result<BranchSummary, UpdateError> {
        let id = match id {
            Some(id) => {
                refuse_reserved([self.graph.name(id)])?;
                id
            }
            None => self.current_or_detached()?,
        };
        self.graph.hydrate(id, self.records, &mut self.diagnostics)?;
        let links = self.managed_links(id)?;
        let mut deps = Vec::with_capacity(links.deps.len());
        for dep in &links.deps {
            self.graph.hydrate(*dep, self.records, &mut self.diagnostics)?;
            deps.push(self.graph.display_name(*dep));
        }
        Ok(BranchSummary {
            branch: self.graph.display_name(id),
            base: self.graph.name(links.base).to_string(),
            deps,
            rebase_tip: links.rebase_tip,
        })
    }

    /// Delete branches and rewire the records that pointed at them.
    ///
    /// Unknown and checked-out branches are skipped. Dependents that used a
    /// deleted branch as base move to its base; if it has none the deletion
    /// is refused. Returns the branches actually deleted.
    pub fn delete_branches(&mut self, names: &[String]) -> Result<Vec<String>, UpdateError> {
        refuse_reserved(names.iter().map(String::as_str))?;
        let mut deleted = Vec::new();
        for name in names {
            let Some(id) = self.graph.lookup(name) else {
                warn!(branch = %name, "cannot delete nonexistent branch");
                continue;
            };
            if self.graph.current() == Some(id) {
                warn!(branch = %name, "cannot delete the checked-out branch");
                continue;
            }
            info!(branch = %name, "deleting branch");
            let own_base = self.records.load(name)?.and_then(|record| record.base);

            let mut rewired = Vec::new();
            let mut orphans = Vec::new();
            for other in self.vcs.all_branches()? {
                if other == *name {
                    continue;
                }
                let Some(mut record) = self.records.load(&other)? else {
                    continue;
                };
                let before = record.clone();
                record.deps.retain(|dep| dep != name);
                if record.base.as_deref() == Some(name.as_str()) {
                    match &own_base {
                        Some(base) => record.base = Some(base.clone()),
                        None => orphans.push(other.clone()),
                    }
                }
                if record != before {
                    rewired.push((other, record));
                }
            }
            if !orphans.is_empty() {
                return Err(GraphError::OrphanedDependents {
                    branch: name.clone(),
                    dependents: orphans.join(", "),
                }
                .into());
            }

            for (other, record) in rewired {
                info!(branch = %other, removed = %name, "updating dependency record");
                self.records.save(&other, &record)?;
            }
            self.records.remove(name)?;
            self.vcs.delete_branch(name)?;
            deleted.push(name.clone());
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_reference;

    #[test]
    fn numeric_references_get_a_hash() {
        assert_eq!(normalize_reference("123"), "#123");
        assert_eq!(normalize_reference("#123"), "#123");
        assert_eq!(normalize_reference(" 42 "), "#42");
    }

    #[test]
    fn other_labels_are_verbatim() {
        assert_eq!(normalize_reference("JIRA-7"), "JIRA-7");
        assert_eq!(normalize_reference("#abc"), "#abc");
        assert_eq!(normalize_reference("#"), "#");
    }
}
