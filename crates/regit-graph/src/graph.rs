//! Branch graph of one invocation.
//!
//! The graph is built in two phases. [`BranchGraph::load`] creates one
//! pending node per local branch; [`BranchGraph::hydrate_closure`] then
//! attaches dependency records to the target and everything reachable
//! from it and rejects cycles before any git mutation happens.

use regit_core::diagnostics::{DiagnosticKind, Diagnostics};
use regit_core::error::GraphError;
use regit_core::namespace::ReservedBranch;
use regit_core::types::DependencyRecord;
use regit_state::RecordStore;
use regit_vcs::VcsAdapter;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(usize);

/// Base and dependency edges of a managed branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedLinks {
    pub base: BranchId,
    pub deps: Vec<BranchId>,
    pub rebase_tip: String,
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// Record not looked at yet.
    Pending,
    /// No record; synchronization is a no-op.
    Unmanaged,
    Managed(ManagedLinks),
}

#[derive(Debug, Clone)]
pub struct Branch {
    name: String,
    hydration: Hydration,
    processed: bool,
}

impl Branch {
    fn new(name: String) -> Self {
        Self {
            name,
            hydration: Hydration::Pending,
            processed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hydration(&self) -> &Hydration {
        &self.hydration
    }

    pub fn links(&self) -> Option<&ManagedLinks> {
        match &self.hydration {
            Hydration::Managed(links) => Some(links),
            _ => None,
        }
    }

    /// Name followed by the external reference, e.g. `feature (#12)`.
    pub fn display_name(&self) -> String {
        match self.links().and_then(|l| l.external_reference.as_deref()) {
            Some(reference) => format!("{} ({reference})", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BranchGraph {
    branches: Vec<Branch>,
    index: HashMap<String, BranchId>,
    current: Option<BranchId>,
}

impl BranchGraph {
    /// Enumerate local branches and note the checked-out one.
    ///
    /// Refuses to run on a reserved branch unless `include_reserved` is set;
    /// only resuming or aborting an operation may start from one.
    pub fn load<V: VcsAdapter>(vcs: &V, include_reserved: bool) -> Result<Self, GraphError> {
        let names = vcs.all_branches()?;
        let current = vcs.current_branch()?;
        if let Some(name) = current.as_deref().filter(|_| !include_reserved) {
            if ReservedBranch::is_reserved(name) {
                return Err(GraphError::ReservedBranch {
                    name: name.to_string(),
                });
            }
        }
        let graph = Self::from_names(names, current.as_deref());
        debug!(
            branches = graph.len(),
            current = current.as_deref().unwrap_or("<detached>"),
            "loaded branch graph"
        );
        Ok(graph)
    }

    pub fn from_names<I, S>(names: I, current: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for name in names {
            graph.ensure(name.into());
        }
        graph.current = current.map(|name| graph.ensure(name.to_string()));
        graph
    }

    /// Node for `name`, created pending if it does not exist yet.
    pub fn ensure(&mut self, name: impl Into<String>) -> BranchId {
        let name = name.into();
        if let Some(id) = self.index.get(&name) {
            return *id;
        }
        let id = BranchId(self.branches.len());
        self.index.insert(name.clone(), id);
        self.branches.push(Branch::new(name));
        id
    }

    pub fn lookup(&self, name: &str) -> Option<BranchId> {
        self.index.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<BranchId, GraphError> {
        self.lookup(name).ok_or_else(|| GraphError::UnknownBranch {
            name: name.to_string(),
        })
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id.0]
    }

    pub fn name(&self, id: BranchId) -> &str {
        &self.branches[id.0].name
    }

    pub fn display_name(&self, id: BranchId) -> String {
        self.branch(id).display_name()
    }

    pub fn links(&self, id: BranchId) -> Option<&ManagedLinks> {
        self.branch(id).links()
    }

    pub fn current(&self) -> Option<BranchId> {
        self.current
    }

    pub fn set_current(&mut self, id: BranchId) {
        self.current = Some(id);
    }

    pub fn ids(&self) -> impl Iterator<Item = BranchId> + '_ {
        (0..self.branches.len()).map(BranchId)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn is_processed(&self, id: BranchId) -> bool {
        self.branches[id.0].processed
    }

    pub fn mark_processed(&mut self, id: BranchId) {
        self.branches[id.0].processed = true;
    }

    pub fn set_rebase_tip(&mut self, id: BranchId, tip: impl Into<String>) {
        if let Hydration::Managed(links) = &mut self.branches[id.0].hydration {
            links.rebase_tip = tip.into();
        }
    }

    /// Attach the stored record of `id`, once.
    pub fn hydrate<R: RecordStore>(
        &mut self,
        id: BranchId,
        records: &R,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), GraphError> {
        if self.branch(id).hydration != Hydration::Pending {
            return Ok(());
        }
        let name = self.name(id).to_string();
        let hydration = match records.load(&name)? {
            None => Hydration::Unmanaged,
            Some(record) => Hydration::Managed(self.resolve_record(&name, record, diagnostics)?),
        };
        debug!(branch = %name, managed = matches!(hydration, Hydration::Managed(_)), "hydrated");
        self.branches[id.0].hydration = hydration;
        Ok(())
    }

    fn resolve_record(
        &self,
        name: &str,
        record: DependencyRecord,
        diagnostics: &mut Diagnostics,
    ) -> Result<ManagedLinks, GraphError> {
        let base_name = record.base.ok_or_else(|| GraphError::MissingBase {
            branch: name.to_string(),
        })?;
        let rebase_tip = record.rebase_tip.ok_or_else(|| GraphError::MissingRebaseTip {
            branch: name.to_string(),
        })?;
        let base = self
            .lookup(&base_name)
            .ok_or_else(|| GraphError::UnknownBase {
                branch: name.to_string(),
                base: base_name.clone(),
            })?;

        let mut deps = Vec::with_capacity(record.deps.len());
        for dep in record.deps {
            if dep == base_name {
                diagnostics.push(DiagnosticKind::DependsOnBase, name, dep);
                continue;
            }
            if dep == name {
                diagnostics.push(DiagnosticKind::DependsOnSelf, name, dep);
                continue;
            }
            let id = self
                .lookup(&dep)
                .ok_or_else(|| GraphError::UnknownDependency {
                    branch: name.to_string(),
                    dependency: dep.clone(),
                })?;
            if deps.contains(&id) {
                diagnostics.push(DiagnosticKind::DuplicateDependency, name, dep);
                continue;
            }
            deps.push(id);
        }

        Ok(ManagedLinks {
            base,
            deps,
            rebase_tip,
            external_reference: record.external_reference,
        })
    }

    /// Hydrate `root` and every branch reachable through base and
    /// dependency edges, then reject cycles.
    pub fn hydrate_closure<R: RecordStore>(
        &mut self,
        root: BranchId,
        records: &R,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), GraphError> {
        let mut stack = vec![root];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            self.hydrate(id, records, diagnostics)?;
            stack.extend(self.edges(id));
        }
        self.check_acyclic(root)
    }

    fn edges(&self, id: BranchId) -> Vec<BranchId> {
        match self.links(id) {
            Some(links) => std::iter::once(links.base)
                .chain(links.deps.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    fn check_acyclic(&self, root: BranchId) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &BranchGraph,
            id: BranchId,
            marks: &mut HashMap<BranchId, Mark>,
            path: &mut Vec<BranchId>,
        ) -> Result<(), GraphError> {
            match marks.get(&id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|p| *p == id).unwrap_or(0);
                    let cycle: Vec<&str> = path[start..]
                        .iter()
                        .chain(std::iter::once(&id))
                        .map(|p| graph.name(*p))
                        .collect();
                    return Err(GraphError::Cycle {
                        path: cycle.join(" -> "),
                    });
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            path.push(id);
            for next in graph.edges(id) {
                visit(graph, next, marks, path)?;
            }
            path.pop();
            marks.insert(id, Mark::Done);
            Ok(())
        }

        visit(self, root, &mut HashMap::new(), &mut Vec::new())
    }

    /// `y` is x's base, a dependency, or reachable through either.
    pub fn depends_on(&self, x: BranchId, y: BranchId) -> bool {
        let mut stack = self.edges(x);
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == y {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.edges(id));
            }
        }
        false
    }

    /// Some direct dependency of `x` depends on `y`.
    pub fn deps_depend_on(&self, x: BranchId, y: BranchId) -> bool {
        self.links(x)
            .is_some_and(|links| links.deps.iter().any(|dep| self.depends_on(*dep, y)))
    }

    /// Dependencies sorted by name. `recursive` adds the closure of every
    /// dependency's own dependencies; `own` keeps the direct ones.
    pub fn collect_deps(&self, id: BranchId, recursive: bool, own: bool) -> Vec<BranchId> {
        let Some(links) = self.links(id) else {
            return Vec::new();
        };
        let mut out: BTreeSet<BranchId> = BTreeSet::new();
        if own {
            out.extend(links.deps.iter().copied());
        }
        if recursive {
            for dep in &links.deps {
                out.extend(self.collect_deps(*dep, true, true));
            }
        } else if !own {
            return Vec::new();
        }
        let mut deps: Vec<BranchId> = out.into_iter().collect();
        deps.sort_by(|a, b| self.name(*a).cmp(self.name(*b)));
        deps
    }

    /// Indented dependency tree, one branch per line.
    pub fn dependency_listing(&self, id: BranchId, indent: &str, recursive: bool) -> String {
        let mut out = String::new();
        let Some(links) = self.links(id) else {
            return out;
        };
        let nested = format!("{indent}  ");
        for dep in &links.deps {
            out.push_str(&nested);
            out.push_str(self.name(*dep));
            out.push('\n');
            if recursive {
                out.push_str(&self.dependency_listing(*dep, &nested, true));
            }
        }
        out
    }

    /// Graphviz edges reachable from `id`. A base edge is left out when a
    /// dependency already leads there.
    pub fn collect_dot_edges(&self, id: BranchId, edges: &mut BTreeSet<String>) {
        let Some(links) = self.links(id) else {
            return;
        };
        let from = self.display_name(id);
        self.collect_dot_edges(links.base, edges);
        if !self.deps_depend_on(id, links.base) {
            edges.insert(format!("\"{from}\" -> \"{}\"", self.name(links.base)));
        }
        for dep in &links.deps {
            edges.insert(format!("\"{from}\" -> \"{}\"", self.display_name(*dep)));
            self.collect_dot_edges(*dep, edges);
        }
    }

    /// Current in-memory links of `id` as a storable record.
    pub fn to_record(&self, id: BranchId) -> Option<DependencyRecord> {
        self.links(id).map(|links| DependencyRecord {
            base: Some(self.name(links.base).to_string()),
            deps: links
                .deps
                .iter()
                .map(|dep| self.name(*dep).to_string())
                .collect(),
            rebase_tip: Some(links.rebase_tip.clone()),
            external_reference: links.external_reference.clone(),
        })
    }
}
