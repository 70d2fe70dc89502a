//! Module graph with readability computed once per session.
//!
//! Nodes are module descriptors, edges are `requires` directives. After
//! [`ModuleGraph::build`] every module knows the ordered list of modules it
//! reads: direct requirements, everything those re-export through
//! `requires transitive`, and `java.base`.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::consts::JAVA_BASE;
use crate::error::{Error, Result};

use super::descriptor::{ModuleDescriptor, Requires};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// Where a module came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleOrigin {
    /// A `module-info.java` among the compiled sources; `root` is its directory.
    Source { root: String, unit: usize },
    /// A type provider entry.
    Provider { index: usize, uri: String },
}

#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub id: ModuleId,
    pub descriptor: ModuleDescriptor,
    pub origin: ModuleOrigin,
    pub packages: BTreeSet<String>,
    readable: Vec<ModuleId>,
}

impl ModuleNode {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_source(&self) -> bool {
        matches!(self.origin, ModuleOrigin::Source { .. })
    }
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleNode>,
    by_name: HashMap<String, ModuleId>,
    unresolved: Vec<(ModuleId, Requires)>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, descriptor: ModuleDescriptor, root: &str, unit: usize) -> Result<ModuleId> {
        if let Some(&existing) = self.by_name.get(&descriptor.name) {
            if self.modules[existing.0].is_source() {
                return Err(Error::DuplicateModule(descriptor.name));
            }
            log::warn!("source module {} shadows a classpath module of the same name", descriptor.name);
            self.modules[existing.0].descriptor = descriptor;
            self.modules[existing.0].origin = ModuleOrigin::Source { root: root.to_string(), unit };
            self.modules[existing.0].packages.clear();
            return Ok(existing);
        }
        Ok(self.insert(descriptor, ModuleOrigin::Source { root: root.to_string(), unit }))
    }

    /// Later providers declaring an already known module are ignored.
    pub fn add_provider(&mut self, descriptor: ModuleDescriptor, index: usize, uri: &str) -> Option<ModuleId> {
        if self.by_name.contains_key(&descriptor.name) {
            log::debug!("ignoring second declaration of module {} from {}", descriptor.name, uri);
            return None;
        }
        Some(self.insert(descriptor, ModuleOrigin::Provider { index, uri: uri.to_string() }))
    }

    fn insert(&mut self, descriptor: ModuleDescriptor, origin: ModuleOrigin) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.by_name.insert(descriptor.name.clone(), id);
        self.modules.push(ModuleNode {
            id,
            descriptor,
            origin,
            packages: BTreeSet::new(),
            readable: Vec::new(),
        });
        id
    }

    pub fn add_package(&mut self, module: ModuleId, package: &str) {
        if let Some(node) = self.modules.get_mut(module.0) {
            node.packages.insert(package.to_string());
        }
    }

    /// Check for cycles and compute readability.
    pub fn build(&mut self) -> Result<()> {
        let mut graph: DiGraph<ModuleId, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = self.modules.iter().map(|m| graph.add_node(m.id)).collect();

        self.unresolved.clear();
        for module in &self.modules {
            for requires in &module.descriptor.requires {
                match self.by_name.get(&requires.module) {
                    Some(target) => {
                        graph.add_edge(nodes[module.id.0], nodes[target.0], ());
                    }
                    None => self.unresolved.push((module.id, requires.clone())),
                }
            }
        }

        for scc in tarjan_scc(&graph) {
            let cyclic = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
            if cyclic {
                let mut names: Vec<String> = scc.iter().map(|idx| self.modules[graph[*idx].0].name().to_string()).collect();
                names.sort();
                if let Some(first) = names.first().cloned() {
                    names.push(first);
                }
                return Err(Error::ModuleCycle(names));
            }
        }

        let java_base = self.by_name.get(JAVA_BASE).copied();
        let readable: Vec<Vec<ModuleId>> = self
            .modules
            .iter()
            .map(|module| {
                let mut seen = HashSet::new();
                let mut order = Vec::new();
                for requires in &module.descriptor.requires {
                    if let Some(&target) = self.by_name.get(&requires.module) {
                        self.collect_exported_closure(target, &mut seen, &mut order);
                    }
                }
                if let Some(base) = java_base {
                    if base != module.id && seen.insert(base) {
                        order.push(base);
                    }
                }
                order.retain(|id| *id != module.id);
                order
            })
            .collect();
        for (module, list) in self.modules.iter_mut().zip(readable) {
            log::trace!("module {} reads {:?}", module.descriptor.name, list);
            module.readable = list;
        }
        log::debug!("module graph built with {} modules", self.modules.len());
        Ok(())
    }

    /// `module` plus every module it re-exports via `requires transitive`.
    fn collect_exported_closure(&self, module: ModuleId, seen: &mut HashSet<ModuleId>, order: &mut Vec<ModuleId>) {
        let mut stack = vec![module];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            let node = &self.modules[current.0];
            for requires in node.descriptor.requires.iter().rev() {
                if !requires.transitive {
                    continue;
                }
                if let Some(&target) = self.by_name.get(&requires.module) {
                    stack.push(target);
                }
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: ModuleId) -> &ModuleNode {
        &self.modules[id.0]
    }

    pub fn name(&self, id: ModuleId) -> &str {
        self.modules[id.0].name()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// `requires` directives naming modules that do not exist.
    pub fn unresolved_requires(&self) -> &[(ModuleId, Requires)] {
        &self.unresolved
    }

    /// Modules read by `reader`, the reader itself first.
    pub fn readable_from(&self, reader: ModuleId) -> Vec<ModuleId> {
        let mut all = vec![reader];
        all.extend(self.modules[reader.0].readable.iter().copied());
        all
    }

    /// The unnamed module (`None`) reads every module.
    pub fn reads(&self, reader: Option<ModuleId>, target: ModuleId) -> bool {
        match reader {
            None => true,
            Some(reader) => reader == target || self.modules[reader.0].readable.contains(&target),
        }
    }

    pub fn exports_to(&self, module: ModuleId, package: &str, reader: Option<ModuleId>) -> bool {
        let reader_name = reader.map(|r| self.name(r));
        self.modules[module.0].descriptor.exports_to(package, reader_name)
    }

    /// Whether code in `reader` may use types of `package` owned by `owner`.
    pub fn is_visible(&self, reader: Option<ModuleId>, owner: ModuleId, package: &str) -> bool {
        if reader == Some(owner) {
            return true;
        }
        self.reads(reader, owner) && self.exports_to(owner, package, reader)
    }

    /// Packages made available by `import module imported;` in `importer`.
    ///
    /// The imported module and everything it requires transitively
    /// contribute the packages they export to the importer. A module
    /// importing itself follows the same rule.
    pub fn module_import_packages(&self, importer: Option<ModuleId>, imported: ModuleId) -> Vec<(String, ModuleId)> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        self.collect_exported_closure(imported, &mut seen, &mut order);
        let importer_name = importer.map(|i| self.name(i));
        let mut packages = Vec::new();
        for module in order {
            let node = &self.modules[module.0];
            for package in &node.packages {
                if node.descriptor.exports_to(package, importer_name) {
                    packages.push((package.clone(), module));
                }
            }
        }
        packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(descriptors: Vec<ModuleDescriptor>) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            graph.add_source(descriptor, &format!("m{}", index), index).expect("unique module");
        }
        graph
    }

    #[test]
    fn transitive_requires_are_closed_over() {
        let mut g = graph(vec![
            ModuleDescriptor::new("a").requires_module("b", false),
            ModuleDescriptor::new("b").requires_module("c", true),
            ModuleDescriptor::new("c").requires_module("d", false),
            ModuleDescriptor::new("d"),
        ]);
        g.build().expect("acyclic");
        let a = g.lookup("a").expect("a");
        let names: Vec<&str> = g.readable_from(a).into_iter().map(|id| g.name(id)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn cycles_are_fatal() {
        let mut g = graph(vec![
            ModuleDescriptor::new("a").requires_module("b", false),
            ModuleDescriptor::new("b").requires_module("a", false),
        ]);
        match g.build() {
            Err(Error::ModuleCycle(names)) => assert_eq!(names, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn self_requires_is_a_cycle() {
        let mut g = graph(vec![ModuleDescriptor::new("a").requires_module("a", false)]);
        assert!(matches!(g.build(), Err(Error::ModuleCycle(_))));
    }

    #[test]
    fn duplicate_source_modules_are_fatal() {
        let mut g = ModuleGraph::new();
        g.add_source(ModuleDescriptor::new("a"), "x", 0).expect("first");
        assert!(matches!(g.add_source(ModuleDescriptor::new("a"), "y", 1), Err(Error::DuplicateModule(_))));
    }

    #[test]
    fn self_import_respects_qualified_exports() {
        let mut g = graph(vec![ModuleDescriptor::new("m")
            .exports_package("p.open", &[])
            .exports_package("p.mine", &["m", "other"])
            .exports_package("p.theirs", &["other"])]);
        let m = g.lookup("m").expect("m");
        for package in ["p.open", "p.mine", "p.theirs"] {
            g.add_package(m, package);
        }
        g.build().expect("acyclic");
        let visible: Vec<String> = g.module_import_packages(Some(m), m).into_iter().map(|(p, _)| p).collect();
        assert_eq!(visible, vec!["p.mine".to_string(), "p.open".to_string()]);
    }

    #[test]
    fn unknown_requires_are_collected() {
        let mut g = graph(vec![ModuleDescriptor::new("a").requires_module("nowhere", false)]);
        g.build().expect("acyclic");
        assert_eq!(g.unresolved_requires().len(), 1);
        assert_eq!(g.unresolved_requires()[0].1.module, "nowhere");
    }
}
