//! Dependency collection and build ordering across tables.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tabs_common::Kwargs;
use tracing::debug;

use crate::error::TableError;
use crate::fetch::{FetchOptions, Fetched};
use crate::table::{Definition, Table};

/// Collects the direct dependencies of `table`.
///
/// The source's dependencies come first, followed by each post-processor's
/// in processor order. Duplicates are kept and nothing is resolved
/// transitively.
pub fn collect_dependencies<T: Table + ?Sized>(table: &T) -> Vec<Definition> {
    let mut dependencies = table.source_dependencies();
    for processor in table.post_processors() {
        dependencies.extend_from_slice(processor.dependencies());
    }
    dependencies
}

/// The transitive dependency graph of a table, in build order.
///
/// Edges point from a dependency to the table that depends on it, so a
/// topological order lists every table after all of its dependencies.
#[derive(Debug)]
pub struct BuildGraph {
    graph: DiGraph<Definition, ()>,
    nodes: HashMap<Definition, NodeIndex>,
    kwargs: HashMap<Definition, Kwargs>,
    root: Definition,
    order: Vec<Definition>,
}

impl BuildGraph {
    /// Resolves the graph below `root`.
    ///
    /// Each dependency is bound to the kwargs its first dependent (in
    /// breadth-first order from `root`) passes it through
    /// [`Table::dependency_kwargs`], which is what that dependent's source
    /// fetches it with.
    ///
    /// Fails with [`TableError::DependencyCycle`] if a table depends on
    /// itself, directly or transitively.
    pub fn resolve(root: Definition, kwargs: Kwargs) -> Result<Self, TableError> {
        Self::build(root, kwargs, |dependent, dependency| {
            dependent.dependency_kwargs(dependency)
        })
    }

    /// Resolves the graph below `root`, binding each dependency to the kwargs
    /// returned by `defaults` instead.
    pub fn resolve_with<F>(
        root: Definition,
        kwargs: Kwargs,
        defaults: F,
    ) -> Result<Self, TableError>
    where
        F: Fn(Definition) -> Kwargs,
    {
        Self::build(root, kwargs, |_, dependency| defaults(dependency))
    }

    fn build<F>(root: Definition, kwargs: Kwargs, bind: F) -> Result<Self, TableError>
    where
        F: Fn(&dyn Table, Definition) -> Kwargs,
    {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let mut bound = HashMap::new();
        let mut queue = VecDeque::new();

        nodes.insert(root, graph.add_node(root));
        bound.insert(root, kwargs);
        queue.push_back(root);

        while let Some(definition) = queue.pop_front() {
            let table = definition.instantiate(bound[&definition].clone());
            let dependent = nodes[&definition];

            for dependency in table.dependencies() {
                let idx = match nodes.get(&dependency) {
                    Some(idx) => *idx,
                    None => {
                        let idx = graph.add_node(dependency);
                        nodes.insert(dependency, idx);
                        bound.insert(dependency, bind(table.as_ref(), dependency));
                        queue.push_back(dependency);
                        idx
                    }
                };
                graph.update_edge(idx, dependent, ());
            }
        }

        let order: Vec<Definition> = toposort(&graph, None)
            .map_err(|cycle| TableError::DependencyCycle {
                table: graph[cycle.node_id()].name(),
            })?
            .into_iter()
            .map(|idx| graph[idx])
            .collect();

        debug!(
            root = root.name(),
            tables = order.len(),
            "resolved build graph"
        );

        Ok(Self {
            graph,
            nodes,
            kwargs: bound,
            root,
            order,
        })
    }

    /// The table the graph was resolved for.
    pub fn root(&self) -> Definition {
        self.root
    }

    /// Every table in the graph, each after its dependencies, root last.
    pub fn build_order(&self) -> &[Definition] {
        &self.order
    }

    /// Number of distinct tables, including the root.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false`: the root is part of the graph.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct direct dependencies of `table` within this graph.
    pub fn direct_dependencies(&self, table: Definition) -> Vec<Definition> {
        let Some(idx) = self.nodes.get(&table) else {
            return Vec::new();
        };
        let mut deps: Vec<Definition> = self
            .graph
            .neighbors_directed(*idx, Direction::Incoming)
            .map(|dep| self.graph[dep])
            .collect();
        deps.sort_by_key(|d| d.name());
        deps
    }

    /// The kwargs `table` is bound to in this graph.
    pub fn kwargs_for(&self, table: Definition) -> Option<&Kwargs> {
        self.kwargs.get(&table)
    }

    /// Fetches every table in build order.
    pub fn fetch_all(
        &self,
        options: FetchOptions,
    ) -> Result<Vec<(Definition, Fetched)>, TableError> {
        let mut fetched = Vec::with_capacity(self.order.len());
        for definition in &self.order {
            let kwargs = self.kwargs.get(definition).cloned().unwrap_or_default();
            let table = definition.instantiate(kwargs);
            fetched.push((*definition, table.fetch(options)?));
        }
        Ok(fetched)
    }
}
