//! Dependency graph for items
//!
//! Built from stored `(item, depends_on)` edges to validate new edges before
//! they are written. Uses petgraph for graph operations.

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use super::item::ValidationError;

/// A dependency graph over item IDs
///
/// Edge direction is `depends_on -> item`: the dependency must be done before
/// the dependent item is ready.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `(item, depends_on)` pairs
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (item, depends_on) in edges {
            graph.insert_edge(item.into(), depends_on.into());
        }
        graph
    }

    fn node(&mut self, id: String) -> NodeIndex {
        if let Some(idx) = self.node_map.get(&id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id, idx);
        idx
    }

    fn insert_edge(&mut self, item: String, depends_on: String) {
        let item_idx = self.node(item);
        let dep_idx = self.node(depends_on);
        if self.graph.find_edge(dep_idx, item_idx).is_none() {
            self.graph.add_edge(dep_idx, item_idx, ());
        }
    }

    /// Returns true if `item` already waits on `depends_on`, directly or transitively
    pub fn depends_on(&self, item: &str, depends_on: &str) -> bool {
        match (self.node_map.get(depends_on), self.node_map.get(item)) {
            (Some(from), Some(to)) => has_path_connecting(&self.graph, *from, *to, None),
            _ => false,
        }
    }

    /// Checks that adding `item -> depends_on` keeps the graph acyclic
    pub fn check_edge(&self, item: &str, depends_on: &str) -> Result<(), ValidationError> {
        if item == depends_on {
            return Err(ValidationError::new(
                "dependency",
                format!("{} cannot depend on itself", item),
            ));
        }

        // The new edge closes a cycle if the dependency already waits on the item
        if self.depends_on(depends_on, item) {
            return Err(ValidationError::new(
                "dependency",
                format!(
                    "{} -> {} would create a cycle ({} already depends on {})",
                    item, depends_on, depends_on, item
                ),
            ));
        }

        Ok(())
    }

    /// Adds the edge after validating it
    pub fn add_dependency(&mut self, item: &str, depends_on: &str) -> Result<(), ValidationError> {
        self.check_edge(item, depends_on)?;
        self.insert_edge(item.to_string(), depends_on.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_independent_edges() {
        let mut graph = DependencyGraph::new();

        graph.add_dependency("ts-a", "ts-b").unwrap();
        graph.add_dependency("ts-c", "ts-b").unwrap();

        assert!(graph.depends_on("ts-a", "ts-b"));
        assert!(graph.depends_on("ts-c", "ts-b"));
        assert!(!graph.depends_on("ts-a", "ts-c"));
    }

    #[test]
    fn rejects_self_dependency() {
        let graph = DependencyGraph::new();
        let err = graph.check_edge("ts-a", "ts-a").unwrap_err();

        assert_eq!(err.field, "dependency");
        assert!(err.message.contains("itself"));
    }

    #[test]
    fn rejects_direct_cycle() {
        let graph = DependencyGraph::from_edges([("ts-a", "ts-b")]);
        assert!(graph.check_edge("ts-b", "ts-a").is_err());
    }

    #[test]
    fn rejects_transitive_cycle() {
        let graph = DependencyGraph::from_edges([("ts-a", "ts-b"), ("ts-b", "ts-c")]);

        assert!(graph.depends_on("ts-a", "ts-c"));
        assert!(graph.check_edge("ts-c", "ts-a").is_err());
    }

    #[test]
    fn duplicate_edges_collapse() {
        let graph = DependencyGraph::from_edges([("ts-a", "ts-b"), ("ts-a", "ts-b")]);
        assert_eq!(graph.graph.edge_count(), 1);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::from_edges([
            ("ts-d", "ts-b"),
            ("ts-d", "ts-c"),
            ("ts-b", "ts-a"),
        ]);

        assert!(graph.add_dependency("ts-c", "ts-a").is_ok());
        assert!(graph.depends_on("ts-d", "ts-a"));
        assert!(!graph.depends_on("ts-a", "ts-d"));
    }

    #[test]
    fn unknown_items_have_no_dependencies() {
        let graph = DependencyGraph::new();
        assert!(!graph.depends_on("ts-a", "ts-b"));
    }
}
