//! Definition graph for pipeline files
//!
//! A pipeline file may declare tasks in any order, but the registry wants
//! members registered before the composites that use them. This module builds
//! the name graph, rejects unknown members and cycles, and yields a
//! registration order with members first.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use petgraph::visit::DfsPostOrder;

use crate::types::{BatonError, BatonResult};

/// A named node and the names it refers to
#[derive(Debug, Clone)]
pub struct DefinitionNode {
    pub name: String,
    pub members: Vec<String>,
}

impl DefinitionNode {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// Compute a registration order where every member precedes its composites.
///
/// Ties keep declaration order.
pub fn registration_order(nodes: &[DefinitionNode]) -> BatonResult<Vec<String>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for node in nodes {
        if node_indices.contains_key(&node.name) {
            return Err(BatonError::DuplicateName(node.name.clone()));
        }
        let index = graph.add_node(node.name.clone());
        node_indices.insert(node.name.clone(), index);
    }

    for node in nodes {
        let from_node = node_indices[&node.name];
        // Neighbors come back newest first and the post-order walk pops the
        // last pushed, so adding edges in declaration order keeps that order
        for member in &node.members {
            let Some(&to_node) = node_indices.get(member) else {
                return Err(BatonError::UnresolvedReference {
                    composite: node.name.clone(),
                    member: member.clone(),
                });
            };
            graph.add_edge(from_node, to_node, ());
        }
    }

    let cycles = find_cycles(&graph);
    if let Some(cycle) = cycles.into_iter().next() {
        return Err(BatonError::CyclicDefinition(render_cycle(&graph, &cycle)));
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut dfs = DfsPostOrder::empty(&graph);
    for node in nodes {
        dfs.move_to(node_indices[&node.name]);
        while let Some(index) = dfs.next(&graph) {
            order.push(graph[index].clone());
        }
    }
    Ok(order)
}

/// Strongly connected components that form a cycle, sorted for stable reporting
fn find_cycles(graph: &DiGraph<String, ()>) -> Vec<Vec<NodeIndex>> {
    let mut cycles: Vec<Vec<NodeIndex>> = kosaraju_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .collect();

    for cycle in &mut cycles {
        cycle.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
    }
    cycles.sort_by(|a, b| graph[a[0]].cmp(&graph[b[0]]));
    cycles
}

/// Render a cycle as a path that returns to its start, e.g. `a -> b -> a`.
///
/// Breadth-first from the start within the component, so the shortest way
/// back is reported and inner loops are never walked twice.
fn render_cycle(graph: &DiGraph<String, ()>, component: &[NodeIndex]) -> String {
    let start = component[0];
    let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let mut neighbors: Vec<NodeIndex> = graph
            .neighbors(current)
            .filter(|n| component.contains(n))
            .collect();
        neighbors.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
        neighbors.dedup();

        for next in neighbors {
            if next == start {
                let mut path = vec![graph[start].clone()];
                let mut cursor = Some(current);
                while let Some(node) = cursor.filter(|node| *node != start) {
                    path.push(graph[node].clone());
                    cursor = previous.get(&node).copied();
                }
                path.push(graph[start].clone());
                path.reverse();
                return path.join(" -> ");
            }
            if !previous.contains_key(&next) {
                previous.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    graph[start].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, members: &[&str]) -> DefinitionNode {
        DefinitionNode::new(name, members.iter().map(|m| m.to_string()).collect())
    }

    #[test]
    fn test_members_precede_composites() {
        let nodes = vec![
            node("default", &["clean", "build", "test"]),
            node("build", &["build-es", "build-lib"]),
            node("test", &["mocha"]),
            node("clean", &[]),
            node("build-es", &[]),
            node("build-lib", &[]),
            node("mocha", &[]),
        ];

        let order = registration_order(&nodes).unwrap();
        assert_eq!(
            order,
            vec!["clean", "build-es", "build-lib", "build", "mocha", "test", "default"]
        );
    }

    #[test]
    fn test_unknown_member() {
        let nodes = vec![node("default", &["clean"])];
        let err = registration_order(&nodes).unwrap_err();
        assert!(matches!(
            err,
            BatonError::UnresolvedReference { ref composite, ref member }
                if composite == "default" && member == "clean"
        ));
    }

    #[test]
    fn test_duplicate_declaration() {
        let nodes = vec![node("clean", &[]), node("clean", &[])];
        assert!(matches!(
            registration_order(&nodes),
            Err(BatonError::DuplicateName(ref n)) if n == "clean"
        ));
    }

    #[test]
    fn test_indirect_cycle_is_reported_as_path() {
        let nodes = vec![
            node("a", &["b"]),
            node("b", &["c"]),
            node("c", &["a"]),
            node("d", &[]),
        ];
        let err = registration_order(&nodes).unwrap_err();
        match err {
            BatonError::CyclicDefinition(cycle) => assert_eq!(cycle, "a -> b -> c -> a"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_cycle() {
        let nodes = vec![node("build", &["lint", "build"]), node("lint", &[])];
        let err = registration_order(&nodes).unwrap_err();
        assert!(matches!(err, BatonError::CyclicDefinition(ref c) if c == "build -> build"));
    }

    #[test]
    fn test_cycle_path_skips_inner_loop() {
        let nodes = vec![
            node("a", &["b"]),
            node("b", &["c"]),
            node("c", &["b", "d"]),
            node("d", &["a"]),
        ];
        let err = registration_order(&nodes).unwrap_err();
        assert!(matches!(err, BatonError::CyclicDefinition(ref c) if c == "a -> b -> c -> d -> a"));
    }
}
