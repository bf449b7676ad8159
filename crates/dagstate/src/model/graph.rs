//! Workflow graph supplied by the template layer.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rule::MatchRule;

/// Reference to the job backing a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub name: String,
}

/// One node of the workflow DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub name: String,
    pub job: JobRef,
    /// Names of dependent vertices.
    #[serde(default)]
    pub children: Vec<String>,
    /// Rules that must all hold before the vertex may run.
    #[serde(default)]
    pub when: Vec<MatchRule>,
}

impl Vertex {
    /// Create a vertex whose job shares its name.
    pub fn new(name: &str, children: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            job: JobRef {
                name: name.to_string(),
            },
            children: children.iter().map(|c| c.to_string()).collect(),
            when: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        self.when.push(rule);
        self
    }
}

/// Graph invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate vertex name: {0}")]
    DuplicateVertex(String),

    #[error("vertex {parent} references unknown child {child}")]
    UnknownChild { parent: String, child: String },

    #[error("vertex {parent} lists child {child} more than once")]
    DuplicateChild { parent: String, child: String },

    #[error("cycle detected among vertices: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Validated, acyclic workflow graph.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    indices: HashMap<String, usize>,
    parents: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl Graph {
    /// Build a graph, rejecting duplicate names, dangling or repeated child
    /// references and cycles.
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, GraphError> {
        let mut indices = HashMap::with_capacity(vertices.len());
        for (i, vertex) in vertices.iter().enumerate() {
            if indices.insert(vertex.name.clone(), i).is_some() {
                return Err(GraphError::DuplicateVertex(vertex.name.clone()));
            }
        }

        let mut parents = vec![Vec::new(); vertices.len()];
        for (i, vertex) in vertices.iter().enumerate() {
            for child in &vertex.children {
                let c = *indices
                    .get(child)
                    .ok_or_else(|| GraphError::UnknownChild {
                        parent: vertex.name.clone(),
                        child: child.clone(),
                    })?;
                if parents[c].contains(&i) {
                    return Err(GraphError::DuplicateChild {
                        parent: vertex.name.clone(),
                        child: child.clone(),
                    });
                }
                parents[c].push(i);
            }
        }

        let order = Self::sort(&vertices, &indices, &parents)?;

        Ok(Self {
            vertices,
            indices,
            parents,
            order,
        })
    }

    // Kahn's algorithm, seeded in declaration order so the result is stable.
    fn sort(
        vertices: &[Vertex],
        indices: &HashMap<String, usize>,
        parents: &[Vec<usize>],
    ) -> Result<Vec<usize>, GraphError> {
        let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..vertices.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(vertices.len());

        while let Some(i) = queue.pop_front() {
            order.push(i);
            for child in &vertices[i].children {
                let c = indices[child];
                in_degree[c] -= 1;
                if in_degree[c] == 0 {
                    queue.push_back(c);
                }
            }
        }

        if order.len() != vertices.len() {
            let stuck = (0..vertices.len())
                .filter(|&i| in_degree[i] > 0)
                .map(|i| vertices[i].name.clone())
                .collect();
            return Err(GraphError::Cycle(stuck));
        }
        Ok(order)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Vertex> {
        self.indices.get(name).map(|&i| &self.vertices[i])
    }

    /// Vertices in declaration order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Direct dependents of `name`.
    pub fn children_of(&self, name: &str) -> Vec<&Vertex> {
        self.get(name)
            .map(|v| v.children.iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Vertices that list `name` as a child.
    pub fn parents_of(&self, name: &str) -> Vec<&Vertex> {
        self.indices
            .get(name)
            .map(|&i| self.parents[i].iter().map(|&p| &self.vertices[p]).collect())
            .unwrap_or_default()
    }

    /// Vertices without parents.
    pub fn roots(&self) -> Vec<&Vertex> {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_empty())
            .map(|(i, _)| &self.vertices[i])
            .collect()
    }

    /// Vertices ordered so every parent precedes its children.
    pub fn topological_order(&self) -> impl Iterator<Item = &Vertex> {
        self.order.iter().map(|&i| &self.vertices[i])
    }
}
