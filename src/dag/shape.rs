// src/dag/shape.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::StepId;

/// One step of a workflow version, with the steps that run after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepShape {
    pub step_id: StepId,
    pub task_name: String,
    #[serde(default)]
    pub children_step_ids: Vec<StepId>,
}

impl StepShape {
    pub fn new(step_id: impl Into<StepId>, task_name: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            task_name: task_name.into(),
            children_step_ids: Vec::new(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StepId>,
    {
        self.children_step_ids = children.into_iter().map(Into::into).collect();
        self
    }
}

/// Internal node structure: stores immediate children and parents.
#[derive(Debug, Clone)]
struct ShapeNode {
    task_name: String,
    /// Child ids exactly as listed in the shape (may include dangling ids).
    children: Vec<StepId>,
    /// Steps whose `childrenStepIds` list this one, excluding itself.
    parents: Vec<StepId>,
}

/// Adjacency view over a shape keyed by step id.
///
/// Acyclicity is an upstream invariant; nothing here checks it. When a step
/// id appears more than once, the first entry is indexed.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    order: Vec<StepId>,
    nodes: HashMap<StepId, ShapeNode>,
}

impl ShapeIndex {
    pub fn from_shape(shape: &[StepShape]) -> Self {
        let mut order = Vec::with_capacity(shape.len());
        let mut nodes: HashMap<StepId, ShapeNode> = HashMap::with_capacity(shape.len());

        // First pass: one node per distinct step id, with its child list.
        for step in shape {
            if nodes.contains_key(&step.step_id) {
                continue;
            }
            order.push(step.step_id.clone());
            nodes.insert(
                step.step_id.clone(),
                ShapeNode {
                    task_name: step.task_name.clone(),
                    children: step.children_step_ids.clone(),
                    parents: Vec::new(),
                },
            );
        }

        // Second pass: populate parents from every entry's child list.
        for step in shape {
            for child in &step.children_step_ids {
                if *child == step.step_id {
                    continue;
                }
                if let Some(child_node) = nodes.get_mut(child) {
                    if !child_node.parents.contains(&step.step_id) {
                        child_node.parents.push(step.step_id.clone());
                    }
                }
            }
        }

        Self { order, nodes }
    }

    /// Step ids in first-seen shape order.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.nodes.contains_key(step_id)
    }

    pub fn task_name_of(&self, step_id: &str) -> Option<&str> {
        self.nodes.get(step_id).map(|n| n.task_name.as_str())
    }

    /// Immediate children as listed in the shape, dangling ids included.
    pub fn children_of(&self, step_id: &str) -> &[StepId] {
        self.nodes
            .get(step_id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate parents (other steps listing this one as a child).
    pub fn parents_of(&self, step_id: &str) -> &[StepId] {
        self.nodes
            .get(step_id)
            .map(|n| n.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Task names of the immediate parents, falling back to the step id.
    pub fn parent_names_of(&self, step_id: &str) -> Vec<String> {
        self.parents_of(step_id)
            .iter()
            .map(|p| self.task_name_of(p).unwrap_or(p).to_string())
            .collect()
    }
}
