//! Method graphs.
//!
//! A graph owns its nodes in an append-only arena. Node ids are assigned in
//! allocation order and never reused, so iterating a graph always yields
//! the same sequence until it is edited.
//!
//! Edits are limited to what setup synthesis needs:
//! - **Append**: `add` / `add_with_stamp`
//! - **Splice**: `insert_after` puts a fixed node into a control chain
//! - **Delete**: `delete` marks a node dead; its id stays reserved

use super::arena::Arena;
use super::meta::{MethodKey, MethodRef};
use super::node::{Node, NodeFlags, NodeId, NodeKind};
use super::stamp::Stamp;
use std::fmt;

// =============================================================================
// Graph Structure
// =============================================================================

#[derive(Clone)]
pub struct Graph {
    nodes: Arena<Node>,

    /// Explicit name; overrides the method key as the graph's name.
    name: Option<String>,

    /// Method this graph was built from, if any.
    method: Option<MethodRef>,

    /// The start node, always id 0.
    pub start: NodeId,
}

impl Graph {
    /// A graph holding only an unlinked start node.
    pub fn new() -> Self {
        let mut nodes = Arena::with_capacity(32);
        let start = nodes.alloc(Node::new(NodeKind::Start {
            state_after: None,
            next: None,
        }));
        Graph {
            nodes,
            name: None,
            method: None,
            start,
        }
    }

    pub fn for_method(method: MethodRef) -> Self {
        let mut graph = Self::new();
        graph.method = Some(method);
        graph
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut graph = Self::new();
        graph.name = Some(name.into());
        graph
    }

    pub fn method(&self) -> Option<&MethodRef> {
        self.method.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Name used for the graph in exported documents: the explicit name,
    /// else the method key.
    pub fn display_name(&self) -> Option<String> {
        match (&self.name, &self.method) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(method)) => Some(method.key().to_string()),
            (None, None) => None,
        }
    }

    pub fn method_key(&self) -> Option<MethodKey> {
        self.method.as_ref().map(MethodRef::key)
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// Node by id. Panics on an id from another graph.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Live node by id.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| n.is_alive())
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    /// Live nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().filter(|(_, n)| n.is_alive())
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live node matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(&NodeKind) -> bool) -> Option<NodeId> {
        self.iter().find(|(_, n)| pred(&n.kind)).map(|(id, _)| id)
    }

    // =========================================================================
    // Node Creation and Editing
    // =========================================================================

    /// Add a node producing no value.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.alloc(Node::new(kind))
    }

    pub fn add_with_stamp(&mut self, kind: NodeKind, stamp: Stamp) -> NodeId {
        self.nodes.alloc(Node::with_stamp(kind, stamp))
    }

    /// Mark a node dead. Its id is never reissued.
    pub fn delete(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.insert(NodeFlags::DELETED);
        }
    }

    /// Splice a new fixed node into the control chain right after `anchor`.
    ///
    /// The new node takes over `anchor`'s successor (if it had one) and
    /// becomes `anchor`'s successor. Returns the new node, which is the new
    /// tail of the chain built so far.
    pub fn insert_after(
        &mut self,
        anchor: NodeId,
        kind: NodeKind,
        stamp: Stamp,
    ) -> Result<NodeId, String> {
        let old_next = match self.get(anchor) {
            Some(node) if node.kind.has_next() => node.kind.next(),
            Some(node) => {
                return Err(format!(
                    "cannot insert after {:?} ({}): it has no successor slot",
                    anchor,
                    node.simple_name()
                ))
            }
            None => return Err(format!("cannot insert after dead node {:?}", anchor)),
        };
        if !kind.has_next() {
            return Err(format!(
                "{} cannot be spliced into a control chain",
                kind.simple_name()
            ));
        }

        let mut node = Node::with_stamp(kind, stamp);
        node.flags.insert(NodeFlags::SYNTHETIC);
        if let Some(successor) = old_next {
            node.kind.set_next(successor);
        }
        let id = self.nodes.alloc(node);
        self.nodes[anchor].kind.set_next(id);
        Ok(id)
    }

    /// Follow `next` edges from the start node.
    pub fn control_chain(&self) -> Vec<NodeId> {
        let mut chain = vec![self.start];
        let mut current = self.start;
        while let Some(next) = self.kind(current).and_then(NodeKind::next) {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check that every referenced node exists and is alive.
    pub fn verify(&self) -> Result<(), String> {
        if !matches!(self.kind(self.start), Some(NodeKind::Start { .. })) {
            return Err(format!("start node {:?} is not a StartNode", self.start));
        }
        for (id, node) in self.iter() {
            for input in node.kind.inputs() {
                if self.get(input).is_none() {
                    return Err(format!(
                        "node {:?} ({}) references missing or dead node {:?}",
                        id,
                        node.simple_name(),
                        input
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.display_name().unwrap_or_else(|| "<anonymous>".to_string());
        writeln!(f, "Graph {} ({} nodes):", name, self.len())?;
        for (id, node) in self.iter() {
            writeln!(f, "  {:?}: {:?} : {:?}", id, node.kind, node.stamp)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
