//! Fluent construction of method graphs.
//!
//! The builder keeps a control tail. Fixed nodes are created with an
//! `INVALID` successor and linked when the next fixed node is appended, so a
//! finished graph has one straight control chain from start to its return.
//! Floating nodes (constants, arithmetic, call targets, frame states) are
//! added without touching the chain.

use super::graph::Graph;
use super::meta::{FieldRef, MethodRef};
use super::node::{NodeId, NodeKind, NodeList};
use super::operators::{BinaryOp, InvokeKind};
use super::stamp::Stamp;
use super::value::{Constant, Value};

/// Builder for straight-line graphs.
pub struct GraphBuilder {
    graph: Graph,
    tail: NodeId,
}

impl GraphBuilder {
    pub fn new(graph: Graph) -> Self {
        let tail = graph.start;
        Self { graph, tail }
    }

    pub fn for_method(method: MethodRef) -> Self {
        Self::new(Graph::for_method(method))
    }

    /// Last fixed node of the chain.
    pub fn tail(&self) -> NodeId {
        self.tail
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Direct access for edits the builder has no helper for. Changing the
    /// tail's successor here is not tracked.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    // =========================================================================
    // Floating Nodes
    // =========================================================================

    /// Add a node outside the control chain.
    pub fn floating(&mut self, kind: NodeKind, stamp: Stamp) -> NodeId {
        self.graph.add_with_stamp(kind, stamp)
    }

    /// An empty frame state, attached to the start node if it has none.
    pub fn frame_state(&mut self) -> NodeId {
        let fs = self.graph.add(NodeKind::FrameState {
            monitor_ids: None,
            outer_frame_state: None,
            virtual_object_mappings: NodeList::new(),
        });
        let start = self.graph.start;
        if let NodeKind::Start { state_after, .. } = &mut self.graph.node_mut(start).kind {
            state_after.get_or_insert(fs);
        }
        fs
    }

    pub fn param(&mut self, index: u32, stamp: Stamp) -> NodeId {
        self.floating(NodeKind::Parameter { index }, stamp)
    }

    pub fn const_int(&mut self, v: i32) -> NodeId {
        self.floating(
            NodeKind::Constant {
                value: Constant::int(v),
            },
            Stamp::int_constant(v),
        )
    }

    pub fn const_long(&mut self, v: i64) -> NodeId {
        self.floating(
            NodeKind::Constant {
                value: Constant::long(v),
            },
            Stamp::int_range(64, v, v),
        )
    }

    pub fn const_null(&mut self) -> NodeId {
        self.floating(
            NodeKind::Constant {
                value: Constant::Null,
            },
            Stamp::null(),
        )
    }

    /// Constant for any value, with the stamp the caller supplies.
    pub fn constant(&mut self, value: Value, stamp: Stamp) -> NodeId {
        self.floating(
            NodeKind::Constant {
                value: Constant::from_value(value),
            },
            stamp,
        )
    }

    pub fn binary(&mut self, op: BinaryOp, x: NodeId, y: NodeId, stamp: Stamp) -> NodeId {
        self.floating(NodeKind::Binary { op, x, y }, stamp)
    }

    pub fn call_target(
        &mut self,
        target: MethodRef,
        arguments: &[NodeId],
        invoke_kind: InvokeKind,
    ) -> NodeId {
        self.floating(
            NodeKind::CallTarget {
                target,
                arguments: NodeList::from_slice(arguments),
                invoke_kind,
            },
            Stamp::Void,
        )
    }

    // =========================================================================
    // Fixed Nodes
    // =========================================================================

    /// Append a fixed node after the tail and make it the new tail.
    ///
    /// The node's own successor should be `NodeId::INVALID`; it is linked
    /// by the next append.
    pub fn fixed(&mut self, kind: NodeKind, stamp: Stamp) -> NodeId {
        let id = self.graph.add_with_stamp(kind, stamp);
        let tail = self.tail;
        self.graph.node_mut(tail).kind.set_next(id);
        self.tail = id;
        id
    }

    pub fn new_instance(&mut self, class: &str) -> NodeId {
        self.fixed(
            NodeKind::NewInstance {
                instance_class: class.to_string(),
                state_before: None,
                next: NodeId::INVALID,
            },
            Stamp::allocated(class),
        )
    }

    pub fn invoke(&mut self, call_target: NodeId, stamp: Stamp) -> NodeId {
        self.fixed(
            NodeKind::Invoke {
                call_target,
                class_init: None,
                state_during: None,
                state_after: None,
                next: NodeId::INVALID,
                exception_edge: None,
            },
            stamp,
        )
    }

    pub fn load_field(&mut self, field: FieldRef, object: Option<NodeId>, stamp: Stamp) -> NodeId {
        self.fixed(
            NodeKind::LoadField {
                field,
                object,
                next: NodeId::INVALID,
            },
            stamp,
        )
    }

    pub fn store_field(&mut self, field: FieldRef, value: NodeId, object: Option<NodeId>) -> NodeId {
        self.fixed(
            NodeKind::StoreField {
                field,
                value,
                state_after: None,
                object,
                next: NodeId::INVALID,
            },
            Stamp::Void,
        )
    }

    /// Terminate the chain with a return.
    pub fn return_value(&mut self, result: Option<NodeId>) -> NodeId {
        let ret = self.graph.add(NodeKind::Return {
            result,
            memory_map: None,
        });
        let tail = self.tail;
        self.graph.node_mut(tail).kind.set_next(ret);
        self.tail = ret;
        ret
    }

    /// Splice a fixed node in after `anchor`, which need not be the tail.
    ///
    /// Splicing after the tail advances the tail.
    pub fn splice_after(&mut self, anchor: NodeId, kind: NodeKind, stamp: Stamp) -> Result<NodeId, String> {
        let id = self.graph.insert_after(anchor, kind, stamp)?;
        if anchor == self.tail {
            self.tail = id;
        }
        Ok(id)
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}

// =============================================================================
// Tests
// =============================================================================
