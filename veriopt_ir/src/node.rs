//! IR node definitions.
//!
//! Every host node class the exporter understands is one variant of the
//! closed [`NodeKind`] sum type, with its operands as typed fields:
//! - **Required edges** (`NodeId`): inputs and successors that must exist
//! - **Optional edges** (`Option<NodeId>`): absent is distinct from any id
//! - **Edge lists** (`NodeList`): ordered multi-edges such as phi values
//! - **Literals**: constants, widths, type/field/method references
//!
//! Classes the enum does not model arrive as [`NodeKind::Generic`], carrying
//! their edges in declaration order.

use super::arena::Id;
use super::meta::{FieldRef, MethodRef};
use super::operators::{BinaryOp, ConvertOp, DivRemOp, InvokeKind, MonitorOp, UnaryOp};
use super::stamp::Stamp;
use super::value::Constant;
use smallvec::SmallVec;

// =============================================================================
// Identifiers and Edges
// =============================================================================

/// Identifier of a node within its graph.
pub type NodeId = Id<Node>;

/// Ordered list of node edges; most lists are short.
pub type NodeList = SmallVec<[NodeId; 4]>;

/// One declared edge field of a node, in the shape it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// `@Input`/`@Successor` single edge.
    Required(NodeId),
    /// `@OptionalInput` single edge.
    Optional(Option<NodeId>),
    /// `@Input`/`@Successor` list.
    List(NodeList),
    /// `@OptionalInput` list; `None` when the list itself is absent.
    OptionalList(Option<NodeList>),
}

impl Edge {
    fn collect_into(&self, out: &mut Collector) {
        match self {
            Edge::Required(id) => out.id(*id),
            Edge::Optional(id) => out.opt(*id),
            Edge::List(ids) => out.list(ids),
            Edge::OptionalList(ids) => {
                if let Some(ids) = ids {
                    out.list(ids);
                }
            }
        }
    }
}

// =============================================================================
// Node Kinds
// =============================================================================

/// The closed set of node classes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // --- Arithmetic and logic ---
    Binary {
        op: BinaryOp,
        x: NodeId,
        y: NodeId,
    },
    Unary {
        op: UnaryOp,
        value: NodeId,
    },
    IntegerConvert {
        op: ConvertOp,
        input_bits: u32,
        result_bits: u32,
        value: NodeId,
    },
    IntegerDivRem {
        op: DivRemOp,
        x: NodeId,
        y: NodeId,
        zero_guard: Option<NodeId>,
        state_before: Option<NodeId>,
        next: NodeId,
    },
    Conditional {
        condition: NodeId,
        true_value: NodeId,
        false_value: NodeId,
    },
    LogicNegation {
        value: NodeId,
    },
    IsNull {
        value: NodeId,
    },
    InstanceOf {
        checked_type: String,
        value: NodeId,
    },

    // --- Constants and parameters ---
    Constant {
        value: Constant,
    },
    LogicConstant {
        value: bool,
    },
    Parameter {
        index: u32,
    },

    // --- Control flow ---
    Start {
        state_after: Option<NodeId>,
        /// `None` until the graph has been built.
        next: Option<NodeId>,
    },
    Begin {
        next: NodeId,
    },
    End,
    If {
        condition: NodeId,
        true_successor: NodeId,
        false_successor: NodeId,
    },
    IntegerSwitch {
        successors: NodeList,
        value: NodeId,
    },
    Merge {
        ends: NodeList,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    LoopBegin {
        forward_ends: NodeList,
        loop_ends: NodeList,
        overflow_guard: Option<NodeId>,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    LoopEnd {
        loop_begin: NodeId,
    },
    LoopExit {
        loop_begin: NodeId,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    Return {
        result: Option<NodeId>,
        memory_map: Option<NodeId>,
    },
    Unwind {
        exception: NodeId,
    },
    ControlFlowAnchor {
        next: NodeId,
    },
    BranchProbability {
        probability: NodeId,
        condition: NodeId,
    },

    // --- Phis, proxies and pi ---
    ValuePhi {
        values: NodeList,
        merge: NodeId,
    },
    ValueProxy {
        value: NodeId,
        proxy_point: NodeId,
    },
    Pi {
        object: NodeId,
        guard: Option<NodeId>,
    },
    Opaque {
        value: NodeId,
    },

    // --- Guards and frame states ---
    FixedGuard {
        condition: NodeId,
        state_before: Option<NodeId>,
        next: NodeId,
    },
    Deoptimize {
        state_before: Option<NodeId>,
    },
    FrameState {
        monitor_ids: Option<NodeList>,
        outer_frame_state: Option<NodeId>,
        virtual_object_mappings: NodeList,
    },
    StateSplitProxy {
        state_after: Option<NodeId>,
        object: Option<NodeId>,
        next: NodeId,
    },
    ExceptionObject {
        state_after: Option<NodeId>,
        next: NodeId,
    },
    BytecodeException {
        arguments: NodeList,
        state_after: Option<NodeId>,
        next: NodeId,
    },

    // --- Calls ---
    CallTarget {
        target: MethodRef,
        arguments: NodeList,
        invoke_kind: InvokeKind,
    },
    /// An invoke; with an exception edge it is an `InvokeWithExceptionNode`.
    Invoke {
        call_target: NodeId,
        class_init: Option<NodeId>,
        state_during: Option<NodeId>,
        state_after: Option<NodeId>,
        next: NodeId,
        exception_edge: Option<NodeId>,
    },

    // --- Allocation ---
    NewInstance {
        instance_class: String,
        state_before: Option<NodeId>,
        next: NodeId,
    },
    NewArray {
        length: NodeId,
        state_before: Option<NodeId>,
        next: NodeId,
    },
    NewMultiArray {
        array_type: String,
        dimensions: NodeList,
        state_before: Option<NodeId>,
        next: NodeId,
    },
    DynamicNewArray {
        element_type: NodeId,
        length: NodeId,
        void_class: Option<NodeId>,
        state_before: Option<NodeId>,
        next: NodeId,
    },

    // --- Memory access ---
    LoadField {
        field: FieldRef,
        object: Option<NodeId>,
        next: NodeId,
    },
    StoreField {
        field: FieldRef,
        value: NodeId,
        state_after: Option<NodeId>,
        object: Option<NodeId>,
        next: NodeId,
    },
    LoadIndexed {
        index: NodeId,
        bounds_check: Option<NodeId>,
        array: NodeId,
        next: NodeId,
    },
    StoreIndexed {
        store_check: Option<NodeId>,
        value: NodeId,
        state_after: Option<NodeId>,
        index: NodeId,
        bounds_check: Option<NodeId>,
        array: NodeId,
        next: NodeId,
    },
    ArrayLength {
        array: NodeId,
        next: NodeId,
    },
    RawLoad {
        object: NodeId,
        offset: NodeId,
        next: NodeId,
    },
    RawStore {
        value: NodeId,
        state_after: Option<NodeId>,
        object: NodeId,
        offset: NodeId,
        next: NodeId,
    },
    UnsafeCompareAndSwap {
        object: NodeId,
        offset: NodeId,
        expected: NodeId,
        new_value: NodeId,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    Box {
        value: NodeId,
        last_location_access: Option<NodeId>,
        next: NodeId,
    },
    Unbox {
        value: NodeId,
        last_location_access: Option<NodeId>,
        next: NodeId,
    },
    FinalFieldBarrier {
        value: Option<NodeId>,
        next: NodeId,
    },
    Membar {
        next: NodeId,
    },
    GetClass {
        object: NodeId,
    },
    ClassIsArray {
        value: NodeId,
    },

    // --- Monitors ---
    Monitor {
        op: MonitorOp,
        state_before: Option<NodeId>,
        object: NodeId,
        monitor_id: NodeId,
        object_data: Option<NodeId>,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    MonitorId,

    // --- Encoded through the extractor registry ---
    ArrayCopy {
        args: NodeList,
        state_during: Option<NodeId>,
        last_location_access: Option<NodeId>,
        state_after: Option<NodeId>,
        next: NodeId,
    },
    Assertion {
        condition: NodeId,
        next: NodeId,
    },
    Write {
        value: NodeId,
        state_after: Option<NodeId>,
        last_location_access: Option<NodeId>,
        address: NodeId,
        guard: Option<NodeId>,
        state_before: Option<NodeId>,
        next: NodeId,
    },

    /// A host class with no dedicated variant.
    Generic {
        class_name: String,
        edges: Vec<Edge>,
    },
}

impl NodeKind {
    /// Simple name of the host node class, e.g. `AddNode` or `FrameState`.
    pub fn simple_name(&self) -> &str {
        match self {
            NodeKind::Binary { op, .. } => op.class_name(),
            NodeKind::Unary { op, .. } => op.class_name(),
            NodeKind::IntegerConvert { op, .. } => op.class_name(),
            NodeKind::IntegerDivRem { op, .. } => op.class_name(),
            NodeKind::Conditional { .. } => "ConditionalNode",
            NodeKind::LogicNegation { .. } => "LogicNegationNode",
            NodeKind::IsNull { .. } => "IsNullNode",
            NodeKind::InstanceOf { .. } => "InstanceOfNode",
            NodeKind::Constant { .. } => "ConstantNode",
            NodeKind::LogicConstant { .. } => "LogicConstantNode",
            NodeKind::Parameter { .. } => "ParameterNode",
            NodeKind::Start { .. } => "StartNode",
            NodeKind::Begin { .. } => "BeginNode",
            NodeKind::End => "EndNode",
            NodeKind::If { .. } => "IfNode",
            NodeKind::IntegerSwitch { .. } => "IntegerSwitchNode",
            NodeKind::Merge { .. } => "MergeNode",
            NodeKind::LoopBegin { .. } => "LoopBeginNode",
            NodeKind::LoopEnd { .. } => "LoopEndNode",
            NodeKind::LoopExit { .. } => "LoopExitNode",
            NodeKind::Return { .. } => "ReturnNode",
            NodeKind::Unwind { .. } => "UnwindNode",
            NodeKind::ControlFlowAnchor { .. } => "ControlFlowAnchorNode",
            NodeKind::BranchProbability { .. } => "BranchProbabilityNode",
            NodeKind::ValuePhi { .. } => "ValuePhiNode",
            NodeKind::ValueProxy { .. } => "ValueProxyNode",
            NodeKind::Pi { .. } => "PiNode",
            NodeKind::Opaque { .. } => "OpaqueNode",
            NodeKind::FixedGuard { .. } => "FixedGuardNode",
            NodeKind::Deoptimize { .. } => "DeoptimizeNode",
            NodeKind::FrameState { .. } => "FrameState",
            NodeKind::StateSplitProxy { .. } => "StateSplitProxyNode",
            NodeKind::ExceptionObject { .. } => "ExceptionObjectNode",
            NodeKind::BytecodeException { .. } => "BytecodeExceptionNode",
            NodeKind::CallTarget { .. } => "MethodCallTargetNode",
            NodeKind::Invoke {
                exception_edge: Some(_),
                ..
            } => "InvokeWithExceptionNode",
            NodeKind::Invoke { .. } => "InvokeNode",
            NodeKind::NewInstance { .. } => "NewInstanceNode",
            NodeKind::NewArray { .. } => "NewArrayNode",
            NodeKind::NewMultiArray { .. } => "NewMultiArrayNode",
            NodeKind::DynamicNewArray { .. } => "DynamicNewArrayNode",
            NodeKind::LoadField { .. } => "LoadFieldNode",
            NodeKind::StoreField { .. } => "StoreFieldNode",
            NodeKind::LoadIndexed { .. } => "LoadIndexedNode",
            NodeKind::StoreIndexed { .. } => "StoreIndexedNode",
            NodeKind::ArrayLength { .. } => "ArrayLengthNode",
            NodeKind::RawLoad { .. } => "RawLoadNode",
            NodeKind::RawStore { .. } => "RawStoreNode",
            NodeKind::UnsafeCompareAndSwap { .. } => "UnsafeCompareAndSwapNode",
            NodeKind::Box { .. } => "BoxNode",
            NodeKind::Unbox { .. } => "UnboxNode",
            NodeKind::FinalFieldBarrier { .. } => "FinalFieldBarrierNode",
            NodeKind::Membar { .. } => "MembarNode",
            NodeKind::GetClass { .. } => "GetClassNode",
            NodeKind::ClassIsArray { .. } => "ClassIsArrayNode",
            NodeKind::Monitor { op, .. } => op.class_name(),
            NodeKind::MonitorId => "MonitorIdNode",
            NodeKind::ArrayCopy { .. } => "ArrayCopyNode",
            NodeKind::Assertion { .. } => "AssertionNode",
            NodeKind::Write { .. } => "WriteNode",
            NodeKind::Generic { class_name, .. } => class_name,
        }
    }

    /// Fixed successor of a fixed-with-next node.
    pub fn next(&self) -> Option<NodeId> {
        match self {
            NodeKind::Start { next, .. } => *next,
            NodeKind::IntegerDivRem { next, .. }
            | NodeKind::Begin { next }
            | NodeKind::Merge { next, .. }
            | NodeKind::LoopBegin { next, .. }
            | NodeKind::LoopExit { next, .. }
            | NodeKind::ControlFlowAnchor { next }
            | NodeKind::FixedGuard { next, .. }
            | NodeKind::StateSplitProxy { next, .. }
            | NodeKind::ExceptionObject { next, .. }
            | NodeKind::BytecodeException { next, .. }
            | NodeKind::Invoke { next, .. }
            | NodeKind::NewInstance { next, .. }
            | NodeKind::NewArray { next, .. }
            | NodeKind::NewMultiArray { next, .. }
            | NodeKind::DynamicNewArray { next, .. }
            | NodeKind::LoadField { next, .. }
            | NodeKind::StoreField { next, .. }
            | NodeKind::LoadIndexed { next, .. }
            | NodeKind::StoreIndexed { next, .. }
            | NodeKind::ArrayLength { next, .. }
            | NodeKind::RawLoad { next, .. }
            | NodeKind::RawStore { next, .. }
            | NodeKind::UnsafeCompareAndSwap { next, .. }
            | NodeKind::Box { next, .. }
            | NodeKind::Unbox { next, .. }
            | NodeKind::FinalFieldBarrier { next, .. }
            | NodeKind::Membar { next }
            | NodeKind::Monitor { next, .. }
            | NodeKind::ArrayCopy { next, .. }
            | NodeKind::Assertion { next, .. }
            | NodeKind::Write { next, .. } => Some(*next),
            _ => None,
        }
    }

    /// Redirect the fixed successor. Returns `false` for nodes without one.
    pub fn set_next(&mut self, successor: NodeId) -> bool {
        match self {
            NodeKind::Start { next, .. } => {
                *next = Some(successor);
                true
            }
            NodeKind::IntegerDivRem { next, .. }
            | NodeKind::Begin { next }
            | NodeKind::Merge { next, .. }
            | NodeKind::LoopBegin { next, .. }
            | NodeKind::LoopExit { next, .. }
            | NodeKind::ControlFlowAnchor { next }
            | NodeKind::FixedGuard { next, .. }
            | NodeKind::StateSplitProxy { next, .. }
            | NodeKind::ExceptionObject { next, .. }
            | NodeKind::BytecodeException { next, .. }
            | NodeKind::Invoke { next, .. }
            | NodeKind::NewInstance { next, .. }
            | NodeKind::NewArray { next, .. }
            | NodeKind::NewMultiArray { next, .. }
            | NodeKind::DynamicNewArray { next, .. }
            | NodeKind::LoadField { next, .. }
            | NodeKind::StoreField { next, .. }
            | NodeKind::LoadIndexed { next, .. }
            | NodeKind::StoreIndexed { next, .. }
            | NodeKind::ArrayLength { next, .. }
            | NodeKind::RawLoad { next, .. }
            | NodeKind::RawStore { next, .. }
            | NodeKind::UnsafeCompareAndSwap { next, .. }
            | NodeKind::Box { next, .. }
            | NodeKind::Unbox { next, .. }
            | NodeKind::FinalFieldBarrier { next, .. }
            | NodeKind::Membar { next }
            | NodeKind::Monitor { next, .. }
            | NodeKind::ArrayCopy { next, .. }
            | NodeKind::Assertion { next, .. }
            | NodeKind::Write { next, .. } => {
                *next = successor;
                true
            }
            _ => false,
        }
    }

    /// Whether this node can sit in a fixed chain and be spliced after.
    pub fn has_next(&self) -> bool {
        matches!(self, NodeKind::Start { .. }) || self.next().is_some()
    }

    /// Every node id this node references, in field order.
    pub fn inputs(&self) -> SmallVec<[NodeId; 8]> {
        let mut c = Collector::default();
        match self {
            NodeKind::Binary { x, y, .. } => {
                c.id(*x);
                c.id(*y);
            }
            NodeKind::Unary { value, .. }
            | NodeKind::IntegerConvert { value, .. }
            | NodeKind::LogicNegation { value }
            | NodeKind::IsNull { value }
            | NodeKind::InstanceOf { value, .. }
            | NodeKind::Opaque { value }
            | NodeKind::ClassIsArray { value } => c.id(*value),
            NodeKind::IntegerDivRem {
                x,
                y,
                zero_guard,
                state_before,
                next,
                ..
            } => {
                c.id(*x);
                c.id(*y);
                c.opt(*zero_guard);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::Conditional {
                condition,
                true_value,
                false_value,
            } => {
                c.id(*condition);
                c.id(*true_value);
                c.id(*false_value);
            }
            NodeKind::Constant { .. }
            | NodeKind::LogicConstant { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::End
            | NodeKind::MonitorId => {}
            NodeKind::Start { state_after, next } => {
                c.opt(*state_after);
                c.opt(*next);
            }
            NodeKind::Begin { next }
            | NodeKind::ControlFlowAnchor { next }
            | NodeKind::Membar { next } => c.id(*next),
            NodeKind::If {
                condition,
                true_successor,
                false_successor,
            } => {
                c.id(*condition);
                c.id(*true_successor);
                c.id(*false_successor);
            }
            NodeKind::IntegerSwitch { successors, value } => {
                c.list(successors);
                c.id(*value);
            }
            NodeKind::Merge {
                ends,
                state_after,
                next,
            } => {
                c.list(ends);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::LoopBegin {
                forward_ends,
                loop_ends,
                overflow_guard,
                state_after,
                next,
            } => {
                c.list(forward_ends);
                c.list(loop_ends);
                c.opt(*overflow_guard);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::LoopEnd { loop_begin } => c.id(*loop_begin),
            NodeKind::LoopExit {
                loop_begin,
                state_after,
                next,
            } => {
                c.id(*loop_begin);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::Return { result, memory_map } => {
                c.opt(*result);
                c.opt(*memory_map);
            }
            NodeKind::Unwind { exception } => c.id(*exception),
            NodeKind::BranchProbability {
                probability,
                condition,
            } => {
                c.id(*probability);
                c.id(*condition);
            }
            NodeKind::ValuePhi { values, merge } => {
                c.list(values);
                c.id(*merge);
            }
            NodeKind::ValueProxy { value, proxy_point } => {
                c.id(*value);
                c.id(*proxy_point);
            }
            NodeKind::Pi { object, guard } => {
                c.id(*object);
                c.opt(*guard);
            }
            NodeKind::FixedGuard {
                condition,
                state_before,
                next,
            } => {
                c.id(*condition);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::Deoptimize { state_before } => c.opt(*state_before),
            NodeKind::FrameState {
                monitor_ids,
                outer_frame_state,
                virtual_object_mappings,
            } => {
                if let Some(ids) = monitor_ids {
                    c.list(ids);
                }
                c.opt(*outer_frame_state);
                c.list(virtual_object_mappings);
            }
            NodeKind::StateSplitProxy {
                state_after,
                object,
                next,
            } => {
                c.opt(*state_after);
                c.opt(*object);
                c.id(*next);
            }
            NodeKind::ExceptionObject { state_after, next } => {
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::BytecodeException {
                arguments,
                state_after,
                next,
            } => {
                c.list(arguments);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::CallTarget { arguments, .. } => c.list(arguments),
            NodeKind::Invoke {
                call_target,
                class_init,
                state_during,
                state_after,
                next,
                exception_edge,
            } => {
                c.id(*call_target);
                c.opt(*class_init);
                c.opt(*state_during);
                c.opt(*state_after);
                c.id(*next);
                c.opt(*exception_edge);
            }
            NodeKind::NewInstance {
                state_before, next, ..
            } => {
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::NewArray {
                length,
                state_before,
                next,
            } => {
                c.id(*length);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::NewMultiArray {
                dimensions,
                state_before,
                next,
                ..
            } => {
                c.list(dimensions);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::DynamicNewArray {
                element_type,
                length,
                void_class,
                state_before,
                next,
            } => {
                c.id(*element_type);
                c.id(*length);
                c.opt(*void_class);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::LoadField { object, next, .. } => {
                c.opt(*object);
                c.id(*next);
            }
            NodeKind::StoreField {
                value,
                state_after,
                object,
                next,
                ..
            } => {
                c.id(*value);
                c.opt(*state_after);
                c.opt(*object);
                c.id(*next);
            }
            NodeKind::LoadIndexed {
                index,
                bounds_check,
                array,
                next,
            } => {
                c.id(*index);
                c.opt(*bounds_check);
                c.id(*array);
                c.id(*next);
            }
            NodeKind::StoreIndexed {
                store_check,
                value,
                state_after,
                index,
                bounds_check,
                array,
                next,
            } => {
                c.opt(*store_check);
                c.id(*value);
                c.opt(*state_after);
                c.id(*index);
                c.opt(*bounds_check);
                c.id(*array);
                c.id(*next);
            }
            NodeKind::ArrayLength { array, next } => {
                c.id(*array);
                c.id(*next);
            }
            NodeKind::RawLoad {
                object,
                offset,
                next,
            } => {
                c.id(*object);
                c.id(*offset);
                c.id(*next);
            }
            NodeKind::RawStore {
                value,
                state_after,
                object,
                offset,
                next,
            } => {
                c.id(*value);
                c.opt(*state_after);
                c.id(*object);
                c.id(*offset);
                c.id(*next);
            }
            NodeKind::UnsafeCompareAndSwap {
                object,
                offset,
                expected,
                new_value,
                state_after,
                next,
            } => {
                c.id(*object);
                c.id(*offset);
                c.id(*expected);
                c.id(*new_value);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::Box {
                value,
                last_location_access,
                next,
            }
            | NodeKind::Unbox {
                value,
                last_location_access,
                next,
            } => {
                c.id(*value);
                c.opt(*last_location_access);
                c.id(*next);
            }
            NodeKind::FinalFieldBarrier { value, next } => {
                c.opt(*value);
                c.id(*next);
            }
            NodeKind::GetClass { object } => c.id(*object),
            NodeKind::Monitor {
                state_before,
                object,
                monitor_id,
                object_data,
                state_after,
                next,
                ..
            } => {
                c.opt(*state_before);
                c.id(*object);
                c.id(*monitor_id);
                c.opt(*object_data);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::ArrayCopy {
                args,
                state_during,
                last_location_access,
                state_after,
                next,
            } => {
                c.list(args);
                c.opt(*state_during);
                c.opt(*last_location_access);
                c.opt(*state_after);
                c.id(*next);
            }
            NodeKind::Assertion { condition, next } => {
                c.id(*condition);
                c.id(*next);
            }
            NodeKind::Write {
                value,
                state_after,
                last_location_access,
                address,
                guard,
                state_before,
                next,
            } => {
                c.id(*value);
                c.opt(*state_after);
                c.opt(*last_location_access);
                c.id(*address);
                c.opt(*guard);
                c.opt(*state_before);
                c.id(*next);
            }
            NodeKind::Generic { edges, .. } => {
                for edge in edges {
                    edge.collect_into(&mut c);
                }
            }
        }
        c.0
    }
}

#[derive(Default)]
struct Collector(SmallVec<[NodeId; 8]>);

impl Collector {
    #[inline]
    fn id(&mut self, id: NodeId) {
        self.0.push(id);
    }

    #[inline]
    fn opt(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.0.push(id);
        }
    }

    #[inline]
    fn list(&mut self, ids: &[NodeId]) {
        self.0.extend_from_slice(ids);
    }
}

// =============================================================================
// Node
// =============================================================================

bitflags::bitflags! {
    /// Node state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Node was removed from the graph; its id stays reserved.
        const DELETED = 0b0000_0001;
        /// Node was added by setup synthesis rather than the host compiler.
        const SYNTHETIC = 0b0000_0010;
    }
}

/// A node: its class with operands, plus the stamp it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub stamp: Stamp,
    pub flags: NodeFlags,
}

impl Node {
    /// A node producing no value.
    pub fn new(kind: NodeKind) -> Self {
        Self::with_stamp(kind, Stamp::Illegal)
    }

    pub fn with_stamp(kind: NodeKind, stamp: Stamp) -> Self {
        Self {
            kind,
            stamp,
            flags: NodeFlags::empty(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.flags.contains(NodeFlags::DELETED)
    }

    #[inline]
    pub fn simple_name(&self) -> &str {
        self.kind.simple_name()
    }
}

// =============================================================================
// Tests
// =============================================================================
