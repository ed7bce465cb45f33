//! Graph to node-array translation.
//!
//! `write_node_array` walks a graph's live nodes in id order and renders
//! each one as `(id, (Tag args), stamp)`. The output is
//!
//! ```text
//! [
//!   (0, (StartNode (Some 2) 3), IllegalStamp),
//!   ...
//!   ]
//! ```
//!
//! with no comma after the last element. Translation is all-or-nothing: the
//! first node that cannot be encoded fails the whole graph.
//!
//! Allocations seen along the way are reported as [`Discoveries`] so the
//! caller can register the instantiated classes and their methods.

use crate::config::{AllowList, ExportConfig};
use crate::dynamic;
use crate::encode::encode_stamp;
use crate::error::{ExportError, Result};
use crate::node_builder::NodeTermBuilder;
use tracing::trace;
use veriopt_ir::{Constant, Graph, MethodRef, Node, NodeId, NodeKind, TypeUniverse, Value};

/// Side effects of translating one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discoveries {
    /// Classes instantiated by the graph, in node order.
    pub classes: Vec<String>,
    /// Declared methods and constructors of those classes.
    pub methods: Vec<MethodRef>,
}

/// A translated graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub node_array: String,
    pub discovered: Discoveries,
}

/// Everything translation reads; cheap to build per call.
pub struct GraphTranslator<'a> {
    pub config: &'a ExportConfig,
    pub allow_list: &'a AllowList,
    pub universe: &'a TypeUniverse,
}

impl<'a> GraphTranslator<'a> {
    pub fn new(config: &'a ExportConfig, allow_list: &'a AllowList, universe: &'a TypeUniverse) -> Self {
        Self {
            config,
            allow_list,
            universe,
        }
    }

    /// Render the `[...]` node array of `graph`.
    pub fn write_node_array(&self, graph: &Graph) -> Result<Translation> {
        let mut out = String::from("[");
        let mut discovered = Discoveries::default();
        let mut count = 0usize;

        for (id, node) in graph.iter() {
            // The stamp is encoded before anything else, so even skipped
            // nodes must carry an encodable stamp.
            let stamp = encode_stamp(&node.stamp, self.config)?;
            let mut term = NodeTermBuilder::new(graph, id, node.simple_name(), stamp);

            if !self.allow_list.allows(node.simple_name()) {
                return Err(ExportError::unsupported_node(format!(
                    "node type {} ({}) is not in the node allow-list",
                    node_label(id, node),
                    node.simple_name()
                )));
            }
            if !self.encode_node(id, node, &mut term, &mut discovered)? {
                continue;
            }
            out.push_str(&term.to_string());
            count += 1;
        }

        if out.ends_with(',') {
            out.pop();
        }
        out.push_str("\n  ]");
        trace!(
            graph = graph.display_name().as_deref().unwrap_or("<anonymous>"),
            nodes = count,
            "translated graph"
        );
        Ok(Translation {
            node_array: out,
            discovered,
        })
    }

    /// Append the arguments of one node. Returns `false` for nodes that are
    /// left out of the array.
    fn encode_node(
        &self,
        id: NodeId,
        node: &Node,
        t: &mut NodeTermBuilder<'_>,
        discovered: &mut Discoveries,
    ) -> Result<bool> {
        match &node.kind {
            NodeKind::Binary { x, y, .. } => {
                t.id(*x)?.id(*y)?;
            }
            NodeKind::Unary { value, .. }
            | NodeKind::LogicNegation { value }
            | NodeKind::IsNull { value }
            | NodeKind::Opaque { value }
            | NodeKind::ClassIsArray { value } => {
                t.id(*value)?;
            }
            NodeKind::IntegerConvert {
                input_bits,
                result_bits,
                value,
                ..
            } => {
                t.nat(*input_bits).nat(*result_bits).id(*value)?;
            }
            NodeKind::IntegerDivRem {
                x,
                y,
                zero_guard,
                state_before,
                next,
                ..
            } => {
                t.id(id)?
                    .id(*x)?
                    .id(*y)?
                    .opt_id(*zero_guard)?
                    .opt_id(*state_before)?
                    .id(*next)?;
            }
            NodeKind::Conditional {
                condition,
                true_value,
                false_value,
            } => {
                t.id(*condition)?.id(*true_value)?.id(*false_value)?;
            }
            NodeKind::InstanceOf {
                checked_type,
                value,
            } => {
                t.type_ref(checked_type).id(*value)?;
            }

            NodeKind::Constant { value } => match value {
                Constant::Primitive(v) => {
                    t.value(v)?;
                }
                Constant::Null => {
                    t.value(&Value::Null)?;
                }
                Constant::Object(desc) => {
                    return Err(ExportError::unsupported_value(format!(
                        "constant type {} not implemented yet.",
                        desc
                    )))
                }
            },
            NodeKind::LogicConstant { value } => {
                t.retag("ConstantNode").value(&Value::Bool(*value))?;
            }
            NodeKind::Parameter { index } => {
                t.nat(*index);
            }

            NodeKind::Start { state_after, next } => {
                let next = next.ok_or_else(|| {
                    ExportError::malformed("StartNode.next is null. Has this graph been built?")
                })?;
                t.opt_id(*state_after)?.id(next)?;
            }
            NodeKind::Begin { next }
            | NodeKind::ControlFlowAnchor { next }
            | NodeKind::Membar { next } => {
                t.id(*next)?;
            }
            NodeKind::End | NodeKind::MonitorId => {}
            NodeKind::If {
                condition,
                true_successor,
                false_successor,
            } => {
                t.id(*condition)?.id(*true_successor)?.id(*false_successor)?;
            }
            NodeKind::IntegerSwitch { successors, value } => {
                t.id_list(successors)?.id(*value)?;
            }
            NodeKind::Merge {
                ends,
                state_after,
                next,
            } => {
                t.id_list(ends)?.opt_id(*state_after)?.id(*next)?;
            }
            NodeKind::LoopBegin {
                forward_ends,
                loop_ends,
                overflow_guard,
                state_after,
                next,
            } => {
                let ends: Vec<NodeId> = forward_ends.iter().chain(loop_ends.iter()).copied().collect();
                t.id_list(&ends)?
                    .opt_id(*overflow_guard)?
                    .opt_id(*state_after)?
                    .id(*next)?;
            }
            NodeKind::LoopEnd { loop_begin } => {
                t.id(*loop_begin)?;
            }
            NodeKind::LoopExit {
                loop_begin,
                state_after,
                next,
            } => {
                t.id(*loop_begin)?.opt_id(*state_after)?.id(*next)?;
            }
            NodeKind::Return { result, memory_map } => {
                t.opt_id(*result)?.opt_id(*memory_map)?;
            }
            NodeKind::Unwind { exception } => {
                t.id(*exception)?;
            }
            NodeKind::BranchProbability { .. } => return Ok(false),

            NodeKind::ValuePhi { values, merge } => {
                t.id(id)?.id_list(values)?.id(*merge)?;
            }
            NodeKind::ValueProxy { value, .. } => {
                // proxies are plain references in the term language
                t.retag("RefNode").id(*value)?;
            }
            NodeKind::Pi { object, guard } => {
                t.id(*object)?.opt_id(*guard)?;
            }

            NodeKind::FixedGuard {
                condition,
                state_before,
                next,
            } => {
                t.id(*condition)?.opt_id(*state_before)?.id(*next)?;
            }
            NodeKind::Deoptimize { state_before } => {
                t.opt_id(*state_before)?;
            }
            NodeKind::FrameState {
                monitor_ids,
                outer_frame_state,
                virtual_object_mappings,
            } => {
                match monitor_ids {
                    Some(ids) => t.id_list(ids)?,
                    None => t.arg("[]"),
                };
                t.opt_id(*outer_frame_state)?
                    .arg("None")
                    .opt_id_list(Some(virtual_object_mappings))?;
            }
            NodeKind::StateSplitProxy {
                state_after,
                object,
                next,
            } => {
                t.opt_id(*state_after)?.opt_id(*object)?.id(*next)?;
            }
            NodeKind::ExceptionObject { state_after, next } => {
                t.opt_id(*state_after)?.id(*next)?;
            }
            NodeKind::BytecodeException {
                arguments,
                state_after,
                next,
            } => {
                t.id_list(arguments)?.opt_id(*state_after)?.id(*next)?;
            }

            NodeKind::CallTarget {
                target,
                arguments,
                invoke_kind,
            } => {
                t.method_ref(target).id_list(arguments)?.invoke_kind(*invoke_kind);
            }
            NodeKind::Invoke {
                call_target,
                class_init,
                state_during,
                state_after,
                next,
                exception_edge,
            } => {
                t.id(id)?
                    .id(*call_target)?
                    .opt_id(*class_init)?
                    .opt_id(*state_during)?
                    .opt_id(*state_after)?
                    .id(*next)?;
                if let Some(edge) = exception_edge {
                    t.id(*edge)?;
                }
            }

            NodeKind::NewInstance {
                instance_class,
                state_before,
                next,
            } => {
                t.id(id)?
                    .type_ref(instance_class)
                    .opt_id(*state_before)?
                    .id(*next)?;
                self.discover(instance_class, discovered);
            }
            NodeKind::NewArray {
                length,
                state_before,
                next,
            } => {
                t.id(*length)?.opt_id(*state_before)?.id(*next)?;
            }
            NodeKind::NewMultiArray {
                array_type,
                dimensions,
                state_before,
                next,
            } => {
                t.id(id)?
                    .type_ref(array_type)
                    .id_list(dimensions)?
                    .opt_id(*state_before)?
                    .id(*next)?;
            }
            NodeKind::DynamicNewArray {
                element_type,
                length,
                void_class,
                state_before,
                next,
            } => {
                t.id(*element_type)?
                    .id(*length)?
                    .opt_id(*void_class)?
                    .opt_id(*state_before)?
                    .id(*next)?;
            }

            NodeKind::LoadField {
                field,
                object,
                next,
            } => {
                t.id(id)?.field_ref(field).opt_id(*object)?.id(*next)?;
            }
            NodeKind::StoreField {
                field,
                value,
                state_after,
                object,
                next,
            } => {
                t.id(id)?
                    .field_ref(field)
                    .id(*value)?
                    .opt_id(*state_after)?
                    .opt_id(*object)?
                    .id(*next)?;
            }
            NodeKind::LoadIndexed {
                index,
                bounds_check,
                array,
                next,
            } => {
                t.id(*index)?.opt_id(*bounds_check)?.id(*array)?.id(*next)?;
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
                t.opt_id(*store_check)?
                    .id(*value)?
                    .opt_id(*state_after)?
                    .id(*index)?
                    .opt_id(*bounds_check)?
                    .id(*array)?
                    .id(*next)?;
            }
            NodeKind::ArrayLength { array, next } => {
                t.id(*array)?.id(*next)?;
            }
            NodeKind::RawLoad {
                object,
                offset,
                next,
            } => {
                t.id(*object)?.id(*offset)?.id(*next)?;
            }
            NodeKind::RawStore {
                value,
                state_after,
                object,
                offset,
                next,
            } => {
                t.id(*value)?
                    .opt_id(*state_after)?
                    .id(*object)?
                    .id(*offset)?
                    .id(*next)?;
            }
            NodeKind::UnsafeCompareAndSwap {
                object,
                offset,
                expected,
                new_value,
                state_after,
                next,
            } => {
                t.id(*object)?
                    .id(*offset)?
                    .id(*expected)?
                    .id(*new_value)?
                    .opt_id(*state_after)?
                    .id(*next)?;
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
                t.id(*value)?.opt_id(*last_location_access)?.id(*next)?;
            }
            NodeKind::FinalFieldBarrier { value, next } => {
                t.opt_id(*value)?.id(*next)?;
            }
            NodeKind::GetClass { object } => {
                t.id(*object)?;
            }

            NodeKind::Monitor {
                state_before,
                object,
                monitor_id,
                object_data,
                state_after,
                next,
                ..
            } => {
                t.opt_id(*state_before)?
                    .id(*object)?
                    .id(*monitor_id)?
                    .opt_id(*object_data)?
                    .opt_id(*state_after)?
                    .id(*next)?;
            }

            NodeKind::ArrayCopy { .. } | NodeKind::Assertion { .. } | NodeKind::Write { .. } => {
                self.encode_dynamically(node, t)?;
            }
            NodeKind::Generic { class_name, .. } => {
                if !self.config.translate_all_dynamically && !dynamic::is_registered(class_name) {
                    return Err(ExportError::unsupported_node(format!(
                        "node type {} not implemented yet.",
                        class_name
                    )));
                }
                self.encode_dynamically(node, t)?;
            }
        }
        Ok(true)
    }

    fn encode_dynamically(&self, node: &Node, t: &mut NodeTermBuilder<'_>) -> Result<()> {
        let edges = dynamic::declared_edges(&node.kind).ok_or_else(|| {
            ExportError::unsupported_node(format!(
                "node type {} not implemented yet.",
                node.simple_name()
            ))
        })?;
        dynamic::write_edges(t, &edges)
    }

    /// Record an instantiated class and everything callable on it.
    fn discover(&self, class: &str, discovered: &mut Discoveries) {
        discovered.classes.push(class.to_string());
        let declared = self
            .universe
            .declared_methods(class)
            .iter()
            .chain(self.universe.declared_constructors(class));
        discovered
            .methods
            .extend(declared.map(|info| info.method.clone()));
    }
}

/// `id|Short` label used in diagnostics, e.g. `5|Add`.
fn node_label(id: NodeId, node: &Node) -> String {
    let name = node.simple_name();
    format!("{}|{}", id, name.strip_suffix("Node").unwrap_or(name))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use veriopt_ir::{
        BinaryOp, ClassInfo, Edge, GraphBuilder, InvokeKind, JavaType, MethodFlags,
        MethodSignature, NodeList, Stamp,
    };

    fn add_method() -> MethodRef {
        MethodRef::new(
            "demo.Math",
            "add",
            MethodSignature::new(vec![JavaType::int(), JavaType::int()], JavaType::int()),
        )
    }

    fn add_graph() -> Graph {
        let mut b = GraphBuilder::for_method(add_method());
        b.frame_state();
        let x = b.param(0, Stamp::int(32));
        let y = b.param(1, Stamp::int(32));
        let sum = b.binary(BinaryOp::Add, x, y, Stamp::int(32));
        b.return_value(Some(sum));
        b.finish()
    }

    struct Env {
        config: ExportConfig,
        allow_list: AllowList,
        universe: TypeUniverse,
    }

    impl Env {
        fn new() -> Self {
            Self {
                config: ExportConfig::default(),
                allow_list: AllowList::allow_all(),
                universe: TypeUniverse::new(),
            }
        }

        fn translate(&self, graph: &Graph) -> Result<Translation> {
            GraphTranslator::new(&self.config, &self.allow_list, &self.universe).write_node_array(graph)
        }
    }

    // =========================================================================
    // Whole Graphs
    // =========================================================================

    #[test]
    fn test_add_graph() {
        let out = Env::new().translate(&add_graph()).unwrap();
        let expected = "[\
\n  (0, (StartNode (Some 1) 5), IllegalStamp),\
\n  (1, (FrameState [] None None None), IllegalStamp),\
\n  (2, (ParameterNode 0), IntegerStamp 32 (-2147483648) (2147483647)),\
\n  (3, (ParameterNode 1), IntegerStamp 32 (-2147483648) (2147483647)),\
\n  (4, (AddNode 2 3), IntegerStamp 32 (-2147483648) (2147483647)),\
\n  (5, (ReturnNode (Some 4) None), IllegalStamp)\
\n  ]";
        assert_eq!(out.node_array, expected);
        assert!(out.discovered.classes.is_empty());
    }

    #[test]
    fn test_translation_is_deterministic() {
        let env = Env::new();
        let g = add_graph();
        assert_eq!(env.translate(&g).unwrap(), env.translate(&g).unwrap());
    }

    #[test]
    fn test_unbuilt_graph_fails() {
        let err = Env::new().translate(&Graph::new()).unwrap_err();
        assert_eq!(
            err,
            ExportError::malformed("StartNode.next is null. Has this graph been built?")
        );
    }

    // =========================================================================
    // Individual Node Forms
    // =========================================================================

    #[test]
    fn test_logic_constant_and_proxy() {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let c = b.floating(NodeKind::LogicConstant { value: true }, Stamp::int_range(32, 1, 1));
        let p = b.floating(
            NodeKind::ValueProxy {
                value: c,
                proxy_point: c,
            },
            Stamp::int_range(32, 1, 1),
        );
        b.return_value(Some(p));
        let out = Env::new().translate(&b.finish()).unwrap().node_array;
        assert!(out.contains("(1, (ConstantNode (new_int 1 (1))), IntegerStamp 32 (1) (1))"));
        assert!(out.contains("(2, (RefNode 1), IntegerStamp 32 (1) (1))"));
    }

    #[test]
    fn test_branch_probability_is_skipped() {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let p = b.const_int(1);
        let bp = b.floating(
            NodeKind::BranchProbability {
                probability: p,
                condition: p,
            },
            Stamp::int(32),
        );
        b.return_value(Some(p));
        let out = Env::new().translate(&b.finish()).unwrap().node_array;
        assert!(!out.contains("BranchProbability"));
        assert!(!out.contains(&format!("({}, ", bp)));
    }

    #[test]
    fn test_invoke_and_call_target() {
        let callee = MethodRef::new("demo.Util", "id", MethodSignature::new(vec![JavaType::int()], JavaType::int()));
        let mut b = GraphBuilder::for_method(add_method());
        let x = b.param(0, Stamp::int(32));
        let ct = b.call_target(callee, &[x], InvokeKind::Static);
        let inv = b.invoke(ct, Stamp::int(32));
        b.return_value(Some(inv));
        let out = Env::new().translate(&b.finish()).unwrap().node_array;
        assert!(out.contains("(2, (MethodCallTargetNode ''demo.Util.id(I)I'' [1] Static), VoidStamp)"));
        assert!(out.contains("(3, (InvokeNode 3 2 None None None 4), IntegerStamp 32"));
    }

    #[test]
    fn test_loop_begin_lists_all_ends() {
        let mut g = Graph::named("loop");
        let end = g.add(NodeKind::End);
        let lb = g.add(NodeKind::LoopBegin {
            forward_ends: smallvec![end],
            loop_ends: NodeList::new(),
            overflow_guard: None,
            state_after: None,
            next: NodeId::INVALID,
        });
        let le = g.add(NodeKind::LoopEnd { loop_begin: lb });
        if let NodeKind::LoopBegin { loop_ends, next, .. } = &mut g.node_mut(lb).kind {
            loop_ends.push(le);
            *next = le;
        }
        g.node_mut(g.start).kind.set_next(end);
        let out = Env::new().translate(&g).unwrap().node_array;
        assert!(out.contains("(2, (LoopBeginNode [1, 3] None None 3), IllegalStamp)"));
    }

    #[test]
    fn test_new_instance_is_discovered() {
        let mut env = Env::new();
        env.universe.define(
            ClassInfo::new("demo.Point")
                .field("x", JavaType::int())
                .constructor(Vec::new())
                .method(
                    "getX",
                    MethodSignature::new(Vec::new(), JavaType::int()),
                    MethodFlags::empty(),
                ),
        );
        let mut b = GraphBuilder::new(Graph::named("g"));
        let obj = b.new_instance("demo.Point");
        b.return_value(Some(obj));
        let out = env.translate(&b.finish()).unwrap();

        assert!(out
            .node_array
            .contains("(1, (NewInstanceNode 1 ''demo.Point'' None 2), ObjectStamp ''demo.Point'' True True False)"));
        assert_eq!(out.discovered.classes, vec!["demo.Point".to_string()]);
        let names: Vec<_> = out.discovered.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["getX", "<init>"]);
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn test_allow_list_rejects() {
        let mut env = Env::new();
        env.allow_list = AllowList::from_text("StartNode FrameState ParameterNode ReturnNode");
        let err = env.translate(&add_graph()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "node type 4|Add (AddNode) is not in the node allow-list"
        );
    }

    #[test]
    fn test_generic_requires_dynamic_flag() {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let c = b.const_int(2);
        b.floating(
            NodeKind::Generic {
                class_name: "FooNode".into(),
                edges: vec![Edge::Required(c), Edge::Optional(None)],
            },
            Stamp::Illegal,
        );
        b.return_value(None);
        let g = b.finish();

        let mut env = Env::new();
        let err = env.translate(&g).unwrap_err();
        assert_eq!(err.to_string(), "node type FooNode not implemented yet.");

        env.config = env.config.clone().with_translate_all_dynamically(true);
        let out = env.translate(&g).unwrap().node_array;
        assert!(out.contains("(2, (FooNode 1 None), IllegalStamp)"));
    }

    #[test]
    fn test_object_constant_fails() {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let c = b.floating(
            NodeKind::Constant {
                value: Constant::Object("java.util.ArrayList@1".into()),
            },
            Stamp::object("java.util.ArrayList"),
        );
        b.return_value(Some(c));
        let err = Env::new().translate(&b.finish()).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedValue(_)));
    }

    #[test]
    fn test_float_stamp_fails_without_flag() {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let c = b.constant(Value::Double(1.5), Stamp::Float(veriopt_ir::FloatStamp::new(64, 1.5, 1.5)));
        b.return_value(Some(c));
        let g = b.finish();

        let mut env = Env::new();
        assert!(matches!(env.translate(&g), Err(ExportError::UnsupportedStamp(_))));
        env.config = env.config.clone().with_float_stamps(true);
        let out = env.translate(&g).unwrap().node_array;
        assert!(out.contains("(1, (ConstantNode (FloatVal 64 (1.5))), FloatStamp 64 (1.5) (1.5))"));
    }
}
