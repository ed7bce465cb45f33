//! Setup graphs and field initialization for exported tests.
//!
//! A test that needs heap state runs a setup graph first. The setup graph
//! allocates the receiver and every object argument, stores their fields,
//! resets the static fields the program reads, and finally runs the class
//! initializer of the method's holder so it can overwrite those defaults.
//!
//! Graphs of the program itself get default-value stores spliced in after
//! each allocation of a test class, so freshly created objects have every
//! field in the heap.

use crate::error::{ExportError, Result};
use crate::testcase::{ObjectValue, TestArg};
use std::sync::Arc;
use veriopt_ir::{
    FieldInfo, FieldRef, FloatStamp, Graph, GraphBuilder, InvokeKind, MethodRef, NodeId,
    NodeKind, Stamp, TypeUniverse, Value,
};

/// Name of the setup graph inside a program.
pub const SETUP_GRAPH_NAME: &str = "";

// =============================================================================
// Constants
// =============================================================================

/// Exact stamp of a field constant.
///
/// Sub-word integrals are widened to 32 bits, as the host stack does.
pub fn constant_stamp(value: &Value) -> Stamp {
    match value {
        Value::Bool(v) => exact_int(32, *v as i64),
        Value::Byte(v) => exact_int(32, *v as i64),
        Value::Short(v) => exact_int(32, *v as i64),
        Value::Char(v) => exact_int(32, *v as i64),
        Value::Int(v) => exact_int(32, *v as i64),
        Value::Long(v) => exact_int(64, *v),
        Value::Float(v) => Stamp::Float(FloatStamp::new(32, *v as f64, *v as f64)),
        Value::Double(v) => Stamp::Float(FloatStamp::new(64, *v, *v)),
        _ => Stamp::null(),
    }
}

#[inline]
fn exact_int(bits: u32, v: i64) -> Stamp {
    Stamp::int_range(bits, v, v)
}

/// Value a field is initialized to. Only primitives are stored by value;
/// anything else, nested objects included, becomes null.
fn stored_value(value: Option<&TestArg>) -> Value {
    match value {
        Some(TestArg::Value(v)) if v.is_integral_primitive() || v.is_floating() => v.clone(),
        _ => Value::Null,
    }
}

/// An existing constant node with this value and stamp, or a new one.
fn unique_constant(graph: &mut Graph, value: Value) -> (NodeId, Stamp) {
    let stamp = constant_stamp(&value);
    let kind = NodeKind::Constant {
        value: veriopt_ir::Constant::from_value(value),
    };
    let existing = graph
        .iter()
        .find(|(_, node)| node.kind == kind && node.stamp == stamp)
        .map(|(id, _)| id);
    let id = existing.unwrap_or_else(|| graph.add_with_stamp(kind, stamp.clone()));
    (id, stamp)
}

fn store_kind(field: FieldRef, value: NodeId, object: Option<NodeId>) -> NodeKind {
    NodeKind::StoreField {
        field,
        value,
        state_after: None,
        object,
        next: NodeId::INVALID,
    }
}

/// Splice a store of each field after `anchor`, in order. Returns the last
/// node of the chain.
fn splice_stores(
    graph: &mut Graph,
    anchor: NodeId,
    object: NodeId,
    fields: &[(FieldRef, Value)],
) -> Result<NodeId> {
    let mut last = anchor;
    for (field, value) in fields {
        let (constant, stamp) = unique_constant(graph, value.clone());
        last = graph
            .insert_after(last, store_kind(field.clone(), constant, Some(object)), stamp)
            .map_err(ExportError::malformed)?;
    }
    Ok(last)
}

/// Declared instance fields of `class` with their default values.
fn default_fields(universe: &TypeUniverse, class: &str) -> Vec<(FieldRef, Value)> {
    universe
        .class(class)
        .map(|info| {
            info.instance_fields()
                .map(|f| (f.field.clone(), f.ty.default_value()))
                .collect()
        })
        .unwrap_or_default()
}

/// Declared instance fields of the object's class with the object's values.
fn actual_fields(universe: &TypeUniverse, object: &ObjectValue) -> Vec<(FieldRef, Value)> {
    universe
        .class(&object.class)
        .map(|info| {
            info.instance_fields()
                .map(|f| (f.field.clone(), stored_value(object.get(&f.field))))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Setup Graph
// =============================================================================

/// What a setup graph has to establish before the test method runs.
#[derive(Debug, Clone, Copy)]
pub struct SetupRequest<'a> {
    pub method: &'a MethodRef,
    pub is_static: bool,
    pub args: &'a [TestArg],
    /// Static fields reset to their defaults.
    pub static_fields: &'a [FieldInfo],
}

/// Build the setup graph.
///
/// Object arguments are all allocated first, in argument order, then each
/// gets its field stores. Static fields follow, then the holder's class
/// initializer if it has one.
pub fn setup_graph(universe: &TypeUniverse, request: SetupRequest<'_>) -> Result<Graph> {
    let mut b = GraphBuilder::new(Graph::named(SETUP_GRAPH_NAME));
    b.frame_state();

    if !request.is_static {
        let receiver = b.new_instance(&request.method.holder);
        let fields = default_fields(universe, &request.method.holder);
        splice_tail(&mut b, receiver, &fields)?;
    }

    let objects: Vec<(NodeId, &ObjectValue)> = request
        .args
        .iter()
        .filter_map(|arg| match arg {
            TestArg::Object(object) => Some(object),
            TestArg::Value(_) => None,
        })
        .map(|object| (b.new_instance(&object.class), object))
        .collect();
    for (node, object) in objects {
        let fields = actual_fields(universe, object);
        splice_tail(&mut b, node, &fields)?;
    }

    for info in request.static_fields {
        let (constant, stamp) = unique_constant(b.graph_mut(), info.ty.default_value());
        b.fixed(store_kind(info.field.clone(), constant, None), stamp);
    }

    if let Some(clinit) = universe.class_initializer(&request.method.holder) {
        let target = b.call_target(clinit.method.clone(), &[], InvokeKind::Static);
        let invoke = b.invoke(target, Stamp::Void);
        let state = b.frame_state();
        if let NodeKind::Invoke { state_after, .. } = &mut b.graph_mut().node_mut(invoke).kind {
            *state_after = Some(state);
        }
    }
    b.return_value(None);
    Ok(b.finish())
}

/// Splice stores after `object`, advancing the builder's tail past them
/// when `object` is the tail.
fn splice_tail(b: &mut GraphBuilder, object: NodeId, fields: &[(FieldRef, Value)]) -> Result<()> {
    let mut anchor = object;
    for (field, value) in fields {
        let (constant, stamp) = unique_constant(b.graph_mut(), value.clone());
        anchor = b
            .splice_after(anchor, store_kind(field.clone(), constant, Some(object)), stamp)
            .map_err(ExportError::malformed)?;
    }
    Ok(())
}

// =============================================================================
// Dynamic Fields
// =============================================================================

/// Give every allocation of a test class default field stores.
///
/// The setup graph is left alone. Graphs are copied on write, so graphs
/// shared with the cache are never changed.
pub fn instantiate_dynamic_fields(
    program: &mut [Arc<Graph>],
    universe: &TypeUniverse,
    test_classes: &[String],
) -> Result<()> {
    for graph in program.iter_mut() {
        if graph.name() == Some(SETUP_GRAPH_NAME) {
            continue;
        }
        let allocations: Vec<(NodeId, Vec<(FieldRef, Value)>)> = graph
            .iter()
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::NewInstance { instance_class, .. }
                    if test_classes.iter().any(|c| c == instance_class) =>
                {
                    Some((id, default_fields(universe, instance_class)))
                }
                _ => None,
            })
            .filter(|(_, fields)| !fields.is_empty())
            .collect();
        if allocations.is_empty() {
            continue;
        }

        let graph = Arc::make_mut(graph);
        for (node, fields) in &allocations {
            splice_stores(graph, *node, *node, fields)?;
        }
    }
    Ok(())
}

/// Static fields of `classes` that some graph of `program` loads, in class
/// then declaration order.
pub fn loaded_static_fields(
    universe: &TypeUniverse,
    classes: &[String],
    program: &[Arc<Graph>],
) -> Vec<FieldInfo> {
    let loaded: Vec<&FieldRef> = program
        .iter()
        .flat_map(|g| g.iter())
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::LoadField { field, .. } => Some(field),
            _ => None,
        })
        .collect();

    classes
        .iter()
        .filter_map(|c| universe.class(c))
        .flat_map(|info| info.static_fields())
        .filter(|f| loaded.contains(&&f.field))
        .cloned()
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
