//! Edge-driven encoding for node classes without a hand-written term.
//!
//! A small registry maps class names to extractors that list a node's
//! declared edges in declaration order (subclass fields first, then the
//! superclass chain, ending with `next`). The term is those edges, each
//! written in the form its declaration implies. The same routine serves
//! [`NodeKind::Generic`] nodes, which carry their edges already.

use crate::error::Result;
use crate::node_builder::NodeTermBuilder;
use veriopt_ir::{Edge, NodeKind};

/// Lists a node's declared edges; `None` when handed a different class.
pub type EdgeExtractor = fn(&NodeKind) -> Option<Vec<Edge>>;

static REGISTRY: &[(&str, EdgeExtractor)] = &[
    ("ArrayCopyNode", array_copy_edges),
    ("AssertionNode", assertion_edges),
    ("WriteNode", write_node_edges),
];

/// Extractor registered for `class_name`.
pub fn extractor_for(class_name: &str) -> Option<EdgeExtractor> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, extract)| *extract)
}

/// Whether `class_name` is always encoded through its edges.
pub fn is_registered(class_name: &str) -> bool {
    extractor_for(class_name).is_some()
}

/// Declared edges of any node that has them available: registered classes
/// and generic nodes.
pub fn declared_edges(kind: &NodeKind) -> Option<Vec<Edge>> {
    match kind {
        NodeKind::Generic { edges, .. } => Some(edges.clone()),
        other => extractor_for(other.simple_name()).and_then(|extract| extract(other)),
    }
}

/// Append `edges` to the term.
pub fn write_edges(builder: &mut NodeTermBuilder<'_>, edges: &[Edge]) -> Result<()> {
    for edge in edges {
        match edge {
            Edge::Required(id) => builder.id(*id)?,
            Edge::Optional(id) => builder.opt_id(*id)?,
            Edge::List(ids) => builder.id_list(ids)?,
            Edge::OptionalList(ids) => builder.opt_id_list(ids.as_deref())?,
        };
    }
    Ok(())
}

// =============================================================================
// Extractors
// =============================================================================

fn array_copy_edges(kind: &NodeKind) -> Option<Vec<Edge>> {
    match kind {
        NodeKind::ArrayCopy {
            args,
            state_during,
            last_location_access,
            state_after,
            next,
        } => Some(vec![
            Edge::List(args.clone()),
            Edge::Optional(*state_during),
            Edge::Optional(*last_location_access),
            Edge::Optional(*state_after),
            Edge::Required(*next),
        ]),
        _ => None,
    }
}

fn assertion_edges(kind: &NodeKind) -> Option<Vec<Edge>> {
    match kind {
        NodeKind::Assertion { condition, next } => {
            Some(vec![Edge::Required(*condition), Edge::Required(*next)])
        }
        _ => None,
    }
}

fn write_node_edges(kind: &NodeKind) -> Option<Vec<Edge>> {
    match kind {
        NodeKind::Write {
            value,
            state_after,
            last_location_access,
            address,
            guard,
            state_before,
            next,
        } => Some(vec![
            Edge::Required(*value),
            Edge::Optional(*state_after),
            Edge::Optional(*last_location_access),
            Edge::Required(*address),
            Edge::Optional(*guard),
            Edge::Optional(*state_before),
            Edge::Required(*next),
        ]),
        _ => None,
    }
}

/// A node of a class known only by name, with its edges in declaration order.
pub fn generic(class_name: impl Into<String>, edges: Vec<Edge>) -> NodeKind {
    NodeKind::Generic {
        class_name: class_name.into(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use veriopt_ir::{Graph, NodeId};

    fn id(i: u32) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn test_registry_lookup() {
        assert!(is_registered("WriteNode"));
        assert!(is_registered("ArrayCopyNode"));
        assert!(!is_registered("AddNode"));
        let extract = extractor_for("AssertionNode").unwrap();
        // extractors ignore other classes
        assert!(extract(&NodeKind::End).is_none());
    }

    #[test]
    fn test_assertion_edges() {
        let kind = NodeKind::Assertion {
            condition: id(1),
            next: id(2),
        };
        assert_eq!(
            declared_edges(&kind),
            Some(vec![Edge::Required(id(1)), Edge::Required(id(2))])
        );
    }

    #[test]
    fn test_write_edges_to_term() {
        let mut g = Graph::new();
        for _ in 0..4 {
            g.add(NodeKind::End);
        }
        let kind = NodeKind::Write {
            value: id(1),
            state_after: None,
            last_location_access: Some(id(2)),
            address: id(3),
            guard: None,
            state_before: None,
            next: id(4),
        };
        let edges = declared_edges(&kind).unwrap();
        let mut b = NodeTermBuilder::new(&g, id(5), "WriteNode", "VoidStamp".into());
        write_edges(&mut b, &edges).unwrap();
        assert_eq!(
            b.to_string(),
            "\n  (5, (WriteNode 1 None (Some 2) 3 None None 4), VoidStamp),"
        );
    }

    #[test]
    fn test_generic_optional_list_distinction() {
        let mut g = Graph::new();
        g.add(NodeKind::End);
        let absent = generic("FooNode", vec![Edge::OptionalList(None)]);
        let empty = generic("FooNode", vec![Edge::OptionalList(Some(smallvec![]))]);
        let full = generic("FooNode", vec![Edge::OptionalList(Some(smallvec![id(1)]))]);

        let render = |kind: &NodeKind| {
            let mut b = NodeTermBuilder::new(&g, id(2), "FooNode", "IllegalStamp".into());
            write_edges(&mut b, &declared_edges(kind).unwrap()).unwrap();
            b.to_string()
        };
        assert_eq!(render(&absent), "\n  (2, (FooNode None), IllegalStamp),");
        assert_eq!(render(&empty), "\n  (2, (FooNode None), IllegalStamp),");
        assert_eq!(render(&full), "\n  (2, (FooNode (Some [(Some 1)])), IllegalStamp),");
    }
}
