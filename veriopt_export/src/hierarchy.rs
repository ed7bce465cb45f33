//! Whole-library class hierarchy export.
//!
//! Every class seen during resolution is recorded once, together with its
//! superclasses. With `use_class_hierarchy` on, the methods of standard
//! library classes (`java.*`, `sun.*`) are translated eagerly and collected
//! into a single `class_hierarchy` program, whether or not a test reaches
//! them.

use crate::context::ExportContext;
use rustc_hash::FxHashSet;
use veriopt_ir::{MethodRef, NodeKind};

#[derive(Debug, Default)]
pub struct ClassHierarchy {
    included: FxHashSet<String>,
    body: String,
    graphs: usize,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.included.contains(class)
    }

    /// Number of classes recorded.
    pub fn len(&self) -> usize {
        self.included.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// Number of method graphs collected.
    pub fn graph_count(&self) -> usize {
        self.graphs
    }

    fn append(&mut self, name: &str, node_array: &str) {
        let separator = if self.graphs == 0 { "" } else { "," };
        self.body.push_str(&format!(
            "{}\n''{}'' \\<mapsto> irgraph {}",
            separator, name, node_array
        ));
        self.graphs += 1;
    }

    /// The `class_hierarchy` program definition.
    pub fn render(&self) -> String {
        format!(
            "definition class_hierarchy :: Program where\n  \"class_hierarchy = Map.empty ({}\n  )\"\n",
            self.body
        )
    }
}

/// Classes whose methods are exported wholesale.
#[inline]
fn is_library_class(class: &str) -> bool {
    class.starts_with("java.") || class.starts_with("sun.")
}

impl ExportContext {
    /// Record `class` and its superclasses.
    pub fn process_class(&mut self, class: &str) {
        let mut current = Some(class.to_string());
        while let Some(name) = current {
            if !self.hierarchy.included.insert(name.clone()) {
                return;
            }
            if self.config().use_class_hierarchy && is_library_class(&name) {
                let methods: Vec<MethodRef> = self
                    .universe()
                    .declared_methods(&name)
                    .iter()
                    .filter(|info| info.has_code())
                    .map(|info| info.method.clone())
                    .collect();
                for method in &methods {
                    self.process_method(method);
                }
            }
            current = self.universe().superclass_of(&name).map(str::to_string);
        }
    }

    fn process_method(&mut self, method: &MethodRef) {
        let (graph, node_array, failure) = {
            let entry = self.entry(method);
            (entry.graph.clone(), entry.node_array.clone(), entry.failure.clone())
        };
        let Some(graph) = graph else {
            return;
        };

        for (_, node) in graph.iter() {
            match &node.kind {
                NodeKind::NewInstance { instance_class, .. } => self.process_class(instance_class),
                NodeKind::CallTarget { target, .. } => self.process_class(&target.holder),
                _ => {}
            }
        }

        match (node_array, failure) {
            (Some(node_array), None) => {
                let name = method.key().to_string();
                self.hierarchy.append(&name, &node_array);
            }
            (_, Some(err)) => self.debug_skip(method.key().as_str(), &err),
            (None, None) => {}
        }
    }

    pub fn class_hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::provider::GraphRegistry;
    use std::sync::Arc;
    use veriopt_ir::{ClassInfo, GraphBuilder, JavaType, MethodFlags, MethodSignature, TypeUniverse};

    fn size_sig() -> MethodSignature {
        MethodSignature::new(Vec::new(), JavaType::int())
    }

    fn library() -> (TypeUniverse, GraphRegistry) {
        let mut universe = TypeUniverse::new();
        universe.define(ClassInfo::new("java.util.AbstractList"));
        universe.define(
            ClassInfo::new("java.util.ArrayList")
                .extends("java.util.AbstractList")
                .method("size", size_sig(), MethodFlags::empty())
                .method("trim", size_sig(), MethodFlags::NATIVE),
        );
        universe.define(ClassInfo::new("demo.Local").method("size", size_sig(), MethodFlags::empty()));

        let registry = GraphRegistry::new();
        for holder in ["java.util.ArrayList", "demo.Local"] {
            let mut b = GraphBuilder::for_method(MethodRef::new(holder, "size", size_sig()));
            let zero = b.const_int(0);
            b.return_value(Some(zero));
            registry.register(b.finish());
        }
        (universe, registry)
    }

    fn context(use_hierarchy: bool) -> ExportContext {
        let (universe, registry) = library();
        ExportContext::new(
            ExportConfig::default().with_class_hierarchy(use_hierarchy),
            Arc::new(universe),
            Arc::new(registry),
        )
    }

    #[test]
    fn test_superclasses_are_recorded() {
        let mut ctx = context(false);
        ctx.process_class("java.util.ArrayList");
        let h = ctx.class_hierarchy();
        assert!(h.contains("java.util.ArrayList"));
        assert!(h.contains("java.util.AbstractList"));
        assert!(h.contains("java.lang.Object"));
        assert_eq!(h.graph_count(), 0);
    }

    #[test]
    fn test_library_methods_are_exported() {
        let mut ctx = context(true);
        ctx.process_class("java.util.ArrayList");
        ctx.process_class("java.util.ArrayList");
        ctx.process_class("demo.Local");

        let h = ctx.class_hierarchy();
        assert_eq!(h.graph_count(), 1);
        let text = h.render();
        assert!(text.starts_with(
            "definition class_hierarchy :: Program where\n  \"class_hierarchy = Map.empty (\n''java.util.ArrayList.size()I'' \\<mapsto> irgraph ["
        ));
        assert!(text.ends_with("\n  ]\n  )\"\n"));
        assert!(!text.contains("demo.Local"));
    }

    #[test]
    fn test_empty_render() {
        assert_eq!(
            ClassHierarchy::new().render(),
            "definition class_hierarchy :: Program where\n  \"class_hierarchy = Map.empty (\n  )\"\n"
        );
    }
}
