//! Graph and program documents, and the class mapping appended to them.
//!
//! Documents use `{name}` as a placeholder for the definition name; the
//! caller substitutes it once a unique name is known.

use crate::context::ExportContext;
use crate::error::Result;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use veriopt_ir::meta::{short_name_of, OBJECT_CLASS};
use veriopt_ir::{ClassInfo, Graph, JavaType, MethodKey, TypeUniverse};

/// Placeholder replaced by the definition name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Name of a graph inside a program: its explicit name, else its method key.
pub fn graph_name(graph: &Graph) -> String {
    graph.display_name().unwrap_or_default()
}

impl ExportContext {
    /// `definition {name} :: IRGraph` for one graph, plus the class mapping.
    pub fn dump_graph(&mut self, graph: &Graph) -> Result<String> {
        let node_array = self.write_node_array(graph)?;
        let mut out = String::from("definition {name} :: IRGraph where\n  \"{name} = irgraph ");
        out.push_str(&node_array);
        out.push('"');
        out.push_str(&generate_jvm_classes(self.universe(), self.classes_to_encode()));
        Ok(out)
    }

    /// [`dump_graph`](Self::dump_graph) with the placeholder filled in.
    pub fn dump_graph_named(&mut self, graph: &Graph, name: &str) -> Result<String> {
        Ok(self.dump_graph(graph)?.replace(NAME_PLACEHOLDER, name))
    }

    /// `definition {name} :: Program` mapping graph names to graphs.
    ///
    /// The given graphs come first, in order. They are followed by every
    /// callable method sharing a short name with one of them, and everything
    /// those methods reference.
    pub fn dump_program(&mut self, graphs: &[Arc<Graph>]) -> Result<String> {
        let mut out = String::from("definition {name} :: Program where\n  \"{name} = Map.empty (\n");

        for graph in graphs {
            let node_array = self.write_node_array(graph)?;
            push_mapping(&mut out, &graph_name(graph), &node_array);
        }
        for graph in self.minimal_method_graphs(graphs)? {
            let node_array = self.write_node_array(&graph)?;
            push_mapping(&mut out, &graph_name(&graph), &node_array);
        }

        // drop the separator after the last graph
        if out.ends_with(",\n") {
            out.truncate(out.len() - 2);
        }
        out.push_str("\n  )\"");
        out.push_str(&generate_jvm_classes(self.universe(), self.classes_to_encode()));
        Ok(out)
    }

    /// Graphs of callable methods whose short names match an entry graph,
    /// plus their references, each once and none already among `graphs`.
    fn minimal_method_graphs(&mut self, graphs: &[Arc<Graph>]) -> Result<Vec<Arc<Graph>>> {
        let entry_names: Vec<String> = graphs.iter().map(|g| graph_name(g)).collect();
        let entry_short: FxHashSet<&str> = entry_names.iter().map(|n| short_name_of(n)).collect();

        let candidates: Vec<_> = self
            .callable_methods()
            .iter()
            .filter(|m| entry_short.contains(m.key().short_name()))
            .cloned()
            .collect();

        let mut collected = Vec::new();
        for method in &candidates {
            if let Some(graph) = self.graph(method) {
                collected.push(graph);
            }
            collected.extend(self.referenced_graphs(method)?);
        }

        let mut seen: FxHashSet<MethodKey> = FxHashSet::default();
        let already: FxHashSet<&str> = entry_names.iter().map(String::as_str).collect();
        Ok(collected
            .into_iter()
            .filter(|g| match g.method_key() {
                Some(key) => seen.insert(key),
                None => true,
            })
            .filter(|g| !already.contains(graph_name(g).as_str()))
            .collect())
    }
}

fn push_mapping(out: &mut String, name: &str, node_array: &str) {
    out.push_str(&format!("  ''{}'' \\<mapsto> irgraph {},\n", name, node_array));
}

// =============================================================================
// JVMClass Mapping
// =============================================================================

/// Short form of a runtime type name: `int` -> `I`. Class names pass through.
pub fn encode_type_name(name: &str) -> &str {
    match name {
        "boolean" => "Z",
        "byte" => "B",
        "char" => "C",
        "double" => "D",
        "float" => "F",
        "int" => "I",
        "long" => "J",
        "short" => "S",
        "void" => "V",
        other => other,
    }
}

fn type_term(ty: &JavaType) -> String {
    encode_type_name(&ty.reflect_name()).to_string()
}

/// `[NewParameter ''I'', NewParameter ''J'']`, or `[]`.
fn parameter_list(params: &[String]) -> String {
    let items: Vec<String> = params
        .iter()
        .map(|p| format!("NewParameter ''{}''", p))
        .collect();
    format!("[{}]", items.join(", "))
}

/// `[''Parent'', ..., ''None'']`.
fn parent_path(universe: &TypeUniverse, class: &str) -> String {
    let mut items: Vec<String> = universe
        .ancestors(class)
        .into_iter()
        .map(|name| format!("''{}''", name))
        .collect();
    items.push("''None''".to_string());
    format!("[{}]", items.join(", "))
}

fn class_term(universe: &TypeUniverse, class: &ClassInfo) -> String {
    let fields: Vec<String> = class
        .fields
        .iter()
        .map(|f| format!("NewField ''{}'' ''{}''", f.field.name, type_term(&f.ty)))
        .collect();

    let methods: Vec<String> = class
        .methods
        .iter()
        .map(|info| {
            let m = &info.method;
            let params: Vec<String> = m.signature.params.iter().map(type_term).collect();
            let ret = type_term(&m.signature.ret);
            let unique = format!("{}.{}({}){}", class.name, m.name, params.concat(), ret);
            format!(
                "NewMethod ''{}'' ''{}'' {} ''{}''",
                m.name,
                ret,
                parameter_list(&params),
                unique
            )
        })
        .collect();

    let constructors: Vec<String> = class
        .constructors
        .iter()
        .map(|info| {
            let params: Vec<String> = info.method.signature.params.iter().map(type_term).collect();
            format!("NewConstructor {}", parameter_list(&params))
        })
        .collect();

    let parent = class.superclass.as_deref().unwrap_or("None");
    format!(
        "NewClass ''{}''\n\t\t[{}]\n\t\t[{}]\n\t\t[{}]\n\t\t{}\n\t\t''{}''",
        class.name,
        fields.join(", "),
        methods.join(", "),
        constructors.join(", "),
        parent_path(universe, &class.name),
        parent
    )
}

/// The `{name}_mapping` definition describing `classes`.
///
/// Empty input produces empty text. Otherwise `java.lang.Object` is always
/// described, and classes unknown to the universe are left out.
pub fn generate_jvm_classes(universe: &TypeUniverse, classes: &BTreeSet<String>) -> String {
    if classes.is_empty() {
        return String::new();
    }
    let mut all = classes.clone();
    all.insert(OBJECT_CLASS.to_string());

    let mut out = String::from("\n\ndefinition {name}_mapping :: \"JVMClass list\" where\n\t\"{name}_mapping = [");
    for name in &all {
        match universe.class(name) {
            Some(class) => {
                out.push_str("\n\t");
                out.push_str(&class_term(universe, class));
                out.push_str(",\n");
            }
            None => debug!(class = %name, "class unknown to the type universe, not mapped"),
        }
    }
    if out.ends_with(",\n") {
        out.truncate(out.len() - 2);
    }
    out.push_str("]\"\n");
    out
}

// =============================================================================
// Tests
// =============================================================================
