//! Export context: the state shared by every step of one export run.
//!
//! The context owns the configuration, the type universe, the graph provider
//! and all memoized and discovered state: the graph cache, the classes and
//! callable methods found while translating, the class-hierarchy
//! accumulator and the set of optimization dumps already written. Callers
//! own it explicitly, so independent runs never share state unless they
//! share a context.

use crate::cache::GraphCache;
use crate::config::{AllowList, ExportConfig};
use crate::error::Result;
use crate::hierarchy::ClassHierarchy;
use crate::provider::GraphProvider;
use crate::translator::{Discoveries, GraphTranslator};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use veriopt_ir::{Graph, MethodKey, MethodRef, TypeUniverse};

pub struct ExportContext {
    config: ExportConfig,
    allow_list: AllowList,
    universe: Arc<TypeUniverse>,
    provider: Arc<dyn GraphProvider>,

    pub(crate) cache: GraphCache,
    pub(crate) hierarchy: ClassHierarchy,

    /// Classes to describe in the JVMClass mapping. Sorted for stable output.
    classes_to_encode: BTreeSet<String>,

    /// Methods callable on instantiated classes, in discovery order.
    callable_methods: Vec<MethodRef>,
    callable_keys: FxHashSet<MethodKey>,

    /// Names of optimization pairs already written.
    already_dumped: FxHashSet<String>,
}

impl ExportContext {
    /// A context whose allow-list is loaded from `config.irnodes_path`.
    pub fn new(
        config: ExportConfig,
        universe: Arc<TypeUniverse>,
        provider: Arc<dyn GraphProvider>,
    ) -> Self {
        let allow_list = AllowList::load(&config.irnodes_path);
        Self {
            config,
            allow_list,
            universe,
            provider,
            cache: GraphCache::new(),
            hierarchy: ClassHierarchy::new(),
            classes_to_encode: BTreeSet::new(),
            callable_methods: Vec::new(),
            callable_keys: FxHashSet::default(),
            already_dumped: FxHashSet::default(),
        }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    pub(crate) fn universe_arc(&self) -> Arc<TypeUniverse> {
        Arc::clone(&self.universe)
    }

    pub fn provider(&self) -> &dyn GraphProvider {
        self.provider.as_ref()
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn translator(&self) -> GraphTranslator<'_> {
        GraphTranslator::new(&self.config, &self.allow_list, &self.universe)
    }

    pub fn classes_to_encode(&self) -> &BTreeSet<String> {
        &self.classes_to_encode
    }

    pub fn callable_methods(&self) -> &[MethodRef] {
        &self.callable_methods
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Translate `graph` and register what it instantiates.
    pub fn write_node_array(&mut self, graph: &Graph) -> Result<String> {
        let translation = self.translator().write_node_array(graph)?;
        self.register(&translation.discovered);
        Ok(translation.node_array)
    }

    /// Record instantiated classes and their callable methods.
    pub fn register(&mut self, discovered: &Discoveries) {
        self.classes_to_encode
            .extend(discovered.classes.iter().cloned());
        for method in &discovered.methods {
            if self.callable_keys.insert(method.key()) {
                self.callable_methods.push(method.clone());
            }
        }
    }

    /// Log a skipped or failed item when debugging is on.
    pub(crate) fn debug_skip(&self, what: &str, cause: &dyn std::fmt::Display) {
        if self.config.debug {
            debug!(%cause, "skipping {}", what);
        }
    }

    /// Claim `name` for an optimization dump. `false` if it was already taken.
    pub(crate) fn claim_dump_name(&mut self, name: &str) -> bool {
        self.already_dumped.insert(name.to_string())
    }

    // =========================================================================
    // Clearing
    // =========================================================================

    /// Forget discovered classes and callable methods, e.g. between tests.
    pub fn clear_discovered(&mut self) {
        self.classes_to_encode.clear();
        self.callable_methods.clear();
        self.callable_keys.clear();
    }

    /// Forget everything, including memoized graphs.
    pub fn clear(&mut self) {
        self.clear_discovered();
        self.cache.clear();
        self.hierarchy = ClassHierarchy::new();
        self.already_dumped.clear();
    }
}

impl std::fmt::Debug for ExportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportContext")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("classes_to_encode", &self.classes_to_encode)
            .field("callable_methods", &self.callable_methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GraphRegistry;
    use veriopt_ir::{ClassInfo, GraphBuilder, JavaType, MethodFlags, MethodSignature};

    fn context() -> ExportContext {
        let mut universe = TypeUniverse::new();
        universe.define(
            ClassInfo::new("demo.Box")
                .constructor(Vec::new())
                .method(
                    "get",
                    MethodSignature::new(Vec::new(), JavaType::int()),
                    MethodFlags::empty(),
                ),
        );
        ExportContext::new(
            ExportConfig::default(),
            Arc::new(universe),
            Arc::new(GraphRegistry::new()),
        )
    }

    fn allocating_graph() -> Graph {
        let mut b = GraphBuilder::new(Graph::named("g"));
        let obj = b.new_instance("demo.Box");
        b.return_value(Some(obj));
        b.finish()
    }

    #[test]
    fn test_translation_registers_discoveries() {
        let mut ctx = context();
        ctx.write_node_array(&allocating_graph()).unwrap();
        ctx.write_node_array(&allocating_graph()).unwrap();

        assert_eq!(ctx.classes_to_encode().len(), 1);
        // methods are deduplicated by key
        assert_eq!(ctx.callable_methods().len(), 2);
    }

    #[test]
    fn test_clear_discovered() {
        let mut ctx = context();
        ctx.write_node_array(&allocating_graph()).unwrap();
        ctx.clear_discovered();
        assert!(ctx.classes_to_encode().is_empty());
        assert!(ctx.callable_methods().is_empty());
    }

    #[test]
    fn test_dump_names_claimed_once() {
        let mut ctx = context();
        assert!(ctx.claim_dump_name("A_f_int"));
        assert!(!ctx.claim_dump_name("A_f_int"));
        ctx.clear();
        assert!(ctx.claim_dump_name("A_f_int"));
    }
}
