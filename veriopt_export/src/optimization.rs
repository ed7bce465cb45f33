//! Before/after dumps of optimized graphs.
//!
//! Each optimized method is written once per context as a pair of graph
//! definitions, `<name>_unoptimized` and `<name>_optimized`, in
//! `<dump_optimizations_path>/<name>.thy`.

use crate::context::ExportContext;
use crate::error::{ExportError, Result};
use std::path::PathBuf;
use tracing::{debug, info};
use veriopt_ir::{Graph, JavaType, MethodRef};

/// `Holder_method_Param1_Param2`, from unqualified type names.
pub fn optimization_name(method: &MethodRef) -> String {
    let holder = JavaType::class(method.holder.as_str())
        .unqualified_name()
        .replace('.', "_");
    let params: Vec<String> = method
        .signature
        .params
        .iter()
        .map(JavaType::unqualified_name)
        .collect();
    format!("{}_{}_{}", holder, method.name, params.join("_"))
}

impl ExportContext {
    /// Dump `unoptimized` and `optimized` as a pair.
    ///
    /// Does nothing unless optimization dumps are on and the optimized graph
    /// belongs to a method. A name is claimed before translating, so a pair
    /// that fails is not retried. Failures are logged in debug mode and
    /// otherwise ignored. Returns the written file.
    pub fn on_optimize(&mut self, unoptimized: &Graph, optimized: &Graph) -> Option<PathBuf> {
        if !self.config().dump_optimizations {
            return None;
        }
        let method = optimized.method()?;

        let name = optimization_name(method);
        if !self.claim_dump_name(&name) {
            debug!(%name, "already dumped, skipping");
            return None;
        }

        match self.write_pair(&name, unoptimized, optimized) {
            Ok(path) => {
                info!(path = %path.display(), "dumped optimization");
                Some(path)
            }
            Err(err) => {
                self.debug_skip(&format!("dumping of {}", name), &err);
                None
            }
        }
    }

    fn write_pair(&self, name: &str, unoptimized: &Graph, optimized: &Graph) -> Result<PathBuf> {
        let translator = self.translator();
        let before = translator.write_node_array(unoptimized)?.node_array;
        let after = translator.write_node_array(optimized)?.node_array;
        let text = format!(
            "definition {n}_unoptimized :: IRGraph where \"{n}_unoptimized = irgraph {before}\"\n\
             definition {n}_optimized :: IRGraph where \"{n}_optimized = irgraph {after}\"",
            n = name,
            before = before,
            after = after
        );

        let dir = &self.config().dump_optimizations_path;
        std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir.display().to_string(), &e))?;
        let path = dir.join(format!("{}.thy", name));
        std::fs::write(&path, text).map_err(|e| ExportError::io(path.display().to_string(), &e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::provider::GraphRegistry;
    use std::sync::Arc;
    use veriopt_ir::{
        BinaryOp, FloatStamp, GraphBuilder, JavaKind, MethodSignature, Stamp, TypeUniverse, Value,
    };

    fn method() -> MethodRef {
        MethodRef::new(
            "demo.Outer$Inner",
            "twice",
            MethodSignature::new(
                vec![JavaType::int(), JavaType::class("java.lang.String"), JavaType::Primitive(JavaKind::Long)],
                JavaType::int(),
            ),
        )
    }

    fn graphs() -> (Graph, Graph) {
        let mut b = GraphBuilder::for_method(method());
        let x = b.param(0, Stamp::int(32));
        let sum = b.binary(BinaryOp::Add, x, x, Stamp::int(32));
        b.return_value(Some(sum));
        let before = b.finish();

        let mut b = GraphBuilder::for_method(method());
        let x = b.param(0, Stamp::int(32));
        let one = b.const_int(1);
        let shifted = b.binary(BinaryOp::LeftShift, x, one, Stamp::int(32));
        b.return_value(Some(shifted));
        (before, b.finish())
    }

    fn context(config: ExportConfig) -> ExportContext {
        ExportContext::new(config, Arc::new(TypeUniverse::new()), Arc::new(GraphRegistry::new()))
    }

    #[test]
    fn test_optimization_name() {
        assert_eq!(optimization_name(&method()), "Outer$Inner_twice_int_String_long");
        let no_params = MethodRef::new("demo.A", "f", MethodSignature::new(Vec::new(), JavaType::void()));
        assert_eq!(optimization_name(&no_params), "A_f_");
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let mut ctx = context(ExportConfig::default());
        let (before, after) = graphs();
        assert_eq!(ctx.on_optimize(&before, &after), None);
    }

    #[test]
    fn test_pair_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("opts");
        let mut ctx = context(ExportConfig::default().with_dump_optimizations(&out));
        let (before, after) = graphs();

        let path = ctx.on_optimize(&before, &after).unwrap();
        assert_eq!(path, out.join("Outer$Inner_twice_int_String_long.thy"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "definition Outer$Inner_twice_int_String_long_unoptimized :: IRGraph where \"Outer$Inner_twice_int_String_long_unoptimized = irgraph ["
        ));
        assert!(text.contains("(2, (AddNode 1 1)"));
        assert!(text.contains("\ndefinition Outer$Inner_twice_int_String_long_optimized :: IRGraph where"));
        assert!(text.contains("LeftShiftNode"));
        assert!(text.ends_with("]\""));

        assert_eq!(ctx.on_optimize(&before, &after), None);
    }

    #[test]
    fn test_graph_without_method_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(ExportConfig::default().with_dump_optimizations(dir.path()));
        let g = Graph::named("anonymous");
        assert_eq!(ctx.on_optimize(&g, &g), None);
    }

    #[test]
    fn test_untranslatable_pair_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("opts");
        let mut ctx = context(ExportConfig::default().with_dump_optimizations(&out));
        let (before, _) = graphs();

        // float stamps are rejected while float encoding is off
        let mut b = GraphBuilder::for_method(method());
        let half = b.constant(Value::Float(0.5), Stamp::Float(FloatStamp::new(32, 0.5, 0.5)));
        b.return_value(Some(half));
        let after = b.finish();

        assert_eq!(ctx.on_optimize(&before, &after), None);
        assert!(!out.join("Outer$Inner_twice_int_String_long.thy").exists());

        // the name stays claimed
        let (before, after) = graphs();
        assert_eq!(ctx.on_optimize(&before, &after), None);
    }
}
