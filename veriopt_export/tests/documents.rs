//! End-to-end document generation: tests, programs and optimization pairs.

use std::sync::Arc;
use veriopt_export::{
    ExportConfig, ExportContext, GraphRegistry, TestCase, TestDumper, TestOutcome,
};
use veriopt_ir::{
    BinaryOp, ClassInfo, Graph, GraphBuilder, InvokeKind, JavaType, MethodFlags, MethodRef,
    MethodSignature, Stamp, TypeUniverse, Value,
};

fn int_to_int() -> MethodSignature {
    MethodSignature::new(vec![JavaType::int()], JavaType::int())
}

fn total() -> MethodRef {
    MethodRef::new("demo.Shop", "total", int_to_int())
}

fn apply() -> MethodRef {
    MethodRef::new("demo.Tax", "apply", int_to_int())
}

/// `Shop.total(x) = Tax.apply(x)`
fn total_graph() -> Graph {
    let mut b = GraphBuilder::for_method(total());
    let x = b.param(0, Stamp::int(32));
    let ct = b.call_target(apply(), &[x], InvokeKind::Static);
    let result = b.invoke(ct, Stamp::int(32));
    b.return_value(Some(result));
    b.finish()
}

/// `Tax.apply(x) = x * 2`
fn apply_graph() -> Graph {
    let mut b = GraphBuilder::for_method(apply());
    let x = b.param(0, Stamp::int(32));
    let two = b.const_int(2);
    let doubled = b.binary(BinaryOp::Mul, x, two, Stamp::int(32));
    b.return_value(Some(doubled));
    b.finish()
}

fn context(config: ExportConfig) -> ExportContext {
    let mut universe = TypeUniverse::new();
    universe
        .define(ClassInfo::new("demo.Shop").method("total", int_to_int(), MethodFlags::STATIC))
        .define(ClassInfo::new("demo.Tax").method("apply", int_to_int(), MethodFlags::STATIC));
    let registry = GraphRegistry::new();
    registry.register(total_graph());
    registry.register(apply_graph());
    ExportContext::new(config, Arc::new(universe), Arc::new(registry))
}

fn total_case(x: i32) -> TestCase {
    TestCase::new("Shop_total", total(), TestOutcome::Returned(Value::Int(x * 2).into()))
        .with_args(vec![Value::Int(x).into()])
}

#[test]
fn test_program_test_spans_callees() {
    let mut ctx = context(ExportConfig::default().with_dump_tests(true));
    let mut dumper = TestDumper::new();

    let name = dumper.dump(&mut ctx, &total_case(10)).unwrap().unwrap();
    assert_eq!(name, "unit_Shop_total");

    let text = dumper.document(&name).unwrap().render();
    assert!(text.contains("definition unit_Shop_total :: Program where"));
    let caller = text.find("  ''demo.Shop.total(I)I'' \\<mapsto> irgraph [").unwrap();
    let callee = text.find("  ''demo.Tax.apply(I)I'' \\<mapsto> irgraph [").unwrap();
    assert!(caller < callee, "the tested graph comes first");
    assert!(text.contains("MulNode"));
    assert!(text.contains(
        "value \"program_test (unit_Shop_total, JVMClasses []) ''demo.Shop.total(I)I'' [(new_int 32 (10))] (new_int 32 (20))\""
    ));
}

#[test]
fn test_documents_are_written_per_graph() {
    let mut ctx = context(ExportConfig::default().with_dump_tests(true));
    let mut dumper = TestDumper::new();
    dumper.dump(&mut ctx, &total_case(1)).unwrap();
    dumper.dump(&mut ctx, &total_case(-4)).unwrap();

    assert_eq!(dumper.documents().len(), 1);
    let dir = tempfile::tempdir().unwrap();
    let written = dumper.write_all(&dir.path().join("tests")).unwrap();
    assert_eq!(written.len(), 1);

    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert!(!text.contains("{name}"));
    assert_eq!(text.matches("value \"program_test").count(), 2);
    assert!(text.contains("[(new_int 32 (-4))] (new_int 32 (-8))"));
}

#[test]
fn test_configuration_from_variables() {
    let out = tempfile::tempdir().unwrap();
    let path = out.path().to_string_lossy().into_owned();
    let config = ExportConfig::from_vars(|name| match name {
        "VERIOPT_DUMP_TESTS" => Some("true".to_string()),
        "VERIOPT_DUMP_OPTIMIZATIONS" => Some("1".to_string()),
        "VERIOPT_DUMP_OPTIMIZATIONS_PATH" => Some(path.clone()),
        _ => None,
    });
    assert!(config.dump_tests);
    assert!(config.dump_optimizations);
    assert!(!config.encode_int_masks);

    let mut ctx = context(config);
    let mut dumper = TestDumper::new();
    assert!(dumper.dump(&mut ctx, &total_case(3)).unwrap().is_some());

    let before = apply_graph();
    let mut b = GraphBuilder::for_method(apply());
    let x = b.param(0, Stamp::int(32));
    let one = b.const_int(1);
    let shifted = b.binary(BinaryOp::LeftShift, x, one, Stamp::int(32));
    b.return_value(Some(shifted));
    let after = b.finish();

    let written = ctx.on_optimize(&before, &after).unwrap();
    assert_eq!(written, out.path().join("Tax_apply_int.thy"));
    let text = std::fs::read_to_string(&written).unwrap();
    assert!(text.contains("definition Tax_apply_int_unoptimized :: IRGraph where"));
    assert!(text.contains("definition Tax_apply_int_optimized :: IRGraph where"));
    assert!(text.contains("MulNode"));
    assert!(text.contains("LeftShiftNode"));
}
