//! Executable test documents.
//!
//! A [`TestCase`] records one observed run of a method: its arguments and
//! what it returned or threw. [`TestDumper`] turns test cases into
//! documents, each holding one graph or program definition followed by the
//! `value` commands that check it. Test cases whose graph text is identical
//! share a document.
//!
//! # Test Forms
//!
//! | Outcome                  | Program        | Command          |
//! |--------------------------|----------------|------------------|
//! | throws                   | method only    | `exception_test` |
//! | returns an object        | any            | `object_test`    |
//! | returns a value          | method only    | `static_test`    |
//! | returns a value          | several graphs | `program_test`   |

use crate::context::ExportContext;
use crate::encode::{encode_value, exception_term, value_list};
use crate::error::{ExportError, Result};
use crate::program::{graph_name, NAME_PLACEHOLDER};
use crate::setup::{instantiate_dynamic_fields, loaded_static_fields, setup_graph, SetupRequest};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use veriopt_ir::{FieldRef, Graph, MethodRef, NodeKind, Stamp, Value};

// =============================================================================
// Test Values
// =============================================================================

/// An argument or result of a test run.
#[derive(Debug, Clone, PartialEq)]
pub enum TestArg {
    Value(Value),
    Object(ObjectValue),
}

impl TestArg {
    pub fn is_null(&self) -> bool {
        matches!(self, TestArg::Value(Value::Null) | TestArg::Value(Value::HeapRef(None)))
    }

    /// Passed by value. Floats and doubles only count when float stamps are
    /// encoded.
    pub fn is_primitive(&self, float_stamps: bool) -> bool {
        match self {
            TestArg::Value(v) => v.is_integral_primitive() || (float_stamps && v.is_floating()),
            TestArg::Object(_) => false,
        }
    }

    /// Class of a non-null reference.
    pub fn runtime_class(&self) -> Option<String> {
        match self {
            TestArg::Object(object) => Some(object.class.clone()),
            TestArg::Value(Value::Str(_)) => Some("java.lang.String".to_string()),
            TestArg::Value(Value::Other(name)) => Some(name.clone()),
            _ if self.is_null() => None,
            TestArg::Value(v) => Some(format!("java.lang.{}", v.type_name())),
        }
    }
}

impl From<Value> for TestArg {
    fn from(value: Value) -> Self {
        TestArg::Value(value)
    }
}

impl From<ObjectValue> for TestArg {
    fn from(object: ObjectValue) -> Self {
        TestArg::Object(object)
    }
}

/// A heap object with its instance field values.
///
/// Fields of the object's own class come first, then inherited ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub class: String,
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field: FieldRef,
    pub value: TestArg,
}

impl ObjectValue {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field declared by the object's own class.
    pub fn field(self, name: &str, value: impl Into<TestArg>) -> Self {
        let holder = self.class.clone();
        self.inherited(&holder, name, value)
    }

    /// Add a field declared by `holder`, a superclass.
    pub fn inherited(mut self, holder: &str, name: &str, value: impl Into<TestArg>) -> Self {
        self.fields.push(FieldValue {
            field: FieldRef::new(holder, name),
            value: value.into(),
        });
        self
    }

    pub fn get(&self, field: &FieldRef) -> Option<&TestArg> {
        self.fields.iter().find(|f| &f.field == field).map(|f| &f.value)
    }
}

/// How a test run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    /// Normal return; `Value::Null` for void methods.
    Returned(TestArg),
    /// Threw an exception of this class.
    Threw(String),
}

/// One observed run of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Base name of the test's definitions.
    pub name: String,
    pub method: MethodRef,
    pub is_static: bool,
    /// Classes belonging to the test: the holder and any classes it declares.
    pub test_classes: Vec<String>,
    pub args: Vec<TestArg>,
    pub outcome: TestOutcome,
}

impl TestCase {
    /// A static method test whose only test class is the method's holder.
    pub fn new(name: impl Into<String>, method: MethodRef, outcome: TestOutcome) -> Self {
        let holder = method.holder.clone();
        Self {
            name: name.into(),
            method,
            is_static: true,
            test_classes: vec![holder],
            args: Vec::new(),
            outcome,
        }
    }

    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = TestArg>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_test_class(mut self, class: impl Into<String>) -> Self {
        self.test_classes.push(class.into());
        self
    }

    fn is_test_class(&self, class: &str) -> bool {
        self.test_classes.iter().any(|c| c == class)
    }

    /// Argument values as passed to the prover, with the heap positions.
    ///
    /// Instance methods get the receiver at heap slot 0. Object arguments
    /// take the following slots in order; null ones take none.
    fn argument_values(&self, float_stamps: bool) -> (Vec<Value>, Vec<usize>) {
        let offset = if self.is_static { 0 } else { 1 };
        let mut heap_indexes: Vec<usize> = if self.is_static { Vec::new() } else { vec![0] };
        if self.args.is_empty() {
            return (Vec::new(), heap_indexes);
        }

        let mut values = Vec::with_capacity(self.args.len() + offset);
        if !self.is_static {
            values.push(Value::HeapRef(Some(0)));
        }
        let mut next_slot = offset as u32;
        for (i, arg) in self.args.iter().enumerate() {
            if arg.is_primitive(float_stamps) {
                if let TestArg::Value(v) = arg {
                    values.push(v.clone());
                }
                continue;
            }
            heap_indexes.push(i + offset);
            if arg.is_null() {
                values.push(Value::HeapRef(None));
            } else {
                values.push(Value::HeapRef(Some(next_slot)));
                next_slot += 1;
            }
        }
        (values, heap_indexes)
    }
}

// =============================================================================
// Documents
// =============================================================================

/// A graph or program definition and the commands that test it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDocument {
    pub name: String,
    /// Definition text with the name placeholder still in place.
    pub graph_text: String,
    pub values: Vec<String>,
}

impl TestDocument {
    pub fn file_name(&self) -> String {
        format!("{}.test", self.name)
    }

    /// Final text with every placeholder replaced by the document name.
    pub fn render(&self) -> String {
        let mut out = self.graph_text.replace(NAME_PLACEHOLDER, &self.name);
        out.push('\n');
        for value in &self.values {
            out.push_str(&value.replace(NAME_PLACEHOLDER, &self.name));
            out.push('\n');
        }
        out
    }
}

/// Suffix making `name` unique among earlier uses: empty the first time,
/// then `__2`, `__3`, ...
pub fn unique_suffix(name: &str, used: &mut FxHashMap<String, u32>) -> String {
    match used.get_mut(name) {
        Some(count) => {
            *count += 1;
            format!("__{}", count)
        }
        None => {
            used.insert(name.to_string(), 1);
            String::new()
        }
    }
}

/// The host language's string hash over UTF-16 code units.
pub fn java_string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// A function accepting exactly the heap object `object` describes.
///
/// Nested objects are flattened into the fields they hold. A field seen
/// twice keeps its first position and its last value.
pub fn check_result(object: &ObjectValue, checker: &str) -> Result<String> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();
    flatten_fields(object, &mut fields, &mut positions)?;

    let mut check = String::from("True");
    for (name, value) in &fields {
        check.push_str(&format!(" \\<and> h_load_field ''{}'' x h = {}", name, value));
    }
    Ok(format!(
        "fun {c} :: \"Value \\<Rightarrow> FieldRefHeap \\<Rightarrow> bool\" where\n  \"{c} (ObjRef x) h = ({check})\" |\n  \"{c} _ _ = False\"\n",
        c = checker,
        check = check
    ))
}

fn flatten_fields(
    object: &ObjectValue,
    fields: &mut Vec<(String, String)>,
    positions: &mut FxHashMap<String, usize>,
) -> Result<()> {
    for field in &object.fields {
        let text = match &field.value {
            TestArg::Object(nested) => {
                flatten_fields(nested, fields, positions)?;
                continue;
            }
            arg if arg.is_null() => "(ObjRef None)".to_string(),
            TestArg::Value(v) => encode_value(v, false, false)?,
        };
        let name = format!("{}::{}", field.field.holder, field.field.name);
        match positions.get(&name) {
            Some(&i) => fields[i].1 = text,
            None => {
                positions.insert(name.clone(), fields.len());
                fields.push((name, text));
            }
        }
    }
    Ok(())
}

/// The exception matches the graph's first bytecode exception.
fn exception_supported(graph: &Graph, exception_class: &str) -> bool {
    let Some(id) = graph.find(|k| matches!(k, NodeKind::BytecodeException { .. })) else {
        return false;
    };
    match &graph.node(id).stamp {
        Stamp::Object(stamp) => stamp.type_name.as_deref() == Some(exception_class),
        _ => false,
    }
}

// =============================================================================
// Test Dumper
// =============================================================================

/// Accumulates test documents across test cases.
#[derive(Debug, Default)]
pub struct TestDumper {
    documents: Vec<TestDocument>,
    by_graph_text: FxHashMap<String, usize>,
    graph_names: FxHashMap<String, u32>,
    checker_names: FxHashMap<String, u32>,
    exception_setups: FxHashMap<String, u32>,
}

impl TestDumper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[TestDocument] {
        &self.documents
    }

    pub fn document(&self, name: &str) -> Option<&TestDocument> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// Add `case` to its document. Returns the document name, or `None`
    /// when the case is out of scope: test dumping is off, an argument's
    /// class is foreign to the test, or the exception cannot be checked.
    pub fn dump(&mut self, ctx: &mut ExportContext, case: &TestCase) -> Result<Option<String>> {
        if !ctx.config().dump_tests {
            return Ok(None);
        }
        ctx.clear_discovered();
        let float_stamps = ctx.config().encode_float_stamps;
        let universe = ctx.universe_arc();

        if let Some(class) = case
            .args
            .iter()
            .filter(|a| !a.is_primitive(float_stamps))
            .filter_map(TestArg::runtime_class)
            .find(|c| !case.is_test_class(c))
        {
            ctx.debug_skip(&case.name, &format!("argument of class {} is defined outside the test", class));
            return Ok(None);
        }

        let key = case.method.key();
        let graph = ctx
            .provider()
            .graph_for(&case.method)
            .ok_or_else(|| ExportError::MissingGraph(key.to_string()))?;

        let invokes = graph.find(|k| matches!(k, NodeKind::Invoke { .. })).is_some();
        let external_declared = case
            .args
            .iter()
            .zip(&case.method.signature.params)
            .filter(|(arg, _)| !arg.is_primitive(float_stamps))
            .any(|(_, ty)| !case.is_test_class(&ty.class_name()));
        if invokes && external_declared {
            ctx.debug_skip(&case.name, &"it passes arguments of outside classes to a method that calls others");
            return Ok(None);
        }

        let mut program = ctx.referenced_graphs(&case.method)?;

        if let TestOutcome::Threw(class) = &case.outcome {
            if !exception_supported(&graph, class) || !program.is_empty() {
                ctx.debug_skip(&case.name, &format!("exception {} cannot be checked", class));
                return Ok(None);
            }
        }

        program.retain(|g| g.method_key().as_ref() != Some(&key));
        program.insert(0, graph);

        let static_fields = loaded_static_fields(&universe, &case.test_classes, &program);
        let all_primitive = case.args.iter().all(|a| a.is_primitive(float_stamps));
        if !static_fields.is_empty() || !case.is_static || !all_primitive {
            program.push(Arc::new(setup_graph(
                &universe,
                SetupRequest {
                    method: &case.method,
                    is_static: case.is_static,
                    args: &case.args,
                    static_fields: &static_fields,
                },
            )?));
        }
        instantiate_dynamic_fields(&mut program, &universe, &case.test_classes)?;

        let (values, heap_indexes) = case.argument_values(float_stamps);
        let args = format!(" {}", value_list(&values, &heap_indexes)?);
        let header = format!("\n(* {}.{}*)\n", case.method.holder, case.name);
        let test_graph = Arc::clone(&program[0]);

        let (graph_text, value) = match &case.outcome {
            TestOutcome::Threw(class) => {
                let graph_text = header + &ctx.dump_program(&program)?;
                let mapping = mapping_name(ctx);
                let setup = format!(
                    "prog0_{{name}}{}",
                    unique_suffix(&graph_text, &mut self.exception_setups)
                );
                let value = format!(
                    "definition {s} :: \"(IRGraph \\<times> ID \\<times> MapState \\<times> Value list)\" where \n  \"{s} = (the ({{name}} ''{key}''), 0, new_map_state, {args})\"\
                     \n\nvalue \"exception_test ({{name}}, {mapping}) ([{s},{s}], new_heap) {result}\"\n",
                    s = setup,
                    key = key,
                    args = args,
                    mapping = mapping,
                    result = exception_term(class, &test_graph)
                );
                (graph_text, value)
            }
            TestOutcome::Returned(TestArg::Object(object)) => {
                let graph_text = header + &ctx.dump_program(&program)?;
                let mapping = mapping_name(ctx);
                let base = format!("check_{}_{}", case.name, java_string_hash(&graph_text) & 0xFF);
                let checker = format!("{}{}", base, unique_suffix(&base, &mut self.checker_names));
                let value = format!(
                    "{}value \"object_test ({{name}}, {}) ''{}''{} {}\"\n",
                    check_result(object, &checker)?,
                    mapping,
                    graph_name(&test_graph),
                    args,
                    checker
                );
                (graph_text, value)
            }
            TestOutcome::Returned(TestArg::Value(returned)) => {
                let result = if case.method.signature.ret.is_void() {
                    "(VOID_RETURN)".to_string()
                } else {
                    encode_value(returned, true, false)?
                };
                if program.len() == 1 {
                    let graph_text = header + &ctx.dump_graph(&test_graph)?;
                    let value = format!("value \"static_test {{name}} {} {}\"\n", args, result);
                    (graph_text, value)
                } else {
                    let graph_text = header + &ctx.dump_program(&program)?;
                    let value = format!(
                        "value \"program_test ({{name}}, {}) ''{}''{} {}\"\n",
                        mapping_name(ctx),
                        graph_name(&test_graph),
                        args,
                        result
                    );
                    (graph_text, value)
                }
            }
        };

        Ok(Some(self.record(&case.name, graph_text, value)))
    }

    fn record(&mut self, test_name: &str, graph_text: String, value: String) -> String {
        if let Some(&i) = self.by_graph_text.get(&graph_text) {
            let doc = &mut self.documents[i];
            doc.values.push(value);
            debug!(document = %doc.name, test = test_name, "appended to existing document");
            return doc.name.clone();
        }
        let name = format!("unit_{}{}", test_name, unique_suffix(test_name, &mut self.graph_names));
        self.by_graph_text.insert(graph_text.clone(), self.documents.len());
        self.documents.push(TestDocument {
            name: name.clone(),
            graph_text,
            values: vec![value],
        });
        name
    }

    /// Write every document to `dir` as `<name>.test`.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir.display().to_string(), &e))?;
        let mut written = Vec::with_capacity(self.documents.len());
        for doc in &self.documents {
            let path = dir.join(doc.file_name());
            std::fs::write(&path, doc.render())
                .map_err(|e| ExportError::io(path.display().to_string(), &e))?;
            written.push(path);
        }
        info!(count = written.len(), dir = %dir.display(), "wrote test documents");
        Ok(written)
    }
}

/// Class argument of program-level commands.
fn mapping_name(ctx: &ExportContext) -> String {
    if ctx.classes_to_encode().is_empty() {
        "JVMClasses []".to_string()
    } else {
        format!("JVMClasses {}_mapping", NAME_PLACEHOLDER)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::provider::GraphRegistry;
    use veriopt_ir::{
        BinaryOp, ClassInfo, GraphBuilder, JavaType, MethodFlags, MethodSignature, NodeId,
        NodeList, TypeUniverse,
    };

    fn int_int_int() -> MethodSignature {
        MethodSignature::new(vec![JavaType::int(), JavaType::int()], JavaType::int())
    }

    fn add_method() -> MethodRef {
        MethodRef::new("demo.Calc", "add", int_int_int())
    }

    fn div_method() -> MethodRef {
        MethodRef::new("demo.Calc", "div", int_int_int())
    }

    fn get_method() -> MethodRef {
        MethodRef::new("demo.Box", "get", MethodSignature::new(Vec::new(), JavaType::int()))
    }

    fn add_graph() -> Graph {
        let mut b = GraphBuilder::for_method(add_method());
        let x = b.param(0, Stamp::int(32));
        let y = b.param(1, Stamp::int(32));
        let sum = b.binary(BinaryOp::Add, x, y, Stamp::int(32));
        b.return_value(Some(sum));
        b.finish()
    }

    fn div_graph() -> Graph {
        let mut b = GraphBuilder::for_method(div_method());
        b.fixed(
            NodeKind::BytecodeException {
                arguments: NodeList::new(),
                state_after: None,
                next: NodeId::INVALID,
            },
            Stamp::allocated("java.lang.ArithmeticException"),
        );
        b.return_value(None);
        b.finish()
    }

    fn get_graph() -> Graph {
        let mut b = GraphBuilder::for_method(get_method());
        let seven = b.const_int(7);
        b.return_value(Some(seven));
        b.finish()
    }

    fn context() -> ExportContext {
        let mut universe = TypeUniverse::new();
        universe.define(
            ClassInfo::new("demo.Calc")
                .method("add", int_int_int(), MethodFlags::STATIC)
                .method("div", int_int_int(), MethodFlags::STATIC),
        );
        universe.define(
            ClassInfo::new("demo.Box")
                .field("count", JavaType::int())
                .constructor(Vec::new())
                .method("get", get_method().signature, MethodFlags::empty()),
        );
        let registry = GraphRegistry::new();
        registry.register(add_graph());
        registry.register(div_graph());
        registry.register(get_graph());
        ExportContext::new(
            ExportConfig::default().with_dump_tests(true),
            Arc::new(universe),
            Arc::new(registry),
        )
    }

    fn add_case(x: i32, y: i32) -> TestCase {
        TestCase::new("Calc_add", add_method(), TestOutcome::Returned(Value::Int(x + y).into()))
            .with_args(vec![Value::Int(x).into(), Value::Int(y).into()])
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn test_unique_suffix() {
        let mut used = FxHashMap::default();
        assert_eq!(unique_suffix("a", &mut used), "");
        assert_eq!(unique_suffix("a", &mut used), "__2");
        assert_eq!(unique_suffix("a", &mut used), "__3");
        assert_eq!(unique_suffix("b", &mut used), "");
    }

    #[test]
    fn test_java_string_hash() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("hello"), 99162322);
        assert_eq!(java_string_hash("hello") & 0xFF, 210);
    }

    #[test]
    fn test_check_result_flattens_nested_objects() {
        let inner = ObjectValue::new("demo.Inner").field("v", Value::Long(9));
        let outer = ObjectValue::new("demo.Outer")
            .field("x", Value::Int(3))
            .field("inner", inner)
            .field("next", Value::Null)
            .inherited("demo.Base", "id", Value::Bool(true));
        let text = check_result(&outer, "check_t_1").unwrap();
        assert_eq!(
            text,
            "fun check_t_1 :: \"Value \\<Rightarrow> FieldRefHeap \\<Rightarrow> bool\" where\n  \
             \"check_t_1 (ObjRef x) h = (True \
             \\<and> h_load_field ''demo.Outer::x'' x h = (new_int 32 (3)) \
             \\<and> h_load_field ''demo.Inner::v'' x h = (IntVal 64 (9)) \
             \\<and> h_load_field ''demo.Outer::next'' x h = (ObjRef None) \
             \\<and> h_load_field ''demo.Base::id'' x h = (new_int 1 (1)))\" |\n  \
             \"check_t_1 _ _ = False\"\n"
        );
    }

    #[test]
    fn test_check_result_of_empty_object() {
        let text = check_result(&ObjectValue::new("demo.Empty"), "c").unwrap();
        assert!(text.contains("\"c (ObjRef x) h = (True)\""));
    }

    #[test]
    fn test_argument_values() {
        let case = TestCase::new("t", get_method(), TestOutcome::Returned(Value::Int(0).into()))
            .instance()
            .with_args(vec![
                Value::Int(1).into(),
                Value::Null.into(),
                ObjectValue::new("demo.Box").into(),
            ]);
        let (values, heap) = case.argument_values(false);
        assert_eq!(
            values,
            vec![
                Value::HeapRef(Some(0)),
                Value::Int(1),
                Value::HeapRef(None),
                Value::HeapRef(Some(1)),
            ]
        );
        assert_eq!(heap, vec![0, 2, 3]);
    }

    #[test]
    fn test_argument_values_without_args() {
        let case = TestCase::new("t", get_method(), TestOutcome::Returned(Value::Int(0).into())).instance();
        let (values, heap) = case.argument_values(false);
        assert!(values.is_empty());
        assert_eq!(value_list(&values, &heap).unwrap(), "[]");
    }

    // =========================================================================
    // Dumping
    // =========================================================================

    #[test]
    fn test_static_test_document() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        let name = dumper.dump(&mut ctx, &add_case(2, 3)).unwrap().unwrap();
        assert_eq!(name, "unit_Calc_add");

        let doc = dumper.document(&name).unwrap();
        let text = doc.render();
        assert!(text.starts_with("\n(* demo.Calc.Calc_add*)\ndefinition unit_Calc_add :: IRGraph where\n  \"unit_Calc_add = irgraph ["));
        assert!(text.ends_with(
            "value \"static_test unit_Calc_add  [(new_int 32 (2)), (new_int 32 (3))] (new_int 32 (5))\"\n\n"
        ));
    }

    #[test]
    fn test_same_graph_shares_document() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        let first = dumper.dump(&mut ctx, &add_case(2, 3)).unwrap();
        let second = dumper.dump(&mut ctx, &add_case(-1, 1)).unwrap();
        assert_eq!(first, second);
        assert_eq!(dumper.documents().len(), 1);
        assert_eq!(dumper.documents()[0].values.len(), 2);
    }

    #[test]
    fn test_dumping_disabled() {
        let mut universe = TypeUniverse::new();
        universe.define(ClassInfo::new("demo.Calc"));
        let mut ctx = ExportContext::new(
            ExportConfig::default(),
            Arc::new(universe),
            Arc::new(GraphRegistry::new()),
        );
        assert_eq!(TestDumper::new().dump(&mut ctx, &add_case(1, 1)).unwrap(), None);
    }

    #[test]
    fn test_foreign_argument_class_is_skipped() {
        let mut ctx = context();
        let case = add_case(1, 1).with_args(vec![ObjectValue::new("other.Thing").into()]);
        assert_eq!(TestDumper::new().dump(&mut ctx, &case).unwrap(), None);
    }

    #[test]
    fn test_missing_graph_is_an_error() {
        let mut ctx = context();
        let method = MethodRef::new("demo.Calc", "sub", int_int_int());
        let case = TestCase::new("Calc_sub", method, TestOutcome::Returned(Value::Int(0).into()));
        let err = TestDumper::new().dump(&mut ctx, &case).unwrap_err();
        assert_eq!(err, ExportError::MissingGraph("demo.Calc.sub(II)I".to_string()));
    }

    #[test]
    fn test_exception_test() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        let case = TestCase::new(
            "Calc_div",
            div_method(),
            TestOutcome::Threw("java.lang.ArithmeticException".to_string()),
        )
        .with_args(vec![Value::Int(1).into(), Value::Int(0).into()]);
        let name = dumper.dump(&mut ctx, &case).unwrap().unwrap();
        let text = dumper.document(&name).unwrap().render();

        assert!(text.contains("definition unit_Calc_div :: Program where"));
        assert!(text.contains(
            "definition prog0_unit_Calc_div :: \"(IRGraph \\<times> ID \\<times> MapState \\<times> Value list)\" where \n  \
             \"prog0_unit_Calc_div = (the (unit_Calc_div ''demo.Calc.div(II)I''), 0, new_map_state,  [(new_int 32 (1)), (new_int 32 (0))])\""
        ));
        assert!(text.contains(
            "value \"exception_test (unit_Calc_div, JVMClasses []) ([prog0_unit_Calc_div,prog0_unit_Calc_div], new_heap) (Exception 1 ''java.lang.ArithmeticException'')\""
        ));
    }

    #[test]
    fn test_mismatched_exception_is_skipped() {
        let mut ctx = context();
        let case = TestCase::new(
            "Calc_div",
            div_method(),
            TestOutcome::Threw("java.lang.NullPointerException".to_string()),
        );
        assert_eq!(TestDumper::new().dump(&mut ctx, &case).unwrap(), None);
    }

    #[test]
    fn test_instance_method_gets_setup_graph() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        let case = TestCase::new("Box_get", get_method(), TestOutcome::Returned(Value::Int(7).into()))
            .instance();
        let name = dumper.dump(&mut ctx, &case).unwrap().unwrap();
        let text = dumper.document(&name).unwrap().render();

        assert!(text.contains("  ''demo.Box.get()I'' \\<mapsto> irgraph ["));
        assert!(text.contains("  '''' \\<mapsto> irgraph ["));
        assert!(text.contains("NewInstanceNode"));
        assert!(text.contains("NewClass ''demo.Box''"));
        assert!(text.contains(
            "value \"program_test (unit_Box_get, JVMClasses unit_Box_get_mapping) ''demo.Box.get()I'' [] (new_int 32 (7))\""
        ));
    }

    #[test]
    fn test_object_result() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        let result = ObjectValue::new("demo.Box").field("count", Value::Int(4));
        let case = TestCase::new("Calc_add", add_method(), TestOutcome::Returned(result.into()))
            .with_args(vec![Value::Int(1).into(), Value::Int(3).into()]);
        let name = dumper.dump(&mut ctx, &case).unwrap().unwrap();
        let doc = dumper.document(&name).unwrap();

        let hash = java_string_hash(&doc.graph_text) & 0xFF;
        let checker = format!("check_Calc_add_{}", hash);
        let text = doc.render();
        assert!(text.contains(&format!("fun {} :: ", checker)));
        assert!(text.contains("h_load_field ''demo.Box::count'' x h = (new_int 32 (4))"));
        assert!(text.contains(&format!(
            "value \"object_test (unit_Calc_add, JVMClasses []) ''demo.Calc.add(II)I'' [(new_int 32 (1)), (new_int 32 (3))] {}\"",
            checker
        )));
    }

    #[test]
    fn test_write_all() {
        let mut ctx = context();
        let mut dumper = TestDumper::new();
        dumper.dump(&mut ctx, &add_case(2, 3)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = dumper.write_all(dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("unit_Calc_add.test")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(text, dumper.documents()[0].render());
    }
}
