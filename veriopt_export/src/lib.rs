//! VeriOpt graph exporter.
//!
//! Turns compiler graphs into closed terms a theorem prover can evaluate:
//!
//! # Core Components
//!
//! - **Encoders** (`encode/`): value and stamp terms
//! - **Translator** (`translator.rs`, `node_builder.rs`, `dynamic.rs`): one
//!   graph to one node array
//! - **Context** (`context.rs`): configuration and per-run discovered state
//! - **Cache** (`cache.rs`): memoized graphs and their reference closure
//! - **Hierarchy** (`hierarchy.rs`): eagerly exported library classes
//! - **Documents** (`program.rs`): graph and program definitions with the
//!   class mapping
//! - **Tests** (`setup.rs`, `testcase.rs`): setup graphs and executable test
//!   documents
//! - **Optimizations** (`optimization.rs`): before/after graph pairs
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use veriopt_export::{ExportConfig, ExportContext, GraphRegistry};
//! use veriopt_ir::{BinaryOp, GraphBuilder, JavaType, MethodRef, MethodSignature, Stamp, TypeUniverse};
//!
//! let sig = MethodSignature::new(vec![JavaType::int(), JavaType::int()], JavaType::int());
//! let mut b = GraphBuilder::for_method(MethodRef::new("demo.Calc", "add", sig));
//! let x = b.param(0, Stamp::int(32));
//! let y = b.param(1, Stamp::int(32));
//! let sum = b.binary(BinaryOp::Add, x, y, Stamp::int(32));
//! b.return_value(Some(sum));
//!
//! let mut ctx = ExportContext::new(
//!     ExportConfig::default(),
//!     Arc::new(TypeUniverse::new()),
//!     Arc::new(GraphRegistry::new()),
//! );
//! let text = ctx.dump_graph_named(&b.finish(), "calc_add").unwrap();
//! assert!(text.starts_with("definition calc_add :: IRGraph where"));
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod dynamic;
pub mod encode;
pub mod error;
pub mod hierarchy;
pub mod node_builder;
pub mod optimization;
pub mod program;
pub mod provider;
pub mod setup;
pub mod testcase;
pub mod translator;

pub use cache::{implementations_of, CacheEntry, Closure, GraphCache};
pub use config::{AllowList, ExportConfig};
pub use context::ExportContext;
pub use error::{ExportError, Result};
pub use hierarchy::ClassHierarchy;
pub use optimization::optimization_name;
pub use program::{generate_jvm_classes, graph_name};
pub use provider::{GraphProvider, GraphRegistry};
pub use setup::{instantiate_dynamic_fields, setup_graph, SetupRequest};
pub use testcase::{ObjectValue, TestArg, TestCase, TestDocument, TestDumper, TestOutcome};
pub use translator::{Discoveries, GraphTranslator, Translation};
