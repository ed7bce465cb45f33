//! Sea-of-Nodes IR read by the VeriOpt exporter.
//!
//! This crate models the already-built compiler graphs that get exported:
//!
//! # Core Components
//!
//! - **Arena** (`arena.rs`): Typed, append-only node storage
//! - **Node** (`node.rs`): The closed set of node classes and their edges
//! - **Operators** (`operators.rs`): Operator families shared by node classes
//! - **Stamp** (`stamp.rs`): Abstract value descriptors
//! - **Value** (`value.rs`): Concrete values and node constants
//! - **Graph** (`graph.rs`): Method graphs with splice-after editing
//! - **Builder** (`builder.rs`): Straight-line graph construction
//! - **Meta** (`meta.rs`): Declared classes, methods and fields
//!
//! # Design Principles
//!
//! - **Stable ids**: node ids are the ids written to exported terms
//! - **Exhaustive kinds**: adding a node class forces every encoder to handle it
//! - **No live runtime**: dispatch and layouts come from a [`TypeUniverse`]

pub mod arena;
pub mod builder;
pub mod graph;
pub mod meta;
pub mod node;
pub mod operators;
pub mod stamp;
pub mod value;

pub use arena::{Arena, Id};
pub use builder::GraphBuilder;
pub use graph::Graph;
pub use meta::{
    ClassInfo, FieldFlags, FieldInfo, FieldRef, JavaKind, JavaType, MethodFlags, MethodInfo,
    MethodKey, MethodRef, MethodSignature, TypeUniverse,
};
pub use node::{Edge, Node, NodeFlags, NodeId, NodeKind, NodeList};
pub use operators::{BinaryOp, ConvertOp, DivRemOp, InvokeKind, MonitorOp, UnaryOp};
pub use stamp::{FloatStamp, IntegerStamp, ObjectStamp, PointerKind, PointerStamp, Stamp};
pub use value::{Constant, Value};
