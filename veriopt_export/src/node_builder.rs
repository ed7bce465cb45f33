//! Builder for one node term: `(id, (Tag arg...), stamp)`.
//!
//! Arguments are appended in order by typed helpers. Every id written is
//! checked against the graph, so a dangling or unlinked edge fails the
//! node instead of producing a term that refers to nothing.

use crate::encode::encode_value;
use crate::error::{ExportError, Result};
use std::fmt;
use veriopt_ir::{FieldRef, Graph, InvokeKind, MethodRef, NodeId, Value};

pub struct NodeTermBuilder<'g> {
    graph: &'g Graph,
    id: NodeId,
    tag: String,
    args: Vec<String>,
    stamp: String,
}

impl<'g> NodeTermBuilder<'g> {
    /// Start a term for node `id` with the tag and an already encoded stamp.
    pub fn new(graph: &'g Graph, id: NodeId, tag: impl Into<String>, stamp: String) -> Self {
        Self {
            graph,
            id,
            tag: tag.into(),
            args: Vec::new(),
            stamp,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Replace the tag, keeping arguments and stamp.
    pub fn retag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = tag.into();
        self
    }

    /// Append a pre-rendered argument.
    pub fn arg(&mut self, argument: impl Into<String>) -> &mut Self {
        self.args.push(argument.into());
        self
    }

    fn checked(&self, target: NodeId) -> Result<NodeId> {
        if !target.is_valid() {
            return Err(ExportError::malformed(format!(
                "node {} ({}) has an unlinked required edge",
                self.id, self.tag
            )));
        }
        if self.graph.get(target).is_none() {
            return Err(ExportError::malformed(format!(
                "node {} ({}) references missing node {}",
                self.id, self.tag, target
            )));
        }
        Ok(target)
    }

    /// A required edge.
    pub fn id(&mut self, target: NodeId) -> Result<&mut Self> {
        let target = self.checked(target)?;
        Ok(self.arg(target.to_string()))
    }

    /// An optional edge: `None` or `(Some n)`.
    pub fn opt_id(&mut self, target: Option<NodeId>) -> Result<&mut Self> {
        match target {
            None => Ok(self.arg("None")),
            Some(t) => {
                let t = self.checked(t)?;
                Ok(self.arg(format!("(Some {})", t)))
            }
        }
    }

    /// A required edge list: `[a, b]`.
    pub fn id_list(&mut self, targets: &[NodeId]) -> Result<&mut Self> {
        let mut parts = Vec::with_capacity(targets.len());
        for &t in targets {
            parts.push(self.checked(t)?.to_string());
        }
        Ok(self.arg(format!("[{}]", parts.join(", "))))
    }

    /// An optional edge list. Absent and empty lists are both `None`.
    pub fn opt_id_list(&mut self, targets: Option<&[NodeId]>) -> Result<&mut Self> {
        match targets {
            None | Some([]) => Ok(self.arg("None")),
            Some(targets) => {
                let mut parts = Vec::with_capacity(targets.len());
                for &t in targets {
                    parts.push(format!("(Some {})", self.checked(t)?));
                }
                Ok(self.arg(format!("(Some [{}])", parts.join(", "))))
            }
        }
    }

    /// A constant value, at its own width.
    pub fn value(&mut self, value: &Value) -> Result<&mut Self> {
        let text = encode_value(value, false, false)?;
        Ok(self.arg(text))
    }

    pub fn field_ref(&mut self, field: &FieldRef) -> &mut Self {
        self.arg(format!("''{}''", field))
    }

    pub fn type_ref(&mut self, type_name: &str) -> &mut Self {
        self.arg(format!("''{}''", type_name))
    }

    /// `''Holder.name(descriptor)''`.
    pub fn method_ref(&mut self, method: &MethodRef) -> &mut Self {
        self.arg(format!("''{}''", method.key()))
    }

    pub fn nat(&mut self, n: u32) -> &mut Self {
        self.arg(n.to_string())
    }

    pub fn invoke_kind(&mut self, kind: InvokeKind) -> &mut Self {
        self.arg(kind.tag())
    }
}

/// Renders `\n  (id, (Tag args), stamp),` including the trailing comma.
impl fmt::Display for NodeTermBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n  ({}, ({}", self.id, self.tag)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, "), {}),", self.stamp)
    }
}
