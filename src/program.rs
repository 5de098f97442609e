// Domain model for a dataflow module, as handed over by the compiler
// front end. The front end resolves worker dependencies before building a
// `Module`; this crate never parses source text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of port/value types. Kept as a tagged variant rather than an
/// open map so adapter code can match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Int,
    Float,
    Str,
    Bool,
    Array(Box<TypeExpr>),
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeExpr,
}

impl TypeExpr {
    pub fn is_array(&self) -> bool {
        matches!(self, TypeExpr::Array(_))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::Float => write!(f, "float"),
            TypeExpr::Str => write!(f, "str"),
            TypeExpr::Bool => write!(f, "bool"),
            TypeExpr::Array(elem) => write!(f, "array<{elem}>"),
            TypeExpr::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A single named boundary port. Declaration order is significant: it is
/// the order ports appear on the rendered node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDef {
    pub name: String,
    pub ty: TypeExpr,
}

impl PortDef {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Input/output interface of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Io {
    #[serde(rename = "in", default)]
    pub inports: Vec<PortDef>,
    #[serde(rename = "out", default)]
    pub outports: Vec<PortDef>,
}

impl Io {
    pub fn new(inports: Vec<PortDef>, outports: Vec<PortDef>) -> Self {
        Self { inports, outports }
    }

    pub fn inport(&self, name: &str) -> Option<&TypeExpr> {
        self.inports.iter().find(|p| p.name == name).map(|p| &p.ty)
    }

    pub fn outport(&self, name: &str) -> Option<&TypeExpr> {
        self.outports.iter().find(|p| p.name == name).map(|p| &p.ty)
    }
}

/// A literal constant available to the network, rendered as an output of
/// the synthetic `const` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDef {
    pub ty: TypeExpr,
    pub value: serde_json::Value,
}

/// One end of a connection: a node, one of its ports, and an optional slot
/// index when the port is array-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: String,
    pub port: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub idx: Option<usize>,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            idx: None,
        }
    }

    pub fn with_idx(node: impl Into<String>, port: impl Into<String>, idx: usize) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            idx: Some(idx),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)?;
        if let Some(idx) = self.idx {
            write!(f, "[{idx}]")?;
        }
        Ok(())
    }
}

/// Directed link between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Connection {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }
}

/// A dataflow program unit: typed boundary ports, worker instances of
/// dependency modules, constants, and the connection list (`net`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub io: Io,
    /// Worker instance name -> dependency-module name.
    #[serde(default)]
    pub workers: BTreeMap<String, String>,
    #[serde(default)]
    pub constants: BTreeMap<String, ConstDef>,
    /// Dependency-module name -> its declared interface. Populated by the
    /// front end; a worker naming a missing entry is a dangling reference.
    #[serde(default)]
    pub deps: BTreeMap<String, Io>,
    /// Ordered connection list; the order is the edge draw order.
    #[serde(default)]
    pub net: Vec<Connection>,
}
