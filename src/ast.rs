use std::fmt;

/// Tag naming each node type, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Identifier,
    IntLiteralExpr,
    Assignment,
    Program,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "Identifier",
            Self::IntLiteralExpr => "IntLiteralExpr",
            Self::Assignment => "Assignment",
            Self::Program => "Program",
        };
        f.write_str(name)
    }
}

/// Any AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Identifier(Identifier),
    IntLiteral(IntLiteralExpr),
    Assignment(Assignment),
    Program(Program),
}

impl Node {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Identifier(_) => NodeKind::Identifier,
            Self::IntLiteral(_) => NodeKind::IntLiteralExpr,
            Self::Assignment(_) => NodeKind::Assignment,
            Self::Program(_) => NodeKind::Program,
        }
    }
}

/// Variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        NodeKind::Identifier
    }
}

/// Integer literal, `10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteralExpr {
    pub value: i32,
}

impl IntLiteralExpr {
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self { value }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        NodeKind::IntLiteralExpr
    }
}

/// `target = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: Identifier,
    pub value: Box<Node>,
}

impl Assignment {
    #[must_use]
    pub fn new(target: Identifier, value: impl Into<Node>) -> Self {
        Self {
            target,
            value: Box::new(value.into()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        NodeKind::Assignment
    }
}

/// Top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub init: Vec<Node>,
}

impl Program {
    #[must_use]
    pub const fn new(init: Vec<Node>) -> Self {
        Self { init }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        NodeKind::Program
    }
}

impl From<Identifier> for Node {
    fn from(node: Identifier) -> Self {
        Self::Identifier(node)
    }
}

impl From<IntLiteralExpr> for Node {
    fn from(node: IntLiteralExpr) -> Self {
        Self::IntLiteral(node)
    }
}

impl From<Assignment> for Node {
    fn from(node: Assignment) -> Self {
        Self::Assignment(node)
    }
}

impl From<Program> for Node {
    fn from(node: Program) -> Self {
        Self::Program(node)
    }
}
