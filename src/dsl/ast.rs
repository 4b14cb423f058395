//! AST node types for the emoji script language.

use std::fmt::Write as _;

use serde::Serialize;
use ts_rs::TS;

/// Source position for error reporting. Lines and columns are 1-based,
/// columns count Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A complete parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Program {
    pub statements: Vec<Node>,
    pub position: Position,
}

impl Program {
    pub fn empty() -> Self {
        Self {
            statements: Vec::new(),
            position: Position::default(),
        }
    }
}

/// A single AST node. Parents own their children exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn identifier(ident: Identifier) -> Self {
        Self {
            kind: NodeKind::Identifier { name: ident.name },
            position: ident.position,
        }
    }

    /// True for nodes that evaluate to a value in the generated script and
    /// can therefore receive a trailing index expression.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::NumberLiteral { .. }
                | NodeKind::StringLiteral { .. }
                | NodeKind::BooleanLiteral { .. }
                | NodeKind::Identifier { .. }
                | NodeKind::ArrayLiteral { .. }
                | NodeKind::Expression(_)
                | NodeKind::FunctionCall { .. }
                | NodeKind::IndexExpression { .. }
        )
    }

    /// An operator expression without its own grouping barrier.
    pub fn is_bare_operation(&self) -> bool {
        matches!(&self.kind, NodeKind::Expression(e) if e.operator.is_some() && !e.parenthesized)
    }
}

/// A name made of one or more consecutive symbol tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

/// The universal binary / unary / grouping node.
///
/// Valid shapes: `left` alone, `left op right`, and `left 🚫` (prefix
/// negation of `left`). Anything else is rejected by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Expression {
    pub left: Box<Node>,
    pub operator: Option<Operator>,
    pub right: Option<Box<Node>>,
    /// Set by a grouping barrier; affects output only.
    pub parenthesized: bool,
    pub position: Position,
}

impl Expression {
    /// Wrap a non-expression node so it can stand where an `Expression` is required.
    pub fn bare(node: Node) -> Self {
        let position = node.position;
        Self {
            left: Box::new(node),
            operator: None,
            right: None,
            parenthesized: false,
            position,
        }
    }

    /// Use `node` as-is when it already is an expression, otherwise wrap it.
    pub fn from_node(node: Node) -> Self {
        match node.kind {
            NodeKind::Expression(expr) => expr,
            kind => Self::bare(Node::new(kind, node.position)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum NodeKind {
    /// Digits: `1️⃣ 2️⃣ 3️⃣` → 123
    NumberLiteral {
        #[ts(type = "number")]
        value: i64,
    },
    /// `📋 ... 📋`
    StringLiteral { value: String },
    /// `✅`, `❌`
    BooleanLiteral { value: bool },
    /// Run of symbols: `🍉 🍉`
    Identifier { name: String },
    /// `📦 a 🌚 b 🎁`
    ArrayLiteral { elements: Vec<Node> },
    Expression(Expression),
    /// `📝 name 👉 value`
    VariableDeclaration { name: Identifier, value: Box<Node> },
    /// `📥 name 👉 value`
    Assignment { target: Identifier, value: Box<Node> },
    /// `🤔 cond 👉 ... [💭 ...] ⏹️`
    IfStatement {
        condition: Expression,
        consequent: Vec<Node>,
        alternative: Option<Vec<Node>>,
    },
    /// `🔄 cond 👉 ... ⏹️`
    LoopStatement { condition: Expression, body: Vec<Node> },
    /// `📎 name [🌚 param]* 👉 ... ⏹️`
    FunctionDefinition {
        name: Identifier,
        parameters: Vec<Identifier>,
        body: Vec<Node>,
    },
    /// `🫑 name 👉 args 🍴` or `name 🫑 args 🍴`
    FunctionCall { name: Identifier, arguments: Vec<Node> },
    /// `🔎 digits`. The receiver is the value-producing node immediately
    /// before this one in the enclosing node list; it is bound at generation.
    /// Only siblings qualify, so `📢 📦 1️⃣ 🎁 🔎 0️⃣` fails: the print is not a
    /// value and the array inside it is not in the same list.
    IndexExpression {
        #[ts(type = "number")]
        index: u64,
    },
    /// `📢 value`
    IOOperation { value: Box<Node> },
}

/// Math and relational operators, in source order of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Not,
    And,
    Or,
}

impl Operator {
    /// The JavaScript token for this operator.
    pub fn host_token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Equal => "===",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Not => "!",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

// ── Debug tree ─────────────────────────────────────────────────────

impl Program {
    /// Indented, one-node-per-line dump of the tree.
    pub fn render_tree(&self) -> String {
        let mut out = String::from("Program\n");
        for stmt in &self.statements {
            write_node(&mut out, stmt, 1);
        }
        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_line(out: &mut String, depth: usize, text: &str) {
    indent(out, depth);
    out.push_str(text);
    out.push('\n');
}

fn write_block(out: &mut String, label: &str, nodes: &[Node], depth: usize) {
    write_line(out, depth, label);
    for node in nodes {
        write_node(out, node, depth + 1);
    }
}

fn write_expression(out: &mut String, expr: &Expression, depth: usize) {
    indent(out, depth);
    out.push_str("Expression");
    if let Some(op) = expr.operator {
        let _ = write!(out, " {op:?}");
    }
    if expr.parenthesized {
        out.push_str(" (grouped)");
    }
    out.push('\n');
    write_node(out, &expr.left, depth + 1);
    if let Some(right) = &expr.right {
        write_node(out, right, depth + 1);
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match &node.kind {
        NodeKind::NumberLiteral { value } => write_line(out, depth, &format!("NumberLiteral {value}")),
        NodeKind::StringLiteral { value } => write_line(out, depth, &format!("StringLiteral \"{value}\"")),
        NodeKind::BooleanLiteral { value } => write_line(out, depth, &format!("BooleanLiteral {value}")),
        NodeKind::Identifier { name } => write_line(out, depth, &format!("Identifier {name}")),
        NodeKind::ArrayLiteral { elements } => write_block(out, "ArrayLiteral", elements, depth),
        NodeKind::Expression(expr) => write_expression(out, expr, depth),
        NodeKind::VariableDeclaration { name, value } => {
            write_line(out, depth, &format!("VariableDeclaration {}", name.name));
            write_node(out, value, depth + 1);
        }
        NodeKind::Assignment { target, value } => {
            write_line(out, depth, &format!("Assignment {}", target.name));
            write_node(out, value, depth + 1);
        }
        NodeKind::IfStatement { condition, consequent, alternative } => {
            write_line(out, depth, "IfStatement");
            write_expression(out, condition, depth + 1);
            write_block(out, "Consequent", consequent, depth + 1);
            if let Some(alt) = alternative {
                write_block(out, "Alternative", alt, depth + 1);
            }
        }
        NodeKind::LoopStatement { condition, body } => {
            write_line(out, depth, "LoopStatement");
            write_expression(out, condition, depth + 1);
            write_block(out, "Body", body, depth + 1);
        }
        NodeKind::FunctionDefinition { name, parameters, body } => {
            let params: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
            write_line(
                out,
                depth,
                &format!("FunctionDefinition {}({})", name.name, params.join(", ")),
            );
            write_block(out, "Body", body, depth + 1);
        }
        NodeKind::FunctionCall { name, arguments } => {
            write_block(out, &format!("FunctionCall {}", name.name), arguments, depth);
        }
        NodeKind::IndexExpression { index } => write_line(out, depth, &format!("IndexExpression [{index}]")),
        NodeKind::IOOperation { value } => {
            write_line(out, depth, "IOOperation print");
            write_node(out, value, depth + 1);
        }
    }
}
