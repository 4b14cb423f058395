//! Tree-walking JavaScript generator.
//!
//! One `Generator` per run. It owns the scope chain, so every block it
//! renders is bracketed by a matching enter/exit through [`Generator::scoped`].

use std::fmt::Write as _;

use tracing::{debug, trace};

use super::ast::*;
use super::error::GenerateError;
use super::scope::{Binding, SymbolTable};
use crate::settings::CompileSettings;

const STATEMENT_SEPARATOR: &str = ";";

/// A rendered list entry and whether a trailing index may attach to it.
struct Fragment {
    text: String,
    is_value: bool,
}

pub struct Generator {
    symbols: SymbolTable,
    print_callee: &'static str,
}

impl Generator {
    pub fn new(settings: &CompileSettings) -> Self {
        debug!(sink = ?settings.print_sink, "print sink selected");
        Self {
            symbols: SymbolTable::new(),
            print_callee: settings.print_sink.callee(),
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<String, GenerateError> {
        self.block(&program.statements)
    }

    // ── Lists ──────────────────────────────────────────────────────

    /// Render an ordered node list, folding each `🔎` onto the entry before it.
    fn list(&mut self, nodes: &[Node]) -> Result<Vec<String>, GenerateError> {
        let mut fragments: Vec<Fragment> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let NodeKind::IndexExpression { index } = node.kind {
                match fragments.last_mut() {
                    Some(prev) if prev.is_value => {
                        let _ = write!(prev.text, "[{index}]");
                    }
                    _ => {
                        return Err(GenerateError::malformed(
                            "🔎 (index) must follow an array or value",
                            node.position,
                        ));
                    }
                }
                continue;
            }
            fragments.push(Fragment {
                text: self.node(node)?,
                is_value: node.is_value(),
            });
        }
        Ok(fragments.into_iter().map(|f| f.text).collect())
    }

    fn block(&mut self, nodes: &[Node]) -> Result<String, GenerateError> {
        Ok(self.list(nodes)?.join(STATEMENT_SEPARATOR))
    }

    /// Run `f` inside a fresh child scope. The scope is popped even when `f` fails.
    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GenerateError>,
    ) -> Result<T, GenerateError> {
        self.symbols.enter_scope();
        let result = f(self);
        self.symbols
            .exit_scope()
            .map_err(|_| GenerateError::ScopeUnderflow)?;
        result
    }

    // ── Nodes ──────────────────────────────────────────────────────

    fn node(&mut self, node: &Node) -> Result<String, GenerateError> {
        match &node.kind {
            NodeKind::NumberLiteral { value } => Ok(value.to_string()),
            NodeKind::StringLiteral { value } => Ok(quote_string(value)),
            NodeKind::BooleanLiteral { value } => Ok(value.to_string()),
            NodeKind::Identifier { name } => Ok(name.clone()),
            NodeKind::ArrayLiteral { elements } => Ok(format!("[{}]", self.list(elements)?.join(","))),
            NodeKind::Expression(expr) => self.expression(expr),
            NodeKind::VariableDeclaration { name, value } => {
                let value = self.node(value)?;
                self.symbols
                    .define(&name.name, Binding::variable(value.as_str()))
                    .map_err(|e| GenerateError::from_scope(e, name.position))?;
                Ok(format!("let {}={value}", name.name))
            }
            NodeKind::Assignment { target, value } => Ok(format!("{}={}", target.name, self.node(value)?)),
            NodeKind::IfStatement { condition, consequent, alternative } => {
                let condition = self.expression(condition)?;
                let consequent = self.scoped(|g| g.block(consequent))?;
                let mut out = format!("if({condition}){{{consequent}}}");
                if let Some(alternative) = alternative {
                    let alternative = self.scoped(|g| g.block(alternative))?;
                    let _ = write!(out, "else{{{alternative}}}");
                }
                Ok(out)
            }
            NodeKind::LoopStatement { condition, body } => {
                let condition = self.expression(condition)?;
                let body = self.scoped(|g| g.block(body))?;
                Ok(format!("while({condition}){{{body}}}"))
            }
            NodeKind::FunctionDefinition { name, parameters, body } => {
                self.function_definition(name, parameters, body)
            }
            NodeKind::FunctionCall { name, arguments } => {
                let Some(binding) = self.symbols.lookup(&name.name, false) else {
                    return Err(GenerateError::UnresolvedReference {
                        name: name.name.clone(),
                        position: name.position,
                    });
                };
                trace!(name = %name.name, kind = ?binding.kind, bound = %binding.value, "call resolved");
                Ok(format!("{}({})", name.name, self.list(arguments)?.join(",")))
            }
            NodeKind::IndexExpression { .. } => Err(GenerateError::malformed(
                "🔎 (index) must follow an array or value",
                node.position,
            )),
            NodeKind::IOOperation { value } => {
                let value = self.node(value)?;
                Ok(format!("{}{value})", self.print_callee))
            }
        }
    }

    fn function_definition(
        &mut self,
        name: &Identifier,
        parameters: &[Identifier],
        body: &[Node],
    ) -> Result<String, GenerateError> {
        // Redefining a function visible from here is an error, not shadowing.
        if self.symbols.lookup(&name.name, false).is_some() {
            return Err(GenerateError::DuplicateDeclaration {
                name: name.name.clone(),
                position: name.position,
            });
        }
        self.symbols
            .define(&name.name, Binding::function(name.name.as_str()))
            .map_err(|e| GenerateError::from_scope(e, name.position))?;

        let body = self.scoped(|g| {
            for param in parameters {
                g.symbols
                    .define(&param.name, Binding::parameter(param.name.as_str()))
                    .map_err(|e| GenerateError::from_scope(e, param.position))?;
            }
            g.block(body)
        })?;
        let params: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
        Ok(format!("function {}({}){{{body}}}", name.name, params.join(",")))
    }

    fn expression(&mut self, expr: &Expression) -> Result<String, GenerateError> {
        let text = match (expr.operator, &expr.right) {
            (None, None) => self.node(&expr.left)?,
            (None, Some(_)) => {
                return Err(GenerateError::malformed("Missing operator for expression", expr.position));
            }
            (Some(Operator::Not), None) => format!("!{}", self.operand(&expr.left)?),
            (Some(Operator::Not), Some(_)) => {
                return Err(GenerateError::malformed(
                    "🚫 (not) does not take a right-hand operand",
                    expr.position,
                ));
            }
            (Some(op), None) => {
                return Err(GenerateError::malformed(
                    format!("Missing right-hand operand for '{}'", op.host_token()),
                    expr.position,
                ));
            }
            (Some(op), Some(right)) => {
                let left = self.operand(&expr.left)?;
                let right = self.operand(right)?;
                format!("{left}{}{right}", op.host_token())
            }
        };
        Ok(if expr.parenthesized { format!("({text})") } else { text })
    }

    /// Operands that are themselves ungrouped operations get parentheses so
    /// the host language evaluates the chain in source order.
    fn operand(&mut self, node: &Node) -> Result<String, GenerateError> {
        let text = self.node(node)?;
        Ok(if node.is_bare_operation() { format!("({text})") } else { text })
    }
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dsl::error::GenerateErrorKind;
    use crate::settings::PrintSink;

    fn pos() -> Position {
        Position::default()
    }

    fn num(value: i64) -> Node {
        Node::new(NodeKind::NumberLiteral { value }, pos())
    }

    fn boolean(value: bool) -> Node {
        Node::new(NodeKind::BooleanLiteral { value }, pos())
    }

    fn ident(name: &str) -> Identifier {
        Identifier { name: name.into(), position: pos() }
    }

    fn var(name: &str) -> Node {
        Node::identifier(ident(name))
    }

    fn op(left: Node, operator: Operator, right: Node) -> Node {
        Node::new(
            NodeKind::Expression(Expression {
                left: Box::new(left),
                operator: Some(operator),
                right: Some(Box::new(right)),
                parenthesized: false,
                position: pos(),
            }),
            pos(),
        )
    }

    fn grouped(node: Node) -> Node {
        let mut expr = Expression::from_node(node);
        expr.parenthesized = true;
        Node::new(NodeKind::Expression(expr), pos())
    }

    fn print(value: Node) -> Node {
        Node::new(NodeKind::IOOperation { value: Box::new(value) }, pos())
    }

    fn declare(name: &str, value: Node) -> Node {
        Node::new(
            NodeKind::VariableDeclaration { name: ident(name), value: Box::new(value) },
            pos(),
        )
    }

    fn define(name: &str, params: &[&str], body: Vec<Node>) -> Node {
        Node::new(
            NodeKind::FunctionDefinition {
                name: ident(name),
                parameters: params.iter().map(|p| ident(p)).collect(),
                body,
            },
            pos(),
        )
    }

    fn call(name: &str, arguments: Vec<Node>) -> Node {
        Node::new(NodeKind::FunctionCall { name: ident(name), arguments }, pos())
    }

    fn index(index: u64) -> Node {
        Node::new(NodeKind::IndexExpression { index }, pos())
    }

    fn if_stmt(condition: Node, consequent: Vec<Node>, alternative: Option<Vec<Node>>) -> Node {
        Node::new(
            NodeKind::IfStatement { condition: Expression::from_node(condition), consequent, alternative },
            pos(),
        )
    }

    fn program(statements: Vec<Node>) -> Program {
        Program { statements, position: pos() }
    }

    fn render_with(sink: PrintSink, statements: Vec<Node>) -> Result<String, GenerateError> {
        Generator::new(&CompileSettings::with_sink(sink)).generate(&program(statements))
    }

    fn render(statements: Vec<Node>) -> String {
        render_with(PrintSink::Rich, statements).unwrap()
    }

    fn render_err(statements: Vec<Node>) -> GenerateError {
        render_with(PrintSink::Rich, statements).unwrap_err()
    }

    #[test]
    fn literals() {
        assert_eq!(render(vec![num(42)]), "42");
        assert_eq!(render(vec![boolean(false)]), "false");
        let s = Node::new(NodeKind::StringLiteral { value: "🍉".into() }, pos());
        assert_eq!(render(vec![s]), "\"🍉\"");
    }

    #[test]
    fn strings_are_escaped() {
        let s = Node::new(NodeKind::StringLiteral { value: "a\"b\\c\nd".into() }, pos());
        assert_eq!(render(vec![s]), r#""a\"b\\c\nd""#);
    }

    #[test]
    fn nested_array() {
        let inner = Node::new(NodeKind::ArrayLiteral { elements: vec![boolean(false)] }, pos());
        let outer = Node::new(NodeKind::ArrayLiteral { elements: vec![num(12), inner, boolean(true)] }, pos());
        assert_eq!(render(vec![outer]), "[12,[false],true]");
    }

    #[test]
    fn declaration_and_assignment() {
        let assign = Node::new(NodeKind::Assignment { target: ident("a"), value: Box::new(num(1)) }, pos());
        assert_eq!(render(vec![declare("a", num(1))]), "let a=1");
        assert_eq!(render(vec![assign]), "a=1");
    }

    #[test]
    fn statements_joined_without_trailing_separator() {
        assert_eq!(render(vec![declare("a", num(1)), print(var("a"))]), "let a=1;window.alert(a)");
    }

    #[test]
    fn expression_shapes() {
        assert_eq!(render(vec![op(num(0), Operator::Add, num(1))]), "0+1");
        assert_eq!(render(vec![grouped(num(0))]), "(0)");
        let inner = grouped(op(num(1), Operator::Add, num(0)));
        assert_eq!(render(vec![grouped(op(num(1), Operator::Equal, inner))]), "(1===(1+0))");
    }

    #[test]
    fn every_operator_maps() {
        let cases = [
            (Operator::Sub, "1-2"),
            (Operator::Mul, "1*2"),
            (Operator::Div, "1/2"),
            (Operator::Greater, "1>2"),
            (Operator::Less, "1<2"),
            (Operator::GreaterOrEqual, "1>=2"),
            (Operator::LessOrEqual, "1<=2"),
            (Operator::And, "1&&2"),
            (Operator::Or, "1||2"),
        ];
        for (operator, expected) in cases {
            assert_eq!(render(vec![op(num(1), operator, num(2))]), expected);
        }
    }

    #[test]
    fn not_is_prefix() {
        let not = Node::new(
            NodeKind::Expression(Expression {
                left: Box::new(boolean(false)),
                operator: Some(Operator::Not),
                right: None,
                parenthesized: false,
                position: pos(),
            }),
            pos(),
        );
        assert_eq!(render(vec![not]), "!false");
    }

    #[test]
    fn chained_operations_keep_source_order() {
        let chain = op(op(num(1), Operator::Add, num(2)), Operator::Mul, num(3));
        assert_eq!(render(vec![chain]), "(1+2)*3");
        let grouped_left = op(grouped(op(num(1), Operator::Add, num(2))), Operator::Mul, num(3));
        assert_eq!(render(vec![grouped_left]), "(1+2)*3");
    }

    #[test]
    fn malformed_expression_shapes() {
        let no_operator = Expression {
            left: Box::new(num(1)),
            operator: None,
            right: Some(Box::new(num(2))),
            parenthesized: false,
            position: pos(),
        };
        let no_right = Expression { operator: Some(Operator::Add), right: None, ..no_operator.clone() };
        let not_with_right = Expression { operator: Some(Operator::Not), ..no_operator.clone() };
        for expr in [no_operator, no_right, not_with_right] {
            let err = render_err(vec![Node::new(NodeKind::Expression(expr), pos())]);
            assert_eq!(err.kind(), GenerateErrorKind::MalformedExpression);
        }
    }

    #[test]
    fn if_with_and_without_else() {
        let cond = op(num(1), Operator::Less, num(2));
        assert_eq!(
            render(vec![if_stmt(cond.clone(), vec![print(num(1)), print(num(2))], None)]),
            "if(1<2){window.alert(1);window.alert(2)}"
        );
        assert_eq!(
            render(vec![if_stmt(cond, vec![print(num(1))], Some(vec![print(num(2))]))]),
            "if(1<2){window.alert(1)}else{window.alert(2)}"
        );
    }

    #[test]
    fn while_loop() {
        let s = Node::new(NodeKind::StringLiteral { value: "here".into() }, pos());
        let loop_stmt = Node::new(
            NodeKind::LoopStatement { condition: Expression::from_node(boolean(true)), body: vec![print(s)] },
            pos(),
        );
        assert_eq!(render(vec![loop_stmt]), "while(true){window.alert(\"here\")}");
    }

    #[test]
    fn function_definitions() {
        assert_eq!(render(vec![define("a", &[], vec![])]), "function a(){}");
        assert_eq!(render(vec![define("a", &["param1", "param2"], vec![])]), "function a(param1,param2){}");
        let body = vec![if_stmt(
            op(num(1), Operator::Less, num(2)),
            vec![print(num(1)), print(num(2))],
            None,
        )];
        assert_eq!(
            render(vec![define("a", &[], body)]),
            "function a(){if(1<2){window.alert(1);window.alert(2)}}"
        );
    }

    #[test]
    fn call_after_definition() {
        let args = vec![op(num(1), Operator::Add, num(1)), var("b")];
        assert_eq!(render(vec![define("a", &[], vec![]), call("a", args)]), "function a(){};a(1+1,b)");
    }

    #[test]
    fn recursive_call_resolves() {
        let body = vec![call("a", vec![])];
        assert_eq!(render(vec![define("a", &[], body)]), "function a(){a()}");
    }

    #[test]
    fn undefined_call_is_unresolved() {
        let err = render_err(vec![call("🐙", vec![])]);
        assert_eq!(
            err,
            GenerateError::UnresolvedReference { name: "🐙".into(), position: pos() }
        );
    }

    #[test]
    fn function_redefinition_is_duplicate() {
        let err = render_err(vec![define("a", &[], vec![]), define("a", &[], vec![])]);
        assert_eq!(err.kind(), GenerateErrorKind::DuplicateDeclaration);
        // visible from an enclosing scope counts too
        let err = render_err(vec![define("a", &[], vec![define("a", &[], vec![])])]);
        assert_eq!(err.kind(), GenerateErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn duplicate_parameters() {
        let err = render_err(vec![define("a", &["x", "x"], vec![])]);
        assert!(matches!(err, GenerateError::DuplicateDeclaration { name, .. } if name == "x"));
    }

    #[test]
    fn parameters_are_local_to_body() {
        let body = vec![declare("y", var("x"))];
        assert_eq!(
            render(vec![define("a", &["x"], body), declare("x", num(1))]),
            "function a(x){let y=x};let x=1"
        );
    }

    #[test]
    fn duplicate_in_same_scope() {
        let err = render_err(vec![declare("a", num(1)), declare("a", num(2))]);
        assert_eq!(err.kind(), GenerateErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn shadowing_in_nested_scope_is_allowed() {
        let stmt = if_stmt(boolean(true), vec![declare("a", num(2))], None);
        assert_eq!(render(vec![declare("a", num(1)), stmt]), "let a=1;if(true){let a=2}");
    }

    #[test]
    fn branches_have_separate_scopes() {
        let stmt = if_stmt(
            boolean(true),
            vec![declare("a", num(1))],
            Some(vec![declare("a", num(2))]),
        );
        assert_eq!(render(vec![stmt, declare("a", num(3))]), "if(true){let a=1}else{let a=2};let a=3");
    }

    #[test]
    fn block_function_not_visible_after_block() {
        let stmt = if_stmt(boolean(true), vec![define("f", &[], vec![])], None);
        let err = render_err(vec![stmt, call("f", vec![])]);
        assert_eq!(err.kind(), GenerateErrorKind::UnresolvedReference);
    }

    #[test]
    fn index_folds_onto_previous_value() {
        let arr = Node::new(NodeKind::ArrayLiteral { elements: vec![var("👋")] }, pos());
        assert_eq!(render(vec![arr, index(0)]), "[👋][0]");
        assert_eq!(render(vec![var("a"), index(1), index(2), print(num(1))]), "a[1][2];window.alert(1)");
    }

    #[test]
    fn index_inside_array_and_arguments() {
        let arr = Node::new(NodeKind::ArrayLiteral { elements: vec![var("a"), index(3), num(4)] }, pos());
        assert_eq!(render(vec![arr]), "[a[3],4]");
        assert_eq!(
            render(vec![define("f", &[], vec![]), call("f", vec![var("a"), index(0)])]),
            "function f(){};f(a[0])"
        );
    }

    #[test]
    fn index_without_receiver_is_malformed() {
        assert_eq!(render_err(vec![index(0)]).kind(), GenerateErrorKind::MalformedExpression);
        assert_eq!(
            render_err(vec![print(num(1)), index(0)]).kind(),
            GenerateErrorKind::MalformedExpression
        );
        assert_eq!(render_err(vec![print(index(0))]).kind(), GenerateErrorKind::MalformedExpression);
    }

    #[test]
    fn plain_sink() {
        assert_eq!(render_with(PrintSink::Plain, vec![print(num(1))]).unwrap(), "console.log(1)");
    }

    #[test]
    fn print_renders_nested_call() {
        assert_eq!(
            render(vec![define("f", &[], vec![]), print(call("f", vec![num(1)]))]),
            "function f(){};window.alert(f(1))"
        );
        assert_eq!(
            render_err(vec![print(call("g", vec![]))]).kind(),
            GenerateErrorKind::UnresolvedReference
        );
    }

    #[test]
    fn scopes_balance_after_failure() {
        let mut generator = Generator::new(&CompileSettings::default());
        let body = vec![call("missing", vec![])];
        assert!(generator.scoped(|g| g.block(&body)).is_err());
        assert_eq!(generator.symbols.level(), 0);
    }

    #[test]
    fn generation_is_deterministic() {
        let p = program(vec![declare("a", num(1)), define("f", &["x"], vec![print(var("x"))]), call("f", vec![var("a")])]);
        let settings = CompileSettings::default();
        let first = Generator::new(&settings).generate(&p).unwrap();
        let second = Generator::new(&settings).generate(&p).unwrap();
        assert_eq!(first, second);
    }
}
