use super::ast::*;
use super::error::ParseError;
use super::lexer::{SpannedToken, Token, Tokenizer};

/// Recursive-descent parser holding one token of state; further look-ahead
/// goes through the tokenizer's `peek`.
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    current: SpannedToken,
    /// Open `🚧` groups around the current position.
    group_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Tokenizer<'a>) -> Self {
        let current = tokens.next();
        Self { tokens, current, group_depth: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let position = self.position();
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements, position })
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.current.token
    }

    fn position(&self) -> Position {
        self.current.position
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> SpannedToken {
        std::mem::replace(&mut self.current, self.tokens.next())
    }

    fn current_operator(&self) -> Option<Operator> {
        match self.peek() {
            Token::Operator(op) => Some(*op),
            _ => None,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Position, ParseError> {
        if self.peek() == expected {
            return Ok(self.advance().position);
        }
        if self.at_eof() {
            Err(ParseError::missing_token(
                format!("Expected {expected} before end of input"),
                self.position(),
            ))
        } else {
            Err(ParseError::unexpected_token(
                format!("Expected {expected}, got {}", self.peek()),
                self.position(),
            ))
        }
    }

    /// Read a run of consecutive symbol tokens as one name.
    fn parse_identifier(&mut self, what: &str) -> Result<Identifier, ParseError> {
        let position = self.position();
        let mut name = match self.peek() {
            Token::Symbol(s) => s.clone(),
            Token::Eof => {
                return Err(ParseError::missing_token(format!("Expected {what}"), position));
            }
            other => {
                return Err(ParseError::unexpected_token(
                    format!("Expected {what}, got {other}"),
                    position,
                ));
            }
        };
        self.advance();
        while let Token::Symbol(s) = self.peek() {
            name.push_str(s);
            self.advance();
        }
        Ok(Identifier { name, position })
    }

    /// Statements until one of `terminators` (or end of input) is current.
    fn parse_block(&mut self, terminators: &[Token]) -> Result<Vec<Node>, ParseError> {
        let mut body = Vec::new();
        while !self.at_eof() && !terminators.contains(self.peek()) {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    /// Comma- or whitespace-separated expressions up to `end` (not consumed).
    fn parse_list(&mut self, end: &Token) -> Result<Vec<Node>, ParseError> {
        let mut items = Vec::new();
        while !self.at_eof() && self.peek() != end {
            if matches!(self.peek(), Token::Comma) {
                self.advance();
            } else {
                items.push(self.parse_expression()?);
            }
        }
        Ok(items)
    }

    /// Accumulate a run of digit tokens into one base-10 value.
    fn parse_digits(&mut self) -> Result<u64, ParseError> {
        let position = self.position();
        let Token::Digit(first) = *self.peek() else {
            return Err(ParseError::invalid_expression(
                format!("Expected a number, got {}", self.peek()),
                position,
            ));
        };
        let mut value = u64::from(first);
        self.advance();
        while let Token::Digit(d) = *self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(d)))
                .ok_or_else(|| ParseError::invalid_expression("Number literal is too large", position))?;
            self.advance();
        }
        Ok(value)
    }

    // ── Statements ─────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Token::VarDeclare => self.parse_declaration(),
            Token::Assign => self.parse_assignment(),
            Token::If => self.parse_if(),
            Token::Loop => self.parse_loop(),
            Token::FunctionDef => self.parse_function_definition(),
            Token::CallStart => self.parse_call_statement(),
            Token::Print => self.parse_io(),
            Token::Index => self.parse_index(),
            Token::Then
            | Token::Else
            | Token::Stop
            | Token::CallEnd
            | Token::ArrayEnd
            | Token::Comma
            | Token::Operator(_) => Err(ParseError::invalid_statement(
                format!("A statement cannot begin with {}", self.peek()),
                self.position(),
            )),
            _ => self.parse_expression(),
        }
    }

    /// `📝 name 👉 value`
    fn parse_declaration(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let name = self.parse_identifier("identifier after 📝 (declare)")?;
        self.expect(&Token::Then)?;
        let value = self.parse_expression()?;
        Ok(Node::new(
            NodeKind::VariableDeclaration { name, value: Box::new(value) },
            position,
        ))
    }

    /// `📥 name 👉 value`
    fn parse_assignment(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let target = self.parse_identifier("identifier after 📥 (assign)")?;
        self.expect(&Token::Then)?;
        let value = self.parse_expression()?;
        Ok(Node::new(
            NodeKind::Assignment { target, value: Box::new(value) },
            position,
        ))
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let condition = Expression::from_node(self.parse_expression()?);
        self.expect(&Token::Then)?;
        let consequent = self.parse_block(&[Token::Else, Token::Stop])?;
        let alternative = if matches!(self.peek(), Token::Else) {
            self.advance();
            Some(self.parse_block(&[Token::Stop])?)
        } else {
            None
        };
        self.expect(&Token::Stop)?;
        Ok(Node::new(
            NodeKind::IfStatement { condition, consequent, alternative },
            position,
        ))
    }

    fn parse_loop(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let condition = Expression::from_node(self.parse_expression()?);
        self.expect(&Token::Then)?;
        let body = self.parse_block(&[Token::Stop])?;
        self.expect(&Token::Stop)?;
        Ok(Node::new(NodeKind::LoopStatement { condition, body }, position))
    }

    /// `📎 name [🌚 param]* 👉 body ⏹️`
    ///
    /// Consecutive symbols after `📎` all belong to the name. Parameters are
    /// an extension over the bare name-only form: each needs its own `🌚`,
    /// and without one a definition takes none.
    fn parse_function_definition(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let name = self.parse_identifier("function name")?;
        let mut parameters = Vec::new();
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            parameters.push(self.parse_identifier("parameter name")?);
        }
        self.expect(&Token::Then)?;
        let body = self.parse_block(&[Token::Stop])?;
        self.expect(&Token::Stop)?;
        Ok(Node::new(
            NodeKind::FunctionDefinition { name, parameters, body },
            position,
        ))
    }

    /// `🫑 name 👉 args 🍴`
    fn parse_call_statement(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let name = self.parse_identifier("function name after 🫑 (call-start)")?;
        self.expect(&Token::Then)?;
        let arguments = self.parse_list(&Token::CallEnd)?;
        self.expect(&Token::CallEnd)?;
        Ok(Node::new(NodeKind::FunctionCall { name, arguments }, position))
    }

    /// `🔎 digits`
    fn parse_index(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        if !matches!(self.peek(), Token::Digit(_)) {
            return Err(ParseError::invalid_expression(
                format!("Expected number for array index, got {}", self.peek()),
                self.position(),
            ));
        }
        let index = self.parse_digits()?;
        Ok(Node::new(NodeKind::IndexExpression { index }, position))
    }

    fn parse_io(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let value = self.parse_expression()?;
        Ok(Node::new(NodeKind::IOOperation { value: Box::new(value) }, position))
    }

    // ── Expressions ────────────────────────────────────────────────

    /// Operands chained strictly left to right; there is no precedence table.
    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        if matches!(self.peek(), Token::Index) {
            return self.parse_index();
        }
        let mut left = self.parse_operand()?;
        while let Some(operator) = self.current_operator() {
            let prefix_only = operator == Operator::Not && self.not_without_operand();
            let position = self.advance().position;
            let right = if prefix_only {
                None
            } else {
                Some(Box::new(self.parse_operand()?))
            };
            left = Node::new(
                NodeKind::Expression(Expression {
                    left: Box::new(left),
                    operator: Some(operator),
                    right,
                    parenthesized: false,
                    position,
                }),
                position,
            );
        }
        Ok(left)
    }

    /// `✅ 🚫` is the postfix spelling of `!true`. Inside a group, a `🚧`
    /// right after `🚫` closes the group rather than opening a new one.
    fn not_without_operand(&mut self) -> bool {
        let next = self.tokens.peek().token;
        !next.starts_operand() || (next == Token::Barrier && self.group_depth > 0)
    }

    fn parse_operand(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Token::Barrier => self.parse_group(),
            Token::CallStart => self.parse_call_statement(),
            tok if tok.starts_operand() => self.parse_primary(),
            Token::Eof => Err(ParseError::invalid_expression(
                "Unexpected end of input, expected an expression",
                self.position(),
            )),
            Token::Illegal(_) => Err(ParseError::unexpected_token(
                format!("Unexpected {}", self.peek()),
                self.position(),
            )),
            other => Err(ParseError::invalid_expression(
                format!("Expected an expression, got {other}"),
                self.position(),
            )),
        }
    }

    /// `🚧 expr 🚧`
    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        self.group_depth += 1;
        let inner = self.parse_expression();
        self.group_depth -= 1;
        let inner = inner?;
        self.expect(&Token::Barrier)?;
        let inner_position = inner.position;
        let expr = match inner.kind {
            NodeKind::Expression(mut expr) if !expr.parenthesized => {
                expr.parenthesized = true;
                expr
            }
            kind => Expression {
                parenthesized: true,
                ..Expression::bare(Node::new(kind, inner_position))
            },
        };
        Ok(Node::new(NodeKind::Expression(expr), position))
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let position = self.position();
        match self.peek() {
            Token::Digit(_) => {
                let digits = self.parse_digits()?;
                let value = i64::try_from(digits).map_err(|_| {
                    ParseError::invalid_expression("Number literal is too large", position)
                })?;
                Ok(Node::new(NodeKind::NumberLiteral { value }, position))
            }
            Token::Str(_) => {
                let Token::Str(value) = self.advance().token else {
                    return Err(ParseError::invalid_expression("Expected a string", position));
                };
                Ok(Node::new(NodeKind::StringLiteral { value }, position))
            }
            Token::True | Token::False => {
                let value = matches!(self.advance().token, Token::True);
                Ok(Node::new(NodeKind::BooleanLiteral { value }, position))
            }
            Token::ArrayStart => self.parse_array(),
            Token::Symbol(_) => {
                let name = self.parse_identifier("identifier")?;
                if matches!(self.peek(), Token::CallStart) {
                    self.parse_call(name)
                } else {
                    Ok(Node::identifier(name))
                }
            }
            other => Err(ParseError::invalid_expression(
                format!("Unexpected {other}"),
                position,
            )),
        }
    }

    /// `📦 elem [🌚] elem ... 🎁`
    fn parse_array(&mut self) -> Result<Node, ParseError> {
        let position = self.advance().position;
        let elements = self.parse_list(&Token::ArrayEnd)?;
        self.expect(&Token::ArrayEnd)?;
        Ok(Node::new(NodeKind::ArrayLiteral { elements }, position))
    }

    /// `name 🫑 args 🍴`, entered with `name` already read.
    fn parse_call(&mut self, name: Identifier) -> Result<Node, ParseError> {
        let position = name.position;
        self.expect(&Token::CallStart)?;
        let arguments = self.parse_list(&Token::CallEnd)?;
        self.expect(&Token::CallEnd)?;
        Ok(Node::new(NodeKind::FunctionCall { name, arguments }, position))
    }
}
