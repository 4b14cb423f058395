use std::fmt;

use super::ast::{Operator, Position};
use super::vocab;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Literals
    Digit(u8),
    /// A completed string capture (`📋 ... 📋`).
    Str(String),
    True,
    False,

    // Delimiters
    Quote,
    ArrayStart,
    ArrayEnd,
    Comma,
    CallStart,
    CallEnd,

    // Operators
    Operator(Operator),

    // Control flow
    If,
    Then,
    Else,
    Stop,
    Loop,
    Barrier,

    // Declarations
    VarDeclare,
    Assign,
    FunctionDef,
    Index,
    Print,

    /// Any other pictographic unit; runs of these form identifiers.
    Symbol(String),
    Illegal(String),
    Eof,
}

impl Token {
    /// Can this token begin an operand of an expression?
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            Token::Digit(_)
                | Token::Str(_)
                | Token::True
                | Token::False
                | Token::ArrayStart
                | Token::Symbol(_)
                | Token::Barrier
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "string \"{s}\""),
            Token::Symbol(s) => write!(f, "symbol {s}"),
            Token::Illegal(s) => write!(f, "illegal input '{s}'"),
            Token::Eof => write!(f, "end of input"),
            other => match vocab::entry_for(other) {
                Some(e) => write!(f, "{} ({})", e.symbol, e.name),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}

/// Read position inside the source. Restoring a copy of this is all `peek`
/// needs to be non-destructive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn position(self) -> Position {
        Position::new(self.line, self.column)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Pull-based tokenizer over pictographic source. Never fails; unrecognized
/// input becomes `Token::Illegal` for the parser to reject.
pub struct Tokenizer<'a> {
    source: &'a str,
    cursor: Cursor,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Cursor {
                offset: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Consume and return the next token. Returns `Eof` forever once the
    /// input is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> SpannedToken {
        let Some((unit, position)) = self.read_unit() else {
            return SpannedToken {
                token: Token::Eof,
                position: self.cursor.position(),
            };
        };
        let token = match vocab::lookup(unit) {
            Some(e) if e.token == Token::Quote => self.read_string(),
            Some(e) => e.token.clone(),
            None if vocab::is_symbol(unit) => Token::Symbol(unit.to_string()),
            None => Token::Illegal(unit.to_string()),
        };
        SpannedToken { token, position }
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> SpannedToken {
        let saved = self.cursor;
        let token = self.next();
        self.cursor = saved;
        token
    }

    /// True once only whitespace (or nothing) remains.
    pub fn end(&self) -> bool {
        self.rest().chars().all(is_whitespace)
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.cursor.offset..).unwrap_or("")
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.cursor.offset += ch.len_utf8();
        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(is_whitespace) {
            self.bump();
        }
    }

    /// Read the maximal run of non-whitespace code points.
    fn read_unit(&mut self) -> Option<(&'a str, Position)> {
        self.skip_whitespace();
        let start = self.cursor;
        while self.current_char().is_some_and(|ch| !is_whitespace(ch)) {
            self.bump();
        }
        if self.cursor.offset == start.offset {
            return None;
        }
        let unit = self.source.get(start.offset..self.cursor.offset)?;
        Some((unit, start.position()))
    }

    /// Capture units up to the closing quote. Keywords inside lose their meaning.
    fn read_string(&mut self) -> Token {
        let mut value = String::new();
        loop {
            match self.read_unit() {
                Some((unit, _)) if vocab::lookup(unit).is_some_and(|e| e.token == Token::Quote) => {
                    return Token::Str(value);
                }
                Some((unit, _)) => value.push_str(unit),
                None => return Token::Illegal(format!("📋{value}")),
            }
        }
    }
}

/// Tokenize the whole source, ending with (and including) the first `Eof`.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = tokenizer.next();
        let done = tok.token == Token::Eof;
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}
