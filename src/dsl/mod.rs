#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod ast;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod vocab;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod lexer;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod error;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod parser;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod scope;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod codegen;

use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use ast::Program;
use codegen::Generator;
use error::{CompileError, GenerateError, ParseError};
use lexer::Tokenizer;
use parser::Parser;

use crate::settings::CompileSettings;

/// Parse a source string into a `Program`.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let result = Parser::new(Tokenizer::new(source)).parse();
    match &result {
        Ok(program) => debug!(statements = program.statements.len(), "parsed"),
        Err(e) => debug!(error = %e, "parse failed"),
    }
    result
}

/// Render a parsed `Program` as script text. Fails without partial output.
pub fn generate(program: &Program, settings: &CompileSettings) -> Result<String, GenerateError> {
    let result = Generator::new(settings).generate(program);
    if let Err(e) = &result {
        debug!(error = %e, "generation failed");
    }
    result
}

/// Compile a source string straight to script text.
///
/// This is the primary public entry point for the pipeline:
/// source → tokenize → parse → generate (with scope resolution) → text
pub fn compile_source(source: &str, settings: &CompileSettings) -> Result<String, CompileError> {
    let program = parse(source)?;
    Ok(generate(&program, settings)?)
}

/// Parse result in the shape the editor front end consumes: a validity
/// flag, the program (empty when invalid), and the diagnostic if any.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ParseOutcome {
    pub valid: bool,
    pub program: Program,
    pub error: Option<ParseError>,
}

impl From<Result<Program, ParseError>> for ParseOutcome {
    fn from(result: Result<Program, ParseError>) -> Self {
        match result {
            Ok(program) => Self { valid: true, program, error: None },
            Err(e) => Self { valid: false, program: Program::empty(), error: Some(e) },
        }
    }
}
