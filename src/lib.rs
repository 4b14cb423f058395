pub mod dsl;
pub mod error;
pub mod settings;

pub use dsl::{compile_source, generate, parse, ParseOutcome};
pub use error::AppError;
pub use settings::{CompileSettings, PrintSink};
