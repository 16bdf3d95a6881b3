//! Rule DSL: tokenizer, line parser, mirror synthesis and directory loading.

pub mod lexer;
pub mod loader;
pub mod mirror;
pub mod parser;

pub use loader::{FileReport, RuleBook, RuleLoader};
pub use parser::{ParsedFile, RuleParser};
