mod annotation;
mod error;
mod lexer;
mod rules;
mod scanner;
mod span;
mod structure;
mod words;

pub use annotation::{annotations, Annotation};
pub use error::ScanError;
pub use lexer::{tokenize, Token, TokenKind};
pub use scanner::{scan, Scanner};
pub use span::Span;
