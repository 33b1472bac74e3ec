use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("line {line}: unterminated {category}")]
    UnterminatedLiteral { line: usize, category: &'static str },
    #[error(
        "line {line}, column {column}: '{text}' is ambiguous between {}",
        .candidates.join(", ")
    )]
    AmbiguousClassification {
        line: usize,
        column: usize,
        text: String,
        candidates: Vec<String>,
    },
}
