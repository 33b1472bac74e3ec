use std::ops::Range;

use serde::Serialize;

use crate::lexer::Token;

/// A located occurrence of a category. Columns are 1-based character positions with an
/// exclusive end; a token spanning several lines yields one span per line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub line: usize,
    pub columns: Range<usize>,
    pub category: String,
    pub text: String,
}

/// Maps byte offsets to line and column numbers.
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { source, starts }
    }

    /// 1-based character column of a byte offset on the given 1-based line.
    pub(crate) fn column(&self, line: usize, offset: usize) -> usize {
        let start = self.starts[line - 1];
        self.source[start..offset].chars().count() + 1
    }

    /// Cuts a token into per-line spans, dropping empty fragments and carriage returns.
    pub(crate) fn spans(&self, token: &Token, category: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut offset = token.range.start;
        for (step, fragment) in token.text(self.source).split('\n').enumerate() {
            let line = token.line + step;
            let text = fragment.strip_suffix('\r').unwrap_or(fragment);
            if !text.is_empty() {
                let start = self.column(line, offset);
                spans.push(Span {
                    line,
                    columns: start..start + text.chars().count(),
                    category: category.to_string(),
                    text: text.to_string(),
                });
            }
            offset += fragment.len() + 1;
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, TokenKind};

    #[test]
    fn columns_count_characters_not_bytes() {
        let source = "let é = 'ü';";
        let index = LineIndex::new(source);
        let tokens = tokenize(source).expect("tokenize");
        let string = tokens
            .iter()
            .find(|token| token.kind == TokenKind::String)
            .expect("string");
        let spans = index.spans(string, "string");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].columns, 9..12);
        assert_eq!(spans[0].text, "'ü'");
    }

    #[test]
    fn multiline_tokens_split_per_line() {
        let source = "x;\r\n/* a\r\n\r\n   b */";
        let index = LineIndex::new(source);
        let tokens = tokenize(source).expect("tokenize");
        let comment = tokens.last().expect("comment");
        let spans = index.spans(comment, "comment");
        let lines: Vec<_> = spans
            .iter()
            .map(|span| (span.line, span.columns.clone(), span.text.as_str()))
            .collect();
        assert_eq!(lines, vec![(2, 1..5, "/* a"), (4, 1..8, "   b */")]);
    }

    #[test]
    fn spans_serialize_with_column_range() {
        let span = Span {
            line: 3,
            columns: 5..9,
            category: "keyword".into(),
            text: "enum".into(),
        };
        let value = serde_json::to_value(&span).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "line": 3,
                "columns": { "start": 5, "end": 9 },
                "category": "keyword",
                "text": "enum"
            })
        );
    }
}
