use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use themecheck_catalog::Rgb;

use crate::error::ScanError;
use crate::lexer::tokenize;

/// `label: token #RRGGBB` or `label: #RRGGBB` inside a comment.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<label>[A-Za-z][A-Za-z ]*?)\s*:\s*(?:(?P<token>[a-z_]+)\s+)?(?P<hex>#[0-9A-Fa-f]{6})\b",
    )
    .expect("annotation regex")
});

/// A color claim written in a fixture comment, such as `// keyword: lantern #E26A3B`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub line: usize,
    pub label: String,
    pub token: Option<String>,
    pub color: Rgb,
}

/// Collects every annotation from the comments of a fixture, in source order.
pub fn annotations(source: &str) -> Result<Vec<Annotation>, ScanError> {
    let mut found = Vec::new();
    for token in tokenize(source)? {
        if !token.kind.is_comment() {
            continue;
        }
        for (step, line_text) in token.text(source).lines().enumerate() {
            for captures in ANNOTATION.captures_iter(line_text) {
                let Ok(color) = Rgb::parse(&captures["hex"]) else {
                    continue;
                };
                found.push(Annotation {
                    line: token.line + step,
                    label: captures["label"].trim().to_string(),
                    token: captures.name("token").map(|token| token.as_str().to_string()),
                    color,
                });
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_label_token_and_color() {
        let source = "let a = 1; // constant name: bright_red #D65A3A\n/**\n * decorator: #F08A5D\n */";
        let found = annotations(source).expect("annotations");
        assert_eq!(
            found,
            vec![
                Annotation {
                    line: 1,
                    label: "constant name".into(),
                    token: Some("bright_red".into()),
                    color: Rgb::new(0xD6, 0x5A, 0x3A),
                },
                Annotation {
                    line: 3,
                    label: "decorator".into(),
                    token: None,
                    color: Rgb::new(0xF0, 0x8A, 0x5D),
                },
            ]
        );
    }

    #[test]
    fn ignores_headings_and_code() {
        let source = "// 1. IMPORTS (bright_blue #6F879A)\nconst s = \"label: #FFFFFF\";";
        assert!(annotations(source).expect("annotations").is_empty());
    }
}
