use std::collections::BTreeMap;

use themecheck_catalog::Catalog;
use tracing::{debug, trace};

use crate::error::ScanError;
use crate::lexer::{tokenize, Token};
use crate::rules::{rules_for, Rule, Site};
use crate::span::{LineIndex, Span};
use crate::structure::Structure;

/// Classifies fixture tokens into the categories of one catalog.
#[derive(Debug)]
pub struct Scanner<'c> {
    catalog: &'c Catalog,
    /// Rules paired with the catalog position of their category.
    rules: Vec<(usize, Rule)>,
}

impl<'c> Scanner<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        let rules = rules_for(catalog)
            .into_iter()
            .filter_map(|rule| catalog.position(&rule.category).map(|position| (position, rule)))
            .collect();
        Self { catalog, rules }
    }

    /// Splits `source` into spans ordered by line then column. Tokens that no catalog
    /// category claims produce no span.
    pub fn scan(&self, source: &str) -> Result<Vec<Span>, ScanError> {
        let (comments, code): (Vec<Token>, Vec<Token>) = tokenize(source)?
            .into_iter()
            .partition(|token| token.kind.is_comment());
        let structure = Structure::new(source, code);
        let lines = LineIndex::new(source);

        let mut spans = Vec::new();
        let mut unclaimed = 0usize;
        let sites = (0..structure.len())
            .map(|index| (structure.token(index), Some(index)))
            .chain(comments.iter().map(|token| (token, None)));
        for (token, code) in sites {
            let site = Site {
                token,
                text: token.text(source),
                code,
            };
            match self.classify(&structure, &lines, site)? {
                Some(category) => {
                    trace!(line = token.line, text = site.text, category, "classified token");
                    spans.extend(lines.spans(token, category));
                }
                None => unclaimed += 1,
            }
        }

        spans.sort_by(|a, b| (a.line, a.columns.start).cmp(&(b.line, b.columns.start)));
        debug!(
            spans = spans.len(),
            unclaimed,
            categories = self.catalog.len(),
            "scanned fixture"
        );
        Ok(spans)
    }

    /// Picks the category of the most specific matching rule.
    fn classify(
        &self,
        structure: &Structure<'_>,
        lines: &LineIndex<'_>,
        site: Site<'_>,
    ) -> Result<Option<&'c str>, ScanError> {
        let mut best: BTreeMap<usize, u16> = BTreeMap::new();
        for (position, rule) in &self.rules {
            if rule.matcher.matches(structure, site) {
                let entry = best.entry(*position).or_insert(rule.specificity);
                *entry = (*entry).max(rule.specificity);
            }
        }
        let Some(top) = best.values().copied().max() else {
            return Ok(None);
        };
        let leaders: Vec<usize> = best
            .iter()
            .filter(|(_, specificity)| **specificity == top)
            .map(|(position, _)| *position)
            .collect();
        let categories = self.catalog.all();
        if let [only] = leaders.as_slice() {
            return Ok(Some(categories[*only].name()));
        }
        Err(ScanError::AmbiguousClassification {
            line: site.token.line,
            column: lines.column(site.token.line, site.token.range.start),
            text: site.text.to_string(),
            candidates: leaders
                .iter()
                .map(|position| categories[*position].name().to_string())
                .collect(),
        })
    }
}

/// Scans `source` against `catalog`.
pub fn scan(catalog: &Catalog, source: &str) -> Result<Vec<Span>, ScanError> {
    Scanner::new(catalog).scan(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use themecheck_catalog::{names, CatalogOverride, CategoryOverride};

    fn category_of(spans: &[Span], text: &str) -> String {
        spans
            .iter()
            .find(|span| span.text == text)
            .map(|span| span.category.clone())
            .unwrap_or_else(|| panic!("no span for {text}"))
    }

    fn classify(source: &str) -> Vec<Span> {
        scan(&Catalog::builtin(), source).expect("scan")
    }

    #[test]
    fn declaration_shapes() {
        let spans = classify(
            "interface Shape { readonly sides: number; label?: string }\n\
             enum Color { Red, Green }\n\
             class Box<T> { static count = 0; constructor(private inner: T) {} }\n\
             function area(shape: Shape): number { return Color.Red; }",
        );
        assert_eq!(category_of(&spans, "interface"), names::KEYWORD);
        assert_eq!(category_of(&spans, "Shape"), names::INTERFACE);
        assert_eq!(category_of(&spans, "sides"), names::READONLY_MODIFIER);
        assert_eq!(category_of(&spans, "label"), names::PROPERTY);
        assert_eq!(category_of(&spans, "number"), names::PRIMITIVE_TYPE);
        assert_eq!(category_of(&spans, "Color"), names::ENUM);
        assert_eq!(category_of(&spans, "Green"), names::ENUM_MEMBER);
        assert_eq!(category_of(&spans, "Box"), names::CLASS);
        assert_eq!(category_of(&spans, "T"), names::TYPE_PARAMETER);
        assert_eq!(category_of(&spans, "count"), names::STATIC_MEMBER);
        assert_eq!(category_of(&spans, "constructor"), names::KEYWORD);
        assert_eq!(category_of(&spans, "inner"), names::PARAMETER);
        assert_eq!(category_of(&spans, "area"), names::FUNCTION);
        assert_eq!(category_of(&spans, "shape"), names::PARAMETER);
        let red_access = spans
            .iter()
            .filter(|span| span.text == "Red")
            .last()
            .expect("Color.Red");
        assert_eq!(red_access.category, names::ENUM_MEMBER);
    }

    #[test]
    fn expressions_and_literals() {
        let spans = classify(
            "import { Emitter } from 'events';\n\
             const LIMIT = 10;\n\
             let count = 0x1F;\n\
             const re = /a+b/g;\n\
             const msg = `n=${count}`;\n\
             if (count > LIMIT) { throw new RangeError(\"too many\"); }\n\
             console.log(Math.max(count, null));",
        );
        assert_eq!(category_of(&spans, "Emitter"), names::IMPORT_BINDING);
        assert_eq!(category_of(&spans, "'events'"), names::MODULE_SPECIFIER);
        assert_eq!(category_of(&spans, "LIMIT"), names::CONSTANT);
        assert_eq!(category_of(&spans, "count"), names::VARIABLE);
        assert_eq!(category_of(&spans, "0x1F"), names::NUMBER);
        assert_eq!(category_of(&spans, "/a+b/g"), names::REGEX_LITERAL);
        assert_eq!(category_of(&spans, "`n="), names::TEMPLATE_LITERAL);
        assert_eq!(category_of(&spans, "${"), names::TEMPLATE_SUBSTITUTION);
        assert_eq!(category_of(&spans, ">"), names::OPERATOR);
        assert_eq!(category_of(&spans, "RangeError"), names::ERROR_CONSTRUCTOR);
        assert_eq!(category_of(&spans, "\"too many\""), names::STRING);
        assert_eq!(category_of(&spans, "console"), names::BUILTIN);
        assert_eq!(category_of(&spans, "max"), names::BUILTIN);
        assert_eq!(category_of(&spans, "null"), names::LANGUAGE_CONSTANT);
        assert_eq!(category_of(&spans, ";"), names::PUNCTUATION);
    }

    #[test]
    fn comments_and_decorators() {
        let spans = classify(
            "/** docs */\n// TODO: soon\n// plain\n@sealed\nclass A { @log run(): void {} }",
        );
        assert_eq!(category_of(&spans, "/** docs */"), names::DOC_COMMENT);
        assert_eq!(category_of(&spans, "// TODO: soon"), names::TASK_COMMENT);
        assert_eq!(category_of(&spans, "// plain"), names::COMMENT);
        assert_eq!(category_of(&spans, "@"), names::DECORATOR);
        assert_eq!(category_of(&spans, "sealed"), names::DECORATOR);
        assert_eq!(category_of(&spans, "log"), names::DECORATOR);
        assert_eq!(category_of(&spans, "run"), names::FUNCTION);
    }

    #[test]
    fn spans_are_ordered_by_line_then_column() {
        let spans = classify("let a = 1; // one\nlet b = `x\ny`;");
        let positions: Vec<_> = spans
            .iter()
            .map(|span| (span.line, span.columns.start))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(spans.iter().any(|span| span.line == 3 && span.text == "y`"));
    }

    #[test]
    fn catalog_patterns_outrank_builtin_rules() {
        let mut custom = CategoryOverride::new("hook");
        custom.color = Some("#00FF00".into());
        custom.pattern = Some("use[A-Z]\\w*".into());
        let catalog = Catalog::builtin()
            .with_overrides(&CatalogOverride {
                palette: Default::default(),
                categories: vec![custom],
            })
            .expect("override");
        let spans = scan(&catalog, "const state = useState(0);").expect("scan");
        assert_eq!(category_of(&spans, "useState"), "hook");
    }

    #[test]
    fn equal_specificity_across_categories_is_ambiguous() {
        let mut first = CategoryOverride::new("alpha");
        first.color = Some("#111111".into());
        first.pattern = Some("zed".into());
        let mut second = CategoryOverride::new("beta");
        second.color = Some("#222222".into());
        second.pattern = Some("z.d".into());
        let catalog = Catalog::empty()
            .with_overrides(&CatalogOverride {
                palette: Default::default(),
                categories: vec![first, second],
            })
            .expect("override");
        let err = scan(&catalog, "a;\n  zed").unwrap_err();
        assert_eq!(
            err,
            ScanError::AmbiguousClassification {
                line: 2,
                column: 3,
                text: "zed".into(),
                candidates: vec!["alpha".into(), "beta".into()],
            }
        );
    }

    #[test]
    fn unclaimed_tokens_produce_no_spans() {
        assert!(scan(&Catalog::empty(), "const x = 1;")
            .expect("scan")
            .is_empty());
    }

    #[test]
    fn division_and_regex_contexts_scan_cleanly() {
        let spans = classify("let i = 4;\nconst half = i++ / 2;\n");
        assert_eq!(category_of(&spans, "/"), names::OPERATOR);

        let spans = classify("if (a) { b(); }\n/'/.test(c);\n");
        assert_eq!(category_of(&spans, "/'/"), names::REGEX_LITERAL);
    }

    #[test]
    fn crlf_continuation_keeps_the_string_whole() {
        let spans = classify("const s = \"a\\\r\nb\";\r\nlet t = 1;\r\n");
        let string: Vec<_> = spans
            .iter()
            .filter(|span| span.category == names::STRING)
            .map(|span| (span.line, span.text.as_str()))
            .collect();
        assert_eq!(string, vec![(1, "\"a\\"), (2, "b\"")]);
        let t = spans.iter().find(|span| span.text == "t").expect("t");
        assert_eq!(t.line, 3);
    }
}

