//! Classification rules. Each rule pairs a catalog category with a structural matcher and a
//! specificity; the most specific matching rule decides a token's category.

use once_cell::sync::Lazy;
use regex::Regex;
use themecheck_catalog::{names, Catalog, CategoryPattern};

use crate::lexer::{Token, TokenKind};
use crate::structure::{DeclKind, Structure};
use crate::words::{self, BUILTINS, CONTEXTUAL, LITERALS, OPERATORS, PRIMITIVES};

static TASK_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//\s*(?:TODO|FIXME|NOTE|HACK|XXX)\b").expect("task comment regex")
});

const TYPE_POSITION_PREFIXES: &[&str] = &[
    ":", "extends", "implements", "|", "&", "as", "satisfies", "keyof",
];

const PRIMITIVE_PREFIXES: &[&str] = &[":", "<", ",", "|", "&", "extends", "=>", "keyof"];

const MEMBER_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "readonly", "static", "declare", "abstract", "override",
];

const PARAMETER_PREFIXES: &[&str] = &[
    "(", ",", "...", "private", "public", "protected", "readonly", "override",
];

const DECLARATION_KEYWORDS: &[(&[&str], DeclKind)] = &[
    (&["class"], DeclKind::Class),
    (&["interface"], DeclKind::Interface),
    (&["type"], DeclKind::TypeAlias),
    (&["enum"], DeclKind::Enum),
    (&["namespace", "module"], DeclKind::Namespace),
];

const PARAMETER_SUFFIXES: &[&str] = &[":", ",", ")", "=", "?"];

/// A structural predicate over one token.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    /// Any token of the given lexical kind.
    Kind(TokenKind),
    ReservedWord,
    /// `type`, `from`, `readonly`, ... when they act as keywords.
    ContextualKeyword,
    /// Operator punctuation that is not a generic angle bracket.
    Operator,
    DocComment,
    /// Line comments that start with a task tag such as `TODO` or `FIXME`.
    TaskComment,
    LanguageConstant,
    /// A name after `.` or `?.` that is not called.
    MemberAccess,
    /// A capitalized name where a type is expected.
    TypePosition,
    NewTarget,
    Call,
    /// The string after `from` or `import`.
    ModuleSpecifier,
    ScreamingCase,
    Builtin,
    /// A member of a builtin object, as in `Math.floor`.
    BuiltinMember,
    PropertyKey,
    /// A name introduced by one of the keywords.
    DeclaredBy(&'static [&'static str]),
    PrimitiveType,
    /// Any reference to a name declared with the given kind.
    DeclaredName(DeclKind),
    ScreamingDeclaredBy(&'static str),
    ParameterBinding,
    EnumBodyMember,
    TypeParameter,
    /// `Enum.Member`.
    EnumAccess,
    NewError,
    /// `@` and the identifier touching it.
    Decorator,
    ImportBinding,
    /// A class or interface member name after the modifier.
    MemberAfter(&'static str),
    /// A catalog-supplied pattern over the token text.
    Pattern(CategoryPattern),
}

/// The token being classified. `code` is its index among code tokens; comments have none.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site<'t> {
    pub(crate) token: &'t Token,
    pub(crate) text: &'t str,
    pub(crate) code: Option<usize>,
}

impl Matcher {
    pub(crate) fn matches(&self, structure: &Structure<'_>, site: Site<'_>) -> bool {
        let token = site.token;
        let text = site.text;
        match self {
            Matcher::Kind(kind) => token.kind == *kind,
            Matcher::DocComment => {
                token.kind == TokenKind::BlockComment && text.starts_with("/**") && text != "/**/"
            }
            Matcher::TaskComment => {
                token.kind == TokenKind::LineComment && TASK_COMMENT.is_match(text)
            }
            Matcher::Pattern(pattern) => pattern.is_match(text),
            Matcher::ReservedWord => {
                token.kind == TokenKind::Identifier && words::is_reserved(text)
            }
            Matcher::LanguageConstant => {
                token.kind == TokenKind::Identifier && LITERALS.contains(text)
            }
            _ => match site.code {
                Some(index) => self.matches_code(structure, index),
                None => false,
            },
        }
    }

    fn matches_code(&self, s: &Structure<'_>, i: usize) -> bool {
        let text = s.text(i);
        let prev = s.prev_text(i);
        let next = s.next_text(i);
        let after_dot = matches!(prev, Some("." | "?."));
        match self {
            Matcher::ContextualKeyword => {
                if s.kind(i) != TokenKind::Identifier || !CONTEXTUAL.contains(text) || after_dot {
                    return false;
                }
                if text == "constructor" {
                    return next == Some("(");
                }
                s.next(i).is_some_and(|n| {
                    matches!(s.kind(n), TokenKind::Identifier | TokenKind::String)
                        || s.is_punct(n, "{")
                        || s.is_punct(n, "*")
                })
            }
            Matcher::Operator => {
                s.kind(i) == TokenKind::Punct && OPERATORS.contains(text) && !s.is_angle(i)
            }
            Matcher::MemberAccess => {
                s.kind(i) == TokenKind::Identifier && after_dot && !is_called(s, i)
            }
            Matcher::TypePosition => {
                s.is_name(i)
                    && words::starts_uppercase(text)
                    && s.prev(i).is_some_and(|p| {
                        TYPE_POSITION_PREFIXES.contains(&s.text(p))
                            || (s.is_angle(p) && s.is_punct(p, "<"))
                    })
            }
            Matcher::NewTarget => s.is_name(i) && prev == Some("new"),
            Matcher::Call => s.is_name(i) && text != "constructor" && is_called(s, i),
            Matcher::ModuleSpecifier => {
                s.kind(i) == TokenKind::String && matches!(prev, Some("from" | "import"))
            }
            Matcher::ScreamingCase => s.is_name(i) && words::is_screaming_case(text),
            Matcher::Builtin => {
                s.kind(i) == TokenKind::Identifier && BUILTINS.contains(text) && !after_dot
            }
            Matcher::BuiltinMember => {
                s.kind(i) == TokenKind::Identifier
                    && after_dot
                    && s.prev(i)
                        .and_then(|dot| s.prev(dot))
                        .is_some_and(|object| {
                            s.kind(object) == TokenKind::Identifier
                                && BUILTINS.contains(s.text(object))
                        })
            }
            Matcher::PropertyKey => {
                let in_braces = s.enclosing(i).is_some_and(|open| s.is_punct(open, "{"));
                let leads_member = matches!(prev, Some("{" | "," | ";" | "}"))
                    || prev.is_some_and(|p| MEMBER_MODIFIERS.contains(&p));
                let typed = next == Some(":")
                    || (next == Some("?") && s.next(i + 1).is_some_and(|n| s.is_punct(n, ":")));
                s.is_name(i) && in_braces && leads_member && typed
            }
            Matcher::DeclaredBy(keywords) => {
                s.is_name(i) && prev.is_some_and(|p| keywords.contains(&p))
            }
            Matcher::PrimitiveType => {
                s.kind(i) == TokenKind::Identifier
                    && PRIMITIVES.contains(text)
                    && prev.is_some_and(|p| PRIMITIVE_PREFIXES.contains(&p))
            }
            Matcher::DeclaredName(kind) => {
                s.is_name(i) && !after_dot && s.declared(text) == Some(*kind)
            }
            Matcher::ScreamingDeclaredBy(keyword) => {
                s.is_name(i) && words::is_screaming_case(text) && prev == Some(*keyword)
            }
            Matcher::ParameterBinding => {
                if !s.is_name(i) {
                    return false;
                }
                if next == Some("=>") && prev != Some(")") {
                    return true;
                }
                s.enclosing(i).is_some_and(|open| s.is_param_list(open))
                    && prev.is_some_and(|p| PARAMETER_PREFIXES.contains(&p))
                    && next.is_some_and(|n| PARAMETER_SUFFIXES.contains(&n))
            }
            Matcher::EnumBodyMember => s.is_enum_member(i),
            Matcher::TypeParameter => s.is_name(i) && !after_dot && s.is_type_parameter(text),
            Matcher::EnumAccess => {
                s.kind(i) == TokenKind::Identifier
                    && after_dot
                    && s.prev(i)
                        .and_then(|dot| s.prev(dot))
                        .is_some_and(|object| s.declared(s.text(object)) == Some(DeclKind::Enum))
            }
            Matcher::NewError => s.is_name(i) && prev == Some("new") && text.ends_with("Error"),
            Matcher::Decorator => {
                if s.is_punct(i, "@") {
                    s.next(i).is_some_and(|n| {
                        s.kind(n) == TokenKind::Identifier && s.adjacent(i, n)
                    })
                } else {
                    s.kind(i) == TokenKind::Identifier
                        && s.prev(i).is_some_and(|p| s.is_punct(p, "@") && s.adjacent(p, i))
                }
            }
            Matcher::ImportBinding => s.is_import_binding(i),
            Matcher::MemberAfter(modifier) => {
                s.is_name(i)
                    && !CONTEXTUAL.contains(text)
                    && prev == Some(*modifier)
                    && s.enclosing(i).is_some_and(|open| s.is_punct(open, "{"))
            }
            Matcher::Kind(_)
            | Matcher::DocComment
            | Matcher::TaskComment
            | Matcher::Pattern(_)
            | Matcher::ReservedWord
            | Matcher::LanguageConstant => false,
        }
    }
}

/// Followed by `(`, directly or after a generic argument list.
fn is_called(s: &Structure<'_>, i: usize) -> bool {
    let Some(next) = s.next(i) else {
        return false;
    };
    if s.is_punct(next, "(") {
        return true;
    }
    s.angle_close(next)
        .and_then(|close| s.next(close))
        .is_some_and(|after| s.is_punct(after, "("))
}

#[derive(Debug, Clone)]
pub(crate) struct Rule {
    pub(crate) category: String,
    pub(crate) specificity: u16,
    pub(crate) matcher: Matcher,
}

impl Rule {
    fn new(category: &str, specificity: u16, matcher: Matcher) -> Self {
        Self {
            category: category.to_string(),
            specificity,
            matcher,
        }
    }
}

/// The built-in rule table. Rules for categories the catalog does not define are dropped, and
/// every catalog pattern becomes a rule of its own.
pub(crate) fn rules_for(catalog: &Catalog) -> Vec<Rule> {
    let mut rules: Vec<Rule> = builtin_rules()
        .into_iter()
        .filter(|rule| catalog.contains(&rule.category))
        .collect();
    for category in catalog.all() {
        if let Some(pattern) = category.pattern() {
            rules.push(Rule::new(
                category.name(),
                pattern.specificity(),
                Matcher::Pattern(pattern.clone()),
            ));
        }
    }
    rules
}

fn builtin_rules() -> Vec<Rule> {
    use Matcher::*;

    let mut rules = vec![
        Rule::new(names::PUNCTUATION, 10, Kind(TokenKind::Punct)),
        Rule::new(names::IDENTIFIER, 11, Kind(TokenKind::Identifier)),
        Rule::new(names::NUMBER, 12, Kind(TokenKind::Number)),
        Rule::new(names::STRING, 13, Kind(TokenKind::String)),
        Rule::new(names::TEMPLATE_LITERAL, 14, Kind(TokenKind::Template)),
        Rule::new(names::TEMPLATE_SUBSTITUTION, 15, Kind(TokenKind::SubstitutionStart)),
        Rule::new(names::TEMPLATE_SUBSTITUTION, 15, Kind(TokenKind::SubstitutionEnd)),
        Rule::new(names::REGEX_LITERAL, 16, Kind(TokenKind::Regex)),
        Rule::new(names::COMMENT, 17, Kind(TokenKind::LineComment)),
        Rule::new(names::COMMENT, 17, Kind(TokenKind::BlockComment)),
        Rule::new(names::KEYWORD, 20, ReservedWord),
        Rule::new(names::KEYWORD, 21, ContextualKeyword),
        Rule::new(names::OPERATOR, 22, Operator),
        Rule::new(names::DOC_COMMENT, 23, DocComment),
        Rule::new(names::TASK_COMMENT, 24, TaskComment),
        Rule::new(names::LANGUAGE_CONSTANT, 25, LanguageConstant),
        Rule::new(names::PROPERTY, 26, MemberAccess),
        Rule::new(names::TYPE_REFERENCE, 28, TypePosition),
        Rule::new(names::TYPE_REFERENCE, 29, NewTarget),
        Rule::new(names::FUNCTION, 30, Call),
        Rule::new(names::MODULE_SPECIFIER, 32, ModuleSpecifier),
        Rule::new(names::CONSTANT, 33, ScreamingCase),
        Rule::new(names::BUILTIN, 35, Builtin),
        Rule::new(names::BUILTIN, 36, BuiltinMember),
        Rule::new(names::PROPERTY, 40, PropertyKey),
        Rule::new(names::VARIABLE, 42, DeclaredBy(&["let", "const", "var"])),
        Rule::new(names::PRIMITIVE_TYPE, 45, PrimitiveType),
        Rule::new(names::CONSTANT, 48, ScreamingDeclaredBy("const")),
        Rule::new(names::FUNCTION, 52, DeclaredBy(&["function"])),
        Rule::new(names::PARAMETER, 55, ParameterBinding),
        Rule::new(names::ENUM_MEMBER, 60, EnumBodyMember),
        Rule::new(names::TYPE_PARAMETER, 61, TypeParameter),
        Rule::new(names::ENUM_MEMBER, 62, EnumAccess),
        Rule::new(names::ERROR_CONSTRUCTOR, 64, NewError),
        Rule::new(names::DECORATOR, 65, Decorator),
        Rule::new(names::IMPORT_BINDING, 66, ImportBinding),
        Rule::new(names::STATIC_MEMBER, 69, MemberAfter("static")),
        Rule::new(names::READONLY_MODIFIER, 70, MemberAfter("readonly")),
    ];

    // Each declaration kind is mutually exclusive with the others, so they share a rank.
    for (keywords, kind) in DECLARATION_KEYWORDS {
        rules.push(Rule::new(kind.category(), 47, DeclaredName(*kind)));
        rules.push(Rule::new(kind.category(), 50, DeclaredBy(*keywords)));
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_cover_every_builtin_category() {
        let catalog = Catalog::builtin();
        let rules = rules_for(&catalog);
        for name in catalog.names() {
            assert!(
                rules.iter().any(|rule| rule.category == name),
                "no rule for {name}"
            );
        }
    }

    #[test]
    fn rules_outside_the_catalog_are_dropped() {
        let rules = rules_for(&Catalog::empty());
        assert!(rules.is_empty());
    }

    #[test]
    fn distinct_categories_never_share_a_rank_unless_exclusive() {
        let rules = builtin_rules();
        for a in &rules {
            for b in &rules {
                if a.specificity == b.specificity && a.category != b.category {
                    assert!(
                        matches!(
                            (&a.matcher, &b.matcher),
                            (Matcher::DeclaredName(_), Matcher::DeclaredName(_))
                                | (Matcher::DeclaredBy(_), Matcher::DeclaredBy(_))
                        ),
                        "{} and {} share rank {}",
                        a.category,
                        b.category,
                        a.specificity
                    );
                }
            }
        }
    }

    #[test]
    fn task_comment_tags() {
        assert!(TASK_COMMENT.is_match("// TODO: later"));
        assert!(TASK_COMMENT.is_match("//FIXME"));
        assert!(!TASK_COMMENT.is_match("// TODOS are fine"));
        assert!(!TASK_COMMENT.is_match("// plain"));
    }
}
