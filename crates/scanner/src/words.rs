//! Word and symbol tables for TypeScript/JavaScript fixtures.

use std::collections::HashSet;

use once_cell::sync::Lazy;

fn set(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

pub(crate) static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
        "delete", "do", "else", "enum", "export", "extends", "finally", "for", "function", "if",
        "implements", "import", "in", "instanceof", "interface", "let", "new", "package",
        "private", "protected", "public", "return", "static", "super", "switch", "this", "throw",
        "try", "typeof", "var", "void", "while", "with", "yield",
    ])
});

/// Words that are keywords only in certain positions.
pub(crate) static CONTEXTUAL: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "abstract",
        "as",
        "async",
        "asserts",
        "constructor",
        "declare",
        "from",
        "get",
        "global",
        "infer",
        "is",
        "keyof",
        "module",
        "namespace",
        "of",
        "override",
        "readonly",
        "satisfies",
        "set",
        "type",
        "unique",
    ])
});

pub(crate) static LITERALS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| set(&["true", "false", "null", "undefined", "NaN", "Infinity"]));

pub(crate) static PRIMITIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "unknown",
        "void",
    ])
});

pub(crate) static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "Array",
        "BigInt",
        "Boolean",
        "Date",
        "Error",
        "Function",
        "Intl",
        "JSON",
        "Map",
        "Math",
        "Number",
        "Object",
        "Promise",
        "Proxy",
        "RangeError",
        "Reflect",
        "RegExp",
        "Set",
        "String",
        "Symbol",
        "TypeError",
        "WeakMap",
        "WeakSet",
        "clearInterval",
        "clearTimeout",
        "console",
        "decodeURIComponent",
        "document",
        "encodeURIComponent",
        "fetch",
        "globalThis",
        "isFinite",
        "isNaN",
        "parseFloat",
        "parseInt",
        "setInterval",
        "setTimeout",
        "structuredClone",
        "window",
    ])
});

/// Keywords after which a `/` starts a regular expression rather than a division.
pub(crate) static REGEX_PRECEDING: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "return",
        "typeof",
        "instanceof",
        "in",
        "of",
        "new",
        "delete",
        "void",
        "throw",
        "case",
        "do",
        "else",
        "yield",
        "await",
    ])
});

/// Keywords whose parenthesised head is never a parameter list.
pub(crate) static CONTROL: Lazy<HashSet<&'static str>> =
    Lazy::new(|| set(&["if", "while", "for", "switch", "with"]));

/// Multi-character punctuators, longest first.
pub(crate) const COMPOUND_PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

pub(crate) static OPERATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut operators = set(COMPOUND_PUNCTUATORS);
    operators.remove("...");
    operators.extend([
        "=", "+", "-", "*", "/", "%", "<", ">", "&", "|", "^", "~", "!", "?", "...",
    ]);
    operators
});

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(word)
}

/// `MAX_SIZE`, `PI`, `API`: two or more characters, upper-case letters, digits and underscores.
pub(crate) fn is_screaming_case(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && word.len() >= 2
        && chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
}

pub(crate) fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(|ch| ch.is_uppercase())
}
