//! Structural facts about a token stream that single-token rules cannot see on their own:
//! bracket nesting, parameter lists, declared names, enum bodies, generic angle groups and
//! import clauses.

use std::collections::{HashMap, HashSet};

use themecheck_catalog::names;

use crate::lexer::{Token, TokenKind};
use crate::words::{self, BUILTINS, CONTROL, LITERALS};

const ANGLE_SCAN_LIMIT: usize = 128;

/// The kind of declaration that introduced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DeclKind {
    Class,
    Interface,
    TypeAlias,
    Enum,
    Namespace,
}

impl DeclKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(DeclKind::Class),
            "interface" => Some(DeclKind::Interface),
            "type" => Some(DeclKind::TypeAlias),
            "enum" => Some(DeclKind::Enum),
            "namespace" | "module" => Some(DeclKind::Namespace),
            _ => None,
        }
    }

    pub(crate) fn category(self) -> &'static str {
        match self {
            DeclKind::Class => names::CLASS,
            DeclKind::Interface => names::INTERFACE,
            DeclKind::TypeAlias => names::TYPE_ALIAS,
            DeclKind::Enum => names::ENUM,
            DeclKind::Namespace => names::NAMESPACE,
        }
    }
}

/// Code tokens (comments removed) plus what the pre-pass learned about them.
#[derive(Debug)]
pub(crate) struct Structure<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    enclosing: Vec<Option<usize>>,
    closing: HashMap<usize, usize>,
    opening: HashMap<usize, usize>,
    param_lists: HashSet<usize>,
    declared: HashMap<&'a str, DeclKind>,
    enum_members: HashSet<usize>,
    angles: HashSet<usize>,
    angle_pairs: HashMap<usize, usize>,
    type_parameters: HashSet<&'a str>,
    import_bindings: HashSet<usize>,
}

impl<'a> Structure<'a> {
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        let mut structure = Self {
            source,
            tokens,
            enclosing: Vec::new(),
            closing: HashMap::new(),
            opening: HashMap::new(),
            param_lists: HashSet::new(),
            declared: HashMap::new(),
            enum_members: HashSet::new(),
            angles: HashSet::new(),
            angle_pairs: HashMap::new(),
            type_parameters: HashSet::new(),
            import_bindings: HashSet::new(),
        };
        structure.pair_brackets();
        structure.find_param_lists();
        structure.find_declarations();
        structure.find_angle_groups();
        structure.find_import_bindings();
        structure
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub(crate) fn text(&self, index: usize) -> &'a str {
        self.tokens[index].text(self.source)
    }

    pub(crate) fn kind(&self, index: usize) -> TokenKind {
        self.tokens[index].kind
    }

    pub(crate) fn prev(&self, index: usize) -> Option<usize> {
        index.checked_sub(1)
    }

    pub(crate) fn next(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        (next < self.tokens.len()).then_some(next)
    }

    pub(crate) fn prev_text(&self, index: usize) -> Option<&'a str> {
        self.prev(index).map(|prev| self.text(prev))
    }

    pub(crate) fn next_text(&self, index: usize) -> Option<&'a str> {
        self.next(index).map(|next| self.text(next))
    }

    pub(crate) fn is_punct(&self, index: usize, text: &str) -> bool {
        self.kind(index) == TokenKind::Punct && self.text(index) == text
    }

    /// An identifier usable as a binding: not a reserved word and not a literal keyword.
    pub(crate) fn is_name(&self, index: usize) -> bool {
        if self.kind(index) != TokenKind::Identifier {
            return false;
        }
        let text = self.text(index);
        !words::is_reserved(text) && !LITERALS.contains(text)
    }

    /// True when the two tokens touch with no whitespace between them.
    pub(crate) fn adjacent(&self, left: usize, right: usize) -> bool {
        self.tokens[left].range.end == self.tokens[right].range.start
    }

    /// Innermost open bracket containing the token.
    pub(crate) fn enclosing(&self, index: usize) -> Option<usize> {
        self.enclosing.get(index).copied().flatten()
    }

    pub(crate) fn closing(&self, open: usize) -> Option<usize> {
        self.closing.get(&open).copied()
    }

    pub(crate) fn is_param_list(&self, open: usize) -> bool {
        self.param_lists.contains(&open)
    }

    pub(crate) fn declared(&self, name: &str) -> Option<DeclKind> {
        self.declared.get(name).copied()
    }

    pub(crate) fn is_enum_member(&self, index: usize) -> bool {
        self.enum_members.contains(&index)
    }

    /// `<` or `>` tokens that delimit type arguments or parameters.
    pub(crate) fn is_angle(&self, index: usize) -> bool {
        self.angles.contains(&index)
    }

    pub(crate) fn angle_close(&self, open: usize) -> Option<usize> {
        self.angle_pairs.get(&open).copied()
    }

    pub(crate) fn is_type_parameter(&self, name: &str) -> bool {
        self.type_parameters.contains(name)
    }

    pub(crate) fn is_import_binding(&self, index: usize) -> bool {
        self.import_bindings.contains(&index)
    }

    fn is_opener(&self, index: usize) -> bool {
        match self.kind(index) {
            TokenKind::SubstitutionStart => true,
            TokenKind::Punct => matches!(self.text(index), "(" | "[" | "{"),
            _ => false,
        }
    }

    fn is_closer(&self, index: usize) -> bool {
        match self.kind(index) {
            TokenKind::SubstitutionEnd => true,
            TokenKind::Punct => matches!(self.text(index), ")" | "]" | "}"),
            _ => false,
        }
    }

    fn pair_brackets(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        self.enclosing = Vec::with_capacity(self.tokens.len());
        for index in 0..self.tokens.len() {
            self.enclosing.push(stack.last().copied());
            if self.is_opener(index) {
                stack.push(index);
            } else if self.is_closer(index) {
                if let Some(open) = stack.pop() {
                    self.closing.insert(open, index);
                    self.opening.insert(index, open);
                }
            }
        }
    }

    fn find_param_lists(&mut self) {
        let mut lists = Vec::new();
        for (&open, &close) in &self.closing {
            if !self.is_punct(open, "(") {
                continue;
            }
            let follows_signature = self
                .next_text(close)
                .is_some_and(|next| matches!(next, "{" | "=>" | ":"));
            let after_control = self.prev(open).is_some_and(|prev| {
                self.kind(prev) == TokenKind::Identifier && CONTROL.contains(self.text(prev))
            });
            if follows_signature && !after_control {
                lists.push(open);
            }
        }
        self.param_lists.extend(lists);
    }

    fn find_declarations(&mut self) {
        for index in 0..self.tokens.len() {
            if self.kind(index) != TokenKind::Identifier {
                continue;
            }
            let Some(kind) = DeclKind::from_keyword(self.text(index)) else {
                continue;
            };
            let Some(name) = self.next(index).filter(|&next| self.is_name(next)) else {
                continue;
            };
            let name_text = self.text(name);
            self.declared.insert(name_text, kind);
            if kind == DeclKind::Enum {
                self.collect_enum_members(name);
            }
        }
    }

    fn collect_enum_members(&mut self, name: usize) {
        let Some(open) = self.next(name).filter(|&next| self.is_punct(next, "{")) else {
            return;
        };
        let Some(close) = self.closing(open) else {
            return;
        };
        for index in open + 1..close {
            let direct = self.enclosing(index) == Some(open);
            let leads_entry = self
                .prev_text(index)
                .is_some_and(|prev| matches!(prev, "{" | ","));
            if direct && leads_entry && self.kind(index) == TokenKind::Identifier {
                self.enum_members.insert(index);
            }
        }
    }

    fn find_angle_groups(&mut self) {
        for open in 1..self.tokens.len() {
            if !self.is_punct(open, "<") {
                continue;
            }
            let owner = open - 1;
            if self.kind(owner) != TokenKind::Identifier {
                continue;
            }
            let Some((close, parameters)) = self.scan_angle_group(open) else {
                continue;
            };
            let owner_text = self.text(owner);
            let declares = self
                .prev_text(owner)
                .is_some_and(|prev| matches!(prev, "class" | "interface" | "type" | "function"))
                || (!words::starts_uppercase(owner_text)
                    && self
                        .next(close)
                        .is_some_and(|after| self.is_punct(after, "(") && self.is_param_list(after)));
            let type_arguments = words::starts_uppercase(owner_text)
                || BUILTINS.contains(owner_text)
                || self.next(close).is_some_and(|after| self.is_punct(after, "("));
            if !declares && !type_arguments {
                continue;
            }
            self.angles.insert(open);
            self.angles.insert(close);
            self.angle_pairs.insert(open, close);
            if declares {
                for parameter in parameters {
                    let name = self.text(parameter);
                    self.type_parameters.insert(name);
                }
            }
        }
    }

    /// Finds the `>` that closes the group opened at `open`, plus the names declared at the
    /// group's top level.
    fn scan_angle_group(&self, open: usize) -> Option<(usize, Vec<usize>)> {
        let mut depth: isize = 1;
        let mut parameters = Vec::new();
        let end = (open + ANGLE_SCAN_LIMIT).min(self.tokens.len());
        for index in open + 1..end {
            if self.kind(index) == TokenKind::Punct {
                match self.text(index) {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    ">>" => depth -= 2,
                    ">>>" => depth -= 3,
                    ";" | "&&" | "||" => return None,
                    _ => {}
                }
                if depth <= 0 {
                    return Some((index, parameters));
                }
            }
            if self.is_closer(index) && self.opening.get(&index).is_some_and(|&o| o < open) {
                return None;
            }
            let at_top = depth == 1 && self.enclosing(index) == self.enclosing(open);
            let leads = self
                .prev(index)
                .is_some_and(|prev| prev == open || self.is_punct(prev, ","));
            if at_top && leads && self.is_name(index) {
                parameters.push(index);
            }
        }
        None
    }

    fn find_import_bindings(&mut self) {
        for index in 0..self.tokens.len() {
            if self.kind(index) != TokenKind::Identifier || self.text(index) != "import" {
                continue;
            }
            let mut cursor = index + 1;
            while cursor < self.tokens.len() {
                let text = self.text(cursor);
                match self.kind(cursor) {
                    TokenKind::String => break,
                    TokenKind::Punct if matches!(text, ";" | "=" | "(" | ".") => break,
                    TokenKind::Identifier if text == "from" => break,
                    TokenKind::Identifier if matches!(text, "type" | "typeof" | "as") => {
                        let binding_follows = self
                            .next(cursor)
                            .is_some_and(|next| self.is_name(next) || self.is_punct(next, "{"));
                        if !binding_follows && text != "as" {
                            self.import_bindings.insert(cursor);
                        }
                    }
                    TokenKind::Identifier if self.is_name(cursor) => {
                        self.import_bindings.insert(cursor);
                    }
                    _ => {}
                }
                cursor += 1;
            }
        }
    }
}
