use std::ops::Range;

use themecheck_catalog::names;

use crate::error::ScanError;
use crate::words::{COMPOUND_PUNCTUATORS, CONTROL, REGEX_PRECEDING};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    /// A template chunk: the text between a backtick or `}` and the next `${` or backtick.
    Template,
    SubstitutionStart,
    SubstitutionEnd,
    Regex,
    LineComment,
    BlockComment,
    Punct,
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A lexical token. `range` is a byte range into the scanned text and `line` is the 1-based
/// line the token starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
    pub line: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range.clone()]
    }
}

/// Splits TypeScript/JavaScript source into tokens, keeping comments.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScanError> {
    Lexer::new(source).run()
}

struct TemplateFrame {
    /// Unclosed `{` inside the current substitution.
    depth: usize,
    /// Line of the opening backtick.
    line: usize,
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    templates: Vec<TemplateFrame>,
    /// One entry per open bracket: whether a regex may follow its closer.
    brackets: Vec<bool>,
    regex_after_close: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            templates: Vec::new(),
            brackets: Vec::new(),
            regex_after_close: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ScanError> {
        while let Some(byte) = self.peek(0) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment()?,
                b'/' if self.regex_allowed() => self.regex()?,
                b'\'' | b'"' => self.string(byte)?,
                b'`' => {
                    let start = self.pos;
                    self.templates.push(TemplateFrame {
                        depth: 0,
                        line: self.line,
                    });
                    self.pos += 1;
                    self.template_chunk(start, self.line)?;
                }
                b'0'..=b'9' => self.number(),
                b'.' if self.peek(1).is_some_and(|next| next.is_ascii_digit()) => self.number(),
                _ if is_identifier_start(byte) => self.identifier(),
                b'{' => {
                    if let Some(frame) = self.templates.last_mut() {
                        frame.depth += 1;
                    }
                    let block = self.opens_block();
                    self.brackets.push(block);
                    self.punct(1);
                }
                b'}' if self.templates.last().is_some_and(|frame| frame.depth == 0) => {
                    let start = self.pos;
                    let line = self.line;
                    self.pos += 1;
                    self.push(TokenKind::SubstitutionEnd, start, line);
                    self.template_chunk(self.pos, self.line)?;
                }
                b'}' => {
                    if let Some(frame) = self.templates.last_mut() {
                        frame.depth -= 1;
                    }
                    self.close_bracket();
                }
                b'(' => {
                    let condition = self.last_significant().is_some_and(|token| {
                        token.kind == TokenKind::Identifier
                            && CONTROL.contains(token.text(self.source))
                    });
                    self.brackets.push(condition);
                    self.punct(1);
                }
                b'[' => {
                    self.brackets.push(false);
                    self.punct(1);
                }
                b')' | b']' => self.close_bracket(),
                _ => {
                    let rest = &self.source[self.pos..];
                    let width = COMPOUND_PUNCTUATORS
                        .iter()
                        .find(|candidate| rest.starts_with(*candidate))
                        .map_or(1, |candidate| candidate.len());
                    self.punct(width);
                }
            }
        }

        if let Some(frame) = self.templates.first() {
            return Err(ScanError::UnterminatedLiteral {
                line: frame.line,
                category: names::TEMPLATE_LITERAL,
            });
        }
        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            range: start..self.pos,
            line,
        });
    }

    fn punct(&mut self, width: usize) {
        let start = self.pos;
        self.pos += width;
        self.push(TokenKind::Punct, start, self.line);
    }

    fn close_bracket(&mut self) {
        self.regex_after_close = self.brackets.pop().unwrap_or(false);
        self.punct(1);
    }

    /// Whether a `{` here opens a statement block rather than an object literal or type.
    fn opens_block(&self) -> bool {
        let Some(previous) = self.last_significant() else {
            return true;
        };
        let text = previous.text(self.source);
        match previous.kind {
            TokenKind::Punct => matches!(text, ")" | "=>" | ";" | "{" | "}"),
            TokenKind::Identifier => {
                !REGEX_PRECEDING.contains(text) || matches!(text, "do" | "else")
            }
            _ => false,
        }
    }

    fn last_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|token| !token.kind.is_comment())
    }

    fn regex_allowed(&self) -> bool {
        let Some(previous) = self.last_significant() else {
            return true;
        };
        let text = previous.text(self.source);
        match previous.kind {
            TokenKind::Punct => match text {
                ")" | "}" => self.regex_after_close,
                "]" | "++" | "--" => false,
                _ => true,
            },
            TokenKind::SubstitutionStart => true,
            TokenKind::Identifier => REGEX_PRECEDING.contains(text),
            _ => false,
        }
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        while let Some(byte) = self.peek(0) {
            if byte == b'\n' {
                break;
            }
            self.pos += 1;
        }
        self.push(TokenKind::LineComment, start, self.line);
    }

    fn block_comment(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        let line = self.line;
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => {
                    return Err(ScanError::UnterminatedLiteral {
                        line,
                        category: names::COMMENT,
                    })
                }
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    break;
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.push(TokenKind::BlockComment, start, line);
        Ok(())
    }

    fn string(&mut self, quote: u8) -> Result<(), ScanError> {
        let start = self.pos;
        let line = self.line;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') => {
                    return Err(ScanError::UnterminatedLiteral {
                        line,
                        category: names::STRING,
                    })
                }
                Some(b'\\') => self.escape(),
                Some(byte) if byte == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
        self.push(TokenKind::String, start, line);
        Ok(())
    }

    /// Reads template text from `start` up to the closing backtick or the next `${`.
    fn template_chunk(&mut self, start: usize, line: usize) -> Result<(), ScanError> {
        loop {
            match self.peek(0) {
                None => {
                    let line = self.templates.last().map_or(line, |frame| frame.line);
                    return Err(ScanError::UnterminatedLiteral {
                        line,
                        category: names::TEMPLATE_LITERAL,
                    });
                }
                Some(b'\\') => self.escape(),
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(b'`') => {
                    self.pos += 1;
                    self.templates.pop();
                    self.push(TokenKind::Template, start, line);
                    return Ok(());
                }
                Some(b'$') if self.peek(1) == Some(b'{') => {
                    if self.pos > start {
                        self.push(TokenKind::Template, start, line);
                    }
                    let open = self.pos;
                    self.pos += 2;
                    self.push(TokenKind::SubstitutionStart, open, self.line);
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Skips a backslash and the character it escapes. A line continuation (`\` before
    /// LF or CRLF) advances the line count.
    fn escape(&mut self) {
        self.pos += 1;
        match (self.peek(0), self.peek(1)) {
            (Some(b'\r'), Some(b'\n')) => {
                self.pos += 2;
                self.line += 1;
            }
            (Some(b'\n'), _) => {
                self.pos += 1;
                self.line += 1;
            }
            (Some(_), _) => self.pos += 1,
            (None, _) => {}
        }
    }

    fn regex(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        let line = self.line;
        let mut in_class = false;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') => {
                    return Err(ScanError::UnterminatedLiteral {
                        line,
                        category: names::REGEX_LITERAL,
                    })
                }
                Some(b'\\') => {
                    if matches!(self.peek(1), Some(b'\n' | b'\r')) {
                        return Err(ScanError::UnterminatedLiteral {
                            line,
                            category: names::REGEX_LITERAL,
                        });
                    }
                    self.pos += 2;
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        while self.peek(0).is_some_and(|flag| flag.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        self.pos = self.pos.min(self.bytes.len());
        self.push(TokenKind::Regex, start, line);
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        let radix_prefix = self.peek(0) == Some(b'0')
            && matches!(
                self.peek(1),
                Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O')
            );
        if radix_prefix {
            self.pos += 2;
            while self
                .peek(0)
                .is_some_and(|byte| byte.is_ascii_hexdigit() || byte == b'_')
            {
                self.pos += 1;
            }
        } else {
            self.digits();
            if self.peek(0) == Some(b'.') {
                self.pos += 1;
                self.digits();
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
                if self.peek(1 + sign).is_some_and(|byte| byte.is_ascii_digit()) {
                    self.pos += 1 + sign;
                    self.digits();
                }
            }
        }
        if self.peek(0) == Some(b'n') {
            self.pos += 1;
        }
        self.push(TokenKind::Number, start, self.line);
    }

    fn digits(&mut self) {
        while self
            .peek(0)
            .is_some_and(|byte| byte.is_ascii_digit() || byte == b'_')
        {
            self.pos += 1;
        }
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while self.peek(0).is_some_and(is_identifier_continue) {
            self.pos += 1;
        }
        self.push(TokenKind::Identifier, start, self.line);
    }
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_identifier_continue(byte: u8) -> bool {
    is_identifier_start(byte) || byte.is_ascii_digit()
}
