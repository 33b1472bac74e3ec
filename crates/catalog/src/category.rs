use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::palette::ColorRef;

/// Specificity given to user patterns that do not state one.
pub const DEFAULT_PATTERN_SPECIFICITY: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleModifier {
    Italic,
    Bold,
    Underline,
}

impl StyleModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleModifier::Italic => "italic",
            StyleModifier::Bold => "bold",
            StyleModifier::Underline => "underline",
        }
    }
}

impl fmt::Display for StyleModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user supplied matcher: a regex that must match a token's whole text.
#[derive(Debug, Clone)]
pub struct CategoryPattern {
    source: String,
    regex: Regex,
    specificity: u16,
}

impl CategoryPattern {
    pub fn new(source: &str, specificity: u16) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
            specificity,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn specificity(&self) -> u16 {
        self.specificity
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for CategoryPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.specificity == other.specificity
    }
}

/// A named lexical class and the color a theme is expected to give it.
/// （具名的語法類別及其預期顏色。）
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    description: String,
    color: ColorRef,
    modifiers: BTreeSet<StyleModifier>,
    aliases: Vec<String>,
    pattern: Option<CategoryPattern>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>, color: ColorRef) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color,
            modifiers: BTreeSet::new(),
            aliases: Vec::new(),
            pattern: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = StyleModifier>) -> Self {
        self.modifiers = modifiers.into_iter().collect();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: CategoryPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &ColorRef {
        &self.color
    }

    pub fn modifiers(&self) -> &BTreeSet<StyleModifier> {
        &self.modifiers
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn pattern(&self) -> Option<&CategoryPattern> {
        self.pattern.as_ref()
    }

    pub fn answers_to(&self, label: &str) -> bool {
        let label = label.trim();
        self.name.eq_ignore_ascii_case(label)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(label))
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_color(&mut self, color: ColorRef) {
        self.color = color;
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: BTreeSet<StyleModifier>) {
        self.modifiers = modifiers;
    }

    pub(crate) fn set_aliases(&mut self, aliases: Vec<String>) {
        self.aliases = aliases;
    }

    pub(crate) fn set_pattern(&mut self, pattern: Option<CategoryPattern>) {
        self.pattern = pattern;
    }
}
