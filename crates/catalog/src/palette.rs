use std::collections::BTreeMap;
use std::fmt;

use crate::color::Rgb;
use crate::error::CatalogError;

/// Named color tokens a catalog can refer to instead of raw hex values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    name: String,
    colors: BTreeMap<String, Rgb>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: BTreeMap::new(),
        }
    }

    /// The palette the bundled TypeScript fixture is annotated against.
    pub fn akari_night() -> Self {
        let mut palette = Self::new("akari-night");
        for (token, r, g, b) in [
            ("foreground", 0xE6, 0xDE, 0xD3),
            ("comment", 0x7A, 0x7A, 0x75),
            ("lantern", 0xE2, 0x6A, 0x3B),
            ("red", 0xC8, 0x4C, 0x32),
            ("cyan", 0x6F, 0x8F, 0x8A),
            ("bright_red", 0xD6, 0x5A, 0x3A),
            ("bright_green", 0x8F, 0xC5, 0x7A),
            ("bright_yellow", 0xF0, 0x8A, 0x5D),
            ("bright_blue", 0x6F, 0x87, 0x9A),
            ("bright_magenta", 0x9A, 0x8F, 0xB3),
            ("bright_cyan", 0x8F, 0xB8, 0xB0),
        ] {
            palette.insert(token, Rgb::new(r, g, b));
        }
        palette
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, token: &str) -> Option<Rgb> {
        self.colors.get(token).copied()
    }

    pub fn insert(&mut self, token: impl Into<String>, color: Rgb) {
        self.colors.insert(token.into(), color);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> + '_ {
        self.colors
            .iter()
            .map(|(token, color)| (token.as_str(), *color))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Resolves a reference to a concrete color. On failure the missing token is returned.
    pub fn resolve(&self, reference: &ColorRef) -> Result<Rgb, String> {
        match reference {
            ColorRef::Hex(color) => Ok(*color),
            ColorRef::Token(token) => self.get(token).ok_or_else(|| token.clone()),
            ColorRef::Lighten(base, factor) => Ok(self.resolve(base)?.lighten(*factor)),
            ColorRef::Darken(base, factor) => Ok(self.resolve(base)?.darken(*factor)),
            ColorRef::Mix(base, other, factor) => {
                let base = self.resolve(base)?;
                let other = self.resolve(other)?;
                Ok(base.mix(other, *factor))
            }
        }
    }
}

/// An expected color: a hex literal, a palette token, or a blend of either.
///
/// Textual forms: `#E26A3B`, `lantern`, `lighten(lantern, 0.2)`,
/// `darken(#112233, 0.5)`, `mix(cyan, bright_blue, 0.5)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorRef {
    Hex(Rgb),
    Token(String),
    Lighten(Box<ColorRef>, f64),
    Darken(Box<ColorRef>, f64),
    Mix(Box<ColorRef>, Box<ColorRef>, f64),
}

impl ColorRef {
    pub fn token(name: impl Into<String>) -> Self {
        Self::Token(name.into())
    }

    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let trimmed = input.trim();
        let invalid = || CatalogError::InvalidColorExpr(input.to_string());

        if trimmed.starts_with('#') {
            return Rgb::parse(trimmed)
                .map(ColorRef::Hex)
                .map_err(|reason| CatalogError::InvalidColor {
                    value: trimmed.to_string(),
                    reason,
                });
        }

        if let Some(open) = trimmed.find('(') {
            let function = trimmed[..open].trim();
            let inner = trimmed[open + 1..]
                .strip_suffix(')')
                .ok_or_else(invalid)?;
            let args = split_arguments(inner).ok_or_else(invalid)?;
            return match (function, args.as_slice()) {
                ("lighten", [base, factor]) => Ok(ColorRef::Lighten(
                    Box::new(Self::parse(base)?),
                    parse_factor(factor).ok_or_else(invalid)?,
                )),
                ("darken", [base, factor]) => Ok(ColorRef::Darken(
                    Box::new(Self::parse(base)?),
                    parse_factor(factor).ok_or_else(invalid)?,
                )),
                ("mix", [base, other, factor]) => Ok(ColorRef::Mix(
                    Box::new(Self::parse(base)?),
                    Box::new(Self::parse(other)?),
                    parse_factor(factor).ok_or_else(invalid)?,
                )),
                _ => Err(invalid()),
            };
        }

        if is_token_name(trimmed) {
            Ok(ColorRef::Token(trimmed.to_string()))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorRef::Hex(color) => write!(f, "{color}"),
            ColorRef::Token(token) => f.write_str(token),
            ColorRef::Lighten(base, factor) => write!(f, "lighten({base}, {factor})"),
            ColorRef::Darken(base, factor) => write!(f, "darken({base}, {factor})"),
            ColorRef::Mix(base, other, factor) => write!(f, "mix({base}, {other}, {factor})"),
        }
    }
}

fn is_token_name(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}

fn parse_factor(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|factor| factor.is_finite())
}

/// Splits on commas that are not nested inside parentheses.
fn split_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                args.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    args.push(inner[start..].trim());
    if args.iter().any(|arg| arg.is_empty()) {
        return None;
    }
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_forms() {
        assert_eq!(
            ColorRef::parse("#6F8F8A").unwrap(),
            ColorRef::Hex(Rgb::new(0x6F, 0x8F, 0x8A))
        );
        assert_eq!(
            ColorRef::parse(" bright_red ").unwrap(),
            ColorRef::token("bright_red")
        );
    }

    #[test]
    fn parses_nested_blend_expressions() {
        let parsed = ColorRef::parse("mix(lighten(lantern, 0.2), #000000, 0.5)").unwrap();
        assert_eq!(
            parsed,
            ColorRef::Mix(
                Box::new(ColorRef::Lighten(Box::new(ColorRef::token("lantern")), 0.2)),
                Box::new(ColorRef::Hex(Rgb::new(0, 0, 0))),
                0.5,
            )
        );
        assert_eq!(
            parsed.to_string(),
            "mix(lighten(lantern, 0.2), #000000, 0.5)"
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        for input in [
            "lighten(lantern)",
            "mix(a, b)",
            "blur(lantern, 0.1)",
            "lighten(lantern, x)",
            "lighten(lantern, 0.1",
            "two words",
            "",
        ] {
            assert!(
                matches!(ColorRef::parse(input), Err(CatalogError::InvalidColorExpr(_))),
                "{input} should be rejected"
            );
        }
        assert!(matches!(
            ColorRef::parse("#12345"),
            Err(CatalogError::InvalidColor { .. })
        ));
    }

    #[test]
    fn resolves_tokens_and_blends() {
        let palette = Palette::akari_night();
        let lantern = palette.get("lantern").unwrap();
        assert_eq!(palette.resolve(&ColorRef::token("lantern")), Ok(lantern));
        assert_eq!(
            palette.resolve(&ColorRef::parse("darken(lantern, 1.0)").unwrap()),
            Ok(Rgb::new(0, 0, 0))
        );
        assert_eq!(
            palette.resolve(&ColorRef::parse("mix(lantern, nope, 0.5)").unwrap()),
            Err("nope".to_string())
        );
    }
}
