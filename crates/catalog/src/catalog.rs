use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::category::{Category, CategoryPattern, StyleModifier, DEFAULT_PATTERN_SPECIFICITY};
use crate::color::Rgb;
use crate::error::CatalogError;
use crate::overrides::{CatalogOverride, CategoryOverride};
use crate::palette::{ColorRef, Palette};

/// The fixed set of categories a fixture is checked against, in declaration order.
///
/// Every category's color is resolved against the palette when the catalog is
/// built, so `expected_color` can only fail for names that are not present.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    palette: Palette,
    categories: Vec<Category>,
    colors: Vec<Rgb>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(palette: Palette, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(categories.len());
        let mut colors = Vec::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if index.insert(category.name().to_string(), position).is_some() {
                return Err(CatalogError::DuplicateCategory(category.name().to_string()));
            }
            let color = palette.resolve(category.color()).map_err(|token| {
                CatalogError::UnresolvedColor {
                    category: category.name().to_string(),
                    token,
                }
            })?;
            colors.push(color);
        }
        Ok(Self {
            palette,
            categories,
            colors,
            index,
        })
    }

    pub fn empty() -> Self {
        Self {
            palette: Palette::new("empty"),
            categories: Vec::new(),
            colors: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Palette::akari_night(), builtin::categories())
            .expect("built-in catalog colors must resolve")
    }

    pub fn lookup(&self, name: &str) -> Result<&Category, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::UnknownCategory(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.index
            .get(name)
            .map(|position| &self.categories[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration index of a category; reports are ordered by it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.iter().map(Category::name)
    }

    pub fn expected_color(&self, name: &str) -> Result<Rgb, CatalogError> {
        self.position(name)
            .map(|position| self.colors[position])
            .ok_or_else(|| CatalogError::UnknownCategory(name.to_string()))
    }

    /// Categories paired with their resolved colors, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&Category, Rgb)> + '_ {
        self.categories.iter().zip(self.colors.iter().copied())
    }

    /// Finds a category by name or alias, ignoring case.
    pub fn find_by_label(&self, label: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.answers_to(label))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Builds a new catalog with palette tokens and category entries added or replaced.
    pub fn with_overrides(&self, overrides: &CatalogOverride) -> Result<Self, CatalogError> {
        let mut palette = self.palette.clone();
        for (token, value) in &overrides.palette {
            let color = Rgb::parse(value).map_err(|reason| CatalogError::InvalidColor {
                value: value.clone(),
                reason,
            })?;
            palette.insert(token.clone(), color);
        }

        let mut categories = self.categories.clone();
        let mut seen = HashSet::new();
        for entry in &overrides.categories {
            if !seen.insert(entry.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(entry.name.clone()));
            }
            match categories
                .iter_mut()
                .find(|category| category.name() == entry.name)
            {
                Some(existing) => {
                    debug!(category = %entry.name, "overriding catalog entry");
                    apply_override(existing, entry)?;
                }
                None => {
                    debug!(category = %entry.name, "adding catalog entry");
                    let color = entry
                        .color
                        .as_deref()
                        .ok_or_else(|| CatalogError::MissingField {
                            category: entry.name.clone(),
                            field: "color",
                        })?;
                    let mut category = Category::new(
                        entry.name.clone(),
                        entry.description.clone().unwrap_or_default(),
                        ColorRef::parse(color)?,
                    );
                    apply_override(&mut category, entry)?;
                    categories.push(category);
                }
            }
        }

        Self::new(palette, categories)
    }

    /// Exports the catalog in override-file form, with every field spelled out.
    pub fn to_override(&self) -> CatalogOverride {
        CatalogOverride {
            palette: self
                .palette
                .iter()
                .map(|(token, color)| (token.to_string(), color.to_hex()))
                .collect(),
            categories: self
                .categories
                .iter()
                .map(|category| CategoryOverride {
                    name: category.name().to_string(),
                    description: Some(category.description().to_string()),
                    color: Some(category.color().to_string()),
                    modifiers: Some(category.modifiers().iter().copied().collect()),
                    aliases: Some(category.aliases().to_vec()),
                    pattern: category
                        .pattern()
                        .map(|pattern| pattern.source().to_string()),
                    specificity: category.pattern().map(CategoryPattern::specificity),
                })
                .collect(),
        }
    }
}

fn apply_override(category: &mut Category, entry: &CategoryOverride) -> Result<(), CatalogError> {
    if let Some(description) = &entry.description {
        category.set_description(description.clone());
    }
    if let Some(color) = &entry.color {
        category.set_color(ColorRef::parse(color)?);
    }
    if let Some(modifiers) = &entry.modifiers {
        category.set_modifiers(modifiers.iter().copied().collect::<BTreeSet<StyleModifier>>());
    }
    if let Some(aliases) = &entry.aliases {
        category.set_aliases(aliases.clone());
    }

    let source = entry
        .pattern
        .clone()
        .or_else(|| category.pattern().map(|pattern| pattern.source().to_string()));
    if let Some(source) = source {
        let specificity = entry
            .specificity
            .or_else(|| category.pattern().map(CategoryPattern::specificity))
            .unwrap_or(DEFAULT_PATTERN_SPECIFICITY);
        let pattern = CategoryPattern::new(&source, specificity).map_err(|err| {
            CatalogError::InvalidPattern {
                category: entry.name.clone(),
                reason: err.to_string(),
            }
        })?;
        category.set_pattern(Some(pattern));
    }
    Ok(())
}

pub mod builtin {
    use super::*;
    use crate::names;
    use crate::StyleModifier::{Bold, Italic};

    fn entry(name: &str, description: &str, color: &str) -> Category {
        let color = ColorRef::parse(color).expect("built-in color reference must parse");
        Category::new(name, description, color)
    }

    /// Categories of the built-in catalog, grouped the way the bundled fixture is.
    pub fn categories() -> Vec<Category> {
        vec![
            // Imports and namespaces
            entry(
                names::IMPORT_BINDING,
                "name bound by an import clause",
                "bright_blue",
            )
            .with_aliases(["import"]),
            entry(
                names::MODULE_SPECIFIER,
                "module path string after `from` or `import`",
                "lantern",
            ),
            entry(
                names::NAMESPACE,
                "name declared by `namespace` or `module`",
                "bright_blue",
            ),
            // Type definitions
            entry(names::INTERFACE, "name declared by `interface`", "bright_cyan"),
            entry(names::TYPE_ALIAS, "name declared by `type`", "bright_cyan"),
            entry(names::CLASS, "name declared by `class`", "bright_cyan"),
            entry(names::ENUM, "name declared by `enum`", "bright_cyan"),
            entry(
                names::ENUM_MEMBER,
                "member of an enum body or access through an enum name",
                "bright_red",
            ),
            entry(
                names::TYPE_REFERENCE,
                "capitalised name in a type position",
                "bright_cyan",
            ),
            entry(
                names::PRIMITIVE_TYPE,
                "primitive type keyword in a type position",
                "bright_cyan",
            ),
            entry(
                names::TYPE_PARAMETER,
                "generic type parameter, declared or referenced",
                "bright_magenta",
            )
            .with_modifiers([Italic]),
            entry(
                names::PROPERTY,
                "object or interface member key, or member access",
                "cyan",
            )
            .with_aliases(["property key"]),
            entry(
                names::READONLY_MODIFIER,
                "name declared with the `readonly` modifier",
                "bright_red",
            )
            .with_aliases(["readonly"]),
            entry(
                names::STATIC_MEMBER,
                "name declared with the `static` modifier",
                "cyan",
            )
            .with_modifiers([Italic])
            .with_aliases(["static"]),
            entry(
                names::PARAMETER,
                "binding in a function or method parameter list",
                "foreground",
            )
            .with_modifiers([Italic]),
            // Functions and builtins
            entry(
                names::FUNCTION,
                "function or method name at declaration or call",
                "bright_green",
            )
            .with_aliases(["method"]),
            entry(
                names::BUILTIN,
                "standard library global or its member",
                "bright_yellow",
            ),
            entry(
                names::ERROR_CONSTRUCTOR,
                "error class constructed with `new`",
                "red",
            )
            .with_aliases(["error"]),
            // Constants and numbers
            entry(
                names::CONSTANT,
                "upper-case constant name",
                "bright_red",
            )
            .with_aliases(["constant name"]),
            entry(names::NUMBER, "numeric literal", "bright_red")
                .with_aliases(["number value"]),
            entry(
                names::LANGUAGE_CONSTANT,
                "`true`, `false`, `null`, `undefined`, `NaN` or `Infinity`",
                "bright_red",
            ),
            // Variables
            entry(
                names::VARIABLE,
                "name declared by `let`, `const` or `var`",
                "foreground",
            ),
            entry(names::IDENTIFIER, "any other identifier", "foreground"),
            // Keywords and symbols
            entry(names::KEYWORD, "reserved or contextual keyword", "lantern"),
            entry(names::OPERATOR, "operator symbol", "foreground"),
            entry(
                names::PUNCTUATION,
                "bracket, separator or other symbol",
                "mix(foreground, comment, 0.5)",
            ),
            // Strings and special literals
            entry(names::STRING, "single or double quoted string", "lantern"),
            entry(
                names::TEMPLATE_LITERAL,
                "text of a backtick template",
                "lantern",
            )
            .with_aliases(["template string"]),
            entry(
                names::TEMPLATE_SUBSTITUTION,
                "`${` and `}` around a template substitution",
                "bright_yellow",
            ),
            entry(
                names::REGEX_LITERAL,
                "regular expression literal between `/` delimiters",
                "bright_green",
            )
            .with_aliases(["regexp", "regex"]),
            // Decorators
            entry(names::DECORATOR, "`@identifier` decorator", "bright_yellow"),
            // Comments
            entry(names::COMMENT, "line or block comment", "comment").with_modifiers([Italic]),
            entry(names::DOC_COMMENT, "`/** ... */` documentation comment", "comment")
                .with_modifiers([Italic])
                .with_aliases(["jsdoc"]),
            entry(
                names::TASK_COMMENT,
                "line comment starting with TODO, FIXME, NOTE, HACK or XXX",
                "comment",
            )
            .with_modifiers([Italic, Bold]),
        ]
    }
}
