//! Names of the built-in categories. The scanner's rule table is keyed by these.

pub const IMPORT_BINDING: &str = "import binding";
pub const MODULE_SPECIFIER: &str = "module specifier";
pub const NAMESPACE: &str = "namespace";
pub const INTERFACE: &str = "interface";
pub const TYPE_ALIAS: &str = "type alias";
pub const CLASS: &str = "class";
pub const ENUM: &str = "enum";
pub const ENUM_MEMBER: &str = "enum member";
pub const TYPE_REFERENCE: &str = "type reference";
pub const PRIMITIVE_TYPE: &str = "primitive type";
pub const TYPE_PARAMETER: &str = "type parameter";
pub const PROPERTY: &str = "property";
pub const READONLY_MODIFIER: &str = "readonly modifier";
pub const STATIC_MEMBER: &str = "static member";
pub const PARAMETER: &str = "parameter";
pub const FUNCTION: &str = "function";
pub const BUILTIN: &str = "builtin";
pub const ERROR_CONSTRUCTOR: &str = "error constructor";
pub const CONSTANT: &str = "constant";
pub const NUMBER: &str = "number";
pub const LANGUAGE_CONSTANT: &str = "language constant";
pub const VARIABLE: &str = "variable";
pub const IDENTIFIER: &str = "identifier";
pub const KEYWORD: &str = "keyword";
pub const OPERATOR: &str = "operator";
pub const PUNCTUATION: &str = "punctuation";
pub const STRING: &str = "string";
pub const TEMPLATE_LITERAL: &str = "template literal";
pub const TEMPLATE_SUBSTITUTION: &str = "template substitution";
pub const REGEX_LITERAL: &str = "regular expression literal";
pub const DECORATOR: &str = "decorator";
pub const COMMENT: &str = "comment";
pub const DOC_COMMENT: &str = "doc comment";
pub const TASK_COMMENT: &str = "task comment";
