//! Identifiers.
//!
//! This module decides when an identifier must be written in delimited form
//! (double quotes) to survive a round trip through the SQL parser, and defines
//! the qualified names of tables and columns built from such identifiers.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

lazy_static! {
    /// Pattern for identifiers that can be written bare.
    static ref BARE_IDENT: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$")
        .expect("bare identifier pattern is valid");

    /// Reserved keywords that cannot be used as bare identifiers.
    static ref RESERVED: HashSet<&'static str> = [
        "add", "all", "alter", "and", "any", "array", "as", "asc", "between",
        "by", "case", "cast", "column", "constraint", "create", "cross",
        "current_date", "current_schema", "current_time", "current_timestamp",
        "current_user", "default", "delete", "deny", "desc", "describe",
        "directory", "distinct", "drop", "else", "end", "escape", "except",
        "exists", "extract", "false", "first", "for", "from", "full",
        "function", "grant", "group", "having", "if", "in", "index", "inner",
        "input", "insert", "intersect", "into", "is", "join", "last", "left",
        "like", "limit", "match", "natural", "not", "null", "nulls", "object",
        "offset", "on", "or", "order", "outer", "persistent", "recursive",
        "reset", "returns", "revoke", "right", "select", "session_user", "set",
        "some", "stratify", "table", "then", "transient", "true", "try_cast",
        "unbounded", "union", "update", "user", "using", "when", "where",
        "with",
    ].iter().cloned().collect();
}

/// Returns true if `name` is a reserved keyword.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_lowercase().as_str())
}

/// Returns true if `name` can be written without delimiters.
pub fn is_bare(name: &str) -> bool {
    BARE_IDENT.is_match(name) && !is_reserved(name)
}

/// Writes `name` as a delimited identifier, doubling embedded quotes.
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes `name` only if it cannot be written bare.
///
/// A bare identifier starts with a lowercase letter or underscore, continues
/// with lowercase letters, digits, and underscores, and is not a reserved
/// keyword. Anything else (mixed case, punctuation, whitespace, the empty
/// string) is delimited.
pub fn quote_if_needed(name: &str) -> String {
    if is_bare(name) {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// Identity of a stored table: a schema and a table name.
///
/// An empty schema stands for the implicit schema of the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent {
    pub schema: String,
    pub name: String,
}

impl TableIdent {
    pub fn new<S: Into<String>, N: Into<String>>(schema: S, name: N) -> TableIdent {
        TableIdent {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Renders the quoted `schema.name` form, or just the name when the
    /// schema is implicit.
    pub fn sql_fqn(&self) -> String {
        if self.schema.is_empty() {
            quote_if_needed(&self.name)
        } else {
            format!("{}.{}", quote_if_needed(&self.schema), quote_if_needed(&self.name))
        }
    }
}

/// A column within a table, possibly a subscript path into an object column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnIdent {
    pub name: String,
    pub path: Vec<String>,
}

impl ColumnIdent {
    pub fn new<N: Into<String>>(name: N) -> ColumnIdent {
        ColumnIdent {
            name: name.into(),
            path: vec![],
        }
    }

    /// Creates a column that addresses a nested element of `name`.
    pub fn with_path<N, I, P>(name: N, path: I) -> ColumnIdent
    where
        N: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        ColumnIdent {
            name: name.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the column path as `name['a']['b']`, without quoting the name.
    ///
    /// This is the textual form output names are derived from.
    pub fn sql_fqn(&self) -> String {
        self.path_with(self.name.clone())
    }

    /// Returns the column path with the name quoted if needed.
    pub fn quoted_fqn(&self) -> String {
        self.path_with(quote_if_needed(&self.name))
    }

    fn path_with(&self, mut s: String) -> String {
        for part in &self.path {
            s.push_str("['");
            s.push_str(&part.replace('\'', "''"));
            s.push_str("']");
        }
        s
    }
}

/// A dotted name such as `doc.users` or `unnest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub parts: Vec<String>,
}

impl QualifiedName {
    pub fn new<I, P>(parts: I) -> QualifiedName
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        QualifiedName {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the name with each part quoted if needed.
    pub fn sql_fqn(&self) -> String {
        let parts: Vec<String> = self.parts.iter().map(|p| quote_if_needed(p)).collect();
        parts.join(".")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_are_not_quoted() {
        assert_eq!(quote_if_needed("users"), "users");
        assert_eq!(quote_if_needed("_tmp1"), "_tmp1");
        assert_eq!(quote_if_needed("a1_b2"), "a1_b2");
    }

    #[test]
    fn mixed_case_is_quoted() {
        assert_eq!(quote_if_needed("Users"), r#""Users""#);
        assert_eq!(quote_if_needed("userName"), r#""userName""#);
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(quote_if_needed("user-id"), r#""user-id""#);
        assert_eq!(quote_if_needed("user id"), r#""user id""#);
        assert_eq!(quote_if_needed("1st"), r#""1st""#);
        assert_eq!(quote_if_needed(""), r#""""#);
        assert_eq!(quote_if_needed("count(*)"), r#""count(*)""#);
    }

    #[test]
    fn keywords_are_quoted() {
        assert_eq!(quote_if_needed("select"), r#""select""#);
        assert_eq!(quote_if_needed("order"), r#""order""#);
        assert_eq!(quote_if_needed("SELECT"), r#""SELECT""#);
        assert!(is_reserved("Where"));
        assert!(!is_reserved("name"));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote_if_needed(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn table_fqn() {
        assert_eq!(TableIdent::new("doc", "users").sql_fqn(), "doc.users");
        assert_eq!(TableIdent::new("", "users").sql_fqn(), "users");
        assert_eq!(TableIdent::new("Doc", "order").sql_fqn(), r#""Doc"."order""#);
    }

    #[test]
    fn column_fqn() {
        assert_eq!(ColumnIdent::new("id").sql_fqn(), "id");
        assert_eq!(
            ColumnIdent::with_path("obj", vec!["a", "it's"]).sql_fqn(),
            "obj['a']['it''s']"
        );
        assert_eq!(ColumnIdent::new("Name").sql_fqn(), "Name");
        assert_eq!(ColumnIdent::new("Name").quoted_fqn(), r#""Name""#);
        assert_eq!(
            ColumnIdent::with_path("Obj", vec!["x"]).quoted_fqn(),
            r#""Obj"['x']"#
        );
    }

    #[test]
    fn qualified_name_display() {
        assert_eq!(QualifiedName::new(vec!["doc", "t"]).to_string(), "doc.t");
    }

    #[test]
    fn qualified_name_fqn() {
        assert_eq!(QualifiedName::new(vec!["doc", "t"]).sql_fqn(), "doc.t");
        assert_eq!(
            QualifiedName::new(vec!["doc", "My View"]).sql_fqn(),
            r#"doc."My View""#
        );
        assert_eq!(QualifiedName::new(vec!["Nums"]).sql_fqn(), r#""Nums""#);
    }
}
