//! Bare-identifier checks for the declaration syntax.
use once_cell::sync::Lazy;
use regex::Regex;

static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap()
});

/// Reserved words (plus strict-mode reservations) that cannot be bare names.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "new", "null", "return", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "implements", "interface", "let", "package", "private", "protected", "public",
    "static", "yield",
];

/// Whether `name` can be emitted verbatim as a bare identifier.
pub fn is_valid_token(name: &str) -> bool {
    IDENT_RE.is_match(name) && !RESERVED.contains(&name)
}

/// Namespace names may be dotted; each segment must be a valid token.
pub fn is_valid_namespace_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_valid_token)
}

/// Internal alias for a name that fails the token check.
pub fn alias_for(name: &str) -> String {
    let body: String = name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    format!("_{body}")
}

/// Parameter names: reserved words get a leading `_`, unnamed ones `arg<N>`.
pub fn param_name(name: Option<&str>, index: usize) -> String {
    match name {
        Some(name) if is_valid_token(name) => name.to_string(),
        Some(name) if !name.is_empty() => alias_for(name),
        _ => format!("arg{index}"),
    }
}

/// Property keys and re-export names: reserved words are fine in these
/// positions, anything that is not an identifier lexeme is JSON-quoted.
pub fn property_key(name: &str) -> String {
    if IDENT_RE.is_match(name) {
        name.to_string()
    } else {
        serde_json::Value::from(name).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        assert!(is_valid_token("runtime"));
        assert!(is_valid_token("$x_1"));
        assert!(!is_valid_token("debugger"));
        assert!(!is_valid_token("delete"));
        assert!(!is_valid_token("1abc"));
        assert!(!is_valid_token("foo-bar"));
        assert!(!is_valid_token(""));
    }

    #[test]
    fn dotted_namespaces() {
        assert!(is_valid_namespace_name("devtools.inspectedWindow"));
        assert!(!is_valid_namespace_name("debugger"));
        assert!(!is_valid_namespace_name("a..b"));
    }

    #[test]
    fn aliases_and_keys() {
        assert_eq!(alias_for("debugger"), "_debugger");
        assert_eq!(alias_for("foo-bar"), "_foo_bar");
        assert_eq!(param_name(Some("function"), 0), "_function");
        assert_eq!(param_name(None, 2), "arg2");
        assert_eq!(property_key("ok"), "ok");
        assert_eq!(property_key("content-type"), "\"content-type\"");
        assert_eq!(property_key("delete"), "delete");
    }
}
