/// Renders a list of accumulated string errors the same way for the lexer
/// and the parser: `"<prefix>:\n  - msg\n  - msg\n"`.
pub fn format_errors(prefix: &str, errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(prefix);
    out.push_str(":\n");
    for err in errors {
        out.push_str("  - ");
        out.push_str(err);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_render_empty_string() {
        assert_eq!(format_errors("Lexer errors", &[]), "");
    }

    #[test]
    fn renders_prefix_and_bullets() {
        let errors = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            format_errors("Parser errors", &errors),
            "Parser errors:\n  - a\n  - b\n"
        );
    }
}
