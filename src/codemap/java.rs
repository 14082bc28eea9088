//! Java adapter.

use tree_sitter::Node;

use super::query::{brace_body, delimited_literal};
use super::{BodyRange, LiteralRange};

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
}

pub(super) const BODY_QUERY: &str = r#"
(method_declaration body: (block) @body)
(constructor_declaration body: (constructor_body) @body)
"#;

pub(super) const LITERAL_QUERY: &str = r#"
(string_literal) @literal
"#;

const ATOMS: &[&str] = &["escape_sequence"];

pub(super) fn body_range(node: Node<'_>, source: &str) -> Option<BodyRange> {
    Some(brace_body(node, source))
}

pub(super) fn literal_range(node: Node<'_>, source: &str) -> Option<LiteralRange> {
    let text = source.get(node.byte_range())?;
    // Text blocks use triple quotes.
    let quote_len = if text.starts_with("\"\"\"") { 3 } else { 1 };
    delimited_literal(node, 0, quote_len, ATOMS)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::codemap::{generate_codemap, MapOptions, SourceFile};

    fn condense(code: &str, max: usize) -> String {
        let file = SourceFile::new(Path::new("Main.java"), code);
        generate_codemap(&file, &MapOptions::with_max_literal_len(max)).unwrap()
    }

    #[test]
    fn test_class_methods_and_constructor() {
        let code = r#"
public class Main {
    private static final String GREETING = "Hello, World!";
    private List<String> items;

    public Main() {
        this.items = new ArrayList<>();
    }

    public void addItem(String item) {
        items.add(item);
    }

    public static void main(String[] args) {
        Main main = new Main();
        main.addItem("First item");
        System.out.println(GREETING);
    }
}
"#;
        let expected = r#"public class Main {
    private static final String GREETING = "Hello, World!";
    private List<String> items;

    public Main()

    public void addItem(String item)

    public static void main(String[] args)
}"#;
        assert_eq!(condense(code, 50), expected);
    }

    #[test]
    fn test_interface_unchanged() {
        let code = r#"
public interface Shape {
    double area();
    double perimeter();
}
"#;
        assert_eq!(condense(code, 50), code.trim());
    }

    #[test]
    fn test_field_literal_truncated() {
        let code = r#"class Config { static final String URL = "https://example.com/a/very/long/path"; }"#;
        assert_eq!(
            condense(code, 19),
            r#"class Config { static final String URL = "https://example.com..."; }"#
        );
    }

    #[test]
    fn test_text_block_delimiters_kept() {
        let code = "class Q {\n    String sql = \"\"\"\n        SELECT * FROM users\n        \"\"\";\n}\n";
        let expected = "class Q {\n    String sql = \"\"\"\n   ...\"\"\";\n}";
        assert_eq!(condense(code, 4), expected);
    }

    #[test]
    fn test_abstract_method_unchanged() {
        let code = "abstract class Base {\n    abstract void run();\n}";
        assert_eq!(condense(code, 10), code);
    }
}
