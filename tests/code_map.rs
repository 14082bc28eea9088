use std::path::Path;

use condense::builder::map_sources;
use condense::codemap::{generate_codemap, CodemapError, MapOptions, SourceFile};
use condense::output::format_code_map;

fn document(sources: &[(&str, &str)], max: usize) -> String {
    let maps = map_sources(sources, &MapOptions::with_max_literal_len(max)).unwrap();
    format_code_map(&maps)
}

#[test]
fn document_for_mixed_languages() {
    let sources = [
        (
            "service/Main.java",
            "public class Main {\n    public Main() {\n        init();\n    }\n}\n",
        ),
        (
            "cmd/main.go",
            "package main\n\nconst Banner = \"welcome to the service\"\n\nfunc main() {\n\tserve()\n}\n",
        ),
        (
            "scripts/tool.py",
            "def run():\n    \"\"\"Run the tool.\"\"\"\n    main()\n",
        ),
        ("README", "Read me first.\n"),
    ];

    let expected = "<code_map>\n\
<file>\n<path>README</path>\n<file_map>\nRead me first.\n</file_map>\n</file>\n\
<file>\n<path>cmd/main.go</path>\n<file_map>\npackage main\n\nconst Banner = \"welcome to...\"\n\nfunc main()\n</file_map>\n</file>\n\
<file>\n<path>scripts/tool.py</path>\n<file_map>\ndef run():\n    \"\"\"Run the tool.\"\"\"\n    pass\n</file_map>\n</file>\n\
<file>\n<path>service/Main.java</path>\n<file_map>\npublic class Main {\n    public Main()\n}\n</file_map>\n</file>\n\
</code_map>\n";

    assert_eq!(document(&sources, 10), expected);
}

#[test]
fn pass_through_is_byte_identical() {
    let text = "line one   \n\n\n\tline \"with a long quoted section\" two\n";
    let file = SourceFile::new(Path::new("data/notes.cfg"), text);
    let out = generate_codemap(&file, &MapOptions::with_max_literal_len(1)).unwrap();
    assert_eq!(out, text);
}

#[test]
fn output_is_deterministic_and_order_independent() {
    let a = ("a.ts", "export function a(): number {\n  return 1;\n}\n");
    let b = ("b.rs", "fn b() -> &'static str {\n    \"b\"\n}\n");
    let c = ("c.py", "def c():\n    return 'a string long enough'\n");

    let first = document(&[a, b, c], 5);
    let second = document(&[c, a, b], 5);
    assert_eq!(first, second);
    assert_eq!(first, document(&[b, c, a], 5));
}

#[test]
fn truncated_literals_keep_exactly_max_characters() {
    let code = "package p\n\nvar a = \"αβγδεζηθικ\"\nvar b = \"αβγδε\"\n";
    let file = SourceFile::new(Path::new("greek.go"), code);
    let out = generate_codemap(&file, &MapOptions::with_max_literal_len(5)).unwrap();
    assert_eq!(out, "package p\n\nvar a = \"αβγδε...\"\nvar b = \"αβγδε\"");
}

#[test]
fn elided_bodies_leave_no_trace_of_their_contents() {
    let code = r#"
package svc

func Handle(req Request) (Response, error) {
	secret := "do-not-leak-this-value"
	return process(req, secret)
}
"#;
    let file = SourceFile::new(Path::new("svc.go"), code);
    let out = generate_codemap(&file, &MapOptions::with_max_literal_len(3)).unwrap();
    assert_eq!(out, "package svc\n\nfunc Handle(req Request) (Response, error)");
    assert!(!out.contains("secret"));
    assert!(!out.contains("..."));
}

#[test]
fn failing_file_error_names_the_path() {
    let sources = [("ok.go", "package ok\n"), ("pkg/bad.go", "package bad\n\nfunc f( {\n")];
    match map_sources(&sources, &MapOptions::default()) {
        Err(CodemapError::Format { path, .. }) => assert_eq!(path, Path::new("pkg/bad.go")),
        other => panic!("expected format error, got {other:?}"),
    }
}
