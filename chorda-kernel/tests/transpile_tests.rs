//! Transpiler tests: source to emitted Rust module.

use chorda_api::MenuConfig;
use chorda_kernel::{compile, transpiler};

fn emit_source(source: &str) -> String {
    let mut config = MenuConfig::default();
    let compilation = compile(source, None, &mut config).expect("source should compile");
    transpiler::emit(&compilation.tree, &config)
}

#[test]
fn test_roundtrip_stability() {
    let source = "p \"menu\" ^before %{{pre}} { a \"one\" %{{echo 1}} b \"two\" +keep %{{echo 2}} }";

    /* compiling the same source twice yields identical trees and identical
     * emitted modules */
    let first = emit_source(source);
    let second = emit_source(source);
    assert_eq!(first, second);
}

#[test]
fn test_emitted_module_contains_tree() {
    let output = emit_source("C-a \"Say hi\" %{{echo hi}} +write");

    assert!(output.contains("pub fn builtin_key_chords() -> ChordTree {"));
    assert!(output.contains("Key::new(\"a\", Modifiers::CTRL, SpecialKey::None)"));
    assert!(output.contains("Property::Str(\"Say hi\".to_string())"));
    assert!(output.contains("Property::Str(\"echo hi\".to_string())"));
    assert!(output.contains("flags: ChordFlags::WRITE,"));
}

#[test]
fn test_emitted_config_tracks_directives() {
    let output = emit_source(":top\n:max-columns 3\n:shell \"/bin/zsh\"\na \"x\" %{{c}}");

    assert!(output.contains("position: MenuPosition::Top,"));
    assert!(output.contains("max_cols: 3,"));
    assert!(output.contains("shell: \"/bin/zsh\".to_string(),"));
}

#[test]
fn test_nested_children_emitted() {
    let output = emit_source("p \"menu\" { a \"x\" %{{c}} }");
    assert!(output.contains("children: vec!["));
    assert!(output.contains("children: Vec::new(),"));
}

#[test]
fn test_escapes_survive_emission() {
    let output = emit_source("a \"say \\\"hi\\\"\" %{{echo \"quoted\"}}");
    assert!(output.contains("Property::Str(\"say \\\"hi\\\"\".to_string())"));
    assert!(output.contains("Property::Str(\"echo \\\"quoted\\\"\".to_string())"));
}
