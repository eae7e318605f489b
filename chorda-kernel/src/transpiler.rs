//! Transpiler - emit a compiled tree as a self-contained Rust module.
//!
//! The emitted module mirrors the in-memory layout the dispatcher consumes:
//! `builtin_key_chords()` rebuilds the exact `ChordTree`, and
//! `menu_config()` the exact `MenuConfig`, with every string embedded as a
//! literal. Output is deterministic for a given tree.

use std::fmt::Write;

use chorda_api::{Color, MenuConfig, Modifiers};

use crate::chord::{ChordTree, KeyChord, PropId, Property};

/// Render the whole module.
pub fn emit(tree: &ChordTree, config: &MenuConfig) -> String {
    let mut out = String::new();

    out.push_str("//! Precompiled key chords. Generated by `chorda --parse`; do not edit.\n");
    out.push_str("\n");
    out.push_str("use chorda_api::{Color, Key, MenuColors, MenuConfig, MenuPosition, Modifiers, SpecialKey};\n");
    out.push_str("use chorda_kernel::chord::{ChordFlags, ChordTree, KeyChord, Property};\n");
    out.push_str("\n");

    emit_config(&mut out, config);
    out.push_str("\n");
    emit_chords(&mut out, tree);

    out
}

fn escaped(text: &str) -> String {
    text.escape_default().to_string()
}

fn emit_string(text: &str) -> String {
    format!("\"{}\".to_string()", escaped(text))
}

fn emit_mods(mods: Modifiers) -> String {
    if mods.is_empty() {
        return "Modifiers::NONE".to_string();
    }

    let mut parts = Vec::new();
    if mods.contains(Modifiers::CTRL) {
        parts.push("Modifiers::CTRL");
    }
    if mods.contains(Modifiers::META) {
        parts.push("Modifiers::META");
    }
    if mods.contains(Modifiers::HYPER) {
        parts.push("Modifiers::HYPER");
    }
    if mods.contains(Modifiers::SHIFT) {
        parts.push("Modifiers::SHIFT");
    }
    parts.join(" | ")
}

fn emit_color(color: Color) -> String {
    format!(
        "Color {{ r: 0x{:02X}, g: 0x{:02X}, b: 0x{:02X}, a: 0x{:02X} }}",
        color.r, color.g, color.b, color.a
    )
}

fn emit_config(out: &mut String, config: &MenuConfig) {
    let _ = writeln!(out, "pub fn menu_config() -> MenuConfig {{");
    let _ = writeln!(out, "    MenuConfig {{");
    let _ = writeln!(out, "        delimiter: {},", emit_string(&config.delimiter));
    let _ = writeln!(out, "        delay: {},", config.delay);
    let _ = writeln!(out, "        keep_delay: {},", config.keep_delay);
    let _ = writeln!(out, "        max_cols: {},", config.max_cols);
    let _ = writeln!(out, "        menu_width: {},", config.menu_width);
    let _ = writeln!(out, "        menu_gap: {},", config.menu_gap);
    let _ = writeln!(out, "        width_padding: {},", config.width_padding);
    let _ = writeln!(out, "        height_padding: {},", config.height_padding);
    let _ = writeln!(out, "        table_padding: {},", config.table_padding);
    let _ = writeln!(out, "        position: MenuPosition::{:?},", config.position);
    let _ = writeln!(out, "        border_width: {},", config.border_width);
    let _ = writeln!(out, "        border_radius: {:?},", config.border_radius);
    let _ = writeln!(out, "        colors: MenuColors {{");
    let _ = writeln!(out, "            key: {},", emit_color(config.colors.key));
    let _ = writeln!(out, "            delimiter: {},", emit_color(config.colors.delimiter));
    let _ = writeln!(out, "            prefix: {},", emit_color(config.colors.prefix));
    let _ = writeln!(out, "            chord: {},", emit_color(config.colors.chord));
    let _ = writeln!(out, "            title: {},", emit_color(config.colors.title));
    let _ = writeln!(out, "            goto_: {},", emit_color(config.colors.goto_));
    let _ = writeln!(out, "            background: {},", emit_color(config.colors.background));
    let _ = writeln!(out, "            border: {},", emit_color(config.colors.border));
    let _ = writeln!(out, "        }},");
    let _ = writeln!(out, "        shell: {},", emit_string(&config.shell));
    let _ = writeln!(out, "        font: {},", emit_string(&config.font));
    let _ = writeln!(out, "        title_font: {},", emit_string(&config.title_font));
    let _ = writeln!(out, "        implicit_keys: {},", emit_string(&config.implicit_keys));
    match &config.wrap_cmd {
        Some(wrap) => {
            let _ = writeln!(out, "        wrap_cmd: Some({}),", emit_string(wrap));
        }
        None => {
            let _ = writeln!(out, "        wrap_cmd: None,");
        }
    }
    let _ = writeln!(out, "        sort: {},", config.sort);
    let _ = writeln!(out, "        debug: {},", config.debug);
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
}

fn emit_chords(out: &mut String, tree: &ChordTree) {
    let _ = writeln!(out, "pub fn builtin_key_chords() -> ChordTree {{");
    if tree.is_empty() {
        let _ = writeln!(out, "    ChordTree::new(Vec::new())");
    } else {
        let _ = writeln!(out, "    ChordTree::new(vec![");
        for chord in tree.roots() {
            emit_chord(out, chord, 2);
        }
        let _ = writeln!(out, "    ])");
    }
    let _ = writeln!(out, "}}");
}

fn emit_chord(out: &mut String, chord: &KeyChord, level: usize) {
    let pad = "    ".repeat(level);

    let _ = writeln!(out, "{pad}KeyChord {{");
    let _ = writeln!(
        out,
        "{pad}    key: Key::new(\"{}\", {}, SpecialKey::{:?}),",
        escaped(&chord.key.repr),
        emit_mods(chord.key.mods),
        chord.key.special
    );

    let _ = writeln!(out, "{pad}    props: [");
    for (id, prop) in PropId::ALL.iter().zip(&chord.props) {
        match prop {
            Property::Str(text) => {
                let _ = writeln!(
                    out,
                    "{pad}        /* {} */ Property::Str({}),",
                    id.name(),
                    emit_string(text)
                );
            }
            _ => {
                let _ = writeln!(out, "{pad}        /* {} */ Property::None,", id.name());
            }
        }
    }
    let _ = writeln!(out, "{pad}    ],");

    let flags = chord.flags.names();
    if flags.is_empty() {
        let _ = writeln!(out, "{pad}    flags: ChordFlags::NONE,");
    } else {
        let rendered: Vec<String> = flags
            .iter()
            .map(|name| format!("ChordFlags::{name}"))
            .collect();
        let _ = writeln!(out, "{pad}    flags: {},", rendered.join(" | "));
    }

    if chord.children.is_empty() {
        let _ = writeln!(out, "{pad}    children: Vec::new(),");
    } else {
        let _ = writeln!(out, "{pad}    children: vec![");
        for child in &chord.children {
            emit_chord(out, child, level + 2);
        }
        let _ = writeln!(out, "{pad}    ],");
    }

    let _ = writeln!(out, "{pad}}},");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorda_api::{Key, SpecialKey};
    use crate::chord::{ChordFlags, PropId};

    fn sample_tree() -> ChordTree {
        let mut chord = KeyChord {
            key: Key::new("a", Modifiers::CTRL, SpecialKey::None),
            ..Default::default()
        };
        *chord.prop_mut(PropId::Description) = Property::Str("Say \"hi\"".to_string());
        *chord.prop_mut(PropId::Command) = Property::Str("echo hi".to_string());
        chord.flags.insert(ChordFlags::WRITE);
        ChordTree::new(vec![chord])
    }

    #[test]
    fn test_emit_is_deterministic() {
        let tree = sample_tree();
        let config = MenuConfig::default();
        assert_eq!(emit(&tree, &config), emit(&tree, &config));
    }

    #[test]
    fn test_emitted_module_shape() {
        let output = emit(&sample_tree(), &MenuConfig::default());
        assert!(output.contains("pub fn builtin_key_chords() -> ChordTree {"));
        assert!(output.contains("pub fn menu_config() -> MenuConfig {"));
        assert!(output.contains("Key::new(\"a\", Modifiers::CTRL, SpecialKey::None)"));
        assert!(output.contains("Property::Str(\"Say \\\"hi\\\"\".to_string())"));
        assert!(output.contains("flags: ChordFlags::WRITE,"));
        assert!(output.contains("delimiter: \" -> \".to_string(),"));
    }

    #[test]
    fn test_empty_tree_emits() {
        let output = emit(&ChordTree::new(Vec::new()), &MenuConfig::default());
        assert!(output.contains("ChordTree::new(Vec::new())"));
    }
}
