//! Precompiled key chords. Generated by `chorda --parse`; do not edit.

use chorda_api::{Color, Key, MenuColors, MenuConfig, MenuPosition, Modifiers, SpecialKey};
use chorda_kernel::chord::{ChordFlags, ChordTree, KeyChord, Property};

pub fn menu_config() -> MenuConfig {
    MenuConfig {
        delimiter: " -> ".to_string(),
        delay: 1000,
        keep_delay: 75,
        max_cols: 5,
        menu_width: -1,
        menu_gap: -1,
        width_padding: 6,
        height_padding: 2,
        table_padding: -1,
        position: MenuPosition::Bottom,
        border_width: 4,
        border_radius: 0.0,
        colors: MenuColors {
            key: Color { r: 0xDC, g: 0xD7, b: 0xBA, a: 0xFF },
            delimiter: Color { r: 0x52, g: 0x52, b: 0x59, a: 0xFF },
            prefix: Color { r: 0xAF, g: 0x9F, b: 0xC9, a: 0xFF },
            chord: Color { r: 0xDC, g: 0xD7, b: 0xBA, a: 0xFF },
            title: Color { r: 0xDC, g: 0xD7, b: 0xBA, a: 0xFF },
            goto_: Color { r: 0xE6, g: 0xC3, b: 0x84, a: 0xFF },
            background: Color { r: 0x18, g: 0x16, b: 0x16, a: 0xFF },
            border: Color { r: 0x7F, g: 0xB4, b: 0xCA, a: 0xFF },
        },
        shell: "/bin/sh".to_string(),
        font: "monospace, 14".to_string(),
        title_font: "sans-serif, 16".to_string(),
        implicit_keys: "asdfghjkl;".to_string(),
        wrap_cmd: None,
        sort: false,
        debug: false,
    }
}

pub fn builtin_key_chords() -> ChordTree {
    ChordTree::new(vec![
        KeyChord {
            key: Key::new("a", Modifiers::NONE, SpecialKey::None),
            props: [
                /* description */ Property::Str("A chord".to_string()),
                /* command */ Property::Str("Hello, world!".to_string()),
                /* before */ Property::None,
                /* after */ Property::None,
                /* wrap_cmd */ Property::None,
                /* title */ Property::None,
                /* goto */ Property::None,
            ],
            flags: ChordFlags::WRITE,
            children: Vec::new(),
        },
        KeyChord {
            key: Key::new("p", Modifiers::NONE, SpecialKey::None),
            props: [
                /* description */ Property::Str("A prefix".to_string()),
                /* command */ Property::None,
                /* before */ Property::None,
                /* after */ Property::None,
                /* wrap_cmd */ Property::None,
                /* title */ Property::None,
                /* goto */ Property::None,
            ],
            flags: ChordFlags::WRITE,
            children: vec![
                KeyChord {
                    key: Key::new("b", Modifiers::NONE, SpecialKey::None),
                    props: [
                        /* description */ Property::Str("A chord".to_string()),
                        /* command */ Property::Str("Hello from inside prefix 'p b'".to_string()),
                        /* before */ Property::None,
                        /* after */ Property::None,
                        /* wrap_cmd */ Property::None,
                        /* title */ Property::None,
                        /* goto */ Property::None,
                    ],
                    flags: ChordFlags::WRITE,
                    children: Vec::new(),
                },
                KeyChord {
                    key: Key::new("c", Modifiers::NONE, SpecialKey::None),
                    props: [
                        /* description */ Property::Str("Another chord".to_string()),
                        /* command */ Property::Str("Hello from inside prefix 'p c'".to_string()),
                        /* before */ Property::None,
                        /* after */ Property::None,
                        /* wrap_cmd */ Property::None,
                        /* title */ Property::None,
                        /* goto */ Property::None,
                    ],
                    flags: ChordFlags::WRITE,
                    children: Vec::new(),
                },
            ],
        },
    ])
}
