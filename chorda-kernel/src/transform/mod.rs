//! Tree transformation passes, run in order: deduplicate siblings,
//! propagate inheritance top-down, resolve token arrays into final strings,
//! and optionally sort sibling lists.

mod resolve;

use std::cmp::Ordering;
use std::collections::HashMap;

use chorda_api::{MenuConfig, SpecialKey};

use crate::chord::{ChordFlags, KeyChord, PropId, Property};
use crate::error::ChordError;

/// Run every pass over a freshly parsed chord vector.
pub fn transform(
    chords: &mut Vec<KeyChord>,
    config: &MenuConfig,
    user_vars: &HashMap<String, String>,
    filepath: &str,
) -> Result<(), ChordError> {
    deduplicate(chords);
    propagate_inheritance(chords);
    resolve::resolve(chords, config, user_vars, filepath)?;
    if config.sort {
        sort_chords(chords);
    }
    Ok(())
}

/// Collapse siblings with equal keys, comparing the full modifier set; the
/// later definition wins. Applied to every sibling list in the tree.
pub fn deduplicate(chords: &mut Vec<KeyChord>) {
    let mut i = 0;
    while i < chords.len() {
        let mut duplicates: Vec<usize> = Vec::new();
        for j in (i + 1)..chords.len() {
            if chords[i].key.is_equal(&chords[j].key, false) {
                duplicates.push(j);
            }
        }

        if let Some(&last) = duplicates.last() {
            chords.swap(i, last);
            for &j in duplicates.iter().rev() {
                chords.remove(j);
            }
        }
        i += 1;
    }

    for chord in chords.iter_mut() {
        deduplicate(&mut chord.children);
    }
}

/// Walk prefixes top-down, copying hooks, flags, wrap commands, and titles
/// into children per the inheritance rules.
pub fn propagate_inheritance(chords: &mut [KeyChord]) {
    for chord in chords.iter_mut() {
        if chord.is_prefix() {
            inherit_into_children(chord);
        }
    }
}

fn inherit_into_children(parent: &mut KeyChord) {
    let parent_flags = parent.flags;
    let parent_before = parent.prop(PropId::Before).clone();
    let parent_after = parent.prop(PropId::After).clone();
    let parent_wrap = parent.prop(PropId::WrapCmd).clone();
    let parent_title = parent.prop(PropId::Title).clone();

    for child in parent.children.iter_mut() {
        if child.flags.contains(ChordFlags::IGNORE) {
            continue;
        }

        let is_prefix = child.is_prefix();
        let should_inherit = !is_prefix || child.flags.contains(ChordFlags::INHERIT);

        if should_inherit {
            set_hooks(child, &parent_before, &parent_after, parent_flags);
            child.flags = inherited_flags(parent_flags, child.flags);

            if !child.flags.contains(ChordFlags::UNWRAP)
                && !child.prop(PropId::WrapCmd).has_content()
                && parent_wrap.has_content()
            {
                *child.prop_mut(PropId::WrapCmd) = parent_wrap.clone();
            }

            if is_prefix
                && !child.prop(PropId::Title).has_content()
                && parent_title.has_content()
            {
                *child.prop_mut(PropId::Title) = parent_title.clone();
            }
        }

        if is_prefix {
            inherit_into_children(child);
        }
    }
}

fn set_hooks(child: &mut KeyChord, before: &Property, after: &Property, parent_flags: ChordFlags) {
    if child.flags.contains(ChordFlags::UNHOOK) {
        return;
    }
    /* goto chords never run hooks */
    if child.prop(PropId::Goto).has_content() {
        return;
    }

    if !child.flags.contains(ChordFlags::NO_BEFORE)
        && before.has_content()
        && !child.prop(PropId::Before).has_content()
    {
        *child.prop_mut(PropId::Before) = before.clone();
        if parent_flags.contains(ChordFlags::SYNC_BEFORE) {
            child.flags.insert(ChordFlags::SYNC_BEFORE);
        }
    }

    if !child.flags.contains(ChordFlags::NO_AFTER)
        && after.has_content()
        && !child.prop(PropId::After).has_content()
    {
        *child.prop_mut(PropId::After) = after.clone();
        if parent_flags.contains(ChordFlags::SYNC_AFTER) {
            child.flags.insert(ChordFlags::SYNC_AFTER);
        }
    }
}

fn inherited_flags(parent: ChordFlags, child: ChordFlags) -> ChordFlags {
    if child.contains(ChordFlags::DEFLAG) {
        return child;
    }

    let mut flags = child;
    if !child.contains(ChordFlags::CLOSE) && parent.contains(ChordFlags::KEEP) {
        flags.insert(ChordFlags::KEEP);
    }
    if !child.contains(ChordFlags::EXECUTE) && parent.contains(ChordFlags::WRITE) {
        flags.insert(ChordFlags::WRITE);
    }
    if parent.contains(ChordFlags::SYNC_COMMAND) {
        flags.insert(ChordFlags::SYNC_COMMAND);
    }
    flags
}

/* ---- sorting ---- */

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum KeyCategory {
    Special,
    Number,
    Letter,
    Symbol,
}

fn key_category(first: Option<char>, special: SpecialKey) -> KeyCategory {
    if special.is_special() {
        return KeyCategory::Special;
    }
    match first {
        Some('0'..='9') => KeyCategory::Number,
        Some(c) if c.is_ascii_alphabetic() => KeyCategory::Letter,
        _ => KeyCategory::Symbol,
    }
}

fn compare_chords(a: &KeyChord, b: &KeyChord) -> Ordering {
    let a_first = a.key.repr.chars().next();
    let b_first = b.key.repr.chars().next();

    let by_category = key_category(a_first, a.key.special)
        .cmp(&key_category(b_first, b.key.special));
    if by_category != Ordering::Equal {
        return by_category;
    }

    /* unmodified keys come first */
    let by_mods = (!a.key.mods.is_empty()).cmp(&(!b.key.mods.is_empty()));
    if by_mods != Ordering::Equal {
        return by_mods;
    }

    if let (Some(a_char), Some(b_char)) = (a_first, b_first)
        && a_char.is_ascii_alphabetic()
        && b_char.is_ascii_alphabetic()
    {
        let folded = a_char
            .to_ascii_lowercase()
            .cmp(&b_char.to_ascii_lowercase());
        if folded != Ordering::Equal {
            return folded;
        }
        /* lowercase precedes uppercase on tie */
        let by_case = a_char.is_ascii_uppercase().cmp(&b_char.is_ascii_uppercase());
        if by_case != Ordering::Equal {
            return by_case;
        }
    }

    a.key.repr.as_bytes().cmp(b.key.repr.as_bytes())
}

/// Stable-sort every sibling list by category, modifiers, and repr.
pub fn sort_chords(chords: &mut [KeyChord]) {
    for chord in chords.iter_mut() {
        if chord.is_prefix() {
            sort_chords(&mut chord.children);
        }
    }
    chords.sort_by(compare_chords);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorda_api::{Key, Modifiers};

    fn chord(repr: &str) -> KeyChord {
        KeyChord {
            key: Key::new(repr, Modifiers::NONE, SpecialKey::None),
            ..Default::default()
        }
    }

    fn chord_with_command(repr: &str, command: &str) -> KeyChord {
        let mut chord = chord(repr);
        *chord.prop_mut(PropId::Command) = Property::Str(command.to_string());
        chord
    }

    #[test]
    fn test_dedup_later_wins() {
        let mut chords = vec![
            chord_with_command("a", "first"),
            chord_with_command("b", "other"),
            chord_with_command("a", "second"),
        ];
        deduplicate(&mut chords);
        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].prop_str(PropId::Command), Some("second"));
        assert_eq!(chords[1].key.repr, "b");
    }

    #[test]
    fn test_dedup_is_shift_significant() {
        let mut chords = vec![
            chord("a"),
            KeyChord {
                key: Key::new("a", Modifiers::SHIFT, SpecialKey::None),
                ..Default::default()
            },
        ];
        deduplicate(&mut chords);
        assert_eq!(chords.len(), 2);
    }

    #[test]
    fn test_dedup_recurses_into_children() {
        let mut prefix = chord("p");
        prefix.children = vec![chord("x"), chord("x")];
        let mut chords = vec![prefix];
        deduplicate(&mut chords);
        assert_eq!(chords[0].children.len(), 1);
    }

    #[test]
    fn test_keep_inherited_unless_close() {
        let mut parent = chord("p");
        parent.flags.insert(ChordFlags::KEEP);
        parent.children = vec![chord_with_command("a", "x"), {
            let mut close = chord_with_command("b", "y");
            close.flags.insert(ChordFlags::CLOSE);
            close
        }];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        assert!(chords[0].children[0].flags.contains(ChordFlags::KEEP));
        assert!(!chords[0].children[1].flags.contains(ChordFlags::KEEP));
    }

    #[test]
    fn test_write_inherited_unless_execute() {
        let mut parent = chord("p");
        parent.flags.insert(ChordFlags::WRITE);
        parent.children = vec![chord_with_command("a", "x"), {
            let mut exec = chord_with_command("b", "y");
            exec.flags.insert(ChordFlags::EXECUTE);
            exec
        }];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        assert!(chords[0].children[0].flags.contains(ChordFlags::WRITE));
        assert!(!chords[0].children[1].flags.contains(ChordFlags::WRITE));
    }

    #[test]
    fn test_hooks_inherited_with_sync_flag() {
        let mut parent = chord("p");
        *parent.prop_mut(PropId::Before) = Property::Str("pre".to_string());
        parent.flags.insert(ChordFlags::SYNC_BEFORE);
        parent.children = vec![chord_with_command("a", "x")];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        let child = &chords[0].children[0];
        assert_eq!(child.prop_str(PropId::Before), Some("pre"));
        assert!(child.flags.contains(ChordFlags::SYNC_BEFORE));
    }

    #[test]
    fn test_unhook_and_no_before_block_hooks() {
        let mut parent = chord("p");
        *parent.prop_mut(PropId::Before) = Property::Str("pre".to_string());
        *parent.prop_mut(PropId::After) = Property::Str("post".to_string());

        let mut unhooked = chord_with_command("a", "x");
        unhooked.flags.insert(ChordFlags::UNHOOK);
        let mut no_before = chord_with_command("b", "y");
        no_before.flags.insert(ChordFlags::NO_BEFORE);
        parent.children = vec![unhooked, no_before];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        assert!(!chords[0].children[0].prop(PropId::Before).has_content());
        assert!(!chords[0].children[0].prop(PropId::After).has_content());
        assert!(!chords[0].children[1].prop(PropId::Before).has_content());
        assert!(chords[0].children[1].prop(PropId::After).has_content());
    }

    #[test]
    fn test_deflag_blocks_flag_inheritance() {
        let mut parent = chord("p");
        parent.flags.insert(ChordFlags::KEEP);
        let mut deflagged = chord_with_command("a", "x");
        deflagged.flags.insert(ChordFlags::DEFLAG);
        parent.children = vec![deflagged];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);
        assert!(!chords[0].children[0].flags.contains(ChordFlags::KEEP));
    }

    #[test]
    fn test_ignore_skips_child_entirely() {
        let mut parent = chord("p");
        parent.flags.insert(ChordFlags::KEEP);
        *parent.prop_mut(PropId::Before) = Property::Str("pre".to_string());
        let mut ignored = chord_with_command("a", "x");
        ignored.flags.insert(ChordFlags::IGNORE);
        parent.children = vec![ignored];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        let child = &chords[0].children[0];
        assert!(!child.flags.contains(ChordFlags::KEEP));
        assert!(!child.prop(PropId::Before).has_content());
    }

    #[test]
    fn test_prefix_child_needs_inherit_flag() {
        let mut parent = chord("p");
        parent.flags.insert(ChordFlags::KEEP);

        let mut plain_prefix = chord("q");
        plain_prefix.children = vec![chord_with_command("a", "x")];
        let mut inheriting_prefix = chord("r");
        inheriting_prefix.flags.insert(ChordFlags::INHERIT);
        inheriting_prefix.children = vec![chord_with_command("b", "y")];
        parent.children = vec![plain_prefix, inheriting_prefix];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        assert!(!chords[0].children[0].flags.contains(ChordFlags::KEEP));
        assert!(chords[0].children[1].flags.contains(ChordFlags::KEEP));
        /* grandchildren under the inheriting prefix see KEEP */
        assert!(
            chords[0].children[1].children[0]
                .flags
                .contains(ChordFlags::KEEP)
        );
    }

    #[test]
    fn test_title_inherited_by_prefix_children_only() {
        let mut parent = chord("p");
        *parent.prop_mut(PropId::Title) = Property::Str("Menu".to_string());

        let mut sub_prefix = chord("q");
        sub_prefix.children = vec![chord_with_command("a", "x")];
        parent.children = vec![sub_prefix, chord_with_command("b", "y")];

        let mut chords = vec![parent];
        propagate_inheritance(&mut chords);

        assert_eq!(chords[0].children[0].prop_str(PropId::Title), Some("Menu"));
        assert!(!chords[0].children[1].prop(PropId::Title).has_content());
    }

    #[test]
    fn test_sort_order() {
        let mut chords = vec![
            chord("b"),
            chord("1"),
            chord("B"),
            KeyChord {
                key: Key::special(SpecialKey::Return, Modifiers::NONE),
                ..Default::default()
            },
            chord(";"),
            chord("a"),
            KeyChord {
                key: Key::new("c", Modifiers::CTRL, SpecialKey::None),
                ..Default::default()
            },
        ];
        sort_chords(&mut chords);

        let reprs: Vec<&str> = chords.iter().map(|c| c.key.repr.as_str()).collect();
        assert_eq!(reprs, vec!["RET", "1", "a", "b", "B", "c", ";"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut chords = vec![chord("z"), chord("a"), chord("Z"), chord("0")];
        sort_chords(&mut chords);
        let once = chords.clone();
        sort_chords(&mut chords);
        assert_eq!(once, chords);
    }
}
