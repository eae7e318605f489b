//! Key-chord tree - flags, properties, and nodes.

use std::fmt;

use chorda_api::{Color, Key};

use crate::scanner::Token;

/// Execution-semantics flag bits carried by every chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChordFlags(u16);

impl ChordFlags {
    pub const NONE: ChordFlags = ChordFlags(0);
    pub const KEEP: ChordFlags = ChordFlags(1 << 0);
    pub const CLOSE: ChordFlags = ChordFlags(1 << 1);
    pub const INHERIT: ChordFlags = ChordFlags(1 << 2);
    pub const IGNORE: ChordFlags = ChordFlags(1 << 3);
    pub const UNHOOK: ChordFlags = ChordFlags(1 << 4);
    pub const DEFLAG: ChordFlags = ChordFlags(1 << 5);
    pub const NO_BEFORE: ChordFlags = ChordFlags(1 << 6);
    pub const NO_AFTER: ChordFlags = ChordFlags(1 << 7);
    pub const WRITE: ChordFlags = ChordFlags(1 << 8);
    pub const EXECUTE: ChordFlags = ChordFlags(1 << 9);
    pub const SYNC_COMMAND: ChordFlags = ChordFlags(1 << 10);
    pub const SYNC_BEFORE: ChordFlags = ChordFlags(1 << 11);
    pub const SYNC_AFTER: ChordFlags = ChordFlags(1 << 12);
    pub const UNWRAP: ChordFlags = ChordFlags(1 << 13);

    pub fn contains(self, test: ChordFlags) -> bool {
        self.0 & test.0 != 0
    }

    pub fn insert(&mut self, other: ChordFlags) {
        self.0 |= other.0;
    }

    pub fn is_default(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Flag names in bit order, for debug output and the transpiler.
    pub fn names(self) -> Vec<&'static str> {
        const NAMES: [(ChordFlags, &str); 14] = [
            (ChordFlags::KEEP, "KEEP"),
            (ChordFlags::CLOSE, "CLOSE"),
            (ChordFlags::INHERIT, "INHERIT"),
            (ChordFlags::IGNORE, "IGNORE"),
            (ChordFlags::UNHOOK, "UNHOOK"),
            (ChordFlags::DEFLAG, "DEFLAG"),
            (ChordFlags::NO_BEFORE, "NO_BEFORE"),
            (ChordFlags::NO_AFTER, "NO_AFTER"),
            (ChordFlags::WRITE, "WRITE"),
            (ChordFlags::EXECUTE, "EXECUTE"),
            (ChordFlags::SYNC_COMMAND, "SYNC_COMMAND"),
            (ChordFlags::SYNC_BEFORE, "SYNC_BEFORE"),
            (ChordFlags::SYNC_AFTER, "SYNC_AFTER"),
            (ChordFlags::UNWRAP, "UNWRAP"),
        ];
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::ops::BitOr for ChordFlags {
    type Output = ChordFlags;

    fn bitor(self, rhs: ChordFlags) -> ChordFlags {
        ChordFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for ChordFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

/// Property slots owned by every chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropId {
    Description,
    Command,
    Before,
    After,
    WrapCmd,
    Title,
    Goto,
}

impl PropId {
    pub const COUNT: usize = 7;

    /// Slot order. Description comes first so later slots can interpolate
    /// the already-resolved description.
    pub const ALL: [PropId; Self::COUNT] = [
        PropId::Description,
        PropId::Command,
        PropId::Before,
        PropId::After,
        PropId::WrapCmd,
        PropId::Title,
        PropId::Goto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PropId::Description => "description",
            PropId::Command => "command",
            PropId::Before => "before",
            PropId::After => "after",
            PropId::WrapCmd => "wrap_cmd",
            PropId::Title => "title",
            PropId::Goto => "goto",
        }
    }
}

/// A typed property value. Parsing stores literal token runs in `Tokens`;
/// the transformer collapses every slot to `Str` or `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Property {
    #[default]
    None,
    Str(String),
    Int(i32),
    Bool(bool),
    Color(Color),
    Tokens(Vec<Token>),
}

impl Property {
    pub fn is_set(&self) -> bool {
        !matches!(self, Property::None)
    }

    /// Whether the property carries anything worth acting on. An empty
    /// string or an empty token run counts as absent.
    pub fn has_content(&self) -> bool {
        match self {
            Property::None => false,
            Property::Str(s) => !s.is_empty(),
            Property::Tokens(tokens) => !tokens.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn tokens_mut(&mut self) -> &mut Vec<Token> {
        if !matches!(self, Property::Tokens(_)) {
            *self = Property::Tokens(Vec::new());
        }
        match self {
            Property::Tokens(tokens) => tokens,
            _ => unreachable!(),
        }
    }
}

/// One node of the chord tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyChord {
    pub key: Key,
    pub props: [Property; PropId::COUNT],
    pub flags: ChordFlags,
    pub children: Vec<KeyChord>,
}

impl KeyChord {
    pub fn is_prefix(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn prop(&self, id: PropId) -> &Property {
        &self.props[id as usize]
    }

    pub fn prop_mut(&mut self, id: PropId) -> &mut Property {
        &mut self.props[id as usize]
    }

    pub fn prop_str(&self, id: PropId) -> Option<&str> {
        self.prop(id).as_str().filter(|s| !s.is_empty())
    }
}

/// The compiled tree of root chords. Immutable after compilation; the
/// dispatcher borrows it and never mutates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChordTree {
    roots: Vec<KeyChord>,
}

impl ChordTree {
    pub fn new(roots: Vec<KeyChord>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[KeyChord] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of chords in the tree.
    pub fn count(&self) -> usize {
        fn count_span(chords: &[KeyChord]) -> usize {
            chords
                .iter()
                .map(|chord| 1 + count_span(&chord.children))
                .sum()
        }
        count_span(&self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_bit_ops() {
        let mut flags = ChordFlags::NONE;
        assert!(flags.is_default());
        flags.insert(ChordFlags::KEEP);
        flags.insert(ChordFlags::WRITE);
        assert!(flags.contains(ChordFlags::KEEP));
        assert!(!flags.contains(ChordFlags::CLOSE));
        assert_eq!(flags.count(), 2);
        assert_eq!(flags.to_string(), "KEEP|WRITE");
    }

    #[test]
    fn test_property_content() {
        assert!(!Property::None.has_content());
        assert!(!Property::Str(String::new()).has_content());
        assert!(Property::Str("x".to_string()).has_content());
        assert!(!Property::Tokens(Vec::new()).has_content());
        assert!(Property::Bool(false).has_content());
    }

    #[test]
    fn test_tree_count() {
        let leaf = KeyChord::default();
        let prefix = KeyChord {
            children: vec![leaf.clone(), leaf.clone()],
            ..Default::default()
        };
        let tree = ChordTree::new(vec![prefix, leaf]);
        assert_eq!(tree.count(), 4);
    }
}
