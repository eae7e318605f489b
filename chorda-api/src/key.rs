//! Key model - modifiers, special keys, and shift-aware equality.

use std::fmt;

/// Modifier bitset. SHIFT participates in matching only when the keystroke is
/// shift-significant (see [`Key::is_equal`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(1 << 0);
    pub const META: Modifiers = Modifiers(1 << 1);
    pub const HYPER: Modifiers = Modifiers(1 << 2);
    pub const SHIFT: Modifiers = Modifiers(1 << 3);

    pub fn contains(self, test: Modifiers) -> bool {
        self.0 & test.0 != 0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// This modifier set with SHIFT removed.
    pub fn without_shift(self) -> Modifiers {
        Modifiers(self.0 & !Self::SHIFT.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Self::CTRL) {
            write!(f, "C-")?;
        }
        if self.contains(Self::META) {
            write!(f, "M-")?;
        }
        if self.contains(Self::HYPER) {
            write!(f, "H-")?;
        }
        if self.contains(Self::SHIFT) {
            write!(f, "S-")?;
        }
        Ok(())
    }
}

/// Named keys with no printable representation of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[rustfmt::skip]
pub enum SpecialKey {
    #[default]
    None,
    Left, Right, Up, Down,
    Tab, Space, Return, Delete, Escape,
    Home, PageUp, PageDown, End, Begin,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24,
    F25, F26, F27, F28, F29, F30, F31, F32, F33, F34, F35,
    VolDown, VolMute, VolUp,
    Play, Stop, Prev, Next,
}

#[rustfmt::skip]
const SPECIAL_KEYS: &[(SpecialKey, &str)] = &[
    (SpecialKey::Left, "Left"), (SpecialKey::Right, "Right"),
    (SpecialKey::Up, "Up"), (SpecialKey::Down, "Down"),
    (SpecialKey::Tab, "TAB"), (SpecialKey::Space, "SPC"),
    (SpecialKey::Return, "RET"), (SpecialKey::Delete, "DEL"),
    (SpecialKey::Escape, "ESC"), (SpecialKey::Home, "Home"),
    (SpecialKey::PageUp, "PgUp"), (SpecialKey::PageDown, "PgDown"),
    (SpecialKey::End, "End"), (SpecialKey::Begin, "Begin"),
    (SpecialKey::F1, "F1"), (SpecialKey::F2, "F2"), (SpecialKey::F3, "F3"),
    (SpecialKey::F4, "F4"), (SpecialKey::F5, "F5"), (SpecialKey::F6, "F6"),
    (SpecialKey::F7, "F7"), (SpecialKey::F8, "F8"), (SpecialKey::F9, "F9"),
    (SpecialKey::F10, "F10"), (SpecialKey::F11, "F11"), (SpecialKey::F12, "F12"),
    (SpecialKey::F13, "F13"), (SpecialKey::F14, "F14"), (SpecialKey::F15, "F15"),
    (SpecialKey::F16, "F16"), (SpecialKey::F17, "F17"), (SpecialKey::F18, "F18"),
    (SpecialKey::F19, "F19"), (SpecialKey::F20, "F20"), (SpecialKey::F21, "F21"),
    (SpecialKey::F22, "F22"), (SpecialKey::F23, "F23"), (SpecialKey::F24, "F24"),
    (SpecialKey::F25, "F25"), (SpecialKey::F26, "F26"), (SpecialKey::F27, "F27"),
    (SpecialKey::F28, "F28"), (SpecialKey::F29, "F29"), (SpecialKey::F30, "F30"),
    (SpecialKey::F31, "F31"), (SpecialKey::F32, "F32"), (SpecialKey::F33, "F33"),
    (SpecialKey::F34, "F34"), (SpecialKey::F35, "F35"),
    (SpecialKey::VolDown, "VolDown"), (SpecialKey::VolMute, "VolMute"),
    (SpecialKey::VolUp, "VolUp"), (SpecialKey::Play, "Play"),
    (SpecialKey::Stop, "Stop"), (SpecialKey::Prev, "Prev"),
    (SpecialKey::Next, "Next"),
];

impl SpecialKey {
    /// The canonical text form used in source files and menu cells.
    pub fn repr(self) -> &'static str {
        SPECIAL_KEYS
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, repr)| *repr)
            .unwrap_or("NONE")
    }

    /// Look a special key up by its canonical text form.
    pub fn from_repr(repr: &str) -> Option<SpecialKey> {
        SPECIAL_KEYS
            .iter()
            .find(|(_, text)| *text == repr)
            .map(|(key, _)| *key)
    }

    pub fn is_special(self) -> bool {
        self != SpecialKey::None
    }
}

/// A physical key plus modifiers. For a non-special key `repr` holds the
/// printable UTF-8 form; for a special key it holds the canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Key {
    pub repr: String,
    pub mods: Modifiers,
    pub special: SpecialKey,
}

impl Key {
    pub fn new(repr: impl Into<String>, mods: Modifiers, special: SpecialKey) -> Self {
        Self {
            repr: repr.into(),
            mods,
            special,
        }
    }

    /// A special key with its canonical repr.
    pub fn special(special: SpecialKey, mods: Modifiers) -> Self {
        Self {
            repr: special.repr().to_string(),
            mods,
            special,
        }
    }

    fn mods_equal(&self, other: &Key, check_shift: bool) -> bool {
        if check_shift {
            self.mods == other.mods
        } else {
            self.mods.without_shift() == other.mods.without_shift()
        }
    }

    /// Key equality. Special keys always compare their full modifier set.
    /// For printable keys, a shift-significant keystroke already encodes
    /// SHIFT in its repr bytes ('a' vs 'A'), so the SHIFT bit is masked out
    /// of the comparison; when SHIFT did not change the bytes the full
    /// modifier set must match.
    pub fn is_equal(&self, other: &Key, shift_significant: bool) -> bool {
        if self.special.is_special() || other.special.is_special() {
            return self.special == other.special && self.mods_equal(other, true);
        }

        self.mods_equal(other, !shift_significant) && self.repr == other.repr
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mods, self.repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_key_repr_roundtrip() {
        for (key, repr) in SPECIAL_KEYS {
            assert_eq!(SpecialKey::from_repr(repr), Some(*key));
            assert_eq!(key.repr(), *repr);
        }
        assert_eq!(SpecialKey::from_repr("NotAKey"), None);
    }

    #[test]
    fn test_key_equality_reflexive() {
        let keys = [
            Key::new("a", Modifiers::NONE, SpecialKey::None),
            Key::new("a", Modifiers::CTRL | Modifiers::SHIFT, SpecialKey::None),
            Key::special(SpecialKey::Return, Modifiers::META),
        ];
        for key in &keys {
            assert!(key.is_equal(key, true));
            assert!(key.is_equal(key, false));
        }
    }

    #[test]
    fn test_shift_masked_when_significant() {
        /* shift produced a distinct byte, so the bit itself is ignored */
        let bound = Key::new("A", Modifiers::NONE, SpecialKey::None);
        let incoming = Key::new("A", Modifiers::SHIFT, SpecialKey::None);
        assert!(bound.is_equal(&incoming, true));
        /* with insignificant shift the full modifier set must agree */
        assert!(!bound.is_equal(&incoming, false));
    }

    #[test]
    fn test_special_keys_keep_full_modifiers() {
        let plain = Key::special(SpecialKey::Return, Modifiers::NONE);
        let shifted = Key::special(SpecialKey::Return, Modifiers::SHIFT);
        // Shift-insignificance never applies to special keys.
        assert!(!plain.is_equal(&shifted, true));
        assert!(plain.is_equal(&plain.clone(), false));
    }

    #[test]
    fn test_repr_bytes_must_match() {
        let a = Key::new("a", Modifiers::NONE, SpecialKey::None);
        let b = Key::new("b", Modifiers::NONE, SpecialKey::None);
        assert!(!a.is_equal(&b, true));
    }
}
