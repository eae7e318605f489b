//! Expectation bitset - what token classes may legally come next.

use crate::scanner::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation(u32);

impl Expectation {
    pub const NONE: Expectation = Expectation(0);
    pub const MOD: Expectation = Expectation(1 << 0);
    pub const KEY: Expectation = Expectation(1 << 1);
    pub const DESC: Expectation = Expectation(1 << 2);
    pub const HOOK: Expectation = Expectation(1 << 3);
    pub const FLAG: Expectation = Expectation(1 << 4);
    pub const COMMAND: Expectation = Expectation(1 << 5);
    pub const META: Expectation = Expectation(1 << 6);
    pub const LBRACE: Expectation = Expectation(1 << 7);
    pub const RBRACE: Expectation = Expectation(1 << 8);
    pub const LBRACKET: Expectation = Expectation(1 << 9);
    pub const RBRACKET: Expectation = Expectation(1 << 10);
    pub const LPAREN: Expectation = Expectation(1 << 11);
    pub const RPAREN: Expectation = Expectation(1 << 12);
    pub const ELLIPSIS: Expectation = Expectation(1 << 13);
    pub const LESS_THAN: Expectation = Expectation(1 << 14);
    pub const INTERP: Expectation = Expectation(1 << 15);
    pub const DIRECTIVE: Expectation = Expectation(1 << 16);
    pub const EOF: Expectation = Expectation(1 << 17);

    /// The start of a statement: a chord, a chord array, or a directive.
    /// Flags may precede the key they modify (`+keep a "…" %{{…}}`).
    pub const KEY_START: Expectation = Expectation(
        Self::MOD.0
            | Self::KEY.0
            | Self::ELLIPSIS.0
            | Self::LESS_THAN.0
            | Self::LBRACKET.0
            | Self::FLAG.0
            | Self::DIRECTIVE.0,
    );

    /// What may follow a description, hook, or flag.
    pub const AFTER_DESC: Expectation = Expectation(
        Self::HOOK.0 | Self::FLAG.0 | Self::COMMAND.0 | Self::META.0 | Self::LBRACE.0,
    );
    pub const AFTER_HOOK: Expectation = Self::AFTER_DESC;
    pub const AFTER_FLAG: Expectation = Self::AFTER_DESC;

    pub fn intersects(self, other: Expectation) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for Expectation {
    type Output = Expectation;

    fn bitor(self, rhs: Expectation) -> Expectation {
        Expectation(self.0 | rhs.0)
    }
}

const EXPECT_NAMES: [(Expectation, &str); 18] = [
    (Expectation::MOD, "modifier"),
    (Expectation::KEY, "key"),
    (Expectation::DESC, "description"),
    (Expectation::HOOK, "hook"),
    (Expectation::FLAG, "flag"),
    (Expectation::COMMAND, "command"),
    (Expectation::META, "@goto"),
    (Expectation::LBRACE, "'{'"),
    (Expectation::RBRACE, "'}'"),
    (Expectation::LBRACKET, "'['"),
    (Expectation::RBRACKET, "']'"),
    (Expectation::LPAREN, "'('"),
    (Expectation::RPAREN, "')'"),
    (Expectation::ELLIPSIS, "'...'"),
    (Expectation::LESS_THAN, "'<'"),
    (Expectation::INTERP, "interpolation"),
    (Expectation::DIRECTIVE, "directive"),
    (Expectation::EOF, "EOF"),
];

impl std::fmt::Display for Expectation {
    /// Render as "a, b or c" for composed error messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let matching: Vec<&str> = EXPECT_NAMES
            .iter()
            .filter(|(flag, _)| self.intersects(*flag))
            .map(|(_, name)| *name)
            .collect();

        match matching.as_slice() {
            [] => write!(f, "nothing"),
            [single] => write!(f, "{single}"),
            [head @ .., last] => write!(f, "{} or {}", head.join(", "), last),
        }
    }
}

/// Map a token kind to the expectation class it satisfies.
pub fn token_expectation(kind: TokenKind) -> Expectation {
    match kind {
        TokenKind::ModCtrl | TokenKind::ModMeta | TokenKind::ModHyper | TokenKind::ModShift => {
            Expectation::MOD
        }

        TokenKind::Key | TokenKind::SpecialKey => Expectation::KEY,

        TokenKind::Description | TokenKind::DescInterp => Expectation::DESC,

        TokenKind::Before | TokenKind::After | TokenKind::SyncBefore | TokenKind::SyncAfter => {
            Expectation::HOOK
        }

        TokenKind::Keep
        | TokenKind::Close
        | TokenKind::Inherit
        | TokenKind::Ignore
        | TokenKind::Unhook
        | TokenKind::Deflag
        | TokenKind::NoBefore
        | TokenKind::NoAfter
        | TokenKind::Write
        | TokenKind::Execute
        | TokenKind::SyncCommand
        | TokenKind::Unwrap
        | TokenKind::Title
        | TokenKind::Wrap
        | TokenKind::Args => Expectation::FLAG,

        TokenKind::Command | TokenKind::CommInterp => Expectation::COMMAND,

        TokenKind::Goto => Expectation::META,

        TokenKind::LeftBrace => Expectation::LBRACE,
        TokenKind::RightBrace => Expectation::RBRACE,
        TokenKind::LeftBracket => Expectation::LBRACKET,
        TokenKind::RightBracket => Expectation::RBRACKET,
        TokenKind::LeftParen => Expectation::LPAREN,
        TokenKind::RightParen => Expectation::RPAREN,

        TokenKind::Ellipsis => Expectation::ELLIPSIS,
        TokenKind::LessThan => Expectation::LESS_THAN,
        TokenKind::GreaterThan => Expectation::NONE,

        TokenKind::ThisKey
        | TokenKind::Index
        | TokenKind::IndexOne
        | TokenKind::ThisDesc
        | TokenKind::ThisDescUpperFirst
        | TokenKind::ThisDescLowerFirst
        | TokenKind::ThisDescUpperAll
        | TokenKind::ThisDescLowerAll
        | TokenKind::UserVar
        | TokenKind::WrapCmdInterp
        | TokenKind::ArgPosition => Expectation::INTERP,

        TokenKind::Include
        | TokenKind::Debug
        | TokenKind::Top
        | TokenKind::Bottom
        | TokenKind::BorderWidth
        | TokenKind::BorderRadius
        | TokenKind::BgColor
        | TokenKind::BdColor
        | TokenKind::MaxColumns
        | TokenKind::MenuWidth
        | TokenKind::MenuGap
        | TokenKind::WidthPadding
        | TokenKind::HeightPadding
        | TokenKind::TablePadding
        | TokenKind::Delay
        | TokenKind::KeepDelay
        | TokenKind::Fg
        | TokenKind::FgKey
        | TokenKind::FgDelimiter
        | TokenKind::FgPrefix
        | TokenKind::FgChord
        | TokenKind::FgTitle
        | TokenKind::FgGoto
        | TokenKind::Font
        | TokenKind::TitleFont
        | TokenKind::Shell
        | TokenKind::ImplicitKeys
        | TokenKind::WrapDirective
        | TokenKind::Sort
        | TokenKind::Var => Expectation::DIRECTIVE,

        TokenKind::Eof => Expectation::EOF,

        TokenKind::Integer
        | TokenKind::UnsignedInteger
        | TokenKind::Double
        | TokenKind::Empty
        | TokenKind::Error => Expectation::NONE,
    }
}
