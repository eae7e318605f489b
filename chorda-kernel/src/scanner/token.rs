//! Token kinds produced by the scanner.

use chorda_api::SpecialKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /* single characters */
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LessThan,
    GreaterThan,
    Ellipsis,

    /* keys */
    Key,
    SpecialKey,

    /* mods */
    ModCtrl,
    ModMeta,
    ModHyper,
    ModShift,

    /* hooks */
    Before,
    After,
    SyncBefore,
    SyncAfter,

    /* flags */
    Keep,
    Close,
    Inherit,
    Ignore,
    Unhook,
    Deflag,
    NoBefore,
    NoAfter,
    Write,
    Execute,
    SyncCommand,
    Unwrap,
    Title,
    Wrap,
    Args,

    /* literals and their fragments before an interpolation */
    Description,
    Command,
    DescInterp,
    CommInterp,

    /* interpolations */
    ThisKey,
    Index,
    IndexOne,
    ThisDesc,
    ThisDescUpperFirst,
    ThisDescLowerFirst,
    ThisDescUpperAll,
    ThisDescLowerAll,
    UserVar,
    WrapCmdInterp,
    ArgPosition,

    /* meta */
    Goto,

    /* config directives */
    Include,
    Debug,
    Top,
    Bottom,
    BorderWidth,
    BorderRadius,
    BgColor,
    BdColor,
    MaxColumns,
    MenuWidth,
    MenuGap,
    WidthPadding,
    HeightPadding,
    TablePadding,
    Delay,
    KeepDelay,
    Fg,
    FgKey,
    FgDelimiter,
    FgPrefix,
    FgChord,
    FgTitle,
    FgGoto,
    Font,
    TitleFont,
    Shell,
    ImplicitKeys,
    WrapDirective,
    Sort,
    Var,

    /* directive argument values */
    Integer,
    UnsignedInteger,
    Double,

    /* control */
    #[default]
    Empty,
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_mod(self) -> bool {
        matches!(
            self,
            TokenKind::ModCtrl | TokenKind::ModMeta | TokenKind::ModHyper | TokenKind::ModShift
        )
    }

    pub fn is_interpolation(self) -> bool {
        matches!(
            self,
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
        )
    }

    /// Human-readable name for diagnostics.
    pub fn literal(self) -> &'static str {
        match self {
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LessThan => "'<'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Key => "key",
            TokenKind::SpecialKey => "special key",
            TokenKind::ModCtrl => "'C-'",
            TokenKind::ModMeta => "'M-'",
            TokenKind::ModHyper => "'H-'",
            TokenKind::ModShift => "'S-'",
            TokenKind::Before => "'^before'",
            TokenKind::After => "'^after'",
            TokenKind::SyncBefore => "'^sync-before'",
            TokenKind::SyncAfter => "'^sync-after'",
            TokenKind::Keep => "'+keep'",
            TokenKind::Close => "'+close'",
            TokenKind::Inherit => "'+inherit'",
            TokenKind::Ignore => "'+ignore'",
            TokenKind::Unhook => "'+unhook'",
            TokenKind::Deflag => "'+deflag'",
            TokenKind::NoBefore => "'+no-before'",
            TokenKind::NoAfter => "'+no-after'",
            TokenKind::Write => "'+write'",
            TokenKind::Execute => "'+execute'",
            TokenKind::SyncCommand => "'+sync-command'",
            TokenKind::Unwrap => "'+unwrap'",
            TokenKind::Title => "'+title'",
            TokenKind::Wrap => "'+wrap'",
            TokenKind::Args => "'+args'",
            TokenKind::Description => "description",
            TokenKind::Command => "command",
            TokenKind::DescInterp => "description fragment",
            TokenKind::CommInterp => "command fragment",
            TokenKind::ThisKey => "'%(key)'",
            TokenKind::Index => "'%(index)'",
            TokenKind::IndexOne => "'%(index+1)'",
            TokenKind::ThisDesc => "'%(desc)'",
            TokenKind::ThisDescUpperFirst => "'%(desc^)'",
            TokenKind::ThisDescLowerFirst => "'%(desc,)'",
            TokenKind::ThisDescUpperAll => "'%(desc^^)'",
            TokenKind::ThisDescLowerAll => "'%(desc,,)'",
            TokenKind::UserVar => "user variable",
            TokenKind::WrapCmdInterp => "'%(wrap)'",
            TokenKind::ArgPosition => "argument position",
            TokenKind::Goto => "'@goto'",
            TokenKind::Include => "':include'",
            TokenKind::Debug => "':debug'",
            TokenKind::Top => "':top'",
            TokenKind::Bottom => "':bottom'",
            TokenKind::BorderWidth => "':border-width'",
            TokenKind::BorderRadius => "':border-radius'",
            TokenKind::BgColor => "':bg-color'",
            TokenKind::BdColor => "':bd-color'",
            TokenKind::MaxColumns => "':max-columns'",
            TokenKind::MenuWidth => "':menu-width'",
            TokenKind::MenuGap => "':menu-gap'",
            TokenKind::WidthPadding => "':width-padding'",
            TokenKind::HeightPadding => "':height-padding'",
            TokenKind::TablePadding => "':table-padding'",
            TokenKind::Delay => "':delay'",
            TokenKind::KeepDelay => "':keep-delay'",
            TokenKind::Fg => "':fg'",
            TokenKind::FgKey => "':fg-key'",
            TokenKind::FgDelimiter => "':fg-delimiter'",
            TokenKind::FgPrefix => "':fg-prefix'",
            TokenKind::FgChord => "':fg-chord'",
            TokenKind::FgTitle => "':fg-title'",
            TokenKind::FgGoto => "':fg-goto'",
            TokenKind::Font => "':font'",
            TokenKind::TitleFont => "':title-font'",
            TokenKind::Shell => "':shell'",
            TokenKind::ImplicitKeys => "':implicit-keys'",
            TokenKind::WrapDirective => "':wrap'",
            TokenKind::Sort => "':sort'",
            TokenKind::Var => "':var'",
            TokenKind::Integer => "integer",
            TokenKind::UnsignedInteger => "unsigned integer",
            TokenKind::Double => "number",
            TokenKind::Empty => "nothing",
            TokenKind::Error => "error",
            TokenKind::Eof => "EOF",
        }
    }
}

/// One scanned token. Lexemes are owned so the token stream outlives the
/// source buffer it came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    /// Set for `SpecialKey` tokens.
    pub special: SpecialKey,
    /// Set for `Error` tokens.
    pub message: Option<String>,
}

impl Token {
    pub fn eof(line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            line,
            column,
            ..Default::default()
        }
    }
}
