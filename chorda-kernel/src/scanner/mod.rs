//! Stateful scanner - turns source bytes into tokens.
//!
//! The scanner is modal: `"` switches it into description mode, `%{{` into
//! command mode, and `%(…)` / `$N` inside either literal detour through an
//! interpolation mode that remembers which literal to return to.

mod token;

pub use token::{Token, TokenKind};

use chorda_api::{Key, Modifiers, SpecialKey};

pub(crate) fn is_utf8_cont_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

pub(crate) fn is_utf8_multi_byte_start(byte: u8) -> bool {
    byte & 0x80 == 0x80 && byte & 0xC0 != 0x80
}

/// Format a source-located diagnostic the way every user-visible failure
/// message is expected to look.
pub fn diagnostic(filepath: &str, token: &Token, message: &str) -> String {
    format!("{}:{}:{}: {}", filepath, token.line, token.column, message)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Description,
    Command,
    Interpolation,
    ArgIndex,
}

pub struct Scanner<'src> {
    text: &'src str,
    bytes: &'src [u8],
    filepath: String,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    state: State,
    previous_state: State,
    interp_kind: TokenKind,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str, filepath: impl Into<String>) -> Self {
        Self {
            text: source,
            bytes: source.as_bytes(),
            filepath: filepath.into(),
            start: 0,
            current: 0,
            line: 1,
            column: 0,
            start_line: 1,
            start_column: 0,
            state: State::Normal,
            previous_state: State::Normal,
            interp_kind: TokenKind::Empty,
        }
    }

    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.current).copied().unwrap_or(0)
    }

    fn peek_next(&self) -> u8 {
        self.bytes.get(self.current + 1).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let byte = self.peek();
        self.current += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        byte
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    /// Forget the consumed lexeme; the next token starts here.
    fn set_start(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn lexeme(&self) -> &str {
        &self.text[self.start..self.current]
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: self.lexeme().to_string(),
            line: self.start_line,
            column: self.start_column,
            special: SpecialKey::None,
            message: None,
        }
    }

    fn special_token(&self, special: SpecialKey) -> Token {
        Token {
            special,
            ..self.make_token(TokenKind::SpecialKey)
        }
    }

    fn error_token(&self, message: impl Into<String>) -> Token {
        Token {
            kind: TokenKind::Error,
            lexeme: self.lexeme().to_string(),
            line: self.start_line,
            column: self.start_column,
            special: SpecialKey::None,
            message: Some(message.into()),
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b'\n' | b' ' | b'\r' | b'\t' => {
                    self.advance();
                }
                b'#' => {
                    while !self.is_at_end() && self.peek() != b'\n' {
                        self.advance();
                    }
                }
                _ => {
                    self.set_start();
                    return;
                }
            }
            if self.is_at_end() {
                self.set_start();
                return;
            }
        }
    }

    /// Advance to the next whitespace byte; false when EOF got there first.
    fn seek_to_whitespace(&mut self) -> bool {
        while !self.is_at_end() && !self.peek().is_ascii_whitespace() {
            self.advance();
        }
        !self.is_at_end()
    }

    /// The main entry point for the compiler.
    pub fn scan_token(&mut self) -> Token {
        match self.state {
            State::Command => return self.scan_command(true),
            State::Description => return self.scan_description(true),
            State::Interpolation => return self.scan_interpolation(),
            State::ArgIndex => return self.scan_arg_index(),
            State::Normal => {}
        }

        self.skip_whitespace();
        if self.is_at_end() {
            return Token::eof(self.line, self.column);
        }

        let c = self.advance();
        match c {
            b'[' => self.make_token(TokenKind::LeftBracket),
            b']' => self.make_token(TokenKind::RightBracket),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'<' => self.make_token(TokenKind::LessThan),
            b'>' => self.make_token(TokenKind::GreaterThan),

            b'^' => {
                self.set_start();
                self.scan_hook()
            }
            b'+' => {
                self.set_start();
                self.scan_flag()
            }
            b':' => {
                self.set_start();
                self.scan_directive()
            }
            b'@' => {
                self.set_start();
                self.scan_meta()
            }

            b'"' => {
                self.set_start();
                self.scan_description(true)
            }
            b'%' => {
                if self.peek() != b'{' {
                    return self.scan_key(c);
                }
                self.advance();
                if !self.match_byte(b'{') {
                    return self.error_token(
                        "Expected '{' after '%{'. '{' must be escaped if it is meant to be a key.",
                    );
                }
                self.state = State::Command;
                self.set_start();
                self.scan_command(true)
            }
            b'\\' => {
                self.set_start();
                let escaped = self.advance();
                self.scan_key_bytes(escaped, false)
            }

            b'.' => {
                if self.peek() == b'.' && self.peek_next() == b'.' {
                    self.advance();
                    self.advance();
                    return self.make_token(TokenKind::Ellipsis);
                }
                self.scan_key(c)
            }

            b'C' | b'H' | b'M' | b'S' => {
                if self.match_byte(b'-') {
                    return self.make_token(match c {
                        b'C' => TokenKind::ModCtrl,
                        b'H' => TokenKind::ModHyper,
                        b'M' => TokenKind::ModMeta,
                        _ => TokenKind::ModShift,
                    });
                }
                self.scan_key(c)
            }

            _ => self.scan_key(c),
        }
    }

    fn scan_key(&mut self, first: u8) -> Token {
        self.scan_key_bytes(first, true)
    }

    /// Scan a single key. `first` has already been consumed. Multi-byte
    /// UTF-8 sequences are taken whole; a plain ASCII byte may instead begin
    /// a named special key, which is probed by seeking to whitespace.
    fn scan_key_bytes(&mut self, first: u8, try_special: bool) -> Token {
        if is_utf8_multi_byte_start(first) {
            while is_utf8_cont_byte(self.peek()) {
                self.advance();
            }
        } else if try_special {
            let save = (self.current, self.line, self.column);
            self.seek_to_whitespace();
            if let Some(special) = SpecialKey::from_repr(self.lexeme()) {
                return self.special_token(special);
            }
            (self.current, self.line, self.column) = save;
        }

        self.make_token(TokenKind::Key)
    }

    fn scan_hook(&mut self) -> Token {
        if !self.seek_to_whitespace() {
            return self.error_token("Got end of file while scanning hook keyword.");
        }

        let kind = match self.lexeme() {
            "before" => TokenKind::Before,
            "after" => TokenKind::After,
            "sync-before" => TokenKind::SyncBefore,
            "sync-after" => TokenKind::SyncAfter,
            _ => return self.error_token("Got unexpected hook keyword."),
        };
        self.make_token(kind)
    }

    fn scan_flag(&mut self) -> Token {
        if !self.seek_to_whitespace() {
            return self.error_token("Got end of file while scanning flag keyword.");
        }

        let kind = match self.lexeme() {
            "keep" => TokenKind::Keep,
            "close" => TokenKind::Close,
            "inherit" => TokenKind::Inherit,
            "ignore" => TokenKind::Ignore,
            "unhook" => TokenKind::Unhook,
            "deflag" => TokenKind::Deflag,
            "no-before" => TokenKind::NoBefore,
            "no-after" => TokenKind::NoAfter,
            "write" => TokenKind::Write,
            "execute" => TokenKind::Execute,
            "sync-command" => TokenKind::SyncCommand,
            "unwrap" => TokenKind::Unwrap,
            "title" => TokenKind::Title,
            "wrap" => TokenKind::Wrap,
            "args" => TokenKind::Args,
            _ => return self.error_token("Got unexpected flag keyword."),
        };
        self.make_token(kind)
    }

    fn scan_directive(&mut self) -> Token {
        /* Not an error at EOF; a directive may be the last thing in a file. */
        self.seek_to_whitespace();

        let kind = match self.lexeme() {
            "include" => TokenKind::Include,
            "debug" => TokenKind::Debug,
            "top" => TokenKind::Top,
            "bottom" => TokenKind::Bottom,
            "border-width" => TokenKind::BorderWidth,
            "border-radius" => TokenKind::BorderRadius,
            "bg-color" => TokenKind::BgColor,
            "bd-color" => TokenKind::BdColor,
            "max-columns" => TokenKind::MaxColumns,
            "menu-width" => TokenKind::MenuWidth,
            "menu-gap" => TokenKind::MenuGap,
            "width-padding" => TokenKind::WidthPadding,
            "height-padding" => TokenKind::HeightPadding,
            "table-padding" => TokenKind::TablePadding,
            "delay" => TokenKind::Delay,
            "keep-delay" => TokenKind::KeepDelay,
            "fg" => TokenKind::Fg,
            "fg-key" => TokenKind::FgKey,
            "fg-delimiter" => TokenKind::FgDelimiter,
            "fg-prefix" => TokenKind::FgPrefix,
            "fg-chord" => TokenKind::FgChord,
            "fg-title" => TokenKind::FgTitle,
            "fg-goto" => TokenKind::FgGoto,
            "font" => TokenKind::Font,
            "title-font" => TokenKind::TitleFont,
            "shell" => TokenKind::Shell,
            "implicit-keys" => TokenKind::ImplicitKeys,
            "wrap" => TokenKind::WrapDirective,
            "sort" => TokenKind::Sort,
            "var" => TokenKind::Var,
            _ => return self.error_token("Got unexpected preprocessor command."),
        };
        self.make_token(kind)
    }

    fn scan_meta(&mut self) -> Token {
        self.seek_to_whitespace();

        match self.lexeme() {
            "goto" => self.make_token(TokenKind::Goto),
            _ => self.error_token("Got unexpected meta keyword."),
        }
    }

    /// Peek past `%(` for the interpolation keyword; `None` when the form
    /// never closes and should be treated as literal text.
    fn interpolation_kind(&self) -> Option<TokenKind> {
        debug_assert!(self.peek() == b'%' && self.peek_next() == b'(');

        let ident_start = self.current + 2;
        let close = self.bytes[ident_start..]
            .iter()
            .position(|&byte| byte == b')')?;
        let ident = &self.text[ident_start..ident_start + close];

        Some(match ident {
            "key" => TokenKind::ThisKey,
            "index" => TokenKind::Index,
            "index+1" => TokenKind::IndexOne,
            "desc" => TokenKind::ThisDesc,
            "desc^" => TokenKind::ThisDescUpperFirst,
            "desc," => TokenKind::ThisDescLowerFirst,
            "desc^^" => TokenKind::ThisDescUpperAll,
            "desc,," => TokenKind::ThisDescLowerAll,
            "wrap" => TokenKind::WrapCmdInterp,
            _ => TokenKind::UserVar,
        })
    }

    fn enter_interpolation(&mut self, from: State, kind: TokenKind) -> Token {
        self.previous_state = from;
        self.state = State::Interpolation;
        self.interp_kind = kind;

        let fragment = self.make_token(match from {
            State::Description => TokenKind::DescInterp,
            _ => TokenKind::CommInterp,
        });
        self.advance(); /* % */
        self.advance(); /* ( */
        self.set_start();
        fragment
    }

    fn enter_arg_index(&mut self, from: State) -> Token {
        self.previous_state = from;
        self.state = State::ArgIndex;

        let fragment = self.make_token(match from {
            State::Description => TokenKind::DescInterp,
            _ => TokenKind::CommInterp,
        });
        self.advance(); /* $ */
        self.set_start();
        fragment
    }

    fn scan_description(&mut self, allow_interpolation: bool) -> Token {
        while !self.is_at_end() {
            match self.peek() {
                b'"' => {
                    let token = self.make_token(TokenKind::Description);
                    self.advance();
                    self.state = State::Normal;
                    return token;
                }
                b'%' if allow_interpolation && self.peek_next() == b'(' => {
                    match self.interpolation_kind() {
                        Some(
                            TokenKind::ThisDesc
                            | TokenKind::ThisDescUpperFirst
                            | TokenKind::ThisDescLowerFirst
                            | TokenKind::ThisDescUpperAll
                            | TokenKind::ThisDescLowerAll,
                        ) => {
                            self.state = State::Normal;
                            return self.error_token(
                                "Cannot interpolate the description within the description.",
                            );
                        }
                        Some(kind) => return self.enter_interpolation(State::Description, kind),
                        None => {}
                    }
                }
                b'$' if allow_interpolation && self.peek_next().is_ascii_digit() => {
                    return self.enter_arg_index(State::Description);
                }
                b'\\' if self.peek_next() == b'"' => {
                    self.advance();
                }
                _ => {}
            }
            self.advance();
        }

        self.state = State::Normal;
        self.error_token("Unterminated string")
    }

    fn scan_command(&mut self, allow_interpolation: bool) -> Token {
        let mut depth = 0usize;

        while !self.is_at_end() {
            match self.peek() {
                b'{' => depth += 1,
                b'}' => {
                    if depth > 0 {
                        depth -= 1;
                    } else if self.peek_next() == b'}' {
                        let token = self.make_token(TokenKind::Command);
                        self.advance();
                        self.advance();
                        self.state = State::Normal;
                        return token;
                    }
                }
                b'%' if allow_interpolation && self.peek_next() == b'(' => {
                    if let Some(kind) = self.interpolation_kind() {
                        return self.enter_interpolation(State::Command, kind);
                    }
                }
                b'$' if allow_interpolation && self.peek_next().is_ascii_digit() => {
                    return self.enter_arg_index(State::Command);
                }
                _ => {}
            }
            self.advance();
        }

        self.state = State::Normal;
        self.error_token("Expected '}}' but got end of file")
    }

    fn scan_interpolation(&mut self) -> Token {
        while !self.is_at_end() && self.peek() != b')' {
            self.advance();
        }
        if self.is_at_end() {
            self.state = State::Normal;
            return self.error_token("Unterminated interpolation, expected ')'.");
        }

        self.state = self.previous_state;

        let token = if self.interp_kind == TokenKind::Empty {
            self.error_token("Internal error. Got invalid interpolation type.")
        } else {
            self.make_token(self.interp_kind)
        };
        self.interp_kind = TokenKind::Empty;

        self.advance(); /* ) */
        self.set_start();
        token
    }

    fn scan_arg_index(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        self.state = self.previous_state;

        let token = self.make_token(TokenKind::ArgPosition);
        self.set_start();
        token
    }

    /* Typed argument scanning, driven by the parser after a directive. */

    pub fn scan_unsigned(&mut self) -> Token {
        self.skip_whitespace();
        if !self.peek().is_ascii_digit() {
            self.seek_to_whitespace();
            return self.error_token("Expected an unsigned number.");
        }
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        self.make_token(TokenKind::UnsignedInteger)
    }

    pub fn scan_integer(&mut self) -> Token {
        self.skip_whitespace();
        self.match_byte(b'-');
        if !self.peek().is_ascii_digit() {
            self.seek_to_whitespace();
            return self.error_token("Expected a number.");
        }
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        self.make_token(TokenKind::Integer)
    }

    pub fn scan_double(&mut self) -> Token {
        self.skip_whitespace();
        self.match_byte(b'-');
        if !self.peek().is_ascii_digit() {
            self.seek_to_whitespace();
            return self.error_token("Expected a number.");
        }
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.make_token(TokenKind::Double)
    }

    /// A `"…"` literal with interpolation disabled, for directive arguments.
    pub fn scan_quoted(&mut self) -> Token {
        self.skip_whitespace();
        if !self.match_byte(b'"') {
            self.seek_to_whitespace();
            return self.error_token("Expected '\"' for directive argument.");
        }
        self.set_start();
        self.scan_description(false)
    }
}

/// Parse a whitespace-separated key sequence such as a `--press` argument,
/// a `@goto` path, or the implicit-keys string.
pub fn scan_key_sequence(source: &str) -> Result<Vec<Key>, String> {
    let mut scanner = Scanner::new(source, "KEYS");
    let mut keys = Vec::new();
    let mut mods = Modifiers::NONE;

    loop {
        let token = scanner.scan_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::ModCtrl => mods.insert(Modifiers::CTRL),
            TokenKind::ModMeta => mods.insert(Modifiers::META),
            TokenKind::ModHyper => mods.insert(Modifiers::HYPER),
            TokenKind::ModShift => mods.insert(Modifiers::SHIFT),
            TokenKind::Key => {
                keys.push(Key::new(token.lexeme, mods, SpecialKey::None));
                mods = Modifiers::NONE;
            }
            TokenKind::SpecialKey => {
                keys.push(Key::special(token.special, mods));
                mods = Modifiers::NONE;
            }
            TokenKind::Error => {
                return Err(token.message.unwrap_or_else(|| "invalid key".to_string()));
            }
            kind => {
                return Err(format!(
                    "Key does not appear to be a regular key or a special key: {}.",
                    kind.literal()
                ));
            }
        }
    }

    if !mods.is_empty() {
        return Err("Key sequence ends with a dangling modifier.".to_string());
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source, "test");
        let mut result = Vec::new();
        loop {
            let token = scanner.scan_token();
            let kind = token.kind;
            result.push(kind);
            if kind == TokenKind::Eof || kind == TokenKind::Error {
                break;
            }
        }
        result
    }

    fn tokens(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source, "test");
        let mut result = Vec::new();
        loop {
            let token = scanner.scan_token();
            let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error);
            result.push(token);
            if done {
                break;
            }
        }
        result
    }

    #[test]
    fn test_simple_chord_stream() {
        assert_eq!(
            kinds("a \"desc\" %{{cmd}}"),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_modifier_needs_dash() {
        assert_eq!(
            kinds("C-M-x \"d\" %{{c}}"),
            vec![
                TokenKind::ModCtrl,
                TokenKind::ModMeta,
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
        /* 'C' with no dash is a plain key */
        assert_eq!(kinds("C")[0], TokenKind::Key);
    }

    #[test]
    fn test_special_key() {
        let stream = tokens("RET \"enter\" %{{x}}");
        assert_eq!(stream[0].kind, TokenKind::SpecialKey);
        assert_eq!(stream[0].special, SpecialKey::Return);
        assert_eq!(stream[0].lexeme, "RET");
    }

    #[test]
    fn test_escaped_key() {
        let stream = tokens("\\{ \"open brace\" %{{x}}");
        assert_eq!(stream[0].kind, TokenKind::Key);
        assert_eq!(stream[0].lexeme, "{");
    }

    #[test]
    fn test_utf8_key() {
        let stream = tokens("é \"accent\" %{{x}}");
        assert_eq!(stream[0].kind, TokenKind::Key);
        assert_eq!(stream[0].lexeme, "é");
    }

    #[test]
    fn test_comments_and_whitespace() {
        assert_eq!(
            kinds("# a comment\n  a \"d\" %{{c}} # trailing\n"),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_description_escape() {
        let stream = tokens("a \"say \\\"hi\\\"\" %{{x}}");
        assert_eq!(stream[1].kind, TokenKind::Description);
        assert_eq!(stream[1].lexeme, "say \\\"hi\\\"");
    }

    #[test]
    fn test_unterminated_description() {
        let stream = tokens("a \"never closed");
        let last = stream.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.message.as_deref(), Some("Unterminated string"));
    }

    #[test]
    fn test_command_keeps_balanced_braces() {
        let stream = tokens("a \"d\" %{{for f in *; do { echo $f; }; done}}");
        let command = &stream[2];
        assert_eq!(command.kind, TokenKind::Command);
        assert!(command.lexeme.contains("{ echo $f; }"));
    }

    #[test]
    fn test_unterminated_command() {
        let stream = tokens("a \"d\" %{{echo hi");
        let last = stream.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error);
    }

    #[test]
    fn test_command_interpolations() {
        assert_eq!(
            kinds("a \"d\" %{{echo %(key) %(index+1) %(desc^^)}}"),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::CommInterp,
                TokenKind::ThisKey,
                TokenKind::CommInterp,
                TokenKind::IndexOne,
                TokenKind::CommInterp,
                TokenKind::ThisDescUpperAll,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_user_var_interpolation() {
        let stream = tokens("a \"d\" %{{%(browser) --new}}");
        assert_eq!(stream[3].kind, TokenKind::UserVar);
        assert_eq!(stream[3].lexeme, "browser");
    }

    #[test]
    fn test_desc_interp_in_description_errors() {
        let stream = tokens("a \"before %(desc) after\"");
        let last = stream.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(
            last.message.as_deref(),
            Some("Cannot interpolate the description within the description.")
        );
    }

    #[test]
    fn test_key_interp_in_description_is_fine() {
        assert_eq!(
            kinds("a \"press %(key)\" %{{x}}"),
            vec![
                TokenKind::Key,
                TokenKind::DescInterp,
                TokenKind::ThisKey,
                TokenKind::Description,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_percent_without_paren_is_literal() {
        let stream = tokens("a \"50% done\" %{{x}}");
        assert_eq!(stream[1].kind, TokenKind::Description);
        assert_eq!(stream[1].lexeme, "50% done");
    }

    #[test]
    fn test_arg_position_token() {
        assert_eq!(
            kinds("a \"d\" %{{open $0 --flag}}"),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::CommInterp,
                TokenKind::ArgPosition,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_hooks_and_flags() {
        assert_eq!(
            kinds("a \"d\" ^sync-before %{{pre}} +keep +write %{{c}}"),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::SyncBefore,
                TokenKind::Command,
                TokenKind::Keep,
                TokenKind::Write,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unknown_flag_errors() {
        let stream = tokens("a \"d\" +bogus %{{c}}");
        assert!(stream.iter().any(|t| t.kind == TokenKind::Error));
    }

    #[test]
    fn test_option_group_tokens() {
        assert_eq!(
            kinds("<a ... b> \"d\" %{{c}}"),
            vec![
                TokenKind::LessThan,
                TokenKind::Key,
                TokenKind::Ellipsis,
                TokenKind::Key,
                TokenKind::GreaterThan,
                TokenKind::Description,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_goto_meta() {
        assert_eq!(
            kinds("g \"jump\" @goto \"p\""),
            vec![
                TokenKind::Key,
                TokenKind::Description,
                TokenKind::Goto,
                TokenKind::Description,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_directives() {
        assert_eq!(kinds(":debug")[0], TokenKind::Debug);
        assert_eq!(kinds(":sort")[0], TokenKind::Sort);
        assert_eq!(kinds(":fg-goto")[0], TokenKind::FgGoto);
        assert_eq!(kinds(":bogus")[0], TokenKind::Error);
    }

    #[test]
    fn test_typed_argument_scans() {
        let mut scanner = Scanner::new(" 42 -7 2.5 \"text\"", "test");
        assert_eq!(scanner.scan_unsigned().lexeme, "42");
        assert_eq!(scanner.scan_integer().lexeme, "-7");
        assert_eq!(scanner.scan_double().lexeme, "2.5");
        assert_eq!(scanner.scan_quoted().lexeme, "text");
    }

    #[test]
    fn test_scan_key_sequence() {
        let keys = scan_key_sequence("C-a RET b").unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].repr, "a");
        assert!(keys[0].mods.contains(Modifiers::CTRL));
        assert_eq!(keys[1].special, SpecialKey::Return);
        assert_eq!(keys[2].repr, "b");
        assert!(keys[2].mods.is_empty());
    }

    #[test]
    fn test_scan_key_sequence_rejects_dangling_mod() {
        assert!(scan_key_sequence("C-").is_err());
    }

    #[test]
    fn test_error_positions() {
        let stream = tokens("a \"d\" %{{x}}\n +bogus");
        let error = stream.last().unwrap();
        assert_eq!(error.kind, TokenKind::Error);
        assert_eq!(error.line, 2);
    }
}
