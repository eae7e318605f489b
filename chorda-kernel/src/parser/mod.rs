//! Parser - tokens to a tree of partially-resolved key chords.
//!
//! The parser drives a per-token-kind handler dispatch (see `handler`),
//! checks every token against an [`Expectation`] bitset, and recovers from
//! errors by synchronizing at the next statement boundary.

mod args;
mod expect;
mod handler;

pub use expect::{Expectation, token_expectation};

use std::collections::HashMap;
use std::mem;

use chorda_api::{Key, MenuConfig};
use tracing::{debug, error};

use crate::chord::{KeyChord, Property};
use crate::error::ChordError;
use crate::scanner::{Scanner, Token, TokenKind, diagnostic, scan_key_sequence};

use args::ArgEnvStack;

/// Maximum prefix nesting depth.
pub const MAX_DEPTH: usize = 32;

/// A prefix chord whose body is still being parsed.
struct PendingPrefix {
    chord: KeyChord,
    array_keys: Vec<Key>,
    pushed_env: bool,
}

/// Everything `parse` produces besides side effects on the config.
#[derive(Debug)]
pub struct ParseOutput {
    pub chords: Vec<KeyChord>,
    pub user_vars: HashMap<String, String>,
}

pub struct Parser<'src, 'cfg> {
    scanner: Scanner<'src>,
    current: Token,
    previous: Token,
    /// The chord being filled by handlers.
    chord: KeyChord,
    /// Keys collected from a `[…]` chord array, materialized when the chord
    /// body completes.
    array_keys: Vec<Key>,
    /// Sibling destination vectors; the last entry is where finished chords
    /// are appended, the first entry is the root list.
    dest_stack: Vec<Vec<KeyChord>>,
    parent_stack: Vec<PendingPrefix>,
    expect: Expectation,
    config: &'cfg mut MenuConfig,
    user_vars: HashMap<String, String>,
    implicit_keys: Vec<Key>,
    arg_envs: ArgEnvStack,
    /// Whether the chord under construction pushed a `+args` environment.
    chord_pushed_env: bool,
    had_error: bool,
    panic_mode: bool,
    diagnostics: Vec<String>,
}

impl<'src, 'cfg> Parser<'src, 'cfg> {
    pub fn new(source: &'src str, filepath: &str, config: &'cfg mut MenuConfig) -> Self {
        let mut parser = Self {
            scanner: Scanner::new(source, filepath),
            current: Token::default(),
            previous: Token::default(),
            chord: KeyChord::default(),
            array_keys: Vec::new(),
            dest_stack: vec![Vec::new()],
            parent_stack: Vec::new(),
            expect: Expectation::KEY_START | Expectation::EOF,
            config,
            user_vars: HashMap::new(),
            implicit_keys: Vec::new(),
            arg_envs: ArgEnvStack::default(),
            chord_pushed_env: false,
            had_error: false,
            panic_mode: false,
            diagnostics: Vec::new(),
        };
        parser.reparse_implicit_keys();
        parser
    }

    /// Parse the implicit-keys config string into ready-made keys for `...`.
    fn reparse_implicit_keys(&mut self) {
        match scan_key_sequence(&self.config.implicit_keys) {
            Ok(keys) => self.implicit_keys = keys,
            Err(message) => {
                self.had_error = true;
                let diag = format!("invalid implicit keys: {message}");
                error!("{}", diag);
                self.diagnostics.push(diag);
            }
        }
    }

    pub fn parse(mut self) -> Result<ParseOutput, ChordError> {
        self.advance();
        self.expect = Expectation::KEY_START | Expectation::EOF;

        while !self.is_at_end() {
            if self.panic_mode {
                self.synchronize();
                if self.is_at_end() {
                    break;
                }
            }

            let got = token_expectation(self.current.kind);
            if !got.intersects(self.expect) {
                self.error_unexpected(got);
                continue;
            }

            match self.handle_current() {
                Ok(next) => self.expect = next,
                Err(()) => self.panic_mode = true,
            }
        }

        /* a chord cut off mid-body is an error, not a silent drop */
        if !self.expect.intersects(Expectation::EOF) {
            self.error_unexpected(Expectation::EOF);
        }

        self.flush_dangling_flags();

        if !self.parent_stack.is_empty() {
            self.panic_mode = false;
            self.error_at_current("Expected '}' but got end of file.");
        }

        if self.had_error {
            return Err(ChordError::Parse(self.diagnostics.join("\n")));
        }

        let chords = self.dest_stack.pop().unwrap_or_default();
        Ok(ParseOutput {
            chords,
            user_vars: self.user_vars,
        })
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn depth(&self) -> usize {
        self.parent_stack.len()
    }

    /// Fetch the next token, reporting scanner errors along the way.
    fn advance(&mut self) -> TokenKind {
        self.previous = mem::take(&mut self.current);

        loop {
            self.current = self.scanner.scan_token();
            if self.config.debug {
                debug!(
                    "token {:?} '{}' at {}:{}",
                    self.current.kind, self.current.lexeme, self.current.line, self.current.column
                );
            }
            if self.current.kind != TokenKind::Error {
                break;
            }

            let message = self
                .current
                .message
                .clone()
                .unwrap_or_else(|| "unknown scan error".to_string());
            self.error_at_current(&message);
        }

        self.current.kind
    }

    /// Append the finished chord (or one copy per pending array key) to the
    /// current destination, and retire any `+args` environment it pushed.
    fn finish_chord(&mut self) {
        let chord = mem::take(&mut self.chord);
        let dest = self.dest_stack.last_mut().expect("dest stack never empty");

        if self.array_keys.is_empty() {
            dest.push(chord);
        } else {
            for key in mem::take(&mut self.array_keys) {
                let mut copy = chord.clone();
                copy.key = key;
                dest.push(copy);
            }
        }

        if self.chord_pushed_env {
            self.chord_pushed_env = false;
            if let Some(env) = self.arg_envs.pop() {
                env.warn_unused(self.scanner.filepath());
            }
        }
    }

    /// Flags written after a chord's command, at the end of a sibling list,
    /// belong to that previous chord (`a "hi" %{{cmd}} +write`). When the
    /// list ends while the fresh chord holds nothing but flags, fold them
    /// into the last finished sibling.
    fn flush_dangling_flags(&mut self) {
        let dangling = self.chord.key.repr.is_empty()
            && self.chord.key.special == chorda_api::SpecialKey::None
            && self.array_keys.is_empty()
            && (!self.chord.flags.is_default() || self.chord.props.iter().any(Property::is_set));
        if !dangling {
            return;
        }

        let chord = mem::take(&mut self.chord);
        if let Some(last) = self
            .dest_stack
            .last_mut()
            .and_then(|dest| dest.last_mut())
        {
            last.flags.insert(chord.flags);
            for (slot, prop) in chord.props.into_iter().enumerate() {
                if prop.is_set() && !last.props[slot].is_set() {
                    last.props[slot] = prop;
                }
            }
        }
    }

    fn next_chord_expectation(&self) -> Expectation {
        if self.depth() > 0 {
            Expectation::KEY_START | Expectation::RBRACE
        } else {
            Expectation::KEY_START | Expectation::EOF
        }
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let diag = diagnostic(self.scanner.filepath(), token, message);
        error!("{}", diag);
        self.diagnostics.push(diag);
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current.clone();
        self.error_at(&token, message);
    }

    fn error_unexpected(&mut self, got: Expectation) {
        let message = format!("Expected {} but got {}.", self.expect, got);
        self.error_at_current(&message);
    }

    /// Skip past the offending token, then to the next statement boundary,
    /// resetting the chord under construction.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        self.chord = KeyChord::default();
        self.array_keys.clear();
        self.expect = self.next_chord_expectation();

        if !self.is_at_end() {
            self.advance();
        }

        while !self.is_at_end() {
            self.panic_mode = false;

            let got = token_expectation(self.current.kind);
            if got.intersects(Expectation::KEY_START) {
                return;
            }
            if self.depth() > 0 && got.intersects(Expectation::RBRACE) {
                return;
            }
            self.advance();
        }
        self.panic_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorda_api::{Modifiers, SpecialKey};

    use crate::chord::{ChordFlags, PropId, Property};

    fn parse_source(source: &str) -> Result<ParseOutput, ChordError> {
        let mut config = MenuConfig::default();
        Parser::new(source, "test", &mut config).parse()
    }

    fn parse_ok(source: &str) -> Vec<KeyChord> {
        parse_source(source).expect("expected source to parse").chords
    }

    #[test]
    fn test_single_chord() {
        let chords = parse_ok("a \"Say hi\" %{{echo hi}} +write");
        assert_eq!(chords.len(), 1);
        let chord = &chords[0];
        assert_eq!(chord.key.repr, "a");
        assert!(chord.flags.contains(ChordFlags::WRITE));
        assert!(matches!(chord.prop(PropId::Command), Property::Tokens(_)));
        assert!(chord.children.is_empty());
    }

    #[test]
    fn test_modifiers_accumulate() {
        let chords = parse_ok("C-M-x \"d\" %{{c}}");
        let key = &chords[0].key;
        assert!(key.mods.contains(Modifiers::CTRL));
        assert!(key.mods.contains(Modifiers::META));
        assert!(!key.mods.contains(Modifiers::SHIFT));
    }

    #[test]
    fn test_special_key_chord() {
        let chords = parse_ok("RET \"enter\" %{{c}}");
        assert_eq!(chords[0].key.special, SpecialKey::Return);
        assert_eq!(chords[0].key.repr, "RET");
    }

    #[test]
    fn test_prefix_nesting() {
        let chords = parse_ok("p \"prefix\" { a \"one\" %{{1}} b \"two\" %{{2}} }");
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].children.len(), 2);
        assert_eq!(chords[0].children[1].key.repr, "b");
    }

    #[test]
    fn test_hooks_set_sync_flags() {
        let chords = parse_ok("a \"d\" ^sync-before %{{pre}} ^after %{{post}} %{{c}}");
        let chord = &chords[0];
        assert!(chord.flags.contains(ChordFlags::SYNC_BEFORE));
        assert!(!chord.flags.contains(ChordFlags::SYNC_AFTER));
        assert!(chord.prop(PropId::Before).has_content());
        assert!(chord.prop(PropId::After).has_content());
    }

    #[test]
    fn test_goto_excludes_command() {
        assert!(parse_source("a \"d\" @goto \"p\" %{{c}}").is_err());
        assert!(parse_source("a \"d\" ^before %{{x}} @goto \"p\"").is_err());
    }

    #[test]
    fn test_command_after_goto_rejected() {
        let err = parse_source("a \"d\" %{{c}} b \"e\" @goto \"p\" %{{x}}");
        assert!(err.is_err());
    }

    #[test]
    fn test_expectation_error_message() {
        let err = parse_source("a %{{c}}").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Expected description"), "got: {message}");
    }

    #[test]
    fn test_error_recovery_continues() {
        /* the first chord is broken, the second should still parse, and the
         * overall result is still an error */
        let err = parse_source("a +bogus %{{1}} b \"ok\" %{{2}}");
        assert!(err.is_err());
    }

    #[test]
    fn test_max_depth_enforced() {
        fn nested(depth: usize) -> String {
            let mut source = String::new();
            for _ in 0..depth {
                source.push_str("p \"d\" { ");
            }
            source.push_str("a \"leaf\" %{{c}} ");
            for _ in 0..depth {
                source.push_str("} ");
            }
            source
        }

        assert!(parse_source(&nested(MAX_DEPTH)).is_ok());
        assert!(parse_source(&nested(MAX_DEPTH + 1)).is_err());
    }

    #[test]
    fn test_unterminated_prefix() {
        assert!(parse_source("p \"prefix\" { a \"one\" %{{1}}").is_err());
    }

    #[test]
    fn test_empty_source_parses() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("# only a comment\n").is_empty());
    }

    #[test]
    fn test_option_group_picks_first_unbound() {
        let chords = parse_ok("a \"first\" %{{1}} <a b> \"second\" %{{2}}");
        assert_eq!(chords[1].key.repr, "b");
    }

    #[test]
    fn test_option_group_all_bound_errors() {
        let err = parse_source(
            "a \"first\" %{{1}} b \"second\" %{{2}} <a b> \"third\" %{{3}}",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_option_group_ellipsis_uses_implicit_keys() {
        let mut config = MenuConfig {
            implicit_keys: "asdf".to_string(),
            ..Default::default()
        };
        let source = "<...> \"one\" %{{1}} <...> \"two\" %{{2}}";
        let output = Parser::new(source, "test", &mut config).parse().unwrap();
        assert_eq!(output.chords[0].key.repr, "a");
        assert_eq!(output.chords[1].key.repr, "s");
    }

    #[test]
    fn test_chord_array_expands() {
        let chords = parse_ok("[abc] \"pick\" %{{echo %(key)}}");
        assert_eq!(chords.len(), 3);
        assert_eq!(chords[0].key.repr, "a");
        assert_eq!(chords[2].key.repr, "c");
        for chord in &chords {
            assert!(chord.prop(PropId::Command).has_content());
        }
    }

    #[test]
    fn test_chord_array_with_mods() {
        let chords = parse_ok("C-[ab] \"pick\" %{{c}}");
        assert!(chords[0].key.mods.contains(Modifiers::CTRL));
        assert!(chords[1].key.mods.contains(Modifiers::CTRL));
    }

    #[test]
    fn test_directives_update_config() {
        let mut config = MenuConfig::default();
        let source = ":debug :sort :top :max-columns 3 :menu-gap -2 \
                      :shell \"/bin/zsh\" :fg-key \"#112233\"";
        Parser::new(source, "test", &mut config).parse().unwrap();
        assert!(config.debug);
        assert!(config.sort);
        assert_eq!(config.position, chorda_api::MenuPosition::Top);
        assert_eq!(config.max_cols, 3);
        assert_eq!(config.menu_gap, -2);
        assert_eq!(config.shell, "/bin/zsh");
        assert_eq!(config.colors.key, chorda_api::Color::rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_invalid_color_directive_warns_but_parses() {
        let mut config = MenuConfig::default();
        let source = ":fg-key \"not-a-color\"\na \"d\" %{{c}}";
        let output = Parser::new(source, "test", &mut config).parse().unwrap();
        assert_eq!(output.chords.len(), 1);
        /* default survives */
        assert_eq!(config.colors.key, chorda_api::MenuColors::default().key);
    }

    #[test]
    fn test_var_directive_defines_user_var() {
        let mut config = MenuConfig::default();
        let source = ":var \"term\" \"alacritty\"\na \"d\" %{{%(term)}}";
        let output = Parser::new(source, "test", &mut config).parse().unwrap();
        assert_eq!(output.user_vars.get("term").map(String::as_str), Some("alacritty"));
    }

    #[test]
    fn test_args_substitution_at_parse_time() {
        let chords = parse_ok("a \"d\" +args \"firefox\" %{{$0 --new-tab}}");
        let Property::Tokens(tokens) = chords[0].prop(PropId::Command) else {
            panic!("expected token list");
        };
        assert!(tokens.iter().any(|t| t.lexeme == "firefox"));
    }

    #[test]
    fn test_title_without_argument_stores_sentinel() {
        let chords = parse_ok("p \"prefix\" +title { a \"x\" %{{c}} }");
        let Property::Tokens(tokens) = chords[0].prop(PropId::Title) else {
            panic!("expected token list");
        };
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Empty);
    }

    #[test]
    fn test_title_with_argument() {
        let chords = parse_ok("p \"prefix\" +title \"My menu\" { a \"x\" %{{c}} }");
        let Property::Tokens(tokens) = chords[0].prop(PropId::Title) else {
            panic!("expected token list");
        };
        assert_eq!(tokens.last().unwrap().lexeme, "My menu");
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(parse_source("p \"prefix\" { }").is_err());
    }
}
