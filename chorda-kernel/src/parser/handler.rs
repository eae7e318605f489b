//! Per-token-kind parse handlers.

use chorda_api::{Color, ColorRole, Key, MenuPosition, Modifiers, SpecialKey};
use tracing::{debug, warn};

use crate::chord::{ChordFlags, PropId};
use crate::scanner::{Token, TokenKind};

use super::args::ArgEnvironment;
use super::{Expectation, MAX_DEPTH, Parser, PendingPrefix};

impl Parser<'_, '_> {
    /// Dispatch on the current token's kind. `Err` means a diagnostic was
    /// reported and the parse loop should enter panic mode.
    pub(super) fn handle_current(&mut self) -> Result<Expectation, ()> {
        match self.current.kind {
            TokenKind::ModCtrl
            | TokenKind::ModMeta
            | TokenKind::ModHyper
            | TokenKind::ModShift => self.handle_mod(),

            TokenKind::Key | TokenKind::SpecialKey => self.handle_key(),
            TokenKind::LessThan => self.handle_less_than(),
            TokenKind::LeftBracket => self.handle_left_bracket(),

            TokenKind::Description | TokenKind::DescInterp => self.handle_description(),

            TokenKind::Before
            | TokenKind::After
            | TokenKind::SyncBefore
            | TokenKind::SyncAfter => self.handle_hook(),

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
            | TokenKind::Unwrap => self.handle_flag(),

            TokenKind::Title | TokenKind::Wrap => self.handle_flag_with_arg(),
            TokenKind::Args => self.handle_args(),

            TokenKind::Command | TokenKind::CommInterp => self.handle_command(),
            TokenKind::Goto => self.handle_goto(),

            TokenKind::LeftBrace => self.handle_left_brace(),
            TokenKind::RightBrace => self.handle_right_brace(),

            TokenKind::Ellipsis => {
                self.error_at_current("'...' is only valid inside '<...>' or '[...]'.");
                Err(())
            }

            kind if token_is_directive(kind) => self.handle_directive(),

            kind => {
                self.error_at_current(&format!("Unexpected token type: {}.", kind.literal()));
                Err(())
            }
        }
    }

    fn handle_mod(&mut self) -> Result<Expectation, ()> {
        let modifier = match self.current.kind {
            TokenKind::ModCtrl => Modifiers::CTRL,
            TokenKind::ModMeta => Modifiers::META,
            TokenKind::ModHyper => Modifiers::HYPER,
            _ => Modifiers::SHIFT,
        };
        self.chord.key.mods.insert(modifier);

        self.advance();
        Ok(Expectation::MOD
            | Expectation::KEY
            | Expectation::ELLIPSIS
            | Expectation::LESS_THAN
            | Expectation::LBRACKET)
    }

    fn handle_key(&mut self) -> Result<Expectation, ()> {
        if self.current.kind == TokenKind::SpecialKey {
            self.chord.key.special = self.current.special;
            self.chord.key.repr = self.current.special.repr().to_string();
        } else {
            self.chord.key.repr = self.current.lexeme.clone();
        }

        self.advance();
        Ok(Expectation::DESC)
    }

    /// `<a b …>` - resolve to the first alternative not already bound among
    /// the current siblings.
    fn handle_less_than(&mut self) -> Result<Expectation, ()> {
        let mod_prefix = self.chord.key.mods;
        self.chord.key.mods = Modifiers::NONE;

        let mut options: Vec<Key> = Vec::new();
        let mut local_mods = Modifiers::NONE;

        self.advance();
        loop {
            if self.is_at_end() {
                self.error_at_current("Unterminated key options, expected '>'.");
                return Err(());
            }

            match self.current.kind {
                TokenKind::ModCtrl => local_mods.insert(Modifiers::CTRL),
                TokenKind::ModMeta => local_mods.insert(Modifiers::META),
                TokenKind::ModHyper => local_mods.insert(Modifiers::HYPER),
                TokenKind::ModShift => local_mods.insert(Modifiers::SHIFT),

                TokenKind::Key | TokenKind::SpecialKey => {
                    options.push(self.key_from_current(mod_prefix | local_mods));
                    local_mods = Modifiers::NONE;
                }

                TokenKind::Ellipsis => {
                    let merged = mod_prefix | local_mods;
                    options.extend(self.implicit_keys.iter().map(|implicit| Key {
                        repr: implicit.repr.clone(),
                        mods: implicit.mods | merged,
                        special: implicit.special,
                    }));
                    local_mods = Modifiers::NONE;
                }

                TokenKind::GreaterThan => break,

                _ => {
                    self.error_at_current("Unexpected token in key options.");
                    return Err(());
                }
            }
            self.advance();
        }

        if options.is_empty() {
            self.error_at_current("Empty key options '<>'.");
            return Err(());
        }

        let dest = self.dest_stack.last().expect("dest stack never empty");
        let winner = options
            .iter()
            .find(|candidate| !dest.iter().any(|bound| bound.key.is_equal(candidate, false)));

        let Some(winner) = winner else {
            self.error_at_current("All key options are already bound.");
            return Err(());
        };

        self.chord.key = winner.clone();
        self.advance();
        Ok(Expectation::DESC)
    }

    /// `[abc]` - one chord per listed key, all sharing the body that follows.
    fn handle_left_bracket(&mut self) -> Result<Expectation, ()> {
        let mod_prefix = self.chord.key.mods;
        self.chord.key.mods = Modifiers::NONE;

        let mut keys: Vec<Key> = Vec::new();
        let mut local_mods = Modifiers::NONE;

        self.advance();
        loop {
            if self.is_at_end() {
                self.error_at_current("Unterminated chord array, expected ']'.");
                return Err(());
            }

            match self.current.kind {
                TokenKind::ModCtrl => local_mods.insert(Modifiers::CTRL),
                TokenKind::ModMeta => local_mods.insert(Modifiers::META),
                TokenKind::ModHyper => local_mods.insert(Modifiers::HYPER),
                TokenKind::ModShift => local_mods.insert(Modifiers::SHIFT),

                TokenKind::Key | TokenKind::SpecialKey => {
                    keys.push(self.key_from_current(mod_prefix | local_mods));
                    local_mods = Modifiers::NONE;
                }

                TokenKind::Ellipsis => {
                    let merged = mod_prefix | local_mods;
                    keys.extend(self.implicit_keys.iter().map(|implicit| Key {
                        repr: implicit.repr.clone(),
                        mods: implicit.mods | merged,
                        special: implicit.special,
                    }));
                    local_mods = Modifiers::NONE;
                }

                TokenKind::RightBracket => break,

                _ => {
                    self.error_at_current("Unexpected token in chord array.");
                    return Err(());
                }
            }
            self.advance();
        }

        if keys.is_empty() {
            self.error_at_current("Empty chord array '[]'.");
            return Err(());
        }

        self.array_keys = keys;
        self.advance();
        Ok(Expectation::DESC)
    }

    fn key_from_current(&self, mods: Modifiers) -> Key {
        if self.current.kind == TokenKind::SpecialKey {
            Key::special(self.current.special, mods)
        } else {
            Key::new(self.current.lexeme.clone(), mods, SpecialKey::None)
        }
    }

    fn handle_description(&mut self) -> Result<Expectation, ()> {
        let tokens = self.collect_description_tokens(TokenKind::DescInterp)?;
        self.chord
            .prop_mut(PropId::Description)
            .tokens_mut()
            .extend(tokens);
        Ok(Expectation::AFTER_DESC)
    }

    fn handle_hook(&mut self) -> Result<Expectation, ()> {
        if self.chord.prop(PropId::Goto).has_content() {
            self.error_at_current("Cannot mix hooks and @goto.");
            return Err(());
        }

        let (prop_id, flag) = match self.current.kind {
            TokenKind::Before => (PropId::Before, ChordFlags::NONE),
            TokenKind::After => (PropId::After, ChordFlags::NONE),
            TokenKind::SyncBefore => (PropId::Before, ChordFlags::SYNC_BEFORE),
            _ => (PropId::After, ChordFlags::SYNC_AFTER),
        };
        self.chord.flags.insert(flag);

        self.advance();
        let tokens = self.collect_command_tokens()?;
        self.chord.prop_mut(prop_id).tokens_mut().extend(tokens);
        Ok(Expectation::AFTER_HOOK)
    }

    fn handle_flag(&mut self) -> Result<Expectation, ()> {
        let flag = match self.current.kind {
            TokenKind::Keep => ChordFlags::KEEP,
            TokenKind::Close => ChordFlags::CLOSE,
            TokenKind::Inherit => ChordFlags::INHERIT,
            TokenKind::Ignore => ChordFlags::IGNORE,
            TokenKind::Unhook => ChordFlags::UNHOOK,
            TokenKind::Deflag => ChordFlags::DEFLAG,
            TokenKind::NoBefore => ChordFlags::NO_BEFORE,
            TokenKind::NoAfter => ChordFlags::NO_AFTER,
            TokenKind::Write => ChordFlags::WRITE,
            TokenKind::Execute => ChordFlags::EXECUTE,
            TokenKind::SyncCommand => ChordFlags::SYNC_COMMAND,
            _ => ChordFlags::UNWRAP,
        };
        self.chord.flags.insert(flag);

        self.advance();
        Ok(self.after_flag_expectation())
    }

    /// Flags may come before or after the key. Before the key they modify
    /// the chord about to be read; when the sibling list ends instead, the
    /// parser re-attaches them to the previous chord (see
    /// `flush_dangling_flags`).
    fn after_flag_expectation(&self) -> Expectation {
        if self.chord.key.repr.is_empty() && self.array_keys.is_empty() {
            self.next_chord_expectation()
        } else {
            Expectation::AFTER_FLAG
        }
    }

    /// `+title [literal]` / `+wrap [literal]`. A bare `+title` stores a
    /// sentinel meaning "use the description verbatim".
    fn handle_flag_with_arg(&mut self) -> Result<Expectation, ()> {
        self.advance();
        let (prop_id, interp_kind) = match self.previous.kind {
            TokenKind::Title => (PropId::Title, TokenKind::DescInterp),
            _ => (PropId::WrapCmd, TokenKind::CommInterp),
        };

        if matches!(
            self.current.kind,
            TokenKind::Description | TokenKind::DescInterp
        ) {
            let tokens = self.collect_description_tokens(interp_kind)?;
            *self.chord.prop_mut(prop_id).tokens_mut() = tokens;
        } else if prop_id == PropId::Title {
            *self.chord.prop_mut(prop_id).tokens_mut() = vec![Token {
                kind: TokenKind::Empty,
                ..Default::default()
            }];
        }

        Ok(self.after_flag_expectation())
    }

    /// `+args "a" "b" …` - push an argument environment for `$N` lookups.
    fn handle_args(&mut self) -> Result<Expectation, ()> {
        self.advance();

        let mut env = ArgEnvironment::default();
        while matches!(
            self.current.kind,
            TokenKind::Description | TokenKind::DescInterp
        ) {
            let tokens = self.collect_description_tokens(TokenKind::DescInterp)?;
            env.add_arg(tokens);
        }

        if env.is_empty() {
            self.error_at_current("+args requires at least one argument.");
            return Err(());
        }

        self.arg_envs.push(env);
        self.chord_pushed_env = true;
        Ok(self.after_flag_expectation())
    }

    fn handle_command(&mut self) -> Result<Expectation, ()> {
        if self.chord.prop(PropId::Goto).has_content() {
            self.error_at_current("Cannot mix commands and @goto.");
            return Err(());
        }

        let tokens = self.collect_command_tokens()?;
        self.chord
            .prop_mut(PropId::Command)
            .tokens_mut()
            .extend(tokens);

        self.finish_chord();
        Ok(self.next_chord_expectation())
    }

    fn handle_goto(&mut self) -> Result<Expectation, ()> {
        if self.chord.prop(PropId::Before).has_content()
            || self.chord.prop(PropId::After).has_content()
        {
            self.error_at_current("Cannot mix @goto and hooks.");
            return Err(());
        }
        if self.chord.prop(PropId::Command).has_content() {
            self.error_at_current("Cannot mix @goto and commands.");
            return Err(());
        }

        self.advance();
        let tokens = self.collect_description_tokens(TokenKind::DescInterp)?;
        self.chord.prop_mut(PropId::Goto).tokens_mut().extend(tokens);

        self.finish_chord();
        Ok(self.next_chord_expectation())
    }

    fn handle_left_brace(&mut self) -> Result<Expectation, ()> {
        if self.chord.prop(PropId::Goto).has_content() {
            self.error_at_current("Cannot mix prefix and @goto.");
            return Err(());
        }
        if self.depth() >= MAX_DEPTH {
            self.error_at_current(&format!(
                "Prefixes nested deeper than the supported maximum of {MAX_DEPTH}."
            ));
            return Err(());
        }

        let pending = PendingPrefix {
            chord: std::mem::take(&mut self.chord),
            array_keys: std::mem::take(&mut self.array_keys),
            pushed_env: std::mem::replace(&mut self.chord_pushed_env, false),
        };
        self.parent_stack.push(pending);
        self.dest_stack.push(Vec::new());

        self.advance();
        Ok(Expectation::KEY_START | Expectation::RBRACE)
    }

    fn handle_right_brace(&mut self) -> Result<Expectation, ()> {
        self.flush_dangling_flags();

        let Some(pending) = self.parent_stack.pop() else {
            self.error_at_current("Unmatched '}'.");
            return Err(());
        };
        let children = self.dest_stack.pop().expect("dest stack matches parents");

        if children.is_empty() {
            self.error_at_current("A prefix must contain at least one chord.");
            return Err(());
        }

        self.chord = pending.chord;
        self.chord.children = children;
        self.array_keys = pending.array_keys;
        self.chord_pushed_env = pending.pushed_env;
        self.finish_chord();

        self.advance();
        Ok(self.next_chord_expectation())
    }

    /* ---- literal token collection ---- */

    /// Collect DESC / interpolation tokens up to the terminating literal.
    pub(super) fn collect_description_tokens(
        &mut self,
        interp_kind: TokenKind,
    ) -> Result<Vec<Token>, ()> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let token = self.current.clone();
            match token.kind {
                TokenKind::DescInterp
                | TokenKind::ThisKey
                | TokenKind::Index
                | TokenKind::IndexOne
                | TokenKind::UserVar
                | TokenKind::WrapCmdInterp
                | TokenKind::ThisDesc
                | TokenKind::ThisDescUpperFirst
                | TokenKind::ThisDescLowerFirst
                | TokenKind::ThisDescUpperAll
                | TokenKind::ThisDescLowerAll => {
                    tokens.push(token);
                    self.advance();
                }

                TokenKind::ArgPosition => {
                    self.resolve_arg_token(&token, interp_kind, &mut tokens);
                    self.advance();
                }

                TokenKind::Description => {
                    tokens.push(token);
                    self.advance();
                    return Ok(tokens);
                }

                _ => {
                    self.error_at_current("Unexpected token in description.");
                    return Err(());
                }
            }
        }

        self.error_at_current("Unterminated description.");
        Err(())
    }

    /// Collect COMMAND / interpolation tokens up to the terminating literal.
    pub(super) fn collect_command_tokens(&mut self) -> Result<Vec<Token>, ()> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let token = self.current.clone();
            match token.kind {
                TokenKind::CommInterp
                | TokenKind::ThisKey
                | TokenKind::Index
                | TokenKind::IndexOne
                | TokenKind::UserVar
                | TokenKind::WrapCmdInterp
                | TokenKind::ThisDesc
                | TokenKind::ThisDescUpperFirst
                | TokenKind::ThisDescLowerFirst
                | TokenKind::ThisDescUpperAll
                | TokenKind::ThisDescLowerAll => {
                    tokens.push(token);
                    self.advance();
                }

                TokenKind::ArgPosition => {
                    self.resolve_arg_token(&token, TokenKind::CommInterp, &mut tokens);
                    self.advance();
                }

                TokenKind::Command => {
                    tokens.push(token);
                    self.advance();
                    return Ok(tokens);
                }

                _ => {
                    self.error_at_current("Unexpected token in command.");
                    return Err(());
                }
            }
        }

        self.error_at_current("Unterminated command.");
        Err(())
    }

    /// Substitute a `$N` token from the innermost argument environment that
    /// defines position N; undefined positions expand to nothing.
    fn resolve_arg_token(&mut self, token: &Token, interp_kind: TokenKind, dest: &mut Vec<Token>) {
        let index: usize = match token.lexeme.parse() {
            Ok(index) => index,
            Err(_) => {
                debug!("Argument ${} is out of range.", token.lexeme);
                return;
            }
        };

        match self.arg_envs.lookup(index) {
            Some(arg) => {
                for arg_token in arg {
                    let mut converted = arg_token.clone();
                    if converted.kind == TokenKind::DescInterp
                        && interp_kind == TokenKind::CommInterp
                    {
                        converted.kind = TokenKind::CommInterp;
                    }
                    dest.push(converted);
                }
            }
            None => debug!("Argument ${} not defined.", index),
        }
    }

    /* ---- config directives ---- */

    fn handle_directive(&mut self) -> Result<Expectation, ()> {
        match self.current.kind {
            TokenKind::Debug => self.config.debug = true,
            TokenKind::Sort => self.config.sort = true,
            TokenKind::Top => self.config.position = MenuPosition::Top,
            TokenKind::Bottom => self.config.position = MenuPosition::Bottom,

            TokenKind::BorderWidth => self.config.border_width = self.directive_unsigned()?,
            TokenKind::MaxColumns => self.config.max_cols = self.directive_unsigned()?,
            TokenKind::WidthPadding => self.config.width_padding = self.directive_unsigned()?,
            TokenKind::HeightPadding => self.config.height_padding = self.directive_unsigned()?,
            TokenKind::Delay => self.config.delay = self.directive_unsigned()?,
            TokenKind::KeepDelay => self.config.keep_delay = self.directive_unsigned()?,

            TokenKind::MenuWidth => self.config.menu_width = self.directive_integer()?,
            TokenKind::MenuGap => self.config.menu_gap = self.directive_integer()?,
            TokenKind::TablePadding => self.config.table_padding = self.directive_integer()?,

            TokenKind::BorderRadius => self.config.border_radius = self.directive_double()?,

            TokenKind::Fg => {
                /* `:fg` sets every foreground role at once */
                let text = self.directive_quoted()?;
                match Color::parse(&text) {
                    Ok(color) => {
                        for role in [
                            ColorRole::Key,
                            ColorRole::Delimiter,
                            ColorRole::Prefix,
                            ColorRole::Chord,
                            ColorRole::Title,
                            ColorRole::Goto,
                        ] {
                            self.config.colors.set(role, color);
                        }
                    }
                    Err(_) => warn!("Invalid color string '{}'.", text),
                }
            }
            TokenKind::FgKey => self.directive_color(ColorRole::Key)?,
            TokenKind::FgDelimiter => self.directive_color(ColorRole::Delimiter)?,
            TokenKind::FgPrefix => self.directive_color(ColorRole::Prefix)?,
            TokenKind::FgChord => self.directive_color(ColorRole::Chord)?,
            TokenKind::FgTitle => self.directive_color(ColorRole::Title)?,
            TokenKind::FgGoto => self.directive_color(ColorRole::Goto)?,
            TokenKind::BgColor => self.directive_color(ColorRole::Background)?,
            TokenKind::BdColor => self.directive_color(ColorRole::Border)?,

            TokenKind::Font => self.config.font = self.directive_quoted()?,
            TokenKind::TitleFont => self.config.title_font = self.directive_quoted()?,
            TokenKind::Shell => self.config.shell = self.directive_quoted()?,
            TokenKind::WrapDirective => self.config.wrap_cmd = Some(self.directive_quoted()?),
            TokenKind::ImplicitKeys => {
                self.config.implicit_keys = self.directive_quoted()?;
                self.reparse_implicit_keys();
            }

            TokenKind::Var => {
                let name = self.directive_quoted()?;
                let value = self.directive_quoted()?;
                self.user_vars.insert(name, value);
            }

            TokenKind::Include => {
                self.error_at_current("Unexpected ':include'; includes are inlined before parsing.");
                return Err(());
            }

            kind => {
                self.error_at_current(&format!("Unexpected directive: {}.", kind.literal()));
                return Err(());
            }
        }

        self.advance();
        Ok(self.next_chord_expectation())
    }

    fn directive_token(&mut self, token: Token) -> Result<Token, ()> {
        if token.kind == TokenKind::Error {
            let message = token
                .message
                .clone()
                .unwrap_or_else(|| "invalid directive argument".to_string());
            self.error_at(&token, &message);
            return Err(());
        }
        Ok(token)
    }

    fn directive_unsigned(&mut self) -> Result<u32, ()> {
        let token = self.scanner.scan_unsigned();
        let token = self.directive_token(token)?;
        token.lexeme.parse().map_err(|_| {
            self.error_at(
                &token,
                &format!("Could not convert '{}' into a number.", token.lexeme),
            );
        })
    }

    fn directive_integer(&mut self) -> Result<i32, ()> {
        let token = self.scanner.scan_integer();
        let token = self.directive_token(token)?;
        token.lexeme.parse().map_err(|_| {
            self.error_at(
                &token,
                &format!("Could not convert '{}' into a number.", token.lexeme),
            );
        })
    }

    fn directive_double(&mut self) -> Result<f64, ()> {
        let token = self.scanner.scan_double();
        let token = self.directive_token(token)?;
        token.lexeme.parse().map_err(|_| {
            self.error_at(
                &token,
                &format!("Could not convert '{}' into a number.", token.lexeme),
            );
        })
    }

    fn directive_quoted(&mut self) -> Result<String, ()> {
        let token = self.scanner.scan_quoted();
        let token = self.directive_token(token)?;
        Ok(token.lexeme.replace("\\\"", "\""))
    }

    fn directive_color(&mut self, role: ColorRole) -> Result<(), ()> {
        let text = self.directive_quoted()?;
        match Color::parse(&text) {
            Ok(color) => self.config.colors.set(role, color),
            Err(_) => warn!("Invalid color string '{}'.", text),
        }
        Ok(())
    }
}

fn token_is_directive(kind: TokenKind) -> bool {
    super::token_expectation(kind).intersects(Expectation::DIRECTIVE)
}
