//! Resolution - collapse token arrays into final property strings,
//! expanding interpolations.

use std::collections::HashMap;

use chorda_api::MenuConfig;
use tracing::{debug, error};

use crate::chord::{KeyChord, PropId, Property};
use crate::error::ChordError;
use crate::scanner::{Token, TokenKind, diagnostic};

struct Resolver<'a> {
    user_vars: &'a HashMap<String, String>,
    wrap_cmd: Option<&'a str>,
    filepath: &'a str,
    diagnostics: Vec<String>,
}

pub fn resolve(
    chords: &mut [KeyChord],
    config: &MenuConfig,
    user_vars: &HashMap<String, String>,
    filepath: &str,
) -> Result<(), ChordError> {
    let mut resolver = Resolver {
        user_vars,
        wrap_cmd: config.wrap_cmd.as_deref(),
        filepath,
        diagnostics: Vec::new(),
    };

    resolver.resolve_span(chords);

    if resolver.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ChordError::Resolve(resolver.diagnostics.join("\n")))
    }
}

impl Resolver<'_> {
    fn resolve_span(&mut self, chords: &mut [KeyChord]) {
        for (index, chord) in chords.iter_mut().enumerate() {
            self.resolve_chord(chord, index);
            self.resolve_span(&mut chord.children);
        }
    }

    /// Resolve every token-array property of one chord. Slots resolve in
    /// declaration order, so the description is a plain string by the time
    /// any `%(desc)` in another slot reads it.
    fn resolve_chord(&mut self, chord: &mut KeyChord, index: usize) {
        for id in PropId::ALL {
            let Property::Tokens(tokens) = chord.prop(id) else {
                continue;
            };

            if tokens.is_empty() {
                *chord.prop_mut(id) = Property::None;
                continue;
            }

            let tokens = tokens.clone();
            let mut result = String::new();
            for token in &tokens {
                self.append_token(&mut result, token, chord, index);
            }
            let trimmed = result.trim_end().to_string();
            *chord.prop_mut(id) = Property::Str(trimmed);
        }
    }

    fn append_token(&mut self, dest: &mut String, token: &Token, chord: &KeyChord, index: usize) {
        match token.kind {
            TokenKind::ThisKey => dest.push_str(&chord.key.repr),
            TokenKind::Index => dest.push_str(&index.to_string()),
            TokenKind::IndexOne => dest.push_str(&(index + 1).to_string()),

            TokenKind::UserVar => match self.user_vars.get(&token.lexeme) {
                Some(value) => dest.push_str(value),
                None => {
                    let message = format!(
                        "Undefined variable '%({})'. Use :var \"{}\" \"value\" to define it.",
                        token.lexeme, token.lexeme
                    );
                    let diag = diagnostic(self.filepath, token, &message);
                    error!("{}", diag);
                    self.diagnostics.push(diag);
                }
            },

            TokenKind::WrapCmdInterp => {
                if let Some(wrap) = self.wrap_cmd.filter(|wrap| !wrap.is_empty()) {
                    dest.push_str(wrap);
                }
            }

            TokenKind::ThisDesc => {
                if let Some(desc) = chord.prop_str(PropId::Description) {
                    dest.push_str(desc);
                }
            }

            TokenKind::ThisDescUpperFirst
            | TokenKind::ThisDescLowerFirst
            | TokenKind::ThisDescUpperAll
            | TokenKind::ThisDescLowerAll => {
                if let Some(desc) = chord.prop_str(PropId::Description) {
                    dest.push_str(&fold_case(desc, token.kind));
                }
            }

            /* the `+title` sentinel: use the description verbatim */
            TokenKind::Empty => {
                if let Some(desc) = chord.prop_str(PropId::Description) {
                    dest.push_str(desc);
                }
            }

            TokenKind::DescInterp | TokenKind::Description => {
                append_unescaped(dest, &token.lexeme);
            }

            TokenKind::CommInterp | TokenKind::Command => dest.push_str(&token.lexeme),

            kind => debug!(
                "skipping unexpected token while resolving property: {}",
                kind.literal()
            ),
        }
    }
}

/// Description fragments drop their escaping backslashes (`\"` becomes `"`).
fn append_unescaped(dest: &mut String, text: &str) {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                dest.push(next);
            }
        } else {
            dest.push(c);
        }
    }
}

fn fold_case(text: &str, kind: TokenKind) -> String {
    match kind {
        TokenKind::ThisDescUpperAll => text.to_uppercase(),
        TokenKind::ThisDescLowerAll => text.to_lowercase(),
        TokenKind::ThisDescUpperFirst | TokenKind::ThisDescLowerFirst => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => {
                    let folded: String = if kind == TokenKind::ThisDescUpperFirst {
                        first.to_uppercase().collect()
                    } else {
                        first.to_lowercase().collect()
                    };
                    folded + chars.as_str()
                }
                None => String::new(),
            }
        }
        _ => text.to_string(),
    }
}
