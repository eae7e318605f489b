//! The runtime menu - keystroke matching, chord execution, and the
//! rendering contract handed to backends.

use std::io::Write;
use std::time::{Duration, Instant};

use chorda_api::{
    CellRole, Key, MenuCell, MenuConfig, MenuStatus, MenuView, SpecialKey, calculate_grid,
};
use tracing::{debug, error};

use crate::chord::{ChordFlags, ChordTree, KeyChord, PropId};
use crate::error::ChordError;
use crate::scanner::scan_key_sequence;
use crate::spawn::spawn;

/// The interface a windowing backend implements. `async_cleanup` runs inside
/// forked children and must only detach inherited display state.
pub trait MenuBackend {
    fn init(&mut self, menu: &Menu) -> Result<(), ChordError>;
    /// Drive the event loop until the menu exits; returns the exit code.
    fn run(&mut self, menu: &mut Menu) -> Result<i32, ChordError>;
    fn cleanup(&mut self) {}
    fn async_cleanup(&self) {}
}

/// The dispatcher. Borrows the compiled tree and never mutates it; only the
/// cursor into the tree moves.
pub struct Menu<'tree> {
    pub config: MenuConfig,
    tree: &'tree ChordTree,
    active: &'tree [KeyChord],
    title: Option<&'tree str>,
    dirty: bool,
    timer: Instant,
    out: Box<dyn Write>,
    /// Runs inside forked children before exec.
    async_cleanup: Option<Box<dyn Fn()>>,
    /// Releases the keyboard grab before a `+keep` chord executes.
    ungrab: Option<Box<dyn Fn()>>,
}

impl<'tree> Menu<'tree> {
    pub fn new(config: MenuConfig, tree: &'tree ChordTree) -> Self {
        Self {
            config,
            tree,
            active: tree.roots(),
            title: None,
            dirty: true,
            timer: Instant::now(),
            out: Box::new(std::io::stdout()),
            async_cleanup: None,
            ungrab: None,
        }
    }

    /// Redirect `+write` output, e.g. into a buffer for tests.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn set_async_cleanup(&mut self, hook: Box<dyn Fn()>) {
        self.async_cleanup = Some(hook);
    }

    pub fn set_ungrab(&mut self, hook: Box<dyn Fn()>) {
        self.ungrab = Some(hook);
    }

    pub fn active_chords(&self) -> &'tree [KeyChord] {
        self.active
    }

    pub fn title(&self) -> Option<&str> {
        self.title
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Whether the first render is still deferred by the configured delay.
    pub fn is_delayed(&self) -> bool {
        self.timer.elapsed() < Duration::from_millis(u64::from(self.config.delay))
    }

    /// Restart the delay window; called on every non-modifier keystroke.
    pub fn reset_timer(&mut self) {
        self.timer = Instant::now();
    }

    /// Handle one keystroke. `shift_significant` is the backend's verdict on
    /// whether SHIFT changed the decoded bytes of this keystroke; when it
    /// did not, SHIFT is dropped from the incoming modifier set before
    /// matching.
    pub fn handle_keypress(&mut self, key: &Key, shift_significant: bool) -> MenuStatus {
        let mut lookup = key.clone();
        if !shift_significant {
            lookup.mods = lookup.mods.without_shift();
        }

        let active = self.active;
        let matched = active
            .iter()
            .find(|chord| chord.key.is_equal(&lookup, shift_significant));

        let Some(chord) = matched else {
            if key.special == SpecialKey::Escape {
                return MenuStatus::ExitOk;
            }
            debug!(key = %key, "no match for keypress");
            return MenuStatus::ExitSoftware;
        };

        debug!(key = %chord.key, "matched chord");

        if chord.is_prefix() {
            return self.descend(chord);
        }
        if chord.prop(PropId::Goto).is_set() {
            return self.handle_goto(chord);
        }
        self.execute_chord(chord)
    }

    fn descend(&mut self, prefix: &'tree KeyChord) -> MenuStatus {
        self.active = &prefix.children;
        self.title = prefix.prop_str(PropId::Title);
        self.dirty = true;
        MenuStatus::Damaged
    }

    /// A `@goto` chord re-targets the active level: its string is a key
    /// sequence resolved from the root that must land on a prefix. An empty
    /// path returns to the root level.
    fn handle_goto(&mut self, chord: &'tree KeyChord) -> MenuStatus {
        let path = chord.prop_str(PropId::Goto).unwrap_or("");

        let keys = match scan_key_sequence(path) {
            Ok(keys) => keys,
            Err(message) => {
                error!("Invalid @goto path '{}': {}", path, message);
                return MenuStatus::ExitSoftware;
            }
        };

        let mut level = self.tree.roots();
        let mut target: Option<&'tree KeyChord> = None;
        for key in &keys {
            let Some(found) = level.iter().find(|chord| chord.key.is_equal(key, false)) else {
                error!("@goto path '{}' does not match any chord.", path);
                return MenuStatus::ExitSoftware;
            };
            level = &found.children;
            target = Some(found);
        }

        match target {
            Some(found) if found.is_prefix() => self.descend(found),
            Some(_) => {
                error!("@goto path '{}' does not name a prefix.", path);
                MenuStatus::ExitSoftware
            }
            None => {
                self.active = self.tree.roots();
                self.title = None;
                self.dirty = true;
                MenuStatus::Damaged
            }
        }
    }

    /// Run a leaf chord: BEFORE, then the command (written or spawned, with
    /// wrapping), then AFTER. The menu stays open only for `+keep`.
    fn execute_chord(&mut self, chord: &'tree KeyChord) -> MenuStatus {
        let Some(command) = chord.prop_str(PropId::Command) else {
            return MenuStatus::ExitOk;
        };

        let keep = chord.flags.contains(ChordFlags::KEEP);
        if keep && let Some(ungrab) = &self.ungrab {
            ungrab();
            if self.config.keep_delay > 0 {
                /* let the compositor deliver the ungrab before the command
                 * starts reading keys */
                std::thread::sleep(Duration::from_millis(u64::from(self.config.keep_delay)));
            }
        }

        if let Some(before) = chord.prop_str(PropId::Before)
            && !self.spawn_command(before, chord.flags.contains(ChordFlags::SYNC_BEFORE))
        {
            return MenuStatus::ExitSoftware;
        }

        if chord.flags.contains(ChordFlags::WRITE) {
            if let Err(err) = writeln!(self.out, "{command}") {
                error!("could not write command: {err}");
                return MenuStatus::ExitSoftware;
            }
        } else {
            let effective = self.effective_command(chord, command);
            if !self.spawn_command(&effective, chord.flags.contains(ChordFlags::SYNC_COMMAND)) {
                return MenuStatus::ExitSoftware;
            }
        }

        if let Some(after) = chord.prop_str(PropId::After)
            && !self.spawn_command(after, chord.flags.contains(ChordFlags::SYNC_AFTER))
        {
            return MenuStatus::ExitSoftware;
        }

        if keep {
            MenuStatus::Running
        } else {
            MenuStatus::ExitOk
        }
    }

    /// The command string actually handed to the shell: the chord's own wrap
    /// prefix wins over the global one, and `+unwrap` suppresses both.
    pub fn effective_command(&self, chord: &KeyChord, command: &str) -> String {
        if chord.flags.contains(ChordFlags::UNWRAP) {
            return command.to_string();
        }

        let wrap = chord
            .prop_str(PropId::WrapCmd)
            .or(self.config.wrap_cmd.as_deref())
            .filter(|wrap| !wrap.is_empty());

        match wrap {
            Some(wrap) => format!("{wrap} {command}"),
            None => command.to_string(),
        }
    }

    fn spawn_command(&self, cmd: &str, sync: bool) -> bool {
        match spawn(
            &self.config.shell,
            cmd,
            sync,
            self.async_cleanup.as_deref(),
        ) {
            Ok(status) => !status.is_error(),
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    /// Pre-press a key sequence (the `--press` flag). Reaching a leaf with
    /// keys left over is a failure.
    pub fn press_keys(&mut self, keys: &str) -> MenuStatus {
        let parsed = match scan_key_sequence(keys) {
            Ok(parsed) => parsed,
            Err(message) => {
                error!("Invalid key sequence '{}': {}", keys, message);
                return MenuStatus::ExitSoftware;
            }
        };

        let mut status = MenuStatus::Running;
        for (i, key) in parsed.iter().enumerate() {
            status = self.handle_keypress(key, true);
            match status {
                MenuStatus::Running | MenuStatus::Damaged => {}
                MenuStatus::ExitOk => {
                    if i + 1 < parsed.len() {
                        error!("Reached the end of chords but not the end of keys: '{keys}'.");
                        return MenuStatus::ExitSoftware;
                    }
                    return status;
                }
                MenuStatus::ExitSoftware => {
                    error!("Key(s) not found in key chords: '{keys}'.");
                    return status;
                }
            }
        }
        status
    }

    /// The read-only frame view handed to the renderer.
    pub fn view(&self) -> MenuView<'_> {
        let cells: Vec<MenuCell> = self
            .active
            .iter()
            .map(|chord| MenuCell {
                key: format!("{}{}", chord.key.mods, chord.key.repr),
                description: chord
                    .prop_str(PropId::Description)
                    .unwrap_or_default()
                    .to_string(),
                role: if chord.is_prefix() {
                    CellRole::Prefix
                } else if chord.prop(PropId::Goto).is_set() {
                    CellRole::Goto
                } else {
                    CellRole::Chord
                },
            })
            .collect();

        let (rows, cols) = calculate_grid(cells.len() as u32, self.config.max_cols);

        MenuView {
            cells,
            title: self.title,
            rows,
            cols,
            config: &self.config,
        }
    }
}
