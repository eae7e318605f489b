//! Menu configuration record, consumed by the dispatcher and renderers.

use crate::color::Color;

/// Screen edge the menu is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuPosition {
    #[default]
    Bottom,
    Top,
}

/// Color roles used when drawing menu cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Key,
    Delimiter,
    Prefix,
    Chord,
    Title,
    Goto,
    Background,
    Border,
}

/// The color palette, one slot per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuColors {
    pub key: Color,
    pub delimiter: Color,
    pub prefix: Color,
    pub chord: Color,
    pub title: Color,
    pub goto_: Color,
    pub background: Color,
    pub border: Color,
}

impl Default for MenuColors {
    fn default() -> Self {
        Self {
            key: Color::rgb(0xDC, 0xD7, 0xBA),
            delimiter: Color::rgb(0x52, 0x52, 0x59),
            prefix: Color::rgb(0xAF, 0x9F, 0xC9),
            chord: Color::rgb(0xDC, 0xD7, 0xBA),
            title: Color::rgb(0xDC, 0xD7, 0xBA),
            goto_: Color::rgb(0xE6, 0xC3, 0x84),
            background: Color::rgb(0x18, 0x16, 0x16),
            border: Color::rgb(0x7F, 0xB4, 0xCA),
        }
    }
}

impl MenuColors {
    pub fn get(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Key => self.key,
            ColorRole::Delimiter => self.delimiter,
            ColorRole::Prefix => self.prefix,
            ColorRole::Chord => self.chord,
            ColorRole::Title => self.title,
            ColorRole::Goto => self.goto_,
            ColorRole::Background => self.background,
            ColorRole::Border => self.border,
        }
    }

    pub fn set(&mut self, role: ColorRole, color: Color) {
        match role {
            ColorRole::Key => self.key = color,
            ColorRole::Delimiter => self.delimiter = color,
            ColorRole::Prefix => self.prefix = color,
            ColorRole::Chord => self.chord = color,
            ColorRole::Title => self.title = color,
            ColorRole::Goto => self.goto_ = color,
            ColorRole::Background => self.background = color,
            ColorRole::Border => self.border = color,
        }
    }
}

/// Everything the menu needs besides the chord tree itself.
///
/// Defaults match the stock configuration; source directives and command-line
/// flags overwrite individual fields before the menu starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfig {
    /// Separator between a key and its description in a cell.
    pub delimiter: String,
    /// Milliseconds between the last keypress and first render.
    pub delay: u32,
    /// Milliseconds between keyboard ungrab and command execution for
    /// `+keep` chords, so captured keystrokes do not leak into the child.
    pub keep_delay: u32,
    /// Maximum number of columns; 0 means a single row.
    pub max_cols: u32,
    /// Menu width in pixels; -1 means half the screen width.
    pub menu_width: i32,
    /// Gap between the menu and the screen edge; -1 means a tenth of the
    /// screen height.
    pub menu_gap: i32,
    pub width_padding: u32,
    pub height_padding: u32,
    /// Extra padding between the outermost cells and the border; -1 means
    /// the same as the cell padding.
    pub table_padding: i32,
    pub position: MenuPosition,
    pub border_width: u32,
    pub border_radius: f64,
    pub colors: MenuColors,
    /// Shell used to run chord commands (`shell -c cmd`).
    pub shell: String,
    pub font: String,
    pub title_font: String,
    /// Keys that seed `...` inside `<...>` option groups.
    pub implicit_keys: String,
    /// Command-line prefix prepended to every non-`+unwrap` command.
    pub wrap_cmd: Option<String>,
    /// Sort sibling chords before display.
    pub sort: bool,
    pub debug: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            delimiter: " -> ".to_string(),
            delay: 1000,
            keep_delay: 75,
            max_cols: 5,
            menu_width: -1,
            menu_gap: -1,
            width_padding: 6,
            height_padding: 2,
            table_padding: -1,
            position: MenuPosition::Bottom,
            border_width: 4,
            border_radius: 0.0,
            colors: MenuColors::default(),
            shell: "/bin/sh".to_string(),
            font: "monospace, 14".to_string(),
            title_font: "sans-serif, 16".to_string(),
            implicit_keys: "asdfghjkl;".to_string(),
            wrap_cmd: None,
            sort: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_roles() {
        let colors = MenuColors::default();
        assert_eq!(colors.get(ColorRole::Goto), Color::rgb(0xE6, 0xC3, 0x84));
        assert_eq!(colors.get(ColorRole::Key), colors.get(ColorRole::Chord));
    }

    #[test]
    fn test_set_color_role() {
        let mut colors = MenuColors::default();
        colors.set(ColorRole::Border, Color::rgb(1, 2, 3));
        assert_eq!(colors.get(ColorRole::Border), Color::rgb(1, 2, 3));
    }
}
