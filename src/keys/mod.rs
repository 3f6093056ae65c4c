//! Key bindings
//!
//! Keys resolve to named [`UiEvent`]s per mode (`containers`, `images`),
//! falling back to the `global` mode. A key neither binds is passed on raw
//! as [`Input::Key`] so it can edit the filter or a prompt.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::KeyBindings;
use crate::core::UiError;

pub const GLOBAL_MODE: &str = "global";

/// Named events the console reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiEvent {
    Quit,
    Help,
    CloseDialog,
    SubmitDialog,
    NextTab,
    PrevTab,
    NextItem,
    PrevItem,
    SetMark,
    ClearMarks,
    ToggleShowAll,
    DeleteSelected,
    StartSelected,
    StopSelected,
    PauseSelected,
    UnpauseSelected,
    KillSelected,
    RestartSelected,
    Rename,
    Commit,
    InspectDetails,
    ViewDiff,
    ViewTop,
    TagImage,
    ViewHistory,
    PushImage,
}

impl UiEvent {
    pub fn all() -> &'static [UiEvent] {
        use UiEvent::*;
        &[
            Quit,
            Help,
            CloseDialog,
            SubmitDialog,
            NextTab,
            PrevTab,
            NextItem,
            PrevItem,
            SetMark,
            ClearMarks,
            ToggleShowAll,
            DeleteSelected,
            StartSelected,
            StopSelected,
            PauseSelected,
            UnpauseSelected,
            KillSelected,
            RestartSelected,
            Rename,
            Commit,
            InspectDetails,
            ViewDiff,
            ViewTop,
            TagImage,
            ViewHistory,
            PushImage,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Quit => "quit",
            UiEvent::Help => "help",
            UiEvent::CloseDialog => "close-dialog",
            UiEvent::SubmitDialog => "submit-dialog",
            UiEvent::NextTab => "next-tab",
            UiEvent::PrevTab => "prev-tab",
            UiEvent::NextItem => "next-item",
            UiEvent::PrevItem => "prev-item",
            UiEvent::SetMark => "set-mark",
            UiEvent::ClearMarks => "clear-marks",
            UiEvent::ToggleShowAll => "toggle-show-all",
            UiEvent::DeleteSelected => "delete-selected",
            UiEvent::StartSelected => "start-selected",
            UiEvent::StopSelected => "stop-selected",
            UiEvent::PauseSelected => "pause-selected",
            UiEvent::UnpauseSelected => "unpause-selected",
            UiEvent::KillSelected => "kill-selected",
            UiEvent::RestartSelected => "restart-selected",
            UiEvent::Rename => "rename",
            UiEvent::Commit => "commit",
            UiEvent::InspectDetails => "inspect-details",
            UiEvent::ViewDiff => "view-diff",
            UiEvent::ViewTop => "view-top",
            UiEvent::TagImage => "tag-image",
            UiEvent::ViewHistory => "view-history",
            UiEvent::PushImage => "push-image",
        }
    }
}

impl fmt::Display for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UiEvent {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        UiEvent::all()
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| UiError::Binding(format!("unknown event {:?}", s)))
    }
}

/// A key press the binding table understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }.normalized()
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Shift is implied by the character itself and by backtab
    fn normalized(mut self) -> Self {
        if self.code == KeyCode::Tab && self.modifiers.contains(KeyModifiers::SHIFT) {
            self.code = KeyCode::BackTab;
        }
        if matches!(self.code, KeyCode::Char(_) | KeyCode::BackTab) {
            self.modifiers.remove(KeyModifiers::SHIFT);
        }
        if let KeyCode::Char(c) = self.code {
            if self.modifiers.contains(KeyModifiers::CONTROL) {
                self.code = KeyCode::Char(c.to_ascii_lowercase());
            }
        }
        self
    }
}

impl From<&KeyEvent> for Key {
    fn from(event: &KeyEvent) -> Self {
        Key::new(event.code, event.modifiers)
    }
}

impl FromStr for Key {
    type Err = UiError;

    /// Parse specs like `ctrl n`, `alt x`, `down`, `?`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let Some((last, mods)) = tokens.split_last() else {
            return Err(UiError::Binding("empty key".to_string()));
        };

        let mut modifiers = KeyModifiers::NONE;
        for m in mods {
            modifiers |= match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => return Err(UiError::Binding(format!("unknown modifier {:?}", other))),
            };
        }

        let code = match last.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            lower if lower.len() > 1 && lower.starts_with('f') => {
                let n: u8 = lower[1..]
                    .parse()
                    .map_err(|_| UiError::Binding(format!("unknown key {:?}", last)))?;
                KeyCode::F(n)
            }
            _ => {
                let mut chars = last.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(UiError::Binding(format!("unknown key {:?}", last))),
                }
            }
        };

        Ok(Key::new(code, modifiers))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl ")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt ")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift ")?;
        }
        match self.code {
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::BackTab => f.write_str("backtab"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pageup"),
            KeyCode::PageDown => f.write_str("pagedown"),
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "f{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A key press after binding resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Event(UiEvent),
    Key(KeyEvent),
}

/// Per-mode binding tables with a global fallback
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    modes: HashMap<String, HashMap<Key, UiEvent>>,
}

impl Keymap {
    /// An empty keymap; see [`Keymap::defaults`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        use UiEvent::*;

        let mut keymap = Self::new();

        keymap.bind(GLOBAL_MODE, Key::ctrl('c'), Quit);
        keymap.bind(GLOBAL_MODE, Key::plain(KeyCode::Char('?')), Help);
        keymap.bind(GLOBAL_MODE, Key::plain(KeyCode::Esc), CloseDialog);
        keymap.bind(GLOBAL_MODE, Key::plain(KeyCode::Enter), SubmitDialog);
        keymap.bind(GLOBAL_MODE, Key::plain(KeyCode::Tab), NextTab);
        keymap.bind(GLOBAL_MODE, Key::plain(KeyCode::BackTab), PrevTab);

        let shared = [
            (Key::ctrl('n'), NextItem),
            (Key::plain(KeyCode::Down), NextItem),
            (Key::ctrl('p'), PrevItem),
            (Key::plain(KeyCode::Up), PrevItem),
            (Key::ctrl('k'), SetMark),
            (Key::ctrl('g'), ClearMarks),
            (Key::ctrl('a'), ToggleShowAll),
            (Key::ctrl('d'), DeleteSelected),
            (Key::ctrl('v'), InspectDetails),
        ];
        for mode in ["containers", "images"] {
            for (key, event) in shared {
                keymap.bind(mode, key, event);
            }
        }

        for (c, event) in [
            ('s', StartSelected),
            ('x', StopSelected),
            ('w', PauseSelected),
            ('u', UnpauseSelected),
            ('y', KillSelected),
            ('e', RestartSelected),
            ('r', Rename),
            ('t', Commit),
            ('f', ViewDiff),
            ('o', ViewTop),
        ] {
            keymap.bind("containers", Key::ctrl(c), event);
        }

        for (c, event) in [('t', TagImage), ('h', ViewHistory), ('u', PushImage)] {
            keymap.bind("images", Key::ctrl(c), event);
        }

        keymap
    }

    /// Defaults with the configured overrides applied on top
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, UiError> {
        let mut keymap = Self::defaults();
        for (mode, table) in [
            (GLOBAL_MODE, &bindings.global),
            ("containers", &bindings.containers),
            ("images", &bindings.images),
        ] {
            for (binding, event) in table {
                let key: Key = binding.parse()?;
                if event.trim() == "none" {
                    keymap.unbind(mode, key);
                } else {
                    keymap.bind(mode, key, event.parse()?);
                }
            }
        }
        Ok(keymap)
    }

    pub fn bind(&mut self, mode: &str, key: Key, event: UiEvent) {
        self.modes
            .entry(mode.to_string())
            .or_default()
            .insert(key, event);
    }

    pub fn unbind(&mut self, mode: &str, key: Key) {
        if let Some(table) = self.modes.get_mut(mode) {
            table.remove(&key);
        }
    }

    /// Look a key up in `mode`, then in the global mode
    pub fn event_for(&self, mode: &str, key: &KeyEvent) -> Option<UiEvent> {
        let key = Key::from(key);
        [mode, GLOBAL_MODE]
            .iter()
            .find_map(|m| self.modes.get(*m).and_then(|table| table.get(&key)))
            .copied()
    }

    pub fn resolve(&self, mode: &str, key: &KeyEvent) -> Input {
        match self.event_for(mode, key) {
            Some(event) => Input::Event(event),
            None => Input::Key(*key),
        }
    }

    /// Keys reachable from `mode`, for the help dialog
    pub fn bindings_for(&self, mode: &str) -> Vec<(Key, UiEvent)> {
        let mut seen: HashMap<Key, UiEvent> = HashMap::new();
        for m in [GLOBAL_MODE, mode] {
            if let Some(table) = self.modes.get(m) {
                seen.extend(table.iter().map(|(k, e)| (*k, *e)));
            }
        }
        let mut bindings: Vec<(Key, UiEvent)> = seen.into_iter().collect();
        bindings.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
        bindings
    }

    /// First key bound to `event` in `mode` or the global mode
    pub fn key_for(&self, mode: &str, event: UiEvent) -> Option<Key> {
        self.bindings_for(mode)
            .into_iter()
            .find(|(_, e)| *e == event)
            .map(|(k, _)| k)
    }
}
