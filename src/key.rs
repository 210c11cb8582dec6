use crate::editor::TextEdit;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic key handed to prompts after mapping a raw terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Control(Control),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Noop,
    Left,
    Right,
    Up,
    Down,
    Enter,
    Backspace,
    Space,
    Home,
    End,
    CtrlA,
    CtrlB,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlF,
    CtrlG,
    CtrlI,
    CtrlJ,
    CtrlK,
    CtrlL,
    CtrlN,
    CtrlO,
    CtrlP,
    CtrlQ,
    CtrlR,
    CtrlS,
    CtrlT,
    CtrlU,
    CtrlV,
    CtrlW,
    CtrlX,
    CtrlY,
    CtrlZ,
}

impl Key {
    pub const NOOP: Key = Key::Control(Control::Noop);

    /// Map a raw key event. Anything unrecognized becomes `Control::Noop`.
    pub fn from_event(event: &KeyEvent) -> Key {
        match (event.code, event.modifiers) {
            (KeyCode::Char(c), m) if m.contains(KeyModifiers::CONTROL) => {
                ctrl(c).map_or(Key::NOOP, Key::Control)
            }
            (KeyCode::Char(' '), _) => Key::Control(Control::Space),
            (KeyCode::Char(c), _) => Key::Char(c),
            (KeyCode::Left, _) => Key::Control(Control::Left),
            (KeyCode::Right, _) => Key::Control(Control::Right),
            (KeyCode::Up, _) => Key::Control(Control::Up),
            (KeyCode::Down, _) => Key::Control(Control::Down),
            (KeyCode::Enter, _) => Key::Control(Control::Enter),
            (KeyCode::Backspace, _) => Key::Control(Control::Backspace),
            (KeyCode::Home, _) => Key::Control(Control::Home),
            (KeyCode::End, _) => Key::Control(Control::End),
            (KeyCode::Tab, _) => Key::Control(Control::CtrlI),
            _ => Key::NOOP,
        }
    }

    /// True for printable characters and for the space key.
    pub fn is_text(self) -> bool {
        matches!(self, Key::Char(_) | Key::Control(Control::Space))
    }

    /// The character this key types, if it types one.
    pub fn text(self) -> Option<char> {
        match self {
            Key::Char(c) => Some(c),
            Key::Control(Control::Space) => Some(' '),
            Key::Control(_) => None,
        }
    }
}

fn ctrl(c: char) -> Option<Control> {
    let control = match c.to_ascii_lowercase() {
        'a' => Control::CtrlA,
        'b' => Control::CtrlB,
        'c' => Control::CtrlC,
        'd' => Control::CtrlD,
        'e' => Control::CtrlE,
        'f' => Control::CtrlF,
        'g' => Control::CtrlG,
        'i' => Control::CtrlI,
        'j' => Control::CtrlJ,
        'k' => Control::CtrlK,
        'l' => Control::CtrlL,
        'n' => Control::CtrlN,
        'o' => Control::CtrlO,
        'p' => Control::CtrlP,
        'q' => Control::CtrlQ,
        'r' => Control::CtrlR,
        's' => Control::CtrlS,
        't' => Control::CtrlT,
        'u' => Control::CtrlU,
        'v' => Control::CtrlV,
        'w' => Control::CtrlW,
        'x' => Control::CtrlX,
        'y' => Control::CtrlY,
        'z' => Control::CtrlZ,
        _ => return None,
    };
    Some(control)
}

/// Ctrl+C never reaches a prompt as a key; it aborts the input loop.
pub fn is_interrupt(event: &KeyEvent) -> bool {
    matches!(
        (event.code, event.modifiers),
        (KeyCode::Char('c' | 'C'), m) if m.contains(KeyModifiers::CONTROL)
    )
}

/// Forward an editing key to a text buffer.
pub fn apply_key(key: Key, editor: &mut impl TextEdit) {
    if let Some(c) = key.text() {
        editor.insert(c);
        return;
    }
    match key {
        Key::Control(Control::Left) => editor.left(),
        Key::Control(Control::Right) => editor.right(),
        Key::Control(Control::Up) => editor.up(),
        Key::Control(Control::Down) => editor.down(),
        Key::Control(Control::Enter) => editor.newline(),
        Key::Control(Control::Backspace) => editor.backspace(),
        Key::Control(Control::Home) => editor.home(),
        Key::Control(Control::End) => editor.end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextArea;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn ctrl_press(c: char) -> KeyEvent {
        press(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn printable_chars_are_text() {
        let key = Key::from_event(&press(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(key, Key::Char('x'));
        assert!(key.is_text());

        let shifted = Key::from_event(&press(KeyCode::Char('X'), KeyModifiers::SHIFT));
        assert_eq!(shifted, Key::Char('X'));
    }

    #[test]
    fn space_is_the_only_textual_control() {
        let space = Key::from_event(&press(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(space, Key::Control(Control::Space));
        assert!(space.is_text());
        assert_eq!(space.text(), Some(' '));

        for code in [KeyCode::Enter, KeyCode::Up, KeyCode::Backspace] {
            let key = Key::from_event(&press(code, KeyModifiers::NONE));
            assert!(!key.is_text(), "{key:?}");
            assert_eq!(key.text(), None);
        }
    }

    #[test]
    fn ctrl_letters_map_to_controls() {
        let key = Key::from_event(&ctrl_press('b'));
        assert_eq!(key, Key::Control(Control::CtrlB));
        // Ctrl+H and Ctrl+M arrive as backspace and enter, never as letters.
        let key = Key::from_event(&ctrl_press('h'));
        assert_eq!(key, Key::NOOP);
    }

    #[test]
    fn unknown_keys_are_noop() {
        for code in [KeyCode::F(5), KeyCode::Esc, KeyCode::Insert] {
            let key = Key::from_event(&press(code, KeyModifiers::NONE));
            assert_eq!(key, Key::NOOP);
        }
    }

    #[test]
    fn interrupt_is_ctrl_c_only() {
        assert!(is_interrupt(&ctrl_press('c')));
        let plain_c = press(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(!is_interrupt(&plain_c));
        assert!(!is_interrupt(&ctrl_press('d')));
    }

    #[test]
    fn apply_key_edits_buffer() {
        let mut ta = TextArea::new(80);
        let keys = [
            Key::Char('h'),
            Key::Char('i'),
            Key::Control(Control::Space),
            Key::Char('!'),
        ];
        for key in keys {
            apply_key(key, &mut ta);
        }
        apply_key(Key::Control(Control::Backspace), &mut ta);
        apply_key(Key::Control(Control::Home), &mut ta);
        apply_key(Key::Char('>'), &mut ta);
        assert_eq!(ta.text(), ">hi ");
        apply_key(Key::Control(Control::CtrlK), &mut ta);
        assert_eq!(ta.text(), ">hi ");
    }
}
