use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Represents the result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Swipe the top card right
    Like,
    /// Swipe the top card left
    Nope,
    /// Move the collection selection up
    Up,
    /// Move the collection selection down
    Down,
    /// Save the selected cat to disk
    Save,
    /// Share the selected cat's link
    Share,
    /// Start over with a fresh batch
    Restart,
    /// Toggle help overlay
    Help,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Like: Right arrow or l
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Like,
        (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Like,

        // Nope: Left arrow or h
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Nope,
        (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Nope,

        // Collection navigation
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Down,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Down,

        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Save,
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Share,
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Restart,

        // Some terminals report '?' with Shift held
        (KeyCode::Char('?'), _) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Left-button mouse activity, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
    None,
}

/// Maps mouse events to drag actions. Only the left button is used.
pub fn handle_mouse_event(event: MouseEvent) -> MouseAction {
    let (column, row) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Press { column, row },
        MouseEventKind::Drag(MouseButton::Left) => MouseAction::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => MouseAction::Release { column, row },
        _ => MouseAction::None,
    }
}
