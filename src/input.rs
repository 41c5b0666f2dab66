use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Next,
    Prev,
    Select,
    Back,
    NewDrive,     // n: open the size picker
    RemoveDrive,  // d / Del: remove the selected drive (asks first)
    Rescan,       // r: rebuild the list from the pool
    Confirm,      // y: answer yes in the remove dialog
    CycleTheme,
    ShowHelp,
    None,
}

pub fn handle_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Navigation — arrow keys and vim hjkl
        (KeyCode::Up,   _) | (KeyCode::Char('k'), _) => Action::Prev,
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::Next,
        (KeyCode::Tab, _)     => Action::Next,
        (KeyCode::BackTab, _) => Action::Prev,

        (KeyCode::Enter, _)     => Action::Select,
        (KeyCode::Char('l'), _) => Action::Select,   // vim: l = enter

        (KeyCode::Esc, _)       => Action::Back,
        (KeyCode::Char('h'), _) => Action::Back,     // vim: h = back

        (KeyCode::Char('n'), _) => Action::NewDrive,
        (KeyCode::Char('d'), _)
        | (KeyCode::Delete, _)  => Action::RemoveDrive,
        (KeyCode::Char('r'), _) => Action::Rescan,
        (KeyCode::Char('y'), _) => Action::Confirm,
        (KeyCode::Char('t'), _) => Action::CycleTheme,
        (KeyCode::Char('?'), _)
        | (KeyCode::F(1), _)    => Action::ShowHelp,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vim_keys_navigate() {
        assert_eq!(handle_key(key(KeyCode::Down)), Action::Next);
        assert_eq!(handle_key(key(KeyCode::Char('j'))), Action::Next);
        assert_eq!(handle_key(key(KeyCode::Up)), Action::Prev);
        assert_eq!(handle_key(key(KeyCode::Char('k'))), Action::Prev);
        assert_eq!(handle_key(key(KeyCode::Enter)), Action::Select);
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ev), Action::Quit);
        assert_eq!(handle_key(key(KeyCode::Char('c'))), Action::None);
    }

    #[test]
    fn drive_keys() {
        assert_eq!(handle_key(key(KeyCode::Char('n'))), Action::NewDrive);
        assert_eq!(handle_key(key(KeyCode::Delete)), Action::RemoveDrive);
        assert_eq!(handle_key(key(KeyCode::Char('r'))), Action::Rescan);
    }
}
