//! Key bindings for the player screen.

use crate::agent::Input;
use crossterm::event::KeyCode;

/// Translates a key press into agent input.
///
/// Arrows and `wasd`/`hjkl` move, Enter or Space confirms, `q` or Esc quits.
pub fn translate(key: KeyCode) -> Option<Input> {
    match key {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Input::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Input::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Input::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Input::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Input::Confirm),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_move() {
        assert_eq!(translate(KeyCode::Up), Some(Input::Up));
        assert_eq!(translate(KeyCode::Right), Some(Input::Right));
        assert_eq!(translate(KeyCode::Char('j')), Some(Input::Down));
    }

    #[test]
    fn test_confirm_and_quit() {
        assert_eq!(translate(KeyCode::Enter), Some(Input::Confirm));
        assert_eq!(translate(KeyCode::Char(' ')), Some(Input::Confirm));
        assert_eq!(translate(KeyCode::Esc), Some(Input::Quit));
        assert_eq!(translate(KeyCode::Char('x')), None);
    }
}
