//! Keyboard shortcuts for an active study session.

use crate::error::VocabResult;
use crate::session::{SessionController, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// A session operation triggered by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Advance,
    Retreat,
    ToggleReveal,
    Reset,
}

impl SessionCommand {
    /// Key label shown in the footer.
    pub fn key_label(&self) -> &'static str {
        match self {
            Self::Advance => "→",
            Self::Retreat => "←",
            Self::ToggleReveal => "Space",
            Self::Reset => "Esc",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance => "Next",
            Self::Retreat => "Prev",
            Self::ToggleReveal => "Reveal",
            Self::Reset => "Groups",
        }
    }

    pub const ALL: [SessionCommand; 4] = [Self::Retreat, Self::Advance, Self::ToggleReveal, Self::Reset];
}

/// Map a key to a session command. Only presses count, and only while a
/// group is selected.
pub fn map_key(state: &SessionState, key: &KeyEvent) -> Option<SessionCommand> {
    if key.kind != KeyEventKind::Press || state.active().is_none() {
        return None;
    }
    match key.code {
        KeyCode::Right => Some(SessionCommand::Advance),
        KeyCode::Left => Some(SessionCommand::Retreat),
        KeyCode::Char(' ') => Some(SessionCommand::ToggleReveal),
        KeyCode::Esc => Some(SessionCommand::Reset),
        _ => None,
    }
}

/// Run exactly one controller operation for `command`.
pub fn apply(controller: &mut SessionController, command: SessionCommand) -> VocabResult<()> {
    match command {
        SessionCommand::Advance => controller.advance(),
        SessionCommand::Retreat => controller.retreat(),
        SessionCommand::ToggleReveal => {
            controller.toggle_reveal();
            Ok(())
        }
        SessionCommand::Reset => {
            controller.reset();
            Ok(())
        }
    }
}

/// Handle a key if it is a session shortcut. Returns `None` when the key is
/// not consumed and should fall through to other bindings.
pub fn handle_key(controller: &mut SessionController, key: &KeyEvent) -> Option<VocabResult<()>> {
    let command = map_key(controller.state(), key)?;
    Some(apply(controller, command))
}
