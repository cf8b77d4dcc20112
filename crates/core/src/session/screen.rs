use super::*;
use crate::{Event, EventBus};

impl Session {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Moves along the screen flow. Asking for the current screen is a
    /// no-op; an illegal edge is an error and changes nothing.
    pub fn go_to(&mut self, next: Screen, events: &mut EventBus) -> Result<(), SessionError> {
        if next == self.screen {
            return Ok(());
        }
        if !self.screen.can_move_to(next) {
            return Err(SessionError::InvalidTransition(self.screen, next));
        }
        if next == Screen::Tracking && self.players.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        if self.screen == Screen::Selection
            && next == Screen::Final
            && !self.selection.is_outstanding()
        {
            return Err(SessionError::NoSelectionWinner);
        }
        self.screen = next;
        events.push(Event::ScreenChanged { screen: next });
        self.persist();
        Ok(())
    }

    pub(super) fn expect_screen(&self, expected: Screen) -> Result<(), SessionError> {
        if self.screen == expected {
            Ok(())
        } else {
            Err(SessionError::WrongScreen(expected, self.screen))
        }
    }
}
