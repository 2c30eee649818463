//! Study session state machine.
//!
//! The controller owns a [`GroupIndex`] and a [`SessionState`] value. Every
//! operation computes the next state in full and swaps it in, so a rejected
//! operation leaves the previous state untouched.

use crate::error::{VocabError, VocabResult};
use crate::groups::GroupIndex;
use crate::models::{GroupId, VocabItem};
use crate::shuffle::shuffled;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Session state: nothing selected, or studying one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoGroupSelected,
    GroupSelected(ActiveGroup),
}

impl SessionState {
    pub fn active(&self) -> Option<&ActiveGroup> {
        match self {
            Self::NoGroupSelected => None,
            Self::GroupSelected(active) => Some(active),
        }
    }

    pub fn selected_group(&self) -> Option<GroupId> {
        self.active().map(|a| a.group)
    }

    pub fn cursor(&self) -> usize {
        self.active().map_or(0, |a| a.cursor)
    }

    pub fn revealed(&self) -> bool {
        self.active().is_some_and(|a| a.revealed)
    }
}

/// The selected group with its current ordering, cursor and reveal flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGroup {
    group: GroupId,
    order: Arc<[VocabItem]>,
    shuffled: bool,
    cursor: usize,
    revealed: bool,
}

impl ActiveGroup {
    fn new(group: GroupId, order: Arc<[VocabItem]>, shuffled: bool) -> Self {
        Self {
            group,
            order,
            shuffled,
            cursor: 0,
            revealed: false,
        }
    }

    /// Same ordering, new cursor, card hidden.
    fn moved_to(&self, cursor: usize) -> Self {
        Self {
            group: self.group,
            order: Arc::clone(&self.order),
            shuffled: self.shuffled,
            cursor,
            revealed: false,
        }
    }

    fn last_index(&self) -> usize {
        self.order.len().saturating_sub(1)
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Active ordering: canonical or shuffled.
    pub fn order(&self) -> &[VocabItem] {
        &self.order
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn current(&self) -> Option<&VocabItem> {
        self.order.get(self.cursor)
    }
}

/// Owns the session state and applies navigation operations to it.
pub struct SessionController {
    index: GroupIndex,
    state: SessionState,
    rng: StdRng,
}

impl SessionController {
    /// Create a controller with an OS-seeded shuffle source.
    pub fn new(index: GroupIndex) -> Self {
        Self::with_rng(index, StdRng::from_os_rng())
    }

    /// Create a controller with an explicit shuffle source.
    pub fn with_rng(index: GroupIndex, rng: StdRng) -> Self {
        Self {
            index,
            state: SessionState::NoGroupSelected,
            rng,
        }
    }

    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Select a group (canonical order, first card, hidden), or pass `None`
    /// to return to the group list.
    pub fn select_group(&mut self, group: Option<GroupId>) -> VocabResult<()> {
        let Some(group) = group else {
            self.reset();
            return Ok(());
        };
        let Some(items) = self.index.items(group) else {
            warn!(group, "rejected selection of unknown group");
            return Err(VocabError::InvalidGroupSelection(group));
        };
        debug!(group, words = items.len(), "group selected");
        self.state = SessionState::GroupSelected(ActiveGroup::new(group, Arc::from(items), false));
        Ok(())
    }

    /// Replace the active order with a fresh shuffle of the group's
    /// canonical order.
    pub fn shuffle_current_group(&mut self) -> VocabResult<()> {
        let group = self.require_active()?.group;
        let canonical = self
            .index
            .items(group)
            .ok_or(VocabError::InvalidGroupSelection(group))?;
        let order = shuffled(canonical, &mut self.rng);
        debug!(group, "group shuffled");
        self.state = SessionState::GroupSelected(ActiveGroup::new(group, Arc::from(order), true));
        Ok(())
    }

    /// Next card, clamped at the last one. Always hides the card.
    pub fn advance(&mut self) -> VocabResult<()> {
        let active = self.require_active()?;
        let next = active.moved_to((active.cursor + 1).min(active.last_index()));
        self.state = SessionState::GroupSelected(next);
        Ok(())
    }

    /// Previous card, clamped at the first one. Always hides the card.
    pub fn retreat(&mut self) -> VocabResult<()> {
        let active = self.require_active()?;
        let next = active.moved_to(active.cursor.saturating_sub(1));
        self.state = SessionState::GroupSelected(next);
        Ok(())
    }

    /// Move the cursor directly to `index`.
    pub fn jump_to(&mut self, index: usize) -> VocabResult<()> {
        let active = self.require_active()?;
        if index >= active.len() {
            warn!(index, len = active.len(), "rejected jump outside active order");
            return Err(VocabError::InvalidIndex {
                index,
                len: active.len(),
            });
        }
        let next = active.moved_to(index);
        self.state = SessionState::GroupSelected(next);
        Ok(())
    }

    /// Flip the reveal flag. No-op without a selected group.
    pub fn toggle_reveal(&mut self) {
        if let SessionState::GroupSelected(active) = &self.state {
            let next = ActiveGroup {
                revealed: !active.revealed,
                ..active.clone()
            };
            self.state = SessionState::GroupSelected(next);
        }
    }

    /// The card under the cursor, if any.
    pub fn current_item(&self) -> Option<&VocabItem> {
        self.state.active().and_then(ActiveGroup::current)
    }

    /// Return to the no-group-selected state.
    pub fn reset(&mut self) {
        if self.state != SessionState::NoGroupSelected {
            debug!("session reset");
        }
        self.state = SessionState::NoGroupSelected;
    }

    fn require_active(&self) -> VocabResult<&ActiveGroup> {
        self.state.active().ok_or(VocabError::NoGroupSelected)
    }
}
