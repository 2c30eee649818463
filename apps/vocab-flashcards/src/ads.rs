//! Sponsored slot scheduling.

/// A slot appears after every fifth card.
pub const AD_INTERVAL: usize = 5;

/// Whether the card at `cursor` is followed by a sponsored slot.
pub fn should_show_ad(cursor: usize) -> bool {
    cursor > 0 && cursor % AD_INTERVAL == 0
}

/// Identifier of the slot rendered at `cursor`, unique per card position.
pub fn slot_id(cursor: usize) -> String {
    format!("ad-slot-{cursor}")
}
