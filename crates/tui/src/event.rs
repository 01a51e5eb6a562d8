//! Result type for widgets that may take a key event.
//!
//! Key events go to the command line first when it is open; anything it
//! does not consume falls through to the global key map.

/// What a widget did with a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStatus {
    /// Handled; stop propagating.
    Consumed,
    /// Not handled; try the next handler.
    NotConsumed,
    /// The user confirmed a line of input.
    Submitted(String),
}

impl EventStatus {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Self::NotConsumed)
    }
}
