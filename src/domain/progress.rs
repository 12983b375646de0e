//! Keyword-driven progress and terminality rules.
//!
//! Carrier feeds deliver free-text status labels, so progress is derived
//! from a data-driven rule table rather than a strict enum transition
//! table. Rules are evaluated from the most advanced milestone down; the
//! first keyword match wins, so a label mentioning both "departed" and
//! "released" resolves to the released percentage. Unknown vocabulary
//! falls back to a neutral midpoint instead of rejecting the event.

/// Ordered rule table mapping status keywords to a progress percentage.
///
/// Evaluated top to bottom; the first rule whose keyword appears
/// (case-insensitive substring) in the label determines the progress.
pub const PROGRESS_RULES: &[(&[&str], u8)] = &[
    (&["delivered", "completed"], 100),
    (&["delivery", "out-for"], 95),
    (&["released", "cleared"], 90),
    (&["customs"], 85),
    (&["arrived"], 75),
    (&["transit", "ocean"], 60),
    (&["depart"], 40),
    (&["loaded"], 30),
    (&["pickup", "empty"], 20),
    (&["booking"], 10),
];

/// Progress assigned when no rule keyword matches the label.
pub const DEFAULT_PROGRESS: u8 = 50;

/// Keywords marking a status as terminal (shipment effectively complete).
///
/// Terminal transitions gate downstream invoicing; see
/// [`crate::domain::CoreEvent::ContainerTerminal`].
pub const TERMINAL_KEYWORDS: &[&str] = &["delivered", "completed", "arrived", "released", "cleared"];

/// Maps a free-text status label to a progress percentage.
#[must_use]
pub fn progress_for(label: &str) -> u8 {
    let lower = label.to_lowercase();
    for (keywords, percent) in PROGRESS_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *percent;
        }
    }
    DEFAULT_PROGRESS
}

/// Returns `true` if the label matches any terminal keyword.
#[must_use]
pub fn is_terminal(label: &str) -> bool {
    let lower = label.to_lowercase();
    TERMINAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
