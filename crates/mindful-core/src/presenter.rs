use crate::{error::PresentError, messages::WarningMessage};

/// Rendering surface of a browsing context.
///
/// Only invoked by the runtime in response to session effects; it reports
/// user actions back as runtime events and never changes state itself.
pub trait Presenter: Send {
    /// Full-page interstitial with the chosen warning
    fn show_lockdown(&mut self, message: &WarningMessage) -> Result<(), PresentError>;

    fn hide_lockdown(&mut self) -> Result<(), PresentError>;

    /// Floating indicator with the declared intent and time left
    fn show_countdown(&mut self, intent: &str, remaining_seconds: u64)
        -> Result<(), PresentError>;

    fn update_countdown(&mut self, remaining_seconds: u64) -> Result<(), PresentError>;

    fn hide_countdown(&mut self) -> Result<(), PresentError>;

    /// Ask the host to terminate the browsing context.
    fn close_context(&mut self) -> Result<(), PresentError>;
}
