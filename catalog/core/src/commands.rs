//! Session Commands
//!
//! The session state machine never performs I/O. When an event calls for a
//! side effect it returns a [`SessionCommand`] and the driver carries it out.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start a catalog fetch; its outcome comes back as a fetch event
    Fetch,
    /// End the session
    Quit,
}
