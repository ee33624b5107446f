//! The resolver backend contract.

use crate::error::Result;
use crate::notify::NotifySink;
use crate::settings::ResolverSettings;

/// When a backend wants its settings applied relative to tunnel interface
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Apply before the interface exists. The resolv.conf backend rewrites a
    /// file and has no dependency on the device.
    Pre,
    /// Apply after the interface exists. The systemd-resolved backend needs
    /// the live link to resolve its per-link handle.
    Post,
}

/// A strategy that performs the actual system-level DNS configuration
/// change.
///
/// The manager stages each live session's contribution with
/// [`apply`](Self::apply) (newest session first), then calls
/// [`commit`](Self::commit) exactly once to mutate the external state and
/// report per-change notifications.
pub trait ResolverBackend {
    /// Short descriptive text for logs and status reporting.
    fn info(&self) -> String;

    /// When this backend wants to be applied.
    fn apply_mode(&self) -> ApplyMode;

    /// Stages one session's settings for the next commit.
    fn apply(&mut self, settings: &ResolverSettings) -> Result<()>;

    /// Performs the batched external mutation for everything staged since
    /// the last commit, emitting addition notifications through `notifier`.
    fn commit(&mut self, notifier: Option<&mut dyn NotifySink>) -> Result<()>;
}
