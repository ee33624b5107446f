//! Cross-session settings orchestration.
//!
//! The [`SettingsManager`] owns every session's [`ResolverSettings`] in
//! creation order and drives the staged apply/commit cycle against exactly
//! one backend. It is not internally synchronized; the hosting service's
//! dispatch loop is expected to serialize calls, wrapping the manager in a
//! lock if it is multi-threaded.

use crate::backend::{ApplyMode, ResolverBackend};
use crate::error::Result;
use crate::notify::{ChangeEvent, NotifySink};
use crate::settings::ResolverSettings;
use std::collections::BTreeMap;

/// Opaque handle to one session's [`ResolverSettings`] slot.
///
/// Doubles as the precedence position: a slot created later outranks every
/// slot created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettingsId(u32);

/// Orders and applies resolver settings across all active VPN sessions.
pub struct SettingsManager<B> {
    /// Creation-ordered (ascending index) settings slots.
    resolvers: BTreeMap<u32, ResolverSettings>,
    /// Next index to hand out. Monotonic for the process lifetime, never
    /// decremented across removals.
    next_index: u32,
    backend: B,
}

impl<B: ResolverBackend> SettingsManager<B> {
    /// Creates a manager bound to `backend` for the process lifetime.
    pub fn new(backend: B) -> Self {
        tracing::debug!(backend = %backend.info(), "DNS settings manager initialized");
        Self {
            resolvers: BTreeMap::new(),
            next_index: 0,
            backend,
        }
    }

    /// Allocates a settings slot for a new session and returns its handle.
    ///
    /// The new slot takes precedence over every existing slot: during
    /// [`apply_settings`](Self::apply_settings) it is handed to the backend
    /// before all slots created earlier ("last connected wins").
    pub fn new_resolver_settings(&mut self) -> SettingsId {
        let index = self.next_index;
        self.next_index += 1;
        self.resolvers.insert(index, ResolverSettings::new(index));
        tracing::debug!(index, "Allocated resolver settings slot");
        SettingsId(index)
    }

    /// Borrows a session's settings, or `None` if the slot has been purged.
    #[must_use]
    pub fn settings(&self, id: SettingsId) -> Option<&ResolverSettings> {
        self.resolvers.get(&id.0)
    }

    /// Mutably borrows a session's settings, or `None` if the slot has been
    /// purged.
    pub fn settings_mut(&mut self, id: SettingsId) -> Option<&mut ResolverSettings> {
        self.resolvers.get_mut(&id.0)
    }

    /// Number of settings slots currently held (including removal-marked
    /// ones that have not been purged yet).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Borrows the bound backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutably borrows the bound backend.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Descriptive text of the bound backend.
    #[must_use]
    pub fn backend_info(&self) -> String {
        self.backend.info()
    }

    /// Whether the bound backend applies before or after interface
    /// creation.
    #[must_use]
    pub fn apply_mode(&self) -> ApplyMode {
        self.backend.apply_mode()
    }

    /// Runs one full apply cycle.
    ///
    /// 1. Every slot with content that is not removal-marked is staged into
    ///    the backend, newest first — a later session's servers take
    ///    precedence over an earlier session's.
    /// 2. The backend commits once, performing the external mutation and
    ///    emitting one addition event per applied entry.
    /// 3. Removal-marked slots at the *front* of the creation order are
    ///    reported (one removal event per server/domain they still hold)
    ///    and purged. The scan stops at the first live slot: a
    ///    removal-marked slot behind a live one stays, unreported, until
    ///    the slots ahead of it are gone. Sessions are normally torn down
    ///    oldest-first, so removable slots cluster at the front.
    ///
    /// Addition events are always delivered before removal events.
    ///
    /// # Errors
    ///
    /// Backend `apply`/`commit` failures propagate unchanged; the backend
    /// is responsible for keeping external state consistent on partial
    /// application.
    pub fn apply_settings(&mut self, notifier: Option<&mut dyn NotifySink>) -> Result<()> {
        let mut notifier = notifier;

        for settings in self.resolvers.values().rev() {
            if settings.changes_available() && !settings.removable() {
                self.backend.apply(settings)?;
            }
        }

        self.backend.commit(match notifier {
            Some(ref mut n) => Some(&mut **n),
            None => None,
        })?;

        let mut purge = Vec::new();
        for (&index, settings) in &self.resolvers {
            if !settings.removable() {
                break;
            }
            if let Some(ref mut n) = notifier {
                let device = settings.device_name().to_owned();
                for server in settings.name_servers(true) {
                    n.notify(ChangeEvent::server_removed(&device, server.clone()));
                }
                for domain in settings.search_domains(true) {
                    n.notify(ChangeEvent::search_removed(&device, domain.clone()));
                }
            }
            purge.push(index);
        }

        for index in purge {
            self.resolvers.remove(&index);
            tracing::debug!(index, "Purged resolver settings slot");
        }

        Ok(())
    }

    /// All name servers currently requested across sessions, in creation
    /// order, removal-marked slots excluded. Status reporting only — the
    /// apply cycle uses its own (reverse) ordering.
    #[must_use]
    pub fn dns_servers(&self) -> Vec<String> {
        self.resolvers
            .values()
            .flat_map(|s| s.name_servers(false).iter().cloned())
            .collect()
    }

    /// All search domains currently requested across sessions, in creation
    /// order, removal-marked slots excluded.
    #[must_use]
    pub fn search_domains(&self) -> Vec<String> {
        self.resolvers
            .values()
            .flat_map(|s| s.search_domains(false).iter().cloned())
            .collect()
    }
}
