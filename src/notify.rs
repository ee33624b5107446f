//! Structured change notifications.
//!
//! Backends report every externally visible DNS change — a server or search
//! domain coming or going — as a [`ChangeEvent`] delivered to a caller-owned
//! [`NotifySink`]. The service layer typically forwards these as D-Bus
//! signals; tests collect them in a `Vec`.

/// What kind of change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A DNS server became active.
    DnsServerAdded,
    /// A DNS server was retired.
    DnsServerRemoved,
    /// A search domain became active.
    DnsSearchAdded,
    /// A search domain was retired.
    DnsSearchRemoved,
}

/// One resolver configuration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The kind of change.
    pub kind: ChangeKind,
    /// The virtual interface the owning session runs on (may be empty for
    /// system-wide backends before a tunnel is established).
    pub device: String,
    /// The affected server address or search domain.
    pub value: String,
}

impl ChangeEvent {
    /// The detail key this event would carry in a key/value map
    /// (`"dns_server"` or `"search_domain"`).
    #[must_use]
    pub const fn detail_key(&self) -> &'static str {
        match self.kind {
            ChangeKind::DnsServerAdded | ChangeKind::DnsServerRemoved => "dns_server",
            ChangeKind::DnsSearchAdded | ChangeKind::DnsSearchRemoved => "search_domain",
        }
    }

    /// A "DNS server added" event.
    #[must_use]
    pub fn server_added(device: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::DnsServerAdded,
            device: device.into(),
            value: server.into(),
        }
    }

    /// A "DNS server removed" event.
    #[must_use]
    pub fn server_removed(device: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::DnsServerRemoved,
            device: device.into(),
            value: server.into(),
        }
    }

    /// A "search domain added" event.
    #[must_use]
    pub fn search_added(device: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::DnsSearchAdded,
            device: device.into(),
            value: domain.into(),
        }
    }

    /// A "search domain removed" event.
    #[must_use]
    pub fn search_removed(device: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::DnsSearchRemoved,
            device: device.into(),
            value: domain.into(),
        }
    }
}

/// Receives [`ChangeEvent`]s during an apply cycle.
///
/// Within one [`apply_settings`](crate::SettingsManager::apply_settings)
/// call, all addition events (emitted by the backend's commit) are delivered
/// before any removal events (emitted for purged sessions).
pub trait NotifySink {
    /// Delivers one change event.
    fn notify(&mut self, event: ChangeEvent);
}

impl NotifySink for Vec<ChangeEvent> {
    fn notify(&mut self, event: ChangeEvent) {
        self.push(event);
    }
}
