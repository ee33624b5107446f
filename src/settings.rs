//! Per-session resolver settings.
//!
//! One [`ResolverSettings`] exists per VPN session that wants DNS
//! configuration. The owning session fills it in as the server pushes
//! options, enables it when the tunnel interface comes up, disables it on
//! teardown (keeping the data for a possible resume), and marks it for
//! removal when the session is destroyed for good. The actual application
//! to the system is driven by [`SettingsManager`](crate::SettingsManager).

use crate::error::{NetCfgError, Result};
use std::fmt;
use std::str::FromStr;

/// Whether a session's resolvers may answer any query or only queries for
/// its own search domains (split DNS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsScope {
    /// The resolvers handle all DNS queries.
    #[default]
    Global,
    /// The resolvers only handle queries for the session's search domains.
    Tunnel,
}

impl DnsScope {
    /// The canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Tunnel => "tunnel",
        }
    }
}

impl FromStr for DnsScope {
    type Err = NetCfgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "global" => Ok(Self::Global),
            "tunnel" => Ok(Self::Tunnel),
            _ => Err(NetCfgError::Validation {
                what: "DNS scope",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DnsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested DNSSEC validation behavior.
///
/// `Unset` defers to whatever the backend or system default is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnssecMode {
    /// No preference; leave the backend/system default alone.
    #[default]
    Unset,
    /// Validation disabled.
    No,
    /// Validation required.
    Yes,
    /// Validate when possible, fall back to unvalidated answers.
    Optional,
}

impl DnssecMode {
    /// The canonical string form (`Unset` has none and returns `"unset"`,
    /// which is not accepted on input).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::No => "no",
            Self::Yes => "yes",
            Self::Optional => "optional",
        }
    }
}

impl FromStr for DnssecMode {
    type Err = NetCfgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" => Ok(Self::No),
            "yes" => Ok(Self::Yes),
            "optional" => Ok(Self::Optional),
            _ => Err(NetCfgError::Validation {
                what: "DNSSEC mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DnssecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested DNS transport.
///
/// `Unset` defers to the backend/system default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsTransport {
    /// No preference; leave the backend/system default alone.
    #[default]
    Unset,
    /// Classic UDP/TCP port 53.
    Plain,
    /// DNS over TLS.
    Tls,
    /// DNS over HTTPS.
    Https,
}

impl DnsTransport {
    /// The canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Plain => "plain",
            Self::Tls => "dot",
            Self::Https => "doh",
        }
    }
}

impl FromStr for DnsTransport {
    type Err = NetCfgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Self::Plain),
            "dot" => Ok(Self::Tls),
            "doh" => Ok(Self::Https),
            _ => Err(NetCfgError::Validation {
                what: "DNS transport",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DnsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The DNS configuration one VPN session asks for.
///
/// # Lifecycle
///
/// 1. Created by [`SettingsManager::new_resolver_settings`] with a
///    process-unique, monotonically increasing index.
/// 2. Populated (`add_name_server`, `add_search_domain`, modes) by the
///    owning session.
/// 3. [`enable`](Self::enable)d when the tunnel interface is established,
///    [`disable`](Self::disable)d on teardown. Disabling keeps the stored
///    data — a disabled session is "temporarily inactive", not gone.
/// 4. [`prepare_removal`](Self::prepare_removal) when the session is
///    permanently destroyed; the manager purges it after the next apply
///    cycle.
///
/// A removal-marked object must never be handed fresh servers or domains;
/// create a new object for a new session instead.
///
/// [`SettingsManager::new_resolver_settings`]: crate::SettingsManager::new_resolver_settings
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    index: u32,
    enabled: bool,
    prepare_removal: bool,
    device_name: String,
    scope: DnsScope,
    name_servers: Vec<String>,
    search_domains: Vec<String>,
    dnssec: DnssecMode,
    transport: DnsTransport,
}

impl ResolverSettings {
    /// Creates an empty, disabled settings object with the given ordering
    /// index. Indices are assigned by the manager and never reused.
    pub(crate) const fn new(index: u32) -> Self {
        Self {
            index,
            enabled: false,
            prepare_removal: false,
            device_name: String::new(),
            scope: DnsScope::Global,
            name_servers: Vec::new(),
            search_domains: Vec::new(),
            dnssec: DnssecMode::Unset,
            transport: DnsTransport::Unset,
        }
    }

    /// The manager-assigned ordering index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Marks the settings active. Idempotent.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Marks the settings inactive without clearing any stored data.
    /// Idempotent.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Returns `true` if the settings are currently active.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Marks this object for deferred deletion. Idempotent.
    ///
    /// From now on the plain accessors return empty collections; the true
    /// contents remain reachable through the `removable` override so the
    /// manager can report the removal before purging the object.
    pub fn prepare_removal(&mut self) {
        self.prepare_removal = true;
    }

    /// Returns `true` once [`prepare_removal`](Self::prepare_removal) has
    /// been called.
    #[must_use]
    pub const fn removable(&self) -> bool {
        self.prepare_removal
    }

    /// Sets the virtual interface this session runs on.
    pub fn set_device_name(&mut self, device: impl Into<String>) {
        self.device_name = device.into();
    }

    /// The virtual interface name; empty until the tunnel is established.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Appends a name server unless an identical entry is already present.
    /// First-insertion order is preserved.
    pub fn add_name_server(&mut self, server: impl Into<String>) {
        let server = server.into();
        if !self.name_servers.contains(&server) {
            self.name_servers.push(server);
        }
    }

    /// Appends a search domain unless an identical entry is already
    /// present. First-insertion order is preserved.
    pub fn add_search_domain(&mut self, domain: impl Into<String>) {
        let domain = domain.into();
        if !self.search_domains.contains(&domain) {
            self.search_domains.push(domain);
        }
    }

    /// Drops all name servers.
    pub fn clear_name_servers(&mut self) {
        self.name_servers.clear();
    }

    /// Drops all search domains.
    pub fn clear_search_domains(&mut self) {
        self.search_domains.clear();
    }

    /// The requested name servers, in insertion order.
    ///
    /// Once the object is removal-marked this returns an empty slice unless
    /// `removable` is `true`.
    #[must_use]
    pub fn name_servers(&self, removable: bool) -> &[String] {
        if self.prepare_removal && !removable {
            &[]
        } else {
            &self.name_servers
        }
    }

    /// The requested search domains, in insertion order.
    ///
    /// Once the object is removal-marked this returns an empty slice unless
    /// `removable` is `true`.
    #[must_use]
    pub fn search_domains(&self, removable: bool) -> &[String] {
        if self.prepare_removal && !removable {
            &[]
        } else {
            &self.search_domains
        }
    }

    /// Returns `true` if there is anything to apply — at least one name
    /// server or search domain is stored (regardless of the removal mark).
    #[must_use]
    pub fn changes_available(&self) -> bool {
        !self.name_servers.is_empty() || !self.search_domains.is_empty()
    }

    /// Sets the DNS scope.
    pub fn set_scope(&mut self, scope: DnsScope) {
        self.scope = scope;
    }

    /// The DNS scope.
    #[must_use]
    pub const fn scope(&self) -> DnsScope {
        self.scope
    }

    /// Sets the DNSSEC mode.
    pub fn set_dnssec(&mut self, mode: DnssecMode) {
        self.dnssec = mode;
    }

    /// The DNSSEC mode.
    #[must_use]
    pub const fn dnssec(&self) -> DnssecMode {
        self.dnssec
    }

    /// Sets the DNS transport.
    pub fn set_transport(&mut self, transport: DnsTransport) {
        self.transport = transport;
    }

    /// The DNS transport.
    #[must_use]
    pub const fn transport(&self) -> DnsTransport {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_name_server_is_idempotent() {
        let mut s = ResolverSettings::new(1);
        s.add_name_server("1.1.1.1");
        s.add_name_server("8.8.8.8");
        s.add_name_server("1.1.1.1");
        s.add_name_server("1.1.1.1");
        assert_eq!(s.name_servers(false), ["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn add_search_domain_keeps_first_insertion_order() {
        let mut s = ResolverSettings::new(1);
        s.add_search_domain("b.example");
        s.add_search_domain("a.example");
        s.add_search_domain("b.example");
        assert_eq!(s.search_domains(false), ["b.example", "a.example"]);
    }

    #[test]
    fn removal_mark_hides_contents() {
        let mut s = ResolverSettings::new(3);
        s.add_name_server("1.1.1.1");
        s.add_search_domain("example.org");
        s.prepare_removal();

        assert!(s.name_servers(false).is_empty());
        assert!(s.search_domains(false).is_empty());
        assert_eq!(s.name_servers(true), ["1.1.1.1"]);
        assert_eq!(s.search_domains(true), ["example.org"]);
        // Still counts as having changes, so the manager reaches the purge.
        assert!(s.changes_available());
    }

    #[test]
    fn disable_keeps_data() {
        let mut s = ResolverSettings::new(2);
        s.enable();
        s.add_name_server("9.9.9.9");
        s.disable();
        assert!(!s.enabled());
        assert_eq!(s.name_servers(false), ["9.9.9.9"]);
    }

    #[test]
    fn changes_available_tracks_both_collections() {
        let mut s = ResolverSettings::new(1);
        assert!(!s.changes_available());
        s.add_search_domain("example.net");
        assert!(s.changes_available());
        s.clear_search_domains();
        assert!(!s.changes_available());
        s.add_name_server("1.1.1.1");
        assert!(s.changes_available());
        s.clear_name_servers();
        assert!(!s.changes_available());
    }

    #[test]
    fn scope_parses_documented_forms_only() {
        assert_eq!("global".parse::<DnsScope>().unwrap(), DnsScope::Global);
        assert_eq!("tunnel".parse::<DnsScope>().unwrap(), DnsScope::Tunnel);
        assert!("Global".parse::<DnsScope>().is_err());
        assert!("".parse::<DnsScope>().is_err());
    }

    #[test]
    fn dnssec_rejects_unknown_and_leaves_state_unchanged() {
        let mut s = ResolverSettings::new(1);
        s.set_dnssec(DnssecMode::Optional);

        let err = "allow-downgrade".parse::<DnssecMode>().unwrap_err();
        assert!(err.to_string().contains("allow-downgrade"));
        // Parse failed before any setter ran; the prior mode survives.
        assert_eq!(s.dnssec(), DnssecMode::Optional);
    }

    #[test]
    fn transport_parses_documented_forms_only() {
        assert_eq!("plain".parse::<DnsTransport>().unwrap(), DnsTransport::Plain);
        assert_eq!("dot".parse::<DnsTransport>().unwrap(), DnsTransport::Tls);
        assert_eq!("doh".parse::<DnsTransport>().unwrap(), DnsTransport::Https);
        assert!("tls".parse::<DnsTransport>().is_err());
        assert!("unset".parse::<DnsTransport>().is_err());
    }
}
