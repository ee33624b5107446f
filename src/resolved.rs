//! systemd-resolved per-link backend.
//!
//! Pushes each session's settings to `org.freedesktop.resolve1` over the
//! system bus, scoped to the session's tunnel link. Split DNS works here:
//! a `Tunnel`-scoped session only answers queries for its own search
//! domains, while a `Global`-scoped session additionally claims the
//! catch-all `.` routing domain and the link default route.
//!
//! The D-Bus surface is hidden behind [`ResolvedApi`] so the queueing,
//! capability-fallback and error-isolation logic can be exercised without
//! a bus.

use crate::backend::{ApplyMode, ResolverBackend};
use crate::error::{NetCfgError, Result};
use crate::notify::{ChangeEvent, NotifySink};
use crate::settings::{DnsScope, DnsTransport, DnssecMode, ResolverSettings};
use crate::util;
use std::collections::VecDeque;
use std::net::IpAddr;

/// The per-link operations the backend needs from systemd-resolved.
///
/// Implemented by [`Resolve1`] over D-Bus; tests substitute a scripted
/// fake.
pub trait ResolvedApi {
    /// Resolves a tunnel device name to the link index resolved knows it
    /// by.
    ///
    /// # Errors
    ///
    /// [`NetCfgError::LinkNotFound`] if the kernel or resolved has no
    /// record of the interface.
    fn link_index(&self, device: &str) -> Result<i32>;

    /// Replaces the link's DNS server list.
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn set_link_dns(&self, ifindex: i32, servers: &[IpAddr]) -> Result<()>;

    /// Replaces the link's search/routing domain list. The boolean marks a
    /// routing-only domain (`~domain` in resolvectl terms).
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn set_link_domains(&self, ifindex: i32, domains: &[(String, bool)]) -> Result<()>;

    /// Sets whether the link is a default route for DNS lookups. Optional
    /// capability; older daemons reject it with "unknown method".
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn set_link_default_route(&self, ifindex: i32, enable: bool) -> Result<()>;

    /// Sets the link DNSSEC mode (`"yes"`, `"no"`, `"allow-downgrade"`).
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn set_link_dnssec(&self, ifindex: i32, mode: &str) -> Result<()>;

    /// Sets the link DNS-over-TLS mode (`"yes"`, `"no"`,
    /// `"opportunistic"`).
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn set_link_dns_over_tls(&self, ifindex: i32, mode: &str) -> Result<()>;

    /// Reverts all per-link DNS configuration to defaults.
    ///
    /// # Errors
    ///
    /// Any failure reported by the resolver service.
    fn revert_link(&self, ifindex: i32) -> Result<()>;
}

/// One staged per-link update.
#[derive(Debug)]
struct LinkUpdate {
    ifindex: i32,
    device: String,
    /// A disabled update means "revert this link".
    enabled: bool,
    servers: Vec<IpAddr>,
    domains: Vec<(String, bool)>,
    dnssec: DnssecMode,
    transport: DnsTransport,
    default_route: bool,
}

/// Resolver backend configuring systemd-resolved per tunnel link.
///
/// Applies **after** interface creation — the link must exist for its
/// index to resolve.
pub struct SystemdResolvedBackend<A> {
    api: A,
    /// Staged updates in the order the manager delivered them (newest
    /// session first); drained front-to-back on commit so that order is
    /// kept.
    queue: VecDeque<LinkUpdate>,
    /// Cleared for the process lifetime after the first "unknown method"
    /// rejection; never retried.
    default_route_supported: bool,
    /// Set for the process lifetime once a daemon rejects enforced
    /// DNS-over-TLS; all later links get the opportunistic mode directly.
    dot_downgraded: bool,
}

impl SystemdResolvedBackend<Resolve1> {
    /// Connects to systemd-resolved on the system bus.
    ///
    /// # Errors
    ///
    /// Returns [`NetCfgError::Dbus`] if the bus connection or proxy setup
    /// fails.
    pub fn new() -> Result<Self> {
        Ok(Self::with_api(Resolve1::connect()?))
    }
}

impl<A: ResolvedApi> SystemdResolvedBackend<A> {
    /// Creates a backend over an arbitrary [`ResolvedApi`] implementation.
    pub const fn with_api(api: A) -> Self {
        Self {
            api,
            queue: VecDeque::new(),
            default_route_supported: true,
            dot_downgraded: false,
        }
    }

    /// Sets the link default-route flag, skipping the call entirely once
    /// the capability is known to be missing. Returns whether the flag was
    /// actually set.
    fn set_default_route(&mut self, update: &LinkUpdate) -> bool {
        if !self.default_route_supported {
            return false;
        }
        match self
            .api
            .set_link_default_route(update.ifindex, update.default_route)
        {
            Ok(()) => true,
            Err(e) if e.is_unknown_method() => {
                tracing::info!(
                    "systemd-resolved does not support per-link default routes; disabling the feature"
                );
                self.default_route_supported = false;
                false
            }
            Err(e) => {
                tracing::warn!(
                    device = %update.device,
                    error = %e,
                    "Failed to set DNS default route on link"
                );
                false
            }
        }
    }

    fn set_dnssec(&self, update: &LinkUpdate) {
        let mode = match update.dnssec {
            DnssecMode::Unset => return,
            DnssecMode::No => "no",
            DnssecMode::Yes => "yes",
            DnssecMode::Optional => "allow-downgrade",
        };
        if let Err(e) = self.api.set_link_dnssec(update.ifindex, mode) {
            tracing::warn!(
                device = %update.device,
                mode,
                error = %e,
                "Failed to set DNSSEC mode on link"
            );
        }
    }

    fn set_transport(&mut self, update: &LinkUpdate) {
        let mode = match update.transport {
            DnsTransport::Unset => return,
            DnsTransport::Plain => "no",
            DnsTransport::Tls if self.dot_downgraded => "opportunistic",
            DnsTransport::Tls => "yes",
            DnsTransport::Https => {
                tracing::warn!(
                    device = %update.device,
                    "DNS over HTTPS is not supported by systemd-resolved; leaving transport alone"
                );
                return;
            }
        };

        let Err(e) = self.api.set_link_dns_over_tls(update.ifindex, mode) else {
            return;
        };

        if mode == "yes" && e.is_invalid_setting() {
            // The daemon does not accept the enforced mode. Downgrade this
            // link and all future links to opportunistic.
            tracing::info!(
                device = %update.device,
                "Enforced DNS over TLS rejected, downgrading to opportunistic mode"
            );
            self.dot_downgraded = true;
            if let Err(e) = self
                .api
                .set_link_dns_over_tls(update.ifindex, "opportunistic")
            {
                tracing::warn!(
                    device = %update.device,
                    error = %e,
                    "Failed to set opportunistic DNS over TLS on link"
                );
            }
        } else {
            tracing::warn!(
                device = %update.device,
                mode,
                error = %e,
                "Failed to set DNS over TLS mode on link"
            );
        }
    }
}

impl<A: ResolvedApi> ResolverBackend for SystemdResolvedBackend<A> {
    fn info(&self) -> String {
        "systemd-resolved backend (org.freedesktop.resolve1)".to_string()
    }

    fn apply_mode(&self) -> ApplyMode {
        ApplyMode::Post
    }

    fn apply(&mut self, settings: &ResolverSettings) -> Result<()> {
        let device = settings.device_name();
        // The tunnel is up by the time we run (post mode); a missing link
        // is a hard error, not something to paper over.
        let ifindex = self.api.link_index(device)?;

        let mut update = LinkUpdate {
            ifindex,
            device: device.to_owned(),
            enabled: settings.enabled(),
            servers: Vec::new(),
            domains: Vec::new(),
            dnssec: DnssecMode::Unset,
            transport: DnsTransport::Unset,
            default_route: false,
        };

        if settings.enabled() {
            for server in settings.name_servers(false) {
                match server.parse::<IpAddr>() {
                    Ok(addr) => update.servers.push(addr),
                    Err(_) => tracing::warn!(
                        device,
                        server = %server,
                        "Skipping value that is not a valid DNS server address"
                    ),
                }
            }
            for domain in settings.search_domains(false) {
                update.domains.push((domain.clone(), false));
            }
            update.dnssec = settings.dnssec();
            update.transport = settings.transport();
            if settings.scope() == DnsScope::Global {
                // Claim all queries not matched by a more specific domain.
                update.domains.push((".".to_string(), true));
                update.default_route = true;
            }
        }

        self.queue.push_back(update);
        Ok(())
    }

    /// Drains the staged updates. Per-link failures are logged and isolate
    /// to that link; they never propagate, so one broken link cannot block
    /// the rest of the batch.
    fn commit(&mut self, notifier: Option<&mut dyn NotifySink>) -> Result<()> {
        let mut notifier = notifier;

        while let Some(update) = self.queue.pop_front() {
            if !update.enabled {
                if let Err(e) = self.api.revert_link(update.ifindex) {
                    tracing::warn!(
                        device = %update.device,
                        error = %e,
                        "Failed to revert DNS configuration on link"
                    );
                }
                continue;
            }

            let servers_applied = match self.api.set_link_dns(update.ifindex, &update.servers) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        device = %update.device,
                        error = %e,
                        "Failed to set DNS servers on link"
                    );
                    false
                }
            };
            let domains_applied = match self.api.set_link_domains(update.ifindex, &update.domains)
            {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        device = %update.device,
                        error = %e,
                        "Failed to set DNS search domains on link"
                    );
                    false
                }
            };

            self.set_default_route(&update);
            self.set_dnssec(&update);
            self.set_transport(&update);

            // Only the successfully applied half reports additions.
            if let Some(ref mut n) = notifier {
                if servers_applied {
                    for server in &update.servers {
                        n.notify(ChangeEvent::server_added(&update.device, server.to_string()));
                    }
                }
                if domains_applied {
                    for (domain, routing_only) in &update.domains {
                        if !routing_only {
                            n.notify(ChangeEvent::search_added(&update.device, domain.clone()));
                        }
                    }
                }
            }

            tracing::debug!(
                device = %update.device,
                servers = update.servers.len(),
                domains = update.domains.len(),
                servers_applied,
                domains_applied,
                "Configured DNS on link"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// D-Bus proxy implementation
// ---------------------------------------------------------------------------

#[zbus::proxy(
    interface = "org.freedesktop.resolve1.Manager",
    default_service = "org.freedesktop.resolve1",
    default_path = "/org/freedesktop/resolve1"
)]
trait Resolve1Manager {
    fn get_link(&self, ifindex: i32) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;

    #[zbus(name = "SetLinkDNS")]
    fn set_link_dns(&self, ifindex: i32, addresses: Vec<(i32, Vec<u8>)>) -> zbus::Result<()>;

    fn set_link_domains(&self, ifindex: i32, domains: Vec<(String, bool)>) -> zbus::Result<()>;

    fn set_link_default_route(&self, ifindex: i32, enable: bool) -> zbus::Result<()>;

    #[zbus(name = "SetLinkDNSSEC")]
    fn set_link_dnssec(&self, ifindex: i32, mode: String) -> zbus::Result<()>;

    #[zbus(name = "SetLinkDNSOverTLS")]
    fn set_link_dns_over_tls(&self, ifindex: i32, mode: String) -> zbus::Result<()>;

    fn revert_link(&self, ifindex: i32) -> zbus::Result<()>;
}

/// Blocking D-Bus client for `org.freedesktop.resolve1.Manager`.
pub struct Resolve1 {
    proxy: Resolve1ManagerProxyBlocking<'static>,
}

impl Resolve1 {
    /// Connects to the system bus and binds the resolve1 manager proxy.
    ///
    /// # Errors
    ///
    /// Returns [`NetCfgError::Dbus`] if the connection or proxy setup
    /// fails.
    pub fn connect() -> Result<Self> {
        let connection = zbus::blocking::Connection::system()?;
        let proxy = Resolve1ManagerProxyBlocking::new(&connection)?;
        Ok(Self { proxy })
    }
}

impl ResolvedApi for Resolve1 {
    fn link_index(&self, device: &str) -> Result<i32> {
        let index = util::link_index(device).ok_or_else(|| NetCfgError::LinkNotFound {
            device: device.to_string(),
        })?;
        let index = i32::try_from(index).map_err(|_| NetCfgError::LinkNotFound {
            device: device.to_string(),
        })?;
        // Confirm resolved tracks the link before queueing work for it.
        let path = self.proxy.get_link(index).map_err(|e| {
            tracing::debug!(device, index, error = %e, "resolved has no link object");
            NetCfgError::LinkNotFound {
                device: device.to_string(),
            }
        })?;
        tracing::trace!(device, index, path = %path.as_str(), "Resolved DNS link");
        Ok(index)
    }

    fn set_link_dns(&self, ifindex: i32, servers: &[IpAddr]) -> Result<()> {
        let addresses = servers
            .iter()
            .map(|addr| match addr {
                IpAddr::V4(v4) => (libc::AF_INET, v4.octets().to_vec()),
                IpAddr::V6(v6) => {
                    tracing::trace!(address = %util::expand_ipv6(*v6), "Marshalling IPv6 DNS server");
                    (libc::AF_INET6, v6.octets().to_vec())
                }
            })
            .collect();
        self.proxy.set_link_dns(ifindex, addresses)?;
        Ok(())
    }

    fn set_link_domains(&self, ifindex: i32, domains: &[(String, bool)]) -> Result<()> {
        self.proxy.set_link_domains(ifindex, domains.to_vec())?;
        Ok(())
    }

    fn set_link_default_route(&self, ifindex: i32, enable: bool) -> Result<()> {
        self.proxy.set_link_default_route(ifindex, enable)?;
        Ok(())
    }

    fn set_link_dnssec(&self, ifindex: i32, mode: &str) -> Result<()> {
        self.proxy.set_link_dnssec(ifindex, mode.to_string())?;
        Ok(())
    }

    fn set_link_dns_over_tls(&self, ifindex: i32, mode: &str) -> Result<()> {
        self.proxy.set_link_dns_over_tls(ifindex, mode.to_string())?;
        Ok(())
    }

    fn revert_link(&self, ifindex: i32) -> Result<()> {
        self.proxy.revert_link(ifindex)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeKind;
    use std::cell::RefCell;

    fn unknown_method() -> NetCfgError {
        NetCfgError::Dbus(zbus::Error::FDO(Box::new(
            zbus::fdo::Error::UnknownMethod("Unknown method SetLinkDefaultRoute".into()),
        )))
    }

    fn invalid_setting() -> NetCfgError {
        NetCfgError::Dbus(zbus::Error::FDO(Box::new(zbus::fdo::Error::InvalidArgs(
            "Invalid DNSOverTLS setting".into(),
        ))))
    }

    fn transient() -> NetCfgError {
        NetCfgError::Dbus(zbus::Error::FDO(Box::new(zbus::fdo::Error::Failed(
            "link is gone".into(),
        ))))
    }

    /// Scripted resolve1 stand-in recording every call as a string.
    #[derive(Default)]
    struct FakeApi {
        calls: RefCell<Vec<String>>,
        default_route_unknown: bool,
        reject_enforced_dot: bool,
        fail_dns_on: Option<i32>,
        fail_domains_on: Option<i32>,
        missing_device: Option<String>,
    }

    impl FakeApi {
        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ResolvedApi for FakeApi {
        fn link_index(&self, device: &str) -> Result<i32> {
            if self.missing_device.as_deref() == Some(device) {
                return Err(NetCfgError::LinkNotFound {
                    device: device.to_string(),
                });
            }
            // tun3 -> 3 etc., keeps the scripts readable.
            Ok(device
                .trim_start_matches(|c: char| c.is_alphabetic())
                .parse()
                .unwrap_or(1))
        }

        fn set_link_dns(&self, ifindex: i32, servers: &[IpAddr]) -> Result<()> {
            if self.fail_dns_on == Some(ifindex) {
                return Err(transient());
            }
            let list: Vec<String> = servers.iter().map(ToString::to_string).collect();
            self.record(format!("dns({ifindex}, [{}])", list.join(", ")));
            Ok(())
        }

        fn set_link_domains(&self, ifindex: i32, domains: &[(String, bool)]) -> Result<()> {
            if self.fail_domains_on == Some(ifindex) {
                return Err(transient());
            }
            let list: Vec<String> = domains
                .iter()
                .map(|(d, routing)| {
                    if *routing {
                        format!("~{d}")
                    } else {
                        d.clone()
                    }
                })
                .collect();
            self.record(format!("domains({ifindex}, [{}])", list.join(", ")));
            Ok(())
        }

        fn set_link_default_route(&self, ifindex: i32, enable: bool) -> Result<()> {
            self.record(format!("default_route({ifindex}, {enable})"));
            if self.default_route_unknown {
                return Err(unknown_method());
            }
            Ok(())
        }

        fn set_link_dnssec(&self, ifindex: i32, mode: &str) -> Result<()> {
            self.record(format!("dnssec({ifindex}, {mode})"));
            Ok(())
        }

        fn set_link_dns_over_tls(&self, ifindex: i32, mode: &str) -> Result<()> {
            self.record(format!("dot({ifindex}, {mode})"));
            if self.reject_enforced_dot && mode == "yes" {
                return Err(invalid_setting());
            }
            Ok(())
        }

        fn revert_link(&self, ifindex: i32) -> Result<()> {
            self.record(format!("revert({ifindex})"));
            Ok(())
        }
    }

    fn settings(device: &str, enabled: bool, servers: &[&str]) -> ResolverSettings {
        let mut s = ResolverSettings::new(1);
        s.set_device_name(device);
        if enabled {
            s.enable();
        }
        for server in servers {
            s.add_name_server(*server);
        }
        s
    }

    #[test]
    fn global_scope_adds_routing_domain_and_default_route() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        let mut s = settings("tun4", true, &["10.8.0.1"]);
        s.add_search_domain("corp.example");
        backend.apply(&s).unwrap();

        let mut events: Vec<ChangeEvent> = Vec::new();
        backend.commit(Some(&mut events)).unwrap();

        let calls = backend.api.calls();
        assert_eq!(
            calls,
            [
                "dns(4, [10.8.0.1])",
                "domains(4, [corp.example, ~.])",
                "default_route(4, true)",
            ]
        );
        // The routing-only catch-all is plumbing, not a reportable search
        // domain.
        let kinds: Vec<ChangeKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [ChangeKind::DnsServerAdded, ChangeKind::DnsSearchAdded]);
        assert_eq!(events[1].value, "corp.example");
    }

    #[test]
    fn tunnel_scope_leaves_default_route_alone() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        let mut s = settings("tun4", true, &["10.8.0.1"]);
        s.add_search_domain("corp.example");
        s.set_scope(DnsScope::Tunnel);
        backend.apply(&s).unwrap();
        backend.commit(None).unwrap();

        let calls = backend.api.calls();
        assert_eq!(
            calls,
            [
                "dns(4, [10.8.0.1])",
                "domains(4, [corp.example])",
                "default_route(4, false)",
            ]
        );
    }

    #[test]
    fn disabled_update_reverts_and_does_nothing_else() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        backend.apply(&settings("tun7", false, &["10.8.0.1"])).unwrap();

        let mut events: Vec<ChangeEvent> = Vec::new();
        backend.commit(Some(&mut events)).unwrap();

        assert_eq!(backend.api.calls(), ["revert(7)"]);
        assert!(events.is_empty());
    }

    #[test]
    fn missing_link_fails_apply_loudly() {
        let api = FakeApi {
            missing_device: Some("tun9".to_string()),
            ..FakeApi::default()
        };
        let mut backend = SystemdResolvedBackend::with_api(api);
        let err = backend.apply(&settings("tun9", true, &["10.8.0.1"])).unwrap_err();
        assert!(matches!(err, NetCfgError::LinkNotFound { device } if device == "tun9"));
    }

    #[test]
    fn unparseable_server_is_skipped_not_fatal() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        backend
            .apply(&settings("tun4", true, &["10.8.0.1", "not-an-address", "2001:db8::1"]))
            .unwrap();
        backend.commit(None).unwrap();

        assert_eq!(backend.api.calls()[0], "dns(4, [10.8.0.1, 2001:db8::1])");
    }

    #[test]
    fn default_route_rejection_is_sticky() {
        let api = FakeApi {
            default_route_unknown: true,
            ..FakeApi::default()
        };
        let mut backend = SystemdResolvedBackend::with_api(api);

        backend.apply(&settings("tun1", true, &["10.8.0.1"])).unwrap();
        backend.apply(&settings("tun2", true, &["10.8.0.2"])).unwrap();
        backend.commit(None).unwrap();

        let route_calls: Vec<String> = backend
            .api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("default_route"))
            .collect();
        // Only the first link ever attempted the call.
        assert_eq!(route_calls, ["default_route(1, true)"]);
        assert!(!backend.default_route_supported);

        // A later cycle does not re-attempt either.
        backend.apply(&settings("tun3", true, &["10.8.0.3"])).unwrap();
        backend.commit(None).unwrap();
        let route_calls: Vec<String> = backend
            .api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("default_route"))
            .collect();
        assert_eq!(route_calls.len(), 1);
    }

    #[test]
    fn enforced_dot_downgrades_to_opportunistic_and_stays_there() {
        let api = FakeApi {
            reject_enforced_dot: true,
            ..FakeApi::default()
        };
        let mut backend = SystemdResolvedBackend::with_api(api);

        let mut first = settings("tun1", true, &["10.8.0.1"]);
        first.set_transport(DnsTransport::Tls);
        let mut second = settings("tun2", true, &["10.8.0.2"]);
        second.set_transport(DnsTransport::Tls);

        backend.apply(&first).unwrap();
        backend.apply(&second).unwrap();
        backend.commit(None).unwrap();

        let dot_calls: Vec<String> = backend
            .api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("dot"))
            .collect();
        assert_eq!(
            dot_calls,
            ["dot(1, yes)", "dot(1, opportunistic)", "dot(2, opportunistic)"]
        );
        assert!(backend.dot_downgraded);
    }

    #[test]
    fn dnssec_modes_map_to_resolved_strings() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        let mut s = settings("tun1", true, &["10.8.0.1"]);
        s.set_dnssec(DnssecMode::Optional);
        backend.apply(&s).unwrap();
        backend.commit(None).unwrap();

        assert!(backend
            .api
            .calls()
            .contains(&"dnssec(1, allow-downgrade)".to_string()));
    }

    #[test]
    fn one_failing_link_does_not_stop_the_batch() {
        let api = FakeApi {
            fail_dns_on: Some(1),
            ..FakeApi::default()
        };
        let mut backend = SystemdResolvedBackend::with_api(api);

        let mut one = settings("tun1", true, &["10.8.0.1"]);
        one.add_search_domain("one.example");
        let mut two = settings("tun2", true, &["10.8.0.2"]);
        two.add_search_domain("two.example");

        backend.apply(&one).unwrap();
        backend.apply(&two).unwrap();

        let mut events: Vec<ChangeEvent> = Vec::new();
        backend.commit(Some(&mut events)).unwrap();

        // Link 1's server push failed: no server event for it, but its
        // domains applied and are reported; link 2 reports both halves.
        let summary: Vec<(ChangeKind, &str)> =
            events.iter().map(|e| (e.kind, e.value.as_str())).collect();
        assert_eq!(
            summary,
            [
                (ChangeKind::DnsSearchAdded, "one.example"),
                (ChangeKind::DnsServerAdded, "10.8.0.2"),
                (ChangeKind::DnsSearchAdded, "two.example"),
            ]
        );
    }

    #[test]
    fn commit_preserves_manager_delivery_order() {
        let mut backend = SystemdResolvedBackend::with_api(FakeApi::default());
        backend.apply(&settings("tun3", true, &["3.3.3.3"])).unwrap();
        backend.apply(&settings("tun2", true, &["2.2.2.2"])).unwrap();
        backend.apply(&settings("tun1", true, &["1.1.1.1"])).unwrap();
        backend.commit(None).unwrap();

        let dns_calls: Vec<String> = backend
            .api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("dns"))
            .collect();
        assert_eq!(
            dns_calls,
            ["dns(3, [3.3.3.3])", "dns(2, [2.2.2.2])", "dns(1, [1.1.1.1])"]
        );
    }
}
