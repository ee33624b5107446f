//! # netcfg-dns
//!
//! Coordinate DNS resolver settings across concurrent VPN sessions and a
//! shared system resolver backend — either a raw resolv.conf style file or
//! systemd-resolved over D-Bus.
//!
//! Each session gets a [`ResolverSettings`] slot recording what it wants
//! (name servers, search domains, scope, DNSSEC/transport modes). The
//! [`SettingsManager`] keeps all slots in creation order and, on every
//! apply cycle, stages the live ones into the configured backend newest
//! first — so the most recently connected VPN wins where settings overlap —
//! then commits once and reports per-entry change events.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use netcfg_dns::{ResolvConfBackend, SettingsManager};
//!
//! let backend = ResolvConfBackend::with_backup(
//!     "/etc/resolv.conf",
//!     "/etc/resolv.conf.netcfg-backup",
//! );
//! let mut manager = SettingsManager::new(backend);
//!
//! // Session comes up.
//! let id = manager.new_resolver_settings();
//! let settings = manager.settings_mut(id).unwrap();
//! settings.set_device_name("tun0");
//! settings.add_name_server("10.8.0.1");
//! settings.add_search_domain("corp.example");
//! settings.enable();
//! manager.apply_settings(None)?;
//!
//! // Session goes away for good.
//! manager.settings_mut(id).unwrap().prepare_removal();
//! manager.apply_settings(None)?;
//! ```
//!
//! ## Backends
//!
//! * [`ResolvConfBackend`] rewrites the resolver file directly, keeping a
//!   backup it restores when the last session retracts its settings (and,
//!   best effort, on drop). Applies **before** the tunnel interface exists;
//!   cannot do split DNS.
//! * [`SystemdResolvedBackend`] pushes settings per tunnel link over the
//!   `org.freedesktop.resolve1` system-bus interface. Applies **after** the
//!   interface exists (the link index must resolve); supports split DNS via
//!   tunnel scope.
//!
//! The backend is chosen once at construction and drives the whole process
//! lifetime.
//!
//! ## Permissions
//!
//! Rewriting `/etc/resolv.conf` or calling the resolve1 manager methods
//! requires root (or the matching polkit grants). The caller is responsible
//! for privilege handling.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod manager;
pub mod notify;
pub mod resolvconf;
pub mod resolved;
pub mod settings;
pub mod util;

pub use backend::{ApplyMode, ResolverBackend};
pub use error::{NetCfgError, Result};
pub use manager::{SettingsId, SettingsManager};
pub use notify::{ChangeEvent, ChangeKind, NotifySink};
pub use resolvconf::{DEFAULT_RESOLV_CONF, ResolvConfBackend};
pub use resolved::{Resolve1, ResolvedApi, SystemdResolvedBackend};
pub use settings::{DnsScope, DnsTransport, DnssecMode, ResolverSettings};
