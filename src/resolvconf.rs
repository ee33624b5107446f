//! Direct resolv.conf file backend.
//!
//! Rewrites a flat resolver file (normally `/etc/resolv.conf`) in place,
//! layering VPN-provided servers and domains over whatever the system
//! already had. Content this process did not put there is preserved:
//! recognized system entries are carried along in their own block, and
//! lines that are neither `nameserver`/`search` directives nor comments
//! pass through verbatim.
//!
//! A backup of the pristine file is taken before the first write and
//! restored when the last session's changes are retracted — and, best
//! effort, on drop, so an exiting process does not leave the system file
//! permanently altered.

use crate::backend::{ApplyMode, ResolverBackend};
use crate::error::{NetCfgError, Result};
use crate::notify::{ChangeEvent, NotifySink};
use crate::settings::{DnsScope, ResolverSettings};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Default resolver file location.
pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// Appends `value` unless an identical entry is already present.
fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|v| v == value)
}

/// Resolver backend rewriting a resolv.conf style file.
///
/// Applies **before** interface creation — nothing here depends on the
/// tunnel device existing.
///
/// # Entry classification
///
/// Parsed file content is kept in four disjoint buckets:
///
/// - *VPN added*: entries staged by sessions this cycle; cleared each
///   commit.
/// - *VPN removed*: entries retracted this cycle; only used to stop them
///   being re-adopted as system entries when the file is re-read.
/// - *System*: entries discovered in the file that this process did not
///   put there; sticky across commits.
/// - *Unprocessed*: verbatim lines the parser does not recognize.
pub struct ResolvConfBackend {
    path: PathBuf,
    backup_path: Option<PathBuf>,
    backup_pending: bool,

    vpn_servers: Vec<String>,
    vpn_servers_removed: Vec<String>,
    vpn_search: Vec<String>,
    vpn_search_removed: Vec<String>,
    system_servers: Vec<String>,
    system_search: Vec<String>,
    unprocessed: Vec<String>,

    /// Number of `apply` calls since the last commit; zero means the cycle
    /// is a no-op and any pending backup is restored instead of writing.
    modified: u32,
    /// A session asked for split DNS, which this backend cannot honor.
    tunnel_scope_seen: bool,
    queued: Vec<ChangeEvent>,
}

impl ResolvConfBackend {
    /// Creates a backend managing `path`, without backup rotation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: None,
            backup_pending: false,
            vpn_servers: Vec::new(),
            vpn_servers_removed: Vec::new(),
            vpn_search: Vec::new(),
            vpn_search_removed: Vec::new(),
            system_servers: Vec::new(),
            system_search: Vec::new(),
            unprocessed: Vec::new(),
            modified: 0,
            tunnel_scope_seen: false,
            queued: Vec::new(),
        }
    }

    /// Creates a backend managing `path` that backs the pristine file up to
    /// `backup` before its first write and restores it when the last
    /// change is retracted (or on drop).
    #[must_use]
    pub fn with_backup(path: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        let mut backend = Self::new(path);
        backend.backup_path = Some(backup.into());
        backend
    }

    /// The managed file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the pristine file from the pending backup, if any.
    ///
    /// # Errors
    ///
    /// Returns [`NetCfgError::File`] if the rename fails for any reason
    /// other than the backup file being gone already.
    pub fn restore_backup(&mut self) -> Result<()> {
        let Some(backup) = self.backup_path.clone() else {
            return Ok(());
        };
        if !self.backup_pending {
            return Ok(());
        }
        match fs::rename(&backup, &self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Restored resolver file from backup");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(backup = %backup.display(), "No backup file to restore");
            }
            Err(e) => return Err(NetCfgError::file(backup, e)),
        }
        self.backup_pending = false;
        Ok(())
    }

    /// Re-reads the managed file and classifies its content.
    ///
    /// The on-disk state is authoritative: other processes may have edited
    /// the file between commits. Directive lines are `"nameserver "` (one
    /// address) and `"search "` (space-separated domains); `#` comments are
    /// dropped on regeneration; everything else is preserved verbatim.
    fn parse_current_file(&mut self) -> Result<()> {
        self.unprocessed.clear();

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Resolver file does not exist yet");
                return Ok(());
            }
            Err(e) => return Err(NetCfgError::file(&self.path, e)),
        };

        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(server) = line.strip_prefix("nameserver ") {
                self.adopt_system_server(server.trim());
            } else if let Some(domains) = line.strip_prefix("search ") {
                for domain in domains.split_whitespace() {
                    self.adopt_system_domain(domain);
                }
            } else {
                self.unprocessed.push(line.to_string());
            }
        }
        Ok(())
    }

    /// Adopts a parsed name server as system-owned unless this process put
    /// it there (current cycle) or just retracted it.
    fn adopt_system_server(&mut self, server: &str) {
        if contains(&self.system_servers, server)
            || contains(&self.vpn_servers, server)
            || contains(&self.vpn_servers_removed, server)
        {
            return;
        }
        self.system_servers.push(server.to_string());
    }

    fn adopt_system_domain(&mut self, domain: &str) {
        if contains(&self.system_search, domain)
            || contains(&self.vpn_search, domain)
            || contains(&self.vpn_search_removed, domain)
        {
            return;
        }
        self.system_search.push(domain.to_string());
    }

    /// Regenerates the full file content: header, merged `search` line
    /// (VPN domains first), VPN and system `nameserver` blocks, then the
    /// unrecognized lines verbatim.
    fn generate(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#");
        let _ = writeln!(out, "# Generated by netcfg-dns");
        let _ = writeln!(
            out,
            "# {}",
            humantime::format_rfc3339_seconds(SystemTime::now())
        );
        let _ = writeln!(out, "#");

        if !self.vpn_search.is_empty() || !self.system_search.is_empty() {
            let domains: Vec<&str> = self
                .vpn_search
                .iter()
                .chain(self.system_search.iter())
                .map(String::as_str)
                .collect();
            let _ = writeln!(out, "search {}", domains.join(" "));
        }

        if !self.vpn_servers.is_empty() {
            let _ = writeln!(out, "\n# VPN defined name servers");
            for server in &self.vpn_servers {
                let _ = writeln!(out, "nameserver {server}");
            }
        }

        if !self.system_servers.is_empty() {
            let _ = writeln!(out, "\n# System defined name servers");
            for server in &self.system_servers {
                let _ = writeln!(out, "nameserver {server}");
            }
        }

        if !self.unprocessed.is_empty() {
            let _ = writeln!(out);
            for line in &self.unprocessed {
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }

    /// Takes the one-time backup of the pristine file, if configured and
    /// not already pending. A missing source file just means there is
    /// nothing to back up.
    fn take_backup(&mut self) -> Result<()> {
        let Some(backup) = self.backup_path.clone() else {
            return Ok(());
        };
        if self.backup_pending {
            return Ok(());
        }
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                self.backup_pending = true;
                tracing::debug!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Backed up resolver file"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(NetCfgError::file(backup, e)),
        }
        Ok(())
    }
}

impl ResolverBackend for ResolvConfBackend {
    fn info(&self) -> String {
        format!("ResolvConf file backend: {}", self.path.display())
    }

    fn apply_mode(&self) -> ApplyMode {
        ApplyMode::Pre
    }

    fn apply(&mut self, settings: &ResolverSettings) -> Result<()> {
        let device = settings.device_name().to_owned();

        if settings.enabled() {
            for server in settings.name_servers(false) {
                push_unique(&mut self.vpn_servers, server);
                self.queued
                    .push(ChangeEvent::server_added(&device, server.clone()));
            }
            for domain in settings.search_domains(false) {
                push_unique(&mut self.vpn_search, domain);
                self.queued
                    .push(ChangeEvent::search_added(&device, domain.clone()));
            }
            if settings.scope() == DnsScope::Tunnel {
                self.tunnel_scope_seen = true;
            }
        } else {
            for server in settings.name_servers(false) {
                push_unique(&mut self.vpn_servers_removed, server);
                self.queued
                    .push(ChangeEvent::server_removed(&device, server.clone()));
            }
            for domain in settings.search_domains(false) {
                push_unique(&mut self.vpn_search_removed, domain);
                self.queued
                    .push(ChangeEvent::search_removed(&device, domain.clone()));
            }
        }

        self.modified += 1;
        Ok(())
    }

    /// Serialization note: the exclusive `&mut self` receiver is what keeps
    /// the read-modify-write of the shared file from interleaving; callers
    /// sharing one backend across threads must wrap it (or the owning
    /// manager) in a lock.
    fn commit(&mut self, notifier: Option<&mut dyn NotifySink>) -> Result<()> {
        // Always trust current on-disk state over anything cached.
        self.parse_current_file()?;

        if self.modified > 0 {
            self.take_backup()?;
            let content = self.generate();
            fs::write(&self.path, content).map_err(|e| NetCfgError::file(&self.path, e))?;
            tracing::info!(
                path = %self.path.display(),
                vpn_servers = self.vpn_servers.len(),
                system_servers = self.system_servers.len(),
                "Rewrote resolver file"
            );
        } else {
            // Nothing applied this cycle: hand the file back to the system.
            // The restored content may differ from what was last parsed, so
            // force a fresh classification next cycle.
            self.restore_backup()?;
            self.system_servers.clear();
            self.system_search.clear();
        }

        if self.tunnel_scope_seen {
            tracing::warn!(
                path = %self.path.display(),
                "Split DNS requested, but the resolv.conf backend can only apply resolvers globally"
            );
            self.tunnel_scope_seen = false;
        }

        self.vpn_servers.clear();
        self.vpn_servers_removed.clear();
        self.vpn_search.clear();
        self.vpn_search_removed.clear();
        self.modified = 0;

        if let Some(n) = notifier {
            for event in self.queued.drain(..) {
                n.notify(event);
            }
        } else {
            self.queued.clear();
        }
        Ok(())
    }
}

impl Drop for ResolvConfBackend {
    fn drop(&mut self) {
        if let Err(e) = self.restore_backup() {
            tracing::warn!(error = %e, "Failed to restore resolver file backup on shutdown");
        }
    }
}
