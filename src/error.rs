//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for resolver coordination operations.
pub type Result<T> = std::result::Result<T, NetCfgError>;

/// Errors returned by resolver coordination operations.
#[derive(Debug, Error)]
pub enum NetCfgError {
    /// A string input did not parse as one of the documented enum forms.
    #[error("invalid {what}: {value:?}")]
    Validation {
        /// Which field rejected the input (e.g. `"DNS scope"`).
        what: &'static str,
        /// The offending input, verbatim.
        value: String,
    },

    /// The resolver service has no link record for the given interface.
    #[error("no DNS link found for device {device:?}")]
    LinkNotFound {
        /// The virtual interface name that failed to resolve.
        device: String,
    },

    /// A D-Bus call to the resolver service failed.
    #[error("resolver service call failed: {0}")]
    Dbus(#[from] zbus::Error),

    /// Reading, writing or rotating the resolver file failed.
    #[error("resolver file operation failed: {path}: {source}")]
    File {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
}

impl NetCfgError {
    /// Builds a [`NetCfgError::File`] for the given path.
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is the D-Bus "unknown method" class of error,
    /// i.e. the peer does not implement the call at all.
    ///
    /// Used to detect missing optional capabilities (per-link default
    /// routes) that should be disabled for the rest of the process rather
    /// than retried.
    #[must_use]
    pub fn is_unknown_method(&self) -> bool {
        match self {
            Self::Dbus(zbus::Error::FDO(e)) => {
                matches!(**e, zbus::fdo::Error::UnknownMethod(_))
            }
            Self::Dbus(zbus::Error::MethodError(name, _, _)) => {
                name.as_str() == "org.freedesktop.DBus.Error.UnknownMethod"
            }
            Self::Dbus(e) => e.to_string().contains("UnknownMethod"),
            _ => false,
        }
    }

    /// Returns `true` if the peer rejected an argument value ("invalid
    /// setting" class), as opposed to failing transiently.
    ///
    /// Used to downgrade enforced DNS-over-TLS to opportunistic mode on
    /// daemons that do not accept the strict form.
    #[must_use]
    pub fn is_invalid_setting(&self) -> bool {
        match self {
            Self::Dbus(zbus::Error::FDO(e)) => {
                matches!(**e, zbus::fdo::Error::InvalidArgs(_))
            }
            Self::Dbus(zbus::Error::MethodError(name, _, _)) => {
                name.as_str() == "org.freedesktop.DBus.Error.InvalidArgs"
            }
            Self::Dbus(e) => e.to_string().contains("InvalidArgs"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown_method() -> NetCfgError {
        NetCfgError::Dbus(zbus::Error::FDO(Box::new(
            zbus::fdo::Error::UnknownMethod("Unknown method SetLinkDefaultRoute".into()),
        )))
    }

    fn invalid_args() -> NetCfgError {
        NetCfgError::Dbus(zbus::Error::FDO(Box::new(zbus::fdo::Error::InvalidArgs(
            "Invalid DNSOverTLS setting: yes".into(),
        ))))
    }

    #[test]
    fn classifies_unknown_method() {
        assert!(unknown_method().is_unknown_method());
        assert!(!unknown_method().is_invalid_setting());
    }

    #[test]
    fn classifies_invalid_setting() {
        assert!(invalid_args().is_invalid_setting());
        assert!(!invalid_args().is_unknown_method());
    }

    #[test]
    fn validation_error_names_the_input() {
        let err = NetCfgError::Validation {
            what: "DNSSEC mode",
            value: "maybe".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DNSSEC mode"));
        assert!(msg.contains("maybe"));
        assert!(!err.is_unknown_method());
        assert!(!err.is_invalid_setting());
    }

    #[test]
    fn file_error_carries_path() {
        let err = NetCfgError::file(
            "/etc/resolv.conf",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.to_string().contains("/etc/resolv.conf"));
    }
}
