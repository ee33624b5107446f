//! Internal utilities.

use std::ffi::CString;
use std::net::Ipv6Addr;

/// Resolves a network interface name to its kernel index.
///
/// Returns `None` if the interface does not exist (or the name contains an
/// interior NUL byte).
#[must_use]
pub fn link_index(name: &str) -> Option<u32> {
    let name = CString::new(name).ok()?;
    // SAFETY: `name` is a valid NUL-terminated string for the duration of
    // the call; `if_nametoindex` only reads it.
    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    (index != 0).then_some(index)
}

/// Formats an IPv6 address in its fully expanded form: eight 4-digit
/// zero-padded hex groups, no `::` compression.
///
/// The expanded form round-trips losslessly with the 16-byte wire encoding
/// used for per-link D-Bus calls, which the compressed display form does
/// not (textually).
#[must_use]
pub fn expand_ipv6(addr: Ipv6Addr) -> String {
    let s = addr.segments();
    format!(
        "{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}",
        s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]
    )
}
