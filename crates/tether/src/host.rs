//! Initial connection state heuristics based on the page's host.

use crate::state::ConnectionState;

/// Returns `true` for loopback host names: `localhost`, `[::1]` and `127.x.y.z`.
///
/// Only the exact forms are accepted; `::1` without brackets, `localhost.com` or
/// `127.0.0.1.com` are not loopback hosts.
pub fn is_localhost(hostname: &str) -> bool {
    if hostname == "localhost" || hostname == "[::1]" {
        return true;
    }

    let Some(rest) = hostname.strip_prefix("127.") else {
        return false;
    };
    let groups: Vec<&str> = rest.split('.').collect();
    groups.len() == 3
        && groups
            .iter()
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()))
}

/// Picks the state the store starts in.
///
/// The platform's online signal only reports whether a network link exists, which says
/// nothing useful during local development, so loopback hosts always start connected.
pub fn initial_state(hostname: &str, navigator_online: bool) -> ConnectionState {
    if is_localhost(hostname) || navigator_online {
        ConnectionState::Connected
    } else {
        ConnectionState::ConnectionLost
    }
}
