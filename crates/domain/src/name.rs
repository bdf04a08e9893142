//! Domain name helpers.
//!
//! Owner names are kept in a normalized form throughout the crate: lowercase
//! ASCII without the trailing dot. The root zone is the empty string.

/// Normalize a domain name for comparison and storage.
pub fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Whether `name` equals `zone` or sits below it.
///
/// Matching is label-aware: `www.example.com` is under `example.com`,
/// `myexample.com` is not. Every name is under the root zone.
pub fn is_subdomain(name: &str, zone: &str) -> bool {
    let name = normalize(name);
    let zone = normalize(zone);

    if zone.is_empty() || name == zone {
        return true;
    }

    name.len() > zone.len()
        && name.ends_with(&zone)
        && name.as_bytes()[name.len() - zone.len() - 1] == b'.'
}

/// Same name, ignoring case and a trailing dot.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// Check that a name can be put on the wire: labels of 1..=63 bytes and at
/// most 253 characters in total.
pub fn validate(name: &str) -> Result<(), String> {
    let name = name.trim_end_matches('.');
    if name.is_empty() {
        return Ok(());
    }
    if name.len() > 253 {
        return Err(format!("'{}' is longer than 253 characters", name));
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err(format!("'{}' contains an empty label", name));
        }
        if label.len() > 63 {
            return Err(format!("label '{}' is longer than 63 bytes", label));
        }
    }
    Ok(())
}
