//! Matching of a single certificate name pattern against a requested hostname.

const WILDCARD: &str = "*";

/// Check whether a name taken from a certificate (a SAN DNS entry or the CN) authorizes `hostname`.
///
/// Both values are compared case-insensitively label by label. The pattern may carry a single
/// wildcard, and only as the entire left-most label (`*.example.com`). A wildcard anywhere else,
/// or embedded inside a label (`f*o.example.com`), is compared literally and is never expanded.
///
/// A wildcard stands for exactly one non-empty label, so `*.bar.test` matches `a.bar.test` but
/// neither `bar.test` nor `a.b.bar.test`.
///
/// Malformed input never matches: empty names, empty labels, wildcards covering fewer than two
/// literal labels (`*.com`) and hostnames containing `*` are all rejected. A single trailing dot is
/// accepted on the hostname only, so a pattern ending in a dot never matches.
pub fn matches(pattern: &str, hostname: &str) -> bool {
    let pattern = match normalize(pattern) {
        Some(x) => x,
        None => return false,
    };

    // an absolute hostname names the same host
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    let hostname = match normalize(hostname) {
        Some(x) => x,
        None => return false,
    };

    // the requested name is never a pattern
    if hostname.contains(WILDCARD) {
        return false;
    }

    let pattern_labels: Vec<&str> = pattern.split('.').collect();
    let hostname_labels: Vec<&str> = hostname.split('.').collect();

    if pattern_labels.len() != hostname_labels.len() {
        return false;
    }

    let wildcard_allowed = is_valid_wildcard(&pattern_labels);

    pattern_labels
        .iter()
        .zip(hostname_labels.iter())
        .enumerate()
        .all(|(index, (pattern_label, hostname_label))| {
            if index == 0 && wildcard_allowed {
                // the wildcard consumes exactly one non-empty label
                !hostname_label.is_empty()
            } else {
                pattern_label == hostname_label
            }
        })
}

/// Lower-case an ASCII name and reject names with empty labels
fn normalize(name: &str) -> Option<String> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return None;
    }

    Some(name.to_ascii_lowercase())
}

fn is_valid_wildcard(labels: &[&str]) -> bool {
    match labels.split_first() {
        Some((first, rest)) => {
            *first == WILDCARD && rest.len() >= 2 && !rest.iter().any(|x| x.contains(WILDCARD))
        }
        None => false,
    }
}
