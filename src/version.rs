//! Release/local version comparison.
//!
//! Go release versions look like `go1.23.1`, `go1.22rc1` or plain `1.9`.
//! Naive lexical ordering mis-orders multi-digit components (`1.10` would
//! sort below `1.9`), so the dotted numeric components are compared
//! numerically and any trailing pre-release suffix (`rc1`, `beta2`) sorts
//! before the final release of the same triple.

use std::cmp::Ordering;

/// Decide whether an install should proceed.
///
/// - Local version absent (toolchain not installed, or `go env` failed)
///   → always proceed.
/// - Otherwise proceed only when `remote` is strictly newer; equal
///   versions do not proceed.
pub fn should_install(remote: &str, local: Option<&str>) -> bool {
    match local {
        None => true,
        Some(local) => compare(remote, local) == Ordering::Greater,
    }
}

/// Total order over Go-style version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a_nums, a_suffix) = split(a);
    let (b_nums, b_suffix) = split(b);

    let len = a_nums.len().max(b_nums.len());
    for i in 0..len {
        let x = a_nums.get(i).copied().unwrap_or(0);
        let y = b_nums.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    // Same numeric components: a final release ("") outranks any
    // pre-release suffix; two pre-releases compare lexically.
    match (a_suffix.is_empty(), b_suffix.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a_suffix.cmp(b_suffix),
    }
}

/// Split `go1.23.1rc2` into `([1, 23, 1], "rc2")`.
fn split(v: &str) -> (Vec<u64>, &str) {
    let v = v.trim().trim_start_matches("go");
    let end = v
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(v.len());
    let nums = v[..end]
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().unwrap_or(0))
        .collect();
    (nums, &v[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_versions_do_not_proceed() {
        assert!(!should_install("1.23.0", Some("1.23.0")));
        assert!(!should_install("go1.23.0", Some("go1.23.0")));
    }

    #[test]
    fn newer_patch_proceeds() {
        assert!(should_install("1.23.1", Some("1.23.0")));
    }

    #[test]
    fn absent_local_always_proceeds() {
        assert!(should_install("go1.0.0", None));
    }

    #[test]
    fn older_remote_does_not_proceed() {
        assert!(!should_install("1.22.0", Some("1.23.1")));
    }

    #[test]
    fn multi_digit_components_compare_numerically() {
        assert_eq!(compare("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare("go1.100.0", "go1.99.9"), Ordering::Greater);
    }

    #[test]
    fn go_prefix_is_ignored() {
        assert_eq!(compare("go1.23.1", "1.23.1"), Ordering::Equal);
    }

    #[test]
    fn missing_components_count_as_zero() {
        assert_eq!(compare("1.23", "1.23.0"), Ordering::Equal);
        assert_eq!(compare("1.23.1", "1.23"), Ordering::Greater);
    }

    #[test]
    fn prerelease_sorts_before_final() {
        assert_eq!(compare("go1.23", "go1.23rc1"), Ordering::Greater);
        assert_eq!(compare("go1.23rc1", "go1.23rc2"), Ordering::Less);
        assert_eq!(compare("go1.23beta1", "go1.23rc1"), Ordering::Less);
    }
}
