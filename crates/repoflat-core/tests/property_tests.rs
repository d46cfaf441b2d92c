//! Property-based tests for key derivation, entry filtering and bounded copy.
//!
//! These tests use proptest to generate arbitrary inputs and verify the
//! flat-name and filter properties hold across a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use repoflat_core::copy::{CopyBuffer, copy_with_limit};
use repoflat_core::filter::is_hidden;
use repoflat_core::key::split_bucket;
use repoflat_core::{EntryFilter, FilterRule, FlattenError, QuotaResource, derive_key};

/// Relative paths made of visible segments.
fn visible_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9_-][A-Za-z0-9_ .-]{0,10}", 1..6).prop_map(|s| s.join("/"))
}

proptest! {
    /// Same input, same key.
    #[test]
    fn prop_key_is_deterministic(path in "\\PC{0,64}") {
        prop_assert_eq!(derive_key(&path), derive_key(&path));
    }

    /// Keys only use filesystem-safe characters and never contain a separator.
    #[test]
    fn prop_key_charset(path in "\\PC{0,64}") {
        let key = derive_key(&path);
        prop_assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_'));
        prop_assert!(key.len() > 32);
        prop_assert!(key[..32].chars().all(|c| c.is_ascii_hexdigit()));
        prop_assert_eq!(&key[32..33], "_");
    }

    /// Distinct paths get distinct keys, even with the same base name.
    #[test]
    fn prop_distinct_paths_distinct_keys(a in visible_path(), b in visible_path()) {
        prop_assume!(a != b);
        prop_assert_ne!(derive_key(&a), derive_key(&b));
    }

    /// The key suffix preserves a plain base name as is.
    #[test]
    fn prop_plain_base_name_kept(dir in "[a-z]{1,8}(/[a-z]{1,8}){0,3}", name in "[A-Za-z0-9]{1,12}\\.[a-z]{1,4}") {
        let key = derive_key(&format!("{dir}/{name}"));
        let suffix = format!("_{name}");
        prop_assert!(key.ends_with(&suffix));
    }

    /// Entries larger than the limit are always rejected, whatever the rules.
    #[test]
    fn prop_oversized_rejected(path in visible_path(), limit in 0u64..1_000_000, extra in 1u64..1_000_000) {
        let filter = EntryFilter::new().with_rule(FilterRule::include(".*").unwrap());
        prop_assert!(!filter.accept(&path, limit + extra, limit));
        prop_assert!(filter.accept(&path, limit, limit));
    }

    /// Hidden segments are rejected even when a rule would include them.
    #[test]
    fn prop_hidden_rejected(prefix in visible_path(), hidden in "\\.[a-z]{0,8}", rest in visible_path()) {
        let path = format!("{prefix}/{hidden}/{rest}");
        prop_assert!(is_hidden(&path));
        let filter = EntryFilter::new().with_rule(FilterRule::include(".*").unwrap());
        prop_assert!(!filter.accept(&path, 0, u64::MAX));
    }

    /// Without rules, every visible entry within the limit is accepted.
    #[test]
    fn prop_no_rules_accepts_visible(path in visible_path(), size in 0u64..4096) {
        prop_assert!(!is_hidden(&path));
        prop_assert!(EntryFilter::new().accept(&path, size, 4096));
    }

    /// A single include rule accepts exactly the paths it matches.
    #[test]
    fn prop_include_rule_semantics(stem in visible_path(), ext in "(txt|java|rs)") {
        let path = format!("{stem}.{ext}");
        let filter = EntryFilter::new().with_rule(FilterRule::include(r"\.java$").unwrap());
        prop_assert_eq!(filter.accept(&path, 1, 10), ext == "java");
    }

    /// An exclude rule listed first wins over a later include.
    #[test]
    fn prop_exclude_first_wins(stem in visible_path()) {
        let filter = EntryFilter::new()
            .with_rule(FilterRule::exclude("/test/").unwrap())
            .with_rule(FilterRule::include(r"\.java$").unwrap());
        let test_path = format!("proj/test/{stem}.java");
        let main_path = format!("proj/main/{stem}.java");
        prop_assert!(!filter.accept(&test_path, 1, 10));
        prop_assert_eq!(filter.accept(&main_path, 1, 10), !main_path.contains("/test/"));
    }

    /// Bucket splitting keeps everything after the first separator.
    #[test]
    fn prop_split_bucket(bucket in "[a-z0-9-]{1,12}", rest in visible_path()) {
        let path = format!("{bucket}/{rest}");
        prop_assert_eq!(split_bucket(&path), Some((bucket.as_str(), rest.as_str())));
    }

    /// Copy either reproduces the input or stops with a file size quota error.
    #[test]
    fn prop_copy_with_limit(data in prop::collection::vec(any::<u8>(), 0..200_000), limit in 0u64..200_000) {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();
        let result = copy_with_limit(&mut data.as_slice(), &mut output, &mut buffer, limit);

        if data.len() as u64 <= limit {
            prop_assert_eq!(result.unwrap(), data.len() as u64);
            prop_assert_eq!(output, data);
        } else {
            let is_quota = matches!(
                result,
                Err(FlattenError::QuotaExceeded { resource: QuotaResource::FileSize { .. } })
            );
            prop_assert!(is_quota);
            prop_assert!(output.len() as u64 <= limit);
        }
    }
}
