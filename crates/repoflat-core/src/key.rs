//! Flat, filesystem-safe key derivation for archive entries.
//!
//! A key is the MD5 digest of the entry's in-repo path followed by an
//! escaped copy of its base name, e.g.
//! `2a8c...e1_Main.txt`. The digest keeps keys unique across the whole
//! repository; the base name keeps them readable.

use md5::Digest;
use md5::Md5;
use std::fmt::Write;

/// Derives the flat key for an in-repo relative path.
///
/// Total over all strings: empty input, unicode and separators all produce
/// a key made only of `[A-Za-z0-9._]`.
///
/// # Examples
///
/// ```
/// use repoflat_core::derive_key;
///
/// let key = derive_key("src/Main.txt");
/// assert!(key.ends_with("_Main.txt"));
/// assert_eq!(key.len(), 32 + 1 + "Main.txt".len());
///
/// // Non-alphanumeric characters are escaped by code point.
/// assert!(derive_key("docs/read me.md").ends_with("_read_0020me.md"));
/// ```
#[must_use]
pub fn derive_key(relative_path: &str) -> String {
    let digest = Md5::digest(relative_path.as_bytes());
    let base_name = relative_path
        .rsplit_once('/')
        .map_or(relative_path, |(_, name)| name);

    let mut key = hex::encode(digest);
    key.push('_');
    for c in base_name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' {
            key.push(c);
        } else {
            // Writing to a String cannot fail.
            let _ = write!(key, "_{:04x}", u32::from(c));
        }
    }
    key
}

/// Location of one extracted entry inside the flattened output tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatName {
    /// First path segment of the entry, shared by the whole archive.
    pub bucket: String,
    /// Key derived from the rest of the path.
    pub key: String,
}

impl FlatName {
    /// Builds the flat name for an entry split into bucket and remainder.
    #[must_use]
    pub fn new(bucket: &str, remainder: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: derive_key(remainder),
        }
    }

    /// Renders the name stored in the provenance table: `bucket/key`.
    #[must_use]
    pub fn as_flat_name(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

impl std::fmt::Display for FlatName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Splits an archive path at its first `/` into `(bucket, remainder)`.
///
/// Returns `None` for entries that do not live under a top-level folder or
/// whose bucket or remainder is empty.
#[must_use]
pub fn split_bucket(entry_path: &str) -> Option<(&str, &str)> {
    let (bucket, remainder) = entry_path.split_once('/')?;
    if bucket.is_empty() || remainder.is_empty() || bucket.contains('\\') {
        return None;
    }
    Some((bucket, remainder))
}
