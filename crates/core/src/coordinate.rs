//! Asset coordinates: the (library, version, file key) triple identifying
//! one mirrored file.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Identifies one file in both the source CDN and the destination store.
///
/// Immutable once formed: the same triple always produces the same source
/// URL and the same destination path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetCoordinate {
    /// Library name as published on the CDN (e.g. "jquery").
    pub name: String,
    /// Library version (e.g. "3.6.0").
    pub version: String,
    /// File key relative to the version root (e.g. "jquery.min.js").
    pub key: String,
}

impl AssetCoordinate {
    /// Create a validated coordinate.
    ///
    /// All three components must be non-empty and the key must not contain
    /// parent-directory segments. Validation happens here so nothing
    /// malformed ever reaches the network.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        key: impl Into<String>,
    ) -> crate::Result<Self> {
        let name = name.into();
        let version = version.into();
        let key = key.into();

        if name.trim().is_empty() {
            return Err(crate::Error::InvalidCoordinate("name is empty".to_string()));
        }
        if version.trim().is_empty() {
            return Err(crate::Error::InvalidCoordinate(
                "version is empty".to_string(),
            ));
        }
        if key.trim().is_empty() {
            return Err(crate::Error::InvalidCoordinate("key is empty".to_string()));
        }
        if key.split('/').any(|segment| segment == "..") || key.starts_with('/') {
            return Err(crate::Error::InvalidCoordinate(format!(
                "key must be a relative path without parent segments: {key}"
            )));
        }

        Ok(Self { name, version, key })
    }

    /// Deterministic destination path inside the bucket: `name/version/key`.
    pub fn storage_key(&self) -> String {
        format!("{}/{}/{}", self.name, self.version, self.key)
    }

    /// Source CDN URL for this asset.
    ///
    /// Name and version are percent-encoded; the key is used as-is, not
    /// encoded beyond what it already carries.
    pub fn source_url(&self, cdn_base: &str) -> String {
        format!(
            "{}/ajax/libs/{}/{}/{}",
            cdn_base.trim_end_matches('/'),
            utf8_percent_encode(&self.name, PATH_SEGMENT),
            utf8_percent_encode(&self.version, PATH_SEGMENT),
            self.key
        )
    }

    /// Public URL used by the existence probe against the destination store.
    pub fn probe_url(&self, public_base: &str, folder: Option<&str>) -> String {
        let base = public_base.trim_end_matches('/');
        match folder {
            Some(folder) if !folder.is_empty() => {
                format!("{}/{}/{}", base, folder.trim_matches('/'), self.storage_key())
            }
            _ => format!("{}/{}", base, self.storage_key()),
        }
    }
}

impl fmt::Display for AssetCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.name, self.version, self.key)
    }
}
