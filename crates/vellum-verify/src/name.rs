//! Addressed file names.
//!
//! An addressed name has the shape `<base>.<hex>.<ext>` where `<hex>` is
//! 6 to 64 hex digits (any case on input, lowercase on output). A name
//! without that segment is valid and simply unaddressed:
//!
//! - `notes.html` -- unaddressed
//! - `notes.ab12cd34.html` -- addressed, prefix `ab12cd34`
//! - `report.v2.html` -- unaddressed (`v2` is not a digest)
//! - `.ab12cd.html` -- unaddressed (empty base)

use std::fmt;

use vellum_types::DigestPrefix;

use crate::error::{VerifyError, VerifyResult};

/// Extension used when a document name has none.
pub const DEFAULT_EXTENSION: &str = "html";

/// A name split into its base, optional digest prefix and extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressedName {
    pub base: String,
    pub prefix: Option<DigestPrefix>,
    pub extension: String,
}

impl AddressedName {
    /// Split a file name. Directory components are ignored.
    pub fn parse(name: &str) -> VerifyResult<Self> {
        let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if file.is_empty() || file == "." || file == ".." {
            return Err(VerifyError::InvalidName(name.to_string()));
        }

        let (stem, extension) = match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
            _ => {
                return Ok(Self {
                    base: file.to_string(),
                    prefix: None,
                    extension: String::new(),
                })
            }
        };

        if let Some((base, candidate)) = stem.rsplit_once('.') {
            if !base.is_empty() {
                if let Ok(prefix) = DigestPrefix::parse(candidate) {
                    return Ok(Self {
                        base: base.to_string(),
                        prefix: Some(prefix),
                        extension: extension.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            base: stem.to_string(),
            prefix: None,
            extension: extension.to_string(),
        })
    }

    /// Same base and extension with a different prefix.
    pub fn with_prefix(&self, prefix: DigestPrefix) -> Self {
        Self {
            base: self.base.clone(),
            prefix: Some(prefix),
            extension: self.extension.clone(),
        }
    }

    /// Same base and extension without a prefix.
    pub fn unaddressed(&self) -> Self {
        Self {
            base: self.base.clone(),
            prefix: None,
            extension: self.extension.clone(),
        }
    }

    pub fn is_addressed(&self) -> bool {
        self.prefix.is_some()
    }
}

impl fmt::Display for AddressedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if let Some(prefix) = &self.prefix {
            write!(f, ".{prefix}")?;
        }
        if !self.extension.is_empty() {
            write!(f, ".{}", self.extension)?;
        }
        Ok(())
    }
}

/// The digest prefix carried by `name`, if any.
pub fn extract_prefix(name: &str) -> Option<DigestPrefix> {
    AddressedName::parse(name).ok().and_then(|parsed| parsed.prefix)
}

/// `name` with any digest segment removed.
pub fn strip_address(name: &str) -> VerifyResult<String> {
    Ok(AddressedName::parse(name)?.unaddressed().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unaddressed_name() {
        let parsed = AddressedName::parse("notes.html").unwrap();
        assert_eq!(parsed.base, "notes");
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.extension, "html");
    }

    #[test]
    fn addressed_name() {
        let parsed = AddressedName::parse("notes.ab12cd34.html").unwrap();
        assert_eq!(parsed.base, "notes");
        assert_eq!(parsed.prefix.unwrap().as_str(), "ab12cd34");
        assert_eq!(parsed.extension, "html");
    }

    #[test]
    fn extraction_is_case_insensitive() {
        assert_eq!(
            extract_prefix("Notes.AB12CD.HTML").unwrap().as_str(),
            "ab12cd"
        );
    }

    #[test]
    fn prefix_length_bounds() {
        assert!(extract_prefix("a.abcde.html").is_none());
        assert!(extract_prefix("a.abcdef.html").is_some());
        let full = "f".repeat(64);
        assert!(extract_prefix(&format!("a.{full}.html")).is_some());
        let too_long = "f".repeat(65);
        assert!(extract_prefix(&format!("a.{too_long}.html")).is_none());
    }

    #[test]
    fn non_hex_segment_is_part_of_base() {
        let parsed = AddressedName::parse("report.v2.html").unwrap();
        assert_eq!(parsed.base, "report.v2");
        assert!(!parsed.is_addressed());
    }

    #[test]
    fn dotted_base_keeps_leading_parts() {
        let parsed = AddressedName::parse("my.notes.deadbeef.html").unwrap();
        assert_eq!(parsed.base, "my.notes");
        assert_eq!(parsed.prefix.unwrap().as_str(), "deadbeef");
    }

    #[test]
    fn empty_base_is_unaddressed() {
        assert!(extract_prefix(".ab12cd.html").is_none());
    }

    #[test]
    fn directory_components_ignored() {
        let parsed = AddressedName::parse("/tmp/docs/notes.ab12cd.html").unwrap();
        assert_eq!(parsed.base, "notes");
        assert!(parsed.is_addressed());
    }

    #[test]
    fn no_extension() {
        let parsed = AddressedName::parse("README").unwrap();
        assert_eq!(parsed.base, "README");
        assert_eq!(parsed.extension, "");
        assert_eq!(parsed.to_string(), "README");
    }

    #[test]
    fn display_roundtrip_and_strip() {
        let name = "notes.ab12cd34.html";
        assert_eq!(AddressedName::parse(name).unwrap().to_string(), name);
        assert_eq!(strip_address(name).unwrap(), "notes.html");
        assert_eq!(strip_address("notes.html").unwrap(), "notes.html");
    }

    #[test]
    fn empty_name_rejected() {
        assert!(AddressedName::parse("").is_err());
        assert!(AddressedName::parse("dir/").is_err());
    }
}
