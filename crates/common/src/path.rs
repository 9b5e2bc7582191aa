//! Filename and relative path checks for paths that come from clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

use crate::error::CommonError;

/// Maximum length of a single filename, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Returns `true` if `name` can be used as a single path component.
///
/// The name must be 1 to 255 bytes long and contain neither `/` nor NUL.
/// Every other byte is allowed, including `\` and non-UTF-8 bytes.
///
/// # Examples
///
/// ```
/// use stashdb_common::path::is_valid_filename;
///
/// assert!(is_valid_filename("report.csv"));
/// assert!(is_valid_filename(b"back\\slash"));
/// assert!(!is_valid_filename("a/b"));
/// assert!(!is_valid_filename(""));
/// ```
pub fn is_valid_filename(name: impl AsRef<[u8]>) -> bool {
    let bytes = name.as_ref();
    (1..=MAX_FILENAME_LEN).contains(&bytes.len()) && !bytes.iter().any(|&b| b == b'/' || b == 0)
}

/// Returns `true` if `path` stays below the directory it starts from.
///
/// Absolute paths must not contain any `..` component. Relative paths may
/// step back with `..` only into a directory they descended into earlier.
/// `.` components are ignored, and names that merely contain dots (`l..`,
/// `..usr`) are ordinary names.
///
/// # Examples
///
/// ```
/// use stashdb_common::path::is_downward_path;
///
/// assert!(is_downward_path("/usr/lib/libsvm.so"));
/// assert!(is_downward_path("usr/lib/.././l.."));
/// assert!(!is_downward_path("/usr/lib/../"));
/// assert!(!is_downward_path(".."));
/// ```
pub fn is_downward_path(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let rooted = path.has_root();
    let mut depth: usize = 0;

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if rooted || depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    true
}

// ============================================================================
// Filename
// ============================================================================

/// A validated filename (1-255 bytes, no `/` or NUL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Filename(String);

impl Filename {
    /// Create a new validated filename.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::Validation` if:
    /// - The name is empty
    /// - The name exceeds 255 bytes
    /// - The name contains `/` or NUL
    pub fn new(name: impl Into<String>) -> Result<Self, CommonError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CommonError::validation("Filename cannot be empty"));
        }
        if name.len() > MAX_FILENAME_LEN {
            return Err(CommonError::validation(format!(
                "Filename cannot exceed {} bytes",
                MAX_FILENAME_LEN
            )));
        }
        if !is_valid_filename(&name) {
            return Err(CommonError::validation(
                "Filename cannot contain '/' or NUL characters",
            ));
        }
        Ok(Self(name))
    }

    /// Returns the filename as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for Filename {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Filename {
    type Error = CommonError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Filename> for String {
    fn from(name: Filename) -> String {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_filename {
        use super::*;

        #[test]
        fn length_limits() {
            assert!(!is_valid_filename(""));
            assert!(is_valid_filename("a"));
            assert!(is_valid_filename("a".repeat(255)));
            assert!(!is_valid_filename("a".repeat(256)));
        }

        #[test]
        fn length_counts_bytes() {
            // 85 three-byte characters
            assert!(is_valid_filename("喵".repeat(85)));
            assert!(!is_valid_filename("喵".repeat(86)));
        }

        #[test]
        fn charset() {
            let mut name: Vec<u8> = (1..=255u8).filter(|&b| b != b'/').collect();
            assert!(is_valid_filename(&name));
            name[2] = 0;
            assert!(!is_valid_filename(&name));
            name[2] = b'/';
            assert!(!is_valid_filename(&name));
            name[2] = b'\\';
            assert!(is_valid_filename(&name));
        }

        #[test]
        fn dots_are_ordinary_names() {
            assert!(is_valid_filename("."));
            assert!(is_valid_filename(".."));
        }
    }

    mod downward_path {
        use super::*;

        #[test]
        fn plain_paths_are_downward() {
            for path in [
                "/usr/lib/",
                "/",
                "/usr/lib/libsvm.so",
                "usr/lib/libsvm.so",
                "usr/lib/",
                "",
            ] {
                assert!(is_downward_path(path), "{path:?} should be downward");
            }
        }

        #[test]
        fn dotted_names_are_not_parent_dirs() {
            assert!(is_downward_path("usr/lib.././l.."));
            assert!(is_downward_path("..usr/..lib/./."));
        }

        #[test]
        fn current_dir_is_ignored() {
            assert!(is_downward_path("usr/lib/./."));
            assert!(is_downward_path("/./usr/lib/./."));
        }

        #[test]
        fn parent_dir_in_absolute_path_is_rejected() {
            for path in [
                "/./usr/lib/./..",
                "/./usr/lib/../",
                "/./usr/lib/../lib",
                "/usr/lib/../",
                "/..",
            ] {
                assert!(!is_downward_path(path), "{path:?} should be rejected");
            }
        }

        #[test]
        fn relative_path_may_not_climb_out() {
            assert!(!is_downward_path(".."));
            assert!(!is_downward_path("../usr/lib/"));
            assert!(!is_downward_path("../usr/lib"));
            assert!(!is_downward_path("usr/../.."));
        }

        #[test]
        fn relative_path_may_step_back_inside() {
            assert!(is_downward_path("usr/lib/.././l.."));
            assert!(is_downward_path("usr/.."));
        }
    }

    mod filename {
        use super::*;

        #[test]
        fn valid_name() {
            let name = Filename::new("data.csv").unwrap();
            assert_eq!(name.as_str(), "data.csv");
            assert_eq!(name.to_string(), "data.csv");
            assert_eq!(AsRef::<Path>::as_ref(&name), Path::new("data.csv"));
        }

        #[test]
        fn empty_rejected() {
            let err = Filename::new("").unwrap_err();
            assert!(matches!(err, CommonError::Validation(_)));
            assert!(err.to_string().contains("empty"));
        }

        #[test]
        fn too_long_rejected() {
            assert!(Filename::new("a".repeat(255)).is_ok());
            let err = Filename::new("a".repeat(256)).unwrap_err();
            assert!(err.to_string().contains("255"));
        }

        #[test]
        fn separator_rejected() {
            assert!(Filename::new("a/b").is_err());
            assert!(Filename::new("a\0b").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let name = Filename::new("table_1.dat").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"table_1.dat\"");
            let back: Filename = serde_json::from_str(&json).unwrap();
            assert_eq!(back, name);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<Filename, _> = serde_json::from_str("\"a/b\"");
            assert!(result.is_err());
        }
    }
}
