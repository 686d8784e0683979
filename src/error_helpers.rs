//! Actionable messages for replacement failures shown by the binary

use std::io;
use std::path::Path;

use crate::error::ReplaceError;

/// Which side of a replacement an I/O failure happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    ReadInput,
    ReadRules,
    WriteOutput,
}

impl Access {
    fn of(err: &ReplaceError) -> Option<Access> {
        match err {
            ReplaceError::ContentRead { .. } => Some(Access::ReadInput),
            ReplaceError::TokenFileRead { .. } => Some(Access::ReadRules),
            ReplaceError::ContentWrite { .. } => Some(Access::WriteOutput),
            _ => None,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Access::ReadInput | Access::ReadRules => "reading",
            Access::WriteOutput => "writing",
        }
    }

    fn what(self) -> &'static str {
        match self {
            Access::ReadInput => "a file to replace",
            Access::ReadRules => "a token, value, or token-value map file",
            Access::WriteOutput => "replaced content",
        }
    }
}

pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Hint text for a path we were not allowed to touch
pub fn permission_error(path: &Path, verb: &str, what: &str) -> String {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut msg = format!(
        "Permission denied when {verb} {what}: '{}'\n\nTry:\n  ls -l '{}'\n",
        path.display(),
        path.display()
    );
    if verb == "writing" {
        msg.push_str(&format!("  chmod u+w '{}'\n", dir.display()));
        msg.push_str("  or pick a writable location with --output-file / --output-dir\n");
    }
    msg
}

/// Hint text for a path that does not exist
pub fn not_found_error(path: &Path, what: &str, rules: bool) -> String {
    let mut msg = format!(
        "No such file ({what}): '{}'\n\nRelative paths are resolved against --base-dir (default: current directory).\n",
        path.display()
    );
    if !rules {
        msg.push_str("Pass --ignore-missing-file to skip a single optional input.\n");
    }
    msg
}

/// Render a replacement failure, with hints for the I/O failures we recognize
pub fn describe(err: &ReplaceError) -> String {
    let (Some(access), Some(cause), Some(path)) = (Access::of(err), err.io_cause(), err.path())
    else {
        return err.to_string();
    };

    if is_permission_denied(cause) {
        permission_error(path, access.verb(), access.what())
    } else if is_not_found(cause) {
        not_found_error(path, access.what(), access == Access::ReadRules)
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use std::path::PathBuf;

    fn read_failure(kind: ErrorKind) -> ReplaceError {
        ReplaceError::ContentRead {
            path: PathBuf::from("conf/app.properties"),
            source: io::Error::new(kind, "boom"),
        }
    }

    #[test]
    fn test_missing_input_suggests_ignore_flag() {
        let msg = describe(&read_failure(ErrorKind::NotFound));
        assert!(msg.contains("No such file (a file to replace): 'conf/app.properties'"));
        assert!(msg.contains("--ignore-missing-file"));
    }

    #[test]
    fn test_missing_map_file_has_no_ignore_hint() {
        let err = ReplaceError::TokenFileRead {
            path: PathBuf::from("tokens.map"),
            source: io::Error::new(ErrorKind::NotFound, "gone"),
        };
        let msg = describe(&err);
        assert!(msg.contains("token-value map file"));
        assert!(!msg.contains("--ignore-missing-file"));
    }

    #[test]
    fn test_write_permission_points_at_directory() {
        let err = ReplaceError::ContentWrite {
            path: PathBuf::from("/etc/app/app.conf"),
            source: io::Error::new(ErrorKind::PermissionDenied, "denied"),
        };
        let msg = describe(&err);
        assert!(msg.starts_with("Permission denied when writing replaced content"));
        assert!(msg.contains("chmod u+w '/etc/app'"));
        assert!(msg.contains("--output-dir"));
    }

    #[test]
    fn test_read_permission_has_no_chmod_hint() {
        let msg = describe(&read_failure(ErrorKind::PermissionDenied));
        assert!(msg.contains("Permission denied when reading a file to replace"));
        assert!(!msg.contains("chmod"));
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        let msg = permission_error(Path::new("out.txt"), "writing", "replaced content");
        assert!(msg.contains("chmod u+w '.'"));
    }

    #[test]
    fn test_other_io_errors_use_display() {
        let err = read_failure(ErrorKind::InvalidData);
        assert_eq!(describe(&err), err.to_string());
    }

    #[test]
    fn test_non_io_errors_use_display() {
        let err = ReplaceError::MissingToken;
        assert_eq!(describe(&err), err.to_string());
    }
}
