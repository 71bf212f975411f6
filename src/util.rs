//! Filesystem helpers shared by configuration and theme loading.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Opens `path` for reading. `kind` names the file in the error message,
/// e.g. "Opening theme file `theme/theme.yaml`: ...".
pub fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let err = open(Path::new("/nonexistent/theme.yaml"), "theme").unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Opening theme file `/nonexistent/theme.yaml`"),
            "{}",
            err
        );
    }
}
