//! Temp directory + file pair with best-effort, exactly-once cleanup.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use crate::spec::{SpecTempResourceOptions, TempResourceError};

/// Owns an optional private temp directory and an optional file inside it.
///
/// [`Self::close`] removes the file first, then the directory. Failures are
/// logged and never raised. Closing twice, or closing an empty container, is a
/// no-op. Dropping the container closes it.
#[derive(Debug, Default)]
pub struct TempResourceContainer {
    dir_temp: Option<TempDir>,
    path_file: Option<PathBuf>,
}

impl TempResourceContainer {
    /// Container that owns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a private temp directory without a file.
    pub fn create_dir(options: &SpecTempResourceOptions) -> Result<Self, TempResourceError> {
        let dir_temp = create_private_dir(options)?;
        debug!(path = %dir_temp.path().display(), "temp directory created");
        Ok(Self {
            dir_temp: Some(dir_temp),
            path_file: None,
        })
    }

    /// Create a private temp directory holding one empty file.
    pub fn create(options: &SpecTempResourceOptions) -> Result<Self, TempResourceError> {
        let mut container = Self::create_dir(options)?;
        let (_, path_file) = container.create_file_in_dir(options)?;
        container.path_file = Some(path_file);
        Ok(container)
    }

    /// Create a temp directory + file and copy `input` into the file.
    ///
    /// Once this returns the caller may drop `input`; the container is the
    /// only owner of the spooled bytes.
    pub fn spool<R: Read>(
        input: &mut R,
        options: &SpecTempResourceOptions,
    ) -> Result<Self, TempResourceError> {
        let mut container = Self::create_dir(options)?;
        let (file, path_file) = container.create_file_in_dir(options)?;
        container.path_file = Some(path_file.clone());

        let mut writer = BufWriter::new(file);
        let n_bytes = std::io::copy(input, &mut writer)
            .and_then(|n_bytes| writer.flush().map(|_| n_bytes))
            .map_err(|source| TempResourceError::Spool {
                path: path_file.clone(),
                source,
            })?;
        debug!(path = %path_file.display(), n_bytes, "input spooled");

        Ok(container)
    }

    /// Temp directory path, if one is owned and not yet closed.
    pub fn path_dir(&self) -> Option<&Path> {
        self.dir_temp.as_ref().map(TempDir::path)
    }

    /// Temp file path, if one is owned and not yet closed.
    pub fn path_file(&self) -> Option<&Path> {
        self.path_file.as_deref()
    }

    /// Whether nothing is left to clean up.
    pub fn is_closed(&self) -> bool {
        self.dir_temp.is_none() && self.path_file.is_none()
    }

    /// Delete the file, then the directory. Idempotent.
    pub fn close(&mut self) {
        if let Some(path_file) = self.path_file.take() {
            match std::fs::remove_file(&path_file) {
                Ok(()) => debug!(path = %path_file.display(), "temp file deleted"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(
                    path = %path_file.display(),
                    error = %err,
                    "failed to delete temp file"
                ),
            }
        }

        if let Some(dir_temp) = self.dir_temp.take() {
            let path_dir = dir_temp.path().to_path_buf();
            match dir_temp.close() {
                Ok(()) => debug!(path = %path_dir.display(), "temp directory deleted"),
                Err(err) => warn!(
                    path = %path_dir.display(),
                    error = %err,
                    "failed to delete temp directory"
                ),
            }
        }
    }

    fn create_file_in_dir(
        &self,
        options: &SpecTempResourceOptions,
    ) -> Result<(File, PathBuf), TempResourceError> {
        let Some(path_dir) = self.path_dir() else {
            return Err(TempResourceError::CreateFile {
                path: options.derive_dir_parent(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "temp directory is not available",
                ),
            });
        };

        Builder::new()
            .prefix(&options.prefix)
            .suffix(&options.suffix)
            .tempfile_in(path_dir)
            .and_then(|file_named| file_named.keep().map_err(|err| err.error))
            .map_err(|source| TempResourceError::CreateFile {
                path: path_dir.to_path_buf(),
                source,
            })
    }
}

impl Drop for TempResourceContainer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Create a temp directory readable only by the current user (`rwx------` on unix).
fn create_private_dir(options: &SpecTempResourceOptions) -> Result<TempDir, TempResourceError> {
    let path_parent = options.derive_dir_parent();
    let mut builder = Builder::new();
    builder.prefix(&options.prefix);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o700));
    }

    builder
        .tempdir_in(&path_parent)
        .map_err(|source| TempResourceError::CreateDir {
            path: path_parent,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_options(dir_parent: &Path) -> SpecTempResourceOptions {
        SpecTempResourceOptions {
            prefix: "rowkit-test-".to_string(),
            suffix: ".csv".to_string(),
            dir_parent: Some(dir_parent.to_path_buf()),
        }
    }

    #[test]
    fn create_makes_dir_and_file_then_close_removes_both() {
        let tmp = tempfile::tempdir().expect("scratch dir");
        let mut container = TempResourceContainer::create(&create_options(tmp.path()))
            .expect("create temp resources");

        let path_dir = container.path_dir().expect("dir").to_path_buf();
        let path_file = container.path_file().expect("file").to_path_buf();
        assert!(path_dir.is_dir());
        assert!(path_file.is_file());
        assert!(path_file.starts_with(&path_dir));
        assert!(path_file.to_string_lossy().ends_with(".csv"));

        container.close();
        assert!(!path_file.exists());
        assert!(!path_dir.exists());
        assert!(container.is_closed());
    }

    #[test]
    fn close_is_idempotent_and_safe_on_empty() {
        let mut container = TempResourceContainer::empty();
        container.close();
        container.close();
        assert!(container.is_closed());

        let tmp = tempfile::tempdir().expect("scratch dir");
        let mut container = TempResourceContainer::create(&create_options(tmp.path()))
            .expect("create temp resources");
        container.close();
        container.close();
        assert!(container.path_file().is_none());
    }

    #[test]
    fn close_tolerates_file_deleted_elsewhere() {
        let tmp = tempfile::tempdir().expect("scratch dir");
        let mut container = TempResourceContainer::create(&create_options(tmp.path()))
            .expect("create temp resources");
        let path_dir = container.path_dir().expect("dir").to_path_buf();
        std::fs::remove_file(container.path_file().expect("file")).expect("remove");

        container.close();
        assert!(!path_dir.exists());
    }

    #[test]
    fn spool_copies_input_bytes() {
        let tmp = tempfile::tempdir().expect("scratch dir");
        let mut input: &[u8] = b"name,age\nAlice,30\n";
        let container = TempResourceContainer::spool(&mut input, &create_options(tmp.path()))
            .expect("spool");

        let path_file = container.path_file().expect("file").to_path_buf();
        let txt = std::fs::read_to_string(&path_file).expect("read spooled");
        assert_eq!(txt, "name,age\nAlice,30\n");

        drop(container);
        assert!(!path_file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn temp_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("scratch dir");
        let container =
            TempResourceContainer::create_dir(&create_options(tmp.path())).expect("create dir");
        let mode = container
            .path_dir()
            .expect("dir")
            .metadata()
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn create_fails_for_missing_parent() {
        let tmp = tempfile::tempdir().expect("scratch dir");
        let options = create_options(&tmp.path().join("missing/nested"));
        let err = TempResourceContainer::create(&options).expect_err("must fail");
        assert!(matches!(err, TempResourceError::CreateDir { .. }));
    }
}
