// file.rs — ScratchFile: one file path plus its permanence classification.
//
// A handle names a path; it never holds the file open. The underlying file
// may not exist yet (handles are allocated before content is written), and
// handle clones share state: a rename or a reclassification through one
// clone is visible through every other clone. Sharing is single-threaded
// (Rc), matching the crate's synchronous contract.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::ScratchError;
use crate::naming;

/// Mutable state shared by every clone of one handle.
#[derive(Debug)]
struct FileState {
    /// Path of the owning scratch directory, captured at allocation.
    dir_path: PathBuf,

    /// Entry name inside the directory; always a single path segment.
    file_name: String,

    /// Classification flag: permanent files survive routine temp sweeps.
    permanent: bool,
}

/// A file handle inside a scratch directory.
///
/// Obtained through [`ScratchDir`](crate::ScratchDir) factory methods.
/// Cloning is cheap and clones are the *same* handle: they observe each
/// other's renames and classification changes.
#[derive(Debug, Clone)]
pub struct ScratchFile {
    state: Rc<RefCell<FileState>>,
}

impl ScratchFile {
    /// Build a handle for `file_name` inside `dir_path`.
    ///
    /// Fails with `InvalidName` when the name contains a path separator.
    /// The file itself is not created.
    pub(crate) fn new(
        dir_path: PathBuf,
        file_name: impl Into<String>,
        permanent: bool,
    ) -> Result<Self, ScratchError> {
        let file_name = file_name.into();
        if naming::contains_separator(&file_name) {
            return Err(ScratchError::InvalidName { name: file_name });
        }
        Ok(Self {
            state: Rc::new(RefCell::new(FileState {
                dir_path,
                file_name,
                permanent,
            })),
        })
    }

    /// Get the entry name (single path segment).
    pub fn file_name(&self) -> String {
        self.state.borrow().file_name.clone()
    }

    /// Get the path of the directory this handle was allocated in.
    pub fn dir_path(&self) -> PathBuf {
        self.state.borrow().dir_path.clone()
    }

    /// Get the full path of the file (directory path joined with the name).
    pub fn file_path(&self) -> PathBuf {
        let state = self.state.borrow();
        state.dir_path.join(&state.file_name)
    }

    /// True when the file is classified permanent (survives temp sweeps).
    pub fn is_permanent(&self) -> bool {
        self.state.borrow().permanent
    }

    /// Reclassify as permanent. Flag only; the filesystem is untouched.
    pub fn make_permanent(&self) {
        self.state.borrow_mut().permanent = true;
    }

    /// Reclassify as temporary. Flag only; the filesystem is untouched.
    pub fn make_temporary(&self) {
        self.state.borrow_mut().permanent = false;
    }

    /// True when a regular file currently backs this handle's path.
    /// A directory occupying the path does not count.
    pub fn exists(&self) -> bool {
        self.file_path().is_file()
    }

    /// Create an empty file at the path if none exists. Idempotent: an
    /// already-present file is left as it is.
    pub fn create_if_not_exists(&self) -> Result<(), ScratchError> {
        let path = self.file_path();
        if !path.is_file() {
            fs::File::create(&path).map_err(|source| ScratchError::IoError {
                path,
                source,
            })?;
        }
        Ok(())
    }

    /// Rename the file to a fresh name derived from `template`.
    ///
    /// The new name comes from the name generator run against this handle's
    /// own directory. When a physical file exists at the current path, any
    /// file already at the new path is deleted and the current file is
    /// moved over; the in-memory name is updated whether or not a physical
    /// file existed.
    pub fn rename(&self, template: &str) -> Result<(), ScratchError> {
        let dir_path = self.dir_path();
        let new_name = naming::generate_entry_name(&dir_path, template)?;
        if naming::contains_separator(&new_name) {
            return Err(ScratchError::InvalidName { name: new_name });
        }

        let old_path = self.file_path();
        let new_path = dir_path.join(&new_name);
        if old_path.is_file() {
            if new_path.is_file() {
                fs::remove_file(&new_path).map_err(|source| ScratchError::IoError {
                    path: new_path.clone(),
                    source,
                })?;
            }
            fs::rename(&old_path, &new_path).map_err(|source| ScratchError::IoError {
                path: old_path,
                source,
            })?;
        }

        self.state.borrow_mut().file_name = new_name;
        Ok(())
    }

    /// Delete the file if present. Deleting an already-absent file is a
    /// success, not an error.
    pub fn delete(&self) -> Result<(), ScratchError> {
        let path = self.file_path();
        if path.is_file() {
            fs::remove_file(&path).map_err(|source| ScratchError::IoError {
                path,
                source,
            })?;
        }
        Ok(())
    }

    /// Move this handle's file onto `other`'s path, replacing whatever file
    /// was there. Afterwards this handle's path has no backing file. A
    /// missing source is an I/O error.
    pub fn move_to(&self, other: &ScratchFile) -> Result<(), ScratchError> {
        other.delete()?;
        let source_path = self.file_path();
        let target_path = other.file_path();
        fs::rename(&source_path, &target_path).map_err(|source| ScratchError::IoError {
            path: source_path,
            source,
        })?;
        Ok(())
    }

    /// Copy this handle's bytes onto `other`'s path, replacing whatever
    /// file was there. The source file is retained. A missing source is an
    /// I/O error.
    pub fn copy_to(&self, other: &ScratchFile) -> Result<(), ScratchError> {
        other.delete()?;
        let source_path = self.file_path();
        let target_path = other.file_path();
        fs::copy(&source_path, &target_path).map_err(|source| ScratchError::IoError {
            path: source_path,
            source,
        })?;
        Ok(())
    }

    /// Read the whole file. An absent file reads as empty bytes — a soft
    /// read, never an error for a missing file.
    pub fn read_all_bytes(&self) -> Result<Vec<u8>, ScratchError> {
        let path = self.file_path();
        if !path.is_file() {
            return Ok(Vec::new());
        }
        fs::read(&path).map_err(|source| ScratchError::IoError { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn handle(dir: &Path, name: &str) -> ScratchFile {
        ScratchFile::new(dir.to_path_buf(), name, false).unwrap()
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let dir = tempdir().unwrap();
        for bad in ["a/b.txt", "a\\b.txt", "/rooted"] {
            let err = ScratchFile::new(dir.path().to_path_buf(), bad, false).unwrap_err();
            assert!(matches!(err, ScratchError::InvalidName { .. }), "'{bad}'");
        }
        assert!(ScratchFile::new(dir.path().to_path_buf(), "plain.txt", false).is_ok());
    }

    #[test]
    fn create_if_not_exists_is_idempotent_and_preserves_content() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "data.bin");

        file.create_if_not_exists().unwrap();
        assert!(file.exists());
        assert_eq!(file.read_all_bytes().unwrap(), Vec::<u8>::new());

        fs::write(file.file_path(), b"payload").unwrap();
        file.create_if_not_exists().unwrap();
        assert_eq!(file.read_all_bytes().unwrap(), b"payload");
    }

    #[test]
    fn delete_of_absent_file_succeeds() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "never_written.txt");
        assert!(!file.exists());
        file.delete().unwrap();
    }

    #[test]
    fn absent_file_reads_as_empty_bytes() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "ghost.txt");
        assert_eq!(file.read_all_bytes().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rename_without_physical_file_updates_name_only() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "before.txt");

        file.rename("after.txt").unwrap();

        assert_eq!(file.file_name(), "after.txt");
        assert!(!file.exists());
        assert!(!dir.path().join("before.txt").exists());
    }

    #[test]
    fn rename_moves_the_file_and_replaces_the_target() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "source.txt");
        fs::write(file.file_path(), b"fresh").unwrap();
        fs::write(dir.path().join("target.txt"), b"stale").unwrap();

        file.rename("target.txt").unwrap();

        assert_eq!(file.file_name(), "target.txt");
        assert_eq!(fs::read(dir.path().join("target.txt")).unwrap(), b"fresh");
        assert!(!dir.path().join("source.txt").exists());
    }

    #[test]
    fn rename_to_stamped_template_keeps_shape() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "raw.dat");
        fs::write(file.file_path(), b"x").unwrap();

        file.rename("rolled_{0}.dat").unwrap();

        let name = file.file_name();
        assert!(name.starts_with("rolled_"), "got '{name}'");
        assert!(name.ends_with(".dat"), "got '{name}'");
        assert!(file.exists());
    }

    #[test]
    fn rename_to_separator_name_fails_and_keeps_old_name() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "keep.txt");

        let err = file.rename("sub/dir.txt").unwrap_err();

        assert!(matches!(err, ScratchError::InvalidName { .. }));
        assert_eq!(file.file_name(), "keep.txt");
    }

    #[test]
    fn move_to_replaces_destination_and_empties_source() {
        let dir = tempdir().unwrap();
        let source = handle(dir.path(), "src.txt");
        let target = handle(dir.path(), "dst.txt");
        fs::write(source.file_path(), b"new bytes").unwrap();
        fs::write(target.file_path(), b"old bytes, longer").unwrap();

        source.move_to(&target).unwrap();

        assert_eq!(target.read_all_bytes().unwrap(), b"new bytes");
        assert!(!source.exists());
    }

    #[test]
    fn move_to_with_missing_source_is_an_io_error() {
        let dir = tempdir().unwrap();
        let source = handle(dir.path(), "missing.txt");
        let target = handle(dir.path(), "dst.txt");

        let err = source.move_to(&target).unwrap_err();
        assert!(matches!(err, ScratchError::IoError { .. }));
    }

    #[test]
    fn copy_to_replaces_destination_and_keeps_source() {
        let dir = tempdir().unwrap();
        let source = handle(dir.path(), "src.txt");
        let target = handle(dir.path(), "dst.txt");
        fs::write(source.file_path(), b"copied").unwrap();
        fs::write(target.file_path(), b"overwritten").unwrap();

        source.copy_to(&target).unwrap();

        assert_eq!(target.read_all_bytes().unwrap(), b"copied");
        assert_eq!(source.read_all_bytes().unwrap(), b"copied");
    }

    #[test]
    fn clones_share_renames_and_classification() {
        let dir = tempdir().unwrap();
        let original = handle(dir.path(), "shared.txt");
        let alias = original.clone();

        original.make_permanent();
        assert!(alias.is_permanent());

        alias.rename("renamed.txt").unwrap();
        assert_eq!(original.file_name(), "renamed.txt");

        alias.make_temporary();
        assert!(!original.is_permanent());
    }

    #[test]
    fn directory_at_path_does_not_count_as_existing() {
        let dir = tempdir().unwrap();
        let file = handle(dir.path(), "occupied");
        fs::create_dir(file.file_path()).unwrap();

        assert!(!file.exists());
        file.delete().unwrap();
        assert!(file.file_path().is_dir());
        assert_eq!(file.read_all_bytes().unwrap(), Vec::<u8>::new());
    }
}
