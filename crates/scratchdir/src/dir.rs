// dir.rs — ScratchDir: a directory path plus the files allocated in it.
//
// A ScratchDir names one directory (base path + single-segment name) and
// tracks every file handle allocated through its factories, in allocation
// order. Tracking exists for cleanup bookkeeping: sweeps consult the
// tracked sequence, they do not own file lifetimes. Sub-directories are
// deliberately not tracked — only files are swept.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScratchError;
use crate::file::ScratchFile;
use crate::naming;

/// A scratch directory handle: owns a location and the ordered set of file
/// handles created through it.
///
/// The directory is not created on disk until [`create`](Self::create) is
/// called, and file handles can be allocated before their files exist.
/// An empty `dir_name` puts the handle in a placeholder state in which
/// sweeping is refused (`NotInitialized`).
#[derive(Debug)]
pub struct ScratchDir {
    /// Absolute path of the parent location.
    base_path: PathBuf,

    /// Directory name under `base_path`; a single path segment.
    dir_name: String,

    /// File handles allocated through this directory, in allocation order.
    files: Vec<ScratchFile>,
}

impl ScratchDir {
    /// Build a handle for `dir_name` under `base_path`.
    ///
    /// Fails with `InvalidName` when `dir_name` contains a path separator.
    /// An empty or blank `dir_name` is accepted and yields a placeholder
    /// handle. Nothing is created on disk.
    pub fn new(
        base_path: impl Into<PathBuf>,
        dir_name: impl Into<String>,
    ) -> Result<Self, ScratchError> {
        let dir_name = dir_name.into();
        if naming::contains_separator(&dir_name) {
            return Err(ScratchError::InvalidName { name: dir_name });
        }
        Ok(Self {
            base_path: base_path.into(),
            dir_name,
            files: Vec::new(),
        })
    }

    /// Get the parent location.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the directory name (single path segment; empty for a
    /// placeholder).
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Get the full directory path (base path joined with the name).
    pub fn dir_path(&self) -> PathBuf {
        self.base_path.join(&self.dir_name)
    }

    /// False while the handle is a placeholder (blank `dir_name`).
    pub fn is_initialized(&self) -> bool {
        !self.dir_name.trim().is_empty()
    }

    /// Ensure the directory exists on disk, creating missing parent levels
    /// as needed. Idempotent.
    pub fn create(&self) -> Result<(), ScratchError> {
        let path = self.dir_path();
        fs::create_dir_all(&path).map_err(|source| ScratchError::IoError {
            path,
            source,
        })?;
        Ok(())
    }

    /// Build a handle for a uniquely named sub-directory.
    ///
    /// The sub-directory is *not* created on disk and *not* tracked by this
    /// handle for cleanup — unlike file allocation. Callers own its whole
    /// lifecycle, starting with [`create`](Self::create).
    pub fn new_sub_dir(&self, template: &str) -> Result<ScratchDir, ScratchError> {
        let dir_path = self.dir_path();
        let name = naming::generate_entry_name(&dir_path, template)?;
        ScratchDir::new(dir_path, name)
    }

    /// Allocate a tracked handle classified temporary, named from
    /// `template`. The file itself is not created.
    pub fn new_temp_file(&mut self, template: &str) -> Result<ScratchFile, ScratchError> {
        self.new_file(template, false)
    }

    /// Allocate a tracked handle classified permanent, named from
    /// `template`. The file itself is not created.
    pub fn new_perma_file(&mut self, template: &str) -> Result<ScratchFile, ScratchError> {
        self.new_file(template, true)
    }

    pub(crate) fn new_file(
        &mut self,
        template: &str,
        permanent: bool,
    ) -> Result<ScratchFile, ScratchError> {
        let dir_path = self.dir_path();
        let name = naming::generate_entry_name(&dir_path, template)?;
        let file = ScratchFile::new(dir_path, name, permanent)?;
        self.files.push(file.clone());
        Ok(file)
    }

    /// Get the tracked handles currently classified temporary, in
    /// allocation order.
    pub fn temp_files(&self) -> Vec<ScratchFile> {
        self.files
            .iter()
            .filter(|f| !f.is_permanent())
            .cloned()
            .collect()
    }

    /// Get the tracked handles currently classified permanent, in
    /// allocation order.
    pub fn perma_files(&self) -> Vec<ScratchFile> {
        self.files
            .iter()
            .filter(|f| f.is_permanent())
            .cloned()
            .collect()
    }

    /// Delete every regular file physically present in the directory —
    /// tracked or not — and drop all tracked handles. Sub-directories and
    /// their contents are left alone.
    ///
    /// Fails with `NotInitialized` on a placeholder handle, and with
    /// `IoError` when the directory cannot be listed (including when it was
    /// never created).
    pub fn clear_all_files(&mut self) -> Result<(), ScratchError> {
        if !self.is_initialized() {
            return Err(ScratchError::NotInitialized);
        }

        let dir_path = self.dir_path();
        let entries = fs::read_dir(&dir_path).map_err(|source| ScratchError::IoError {
            path: dir_path.clone(),
            source,
        })?;

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|source| ScratchError::IoError {
                path: dir_path.clone(),
                source,
            })?;
            let entry_path = entry.path();
            let file_type = entry.file_type().map_err(|source| ScratchError::IoError {
                path: entry_path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                continue;
            }
            fs::remove_file(&entry_path).map_err(|source| ScratchError::IoError {
                path: entry_path,
                source,
            })?;
            removed += 1;
        }

        self.files.clear();
        tracing::debug!("cleared {} files from {}", removed, dir_path.display());
        Ok(())
    }

    /// Delete the files of tracked temporary handles and drop those handles
    /// from tracking. Permanent handles — including ones reclassified after
    /// allocation — and untracked files on disk are untouched.
    pub fn clear_temp_files(&mut self) -> Result<(), ScratchError> {
        let mut removed = 0usize;
        for file in &self.files {
            if !file.is_permanent() {
                file.delete()?;
                removed += 1;
            }
        }
        self.files.retain(|f| f.is_permanent());
        tracing::debug!(
            "cleared {} temp files from {}",
            removed,
            self.dir_path().display()
        );
        Ok(())
    }

    /// Delete a file in this directory by name, without going through a
    /// tracked handle. Absence is a success; a name with a separator fails
    /// with `InvalidName`.
    pub fn delete_file(&self, file_name: &str) -> Result<(), ScratchError> {
        let file = ScratchFile::new(self.dir_path(), file_name, false)?;
        file.delete()
    }
}
