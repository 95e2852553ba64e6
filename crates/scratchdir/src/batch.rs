// batch.rs — Per-item file allocation loops and the overwrite/promote guard.
//
// Two families live here:
// - for_each_with_{temp,perma}_file: allocate one fresh handle per input
//   item (item index substituted into the name marker) and let the caller
//   populate it.
// - {for_each_,}with_overwriting_temp_file: produce into a working ".tmp"
//   file and promote it over the durable file afterwards. The promote step
//   runs even when the producing action failed — work that was fully
//   written before the failure still lands; work that never materialized
//   leaves the durable file untouched.

use crate::dir::ScratchDir;
use crate::error::ScratchError;
use crate::file::ScratchFile;
use crate::naming::NAME_MARKER;

impl ScratchDir {
    /// Allocate one temp file per item and let `action` populate it.
    ///
    /// For each item in input order, the name comes from `name_for(item)`
    /// with the item's index substituted for the marker; the handle is
    /// allocated through the tracked factory and `action(item, &handle)`
    /// runs before the next item. Handles are returned in input order.
    /// Empty input allocates nothing. A failing action aborts the loop.
    pub fn for_each_with_temp_file<T, N, A>(
        &mut self,
        items: &[T],
        name_for: N,
        action: A,
    ) -> Result<Vec<ScratchFile>, ScratchError>
    where
        N: FnMut(&T) -> String,
        A: FnMut(&T, &ScratchFile) -> Result<(), ScratchError>,
    {
        self.for_each_with_file(items, name_for, action, false)
    }

    /// Permanent-classification variant of
    /// [`for_each_with_temp_file`](Self::for_each_with_temp_file).
    pub fn for_each_with_perma_file<T, N, A>(
        &mut self,
        items: &[T],
        name_for: N,
        action: A,
    ) -> Result<Vec<ScratchFile>, ScratchError>
    where
        N: FnMut(&T) -> String,
        A: FnMut(&T, &ScratchFile) -> Result<(), ScratchError>,
    {
        self.for_each_with_file(items, name_for, action, true)
    }

    fn for_each_with_file<T, N, A>(
        &mut self,
        items: &[T],
        mut name_for: N,
        mut action: A,
        permanent: bool,
    ) -> Result<Vec<ScratchFile>, ScratchError>
    where
        N: FnMut(&T) -> String,
        A: FnMut(&T, &ScratchFile) -> Result<(), ScratchError>,
    {
        let mut handles = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let file_name = name_for(item).replace(NAME_MARKER, &index.to_string());
            let file = self.new_file(&file_name, permanent)?;
            action(item, &file)?;
            handles.push(file);
        }
        Ok(handles)
    }

    /// Produce `template` through a working temp file with a promote
    /// guard.
    ///
    /// Allocates a durable handle named from `template` and a working
    /// handle named from `template + ".tmp"`, then runs
    /// `action(&durable, &working)`. Afterwards — success or failure — a
    /// physically existing working file is moved over the durable file.
    /// An action failure is re-raised once the guard has run; a failure of
    /// the promote move itself takes precedence over the action's.
    pub fn with_overwriting_temp_file<A>(
        &mut self,
        template: &str,
        action: A,
    ) -> Result<(), ScratchError>
    where
        A: FnOnce(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        let durable = self.new_perma_file(template)?;
        let working = self.new_temp_file(&format!("{template}.tmp"))?;

        let outcome = action(&durable, &working);
        promote_if_written(&durable, &working)?;
        outcome
    }

    /// Run [`with_overwriting_temp_file`](Self::with_overwriting_temp_file)
    /// semantics once per item, reusing the same two names — `name_prefix`
    /// and `name_prefix + ".tmp"` — across the whole loop. Each completed
    /// item therefore overwrites the previous item's durable file. A
    /// failing action aborts the loop, after its own promote guard ran.
    pub fn for_each_with_overwriting_temp_file<T, A>(
        &mut self,
        items: &[T],
        name_prefix: &str,
        mut action: A,
    ) -> Result<(), ScratchError>
    where
        A: FnMut(&T, &ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        for item in items {
            let durable = self.new_perma_file(name_prefix)?;
            let working = self.new_temp_file(&format!("{name_prefix}.tmp"))?;

            let outcome = action(item, &durable, &working);
            promote_if_written(&durable, &working)?;
            outcome?;
        }
        Ok(())
    }
}

/// The promote guard: if the working file physically exists, move it over
/// the durable file. Runs regardless of how the producing action ended, so
/// fully written work survives a late failure while an early failure
/// leaves the durable file as it was.
fn promote_if_written(durable: &ScratchFile, working: &ScratchFile) -> Result<(), ScratchError> {
    if working.exists() {
        working.move_to(durable)?;
        tracing::debug!(
            "promoted '{}' over '{}'",
            working.file_name(),
            durable.file_name()
        );
    }
    Ok(())
}
