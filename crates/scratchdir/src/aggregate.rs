// aggregate.rs — Folding many input files into one result file.
//
// Every operation here takes an ordered list of input handles and yields
// one accumulator handle. Three families:
// - aggregate_files_into: the caller supplies the accumulator.
// - aggregate_files_into_{perma,temp}: a freshly named accumulator is
//   allocated and seeded by copying the first input.
// - aggregate_files_into_first_as_{perma,temp}: the first input *becomes*
//   the accumulator via an in-place rename — constant-cost metadata work
//   instead of a byte-proportional copy, which matters for large files.
//
// Each allocating family comes in a pairwise shape (combine is called once
// per remaining file, left to right) and a `_bulk` shape (combine is
// called exactly once with all its inputs). Shared rules: zero inputs
// yield an existing empty accumulator, one input yields an accumulator
// with that file's bytes and no combine call, and combine failures
// propagate verbatim.

use crate::dir::ScratchDir;
use crate::error::ScratchError;
use crate::file::ScratchFile;

impl ScratchDir {
    // ── Caller-owned accumulator ─────────────────────────────────────

    /// Fold `files` into the caller-owned `accumulator`.
    ///
    /// Zero files: the accumulator is created empty if absent. One file:
    /// its bytes are copied onto the accumulator. More: `combine` runs
    /// exactly once with the accumulator and all inputs, and is fully
    /// responsible for producing the result — the accumulator is not
    /// pre-seeded. The accumulator's classification is never touched.
    /// Returns the accumulator handle.
    pub fn aggregate_files_into<C>(
        &self,
        files: &[ScratchFile],
        accumulator: &ScratchFile,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        fold_bulk(files, accumulator, combine)?;
        Ok(accumulator.clone())
    }

    // ── Fresh accumulator, copy-seeded ───────────────────────────────

    /// Fold `files` into a freshly allocated permanent accumulator named
    /// from `template`, pairwise: the first input is copied onto the
    /// accumulator, then `combine(&accumulator, &file)` runs once per
    /// remaining file in input order.
    pub fn aggregate_files_into_perma<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        let accumulator = self.new_perma_file(template)?;
        fold_pairwise(files, &accumulator, combine)?;
        Ok(accumulator)
    }

    /// Temporary-classification variant of
    /// [`aggregate_files_into_perma`](Self::aggregate_files_into_perma).
    pub fn aggregate_files_into_temp<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        let accumulator = self.new_temp_file(template)?;
        fold_pairwise(files, &accumulator, combine)?;
        Ok(accumulator)
    }

    /// Bulk shape of
    /// [`aggregate_files_into_perma`](Self::aggregate_files_into_perma):
    /// with more than one input, `combine` runs exactly once with all
    /// inputs and the accumulator is not pre-seeded.
    pub fn aggregate_files_into_perma_bulk<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        let accumulator = self.new_perma_file(template)?;
        fold_bulk(files, &accumulator, combine)?;
        Ok(accumulator)
    }

    /// Bulk shape of
    /// [`aggregate_files_into_temp`](Self::aggregate_files_into_temp).
    pub fn aggregate_files_into_temp_bulk<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        let accumulator = self.new_temp_file(template)?;
        fold_bulk(files, &accumulator, combine)?;
        Ok(accumulator)
    }

    // ── First input becomes the accumulator ──────────────────────────

    /// Pairwise fold where the first input is renamed in place to a name
    /// from `template`, reclassified permanent, and used as the
    /// accumulator; the remaining files are folded into it in input order.
    ///
    /// No new handle is allocated unless `files` is empty (then a fresh
    /// empty accumulator is allocated as in the copy-seeded family). With
    /// inputs present, the returned handle *is* the first input — same
    /// shared handle state, new name, new classification.
    pub fn aggregate_files_into_first_as_perma<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        self.fold_into_first(files, template, true, combine)
    }

    /// Temporary-classification variant of
    /// [`aggregate_files_into_first_as_perma`](Self::aggregate_files_into_first_as_perma).
    pub fn aggregate_files_into_first_as_temp<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        self.fold_into_first(files, template, false, combine)
    }

    /// Bulk shape of
    /// [`aggregate_files_into_first_as_perma`](Self::aggregate_files_into_first_as_perma):
    /// after the first input is renamed into the accumulator, `combine`
    /// runs exactly once with the *remaining* inputs.
    pub fn aggregate_files_into_first_as_perma_bulk<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        self.fold_into_first_bulk(files, template, true, combine)
    }

    /// Temporary-classification variant of
    /// [`aggregate_files_into_first_as_perma_bulk`](Self::aggregate_files_into_first_as_perma_bulk).
    pub fn aggregate_files_into_first_as_temp_bulk<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        self.fold_into_first_bulk(files, template, false, combine)
    }

    fn fold_into_first<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        permanent: bool,
        mut combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
    {
        if files.is_empty() {
            return self.empty_accumulator(template, permanent);
        }
        let accumulator = adopt_first(&files[0], template, permanent)?;
        for file in &files[1..] {
            combine(&accumulator, file)?;
        }
        Ok(accumulator)
    }

    fn fold_into_first_bulk<C>(
        &mut self,
        files: &[ScratchFile],
        template: &str,
        permanent: bool,
        combine: C,
    ) -> Result<ScratchFile, ScratchError>
    where
        C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
    {
        if files.is_empty() {
            return self.empty_accumulator(template, permanent);
        }
        let accumulator = adopt_first(&files[0], template, permanent)?;
        if files.len() > 1 {
            combine(&accumulator, &files[1..])?;
        }
        Ok(accumulator)
    }

    /// Allocate a tracked accumulator for the zero-input case and make
    /// sure it exists as an empty file.
    fn empty_accumulator(
        &mut self,
        template: &str,
        permanent: bool,
    ) -> Result<ScratchFile, ScratchError> {
        let accumulator = self.new_file(template, permanent)?;
        accumulator.create_if_not_exists()?;
        Ok(accumulator)
    }
}

// ── Fold engines ─────────────────────────────────────────────────────

fn fold_pairwise<C>(
    files: &[ScratchFile],
    accumulator: &ScratchFile,
    mut combine: C,
) -> Result<(), ScratchError>
where
    C: FnMut(&ScratchFile, &ScratchFile) -> Result<(), ScratchError>,
{
    match files {
        [] => accumulator.create_if_not_exists(),
        [single] => single.copy_to(accumulator),
        [first, rest @ ..] => {
            first.copy_to(accumulator)?;
            for file in rest {
                combine(accumulator, file)?;
            }
            Ok(())
        }
    }
}

fn fold_bulk<C>(
    files: &[ScratchFile],
    accumulator: &ScratchFile,
    combine: C,
) -> Result<(), ScratchError>
where
    C: FnOnce(&ScratchFile, &[ScratchFile]) -> Result<(), ScratchError>,
{
    match files {
        [] => accumulator.create_if_not_exists(),
        [single] => single.copy_to(accumulator),
        _ => combine(accumulator, files),
    }
}

/// Turn the first input into the accumulator: rename it in place to a name
/// from `template`, then reclassify it. Its bytes are untouched, so the
/// accumulator starts out seeded with the first input's content.
fn adopt_first(
    first: &ScratchFile,
    template: &str,
    permanent: bool,
) -> Result<ScratchFile, ScratchError> {
    let accumulator = first.clone();
    accumulator.rename(template)?;
    if permanent {
        accumulator.make_permanent();
    } else {
        accumulator.make_temporary();
    }
    Ok(accumulator)
}
