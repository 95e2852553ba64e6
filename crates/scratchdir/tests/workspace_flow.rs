// workspace_flow.rs — End-to-end integration test for a scratch workspace.
//
// This single test walks a complete unit of work through one scratch
// directory:
//
//   1. Create the scratch directory under a caller-supplied base path
//   2. Allocate one temp chunk file per input region and populate each
//   3. Roll the chunks into one permanent report by renaming the first
//      chunk in place (no byte copy of the first input)
//   4. Publish a summary through the overwrite/promote guard (success)
//   5. Publish again, failing AFTER the working file is fully written —
//      the finished work must still land
//   6. Publish again, failing BEFORE anything is written — the last
//      summary must remain byte-for-byte intact
//   7. Allocate a sub-directory and confirm the parent never tracks it
//   8. Sweep temps — the promoted report and untracked strays survive
//   9. Sweep everything — only the sub-directory is left standing
//
// VERIFY:
//   - Generated names are distinct and follow the templates
//   - The rolled report is the renamed first chunk, not a new handle
//   - The promote guard lands late-failure work and preserves the
//     durable file on early failure
//   - clear_temp_files respects permanence set after allocation
//   - clear_all_files removes untracked files but never directories

use std::fs;

use tempfile::tempdir;

use scratchdir::{ScratchDir, ScratchError, ScratchFile};

fn append(acc: &ScratchFile, file: &ScratchFile) -> Result<(), ScratchError> {
    let mut bytes = acc.read_all_bytes()?;
    bytes.extend(file.read_all_bytes()?);
    fs::write(acc.file_path(), &bytes).map_err(ScratchError::action)
}

/// The complete scratch-workspace flow, allocation to final sweep.
#[test]
fn full_workspace_flow_allocate_combine_promote_sweep() {
    // =========================================================
    // SETUP: A scratch directory under a temp base path
    // =========================================================

    let base = tempdir().unwrap();
    let mut work = ScratchDir::new(base.path(), "nightly_run").unwrap();
    work.create().unwrap();
    work.create().unwrap(); // Idempotent.
    assert!(work.is_initialized());
    assert!(work.dir_path().is_dir());

    // An untracked stray, as left behind by some other process.
    fs::write(work.dir_path().join("stray_notes.txt"), b"leftover").unwrap();

    // =========================================================
    // STEP 1: One temp chunk per region, populated in order
    // =========================================================

    let regions = ["north", "south", "east"];
    let chunks = work
        .for_each_with_temp_file(
            &regions,
            |_| "chunk_{0}.csv".to_string(),
            |region, file| {
                fs::write(file.file_path(), format!("{region},1\n")).map_err(ScratchError::action)
            },
        )
        .unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].file_name(), "chunk_0.csv");
    assert_eq!(chunks[2].file_name(), "chunk_2.csv");
    assert_eq!(work.temp_files().len(), 3);
    assert!(chunks.iter().all(|c| c.exists()));

    // =========================================================
    // STEP 2: Roll chunks into one permanent report, first-in-place
    // =========================================================

    let tracked_before = work.temp_files().len() + work.perma_files().len();
    let report = work
        .aggregate_files_into_first_as_perma(&chunks, "report_{0}.csv", append)
        .unwrap();

    // The report IS the first chunk: same shared handle state, renamed
    // and promoted in place, nothing new tracked.
    assert_eq!(report.file_path(), chunks[0].file_path());
    assert!(chunks[0].is_permanent());
    assert!(report.file_name().starts_with("report_"));
    assert!(report.file_name().ends_with(".csv"));
    assert!(!work.dir_path().join("chunk_0.csv").exists());
    assert_eq!(
        work.temp_files().len() + work.perma_files().len(),
        tracked_before
    );

    assert_eq!(report.read_all_bytes().unwrap(), b"north,1\nsouth,1\neast,1\n");

    // =========================================================
    // STEP 3: Publish a summary through the promote guard
    // =========================================================

    work.with_overwriting_temp_file("summary.txt", |_, working| {
        fs::write(working.file_path(), b"rows=3").map_err(ScratchError::action)
    })
    .unwrap();

    let summary_path = work.dir_path().join("summary.txt");
    assert_eq!(fs::read(&summary_path).unwrap(), b"rows=3");
    assert!(!work.dir_path().join("summary.txt.tmp").exists());

    // =========================================================
    // STEP 4: Publish fails AFTER the working file is complete
    // =========================================================

    let err = work
        .with_overwriting_temp_file("summary.txt", |_, working| {
            fs::write(working.file_path(), b"rows=3;checked=yes")
                .map_err(ScratchError::action)?;
            Err(ScratchError::action("notifier unreachable"))
        })
        .unwrap_err();

    // The failure surfaces, but the finished working file was promoted.
    assert!(err.to_string().contains("notifier unreachable"));
    assert_eq!(fs::read(&summary_path).unwrap(), b"rows=3;checked=yes");
    assert!(!work.dir_path().join("summary.txt.tmp").exists());

    // =========================================================
    // STEP 5: Publish fails BEFORE anything is written
    // =========================================================

    let err = work
        .with_overwriting_temp_file("summary.txt", |_, _| {
            Err(ScratchError::action("input validation failed"))
        })
        .unwrap_err();

    assert!(err.to_string().contains("input validation failed"));
    // No working file ever existed, so the durable summary is untouched.
    assert_eq!(fs::read(&summary_path).unwrap(), b"rows=3;checked=yes");

    // =========================================================
    // STEP 6: Sub-directories are the caller's business, not tracked
    // =========================================================

    let archive = work.new_sub_dir("archive_{0}").unwrap();
    assert!(!archive.dir_path().exists()); // Not created by allocation.
    archive.create().unwrap();
    fs::write(archive.dir_path().join("kept.log"), b"history").unwrap();

    // =========================================================
    // STEP 7: Temp sweep — promoted report and strays survive
    // =========================================================

    work.clear_temp_files().unwrap();

    assert!(report.exists(), "promoted report must survive a temp sweep");
    assert!(!chunks[1].exists());
    assert!(!chunks[2].exists());
    assert_eq!(fs::read(&summary_path).unwrap(), b"rows=3;checked=yes");
    assert!(work.dir_path().join("stray_notes.txt").exists());
    assert!(work.temp_files().is_empty());
    assert!(!work.perma_files().is_empty());

    // =========================================================
    // STEP 8: Full sweep — every file goes, directories stay
    // =========================================================

    work.clear_all_files().unwrap();

    assert!(!report.exists());
    assert!(!summary_path.exists());
    assert!(!work.dir_path().join("stray_notes.txt").exists());
    assert!(work.temp_files().is_empty());
    assert!(work.perma_files().is_empty());

    // The sub-directory and its content were never the parent's to sweep.
    assert!(archive.dir_path().is_dir());
    assert_eq!(
        fs::read(archive.dir_path().join("kept.log")).unwrap(),
        b"history"
    );
}
