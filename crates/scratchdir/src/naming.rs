// naming.rs — Collision-avoiding name generation for scratch entries.
//
// Names come from a template carrying at most one `{0}` marker:
// - blank template        -> fully generated name ("<stamp>_<n>.tmp")
// - template with marker  -> marker replaced by a millisecond wall-clock
//                            stamp plus a per-millisecond counter
// - template, no marker   -> used verbatim (caller asked for an exact,
//                            possibly colliding name; that is accepted)
//
// Uniqueness is best-effort: the counter comes from a point-in-time listing
// of the target directory, so only sequential callers per directory are
// covered. Concurrent callers racing on one directory can still collide.

use std::fs;
use std::path::Path;

use chrono::Local;

use crate::error::ScratchError;

/// Substitution marker recognized inside name templates.
pub const NAME_MARKER: &str = "{0}";

/// Template used when the caller supplies no template at all.
const FALLBACK_TEMPLATE: &str = "{0}.tmp";

/// Stamp layout substituted for the marker: date, time, milliseconds.
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";

/// True when `name` spans more than one path segment (contains a
/// separator). Both separator flavors are rejected so names stay portable
/// across platforms.
pub fn contains_separator(name: &str) -> bool {
    name.contains('/') || name.contains('\\')
}

/// Derive an entry name for `dir_path` from `template`.
///
/// A blank template falls back to a fully generated `.tmp` name; a template
/// containing [`NAME_MARKER`] gets a stamped, disambiguated name; any other
/// template is returned verbatim. The directory is consulted (listed) only
/// on the stamped path.
pub fn generate_entry_name(dir_path: &Path, template: &str) -> Result<String, ScratchError> {
    if template.trim().is_empty() {
        return generate_stamped_name(dir_path, FALLBACK_TEMPLATE);
    }
    if template.contains(NAME_MARKER) {
        return generate_stamped_name(dir_path, template);
    }
    Ok(template.to_string())
}

/// Replace the marker in `template` with a millisecond stamp plus a
/// counter of similar entries already present in `dir_path`.
///
/// The counter is what keeps two sequential calls inside the same
/// millisecond apart: once the first result is materialized on disk it is
/// counted as a similar entry, so the second call appends `_1` instead of
/// `_0`. Fails with `InvalidTemplate` when `template` is blank or has no
/// marker, and with `IoError` when `dir_path` cannot be listed.
pub fn generate_stamped_name(dir_path: &Path, template: &str) -> Result<String, ScratchError> {
    if template.trim().is_empty() {
        return Err(ScratchError::InvalidTemplate {
            template: template.to_string(),
        });
    }
    let (prefix, suffix) = match template.split_once(NAME_MARKER) {
        Some(parts) => parts,
        None => {
            return Err(ScratchError::InvalidTemplate {
                template: template.to_string(),
            })
        }
    };

    let stamp = Local::now().format(STAMP_FORMAT).to_string();
    let stem = format!("{prefix}{stamp}");
    let similar = count_similar_entries(dir_path, &stem, suffix)?;
    let name = template.replace(NAME_MARKER, &format!("{stamp}_{similar}"));
    tracing::trace!("generated entry name '{}' in {}", name, dir_path.display());
    Ok(name)
}

/// Count entries of `dir_path` whose name starts with `stem` and ends with
/// `suffix`. Matches every disambiguated sibling produced from the same
/// template and stamp, whatever counter it carries.
fn count_similar_entries(dir_path: &Path, stem: &str, suffix: &str) -> Result<usize, ScratchError> {
    let entries = fs::read_dir(dir_path).map_err(|source| ScratchError::IoError {
        path: dir_path.to_path_buf(),
        source,
    })?;

    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|source| ScratchError::IoError {
            path: dir_path.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.len() >= stem.len() + suffix.len()
            && name.starts_with(stem)
            && name.ends_with(suffix)
        {
            count += 1;
        }
    }
    Ok(count)
}
