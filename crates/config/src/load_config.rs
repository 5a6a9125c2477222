// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

/// Walk up from `path` looking for `filename`
pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// An explicit file wins (relative paths resolve against `cwd`), otherwise search upwards from
/// `cwd`. Returns `None` when no file could be located so defaults apply.
pub fn resolve_config_path(
    cwd: PathBuf,
    default_filename: &str,
    explicit: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(file) = explicit {
        if file.is_absolute() {
            return Some(file);
        }
        return Some(cwd.join(file));
    }

    find_in_parent(&cwd, default_filename)
}
