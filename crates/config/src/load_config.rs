// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use path_clean::clean;
use std::path::{Path, PathBuf};

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Look for `filename` in `path` and each of its ancestors.
pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    path.ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Where the config file is expected to be, and whether the user asked for it explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfigPath {
    pub path: PathBuf,
    pub explicit: bool,
}

pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: &Path,
    default_filename: &str,
    cli_file: Option<&Path>,
) -> ResolvedConfigPath {
    if let Some(cli_file) = cli_file {
        let path = if cli_file.is_absolute() {
            cli_file.to_path_buf()
        } else {
            clean(cwd.join(cli_file))
        };
        return ResolvedConfigPath {
            path,
            explicit: true,
        };
    }

    let path = find_in_parent(cwd, default_filename)
        .unwrap_or_else(|| clean(default_config_dir.join(default_filename)));
    ResolvedConfigPath {
        path,
        explicit: false,
    }
}
