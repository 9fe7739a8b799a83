//! Per-package directory writer.

use crate::error::SplitError;
use crate::loader::PackageMap;
use crate::naming::FileNameCodec;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files produced by [`write_package_dir`].
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Single-line content for a package file: key followed by sorted flags.
pub fn render_entry(key: &str, flags: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = flags.iter().map(String::as_str).collect();
    format!("{} {}\n", key, joined.join(" "))
}

/// Write one file per package into `out_dir`, which must not exist yet.
///
/// Encoding collisions are checked before the directory is created and are
/// reported against `source`, the file the packages were read from.
pub fn write_package_dir(
    packages: &PackageMap,
    source: &Path,
    out_dir: &Path,
    codec: &FileNameCodec,
) -> Result<WriteSummary, SplitError> {
    codec.check_injective(packages.keys().map(String::as_str), source)?;

    if out_dir.exists() {
        return Err(SplitError::TargetExists(out_dir.to_path_buf()));
    }
    fs::create_dir(out_dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            SplitError::TargetExists(out_dir.to_path_buf())
        } else {
            SplitError::io("create directory", out_dir)(e)
        }
    })?;

    let mut summary = WriteSummary {
        dir: out_dir.to_path_buf(),
        files: Vec::with_capacity(packages.len()),
    };

    for (key, flags) in packages {
        let path = out_dir.join(codec.encode(key));
        let mut file = fs::File::create_new(&path).map_err(SplitError::io("create", &path))?;
        file.write_all(render_entry(key, flags).as_bytes())
            .map_err(SplitError::io("write", &path))?;
        debug!(package = %key, file = %path.display(), "Wrote package file");
        summary.files.push(path);
    }

    info!(
        dir = %out_dir.display(),
        files = summary.files.len(),
        "Wrote package directory"
    );
    Ok(summary)
}
