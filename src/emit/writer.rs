//! Writing the artifact pair to disk.
//!
//! Both files are written next to their targets under temporary names and
//! read back. Only when both are verified are they renamed into place; on
//! any failure the temporaries are removed and existing artifacts are left
//! untouched.

use super::render::{ArtifactPair, HEADER_FILE_NAME, SOURCE_FILE_NAME};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Final locations of a written pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPair {
    pub header: PathBuf,
    pub source: PathBuf,
}

fn temporary_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    target.with_file_name(name)
}

fn write_verified(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)?;

    let read_back = fs::read_to_string(path)?;
    if read_back != contents {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Verification of {:?} failed: wrote {} bytes, read {} bytes",
                path,
                contents.len(),
                read_back.len()
            ),
        ));
    }
    Ok(())
}

fn remove_temporaries(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove temporary {:?}: {}", path, e);
            }
        }
    }
}

/// Write `pair` into `dir` as `lwb_constants.h` and `lwb_constants.c`.
pub fn write_pair(pair: &ArtifactPair, dir: &Path) -> io::Result<WrittenPair> {
    fs::create_dir_all(dir)?;

    let header = dir.join(HEADER_FILE_NAME);
    let source = dir.join(SOURCE_FILE_NAME);
    let header_tmp = temporary_path(&header);
    let source_tmp = temporary_path(&source);

    let staged = write_verified(&header_tmp, &pair.header)
        .and_then(|()| write_verified(&source_tmp, &pair.source));
    if let Err(e) = staged {
        remove_temporaries(&[&header_tmp, &source_tmp]);
        return Err(e);
    }
    debug!("Staged {:?} and {:?}", header_tmp, source_tmp);

    if let Err(e) = fs::rename(&header_tmp, &header) {
        remove_temporaries(&[&header_tmp, &source_tmp]);
        return Err(e);
    }
    if let Err(e) = fs::rename(&source_tmp, &source) {
        remove_temporaries(&[&source_tmp]);
        return Err(e);
    }

    info!("Wrote {:?} and {:?}", header, source);
    Ok(WrittenPair { header, source })
}
