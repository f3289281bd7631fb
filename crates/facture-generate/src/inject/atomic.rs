use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use facture_core::{FactureError, Result};

/// Replace `path` with `data` through a sibling temp file and a rename.
///
/// An existing file keeps its permissions. The temp file is removed when
/// anything before the rename fails.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path)?;
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(FactureError::io(path, err)),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)
        .map_err(|err| FactureError::io(&tmp_path, err))?;
    let written = file
        .write_all(data)
        .and_then(|()| file.sync_all())
        .and_then(|()| match permissions {
            Some(permissions) => fs::set_permissions(&tmp_path, permissions),
            None => Ok(()),
        });
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(FactureError::io(&tmp_path, err));
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(FactureError::io(path, err));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        sync_dir(parent).map_err(|err| FactureError::io(parent, err))?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        FactureError::conf(format!("invalid target filename '{}'", path.display()))
    })?;
    let tmp_name = format!(".{}.facture.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}
