use crate::error::fs::{
    CreateDirAllError, FsError, NoParentPathError, ReadFileError, ReadPermissionsError,
    SetPermissionsError, WriteFileError,
};
use std::fs::Permissions;
use std::path::{Path, PathBuf};

pub fn create_dir_all(path: &Path) -> Result<(), CreateDirAllError> {
    std::fs::create_dir_all(path).map_err(|source| CreateDirAllError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parent(path: &Path) -> Result<PathBuf, NoParentPathError> {
    match path.parent() {
        None => Err(NoParentPathError(path.to_path_buf())),
        Some(parent) => Ok(parent.to_path_buf()),
    }
}

pub fn read(path: &Path) -> Result<Vec<u8>, ReadFileError> {
    std::fs::read(path).map_err(|source| ReadFileError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_permissions(path: &Path) -> Result<Permissions, ReadPermissionsError> {
    std::fs::metadata(path)
        .map(|metadata| metadata.permissions())
        .map_err(|source| ReadPermissionsError {
            path: path.to_path_buf(),
            source,
        })
}

pub fn set_permissions(path: &Path, permissions: Permissions) -> Result<(), SetPermissionsError> {
    std::fs::set_permissions(path, permissions).map_err(|source| SetPermissionsError {
        path: path.to_path_buf(),
        source,
    })
}

/// Makes `path` readable and writable by its owner only. A no-op off unix.
pub fn restrict_to_owner(path: &Path) -> Result<(), FsError> {
    #[allow(unused_mut)]
    let mut permissions = read_permissions(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(0o600);
    }
    set_permissions(path, permissions)?;
    Ok(())
}

/// Writes `contents`, creating missing parent directories first.
pub fn write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<(), FsError> {
    let path = path.as_ref();
    create_dir_all(&parent(path)?)?;
    std::fs::write(path, contents).map_err(|source| WriteFileError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
