//! Generated project files and capability-scoped access to the project
//! directory.

mod compose;
mod env_file;
pub mod yaml;

pub use compose::ComposeOverride;
pub use env_file::{ENV_FILE_KEYS, EnvFile, GATEWAY_TOKEN_KEY, read_value};

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::error::{FilesystemError, Result};

/// Name of the environment file read by compose.
pub const ENV_FILE_NAME: &str = ".env";

/// Name of the generated compose override.
pub const COMPOSE_OVERRIDE_NAME: &str = "docker-compose.extra.yml";

/// Name of the base compose file.
pub const COMPOSE_BASE_NAME: &str = "docker-compose.yml";

/// Name of the image build recipe.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Handle on the project directory holding the compose files.
pub struct ProjectDir {
    root: Utf8PathBuf,
    dir: Dir,
}

impl ProjectDir {
    /// Open the project directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::NotFound` if the directory does not exist
    /// and `FilesystemError::IoError` if it cannot be opened.
    pub fn open(root: &Utf8Path) -> Result<Self> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| io_error(root.to_path_buf(), &error))?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// The directory's path as given.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Full path of `name` inside the project directory.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Fail unless `name` exists as a regular file.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::NotFound` naming the missing file.
    pub fn require(&self, name: &str) -> Result<()> {
        if self.dir.is_file(name) {
            Ok(())
        } else {
            Err(FilesystemError::NotFound {
                path: self.path(name),
            }
            .into())
        }
    }

    /// Read `name`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::IoError` for any failure other than the file
    /// being absent.
    pub fn read_optional(&self, name: &str) -> Result<Option<String>> {
        match self.dir.read_to_string(name) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(self.path(name), &error)),
        }
    }

    /// Replace `name` with `contents` through a temporary file and a rename.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::IoError` if the temporary file cannot be
    /// written or renamed into place.
    pub fn write_atomic(&self, name: &str, contents: &str) -> Result<()> {
        let temp_name = format!(".{name}.{}.tmp", std::process::id());
        self.dir
            .write(&temp_name, contents)
            .map_err(|error| io_error(self.path(&temp_name), &error))?;

        if let Err(error) = self.dir.rename(&temp_name, &self.dir, name) {
            // Best effort; the rename failure is what gets reported.
            let _removed = self.dir.remove_file(&temp_name);
            return Err(io_error(self.path(name), &error));
        }

        debug!(path = %self.path(name), "wrote file");
        Ok(())
    }
}

/// Create `path` and any missing parents.
///
/// # Errors
///
/// Returns `FilesystemError::IoError` if the directory cannot be created.
pub fn ensure_host_dir(path: &Utf8Path) -> Result<()> {
    Dir::create_ambient_dir_all(path, ambient_authority())
        .map_err(|error| io_error(path.to_path_buf(), &error))
}

fn io_error(path: Utf8PathBuf, error: &io::Error) -> crate::error::SetupError {
    if error.kind() == io::ErrorKind::NotFound {
        FilesystemError::NotFound { path }.into()
    } else {
        FilesystemError::IoError {
            path,
            message: error.to_string(),
        }
        .into()
    }
}
