use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{ClientError, Credentials, ResultClient};

/// File-backed persistence for [`Credentials`].
///
/// The file holds the credentials as pretty JSON. Writes go through a synced
/// sibling `<file name>.tmp` and a rename, so a crash mid-write leaves the
/// previous credentials readable.
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads stored credentials.
    ///
    /// A missing file or a file that does not hold valid credentials yields
    /// `None`; other I/O failures are errors.
    pub fn load(&self) -> ResultClient<Option<Credentials>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Credentials>(&raw) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "ignoring malformed token file: {err}"
                );
                Ok(None)
            }
        }
    }

    /// Persists `credentials`, replacing any previous content.
    pub fn save(&self, credentials: &Credentials) -> ResultClient<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(credentials).map_err(ClientError::Serialize)?;

        let tmp = self.tmp_path()?;
        if let Err(err) = write_synced(&tmp, json.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        tracing::info!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// `token.json` is staged as `token.json.tmp`.
    fn tmp_path(&self) -> ResultClient<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .ok_or_else(|| {
                ClientError::Config(format!(
                    "token file has no file name: {}",
                    self.path.display()
                ))
            })?
            .to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
