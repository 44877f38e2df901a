// Backup downloads
//
// `/ci/firmware` and `/ci/startup-config` stream the firmware image and
// the startup configuration. Bodies are written chunk by chunk; the file
// name comes from `Content-Disposition` when the router sends one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::client::RouterClient;
use crate::error::Error;

/// Downloads can take minutes on slow flash.
pub const BACKUP_TIMEOUT: Duration = Duration::from_secs(180);

/// What to back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupKind {
    Firmware,
    Config,
}

impl BackupKind {
    pub const ALL: [Self; 2] = [Self::Firmware, Self::Config];

    fn endpoint(self) -> &'static str {
        match self {
            Self::Firmware => "/ci/firmware",
            Self::Config => "/ci/startup-config",
        }
    }

    fn fallback_file_name(self) -> &'static str {
        match self {
            Self::Firmware => "firmware.bin",
            Self::Config => "startup-config.txt",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firmware => "firmware",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firmware" => Ok(Self::Firmware),
            "config" => Ok(Self::Config),
            other => Err(format!("unknown backup type '{other}' (expected firmware or config)")),
        }
    }
}

/// Extract a safe file name from a `Content-Disposition` header value.
///
/// Directory components are discarded so the download cannot escape the
/// target folder.
pub fn disposition_file_name(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"'))
    })?;
    let name = Path::new(raw).file_name()?.to_str()?;
    (!name.is_empty()).then(|| name.to_owned())
}

impl RouterClient {
    /// Stream one backup into `folder`, creating it if needed.
    ///
    /// Returns the path of the written file.
    pub async fn download_backup(&self, kind: BackupKind, folder: &Path) -> Result<PathBuf, Error> {
        self.authenticate().await?;
        tokio::fs::create_dir_all(folder).await?;

        let url = self.url(kind.endpoint())?;
        debug!("GET {}", url);
        let resp = self
            .http()
            .get(url)
            .timeout(BACKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_secs: BACKUP_TIMEOUT.as_secs(),
                    }
                } else {
                    Error::Transport(e)
                }
            })?;

        if resp.status() != StatusCode::OK {
            return Err(Error::Api {
                status: resp.status().as_u16(),
                message: format!("backup download of {kind} failed"),
            });
        }

        let file_name = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .unwrap_or_else(|| kind.fallback_file_name().to_owned());
        let path = folder.join(file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk.map_err(Error::Transport)?).await?;
        }
        file.flush().await?;

        info!(kind = %kind, path = %path.display(), "backup saved");
        Ok(path)
    }

    /// Download each requested backup kind in turn.
    pub async fn backup(&self, kinds: &[BackupKind], folder: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut written = Vec::with_capacity(kinds.len());
        for kind in kinds {
            written.push(self.download_backup(*kind, folder).await?);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_name_is_unquoted() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="startup-config.txt""#),
            Some("startup-config.txt".into())
        );
        assert_eq!(
            disposition_file_name("attachment; filename=KN-1010_4.1.bin"),
            Some("KN-1010_4.1.bin".into())
        );
    }

    #[test]
    fn disposition_name_cannot_escape_folder() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="../../etc/passwd""#),
            Some("passwd".into())
        );
        assert_eq!(disposition_file_name("attachment"), None);
    }

    #[test]
    fn backup_kind_parses_case_insensitively() {
        assert_eq!("Firmware".parse::<BackupKind>(), Ok(BackupKind::Firmware));
        assert_eq!("config".parse::<BackupKind>(), Ok(BackupKind::Config));
        assert!("everything".parse::<BackupKind>().is_err());
    }
}
