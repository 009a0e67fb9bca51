use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Reads the whole file under a shared lock. A missing file is reported as `None`.
pub async fn read_locked(path: &Path) -> Result<Option<String>> {
    async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
        debug!("Reading {path:?}");
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result.map(|_| content)
    }

    match extract(path).await {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)?,
    }
}

/// Replaces the content of a file under an exclusive lock. The file is created if needed.
pub async fn write_locked(path: &Path, content: &[u8]) -> Result<()> {
    debug!("Writing {} bytes into {path:?}", content.len());
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;

    // Semi-safe acquire-release for a file. Truncation happens only once the lock is held so
    // readers never see a half written value.
    file.lock_exclusive()?;
    let result = write_with_file(&mut file, content).await;
    file.unlock_async().await?;
    result
}

async fn write_with_file(file: &mut File, content: &[u8]) -> Result<()> {
    file.set_len(0).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_data().await?;
    Ok(())
}
