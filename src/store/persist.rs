use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::GlobalStore;

pub const STORE_FILE_NAME: &str = "data.json";

/// Loads the backing file. A missing file or an unreadable document degrades
/// to the default empty store instead of failing startup; whatever was on
/// disk stays untouched until the next flush overwrites it.
pub async fn load_or_default(path: &Path) -> GlobalStore {
    match read_store(path).await {
        Ok(store) => store,
        Err(e) => {
            match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == ErrorKind::NotFound => {
                    debug!("No backing file at {path:?}, starting empty")
                }
                _ => warn!("Couldn't read backing file {path:?}, starting empty: {e:?}"),
            }
            GlobalStore::default()
        }
    }
}

async fn read_store(path: &Path) -> Result<GlobalStore> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut raw = String::new();
    let read = file.read_to_string(&mut raw).await;
    file.unlock_async().await?;
    read?;
    Ok(serde_json::from_str(&raw)?)
}

/// Rewrites the backing file with the full store. Pretty-printed so the file
/// stays hand-inspectable. Callers are expected to log and swallow the error;
/// in-memory state remains the source of truth either way.
pub async fn flush(path: &Path, store: &GlobalStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = File::options()
        .write(true)
        .create(true)
        .read(true)
        .truncate(false)
        .open(path)
        .await?;

    // Semi-safe acquire-release for the file
    file.lock_exclusive()?;
    let result = overwrite(&mut file, store).await;
    file.unlock_async().await?;
    result
}

async fn overwrite(file: &mut File, store: &GlobalStore) -> Result<()> {
    let buffer = serde_json::to_vec_pretty(store)?;
    file.set_len(0).await?;
    file.seek(std::io::SeekFrom::Start(0)).await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}
