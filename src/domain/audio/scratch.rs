use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Longest item id fragment kept in a scratch file name
const MAX_PREFIX_CHARS: usize = 64;

/// Per-invocation scratch file holding synthesized audio until upload.
/// The file is deleted when the value is dropped.
#[derive(Debug)]
pub struct ScratchAudio {
    file: NamedTempFile,
}

impl ScratchAudio {
    /// Ensure `dir` exists and write `audio` to a fresh `<item_id>-XXXXXX.mp3` inside it.
    pub async fn write(dir: &Path, item_id: &str, audio: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let dir: PathBuf = dir.to_path_buf();
        let prefix = format!("{}-", file_name_fragment(item_id));
        let audio = audio.to_vec();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".mp3")
                .tempfile_in(&dir)?;
            file.write_all(&audio)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(std::io::Error::other)??;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// File-name-safe, length-capped form of an item id
fn file_name_fragment(item_id: &str) -> String {
    item_id
        .chars()
        .take(MAX_PREFIX_CHARS)
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}
