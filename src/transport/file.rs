//! Local file transport: writes each block as a WAV artifact.

use crate::error::{MicstreamError, Result};
use crate::pcm::wav;
use crate::transport::{EncodedBlock, TransportSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes every delivered block to disk as a complete WAV file.
///
/// PCM blocks get a header framed on the way out so the artifacts are always
/// playable; WAV blocks are written verbatim. With a fixed output path every
/// write replaces the file; in directory mode each block gets a timestamped
/// name.
pub struct WavFileSink {
    target: Target,
    sample_rate: u32,
    channels: u16,
    sequence: u64,
}

enum Target {
    /// A single output file, overwritten on each write.
    Path(PathBuf),
    /// A directory receiving one timestamped file per block.
    Dir(PathBuf),
}

impl WavFileSink {
    /// Sink writing to one fixed file path.
    pub fn to_path(path: impl Into<PathBuf>, sample_rate: u32, channels: u16) -> Self {
        Self {
            target: Target::Path(path.into()),
            sample_rate,
            channels,
            sequence: 0,
        }
    }

    /// Sink writing timestamped files into a directory.
    pub fn to_dir(dir: impl Into<PathBuf>, sample_rate: u32, channels: u16) -> Self {
        Self {
            target: Target::Dir(dir.into()),
            sample_rate,
            channels,
            sequence: 0,
        }
    }

    fn next_path(&mut self) -> PathBuf {
        match &self.target {
            Target::Path(path) => path.clone(),
            Target::Dir(dir) => {
                // Sequence suffix keeps same-millisecond flushes distinct.
                self.sequence += 1;
                dir.join(format!(
                    "capture-{}-{:04}.wav",
                    chrono::Local::now().format("%Y%m%d-%H%M%S%.3f"),
                    self.sequence
                ))
            }
        }
    }

    fn as_wav_bytes(&self, block: EncodedBlock) -> Result<Vec<u8>> {
        match block {
            EncodedBlock::Wav(bytes) => Ok(bytes),
            EncodedBlock::Pcm(bytes) => wav::frame(&bytes, self.sample_rate, self.channels),
        }
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl TransportSink for WavFileSink {
    async fn send(&mut self, block: EncodedBlock) -> Result<()> {
        let path = self.next_path();
        let bytes = self.as_wav_bytes(block)?;

        ensure_parent_dir(&path).await?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| MicstreamError::Transport {
                message: format!("Failed to write {}: {}", path.display(), e),
            })?;

        eprintln!("micstream: wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::wav::HEADER_LEN;

    #[tokio::test]
    async fn writes_wav_block_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut sink = WavFileSink::to_path(&path, 44100, 1);

        let wav_bytes = wav::frame(&[0u8; 64], 44100, 1).unwrap();
        sink.send(EncodedBlock::Wav(wav_bytes.clone())).await.unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, wav_bytes);
    }

    #[tokio::test]
    async fn frames_pcm_block_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut sink = WavFileSink::to_path(&path, 16000, 2);

        sink.send(EncodedBlock::Pcm(vec![0u8; 400])).await.unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), HEADER_LEN + 400);
        assert_eq!(&written[0..4], b"RIFF");

        let reader = hound::WavReader::new(std::io::Cursor::new(written)).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 16000);
    }

    #[tokio::test]
    async fn dir_mode_writes_one_file_per_block() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WavFileSink::to_dir(dir.path(), 8000, 1);

        sink.send(EncodedBlock::Pcm(vec![0u8; 10])).await.unwrap();
        sink.send(EncodedBlock::Pcm(vec![0u8; 10])).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.wav");
        let mut sink = WavFileSink::to_path(&path, 44100, 1);

        sink.send(EncodedBlock::Pcm(vec![0u8; 4])).await.unwrap();
        assert!(path.exists());
    }
}
