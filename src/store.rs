use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, VidscribeError};

/// Persisted metadata plus audio reference for one uploaded video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique record identifier
    pub id: Uuid,

    /// Path to the stored audio file
    pub audio_path: PathBuf,

    /// Filename as supplied by the uploader
    pub original_filename: String,

    /// Transcript text, set once by the transcription service
    pub transcription: Option<String>,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Whether a non-empty transcript has been attached
    pub fn has_transcription(&self) -> bool {
        self.transcription
            .as_ref()
            .map_or(false, |t| !t.trim().is_empty())
    }
}

/// Durable store for uploaded audio files and their metadata records.
///
/// Audio bytes and a JSON metadata sidecar are written to the data
/// directory; an in-memory index is rebuilt from the sidecars at startup.
#[derive(Debug, Clone)]
pub struct VideoStore {
    /// Base directory for audio files and record sidecars
    data_dir: PathBuf,

    /// In-memory record index (thread-safe)
    records: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl VideoStore {
    /// Create a store rooted at `data_dir`, loading any existing records
    pub async fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir).await?;

        let store = Self {
            data_dir,
            records: Arc::new(RwLock::new(HashMap::new())),
        };

        store.load_existing_records().await?;

        let count = store.records.read().await.len();
        info!("Video store initialized with {} records", count);

        Ok(store)
    }

    /// Load existing record sidecars from disk
    async fn load_existing_records(&self) -> Result<()> {
        let mut entries = fs::read_dir(&self.data_dir).await?;
        let mut loaded = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match self.load_record_file(&path).await {
                    Ok(record) => {
                        self.records.write().await.insert(record.id, record);
                        loaded += 1;
                    }
                    Err(e) => {
                        warn!("Failed to load record file {}: {}", path.display(), e);
                    }
                }
            }
        }

        debug!("Loaded {} record files from disk", loaded);
        Ok(())
    }

    async fn load_record_file(&self, path: &Path) -> Result<VideoRecord> {
        let content = fs::read_to_string(path).await?;
        let record: VideoRecord = serde_json::from_str(&content)
            .map_err(|e| VidscribeError::Storage(std::io::Error::other(e)))?;
        Ok(record)
    }

    fn sidecar_path(&self, id: Uuid) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }

    /// Persist a record sidecar to disk
    async fn persist_record(&self, record: &VideoRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| VidscribeError::Storage(std::io::Error::other(e)))?;
        fs::write(self.sidecar_path(record.id), content).await?;
        Ok(())
    }

    /// Accept an uploaded audio file: persist bytes plus metadata and assign
    /// a collision-free identifier. No partial record is visible to readers;
    /// the record enters the index only after both writes succeed.
    pub async fn accept(&self, file_bytes: &[u8], filename: &str) -> Result<VideoRecord> {
        if file_bytes.is_empty() {
            return Err(VidscribeError::Validation(
                "uploaded file is empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp3");
        let audio_path = self.data_dir.join(format!("{}.{}", id, extension));

        fs::write(&audio_path, file_bytes).await?;

        let record = VideoRecord {
            id,
            audio_path: audio_path.clone(),
            original_filename: filename.to_string(),
            transcription: None,
            created_at: Utc::now(),
        };

        if let Err(e) = self.persist_record(&record).await {
            // Roll back the audio write so no orphaned file remains
            let _ = fs::remove_file(&audio_path).await;
            return Err(e);
        }

        self.records.write().await.insert(id, record.clone());

        info!(
            "Stored upload {} ({} bytes) as {}",
            filename,
            file_bytes.len(),
            id
        );

        Ok(record)
    }

    /// Look up a record by id
    pub async fn get(&self, id: Uuid) -> Option<VideoRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Read the stored audio bytes for a record
    pub async fn read_audio(&self, record: &VideoRecord) -> Result<Vec<u8>> {
        Ok(fs::read(&record.audio_path).await?)
    }

    /// Attach a transcript to an existing record. The sidecar is written
    /// before the index is touched, so a failed persist leaves the in-memory
    /// record exactly as durable state has it. Concurrent calls for the same
    /// id race; the later write wins.
    pub async fn set_transcription(&self, id: Uuid, transcription: String) -> Result<VideoRecord> {
        let mut updated = self
            .get(id)
            .await
            .ok_or_else(|| VidscribeError::NotFound(format!("video {}", id)))?;
        updated.transcription = Some(transcription);

        self.persist_record(&updated).await?;
        self.records.write().await.insert(id, updated.clone());
        debug!("Attached transcription to video {}", id);

        Ok(updated)
    }

    /// Number of records currently indexed
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
