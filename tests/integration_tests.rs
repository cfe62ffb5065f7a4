use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

use vidscribe::llm::{ChatMessage, CompletionService, TextGenerator, TextStream};
use vidscribe::store::VideoStore;
use vidscribe::transcription::{SpeechToText, TranscriptionService};
use vidscribe::{Result, VidscribeError};

/// Speech-to-text collaborator that counts how often it is contacted
struct MockSpeechToText {
    transcript: String,
    calls: AtomicUsize,
}

impl MockSpeechToText {
    fn new(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(
        &self,
        _audio: Vec<u8>,
        _filename: &str,
        _prompt_hint: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// Text-generation collaborator that replays fixed chunks and records the
/// prompt it was given
struct MockGenerator {
    chunks: Vec<String>,
    fail_after: Option<usize>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockGenerator {
    fn new(chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            fail_after: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    fn failing_after(chunks: &[&str], fail_after: usize) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            fail_after: Some(fail_after),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn complete_stream(
        &self,
        messages: Vec<ChatMessage>,
        _temperature: f32,
    ) -> Result<TextStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = messages.first().map(|m| m.content.clone());

        let mut items: Vec<Result<String>> = Vec::new();
        for (i, chunk) in self.chunks.iter().enumerate() {
            if self.fail_after == Some(i) {
                items.push(Err(VidscribeError::Upstream(
                    "connection reset mid-stream".to_string(),
                )));
                break;
            }
            items.push(Ok(chunk.clone()));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

async fn store_in(dir: &TempDir) -> VideoStore {
    VideoStore::new(dir.path().to_path_buf()).await.unwrap()
}

#[tokio::test]
async fn test_accept_ids_are_unique_across_store_lifetime() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;

    let mut ids = std::collections::HashSet::new();
    for i in 0..50 {
        let record = store
            .accept(b"bytes", &format!("video_{}.mp3", i))
            .await
            .unwrap();
        assert!(ids.insert(record.id), "duplicate id returned by accept()");
    }
}

#[tokio::test]
async fn test_transcribe_unknown_id_never_contacts_upstream() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let engine = MockSpeechToText::new("unused");
    let service = TranscriptionService::new(store, engine.clone());

    let err = service.transcribe(Uuid::new_v4(), "").await.unwrap_err();

    assert_eq!(err.kind(), "not_found");
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn test_transcribe_returns_cached_without_second_billed_call() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let engine = MockSpeechToText::new("hello world");
    let service = TranscriptionService::new(store.clone(), engine.clone());

    let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();
    let first = service.transcribe(record.id, "").await.unwrap();
    let second = service.transcribe(record.id, "").await.unwrap();

    assert_eq!(first, "hello world");
    assert_eq!(second, "hello world");
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn test_complete_without_transcription_fails_before_upstream() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let generator = MockGenerator::new(&["never"]);
    let service = CompletionService::new(store.clone(), generator.clone());

    let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();
    let err = match service
        .complete(record.id, "Title: {transcription}", 0.5)
        .await
    {
        Ok(_) => panic!("completion without a transcription must fail"),
        Err(e) => e,
    };

    assert_eq!(err.kind(), "validation");
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_complete_rejects_out_of_range_temperature() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let generator = MockGenerator::new(&["never"]);
    let service = CompletionService::new(store.clone(), generator.clone());

    let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();
    store
        .set_transcription(record.id, "hello world".to_string())
        .await
        .unwrap();

    for temperature in [1.5_f32, -0.1, 2.0] {
        let err = match service
            .complete(record.id, "Title: {transcription}", temperature)
            .await
        {
            Ok(_) => panic!("temperature {} must be rejected", temperature),
            Err(e) => e,
        };
        assert_eq!(err.kind(), "validation");
    }

    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_complete_unknown_id_never_contacts_upstream() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let generator = MockGenerator::new(&["never"]);
    let service = CompletionService::new(store, generator.clone());

    let err = match service
        .complete(Uuid::new_v4(), "Title: {transcription}", 0.5)
        .await
    {
        Ok(_) => panic!("completion for an unknown id must fail"),
        Err(e) => e,
    };

    assert_eq!(err.kind(), "not_found");
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_upload_transcribe_complete_scenario() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let engine = MockSpeechToText::new("hello world");
    let generator = MockGenerator::new(&["A ", "great ", "title"]);

    let transcription = TranscriptionService::new(store.clone(), engine.clone());
    let completion = CompletionService::new(store.clone(), generator.clone());

    // accept
    let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();

    // transcribe
    let text = transcription.transcribe(record.id, "").await.unwrap();
    assert_eq!(text, "hello world");
    let stored = store.get(record.id).await.unwrap();
    assert_eq!(stored.transcription.as_deref(), Some("hello world"));

    // complete: placeholder substituted before forwarding
    let stream = completion
        .complete(record.id, "Title: {transcription}", 0.5)
        .await
        .unwrap();
    let chunks: Vec<String> = stream.map(|item| item.unwrap()).collect().await;

    assert_eq!(generator.last_prompt().as_deref(), Some("Title: hello world"));
    assert_eq!(chunks.concat(), "A great title");
}

#[tokio::test]
async fn test_relay_preserves_chunk_order_for_any_partition() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;

    let partitions: Vec<Vec<&str>> = vec![
        vec!["hello world, this is generated text"],
        vec!["hello ", "world, ", "this is ", "generated text"],
        vec!["h", "e", "l", "l", "o", " world, this is generated text"],
    ];

    for partition in partitions {
        let generator = MockGenerator::new(&partition);
        let service = CompletionService::new(store.clone(), generator);

        let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();
        store
            .set_transcription(record.id, "hello world".to_string())
            .await
            .unwrap();

        let stream = service
            .complete(record.id, "{transcription}", 0.0)
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|item| item.unwrap()).collect().await;

        assert_eq!(chunks.concat(), "hello world, this is generated text");
    }
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_delivered_bytes() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let generator = MockGenerator::failing_after(&["one ", "two ", "three"], 2);
    let service = CompletionService::new(store.clone(), generator);

    let record = store.accept(b"RIFF....", "a.mp3").await.unwrap();
    store
        .set_transcription(record.id, "hello".to_string())
        .await
        .unwrap();

    let stream = service
        .complete(record.id, "{transcription}", 0.5)
        .await
        .unwrap();
    let items: Vec<Result<String>> = stream.collect().await;

    let delivered: String = items
        .iter()
        .filter_map(|item| item.as_ref().ok().cloned())
        .collect();
    assert_eq!(delivered, "one two ");
    assert!(matches!(
        items.last(),
        Some(Err(VidscribeError::Upstream(_)))
    ));

    // the record is untouched by the failed relay
    let stored = store.get(record.id).await.unwrap();
    assert_eq!(stored.transcription.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_workflow_error_resets_to_waiting() {
    use vidscribe::audio::AudioExtractor;
    use vidscribe::workflow::{UploadState, UploadWorkflow};

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;
    let engine = MockSpeechToText::new("unused");
    let transcription = TranscriptionService::new(store.clone(), engine);

    let mut workflow = UploadWorkflow::new(AudioExtractor::new(), store, transcription);
    assert_eq!(workflow.state(), UploadState::Waiting);

    // extraction fails (missing input file), machine resets for a retry
    let missing = dir.path().join("does_not_exist.mp4");
    let err = workflow.run(&missing, "").await.unwrap_err();

    assert_eq!(err.kind(), "extraction");
    assert_eq!(workflow.state(), UploadState::Waiting);
}
