//! Test utilities for pipeline tests.
//!
//! Mock generator and dispatcher plus a helper that wires an in-memory
//! repository and a temporary media root into an [`ImageStore`].

#![allow(dead_code)]

pub mod mock_generator;

use async_trait::async_trait;
use dripcam_database::InMemoryImageRepository;
use dripcam_pipeline::{Dispatcher, ImageEvents, ImageStore};
use dripcam_storage::FileMediaStore;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[allow(unused_imports)]
pub use mock_generator::{MockBehavior, MockGenerator};

/// Bytes of a tiny "PNG" returned by successful mock generations.
pub const GENERATED_BYTES: &[u8] = b"\x89PNG generated";

/// In-memory store and on-disk media rooted in a temporary directory.
pub struct Harness {
    pub repository: InMemoryImageRepository,
    pub store: ImageStore,
    pub media: Arc<FileMediaStore>,
    pub media_root: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let media_root = TempDir::new().expect("Failed to create media root");
        let repository = InMemoryImageRepository::new();
        let store = ImageStore::new(Arc::new(repository.clone()), ImageEvents::default());
        let media = Arc::new(FileMediaStore::new(media_root.path()));
        Self {
            repository,
            store,
            media,
            media_root,
        }
    }
}

/// Dispatcher that only records which ids it was asked to schedule.
#[derive(Debug, Default, Clone)]
pub struct RecordingDispatcher {
    dispatched: Arc<Mutex<Vec<i64>>>,
}

impl RecordingDispatcher {
    pub fn dispatched(&self) -> Vec<i64> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, id: i64) {
        self.dispatched.lock().unwrap().push(id);
    }
}
