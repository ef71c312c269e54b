use axum::extract::FromRef;

use crate::book_store::BookStore;
use crate::metadata::MetadataProvider;
use crate::object_store::ObjectStore;
use crate::upload::UploadOrchestrator;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedBookStore = Arc<dyn BookStore>;
pub type GuardedObjectStore = Arc<dyn ObjectStore>;
pub type GuardedMetadataProvider = Arc<dyn MetadataProvider>;
pub type GuardedUploadOrchestrator = Arc<UploadOrchestrator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub book_store: GuardedBookStore,
    pub object_store: GuardedObjectStore,
    pub metadata_provider: GuardedMetadataProvider,
    pub upload_orchestrator: GuardedUploadOrchestrator,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        book_store: GuardedBookStore,
        object_store: GuardedObjectStore,
        metadata_provider: GuardedMetadataProvider,
    ) -> ServerState {
        let upload_orchestrator = Arc::new(UploadOrchestrator::new(
            object_store.clone(),
            book_store.clone(),
            metadata_provider.clone(),
        ));
        ServerState {
            config,
            start_time: Instant::now(),
            book_store,
            object_store,
            metadata_provider,
            upload_orchestrator,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedBookStore {
    fn from_ref(input: &ServerState) -> Self {
        input.book_store.clone()
    }
}

impl FromRef<ServerState> for GuardedObjectStore {
    fn from_ref(input: &ServerState) -> Self {
        input.object_store.clone()
    }
}

impl FromRef<ServerState> for GuardedMetadataProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.metadata_provider.clone()
    }
}

impl FromRef<ServerState> for GuardedUploadOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.upload_orchestrator.clone()
    }
}
