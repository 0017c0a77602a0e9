use std::sync::Arc;

use ecourban_core::{ArtifactPaths, ModelStore, ServerConfig};

/// State shared by every connection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(paths: ArtifactPaths, allowed_origins: Vec<String>) -> Self {
        Self {
            store: Arc::new(ModelStore::new(paths)),
            allowed_origins: Arc::new(allowed_origins),
        }
    }

    pub fn from_config(paths: ArtifactPaths, server: &ServerConfig) -> Self {
        Self::new(paths, server.allowed_origins.clone())
    }

    /// `"*"` allows any origin.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}
