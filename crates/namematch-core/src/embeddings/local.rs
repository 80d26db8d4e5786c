//! Local Semantic Embeddings
//!
//! Uses fastembed for local ONNX inference. The default model is
//! all-MiniLM-L6-v2 (384 dimensions), small enough to load in well under a
//! second and strong on short name / role descriptors.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{Embedder, Embedding, EmbeddingError};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Identifier reported by the default model
pub const DEFAULT_MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimensions of the default model
const DEFAULT_DIMENSIONS: usize = 384;

/// Maximum text length in bytes handed to the model
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Batch size for embedding generation
pub const BATCH_SIZE: usize = 32;

/// Get the cache directory for fastembed models
///
/// Uses FASTEMBED_CACHE_PATH, or falls back to the platform cache directory.
pub(crate) fn get_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FASTEMBED_CACHE_PATH") {
        return PathBuf::from(path);
    }

    // Linux: ~/.cache/namematch/fastembed
    // macOS: ~/Library/Caches/org.namematch.core/fastembed
    if let Some(proj_dirs) = directories::ProjectDirs::from("org", "namematch", "core") {
        return proj_dirs.cache_dir().join("fastembed");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/namematch/fastembed");
    }

    PathBuf::from(".fastembed_cache")
}

/// Truncate on a char boundary at or below `MAX_TEXT_LENGTH` bytes
fn clip(text: &str) -> &str {
    if text.len() <= MAX_TEXT_LENGTH {
        return text;
    }
    let mut end = MAX_TEXT_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ============================================================================
// FASTEMBED EMBEDDER
// ============================================================================

/// Embedder backed by a lazily loaded fastembed model
///
/// The model loads on first use (downloading it if necessary). Load failures
/// are remembered and reported on every subsequent call.
pub struct FastEmbedder {
    model: OnceLock<Result<Mutex<TextEmbedding>, String>>,
    model_kind: EmbeddingModel,
    model_name: String,
    dimensions: usize,
}

impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FastEmbedder {
    /// Embedder for the default model (all-MiniLM-L6-v2)
    pub fn new() -> Self {
        Self::with_model(
            EmbeddingModel::AllMiniLML6V2,
            DEFAULT_MODEL_NAME,
            DEFAULT_DIMENSIONS,
        )
    }

    /// Embedder for any fastembed model; `dimensions` must match its output
    pub fn with_model(model: EmbeddingModel, name: &str, dimensions: usize) -> Self {
        Self {
            model: OnceLock::new(),
            model_kind: model,
            model_name: name.to_string(),
            dimensions,
        }
    }

    /// Load the model now instead of on first use
    pub fn init(&self) -> Result<(), EmbeddingError> {
        self.get_model().map(|_| ())
    }

    fn get_model(&self) -> Result<MutexGuard<'_, TextEmbedding>, EmbeddingError> {
        let result = self.model.get_or_init(|| {
            let cache_dir = get_cache_dir();

            if let Err(e) = std::fs::create_dir_all(&cache_dir) {
                tracing::warn!("Failed to create cache directory {:?}: {}", cache_dir, e);
            }

            let options = InitOptions::new(self.model_kind.clone())
                .with_show_download_progress(true)
                .with_cache_dir(cache_dir);

            TextEmbedding::try_new(options)
                .map(|model| {
                    tracing::info!(model = %self.model_name, "Embedding model loaded");
                    Mutex::new(model)
                })
                .map_err(|e| {
                    format!(
                        "Failed to initialize {}: {}. \
                        Ensure ONNX runtime is available and model files can be downloaded.",
                        self.model_name, e
                    )
                })
        });

        match result {
            Ok(model) => model
                .lock()
                .map_err(|e| EmbeddingError::ModelInit(format!("Lock poisoned: {}", e))),
            Err(err) => Err(EmbeddingError::ModelInit(err.clone())),
        }
    }
}

impl Embedder for FastEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self.get_model()?;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let clipped: Vec<&str> = chunk.iter().map(|t| clip(t)).collect();

            let embeddings = model
                .embed(clipped, None)
                .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

            all_embeddings.extend(embeddings.into_iter().map(Embedding::new));
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

// ============================================================================
// TESTS
// ============================================================================
