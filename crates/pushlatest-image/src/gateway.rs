//! Container runtime / registry gateway trait definitions

use async_trait::async_trait;
use pushlatest_core::{ImageReference, Result};

/// Subset of `docker inspect` output used for source validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInspect {
    /// Local image ID (e.g., "sha256:abc123...")
    pub id: String,
    /// Every `repository:tag` name pointing at the image
    pub repo_tags: Vec<String>,
    /// Image configuration as reported by the runtime
    pub config: serde_json::Value,
}

/// Primitives the promotion engine needs from a container runtime and its registry.
///
/// Implementations must report a missing image as [`pushlatest_core::Error::NotFound`]
/// from `pull` and `inspect` so the engine can tell it apart from other failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryGateway: Send + Sync {
    /// Point `target` at the local image `source`
    async fn tag(&self, source: &ImageReference, target: &ImageReference) -> Result<()>;

    /// Upload `image` to its registry
    async fn push(&self, image: &ImageReference) -> Result<()>;

    /// Download `image` from its registry
    async fn pull(&self, image: &ImageReference) -> Result<()>;

    /// Describe the local image `image`
    async fn inspect(&self, image: &ImageReference) -> Result<ImageInspect>;

    /// Commands that created each layer, newest layer first
    async fn list_construction_steps(&self, image: &ImageReference) -> Result<Vec<String>>;

    /// Run `command` in a throwaway, network-less, unprivileged container and
    /// return its raw standard output
    async fn run_isolated(&self, image: &ImageReference, command: &[String]) -> Result<Vec<u8>>;
}
