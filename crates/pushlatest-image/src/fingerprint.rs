//! Content fingerprints: extraction from an image and comparison of two images
//!
//! A fingerprint pairs two independent signals:
//! - the build recipe, i.e. the ordered commands that created each layer
//! - the installed-content listing captured from an isolated container
//!
//! Each signal is hashed on its own so a mismatch can be attributed.

use crate::gateway::RegistryGateway;
use pushlatest_core::{digest, ContentFingerprint, ImageReference, Result, Verbosity};
use tracing::{debug, info, trace};

/// Listing command run inside the image when none is configured
pub const DEFAULT_PACKAGE_LIST_COMMAND: &[&str] = &["dpkg", "-l"];

/// Serialize construction steps as `Layer {index}: {command}\n` lines, in the given order
pub fn recipe_blob(steps: &[String]) -> Vec<u8> {
    steps
        .iter()
        .enumerate()
        .map(|(index, command)| format!("Layer {}: {}\n", index, command))
        .collect::<String>()
        .into_bytes()
}

/// Derives [`ContentFingerprint`]s through a [`RegistryGateway`]
pub struct FingerprintExtractor<'a> {
    gateway: &'a dyn RegistryGateway,
    package_list_command: &'a [String],
    verbosity: Verbosity,
}

impl<'a> FingerprintExtractor<'a> {
    pub fn new(
        gateway: &'a dyn RegistryGateway,
        package_list_command: &'a [String],
        verbosity: Verbosity,
    ) -> Self {
        Self {
            gateway,
            package_list_command,
            verbosity,
        }
    }

    /// Compute both signals for `image`.
    ///
    /// # Errors
    /// Fails if the history cannot be read or the listing command cannot be
    /// started or exits non-zero; a failed listing is never treated as "no change".
    pub async fn extract(&self, image: &ImageReference) -> Result<ContentFingerprint> {
        let build_recipe_hash = self.build_recipe_hash(image).await?;
        let package_list_hash = self.package_list_hash(image).await?;

        Ok(ContentFingerprint {
            build_recipe_hash,
            package_list_hash,
        })
    }

    /// Hash of the image's construction steps, order preserved
    pub async fn build_recipe_hash(&self, image: &ImageReference) -> Result<String> {
        let steps = self.gateway.list_construction_steps(image).await?;
        let blob = recipe_blob(&steps);

        debug!("{} has {} construction steps", image, steps.len());
        if self.verbosity.dumps_blobs() {
            trace!(
                "Build recipe for {}:\n{}",
                image,
                String::from_utf8_lossy(&blob)
            );
        }

        Ok(digest(&blob))
    }

    /// Hash of the raw output of the listing command run inside `image`
    pub async fn package_list_hash(&self, image: &ImageReference) -> Result<String> {
        let listing = self
            .gateway
            .run_isolated(image, self.package_list_command)
            .await?;

        if self.verbosity.dumps_blobs() {
            trace!(
                "Package list for {}:\n{}",
                image,
                String::from_utf8_lossy(&listing)
            );
        }

        Ok(digest(&listing))
    }
}

/// True iff the fingerprints differ in any field
pub fn has_changed(a: &ContentFingerprint, b: &ContentFingerprint) -> bool {
    a != b
}

/// Log both fingerprints and which signals differ, then return [`has_changed`]
pub fn compare(
    source: &ImageReference,
    source_fingerprint: &ContentFingerprint,
    target: &ImageReference,
    target_fingerprint: &ContentFingerprint,
) -> bool {
    info!("Fingerprint of {}: {}", source, source_fingerprint);
    info!("Fingerprint of {}: {}", target, target_fingerprint);

    if source_fingerprint.build_recipe_hash != target_fingerprint.build_recipe_hash {
        info!("Build recipes of {} and {} differ", source, target);
    }
    if source_fingerprint.package_list_hash != target_fingerprint.package_list_hash {
        info!("Installed packages of {} and {} differ", source, target);
    }

    has_changed(source_fingerprint, target_fingerprint)
}
