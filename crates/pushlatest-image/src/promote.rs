//! Promotion decision engine
//!
//! One run handles exactly one (source, target) pair:
//!
//! 1. validate the source carries a tag, resolve the target (`repo:latest`
//!    by default) and check the options; all of this happens before any
//!    runtime call
//! 2. confirm the source exists locally, then push it
//! 3. probe the target by pulling it
//!    - absent: tag and push it unconditionally
//!    - present: fingerprint both images, tag and push only when they differ

use crate::fingerprint::{self, FingerprintExtractor, DEFAULT_PACKAGE_LIST_COMMAND};
use crate::gateway::RegistryGateway;
use pushlatest_core::{Error, ImageReference, PromotionDecision, Result, Verbosity};
use tracing::{debug, info, warn};

/// Per-run settings for [`Promoter`]
#[derive(Debug, Clone)]
pub struct PromoteOptions {
    /// Skip every tag and push, still running all read-only steps
    pub dry_run: bool,
    /// Detail level for fingerprint diagnostics
    pub verbosity: Verbosity,
    /// Command whose output represents the installed content of an image
    pub package_list_command: Vec<String>,
}

impl Default for PromoteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbosity: Verbosity::Default,
            package_list_command: DEFAULT_PACKAGE_LIST_COMMAND
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PromoteOptions {
    /// Reject settings that would only fail once the runtime is already in use.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when the listing command is empty.
    pub fn validate(&self) -> Result<()> {
        match self.package_list_command.first() {
            Some(program) if !program.is_empty() => Ok(()),
            _ => Err(Error::invalid_config(
                "package list command",
                "command is empty",
            )),
        }
    }
}

/// Source must name an explicit tag
pub fn validate_source(source: &ImageReference) -> Result<()> {
    source.require_tag().map(|_| ())
}

/// Fill in the default target and reject a target identical to the source
pub fn resolve_target(
    source: &ImageReference,
    target: Option<&ImageReference>,
) -> Result<ImageReference> {
    let target = match target {
        Some(target) => target.clone().or_default_tag(),
        None => ImageReference {
            repository: source.repository.clone(),
            tag: None,
        }
        .or_default_tag(),
    };

    if target.qualified_name() == source.qualified_name() {
        return Err(Error::same_reference(source.qualified_name()));
    }

    Ok(target)
}

/// Conditionally promotes a source image to a target tag
pub struct Promoter<G> {
    gateway: G,
    options: PromoteOptions,
}

impl<G: RegistryGateway> Promoter<G> {
    pub fn new(gateway: G, options: PromoteOptions) -> Self {
        Self { gateway, options }
    }

    /// Push `source`, then tag and push the target if it is new or its content differs.
    ///
    /// # Errors
    /// Validation and configuration errors are returned before any gateway call. A missing
    /// source, a failed listing command, or any other gateway failure aborts
    /// the run; only a missing target is recovered from.
    pub async fn promote(
        &self,
        source: &ImageReference,
        target: Option<&ImageReference>,
    ) -> Result<PromotionDecision> {
        validate_source(source)?;
        let target = resolve_target(source, target)?;
        self.options.validate()?;

        info!("Promoting {} to {}", source, target);
        debug!(
            "Target registry: {}",
            target.registry_host().unwrap_or("runtime default")
        );
        if self.options.dry_run {
            info!("Dry run: no image will be tagged or pushed");
        }

        self.check_source_exists(source).await?;
        self.push(source).await?;

        let decision = match self.gateway.pull(&target).await {
            Ok(()) => self.compare_with_existing(source, &target).await?,
            Err(e) if e.is_not_found() => {
                info!(
                    "Target image {} was not found in the registry, so it will be created",
                    target
                );
                PromotionDecision::TagAndPushTargetNew
            }
            Err(e) => return Err(e),
        };

        if decision.promotes_target() {
            self.tag(source, &target).await?;
            self.push(&target).await?;
        }

        Ok(decision)
    }

    async fn check_source_exists(&self, source: &ImageReference) -> Result<()> {
        let inspect = self.gateway.inspect(source).await?;
        let name = source.qualified_name();
        if !inspect.repo_tags.iter().any(|tag| *tag == name) {
            warn!(
                "Local image {} does not list {} among its tags: {:?}",
                inspect.id, name, inspect.repo_tags
            );
        }
        Ok(())
    }

    async fn compare_with_existing(
        &self,
        source: &ImageReference,
        target: &ImageReference,
    ) -> Result<PromotionDecision> {
        let extractor = FingerprintExtractor::new(
            &self.gateway,
            &self.options.package_list_command,
            self.options.verbosity,
        );
        let source_fingerprint = extractor.extract(source).await?;
        let target_fingerprint = extractor.extract(target).await?;

        if fingerprint::compare(source, &source_fingerprint, target, &target_fingerprint) {
            info!("Image {} has changed compared to {}", source, target);
            Ok(PromotionDecision::TagAndPushTarget)
        } else {
            info!(
                "Image {} is unchanged compared to {}, so {} will not be pushed",
                source, target, target
            );
            Ok(PromotionDecision::Skip)
        }
    }

    async fn tag(&self, source: &ImageReference, target: &ImageReference) -> Result<()> {
        info!("Tagging image {} as {}", source, target);
        if self.options.dry_run {
            debug!("Would run: docker tag {} {}", source, target);
            info!("Image was not actually tagged since this is a dry run");
            return Ok(());
        }
        self.gateway.tag(source, target).await
    }

    async fn push(&self, image: &ImageReference) -> Result<()> {
        info!("Pushing image {} ...", image);
        if self.options.dry_run {
            debug!("Would run: docker push {}", image);
            info!("Image was not actually pushed since this is a dry run");
            return Ok(());
        }
        self.gateway.push(image).await
    }
}
