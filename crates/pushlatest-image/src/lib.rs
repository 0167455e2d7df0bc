//! Conditional image promotion for pushlatest
//!
//! This crate provides functionality for:
//! - Talking to a container runtime and its registry through [`RegistryGateway`]
//! - Fingerprinting images by build recipe and installed content
//! - Deciding whether a source image should be promoted to a target tag
//!
//! # Example
//!
//! ```no_run
//! use pushlatest_core::ImageReference;
//! use pushlatest_image::{DockerCli, PromoteOptions, Promoter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let promoter = Promoter::new(DockerCli::new()?, PromoteOptions::default());
//!
//!     let source = ImageReference::parse("docker.example.com/img-name:2017.01.05")?;
//!     let decision = promoter.promote(&source, None).await?;
//!
//!     println!("Decision: {}", decision);
//!
//!     Ok(())
//! }
//! ```

pub mod docker;
pub mod fingerprint;
pub mod gateway;
pub mod promote;

pub use docker::DockerCli;
pub use fingerprint::{
    compare, has_changed, recipe_blob, FingerprintExtractor, DEFAULT_PACKAGE_LIST_COMMAND,
};
pub use gateway::{ImageInspect, RegistryGateway};
pub use promote::{resolve_target, validate_source, PromoteOptions, Promoter};
