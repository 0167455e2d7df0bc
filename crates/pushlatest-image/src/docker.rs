//! Docker CLI implementation of [`RegistryGateway`]

use crate::gateway::{ImageInspect, RegistryGateway};
use async_trait::async_trait;
use pushlatest_core::{Error, ImageReference, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

/// Numeric uid/gid of `nobody`; resolvable even in images without a passwd entry
const UNPRIVILEGED_USER: &str = "65534:65534";

/// Gateway that shells out to the `docker` binary, one blocking call at a time
#[derive(Debug, Clone)]
pub struct DockerCli {
    docker_path: PathBuf,
}

impl DockerCli {
    /// Locate `docker` on PATH
    ///
    /// # Errors
    /// Returns an error if docker is not found in PATH
    pub fn new() -> Result<Self> {
        Self::locate("docker")
    }

    /// Locate a docker-compatible binary by name or path
    pub fn locate(binary: &str) -> Result<Self> {
        let docker_path = which::which(binary).map_err(|_| Error::tool_not_found(binary))?;

        debug!("Found docker at: {:?}", docker_path);

        Ok(Self { docker_path })
    }

    /// Use `docker_path` as-is, without a PATH lookup
    pub fn with_binary(docker_path: impl Into<PathBuf>) -> Self {
        Self {
            docker_path: docker_path.into(),
        }
    }

    /// Binary this gateway invokes
    pub fn docker_path(&self) -> &Path {
        &self.docker_path
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.docker_path.display(), args.join(" "))
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        let command = self.command_line(args);
        debug!("Running: {}", command);

        Command::new(&self.docker_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::Transport { command, source })
    }

    async fn check_output(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args).await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(self.failure(args, &output))
        }
    }

    fn failure(&self, args: &[&str], output: &Output) -> Error {
        let command = self.command_line(args);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("Command failed: {}\nStderr: {}", command, stderr);
        Error::execution(command, output.status.to_string(), stderr)
    }
}

#[async_trait]
impl RegistryGateway for DockerCli {
    async fn tag(&self, source: &ImageReference, target: &ImageReference) -> Result<()> {
        let source = source.qualified_name();
        let target = target.qualified_name();
        self.check_output(&["tag", source.as_str(), target.as_str()]).await?;
        Ok(())
    }

    async fn push(&self, image: &ImageReference) -> Result<()> {
        let name = image.qualified_name();
        self.check_output(&["push", name.as_str()]).await?;
        Ok(())
    }

    async fn pull(&self, image: &ImageReference) -> Result<()> {
        let name = image.qualified_name();
        let args = ["pull", name.as_str()];
        let output = self.output(&args).await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_from_registry(image, &stderr) {
            debug!("{} is not in the registry: {}", name, stderr.trim());
            return Err(Error::not_found(name));
        }
        Err(self.failure(&args, &output))
    }

    async fn inspect(&self, image: &ImageReference) -> Result<ImageInspect> {
        let name = image.qualified_name();
        let args = ["inspect", "--type", "image", name.as_str()];
        let output = self.output(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_missing_locally(&stderr) {
                return Err(Error::not_found(name));
            }
            return Err(self.failure(&args, &output));
        }

        parse_inspect(&output.stdout)
    }

    async fn list_construction_steps(&self, image: &ImageReference) -> Result<Vec<String>> {
        let name = image.qualified_name();
        let stdout = self
            .check_output(&[
                "history",
                "--no-trunc",
                "--format",
                "{{json .CreatedBy}}",
                name.as_str(),
            ])
            .await?;

        parse_history(&stdout)
    }

    async fn run_isolated(&self, image: &ImageReference, command: &[String]) -> Result<Vec<u8>> {
        let (entrypoint, command_args) = command
            .split_first()
            .ok_or_else(|| Error::parse("package list command", "command is empty"))?;

        let name = image.qualified_name();
        let mut args = vec![
            "run",
            "--rm",
            "--network",
            "none",
            "--user",
            UNPRIVILEGED_USER,
            "--cap-drop",
            "ALL",
            "--security-opt",
            "no-new-privileges",
            "--entrypoint",
            entrypoint.as_str(),
            name.as_str(),
        ];
        args.extend(command_args.iter().map(String::as_str));

        self.check_output(&args).await
    }
}

/// `docker pull` names the image and says "not found" when a tag or repository is absent.
/// Docker Hub-style registries answer an unknown repository with "repository does not exist".
fn is_missing_from_registry(image: &ImageReference, stderr: &str) -> bool {
    stderr.contains(&image.repository)
        && (stderr.contains("not found")
            || stderr.contains("manifest unknown")
            || stderr.contains("repository does not exist"))
}

fn is_missing_locally(stderr: &str) -> bool {
    stderr.contains("No such image") || stderr.contains("No such object")
}

#[derive(Debug, Deserialize)]
struct RawInspect {
    #[serde(rename = "Id", default)]
    id: String,
    #[serde(rename = "RepoTags", default)]
    repo_tags: Option<Vec<String>>,
    #[serde(rename = "Config", default)]
    config: serde_json::Value,
}

fn parse_inspect(stdout: &[u8]) -> Result<ImageInspect> {
    let described: Vec<RawInspect> = serde_json::from_slice(stdout)?;
    let raw = described
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse("docker inspect", "no image description returned"))?;

    Ok(ImageInspect {
        id: raw.id,
        repo_tags: raw.repo_tags.unwrap_or_default(),
        config: raw.config,
    })
}

/// One JSON string per line keeps multi-line `RUN` heredocs as a single step
fn parse_history(stdout: &[u8]) -> Result<Vec<String>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str::<String>(line)
                .map_err(|e| Error::parse("docker history", format!("{} in line {:?}", e, line)))
        })
        .collect()
}
