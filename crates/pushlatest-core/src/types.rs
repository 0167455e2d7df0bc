use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag a target falls back to when none is given
pub const DEFAULT_TARGET_TAG: &str = "latest";

/// Container image reference: a repository plus an optional tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Repository path, including any registry host (e.g., "localhost:5000/team/app")
    pub repository: String,
    /// Tag (e.g., "2017.01.05"), absent when the reference was given untagged
    pub tag: Option<String>,
}

impl ImageReference {
    /// Parse an image reference string like "docker.example.com/img-name:2017.01.05"
    ///
    /// The tag separator is the last `:` after the last `/`, so a registry
    /// port (`localhost:5000/img`) is never mistaken for a tag.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_reference(s, "reference is empty"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(Error::invalid_reference(s, "reference contains whitespace"));
        }
        if s.contains('@') {
            return Err(Error::invalid_reference(
                s,
                "digest references cannot be tagged or promoted",
            ));
        }

        let name_start = s.rfind('/').map(|idx| idx + 1).unwrap_or(0);
        let (repository, tag) = match s[name_start..].rfind(':') {
            Some(idx) => {
                let split = name_start + idx;
                (&s[..split], Some(&s[split + 1..]))
            }
            None => (s, None),
        };

        if repository.is_empty() || repository.ends_with('/') {
            return Err(Error::invalid_reference(s, "repository is empty"));
        }
        if tag.is_some_and(str::is_empty) {
            return Err(Error::invalid_reference(s, "tag is empty"));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
        })
    }

    /// Fully-qualified name: `repository` or `repository:tag`
    pub fn qualified_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{}", self.repository, tag),
            None => self.repository.clone(),
        }
    }

    /// Tag of a reference used as a promotion source.
    ///
    /// # Errors
    /// Returns [`Error::MissingTag`] when the reference is untagged.
    pub fn require_tag(&self) -> Result<&str> {
        self.tag
            .as_deref()
            .ok_or_else(|| Error::missing_tag(self.qualified_name()))
    }

    /// Same repository, tag filled in with `latest` when absent
    pub fn or_default_tag(self) -> Self {
        Self {
            tag: Some(self.tag.unwrap_or_else(|| DEFAULT_TARGET_TAG.to_string())),
            repository: self.repository,
        }
    }

    /// Leading registry host, if the repository names one.
    ///
    /// Follows the runtime's convention: the first path component is a host
    /// when it contains a `.` or `:` or is exactly `localhost`.
    pub fn registry_host(&self) -> Option<&str> {
        let (first, _) = self.repository.split_once('/')?;
        if first.contains('.') || first.contains(':') || first == "localhost" {
            Some(first)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{}", self.repository, tag),
            None => write!(f, "{}", self.repository),
        }
    }
}

/// Comparable summary of an image's construction recipe and installed content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFingerprint {
    /// SHA-256 hex digest of the serialized construction steps
    pub build_recipe_hash: String,
    /// SHA-256 hex digest of the installed-content listing
    pub package_list_hash: String,
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "build recipe {}, packages {}",
            self.build_recipe_hash, self.package_list_hash
        )
    }
}

/// Action selected for the target once the source has been pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionDecision {
    /// Target did not exist; tagged and pushed without comparing
    TagAndPushTargetNew,
    /// Fingerprints differed; target re-tagged and pushed
    TagAndPushTarget,
    /// Fingerprints matched; target left untouched
    Skip,
}

impl PromotionDecision {
    /// Whether the target gets tagged and pushed
    pub fn promotes_target(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

impl fmt::Display for PromotionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TagAndPushTargetNew => "TAG_AND_PUSH_TARGET_NEW",
            Self::TagAndPushTarget => "TAG_AND_PUSH_TARGET",
            Self::Skip => "SKIP",
        };
        f.write_str(s)
    }
}
