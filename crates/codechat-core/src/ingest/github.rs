//! GitHub repository URL validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?github\.com/([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9._-]+)(/.*)?$",
    )
    .expect("GitHub URL pattern is valid")
});

/// Why a repository URL was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum UrlRejection {
    #[strum(serialize = "URL is empty")]
    Empty,
    #[strum(serialize = "only https://github.com/<owner>/<repo> URLs are supported")]
    NotGithub,
    #[strum(serialize = "URL points to a specific file; use the repository URL instead")]
    SpecificFile,
    #[strum(serialize = "URL does not point to a repository root or branch")]
    UnsupportedPath,
}

/// A validated GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryUrl {
    pub owner: String,
    pub repo: String,
    /// Branch named by a `/tree/<branch>` suffix, if any.
    pub branch: Option<String>,
}

impl RepositoryUrl {
    /// URL handed to the backend's clone step.
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// `owner/repo` label for display.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Validates a user-entered GitHub URL.
///
/// Accepts the repository root (optionally with `.git` or a trailing slash)
/// and `/tree/<branch>` URLs. `/blob/...` URLs name a single file and are
/// refused with [`UrlRejection::SpecificFile`].
pub fn validate_github_url(input: &str) -> Result<RepositoryUrl, UrlRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlRejection::Empty);
    }

    let captures = GITHUB_URL.captures(trimmed).ok_or(UrlRejection::NotGithub)?;
    let owner = captures[1].to_string();
    let repo = captures[2].trim_end_matches(".git").to_string();
    if repo.is_empty() || repo == "." || repo == ".." {
        return Err(UrlRejection::NotGithub);
    }

    let rest = captures
        .get(3)
        .map(|m| m.as_str().trim_matches('/'))
        .unwrap_or_default();

    let branch = if rest.is_empty() {
        None
    } else {
        let mut segments = rest.splitn(2, '/');
        match (segments.next(), segments.next()) {
            (Some("blob"), _) => return Err(UrlRejection::SpecificFile),
            (Some("tree"), Some(branch)) if !branch.is_empty() => Some(branch.to_string()),
            (Some("tree"), _) => None,
            _ => return Err(UrlRejection::UnsupportedPath),
        }
    };

    Ok(RepositoryUrl {
        owner,
        repo,
        branch,
    })
}
