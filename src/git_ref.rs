use bon::Builder;

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";
const PULL_PREFIX: &str = "refs/pull/";
const DEFAULT_BRANCH: &str = "master";

/// The version-control context of a build event, as extracted
/// from the CI environment by the caller.
#[derive(Debug, Clone, Builder)]
pub struct RefInfo {
    /// The raw ref, e.g. `refs/heads/main` or `refs/tags/v1.2.3`.
    #[builder(into)]
    pub ref_name: String,

    /// The commit sha, at least 6 hex characters.
    #[builder(into)]
    pub sha: String,
}

/// What kind of ref triggered the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// The default branch, tagged `latest`.
    DefaultBranch,
    /// A git tag carrying its tag value.
    GitTag(String),
    /// A pull request ref, tagged with the commit sha.
    PullRequest,
    /// Any other branch, carrying its normalized name.
    Branch(String),
}

impl RefKind {
    /// Classifies a raw ref.
    ///
    /// The default-branch check runs on the normalized branch form of
    /// the ref before the tag and pull-request checks, so only a ref
    /// literally equal to `refs/heads/master` is treated as the
    /// default branch.
    #[must_use]
    pub fn classify(ref_name: &str) -> Self {
        let branch = normalize_branch(ref_name);

        if branch == DEFAULT_BRANCH {
            Self::DefaultBranch
        } else if let Some(tag) = ref_name.strip_prefix(TAGS_PREFIX) {
            Self::GitTag(tag.to_string())
        } else if ref_name.starts_with(PULL_PREFIX) {
            Self::PullRequest
        } else {
            Self::Branch(branch)
        }
    }
}

/// Strips the branch prefix and replaces every `/` with `-` so the
/// result is usable as an image tag.
fn normalize_branch(ref_name: &str) -> String {
    ref_name
        .strip_prefix(HEADS_PREFIX)
        .unwrap_or(ref_name)
        .replace('/', "-")
}

/// Splits a git tag into a project name and a version at the first
/// occurrence of the configured separator.
///
/// Without a separator, or when it isn't found, the whole tag is the
/// version and the name is empty. The name half is not consumed by
/// tag derivation itself; it is kept for callers that encode a
/// project name into their release tags.
#[must_use]
pub fn split_separated_tag<'a>(tag: &'a str, separator: Option<&str>) -> (&'a str, &'a str) {
    separator
        .filter(|sep| !sep.is_empty())
        .and_then(|sep| tag.split_once(sep))
        .unwrap_or(("", tag))
}
