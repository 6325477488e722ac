//! Derives the set of container-image tags (and an optional semantic
//! version) for a single CI build event.
//!
//! The caller extracts the raw git ref and commit sha from its CI
//! environment, resolves a [`TagConfig`] describing its tagging
//! policy, and gets back fully qualified `<image>:<tag>` references
//! ready to be handed to the build tooling:
//!
//! ```
//! use image_tagger::{derive_tags, RefInfo, SemverMode, TagConfig};
//!
//! let config = TagConfig::builder()
//!     .image("app")
//!     .registry("registry.example.com")
//!     .tag_semver(SemverMode::On)
//!     .semver_higher(true)
//!     .build();
//! let ref_info = RefInfo::builder()
//!     .ref_name("refs/tags/v1.2.3")
//!     .sha("1234567890abcdef")
//!     .build();
//!
//! let derived = derive_tags(&config, &ref_info).unwrap();
//!
//! assert_eq!(derived.version.as_deref(), Some("1.2.3"));
//! assert_eq!(
//!     derived.tags,
//!     vec![
//!         "registry.example.com/app:1.2.3".to_string(),
//!         "registry.example.com/app:1.2".to_string(),
//!         "registry.example.com/app:1".to_string(),
//!     ],
//! );
//! ```

pub mod config;
pub mod error;
pub mod expand;
pub mod git_ref;
pub mod snapshot;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use log::trace;
use serde::Serialize;

pub use config::{PrereleaseMode, SemverMode, TagConfig};
pub use error::TagError;
pub use git_ref::{RefInfo, RefKind};

const LATEST_TAG: &str = "latest";

/// The tags and optional semantic version derived for one build event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedTags {
    /// Unique, fully qualified `<image>:<tag>` references.
    pub tags: Vec<String>,
    /// The canonical version when a semver git tag drove the build.
    pub version: Option<String>,
}

/// Derives the image tags for a build event, stamping snapshot tags
/// with the current time.
///
/// # Errors
/// Errors when `tag_semver` is [`SemverMode::Fail`] and the git tag
/// is not a valid semver.
pub fn derive_tags(config: &TagConfig, ref_info: &RefInfo) -> Result<DerivedTags, TagError> {
    derive_tags_at(config, ref_info, Utc::now())
}

/// Same as [`derive_tags`] with an explicit snapshot timestamp.
///
/// # Errors
/// Errors when `tag_semver` is [`SemverMode::Fail`] and the git tag
/// is not a valid semver.
pub fn derive_tags_at(
    config: &TagConfig,
    ref_info: &RefInfo,
    now: DateTime<Utc>,
) -> Result<DerivedTags, TagError> {
    trace!("derive_tags({config:?}, {ref_info:?})");

    let image_name = qualified_image_name(&config.image, config.registry.as_deref());
    let mut tags: Vec<String> = Vec::new();
    let mut version = None;

    match RefKind::classify(&ref_info.ref_name) {
        RefKind::DefaultBranch => tags.push(LATEST_TAG.into()),
        RefKind::GitTag(tag) => {
            let (_project, tag_value) =
                git_ref::split_separated_tag(&tag, config.tag_separator.as_deref());

            if config.tag_semver.is_enabled() {
                let expansion = expand::expand_semver(config, tag_value)?;
                version = expansion.semantic;
                tags.extend(expansion.tags);
            } else {
                tags.push(tag_value.into());
            }
        }
        RefKind::PullRequest => tags.push(ref_info.sha.clone()),
        RefKind::Branch(branch) => tags.push(branch),
    }

    tags.extend(config.tag_extra.iter().cloned());

    if config.snapshot {
        tags.push(snapshot::snapshot_tag(now, &ref_info.sha));
    }

    // Guarantees a non-empty result, e.g. a non-semver tag under skip mode.
    if tags.is_empty() {
        tags.push(ref_info.sha.clone());
    }

    let tags: Vec<String> = tags
        .into_iter()
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(|tag| format!("{image_name}:{tag}"))
        .collect();
    trace!("tags={tags:?} version={version:?}");

    Ok(DerivedTags { tags, version })
}

/// Prefixes a bare image name with the registry host, leaving names
/// that already carry it untouched.
fn qualified_image_name(image: &str, registry: Option<&str>) -> String {
    match registry {
        Some(registry) if !image.contains(registry) => format!("{registry}/{image}"),
        _ => image.to_string(),
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{
        derive_tags, derive_tags_at, PrereleaseMode, RefInfo, SemverMode, TagConfig, TagError,
    };

    const SHA: &str = "1234567890abcdef";

    fn ref_info(ref_name: &str) -> RefInfo {
        RefInfo::builder().ref_name(ref_name).sha(SHA).build()
    }

    fn string_vec(tags: &[&str]) -> Vec<String> {
        tags.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case::default_branch("refs/heads/master", &["app:latest"])]
    #[case::plain_branch("refs/heads/main", &["app:main"])]
    #[case::nested_branch("refs/heads/feature/foo", &["app:feature-foo"])]
    #[case::pull_request("refs/pull/42/merge", &["app:1234567890abcdef"])]
    #[case::literal_tag("refs/tags/v1.2.3", &["app:v1.2.3"])]
    fn derives_ref_tags(#[case] ref_name: &str, #[case] expected: &[&str]) {
        let config = TagConfig::builder().image("app").build();

        let derived = derive_tags(&config, &ref_info(ref_name)).unwrap();

        assert_eq!(derived.tags, string_vec(expected));
        assert!(derived.version.is_none());
    }

    #[test]
    fn semver_tag_sets_version() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::On)
            .semver_prerelease(PrereleaseMode::Short)
            .build();

        let derived = derive_tags(&config, &ref_info("refs/tags/v1.2.3-beta.1")).unwrap();

        assert_eq!(derived.tags, string_vec(&["app:1.2.3-beta"]));
        assert_eq!(derived.version.as_deref(), Some("1.2.3-beta"));
    }

    #[test]
    fn semver_higher_cut_expansion() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::On)
            .semver_higher(true)
            .build();

        let derived = derive_tags(&config, &ref_info("refs/tags/v1.2.3-beta.1")).unwrap();

        assert_eq!(derived.tags, string_vec(&["app:1.2.3", "app:1.2", "app:1"]));
        assert_eq!(derived.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn separated_tag_uses_version_half() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::On)
            .tag_separator("@")
            .build();

        let derived = derive_tags(&config, &ref_info("refs/tags/my-app@1.2.3")).unwrap();

        assert_eq!(derived.tags, string_vec(&["app:1.2.3"]));
        assert_eq!(derived.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn non_semver_tag_fails_in_fail_mode() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::Fail)
            .build();

        let err = derive_tags(&config, &ref_info("refs/tags/foo")).unwrap_err();

        assert!(matches!(err, TagError::NotSemver { tag } if tag == "foo"));
    }

    #[test]
    fn non_semver_tag_falls_back_to_sha_in_skip_mode() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::Skip)
            .build();

        let derived = derive_tags(&config, &ref_info("refs/tags/foo")).unwrap();

        assert_eq!(derived.tags, string_vec(&["app:1234567890abcdef"]));
        assert!(derived.version.is_none());
    }

    #[test]
    fn extra_tags_appended_and_deduplicated() {
        let config = TagConfig::builder()
            .image("app")
            .tag_extra(["latest".to_string(), "stable".to_string()])
            .build();

        let derived = derive_tags(&config, &ref_info("refs/heads/master")).unwrap();

        assert_eq!(derived.tags, string_vec(&["app:latest", "app:stable"]));
    }

    #[rstest]
    #[case::bare_name("app", Some("registry.example.com"), "registry.example.com/app:latest")]
    #[case::already_qualified(
        "registry.example.com/app",
        Some("registry.example.com"),
        "registry.example.com/app:latest"
    )]
    #[case::no_registry("app", None, "app:latest")]
    fn registry_qualification(
        #[case] image: &str,
        #[case] registry: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = TagConfig::builder()
            .image(image)
            .maybe_registry(registry)
            .build();

        let derived = derive_tags(&config, &ref_info("refs/heads/master")).unwrap();

        assert_eq!(derived.tags, string_vec(&[expected]));
    }

    #[test]
    fn snapshot_tag_appended() {
        let config = TagConfig::builder().image("app").snapshot(true).build();
        let now = Utc.with_ymd_and_hms(2024, 4, 29, 13, 37, 59).unwrap();

        let derived = derive_tags_at(&config, &ref_info("refs/heads/main"), now).unwrap();

        assert_eq!(
            derived.tags,
            string_vec(&["app:main", "app:20240429-133759-123456"]),
        );
    }

    #[test]
    fn idempotent_without_snapshot() {
        let config = TagConfig::builder()
            .image("app")
            .tag_semver(SemverMode::On)
            .semver_higher(true)
            .build();
        let info = ref_info("refs/tags/v1.2.3");

        let first = derive_tags(&config, &info).unwrap();
        let second = derive_tags(&config, &info).unwrap();

        assert_eq!(first, second);
    }
}
