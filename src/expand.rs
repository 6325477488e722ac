use log::trace;
use semver::Version;

use crate::{
    config::{PrereleaseMode, SemverMode, TagConfig},
    error::TagError,
};

/// The outcome of expanding a git tag as a semantic version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The version tags derived from the git tag.
    pub tags: Vec<String>,
    /// The rendered primary version, when the tag parsed.
    pub semantic: Option<String>,
}

/// Expands a git tag into its semantic version tags.
///
/// The primary tag is rendered per `semver_prerelease` and doubles
/// as the `semantic` version of the build. With `semver_higher`,
/// the floating prerelease, `M.m.p`, `M.m` and `M` tags follow.
///
/// # Errors
/// Errors when the tag is not a valid semver and `tag_semver` is
/// [`SemverMode::Fail`].
pub fn expand_semver(config: &TagConfig, tag: &str) -> Result<Expansion, TagError> {
    let Some(version) = parse_version(tag) else {
        if config.tag_semver == SemverMode::Fail {
            return Err(TagError::NotSemver {
                tag: tag.to_string(),
            });
        }
        trace!("{tag} is not a semver, skipping");
        return Ok(Expansion::default());
    };

    let rendered = render_primary(&version, config.semver_prerelease);

    let mut tags = vec![rendered.clone()];
    if config.semver_higher {
        tags.extend(higher_tags(&version, config.semver_prerelease));
    }

    Ok(Expansion {
        tags,
        semantic: Some(rendered),
    })
}

fn render_primary(version: &Version, mode: PrereleaseMode) -> String {
    let core = format!("{}.{}.{}", version.major, version.minor, version.patch);

    match mode {
        PrereleaseMode::Cut => core,
        PrereleaseMode::Short if version.pre.is_empty() => core,
        PrereleaseMode::Short => {
            let pre = version.pre.as_str();
            let first = pre.split('.').next().unwrap_or(pre);
            format!("{core}-{first}")
        }
        PrereleaseMode::Full => version.to_string(),
    }
}

/// Produces the floating tags for a version, most specific first:
/// one tag per non-empty prefix of the (mode-normalized) prerelease
/// identifier list, then `M.m.p`, `M.m` and `M`.
fn higher_tags(version: &Version, mode: PrereleaseMode) -> Vec<String> {
    let core = format!("{}.{}.{}", version.major, version.minor, version.patch);

    let identifiers: Vec<&str> = if version.pre.is_empty() {
        Vec::new()
    } else {
        version.pre.split('.').collect()
    };
    let keep = match mode {
        PrereleaseMode::Cut => 0,
        PrereleaseMode::Short => identifiers.len().min(1),
        PrereleaseMode::Full => identifiers.len(),
    };
    let identifiers = &identifiers[..keep];

    let mut tags: Vec<String> = (1..=identifiers.len())
        .rev()
        .map(|len| format!("{core}-{}", identifiers[..len].join(".")))
        .collect();

    tags.push(core);
    tags.push(format!("{}.{}", version.major, version.minor));
    tags.push(version.major.to_string());
    tags
}

/// Parses a tag as a semver, tolerating the common `v` prefix
/// release tags carry (`v1.2.3`).
fn parse_version(tag: &str) -> Option<Version> {
    let tag = tag.trim();
    let tag = tag.strip_prefix(['v', 'V']).unwrap_or(tag);
    Version::parse(tag).ok()
}
