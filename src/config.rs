use bon::Builder;
use serde::Deserialize;

/// The tagging policy for a single build event.
///
/// This is the resolved form of the action's inputs. The
/// surrounding CI layer is responsible for reading them from
/// its own config format and handing them over here.
#[derive(Debug, Clone, Default, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct TagConfig {
    /// The name of the image being tagged.
    #[builder(into)]
    pub image: String,

    /// Registry host prepended to the image name when
    /// it isn't already part of it.
    #[serde(default)]
    #[builder(into)]
    pub registry: Option<String>,

    /// Whether git tags are expanded as semantic versions.
    #[serde(default)]
    #[builder(default)]
    pub tag_semver: SemverMode,

    /// How prerelease identifiers are rendered.
    #[serde(default)]
    #[builder(default)]
    pub semver_prerelease: PrereleaseMode,

    /// Also emit the floating `M.m.p`, `M.m` and `M` tags
    /// for a semver git tag.
    #[serde(default)]
    #[builder(default)]
    pub semver_higher: bool,

    /// Separator splitting a git tag into a project name
    /// and a version, e.g. `my-app@1.2.3`.
    #[serde(default)]
    #[builder(into)]
    pub tag_separator: Option<String>,

    /// Additional tags appended to every derived set, in order.
    #[serde(default)]
    #[builder(default, into)]
    pub tag_extra: Vec<String>,

    /// Append a `YYYYMMDD-HHMMSS-<short sha>` tag unique to this build.
    #[serde(default)]
    #[builder(default)]
    pub snapshot: bool,
}

/// Controls semver expansion of git-tag refs.
///
/// Every variant except [`Off`](Self::Off) enables expansion;
/// they differ in how a tag that fails to parse is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemverMode {
    /// Git tags are used verbatim.
    #[default]
    Off,
    /// Expand semver tags; a non-semver tag derives nothing.
    On,
    /// Same failure behavior as [`On`](Self::On), spelled out
    /// explicitly in the config.
    Skip,
    /// Expand semver tags; error out on a non-semver tag.
    Fail,
}

impl SemverMode {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// How prerelease identifiers of a semver git tag are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrereleaseMode {
    /// Discard the prerelease entirely, `1.2.3-beta.1` -> `1.2.3`.
    #[default]
    Cut,
    /// Keep only the first identifier, `1.2.3-beta.1` -> `1.2.3-beta`.
    Short,
    /// Keep the canonical rendering, build metadata included.
    Full,
}
