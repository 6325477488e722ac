use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum TagError {
    /// The git tag could not be parsed as a semantic version
    /// while `tag_semver` was set to fail on invalid tags.
    #[error("Tag {tag:?} is not a semver")]
    #[diagnostic()]
    NotSemver { tag: String },
}
