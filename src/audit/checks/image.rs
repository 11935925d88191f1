//! Container image pinning check.

use crate::audit::checks::ContainerCheck;
use crate::audit::error::AuditError;
use crate::audit::types::Violation;
use k8s_openapi::api::core::v1::Container;

/// An image reference split into repository and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub repository: &'a str,
    pub tag: Option<&'a str>,
}

impl<'a> ImageRef<'a> {
    /// Split an image on its last `:`.
    ///
    /// A digest suffix (`@sha256:...`) is ignored, and a final segment that
    /// contains `/` is a registry port rather than a tag.
    pub fn parse(image: &'a str) -> Self {
        let name = image.split_once('@').map_or(image, |(name, _)| name);
        match name.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => Self {
                repository,
                tag: Some(tag),
            },
            _ => Self {
                repository: name,
                tag: None,
            },
        }
    }
}

/// Compares every container image against an operator supplied
/// `repository:tag`.
///
/// Only containers running the reference repository are scored. The
/// reference is validated lazily, when the first container is checked.
#[derive(Debug, Clone)]
pub struct ImageCheck {
    reference: String,
}

impl ImageCheck {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    fn parsed_reference(&self) -> Result<(&str, &str), AuditError> {
        let reference = ImageRef::parse(&self.reference);
        match reference.tag {
            Some(tag) if !tag.is_empty() => Ok((reference.repository, tag)),
            _ => Err(AuditError::MissingImageTag(self.reference.clone())),
        }
    }
}

impl ContainerCheck for ImageCheck {
    fn name(&self) -> &'static str {
        "image"
    }

    fn check_container(&self, container: &Container) -> Result<Option<Violation>, AuditError> {
        let (repository, tag) = self.parsed_reference()?;
        let declared = ImageRef::parse(container.image.as_deref().unwrap_or_default());

        if declared.repository != repository {
            return Ok(None);
        }

        // An untagged image cannot be confirmed to match.
        let mismatch = declared.tag.is_none_or(|declared_tag| declared_tag != tag);
        Ok(mismatch.then(|| Violation::ImageTagMismatch {
            image: declared.repository.to_string(),
            tag: declared.tag.map(str::to_string),
        }))
    }
}
