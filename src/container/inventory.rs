//! Existence checks against the engine's listings.
//!
//! Both checks scan the full listing and return the first match. Names are
//! unique in the engine, so at most one match is expected.

use crate::container::{
    ContainerError, ContainerRecord, Engine, ImageRecord, ImageReference, Result,
};
use tracing::debug;

/// Look up a container by name, in any state.
///
/// # Errors
///
/// Returns [`ContainerError::Lookup`] if the engine cannot list containers.
pub async fn container_exists(engine: &dyn Engine, name: &str) -> Result<Option<ContainerRecord>> {
    let containers = engine.list_containers().await.map_err(lookup_error)?;

    let found = containers
        .into_iter()
        .find(|c| c.name.trim_start_matches('/') == name);

    debug!(name, found = found.is_some(), "Container existence check");
    Ok(found)
}

/// Look up a local image by `repository:tag`.
///
/// # Errors
///
/// Returns [`ContainerError::Lookup`] if the engine cannot list images.
pub async fn image_exists(engine: &dyn Engine, image: &ImageReference) -> Result<Option<ImageRecord>> {
    let wanted = image.to_string();
    let images = engine.list_images().await.map_err(lookup_error)?;

    let found = images
        .into_iter()
        .find(|img| img.repo_tags.iter().any(|tag| *tag == wanted));

    debug!(image = %wanted, found = found.is_some(), "Image existence check");
    Ok(found)
}

fn lookup_error(e: ContainerError) -> ContainerError {
    match e {
        e @ ContainerError::Lookup(_) => e,
        e => ContainerError::Lookup(e.to_string()),
    }
}
