//! Media source resolution.
//!
//! Remote renderers fetch the content over HTTP from the application's local
//! media server. The control plane only needs two facts about it: the URL the
//! server is reachable at from the LAN, and a display name for the content
//! identified by the playback state's `info_hash`.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::devices::MediaRequest;
use crate::protocol_constants::MEDIA_CONTENT_TYPE;

/// Source of the media URL and titles handed to renderers.
pub trait MediaLibrary: Send + Sync {
    /// URL the local media server is reachable at from the network, if running.
    fn network_url(&self) -> Option<String>;

    /// Display name of the content identified by `info_hash`.
    fn content_name(&self, info_hash: &str) -> Option<String>;
}

/// In-memory [`MediaLibrary`] updated by the embedding application.
#[derive(Debug, Default)]
pub struct StaticMediaLibrary {
    network_url: RwLock<Option<String>>,
    names: RwLock<HashMap<String, String>>,
}

impl StaticMediaLibrary {
    /// Creates a library serving from `network_url`.
    pub fn new(network_url: impl Into<String>) -> Self {
        Self {
            network_url: RwLock::new(Some(network_url.into())),
            names: RwLock::new(HashMap::new()),
        }
    }

    /// Sets or clears the media server URL.
    pub fn set_network_url(&self, url: Option<String>) {
        *self.network_url.write() = url;
    }

    /// Registers the display name for a piece of content.
    pub fn insert(&self, info_hash: impl Into<String>, name: impl Into<String>) {
        self.names.write().insert(info_hash.into(), name.into());
    }
}

impl MediaLibrary for StaticMediaLibrary {
    fn network_url(&self) -> Option<String> {
        self.network_url.read().clone()
    }

    fn content_name(&self, info_hash: &str) -> Option<String> {
        self.names.read().get(info_hash).cloned()
    }
}

/// Builds the title shown on the renderer: `"<app> - <content>"`, or just the
/// app name when the content is unknown.
#[must_use]
pub fn media_title(app_name: &str, content_name: Option<&str>) -> String {
    match content_name {
        Some(name) => format!("{} - {}", app_name, name),
        None => app_name.to_string(),
    }
}

/// Resolves the load request for the content currently in the playback state.
///
/// Returns `None` when the media server URL is unknown.
#[must_use]
pub fn resolve_media_request(
    library: &dyn MediaLibrary,
    app_name: &str,
    info_hash: Option<&str>,
) -> Option<MediaRequest> {
    let url = library.network_url()?;
    let name = info_hash.and_then(|hash| library.content_name(hash));
    Some(MediaRequest {
        url,
        content_type: MEDIA_CONTENT_TYPE.to_string(),
        title: media_title(app_name, name.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_app_and_content_name() {
        let library = StaticMediaLibrary::new("http://192.168.1.20:8000/0");
        library.insert("abc123", "Big Buck Bunny");

        let request = resolve_media_request(&library, "CastLink", Some("abc123")).unwrap();
        assert_eq!(request.url, "http://192.168.1.20:8000/0");
        assert_eq!(request.content_type, "video/mp4");
        assert_eq!(request.title, "CastLink - Big Buck Bunny");
    }

    #[test]
    fn unknown_content_falls_back_to_app_name() {
        let library = StaticMediaLibrary::new("http://host/0");
        let request = resolve_media_request(&library, "CastLink", Some("missing")).unwrap();
        assert_eq!(request.title, "CastLink");
    }

    #[test]
    fn no_request_without_server_url() {
        let library = StaticMediaLibrary::default();
        assert!(resolve_media_request(&library, "CastLink", None).is_none());
        library.set_network_url(Some("http://host/1".into()));
        assert!(resolve_media_request(&library, "CastLink", None).is_some());
    }
}
