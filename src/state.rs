use crate::resolver::MetadataResolver;

/// Shared application state passed to all handlers.
///
/// The resolver holds the link set read once at startup, so requests never
/// touch the environment or the filesystem.
#[derive(Clone)]
pub struct AppState {
    pub resolver: MetadataResolver,
}
