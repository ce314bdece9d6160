mod link_preview;

pub use link_preview::{LinkOverride, LinkPreviewDto};
