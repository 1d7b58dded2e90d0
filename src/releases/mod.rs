//! OpenShift release versions and the public release feed.

pub mod feed;
pub mod version;

pub use feed::{parse_release_name, HttpReleaseFeed, OfflineFeed, ReleaseFeed, DEFAULT_MIRROR};
pub use version::{compare, ReleaseVersion};
