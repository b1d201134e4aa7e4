//! Byte source seam.

use std::future::Future;

use crate::error::FetchError;

/// Fetches the raw bytes of a GLB file.
///
/// The loader knows nothing about transports; hosts implement this over
/// HTTP, the filesystem or an asset bundle. Errors are passed through to the
/// caller unchanged as [`crate::LoadError::Fetch`].
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}
