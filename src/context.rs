//! Build context shared across generators, and the generation driver.
//!
//! The context owns exactly one capability: fetching static template
//! resources. The caller injects it as an async function, so the fetch can
//! be backed by embedded bytes, the file system, or the network without the
//! pipeline caring; parsing and generation themselves never block.

use std::fmt;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::gen::Generator;

/// Injected fetch capability: resolves a resource path to its bytes, or
/// `None` when the resource does not exist.
pub type FetchFn = Box<dyn Fn(&str) -> BoxFuture<'static, Option<Vec<u8>>> + Send + Sync>;

/// Shared state handed to every generator in a run.
pub struct BuildContext {
    fetch: FetchFn,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext").finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(&str) -> BoxFuture<'static, Option<Vec<u8>>> + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
        }
    }

    /// Fetch a template resource. A missing resource is a fatal
    /// configuration error, never a silent empty result.
    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        (self.fetch)(path)
            .await
            .ok_or_else(|| Error::MissingResource(path.to_string()))
    }

    /// Fetch a template resource and decode it as UTF-8.
    pub async fn fetch_string(&self, path: &str) -> Result<String> {
        let bytes = self.fetch(path).await?;
        String::from_utf8(bytes)
            .map_err(|_| Error::MissingResource(format!("{path}: not valid UTF-8")))
    }
}

/// Run one generator against a build context and hand back its file-name to
/// content mapping verbatim. The driver performs no transformation and
/// returns no partial file set on error.
pub async fn generate<G: Generator>(
    context: &BuildContext,
    generator: &G,
) -> Result<IndexMap<String, String>> {
    generator.generate(context).await
}
