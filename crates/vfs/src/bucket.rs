//! Binding of a storage client to one bucket.

use std::fmt;
use std::sync::Arc;

use bucketfs_storage::StorageClient;

/// A storage client together with the bucket every request targets.
///
/// Cheap to clone; all clones share the same client.
#[derive(Clone)]
pub struct Bucket {
    client: Arc<dyn StorageClient>,
    name: Arc<str>,
}

impl Bucket {
    /// Bind `client` to bucket `name`.
    pub fn new(client: Arc<dyn StorageClient>, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            client,
            name: Arc::from(name),
        }
    }

    pub fn client(&self) -> &dyn StorageClient {
        self.client.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket").field("name", &self.name).finish()
    }
}
