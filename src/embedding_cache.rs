//! Chunk embeddings cached in sled, so a restart does not re-embed the
//! document.

use sha2::{Digest, Sha256};
use sled::{Db, Tree};
use std::path::Path;

const EMBEDDINGS_TREE: &str = "embeddings";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("embedding cache: {0}")]
    Db(#[from] sled::Error),
    #[error("embedding cache entry is corrupt: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct EmbeddingCache {
    _db: Db,
    tree: Tree,
}

fn cache_key(model: &str, text: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hasher.finalize().to_vec()
}

impl EmbeddingCache {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(EMBEDDINGS_TREE)?;
        Ok(Self { _db: db, tree })
    }

    pub fn get(&self, model: &str, text: &str) -> Result<Option<Vec<f32>>, CacheError> {
        match self.tree.get(cache_key(model, text))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, model: &str, text: &str, vector: &[f32]) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(vector)?;
        self.tree.insert(cache_key(model, text), bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn flush(&self) -> Result<(), CacheError> {
        self.tree.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_put() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::open(&dir.path().join("db")).unwrap();

        assert_eq!(cache.get("m", "hello").unwrap(), None);
        cache.put("m", "hello", &[0.5, -1.0]).unwrap();
        assert_eq!(cache.get("m", "hello").unwrap(), Some(vec![0.5, -1.0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_depends_on_model() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::open(&dir.path().join("db")).unwrap();

        cache.put("model-a", "text", &[1.0]).unwrap();
        assert_eq!(cache.get("model-b", "text").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        {
            let cache = EmbeddingCache::open(&path).unwrap();
            cache.put("m", "chunk", &[0.25]).unwrap();
            cache.flush().unwrap();
        }
        let cache = EmbeddingCache::open(&path).unwrap();
        assert_eq!(cache.get("m", "chunk").unwrap(), Some(vec![0.25]));
    }
}
