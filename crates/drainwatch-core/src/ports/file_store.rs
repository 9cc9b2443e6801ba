use async_trait::async_trait;

use crate::error::Result;

/// Raw attachment bytes with their file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self { bytes, extension: extension.into() }
    }

    /// Size rounded up to whole kilobytes
    pub fn size_kb(&self) -> usize {
        self.bytes.len().div_ceil(1024)
    }

    /// Lowercased extension without a leading dot
    pub fn normalized_extension(&self) -> String {
        self.extension.trim_start_matches('.').to_lowercase()
    }
}

/// Port for attachment storage
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store an upload under a folder and return its stored path
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String>;

    /// Delete a stored file; deleting a missing file is not an error
    async fn delete(&self, path: &str) -> Result<()>;

    /// Public URL for a stored path
    fn public_url(&self, path: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_size_and_extension() {
        let upload = Upload::new(vec![0u8; 1025], ".JPG");
        assert_eq!(upload.size_kb(), 2);
        assert_eq!(upload.normalized_extension(), "jpg");
    }
}
