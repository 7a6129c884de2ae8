//! Run configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::SplitError;

/// Default number of kept rows per chunk file.
pub const DEFAULT_CHUNK_SIZE: usize = 5000;

/// Configuration for one split run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitConfig {
    /// Input workbook path.
    pub input: PathBuf,
    /// Directory chunk files are written to; cleared at run start.
    pub output_dir: PathBuf,
    /// Kept rows per chunk; always > 0.
    pub chunk_size: usize,
}

impl SplitConfig {
    /// Configuration with the default chunk size and the conventional
    /// `output/` directory next to the process working directory.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from("output"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, SplitError> {
        if chunk_size == 0 {
            return Err(SplitError::InvalidChunkSize(chunk_size));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitConfig::new("data.xlsx");
        assert_eq!(config.chunk_size, 5000);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = SplitConfig::new("data.xlsx").with_chunk_size(0);
        assert!(matches!(result, Err(SplitError::InvalidChunkSize(0))));
    }

    #[test]
    fn test_custom_chunk_size() {
        let config = SplitConfig::new("data.xlsx").with_chunk_size(7).unwrap();
        assert_eq!(config.chunk_size, 7);
    }
}
