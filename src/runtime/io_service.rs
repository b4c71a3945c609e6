use std::path::Path;
use std::sync::Arc;

use crate::formats::{CubeReader, CubeWriter, FitsCodec, IoError, write_projection};
use crate::model::{Cube, Projection};

use super::Result;

#[derive(Clone)]
pub struct IoService {
    readers: Vec<Arc<dyn CubeReader>>,
    writers: Vec<Arc<dyn CubeWriter>>,
}

impl std::fmt::Debug for IoService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("IoService")
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .finish()
    }
}

impl Default for IoService {
    fn default() -> Self {
        Self {
            readers: vec![Arc::new(FitsCodec)],
            writers: vec![Arc::new(FitsCodec)],
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

impl IoService {
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Cube> {
        let path = path.as_ref();
        let extension = extension_of(path);
        let reader = self
            .readers
            .iter()
            .find(|reader| reader.supports_extension(&extension))
            .ok_or_else(|| IoError::UnsupportedFormat(extension.clone()))?;
        let cube = reader.read(path)?;
        log::info!("read {} with shape {:?}", path.display(), cube.shape());
        Ok(cube)
    }

    pub fn write(&self, path: impl AsRef<Path>, cube: &Cube) -> Result<()> {
        let path = path.as_ref();
        let extension = extension_of(path);
        let writer = self
            .writers
            .iter()
            .find(|writer| writer.supports_extension(&extension))
            .ok_or_else(|| IoError::UnsupportedFormat(extension.clone()))?;
        writer.write(path, cube)?;
        Ok(())
    }

    pub fn write_projection(&self, path: impl AsRef<Path>, projection: &Projection) -> Result<()> {
        write_projection(path, projection)?;
        Ok(())
    }
}
