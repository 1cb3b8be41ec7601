use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::SpawnError;

/// Handling and audio identifiers shared by every vehicle that references the template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataTemplate {
    pub handling: String,
    pub audio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleEntry {
    /// Code prefix, usually ending in the `#` placeholder.
    pub code: String,
    /// Name of the entry in the manifest's `data` table.
    pub data: String,
}

/// The declarative input of a run. Both tables keep the order they were written in,
/// which decides the numbering handed out by the code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub data: IndexMap<String, DataTemplate>,
    #[serde(default)]
    pub vehicles: IndexMap<String, VehicleEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, SpawnError> {
        debug!("Loading manifest: {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| SpawnError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::from_yaml_str(&content)?;

        info!(
            "Loaded manifest with {} vehicles and {} data templates",
            manifest.vehicles.len(),
            manifest.data.len()
        );

        Ok(manifest)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SpawnError> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), SpawnError> {
        for (vehicle, entry) in &self.vehicles {
            if !self.data.contains_key(&entry.data) {
                return Err(SpawnError::UnknownTemplate {
                    vehicle: vehicle.clone(),
                    template: entry.data.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn template_for(&self, vehicle: &str) -> Option<&DataTemplate> {
        self.vehicles
            .get(vehicle)
            .and_then(|entry| self.data.get(&entry.data))
    }
}
