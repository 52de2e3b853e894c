use crate::loader::SystemLoader;
use crate::types::{SimulationError, SystemConfig};

use std::sync::RwLock;

// Default embedded demonstration systems
const SYSTEM_TEXTS: [&str; 3] = [
    include_str!("../demos/pair-rewrite.json"),
    include_str!("../demos/reverser.json"),
    include_str!("../demos/ping-pong.json"),
];

lazy_static::lazy_static! {
    pub static ref SYSTEMS: RwLock<Vec<SystemConfig>> = RwLock::new(Vec::new());
}

pub struct SystemManager;

impl SystemManager {
    /// Initialize the SystemManager with the embedded demonstration systems
    pub fn load() -> Result<(), SimulationError> {
        let mut systems = Vec::new();

        for text in SYSTEM_TEXTS {
            match SystemLoader::load_system_from_string(text) {
                Ok(config) => systems.push(config),
                Err(error) => tracing::error!(%error, "failed to parse embedded system"),
            }
        }

        if let Ok(mut write_guard) = SYSTEMS.write() {
            *write_guard = systems;
        } else {
            return Err(SimulationError::FileError(
                "Failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of available systems
    pub fn get_system_count() -> usize {
        // Initialize with the embedded systems if not already initialized
        let _ = Self::load();

        SYSTEMS.read().map(|systems| systems.len()).unwrap_or(0)
    }

    /// Get a system by its index
    pub fn get_system_by_index(index: usize) -> Result<SystemConfig, SimulationError> {
        // Initialize with the embedded systems if not already initialized
        let _ = Self::load();

        SYSTEMS
            .read()
            .map_err(|_| SimulationError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                SimulationError::MissingReference(format!("System index {} out of range", index))
            })
    }

    /// Get a system by its name
    pub fn get_system_by_name(name: &str) -> Result<SystemConfig, SimulationError> {
        // Initialize with the embedded systems if not already initialized
        let _ = Self::load();

        SYSTEMS
            .read()
            .map_err(|_| SimulationError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|system| system.name == name)
            .cloned()
            .ok_or_else(|| {
                SimulationError::MissingReference(format!("System '{}' not found", name))
            })
    }

    /// List all system names
    pub fn list_system_names() -> Vec<String> {
        // Initialize with the embedded systems if not already initialized
        let _ = Self::load();

        SYSTEMS
            .read()
            .map(|systems| systems.iter().map(|system| system.name.clone()).collect())
            .unwrap_or_else(|_| Vec::new())
    }

    /// Search for systems by name
    pub fn search_systems(query: &str) -> Vec<usize> {
        // Initialize with the embedded systems if not already initialized
        let _ = Self::load();

        SYSTEMS
            .read()
            .map(|systems| {
                systems
                    .iter()
                    .enumerate()
                    .filter(|(_, system)| {
                        system.name.to_lowercase().contains(&query.to_lowercase())
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get the original document text of a system by its index
    pub fn get_system_text_by_index(index: usize) -> Result<&'static str, SimulationError> {
        SYSTEM_TEXTS.get(index).cloned().ok_or_else(|| {
            SimulationError::MissingReference(format!("System text index {} out of range", index))
        })
    }

    /// Get information about a system by its index
    pub fn get_system_info(index: usize) -> Result<SystemInfo, SimulationError> {
        let system = Self::get_system_by_index(index)?;

        Ok(SystemInfo {
            index,
            name: system.name.clone(),
            tape_count: system.tapes.len(),
            machine_count: system.machines.len(),
            node_count: system
                .machines
                .iter()
                .map(|machine| machine.nodes.len())
                .sum(),
            statement_count: system
                .machines
                .iter()
                .map(|machine| machine.statements.len())
                .sum(),
        })
    }
}

/// Summary of one embedded system.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub index: usize,
    pub name: String,
    pub tape_count: usize,
    pub machine_count: usize,
    pub node_count: usize,
    pub statement_count: usize,
}
