//! The contract between the analysis routines and whatever stores molecule records.
//!
//! The analysis crates only ever read trace columns and scalar parameters and write
//! segment tables back; the storage layout behind [`MoleculeArchive`] is not their concern.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::RwLock;

use crate::errors::MarsCoreError;
use crate::models::{Molecule, Segment};

/// Provider of per-molecule traces and segment tables.
///
/// Implementations must be safe to read and write from several worker threads at once;
/// writes for different molecules never depend on each other.
pub trait MoleculeArchive: Send + Sync {
    /// Identifiers of every molecule in the archive, in a stable order.
    fn molecule_uids(&self) -> Vec<String>;

    fn column(&self, uid: &str, name: &str) -> Result<Vec<f64>, MarsCoreError>;

    fn parameter(&self, uid: &str, name: &str) -> Option<f64>;

    fn segments(&self, uid: &str, table: &str) -> Option<Vec<Segment>>;

    fn put_segments(
        &self,
        uid: &str,
        table: &str,
        segments: Vec<Segment>,
    ) -> Result<(), MarsCoreError>;
}

#[derive(Serialize, Deserialize)]
struct ArchiveFile {
    molecules: Vec<Molecule>,
}

///
/// Archive held entirely in memory, guarded by a read/write lock.
///
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    molecules: RwLock<BTreeMap<String, Molecule>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_molecules(molecules: Vec<Molecule>) -> Self {
        let map = molecules
            .into_iter()
            .map(|molecule| (molecule.uid.clone(), molecule))
            .collect();
        InMemoryArchive {
            molecules: RwLock::new(map),
        }
    }

    pub fn insert(&self, molecule: Molecule) -> Result<(), MarsCoreError> {
        let mut molecules = self
            .molecules
            .write()
            .map_err(|_| MarsCoreError::LockPoisoned)?;
        molecules.insert(molecule.uid.clone(), molecule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.molecules.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of one molecule record.
    pub fn molecule(&self, uid: &str) -> Option<Molecule> {
        self.molecules.read().ok()?.get(uid).cloned()
    }

    pub fn into_molecules(self) -> Vec<Molecule> {
        match self.molecules.into_inner() {
            Ok(map) => map.into_values().collect(),
            Err(poisoned) => poisoned.into_inner().into_values().collect(),
        }
    }

    ///
    /// Load an archive from a JSON file of the form `{"molecules": [...]}`.
    ///
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MarsCoreError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let file: ArchiveFile = serde_json::from_reader(reader)?;
        debug!(
            "Loaded {} molecules from {}",
            file.molecules.len(),
            path.as_ref().display()
        );
        Ok(InMemoryArchive::from_molecules(file.molecules))
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MarsCoreError> {
        let molecules: Vec<Molecule> = self
            .molecules
            .read()
            .map_err(|_| MarsCoreError::LockPoisoned)?
            .values()
            .cloned()
            .collect();
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, &ArchiveFile { molecules })?;
        Ok(())
    }
}

impl MoleculeArchive for InMemoryArchive {
    fn molecule_uids(&self) -> Vec<String> {
        self.molecules
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn column(&self, uid: &str, name: &str) -> Result<Vec<f64>, MarsCoreError> {
        let molecules = self
            .molecules
            .read()
            .map_err(|_| MarsCoreError::LockPoisoned)?;
        let molecule = molecules
            .get(uid)
            .ok_or_else(|| MarsCoreError::MoleculeNotFound(uid.to_string()))?;
        molecule
            .columns
            .get(name)
            .cloned()
            .ok_or_else(|| MarsCoreError::ColumnNotFound {
                uid: uid.to_string(),
                column: name.to_string(),
            })
    }

    fn parameter(&self, uid: &str, name: &str) -> Option<f64> {
        self.molecules
            .read()
            .ok()?
            .get(uid)?
            .parameters
            .get(name)
            .copied()
    }

    fn segments(&self, uid: &str, table: &str) -> Option<Vec<Segment>> {
        self.molecules
            .read()
            .ok()?
            .get(uid)?
            .segment_tables
            .get(table)
            .cloned()
    }

    fn put_segments(
        &self,
        uid: &str,
        table: &str,
        segments: Vec<Segment>,
    ) -> Result<(), MarsCoreError> {
        let mut molecules = self
            .molecules
            .write()
            .map_err(|_| MarsCoreError::LockPoisoned)?;
        let molecule = molecules
            .get_mut(uid)
            .ok_or_else(|| MarsCoreError::MoleculeNotFound(uid.to_string()))?;
        molecule.segment_tables.insert(table.to_string(), segments);
        Ok(())
    }
}
