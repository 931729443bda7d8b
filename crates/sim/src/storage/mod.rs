//! Persisting populations.
//!
//! Two layouts are supported: a line-oriented text form that is easy to diff
//! and a compact little-endian binary form.

mod binary;
mod text;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use crate::errors::StorageError;
use crate::simulation::Population;

pub use binary::{read_chromosome, write_chromosome};

/// On-disk layout of a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationFormat {
    #[default]
    Text,
    Binary,
}

impl PopulationFormat {
    /// Guess the format from a file extension: `.bin` is binary, anything
    /// else is text.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("bin") => Self::Binary,
            _ => Self::Text,
        }
    }

    /// Write `population` to `writer`.
    pub fn write<W: Write>(self, population: &Population, writer: &mut W) -> Result<(), StorageError> {
        match self {
            Self::Text => text::write_population(population, writer),
            Self::Binary => binary::write_population(population, writer),
        }
    }

    /// Read a population from `reader`.
    pub fn read<R: Read>(self, reader: &mut R) -> Result<Population, StorageError> {
        match self {
            Self::Text => text::read_population(reader),
            Self::Binary => binary::read_population(reader),
        }
    }
}

impl fmt::Display for PopulationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for PopulationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "binary" | "bin" => Ok(Self::Binary),
            other => Err(format!("unknown population format '{other}' (expected text or binary)")),
        }
    }
}

/// Write `population` to a file.
pub fn save_population(
    population: &Population,
    path: impl AsRef<Path>,
    format: PopulationFormat,
) -> Result<(), StorageError> {
    let path = path.as_ref();
    if format == PopulationFormat::Binary {
        binary::check_segment_counts(population)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    format.write(population, &mut writer)?;
    writer.flush()?;
    log::debug!(
        "wrote {} organisms to {} ({format})",
        population.population_size(),
        path.display()
    );
    Ok(())
}

/// Read a population from a file.
pub fn load_population(
    path: impl AsRef<Path>,
    format: PopulationFormat,
) -> Result<Population, StorageError> {
    let mut reader = BufReader::new(File::open(path)?);
    format.read(&mut reader)
}
