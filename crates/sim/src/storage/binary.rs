//! Binary population layout, all integers little-endian:
//!
//! - header: `population_size: u64`, `chromosome_pair_count: u64`
//! - per organism, per pair: maternal then paternal chromosome
//! - chromosome: `segment_count: u64`, then `start: u32`, `id: u32` per segment

use std::io::{ErrorKind, Read, Write};

use super::StorageError;
use crate::base::Segment;
use crate::errors::MAX_SEGMENTS;
use crate::genome::{Chromosome, ChromosomePair};
use crate::simulation::Population;

fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64, StorageError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(truncated)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32, StorageError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(truncated)?;
    Ok(u32::from_le_bytes(buf))
}

fn truncated(e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::UnexpectedEof {
        StorageError::Format("unexpected end of data".to_string())
    } else {
        StorageError::Io(e)
    }
}

fn to_usize(value: u64, name: &str) -> Result<usize, StorageError> {
    usize::try_from(value).map_err(|_| StorageError::Format(format!("{name} {value} out of range")))
}

fn segment_count(chromosome: &Chromosome) -> Result<u64, StorageError> {
    let count = chromosome.segment_count() as u64;
    if count > MAX_SEGMENTS {
        return Err(StorageError::TooManySegments(count));
    }
    Ok(count)
}

/// Fail with [`StorageError::TooManySegments`] if any chromosome of
/// `population` could not be read back.
pub(super) fn check_segment_counts(population: &Population) -> Result<(), StorageError> {
    for pair in population.pairs() {
        segment_count(&pair.maternal)?;
        segment_count(&pair.paternal)?;
    }
    Ok(())
}

/// Encode one chromosome.
///
/// # Errors
/// [`StorageError::TooManySegments`] for chromosomes above [`MAX_SEGMENTS`],
/// before anything is written.
pub fn write_chromosome<W: Write + ?Sized>(
    chromosome: &Chromosome,
    writer: &mut W,
) -> Result<(), StorageError> {
    writer.write_all(&segment_count(chromosome)?.to_le_bytes())?;
    for segment in chromosome.segments() {
        writer.write_all(&segment.start_position.to_le_bytes())?;
        writer.write_all(&segment.ancestry_id.to_le_bytes())?;
    }
    Ok(())
}

/// Decode one chromosome.
///
/// # Errors
/// [`StorageError::TooManySegments`] for counts above [`MAX_SEGMENTS`],
/// without reading the segments.
pub fn read_chromosome<R: Read + ?Sized>(reader: &mut R) -> Result<Chromosome, StorageError> {
    let count = read_u64(reader)?;
    if count > MAX_SEGMENTS {
        return Err(StorageError::TooManySegments(count));
    }
    let mut segments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let start = read_u32(reader)?;
        let id = read_u32(reader)?;
        segments.push(Segment::new(start, id));
    }
    Ok(Chromosome::from_segments(segments)?)
}

pub(super) fn write_population<W: Write>(
    population: &Population,
    writer: &mut W,
) -> Result<(), StorageError> {
    check_segment_counts(population)?;
    writer.write_all(&(population.population_size() as u64).to_le_bytes())?;
    writer.write_all(&(population.chromosome_pair_count() as u64).to_le_bytes())?;
    for pair in population.pairs() {
        write_chromosome(&pair.maternal, writer)?;
        write_chromosome(&pair.paternal, writer)?;
    }
    Ok(())
}

pub(super) fn read_population<R: Read>(reader: &mut R) -> Result<Population, StorageError> {
    let population_size = to_usize(read_u64(reader)?, "population_size")?;
    let chromosome_pair_count = to_usize(read_u64(reader)?, "chromosome_pair_count")?;
    let total = population_size
        .checked_mul(chromosome_pair_count)
        .ok_or_else(|| StorageError::Format("population dimensions overflow".to_string()))?;

    // capacity is bounded so a corrupt header cannot force a huge allocation
    let mut pairs = Vec::with_capacity(total.min(1 << 16));
    for _ in 0..total {
        let maternal = read_chromosome(reader)?;
        let paternal = read_chromosome(reader)?;
        pairs.push(ChromosomePair::new(maternal, paternal));
    }

    let mut rest = [0u8; 1];
    if reader.read(&mut rest)? != 0 {
        return Err(StorageError::Format("trailing data after population".to_string()));
    }

    Ok(Population::from_pairs(population_size, chromosome_pair_count, pairs)?)
}
