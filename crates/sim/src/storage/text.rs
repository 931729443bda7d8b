//! Text population layout:
//!
//! ```text
//! population_size 2
//! chromosome_pair_count 1
//!
//! + { (0,0) }
//! - { (0,1) }
//!
//! + { (0,2) (40,3) }
//! - { (0,3) }
//! ```

use std::io::{Read, Write};

use super::StorageError;
use crate::genome::{Chromosome, ChromosomePair};
use crate::simulation::Population;

pub(super) fn write_population<W: Write>(
    population: &Population,
    writer: &mut W,
) -> Result<(), StorageError> {
    writeln!(writer, "population_size {}", population.population_size())?;
    writeln!(writer, "chromosome_pair_count {}", population.chromosome_pair_count())?;
    writeln!(writer)?;
    for organism in population.organisms() {
        write!(writer, "{organism}")?;
        writeln!(writer)?;
    }
    Ok(())
}

fn header_value<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<usize, StorageError> {
    let line = lines
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| StorageError::Format(format!("missing '{name}' header")))?;
    let value = line
        .trim()
        .strip_prefix(name)
        .ok_or_else(|| StorageError::Format(format!("expected '{name}', found '{line}'")))?;
    value
        .trim()
        .parse()
        .map_err(|_| StorageError::Format(format!("invalid {name} '{}'", value.trim())))
}

fn chromosome_line(line: Option<&str>, marker: char) -> Result<Chromosome, StorageError> {
    let line = line.ok_or_else(|| StorageError::Format(format!("missing '{marker}' line")))?;
    let body = line
        .strip_prefix(marker)
        .ok_or_else(|| StorageError::Format(format!("expected '{marker}' line, found '{line}'")))?;
    Ok(body.parse()?)
}

pub(super) fn read_population<R: Read>(reader: &mut R) -> Result<Population, StorageError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    let mut lines = input.lines();
    let population_size = header_value(&mut lines, "population_size")?;
    let chromosome_pair_count = header_value(&mut lines, "chromosome_pair_count")?;

    let mut records = lines.map(str::trim).filter(|line| !line.is_empty());
    let mut pairs = Vec::with_capacity(population_size * chromosome_pair_count);
    while let Some(line) = records.next() {
        let maternal = chromosome_line(Some(line), '+')?;
        let paternal = chromosome_line(records.next(), '-')?;
        pairs.push(ChromosomePair::new(maternal, paternal));
    }

    Ok(Population::from_pairs(population_size, chromosome_pair_count, pairs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Segment;
    use crate::errors::ChromosomeError;

    const SAMPLE: &str = "population_size 2
chromosome_pair_count 1

+ { (0,0) }
- { (0,1) }

+ { (0,2) (40,3) }
- { (0,3) }

";

    #[test]
    fn test_read_sample() {
        let population = read_population(&mut SAMPLE.as_bytes()).unwrap();
        assert_eq!(population.population_size(), 2);
        assert_eq!(population.chromosome_pair_count(), 1);

        let second = population.organism(1).unwrap();
        let pair = second.pair(0).unwrap();
        assert_eq!(pair.maternal.segments(), &[Segment::new(0, 2), Segment::new(40, 3)]);
        assert_eq!(pair.paternal.segments(), &[Segment::new(0, 3)]);
    }

    #[test]
    fn test_write_matches_layout() {
        let population = read_population(&mut SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_population(&population, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn test_empty_population() {
        let population = Population::empty(3);
        let mut out = Vec::new();
        write_population(&population, &mut out).unwrap();
        let back = read_population(&mut out.as_slice()).unwrap();
        assert_eq!(back, population);
    }

    #[test]
    fn test_rejects_bad_input() {
        let missing_header = "chromosome_pair_count 1\n";
        assert!(matches!(
            read_population(&mut missing_header.as_bytes()),
            Err(StorageError::Format(_))
        ));

        let missing_paternal = "population_size 1\nchromosome_pair_count 1\n\n+ { (0,0) }\n";
        assert!(matches!(
            read_population(&mut missing_paternal.as_bytes()),
            Err(StorageError::Format(_))
        ));

        let bad_chromosome = "population_size 1\nchromosome_pair_count 1\n\n+ { (0,0 }\n- { (0,1) }\n";
        assert!(matches!(
            read_population(&mut bad_chromosome.as_bytes()),
            Err(StorageError::Chromosome(ChromosomeError::Parse(_)))
        ));

        let wrong_count = "population_size 2\nchromosome_pair_count 1\n\n+ { (0,0) }\n- { (0,1) }\n";
        assert!(matches!(
            read_population(&mut wrong_count.as_bytes()),
            Err(StorageError::Population(_))
        ));
    }
}
