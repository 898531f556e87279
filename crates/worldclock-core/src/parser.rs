// crates/worldclock-core/src/parser.rs

//! # Dataset Parser
//!
//! Turns the GeoNames `cities15000.txt` dump into [`CityRecord`]s.
//!
//! The file is tab separated, one city per line. Column positions are fixed
//! by the upstream format:
//!
//! | index | column          |
//! |-------|-----------------|
//! | 1     | name            |
//! | 8     | country code    |
//! | 14    | population      |
//! | 17    | timezone        |
//!
//! Rows that are too short, that carry no timezone, or that are not valid
//! UTF-8 are skipped silently. Only an I/O failure on the stream is an error.

use crate::record::CityRecord;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Rows with fewer columns than this are skipped.
pub const MIN_FIELDS: usize = 18;

const NAME_FIELD: usize = 1;
const COUNTRY_FIELD: usize = 8;
const POPULATION_FIELD: usize = 14;
const TIMEZONE_FIELD: usize = 17;

/// Read buffer size. Some GeoNames rows carry huge alternate-name lists.
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Lazy, single-pass iterator over the records of a dataset stream.
///
/// Yields `Err` once if the underlying reader fails and then stops.
pub struct CityParser<R> {
    reader: R,
    line: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> CityParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            failed: false,
        }
    }
}

impl<R: Read> CityParser<BufReader<R>> {
    /// Wraps a raw reader in a buffer large enough for the longest rows.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, reader))
    }
}

impl CityParser<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }
}

impl<R: BufRead> Iterator for CityParser<R> {
    type Item = io::Result<CityRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let Ok(line) = std::str::from_utf8(&self.line) else {
                        continue;
                    };
                    let line = line.trim_end_matches(['\n', '\r']);
                    if let Some(city) = parse_line(line) {
                        return Some(Ok(city));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parses a single row. `None` means the row is skipped, not that it failed.
pub fn parse_line(line: &str) -> Option<CityRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let timezone = fields[TIMEZONE_FIELD];
    if timezone.is_empty() {
        return None;
    }

    let population = fields[POPULATION_FIELD].trim().parse().unwrap_or(0);

    Some(CityRecord::new(
        fields[NAME_FIELD],
        fields[COUNTRY_FIELD],
        timezone,
        population,
    ))
}

/// Parses a whole stream. Any read error discards everything parsed so far.
pub fn parse_reader<R: Read>(reader: R) -> io::Result<Vec<CityRecord>> {
    CityParser::from_reader(reader).collect()
}

/// Parses the dataset file at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> io::Result<Vec<CityRecord>> {
    CityParser::open(path)?.collect()
}
