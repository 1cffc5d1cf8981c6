use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::types::SatelliteInfo;

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
    pub constants: Constants,
}

impl TleEntry {
    pub fn from_lines(
        name: Option<String>,
        line1: &str,
        line2: &str,
        source: &str,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Result<Self, PredictError> {
        let invalid = |message: String| PredictError::InvalidTle {
            source_name: source.to_string(),
            message,
        };

        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        Ok(TleEntry {
            info: SatelliteInfo {
                name: sat_name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
                epoch: elements.datetime.and_utc(),
                fetched_at,
            },
            elements,
            constants,
        })
    }

    /// Time elapsed since the element set was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.info.fetched_at.map(|fetched| now - fetched)
    }
}

/// Parse every 2- or 3-line record in `content`. A malformed record fails the whole text.
pub fn parse_tle_text(
    content: &str,
    source: &str,
    fetched_at: Option<DateTime<Utc>>,
) -> Result<Vec<TleEntry>, PredictError> {
    let records = parse_multi_tle(content);
    if records.is_empty() {
        return Err(PredictError::InvalidTle {
            source_name: source.to_string(),
            message: "no TLE records found".into(),
        });
    }

    records
        .into_iter()
        .map(|(name, line1, line2)| TleEntry::from_lines(name, &line1, &line2, source, fetched_at))
        .collect()
}

pub struct TleLoader {
    tle_dir: PathBuf,
    satellites: HashMap<u32, TleEntry>,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self {
            tle_dir,
            satellites: HashMap::new(),
        }
    }

    /// Load all TLE files from the directory
    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.tle_dir.exists() {
            return Err(PredictError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        self.satellites.clear();

        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_tle_file(&path) {
                continue;
            }

            match load_file(&path) {
                Ok(entries) => {
                    for tle_entry in entries {
                        self.satellites.insert(tle_entry.info.norad_id, tle_entry);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            self.satellites.len(),
            self.tle_dir.display()
        );
        Ok(())
    }

    /// All loaded satellites, ordered by name.
    pub fn satellites(&self) -> Vec<&TleEntry> {
        let mut sats: Vec<_> = self.satellites.values().collect();
        sats.sort_by(|a, b| a.info.name.cmp(&b.info.name));
        sats
    }

    pub fn get(&self, norad_id: u32) -> Option<&TleEntry> {
        self.satellites.get(&norad_id)
    }

    pub fn reload(&mut self) -> Result<(), PredictError> {
        self.load_all()
    }
}

fn is_tle_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "tle" || ext == "txt")
        .unwrap_or(false)
}

/// Parse a single TLE file; its modification time is taken as the fetch time.
pub fn load_file(path: &Path) -> Result<Vec<TleEntry>, PredictError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let fetched_at = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    parse_tle_text(&content, &filename, fetched_at)
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            let name = lines[i].trim_start_matches("0 ").to_string();
            result.push((
                Some(name),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
