//! The residual particle snapshot persisted between ticks.
//!
//! One particle per line, `lon lat` separated by whitespace. A missing file
//! means no snapshot has been written yet.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use slick_core::{LonLat, ParticleSet};
use tracing::debug;

use crate::error::LoadError;

/// A particle snapshot file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// A store backed by `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` if none has been saved.
    pub fn load(&self) -> Result<Option<ParticleSet>, LoadError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let particles = parse_lines(&text)?;
        debug!(path = %self.path.display(), particles = particles.len(), "snapshot loaded");
        Ok(Some(particles))
    }

    /// Overwrite the snapshot with `particles`.
    ///
    /// Written to a sibling temporary file and renamed into place, so a
    /// reader never sees a half-written snapshot.
    pub fn save(&self, particles: &ParticleSet) -> Result<(), LoadError> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut out = BufWriter::new(fs::File::create(&tmp)?);
            for p in particles.iter() {
                writeln!(out, "{} {}", p.lon, p.lat)?;
            }
            out.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), particles = particles.len(), "snapshot saved");
        Ok(())
    }

    /// Remove the snapshot. Removing a missing snapshot is not an error.
    pub fn clear(&self) -> Result<(), LoadError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn parse_lines(text: &str) -> Result<ParticleSet, LoadError> {
    let mut particles = ParticleSet::new();
    for (n, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (lon, lat) = match (fields.next(), fields.next(), fields.next()) {
            (None, ..) => continue,
            (Some(lon), Some(lat), None) => (lon, lat),
            _ => {
                return Err(LoadError::Invalid {
                    reason: format!("line {}: expected `lon lat`", n + 1),
                })
            }
        };
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|e| LoadError::Invalid {
                reason: format!("line {}: {e}", n + 1),
            })
        };
        particles.push(LonLat::new(parse(lon)?, parse(lat)?));
    }
    Ok(particles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SnapshotStore {
        let dir = std::env::temp_dir().join(format!("slick-store-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        SnapshotStore::new(dir.join("residual.txt"))
    }

    #[test]
    fn missing_snapshot_is_none() {
        let store = temp_store("missing");
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn saved_snapshot_loads_back() {
        let store = temp_store("saved");
        let particles =
            ParticleSet::from_points([LonLat::new(-35.25, -9.5), LonLat::new(-34.75, -9.125)]);
        store.save(&particles).unwrap();
        assert_eq!(store.load().unwrap(), Some(particles));

        store.save(&ParticleSet::new()).unwrap();
        assert_eq!(store.load().unwrap(), Some(ParticleSet::new()));
        store.clear().unwrap();
    }

    #[test]
    fn blank_lines_are_skipped() {
        let particles = parse_lines("1 2\n\n   \n3\t4\n").unwrap();
        assert_eq!(particles.lon(), &[1.0, 3.0]);
        assert_eq!(particles.lat(), &[2.0, 4.0]);
    }

    #[test]
    fn malformed_line_names_its_number() {
        match parse_lines("1 2\n3\n") {
            Err(LoadError::Invalid { reason }) => assert!(reason.starts_with("line 2")),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(parse_lines("1 x\n").is_err());
    }
}
