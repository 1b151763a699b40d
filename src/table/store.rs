//! Canonical table storage.
//!
//! The authoritative student dataset lives as a single CSV under the data
//! directory and is overwritten wholesale on each upload. Writes go to a
//! `.tmp` sibling and are renamed into place so concurrent readers never
//! observe a partially written table.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{csv, Table};

pub const CANONICAL_FILE: &str = "students.csv";

pub struct TableStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl TableStore {
    pub fn new(data_dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&data_dir) {
            tracing::warn!("could not create data directory {:?}: {}", data_dir, e);
        }
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.data_dir.join(CANONICAL_FILE)
    }

    /// Load the canonical table, or `None` when no upload has happened yet.
    pub fn load(&self) -> io::Result<Option<Table>> {
        let path = self.canonical_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(csv::parse(&text))
    }

    /// Overwrite the canonical table atomically.
    pub fn save(&self, table: &Table) -> io::Result<()> {
        let _guard = self.write_lock.lock();
        let path = self.canonical_path();
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, csv::write(table))?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Keep a copy of the raw upload under `uploads/`, away from the
    /// canonical path. Only [`TableStore::save`] ever writes the canonical
    /// file, so a rejected upload cannot clobber scored data.
    pub fn save_raw_upload(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = self.data_dir.join("uploads");
        fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sample() -> Table {
        let mut t = Table::new(vec!["student_id".into(), "Previous_Scores".into()]);
        t.push_row(vec![Value::Str("1001".into()), Value::Num(72.0)]);
        t.push_row(vec![Value::Str("1002".into()), Value::Null]);
        t
    }

    #[test]
    fn load_is_none_before_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().to_path_buf());
        let table = sample();
        store.save(&table).unwrap();
        // Cell typing is re-sniffed on load, so numeric-looking text comes
        // back as numbers; the round trip is stable at the text level.
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.columns(), table.columns());
        assert_eq!(loaded.row_count(), table.row_count());
        assert_eq!(loaded.get(0, "student_id"), Some(&Value::Num(1001.0)));
        assert_eq!(loaded.get(0, "Previous_Scores"), Some(&Value::Num(72.0)));
        assert_eq!(loaded.get(1, "Previous_Scores"), Some(&Value::Null));
        assert_eq!(csv::write(&loaded), csv::write(&table));
    }

    #[test]
    fn raw_upload_never_touches_the_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().to_path_buf());
        store.save(&sample()).unwrap();
        store
            .save_raw_upload(CANONICAL_FILE, b"Hours_Studied,Gender\n5,F\n")
            .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.get(0, "Previous_Scores"), Some(&Value::Num(72.0)));
        assert!(dir.path().join("uploads").join(CANONICAL_FILE).is_file());
    }

    #[test]
    fn save_leaves_no_tmp_residue() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().to_path_buf());
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![CANONICAL_FILE.to_string()]);
    }
}
