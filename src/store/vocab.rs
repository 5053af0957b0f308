use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One vocabulary pair. Wire names follow the file contract: `en` for the
/// drilled term, `vi` for the translation shown as the prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
    #[serde(rename = "en")]
    pub term: String,
    #[serde(rename = "vi")]
    pub translation: String,
}

/// Owns the vocabulary list and its JSON file. No drill logic lives here;
/// every mutation rewrites the whole file atomically.
pub struct VocabRepository {
    path: Option<PathBuf>,
    items: Vec<VocabItem>,
}

impl VocabRepository {
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyguard")
            .join("vocab.json")
    }

    /// Load from `path`. A missing file or an unparseable document yields an
    /// empty repository; individually malformed records are dropped and the
    /// rest kept.
    pub fn open(path: PathBuf) -> Result<Self> {
        let items = match fs::read_to_string(&path) {
            Ok(content) => parse_lenient(&content),
            Err(_) => Vec::new(),
        };
        Ok(Self {
            path: Some(path),
            items,
        })
    }

    /// A repository with no backing file. Mutations skip persistence.
    #[allow(dead_code)] // Used by tests and benchmarks
    pub fn in_memory(items: Vec<VocabItem>) -> Self {
        Self { path: None, items }
    }

    pub fn items(&self) -> &[VocabItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&VocabItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, term: &str, translation: &str) -> Result<()> {
        self.items.push(VocabItem {
            term: term.to_string(),
            translation: translation.to_string(),
        });
        self.save()
    }

    pub fn update(&mut self, index: usize, term: &str, translation: &str) -> Result<()> {
        if let Some(item) = self.items.get_mut(index) {
            item.term = term.to_string();
            item.translation = translation.to_string();
            self.save()?;
        }
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<()> {
        if index < self.items.len() {
            self.items.remove(index);
            self.save()?;
        }
        Ok(())
    }

    /// Full rewrite through a temp file so a crash mid-write never leaves a
    /// truncated vocabulary behind.
    fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.items)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Accept any record that is an object with string `en` and `vi` fields;
/// everything else is silently dropped.
fn parse_lenient(content: &str) -> Vec<VocabItem> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
        return Vec::new();
    };
    let Some(records) = value.as_array() else {
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| serde_json::from_value::<VocabItem>(record.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> VocabRepository {
        VocabRepository::open(dir.path().join("vocab.json")).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = store_in(&dir);
        assert!(repo.is_empty());
    }

    #[test]
    fn add_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut repo = store_in(&dir);
        repo.add("apple", "quả táo").unwrap();
        repo.add("book", "sách").unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(0).unwrap().term, "apple");
        assert_eq!(reloaded.get(1).unwrap().translation, "sách");
    }

    #[test]
    fn update_and_delete_rewrite_file() {
        let dir = TempDir::new().unwrap();
        let mut repo = store_in(&dir);
        repo.add("aple", "quả táo").unwrap();
        repo.add("book", "sách").unwrap();

        repo.update(0, "apple", "quả táo").unwrap();
        repo.delete(1).unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(0).unwrap().term, "apple");
    }

    #[test]
    fn out_of_range_mutations_are_noops() {
        let dir = TempDir::new().unwrap();
        let mut repo = store_in(&dir);
        repo.add("apple", "quả táo").unwrap();
        repo.update(9, "x", "y").unwrap();
        repo.delete(9).unwrap();
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn malformed_records_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        fs::write(
            &path,
            r#"[
                {"en": "apple", "vi": "quả táo"},
                {"en": "missing translation"},
                "not an object",
                {"en": 7, "vi": "sách"},
                {"en": "book", "vi": "sách"}
            ]"#,
        )
        .unwrap();

        let repo = VocabRepository::open(path).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(0).unwrap().term, "apple");
        assert_eq!(repo.get(1).unwrap().term, "book");
    }

    #[test]
    fn unparseable_document_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(VocabRepository::open(path).unwrap().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut repo = store_in(&dir);
        repo.add("apple", "quả táo").unwrap();
        assert!(dir.path().join("vocab.json").exists());
        assert!(!dir.path().join("vocab.tmp").exists());
    }
}
