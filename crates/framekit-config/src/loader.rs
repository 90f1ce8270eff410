//! File-backed partition loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use framekit_core::AppResult;
use framekit_core::traits::PartitionSource;
use framekit_core::types::Value;

/// File extensions probed for a partition, in order.
const EXTENSIONS: [&str; 5] = ["toml", "json", "yaml", "yml", "ini"];

/// Reads `<dir>/<partition>.<ext>` through the `config` crate.
#[derive(Debug, Clone)]
pub struct FileLoader {
    dir: PathBuf,
}

impl FileLoader {
    /// Creates a loader rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory partitions are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The first existing file for `name`.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl PartitionSource for FileLoader {
    fn load_partition(&self, name: &str) -> AppResult<Option<Value>> {
        let Some(path) = self.locate(name) else {
            debug!(dir = %self.dir.display(), partition = name, "No partition file");
            return Ok(None);
        };

        let json: serde_json::Value = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()?
            .try_deserialize()?;

        debug!(path = %path.display(), partition = name, "Partition file loaded");
        Ok(Some(Value::from(json)))
    }
}

#[cfg(test)]
mod tests {
    use framekit_core::error::ErrorKind;
    use framekit_core::types::Key;

    use super::*;

    #[test]
    fn test_loads_toml_partition() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            temp.path().join("filter.toml"),
            "[system]\nrequired_versions = \"5\"\n\n[nested]\nlist = [1, 2]\n",
        )
        .expect("write");

        let loader = FileLoader::new(temp.path());
        let value = loader.load_partition("filter").expect("load").expect("present");
        let map = value.as_map().expect("map");
        assert!(map.contains_key(&Key::from("system")));
        assert_eq!(
            map.get(&Key::from("nested"))
                .and_then(Value::as_map)
                .and_then(|nested| nested.get(&Key::from("list"))),
            Some(&Value::list([1, 2]))
        );
    }

    #[test]
    fn test_missing_partition_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let loader = FileLoader::new(temp.path());
        assert!(loader.load_partition("absent").expect("load").is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("broken.json"), "{ not json").expect("write");
        let err = FileLoader::new(temp.path())
            .load_partition("broken")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
