//! Tables shipped with the `tabs` binary.
//!
//! `People` reads a CSV file named by the `path` kwarg; `Adults` builds on
//! `People` and keeps rows whose `age` is at least `min_age` (default 18).
//! Both store artifacts under the `cache_dir` kwarg, which is not part of
//! their fingerprints.

use std::path::{Path, PathBuf};

use tabs_common::{Kwargs, Value};
use tabs_table::{
    BoxError, Catalog, Definition, FetchOptions, Frame, PostProcessor, Registry, RegistryError,
    Table, TableDef, TableError,
};

use crate::project::{CACHE_DIR_KWARG, EXTENSION_KWARG};

/// Every table this binary knows about.
pub fn catalog() -> Catalog {
    Catalog::new().with::<People>().with::<Adults>()
}

/// The registry of tables declared in this module.
pub fn registry() -> Result<Registry, RegistryError> {
    Registry::discover(&catalog(), module_path!())
}

const LOCATION_KEYS: &[&str] = &[CACHE_DIR_KWARG, EXTENSION_KWARG];

/// `<cache_dir>/<base>_<fingerprint>.<extension>` for `table`.
fn artifact_path(table: &dyn Table, base: &str) -> Result<PathBuf, TableError> {
    let kwargs = table.kwargs();
    let dir = kwargs.get_str(CACHE_DIR_KWARG)?.unwrap_or(".tabs-cache");
    let ext = kwargs.get_str(EXTENSION_KWARG)?.unwrap_or("tab");
    let name = table.cached_filename(base, ext, None)?;
    Ok(Path::new(dir).join(name))
}

/// Reads a comma-separated file with a header row.
fn read_csv(path: &Path) -> Result<Frame, BoxError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| format!("{} has no header row", path.display()))?;
    let mut frame = Frame::new(header.split(',').map(str::trim))?;
    for line in lines {
        frame.push_row(line.split(',').map(Value::parse).collect())?;
    }
    Ok(frame)
}

/// People listed in a CSV file.
pub struct People {
    kwargs: Kwargs,
}

impl TableDef for People {
    const NAME: &'static str = "People";
    const DOC: &'static str = "People read from the CSV file given by the `path` kwarg";

    fn new(kwargs: Kwargs) -> Self {
        Self { kwargs }
    }
}

impl Table for People {
    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    fn source(&self) -> Result<Frame, BoxError> {
        let path = self.kwargs.get_str("path")?.ok_or(TableError::MissingKwarg {
            table: Self::NAME,
            key: "path",
        })?;
        read_csv(Path::new(path))
    }

    fn post_processors(&self) -> Vec<PostProcessor> {
        vec![PostProcessor::new(
            "drop_empty_rows",
            "Removes rows in which every value is missing",
            |mut frame: Frame| {
                frame.retain_rows(|row| !row.iter().all(Value::is_null));
                Ok(frame)
            },
        )]
    }

    fn location_keys(&self) -> &[&str] {
        LOCATION_KEYS
    }

    fn output(&self) -> Result<PathBuf, TableError> {
        artifact_path(self, "people")
    }
}

/// People at or above a minimum age.
pub struct Adults {
    kwargs: Kwargs,
}

impl TableDef for Adults {
    const NAME: &'static str = "Adults";
    const DOC: &'static str = "People whose age is at least `min_age` (default 18)";

    fn new(kwargs: Kwargs) -> Self {
        Self { kwargs }
    }
}

impl Table for Adults {
    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    fn source(&self) -> Result<Frame, BoxError> {
        let kwargs = self.dependency_kwargs(Definition::of::<People>());
        let people = People::new(kwargs).fetch(FetchOptions::default())?;
        Ok(people.into_data())
    }

    /// Everything except `min_age`, which only affects this table.
    fn dependency_kwargs(&self, _dependency: Definition) -> Kwargs {
        self.kwargs.without(&["min_age"])
    }

    fn source_dependencies(&self) -> Vec<Definition> {
        vec![Definition::of::<People>()]
    }

    fn post_processors(&self) -> Vec<PostProcessor> {
        let min_age = self
            .kwargs
            .get("min_age")
            .and_then(Value::as_int)
            .unwrap_or(18);
        vec![PostProcessor::new(
            "drop_minors",
            "Keeps rows whose age is known and at least min_age",
            move |mut frame: Frame| {
                let idx = frame
                    .column_index("age")
                    .ok_or_else(|| tabs_table::FrameError::UnknownColumn("age".to_string()))?;
                frame.retain_rows(|row| row[idx].as_int().is_some_and(|age| age >= min_age));
                Ok(frame)
            },
        )]
    }

    fn location_keys(&self) -> &[&str] {
        LOCATION_KEYS
    }

    fn output(&self) -> Result<PathBuf, TableError> {
        artifact_path(self, "adults")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabs_table::FetchState;

    const CSV: &str = "first,last,age\nAda,Lovelace,36\nTim,Berners,12\n,,\nGrace,Hopper,\n";

    fn setup() -> (tempfile::TempDir, Kwargs) {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("people.csv");
        std::fs::write(&csv, CSV).unwrap();
        let kwargs = Kwargs::new()
            .with("path", csv.display().to_string())
            .with(CACHE_DIR_KWARG, dir.path().join("cache").display().to_string());
        (dir, kwargs)
    }

    #[test]
    fn registry_has_both_tables() {
        let registry = registry().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Adults", "People"]);
    }

    #[test]
    fn people_drops_empty_rows() {
        let (_dir, kwargs) = setup();
        let data = People::new(kwargs)
            .fetch(FetchOptions::default())
            .unwrap()
            .into_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data.columns(), &["first", "last", "age"]);
        assert_eq!(data.value(2, "age"), Some(&Value::Null));
    }

    #[test]
    fn adults_filters_by_min_age() {
        let (_dir, kwargs) = setup();
        let data = Adults::new(kwargs.clone().with("min_age", 30i64))
            .fetch(FetchOptions::default())
            .unwrap()
            .into_data();
        assert_eq!(data.len(), 1);
        assert_eq!(data.value(0, "first"), Some(&Value::from("Ada")));

        let teens = Adults::new(kwargs.with("min_age", 10i64))
            .fetch(FetchOptions::default())
            .unwrap();
        assert_eq!(teens.data.len(), 2);
    }

    #[test]
    fn adults_reuses_cached_people() {
        let (_dir, kwargs) = setup();
        let people = People::new(kwargs.clone())
            .fetch(FetchOptions::default())
            .unwrap();
        assert_eq!(people.state(), FetchState::Persisted);

        // min_age is not forwarded, so People resolves to the same artifact
        let adults = Adults::new(kwargs.with("min_age", 21i64));
        let forwarded = adults.dependency_kwargs(Definition::of::<People>());
        assert_eq!(People::new(forwarded).output().unwrap(), people.location);
    }

    #[test]
    fn cache_location_is_not_fingerprinted() {
        let (dir, kwargs) = setup();
        let here = People::new(kwargs.clone()).output().unwrap();
        let moved = People::new(
            kwargs
                .with(CACHE_DIR_KWARG, dir.path().join("moved").display().to_string())
                .with(EXTENSION_KWARG, "bin"),
        )
        .output()
        .unwrap();
        assert_ne!(here.parent(), moved.parent());
        assert_eq!(here.file_stem(), moved.file_stem());
        assert_eq!(moved.extension().and_then(|e| e.to_str()), Some("bin"));
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let kwargs = Kwargs::new().with(CACHE_DIR_KWARG, dir.path().display().to_string());
        let err = People::new(kwargs)
            .fetch(FetchOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("requires keyword argument 'path'"));
    }

    #[test]
    fn ragged_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("bad.csv");
        std::fs::write(&csv, "a,b\n1,2,3\n").unwrap();
        let err = read_csv(&csv).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }
}
