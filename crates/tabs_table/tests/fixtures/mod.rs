//! Table definitions shared by the integration tests.
//!
//! Each table counts how often its source and post-processors run, keyed by
//! the `cache_dir` kwarg so that tests using separate temporary directories
//! never see each other's counts.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tabs_table::{
    BoxError, Definition, FetchOptions, Frame, Kwargs, PostProcessor, Table, TableDef, TableError,
    Value,
};

/// Module path the fixture tables are declared in.
pub const MODULE: &str = module_path!();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub source: usize,
    pub processors: usize,
}

static CALLS: Mutex<BTreeMap<String, Calls>> = Mutex::new(BTreeMap::new());

pub fn calls(cache_dir: &Path) -> Calls {
    CALLS
        .lock()
        .unwrap()
        .get(&cache_dir.display().to_string())
        .copied()
        .unwrap_or_default()
}

fn record(key: &str, update: impl FnOnce(&mut Calls)) {
    update(CALLS.lock().unwrap().entry(key.to_string()).or_default());
}

fn counter_key(kwargs: &Kwargs) -> String {
    kwargs
        .get_str("cache_dir")
        .ok()
        .flatten()
        .unwrap_or_default()
        .to_string()
}

fn cache_dir(kwargs: &Kwargs) -> Result<PathBuf, TableError> {
    Ok(kwargs
        .get_str("cache_dir")?
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir))
}

pub fn kwargs_for(dir: &Path) -> Kwargs {
    Kwargs::new().with("cache_dir", dir.display().to_string())
}

pub struct TestTableOne {
    kwargs: Kwargs,
}

impl TableDef for TestTableOne {
    const NAME: &'static str = "TestTableOne";
    const DOC: &'static str = "Class for testing table loader";

    fn new(kwargs: Kwargs) -> Self {
        Self { kwargs }
    }
}

impl Table for TestTableOne {
    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    fn source(&self) -> Result<Frame, BoxError> {
        record(&counter_key(&self.kwargs), |c| c.source += 1);
        let frame = Frame::from_rows(
            ["first", "last", "birth_year", "age"],
            vec![
                vec!["Ada".into(), "Lovelace".into(), Value::Int(1815), Value::Int(99)],
                vec!["Alan".into(), "Turing".into(), Value::Int(1912), Value::Int(12)],
                vec!["Grace".into(), "Hopper".into(), Value::Int(1906), Value::Null],
            ],
        )?;
        Ok(frame)
    }

    fn post_processors(&self) -> Vec<PostProcessor> {
        let key = counter_key(&self.kwargs);
        let reference_year = self
            .kwargs
            .get("reference_year")
            .and_then(Value::as_int)
            .unwrap_or(2000);

        let drop_key = key.clone();
        let drop_age_column = PostProcessor::new(
            "drop_age_column",
            "Drops age from original dataframe because of wrong age ",
            move |mut frame: Frame| {
                record(&drop_key, |c| c.processors += 1);
                frame.drop_column("age")?;
                Ok(frame)
            },
        );

        let calculate_new_age = PostProcessor::new(
            "calculate_new_age",
            "Calculates new age and adds it to the dataframe",
            move |mut frame: Frame| {
                record(&key, |c| c.processors += 1);
                let ages = frame
                    .column("birth_year")?
                    .into_iter()
                    .map(|year| match year.as_int() {
                        Some(year) => Value::Int(reference_year - year),
                        None => Value::Null,
                    })
                    .collect();
                frame.set_column("age", ages)?;
                Ok(frame)
            },
        );

        vec![drop_age_column, calculate_new_age]
    }

    fn output(&self) -> Result<PathBuf, TableError> {
        let name = self.cached_filename("test_table_one", "tab", None)?;
        Ok(cache_dir(&self.kwargs)?.join(name))
    }
}

pub struct TestTableTwo {
    kwargs: Kwargs,
}

impl TableDef for TestTableTwo {
    const NAME: &'static str = "TestTableTwo";
    const DOC: &'static str = "Class for testing tables loader";

    fn new(kwargs: Kwargs) -> Self {
        Self { kwargs }
    }
}

impl Table for TestTableTwo {
    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    fn source(&self) -> Result<Frame, BoxError> {
        let kwargs = self.dependency_kwargs(Definition::of::<TestTableOne>());
        let upstream = TestTableOne::new(kwargs).fetch(FetchOptions::default())?;
        Ok(upstream.into_data())
    }

    fn source_dependencies(&self) -> Vec<Definition> {
        vec![Definition::of::<TestTableOne>()]
    }

    fn post_processors(&self) -> Vec<PostProcessor> {
        vec![PostProcessor::new(
            "something_does_nothing",
            "Returns the table unchanged",
            |frame: Frame| Ok(frame),
        )
        .depends_on(Definition::of::<TestTableOne>())]
    }

    fn output(&self) -> Result<PathBuf, TableError> {
        let name = self.cached_filename("test_table_one", "tab", None)?;
        Ok(cache_dir(&self.kwargs)?.join("output").join(name))
    }
}
