use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{ConfigError, FetchError},
    table::{Row, parse_table},
};

/// Where the program CSV comes from. Every call fetches fresh text.
pub trait ProgramSource {
    fn fetch(&self) -> Result<String, FetchError>;

    fn describe(&self) -> String;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl ProgramSource for FileSource {
    fn fetch(&self) -> Result<String, FetchError> {
        let bytes = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FetchError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                FetchError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        String::from_utf8(bytes).map_err(|_| FetchError::InvalidText {
            path: self.path.clone(),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Program text already in memory, e.g. piped in on stdin.
pub struct MemorySource {
    text: Option<String>,
}

impl MemorySource {
    pub fn new(text: impl Into<String>) -> Self {
        MemorySource {
            text: Some(text.into()),
        }
    }

    /// A source whose fetch always fails.
    #[cfg(test)]
    pub fn failing() -> Self {
        MemorySource { text: None }
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, FetchError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| FetchError::Read {
                path: PathBuf::from("-"),
                source,
            })?;
        let text = String::from_utf8(bytes).map_err(|_| FetchError::InvalidText {
            path: PathBuf::from("-"),
        })?;
        Ok(MemorySource::new(text))
    }
}

impl ProgramSource for MemorySource {
    fn fetch(&self) -> Result<String, FetchError> {
        self.text.clone().ok_or_else(|| FetchError::NotFound {
            path: PathBuf::from("-"),
        })
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

/// Opens `-` as stdin and anything else as a file.
pub fn open_source(path: &Path) -> Result<Box<dyn ProgramSource>, FetchError> {
    if path == Path::new("-") {
        return Ok(Box::new(MemorySource::from_reader(io::stdin().lock())?));
    }
    Ok(Box::new(FileSource::new(path)))
}

pub fn load_rows(source: &dyn ProgramSource, delimiter: char) -> Result<Vec<Row>, FetchError> {
    let text = source.fetch()?;
    Ok(parse_table(&text, delimiter))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "eventpage", "eventpage")
}

pub fn get_config_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        let dir = proj_dirs.config_dir().to_path_buf();
        fs::create_dir_all(&dir).ok();
        dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
    }
    PathBuf::from(".")
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

pub fn get_log_path() -> PathBuf {
    get_state_dir().join("eventpage.log")
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, &json)
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    atomic_write(path, content)
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(write_error)?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(write_error)?;
    tmp_file.sync_all().map_err(write_error)?;
    fs::rename(&tmp_path, path).map_err(write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use serde::{Deserialize, Serialize};

    use super::*;

    fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}.{}", prefix, now, extension))
    }

    #[test]
    fn test_file_source_reads_fresh_text() {
        let path = unique_path("eventpage_program", "csv");
        fs::write(&path, "year;month\n2025;Marzo\n").unwrap();
        let source = FileSource::new(&path);

        assert_eq!(load_rows(&source, ';').unwrap().len(), 1);

        fs::write(&path, "year;month\n2025;Marzo\n2025;Aprile\n").unwrap();
        assert_eq!(load_rows(&source, ';').unwrap().len(), 2);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = FileSource::new(unique_path("eventpage_missing", "csv"));
        assert!(matches!(source.fetch(), Err(FetchError::NotFound { .. })));
    }

    #[test]
    fn test_file_source_rejects_invalid_utf8() {
        let path = unique_path("eventpage_binary", "csv");
        fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();

        let source = FileSource::new(&path);
        assert!(matches!(source.fetch(), Err(FetchError::InvalidText { .. })));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::from_reader("year\n2025\n".as_bytes()).unwrap();
        assert_eq!(load_rows(&source, ';').unwrap()[0].get("year"), "2025");
        assert!(MemorySource::failing().fetch().is_err());
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestJsonValue {
        name: String,
        count: usize,
    }

    #[test]
    fn test_json_helper_round_trip() {
        let path = unique_path("eventpage_json_roundtrip", "json");
        let value = TestJsonValue {
            name: "sample".to_string(),
            count: 3,
        };

        write_json_atomic(&path, &value).unwrap();
        let loaded: TestJsonValue = read_json(&path).unwrap();
        assert_eq!(loaded, value);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_json_reports_bad_content() {
        let path = unique_path("eventpage_bad_json", "json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<TestJsonValue, ConfigError> = read_json(&path);
        assert!(matches!(result, Err(ConfigError::Json { .. })));

        fs::remove_file(path).ok();
    }
}
