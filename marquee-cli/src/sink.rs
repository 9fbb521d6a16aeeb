use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use marquee_core::{MovieRecord, RecordSink, SinkError};

/// Writes records as a pretty-printed JSON array, replacing the file.
pub(crate) struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn accept(&mut self, records: &[MovieRecord]) -> Result<usize, SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("movies.json");

        let mut heat = MovieRecord::new(10);
        heat.title = "Heat".into();
        heat.genre_names = vec!["Action".into()];
        let records = vec![heat, MovieRecord::new(20)];

        let mut sink = JsonFileSink::new(&path);
        assert_eq!(sink.accept(&records).unwrap(), 2);

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let back: Vec<MovieRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn empty_batch_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");

        let mut sink = JsonFileSink::new(&path);
        assert_eq!(sink.accept(&[]).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}
