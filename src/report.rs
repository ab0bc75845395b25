use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{error::Result, track::TrackSnapshot};

const UNKNOWN_CLASS: &str = "unknown";

/// Class-name table indexed by detector class id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// One name per line; blank lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut names = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        Ok(Self::new(names))
    }

    pub fn name(&self, class_id: u32) -> &str {
        self.names
            .get(class_id as usize)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CLASS)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Writes confirmed tracks as `frame,track_id,x,y,width,height,confidence,class` lines.
pub struct MotWriter<W: Write> {
    writer: W,
    class_names: ClassNames,
}

impl<W: Write> MotWriter<W> {
    pub fn new(writer: W, class_names: ClassNames) -> Self {
        Self {
            writer,
            class_names,
        }
    }

    pub fn write_frame(&mut self, frame_index: u64, tracks: &[TrackSnapshot]) -> Result<()> {
        for track in tracks {
            writeln!(
                self.writer,
                "{},{},{:.2},{:.2},{:.2},{:.2},{:.4},{}",
                frame_index,
                track.track_id,
                track.bbox.x,
                track.bbox.y,
                track.bbox.width,
                track.bbox.height,
                track.confidence,
                self.class_names.name(track.class_id)
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
