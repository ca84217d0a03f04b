//! Assembly artifacts and where they go
//!
//! Each compiled class becomes one artifact: an ordered sequence of text
//! lines forming a stack-machine assembly module, identified by the class
//! name. Sinks accept finished artifacts; compilation itself never touches
//! storage.

use std::fs;
use std::io;
use std::path::PathBuf;

/// One assembly module, named after its class.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub lines: Vec<String>,
}

impl Artifact {
    /// The artifact as a single newline-terminated string.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Accepts finished artifacts. Writing is write-once per compilation run;
/// a re-run overwrites prior artifacts of the same name.
pub trait ArtifactSink {
    fn write(&mut self, artifact: &Artifact) -> io::Result<()>;
}

/// Keeps artifacts in memory, for tests and in-process consumers.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// All artifacts written so far, in write order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Find an artifact by class name.
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> io::Result<()> {
        // Same-name artifacts replace earlier ones, like files would.
        self.artifacts.retain(|a| a.name != artifact.name);
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

/// Writes `<name>.j` files into a directory.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Create a sink rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(DirSink { dir })
    }
}

impl ArtifactSink for DirSink {
    fn write(&mut self, artifact: &Artifact) -> io::Result<()> {
        let path = self.dir.join(format!("{}.j", artifact.name));
        log::debug!("writing artifact {:?}", path);
        fs::write(path, artifact.text())
    }
}
