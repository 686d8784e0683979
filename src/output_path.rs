//! Source and destination path resolution
//!
//! Relative inputs are resolved against a base directory. The destination is
//! an explicit output file, a file inside an output directory, or the source
//! itself for an in-place rewrite.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct OutputPathBuilder {
    base_dir: PathBuf,
    output_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    preserve_dir: bool,
}

impl OutputPathBuilder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn output_file(mut self, output_file: Option<PathBuf>) -> Self {
        self.output_file = output_file;
        self
    }

    pub fn output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Keep the base-relative directory layout of inputs under the output dir.
    pub fn preserve_dir(mut self, preserve_dir: bool) -> Self {
        self.preserve_dir = preserve_dir;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn has_output_file(&self) -> bool {
        self.output_file.is_some()
    }

    /// Absolute (or base-joined) path of an input file.
    pub fn source_for(&self, file: &Path) -> PathBuf {
        self.against_base(file)
    }

    pub fn destination_for(&self, file: &Path) -> PathBuf {
        if let Some(output_file) = &self.output_file {
            return self.against_base(output_file);
        }

        let source = self.source_for(file);
        let Some(output_dir) = &self.output_dir else {
            return source;
        };
        let output_dir = self.against_base(output_dir);

        let relative = if self.preserve_dir {
            source.strip_prefix(&self.base_dir).ok().map(Path::to_path_buf)
        } else {
            None
        };

        match relative.or_else(|| source.file_name().map(PathBuf::from)) {
            Some(relative) => output_dir.join(relative),
            None => output_dir,
        }
    }

    fn against_base(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
