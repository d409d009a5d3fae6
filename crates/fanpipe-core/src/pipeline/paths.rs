//! Output path derivation.
//!
//! Matching works on whole path components, so `images` matches
//! `images/x.jpg` and `/data/images/x.jpg` but not `myimages/x.jpg`.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::PipelineError;

/// Rewrites source paths from the input directory to the output directory.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl PathRewrite {
    /// Create a rewrite from `input_dir` segments to `output_dir` segments.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Derive the output path for a source path.
    ///
    /// The first occurrence of the input directory segment is replaced by the
    /// output directory segment; everything before and after it is kept.
    pub fn derive(&self, input: &Path) -> Result<PathBuf, PipelineError> {
        let components: Vec<Component<'_>> = input.components().collect();
        let needle: Vec<Component<'_>> = self.input_dir.components().collect();

        // The segment must be a directory, so it may not swallow the file name.
        let haystack = &components[..components.len().saturating_sub(1)];
        let start = find_segment(haystack, &needle).ok_or_else(|| {
            PipelineError::OutsideInputDir {
                path: input.to_path_buf(),
                input_dir: self.input_dir.clone(),
            }
        })?;

        let mut out = PathBuf::new();
        for component in &components[..start] {
            out.push(component);
        }
        out.push(&self.output_dir);
        for component in &components[start + needle.len()..] {
            out.push(component);
        }
        Ok(out)
    }

    /// Whether `path` lies inside the output directory.
    pub fn is_output(&self, path: &Path) -> bool {
        let components: Vec<Component<'_>> = path.components().collect();
        let needle: Vec<Component<'_>> = self.output_dir.components().collect();
        find_segment(&components, &needle).is_some()
    }
}

/// Derive the path of a rotated variant: `x.jpg` becomes `x_<angle>.jpg`.
pub fn derive_rotated(out_path: &Path, angle: u32) -> PathBuf {
    let stem = out_path.file_stem().unwrap_or_default();
    let mut file_name = OsString::from(stem);
    file_name.push(format!("_{angle}"));
    if let Some(ext) = out_path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    out_path.with_file_name(file_name)
}

fn find_segment(haystack: &[Component<'_>], needle: &[Component<'_>]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
