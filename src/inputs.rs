use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Uploadable { mime_type: String },
    Textual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub classification: Classification,
}

impl InputFile {
    pub fn mime_type(&self) -> Option<&str> {
        match &self.classification {
            Classification::Uploadable { mime_type } => Some(mime_type.as_str()),
            Classification::Textual => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBundle {
    pub text_content: Vec<String>,
    pub upload_files: Vec<InputFile>,
}

/// Classifies by file name only; the file itself is never opened.
pub fn classify(path: impl Into<PathBuf>) -> InputFile {
    let path = path.into();
    let classification = match uploadable_mime_type(&path) {
        Some(mime_type) => Classification::Uploadable { mime_type },
        None => Classification::Textual,
    };
    InputFile {
        path,
        classification,
    }
}

// mime_guess reads these as media (`.ts` is MPEG transport stream).
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

const TEXT_LIKE_APPLICATION_SUBTYPES: &[&str] = &[
    "json",
    "xml",
    "javascript",
    "ecmascript",
    "x-javascript",
    "x-sh",
    "x-csh",
    "x-tex",
    "x-latex",
    "x-yaml",
    "yaml",
    "toml",
    "sql",
    "x-sql",
    "graphql",
    "x-httpd-php",
    "x-perl",
    "x-python",
    "x-ruby",
    "x-ndjson",
];

// Top-level types that are uploaded unless they are text-like.
const UPLOADABLE_TOP_LEVEL_TYPES: &[&str] =
    &["image", "audio", "video", "application", "font", "model"];

fn uploadable_mime_type(path: &Path) -> Option<String> {
    let file_name = path.file_name()?;
    let is_source = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if is_source {
        return None;
    }

    let guess = mime_guess::from_path(file_name).first()?;
    is_uploadable(&guess).then(|| guess.essence_str().to_string())
}

fn is_uploadable(mime: &mime_guess::Mime) -> bool {
    let top = mime.type_().as_str();
    if !UPLOADABLE_TOP_LEVEL_TYPES.contains(&top) {
        return false;
    }

    let text_like_suffix = mime
        .suffix()
        .is_some_and(|suffix| matches!(suffix.as_str(), "json" | "xml" | "yaml"));
    let text_like_application =
        top == "application" && TEXT_LIKE_APPLICATION_SUBTYPES.contains(&mime.subtype().as_str());

    !(text_like_suffix || text_like_application)
}

pub fn read_file_contents(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "file not found");
            None
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "error reading file");
            None
        }
    }
}

pub fn fenced(content: &str) -> String {
    format!("```\n{content}\n```")
}

pub fn process_input_files<P: AsRef<Path>>(paths: &[P]) -> InputBundle {
    let mut bundle = InputBundle::default();

    for path in paths {
        let file = classify(path.as_ref());
        match file.classification {
            Classification::Uploadable { ref mime_type } => {
                debug!(path = %file.path.display(), mime_type = %mime_type, "queued file for upload");
                bundle.upload_files.push(file);
            }
            Classification::Textual => match read_file_contents(&file.path) {
                Some(content) if !content.is_empty() => {
                    debug!(
                        path = %file.path.display(),
                        content_len = content.len(),
                        "inlined text file"
                    );
                    bundle.text_content.push(fenced(&content));
                }
                _ => warn!(path = %file.path.display(), "could not read content, skipping"),
            },
        }
    }

    bundle
}
