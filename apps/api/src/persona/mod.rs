//! Persona Store — the identity the model plays, loaded once at startup.
//!
//! `load_persona` does all file I/O; `PersonaContext` itself is a plain
//! immutable value shared behind an `Arc` by every request.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub mod prompts;

use prompts::persona_system_prompt;

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Failed to extract text from resume PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("Failed to read summary file {path}: {source}")]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaContext {
    name: String,
    resume: String,
    summary: String,
}

impl PersonaContext {
    pub fn new(
        name: impl Into<String>,
        resume: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resume: resume.into(),
            summary: summary.into(),
        }
    }

    /// Builds the system-role instruction text for this persona.
    pub fn system_prompt(&self) -> String {
        persona_system_prompt(&self.name, &self.summary, &self.resume)
    }
}

/// Reads the resume PDF and summary text from disk.
pub fn load_persona(
    name: &str,
    resume_pdf: &Path,
    summary_path: &Path,
) -> Result<PersonaContext, PersonaError> {
    let resume = pdf_extract::extract_text(resume_pdf).map_err(|e| PersonaError::Pdf {
        path: resume_pdf.to_path_buf(),
        message: e.to_string(),
    })?;

    let summary =
        std::fs::read_to_string(summary_path).map_err(|source| PersonaError::Summary {
            path: summary_path.to_path_buf(),
            source,
        })?;

    info!(
        "Persona loaded for {name}: resume {} chars, summary {} chars",
        resume.len(),
        summary.len()
    );

    Ok(PersonaContext::new(name, resume, summary))
}
