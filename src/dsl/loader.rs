//! Rule Directory Loader
//!
//! Accumulates rules, identities and key binds across any number of rule files.
//! Identities are shared between files; symbol tables are not.

use super::parser::RuleParser;
use crate::core::error::{LoadError, ParseError};
use crate::model::{IdentityRegistry, KeyBindRegistry, Rule};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of loading one file.
#[derive(Debug)]
pub struct FileReport {
    pub file: String,
    /// Rules kept, mirrors included.
    pub rules: usize,
    pub mirrored: usize,
    pub diagnostics: Vec<ParseError>,
    pub aborted: bool,
}

/// Everything the loader produced, ready to hand to the engine.
#[derive(Debug, Default)]
pub struct RuleBook {
    pub rules: Vec<Rule>,
    pub identities: IdentityRegistry,
    pub binds: KeyBindRegistry,
}

#[derive(Default)]
pub struct RuleLoader {
    book: RuleBook,
}

impl RuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one file's text and keep whatever rules survive.
    pub fn load_str(&mut self, name: &str, text: &str) -> FileReport {
        let RuleBook {
            rules,
            identities,
            binds,
        } = &mut self.book;
        let parsed = RuleParser::new(identities, binds).parse(name, text);

        let report = FileReport {
            file: name.to_string(),
            rules: parsed.rules.len(),
            mirrored: parsed.mirrored_count(),
            diagnostics: parsed.diagnostics,
            aborted: parsed.aborted,
        };
        rules.extend(parsed.rules);

        if report.aborted {
            warn!(
                "[Rules] {}: loading aborted, kept {} rules read before the error",
                name, report.rules
            );
        }
        info!(
            "[Rules] {}: {} rules ({} mirrored), {} diagnostics",
            name,
            report.rules,
            report.mirrored,
            report.diagnostics.len()
        );
        report
    }

    /// Load every regular file in `dir`, in directory-listing order.
    ///
    /// Only a missing or unlistable directory is an error. Unreadable files are
    /// logged and skipped.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<Vec<FileReport>, LoadError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| LoadError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut reports = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(source) => {
                    warn!(
                        "[Rules] {}",
                        LoadError::Directory {
                            path: dir.to_path_buf(),
                            source
                        }
                    );
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(source) => {
                    warn!("[Rules] {}", LoadError::File { path, source });
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            reports.push(self.load_str(&name, &text));
        }

        info!(
            "📜 [Rules] Loaded {} files from {}: {} rules, {} identities, {} key binds",
            reports.len(),
            dir.display(),
            self.book.rules.len(),
            self.book.identities.len(),
            self.book.binds.len()
        );
        Ok(reports)
    }

    pub fn rule_count(&self) -> usize {
        self.book.rules.len()
    }

    pub fn finish(self) -> RuleBook {
        self.book
    }
}
