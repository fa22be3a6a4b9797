use std::path::{Path, PathBuf};

use plant_common::catalog::DiseaseCatalog;
use plant_common::faq::FaqMatcher;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Web application (upload form, result page, chatbot API).
    Http,
    /// MCP tool server on stdio.
    Mcp,
}

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    /// Directory uploaded images are written to. Served under `/static/uploads`.
    pub upload_dir: PathBuf,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    /// Replacement for the embedded disease catalog. `None` uses the built-in data.
    pub catalog_path: Option<PathBuf>,
    /// Replacement for the embedded FAQ list. `None` uses the built-in data.
    pub faq_path: Option<PathBuf>,
}

impl Config {
    /// All variables are optional:
    /// - `PLANT_DOCTOR_MODE`: `http` (default) or `mcp`
    /// - `HOST` (default "0.0.0.0"), `PORT` (default 5000)
    /// - `UPLOAD_DIR` (default "static/uploads")
    /// - `MAX_UPLOAD_BYTES` (default 16 MiB)
    /// - `DISEASE_CATALOG_PATH`, `FAQ_PATH`: JSON files overriding the built-in data
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mode = match var("PLANT_DOCTOR_MODE").as_deref().map(str::trim) {
            None | Some("") => Mode::Http,
            Some(m) if m.eq_ignore_ascii_case("http") => Mode::Http,
            Some(m) if m.eq_ignore_ascii_case("mcp") => Mode::Mcp,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "PLANT_DOCTOR_MODE must be 'http' or 'mcp', got '{other}'"
                )));
            }
        };

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::Config(format!("PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "MAX_UPLOAD_BYTES must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let upload_dir = PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()));

        let catalog_path = var("DISEASE_CATALOG_PATH").map(PathBuf::from);
        let faq_path = var("FAQ_PATH").map(PathBuf::from);
        for path in catalog_path.iter().chain(faq_path.iter()) {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "data file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            mode,
            host,
            port,
            upload_dir,
            max_upload_bytes,
            catalog_path,
            faq_path,
        })
    }

    pub fn load_catalog(&self) -> Result<DiseaseCatalog, AppError> {
        match &self.catalog_path {
            Some(path) => Ok(DiseaseCatalog::from_json(&read_data_file(path)?)?),
            None => Ok(DiseaseCatalog::builtin()?),
        }
    }

    pub fn load_faq(&self) -> Result<FaqMatcher, AppError> {
        match &self.faq_path {
            Some(path) => Ok(FaqMatcher::from_json(&read_data_file(path)?)?),
            None => Ok(FaqMatcher::builtin()?),
        }
    }
}

fn read_data_file(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })
}
