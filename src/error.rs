//! Error types for the gfont CLI.

use std::{env::VarError, io, path::PathBuf, process::ExitCode, result::Result as StdResult};

use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for gfont operations.
pub type Result<T> = StdResult<T, Error>;

/// Failures reported by an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The server answered with a non-success status code.
    #[error("server returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The request never produced a response (timeout, DNS, connection reset).
    #[error("{message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

/// Errors that can occur while running the CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// User input did not resolve to any catalog family.
    #[error("Family '{name}' cannot be found")]
    FamilyNotFound {
        /// Raw family name as typed by the user.
        name: String,
    },
    /// A style/weight token is not one of the recognized variants.
    #[error("Font variant '{variant}' is not valid")]
    InvalidVariant {
        /// Variant token as given.
        variant: String,
    },
    /// The family exists but does not ship the requested variant.
    #[error("Family '{family}' has no variant '{variant}'")]
    VariantUnavailable {
        /// Canonical family name.
        family: String,
        /// Normalized variant token.
        variant: String,
    },
    /// The catalog listing or per-family metadata request failed.
    #[error("Fetching {url} failed: {source}")]
    CatalogFetch {
        /// Requested URL.
        url: String,
        /// Underlying HTTP failure.
        source: HttpError,
    },
    /// A catalog response could not be decoded.
    #[error("Invalid catalog response from {url}: {source}")]
    CatalogParse {
        /// Requested URL.
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("Failed to set up HTTP client: {source}")]
    HttpSetup {
        /// Underlying client error.
        source: HttpError,
    },
    /// Family metadata could not be encoded for output.
    #[error("Failed to encode metadata for '{family}': {source}")]
    MetadataEncode {
        /// Canonical family name.
        family: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A single font file exhausted its retry budget.
    #[error("Downloading {url} failed after {attempts} attempts: {source}")]
    FontFetch {
        /// Requested URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Last HTTP failure observed.
        source: HttpError,
    },
    /// An external helper program is not installed.
    #[error("`{program}` is not installed, skipping")]
    ExternalToolMissing {
        /// Program that could not be found.
        program: String,
    },
    /// An external helper program ran but failed.
    #[error("`{program}` failed: {message}")]
    ExternalToolFailed {
        /// Program that failed.
        program: String,
        /// Exit status or spawn error.
        message: String,
    },
    /// An external command string could not be parsed.
    #[error("Invalid command `{command}`: {message}")]
    CommandParse {
        /// Command string from the config.
        command: String,
        /// Parse error message.
        message: String,
    },
    /// The configuration file could not be read.
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        source: TomlError,
    },
    /// A configuration value is out of range.
    #[error("Invalid value for `{key}` in config: {message}")]
    ConfigValue {
        /// Config key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
    /// Home directory resolution failed.
    #[error("Failed to resolve the home directory.")]
    HomeDirMissing,
    /// A configured path could not be expanded.
    #[error("Invalid path in config: {path}: {source}")]
    PathExpansion {
        /// Input path that failed to expand.
        path: String,
        /// Underlying expansion error.
        source: shellexpand::LookupError<VarError>,
    },
    /// A cache file could not be written.
    #[error("Failed to write cache file at {path}: {source}")]
    CacheWrite {
        /// Path of the cache file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A cached snapshot could not be serialized.
    #[error("Failed to serialize cache file at {path}: {source}")]
    CacheSerialize {
        /// Path of the cache file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A font or manifest file could not be written.
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A file could not be read back for packaging.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A directory could not be read or removed.
    #[error("Failed to access directory {path}: {source}")]
    DirAccess {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A manifest file name tried to escape the family directory.
    #[error("Refusing to write manifest file '{filename}' outside the family directory")]
    UnsafeFileName {
        /// Offending file name.
        filename: String,
    },
    /// A URL could not be built or parsed.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL.
        url: String,
    },
    /// A built-in text pattern failed to compile.
    #[error("Invalid text pattern: {source}")]
    InvalidPattern {
        /// Underlying regex error.
        source: regex::Error,
    },
    /// An interactive prompt was interrupted or canceled.
    #[error("Prompt canceled.")]
    PromptCanceled,
    /// An interactive prompt failed.
    #[error("Prompt failed: {message}")]
    PromptFailed {
        /// Error message describing the prompt failure.
        message: String,
    },
    /// Failed to create a ZIP archive.
    #[error("Failed to create ZIP archive at {path}: {message}")]
    ZipCreate {
        /// Path to the ZIP file.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// A worker task panicked or was cancelled.
    #[error("Download worker stopped unexpectedly: {message}")]
    WorkerJoin {
        /// Join error description.
        message: String,
    },
}

impl Error {
    /// Map errors to exit codes for CLI termination.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(1)
    }
}
