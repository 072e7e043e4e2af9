use console::style;
use geomap_core::GeomapError;
use std::fmt;

/// Error with context and suggestions for the terminal
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing language model key
pub fn missing_api_key(reason: &str) -> CliError {
    CliError::new("Language model not configured")
        .with_context(format!("The ask command needs a Gemini API key.\n\nReason: {}", reason))
        .with_suggestion("Set the key: export GENAI_API_KEY=\"...\"")
        .with_suggestion("Or add to geomap.toml:\n  [llm]\n  api_key = \"...\"")
        .with_suggestion("Or render without the model: geomap render <dataset> --column <name>")
        .with_help("Run: geomap inspect config")
}

/// Create error for a column missing from the dataset
pub fn column_not_found(column: &str, available: &[String]) -> CliError {
    CliError::new(format!("Column '{}' not found", column))
        .with_context(format!("Available columns: {}", available.join(", ")))
        .with_suggestion("Check the column name; matching is exact")
        .with_help("Run: geomap inspect file <dataset>")
}

/// Create error for a file type with no reader
pub fn unsupported_file(extension: &str, supported: &[String]) -> CliError {
    CliError::new("Unsupported file type")
        .with_context(format!("No reader handles '.{}' files.\n\nSupported: {}", extension, supported.join(", ")))
        .with_suggestion("Convert the file to GeoJSON, Shapefile or GeoTIFF")
}

/// Create error for a spectral index that is not supported
pub fn unsupported_index(name: &str) -> CliError {
    CliError::new(format!("Unsupported index type '{}'", name))
        .with_suggestion("Use one of: NDVI, NDWI, SAWI")
        .with_help("Run: geomap index --help")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(err) = error.downcast_ref::<GeomapError>() {
        match err {
            GeomapError::LlmUnavailable { reason, .. } => return missing_api_key(reason),
            GeomapError::ColumnNotFound { column, available } => return column_not_found(column, available),
            GeomapError::UnsupportedFormat { extension, supported } => {
                return unsupported_file(extension, supported)
            }
            GeomapError::UnsupportedIndex { name } => return unsupported_index(name),
            _ => {}
        }
    }

    let message = format!("{:#}", error);
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("ermission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
