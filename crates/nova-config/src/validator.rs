//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_recorder(config, &mut result);
        Self::validate_surface(config, &mut result);
        Self::validate_retry(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_recorder(config: &Config, result: &mut ValidationResult) {
        let recorder = &config.recorder;

        for (path, value) in [
            ("recorder.input_dedup_ms", recorder.input_dedup_ms),
            ("recorder.cascade_dedup_ms", recorder.cascade_dedup_ms),
            ("recorder.input_debounce_ms", recorder.input_debounce_ms),
        ] {
            if value == 0 {
                result.add_error(ValidationError::new(path, "Window must be greater than 0"));
            }
        }

        if recorder.cascade_dedup_ms > recorder.input_dedup_ms {
            result.add_warning(ValidationWarning::new(
                "recorder.cascade_dedup_ms",
                "Cascade window is longer than the input window",
            ));
        }

        if recorder.attach_retry_delays_ms.is_empty() {
            result.add_warning(ValidationWarning::new(
                "recorder.attach_retry_delays_ms",
                "No retries scheduled; late popups and iframes will not be instrumented",
            ));
        }

        if recorder.highlight_class.trim().is_empty()
            || recorder.highlight_class.contains(char::is_whitespace)
        {
            result.add_error(ValidationError::new(
                "recorder.highlight_class",
                "Highlight class must be a single non-empty class name",
            ));
        }
    }

    fn validate_surface(config: &Config, result: &mut ValidationResult) {
        let surface = &config.surface;

        if surface.debug_port == 0 {
            result.add_error(ValidationError::new("surface.debug_port", "Port cannot be 0"));
        }

        if surface.binding_name.is_empty() {
            result.add_error(ValidationError::new(
                "surface.binding_name",
                "Binding name cannot be empty",
            ));
        } else if !is_js_identifier(&surface.binding_name) {
            result.add_error(ValidationError::new(
                "surface.binding_name",
                format!("'{}' is not a valid JavaScript identifier", surface.binding_name),
            ));
        }

        if surface.viewport_width == 0 || surface.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "surface.viewport",
                "Viewport dimensions must be greater than 0",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.max_attempts > 10 {
            result.add_warning(ValidationWarning::new(
                "retry.max_attempts",
                "More than 10 retries will keep a failing page busy for a long time",
            ));
        }
        if config.retry.max_attempts > 0 && config.retry.base_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "retry.base_delay_ms",
                "Retries without backoff",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!("Unknown level '{}', treated as a filter directive", config.logging.level),
            ));
        }
    }
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
