//! Transformer configuration.

/// Configuration shared by the standard transformers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformerConfig {
    /// Accepted input patterns for dates, tried in order.
    pub date_formats: Vec<String>,
    /// Accepted input patterns for date-times, tried in order.
    pub date_time_formats: Vec<String>,
    /// Accepted input patterns for times of day, tried in order.
    pub time_formats: Vec<String>,
    /// Pattern used to render dates in range errors.
    pub display_date_format: String,
    /// Pattern used to render date-times in range errors.
    pub display_date_time_format: String,
    /// Whether date-times keep their seconds. If false, seconds and
    /// fractions are zeroed.
    pub keep_seconds: bool,
    /// Whether strings are trimmed, with blank strings becoming null.
    pub trim_strings: bool,
    /// Whether string transformers expand macros.
    pub expand_macros: bool,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            date_formats: vec!["%Y-%m-%d".to_string(), "%d/%m/%Y".to_string()],
            date_time_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%d/%m/%Y %H:%M:%S".to_string(),
                "%d/%m/%Y %H:%M".to_string(),
            ],
            time_formats: vec!["%H:%M:%S".to_string(), "%H:%M".to_string()],
            display_date_format: "%d/%m/%Y".to_string(),
            display_date_time_format: "%d/%m/%Y %H:%M".to_string(),
            keep_seconds: true,
            trim_strings: true,
            expand_macros: true,
        }
    }
}

impl TransformerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted date patterns.
    #[must_use]
    pub fn with_date_formats(mut self, formats: &[&str]) -> Self {
        self.date_formats = formats.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the accepted date-time patterns.
    #[must_use]
    pub fn with_date_time_formats(mut self, formats: &[&str]) -> Self {
        self.date_time_formats = formats.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the accepted time patterns.
    #[must_use]
    pub fn with_time_formats(mut self, formats: &[&str]) -> Self {
        self.time_formats = formats.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the display patterns used in range errors.
    #[must_use]
    pub fn with_display_formats(mut self, date: &str, date_time: &str) -> Self {
        self.display_date_format = date.to_string();
        self.display_date_time_format = date_time.to_string();
        self
    }

    /// Sets whether date-times keep their seconds.
    #[must_use]
    pub fn with_keep_seconds(mut self, keep: bool) -> Self {
        self.keep_seconds = keep;
        self
    }

    /// Sets whether strings are trimmed.
    #[must_use]
    pub fn with_trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }

    /// Sets whether string transformers expand macros.
    #[must_use]
    pub fn with_expand_macros(mut self, expand: bool) -> Self {
        self.expand_macros = expand;
        self
    }
}
