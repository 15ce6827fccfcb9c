use facemark_core::detector::DEFAULT_MAX_HANDS;

/// Session configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on hands reported per detection pass.
    pub max_hands: usize,
    /// Default stroke width for drawn markers.
    pub line_width: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_hands: DEFAULT_MAX_HANDS,
            line_width: 1.0,
        }
    }
}

impl SessionConfig {
    /// Load configuration from `FACEMARK_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            max_hands: env_usize("FACEMARK_MAX_HANDS", DEFAULT_MAX_HANDS),
            line_width: env_f64("FACEMARK_LINE_WIDTH", 1.0),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
