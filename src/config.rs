use log::warn;

pub const DEFAULT_RENDER_SCALE: f64 = 1.5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const RENDER_SCALE_VAR: &str = "FIELDSIGN_RENDER_SCALE";
const MAX_UPLOAD_MB_VAR: &str = "FIELDSIGN_MAX_UPLOAD_MB";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Scale the native renderer draws pages at.
    pub render_scale: f64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render_scale: DEFAULT_RENDER_SCALE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(RENDER_SCALE_VAR) {
            match raw.trim().parse::<f64>() {
                Ok(scale) if scale.is_finite() && scale > 0.0 => config.render_scale = scale,
                _ => warn!("ignoring {RENDER_SCALE_VAR}={raw:?}; using {DEFAULT_RENDER_SCALE}"),
            }
        }

        if let Some(raw) = lookup(MAX_UPLOAD_MB_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb.saturating_mul(1024 * 1024),
                _ => warn!("ignoring {MAX_UPLOAD_MB_VAR}={raw:?}; using default limit"),
            }
        }

        config
    }
}
