use anyhow::Context;
use time::{macros::format_description, UtcOffset};

use crate::profile::UserProfile;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    /// Offset used to decide which calendar day "today" is.
    pub local_offset: UtcOffset,
    pub profile: UserProfile,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            timeout_secs: env_parse("GEMINI_TIMEOUT_SECS").unwrap_or(30),
        };

        let local_offset = match std::env::var("UTC_OFFSET") {
            Ok(raw) => parse_utc_offset(&raw)?,
            Err(_) => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        };

        let defaults = UserProfile::default();
        let profile = UserProfile {
            name: std::env::var("PROFILE_NAME").unwrap_or(defaults.name),
            weight: env_parse("PROFILE_WEIGHT_KG").unwrap_or(defaults.weight),
            height: env_parse("PROFILE_HEIGHT_CM").unwrap_or(defaults.height),
            goal: std::env::var("PROFILE_GOAL").unwrap_or(defaults.goal),
            daily_calorie_target: env_parse("PROFILE_DAILY_CALORIES")
                .unwrap_or(defaults.daily_calorie_target),
        };

        Ok(Self {
            gemini,
            local_offset,
            profile,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Accepts `+08:00`, `-05:30` or `Z`.
pub fn parse_utc_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw, &format).with_context(|| format!("invalid UTC_OFFSET {raw:?}"))
}
