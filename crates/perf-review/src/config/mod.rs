use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::appraisals::ScoringDefaults;
use crate::scoring::{GoalWeights, MissingCategoryPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Test => "test",
            AppEnvironment::Production => "production",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scoring defaults for cycles opened without their own scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub weights: GoalWeights,
    pub missing_feedback: MissingCategoryPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: GoalWeights::default(),
            missing_feedback: MissingCategoryPolicy::CountAsZero,
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let fallback = GoalWeights::default();
        let weights = GoalWeights {
            goal: weight_var("SCORING_GOAL_WEIGHT", fallback.goal)?,
            self_assessment: weight_var("SCORING_SELF_WEIGHT", fallback.self_assessment)?,
            feedback: weight_var("SCORING_FEEDBACK_WEIGHT", fallback.feedback)?,
        };
        weights
            .validate()
            .map_err(|_| ConfigError::InvalidWeightTotal {
                total: weights.total(),
            })?;

        let missing_feedback = match env::var("SCORING_MISSING_FEEDBACK") {
            Err(_) => MissingCategoryPolicy::CountAsZero,
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "zero" | "count_as_zero" => MissingCategoryPolicy::CountAsZero,
                "redistribute" | "redistribute_weight" => {
                    MissingCategoryPolicy::RedistributeWeight
                }
                _ => return Err(ConfigError::InvalidMissingFeedbackPolicy { value }),
            },
        };

        Ok(Self {
            weights,
            missing_feedback,
        })
    }

    pub fn defaults(&self) -> ScoringDefaults {
        ScoringDefaults {
            weights: self.weights,
            missing_feedback: self.missing_feedback,
        }
    }
}

fn weight_var(var: &'static str, fallback: f64) -> Result<f64, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(fallback),
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
            .ok_or(ConfigError::InvalidWeight { var }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { var: &'static str },
    InvalidWeightTotal { total: f64 },
    InvalidMissingFeedbackPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { var } => {
                write!(f, "{var} must be a non-negative number")
            }
            ConfigError::InvalidWeightTotal { total } => write!(
                f,
                "scoring weights must sum to 1.0, got {total:.3}"
            ),
            ConfigError::InvalidMissingFeedbackPolicy { value } => write!(
                f,
                "SCORING_MISSING_FEEDBACK must be 'zero' or 'redistribute', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidWeightTotal { .. }
            | ConfigError::InvalidMissingFeedbackPolicy { .. } => None,
        }
    }
}
