//! Routing configuration for the computation factory.

use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

/// How landmarks for the ALT metric are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkStrategy {
    #[default]
    Random,
    GreedyFarthest,
}

/// How the road network and the transit schedule are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingModelMode {
    /// Road graph plus a separate timetable, joined at access stops.
    #[default]
    GraphWithTimetable,
    /// One graph holding road and transit nodes, joined by link edges.
    LinkGraph,
}

/// Errors while loading a configuration or initializing the factory.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The mode needs a timetable but none was given
    #[error("routing model {0:?} requires a timetable")]
    MissingTimetable(RoutingModelMode),

    #[error("at least one landmark is required")]
    NoLandmarks,
}

/// Configuration parameters for routing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Number of landmarks of the ALT metric.
    pub amount_of_landmarks: usize,

    pub landmark_strategy: LandmarkStrategy,

    /// Seed for landmark selection. Without one every run picks
    /// different landmarks.
    pub landmark_seed: Option<u64>,

    pub routing_model_mode: RoutingModelMode,

    /// Longest walk to or from a transit stop (seconds).
    pub abort_travel_time_to_access_nodes_secs: u32,

    /// Time needed to change vehicles at a stop (seconds).
    pub transfer_delay_secs: u32,

    /// Stops closer than this are connected by a footpath (meters).
    pub footpath_reachability_m: f64,
}

impl RoutingConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        amount_of_landmarks: usize,
        landmark_strategy: LandmarkStrategy,
        landmark_seed: Option<u64>,
        routing_model_mode: RoutingModelMode,
        abort_travel_time_to_access_nodes_secs: u32,
        transfer_delay_secs: u32,
        footpath_reachability_m: f64,
    ) -> Self {
        Self {
            amount_of_landmarks,
            landmark_strategy,
            landmark_seed,
            routing_model_mode,
            abort_travel_time_to_access_nodes_secs,
            transfer_delay_secs,
            footpath_reachability_m,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns the longest access walk as a Duration.
    pub fn access_walk_limit(&self) -> Duration {
        Duration::seconds(i64::from(self.abort_travel_time_to_access_nodes_secs))
    }

    /// Returns the transfer delay as a Duration.
    pub fn transfer_delay(&self) -> Duration {
        Duration::seconds(i64::from(self.transfer_delay_secs))
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            amount_of_landmarks: 20,
            landmark_strategy: LandmarkStrategy::Random,
            landmark_seed: None,
            routing_model_mode: RoutingModelMode::GraphWithTimetable,
            abort_travel_time_to_access_nodes_secs: 900, // 15 minutes
            transfer_delay_secs: 300,                    // 5 minutes
            footpath_reachability_m: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = RoutingConfig::default();

        assert_eq!(config.amount_of_landmarks, 20);
        assert_eq!(config.landmark_strategy, LandmarkStrategy::Random);
        assert_eq!(config.landmark_seed, None);
        assert_eq!(config.routing_model_mode, RoutingModelMode::GraphWithTimetable);
        assert_eq!(config.abort_travel_time_to_access_nodes_secs, 900);
        assert_eq!(config.transfer_delay_secs, 300);
        assert_eq!(config.footpath_reachability_m, 100.0);
    }

    #[test]
    fn duration_methods() {
        let config = RoutingConfig::default();

        assert_eq!(config.access_walk_limit(), Duration::minutes(15));
        assert_eq!(config.transfer_delay(), Duration::minutes(5));
    }

    #[test]
    fn custom_config() {
        let config = RoutingConfig::new(
            4,
            LandmarkStrategy::GreedyFarthest,
            Some(7),
            RoutingModelMode::LinkGraph,
            600,
            120,
            250.0,
        );

        assert_eq!(config.amount_of_landmarks, 4);
        assert_eq!(config.landmark_strategy, LandmarkStrategy::GreedyFarthest);
        assert_eq!(config.landmark_seed, Some(7));
        assert_eq!(config.routing_model_mode, RoutingModelMode::LinkGraph);
        assert_eq!(config.abort_travel_time_to_access_nodes_secs, 600);
        assert_eq!(config.transfer_delay_secs, 120);
        assert_eq!(config.footpath_reachability_m, 250.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RoutingConfig::from_json_str(
            r#"{ "amount_of_landmarks": 8, "landmark_strategy": "greedy_farthest" }"#,
        )
        .unwrap();

        assert_eq!(config.amount_of_landmarks, 8);
        assert_eq!(config.landmark_strategy, LandmarkStrategy::GreedyFarthest);
        assert_eq!(config.transfer_delay_secs, 300);
    }

    #[test]
    fn invalid_json() {
        let error = RoutingConfig::from_json_str(r#"{ "routing_model_mode": "ferry" }"#)
            .unwrap_err();
        assert!(matches!(error, ConfigError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "routing_model_mode": "link_graph", "landmark_seed": 3 }}"#).unwrap();

        let config = RoutingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.routing_model_mode, RoutingModelMode::LinkGraph);
        assert_eq!(config.landmark_seed, Some(3));

        let missing = RoutingConfig::from_json_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::MissingTimetable(RoutingModelMode::GraphWithTimetable).to_string(),
            "routing model GraphWithTimetable requires a timetable"
        );
        assert_eq!(
            ConfigError::NoLandmarks.to_string(),
            "at least one landmark is required"
        );
    }
}
