use clap::Parser;

use crate::auth::DEFAULT_TOKEN_TTL_MINUTES;
use crate::vision::plate::{DEFAULT_DETECTION_INPUT, DEFAULT_MIN_CONFIDENCE};
use crate::vision::PlateModelConfig;

/// Node configuration, from CLI flags or environment variables
#[derive(Debug, Clone, Parser)]
#[command(name = "lpr-node", about = "License plate recognition node", version)]
pub struct NodeConfig {
    /// Address the API server binds to
    #[arg(long, env = "API_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    /// Path to the plate localization ONNX model
    #[arg(long, env = "DETECTION_MODEL_PATH", default_value = "./models/best.onnx")]
    pub detection_model_path: String,

    /// Path to the plate OCR ONNX model
    #[arg(
        long,
        env = "RECOGNITION_MODEL_PATH",
        default_value = "./models/european-plates-mobile-vit-v2.onnx"
    )]
    pub recognition_model_path: String,

    /// Spatial input size the localization model was exported with
    #[arg(long, env = "DETECTION_INPUT", default_value_t = DEFAULT_DETECTION_INPUT)]
    pub detection_input: u32,

    /// Minimum detection confidence (0.0 disables the threshold)
    #[arg(long, env = "MIN_CONFIDENCE", default_value_t = DEFAULT_MIN_CONFIDENCE)]
    pub min_confidence: f32,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://lpr_node.db")]
    pub database_url: String,

    /// HS256 secret for access tokens; override outside development
    #[arg(long, env = "JWT_SECRET", default_value = "dev-secret-change-me")]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "TOKEN_TTL_MINUTES", default_value_t = DEFAULT_TOKEN_TTL_MINUTES)]
    pub token_ttl_minutes: i64,
}

impl NodeConfig {
    /// The model-facing slice of the configuration
    pub fn model_config(&self) -> PlateModelConfig {
        PlateModelConfig {
            detection_model_path: self.detection_model_path.clone(),
            recognition_model_path: self.recognition_model_path.clone(),
            detection_input: self.detection_input,
            min_confidence: self.min_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = NodeConfig::try_parse_from(["lpr-node"]).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.detection_input, 640);
        assert!((config.min_confidence - 0.25).abs() < 1e-6);
        assert_eq!(config.token_ttl_minutes, 30);
    }

    #[test]
    fn test_flag_overrides() {
        let config = NodeConfig::try_parse_from([
            "lpr-node",
            "--listen-addr",
            "0.0.0.0:9090",
            "--min-confidence",
            "0.0",
        ])
        .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9090");
        assert_eq!(config.min_confidence, 0.0);
    }

    #[test]
    fn test_model_config_slice() {
        let config = NodeConfig::try_parse_from([
            "lpr-node",
            "--detection-model-path",
            "/models/plate.onnx",
        ])
        .unwrap();
        let models = config.model_config();
        assert_eq!(models.detection_model_path, "/models/plate.onnx");
        assert_eq!(models.detection_input, 640);
    }
}
