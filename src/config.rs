//! Параметры запуска сервера

use std::path::PathBuf;

use clap::Parser;

use crate::artifacts::ArtifactPaths;

/// Crop recommendation web form
#[derive(Parser, Debug, Clone)]
#[command(name = "crop-advisor")]
#[command(version)]
#[command(about = "Web form that recommends a crop from soil and climate measurements")]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "CROP_ADVISOR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "CROP_ADVISOR_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory with model.json, standscaler.json, minmaxscaler.json and label_encoder.json
    #[arg(long, env = "CROP_ADVISOR_ARTIFACT_DIR", default_value = ".")]
    pub artifact_dir: PathBuf,

    /// Development mode: verbose logging and per-request tracing
    #[arg(long, env = "CROP_ADVISOR_DEBUG")]
    pub debug: bool,
}

impl Config {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifact_dir)
    }

    /// Адрес для `TcpListener::bind`: имя хоста разрешается при привязке.
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    /// Уровень логов по умолчанию, если RUST_LOG не задан
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
