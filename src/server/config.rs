use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub frontend_dir_path: Option<String>,
    /// HS256 secret used to validate bearer tokens.
    pub jwt_secret: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            frontend_dir_path: None,
            jwt_secret: String::new(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}
