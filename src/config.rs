#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: String,
    pub log_format: LogFormat,

    // Argon2id cost. Lower both only for tests or constrained dev machines.
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
}
