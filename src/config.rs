use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,

    // Rate limiting (requests per minute, per peer)
    pub rate_write_per_min: u32,
    pub rate_calc_per_min: u32,
    pub rate_read_per_min: u32,

    pub api_prefix: String,
    pub top_performers_limit: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://commissions.db".to_string()),

            rate_write_per_min: env::var("RATE_WRITE_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("RATE_WRITE_PER_MIN must be a number"),
            rate_calc_per_min: env::var("RATE_CALC_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("RATE_CALC_PER_MIN must be a number"),
            rate_read_per_min: env::var("RATE_READ_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("RATE_READ_PER_MIN must be a number"),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            top_performers_limit: env::var("TOP_PERFORMERS_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("TOP_PERFORMERS_LIMIT must be a number"),
        }
    }
}
