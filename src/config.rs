use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub midtrans_server_key: String,
    pub midtrans_is_production: bool,
    pub resend_api_key: String,
    pub email_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "cuswash.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            midtrans_server_key: env::var("MIDTRANS_SERVER_KEY").unwrap_or_default(),
            midtrans_is_production: env::var("MIDTRANS_IS_PRODUCTION")
                .map(|v| v == "true")
                .unwrap_or(false),
            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "CusWash <noreply@cuswash.com>".to_string()),
        }
    }
}
