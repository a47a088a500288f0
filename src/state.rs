use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::notify::InvoiceNotifier;
use crate::services::payment::PaymentGateway;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub gateway: Box<dyn PaymentGateway>,
    pub mailer: Box<dyn InvoiceNotifier>,
}
