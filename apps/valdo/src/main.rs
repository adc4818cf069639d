//! apps/valdo/src/main.rs

mod capture;
mod error;
mod remote;
mod render;
mod runtime;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::capture::FileCapture;
use crate::error::AppError;
use crate::remote::RemoteClient;
use crate::runtime::App;
use crate::store::FileStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "valdo=warn".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("VALDO_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".valdo"));
    let coach_url =
        std::env::var("VALDO_COACH_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());

    info!(data_dir = %data_dir.display(), %coach_url, "starting valdo");

    let store = FileStore::new(data_dir.join("store.json"))?;
    let remote = Arc::new(RemoteClient::new(coach_url));
    let capture = FileCapture::new(data_dir.join("camera"));

    let app = App::new(
        Box::new(store),
        remote.clone(),
        remote,
        Box::new(capture),
    );

    println!("Valdo health tracker. Type `help` for commands.");
    runtime::run(app).await
}
