use std::sync::Arc;

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

use media_vault::auth::{JwtVerifier, TokenVerifier};
use media_vault::config::Config;
use media_vault::routes::create_routes;
use media_vault::services::blob::{BlobStore, S3BlobStore};
use media_vault::services::media::MediaService;
use media_vault::services::metadata::{MetadataStore, SeaOrmMetadataStore};
use media_vault::services::preview::PreviewGenerator;
use media_vault::services::upload::UploadCoordinator;
use media_vault::state::AppState;

#[derive(Parser)]
#[command(name = "media-vault", about = "Personal media storage service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server plus the periodic preview sweep (default).
    Serve,
    /// Run a single preview sweep and exit.
    Sweep,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let db = Database::connect(config.database_url.as_str())
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let s3 = S3BlobStore::new(&config);
    s3.ensure_bucket_exists()
        .await
        .expect("Failed to prepare S3 bucket");

    let blobs: Arc<dyn BlobStore> = Arc::new(s3);
    let metadata: Arc<dyn MetadataStore> = Arc::new(SeaOrmMetadataStore::new(db));
    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        &config.jwt_audience,
    ));

    let previews = PreviewGenerator::new(
        blobs.clone(),
        metadata.clone(),
        config.preview_width,
        config.sweep_page_size,
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Sweep => {
            let stats = previews.sweep().await;
            tracing::info!(
                "sweep finished: scanned={} generated={} skipped={} failed={}",
                stats.scanned,
                stats.generated,
                stats.skipped,
                stats.failed
            );
        }
        Command::Serve => {
            let state = AppState {
                uploads: UploadCoordinator::new(blobs.clone(), metadata.clone()),
                previews: previews.clone(),
                media: MediaService::new(blobs.clone(), metadata.clone(), config.media_url_ttl),
                verifier,
                upload_url_ttl: config.upload_url_ttl,
            };

            tokio::spawn(previews.run_scheduler(config.sweep_interval));

            let app = create_routes(state);
            let listener = tokio::net::TcpListener::bind(&config.listen_addr)
                .await
                .expect("Failed to bind listener");
            tracing::info!("Listening on {}", listener.local_addr().unwrap());
            axum::serve(listener, app).await.expect("Server error");
        }
    }
}
