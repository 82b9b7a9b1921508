use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use jjclicks_backend::auth::jwt::JwtSecret;
use jjclicks_backend::cache::{CacheConfig, GalleryCache};
use jjclicks_backend::config::AppConfig;
use jjclicks_backend::create_pool;
use jjclicks_backend::db::categories::sync_counters;
use jjclicks_backend::handlers;
use jjclicks_backend::services::PortfolioService;
use jjclicks_backend::storage::{CloudinaryStore, ImageStore, Retrying};
use migration::{Migrator, MigratorTrait};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
    sync_counters(&db).await.map_err(std::io::Error::other)?;
    tracing::info!("Database ready");

    let cloudinary = CloudinaryStore::new(config.cloudinary.clone()).map_err(std::io::Error::other)?;
    let images: Arc<dyn ImageStore> = Arc::new(Retrying::new(cloudinary, config.retry));

    let service = web::Data::new(PortfolioService::new(
        db.clone(),
        images,
        config.uploads.clone(),
    ));
    let db_data = web::Data::new(db);
    let jwt_secret = web::Data::new(JwtSecret::new(config.jwt_secret.clone(), config.jwt_ttl));
    let cache = web::Data::new(Arc::new(GalleryCache::new(&CacheConfig::from_env())));
    let max_upload_bytes = config.uploads.max_upload_bytes;

    let static_dir = config
        .static_dir
        .clone()
        .filter(|dir| Path::new(dir).is_dir());
    if let Some(dir) = &static_dir {
        tracing::info!("Serving static files from {dir}");
    }

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let mut app = App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(service.clone())
            .app_data(jwt_secret.clone())
            .app_data(cache.clone())
            .app_data(handlers::multipart_config(max_upload_bytes))
            .service(web::scope("/api").configure(handlers::init_routes));

        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(&bind_addr)?
    .run()
    .await
}
