use actix_web::{web, App, HttpServer};
use backend::config::AppConfig;
use backend::services;
use backend::state::AppState;
use backend::store::Db;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let db = Db::open(&config.db_path)
        .map_err(|e| std::io::Error::other(format!("cannot open database: {e}")))?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(db, config);

    info!("server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(state.clone()))
            .service(services::solutions::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
