//! Main executable that runs the HTTP server exposing queues, workers and statistics.

use actix_web::{middleware, web, App, HttpServer};
use log::{debug, info};

use quay::application::RedisManager;
use quay::handlers;
use quay::models::ApplicationState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // parse CLI arguments and configuration file
    let config = quay::config::parse_config_from_cli_args();

    // initialise logging, default level from config, can be overridden with RUST_LOG
    let log_level = config.server.log_level.to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let store_spec = config.store_spec();
    let redis_addr = match store_spec.describe() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    let pool = match store_spec.into_pool() {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Failed to initialise Redis connection pool: {}", err);
            std::process::exit(1);
        }
    };
    info!("Using Redis at {}", redis_addr);

    let redis_manager = RedisManager::new(&config.redis.key_namespace);
    debug!("Using key namespace '{}'", &config.redis.key_namespace);

    let http_server_addr = config.server_addr();
    let num_workers = config.server.threads;
    let max_body_size = config.server.max_body_size;

    let app_data = web::Data::new(ApplicationState {
        pool,
        config,
        redis_manager,
    });

    let mut http_server = HttpServer::new(move || {
        let mut json_config = web::JsonConfig::default();
        if let Some(size) = max_body_size {
            json_config = json_config.limit(size);
        }

        App::new()
            .app_data(app_data.clone())
            .app_data(json_config)
            // get a summary of queues and workers as a whole
            .service(
                web::scope("/info")
                    .route("", web::get().to(handlers::info::index))
                    .route("/version", web::get().to(handlers::info::version)),
            )
            // run basic health check by pinging Redis
            .route("/health", web::get().to(handlers::health::index))
            .service(
                web::scope("/queue")
                    // get a list of all queue names
                    .route("", web::get().to(handlers::queue::index))
                    // get the number of jobs queued
                    .route("/{name}", web::get().to(handlers::queue::size))
                    // read jobs without removing them
                    .route("/{name}/peek", web::get().to(handlers::queue::peek))
                    .service(
                        web::resource("/{name}/job")
                            // take the next job from given queue
                            .route(web::get().to(handlers::queue::reserve))
                            // push a new job to given queue
                            .route(web::post().to(handlers::queue::enqueue)),
                    ),
            )
            .service(
                web::scope("/worker")
                    .route("", web::get().to(handlers::worker::index))
                    .route("/working", web::get().to(handlers::worker::working))
                    .route("/{id}", web::get().to(handlers::worker::summary)),
            )
            .service(
                web::scope("/failed")
                    .service(
                        web::resource("")
                            // list failure records
                            .route(web::get().to(handlers::failed::index))
                            // empty the failure log
                            .route(web::delete().to(handlers::failed::clear)),
                    )
                    .route("/count", web::get().to(handlers::failed::count)),
            )
            // add middleware logger for access log
            .wrap(middleware::Logger::default())
    });

    // set number of worker threads if configured, or default to number of logical CPUs
    if let Some(num_workers) = num_workers {
        debug!("Using {} HTTP worker threads", num_workers);
        http_server = http_server.workers(num_workers);
    }

    info!("Starting queue server at: {}", &http_server_addr);
    http_server.bind(&http_server_addr)?.run().await
}
