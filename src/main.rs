use std::{process, sync::Arc, time::Duration};

use quillpost::{
    application::{
        categories::CategoryService,
        comments::CommentService,
        error::AppError,
        posts::PostService,
        repos::{CategoriesRepo, CommentsRepo, PostsRepo},
    },
    cache::{
        CacheConfig, CacheState, CacheStore, CacheTrigger, InvalidationPolicy, MemoryStore,
        spawn_expiry_sweeper,
    },
    config,
    infra::{
        db::MemoryRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tokio::{signal, sync::oneshot, task::JoinHandle};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

struct ApplicationContext {
    api_state: ApiState,
    cache_state: Option<CacheState>,
    cache_store: Option<Arc<MemoryStore>>,
}

fn build_application_context(settings: &config::Settings) -> ApplicationContext {
    let repositories = Arc::new(MemoryRepositories::new());
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();

    // Initialize cache infrastructure
    let cache_config = CacheConfig::from(&settings.cache);
    let (cache_trigger, cache_state, cache_store) = if cache_config.enabled {
        let memory = Arc::new(MemoryStore::new(&cache_config));
        let store: Arc<dyn CacheStore> = memory.clone();
        let trigger = Arc::new(CacheTrigger::new(
            cache_config.clone(),
            InvalidationPolicy::new(store.clone()),
        ));
        let state = CacheState {
            config: cache_config,
            store,
        };
        (Some(trigger), Some(state), Some(memory))
    } else {
        (None, None, None)
    };

    let posts = Arc::new(
        PostService::new(
            posts_repo.clone(),
            comments_repo.clone(),
            categories_repo.clone(),
        )
        .with_cache_trigger_opt(cache_trigger.clone()),
    );
    let comments = Arc::new(
        CommentService::new(comments_repo, posts_repo.clone())
            .with_cache_trigger_opt(cache_trigger.clone()),
    );
    let categories = Arc::new(
        CategoryService::new(categories_repo, posts_repo).with_cache_trigger_opt(cache_trigger),
    );

    ApplicationContext {
        api_state: ApiState {
            posts,
            comments,
            categories,
        },
        cache_state,
        cache_store,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let app = build_application_context(&settings);

    let sweeper_handle = app
        .cache_store
        .clone()
        .map(|store| spawn_expiry_sweeper(store, settings.cache.sweep_interval));

    let result = serve_http(&settings, app.api_state, app.cache_state).await;

    if let Some(handle) = sweeper_handle {
        handle.abort();
        let _ = handle.await;
    }

    result
}

async fn serve_http(
    settings: &config::Settings,
    api_state: ApiState,
    cache_state: Option<CacheState>,
) -> Result<(), AppError> {
    let router = http::build_router(api_state, cache_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        addr = %settings.server.addr,
        cache = settings.cache.enabled,
        invalidation_mode = settings.cache.invalidation_mode.as_str(),
        "quillpost listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        _ = shutdown_signal() => {}
    }

    let _ = shutdown_tx.send(());
    drain(server, settings.server.graceful_shutdown).await
}

async fn drain(
    server: JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> Result<(), AppError> {
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => {
            info!("server shutdown complete");
            Ok(())
        }
        Ok(Err(err)) => Err(AppError::from(InfraError::from(err))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
