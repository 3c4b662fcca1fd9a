use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use warp::Filter;

mod args;
mod backend;
mod board;
mod catalog;
mod episode;
mod favorites;
mod form;
mod notification;
mod render;
mod routes;
mod time;

use args::Args;
use backend::Backend;
use board::Board;
use catalog::{Cancel, Loader};
use favorites::FavoritesStore;

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();
    let addr = match args.addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid address: {e}");
            return ExitCode::FAILURE;
        }
    };

    let backend = Backend::new(args.data_dir());
    if backend.init().is_err() {
        return ExitCode::FAILURE;
    }

    let loader = match Loader::new(args.api_url(), args.max_requests(), args.timeout()) {
        Ok(loader) => loader,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let board = Board::new(FavoritesStore::hydrate(backend)).shared();
    let cancel = Cancel::new();

    let load = {
        let shared = Arc::clone(&board);
        let cancel = cancel.clone();
        info!("loading catalog from {}", args.api_url());
        tokio::spawn(async move { board::load_catalog(&shared, &loader, &cancel).await })
    };

    let routes = routes::routes(board).with(warp::log("episode_board"));

    let shutdown = {
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("couldn't listen for ctrl-c: {e}");
            }
            info!("shutting down");
            cancel.cancel();
        }
    };

    let server = match warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown) {
        Ok((addr, server)) => {
            info!("listening on {addr}");
            server
        }
        Err(e) => {
            error!("couldn't bind {addr}: {e}");
            cancel.cancel();
            return ExitCode::FAILURE;
        }
    };

    server.await;

    if let Err(e) = load.await {
        error!("catalog task: {e}");
    }

    ExitCode::SUCCESS
}
