use std::{convert::Infallible, sync::Arc};

use log::{error, info};
use warp::http::{StatusCode, Uri};
use warp::{Filter, Rejection, Reply};

use crate::board::{self, FormInput, SharedBoard};
use crate::render;

const MAX_BODY: u64 = 4 * 1024;

fn with_board(
    board: SharedBoard,
) -> impl Filter<Extract = (SharedBoard,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&board))
}

fn back_to_page() -> impl Reply {
    warp::redirect::see_other(Uri::from_static("/"))
}

pub fn routes(board: SharedBoard) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let page = warp::path::end()
        .and(warp::get())
        .and(with_board(board.clone()))
        .then(|board: SharedBoard| async move {
            let mut board = board.lock().await;
            let notifications = board.take_notifications();
            warp::reply::html(render::page(&board, &notifications))
        });

    let toggle = warp::path!("favorites" / i64)
        .and(warp::post())
        .and(with_board(board.clone()))
        .and_then(|id: i64, board: SharedBoard| async move {
            board
                .lock()
                .await
                .toggle_favorite(id)
                .map_err(warp::reject::custom)?;

            Ok::<_, Rejection>(back_to_page())
        });

    let submit = warp::path!("episodes")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY))
        .and(warp::body::form())
        .and(with_board(board.clone()))
        .then(|input: FormInput, board: SharedBoard| async move {
            // an invalid form shows its messages on the page we go back to
            if let Err(errors) = board.lock().await.submit_form(input) {
                info!("episode form rejected: {errors:?}");
            }
            back_to_page()
        });

    let api = {
        let episodes = warp::path!("api" / "episodes")
            .and(warp::get())
            .and(with_board(board.clone()))
            .then(|board: SharedBoard| async move {
                let board = board.lock().await;
                warp::reply::json(&board.catalog())
            });

        let favorites = warp::path!("api" / "favorites")
            .and(warp::get())
            .and(with_board(board.clone()))
            .then(|board: SharedBoard| async move {
                let board = board.lock().await;
                warp::reply::json(&board.favorites().favorites())
            });

        let created = warp::path!("api" / "created")
            .and(warp::get())
            .and(with_board(board.clone()))
            .then(|board: SharedBoard| async move {
                let board = board.lock().await;
                warp::reply::json(&board.created())
            });

        let form = warp::path!("api" / "form")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY))
            .and(warp::body::json())
            .and(with_board(board))
            .and_then(|input: FormInput, board: SharedBoard| async move {
                let state = board
                    .lock()
                    .await
                    .update_form(input)
                    .map_err(warp::reject::custom)?;

                Ok::<_, Rejection>(warp::reply::json(&state))
            });

        episodes.or(favorites).or(created).or(form)
    };

    page.or(toggle)
        .or(submit)
        .or(api)
        .recover(handle_rejection)
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if let Some(e) = err.find::<board::Error>() {
        (*e).into()
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        StatusCode::METHOD_NOT_ALLOWED
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
    {
        StatusCode::BAD_REQUEST
    } else {
        error!("unhandled rejection: {err:?}");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok(warp::reply::with_status(
        status.canonical_reason().unwrap_or("error"),
        status,
    ))
}
