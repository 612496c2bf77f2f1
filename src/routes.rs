use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::{
    AppState, csrf,
    error::{AppError, AppResult},
    forms::{AddForm, EditForm, FormErrors},
    models::{FindQuery, MovieIdQuery, NewMovie},
    ranking, templates,
};

/// `GET /`: re-ranks the whole collection, persists the ranks and lists it best-first.
pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let movies = ranking::rerank_for_display(state.store.list_all().await?);
    state.store.save_rankings(&movies).await?;

    debug!(count = movies.len(), "collection re-ranked");
    Ok(Html(templates::index_page(&movies)))
}

pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieIdQuery>,
) -> AppResult<Html<String>> {
    let movie = state.store.get(q.movie_id).await?.ok_or(AppError::NotFound(q.movie_id))?;

    let form = EditForm {
        new_rating: movie.rating.to_string(),
        new_review: movie.review.clone(),
        ..EditForm::default()
    };
    let token = state.csrf.issue(csrf::EDIT_FORM);
    Ok(Html(templates::edit_page(&movie, &form, &FormErrors::default(), &token)))
}

pub async fn edit_submit(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieIdQuery>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let mut movie = state.store.get(q.movie_id).await?.ok_or(AppError::NotFound(q.movie_id))?;

    let update = match form.validate(&state.csrf) {
        Ok(update) => update,
        Err(errors) => {
            debug!(movie_id = movie.id, "edit form rejected");
            let token = state.csrf.issue(csrf::EDIT_FORM);
            let body = templates::edit_page(&movie, &form, &errors, &token);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    movie.rating = update.rating;
    movie.review = update.review;
    state.store.update(&movie).await?;

    info!(movie_id = movie.id, rating = movie.rating, "movie rated");
    Ok(Redirect::to("/").into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieIdQuery>,
) -> AppResult<Redirect> {
    if state.store.get(q.movie_id).await?.is_none() || !state.store.delete(q.movie_id).await? {
        return Err(AppError::NotFound(q.movie_id));
    }

    info!(movie_id = q.movie_id, "movie deleted");
    Ok(Redirect::to("/"))
}

pub async fn add_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let token = state.csrf.issue(csrf::ADD_FORM);
    Html(templates::add_page(&AddForm::default(), &FormErrors::default(), &token))
}

pub async fn add_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddForm>,
) -> AppResult<Response> {
    let title = match form.validate(&state.csrf) {
        Ok(title) => title,
        Err(errors) => {
            debug!("add form rejected");
            let token = state.csrf.issue(csrf::ADD_FORM);
            let body = templates::add_page(&form, &errors, &token);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    let options = state.tmdb.search_by_title(&title).await?;
    debug!(query = %title, candidates = options.len(), "search results ready");
    Ok(Html(templates::select_page(&title, &options)).into_response())
}

/// `GET /select` has no view of its own; candidates are listed by `POST /add`.
pub async fn select() -> Redirect {
    Redirect::to("/add")
}

/// `GET /find`: stores the chosen search result and sends the user to rate it.
pub async fn find(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FindQuery>,
) -> AppResult<Redirect> {
    let details = state.tmdb.fetch_details(q.id).await?;
    let movie = state.store.insert(NewMovie::from_details(details)).await?;

    info!(movie_id = movie.id, title = %movie.title, year = movie.year, "movie added");
    Ok(Redirect::to(&format!("/edit?movie_id={}", movie.id)))
}
