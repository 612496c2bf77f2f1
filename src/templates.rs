use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    forms::{AddForm, EditForm, FormErrors},
    models::{Candidate, Movie},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[Movie]) -> String {
    page(
        "My Top Movies",
        html! {
            div class="max-w-4xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                        p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                    }
                    a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "Your collection is empty. Add a movie to get started." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for movie in movies {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(
    movie: &Movie,
    form: &EditForm,
    errors: &FormErrors,
    csrf_token: &str,
) -> String {
    let action = format!("/edit?movie_id={}", movie.id);

    page(
        &format!("Edit {}", movie.title),
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { (movie.title) }
                p class="mt-2 text-gray-600" { "Edit Movie Rating" }

                form class="mt-8 space-y-6" method="post" action=(action) {
                    (csrf_field(errors, csrf_token))
                    div {
                        label class="block text-sm font-medium text-gray-700" for="new_rating" { "Your Rating Out of 10 e.g. 7.5" }
                        input class=(INPUT_CLASS) name="new_rating" id="new_rating" value=(form.new_rating) required;
                        (field_errors(errors, "new_rating"))
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="new_review" { "Your Review" }
                        input class=(INPUT_CLASS) name="new_review" id="new_review" value=(form.new_review) required;
                        (field_errors(errors, "new_review"))
                    }
                    button class=(BUTTON_CLASS) type="submit" { "Done" }
                }
            }))
        },
    )
}

pub fn add_page(form: &AddForm, errors: &FormErrors, csrf_token: &str) -> String {
    page(
        "Add Movie",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Add a Movie" }

                form class="mt-8 space-y-6" method="post" action="/add" {
                    (csrf_field(errors, csrf_token))
                    div {
                        label class="block text-sm font-medium text-gray-700" for="title" { "Movie title" }
                        input class=(INPUT_CLASS) name="title" id="title" value=(form.title) required;
                        (field_errors(errors, "title"))
                    }
                    button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
                }
            }))
        },
    )
}

pub fn select_page(query: &str, options: &[Candidate]) -> String {
    page(
        "Select Movie",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Select Movie" }
                p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }

                @if options.is_empty() {
                    p class="mt-6 text-gray-600" { "No movies found." }
                } @else {
                    ul class="mt-6 divide-y divide-gray-200" {
                        @for option in options {
                            li class="py-3" {
                                a class="text-blue-600 hover:text-blue-800" href=(format!("/find?id={}", option.id)) {
                                    (option.title)
                                    @if let Some(date) = option.release_date.as_deref().filter(|d| !d.is_empty()) {
                                        span class="ml-2 text-gray-500" { "- " (date) }
                                    }
                                }
                            }
                        }
                    }
                }
                a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
            }))
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Error " (status.as_u16()) }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }))
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn card(inner: Markup) -> Markup {
    html! {
        div class="max-w-xl mx-auto px-6 py-12" {
            div class="bg-white shadow rounded-lg p-8" { (inner) }
        }
    }
}

fn csrf_field(errors: &FormErrors, csrf_token: &str) -> Markup {
    html! {
        input type="hidden" name="csrf_token" value=(csrf_token);
        (field_errors(errors, "csrf_token"))
    }
}

fn field_errors(errors: &FormErrors, field: &str) -> Markup {
    html! {
        @for message in errors.for_field(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            @if !movie.img_url.is_empty() {
                img class="w-24 rounded" src=(movie.img_url) alt=(movie.title);
            }
            div class="flex-1" {
                div class="flex items-baseline gap-3" {
                    span class="text-3xl font-bold text-gray-400" { (movie.ranking) }
                    h2 class="text-xl font-semibold text-gray-900" {
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                }
                p class="mt-2 text-sm font-medium text-gray-700" { "Rating " (format!("{:.1}", movie.rating)) }
                p class="mt-2 italic text-gray-700" { "\u{201c}" (movie.review) "\u{201d}" }
                p class="mt-2 text-sm text-gray-600" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?movie_id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?movie_id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}
