use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{actor, movie, review},
    models::{MovieDetail, MoviePage, ReviewThread, Sidebar},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn movie_list_page(
    title: &str,
    movies: &MoviePage,
    sidebar: &Sidebar,
    base: &str,
    query: &str,
) -> String {
    page(
        title,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10 grid gap-8 lg:grid-cols-4" {
                div class="lg:col-span-3" {
                    h1 class="text-3xl font-bold text-gray-900" { (title) }

                    @if movies.movies.is_empty() {
                        div class="mt-8 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "Nothing found." }
                        }
                    } @else {
                        div class="mt-8 grid gap-6 sm:grid-cols-2 xl:grid-cols-3" {
                            @for movie in &movies.movies {
                                (movie_card(movie))
                            }
                        }
                    }

                    (pagination(movies, base, query))
                }
                (sidebar_column(sidebar))
            }
        },
    )
}

pub fn movie_detail_page(detail: &MovieDetail, sidebar: &Sidebar) -> String {
    let movie = &detail.movie;
    page(
        &movie.title,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10 grid gap-8 lg:grid-cols-4" {
                div class="lg:col-span-3 space-y-8" {
                    div class="bg-white shadow rounded-lg p-8" {
                        div class="flex gap-8" {
                            img class="w-56 rounded-md shadow" src=(media(&movie.poster)) alt=(movie.title);
                            div {
                                h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                                p class="mt-1 text-gray-500 italic" { (movie.tagline) }
                                p class="mt-4 text-gray-700" { (movie.description) }
                                @if movie.trailer_url != "-" {
                                    a class="mt-4 inline-block text-blue-600 hover:text-blue-800" href=(movie.trailer_url) target="_blank" rel="noopener noreferrer" { "Watch trailer" }
                                }
                            }
                        }

                        dl class="mt-8 grid gap-x-8 gap-y-2 sm:grid-cols-2 text-sm" {
                            (info_row("Year", &movie.year.to_string()))
                            (info_row("Country", &movie.country))
                            (info_row("World premiere", &premiere(&movie.world_premiere)))
                            (info_row("Budget", &format!("${}", movie.budget)))
                            (info_row("Fees in USA", &format!("${}", movie.fees_in_usa)))
                            (info_row("Fees in world", &format!("${}", movie.fees_in_world)))
                            (people_row("Directors", &detail.directors))
                            (people_row("Actors", &detail.actors))
                            div {
                                dt class="font-semibold text-gray-700" { "Genres" }
                                dd class="text-gray-600" {
                                    @for (i, genre) in detail.genres.iter().enumerate() {
                                        @if i > 0 { ", " }
                                        (genre.name)
                                    }
                                }
                            }
                        }

                        (rating_form(movie))
                    }

                    @if !detail.shots.is_empty() {
                        div class="bg-white shadow rounded-lg p-8" {
                            h2 class="text-xl font-semibold text-gray-900" { "Shots" }
                            div class="mt-4 grid gap-4 sm:grid-cols-3" {
                                @for shot in &detail.shots {
                                    figure {
                                        img class="rounded-md shadow" src=(media(&shot.image)) alt=(shot.title);
                                        figcaption class="mt-1 text-sm text-gray-500" { (shot.title) }
                                    }
                                }
                            }
                        }
                    }

                    div class="bg-white shadow rounded-lg p-8" {
                        h2 class="text-xl font-semibold text-gray-900" { "Reviews" }
                        @if detail.reviews.is_empty() {
                            p class="mt-4 text-gray-600" { "No reviews yet." }
                        } @else {
                            div class="mt-4 space-y-6" {
                                @for thread in &detail.reviews {
                                    (review_thread(movie, thread))
                                }
                            }
                        }

                        h3 class="mt-8 text-lg font-semibold text-gray-900" { "Leave a review" }
                        (review_form(movie, None))
                    }
                }
                (sidebar_column(sidebar))
            }
        },
    )
}

pub fn actor_page(actor: &actor::Model, sidebar: &Sidebar) -> String {
    page(
        &actor.name,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10 grid gap-8 lg:grid-cols-4" {
                div class="lg:col-span-3" {
                    div class="bg-white shadow rounded-lg p-8 flex gap-8" {
                        img class="w-48 rounded-md shadow" src=(media(&actor.image)) alt=(actor.name);
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { (actor.name) }
                            p class="mt-1 text-gray-500" { "Age: " (actor.age) }
                            p class="mt-4 text-gray-700" { (actor.description) }
                        }
                    }
                }
                (sidebar_column(sidebar))
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
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
                title { (title) " · Kinoteka" }
                script src=(TAILWIND_CDN) {}
            }
            body class="bg-gray-50" {
                header class="bg-gray-900" {
                    div class="max-w-6xl mx-auto px-6 py-4 flex items-center justify-between" {
                        a class="text-xl font-bold text-white" href="/" { "Kinoteka" }
                        form class="flex gap-2" method="get" action="/search" {
                            input class="rounded-md px-3 py-1.5 text-sm" type="text" name="q" placeholder="Search titles";
                            button class="rounded-md bg-blue-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
                        }
                    }
                }
                (body)
            }
        }
    }
    .into_string()
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(format!("/{}", movie.slug)) {
            img class="w-full aspect-[2/3] object-cover" src=(media(&movie.poster)) alt=(movie.title);
            div class="p-4" {
                h2 class="font-semibold text-gray-900" { (movie.title) }
                p class="mt-1 text-sm text-gray-500" { (movie.year) " · " (movie.country) }
            }
        }
    }
}

fn pagination(movies: &MoviePage, base: &str, query: &str) -> Markup {
    html! {
        @if movies.pages > 1 {
            nav class="mt-8 flex items-center gap-4" {
                @if movies.page > 1 {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("{base}?{query}page={}", movies.page - 1)) { "Previous" }
                }
                span class="text-sm text-gray-500" { "Page " (movies.page) " of " (movies.pages) }
                @if movies.page < movies.pages {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("{base}?{query}page={}", movies.page + 1)) { "Next" }
                }
            }
        }
    }
}

fn sidebar_column(sidebar: &Sidebar) -> Markup {
    html! {
        aside class="space-y-6" {
            form class="bg-white shadow rounded-lg p-6" method="get" action="/filter" {
                h2 class="font-semibold text-gray-900" { "Filter" }
                fieldset class="mt-4" {
                    legend class="text-sm font-medium text-gray-700" { "Years" }
                    @for year in &sidebar.years {
                        label class="mt-1 flex items-center gap-2 text-sm text-gray-600" {
                            input type="checkbox" name="year" value=(year);
                            (year)
                        }
                    }
                }
                fieldset class="mt-4" {
                    legend class="text-sm font-medium text-gray-700" { "Genres" }
                    @for genre in &sidebar.genres {
                        label class="mt-1 flex items-center gap-2 text-sm text-gray-600" {
                            input type="checkbox" name="genre" value=(genre.id);
                            (genre.name)
                        }
                    }
                }
                button class="mt-4 w-full rounded-md bg-blue-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Apply" }
            }

            @if !sidebar.recent.is_empty() {
                div class="bg-white shadow rounded-lg p-6" {
                    h2 class="font-semibold text-gray-900" { "Recently added" }
                    ul class="mt-3 space-y-1" {
                        @for movie in &sidebar.recent {
                            li {
                                a class="text-sm text-blue-600 hover:text-blue-800" href=(format!("/{}", movie.slug)) { (movie.title) }
                            }
                        }
                    }
                }
            }

            @if !sidebar.categories.is_empty() {
                div class="bg-white shadow rounded-lg p-6" {
                    h2 class="font-semibold text-gray-900" { "Categories" }
                    ul class="mt-3 space-y-1" {
                        @for category in &sidebar.categories {
                            li class="text-sm text-gray-600" { (category.name) }
                        }
                    }
                }
            }
        }
    }
}

fn info_row(label: &str, value: &str) -> Markup {
    html! {
        div {
            dt class="font-semibold text-gray-700" { (label) }
            dd class="text-gray-600" { (value) }
        }
    }
}

fn people_row(label: &str, people: &[actor::Model]) -> Markup {
    html! {
        div {
            dt class="font-semibold text-gray-700" { (label) }
            dd class="text-gray-600" {
                @for (i, person) in people.iter().enumerate() {
                    @if i > 0 { ", " }
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/actor/{}", urlencoding::encode(&person.name))) { (person.name) }
                }
            }
        }
    }
}

fn rating_form(movie: &movie::Model) -> Markup {
    html! {
        form class="mt-8 flex items-center gap-3" method="post" action="/add-rating" {
            input type="hidden" name="movie" value=(movie.id);
            span class="text-sm font-medium text-gray-700" { "Your rating:" }
            @for star in 1..=5 {
                label class="flex items-center gap-1 text-sm text-gray-600" {
                    input type="radio" name="star" value=(star) required;
                    (star)
                }
            }
            button class="rounded-md bg-blue-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Rate" }
        }
    }
}

fn review_thread(movie: &movie::Model, thread: &ReviewThread) -> Markup {
    html! {
        div class="border-l-4 border-gray-200 pl-4" {
            (review_body(&thread.review))
            @for reply in &thread.replies {
                div class="mt-3 ml-6 border-l-4 border-gray-100 pl-4" {
                    (review_body(reply))
                }
            }
            details class="mt-2" {
                summary class="cursor-pointer text-sm text-blue-600" { "Reply" }
                (review_form(movie, Some(&thread.review)))
            }
        }
    }
}

fn review_body(review: &review::Model) -> Markup {
    html! {
        div {
            p class="font-semibold text-gray-900" { (review.name) }
            p class="mt-1 text-gray-700" { (review.text) }
        }
    }
}

fn review_form(movie: &movie::Model, parent: Option<&review::Model>) -> Markup {
    html! {
        form class="mt-4 space-y-3" method="post" action=(format!("/{}/review", movie.slug)) {
            @if let Some(parent) = parent {
                input type="hidden" name="parent" value=(parent.id);
            }
            div class="grid gap-3 sm:grid-cols-2" {
                input class="rounded-md border border-gray-300 px-3 py-2 text-sm" type="text" name="name" placeholder="Name" required;
                input class="rounded-md border border-gray-300 px-3 py-2 text-sm" type="email" name="email" placeholder="Email" required;
            }
            textarea class="w-full rounded-md border border-gray-300 px-3 py-2 text-sm" name="text" rows="4" maxlength="5000" placeholder="Your review" required {}
            button class="rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Submit" }
        }
    }
}

fn media(path: &str) -> String {
    format!("/media/{path}")
}

fn premiere(raw: &str) -> String {
    match raw.parse::<jiff::civil::Date>() {
        Ok(date) => date.strftime("%-d %B %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
