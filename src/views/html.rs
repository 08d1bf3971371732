//! Built-in HTML renderer
//!
//! Templates are `maud` markup, so interpolated values are escaped unless
//! they are wrapped in [`Stored`]. Catalog text (genre names, imprints,
//! statuses) is stored already escaped by the form pipeline and goes through
//! `Stored` so it is not escaped twice.

use maud::{html, Markup, DOCTYPE};

use super::{Page, Render};
use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetails, BookInstanceStatus, BookTitle, CreateBookInstance, Genre},
    validation::FieldError,
};

const NAV: &[(&str, &str)] = &[
    ("/catalog/genres", "All genres"),
    ("/catalog/bookinstances", "All book-instances"),
    ("/catalog/genre/create", "Create new genre"),
    ("/catalog/bookinstance/create", "Create new book instance (copy)"),
];

/// Characters the form pipeline never leaves in stored text
const UNESCAPED: &[char] = &['<', '>', '"', '\'', '`', '\\'];

/// Text that went through the form pipeline.
///
/// Written as-is when it is already escaped. Text that still carries markup
/// characters never passed the pipeline and is escaped here.
pub struct Stored<'a>(pub &'a str);

impl maud::Render for Stored<'_> {
    fn render_to(&self, buffer: &mut String) {
        if self.0.contains(UNESCAPED) {
            buffer.push_str(&html_escape::encode_safe(self.0));
        } else {
            buffer.push_str(self.0);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Render for HtmlRenderer {
    fn render(&self, page: &Page) -> AppResult<String> {
        let (title, content) = match page {
            Page::BookinstanceList {
                title,
                bookinstance_list,
            } => (*title, bookinstance_list_body(title, bookinstance_list)),
            Page::BookinstanceDetail {
                title,
                bookinstance,
            } => (*title, bookinstance_detail_body(bookinstance)),
            Page::BookinstanceForm {
                title,
                book_list,
                selected_book,
                errors,
                bookinstance,
            } => (
                *title,
                bookinstance_form_body(
                    title,
                    book_list,
                    selected_book.as_deref(),
                    bookinstance.as_ref(),
                    errors,
                ),
            ),
            Page::BookinstanceDelete {
                title,
                bookinstance,
            } => (*title, bookinstance_delete_body(title, bookinstance)),
            Page::GenreList { title, genre_list } => (
                *title,
                html! {
                    h1 { (title) }
                    @if genre_list.is_empty() {
                        p { "There are no genres." }
                    } @else {
                        ul {
                            @for genre in genre_list {
                                li { a href=(genre.url()) { (Stored(&genre.name)) } }
                            }
                        }
                    }
                },
            ),
            Page::GenreDetail {
                title,
                genre,
                genre_books,
            } => (
                *title,
                html! {
                    h1 { (title) ": " (Stored(&genre.name)) }
                    h4 { "Books" }
                    @if genre_books.is_empty() {
                        p { "This genre has no books." }
                    } @else {
                        (books_body(genre_books))
                    }
                },
            ),
            Page::GenreForm {
                title,
                genre,
                errors,
            } => (
                *title,
                html! {
                    h1 { (title) }
                    form method="POST" action="" {
                        label for="name" { "Genre:" }
                        input id="name" type="text" name="name" placeholder="Fantasy, Poetry etc."
                            required value=(Stored(genre.as_ref().map(|g| g.name.as_str()).unwrap_or("")));
                        button type="submit" { "Submit" }
                    }
                    (errors_body(errors))
                },
            ),
            Page::GenreDelete {
                title,
                genre,
                genre_books,
            } => (*title, genre_delete_body(title, genre.as_ref(), genre_books)),
            Page::Error { message, status } => (
                message.as_str(),
                html! {
                    h1 { (message) }
                    h2 { (status) }
                },
            ),
        };

        Ok(layout(title, content).into_string())
    }
}

fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="zh" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                nav {
                    ul {
                        @for (href, label) in NAV {
                            li { a href=(href) { (label) } }
                        }
                    }
                }
                main { (content) }
            }
        }
    }
}

fn status_badge(status: BookInstanceStatus) -> Markup {
    html! {
        span class=(format!("status-{}", status.as_str().to_lowercase())) { (status.as_str()) }
    }
}

fn book_title(book: Option<&Book>) -> &str {
    book.map(|b| b.title.as_str()).unwrap_or("(missing book)")
}

fn bookinstance_list_body(title: &str, list: &[BookInstanceDetails]) -> Markup {
    html! {
        h1 { (title) }
        @if list.is_empty() {
            p { "There are no book copies in this library." }
        } @else {
            ul {
                @for instance in list {
                    li {
                        a href=(instance.url()) {
                            (book_title(instance.book.as_ref())) " : " (Stored(&instance.imprint))
                        }
                        " - " (status_badge(instance.status))
                        @if instance.status != BookInstanceStatus::Available {
                            " (Due: " (instance.due_back_formatted()) ")"
                        }
                    }
                }
            }
        }
    }
}

fn bookinstance_detail_body(instance: &BookInstanceDetails) -> Markup {
    html! {
        h1 { "ID: " (instance.id.to_string()) }
        p { strong { "Title:" } " " (book_title(instance.book.as_ref())) }
        p { strong { "Imprint:" } " " (Stored(&instance.imprint)) }
        p { strong { "Status:" } " " (status_badge(instance.status)) }
        @if instance.status != BookInstanceStatus::Available {
            p { strong { "Due back:" } " " (instance.due_back_formatted()) }
        }
        p { a href=(format!("{}/delete", instance.url())) { "Delete copy" } }
    }
}

fn bookinstance_form_body(
    title: &str,
    book_list: &[BookTitle],
    selected_book: Option<&str>,
    data: Option<&CreateBookInstance>,
    errors: &[FieldError],
) -> Markup {
    let imprint = data.map(|d| d.imprint.as_str()).unwrap_or("");
    let status = data.map(|d| d.status.as_str()).unwrap_or("");
    let due_back = data
        .and_then(|d| d.due_back)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    html! {
        h1 { (title) }
        form method="POST" action="" {
            label for="book" { "Book:" }
            select id="book" name="book" required {
                @for book in book_list {
                    @let id = book.id.to_string();
                    option value=(id) selected[selected_book == Some(id.as_str())] { (book.title) }
                }
            }
            label for="imprint" { "Imprint:" }
            input id="imprint" type="text" name="imprint" placeholder="Publisher and date information"
                required value=(Stored(imprint));
            label for="due_back" { "Date when book available:" }
            input id="due_back" type="date" name="due_back" value=(due_back);
            label for="status" { "Status:" }
            select id="status" name="status" required {
                @for choice in BookInstanceStatus::ALL {
                    option value=(choice.as_str()) selected[choice.as_str() == status] { (choice.as_str()) }
                }
            }
            button type="submit" { "Submit" }
        }
        (errors_body(errors))
    }
}

fn bookinstance_delete_body(title: &str, instance: &BookInstance) -> Markup {
    html! {
        h1 { (title) }
        p { "ID: " (instance.id.to_string()) }
        p { "Imprint: " (Stored(&instance.imprint)) }
        p { "Status: " (instance.status.as_str()) }
        @if instance.status != BookInstanceStatus::Available {
            p { "Due back: " (instance.due_back_formatted()) }
        }
        p { "Do you really want to delete this copy?" }
        form method="POST" action="" {
            input type="hidden" name="bookinstanceid" value=(instance.id.to_string());
            button type="submit" { "Delete" }
        }
    }
}

fn books_body(books: &[Book]) -> Markup {
    html! {
        dl {
            @for book in books {
                dt { (book.title) }
                dd { (book.summary) }
            }
        }
    }
}

fn genre_delete_body(title: &str, genre: Option<&Genre>, books: &[Book]) -> Markup {
    html! {
        h1 { (title) ": " (Stored(genre.map(|g| g.name.as_str()).unwrap_or(""))) }
        @if !books.is_empty() {
            p { strong { "Delete the following books before attempting to delete this genre." } }
            (books_body(books))
        } @else {
            p { "Do you really want to delete this genre?" }
            form method="POST" action="" {
                input type="hidden" name="genreid" value=(genre.map(|g| g.id.to_string()).unwrap_or_default());
                button type="submit" { "Delete" }
            }
        }
    }
}

fn errors_body(errors: &[FieldError]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul class="errors" {
                @for error in errors {
                    li { (error.message) }
                }
            }
        }
    }
}
