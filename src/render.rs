//! HTML rendering.
//!
//! Handlers build the view-model structs in this module and hand them to the
//! page functions; no markup is produced anywhere else. Templates are
//! compile-time checked maud and all spliced values are escaped.

use chrono::{DateTime, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::types::{Item, Notice, Status, StatusCounts};

/// View-model for the listing page.
pub struct ListingView {
    pub items: Vec<Item>,
    pub counts: StatusCounts,
    /// Echoed free-text query, exactly as submitted.
    pub query: Option<String>,
    /// Echoed status filter, exactly as submitted (may be an unknown value).
    pub status_filter: Option<String>,
    pub notice: Option<Notice>,
}

/// View-model for the create/edit form.
pub struct FormView {
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub error: Option<String>,
}

impl FormView {
    /// Empty form for a new item.
    pub fn blank() -> FormView {
        FormView {
            heading: "New item",
            action: "/items/new".to_string(),
            title: String::new(),
            description: String::new(),
            status: Status::Todo,
            error: None,
        }
    }

    /// Form pre-filled with the stored record.
    pub fn for_item(item: &Item) -> FormView {
        FormView {
            heading: "Edit item",
            action: format!("/items/{}/edit", item.id),
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            status: item.status,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl std::fmt::Display) -> FormView {
        self.error = Some(error.to_string());
        self
    }
}

pub fn listing_page(view: &ListingView) -> Markup {
    layout(
        "Items",
        html! {
            @if let Some(notice) = view.notice {
                div.flash.flash-success { (notice.message()) }
            }
            form.filters method="get" action="/" {
                input type="search" name="q" value=[view.query.as_deref()]
                    placeholder="Search title or description";
                select name="status" {
                    option value="" { "All statuses" }
                    @for status in Status::ALL {
                        option value=(status.as_str())
                            selected[view.status_filter.as_deref() == Some(status.as_str())] {
                            (status.label())
                        }
                    }
                }
                button type="submit" { "Filter" }
            }
            ul.counts {
                li { "All: " (view.counts.all) }
                @for status in Status::ALL {
                    li { (status.label()) ": " (view.counts.get(status)) }
                }
            }
            @if view.items.is_empty() {
                p.empty { "No items found." }
            } @else {
                table.items {
                    thead {
                        tr { th { "Title" } th { "Status" } th { "Created" } th { "Updated" } th {} }
                    }
                    tbody {
                        @for item in &view.items {
                            tr {
                                td { a href={ "/items/" (item.id) } { (item.title) } }
                                td { (status_badge(item.status)) }
                                td { (format_date(item.created_at)) }
                                td { (format_date(item.updated_at)) }
                                td.actions {
                                    a href={ "/items/" (item.id) "/edit" } { "Edit" }
                                    form method="post" action={ "/items/" (item.id) "/delete" }
                                        onsubmit="return confirm('Delete this item?')" {
                                        button.danger type="submit" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn item_form_page(view: &FormView) -> Markup {
    layout(
        view.heading,
        html! {
            @if let Some(error) = &view.error {
                div.flash.flash-danger { (error) }
            }
            h1 { (view.heading) }
            form.item-form method="post" action=(view.action) {
                label for="title" { "Title" }
                input #title type="text" name="title" value=(view.title);
                label for="description" { "Description" }
                textarea #description name="description" rows="5" { (view.description) }
                label for="status" { "Status" }
                select #status name="status" {
                    @for status in Status::ALL {
                        option value=(status.as_str()) selected[view.status == status] {
                            (status.label())
                        }
                    }
                }
                div.form-actions {
                    button type="submit" { "Save" }
                    a href="/" { "Cancel" }
                }
            }
        },
    )
}

pub fn show_page(item: &Item) -> Markup {
    layout(
        &item.title,
        html! {
            article.item-detail {
                h1 { (item.title) }
                (status_badge(item.status))
                @match &item.description {
                    Some(text) => { p.description { (text) } }
                    None => { p.description.muted { "No description." } }
                }
                dl.meta {
                    dt { "Created" }
                    dd { (format_date(item.created_at)) }
                    dt { "Updated" }
                    dd { (format_date(item.updated_at)) }
                }
                div.actions {
                    a href={ "/items/" (item.id) "/edit" } { "Edit" }
                    form method="post" action={ "/items/" (item.id) "/delete" }
                        onsubmit="return confirm('Delete this item?')" {
                        button.danger type="submit" { "Delete" }
                    }
                    a href="/" { "Back to list" }
                }
            }
        },
    )
}

pub fn not_found_page(message: &str) -> Markup {
    layout(
        "Not found",
        html! {
            section.error-page {
                h1 { "404" }
                p { (message) }
                a href="/" { "Back to list" }
            }
        },
    )
}

/// Internal error page. The reference id also appears in the log, which is
/// the only place holding the actual error.
pub fn error_page(error_id: uuid::Uuid) -> Markup {
    layout(
        "Something went wrong",
        html! {
            section.error-page {
                h1 { "Something went wrong" }
                p { "The problem has been logged. Reference: " code { (error_id.to_string()) } }
                a href="/" { "Back to list" }
            }
        },
    )
}

fn status_badge(status: Status) -> Markup {
    html! {
        span class={ "badge status-" (status.as_str()) } { (status.label()) }
    }
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn layout(page_title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page_title) " - Taskboard" }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                header.topbar {
                    a.brand href="/" { "Taskboard" }
                    a.new-item href="/items/new" { "New item" }
                }
                main { (content) }
            }
        }
    }
}

const STYLESHEET: &str = r#"
:root { color-scheme: light; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2430; background: #f6f7f9; }
main { max-width: 56rem; margin: 1.5rem auto; padding: 0 1rem; }
.topbar { display: flex; justify-content: space-between; align-items: center;
          padding: 0.75rem 1rem; background: #232a36; }
.topbar a { color: #fff; text-decoration: none; }
.topbar .brand { font-weight: 700; }
.flash { padding: 0.6rem 0.9rem; border-radius: 4px; margin-bottom: 1rem; }
.flash-success { background: #e2f4e5; color: #1d5c2a; }
.flash-danger { background: #fbe3e4; color: #8a1f2d; }
.filters { display: flex; gap: 0.5rem; margin-bottom: 0.75rem; }
.filters input[type=search] { flex: 1; padding: 0.4rem; }
.counts { display: flex; gap: 1rem; list-style: none; padding: 0; margin: 0 0 1rem;
          color: #5a6270; font-size: 0.9rem; }
table.items { width: 100%; border-collapse: collapse; background: #fff; }
table.items th, table.items td { text-align: left; padding: 0.5rem 0.75rem;
          border-bottom: 1px solid #e3e6eb; }
td.actions { display: flex; gap: 0.5rem; align-items: center; }
td.actions form { margin: 0; }
.badge { padding: 0.15rem 0.5rem; border-radius: 999px; font-size: 0.8rem; }
.status-todo { background: #e8eaf0; }
.status-in-progress { background: #fdf0d4; }
.status-done { background: #e2f4e5; }
.item-form { display: grid; gap: 0.4rem; max-width: 32rem; background: #fff;
          padding: 1rem; border-radius: 6px; }
.item-form input, .item-form textarea, .item-form select { padding: 0.4rem; width: 100%; }
.form-actions { display: flex; gap: 0.75rem; align-items: center; margin-top: 0.5rem; }
.item-detail { background: #fff; padding: 1rem 1.25rem; border-radius: 6px; }
.item-detail .muted { color: #8a8f98; }
.meta dt { font-weight: 600; }
button.danger { background: #c23b4b; color: #fff; border: none; padding: 0.35rem 0.7rem;
          border-radius: 4px; cursor: pointer; }
.error-page { text-align: center; padding: 3rem 0; }
.empty { color: #5a6270; }
"#;
