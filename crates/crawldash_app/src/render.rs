//! Plain-text rendering of view models for the terminal.

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use crawldash_core::{AppViewModel, CrawlStatus, RecordDetail, RecordRowView, SortDirection};

const URL_WIDTH: usize = 40;
const TITLE_WIDTH: usize = 30;

/// `created_at` is seconds; callers pass milliseconds.
pub(crate) fn format_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

pub(crate) fn render_list(view: &AppViewModel) -> String {
    let mut out = String::new();

    let counts = &view.status_counts;
    let _ = writeln!(
        out,
        "Total: {}  Queued: {}  Running: {}  Completed: {}  Error: {}",
        view.total_records, counts.queued, counts.running, counts.completed, counts.error
    );
    if view.active_filter_count > 0 {
        let _ = writeln!(out, "{}", describe_filters(view));
    }
    let arrow = match view.sort.direction {
        SortDirection::Asc => "^",
        SortDirection::Desc => "v",
    };
    let _ = writeln!(out, "Sorted by {} {}", view.sort.key, arrow);
    out.push('\n');

    if view.rows.is_empty() {
        if view.active_filter_count > 0 {
            out.push_str("No results match the current filters.\n");
        } else {
            out.push_str("No URLs yet. Add one with `crawldash add <url>`.\n");
        }
    } else {
        let _ = writeln!(
            out,
            "{:>5}  {:<9}  {:<TITLE_WIDTH$}  {:<URL_WIDTH$}  {:<6}  {:>5}  {:>5}  {:>6}  {:<23}  {}",
            "ID", "STATUS", "TITLE", "URL", "HTML", "INT", "EXT", "BROKEN", "CREATED", "ACTION"
        );
        for row in &view.rows {
            render_row(&mut out, row);
        }
    }

    out.push('\n');
    let _ = write!(
        out,
        "Showing {}-{} of {}",
        view.start_item, view.end_item, view.total_matching
    );
    if view.active_filter_count > 0 {
        let _ = write!(out, " (filtered from {})", view.total_records);
    }
    let _ = writeln!(out, "  |  Page {} of {}", view.page, view.total_pages);

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{notice}");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }
    out
}

fn render_row(out: &mut String, row: &RecordRowView) {
    let marker = if row.selected { "*" } else { " " };
    let _ = writeln!(
        out,
        "{:>4}{}  {:<9}  {:<TITLE_WIDTH$}  {:<URL_WIDTH$}  {:<6}  {:>5}  {:>5}  {:>6}  {:<23}  {}",
        row.id,
        marker,
        row.status.as_str(),
        truncate(or_dash(&row.title), TITLE_WIDTH),
        truncate(&row.url, URL_WIDTH),
        truncate(or_dash(&row.html_version), 6),
        row.internal_links,
        row.external_links,
        row.broken_links,
        format_timestamp(row.created_at.saturating_mul(1000)),
        row.crawl_action.label()
    );
}

fn describe_filters(view: &AppViewModel) -> String {
    let mut parts = Vec::new();
    if !view.search_term.is_empty() {
        parts.push(format!("search \"{}\"", view.search_term));
    }
    if !view.status_filter.is_empty() {
        let statuses: Vec<&str> = view
            .status_filter
            .iter()
            .map(|status| status.as_str())
            .collect();
        parts.push(format!("status {}", statuses.join("|")));
    }
    if view.broken_links_filter != Default::default() {
        parts.push(format!("broken links {}", view.broken_links_filter));
    }
    format!(
        "Filters ({}): {}",
        view.active_filter_count,
        parts.join(", ")
    )
}

pub(crate) fn render_detail(detail: &RecordDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", or_dash(&detail.title));
    let _ = writeln!(out, "{}", detail.url);
    out.push('\n');
    let _ = writeln!(out, "Status:        {}", detail.status);
    let _ = writeln!(out, "HTML version:  {}", or_dash(&detail.html_version));
    let _ = writeln!(
        out,
        "Login form:    {}",
        if detail.has_login_form { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Created:       {}", format_timestamp(detail.created_at_millis));
    let _ = writeln!(out, "Total links:   {}", detail.total_links);
    out.push('\n');

    out.push_str("Headings\n");
    for (level, count) in &detail.headings {
        let _ = writeln!(out, "  h{level}: {count}");
    }
    out.push('\n');

    out.push_str("Links\n");
    let _ = writeln!(out, "  internal: {}", detail.internal_links);
    let _ = writeln!(out, "  external: {}", detail.external_links);
    let _ = writeln!(out, "  broken:   {}", detail.broken_links);

    if !detail.broken_link_list.is_empty() {
        out.push('\n');
        out.push_str("Broken links\n");
        for link in &detail.broken_link_list {
            let _ = writeln!(out, "  [{}] {}", link.status_code, link.url);
        }
    }
    if detail.status == CrawlStatus::Error {
        out.push('\n');
        out.push_str("The last crawl of this URL failed.\n");
    }
    out
}

pub(crate) fn render_health(view: &AppViewModel) -> String {
    match (&view.health, &view.error) {
        (_, Some(error)) => format!("API unreachable: {error}\n"),
        (Some(status), None) => format!("API status: {status}\n"),
        (None, None) => "API status unknown\n".to_string(),
    }
}
