use std::sync::Once;

use crawldash_core::{
    update, AppState, BrokenLinksFilter, CrawlRecord, CrawlStatus, Effect, Msg, RecordId,
    SortDirection, SortKey, SortSpec,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawldash_logging::initialize_for_tests);
}

fn loaded(count: u64) -> AppState {
    let records = (1..=count)
        .map(|id| CrawlRecord {
            status: CrawlStatus::Completed,
            broken_links: (id % 2) as u32,
            ..CrawlRecord::queued(id, format!("https://site{id}.example"), id as i64)
        })
        .collect();
    let (state, effects) = update(AppState::new(), Msg::RecordsLoaded(Ok(records)));
    assert!(effects.is_empty());
    state
}

fn row_ids(state: &AppState) -> Vec<RecordId> {
    state.view().rows.iter().map(|row| row.id).collect()
}

#[test]
fn refresh_requests_the_authoritative_list() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::FetchRecords]);
    assert_eq!(state.pending_requests(), 1);

    let (state, _) = update(state, Msg::RecordsLoaded(Ok(Vec::new())));
    assert_eq!(state.pending_requests(), 0);
}

#[test]
fn changing_page_clears_selection() {
    init_logging();
    let state = loaded(25);
    let (state, _) = update(state, Msg::SelectAllToggled(true));
    assert_eq!(state.view().selected.len(), 10);
    assert!(state.view().all_selected);

    let (state, _) = update(state, Msg::PageChanged(2));
    let view = state.view();
    assert_eq!(view.page, 2);
    assert!(view.selected.is_empty());
    assert!(state.selection().is_empty());
}

#[test]
fn re_sorting_the_same_page_keeps_selection() {
    init_logging();
    let state = loaded(5);
    let (state, _) = update(state, Msg::RecordToggled { id: 3, included: true });
    let (state, _) = update(state, Msg::RecordToggled { id: 5, included: true });

    let (state, _) = update(state, Msg::SortClicked(SortKey::Url));
    assert_eq!(state.view().page, 1);
    assert_eq!(state.view().selected, vec![3, 5]);
}

#[test]
fn filtering_the_same_page_keeps_selection_that_stays_visible() {
    init_logging();
    let state = loaded(5);
    let (state, _) = update(state, Msg::RecordToggled { id: 3, included: true });
    let (state, _) = update(state, Msg::RecordToggled { id: 5, included: true });

    let (state, _) = update(state, Msg::SearchChanged("site".to_string()));
    assert_eq!(state.view().page, 1);
    assert_eq!(state.view().selected, vec![5, 3]);

    let (state, _) = update(state, Msg::SearchChanged("site3".to_string()));
    assert_eq!(state.view().selected, vec![3]);
}

#[test]
fn requesting_the_current_page_keeps_selection() {
    init_logging();
    let state = loaded(25);
    let (state, _) = update(state, Msg::RecordToggled { id: 25, included: true });
    let (state, _) = update(state, Msg::PageChanged(1));
    assert_eq!(state.view().selected, vec![25]);
}

#[test]
fn filter_changes_reset_to_first_page() {
    init_logging();
    let state = loaded(25);
    let (state, _) = update(state, Msg::PageChanged(3));
    assert_eq!(state.view().page, 3);

    let (state, _) = update(state, Msg::BrokenLinksFilterChanged(BrokenLinksFilter::HasBroken));
    let view = state.view();
    assert_eq!(view.page, 1);
    assert_eq!(view.total_matching, 13);
    assert_eq!(view.total_records, 25);
    assert_eq!(view.active_filter_count, 1);

    let (state, _) = update(state, Msg::PageChanged(2));
    let (state, _) = update(state, Msg::SearchChanged("site1".to_string()));
    assert_eq!(state.view().page, 1);
    let (state, _) = update(state, Msg::PageChanged(2));
    let (state, _) = update(
        state,
        Msg::StatusFilterToggled {
            status: CrawlStatus::Completed,
            included: true,
        },
    );
    assert_eq!(state.view().page, 1);
    assert_eq!(state.view().active_filter_count, 3);

    let (state, _) = update(state, Msg::FiltersCleared);
    assert_eq!(state.view().active_filter_count, 0);
    assert_eq!(state.view().total_matching, 25);
}

#[test]
fn header_clicks_cycle_sort_direction() {
    init_logging();
    let state = loaded(3);
    assert_eq!(
        state.view().sort,
        SortSpec::new(SortKey::CreatedAt, SortDirection::Desc)
    );
    assert_eq!(row_ids(&state), vec![3, 2, 1]);

    let (state, _) = update(state, Msg::SortClicked(SortKey::CreatedAt));
    assert_eq!(state.view().sort.direction, SortDirection::Asc);
    assert_eq!(row_ids(&state), vec![1, 2, 3]);

    let (state, _) = update(state, Msg::SortClicked(SortKey::CreatedAt));
    assert_eq!(state.view().sort.direction, SortDirection::Desc);

    let (state, _) = update(state, Msg::SortClicked(SortKey::Url));
    assert_eq!(
        state.view().sort,
        SortSpec::new(SortKey::Url, SortDirection::Asc)
    );
}

#[test]
fn page_requests_are_clamped() {
    init_logging();
    let state = loaded(25);
    let (state, _) = update(state, Msg::PageChanged(99));
    assert_eq!(state.view().page, 3);
    assert_eq!(state.view().rows.len(), 5);

    let (state, _) = update(state, Msg::PageChanged(0));
    assert_eq!(state.view().page, 1);
}

#[test]
fn selecting_a_record_off_the_page_is_ignored() {
    init_logging();
    let state = loaded(25);
    // Page 1 shows ids 25..=16 under newest-first.
    let (state, _) = update(state, Msg::RecordToggled { id: 1, included: true });
    assert!(state.selection().is_empty());

    let (state, _) = update(state, Msg::RecordToggled { id: 20, included: true });
    let (state, _) = update(state, Msg::RecordToggled { id: 20, included: false });
    assert!(state.selection().is_empty());
}

#[test]
fn refresh_drops_selection_of_records_that_left_the_page() {
    init_logging();
    let state = loaded(3);
    let (state, _) = update(state, Msg::SelectAllToggled(true));

    let remaining = vec![CrawlRecord::queued(1, "https://site1.example", 1)];
    let (state, _) = update(state, Msg::RecordsLoaded(Ok(remaining)));
    assert_eq!(state.view().selected, vec![1]);
    assert!(state.view().all_selected);
}

#[test]
fn deselect_all_clears() {
    init_logging();
    let state = loaded(4);
    let (state, _) = update(state, Msg::SelectAllToggled(true));
    let (state, _) = update(state, Msg::SelectAllToggled(false));
    assert!(state.selection().is_empty());
    assert!(!state.view().all_selected);
}

#[test]
fn rows_offer_crawl_action_by_status() {
    init_logging();
    let mut running = CrawlRecord::queued(2, "https://b.example", 2);
    running.status = CrawlStatus::Running;
    let mut done = CrawlRecord::queued(3, "https://c.example", 3);
    done.status = CrawlStatus::Completed;
    let records = vec![CrawlRecord::queued(1, "https://a.example", 1), running, done];
    let (state, _) = update(AppState::new(), Msg::RecordsLoaded(Ok(records)));

    let labels: Vec<_> = state
        .view()
        .rows
        .iter()
        .map(|row| row.crawl_action.label())
        .collect();
    assert_eq!(labels, vec!["Rerun Crawler", "Running...", "Run Crawler"]);

    let counts = state.view().status_counts;
    assert_eq!((counts.queued, counts.running, counts.completed), (1, 1, 1));
}
