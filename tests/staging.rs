use photoswipe::filter::FilterSpec;
use photoswipe::source::{ApplyKind, AuthorizationStatus, PhotoId};
use photoswipe::staging::{IntentKind, Phase, StagingModel};
use chrono::NaiveDate;

mod common;
use common::{abcd, at, ids, photo, ready_model, FakeSource};

#[test]
fn favorite_intent_follows_toggle_parity() {
    let mut model = ready_model(abcd());
    let a = PhotoId::from("A");
    for n in 1..=6 {
        model.toggle_favorite_intent();
        assert_eq!(
            model.pending().favorite_toggle.contains(&a),
            n % 2 == 1,
            "after {n} toggles"
        );
    }
}

#[test]
fn favorite_glyph_is_snapshot_xor_pending_toggle() {
    let mut model = ready_model(vec![photo("plain", false), photo("loved", true)]);

    assert!(!model.is_favorite_glyph_filled());
    model.toggle_favorite_intent();
    assert!(model.is_favorite_glyph_filled());

    assert!(model.advance_to(1));
    assert!(model.is_favorite_glyph_filled());
    model.toggle_favorite_intent();
    assert!(!model.is_favorite_glyph_filled());
}

#[test]
fn keep_and_trash_glyphs_track_current_photo() {
    let mut model = ready_model(abcd());
    model.toggle_keep_intent();
    assert!(model.is_staged(IntentKind::Keep));
    assert!(!model.is_staged(IntentKind::Trash));

    model.next();
    assert!(!model.is_staged(IntentKind::Keep));
    model.toggle_trash_intent();
    assert!(model.is_staged(IntentKind::Trash));
}

#[test]
fn pending_count_counts_each_set_membership() {
    let mut model = ready_model(abcd());
    model.toggle_favorite_intent();
    model.toggle_trash_intent();
    model.advance_to(2);
    model.toggle_keep_intent();

    assert_eq!(model.pending_count(), 3);
    let pending = model.pending();
    assert_eq!(
        model.pending_count(),
        pending.favorite_toggle.len() + pending.keep.len() + pending.trash.len()
    );
}

#[test]
fn toggles_on_empty_list_do_nothing() {
    let mut model = ready_model(Vec::new());
    assert!(!model.toggle_favorite_intent());
    assert!(!model.toggle_trash_intent());
    assert_eq!(model.pending_count(), 0);
    assert!(!model.is_favorite_glyph_filled());
    assert!(model.current().is_none());
}

#[test]
fn advance_to_out_of_range_keeps_position() {
    let mut model = ready_model(abcd());
    assert!(model.advance_to(2));
    assert!(!model.advance_to(4));
    assert!(!model.advance_to(usize::MAX));
    assert_eq!(model.position(), 2);

    assert!(model.advance_to(3));
    assert!(!model.next());
    assert_eq!(model.position(), 3);
    model.advance_to(0);
    assert!(!model.previous());
    assert_eq!(model.position(), 0);
}

#[test]
fn confirmation_summary_lists_non_empty_categories_in_order() {
    let photos = (0..6).map(|i| photo(&format!("P{i}"), false)).collect();
    let mut model = ready_model(photos);
    model.toggle_favorite_intent();
    model.advance_to(2);
    model.toggle_keep_intent();
    model.advance_to(5);
    model.toggle_keep_intent();

    assert_eq!(
        model.confirmation_summary(),
        "1 photo will have favorite status toggled\n2 photos will be kept\n"
    );

    model.toggle_trash_intent();
    assert_eq!(
        model.confirmation_summary(),
        "1 photo will have favorite status toggled\n1 photo will be deleted\n2 photos will be kept\n"
    );

    let prompt = model.confirmation_prompt();
    assert!(prompt.starts_with("Are you sure you want to make changes to your photo library?\n\n"));
    assert!(prompt.contains("• 1 photo will be deleted\n"));
}

#[test]
fn commit_removes_trashed_photos_and_clamps_position() {
    let mut model = ready_model(abcd());
    model.advance_to(1);
    model.toggle_trash_intent();
    model.advance_to(3);
    model.toggle_trash_intent();

    assert!(model.commit());
    let report = model.poll().expect("commit settles");

    assert_eq!(ids(model.photos()), vec!["A", "C"]);
    assert_eq!(model.position(), 1);
    assert_eq!(report.deleted.len(), 2);
    assert!(model.pending().is_empty());

    let requests = model.source().requests.borrow();
    assert_eq!(requests.len(), 1, "trash goes out as one batch");
    assert!(matches!(&requests[0], ApplyKind::DeleteBatch(batch) if batch.len() == 2));
}

#[test]
fn commit_issues_one_favorite_request_per_photo() {
    let mut model = ready_model(abcd());
    model.toggle_favorite_intent();
    model.advance_to(2);
    model.toggle_favorite_intent();
    model.toggle_keep_intent();

    assert!(model.commit());
    let report = model.poll().expect("commit settles");

    let requests = model.source().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| matches!(r, ApplyKind::ToggleFavorite(_))));
    assert_eq!(report.favorites_toggled.len(), 2);
    assert_eq!(report.kept, 1);
}

#[test]
fn successful_favorite_toggle_updates_snapshot() {
    let mut model = ready_model(abcd());
    model.toggle_favorite_intent();
    model.commit();
    model.poll().expect("commit settles");

    assert!(model.photos()[0].is_favorite);
    assert!(model.is_favorite_glyph_filled());
    assert!(model.pending().favorite_toggle.is_empty());
}

#[test]
fn failures_are_reported_and_pending_still_cleared() {
    let mut model = ready_model(abcd());
    model
        .source()
        .failing_favorites
        .borrow_mut()
        .insert(PhotoId::from("A"));
    model.source().fail_deletes.set(true);

    model.toggle_favorite_intent();
    model.toggle_trash_intent();
    model.advance_to(1);
    model.toggle_keep_intent();

    assert!(model.commit());
    let report = model.poll().expect("commit settles");

    assert!(report.has_failures());
    assert_eq!(report.favorite_failures, vec![PhotoId::from("A")]);
    assert_eq!(report.delete_failed, vec![PhotoId::from("A")]);
    assert_eq!(ids(model.photos()), vec!["A", "B", "C", "D"]);
    assert!(!model.photos()[0].is_favorite);
    assert!(model.pending().favorite_toggle.is_empty());
    assert!(model.pending().keep.is_empty());
    assert!(model.pending().trash.is_empty());
}

#[test]
fn commit_waits_for_every_outcome() {
    let mut model = ready_model(abcd());
    model.source().defer.set(true);
    model.toggle_favorite_intent();
    model.advance_to(1);
    model.toggle_trash_intent();

    assert!(model.commit());
    assert!(model.is_committing());
    assert!(!model.commit(), "second commit is refused while one is outstanding");
    assert!(model.poll().is_none());
    assert_eq!(model.pending_count(), 2);

    model.source().release();
    let report = model.poll().expect("commit settles after release");
    assert!(!model.is_committing());
    assert_eq!(report.favorites_toggled.len(), 1);
    assert_eq!(ids(model.photos()), vec!["A", "C", "D"]);
    assert_eq!(model.pending_count(), 0);
}

#[test]
fn commit_with_nothing_staged_settles_empty() {
    let mut model = ready_model(abcd());
    assert!(model.commit());
    let report = model.poll().expect("nothing to wait for");
    assert_eq!(report.status_line(), "No changes applied");
    assert!(model.source().requests.borrow().is_empty());
}

#[test]
fn intents_staged_during_commit_survive_it() {
    let mut model = ready_model(abcd());
    model.source().defer.set(true);
    model.toggle_trash_intent();
    model.commit();

    model.advance_to(2);
    model.toggle_keep_intent();
    model.source().release();
    model.poll().expect("commit settles");

    assert!(model.pending().trash.is_empty());
    assert!(model.pending().keep.contains(&PhotoId::from("C")));
}

#[test]
fn set_filter_resets_position_and_pending() {
    let mut model = ready_model(vec![
        photo("A", false),
        photo("B", false),
        photo("C", false),
    ]);
    model.advance_to(2);
    model.toggle_trash_intent();
    model.toggle_keep_intent();

    let day = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
    model.set_filter(FilterSpec::date_range(day, day));

    assert_eq!(model.position(), 0);
    assert_eq!(model.pending_count(), 0);
    assert_eq!(model.photos().len(), 3);
    assert_eq!(*model.filter(), FilterSpec::date_range(day, day));
}

#[test]
fn set_filter_reloads_matching_photos_only() {
    let mut old = photo("old", false);
    old.created = at(2024, 1, 1, 9, 0);
    let mut model = ready_model(vec![photo("new", false), old]);

    let day = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
    model.set_filter(FilterSpec::date_range(day, day));
    assert_eq!(ids(model.photos()), vec!["new"]);

    model.set_filter(FilterSpec::date_range(
        NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
    ));
    assert!(model.photos().is_empty());
    assert!(model.current().is_none());
}

#[test]
fn fetch_failure_shows_empty_list() {
    let source = FakeSource::new(abcd());
    source.fail_fetch.set(true);
    let mut model = StagingModel::new(source, FilterSpec::All);
    model.start();
    model.poll();

    assert_eq!(model.phase(), Phase::Ready);
    assert!(model.photos().is_empty());
}

#[test]
fn library_change_keeps_intents_attached_to_their_photos() {
    let mut model = ready_model(abcd());
    model.advance_to(1);
    model.toggle_trash_intent();
    model.advance_to(3);
    model.toggle_keep_intent();
    model.advance_to(1);

    {
        let mut library = model.source().library.borrow_mut();
        library.insert(0, photo("N", false));
        library.retain(|p| p.id.0 != "D");
    }
    model.source().notify_change();
    assert!(model.poll().is_none());

    assert_eq!(ids(model.photos()), vec!["N", "A", "B", "C"]);
    assert_eq!(model.current().map(|p| p.id.0.as_str()), Some("B"));
    assert!(model.is_staged(IntentKind::Trash));
    assert!(model.pending().keep.is_empty(), "intent for a vanished photo is dropped");
}

#[test]
fn authorization_runs_through_authorizing() {
    let mut model = StagingModel::new(FakeSource::new(abcd()), FilterSpec::All);
    assert_eq!(model.phase(), Phase::Uninitialized);
    assert!(!model.commit());

    model.start();
    assert_eq!(model.phase(), Phase::Authorizing);
    assert!(model.photos().is_empty());

    model.poll();
    assert_eq!(model.phase(), Phase::Ready);
    assert_eq!(model.photos().len(), 4);
    assert!(model.is_watching());
}

#[test]
fn denied_access_stays_denied_until_retry() {
    let source = FakeSource::new(abcd());
    source.status.set(AuthorizationStatus::Denied);
    let mut model = StagingModel::new(source, FilterSpec::All);
    model.start();
    model.poll();

    assert_eq!(model.phase(), Phase::Denied(AuthorizationStatus::Denied));
    assert!(model.photos().is_empty());
    assert!(!model.commit());
    model.poll();
    assert_eq!(model.phase(), Phase::Denied(AuthorizationStatus::Denied));

    model.source().status.set(AuthorizationStatus::Limited);
    model.retry_authorization();
    assert_eq!(model.phase(), Phase::Authorizing);
    model.poll();
    assert_eq!(model.phase(), Phase::Ready);
    assert_eq!(model.photos().len(), 4);
}

#[test]
fn restricted_access_is_denied() {
    let source = FakeSource::new(abcd());
    source.status.set(AuthorizationStatus::Restricted);
    let mut model = StagingModel::new(source, FilterSpec::All);
    model.start();
    model.poll();
    assert_eq!(model.phase(), Phase::Denied(AuthorizationStatus::Restricted));
    assert!(!model.is_watching());
}

#[test]
fn library_change_is_reported_once() {
    let mut model = ready_model(abcd());
    assert!(!model.take_library_changed());

    model.source().library.borrow_mut().push(photo("E", false));
    model.source().notify_change();
    model.poll();

    assert!(model.take_library_changed());
    assert!(!model.take_library_changed());
    assert_eq!(model.photos().len(), 5);

    model.toggle_trash_intent();
    model.commit();
    model.poll().expect("commit settles");
    assert!(!model.take_library_changed(), "own commits are not outside changes");
}

#[test]
fn set_filter_while_commit_outstanding_stays_consistent() {
    let mut model = ready_model(abcd());
    model.source().defer.set(true);
    model.advance_to(1);
    model.toggle_trash_intent();
    model.toggle_favorite_intent();
    assert!(model.commit());

    let day = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
    model.set_filter(FilterSpec::date_range(day, day));
    assert_eq!(model.position(), 0);
    assert_eq!(model.pending_count(), 0);
    assert!(model.is_committing());

    model.advance_to(2);
    model.toggle_keep_intent();
    model.source().release();
    let report = model.poll().expect("commit settles after release");

    assert_eq!(report.deleted, vec![PhotoId::from("B")]);
    assert_eq!(ids(model.photos()), vec!["A", "C", "D"]);
    assert_eq!(model.position(), 2);
    assert!(model.pending().trash.is_empty());
    assert!(model.pending().favorite_toggle.is_empty());
    assert!(model.pending().keep.contains(&PhotoId::from("D")));
    assert!(!model.is_committing());
}
