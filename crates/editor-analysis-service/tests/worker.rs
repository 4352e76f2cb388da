use editor_analysis::{Buffer, Coordinate, EditEvent, Range};
use editor_analysis_service::{
    AnalysisConfig, AnalysisWorker, LexicalEngine, Query, QueryResult, WorkerError, WorkerEvent,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(reanalysis_delay_ms: u64) -> AnalysisConfig {
    AnalysisConfig {
        reanalysis_delay_ms,
        ..AnalysisConfig::default()
    }
}

fn next_diagnostics(worker: &mut AnalysisWorker) -> Option<(u64, usize)> {
    for _ in 0..50 {
        match worker.recv_timeout(Duration::from_millis(100)) {
            Some(WorkerEvent::Diagnostics {
                generation,
                annotations,
            }) => return Some((generation, annotations.len())),
            Some(_) | None => continue,
        }
    }
    None
}

#[test]
fn test_worker_replays_changes_in_order() {
    init_tracing();
    let mut ui = Buffer::from_lines(["var total = 1;", ""]);
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), &ui.text(), &config(10_000));

    let events = vec![
        ui.insert_text(Coordinate::new(1, 0), "tot"),
        ui.insert_text(Coordinate::new(1, 3), "al"),
        ui.remove_text(Range::from_rows(1, 4, 1, 5)),
    ];
    worker.send_changes(events).unwrap();

    let offset = ui.text().len();
    let result = worker
        .query(Query::Completions {
            offset,
            is_member_completion: false,
        })
        .unwrap();
    let QueryResult::Completions(Some(info)) = result else {
        panic!("expected completions");
    };
    let names: Vec<&str> = info.entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"total"));
    assert!(!names.contains(&"tota"));

    worker.shutdown();
}

#[test]
fn test_debounced_diagnostics_only_for_latest_schedule() {
    init_tracing();
    let mut ui = Buffer::from_text("function f() {\n}");
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), &ui.text(), &config(150));

    // Spawning schedules generation 1; three quick changes supersede it.
    let e1 = ui.remove_text(Range::from_rows(1, 0, 1, 1));
    worker.send_changes(vec![e1]).unwrap();
    let e2 = ui.insert_text(Coordinate::new(1, 0), "  return 1;");
    worker.send_changes(vec![e2]).unwrap();
    let e3 = ui.insert_text(Coordinate::new(1, 11), "\n");
    worker.send_changes(vec![e3]).unwrap();

    assert_eq!(next_diagnostics(&mut worker), Some((4, 1)));
    assert!(worker.recv_timeout(Duration::from_millis(300)).is_none());
}

#[test]
fn test_failed_event_resyncs_worker() {
    init_tracing();
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), "abc", &config(10_000));

    let bogus = EditEvent::RemoveText {
        range: Range::from_rows(5, 0, 5, 2),
        text: "zz".to_string(),
    };
    worker.send_changes(vec![bogus]).unwrap();

    let result = worker.query(Query::Diagnostics).unwrap();
    assert_eq!(result, QueryResult::Diagnostics(Vec::new()));
    assert!(matches!(
        worker.try_recv(),
        Some(WorkerEvent::Failed { .. })
    ));
}

fn declared_names(worker: &mut AnalysisWorker, fragment: &str) -> Vec<String> {
    let QueryResult::NavigateTo(items) = worker
        .query(Query::NavigateTo {
            query: fragment.to_string(),
        })
        .unwrap()
    else {
        panic!("expected navigate-to items");
    };
    items.into_iter().map(|item| item.name).collect()
}

#[test]
fn test_failed_edit_drops_changes_until_content_is_reset() {
    init_tracing();
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), "var abc;", &config(10_000));

    let bogus = EditEvent::RemoveText {
        range: Range::from_rows(5, 0, 5, 2),
        text: "zz".to_string(),
    };
    let later = EditEvent::InsertText {
        range: Range::from_rows(0, 8, 1, 8),
        text: "\nvar dee;".to_string(),
    };
    worker.send_changes(vec![bogus, later.clone()]).unwrap();
    worker.send_changes(vec![later]).unwrap();

    assert!(declared_names(&mut worker, "dee").is_empty());
    assert_eq!(declared_names(&mut worker, "abc"), vec!["abc".to_string()]);
    let Some(WorkerEvent::Failed { skipped, .. }) = worker.try_recv() else {
        panic!("expected a failure event");
    };
    assert_eq!(skipped, 1);
    assert_eq!(worker.try_recv(), None);

    worker.set_content("var abc;\nvar dee;").unwrap();
    assert_eq!(declared_names(&mut worker, "dee"), vec!["dee".to_string()]);

    let append = EditEvent::InsertText {
        range: Range::from_rows(1, 8, 2, 8),
        text: "\nvar eff;".to_string(),
    };
    worker.send_changes(vec![append]).unwrap();
    assert_eq!(declared_names(&mut worker, "eff"), vec!["eff".to_string()]);
}

#[test]
fn test_wait_for_unknown_response_times_out() {
    init_tracing();
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), "", &config(10_000));
    assert_eq!(
        worker.wait_for_response(99, Duration::from_millis(50)),
        Err(WorkerError::Timeout { id: 99 })
    );
}

#[test]
fn test_navigate_to_includes_libraries() {
    init_tracing();
    let mut worker = AnalysisWorker::spawn(LexicalEngine::new(), "var a;", &config(10_000));
    let id = worker
        .request(Query::NavigateTo {
            query: "a".to_string(),
        })
        .unwrap();
    let QueryResult::NavigateTo(items) = worker
        .wait_for_response(id, Duration::from_secs(2))
        .unwrap()
    else {
        panic!("expected navigate-to items");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "a");

    worker.add_library("lib.d.ts", "declare var b: number;\r\n").unwrap();
    let QueryResult::NavigateTo(items) = worker
        .query(Query::NavigateTo {
            query: "b".to_string(),
        })
        .unwrap()
    else {
        panic!("expected navigate-to items");
    };
    assert_eq!(items[0].file_name, "lib.d.ts");
}
