//! Simulated navigation and pop-state replay, end to end.
//!
//! The round trip under test: navigate (content spliced, history entry
//! pushed), walk back (home record replayed, original content restored),
//! walk forward (full record replayed) — with the entry count proving that
//! replays consume entries rather than creating them.

use std::sync::Arc;

use pagegraft::{
    DocumentAdapter, Graft, GraftEvent, HistoryBackend, HistoryState, MemoryHistory, MemoryPage,
    NavigateRequest, Replay,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME_BODY: &str = "<html><head><title>Home</title></head><body>\
                         <div id=\"content\"><p>original</p></div>\
                         </body></html>";

async fn site() -> MockServer {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOME_BODY))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second.frag"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>second page</p>"))
        .mount(&server)
        .await;
    server
}

fn page_and_history(server: &MockServer) -> (Arc<MemoryPage>, Arc<MemoryHistory>) {
    let page = Arc::new(MemoryPage::new());
    page.insert_element("content", "<p>original</p>");
    page.set_title("Home");
    let history = Arc::new(MemoryHistory::new(&format!("{}/", server.uri())));
    (page, history)
}

#[tokio::test]
async fn test_navigation_then_back_restores_prior_content() {
    let server = site().await;
    let (page, history) = page_and_history(&server);
    let graft = Graft::new(
        page.clone(),
        Arc::new(pagegraft::HttpFetcher::new()),
        history.clone(),
    );

    let mut request = NavigateRequest::new("content", format!("{}/second.frag", server.uri()));
    request.new_title = Some("Second".to_string());
    graft.simulate_navigation(request).await.unwrap();

    assert_eq!(page.inner_markup("content").unwrap(), "<p>second page</p>");
    assert_eq!(page.title(), "Second");
    assert_eq!(history.entry_count(), 2);
    assert_eq!(
        history.current_url(),
        format!("{}/second.frag", server.uri())
    );

    // Back: the home record replays the original page into the target.
    let restored = history.back();
    match graft.on_pop_state(restored).await {
        Replay::Completed(Ok(_)) => {}
        other => panic!("expected completed replay, got {other:?}"),
    }
    assert_eq!(page.inner_markup("content").unwrap(), "<p>original</p>");
    assert_eq!(page.title(), "Home");
    // Replay consumed the existing entry; none was added.
    assert_eq!(history.entry_count(), 2);
}

#[tokio::test]
async fn test_back_then_forward_round_trip() {
    let server = site().await;
    let (page, history) = page_and_history(&server);
    let graft = Graft::new(
        page.clone(),
        Arc::new(pagegraft::HttpFetcher::new()),
        history.clone(),
    );

    let mut request = NavigateRequest::new("content", format!("{}/second.frag", server.uri()));
    request.new_title = Some("Second".to_string());
    graft.simulate_navigation(request).await.unwrap();

    let back_state = history.back();
    assert!(matches!(
        graft.on_pop_state(back_state).await,
        Replay::Completed(Ok(_))
    ));
    assert_eq!(page.inner_markup("content").unwrap(), "<p>original</p>");

    let forward_state = history.forward();
    assert!(matches!(
        graft.on_pop_state(forward_state).await,
        Replay::Completed(Ok(_))
    ));
    assert_eq!(page.inner_markup("content").unwrap(), "<p>second page</p>");
    assert_eq!(page.title(), "Second");
    assert_eq!(history.entry_count(), 2);
}

#[tokio::test]
async fn test_pretend_url_shown_and_replayable() {
    let server = site().await;
    let (page, history) = page_and_history(&server);
    let graft = Graft::new(
        page.clone(),
        Arc::new(pagegraft::HttpFetcher::new()),
        history.clone(),
    );

    let pretty = format!("{}/second", server.uri());
    let mut request = NavigateRequest::new("content", format!("{}/second.frag", server.uri()));
    request.pretend_url = Some(pretty.clone());
    graft.simulate_navigation(request).await.unwrap();

    // The cosmetic address is shown, not the fetch URL.
    assert_eq!(history.current_url(), pretty);
    let committed: HistoryState = serde_json::from_value(history.state().unwrap()).unwrap();
    assert_eq!(committed.pretend_url.as_deref(), Some(pretty.as_str()));

    // And the record still replays from the literal fetch URL.
    history.back();
    let forward_state = history.forward();
    assert!(matches!(
        graft.on_pop_state(forward_state).await,
        Replay::Completed(Ok(_))
    ));
    assert_eq!(page.inner_markup("content").unwrap(), "<p>second page</p>");
}

#[tokio::test]
async fn test_second_navigation_keeps_single_home_record() {
    let server = site().await;
    Mock::given(method("GET"))
        .and(path("/third.frag"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>third page</p>"))
        .mount(&server)
        .await;

    let (page, history) = page_and_history(&server);
    let graft = Graft::new(
        page.clone(),
        Arc::new(pagegraft::HttpFetcher::new()),
        history.clone(),
    );

    graft
        .simulate_navigation(NavigateRequest::new(
            "content",
            format!("{}/second.frag", server.uri()),
        ))
        .await
        .unwrap();
    graft
        .simulate_navigation(NavigateRequest::new(
            "content",
            format!("{}/third.frag", server.uri()),
        ))
        .await
        .unwrap();
    assert_eq!(history.entry_count(), 3);

    // Walk all the way back: the oldest entry is still the home record.
    history.back();
    let oldest = history.back();
    let home: HistoryState = serde_json::from_value(oldest.unwrap()).unwrap();
    assert!(home.is_home());
    assert_eq!(home.start_url, format!("{}/", server.uri()));

    match graft.on_pop_state(Some(serde_json::to_value(&home).unwrap())).await {
        Replay::Completed(Ok(_)) => {}
        other => panic!("expected completed replay, got {other:?}"),
    }
    assert_eq!(page.inner_markup("content").unwrap(), "<p>original</p>");
}

#[tokio::test]
async fn test_pop_state_without_state_is_ignored() {
    let server = site().await;
    let (page, history) = page_and_history(&server);
    let graft = Graft::new(page, Arc::new(pagegraft::HttpFetcher::new()), history);

    assert!(matches!(graft.on_pop_state(None).await, Replay::NotOurs));
}

#[tokio::test]
async fn test_replay_mismatch_falls_back_to_hard_reload() {
    let server = site().await;
    let (page, history) = page_and_history(&server);
    let graft = Graft::new(
        page.clone(),
        Arc::new(pagegraft::HttpFetcher::new()),
        history.clone(),
    );
    let mut events = graft.subscribe();

    // A record whose committed address does not match where we are now.
    let stale = serde_json::json!({
        "target_id": "content",
        "content_url": "https://elsewhere.test/page",
        "start_url": format!("{}/", server.uri()),
    });

    match graft.on_pop_state(Some(stale)).await {
        Replay::HardReload { start_url } => {
            assert_eq!(start_url, format!("{}/", server.uri()));
        }
        other => panic!("expected hard reload, got {other:?}"),
    }
    assert_eq!(history.hard_loads(), vec![format!("{}/", server.uri())]);
    assert!(matches!(
        events.try_recv().unwrap(),
        GraftEvent::ReplayFallback { .. }
    ));
    // The page itself was left alone.
    assert_eq!(page.inner_markup("content").unwrap(), "<p>original</p>");
}
