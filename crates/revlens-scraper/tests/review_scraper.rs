//! Integration tests for `ReviewScraper::spawn`.
//!
//! Each test stands up a `wiremock` server that plays the marketplace, so no
//! real network traffic is made. Delays are zeroed and retries disabled
//! unless a test is specifically about them.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revlens_core::ExtractionMode;
use revlens_scraper::{
    ClientSettings, FailureKind, MarketplaceUrls, PageClient, ReviewScraper, ScrapeEvent,
    ScrapeOptions, ScrapeRequest, StopReason,
};

const PAGE_1: &str = "/product-reviews/B0TEST0001/ref=page_1";
const PAGE_2: &str = "/product-reviews/B0TEST0001/ref=page_2";

fn test_scraper(server: &MockServer, max_retries: u32, options: ScrapeOptions) -> ReviewScraper {
    let client = PageClient::new(&ClientSettings {
        timeout_secs: 5,
        user_agent: "revlens-test/0.1".to_string(),
        max_retries,
        backoff_base_secs: 0,
    })
    .expect("failed to build test PageClient");
    let urls = MarketplaceUrls::new(&server.uri()).expect("mock server uri is a valid base");
    ReviewScraper::new(client, urls, options)
}

fn fast_options() -> ScrapeOptions {
    ScrapeOptions {
        initial_delay_ms: 0,
        page_delay_min_ms: 0,
        page_delay_max_ms: 0,
        ..ScrapeOptions::default()
    }
}

fn request(url: String, limit: usize) -> ScrapeRequest {
    ScrapeRequest {
        url,
        product_id: None,
        limit,
    }
}

/// Review block in the current amazon.in layout, where the star icon sits
/// inside the title anchor ahead of the title text.
fn review_block(n: usize) -> String {
    format!(
        r#"<div data-hook="review">
             <a data-hook="review-title">
               <i data-hook="review-star-rating"><span>{rating}.0 out of 5 stars</span></i>
               <span class="a-letter-space"></span>
               <span>Review title {n}</span>
             </a>
             <span data-hook="review-body">
               <span>Body of review number {n}, long enough.</span>
             </span>
           </div>"#,
        rating = (n % 5) + 1
    )
}

fn listing(reviews: std::ops::RangeInclusive<usize>, next: Option<&str>) -> String {
    let blocks: String = reviews.map(review_block).collect();
    let pagination = next.map_or_else(String::new, |href| {
        format!(
            r#"<ul class="a-pagination"><li class="a-last"><a href="{href}">Next</a></li></ul>"#
        )
    });
    format!("<html><body>{blocks}{pagination}</body></html>")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// Scrapes the first listing page of `server` to completion.
async fn scrape_listing(
    scraper: &ReviewScraper,
    server: &MockServer,
    limit: usize,
) -> Vec<ScrapeEvent> {
    let url = format!("{}{PAGE_1}", server.uri());
    collect(scraper.spawn(request(url, limit), CancellationToken::new())).await
}

async fn collect(mut rx: mpsc::Receiver<ScrapeEvent>) -> Vec<ScrapeEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// Asserts the stream ends with exactly one terminal event and returns it.
fn terminal(events: &[ScrapeEvent]) -> &ScrapeEvent {
    assert_eq!(
        events.iter().filter(|e| e.is_terminal()).count(),
        1,
        "expected exactly one terminal event, got {events:?}"
    );
    let last = events.last().expect("stream had no events");
    assert!(last.is_terminal(), "terminal event must come last: {events:?}");
    last
}

fn expect_result(events: &[ScrapeEvent]) -> (&[revlens_core::RawReview], StopReason) {
    match terminal(events) {
        ScrapeEvent::Result {
            reviews,
            stop_reason,
        } => (reviews.as_slice(), *stop_reason),
        other => panic!("expected result event, got {other:?}"),
    }
}

fn expect_error(events: &[ScrapeEvent]) -> FailureKind {
    match terminal(events) {
        ScrapeEvent::Error { kind, .. } => *kind,
        other => panic!("expected error event, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Single page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn limit_two_of_three_blocks_returns_two_without_paginating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=3, None)))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 2).await;

    assert_eq!(
        events[0],
        ScrapeEvent::Progress {
            count: 0,
            total: 2,
            message: "processing url".to_string()
        }
    );
    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(stop_reason, StopReason::LimitReached);
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].review_title, "Review title 1");
    assert_eq!(
        reviews[1].review_text,
        "Body of review number 2, long enough."
    );
    assert_eq!(reviews[0].product_id.as_deref(), Some("B0TEST0001"));
    assert_eq!(reviews[0].rating, 2.0);
    assert!(reviews.iter().all(|r| (0.0..=5.0).contains(&r.rating)));
}

#[tokio::test]
async fn detail_url_is_rewritten_to_review_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product-reviews/B0TEST0001/ref=cm_cr_dp_d_show_all_btm"))
        .respond_with(html(listing(1..=1, None)))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let url = format!("{}/Acme-Phone-12/dp/B0TEST0001/ref=sr_1_1", server.uri());
    let events = collect(scraper.spawn(request(url, 5), CancellationToken::new())).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(stop_reason, StopReason::NoMorePages);
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn explicit_product_id_overrides_derived_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=1, None)))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let req = ScrapeRequest {
        url: format!("{}{PAGE_1}", server.uri()),
        product_id: Some("CUSTOM-ID".to_string()),
        limit: 5,
    };
    let events = collect(scraper.spawn(req, CancellationToken::new())).await;
    let (reviews, _) = expect_result(&events);
    assert_eq!(reviews[0].product_id.as_deref(), Some("CUSTOM-ID"));
}

#[tokio::test]
async fn page_without_review_blocks_yields_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(
            "<html><body><p>No reviews yet</p></body></html>".to_string(),
        ))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 5).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert!(reviews.is_empty());
    assert_eq!(stop_reason, StopReason::NoReviewBlocks);
}

#[tokio::test]
async fn malformed_blocks_yield_placeholders_not_error() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <div data-hook="review"><p>!</p></div>
        <div data-hook="review"><p>?</p></div>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(body.to_string()))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 5).await;

    let (reviews, _) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].review_title, "Review 1");
    assert_eq!(reviews[1].review_title, "Review 2");
    assert_eq!(reviews[0].review_text, "No review text found");
    assert_eq!(reviews[0].rating, 3.0);
}

#[tokio::test]
async fn strict_mode_skips_malformed_blocks() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<html><body><div data-hook="review"><p>!</p></div>{}</body></html>"#,
        review_block(7)
    );
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(body))
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        mode: ExtractionMode::Strict,
        ..fast_options()
    };
    let scraper = test_scraper(&server, 0, options);
    let events = scrape_listing(&scraper, &server, 5).await;

    let (reviews, _) = expect_result(&events);
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].review_title, "Review title 7");
}

// ---------------------------------------------------------------------------
// First-page failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn challenge_page_yields_blocked_error() {
    let server = MockServer::start().await;
    let body = r#"<html><body><form action="/errors/validateCaptcha">
        <h4>Enter the characters you see below</h4></form></body></html>"#;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(body.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 2, fast_options());
    let events = scrape_listing(&scraper, &server, 5).await;

    assert_eq!(expect_error(&events), FailureKind::Blocked);
    assert!(!events.iter().any(|e| matches!(e, ScrapeEvent::Result { .. })));
}

#[tokio::test]
async fn http_503_is_blocked_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 3, fast_options());
    let events = scrape_listing(&scraper, &server, 5).await;

    assert_eq!(expect_error(&events), FailureKind::Blocked);
}

#[tokio::test]
async fn first_page_not_found_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 5).await;

    assert_eq!(expect_error(&events), FailureKind::Network);
}

#[tokio::test]
async fn invalid_url_is_reported_as_error() {
    let server = MockServer::start().await;
    let scraper = test_scraper(&server, 0, fast_options());
    let req = request("not a url".to_string(), 5);
    let events = collect(scraper.spawn(req, CancellationToken::new())).await;

    assert_eq!(expect_error(&events), FailureKind::InvalidUrl);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paginates_until_no_next_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(html(listing(3..=4, None)))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 10).await;

    let counts: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ScrapeEvent::Progress { count, .. } => Some(*count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![0, 2, 4]);

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(stop_reason, StopReason::NoMorePages);
    let titles: Vec<&str> = reviews.iter().map(|r| r.review_title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Review title 1",
            "Review title 2",
            "Review title 3",
            "Review title 4",
        ]
    );
}

#[tokio::test]
async fn stops_paginating_once_limit_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(html(listing(3..=4, None)))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 3).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(stop_reason, StopReason::LimitReached);
    assert_eq!(reviews.len(), 3);
}

#[tokio::test]
async fn blocked_next_page_keeps_partial_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 10).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(stop_reason, StopReason::NextPageBlocked);
}

#[tokio::test]
async fn failed_next_page_keeps_partial_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 10).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(stop_reason, StopReason::NextPageFailed);
}

#[tokio::test]
async fn page_cap_stops_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(html(listing(3..=4, None)))
        .expect(0)
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        max_pages: 1,
        ..fast_options()
    };
    let scraper = test_scraper(&server, 0, options);
    let events = scrape_listing(&scraper, &server, 10).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(stop_reason, StopReason::PageCap);
}

#[tokio::test]
async fn next_link_to_same_page_ends_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_1))))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server, 0, fast_options());
    let events = scrape_listing(&scraper, &server, 10).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(stop_reason, StopReason::NoMorePages);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_before_start_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(listing(1..=3, None)))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let scraper = test_scraper(&server, 0, fast_options());
    let url = format!("{}{PAGE_1}", server.uri());
    let events = collect(scraper.spawn(request(url, 5), cancel)).await;

    let (reviews, stop_reason) = expect_result(&events);
    assert!(reviews.is_empty());
    assert_eq!(stop_reason, StopReason::Cancelled);
}

#[tokio::test]
async fn cancel_during_page_delay_keeps_collected_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(html(listing(1..=2, Some(PAGE_2))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_2))
        .respond_with(html(listing(3..=4, None)))
        .expect(0)
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        page_delay_min_ms: 60_000,
        page_delay_max_ms: 60_000,
        ..fast_options()
    };
    let scraper = test_scraper(&server, 0, options);
    let cancel = CancellationToken::new();
    let url = format!("{}{PAGE_1}", server.uri());
    let mut rx = scraper.spawn(request(url, 10), cancel.clone());

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        // Page one is done once its progress event arrives; the scraper is
        // now sleeping.
        if matches!(event, ScrapeEvent::Progress { count: 2, .. }) {
            cancel.cancel();
        }
        events.push(event);
    }

    let (reviews, stop_reason) = expect_result(&events);
    assert_eq!(reviews.len(), 2);
    assert_eq!(stop_reason, StopReason::Cancelled);
}
