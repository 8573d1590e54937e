use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatdock_core::{Directive, DispatchFailure, DispatchReport, RetryPolicy};
use chatdock_engine::{ActionDispatcher, HostPage, HtmlPage, Timer};
use pretty_assertions::assert_eq;
use url::Url;

/// Virtual clock: records requested delays and returns at once, optionally
/// running a hook after a given number of sleeps.
#[derive(Default)]
struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
    reveal: Mutex<Option<(usize, Arc<HtmlPage>, String)>>,
}

impl RecordingTimer {
    fn revealing_after(sleeps: usize, page: Arc<HtmlPage>, html: &str) -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
            reveal: Mutex::new(Some((sleeps, page, html.to_string()))),
        }
    }

    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, delay: Duration) {
        let count = {
            let mut delays = self.delays.lock().unwrap();
            delays.push(delay);
            delays.len()
        };
        let mut reveal = self.reveal.lock().unwrap();
        if reveal.as_ref().is_some_and(|(after, _, _)| *after == count) {
            if let Some((_, page, html)) = reveal.take() {
                page.replace_document(html);
            }
        }
    }
}

fn shop_page(html: &str) -> Arc<HtmlPage> {
    Arc::new(HtmlPage::new(
        Url::parse("https://shop.example/products/").unwrap(),
        html,
    ))
}

fn dispatcher(page: &Arc<HtmlPage>, timer: &Arc<RecordingTimer>) -> ActionDispatcher {
    ActionDispatcher::new(page.clone(), timer.clone(), RetryPolicy::default())
}

fn activate(selector: &str) -> Directive {
    Directive::Activate {
        selector: selector.to_string(),
    }
}

#[tokio::test]
async fn invalid_selector_fails_without_retrying() {
    let page = shop_page("<p>hi</p>");
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("div[")).await;

    let DispatchReport::Failed(DispatchFailure::InvalidSelector { selector, .. }) = report else {
        panic!("expected invalid selector, got {report:?}");
    };
    assert_eq!(selector, "div[");
    assert!(timer.delays().is_empty());
}

#[tokio::test]
async fn missing_element_exhausts_the_retry_budget() {
    let page = shop_page("<p>hi</p>");
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("#checkout")).await;

    assert_eq!(
        report,
        DispatchReport::Failed(DispatchFailure::ElementNotFound {
            selector: "#checkout".to_string(),
            attempts: 5,
        })
    );
    assert_eq!(timer.delays(), vec![Duration::from_millis(200); 4]);
    assert_eq!(
        report_text(&report),
        "[Element not found: #checkout after 5 attempts]"
    );
}

#[tokio::test]
async fn element_appearing_mid_chain_is_activated() {
    let page = shop_page("<p>loading</p>");
    let timer = Arc::new(RecordingTimer::revealing_after(
        2,
        page.clone(),
        r#"<button id="checkout">Checkout</button>"#,
    ));

    let report = dispatcher(&page, &timer).dispatch(activate("#checkout")).await;

    assert_eq!(
        report,
        DispatchReport::Activated {
            selector: "#checkout".to_string()
        }
    );
    assert_eq!(timer.delays().len(), 2);
    assert_eq!(page.activated(), vec!["#checkout".to_string()]);
}

#[tokio::test]
async fn matched_elements_prefer_their_link() {
    let cases = [
        (r#"<a id="target" href="/cart">Cart</a>"#, "https://shop.example/cart"),
        (
            r#"<a href="../help"><span id="target">Help</span></a>"#,
            "https://shop.example/help",
        ),
        (
            r#"<div id="target" data-href="https://other.example/deal">Deal</div>"#,
            "https://other.example/deal",
        ),
    ];

    for (html, expected) in cases {
        let page = shop_page(html);
        let timer = Arc::new(RecordingTimer::default());

        let report = dispatcher(&page, &timer).dispatch(activate("#target")).await;

        assert_eq!(
            report,
            DispatchReport::Navigated {
                url: expected.to_string()
            }
        );
        assert_eq!(page.location().as_str(), expected);
        assert!(page.activated().is_empty());
    }
}

#[tokio::test]
async fn fragment_links_fall_back_to_activation() {
    let page = shop_page(r##"<a id="menu" href="#">Menu</a>"##);
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("#menu")).await;

    assert_eq!(
        report,
        DispatchReport::Activated {
            selector: "#menu".to_string()
        }
    );
    assert!(page.visited().is_empty());
}

#[tokio::test]
async fn link_to_current_page_is_activated_instead() {
    let page = shop_page(r#"<a id="here" href="/products/">Products</a>"#);
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("#here")).await;

    assert_eq!(
        report,
        DispatchReport::Activated {
            selector: "#here".to_string()
        }
    );
    assert!(page.visited().is_empty());
}

#[tokio::test]
async fn disabled_element_reports_activation_failure() {
    let page = shop_page(r#"<button id="buy" aria-disabled="true">Buy</button>"#);
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("#buy")).await;

    let DispatchReport::Failed(failure @ DispatchFailure::ActivationFailed { .. }) = &report else {
        panic!("expected activation failure, got {report:?}");
    };
    assert!(failure.to_string().starts_with("[Could not click #buy:"));
}

#[tokio::test]
async fn navigation_to_current_location_is_skipped() {
    let page = shop_page("");
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer)
        .dispatch(Directive::Navigate {
            target: "https://shop.example/products/".to_string(),
        })
        .await;

    assert_eq!(
        report,
        DispatchReport::AlreadyAtTarget {
            url: "https://shop.example/products/".to_string()
        }
    );
    assert!(page.visited().is_empty());
}

#[tokio::test]
async fn navigation_goes_same_tab_and_resolves_relative_targets() {
    let page = shop_page("");
    let timer = Arc::new(RecordingTimer::default());
    let dispatcher = dispatcher(&page, &timer);

    dispatcher
        .dispatch(Directive::Navigate {
            target: "https://site.com/contact".to_string(),
        })
        .await;
    dispatcher
        .dispatch(Directive::Navigate {
            target: "/about".to_string(),
        })
        .await;

    let visited: Vec<String> = page.visited().iter().map(Url::to_string).collect();
    assert_eq!(
        visited,
        vec!["https://site.com/contact", "https://site.com/about"]
    );
}

#[tokio::test]
async fn empty_payload_is_a_diagnostic() {
    let page = shop_page("");
    let timer = Arc::new(RecordingTimer::default());

    let report = dispatcher(&page, &timer).dispatch(activate("")).await;

    assert_eq!(report, DispatchReport::Failed(DispatchFailure::EmptyPayload));
}

fn report_text(report: &DispatchReport) -> String {
    match report {
        DispatchReport::Failed(failure) => failure.to_string(),
        other => format!("{other:?}"),
    }
}
