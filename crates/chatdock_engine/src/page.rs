use std::sync::{Mutex, PoisonError};

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Data attributes some sites use to carry a link target on non-anchor elements.
const DATA_LINK_ATTRIBUTES: [&str; 3] = ["data-href", "data-url", "data-link"];

/// Link-bearing facts about the first element matching a selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementTarget {
    pub own_href: Option<String>,
    pub ancestor_href: Option<String>,
    pub data_url: Option<String>,
}

impl ElementTarget {
    /// Candidate link targets in preference order.
    pub fn link_candidates(&self) -> impl Iterator<Item = &str> {
        [&self.own_href, &self.ancestor_href, &self.data_url]
            .into_iter()
            .filter_map(|candidate| candidate.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("element is no longer in the page")]
    Detached,
    #[error("element is disabled")]
    Disabled,
}

/// The page the widget is embedded in.
pub trait HostPage: Send + Sync {
    fn location(&self) -> Url;

    /// Same-tab navigation.
    fn navigate(&self, url: &Url);

    /// First element matching an already validated selector.
    fn find(&self, selector: &str) -> Option<ElementTarget>;

    /// Synthetic activation of the first element matching `selector`.
    fn activate(&self, selector: &str) -> Result<(), ActivationError>;
}

/// Checks CSS selector syntax without touching any page.
pub fn validate_selector(selector: &str) -> Result<(), String> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// Resolves a link target against the page location. Fragment-only and
/// `javascript:` targets are not navigable.
pub fn resolve_link(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    Url::parse(trimmed).or_else(|_| base.join(trimmed)).ok()
}

/// Host page backed by an in-memory HTML document.
///
/// The document can be swapped at any time to model content that appears
/// after the widget asked for it.
#[derive(Debug)]
pub struct HtmlPage {
    inner: Mutex<PageInner>,
}

#[derive(Debug)]
struct PageInner {
    location: Url,
    html: String,
    visited: Vec<Url>,
    activated: Vec<String>,
}

impl HtmlPage {
    pub fn new(location: Url, html: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(PageInner {
                location,
                html: html.into(),
                visited: Vec::new(),
                activated: Vec::new(),
            }),
        }
    }

    pub fn replace_document(&self, html: impl Into<String>) {
        self.lock().html = html.into();
    }

    /// Every URL navigated to, oldest first.
    pub fn visited(&self) -> Vec<Url> {
        self.lock().visited.clone()
    }

    /// Selectors of every successful synthetic activation.
    pub fn activated(&self) -> Vec<String> {
        self.lock().activated.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostPage for HtmlPage {
    fn location(&self) -> Url {
        self.lock().location.clone()
    }

    fn navigate(&self, url: &Url) {
        let mut inner = self.lock();
        inner.location = url.clone();
        inner.visited.push(url.clone());
    }

    fn find(&self, selector: &str) -> Option<ElementTarget> {
        let selector = Selector::parse(selector).ok()?;
        let document = Html::parse_document(&self.lock().html);
        let element = document.select(&selector).next()?;
        Some(ElementTarget {
            own_href: element.value().attr("href").map(str::to_string),
            ancestor_href: enclosing_link_href(element),
            data_url: DATA_LINK_ATTRIBUTES
                .iter()
                .find_map(|name| element.value().attr(name))
                .map(str::to_string),
        })
    }

    fn activate(&self, selector: &str) -> Result<(), ActivationError> {
        let parsed = Selector::parse(selector).map_err(|_| ActivationError::Detached)?;
        let mut inner = self.lock();
        let disabled = {
            let document = Html::parse_document(&inner.html);
            let element = document
                .select(&parsed)
                .next()
                .ok_or(ActivationError::Detached)?;
            let attrs = element.value();
            attrs.attr("disabled").is_some()
                || attrs
                    .attr("aria-disabled")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        };
        if disabled {
            return Err(ActivationError::Disabled);
        }
        inner.activated.push(selector.to_string());
        Ok(())
    }
}

fn enclosing_link_href(element: ElementRef<'_>) -> Option<String> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a" && ancestor.value().attr("href").is_some())
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{resolve_link, validate_selector, HostPage, HtmlPage};

    fn page(html: &str) -> HtmlPage {
        HtmlPage::new(Url::parse("https://shop.example/products/").unwrap(), html)
    }

    #[test]
    fn selector_syntax_is_checked() {
        assert!(validate_selector("#buy > .primary").is_ok());
        assert!(validate_selector("div[").is_err());
        assert!(validate_selector("").is_err());
    }

    #[test]
    fn resolve_link_skips_non_navigable_targets() {
        let base = Url::parse("https://shop.example/products/").unwrap();
        assert_eq!(
            resolve_link("../contact", &base).unwrap().as_str(),
            "https://shop.example/contact"
        );
        assert!(resolve_link("#top", &base).is_none());
        assert!(resolve_link("JavaScript:void(0)", &base).is_none());
        assert!(resolve_link("  ", &base).is_none());
    }

    #[test]
    fn find_reports_own_ancestor_and_data_links() {
        let page = page(
            r#"<html><body>
                <a href="/cart"><span id="cart-icon">cart</span></a>
                <div id="promo" data-url="/sale">sale</div>
                <a id="direct" href="/direct">direct</a>
            </body></html>"#,
        );

        let icon = page.find("#cart-icon").unwrap();
        assert_eq!(icon.own_href, None);
        assert_eq!(icon.ancestor_href.as_deref(), Some("/cart"));

        let promo = page.find("#promo").unwrap();
        assert_eq!(promo.data_url.as_deref(), Some("/sale"));

        let direct = page.find("#direct").unwrap();
        assert_eq!(direct.link_candidates().next(), Some("/direct"));

        assert!(page.find("#absent").is_none());
    }

    #[test]
    fn activation_respects_disabled_state() {
        let page = page(r#"<button id="go">Go</button><button id="off" disabled>Off</button>"#);
        assert!(page.activate("#go").is_ok());
        assert!(page.activate("#off").is_err());
        assert!(page.activate("#gone").is_err());
        assert_eq!(page.activated(), vec!["#go".to_string()]);
    }
}
