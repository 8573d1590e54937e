use std::sync::Arc;
use std::time::Duration;

use chatdock_core::{Directive, DispatchFailure, DispatchReport, RetryPolicy, RetryStep};
use chatdock_logging::{dock_debug, dock_info};
use url::Url;

use crate::page::{resolve_link, validate_selector, ElementTarget, HostPage};

/// Source of retry delays.
#[async_trait::async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait::async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Carries out backend directives against the host page.
pub struct ActionDispatcher {
    page: Arc<dyn HostPage>,
    timer: Arc<dyn Timer>,
    policy: RetryPolicy,
}

impl ActionDispatcher {
    pub fn new(page: Arc<dyn HostPage>, timer: Arc<dyn Timer>, policy: RetryPolicy) -> Self {
        Self {
            page,
            timer,
            policy,
        }
    }

    pub async fn dispatch(&self, directive: Directive) -> DispatchReport {
        match directive {
            Directive::Navigate { target } => self.navigate(&target),
            Directive::Activate { selector } => self.activate(&selector).await,
        }
    }

    fn navigate(&self, target: &str) -> DispatchReport {
        if target.is_empty() {
            return DispatchReport::Failed(DispatchFailure::EmptyPayload);
        }
        let current = self.page.location();
        match Url::parse(target).or_else(|_| current.join(target)) {
            Ok(url) => self.go_to(url, &current),
            Err(_) => DispatchReport::Failed(DispatchFailure::InvalidTarget {
                target: target.to_string(),
            }),
        }
    }

    fn go_to(&self, url: Url, current: &Url) -> DispatchReport {
        if &url == current {
            return DispatchReport::AlreadyAtTarget {
                url: url.to_string(),
            };
        }
        dock_info!("Navigating same-tab to {}", url);
        self.page.navigate(&url);
        DispatchReport::Navigated {
            url: url.to_string(),
        }
    }

    async fn activate(&self, selector: &str) -> DispatchReport {
        if selector.is_empty() {
            return DispatchReport::Failed(DispatchFailure::EmptyPayload);
        }
        // Syntax errors fail without entering the retry chain.
        if let Err(reason) = validate_selector(selector) {
            return DispatchReport::Failed(DispatchFailure::InvalidSelector {
                selector: selector.to_string(),
                reason,
            });
        }

        let mut chain = self.policy.chain();
        loop {
            if let Some(target) = self.page.find(selector) {
                return self.activate_found(selector, &target);
            }
            match chain.record_miss() {
                RetryStep::Wait(delay) => {
                    dock_debug!(
                        "No match for {} (attempt {}); retrying in {:?}",
                        selector,
                        chain.attempts(),
                        delay
                    );
                    self.timer.sleep(delay).await;
                }
                RetryStep::Exhausted { attempts } => {
                    return DispatchReport::Failed(DispatchFailure::ElementNotFound {
                        selector: selector.to_string(),
                        attempts,
                    });
                }
            }
        }
    }

    /// Follows the element's link when one is derivable and leads elsewhere;
    /// synthetic activation is the fallback.
    fn activate_found(&self, selector: &str, target: &ElementTarget) -> DispatchReport {
        let current = self.page.location();
        if let Some(url) = target
            .link_candidates()
            .filter_map(|candidate| resolve_link(candidate, &current))
            .find(|url| url != &current)
        {
            return self.go_to(url, &current);
        }
        match self.page.activate(selector) {
            Ok(()) => DispatchReport::Activated {
                selector: selector.to_string(),
            },
            Err(err) => DispatchReport::Failed(DispatchFailure::ActivationFailed {
                selector: selector.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}
