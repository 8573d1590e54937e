use thiserror::Error;

/// A backend reply to be carried out on the host page instead of shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Same-tab navigation to an absolute URL.
    Navigate { target: String },
    /// Activate the first element matching a CSS selector.
    Activate { selector: String },
}

impl Directive {
    /// Derives a directive from a reply's side-channel flags. Navigation wins
    /// when both flags are set.
    pub fn from_flags(text: &str, link: bool, button: bool) -> Option<Self> {
        let payload = text.trim().to_string();
        if link {
            Some(Self::Navigate { target: payload })
        } else if button {
            Some(Self::Activate { selector: payload })
        } else {
            None
        }
    }
}

/// What a backend reply turns into: exactly one of a bubble, a side effect,
/// or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    Bubble(String),
    Directive(Directive),
    Nothing,
}

impl ReplyContent {
    pub fn classify(text: Option<&str>, link: bool, button: bool) -> Self {
        let text = text.unwrap_or_default();
        if let Some(directive) = Directive::from_flags(text, link, button) {
            return Self::Directive(directive);
        }
        if text.trim().is_empty() {
            Self::Nothing
        } else {
            Self::Bubble(text.to_string())
        }
    }
}

/// Result of executing a directive against the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    Navigated { url: String },
    AlreadyAtTarget { url: String },
    Activated { selector: String },
    Failed(DispatchFailure),
}

/// Directive failures. The `Display` form is the diagnostic bubble text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchFailure {
    #[error("[Empty directive from assistant]")]
    EmptyPayload,
    #[error("[Invalid link: {target}]")]
    InvalidTarget { target: String },
    #[error("[Invalid selector: {selector} ({reason})]")]
    InvalidSelector { selector: String, reason: String },
    #[error("[Element not found: {selector} after {attempts} attempts]")]
    ElementNotFound { selector: String, attempts: u32 },
    #[error("[Could not click {selector}: {reason}]")]
    ActivationFailed { selector: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::{Directive, DispatchFailure, ReplyContent};

    #[test]
    fn flags_select_directive_kind() {
        assert_eq!(
            Directive::from_flags(" https://site.com/contact ", true, false),
            Some(Directive::Navigate {
                target: "https://site.com/contact".to_string()
            })
        );
        assert_eq!(
            Directive::from_flags("#buy", false, true),
            Some(Directive::Activate {
                selector: "#buy".to_string()
            })
        );
        assert_eq!(Directive::from_flags("plain", false, false), None);
    }

    #[test]
    fn navigation_wins_when_both_flags_set() {
        assert!(matches!(
            Directive::from_flags("https://a.example", true, true),
            Some(Directive::Navigate { .. })
        ));
    }

    #[test]
    fn classify_never_yields_bubble_for_directives() {
        assert!(matches!(
            ReplyContent::classify(Some("https://x.example"), true, false),
            ReplyContent::Directive(_)
        ));
        assert_eq!(
            ReplyContent::classify(Some("9-5"), false, false),
            ReplyContent::Bubble("9-5".to_string())
        );
        assert_eq!(ReplyContent::classify(None, false, false), ReplyContent::Nothing);
        assert_eq!(ReplyContent::classify(Some("  "), false, false), ReplyContent::Nothing);
    }

    #[test]
    fn failures_render_as_bracketed_text() {
        let failure = DispatchFailure::ElementNotFound {
            selector: "#missing".to_string(),
            attempts: 5,
        };
        assert_eq!(
            failure.to_string(),
            "[Element not found: #missing after 5 attempts]"
        );
    }
}
