//! Validation for the embed insertion dialog.

use std::sync::LazyLock;

use miette::Diagnostic;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EMBED_MARKER;
use crate::registry::USER_INFO_URL;

/// Loose "looks like a web address" check used by the insertion dialog.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[(http(s)?)://(www\.)?a-zA-Z0-9@:%._+~#=]{2,256}\.[a-z]{2,6}\b([-a-zA-Z0-9@:%_+.~#?&/=]*)")
        .expect("url regex is valid")
});

/// Default title of the identity preset.
pub const USER_INFO_TITLE: &str = "Current user info";

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum FormError {
    #[error("title is required")]
    #[diagnostic(code(weaver_embed::form::required_title))]
    RequiredTitle,

    #[error("URL is required")]
    #[diagnostic(code(weaver_embed::form::required_url))]
    RequiredUrl,

    #[error("invalid URL")]
    #[diagnostic(
        code(weaver_embed::form::invalid_url),
        help("enter a full link such as https://youtu.be/dQw4w9WgXcQ")
    )]
    InvalidUrl,
}

impl FormError {
    /// The form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            FormError::RequiredTitle => "title",
            FormError::RequiredUrl | FormError::InvalidUrl => "url",
        }
    }
}

/// The title/URL pair entered in the insertion dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedForm {
    pub title: String,
    pub url: String,
}

impl EmbedForm {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// The "insert user info" preset.
    pub fn user_info() -> Self {
        Self::new(USER_INFO_TITLE, USER_INFO_URL)
    }

    /// Check fields in dialog order, reporting the first problem.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.is_empty() {
            return Err(FormError::RequiredTitle);
        }
        if self.url.is_empty() {
            return Err(FormError::RequiredUrl);
        }
        if self.url == USER_INFO_URL || URL_REGEX.is_match(&self.url) {
            Ok(())
        } else {
            Err(FormError::InvalidUrl)
        }
    }

    /// Validate, then format as a marked markdown link.
    pub fn to_markdown(&self) -> Result<String, FormError> {
        self.validate()?;
        let mut out = String::with_capacity(self.title.len() + self.url.len() + 16);
        out.push('[');
        for c in self.title.chars() {
            if matches!(c, '[' | ']' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push_str("](");
        if self.url.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            out.push('<');
            out.push_str(&self.url);
            out.push('>');
        } else {
            out.push_str(&self.url);
        }
        out.push_str(" \"");
        out.push_str(EMBED_MARKER);
        out.push_str("\")");
        Ok(out)
    }
}
