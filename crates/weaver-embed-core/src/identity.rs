//! Account details shown for the `userinfo://current` pseudo-link.
//!
//! The browser layer performs the request; this module owns the wire format
//! and the markup, so both can be tested without a network.

use markdown_weaver_escape::escape_html;
use miette::Diagnostic;
use serde::Deserialize;

/// The subset of the account record the identity card shows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl UserInfo {
    /// Display name, or the username when none is set.
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserInfoEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<UserInfoData>,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    #[serde(default)]
    info: Option<UserInfo>,
}

/// Why the identity card could not be shown.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum IdentityError {
    #[error("not signed in, cannot load user information")]
    #[diagnostic(code(weaver_embed::identity::missing_token))]
    MissingToken,

    #[error("failed to load user information: {}", .0.as_deref().unwrap_or("unknown error"))]
    #[diagnostic(code(weaver_embed::identity::rejected))]
    Rejected(Option<String>),

    #[error("error while loading user information: {0}")]
    #[diagnostic(code(weaver_embed::identity::request))]
    Request(String),
}

/// Decode the identity endpoint body.
///
/// A non-zero `code` or a missing `data.info` is a rejection carrying the
/// server's message; an unparseable body is a request error.
pub fn decode_user_info(body: &str) -> Result<UserInfo, IdentityError> {
    let envelope: UserInfoEnvelope =
        serde_json::from_str(body).map_err(|e| IdentityError::Request(e.to_string()))?;
    let msg = envelope.msg.filter(|m| !m.is_empty());
    if envelope.code != 0 {
        return Err(IdentityError::Rejected(msg));
    }
    envelope
        .data
        .and_then(|data| data.info)
        .ok_or(IdentityError::Rejected(msg))
}

fn push_escaped(html: &mut String, text: &str) {
    let _ = escape_html(html, text);
}

fn push_row(html: &mut String, label: &str, value: Option<&str>) {
    html.push_str("<div class=\"mb-2\"><strong>");
    html.push_str(label);
    html.push_str(":</strong> ");
    push_escaped(html, value.filter(|v| !v.is_empty()).unwrap_or("N/A"));
    html.push_str("</div>");
}

/// Markup for the identity card.
pub fn render_user_card(info: &UserInfo) -> String {
    let mut html = String::from("<div class=\"user-info-card p-3 border rounded bg-light\">");
    html.push_str("<div class=\"d-flex align-items-center mb-2\">");
    if let Some(avatar) = info.avatar.as_deref().filter(|a| !a.is_empty()) {
        html.push_str("<img class=\"rounded-circle me-2\" width=\"48\" height=\"48\" alt=\"\" src=\"");
        push_escaped(&mut html, avatar);
        html.push_str("\">");
    }
    html.push_str("<div><div class=\"fw-bold\">");
    push_escaped(&mut html, info.name());
    html.push_str("</div><div class=\"text-secondary small\">@");
    push_escaped(&mut html, &info.username);
    html.push_str("</div></div></div>");
    push_row(&mut html, "Bio", info.bio.as_deref());
    push_row(&mut html, "Location", info.location.as_deref());
    html.push_str("</div>");
    html
}

/// Inline error card shown in place of the identity card.
pub fn render_identity_error(err: &IdentityError) -> String {
    let mut html = String::from("<div class=\"alert alert-danger\">");
    push_escaped(&mut html, &err.to_string());
    html.push_str("</div>");
    html
}
