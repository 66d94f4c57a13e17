//! Platform-neutral widget descriptions produced by provider builders.
//!
//! A provider's build function never touches the document. It returns a
//! [`Widget`] value, and the host turns that value into real content inside the
//! render root it created. Each widget is responsible for clearing the height
//! placeholder on its container once it has loaded.

use markdown_weaver_escape::escape_html;

/// Arguments handed to a provider's build function.
#[derive(Debug, Clone, Copy)]
pub struct EmbedRequest<'a> {
    /// Capture group 1 of the matching pattern, if the pattern has one.
    pub id: Option<&'a str>,
    /// The full candidate URL.
    pub url: &'a str,
    /// The anchor's visible label.
    pub title: &'a str,
}

impl<'a> EmbedRequest<'a> {
    /// The extracted identifier, or the empty string when the pattern had no group.
    pub fn id(&self) -> &'a str {
        self.id.unwrap_or_default()
    }
}

/// A mountable widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// A third-party page loaded in an iframe.
    Frame(FrameWidget),
    /// A third-party script rendered inside an isolated frame document.
    Script(ScriptWidget),
    /// Account details of the signed-in user, fetched by the widget itself.
    Identity(IdentityWidget),
}

impl Widget {
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Frame(_) => "frame",
            Widget::Script(_) => "script",
            Widget::Identity(_) => "identity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameWidget {
    pub src: String,
    pub title: String,
}

impl FrameWidget {
    pub fn new(src: impl Into<String>, title: &str) -> Self {
        Self {
            src: src.into(),
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptWidget {
    pub src: String,
    pub title: String,
}

impl ScriptWidget {
    /// Frame document that loads the script.
    ///
    /// Scripts such as gists write into the document they are loaded in, so
    /// they get a document of their own rather than the host page.
    pub fn srcdoc(&self) -> String {
        let mut doc = String::from(
            "<!DOCTYPE html><html><head><base target=\"_blank\"></head><body><script src=\"",
        );
        // Writing into a String never fails.
        let _ = escape_html(&mut doc, &self.src);
        doc.push_str("\"></script></body></html>");
        doc
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityWidget {
    pub url: String,
    pub title: String,
}
