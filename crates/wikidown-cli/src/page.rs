//! Standalone page output: the rendered fragment inside a minimal HTML page.

use wikidown_engine::{IoError, PreviewRegion};

/// Page chrome around a rendered article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    stylesheet: Option<String>,
}

impl Page {
    pub fn new(title: impl Into<String>, stylesheet: Option<String>) -> Self {
        Self {
            title: title.into(),
            stylesheet,
        }
    }

    /// Wraps rendered markup in a page. The title and stylesheet are escaped;
    /// the body is inserted as-is.
    pub fn wrap(&self, body: &str) -> String {
        let mut page = String::with_capacity(body.len() + 256);
        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str(&format!(
            "<title>{}</title>\n",
            html_escape::encode_text(&self.title)
        ));
        if let Some(href) = &self.stylesheet {
            page.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                html_escape::encode_double_quoted_attribute(href)
            ));
        }
        page.push_str("</head>\n<body>\n<article>\n");
        page.push_str(body);
        page.push_str("\n</article>\n</body>\n</html>\n");
        page
    }
}

/// A preview region that wraps every render in a [`Page`] before passing it on.
#[derive(Debug)]
pub struct PageRegion<P> {
    page: Page,
    inner: P,
}

impl<P> PageRegion<P> {
    pub fn new(page: Page, inner: P) -> Self {
        Self { page, inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: PreviewRegion> PreviewRegion for PageRegion<P> {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError> {
        let page = self.page.wrap(markup);
        self.inner.replace_markup(&page)
    }
}
