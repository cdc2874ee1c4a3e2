//! Mock driver for running page objects against static HTML.
//!
//! Documents are kept as source text and re-parsed with `scraper` on every
//! query, so locators behave as deferred queries here too. Visibility is
//! approximated from markup: `hidden`, inline `display: none` /
//! `visibility: hidden`, a `<dialog>` without `open`, or anything under
//! `<head>` counts as not rendered.
//!
//! Interaction is scripted: [`ClickReaction`]s registered per CSS selector run
//! when a click lands on a matching element.

use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::{Locator, Step, TextPattern};
use crate::result::{DriverError, DriverResult};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Bytes returned by [`MockDriver::screenshot`] (a bare PNG signature)
pub const MOCK_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// What happens when a click lands on a matching element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickReaction {
    /// Load the document registered for this URL
    Navigate(String),
    /// Replace the current document, keeping the URL
    Render(String),
}

#[derive(Debug)]
struct MockState {
    routes: HashMap<String, String>,
    url: String,
    html: String,
    reactions: Vec<(String, ClickReaction)>,
    history: Vec<String>,
    filled: Vec<(String, String)>,
    failing: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
            url: "about:blank".to_string(),
            html: String::new(),
            reactions: Vec::new(),
            history: Vec::new(),
            filled: Vec::new(),
            failing: false,
        }
    }
}

impl MockState {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let html = self
            .routes
            .get(url)
            .cloned()
            .ok_or_else(|| DriverError::NavigationError {
                url: url.to_string(),
                message: "no document registered for this URL".to_string(),
            })?;
        self.url = url.to_string();
        self.html = html;
        Ok(())
    }

    fn check_failure(&self, locator: &Locator) -> DriverResult<()> {
        if self.failing {
            Err(DriverError::query(locator, "injected failure"))
        } else {
            Ok(())
        }
    }
}

/// In-memory driver serving static HTML documents
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty driver at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the document served for a URL
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let _ = self.state_mut().routes.insert(url.into(), html.into());
        self
    }

    /// Set the current document without navigating
    #[must_use]
    pub fn with_document(mut self, html: impl Into<String>) -> Self {
        self.state_mut().html = html.into();
        self
    }

    /// React to clicks on elements matching `selector`
    ///
    /// Reactions are checked in registration order; the first match wins.
    #[must_use]
    pub fn on_click(mut self, selector: impl Into<String>, reaction: ClickReaction) -> Self {
        self.state_mut().reactions.push((selector.into(), reaction));
        self
    }

    /// Replace the current document
    pub fn set_document(&self, html: impl Into<String>) {
        self.state().html = html.into();
    }

    /// Make every element query fail until switched off
    pub fn fail_queries(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Calls made so far, e.g. `goto:https://…`, `query:css=dialog`,
    /// `click:css=button`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Values written by `fill`, as `(locator, value)`
    #[must_use]
    pub fn filled(&self) -> Vec<(String, String)> {
        self.state().filled.clone()
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state();
        state.history.push(format!("goto:{url}"));
        state.navigate(url)
    }

    async fn url(&self) -> DriverResult<String> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> DriverResult<String> {
        let state = self.state();
        let html = Html::parse_document(&state.html);
        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| html.select(&sel).next().map(normalized_text))
            .unwrap_or_default();
        Ok(title)
    }

    async fn query(&self, locator: &Locator) -> DriverResult<Vec<ElementSnapshot>> {
        let mut state = self.state();
        state.history.push(format!("query:{locator}"));
        state.check_failure(locator)?;
        let html = Html::parse_document(&state.html);
        let snapshots = resolve(&html, locator)?
            .into_iter()
            .map(|el| ElementSnapshot::new(el.text().collect::<String>(), is_rendered(el)))
            .collect();
        Ok(snapshots)
    }

    async fn click(&self, locator: &Locator) -> DriverResult<()> {
        let mut state = self.state();
        state.history.push(format!("click:{locator}"));
        state.check_failure(locator)?;
        let reaction = {
            let html = Html::parse_document(&state.html);
            let target = resolve(&html, locator)?
                .first()
                .copied()
                .ok_or_else(|| DriverError::ElementNotFound {
                    locator: locator.to_string(),
                })?;
            state
                .reactions
                .iter()
                .find(|(css, _)| Selector::parse(css).is_ok_and(|sel| sel.matches(&target)))
                .map(|(_, reaction)| reaction.clone())
        };
        match reaction {
            Some(ClickReaction::Navigate(url)) => state.navigate(&url),
            Some(ClickReaction::Render(html)) => {
                state.html = html;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        let mut state = self.state();
        state.history.push(format!("fill:{locator}={value}"));
        state.check_failure(locator)?;
        let found = {
            let html = Html::parse_document(&state.html);
            !resolve(&html, locator)?.is_empty()
        };
        if !found {
            return Err(DriverError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        state.filled.push((locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.state().history.push("screenshot".to_string());
        Ok(MOCK_PNG.to_vec())
    }
}

// ============================================================================
// Locator resolution over a parsed document
// ============================================================================

fn resolve<'a>(html: &'a Html, locator: &Locator) -> DriverResult<Vec<ElementRef<'a>>> {
    let mut current = vec![html.root_element()];
    for step in locator.steps() {
        current = match step {
            Step::Css(css) => descendants(&current, &parse_selector(locator, css)?),
            Step::HasText(pattern) => {
                let re = compile(locator, pattern)?;
                current
                    .into_iter()
                    .filter(|el| re.is_match(&normalized_text(*el)))
                    .collect()
            }
            Step::Role { role, name, level } => {
                let mut found = descendants(&current, &parse_selector(locator, role.candidates())?);
                if let Some(name) = name {
                    let re = compile(locator, name)?;
                    found.retain(|el| re.is_match(&accessible_name(*el)));
                }
                if let Some(level) = level {
                    found.retain(|el| heading_level(*el) == *level);
                }
                found
            }
            Step::Label(pattern) => {
                let re = compile(locator, pattern)?;
                let labels = descendants(&current, &parse_selector(locator, "label")?);
                let controls = parse_selector(locator, "input, select, textarea")?;
                let mut found = Vec::new();
                for label in labels
                    .into_iter()
                    .filter(|el| re.is_match(&normalized_text(*el)))
                {
                    let control = match label.value().attr("for") {
                        Some(id) => element_by_id(html, id),
                        None => label.select(&controls).next(),
                    };
                    if let Some(control) = control {
                        push_unique(&mut found, control);
                    }
                }
                found
            }
            Step::First => current.into_iter().take(1).collect(),
            Step::Last => current.last().copied().into_iter().collect(),
        };
    }
    Ok(current)
}

fn parse_selector(locator: &Locator, css: &str) -> DriverResult<Selector> {
    Selector::parse(css)
        .map_err(|e| DriverError::query(locator, format!("invalid selector {css:?}: {e}")))
}

fn compile(locator: &Locator, pattern: &TextPattern) -> DriverResult<regex::Regex> {
    pattern
        .compile()
        .map_err(|e| DriverError::query(locator, format!("invalid pattern {pattern}: {e}")))
}

fn descendants<'a>(scopes: &[ElementRef<'a>], selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    for scope in scopes {
        for el in scope.select(selector) {
            push_unique(&mut found, el);
        }
    }
    found
}

fn push_unique<'a>(found: &mut Vec<ElementRef<'a>>, el: ElementRef<'a>) {
    if !found.contains(&el) {
        found.push(el);
    }
}

fn element_by_id<'a>(html: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalized_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

fn accessible_name(el: ElementRef<'_>) -> String {
    let value = el.value();
    if let Some(label) = value.attr("aria-label").map(normalize) {
        if !label.is_empty() {
            return label;
        }
    }
    if value.name() == "input" {
        if let Some(text) = value.attr("value").map(normalize) {
            if !text.is_empty() {
                return text;
            }
        }
    }
    normalized_text(el)
}

fn heading_level(el: ElementRef<'_>) -> u8 {
    let value = el.value();
    value
        .name()
        .strip_prefix('h')
        .and_then(|digit| digit.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
        .or_else(|| value.attr("aria-level").and_then(|l| l.parse().ok()))
        .unwrap_or(2)
}

fn is_rendered(el: ElementRef<'_>) -> bool {
    if el.value().name() == "input" && el.value().attr("type") == Some("hidden") {
        return false;
    }
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .all(|node| renders_itself(node.value()))
}

fn renders_itself(el: &scraper::node::Element) -> bool {
    match el.name() {
        "head" | "script" | "style" | "template" | "title" | "noscript" => return false,
        "dialog" if el.attr("open").is_none() => return false,
        _ => {}
    }
    if el.attr("hidden").is_some() {
        return false;
    }
    el.attr("style").map_or(true, |style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        !compact.contains("display:none") && !compact.contains("visibility:hidden")
    })
}
