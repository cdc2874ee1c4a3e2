//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a deferred query: an ordered list of [`Step`]s that is
//! re-resolved against the live document every time it is used. Nothing is
//! cached between calls, so a locator built before a popup opens still finds
//! the popup afterwards.
//!
//! Resolution semantics (shared by every driver):
//!
//! - Resolution starts from the document. `Css` steps replace the current
//!   set with the union of matching descendants of every element in it, in
//!   document order, without duplicates.
//! - `HasText` keeps elements whose whitespace-normalised text content
//!   matches the pattern.
//! - `Role` and `Label` are descendant queries like `Css`.
//! - `First` and `Last` pick a single element (or none).
//!
//! Multiple matches are never an error; ordinal steps are the tie-break.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A text or accessible-name filter, expressed as a regular expression.
///
/// The pattern source is kept as text so the same filter can be compiled by
/// the `regex` crate (mock driver) or handed to the page as a `RegExp`
/// (CDP driver). Stick to the syntax both engines share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPattern {
    source: String,
    ignore_case: bool,
}

impl TextPattern {
    /// Create a pattern from regular expression source
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ignore_case: false,
        }
    }

    /// Create a pattern matching a literal substring
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::regex(regex::escape(text))
    }

    /// Make the pattern case-insensitive
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Pattern source
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern ignores case
    #[must_use]
    pub const fn is_case_insensitive(&self) -> bool {
        self.ignore_case
    }

    /// Compile the pattern with the `regex` crate
    ///
    /// # Errors
    ///
    /// Returns the regex error if the source is not a valid pattern
    pub fn compile(&self) -> Result<regex::Regex, regex::Error> {
        regex::RegexBuilder::new(&self.source)
            .case_insensitive(self.ignore_case)
            .build()
    }

    /// JavaScript `RegExp` constructor expression for this pattern
    #[must_use]
    pub fn to_js(&self) -> String {
        let flags = if self.ignore_case { "i" } else { "" };
        format!("new RegExp({}, {})", js_string(&self.source), js_string(flags))
    }
}

impl From<&str> for TextPattern {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)?;
        if self.ignore_case {
            write!(f, "i")?;
        }
        Ok(())
    }
}

/// ARIA roles the suite locates elements by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AriaRole {
    /// `button`
    Button,
    /// `heading` (optionally filtered by level)
    Heading,
}

impl AriaRole {
    /// Role name as used in ARIA
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Heading => "heading",
        }
    }

    /// CSS selector for elements carrying this role, implicitly or explicitly
    #[must_use]
    pub const fn candidates(self) -> &'static str {
        match self {
            Self::Button => {
                "button, [role=\"button\"], input[type=\"button\"], input[type=\"submit\"], input[type=\"reset\"]"
            }
            Self::Heading => "h1, h2, h3, h4, h5, h6, [role=\"heading\"]",
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolution step of a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Descendants matching a CSS selector
    Css(String),
    /// Keep elements whose text content matches
    HasText(TextPattern),
    /// Descendants with an ARIA role
    Role {
        /// Role to match
        role: AriaRole,
        /// Accessible name filter
        name: Option<TextPattern>,
        /// Heading level filter
        level: Option<u8>,
    },
    /// Form controls whose `<label>` text matches
    Label(TextPattern),
    /// First element of the current set
    First,
    /// Last element of the current set
    Last,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::HasText(pattern) => write!(f, "has-text={pattern}"),
            Self::Role { role, name, level } => {
                write!(f, "role={role}")?;
                if let Some(name) = name {
                    write!(f, "[name={name}]")?;
                }
                if let Some(level) = level {
                    write!(f, "[level={level}]")?;
                }
                Ok(())
            }
            Self::Label(pattern) => write!(f, "label={pattern}"),
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
        }
    }
}

/// A deferred, re-evaluated element query.
///
/// ```
/// use duty_driver::{Locator, TextPattern};
///
/// let row = Locator::new("dialog table tr").with_text(TextPattern::regex("Duty payable"));
/// let value_cell = row.locator("td").last();
/// assert_eq!(
///     value_cell.to_string(),
///     "css=dialog table tr >> has-text=/Duty payable/ >> css=td >> last"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    /// Create a locator from a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::Css(selector.into())],
        }
    }

    /// Create a locator for an ARIA role
    #[must_use]
    pub fn role(role: AriaRole) -> Self {
        Self {
            steps: vec![Step::Role {
                role,
                name: None,
                level: None,
            }],
        }
    }

    /// Create a locator for form controls by label text
    #[must_use]
    pub fn label(pattern: impl Into<TextPattern>) -> Self {
        Self {
            steps: vec![Step::Label(pattern.into())],
        }
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Narrow to descendants matching a CSS selector
    #[must_use]
    pub fn locator(self, selector: impl Into<String>) -> Self {
        self.push(Step::Css(selector.into()))
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(self, pattern: impl Into<TextPattern>) -> Self {
        self.push(Step::HasText(pattern.into()))
    }

    /// Filter a role step by accessible name
    ///
    /// Has no effect unless the last step is a role step.
    #[must_use]
    pub fn named(mut self, pattern: impl Into<TextPattern>) -> Self {
        if let Some(Step::Role { name, .. }) = self.steps.last_mut() {
            *name = Some(pattern.into());
        }
        self
    }

    /// Filter a heading role step by level
    ///
    /// Has no effect unless the last step is a role step.
    #[must_use]
    pub fn level(mut self, heading_level: u8) -> Self {
        if let Some(Step::Role { level, .. }) = self.steps.last_mut() {
            *level = Some(heading_level);
        }
        self
    }

    /// Select the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.push(Step::First)
    }

    /// Select the last match
    #[must_use]
    pub fn last(self) -> Self {
        self.push(Step::Last)
    }

    /// Resolution steps, in order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Build a self-contained JavaScript expression that resolves this
    /// locator in the page and then evaluates `action` on the result set.
    #[must_use]
    pub fn to_script(&self, action: &ScriptAction) -> String {
        let mut script = String::from(SCRIPT_PRELUDE);
        for step in &self.steps {
            script.push_str(&step_script(step));
        }
        script.push_str(&action.to_js());
        script.push_str("})()");
        script
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// What a generated script does with the resolved elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptAction {
    /// Return `[{ text, visible }]` for every element
    Snapshot,
    /// Click the first element; returns whether one existed
    Click,
    /// Set the value of the first element and fire `input`/`change`;
    /// returns whether one existed
    Fill(String),
}

impl ScriptAction {
    fn to_js(&self) -> String {
        match self {
            Self::Snapshot => {
                "return els.map((e) => ({ text: e.textContent || '', visible: visible(e) }));"
                    .to_string()
            }
            Self::Click => "if (!els.length) return false; \
                 els[0].scrollIntoView({ block: 'center' }); \
                 els[0].click(); \
                 return true;"
                .to_string(),
            Self::Fill(value) => format!(
                "if (!els.length) return false; \
                 const e = els[0]; \
                 e.focus(); \
                 const proto = e instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
                 if (desc && desc.set) {{ desc.set.call(e, {value}); }} else {{ e.value = {value}; }} \
                 e.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 e.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return true;",
                value = js_string(value)
            ),
        }
    }
}

const SCRIPT_PRELUDE: &str = "(() => { \
const norm = (s) => (s || '').replace(/\\s+/g, ' ').trim(); \
const uniq = (xs) => Array.from(new Set(xs)); \
const visible = (e) => { \
if (!e.isConnected) return false; \
const s = getComputedStyle(e); \
if (s.display === 'none' || s.visibility === 'hidden') return false; \
const r = e.getBoundingClientRect(); \
return r.width > 0 && r.height > 0; }; \
const accName = (e) => norm(e.getAttribute('aria-label')) || (e.tagName === 'INPUT' ? norm(e.value) : '') || norm(e.textContent); \
const level = (e) => { const m = /^H([1-6])$/.exec(e.tagName); return m ? Number(m[1]) : Number(e.getAttribute('aria-level') || 2); }; \
let els = [document]; ";

fn step_script(step: &Step) -> String {
    match step {
        Step::Css(css) => format!(
            "els = uniq(els.flatMap((e) => Array.from(e.querySelectorAll({}))));",
            js_string(css)
        ),
        Step::HasText(pattern) => format!(
            "{{ const re = {}; els = els.filter((e) => re.test(norm(e.textContent))); }}",
            pattern.to_js()
        ),
        Step::Role { role, name, level } => {
            let mut out = format!(
                "els = uniq(els.flatMap((e) => Array.from(e.querySelectorAll({}))));",
                js_string(role.candidates())
            );
            if let Some(name) = name {
                out.push_str(&format!(
                    "{{ const re = {}; els = els.filter((e) => re.test(accName(e))); }}",
                    name.to_js()
                ));
            }
            if let Some(wanted) = level {
                out.push_str(&format!("els = els.filter((e) => level(e) === {wanted});"));
            }
            out
        }
        Step::Label(pattern) => format!(
            "{{ const re = {}; els = uniq(els.flatMap((e) => Array.from(e.querySelectorAll('label'))) \
             .filter((l) => re.test(norm(l.textContent))) \
             .map((l) => l.control || (l.htmlFor ? document.getElementById(l.htmlFor) : l.querySelector('input, select, textarea'))) \
             .filter(Boolean)); }}",
            pattern.to_js()
        ),
        Step::First => "els = els.slice(0, 1);".to_string(),
        Step::Last => "els = els.slice(-1);".to_string(),
    }
}

/// Quote a string as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_literal_escapes_metacharacters() {
            let pattern = TextPattern::literal("$30.00");
            let re = pattern.compile().unwrap();
            assert!(re.is_match("Duty: $30.00"));
            assert!(!re.is_match("Duty: $30a00"));
        }

        #[test]
        fn test_ignore_case() {
            let pattern = TextPattern::regex("duty payable").ignore_case();
            assert!(pattern.compile().unwrap().is_match("Duty Payable"));
            assert!(!TextPattern::regex("duty payable")
                .compile()
                .unwrap()
                .is_match("Duty Payable"));
        }

        #[test]
        fn test_display() {
            assert_eq!(TextPattern::regex("Calculate").to_string(), "/Calculate/");
            assert_eq!(
                TextPattern::regex("Calculate").ignore_case().to_string(),
                "/Calculate/i"
            );
        }

        #[test]
        fn test_to_js_quotes_source() {
            let js = TextPattern::regex("a\"b").ignore_case().to_js();
            assert_eq!(js, "new RegExp(\"a\\\"b\", \"i\")");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_new() {
            let locator = Locator::new("dialog");
            assert_eq!(locator.steps(), &[Step::Css("dialog".to_string())]);
        }

        #[test]
        fn test_chained_steps_keep_order() {
            let locator = Locator::new("dialog table tr")
                .with_text(TextPattern::regex("Duty payable"))
                .locator("td")
                .last();
            assert_eq!(locator.steps().len(), 4);
            assert_eq!(locator.steps()[3], Step::Last);
        }

        #[test]
        fn test_named_updates_role_step() {
            let locator = Locator::role(AriaRole::Button).named(TextPattern::regex("Check online"));
            assert_eq!(
                locator.to_string(),
                "role=button[name=/Check online/]"
            );
        }

        #[test]
        fn test_level_updates_role_step() {
            let locator = Locator::role(AriaRole::Heading).level(1);
            assert_eq!(locator.to_string(), "role=heading[level=1]");
        }

        #[test]
        fn test_named_ignored_without_role() {
            let locator = Locator::new("button").named("Close");
            assert_eq!(locator.to_string(), "css=button");
        }

        #[test]
        fn test_display_full_chain() {
            let locator = Locator::label(TextPattern::regex("Purchase price or value")).first();
            assert_eq!(
                locator.to_string(),
                "label=/Purchase price or value/ >> first"
            );
        }
    }

    mod script_tests {
        use super::*;

        #[test]
        fn test_snapshot_script_shape() {
            let script = Locator::new("dialog").first().to_script(&ScriptAction::Snapshot);
            assert!(script.starts_with("(() => {"));
            assert!(script.ends_with("})()"));
            assert!(script.contains("querySelectorAll(\"dialog\")"));
            assert!(script.contains("els.slice(0, 1)"));
            assert!(script.contains("visible: visible(e)"));
        }

        #[test]
        fn test_css_with_quotes_is_escaped() {
            let script = Locator::new("[class*=\"modal\"]").to_script(&ScriptAction::Snapshot);
            assert!(script.contains("querySelectorAll(\"[class*=\\\"modal\\\"]\")"));
        }

        #[test]
        fn test_role_script_filters_name_and_level() {
            let script = Locator::role(AriaRole::Heading)
                .level(1)
                .named("Stamp duty")
                .to_script(&ScriptAction::Snapshot);
            assert!(script.contains("accName(e)"));
            assert!(script.contains("level(e) === 1"));
        }

        #[test]
        fn test_label_script_resolves_control() {
            let script = Locator::label(TextPattern::regex("Purchase price"))
                .to_script(&ScriptAction::Snapshot);
            assert!(script.contains("querySelectorAll('label')"));
            assert!(script.contains("l.control"));
        }

        #[test]
        fn test_fill_script_quotes_value() {
            let script = Locator::new("#price").to_script(&ScriptAction::Fill("1000".to_string()));
            assert!(script.contains("desc.set.call(e, \"1000\")"));
            assert!(script.contains("new Event('change'"));
        }

        #[test]
        fn test_last_click_script() {
            let script = Locator::new("td").last().to_script(&ScriptAction::Click);
            assert!(script.contains("els.slice(-1)"));
            assert!(script.contains("els[0].click()"));
        }

        #[test]
        fn test_visibility_needs_non_empty_box() {
            let script = Locator::new("dialog").to_script(&ScriptAction::Snapshot);
            assert!(script.contains("r.width > 0 && r.height > 0"));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_literal_pattern_matches_itself(text in "[ -~]{1,24}") {
                let re = TextPattern::literal(&text).compile().unwrap();
                prop_assert!(re.is_match(&text));
            }

            #[test]
            fn prop_js_string_is_valid_json(text in ".{0,32}") {
                let quoted = js_string(&text);
                let back: String = serde_json::from_str(&quoted).unwrap();
                prop_assert_eq!(back, text);
            }

            #[test]
            fn prop_display_has_one_separator_per_extra_step(extra in 0usize..6) {
                let mut locator = Locator::new("tr");
                for _ in 0..extra {
                    locator = locator.locator("td");
                }
                let rendered = locator.to_string();
                prop_assert_eq!(rendered.matches(" >> ").count(), extra);
            }
        }
    }
}
