//! In-memory DOM for the mock driver.
//!
//! Supports the CSS subset the library actually emits: tag, `.class`,
//! `#id`, `[attr='value']`, `:nth-of-type(n)`, descendant and `>`
//! combinators, plus the `>> text=` suffix produced by text-filtered
//! locators. XPath is not interpreted; the mock is a CSS backend.

use std::collections::HashMap;

/// A node in the fake DOM tree
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Node identifier (stable across re-renders when the logical
    /// element persists)
    pub id: String,
    /// Tag name
    pub tag: String,
    /// CSS classes
    pub classes: Vec<String>,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Visible text (own text, not including children)
    pub text: String,
    /// Whether the node is rendered/visible
    pub displayed: bool,
    /// Child node ids, in document order
    pub children: Vec<String>,
}

impl MockNode {
    /// Create a node with a tag and id
    #[must_use]
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            classes: Vec::new(),
            attributes: HashMap::new(),
            text: String::new(),
            displayed: true,
            children: Vec::new(),
        }
    }

    /// Builder: add a class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Builder: set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: set visibility
    #[must_use]
    pub fn with_displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }
}

/// The fake DOM: a forest of [`MockNode`]s addressed by id
#[derive(Debug, Default)]
pub struct MockDom {
    nodes: HashMap<String, MockNode>,
    roots: Vec<String>,
}

impl MockDom {
    /// Create an empty DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Insert a node as a document root
    pub fn insert_root(&mut self, node: MockNode) {
        self.roots.push(node.id.clone());
        let _ = self.nodes.insert(node.id.clone(), node);
    }

    /// Insert a node as the last child of `parent_id`
    ///
    /// # Panics
    ///
    /// Panics if the parent does not exist (fixture construction bug).
    pub fn insert_child(&mut self, parent_id: &str, node: MockNode) {
        let id = node.id.clone();
        let _ = self.nodes.insert(id.clone(), node);
        self.nodes
            .get_mut(parent_id)
            .unwrap_or_else(|| panic!("mock parent '{parent_id}' not in DOM"))
            .children
            .push(id);
    }

    /// Get a node by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MockNode> {
        self.nodes.get(id)
    }

    /// Get a node mutably by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut MockNode> {
        self.nodes.get_mut(id)
    }

    /// Remove a node (and detach it from its parent)
    pub fn remove(&mut self, id: &str) {
        let _ = self.nodes.remove(id);
        self.roots.retain(|r| r != id);
        for node in self.nodes.values_mut() {
            node.children.retain(|c| c != id);
        }
    }

    /// Find ids of all nodes matching a selector, in document order
    #[must_use]
    pub fn select(&self, selector: &str) -> Vec<String> {
        let (css, text_filter) = split_text_suffix(selector);
        let steps = parse_selector(css);
        if steps.is_empty() {
            return Vec::new();
        }

        let mut matched: Vec<String> = Vec::new();
        for root in &self.roots {
            self.walk(root, &steps, 0, &mut matched);
        }

        if let Some(text) = text_filter {
            matched.retain(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| self.deep_text(n).contains(text))
            });
        }
        matched
    }

    /// Visible text of a node including its descendants
    #[must_use]
    pub fn deep_text(&self, node: &MockNode) -> String {
        let mut out = node.text.clone();
        for child in &node.children {
            if let Some(c) = self.nodes.get(child) {
                let t = self.deep_text(c);
                if !t.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(&t);
                }
            }
        }
        out
    }

    fn walk(&self, id: &str, steps: &[Step], step_idx: usize, matched: &mut Vec<String>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let step = &steps[step_idx];

        if self.matches_compound(node, &step.compound) {
            if step_idx + 1 == steps.len() {
                if !matched.contains(&node.id) {
                    matched.push(node.id.clone());
                }
            } else {
                let next = &steps[step_idx + 1];
                match next.combinator {
                    Combinator::Child => {
                        for child in &node.children {
                            self.walk_from(child, steps, step_idx + 1, false, matched);
                        }
                    }
                    Combinator::Descendant => {
                        for child in &node.children {
                            self.walk_from(child, steps, step_idx + 1, true, matched);
                        }
                    }
                }
            }
        }

        // A later subtree may still start the chain at step 0.
        if step_idx == 0 {
            for child in &node.children {
                self.walk(child, steps, 0, matched);
            }
        }
    }

    fn walk_from(
        &self,
        id: &str,
        steps: &[Step],
        step_idx: usize,
        transitive: bool,
        matched: &mut Vec<String>,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if self.matches_compound(node, &steps[step_idx].compound) {
            if step_idx + 1 == steps.len() {
                if !matched.contains(&node.id) {
                    matched.push(node.id.clone());
                }
            } else {
                let next = &steps[step_idx + 1];
                let deeper = matches!(next.combinator, Combinator::Descendant);
                for child in &node.children {
                    self.walk_from(child, steps, step_idx + 1, deeper, matched);
                }
            }
        }
        if transitive {
            for child in &node.children {
                self.walk_from(child, steps, step_idx, true, matched);
            }
        }
    }

    fn matches_compound(&self, node: &MockNode, compound: &Compound) -> bool {
        if let Some(ref tag) = compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(ref id) = compound.id {
            if &node.id != id {
                return false;
            }
        }
        for class in &compound.classes {
            if !node.classes.contains(class) {
                return false;
            }
        }
        for (name, value) in &compound.attributes {
            if node.attributes.get(name) != Some(value) {
                return false;
            }
        }
        if let Some(nth) = compound.nth_of_type {
            if self.nth_of_type(node) != nth {
                return false;
            }
        }
        true
    }

    /// 1-based position of a node among same-tag siblings
    fn nth_of_type(&self, node: &MockNode) -> usize {
        let siblings: Option<&Vec<String>> = self
            .nodes
            .values()
            .find(|n| n.children.contains(&node.id))
            .map(|p| &p.children);
        let Some(siblings) = siblings else {
            return 1;
        };
        let mut position = 0;
        for sibling in siblings {
            if let Some(s) = self.nodes.get(sibling) {
                if s.tag == node.tag {
                    position += 1;
                }
                if s.id == node.id {
                    return position;
                }
            }
        }
        1
    }
}

#[derive(Debug, Clone, Copy)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    nth_of_type: Option<usize>,
}

#[derive(Debug)]
struct Step {
    combinator: Combinator,
    compound: Compound,
}

/// Split a `css >> text=...` expression into CSS part and text filter
fn split_text_suffix(selector: &str) -> (&str, Option<&str>) {
    match selector.split_once(" >> text=") {
        Some((css, text)) => (css, Some(text)),
        None => (selector, None),
    }
}

/// Tokenize a selector into combinator-separated compound steps.
///
/// Whitespace inside `[...]` or quotes does not split steps.
fn parse_selector(selector: &str) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut current = String::new();
    let mut combinator = Combinator::Descendant;
    let mut depth = 0usize;
    let mut in_quote = false;

    let mut flush = |current: &mut String, combinator: &mut Combinator, steps: &mut Vec<Step>| {
        let token = current.trim();
        if !token.is_empty() {
            if token == ">" {
                *combinator = Combinator::Child;
            } else {
                steps.push(Step {
                    combinator: *combinator,
                    compound: parse_compound(token),
                });
                *combinator = Combinator::Descendant;
            }
        }
        current.clear();
    };

    for ch in selector.chars() {
        match ch {
            '\'' | '"' => {
                in_quote = !in_quote;
                current.push(ch);
            }
            '[' if !in_quote => {
                depth += 1;
                current.push(ch);
            }
            ']' if !in_quote => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c.is_whitespace() && depth == 0 && !in_quote => {
                flush(&mut current, &mut combinator, &mut steps);
            }
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut combinator, &mut steps);
    steps
}

fn parse_compound(token: &str) -> Compound {
    let mut compound = Compound::default();
    let mut chars = token.chars().peekable();
    let mut tag = String::new();

    while let Some(&c) = chars.peek() {
        if c == '.' || c == '#' || c == '[' || c == ':' {
            break;
        }
        tag.push(c);
        let _ = chars.next();
    }
    if !tag.is_empty() && tag != "*" {
        compound.tag = Some(tag);
    }

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut class = String::new();
                while let Some(&n) = chars.peek() {
                    if n == '.' || n == '#' || n == '[' || n == ':' {
                        break;
                    }
                    class.push(n);
                    let _ = chars.next();
                }
                compound.classes.push(class);
            }
            '#' => {
                let mut id = String::new();
                while let Some(&n) = chars.peek() {
                    if n == '.' || n == '[' || n == ':' {
                        break;
                    }
                    id.push(n);
                    let _ = chars.next();
                }
                compound.id = Some(id);
            }
            '[' => {
                let mut inner = String::new();
                for n in chars.by_ref() {
                    if n == ']' {
                        break;
                    }
                    inner.push(n);
                }
                if let Some((name, value)) = inner.split_once('=') {
                    let value = value.trim_matches(|q| q == '\'' || q == '"');
                    compound
                        .attributes
                        .push((name.to_string(), value.to_string()));
                }
            }
            ':' => {
                let mut pseudo = String::new();
                for n in chars.by_ref() {
                    if n == ')' {
                        break;
                    }
                    pseudo.push(n);
                }
                if let Some(n) = pseudo.strip_prefix("nth-of-type(") {
                    compound.nth_of_type = n.parse().ok();
                }
            }
            _ => {}
        }
    }
    compound
}
