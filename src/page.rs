//! View adapter over an HTML page.
//!
//! Verdicts, themes, cards and image sources are computed elsewhere; this
//! module only writes them into the matching elements of the document.

use std::path::Path;

use anyhow::{Context as _, anyhow};
use kuchiki::traits::TendrilSink as _;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

use crate::card::RenderedCard;
use crate::color::Color;
use crate::phrase::MatchVerdict;
use crate::theme::ThemeName;

pub const INPUT_FIELD_ID: &str = "inputField";
pub const OUTPUT_MSG_ID: &str = "outputMsg";
pub const TITLE_INPUT_ID: &str = "titleInput";
pub const DESCRIPTION_INPUT_ID: &str = "descriptionInput";
pub const LINK_INPUT_ID: &str = "linkInput";
pub const TEXT_CONTAINER_ID: &str = "textContainer";
pub const QR_CONTAINER_ID: &str = "qrCodeContainer";
pub const OUTPUT_CONTAINER_ID: &str = "outputContainer";
pub const IMAGE_ID: &str = "pelicanImage";
pub const THEME_TOGGLE_SELECTOR: &str = ".theme-toggle";
pub const THEME_TOGGLE_LABEL: &str = "Toggle theme";

pub struct Page {
    document: NodeRef,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let html =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self::parse(&html))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let html = self.to_html()?;
        std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document.serialize(&mut out).context("serialize page")?;
        String::from_utf8(out).context("page is not valid utf-8")
    }

    pub fn apply_verdict(&self, verdict: &MatchVerdict) -> anyhow::Result<()> {
        let input = self.element(INPUT_FIELD_ID)?;
        set_style_property(&input, "background-color", &verdict.color.to_string());
        set_text(self.element(OUTPUT_MSG_ID)?.as_node(), verdict.message);
        Ok(())
    }

    /// Present `theme` on the root element and label the toggle button.
    pub fn apply_theme(&self, theme: ThemeName) -> anyhow::Result<()> {
        let root = self.root()?;
        root.attributes
            .borrow_mut()
            .insert("data-theme", theme.as_str().to_string());
        if let Ok(toggle) = self.document.select_first(THEME_TOGGLE_SELECTOR) {
            set_text(toggle.as_node(), THEME_TOGGLE_LABEL);
        }
        Ok(())
    }

    pub fn theme(&self) -> Option<ThemeName> {
        let root = self.root().ok()?;
        let attrs = root.attributes.borrow();
        attrs.get("data-theme").and_then(ThemeName::parse)
    }

    /// The `value` attribute of an input; empty when unset.
    pub fn input_value(&self, id: &str) -> anyhow::Result<String> {
        let input = self.element(id)?;
        let attrs = input.attributes.borrow();
        Ok(attrs.get("value").unwrap_or_default().to_string())
    }

    pub fn set_input_value(&self, id: &str, value: &str) -> anyhow::Result<()> {
        let input = self.element(id)?;
        input
            .attributes
            .borrow_mut()
            .insert("value", value.to_string());
        Ok(())
    }

    pub fn text(&self, id: &str) -> anyhow::Result<String> {
        Ok(self.element(id)?.text_contents())
    }

    pub fn show_card(&self, card: &RenderedCard) -> anyhow::Result<()> {
        replace_children_with_html(self.element(TEXT_CONTAINER_ID)?.as_node(), &card.text_html)?;
        replace_children_with_html(
            self.element(QR_CONTAINER_ID)?.as_node(),
            &card.qr_markup().into_string(),
        )?;
        swap_class(
            &self.element(OUTPUT_CONTAINER_ID)?,
            "hide-container",
            "show-container",
        );
        Ok(())
    }

    pub fn set_background(&self, color: Color) -> anyhow::Result<()> {
        let body = self
            .document
            .select_first("body")
            .map_err(|()| anyhow!("page has no <body>"))?;
        set_style_property(&body, "background-color", &color.to_string());
        set_style_property(
            &self.element(OUTPUT_CONTAINER_ID)?,
            "background-color",
            &color.to_string(),
        );
        Ok(())
    }

    pub fn image_src(&self, id: &str) -> anyhow::Result<Option<String>> {
        let img = self.element(id)?;
        let attrs = img.attributes.borrow();
        Ok(attrs.get("src").map(str::to_string))
    }

    pub fn set_image_src(&self, id: &str, src: &str) -> anyhow::Result<()> {
        let img = self.element(id)?;
        img.attributes.borrow_mut().insert("src", src.to_string());
        Ok(())
    }

    pub(crate) fn document(&self) -> &NodeRef {
        &self.document
    }

    fn element(&self, id: &str) -> anyhow::Result<NodeDataRef<ElementData>> {
        self.document
            .select_first(&format!("#{id}"))
            .map_err(|()| anyhow!("page has no element #{id}"))
    }

    fn root(&self) -> anyhow::Result<NodeDataRef<ElementData>> {
        self.document
            .select_first("html")
            .map_err(|()| anyhow!("page has no <html> element"))
    }
}

fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    node.append(NodeRef::new_text(text));
}

fn clear_children(node: &NodeRef) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
}

/// Top-level nodes of an HTML fragment, detached from their parse tree.
pub(crate) fn parse_fragment(fragment: &str) -> anyhow::Result<Vec<NodeRef>> {
    let parsed = kuchiki::parse_html().one(fragment);
    let body = parsed
        .select_first("body")
        .map_err(|()| anyhow!("fragment has no body"))?;
    Ok(body.as_node().children().collect())
}

fn replace_children_with_html(node: &NodeRef, fragment: &str) -> anyhow::Result<()> {
    let children = parse_fragment(fragment)?;
    clear_children(node);
    for child in children {
        node.append(child);
    }
    Ok(())
}

fn set_style_property(element: &NodeDataRef<ElementData>, property: &str, value: &str) {
    let mut attrs = element.attributes.borrow_mut();
    let style = with_style_property(attrs.get("style").unwrap_or_default(), property, value);
    attrs.insert("style", style);
}

fn with_style_property(style: &str, property: &str, value: &str) -> String {
    let updated = format!("{property}: {value}");
    let mut decls: Vec<&str> = split_declarations(style)
        .into_iter()
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let name = decl.split(':').next().unwrap_or_default();
            !name.trim().eq_ignore_ascii_case(property)
        })
        .collect();
    decls.push(&updated);
    decls.join("; ")
}

/// Splits a `style` attribute on `;` outside quotes and parentheses, so values
/// like `url("data:image/png;base64,...")` stay whole.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut decls = Vec::new();
    let mut quote = None;
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, quote) {
            ('\\', _) => escaped = true,
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('(', None) => depth += 1,
            (')', None) => depth = depth.saturating_sub(1),
            (';', None) if depth == 0 => {
                decls.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    decls.push(&style[start..]);
    decls
}

fn swap_class(element: &NodeDataRef<ElementData>, remove: &str, add: &str) {
    let mut attrs = element.attributes.borrow_mut();
    let mut classes: Vec<String> = attrs
        .get("class")
        .unwrap_or_default()
        .split_whitespace()
        .filter(|c| *c != remove)
        .map(str::to_string)
        .collect();
    if !classes.iter().any(|c| c == add) {
        classes.push(add.to_string());
    }
    attrs.insert("class", classes.join(" "));
}
