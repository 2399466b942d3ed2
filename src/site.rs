//! Essay posts on disk and the essays index that lists them.
//!
//! A post lives in `essays/posts/<year>/<slug>/` as `source.txt` (UTF-8),
//! `date.txt` (`YYYY-MM-DD`) and the generated `index.html`.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context as _, anyhow, bail};
use chrono::{Datelike as _, NaiveDate};
use kuchiki::NodeRef;
use kuchiki::iter::NodeIterator as _;

use crate::page::{Page, parse_fragment};
use crate::post::{
    iso_date, preview_markup, render_post_page, signoff_names, slugify, text_to_html, title_case,
};

pub const SOURCE_FILENAME: &str = "source.txt";
pub const DATE_FILENAME: &str = "date.txt";
pub const POST_FILENAME: &str = "index.html";
pub const DELETE_CONFIRMATION: &str = "DELETE POST";

const ESSAYS_HEADING: &str = "Essays";

/// `<year>/<slug>`, as passed to `post update` and `post delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId {
    pub year: i32,
    pub slug: String,
}

impl PostId {
    /// Site-absolute link used by the essays index.
    pub fn href(&self) -> String {
        format!("/essays/posts/{}/{}", self.year, self.slug)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.slug)
    }
}

impl FromStr for PostId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, slug) = s
            .trim_end_matches('/')
            .split_once('/')
            .ok_or_else(|| anyhow!("post {s:?} must look like <year>/<slug>"))?;
        let year = year
            .parse()
            .with_context(|| format!("post {s:?} has a bad year"))?;
        if slug.is_empty() || slug.contains('/') || slug.starts_with('.') {
            bail!("post {s:?} must look like <year>/<slug>");
        }
        Ok(Self {
            year,
            slug: slug.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub date: NaiveDate,
    pub dir: PathBuf,
}

/// A site checkout holding `essays/index.html` and `essays/posts/`.
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
    author: String,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, author: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            author: author.into(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("essays").join("index.html")
    }

    pub fn post_dir(&self, id: &PostId) -> PathBuf {
        self.root
            .join("essays/posts")
            .join(id.year.to_string())
            .join(&id.slug)
    }

    /// Add a post from a text file: its stem gives the title, `date` the year.
    ///
    /// Writes the post directory and lists the post in the essays index. An
    /// existing post with the same slug is an error.
    pub fn create(&self, source: &Path, date: NaiveDate) -> anyhow::Result<Post> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("{} has no usable file name", source.display()))?;
        let title = title_case(stem);
        let slug = slugify(&title);
        if slug.is_empty() {
            bail!("{} gives an empty slug", source.display());
        }
        let id = PostId {
            year: date.year(),
            slug,
        };
        let dir = self.post_dir(&id);
        if dir.exists() {
            bail!(
                "post already exists at {}; use `post update {id}`",
                dir.display()
            );
        }

        let text = read_source(source)?;
        let post = Post {
            id,
            title,
            date,
            dir,
        };
        let index = EssaysIndex::load(&self.index_path())?;
        index.add(&post)?;

        std::fs::create_dir_all(&post.dir)
            .with_context(|| format!("create {}", post.dir.display()))?;
        let written = self.write_post(&post, &text).and_then(|()| {
            let path = post.dir.join(DATE_FILENAME);
            std::fs::write(&path, iso_date(date)).with_context(|| format!("write {}", path.display()))
        });
        if let Err(e) = written {
            // Leave no half-written post behind.
            let _ = std::fs::remove_dir_all(&post.dir);
            return Err(e);
        }
        index.save_with_backup()?;
        tracing::info!(post = %post.id, title = %post.title, "created post");
        Ok(post)
    }

    /// Regenerate a post's `index.html` from its `source.txt` and `date.txt`.
    pub fn update(&self, id: &PostId, today: NaiveDate) -> anyhow::Result<Post> {
        let dir = self.post_dir(id);
        let source = dir.join(SOURCE_FILENAME);
        if !source.is_file() {
            bail!("post not found at {} (needs {SOURCE_FILENAME})", dir.display());
        }
        let text = std::fs::read_to_string(&source)
            .with_context(|| format!("{} must be UTF-8", source.display()))?;

        let post = Post {
            id: id.clone(),
            title: self.post_title(id),
            date: post_date(&dir, today)?,
            dir,
        };
        self.write_post(&post, &text)?;
        tracing::info!(post = %post.id, "updated post");
        Ok(post)
    }

    /// Delete a post and its index entry once `confirm` agrees.
    ///
    /// Returns `false` when the deletion was cancelled.
    pub fn delete(
        &self,
        id: &PostId,
        today: NaiveDate,
        confirm: impl FnOnce(&Post) -> anyhow::Result<bool>,
    ) -> anyhow::Result<bool> {
        let dir = self.post_dir(id);
        if !dir.is_dir() {
            bail!("post not found at {}", dir.display());
        }
        let post = Post {
            id: id.clone(),
            title: self.post_title(id),
            date: post_date(&dir, today).unwrap_or(today),
            dir,
        };
        if !confirm(&post)? {
            tracing::info!(post = %post.id, "deletion cancelled");
            return Ok(false);
        }

        let index_path = self.index_path();
        if index_path.exists() {
            let index = EssaysIndex::load(&index_path)?;
            if index.remove(&post.id) == 0 {
                tracing::warn!(post = %post.id, "post was not listed in the essays index");
            }
            index.save_with_backup()?;
        }
        std::fs::remove_dir_all(&post.dir)
            .with_context(|| format!("remove {}", post.dir.display()))?;
        tracing::info!(post = %post.id, "deleted post");
        Ok(true)
    }

    fn write_post(&self, post: &Post, text: &str) -> anyhow::Result<()> {
        let source = post.dir.join(SOURCE_FILENAME);
        if !source.exists() {
            std::fs::write(&source, text).with_context(|| format!("write {}", source.display()))?;
        }
        let body = text_to_html(text, &signoff_names(&self.author));
        let html = render_post_page(&self.author, &post.title, post.date, body);
        let path = post.dir.join(POST_FILENAME);
        std::fs::write(&path, html).with_context(|| format!("write {}", path.display()))
    }

    /// The `<h2>` of the generated page, or a title derived from the slug.
    fn post_title(&self, id: &PostId) -> String {
        Page::load(&self.post_dir(id).join(POST_FILENAME))
            .ok()
            .and_then(|page| {
                let heading = page.document().select_first("h2").ok()?;
                Some(heading.text_contents().trim().to_string())
            })
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| title_case(&id.slug))
    }
}

/// Source text as UTF-8; bytes that are not UTF-8 are read as Latin-1.
fn read_source(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), "source is not UTF-8; reading it as Latin-1");
            Ok(e.into_bytes().into_iter().map(char::from).collect())
        }
    }
}

/// `date.txt`, or `today` when the file is missing or unreadable as a date.
fn post_date(dir: &Path, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let path = dir.join(DATE_FILENAME);
    if !path.exists() {
        return Ok(today);
    }
    let raw = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
        tracing::warn!(path = %path.display(), value = raw.trim(), "invalid date; using today");
        today
    }))
}

/// Prompt on `out` and read the confirmation phrase from `input`.
pub fn confirm_delete(
    post: &Post,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    writeln!(out, "About to delete the post:")?;
    writeln!(out, "Title: {}", post.title)?;
    writeln!(out, "Path: {}", post.dir.display())?;
    writeln!(out, "This cannot be undone.")?;
    writeln!(out, "To confirm, type \"{DELETE_CONFIRMATION}\":")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("read confirmation")?;
    Ok(line.trim_end_matches(['\r', '\n']) == DELETE_CONFIRMATION)
}

/// `essays/index.html`: year sections, newest first, each with a post list.
struct EssaysIndex {
    path: PathBuf,
    page: Page,
}

impl EssaysIndex {
    fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            page: Page::load(path).context("load essays index")?,
        })
    }

    /// List `post` first in its year, opening the year section when needed.
    fn add(&self, post: &Post) -> anyhow::Result<()> {
        let markup = preview_markup(&post.title, post.date, &post.id.href());
        let entry = parse_fragment(&markup.into_string())?;
        let list = match self.post_list(post.id.year) {
            Some(list) => list,
            None => self.open_year(post.id.year)?,
        };
        for node in entry.into_iter().rev() {
            list.prepend(node);
        }
        Ok(())
    }

    /// Drop every entry linking to `id`, then any year left empty. Returns
    /// how many entries went.
    fn remove(&self, id: &PostId) -> usize {
        let href = id.href();
        let doomed: Vec<NodeRef> = self
            .select("article.post-preview")
            .into_iter()
            .filter(|article| {
                article.select("a").is_ok_and(|mut links| {
                    links.any(|a| {
                        let attrs = a.attributes.borrow();
                        attrs.get("href") == Some(href.as_str())
                    })
                })
            })
            .collect();
        for article in &doomed {
            article.detach();
        }

        for section in self.select("section.year-section") {
            let empty = section
                .select_first("div.post-list")
                .map(|list| list.as_node().children().elements().next().is_none())
                .unwrap_or(false);
            if empty {
                section.detach();
            }
        }
        doomed.len()
    }

    fn post_list(&self, year: i32) -> Option<NodeRef> {
        let year = year.to_string();
        self.select("section.year-section")
            .into_iter()
            .find(|section| {
                section
                    .select_first("h3")
                    .is_ok_and(|h3| h3.text_contents().trim() == year)
            })
            .and_then(|section| section.select_first("div.post-list").ok())
            .map(|list| list.as_node().clone())
    }

    /// Insert an empty year section right after the `Essays` heading.
    fn open_year(&self, year: i32) -> anyhow::Result<NodeRef> {
        let heading = self
            .select("h2")
            .into_iter()
            .find(|h2| h2.text_contents().trim() == ESSAYS_HEADING)
            .ok_or_else(|| anyhow!("{} has no <h2>{ESSAYS_HEADING}</h2>", self.path.display()))?;
        let section = maud::html! {
            section class="year-section" {
                h3 { (year) }
                div class="post-list" {}
            }
        };
        for node in parse_fragment(&section.into_string())?.into_iter().rev() {
            heading.insert_after(node);
        }
        self.post_list(year)
            .ok_or_else(|| anyhow!("year section {year} was not inserted"))
    }

    fn select(&self, selector: &str) -> Vec<NodeRef> {
        self.page
            .document()
            .select(selector)
            .map(|found| found.map(|el| el.as_node().clone()).collect())
            .unwrap_or_default()
    }

    /// Copy the current file to `index.html.bak`, then write the new one.
    fn save_with_backup(&self) -> anyhow::Result<()> {
        let backup = self.path.with_extension("html.bak");
        std::fs::copy(&self.path, &backup)
            .with_context(|| format!("back up {}", self.path.display()))?;
        self.page.save(&self.path)
    }
}
