//! Essay posts: slugs, titles, and the HTML rendered from a plain-text source.

use chrono::{Datelike as _, NaiveDate};
use maud::{DOCTYPE, Markup, html};
use unicode_normalization::UnicodeNormalization as _;

pub const DEFAULT_AUTHOR: &str = "Kevin Liu";

/// Line starts that mark the sign-off block at the end of a post.
const SIGNOFF_OPENERS: &[&str] = &[
    "See ya!",
    "Until next time",
    "Best",
    "Sincerely",
    "Cheers",
    "-",
    "\u{2014}",
];

/// How many trailing lines are searched for a sign-off.
const SIGNOFF_WINDOW: usize = 3;

/// A short line naming the author also starts a sign-off.
const SIGNOFF_NAME_MAX_CHARS: usize = 30;

/// URL-friendly slug: compatibility-decomposed to ASCII, punctuation dropped,
/// lowercased, runs of spaces and dashes collapsed into one `-`.
pub fn slugify(value: &str) -> String {
    let ascii: String = value
        .nfkd()
        .filter(char::is_ascii)
        .filter(|c| {
            c.is_ascii_alphanumeric() || matches!(*c, '_' | '-') || c.is_ascii_whitespace()
        })
        .collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut in_separator = false;
    for c in ascii.trim().chars() {
        if c == '-' || c.is_ascii_whitespace() {
            if !in_separator {
                slug.push('-');
            }
            in_separator = true;
        } else {
            slug.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    slug
}

/// Title from a file stem or slug: dashes become spaces, and every run of
/// letters is capitalized (`"my-first-post"` -> `"My First Post"`).
pub fn title_case(stem: &str) -> String {
    let mut title = String::with_capacity(stem.len());
    let mut prev_cased = false;
    for c in stem.chars().map(|c| if c == '-' { ' ' } else { c }) {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && !prev_cased {
            title.extend(c.to_uppercase());
        } else if cased {
            title.extend(c.to_lowercase());
        } else {
            title.push(c);
        }
        prev_cased = cased;
    }
    title
}

/// Lowercased names that mark a sign-off line: the author's first name and
/// its three-letter short form.
pub fn signoff_names(author: &str) -> Vec<String> {
    let Some(first) = author.split_whitespace().next() else {
        return Vec::new();
    };
    let first = first.to_lowercase();
    let short: String = first.chars().take(3).collect();
    if short == first {
        vec![first]
    } else {
        vec![first, short]
    }
}

/// Index of the first sign-off line among the last few lines, if any.
fn find_signoff(lines: &[&str], names: &[String]) -> Option<usize> {
    let start = lines.len().saturating_sub(SIGNOFF_WINDOW);
    (start..lines.len()).find(|&i| {
        let line = lines[i].trim();
        let lower = line.to_lowercase();
        SIGNOFF_OPENERS.iter().any(|opener| line.starts_with(opener))
            || (line.chars().count() < SIGNOFF_NAME_MAX_CHARS
                && names.iter().any(|name| lower.contains(name.as_str())))
    })
}

fn paragraphs(text: &str) -> Markup {
    html! {
        @for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            @if let Some(heading) = para.strip_prefix("# ") {
                h3 { (heading.trim()) }
            } @else {
                p { (para) }
            }
        }
    }
}

/// Body markup for a post source.
///
/// Blank lines separate paragraphs and `# ` starts a subheading. A sign-off
/// found in the last lines is kept line by line in one `p.signoff`.
pub fn text_to_html(content: &str, names: &[String]) -> Markup {
    let content = content.replace("\r\n", "\n");
    let lines: Vec<&str> = content.trim().split('\n').collect();

    let Some(start) = find_signoff(&lines, names) else {
        return paragraphs(&content);
    };
    let main = lines[..start].join("\n");
    let signoff: Vec<&str> = lines[start..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    html! {
        (paragraphs(&main))
        p class="signoff" {
            @for (i, line) in signoff.iter().enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn render_post_page(author: &str, title: &str, date: NaiveDate, body: Markup) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - " (author) }
                link rel="stylesheet" href="/assets/css/styles.css";
            }
            body {
                div class="container" {
                    header class="header" {
                        div {
                            h1 { (author) }
                            nav {
                                a href="/" { "Home" }
                                a href="/essays" { "Essays" }
                                a href="/engineering" { "Engineering" }
                                a href="/games" { "Games" }
                                a href="/about" { "About" }
                            }
                        }
                    }
                    main class="post-content" {
                        article {
                            header class="post-header" {
                                h2 { (title) }
                                time datetime=(iso_date(date)) { (display_date(date)) }
                            }
                            section class="post-body" { (body) }
                        }
                        nav class="post-navigation" {
                            a href="/essays" { "\u{2190} Back to Essays" }
                        }
                    }
                    footer class="footer" {
                        "\u{a9} " (date.year()) " " (author) ". All rights reserved."
                    }
                }
            }
        }
    };
    markup.into_string()
}

/// One `article.post-preview` entry of the essays index.
pub fn preview_markup(title: &str, date: NaiveDate, href: &str) -> Markup {
    html! {
        article class="post-preview" {
            time datetime=(iso_date(date)) { (display_date(date)) }
            h4 { a href=(href) { (title) } }
        }
    }
}
