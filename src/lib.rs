mod builtin;
mod card;
mod cli;
mod color;
mod fetcher;
mod html;
mod page;
mod phrase;
mod post;
mod progress;
mod site;
mod snapshot;
mod store;
mod theme;

use std::path::Path;

use anyhow::Context as _;
use cli::{Args, CheckArgs, Command, FetchArgs, PostAction, QrArgs, ThemeAction};
use site::POST_FILENAME;

pub use card::{CardPayload, QR_SIZE, RenderedCard, render_card};
pub use cli::{Args as CliArgs, ProgressMode};
pub use color::Color;
pub use fetcher::{DEFAULT_CLIENT_ID, DEFAULT_ENDPOINT, DEFAULT_TOPIC, Fetcher, swap_image};
pub use html::build_page;
pub use page::{
    DESCRIPTION_INPUT_ID, IMAGE_ID, INPUT_FIELD_ID, LINK_INPUT_ID, OUTPUT_CONTAINER_ID,
    OUTPUT_MSG_ID, Page, QR_CONTAINER_ID, TEXT_CONTAINER_ID, TITLE_INPUT_ID,
};
pub use phrase::{
    CLEAR_COLOR, CLEAR_MESSAGE, FLAGGED_COLOR, FLAGGED_MESSAGE, MatchVerdict, evaluate, normalize,
    phrase_patterns,
};
pub use post::{DEFAULT_AUTHOR, signoff_names, slugify, text_to_html, title_case};
pub use site::{DELETE_CONFIRMATION, Post, PostId, Site, confirm_delete};
pub use snapshot::{SETTLE_DELAY, SNAPSHOT_FILENAME, export_snapshot, rasterize};
pub use store::PreferenceStore;
pub use theme::{SystemScheme, THEME_KEY, ThemeName, ThemePreference, detect_system_scheme};

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    let res = match &args.command {
        Command::Init { out } => init_page(out),
        Command::Theme { action, page } => run_theme(&args, *action, page.as_deref()),
        Command::Check(check) => run_check(check),
        Command::Qr(qr) => {
            progress.set_stage("rendering card");
            run_qr(qr).await
        }
        Command::FetchImage(fetch) => {
            progress.set_stage("fetching image");
            run_fetch(&args, fetch).await
        }
        Command::Post {
            action,
            site,
            author,
        } => run_post(&Site::new(site, author), action),
    };
    progress.finish();
    res
}

fn init_page(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(out, build_page(None)).with_context(|| format!("write {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote page");
    Ok(())
}

fn run_theme(args: &Args, action: ThemeAction, page_path: Option<&Path>) -> anyhow::Result<()> {
    let mut prefs = ThemePreference::open(&args.store)?;
    let system = args.system_scheme.unwrap_or_else(detect_system_scheme);
    let page = page_path.map(Page::load).transpose()?;

    let presented = match action {
        ThemeAction::Show => prefs.load(system),
        ThemeAction::Toggle => {
            let current = page
                .as_ref()
                .and_then(Page::theme)
                .unwrap_or_else(|| prefs.load(system));
            prefs.toggle(current)?
        }
        ThemeAction::Set { theme } => {
            prefs.save(theme)?;
            theme
        }
        ThemeAction::Clear => {
            prefs.clear()?;
            prefs.load(system)
        }
        ThemeAction::Sync => match prefs.system_changed(system) {
            Some(theme) => theme,
            None => {
                tracing::info!(?system, "saved theme overrides system scheme");
                prefs.load(system)
            }
        },
    };

    if let (Some(page), Some(path)) = (&page, page_path) {
        page.apply_theme(presented)?;
        page.save(path)?;
    }
    println!("{presented}");
    Ok(())
}

fn run_check(check: &CheckArgs) -> anyhow::Result<()> {
    let page = check.page.as_deref().map(Page::load).transpose()?;
    let text = match (&check.text, &page) {
        (Some(text), _) => text.clone(),
        (None, Some(page)) => page.input_value(INPUT_FIELD_ID)?,
        (None, None) => anyhow::bail!("pass the text to check or --page with an input field"),
    };

    let verdict = evaluate(&text);
    if check.explain {
        println!("normalized: {}", normalize(&text));
        for (phrase, pattern) in phrase_patterns() {
            let mark = if verdict.matched == Some(phrase) { "*" } else { " " };
            println!("{mark} {phrase}: /{pattern}/i");
        }
    }

    if let (Some(page), Some(path)) = (&page, &check.page) {
        if check.text.is_some() {
            page.set_input_value(INPUT_FIELD_ID, &text)?;
        }
        page.apply_verdict(&verdict)?;
        page.save(path)?;
    }
    println!("{}", verdict.message);
    Ok(())
}

async fn run_qr(qr: &QrArgs) -> anyhow::Result<()> {
    let page = qr.page.as_deref().map(Page::load).transpose()?;
    let field = |value: &Option<String>, id: &str| -> anyhow::Result<String> {
        match (value, &page) {
            (Some(v), _) => Ok(v.clone()),
            (None, Some(page)) => page.input_value(id),
            (None, None) => Ok(String::new()),
        }
    };
    let payload = CardPayload {
        title: field(&qr.title, TITLE_INPUT_ID)?,
        description: field(&qr.description, DESCRIPTION_INPUT_ID)?,
        link: field(&qr.link, LINK_INPUT_ID)?,
    };

    let card = render_card(&payload)?;
    let background = qr.background.unwrap_or(Color::WHITE);

    if let (Some(page), Some(path)) = (&page, &qr.page) {
        if let Some(color) = qr.background {
            page.set_background(color)?;
        }
        page.show_card(&card)?;
        page.save(path)?;
    }

    // The export runs on its own; a failed download does not undo the render.
    match export_snapshot(&card, background, &qr.out_dir).await {
        Ok(path) => println!("{}", path.display()),
        Err(e) => tracing::error!(error = %format!("{e:#}"), "snapshot export failed"),
    }
    Ok(())
}

async fn run_fetch(args: &Args, fetch: &FetchArgs) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(&args.user_agent, fetch.endpoint.clone(), &fetch.client_id)?;
    let Some(path) = &fetch.page else {
        match fetcher.fetch_random(&fetch.topic).await {
            Ok(url) => println!("{url}"),
            Err(e) => tracing::error!(error = %format!("{e:#}"), "fetch random image failed"),
        }
        return Ok(());
    };

    let page = Page::load(path)?;
    if let Some(url) = swap_image(&fetcher, &page, &fetch.topic).await {
        page.save(path)?;
        println!("{url}");
    }
    Ok(())
}

fn run_post(site: &Site, action: &PostAction) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    match action {
        PostAction::New { source, date } => {
            let post = site.create(source, date.unwrap_or(today))?;
            println!("{}", post.dir.join(POST_FILENAME).display());
        }
        PostAction::Update { post } => {
            let post = site.update(post, today)?;
            println!("{}", post.dir.join(POST_FILENAME).display());
        }
        PostAction::Delete { post, yes } => {
            let deleted = site.delete(post, today, |post| {
                if *yes {
                    return Ok(true);
                }
                confirm_delete(post, &mut std::io::stdin().lock(), &mut std::io::stdout())
            })?;
            if deleted {
                println!("deleted {post}");
            } else {
                println!("deletion cancelled");
            }
        }
    }
    Ok(())
}
