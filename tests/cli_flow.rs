use std::path::Path;

use clap::Parser as _;
use httpmock::Method::GET;
use httpmock::MockServer;
use pagekit::{
    IMAGE_ID, INPUT_FIELD_ID, OUTPUT_MSG_ID, Page, QR_SIZE, SNAPSHOT_FILENAME, TEXT_CONTAINER_ID,
    ThemeName,
};
use tempfile::tempdir;

fn args(store: &Path, rest: &[&str]) -> pagekit::CliArgs {
    let store = store.to_str().unwrap();
    let base = ["pagekit", "--progress", "never", "--store", store];
    pagekit::CliArgs::parse_from(base.iter().chain(rest.iter()).copied())
}

fn init_page(dir: &Path) -> std::path::PathBuf {
    let page = dir.join("site/index.html");
    std::fs::create_dir_all(page.parent().unwrap()).unwrap();
    std::fs::write(&page, pagekit::build_page(None)).unwrap();
    page
}

#[tokio::test]
async fn init_writes_builtin_page() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let out = tmp.path().join("www/index.html");
    let out_str = out.to_str().unwrap();

    pagekit::run(args(&store, &["init", "--out", out_str])).await.unwrap();

    let page = Page::load(&out).unwrap();
    assert_eq!(page.input_value(INPUT_FIELD_ID).unwrap(), "");
    assert_eq!(page.image_src(IMAGE_ID).unwrap(), None);
}

#[tokio::test]
async fn check_updates_page_from_argument_and_input_field() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let page_str = page_path.to_str().unwrap();

    pagekit::run(args(&store, &["check", "AYYYOO", "--page", page_str]))
        .await
        .unwrap();
    let page = Page::load(&page_path).unwrap();
    assert_eq!(page.input_value(INPUT_FIELD_ID).unwrap(), "AYYYOO");
    assert_eq!(page.text(OUTPUT_MSG_ID).unwrap(), "Hey! Found some issues!");
    assert!(page.to_html().unwrap().contains("background-color: #ffcccc"));

    page.set_input_value(INPUT_FIELD_ID, "hello world").unwrap();
    page.save(&page_path).unwrap();

    pagekit::run(args(&store, &["check", "--page", page_str]))
        .await
        .unwrap();
    let page = Page::load(&page_path).unwrap();
    assert_eq!(page.text(OUTPUT_MSG_ID).unwrap(), "All clear!");
    assert!(page.to_html().unwrap().contains("background-color: #ccffcc"));
    assert!(!page.to_html().unwrap().contains("#ffcccc"));
}

#[tokio::test]
async fn check_needs_text_or_page() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    assert!(pagekit::run(args(&store, &["check"])).await.is_err());
    pagekit::run(args(&store, &["check", "--explain", "sk1ll3ts"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn theme_follows_system_until_saved() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let page_str = page_path.to_str().unwrap();
    let theme = |rest: &[&str]| {
        let mut list = vec![
            "theme".to_string(),
            "--page".to_string(),
            page_str.to_string(),
        ];
        list.extend(rest.iter().map(|s| s.to_string()));
        list
    };
    let run = |scheme: &str, rest: Vec<String>| {
        let mut list = vec!["--system-scheme".to_string(), scheme.to_string()];
        list.extend(rest);
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        pagekit::run(args(&store, &refs))
    };
    let presented = || Page::load(&page_path).unwrap().theme();

    run("dark", theme(&["show"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Dark));
    assert!(!store.exists(), "presenting a theme must not save it");

    run("light", theme(&["sync"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Light));

    run("dark", theme(&["set", "light"])).await.unwrap();
    run("dark", theme(&["sync"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Light));

    run("dark", theme(&["toggle"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Dark));
    run("light", theme(&["show"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Dark));

    run("light", theme(&["clear"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Light));
    run("dark", theme(&["sync"])).await.unwrap();
    assert_eq!(presented(), Some(ThemeName::Dark));
}

#[tokio::test]
async fn theme_page_flag_follows_the_action() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let page_str = page_path.to_str().unwrap();

    pagekit::run(args(
        &store,
        &["--system-scheme", "light", "theme", "toggle", "--page", page_str],
    ))
    .await
    .unwrap();
    assert_eq!(Page::load(&page_path).unwrap().theme(), Some(ThemeName::Dark));

    pagekit::run(args(&store, &["theme", "set", "light", "--page", page_str]))
        .await
        .unwrap();
    assert_eq!(Page::load(&page_path).unwrap().theme(), Some(ThemeName::Light));
    let parsed = pagekit::CliArgs::try_parse_from(["pagekit", "theme", "show", "--page", "x.html"]);
    assert!(parsed.is_ok());
}

#[tokio::test]
async fn qr_renders_into_page_and_exports_png() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let downloads = tmp.path().join("downloads");

    pagekit::run(args(
        &store,
        &[
            "qr",
            "--title",
            "Buildspace <3",
            "--description",
            "Scan me",
            "--link",
            "https://buildspace.so",
            "--background",
            "#112233",
            "--out-dir",
            downloads.to_str().unwrap(),
            "--page",
            page_path.to_str().unwrap(),
        ],
    ))
    .await
    .unwrap();

    let page = Page::load(&page_path).unwrap();
    assert_eq!(page.text(TEXT_CONTAINER_ID).unwrap(), "Buildspace <3Scan me");
    let html = page.to_html().unwrap();
    assert!(html.contains("<h2>Buildspace &lt;3</h2>"));
    assert!(html.contains("class=\"show-container\""));
    assert!(html.contains("background-color: #112233"));

    let png = std::fs::read(downloads.join(SNAPSHOT_FILENAME)).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert!(img.width() > QR_SIZE);
    assert_eq!(img.get_pixel(0, 0).0, [0x11, 0x22, 0x33, 0xff]);
}

#[tokio::test]
async fn qr_reads_page_inputs_and_tolerates_empty_fields() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let downloads = tmp.path().join("downloads");

    pagekit::run(args(
        &store,
        &[
            "qr",
            "--out-dir",
            downloads.to_str().unwrap(),
            "--page",
            page_path.to_str().unwrap(),
        ],
    ))
    .await
    .unwrap();

    assert!(downloads.join(SNAPSHOT_FILENAME).exists());
    let page = Page::load(&page_path).unwrap();
    assert_eq!(page.text(TEXT_CONTAINER_ID).unwrap(), "");
}

#[tokio::test]
async fn fetch_image_updates_page_or_leaves_it() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/ok/photos/random")
            .query_param("query", "heron");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(r#"{"urls": {"small": "https://images.example/heron.jpg"}}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/down/photos/random");
        then.status(503);
    });

    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let page_path = init_page(tmp.path());
    let page_str = page_path.to_str().unwrap();

    let ok = server.url("/ok/photos/random");
    pagekit::run(args(
        &store,
        &["fetch-image", "--topic", "heron", "--endpoint", ok.as_str(), "--page", page_str],
    ))
    .await
    .unwrap();
    let src = Page::load(&page_path).unwrap().image_src(IMAGE_ID).unwrap();
    assert_eq!(src.as_deref(), Some("https://images.example/heron.jpg"));

    let down = server.url("/down/photos/random");
    pagekit::run(args(
        &store,
        &["fetch-image", "--endpoint", down.as_str(), "--page", page_str],
    ))
    .await
    .unwrap();
    let src = Page::load(&page_path).unwrap().image_src(IMAGE_ID).unwrap();
    assert_eq!(src.as_deref(), Some("https://images.example/heron.jpg"));
}

#[tokio::test]
async fn post_new_update_delete() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("prefs.json");
    let root = tmp.path().join("site");
    std::fs::create_dir_all(root.join("essays")).unwrap();
    std::fs::write(
        root.join("essays/index.html"),
        "<html><body><main><h2>Essays</h2></main></body></html>",
    )
    .unwrap();
    let source = tmp.path().join("on-rust.txt");
    std::fs::write(&source, "Why I write Rust.\n\nSee ya!\nAda").unwrap();
    let root_str = root.to_str().unwrap();

    pagekit::run(args(
        &store,
        &[
            "post",
            "new",
            source.to_str().unwrap(),
            "--date",
            "2024-05-01",
            "--site",
            root_str,
            "--author",
            "Ada Lovelace",
        ],
    ))
    .await
    .unwrap();
    let post_dir = root.join("essays/posts/2024/on-rust");
    let html = std::fs::read_to_string(post_dir.join("index.html")).unwrap();
    assert!(html.contains("<title>On Rust - Ada Lovelace</title>"));
    assert!(html.contains("<p class=\"signoff\">See ya!<br>Ada</p>"));
    let index = std::fs::read_to_string(root.join("essays/index.html")).unwrap();
    assert!(index.contains("<h3>2024</h3>"));
    assert!(index.contains("href=\"/essays/posts/2024/on-rust\""));

    std::fs::write(post_dir.join("source.txt"), "Rewritten.").unwrap();
    pagekit::run(args(&store, &["post", "--site", root_str, "update", "2024/on-rust"]))
        .await
        .unwrap();
    let html = std::fs::read_to_string(post_dir.join("index.html")).unwrap();
    assert!(html.contains("<p>Rewritten.</p>"));
    assert!(html.contains("May 01, 2024"));

    pagekit::run(args(
        &store,
        &["post", "delete", "2024/on-rust", "--yes", "--site", root_str],
    ))
    .await
    .unwrap();
    assert!(!post_dir.exists());
    let index = std::fs::read_to_string(root.join("essays/index.html")).unwrap();
    assert!(!index.contains("on-rust"));
    assert!(!index.contains("year-section"));
    assert!(root.join("essays/index.html.bak").exists());

    let missing = pagekit::run(args(&store, &["post", "update", "2024/on-rust", "--site", root_str]));
    assert!(missing.await.is_err());
}
