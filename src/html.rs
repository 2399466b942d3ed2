use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::card::QR_SIZE;
use crate::page::{
    DESCRIPTION_INPUT_ID, IMAGE_ID, INPUT_FIELD_ID, LINK_INPUT_ID, OUTPUT_CONTAINER_ID,
    OUTPUT_MSG_ID, QR_CONTAINER_ID, TEXT_CONTAINER_ID, THEME_TOGGLE_LABEL, TITLE_INPUT_ID,
};
use crate::theme::ThemeName;

/// A self-contained page carrying every element the view adapter writes to.
pub fn build_page(theme: Option<ThemeName>) -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" data-theme=[theme.map(ThemeName::as_str)] {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";
                title { "pagekit" }
                style { (PreEscaped(builtin::PAGE_CSS)) }
            }
            body {
                header class="pk-topbar pk-container" {
                    h1 { "pagekit" }
                    button type="button" class="theme-toggle" { (THEME_TOGGLE_LABEL) }
                }
                main class="pk-container" {
                    (qr_widget())
                    (phrase_widget())
                    (image_widget())
                }
            }
        }
    };
    markup.into_string()
}

fn qr_widget() -> Markup {
    html! {
        section class="pk-widget" {
            h2 { "QR card" }
            input type="text" id=(TITLE_INPUT_ID) placeholder="Title";
            input type="text" id=(DESCRIPTION_INPUT_ID) placeholder="Description";
            input type="text" id=(LINK_INPUT_ID) placeholder="Link";
            button type="button" id="generateBtn" { "Generate" }
            div id=(OUTPUT_CONTAINER_ID) class="hide-container" {
                div id=(TEXT_CONTAINER_ID) {}
                div id=(QR_CONTAINER_ID) style=(format!("width: {QR_SIZE}px; height: {QR_SIZE}px")) {}
            }
        }
    }
}

fn phrase_widget() -> Markup {
    html! {
        section class="pk-widget" {
            h2 { "Phrase check" }
            input type="text" id=(INPUT_FIELD_ID) placeholder="Type something";
            button type="button" id="submitBtn" { "Submit" }
            p id=(OUTPUT_MSG_ID) {}
        }
    }
}

fn image_widget() -> Markup {
    html! {
        section class="pk-widget" {
            h2 { "Random pelican" }
            button type="button" id="newImage" { "New image" }
            img id=(IMAGE_ID) alt="A random pelican";
        }
    }
}
