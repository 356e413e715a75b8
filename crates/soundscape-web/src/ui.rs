use crate::dom;
use soundscape_core::{ControlStates, SoundKit, Theme};
use wasm_bindgen::JsCast;
use web_sys as web;

pub const RECORD_BTN: &str = "record-btn";
pub const PLAY_BTN: &str = "play-btn";
pub const STOP_BTN: &str = "stop-btn";
pub const CLEAR_BTN: &str = "clear-btn";
pub const SHARE_BTN: &str = "share-btn";
pub const DOWNLOAD_BTN: &str = "download-btn";
pub const KIT_SELECT: &str = "kit-select";
pub const THEME_SWITCHER: &str = "theme-switcher";
pub const SHARE_MODAL: &str = "share-modal";
pub const SHARE_URL_INPUT: &str = "share-url-input";
pub const COPY_LINK_BTN: &str = "copy-link-btn";
pub const CLOSE_MODAL_BTN: &str = "close-modal-btn";

pub fn apply_controls(document: &web::Document, controls: ControlStates, is_recording: bool) {
    dom::set_disabled(document, RECORD_BTN, !controls.record);
    dom::set_disabled(document, PLAY_BTN, !controls.play);
    dom::set_disabled(document, STOP_BTN, !controls.stop);
    dom::set_disabled(document, CLEAR_BTN, !controls.clear);
    dom::set_disabled(document, SHARE_BTN, !controls.share);
    dom::set_disabled(document, DOWNLOAD_BTN, !controls.download);
    dom::toggle_class(document, RECORD_BTN, "recording", is_recording);
}

/// Fill the kit `<select>` with one option per kit.
pub fn populate_kits(document: &web::Document, selected: SoundKit) {
    let Some(select) = document.get_element_by_id(KIT_SELECT) else {
        return;
    };
    for kit in SoundKit::ALL {
        if let Ok(option) = document.create_element("option") {
            let _ = option.set_attribute("value", kit.name());
            option.set_text_content(Some(kit.name()));
            let _ = select.append_child(&option);
        }
    }
    dom::set_select_value(document, KIT_SELECT, selected.name());
}

/// One clickable dot per theme.
pub fn populate_themes(document: &web::Document, on_pick: impl Fn(Theme) + Clone + 'static) {
    let Some(switcher) = document.get_element_by_id(THEME_SWITCHER) else {
        return;
    };
    for theme in Theme::ALL {
        let Some(dot) = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
        else {
            continue;
        };
        dot.set_class_name("theme-dot");
        dot.set_title(theme.name());
        let _ = dot
            .style()
            .set_property("background-color", theme.palette().primary);
        let on_pick = on_pick.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(
            Box::new(move || on_pick(theme)) as Box<dyn FnMut()>
        );
        let _ = dot.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
        let _ = switcher.append_child(&dot);
    }
}

/// Write the theme's CSS variables on the root element and mark its dot.
pub fn apply_theme(document: &web::Document, theme: Theme) {
    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    {
        let style = root.style();
        for (key, value) in theme.css_variables() {
            let _ = style.set_property(key, value);
        }
    }
    if let Ok(dots) = document.query_selector_all(".theme-dot") {
        for i in 0..dots.length() {
            let Some(dot) = dots
                .item(i)
                .and_then(|n| n.dyn_into::<web::Element>().ok())
            else {
                continue;
            };
            let active = dot.get_attribute("title").as_deref() == Some(theme.name());
            let _ = dot.class_list().toggle_with_force("active", active);
        }
    }
}

/// Swap the download icon for a spinner while an export runs.
pub fn set_busy(document: &web::Document, busy: bool) {
    let Some(button) = document.get_element_by_id(DOWNLOAD_BTN) else {
        return;
    };
    for (selector, hidden) in [(".icon-wrapper", busy), (".spinner", !busy)] {
        if let Ok(Some(el)) = button.query_selector(selector) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }
    dom::set_disabled(document, DOWNLOAD_BTN, busy);
}

pub fn show_share_modal(document: &web::Document, url: &str) {
    if let Some(input) = document
        .get_element_by_id(SHARE_URL_INPUT)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        input.set_value(url);
    }
    dom::toggle_class(document, SHARE_MODAL, "hidden", false);
}

pub fn hide_share_modal(document: &web::Document) {
    dom::toggle_class(document, SHARE_MODAL, "hidden", true);
}

/// Copy the share link and flash the result on the copy button.
pub fn copy_share_link(document: &web::Document) {
    let (Some(window), Some(input)) = (
        web::window(),
        document
            .get_element_by_id(SHARE_URL_INPUT)
            .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok()),
    ) else {
        return;
    };
    input.select();
    let promise = window.navigator().clipboard().write_text(&input.value());
    let document = document.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let copied = wasm_bindgen_futures::JsFuture::from(promise).await.is_ok();
        set_copy_label(&document, if copied { "Copied!" } else { "Error!" });
        let reset = wasm_bindgen::closure::Closure::once_into_js(move || {
            set_copy_label(&document, "Copy");
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            reset.unchecked_ref(),
            2000,
        );
    });
}

fn set_copy_label(document: &web::Document, label: &str) {
    if let Some(button) = document.get_element_by_id(COPY_LINK_BTN) {
        button.set_text_content(Some(label));
    }
}

/// Hide the welcome screen and reveal the instrument controls.
pub fn enter_main_ui(document: &web::Document) {
    dom::toggle_class(document, "welcome-screen", "hidden", true);
    dom::toggle_class(document, "main-ui", "hidden", false);
}
