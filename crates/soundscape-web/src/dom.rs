use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] missing #{element_id}");
    }
}

pub fn add_change_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut(String) + 'static,
) {
    let Some(select) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
    else {
        log::warn!("[dom] missing <select id={element_id}>");
        return;
    };
    let target = select.clone();
    let closure = Closure::wrap(Box::new(move || handler(target.value())) as Box<dyn FnMut()>);
    let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn set_disabled(document: &web::Document, element_id: &str, disabled: bool) {
    if let Some(button) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlButtonElement>().ok())
    {
        button.set_disabled(disabled);
    }
}

pub fn set_select_value(document: &web::Document, element_id: &str, value: &str) {
    if let Some(select) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
    {
        select.set_value(value);
    }
}

pub fn toggle_class(document: &web::Document, element_id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let _ = el.class_list().toggle_with_force(class, on);
    }
}

/// Whether keyboard focus is in a place where typing should not trigger
/// shortcuts.
pub fn focus_in_text_input(document: &web::Document) -> bool {
    document.active_element().is_some_and(|el| {
        el.is::<web::HtmlInputElement>() || el.tag_name().eq_ignore_ascii_case("textarea")
    })
}
