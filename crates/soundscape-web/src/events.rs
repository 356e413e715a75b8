use crate::app::{self, AppRef};
use crate::dom;
use crate::ui;
use soundscape_core::{action_for_key, pick_tile, screen_to_ndc, Action, KeyContext};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(ev: &web::KeyboardEvent, app: &AppRef) {
    let ctx = {
        let a = app.borrow();
        KeyContext {
            in_text_input: dom::focus_in_text_input(&a.document),
            meta: ev.meta_key(),
            ctrl: ev.ctrl_key(),
        }
    };
    let Some(action) = action_for_key(&ev.key(), ctx) else {
        return;
    };
    // keys behave like clicking the matching button, so disabled controls win
    let controls = app.borrow().session.controls();
    match action {
        Action::ToggleRecording => app::toggle_recording(app),
        Action::Play if controls.play => app::play(app),
        Action::Stop if controls.stop => app::stop(app),
        Action::Clear if controls.clear => app::clear(app),
        Action::SelectKit(kit) => app::select_kit(app, kit),
        _ => {}
    }
}

pub fn wire_global_keydown(app: &AppRef) {
    if let Some(window) = web::window() {
        let app = app.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
            handle_global_keydown(&ev, &app);
        }) as Box<dyn FnMut(_)>);
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Tile under a pointer event, picked through the camera.
fn tile_under_pointer(app: &AppRef, canvas: &web::HtmlCanvasElement, ev: &web::PointerEvent) -> Option<usize> {
    let rect = canvas.get_bounding_client_rect();
    let x = ev.client_x() as f32 - rect.left() as f32;
    let y = ev.client_y() as f32 - rect.top() as f32;
    let (w, h) = (rect.width() as f32, rect.height() as f32);
    let (ndc_x, ndc_y) = screen_to_ndc(x, y, w, h);

    let mut a = app.borrow_mut();
    a.camera.aspect = w / h.max(1.0);
    let (ray_origin, ray_dir) = a.camera.ray_from_ndc(ndc_x, ndc_y);
    pick_tile(a.session.layout(), ray_origin, ray_dir)
}

pub fn wire_pointer(app: &AppRef, canvas: &web::HtmlCanvasElement) {
    let app = app.clone();
    let target = canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !ev.is_primary() {
            return;
        }
        if let Some(tile) = tile_under_pointer(&app, &target, &ev) {
            app::tap(&app, tile);
        }
    }) as Box<dyn FnMut(_)>);
    let _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Transport buttons, kit select, theme dots and the share modal.
pub fn wire_controls(app: &AppRef) {
    let document = app.borrow().document.clone();
    let on = |id: &str, f: fn(&AppRef)| {
        let app = app.clone();
        dom::add_click_listener(&document, id, move || f(&app));
    };
    on(ui::RECORD_BTN, app::toggle_recording);
    on(ui::PLAY_BTN, app::play);
    on(ui::STOP_BTN, app::stop);
    on(ui::CLEAR_BTN, app::clear);
    on(ui::SHARE_BTN, app::open_share);
    on(ui::DOWNLOAD_BTN, app::download);
    on(ui::CLOSE_MODAL_BTN, |a| {
        ui::hide_share_modal(&a.borrow().document)
    });
    on(ui::COPY_LINK_BTN, |a| {
        ui::copy_share_link(&a.borrow().document)
    });

    {
        let app = app.clone();
        dom::add_change_listener(&document, ui::KIT_SELECT, move |name| {
            app::select_kit_by_name(&app, &name);
        });
    }
    {
        let app = app.clone();
        ui::populate_themes(&document, move |theme| app::set_theme(&app, theme));
    }
}
