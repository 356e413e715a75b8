#![cfg(target_arch = "wasm32")]
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod app;
mod audio;
mod dom;
mod events;
mod timers;
mod ui;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("soundscape-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let app = app::App::new(window, document.clone());
    events::wire_controls(&app);
    {
        let a = app.borrow();
        ui::populate_kits(&document, a.session.kit());
        ui::apply_theme(&document, a.session.theme());
        a.refresh();
    }

    // Entering is the first user gesture: audio may start from here on.
    let entered = Rc::new(Cell::new(false));
    {
        let app = app.clone();
        let canvas = canvas.clone();
        dom::add_click_listener(&document, "enter-btn", move || {
            if entered.replace(true) {
                log::warn!("[gesture] already entered; ignoring extra click");
                return;
            }
            log::info!("[gesture] entering");
            ui::enter_main_ui(&app.borrow().document);
            app::ensure_audio(&app);
            events::wire_pointer(&app, &canvas);
            events::wire_global_keydown(&app);
            app::load_from_location(&app);
        });
    }
    Ok(())
}
