use crate::audio::WebAudioOutput;
use crate::timers::TimeoutScheduler;
use crate::{dom, ui};
use soundscape_core::{
    codec, default_encoder, synthesize_now, BusyGuard, Camera, Clock, LiveOutput, PlayOutcome,
    RenderSettings, Session, SoundKit, SystemClock, Theme, SAMPLE_RATE, SHARE_QUERY_PARAM,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

pub type AppRef = Rc<RefCell<App>>;
type Audio = Rc<RefCell<LiveOutput<WebAudioOutput>>>;

/// Page-wide state shared by every event handler.
pub struct App {
    pub document: web::Document,
    pub session: Session,
    pub scheduler: TimeoutScheduler,
    pub clock: SystemClock,
    pub camera: Camera,
    pub audio: Audio,
    /// An export task is in flight.
    pub exporting: bool,
}

impl App {
    pub fn new(window: web::Window, document: web::Document) -> AppRef {
        Rc::new(RefCell::new(Self {
            document,
            session: Session::new(),
            scheduler: TimeoutScheduler::new(window),
            clock: SystemClock::new(),
            camera: Camera::default(),
            audio: Rc::new(RefCell::new(LiveOutput::new())),
            exporting: false,
        }))
    }

    pub fn refresh(&self) {
        ui::apply_controls(
            &self.document,
            self.session.controls(),
            self.session.is_recording(),
        );
        if self.exporting {
            dom::set_disabled(&self.document, ui::DOWNLOAD_BTN, true);
        }
    }
}

/// Create the audio context if needed. Call from a user gesture.
pub fn ensure_audio(app: &AppRef) {
    let audio = app.borrow().audio.clone();
    let mut live = audio.borrow_mut();
    match live.get_or_try_init(WebAudioOutput::new) {
        Ok(out) => out.resume(),
        Err(e) => log::error!("[audio] {e:?}"),
    }
}

pub fn tap(app: &AppRef, tile: usize) {
    ensure_audio(app);
    let a = &mut *app.borrow_mut();
    let now = a.clock.now_ms();
    let mut audio = a.audio.borrow_mut();
    match a.session.tap(tile, now, &mut *audio) {
        Ok(Some(ev)) => log::debug!("[tap] captured tile {} at {:.1}ms", ev.tile_index, ev.time_offset_ms),
        Ok(None) => {}
        Err(e) => log::warn!("[tap] tile {tile}: {e}"),
    }
}

pub fn toggle_recording(app: &AppRef) {
    let a = &mut *app.borrow_mut();
    let now = a.clock.now_ms();
    let recording = a.session.toggle_recording(now, &mut a.scheduler);
    log::info!("[transport] recording {}", if recording { "armed" } else { "stopped" });
    a.refresh();
}

pub fn play(app: &AppRef) {
    ensure_audio(app);
    let weak: Weak<RefCell<App>> = Rc::downgrade(app);
    let a = &mut *app.borrow_mut();
    let audio = a.audio.clone();
    let outcome = a.session.play(
        &mut a.scheduler,
        move |event, kit| {
            let mut out = audio.borrow_mut();
            if let Err(e) = synthesize_now(event.position, &kit.envelope(), &mut *out) {
                log::warn!("[playback] tile {}: {e}", event.tile_index);
            }
        },
        Some(Box::new(move || {
            if let Some(app) = weak.upgrade() {
                app.borrow().refresh();
            }
        })),
    );
    match outcome {
        PlayOutcome::Started { triggers, finishes_at_ms } => {
            log::info!("[transport] playing {triggers} events, done in {finishes_at_ms:.0}ms")
        }
        other => log::info!("[transport] play ignored: {other:?}"),
    }
    a.refresh();
}

pub fn stop(app: &AppRef) {
    let a = &mut *app.borrow_mut();
    a.session.stop(&mut a.scheduler);
    a.refresh();
}

pub fn clear(app: &AppRef) {
    let a = &mut *app.borrow_mut();
    a.session.clear(&mut a.scheduler);
    a.refresh();
}

pub fn select_kit(app: &AppRef, kit: SoundKit) {
    let mut a = app.borrow_mut();
    a.session.select_kit(kit);
    dom::set_select_value(&a.document, ui::KIT_SELECT, kit.name());
}

pub fn select_kit_by_name(app: &AppRef, name: &str) {
    let _ = app.borrow_mut().session.select_kit_by_name(name);
}

pub fn set_theme(app: &AppRef, theme: Theme) {
    let mut a = app.borrow_mut();
    a.session.set_theme(theme);
    ui::apply_theme(&a.document, theme);
}

/// Page URL without query or fragment.
fn page_base_url() -> Option<String> {
    let location = web::window()?.location();
    Some(format!("{}{}", location.origin().ok()?, location.pathname().ok()?))
}

pub fn open_share(app: &AppRef) {
    let a = app.borrow();
    let token = match a.session.share_token() {
        Ok(Some(token)) => token,
        Ok(None) => return,
        Err(e) => {
            log::error!("[share] {e}");
            return;
        }
    };
    let Some(base) = page_base_url() else {
        return;
    };
    ui::show_share_modal(&a.document, &codec::share_url(&base, &token));
}

/// Render the take offline and hand it to the browser as a download.
///
/// Runs as a spawned task: the spinner goes up, the page gets one paint,
/// then the render runs and the guard restores the button when the task ends.
pub fn download(app: &AppRef) {
    {
        let mut a = app.borrow_mut();
        if a.exporting {
            return;
        }
        a.exporting = true;
    }
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let document = app.borrow().document.clone();
        {
            let _busy = BusyGuard::new(|busy| ui::set_busy(&document, busy));
            after_next_paint().await;
            if let Err(e) = export_and_save(&app) {
                log::error!("[export] {e:?}");
            }
        }
        app.borrow_mut().exporting = false;
        app.borrow().refresh();
    });
}

fn export_and_save(app: &AppRef) -> anyhow::Result<()> {
    let a = app.borrow();
    let mut encoder = default_encoder(SAMPLE_RATE)?;
    let epoch_ms = js_sys::Date::now() as u64;
    let Some(file) = a
        .session
        .export(encoder.as_mut(), &RenderSettings::default(), epoch_ms)?
    else {
        return Ok(());
    };
    save_blob(&a.document, &file.bytes, file.mime_type, &file.file_name)
        .map_err(|e| anyhow::anyhow!("download failed: {e:?}"))
}

/// Resolves once the browser has had a chance to paint.
async fn after_next_paint() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let Some(window) = web::window() else {
            let _ = resolve.call0(&JsValue::NULL);
            return;
        };
        // rAF runs before the paint; the timeout lands after it
        let timer_window = window.clone();
        let resolve_later = resolve.clone();
        let on_frame = Closure::once_into_js(move || {
            if timer_window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve_later, 0)
                .is_err()
            {
                let _ = resolve_later.call0(&JsValue::NULL);
            }
        });
        if window
            .request_animation_frame(on_frame.unchecked_ref())
            .is_err()
        {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

fn save_blob(
    document: &web::Document,
    bytes: &[u8],
    mime_type: &str,
    file_name: &str,
) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = web::BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = web::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = web::Url::create_object_url_with_blob(&blob)?;

    let anchor: web::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    web::Url::revoke_object_url(&url)
}

/// Load `?state=` from the page URL, if present, and play it.
pub fn load_from_location(app: &AppRef) {
    let Some(search) = web::window().and_then(|w| w.location().search().ok()) else {
        return;
    };
    let Some(token) = web::UrlSearchParams::new_with_str(&search)
        .ok()
        .and_then(|params| params.get(SHARE_QUERY_PARAM))
    else {
        return;
    };
    let loaded = {
        let a = &mut *app.borrow_mut();
        a.session.load_shared(&token, &mut a.scheduler)
    };
    if let Err(e) = loaded {
        log::error!("[share] failed to load shared state: {e}");
        return;
    }
    {
        let a = app.borrow();
        ui::apply_theme(&a.document, a.session.theme());
        dom::set_select_value(&a.document, ui::KIT_SELECT, a.session.kit().name());
        a.refresh();
    }
    play(app);
}
