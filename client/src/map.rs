use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, PointerEvent,
};

use lattice_shared::{ConsensusMember, MarkerView};

use crate::app::{BoundsTrackerStore, Hovered, MapConfigSignal, canvas_dimensions};
use crate::viewport::Viewport;

const MARKER_SIZE: f64 = 26.0;
/// Zoom step applied per control-button click or keyboard shortcut.
pub(crate) const ZOOM_BUTTON_DELTA: f64 = 480.0;

/// A drag that moved less than this is treated as a click on whatever is
/// under the pointer.
const CLICK_SLOP_PX: f64 = 5.0;

struct ResizeBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

pub(crate) fn navigate_to(route: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let _ = window.location().set_href(route);
}

fn canvas_context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Paint the map background: the configured equirectangular backdrop image
/// when available, otherwise a plain graticule.
fn draw_backdrop(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    canvas_w: f64,
    canvas_h: f64,
    backdrop: Option<&HtmlImageElement>,
) {
    ctx.set_fill_style_str("#0b0e14");
    ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);

    let (left, top) = vp.world_to_screen(-180.0, -85.0);
    let (right, bottom) = vp.world_to_screen(180.0, 85.0);

    if let Some(img) = backdrop
        && img.complete()
        && img.natural_width() > 0
    {
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            left,
            top,
            right - left,
            bottom - top,
        )
        .ok();
        return;
    }

    // 30-degree graticule with the equator and prime meridian set brighter
    ctx.set_stroke_style_str("#151c2b");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    let mut lng = -150;
    while lng <= 150 {
        if lng != 0 {
            let (x, _) = vp.world_to_screen(f64::from(lng), 0.0);
            ctx.move_to(x, top);
            ctx.line_to(x, bottom);
        }
        lng += 30;
    }
    let mut lat = -60;
    while lat <= 60 {
        if lat != 0 {
            let (_, y) = vp.world_to_screen(0.0, f64::from(-lat));
            ctx.move_to(left, y);
            ctx.line_to(right, y);
        }
        lat += 30;
    }
    ctx.stroke();

    ctx.set_stroke_style_str("#222c44");
    ctx.begin_path();
    let (meridian_x, equator_y) = vp.world_to_screen(0.0, 0.0);
    ctx.move_to(left, equator_y);
    ctx.line_to(right, equator_y);
    ctx.move_to(meridian_x, top);
    ctx.line_to(meridian_x, bottom);
    ctx.stroke();
    ctx.stroke_rect(left, top, right - left, bottom - top);
}

/// Canvas backdrop plus a DOM marker layer for the consensus roster.
#[component]
pub fn HotspotMap() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let markers: Memo<Vec<MarkerView>> = expect_context();
    let Hovered(hovered) = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();
    let MapConfigSignal(map_config) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let resize_nonce: RwSignal<u64> = RwSignal::new(0);
    let backdrop_image: RwSignal<Option<HtmlImageElement>> = RwSignal::new(None);

    // Drag state. The start position and flag are signals because the marker
    // layer (keyed children) reads them too; the rest stays in plain cells.
    let is_dragging: RwSignal<bool> = RwSignal::new(false);
    let drag_start_x: RwSignal<f64> = RwSignal::new(0.0);
    let drag_start_y: RwSignal<f64> = RwSignal::new(0.0);
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    // Redraw the backdrop when the window resizes
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        RESIZE_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "resize",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        // Debounce: resize streams events while the user drags the window edge
        let debounce: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || {
            if let Some(pending) = debounce.borrow_mut().take() {
                pending.cancel();
            }
            let timeout = Timeout::new(150, move || {
                resize_nonce.update(|n| *n += 1);
            });
            *debounce.borrow_mut() = Some(timeout);
        });
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    // Load the configured backdrop image once config arrives
    Effect::new(move || {
        let Some(config) = map_config.get() else {
            return;
        };
        let Some(url) = config.backdrop_url else {
            backdrop_image.set(None);
            return;
        };
        let Ok(img) = HtmlImageElement::new() else {
            return;
        };

        let loaded = img.clone();
        let onload = wasm_bindgen::closure::Closure::once(move || {
            backdrop_image.set(Some(loaded));
        });
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
        img.set_src(&url);
    });

    // Redraw on viewport, backdrop, or layout changes
    Effect::new(move || {
        let vp = viewport.get();
        let backdrop = backdrop_image.get();
        resize_nonce.track();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };

        let rect = canvas.get_bounding_client_rect();
        let (w, h) = (rect.width(), rect.height());
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0);
        let device_w = (w * dpr) as u32;
        let device_h = (h * dpr) as u32;
        if canvas.width() != device_w || canvas.height() != device_h {
            canvas.set_width(device_w);
            canvas.set_height(device_h);
        }

        let Some(ctx) = canvas_context(&canvas) else {
            return;
        };
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
        draw_backdrop(&ctx, &vp, w, h, backdrop.as_ref());
    });

    // --- Input handlers ---

    let on_pointer_down = {
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
        is_dragging.set(true);
        hovered.set(None);
        drag_start_x.set(f64::from(e.client_x()));
        drag_start_y.set(f64::from(e.client_y()));
        last_x.set(f64::from(e.client_x()));
        last_y.set(f64::from(e.client_y()));

        if let Some(target) = e.target()
            && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
        {
            el.set_pointer_capture(e.pointer_id()).ok();
        }
    }};

    let on_pointer_move = {
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get_untracked() {
                let dx = f64::from(e.client_x()) - last_x.get();
                let dy = f64::from(e.client_y()) - last_y.get();
                last_x.set(f64::from(e.client_x()));
                last_y.set(f64::from(e.client_y()));
                viewport.update(|vp| vp.pan(dx, dy));
            } else if hovered.get_untracked().is_some() {
                mouse_pos.set((f64::from(e.client_x()), f64::from(e.client_y())));
            }
        }
    };

    let on_pointer_up = move |_: PointerEvent| {
        is_dragging.set(false);
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if hovered.get_untracked().is_some() {
            hovered.set(None);
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = f64::from(t1.client_x() - t0.client_x());
                let dy = f64::from(t1.client_y() - t0.client_y());
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = f64::from(t1.client_x() - t0.client_x());
                let dy = f64::from(t1.client_y() - t0.client_y());
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 {
                    let mid_x = f64::from(t0.client_x() + t1.client_x()) / 2.0;
                    let mid_y = f64::from(t0.client_y() + t1.client_y()) / 2.0;
                    let delta = -(new_dist - old_dist) * 2.0;
                    viewport.update(|vp| vp.zoom_at(delta, mid_x, mid_y));
                }
                pinch_dist.set(new_dist);
            }
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden; touch-action: none;"
            style:cursor=move || if is_dragging.get() { "grabbing" } else { "grab" }
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%;"
            />
            <For
                each=move || markers.get()
                key=|m| m.address.clone()
                children=move |m: MarkerView| {
                    let (wx, wy) = crate::viewport::project(m.lng, m.lat);
                    let address = m.address.clone();
                    let hover_address = m.address.clone();
                    let route = m.route.clone();
                    view! {
                        <div
                            class="map-marker"
                            class:map-marker-active=move || {
                                hovered.get().as_deref() == Some(address.as_str())
                            }
                            style:left=move || {
                                let (x, _) = viewport.get().world_to_screen(wx, wy);
                                format!("{:.1}px", x - MARKER_SIZE / 2.0)
                            }
                            style:top=move || {
                                let (_, y) = viewport.get().world_to_screen(wx, wy);
                                format!("{:.1}px", y - MARKER_SIZE / 2.0)
                            }
                            on:click=move |e: MouseEvent| {
                                let dx = (f64::from(e.client_x()) - drag_start_x.get_untracked())
                                    .abs();
                                let dy = (f64::from(e.client_y()) - drag_start_y.get_untracked())
                                    .abs();
                                if dx < CLICK_SLOP_PX && dy < CLICK_SLOP_PX {
                                    navigate_to(&route);
                                }
                            }
                            on:mouseenter=move |e: MouseEvent| {
                                if is_dragging.get_untracked() {
                                    return;
                                }
                                hovered.set(Some(hover_address.clone()));
                                mouse_pos.set((f64::from(e.client_x()), f64::from(e.client_y())));
                            }
                            on:mouseleave=move |_| {
                                if hovered.get_untracked().is_some() {
                                    hovered.set(None);
                                }
                            }
                        >
                            {m.index}
                        </div>
                    }
                }
            />
            <ZoomControls />
            <Attribution />
        </div>
    }
}

/// Zoom in/out plus reset-view, in place of scroll-wheel zoom.
#[component]
fn ZoomControls() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let members: RwSignal<Vec<ConsensusMember>> = expect_context();
    let BoundsTrackerStore(tracker) = expect_context();

    let zoom = move |delta: f64| {
        let (cw, ch) = canvas_dimensions();
        viewport.update(|vp| vp.zoom_at(delta, cw / 2.0, ch / 2.0));
    };

    let reset = move |_| {
        let roster = members.get_untracked();
        let mut t = tracker.get_value();
        let bounds = t.force(&roster);
        tracker.set_value(t);
        let (cw, ch) = canvas_dimensions();
        viewport.update(|vp| vp.fit_map_bounds(&bounds, cw, ch));
    };

    view! {
        <div style="position: absolute; top: 16px; left: 16px; z-index: 10; display: flex; flex-direction: column; gap: 6px;">
            <button class="map-control" title="Zoom in" on:click=move |_| zoom(-ZOOM_BUTTON_DELTA)>
                "+"
            </button>
            <button class="map-control" title="Zoom out" on:click=move |_| zoom(ZOOM_BUTTON_DELTA)>
                "\u{2212}"
            </button>
            <button class="map-control" title="Reset view" on:click=reset>
                "\u{2316}"
            </button>
        </div>
    }
}

#[component]
fn Attribution() -> impl IntoView {
    let MapConfigSignal(map_config) = expect_context();

    view! {
        {move || {
            map_config.get().and_then(|c| c.attribution).map(|text| {
                view! {
                    <div
                        style="position: absolute; bottom: 6px; right: 8px; z-index: 4; font-size: 0.6rem; color: #5a5860; pointer-events: none;"
                        inner_html=text
                    />
                }
            })
        }}
    }
}
