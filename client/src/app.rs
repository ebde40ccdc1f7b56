use leptos::prelude::*;
use wasm_bindgen::JsCast;

use std::cell::RefCell;

/// Poll cadence for both the roster and the stats feed.
const POLL_INTERVAL_MS: i32 = 10_000;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

fn set_loading_shell_step(step: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    if let Some(step_el) = document.get_element_by_id("app-loading-step") {
        step_el.set_text_content(Some(step));
    }
}

fn remove_loading_shell() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    if let Some(shell) = document.get_element_by_id("app-loading-shell") {
        shell.remove();
    }
}

struct PollIntervalBinding {
    window: web_sys::Window,
    interval_id: i32,
    _callback: wasm_bindgen::closure::Closure<dyn Fn()>,
}

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static POLL_INTERVAL_BINDING: RefCell<Option<PollIntervalBinding>> = const { RefCell::new(None) };
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

use lattice_shared::{
    BoundsTracker, CityOrder, ConsensusMember, MarkerView, NetworkStats, build_markers,
    members_changed,
};

/// Newtype wrappers give same-shaped signals distinct types for Leptos
/// context. (Without them, `provide_context` overwrites one with the other.)
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct PanelOpen(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct CityOrderSetting(pub RwSignal<CityOrder>);
#[derive(Clone, Copy)]
pub(crate) struct MapConfigSignal(pub RwSignal<Option<MapConfig>>);
#[derive(Clone, Copy)]
pub(crate) struct StatsFeedSignal(pub RwSignal<StatsFeed>);
#[derive(Clone, Copy)]
pub(crate) struct MembersError(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct RosterUpdated(pub RwSignal<Option<chrono::DateTime<chrono::Utc>>>);

/// Change detector for the roster. Kept outside the reactive graph: observing
/// is a read-modify-write, not something to re-run on its own updates.
#[derive(Clone, Copy)]
pub(crate) struct BoundsTrackerStore(pub StoredValue<BoundsTracker>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Map,
    Hotspot(String),
}

/// Path dispatch. Anything that is not a hotspot detail URL renders the map
/// dashboard, including unknown paths.
pub(crate) fn parse_route(path: &str) -> Route {
    if let Some(rest) = path.strip_prefix("/hotspots/") {
        let address = rest.trim_end_matches('/');
        if !address.is_empty() {
            return Route::Hotspot(address.to_string());
        }
    }
    Route::Map
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

use gloo_storage::Storage;

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    panel_open: bool,
    city_order: CityOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            panel_open: true,
            city_order: CityOrder::OnlineCount,
        }
    }
}

use crate::feed::StatsFeed;
use crate::fetch::{self, MapConfig};
use crate::map::{HotspotMap, ZOOM_BUTTON_DELTA};
use crate::panel::{HotspotPanel, PanelToggle, StatsPanel};
use crate::viewport::Viewport;

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    // Global signals
    let members: RwSignal<Vec<ConsensusMember>> = RwSignal::new(Vec::new());
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let hovered: RwSignal<Option<String>> = RwSignal::new(None);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));
    // Seed the stats feed from the last good poll so a returning visitor gets
    // numbers on first paint instead of a skeleton.
    let cached_stats: Option<NetworkStats> =
        gloo_storage::LocalStorage::get("lattice_stats_cache").ok();
    let stats_feed: RwSignal<StatsFeed> = RwSignal::new(StatsFeed::new(cached_stats));
    let map_config: RwSignal<Option<MapConfig>> = RwSignal::new(None);
    let members_error: RwSignal<Option<String>> = RwSignal::new(None);
    let roster_updated: RwSignal<Option<chrono::DateTime<chrono::Utc>>> = RwSignal::new(None);
    let saved: Settings = gloo_storage::LocalStorage::get("lattice_settings").unwrap_or_default();
    let panel_open: RwSignal<bool> = RwSignal::new(saved.panel_open);
    let city_order: RwSignal<CityOrder> = RwSignal::new(saved.city_order);
    let panel_ready: RwSignal<bool> = RwSignal::new(false);
    let members_inflight: RwSignal<bool> = RwSignal::new(false);
    let stats_inflight: RwSignal<bool> = RwSignal::new(false);
    let loading_shell_removed: RwSignal<bool> = RwSignal::new(false);
    let bounds_tracker: StoredValue<BoundsTracker> = StoredValue::new(BoundsTracker::new());

    let route = parse_route(&current_path());
    let auto_fit = route == Route::Map;

    let markers: Memo<Vec<MarkerView>> = Memo::new(move |_| build_markers(&members.get()));

    // Provide via context so children can access
    provide_context(members);
    provide_context(viewport);
    provide_context(markers);
    provide_context(mouse_pos);
    provide_context(Hovered(hovered));
    provide_context(PanelOpen(panel_open));
    provide_context(CityOrderSetting(city_order));
    provide_context(MapConfigSignal(map_config));
    provide_context(StatsFeedSignal(stats_feed));
    provide_context(MembersError(members_error));
    provide_context(RosterUpdated(roster_updated));
    provide_context(BoundsTrackerStore(bounds_tracker));

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            panel_open: panel_open.get(),
            city_order: city_order.get(),
        };
        let _ = gloo_storage::LocalStorage::set("lattice_settings", &settings);
    });

    // Enable panel transitions only after initial mount to avoid first-paint animation flash.
    Effect::new(move || {
        panel_ready.set(true);
    });

    let poll_members = move || {
        if members_inflight.get_untracked() {
            return;
        }
        members_inflight.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match fetch::fetch_members().await {
                Ok(snapshot) => {
                    // Leave the signal alone on a value-identical refresh so
                    // nothing downstream re-renders, let alone the camera.
                    let changed = members
                        .with_untracked(|current| members_changed(current, &snapshot.members));
                    if changed {
                        members.set(snapshot.members);
                    }
                    roster_updated.set(Some(snapshot.timestamp));
                    members_error.set(None);
                }
                Err(e) => members_error.set(Some(e)),
            }
            members_inflight.set(false);
        });
    };

    let poll_stats = move || {
        if stats_inflight.get_untracked() {
            return;
        }
        stats_inflight.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = fetch::fetch_stats().await;
            if let Ok(Some(stats)) = &outcome {
                let _ = gloo_storage::LocalStorage::set("lattice_stats_cache", stats);
            }
            stats_feed.update(|feed| feed.apply(outcome));
            stats_inflight.set(false);
        });
    };

    // 10-second poll for roster and stats, with an immediate first fetch
    Effect::new({
        move || {
            use wasm_bindgen::prelude::*;
            let Some(window) = web_sys::window() else {
                return;
            };

            POLL_INTERVAL_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    old.window.clear_interval_with_handle(old.interval_id);
                }
            });

            poll_members();
            poll_stats();

            let cb = Closure::<dyn Fn()>::new(move || {
                poll_members();
                poll_stats();
            });
            let Ok(interval_id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                POLL_INTERVAL_MS,
            ) else {
                return;
            };
            POLL_INTERVAL_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(PollIntervalBinding {
                    window: window.clone(),
                    interval_id,
                    _callback: cb,
                });
            });
        }
    });

    // One-shot fetch of the map backdrop config
    Effect::new(move || {
        wasm_bindgen_futures::spawn_local(async move {
            if let Ok(config) = fetch::fetch_map_config().await {
                map_config.set(Some(config));
            }
        });
    });

    // Fit the camera to the roster, but only when the roster actually
    // changed by value. On the detail route the camera belongs to the
    // focused hotspot instead.
    Effect::new(move || {
        let roster = members.get();
        if !auto_fit {
            return;
        }
        let mut tracker = bounds_tracker.get_value();
        let fitted = tracker.observe(&roster);
        bounds_tracker.set_value(tracker);
        if let Some(bounds) = fitted {
            let (cw, ch) = canvas_dimensions();
            viewport.update(|vp| vp.fit_map_bounds(&bounds, cw, ch));
        }
    });

    // Drop the static loading shell once the first roster response lands
    Effect::new(move || {
        if loading_shell_removed.get_untracked() {
            return;
        }
        if !members.get().is_empty() || members_error.get().is_some() {
            loading_shell_removed.set(true);
            remove_loading_shell();
        } else {
            set_loading_shell_step("Fetching consensus roster");
        }
    });

    // Keyboard shortcuts
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler = wasm_bindgen::closure::Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(
            move |e: web_sys::KeyboardEvent| match e.key().as_str() {
                "Escape" => {
                    hovered.set(None);
                }
                "+" | "=" => {
                    e.prevent_default();
                    let (cw, ch) = canvas_dimensions();
                    viewport.update(|vp| vp.zoom_at(-ZOOM_BUTTON_DELTA, cw / 2.0, ch / 2.0));
                }
                "-" => {
                    e.prevent_default();
                    let (cw, ch) = canvas_dimensions();
                    viewport.update(|vp| vp.zoom_at(ZOOM_BUTTON_DELTA, cw / 2.0, ch / 2.0));
                }
                "0" | "r" => {
                    let roster = members.get_untracked();
                    let mut tracker = bounds_tracker.get_value();
                    let bounds = tracker.force(&roster);
                    bounds_tracker.set_value(tracker);
                    let (cw, ch) = canvas_dimensions();
                    viewport.update(|vp| vp.fit_map_bounds(&bounds, cw, ch));
                }
                _ => {}
            },
        );

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative;">
            <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0b0e14;">
                <HotspotMap />
            </div>
            <div
                class="panel-wrapper"
                class:panel-ready=move || panel_ready.get()
                style:transform=move || if panel_open.get() { "translateX(0)" } else { "translateX(100%)" }
                style:pointer-events=move || if panel_open.get() { "auto" } else { "none" }
            >
                <PanelToggle />
                <div
                    class="panel-inner scrollbar-thin"
                    style:display=move || if panel_open.get() { "flex" } else { "none" }
                    style="width: 100%; min-width: 100%; height: 100%; background: #13161f; border-left: 1px solid #282c3e; display: flex; flex-direction: column; overflow-y: auto; z-index: 10; box-shadow: -4px 0 20px rgba(0,0,0,0.4), inset 1px 0 0 rgba(53,212,154,0.04);"
                >
                    {match route {
                        Route::Map => view! { <StatsPanel /> }.into_any(),
                        Route::Hotspot(address) => {
                            view! { <HotspotPanel address=address /> }.into_any()
                        }
                    }}
                </div>
            </div>
        </div>
        <Tooltip />
    }
}

/// Tooltip that follows the mouse cursor when hovering a marker.
#[component]
fn Tooltip() -> impl IntoView {
    let Hovered(hovered) = expect_context();
    let markers: Memo<Vec<MarkerView>> = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let tooltip_info = Memo::new(move |_| {
        let address = hovered.get()?;
        markers.get().into_iter().find(|m| m.address == address)
    });

    view! {
        {move || {
            let Some(info) = tooltip_info.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (x, y) = mouse_pos.get();
            let flag = info.flag.clone().unwrap_or_default();
            let country = info
                .country
                .clone()
                .unwrap_or_else(|| "Location not asserted".to_string());
            view! {
                <div
                    class="tooltip-animate"
                    style:left=format!("{}px", x + 16.0)
                    style:top=format!("{}px", y - 8.0)
                    style="position: fixed; pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; overflow: hidden; box-shadow: 0 4px 16px rgba(0,0,0,0.5); max-width: 240px; display: flex; flex-direction: row;"
                >
                    <div style="width: 3px; flex-shrink: 0; background: rgba(53,212,154,0.85);" />
                    <div style="padding: 8px 10px; flex: 1;">
                        <div style="font-size: 0.82rem; font-weight: 700; color: #e2e0d8; font-family: 'Silkscreen', monospace; line-height: 1.3; text-transform: capitalize;">
                            {info.label.clone()}
                        </div>
                        <div style="font-size: 0.72rem; color: #9a9590; font-family: 'JetBrains Mono', monospace; margin-top: 2px;">
                            <span style="color: #35d49a;">"#" {info.index}</span>
                            " \u{00B7} "
                            {flag}
                            " "
                            {country}
                        </div>
                    </div>
                </div>
            }
                .into_any()
        }}
    }
}
