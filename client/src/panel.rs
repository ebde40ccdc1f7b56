use leptos::prelude::*;
use wasm_bindgen::JsCast;

use lattice_shared::{City, CityOrder, ConsensusMember, display_name, flag_emoji};

use crate::app::{
    CityOrderSetting, MembersError, PanelOpen, RosterUpdated, StatsFeedSignal, canvas_dimensions,
};
use crate::fetch;
use crate::format::{format_compact, format_count, format_duration_secs};
use crate::viewport::{Viewport, project};

/// How many ranked cities the panel shows.
const CITY_ROWS: usize = 10;

fn city_label(city: &City) -> String {
    city.long_city
        .clone()
        .or_else(|| city.short_city.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Network-wide stats plus the city rankings. Lives inside the panel wrapper
/// on the map route.
#[component]
pub fn StatsPanel() -> impl IntoView {
    let StatsFeedSignal(stats_feed) = expect_context();
    let CityOrderSetting(city_order) = expect_context();

    let cities: RwSignal<Vec<City>> = RwSignal::new(Vec::new());
    let cities_error: RwSignal<Option<String>> = RwSignal::new(None);
    let request_nonce: RwSignal<u64> = RwSignal::new(0);

    // Refetch the rankings whenever the order toggle changes. The nonce drops
    // responses that arrive after the toggle moved again.
    Effect::new(move || {
        let order = city_order.get();
        let nonce = request_nonce.get_untracked().wrapping_add(1);
        request_nonce.set(nonce);
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match order {
                CityOrder::OnlineCount => fetch::fetch_cities_by_online().await,
                CityOrder::HotspotCount => fetch::fetch_cities_by_total().await,
            };
            if request_nonce.get_untracked() != nonce || city_order.get_untracked() != order {
                return;
            }
            match outcome {
                Ok(list) => {
                    cities.set(list);
                    cities_error.set(None);
                }
                Err(e) => cities_error.set(Some(e)),
            }
        });
    });

    let tiles = Memo::new(move |_| {
        let feed = stats_feed.get();
        let Some(stats) = feed.data() else {
            return Vec::new();
        };
        vec![
            ("Hotspots", format_count(stats.total_hotspots)),
            ("Cities", format_count(stats.total_cities)),
            ("Countries", format_count(stats.total_countries)),
            ("Consensus Groups", format_count(stats.consensus_groups)),
            ("Challenges", format_compact(stats.challenges as f64)),
            ("Block Height", format_count(stats.total_blocks)),
            ("Block Time", format_duration_secs(stats.block_time)),
            ("Election Time", format_duration_secs(stats.election_time)),
            ("Supply (LTX)", format_compact(stats.circulating_supply)),
            ("Packets (30d)", format_compact(stats.packets_transferred as f64)),
            ("Data Credits (30d)", format_compact(stats.data_credits as f64)),
        ]
    });

    let stats_error = Memo::new(move |_| stats_feed.get().error().map(str::to_string));

    let ranked = Memo::new(move |_| {
        cities
            .get()
            .into_iter()
            .take(CITY_ROWS)
            .enumerate()
            .collect::<Vec<_>>()
    });

    view! {
        <div style="border-bottom: 1px solid #282c3e;">
            <div style="padding: 14px 24px 8px; font-family: 'Silkscreen', monospace; font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.14em; color: #5a5860;">
                <span style="color: #35d49a; margin-right: 6px; font-size: 0.7rem;">{"\u{25C6}"}</span>
                "Network"
            </div>
            <Show
                when=move || !stats_feed.get().is_loading()
                fallback=|| view! {
                    <div style="padding: 24px; text-align: center;">
                        <div class="status-pulse" style="font-family: 'JetBrains Mono', monospace; font-size: 0.78rem; color: #3a3f5c; letter-spacing: 0.05em;">"Awaiting network data..."</div>
                    </div>
                }
            >
                <div style="display: grid; grid-template-columns: repeat(2, 1fr); gap: 8px; padding: 4px 24px 16px;">
                    <For
                        each=move || tiles.get()
                        key=|tile| tile.0
                        children=|tile: (&'static str, String)| {
                            view! {
                                <div style="background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; padding: 10px 12px;">
                                    <div style="font-family: 'Inter', system-ui, sans-serif; font-size: 0.62rem; color: #5a5860; text-transform: uppercase; letter-spacing: 0.08em; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;">{tile.0}</div>
                                    <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.95rem; color: #e2e0d8; margin-top: 3px; font-variant-numeric: tabular-nums;">{tile.1}</div>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
            {move || stats_error.get().map(|e| view! {
                <div style="padding: 0 24px 12px; font-family: 'JetBrains Mono', monospace; font-size: 0.66rem; color: #e05252;">
                    "Stats refresh failed: " {e} ". Showing last good data."
                </div>
            })}
        </div>
        <div style="border-bottom: 1px solid #282c3e;">
            <div style="display: flex; align-items: center; justify-content: space-between; padding: 14px 24px 8px;">
                <div style="font-family: 'Silkscreen', monospace; font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.14em; color: #5a5860;">
                    <span style="color: #35d49a; margin-right: 6px; font-size: 0.7rem;">{"\u{25C6}"}</span>
                    "Top Cities"
                </div>
                <div style="display: flex; gap: 4px;">
                    <span
                        style=move || {
                            let active = city_order.get() == CityOrder::OnlineCount;
                            format!(
                                "font-family: 'JetBrains Mono', monospace; font-size: 0.65rem; padding: 2px 8px; border-radius: 3px; cursor: pointer; transition: color 0.15s, background 0.15s; {}",
                                if active {
                                    "color: #35d49a; background: rgba(53,212,154,0.1);"
                                } else {
                                    "color: #3a3f5c; background: transparent;"
                                }
                            )
                        }
                        on:click=move |_| city_order.set(CityOrder::OnlineCount)
                    >"Online"</span>
                    <span
                        style=move || {
                            let active = city_order.get() == CityOrder::HotspotCount;
                            format!(
                                "font-family: 'JetBrains Mono', monospace; font-size: 0.65rem; padding: 2px 8px; border-radius: 3px; cursor: pointer; transition: color 0.15s, background 0.15s; {}",
                                if active {
                                    "color: #6ab6ff; background: rgba(106,182,255,0.1);"
                                } else {
                                    "color: #3a3f5c; background: transparent;"
                                }
                            )
                        }
                        on:click=move |_| city_order.set(CityOrder::HotspotCount)
                    >"Total"</span>
                </div>
            </div>
            {move || cities_error.get().map(|e| view! {
                <div style="padding: 0 24px 12px; font-family: 'JetBrains Mono', monospace; font-size: 0.66rem; color: #e05252;">
                    "City rankings unavailable: " {e}
                </div>
            })}
            <Show
                when=move || !ranked.get().is_empty()
                fallback=move || view! {
                    <div
                        class="status-pulse"
                        style="padding: 18px 24px; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem; color: #3a3f5c;"
                        style:display=move || if cities_error.get().is_some() { "none" } else { "block" }
                    >"Loading city rankings..."</div>
                }
            >
                <ul style="list-style: none; padding: 0 12px 12px;">
                    <For
                        each=move || ranked.get()
                        key=|item| (item.0, item.1.city_id.clone())
                        children=move |item: (usize, City)| {
                            let rank = item.0 + 1;
                            let city = item.1;
                            let flag = city
                                .short_country
                                .as_deref()
                                .and_then(flag_emoji)
                                .unwrap_or_default();
                            let name = city_label(&city);
                            let country = city.short_country.clone().unwrap_or_default();
                            let online = city.online_count;
                            let total = city.hotspot_count;
                            let rank_style = if rank <= 3 {
                                "font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; font-weight: 700; color: #35d49a; width: 22px; text-align: right; flex-shrink: 0;"
                            } else {
                                "font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; color: #4a4e6a; width: 22px; text-align: right; flex-shrink: 0;"
                            };
                            view! {
                                <li
                                    style="display: flex; align-items: center; gap: 10px; padding: 6px 10px; border-radius: 4px; transition: background 0.15s;"
                                    on:mouseenter=|e| {
                                        if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                                            el.style().set_property("background", "#232738").ok();
                                        }
                                    }
                                    on:mouseleave=|e| {
                                        if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                                            el.style().set_property("background", "transparent").ok();
                                        }
                                    }
                                >
                                    <span style=rank_style>{rank}</span>
                                    <span style="font-size: 0.85rem; flex-shrink: 0;">{flag}</span>
                                    <span style="flex: 1; font-size: 0.85rem; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">{name}</span>
                                    <span style="font-size: 0.66rem; color: #5a5860; font-family: 'JetBrains Mono', monospace;">{country}</span>
                                    <span style="font-size: 0.72rem; color: #9a9590; font-family: 'JetBrains Mono', monospace; font-variant-numeric: tabular-nums; min-width: 48px; text-align: right;">
                                        {move || match city_order.get() {
                                            CityOrder::OnlineCount => format_count(online),
                                            CityOrder::HotspotCount => format_count(total),
                                        }}
                                    </span>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
        <StatusBar />
    }
}

/// Connection line at the bottom of the panel.
#[component]
fn StatusBar() -> impl IntoView {
    let StatsFeedSignal(stats_feed) = expect_context();
    let MembersError(members_error) = expect_context();
    let RosterUpdated(roster_updated) = expect_context();
    let members: RwSignal<Vec<ConsensusMember>> = expect_context();

    let status_dot_style = Memo::new(move |_| {
        let feed = stats_feed.get();
        if feed.is_error() || members_error.get().is_some() {
            "width: 8px; height: 8px; border-radius: 50%; background: #e05252; box-shadow: 0 0 8px rgba(224,82,82,0.5);"
        } else if feed.is_loading() {
            "width: 8px; height: 8px; border-radius: 50%; background: #f5c542; box-shadow: 0 0 8px rgba(245,197,66,0.35); animation: pulse-dot 1.5s ease-in-out infinite;"
        } else {
            "width: 8px; height: 8px; border-radius: 50%; background: #50c878; box-shadow: 0 0 8px rgba(80,200,120,0.5);"
        }
    });

    let status_text = Memo::new(move |_| {
        let feed = stats_feed.get();
        if feed.is_error() || members_error.get().is_some() {
            "Stale"
        } else if feed.is_loading() {
            "Connecting..."
        } else {
            "Live"
        }
    });

    let roster_line = Memo::new(move |_| {
        let count = members.get().len();
        match roster_updated.get() {
            Some(ts) => format!("{count} in consensus \u{00B7} {}", ts.format("%H:%M:%S UTC")),
            None => format!("{count} in consensus"),
        }
    });

    view! {
        <div style="margin-top: auto; padding: 10px 12px; border-top: 1px solid #282c3e; display: flex; align-items: center; justify-content: space-between; gap: 8px; font-family: 'JetBrains Mono', monospace; font-size: 0.68rem; color: #6a6870;">
            <div style="display: flex; align-items: center; gap: 6px;">
                <div style=move || status_dot_style.get() />
                <span>{move || status_text.get()}</span>
            </div>
            <span style="overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">{move || roster_line.get()}</span>
        </div>
    }
}

/// Detail view for a single hotspot, shown on `/hotspots/{address}`. The
/// address comes from the URL, so the hotspot may or may not be in the
/// current consensus group.
#[component]
pub fn HotspotPanel(address: String) -> impl IntoView {
    let members: RwSignal<Vec<ConsensusMember>> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let addr = StoredValue::new(address);
    let member = Memo::new(move |_| {
        let address = addr.get_value();
        members.get().into_iter().find(|m| m.address == address)
    });

    // Center the camera on this hotspot once its roster record shows up.
    let focused = RwSignal::new(false);
    Effect::new(move || {
        if focused.get_untracked() {
            return;
        }
        let Some(m) = member.get() else {
            return;
        };
        let Some((lng, lat)) = m.position() else {
            return;
        };
        focused.set(true);
        let (cw, ch) = canvas_dimensions();
        let (wx, wy) = project(lng, lat);
        viewport.update(|vp| vp.fit_bounds(wx, wy, wx, wy, cw, ch));
    });

    let title = Memo::new(move |_| display_name(&addr.get_value()));

    view! {
        <div style="padding: 14px 24px 16px; border-bottom: 1px solid #282c3e;">
            <a
                href="/"
                style="font-family: 'JetBrains Mono', monospace; font-size: 0.68rem; color: #5a5860; text-decoration: none;"
            >"\u{2190} Back to map"</a>
            <div style="margin-top: 10px; font-family: 'Silkscreen', monospace; font-size: 1.05rem; color: #e2e0d8; text-transform: capitalize; letter-spacing: 0.04em;">
                {move || title.get()}
            </div>
            <div style="margin-top: 4px; font-family: 'JetBrains Mono', monospace; font-size: 0.64rem; color: #5a5860; word-break: break-all;">
                {move || addr.get_value()}
            </div>
        </div>
        {move || match member.get() {
            Some(m) => {
                let flag = m
                    .geocode
                    .short_country
                    .as_deref()
                    .and_then(flag_emoji)
                    .unwrap_or_default();
                let location = match (&m.geocode.long_city, &m.geocode.long_country) {
                    (Some(city), Some(country)) => format!("{city}, {country}"),
                    (Some(city), None) => city.clone(),
                    (None, Some(country)) => country.clone(),
                    (None, None) => "Location not asserted".to_string(),
                };
                let coords = m
                    .position()
                    .map(|(lng, lat)| format!("{lat:.4}, {lng:.4}"));
                let elevation = m.elevation.map(|e| format!("{e} m"));
                let owner = m.owner.clone();
                view! {
                    <div style="padding: 14px 24px;">
                        <div style="display: inline-block; font-family: 'JetBrains Mono', monospace; font-size: 0.62rem; color: #35d49a; background: rgba(53,212,154,0.1); border: 1px solid rgba(53,212,154,0.25); padding: 2px 8px; border-radius: 999px;">
                            "In consensus group"
                        </div>
                        <DetailRow label="Location" value=format!("{flag} {location}") />
                        {coords.map(|c| view! { <DetailRow label="Coordinates" value=c /> })}
                        {elevation.map(|e| view! { <DetailRow label="Elevation" value=e /> })}
                        {owner.map(|o| view! { <DetailRow label="Owner" value=o /> })}
                    </div>
                }
                    .into_any()
            }
            None => view! {
                <div style="padding: 14px 24px; font-family: 'Inter', system-ui, sans-serif; font-size: 0.78rem; color: #9a9590; line-height: 1.5;">
                    "This hotspot is not in the current consensus group, so there is no live roster record to show."
                </div>
            }
                .into_any(),
        }}
    }
}

#[component]
fn DetailRow(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div style="margin-top: 12px;">
            <div style="font-family: 'Inter', system-ui, sans-serif; font-size: 0.62rem; color: #5a5860; text-transform: uppercase; letter-spacing: 0.08em;">{label}</div>
            <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; color: #e2e0d8; margin-top: 2px; word-break: break-all;">{value}</div>
        </div>
    }
}

/// Toggle button for showing/hiding the panel. Attached to the panel's left edge.
#[component]
pub fn PanelToggle() -> impl IntoView {
    let PanelOpen(panel_open) = expect_context();

    view! {
        <button
            class="panel-toggle"
            title=move || if panel_open.get() { "Hide panel" } else { "Show panel" }
            style="position: absolute; top: 16px; left: -44px; z-index: 11; width: 32px; height: 32px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; display: flex; align-items: center; justify-content: center; transition: border-color 0.15s, background 0.15s, color 0.15s; color: #5a5860; font-family: 'JetBrains Mono', monospace; font-size: 1.1rem; line-height: 1;"
            on:click=move |_| panel_open.update(|v| *v = !*v)
            on:mouseenter=move |e| {
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("border-color", "rgba(53,212,154,0.4)").ok();
                    el.style().set_property("color", "#35d49a").ok();
                    el.style().set_property("background", "#1a1d2a").ok();
                }
            }
            on:mouseleave=move |e| {
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("border-color", "#282c3e").ok();
                    el.style().set_property("color", "#5a5860").ok();
                    el.style().set_property("background", "#13161f").ok();
                }
            }
        >
            {move || if panel_open.get() { "\u{00BB}" } else { "\u{00AB}" }}
        </button>
    }
}
