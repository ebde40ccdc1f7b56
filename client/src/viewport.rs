use lattice_shared::MapBounds;

/// Viewport manages the pan/zoom transformation from world coordinates to
/// screen coordinates. World space is a plate carrée mapping of the globe:
/// one unit per degree, x = longitude, y = negated latitude so north is up.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 16384.0;
const ZOOM_SENSITIVITY: f64 = 0.001;

/// Screen padding applied when fitting bounds, so edge markers stay clear of
/// the panel and the zoom controls.
const FIT_PADDING_PX: f64 = 100.0;

/// A one-member roster yields a zero-extent box; clamp the fitted extent so
/// the camera lands at a city-scale zoom instead of the scale ceiling.
const MIN_FIT_EXTENT_DEG: f64 = 0.5;

/// Project geographic coordinates into world space.
pub fn project(lng: f64, lat: f64) -> (f64, f64) {
    (lng, -lat)
}

impl Default for Viewport {
    fn default() -> Self {
        // Placeholder framing; replaced by a bounds fit on first layout.
        Self {
            offset_x: 600.0,
            offset_y: 400.0,
            scale: 2.0,
        }
    }
}

impl Viewport {
    /// Convert world coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to world coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Adjust offset so the point under the focus stays fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit the viewport to show the given world-coordinate box with padding.
    pub fn fit_bounds(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        canvas_w: f64,
        canvas_h: f64,
    ) {
        if canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let world_w = (max_x - min_x).max(MIN_FIT_EXTENT_DEG);
        let world_h = (max_y - min_y).max(MIN_FIT_EXTENT_DEG);
        let usable_w = if canvas_w > 2.0 * FIT_PADDING_PX {
            canvas_w - 2.0 * FIT_PADDING_PX
        } else {
            canvas_w
        };
        let usable_h = if canvas_h > 2.0 * FIT_PADDING_PX {
            canvas_h - 2.0 * FIT_PADDING_PX
        } else {
            canvas_h
        };
        self.scale = (usable_w / world_w)
            .min(usable_h / world_h)
            .clamp(MIN_SCALE, MAX_SCALE);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 - center_y * self.scale;
    }

    /// Fit to geographic bounds as produced by the roster bounds calculator.
    pub fn fit_map_bounds(&mut self, bounds: &MapBounds, canvas_w: f64, canvas_h: f64) {
        let (min_x, min_y) = project(bounds.sw_lng, bounds.ne_lat);
        let (max_x, max_y) = project(bounds.ne_lng, bounds.sw_lat);
        self.fit_bounds(min_x, min_y, max_x, max_y, canvas_w, canvas_h);
    }
}
