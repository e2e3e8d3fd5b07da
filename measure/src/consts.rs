//! Shared numeric defaults for the measure crate.

// ── Backend round trip ──────────────────────────────────────────

/// How often a waiting session checks its pending slot, in milliseconds.
pub const POLL_INTERVAL_MS: f64 = 100.0;

/// How long a session waits for a reply before giving up, in milliseconds.
pub const RESPONSE_TIMEOUT_MS: f64 = 10_000.0;

// ── Annotations ─────────────────────────────────────────────────

/// Arrowhead cone length in world units at zoom 1.
pub const CONE_LENGTH: f64 = 0.1;

/// Line width of the measured segment, in pixels.
pub const SEGMENT_THICKNESS_PX: f64 = 3.0;

/// Line width of the leash from a feature to its panel, in pixels.
pub const LEASH_THICKNESS_PX: f64 = 1.5;

/// Measured segment color (RGB).
pub const SEGMENT_COLOR: u32 = 0x00_20_40;

/// Leash color (RGB).
pub const LEASH_COLOR: u32 = 0x80_80_80;

/// Distance below which two points are treated as coincident.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

// ── Panel ───────────────────────────────────────────────────────

/// Screen offset of a freshly placed panel from its projected anchor, in pixels.
pub const PANEL_OFFSET_X_PX: f64 = 40.0;
/// See [`PANEL_OFFSET_X_PX`]; negative moves the panel up.
pub const PANEL_OFFSET_Y_PX: f64 = -80.0;

/// Panel size assumed until the host reports the measured DOM size.
pub const PANEL_DEFAULT_WIDTH_PX: f64 = 200.0;
/// See [`PANEL_DEFAULT_WIDTH_PX`].
pub const PANEL_DEFAULT_HEIGHT_PX: f64 = 90.0;

/// Fractional digits shown for measured values.
pub const DISPLAY_DECIMALS: usize = 3;
