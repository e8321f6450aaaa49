//! Summary image rendering.
//!
//! Draws the post-refresh summary card — total country count, refresh
//! timestamp, and the top-5 estimated-GDP table — as a PNG written to a
//! configurable path and served by `GET /countries/image`.
//!
//! Fonts are discovered at runtime: `ATLAS_FONT_PATH` if set, otherwise
//! well-known DejaVu locations. A host without a usable TTF makes
//! rendering fail soft; the refresh itself never depends on it.

#![warn(clippy::all)]

use std::fs;
use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::debug;

use atlas_domain::time;
use atlas_engine::{RenderError, SummaryInput, SummaryRenderer};

/// Canvas size
const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

/// Dark slate background, light text
const BACKGROUND: Rgb<u8> = Rgb([15, 23, 42]);
const TEXT: Rgb<u8> = Rgb([240, 240, 240]);

const HEADER_SCALE: f32 = 28.0;
const BODY_SCALE: f32 = 18.0;

/// Well-known DejaVu locations tried when `ATLAS_FONT_PATH` is unset.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/local/share/fonts/DejaVuSans.ttf",
];

/// PNG renderer for the refresh summary.
pub struct PngSummaryRenderer {
    out_path: PathBuf,
    font_path: Option<PathBuf>,
}

impl PngSummaryRenderer {
    /// Render to `out_path`, discovering a font from the environment.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            font_path: std::env::var_os("ATLAS_FONT_PATH").map(PathBuf::from),
        }
    }

    /// Render with an explicit font file (configuration/testing).
    pub fn with_font(out_path: impl Into<PathBuf>, font_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            font_path: Some(font_path.into()),
        }
    }

    fn load_font(&self) -> Result<FontVec, RenderError> {
        let candidates: Vec<PathBuf> = match &self.font_path {
            Some(path) => vec![path.clone()],
            None => FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };

        for path in &candidates {
            if let Ok(bytes) = fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(bytes) {
                    debug!(path = %path.display(), "loaded summary font");
                    return Ok(font);
                }
            }
        }

        Err(RenderError::new(
            "no usable TTF font found (set ATLAS_FONT_PATH)",
        ))
    }
}

impl SummaryRenderer for PngSummaryRenderer {
    fn render(&self, summary: &SummaryInput) -> Result<PathBuf, RenderError> {
        let font = self.load_font()?;

        let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
        let header = PxScale::from(HEADER_SCALE);
        let body = PxScale::from(BODY_SCALE);

        // Header
        draw_text_mut(&mut img, TEXT, 30, 20, header, &font, "Country Cache Summary");
        draw_text_mut(
            &mut img,
            TEXT,
            30,
            60,
            body,
            &font,
            &format!("Total countries: {}", summary.total_countries),
        );
        draw_text_mut(
            &mut img,
            TEXT,
            30,
            90,
            body,
            &font,
            &format!(
                "Last refreshed: {}",
                time::to_second_iso(&summary.last_refreshed_at)
            ),
        );

        // Top 5 table
        draw_text_mut(
            &mut img,
            TEXT,
            30,
            140,
            header,
            &font,
            "Top 5 countries by estimated GDP",
        );
        let mut y = 190;
        for (i, (name, gdp)) in summary.top_by_gdp.iter().enumerate() {
            draw_text_mut(&mut img, TEXT, 40, y, body, &font, &format!("{}. {}", i + 1, name));
            draw_text_mut(&mut img, TEXT, 500, y, body, &font, &format_usd(*gdp));
            y += 36;
        }

        if let Some(parent) = self.out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RenderError::new(format!("create {}: {e}", parent.display()))
                })?;
            }
        }
        img.save(&self.out_path)
            .map_err(|e| RenderError::new(format!("write {}: {e}", self.out_path.display())))?;

        Ok(self.out_path.clone())
    }
}

/// `$1,234,567.89`-style formatting.
fn format_usd(value: f64) -> String {
    let negative = value < 0.0;
    let cents = format!("{:.2}", value.abs());
    let (int_part, frac_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

// =============================================================================
// Tests
// =============================================================================
