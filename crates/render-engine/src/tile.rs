//! Per-pane tile rendering.
//!
//! A tile is one pane's picture at one frame. Rendering never fails: a
//! file that cannot be read or decoded still yields a tile, annotated with
//! a short error line, so one bad input degrades one tile only.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use paneview_common::error::PaneviewResult;

use crate::decode::{decode_rgb, FileCategory};
use crate::font::{chars_that_fit, draw_text, ellipsize, text_width};

/// Height reserved at the top of every tile for the header line.
pub const HEADER_HEIGHT: u32 = 25;

/// Vertical distance between text lines.
pub const LINE_PITCH: i64 = 12;

/// Text files are previewed from at most this many leading bytes.
pub const TEXT_BYTE_CAP: u64 = 800;

/// File names longer than this are cut in the header.
pub const NAME_BUDGET: usize = 25;

/// Upper bound for the placeholder icon of generic files.
pub const MAX_ICON_SIZE: u32 = 32;

const MARGIN: i32 = 5;
const METADATA_PITCH: i64 = 15;
const ERROR_LINE_Y: i32 = 35;

pub mod palette {
    use image::Rgb;

    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
    pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);
    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
    pub const LIGHT_GREEN: Rgb<u8> = Rgb([144, 238, 144]);
    pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([211, 211, 211]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([169, 169, 169]);
}

/// Geometry of the area under the header. Signed, since tiny tiles leave
/// no room at all.
#[derive(Debug, Clone, Copy)]
struct ContentArea {
    width: i64,
    height: i64,
}

impl ContentArea {
    fn of(tile: &RgbImage) -> Self {
        Self {
            width: tile.width() as i64,
            height: tile.height() as i64 - HEADER_HEIGHT as i64,
        }
    }

    fn top(&self) -> i64 {
        HEADER_HEIGHT as i64
    }

    /// Baseline of the footer line.
    fn footer_y(&self) -> i32 {
        (self.top() + self.height - 15) as i32
    }
}

/// Draws one tile per pane per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaneContentRenderer;

impl PaneContentRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `path` into a `width` x `height` tile for pane `pane_number`
    /// (1-based, as shown to the user).
    pub fn render(&self, path: &Path, width: u32, height: u32, pane_number: usize) -> RgbImage {
        let mut tile = RgbImage::from_pixel(width, height, palette::BLACK);
        if width == 0 || height == 0 {
            return tile;
        }

        draw_hollow_rect_mut(&mut tile, Rect::at(0, 0).of_size(width, height), palette::WHITE);
        draw_text(
            &mut tile,
            MARGIN,
            MARGIN,
            &header_label(path, pane_number),
            palette::YELLOW,
        );

        let area = ContentArea::of(&tile);
        let category = FileCategory::of(path);
        let drawn = match category {
            FileCategory::Image => draw_image(&mut tile, path, area),
            FileCategory::Text => draw_text_preview(&mut tile, path, area),
            FileCategory::Other => draw_metadata(&mut tile, path, area),
        };

        if let Err(e) = drawn {
            tracing::warn!(
                pane = pane_number,
                path = %path.display(),
                error = %e,
                "Tile rendered with error annotation"
            );
            let message = format!("{}: {}", error_prefix(category), e.short_message());
            let budget = chars_that_fit(width.saturating_sub(10));
            draw_text(
                &mut tile,
                MARGIN,
                ERROR_LINE_Y,
                &ellipsize(&message, budget),
                palette::RED,
            );
        }

        tile
    }

    /// Tile for a pane that has no file at the current frame.
    pub fn render_empty(&self, width: u32, height: u32, pane_number: usize) -> RgbImage {
        let mut tile = RgbImage::from_pixel(width, height, palette::BLACK);
        if width == 0 || height == 0 {
            return tile;
        }

        draw_hollow_rect_mut(&mut tile, Rect::at(0, 0).of_size(width, height), palette::GRAY);
        draw_text(
            &mut tile,
            MARGIN,
            MARGIN,
            &format!("Pane {pane_number}: No file"),
            palette::GRAY,
        );
        let label = "Empty";
        draw_text(
            &mut tile,
            (width as i32 - text_width(label) as i32) / 2,
            height as i32 / 2,
            label,
            palette::GRAY,
        );
        tile
    }
}

fn error_prefix(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Image => "Image load error",
        FileCategory::Text => "Text error",
        FileCategory::Other => "File error",
    }
}

/// `P{n}: {name}`, with the name cut to [`NAME_BUDGET`] characters.
pub fn header_label(path: &Path, pane_number: usize) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.chars().count() > NAME_BUDGET {
        let cut: String = name.chars().take(NAME_BUDGET).collect();
        format!("P{pane_number}: {cut}...")
    } else {
        format!("P{pane_number}: {name}")
    }
}

/// Largest size with the source aspect ratio that fits the bounds.
/// Never returns a zero dimension.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (w, h) = (width.max(1) as u64, height.max(1) as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);
    let (fit_w, fit_h) = if w * mh > mw * h {
        (mw, mw * h / w)
    } else {
        (mh * w / h, mh)
    };
    (fit_w.max(1) as u32, fit_h.max(1) as u32)
}

fn draw_image(tile: &mut RgbImage, path: &Path, area: ContentArea) -> PaneviewResult<()> {
    let source = decode_rgb(path)?;
    let (src_w, src_h) = source.dimensions();
    let avail_w = area.width - 10;
    let avail_h = area.height - 30;

    let mut info = format!("Image: {src_w}x{src_h}");
    if avail_w > 0 && avail_h > 0 {
        let (fit_w, fit_h) = fit_within(src_w, src_h, avail_w as u32, avail_h as u32);
        let scaled = imageops::resize(&source, fit_w, fit_h, FilterType::Triangle);
        let x = (area.width - fit_w as i64) / 2;
        let y = area.top() + (area.height - fit_h as i64 - 20) / 2;
        imageops::replace(tile, &scaled, x, y);
        info.push_str(&format!(" -> {fit_w}x{fit_h}"));
    }

    draw_text(tile, MARGIN, area.footer_y(), &info, palette::CYAN);
    Ok(())
}

fn draw_text_preview(tile: &mut RgbImage, path: &Path, area: ContentArea) -> PaneviewResult<()> {
    let mut bytes = Vec::new();
    File::open(path)?
        .take(TEXT_BYTE_CAP)
        .read_to_end(&mut bytes)?;
    let content = String::from_utf8_lossy(&bytes);

    let max_lines = ((area.height - 30) / LINE_PITCH).max(0) as usize;
    let max_chars = chars_that_fit((area.width - 10).max(0) as u32);

    let mut y_offset = MARGIN as i64;
    for line in content.split('\n').take(max_lines) {
        if y_offset + LINE_PITCH > area.height - 25 {
            break;
        }
        let line = line.trim_end_matches('\r');
        draw_text(
            tile,
            MARGIN,
            (area.top() + y_offset) as i32,
            &ellipsize(line, max_chars),
            palette::LIGHT_GREEN,
        );
        y_offset += LINE_PITCH;
    }

    let size = std::fs::metadata(path)?.len();
    draw_text(
        tile,
        MARGIN,
        area.footer_y(),
        &format!("Size: {size} bytes"),
        palette::GRAY,
    );
    Ok(())
}

fn draw_metadata(tile: &mut RgbImage, path: &Path, area: ContentArea) -> PaneviewResult<()> {
    let meta = std::fs::metadata(path)?;

    let icon_size = MAX_ICON_SIZE
        .min(tile.width() / 3)
        .min((area.height / 3).max(0) as u32);
    let icon_x = tile.width() as i32 / 2 - icon_size as i32 / 2;
    let icon_y = area.top() as i32 + 20;
    if icon_size > 0 {
        let icon = Rect::at(icon_x, icon_y).of_size(icon_size, icon_size);
        draw_filled_rect_mut(tile, icon, palette::DARK_GRAY);
        draw_hollow_rect_mut(tile, icon, palette::WHITE);
    }

    let modified = meta
        .modified()
        .map(|t| DateTime::<Local>::from(t).format("%b %-d").to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let kind = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| "No extension".to_string());
    let lines = [
        format!("Size: {} bytes", group_thousands(meta.len())),
        format!("Modified: {modified}"),
        format!("Type: {kind}"),
    ];

    let limit = area.top() + area.height - 20;
    let mut y = (icon_y + icon_size as i32 + 20) as i64;
    for line in &lines {
        if y > limit {
            break;
        }
        draw_text(tile, MARGIN, y as i32, line, palette::LIGHT_GRAY);
        y += METADATA_PITCH;
    }
    Ok(())
}

/// `1234567` as `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
