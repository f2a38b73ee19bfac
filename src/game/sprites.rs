//! Sprite loading and the handful of canvas operations the renderers need.
//!
//! Every sprite has a generated stand-in, so a missing asset never stops a
//! game from rendering. Sprites that exist on disk but fail to decode are
//! reported as errors.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chess::{Color, Piece, ALL_COLORS, ALL_PIECES, NUM_PIECES};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use log::{debug, info};

use crate::error::{BotError, Result};
use crate::game::utils::{color_to_string, piece_to_string};

pub const DEFAULT_CARS: &[&str] = &[
    "ae86", "anakin", "bloodhound", "cybertruck", "delorean", "earnhardt", "elise", "f1", "horse", "jeep",
    "kitano", "lego", "mach-5", "mario", "mcqueen", "pickup", "rainbow", "reverb", "runner", "sonic",
];

const CAR_PALETTE: &[[u8; 3]] = &[
    [220, 40, 40],
    [40, 90, 220],
    [250, 200, 30],
    [40, 170, 80],
    [150, 60, 200],
    [250, 130, 20],
    [30, 190, 200],
    [120, 120, 120],
];

/// Every image the multiplayer games draw with.
pub struct SpriteSheet {
    pub race_background: RgbaImage,
    pub fireworks: RgbaImage,
    pub congrats: RgbaImage,
    pub chess_board: RgbaImage,
    cars: BTreeMap<String, RgbaImage>,
    fallback_car: RgbaImage,
    pieces: Vec<RgbaImage>,
}

impl SpriteSheet {
    /// Loads sprites from `dir`, keeping generated stand-ins for any file
    /// that is not there.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut sheet = SpriteSheet::placeholder();
        let race = dir.join("car-race");
        if let Some(image) = load_optional(&race.join("bg.png"))? {
            sheet.race_background = image;
        }
        if let Some(image) = load_optional(&race.join("fireworks.png"))? {
            sheet.fireworks = image;
        }
        if let Some(image) = load_optional(&race.join("congrats.png"))? {
            sheet.congrats = image;
        }
        if let Ok(entries) = fs::read_dir(race.join("cars")) {
            let mut cars = BTreeMap::new();
            for path in entries.flatten().map(|entry| entry.path()) {
                if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|stem| stem.to_str()).map(str::to_lowercase) else {
                    continue;
                };
                if let Some(image) = load_optional(&path)? {
                    cars.insert(name, image);
                }
            }
            if !cars.is_empty() {
                sheet.cars = cars;
            }
        }

        let chess_dir = dir.join("chess");
        if let Some(image) = load_optional(&chess_dir.join("board.png"))? {
            sheet.chess_board = image;
        }
        for color in ALL_COLORS {
            for piece in ALL_PIECES {
                let file = format!("{}-{}.png", color_to_string(color), piece_to_string(piece));
                if let Some(image) = load_optional(&chess_dir.join(file))? {
                    sheet.pieces[piece_slot(color, piece)] = image;
                }
            }
        }
        info!("Loaded sprites from {} ({} cars)", dir.display(), sheet.cars.len());
        Ok(sheet)
    }

    /// Generated sprites only.
    pub fn placeholder() -> Self {
        let cars = DEFAULT_CARS
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), placeholder_car(CAR_PALETTE[i % CAR_PALETTE.len()])))
            .collect();
        let mut pieces = Vec::with_capacity(2 * NUM_PIECES);
        for color in ALL_COLORS {
            for piece in ALL_PIECES {
                pieces.push(placeholder_piece(color, piece));
            }
        }
        SpriteSheet {
            race_background: placeholder_race_background(),
            fireworks: solid(200, 140, [255, 120, 180, 200]),
            congrats: solid(250, 62, [255, 215, 0, 255]),
            chess_board: placeholder_board(),
            cars,
            fallback_car: placeholder_car([90, 90, 90]),
            pieces,
        }
    }

    /// Known car names in a stable order.
    pub fn car_names(&self) -> Vec<String> {
        self.cars.keys().cloned().collect()
    }

    pub fn car(&self, name: &str) -> &RgbaImage {
        self.cars.get(name).unwrap_or(&self.fallback_car)
    }

    pub fn piece(&self, color: Color, piece: Piece) -> &RgbaImage {
        &self.pieces[piece_slot(color, piece)]
    }
}

fn piece_slot(color: Color, piece: Piece) -> usize {
    color.to_index() * NUM_PIECES + piece.to_index()
}

fn load_optional(path: &Path) -> Result<Option<RgbaImage>> {
    if !path.exists() {
        debug!("Sprite {} missing, using placeholder", path.display());
        return Ok(None);
    }
    image::open(path)
        .map(|image| Some(image.to_rgba8()))
        .map_err(|source| BotError::Sprite { path: path.display().to_string(), source })
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

fn placeholder_race_background() -> RgbaImage {
    RgbaImage::from_fn(620, 380, |_, y| match y {
        0..=199 => Rgba([135, 206, 235, 255]),
        200..=219 => Rgba([60, 160, 60, 255]),
        _ => Rgba([80, 80, 80, 255]),
    })
}

fn placeholder_car(body: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(150, 60, |x, y| {
        let wheel = y >= 42 && ((20..=45).contains(&x) || (105..=130).contains(&x));
        if wheel {
            Rgba([20, 20, 20, 255])
        } else if (12..42).contains(&y) && (5..145).contains(&x) {
            Rgba([body[0], body[1], body[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn placeholder_board() -> RgbaImage {
    RgbaImage::from_fn(504, 512, |x, y| {
        if x < 36 || y < 40 || x >= 36 + 8 * 54 || y >= 40 + 8 * 54 {
            return Rgba([90, 60, 40, 255]);
        }
        let file = (x - 36) / 54;
        let rank = (y - 40) / 54;
        if (file + rank) % 2 == 0 {
            Rgba([240, 217, 181, 255])
        } else {
            Rgba([181, 136, 99, 255])
        }
    })
}

fn placeholder_piece(color: Color, piece: Piece) -> RgbaImage {
    let fill = match color {
        Color::White => [250, 250, 250, 255],
        Color::Black => [25, 25, 25, 255],
    };
    // Higher value pieces get a larger silhouette so boards stay readable.
    let inset = 18 - 3 * piece.to_index() as u32;
    RgbaImage::from_fn(52, 52, |x, y| {
        let inside = x >= inset && y >= inset && x < 52 - inset && y < 52 - inset;
        let edge = inside && (x == inset || y == inset || x == 51 - inset || y == 51 - inset);
        if edge {
            Rgba([128, 128, 128, 255])
        } else if inside {
            Rgba(fill)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

pub fn draw(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(canvas, sprite, x, y);
}

pub fn draw_scaled(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i64, y: i64, width: u32, height: u32) {
    if sprite.dimensions() == (width, height) {
        draw(canvas, sprite, x, y);
    } else {
        let scaled = imageops::resize(sprite, width, height, FilterType::Triangle);
        draw(canvas, &scaled, x, y);
    }
}

/// Draws `sprite` with its opaque pixels blended halfway toward `tint`.
pub fn draw_tinted(canvas: &mut RgbaImage, sprite: &RgbaImage, tint: [u8; 3], x: i64, y: i64, width: u32, height: u32) {
    let mut tinted = imageops::resize(sprite, width, height, FilterType::Triangle);
    for pixel in tinted.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        for channel in 0..3 {
            pixel[channel] = blend(tint[channel], pixel[channel], 0.5);
        }
    }
    draw(canvas, &tinted, x, y);
}

/// Fills a rectangle with `color` at `alpha` opacity, clipped to the canvas.
pub fn fill_rect_alpha(canvas: &mut RgbaImage, x: i64, y: i64, width: u32, height: u32, color: [u8; 3], alpha: f32) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    let x0 = x.clamp(0, canvas_w as i64) as u32;
    let y0 = y.clamp(0, canvas_h as i64) as u32;
    let x1 = (x + width as i64).clamp(0, canvas_w as i64) as u32;
    let y1 = (y + height as i64).clamp(0, canvas_h as i64) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            let pixel = canvas.get_pixel_mut(px, py);
            for channel in 0..3 {
                pixel[channel] = blend(color[channel], pixel[channel], alpha);
            }
        }
    }
}

fn blend(top: u8, bottom: u8, alpha: f32) -> u8 {
    (top as f32 * alpha + bottom as f32 * (1.0 - alpha)).round() as u8
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(canvas.as_raw(), canvas.width(), canvas.height(), ColorType::Rgba8)
        .map_err(BotError::Encode)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_sheet_knows_every_default_car() {
        let sheet = SpriteSheet::placeholder();
        assert_eq!(sheet.car_names().len(), DEFAULT_CARS.len());
        assert_eq!(sheet.car("mcqueen").dimensions(), (150, 60));
        assert_eq!(sheet.car("no-such-car").dimensions(), (150, 60));
    }

    #[test]
    fn missing_asset_dir_falls_back_to_placeholders() {
        let sheet = SpriteSheet::load(Path::new("/definitely/not/here")).unwrap();
        assert_eq!(sheet.chess_board.dimensions(), (504, 512));
    }

    #[test]
    fn alpha_fill_blends_and_clips() {
        let mut canvas = solid(4, 4, [0, 0, 0, 255]);
        fill_rect_alpha(&mut canvas, -2, -2, 4, 4, [0, 200, 0], 0.5);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 100, 0, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn tint_leaves_transparent_pixels_alone() {
        let mut canvas = solid(2, 1, [10, 10, 10, 255]);
        let mut sprite = solid(2, 1, [0, 0, 0, 0]);
        sprite.put_pixel(0, 0, Rgba([200, 200, 200, 255]));
        draw_tinted(&mut canvas, &sprite, [0, 128, 0], 0, 0, 2, 1);
        assert_eq!(canvas.get_pixel(0, 0).0, [100, 164, 100, 255]);
        assert_eq!(canvas.get_pixel(1, 0).0, [10, 10, 10, 255]);
    }
}
