use base64::{engine::general_purpose, Engine as _};
use image::GenericImageView;
use serde::{Deserialize, Serialize};

const KITTY_CHUNK: usize = 4096;
const KITTY_PNG: u32 = 100;
const KITTY_IMAGE_ID: u32 = 1;

/// Decoded artwork, base64 encoded for the Kitty graphics protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (width, height) = image.dimensions();
    Ok(SpriteData {
        payload: general_purpose::STANDARD.encode(bytes),
        width,
        height,
    })
}

pub fn kitty_sequence(sprite: &SpriteData, cols: u16, rows: u16) -> String {
    let payload = sprite.payload.as_bytes();
    let total_chunks = payload.len().div_ceil(KITTY_CHUNK);
    let mut sequence = String::new();

    // base64 output is ascii, so chunk boundaries are always valid utf-8
    for (index, chunk) in payload.chunks(KITTY_CHUNK).enumerate() {
        let more = u8::from(index + 1 < total_chunks);
        let chunk = String::from_utf8_lossy(chunk);
        if index == 0 {
            let mut params = format!(
                "f={KITTY_PNG},s={},v={},a=T,t=d,i={KITTY_IMAGE_ID}",
                sprite.width, sprite.height
            );
            if cols > 0 {
                params.push_str(&format!(",c={cols}"));
            }
            if rows > 0 {
                params.push_str(&format!(",r={rows}"));
            }
            sequence.push_str(&format!("\x1b_G{params},m={more};{chunk}\x1b\\"));
        } else {
            sequence.push_str(&format!("\x1b_Gm={more};{chunk}\x1b\\"));
        }
    }
    sequence
}

/// Largest cell box with the sprite's aspect ratio that fits the area.
/// Terminal cells are about twice as tall as they are wide.
pub fn sprite_fit(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    const CELL_ASPECT: f32 = 2.0;
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let image_ratio = sprite.width as f32 / sprite.height as f32;
    let cols_for_max_rows = image_ratio * max_rows as f32 * CELL_ASPECT;
    if cols_for_max_rows <= max_cols as f32 {
        let cols = cols_for_max_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows);
    }
    let rows_for_max_cols = max_cols as f32 / (image_ratio * CELL_ASPECT);
    let rows = rows_for_max_cols.max(1.0).round() as u16;
    (max_cols, rows.clamp(1, max_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(width: u32, height: u32, payload_len: usize) -> SpriteData {
        SpriteData {
            payload: "A".repeat(payload_len),
            width,
            height,
        }
    }

    #[test]
    fn square_sprite_is_limited_by_rows() {
        assert_eq!(sprite_fit(&sprite(475, 475, 4), 40, 10), (20, 10));
    }

    #[test]
    fn square_sprite_is_limited_by_cols() {
        assert_eq!(sprite_fit(&sprite(475, 475, 4), 10, 10), (10, 5));
    }

    #[test]
    fn empty_area_is_returned_as_is() {
        assert_eq!(sprite_fit(&sprite(475, 475, 4), 0, 10), (0, 10));
    }

    #[test]
    fn kitty_sequence_chunks_large_payloads() {
        let sequence = kitty_sequence(&sprite(10, 10, KITTY_CHUNK + 10), 4, 2);
        assert!(sequence.starts_with("\x1b_Gf=100,s=10,v=10,a=T,t=d,i=1,c=4,r=2,m=1;"));
        assert!(sequence.contains("\x1b_Gm=0;"));
        assert_eq!(sequence.matches("\x1b\\").count(), 2);
    }

    #[test]
    fn garbage_bytes_do_not_decode() {
        assert!(decode_sprite(b"not an image").is_err());
    }
}
