use std::sync::Arc;

use sprite2d_core::{AtlasManifest, IVec2, IntRect, TextureAtlas, TextureRegistry};
use sprite2d_text::{project_text, BitmapFont, FontDescriptor, FontText, LayoutOptions};

const MANIFEST: &str = r#"{
    "textures": [
        {
            "name": "sheet",
            "images": [
                { "n": "fonts/pixel_0", "x": 100, "y": 50, "w": 32, "h": 16, "r": 1 },
                { "n": "ui/panel", "x": 0, "y": 0, "w": 64, "h": 64 }
            ]
        }
    ]
}"#;

const FONT: &str = r#"{
    "info": { "face": "Pixel", "size": 12 },
    "common": { "lineHeight": 14, "base": 11 },
    "pages": ["pixel_0.png"],
    "chars": [
        { "id": 65, "x": 0, "y": 0, "width": 8, "height": 12, "xoffset": 0, "yoffset": 0, "xadvance": 9 },
        { "id": 66, "x": 8, "y": 0, "width": 8, "height": 12, "xoffset": 0, "yoffset": 0, "xadvance": 9 },
        { "id": 32, "x": 0, "y": 0, "width": 0, "height": 0, "xoffset": 0, "yoffset": 0, "xadvance": 5 }
    ],
    "kernings": [ { "first": 65, "second": 66, "amount": -1 } ]
}"#;

fn load_font() -> BitmapFont {
    let mut textures = TextureRegistry::new();
    let sheet = textures.register(256, 256);

    let manifest: AtlasManifest = serde_json::from_str(MANIFEST).unwrap();
    let atlas = TextureAtlas::from_manifest(&manifest, |name| (name == "sheet").then_some(sheet))
        .unwrap();

    let descriptor: FontDescriptor = serde_json::from_str(FONT).unwrap();
    BitmapFont::from_atlas(&descriptor, &atlas, "fonts").unwrap()
}

#[test]
fn glyph_cells_follow_rotated_atlas_page() {
    let font = load_font();

    // Logical column runs down the physical page for a rotated frame
    let a = font.metric('A').unwrap();
    assert!(a.frame.rotated);
    assert_eq!(a.frame.source, IntRect::new(104, 50, 12, 8));
    assert_eq!(a.frame.logical_size, IVec2::new(8, 12));

    let b = font.metric('B').unwrap();
    assert_eq!(b.frame.source, IntRect::new(104, 58, 12, 8));
}

#[test]
fn layout_against_atlas_font() {
    let font = load_font();
    let mut glyphs = Vec::new();
    let extent = project_text(&font, "AB A", &LayoutOptions::default(), &mut glyphs).unwrap();

    let xs: Vec<i32> = glyphs.iter().map(|g| g.destination.x).collect();
    assert_eq!(xs, vec![0, 8, 17, 22]);
    assert_eq!(extent, IVec2::new(31, 11));
}

#[test]
fn font_texts_share_one_font() {
    let font = Arc::new(load_font());
    let mut title = FontText::new(font.clone(), "AB", LayoutOptions::default()).unwrap();
    let body = FontText::new(
        font.clone(),
        "A B A B",
        LayoutOptions {
            max_width: 24,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(Arc::strong_count(&font), 3);
    assert_eq!(title.extent(), IVec2::new(17, 11));

    let lines: Vec<i32> = body
        .glyphs()
        .iter()
        .filter(|g| g.ch != ' ')
        .map(|g| g.destination.y)
        .collect();
    assert_eq!(lines, vec![0, 0, 14, 14]);

    title.set_kerning(false).unwrap();
    assert_eq!(title.extent(), IVec2::new(18, 11));
}
