use image::{Rgba, RgbaImage};
use itertools::Itertools;
use sprack::{packer::Rect, AtlasBuilder, AtlasConfig, AtlasError, SpriteId};

// ── helpers ───────────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(color))
}

fn atlas(size: u32, padding: u32) -> AtlasBuilder {
    AtlasBuilder::new(
        AtlasConfig::new()
            .with_canvas_size(size)
            .with_padding(padding),
    )
    .unwrap()
}

/// Pixel rect of a built sprite, recovered from its texture coordinates.
fn pixel_rect(atlas: &AtlasBuilder, id: SpriteId, size: u32) -> Rect {
    let tex = atlas.get_location(id).unwrap().texture.unwrap();
    let s = size as f32;
    Rect::new(
        (tex.s0 * s).round() as u32,
        (tex.t0 * s).round() as u32,
        ((tex.s1 - tex.s0) * s).round() as u32,
        ((tex.t1 - tex.t0) * s).round() as u32,
    )
}

// ── three sprites in a 128 sheet ──────────────────────────────────────────────

#[test]
fn three_sprites_fit_without_overlap() {
    init_logging();
    let mut atlas = atlas(128, 1);
    let sizes = [(30, 20), (10, 10), (64, 64)];
    let ids: Vec<_> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| atlas.register_image(solid(w, h, [i as u8 * 80, 0, 0, 255])).unwrap())
        .collect();

    atlas.get_surface().unwrap();

    for (&id, &(w, h)) in ids.iter().zip(&sizes) {
        let tex = atlas.get_location(id).unwrap().texture.unwrap();
        assert!((tex.s1 - tex.s0 - w as f32 / 128.0).abs() < 1e-6);
        assert!((tex.t1 - tex.t0 - h as f32 / 128.0).abs() < 1e-6);
        for v in [tex.s0, tex.t0, tex.s1, tex.t1] {
            assert!((0.0..=1.0).contains(&v), "{v} outside [0, 1]");
        }
    }

    let padded = ids
        .iter()
        .map(|&id| pixel_rect(&atlas, id, 128).inflate(1))
        .collect_vec();
    for (a, b) in padded.iter().tuple_combinations() {
        assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
    }
}

#[test]
fn sheet_pixels_come_from_the_sources() {
    let mut atlas = atlas(128, 1);
    let red = atlas.register_image(solid(30, 20, [255, 0, 0, 255])).unwrap();
    let blue = atlas.register_image(solid(10, 10, [0, 0, 255, 255])).unwrap();
    atlas.get_surface().unwrap();
    let red_rect = pixel_rect(&atlas, red, 128);
    let blue_rect = pixel_rect(&atlas, blue, 128);

    let sheet = atlas.get_surface().unwrap();
    assert_eq!(*sheet.get_pixel(red_rect.x, red_rect.y), Rgba([255, 0, 0, 255]));
    assert_eq!(
        *sheet.get_pixel(red_rect.right() - 1, red_rect.bottom() - 1),
        Rgba([255, 0, 0, 255])
    );
    assert_eq!(*sheet.get_pixel(blue_rect.x, blue_rect.y), Rgba([0, 0, 255, 255]));
    // the padding ring stays empty
    assert_eq!(*sheet.get_pixel(red_rect.right(), red_rect.y), Rgba([0, 0, 0, 0]));
}

// ── caching and invalidation ──────────────────────────────────────────────────

#[test]
fn repeated_get_surface_is_identical() {
    let mut atlas = atlas(256, 2);
    for i in 0..10 {
        atlas.register_image(solid(5 + i * 3, 7 + i, [i as u8, 1, 2, 255])).unwrap();
    }
    let first = atlas.get_surface().unwrap().clone();
    let first_locations = (0..10).map(|i| atlas.get_location(SpriteId(i)).unwrap()).collect_vec();

    let second = atlas.get_surface().unwrap().clone();
    let second_locations = (0..10).map(|i| atlas.get_location(SpriteId(i)).unwrap()).collect_vec();

    assert_eq!(first, second);
    assert_eq!(first_locations, second_locations);
}

#[test]
fn registering_after_a_build_triggers_a_full_rebuild() {
    let mut atlas = atlas(64, 1);
    atlas.register_image(solid(20, 20, [9, 9, 9, 255])).unwrap();
    let before = atlas.get_surface().unwrap().clone();

    let late = atlas.register_image(solid(8, 8, [200, 100, 50, 255])).unwrap();
    assert!(atlas.is_dirty());
    let after = atlas.get_surface().unwrap().clone();

    assert_ne!(before, after);
    let rect = pixel_rect(&atlas, late, 64);
    assert_eq!(*after.get_pixel(rect.x, rect.y), Rgba([200, 100, 50, 255]));
}

#[test]
fn resize_keeps_ids_but_moves_coordinates() {
    let mut atlas = atlas(64, 1);
    let id = atlas.register_image(solid(16, 16, [1, 1, 1, 255])).unwrap();
    atlas.get_surface().unwrap();
    let small = atlas.get_location(id).unwrap().texture.unwrap();

    atlas.set_canvas_size(256).unwrap();
    assert!(atlas.is_dirty());
    atlas.get_surface().unwrap();
    let big = atlas.get_location(id).unwrap().texture.unwrap();

    assert_ne!(small, big);
    assert!(((big.s1 - big.s0) * 256.0 - 16.0).abs() < 1e-4);
}

// ── failure ───────────────────────────────────────────────────────────────────

#[test]
fn overflowing_sources_are_reported_and_nothing_is_built() {
    init_logging();
    let mut atlas = atlas(128, 1);
    for _ in 0..40 {
        atlas.register_image(solid(64, 64, [0, 0, 0, 255])).unwrap();
    }
    assert!(matches!(
        atlas.get_surface(),
        Err(AtlasError::PackingOverflow { .. })
    ));
    assert!(atlas.is_dirty());
    for i in 0..40 {
        assert_eq!(atlas.get_location(SpriteId(i)).unwrap().texture, None);
    }
    // still failing on retry, no partial sheet sneaks out
    assert!(atlas.get_surface().is_err());
}

#[test]
fn out_of_range_id_is_unknown() {
    let atlas = atlas(64, 1);
    assert!(matches!(
        atlas.get_location(SpriteId(0)),
        Err(AtlasError::UnknownId(0))
    ));
}

// ── file loading ──────────────────────────────────────────────────────────────

#[test]
fn load_image_decodes_and_registers() {
    let dir = std::env::temp_dir().join(format!("sprack_atlas_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("blob.png");
    solid(12, 9, [0, 128, 0, 255]).save(&path).unwrap();

    let mut atlas = atlas(64, 1);
    let id = atlas.load_image(&path).unwrap();
    atlas.get_surface().unwrap();
    assert_eq!(pixel_rect(&atlas, id, 64).w, 12);
    assert_eq!(pixel_rect(&atlas, id, 64).h, 9);
}

#[test]
fn load_image_reports_missing_files() {
    let mut atlas = atlas(64, 1);
    let err = atlas.load_image("/no/such/sprite.png").unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/sprite.png"));
    assert!(atlas.is_empty());
}

#[test]
fn mode_conflict_survives_anyhow() {
    let dir = std::env::temp_dir().join(format!("sprack_conflict_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let font_path = dir.join("fake.ttf");
    std::fs::write(&font_path, b"not a font").unwrap();

    let mut atlas = atlas(64, 1);
    atlas.register_image(solid(2, 2, [0, 0, 0, 255])).unwrap();
    let err = atlas.load_font(&font_path, 16.0).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AtlasError>(),
        Some(AtlasError::ModeConflict { .. })
    ));
}
