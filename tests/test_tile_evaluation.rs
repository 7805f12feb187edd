use ndarray::{Array2, Array3};
use snowzone::{
    classify_snow_presence_tile, screen_persistent_snow_tile, CodeStack, PersistentSnowSession,
    SnowCoverSession, SnowError, TerrainTile, WetDrySession, ZoneKey,
};

fn uniform_terrain(rows: usize, cols: usize, aspect: f32, elevation: f32) -> TerrainTile {
    TerrainTile::new(
        Array2::from_elem((rows, cols), aspect),
        Array2::from_elem((rows, cols), elevation),
        Array2::from_elem((rows, cols), 1),
    )
    .expect("Failed to build terrain tile")
}

#[test]
fn test_wet_dry_tile_run() {
    let _ = env_logger::builder().is_test(true).try_init();

    let rows = 4;
    let cols = 4;
    let terrain = uniform_terrain(rows, cols, 135.0, 3100.0);

    // Scene 0 is all dry snow, scene 1 carries wet snow in the first row
    let stack = Array3::from_shape_fn((2, rows, cols), |(scene, row, _)| {
        if scene == 0 {
            115
        } else if row == 0 {
            110
        } else {
            255
        }
    });

    let mut session = WetDrySession::new().expect("Failed to create session");
    let output = session
        .evaluate_tile(&terrain, &stack)
        .expect("Tile evaluation failed");

    for ((row, _), &value) in output.indexed_iter() {
        if row == 0 {
            assert_eq!(value, 1);
        } else {
            assert_eq!(value, 2);
        }
    }

    let record = session
        .statistics()
        .get(&ZoneKey::new(135, 3500))
        .expect("Zone missing");
    assert_eq!(record.count, (rows * cols) as u64);

    let user_data = session
        .export_metadata(&[])
        .user_data()
        .expect("Export failed");
    assert_eq!(user_data["135_3500"]["wet"], cols as u64);
    assert_eq!(user_data["135_3500"]["dry"], ((rows - 1) * cols) as u64);
}

#[test]
fn test_tile_and_pixel_paths_agree() {
    let rows = 8;
    let cols = 8;

    let aspect = Array2::from_shape_fn((rows, cols), |(r, c)| ((r * 47 + c * 29) % 360) as f32);
    let elevation =
        Array2::from_shape_fn((rows, cols), |(r, c)| 1000.0 + ((r * 311 + c * 97) % 3500) as f32);
    let mask = Array2::from_shape_fn((rows, cols), |(r, c)| ((r * c) % 5 != 0) as u8);
    let terrain = TerrainTile::new(aspect.clone(), elevation.clone(), mask.clone())
        .expect("Failed to build terrain tile");

    let stack = Array3::from_shape_fn((3, rows, cols), |(s, r, c)| match (s + r + c) % 5 {
        0 => 100,
        1 => 40,
        2 => 205,
        _ => 255,
    });

    let mut tile_session = SnowCoverSession::new().expect("Failed to create session");
    let tile_output = tile_session
        .evaluate_tile(&terrain, &stack)
        .expect("Tile evaluation failed");

    let mut pixel_session = SnowCoverSession::new().expect("Failed to create session");
    for row in 0..rows {
        for col in 0..cols {
            let scenes: Vec<u8> = (0..3).map(|s| stack[[s, row, col]]).collect();
            let value = pixel_session
                .evaluate_pixel(
                    snowzone::TerrainSample::new(
                        aspect[[row, col]],
                        elevation[[row, col]],
                        mask[[row, col]],
                    ),
                    &snowzone::SampleGroup::Stack(scenes),
                )
                .expect("Pixel evaluation failed");
            assert_eq!(value, tile_output[[row, col]]);
        }
    }

    assert_eq!(tile_session.statistics(), pixel_session.statistics());
}

#[test]
fn test_persistent_snow_tile_run() {
    let terrain = uniform_terrain(2, 2, 0.0, 1550.0);
    let psa = Array2::from_shape_vec((2, 2), vec![1u8, 0, 1, 255]).expect("Bad layer shape");

    let mut session = PersistentSnowSession::new().expect("Failed to create session");
    let output = session
        .evaluate_tile(&terrain, &psa)
        .expect("Tile evaluation failed");

    assert_eq!(output[[0, 0]], 1);
    assert_eq!(output[[0, 1]], 0);
    assert_eq!(output[[1, 0]], 1);
    assert_eq!(output[[1, 1]], 0);

    let record = session
        .statistics()
        .get(&ZoneKey::new(0, 1600))
        .expect("Zone missing");
    assert_eq!(record.count, 4);
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let terrain = uniform_terrain(4, 4, 90.0, 2000.0);
    let stack = CodeStack::zeros((2, 4, 5));

    let mut session = WetDrySession::new().expect("Failed to create session");
    let result = session.evaluate_tile(&terrain, &stack);
    assert!(matches!(result, Err(SnowError::ShapeMismatch { .. })));

    // A failed tile call must not have touched the statistics
    assert!(session.statistics().iter().all(|(_, r)| r.count == 0));
}

#[test]
fn test_snow_presence_tile_masks() {
    let gf = Array3::from_shape_vec((2, 2, 1), vec![100, 0, 50, 100]).expect("Bad stack shape");
    let masks = Array3::from_shape_vec((2, 2, 1), vec![0u8, 1, 1, 0]).expect("Bad mask shape");

    let (values, validity) = classify_snow_presence_tile(&gf, &masks).expect("Tile failed");

    // Pixel (0,0): full cover is masked out, partial cover is valid
    assert_eq!(values[[0, 0]], 0);
    assert_eq!(validity[[0, 0]], 1);

    // Pixel (1,0): only the masked scene had full cover
    assert_eq!(values[[1, 0]], 0);
    assert_eq!(validity[[1, 0]], 1);
}

#[test]
fn test_screen_persistent_snow_tile_forces_mask() {
    let psa = Array2::from_shape_vec((1, 3), vec![0u8, 1, 7]).expect("Bad layer shape");
    let masks = Array2::from_shape_vec((1, 3), vec![1u8, 1, 1]).expect("Bad mask shape");

    let (values, validity) = screen_persistent_snow_tile(&psa, &masks).expect("Tile failed");

    assert_eq!(values[[0, 0]], 0);
    assert_eq!(values[[0, 1]], 1);
    assert_eq!(values[[0, 2]], 7);
    assert_eq!(validity[[0, 0]], 1);
    assert_eq!(validity[[0, 1]], 1);
    assert_eq!(validity[[0, 2]], 0);
}
