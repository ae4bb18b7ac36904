//! Raster file on disk through to generated meshes.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use orbis_geodesy::{BoundingBox, SquareAnchor, calculate_uv_bounds};
use orbis_terrain::{
    BaseSectionGenerator, ErrorKind, GenerationTask, GlobeGenerator, LocalProductCache,
    PlanarGenerator, ProductRequest, RasterInput, RescaleFrame, SectionGenerator, TaskError,
    TaskState, TerrainGenerator, TerrainJob, TerrainMeshMetadata, TiffRasterAccess, WorkerPool,
};
use tiff::encoder::{TiffEncoder, colortype};

fn write_f32_tiff(path: &Path, width: u32, height: u32, samples: &[f32]) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(width, height, samples)
        .unwrap();
}

fn write_u16_tiff(path: &Path, width: u32, height: u32, samples: &[u16]) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    encoder
        .write_image::<colortype::Gray16>(width, height, samples)
        .unwrap();
}

fn terrain_task(job: TerrainJob, cache_root: &Path) -> GenerationTask {
    GenerationTask::terrain(
        job,
        Arc::new(TiffRasterAccess),
        Arc::new(LocalProductCache::new(cache_root)),
    )
}

#[test]
fn constant_globe_from_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("constant.tif");
    write_f32_tiff(&path, 4, 4, &[10.0; 16]);

    let job = TerrainJob::new(
        TerrainGenerator::Globe(GlobeGenerator),
        TerrainMeshMetadata::new(1.0, 0.5, 0, 0, -1),
        RasterInput::Path(path),
    );
    let mut task = terrain_task(job, dir.path());
    let meshes = task.execute_in_current_thread().unwrap();

    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].vertex_count(), 20);
    for v in &meshes[0].vertices {
        assert!((v.length() - 6.0).abs() < 1e-4);
    }
    assert_eq!(task.state(), TaskState::Completed);
    assert_eq!(task.progress(), 1.0);
}

#[test]
fn globe_lods_on_pool() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.tif");
    let samples: Vec<u16> = (0..32 * 16).map(|i| (i * 97 % 65536) as u16).collect();
    write_u16_tiff(&path, 32, 16, &samples);

    let metadata = TerrainMeshMetadata::new(100.0, 2.0, 2, 0, 3);
    let job = TerrainJob::new(
        TerrainGenerator::Globe(GlobeGenerator),
        metadata,
        RasterInput::Path(path),
    );
    let pool = WorkerPool::new(2);
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut task = terrain_task(job, dir.path());
    task.execute(&pool, move |meshes| {
        let _ = tx.send(meshes);
    })
    .unwrap();

    let meshes = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(meshes.len(), metadata.total_lod_levels());
    assert_eq!(meshes[0].vertex_count(), 33 * 16);
    assert_eq!(meshes[1].vertex_count(), 17 * 8);
    assert_eq!(meshes[2].vertex_count(), 9 * 4);
    assert_eq!(meshes[3].vertex_count(), 5 * 2);
    // 16-bit samples are normalized, so heights stay within radius + 2.
    for mesh in &meshes {
        mesh.validate().unwrap();
        for v in &mesh.vertices {
            let d = v.length();
            assert!((100.0 - 1e-3..=102.0 + 1e-3).contains(&d), "distance {d}");
        }
    }
}

#[test]
fn section_from_cached_product() {
    let dir = tempfile::tempdir().unwrap();
    let bbox = BoundingBox::new(10.0, 20.0, 20.0, 25.0);
    let atlas = bbox.expand_to_square(SquareAnchor::Center).unwrap();
    let uv_bounds = calculate_uv_bounds(&atlas, &bbox);

    let request = ProductRequest::new("dem", bbox, 9, 5, "tif");
    let cache = LocalProductCache::new(dir.path());
    write_f32_tiff(&cache.path_for(&request), 9, 5, &[0.0; 45]);

    let metadata = TerrainMeshMetadata::new(50.0, 1.0, 1, 0, -1);
    let job = TerrainJob::new(
        TerrainGenerator::Section(SectionGenerator::new(bbox, uv_bounds)),
        metadata,
        RasterInput::Product(request),
    );
    let meshes = terrain_task(job, dir.path())
        .execute_in_current_thread()
        .unwrap();

    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].vertex_count(), 45);
    for uv in &meshes[0].uvs {
        assert!(uv.x >= uv_bounds.u1 as f32 - 1e-6 && uv.x <= uv_bounds.u2 as f32 + 1e-6);
        assert!(uv.y >= uv_bounds.v1 as f32 - 1e-6 && uv.y <= uv_bounds.v2 as f32 + 1e-6);
    }

    // The placeholder has the same shape as the flat section.
    let base = BaseSectionGenerator::new(bbox, uv_bounds, 9, 5);
    let placeholder = terrain_task(
        TerrainJob::new(TerrainGenerator::BaseSection(base), metadata, RasterInput::None),
        dir.path(),
    )
    .execute_in_current_thread()
    .unwrap();
    assert_eq!(placeholder[0].indices, meshes[0].indices);
    assert_eq!(placeholder[0].uvs, meshes[0].uvs);
}

#[test]
fn missing_product_is_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let request = ProductRequest::new("dem", BoundingBox::globe(), 64, 32, "tif");
    let job = TerrainJob::new(
        TerrainGenerator::Globe(GlobeGenerator),
        TerrainMeshMetadata::default(),
        RasterInput::Product(request),
    );
    match terrain_task(job, dir.path()).execute_in_current_thread() {
        Err(TaskError::Generation(err)) => {
            assert_eq!(err.kind(), ErrorKind::FileNotFound);
            assert!(err.is_retryable());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn empty_path_is_not_specified() {
    let dir = tempfile::tempdir().unwrap();
    let job = TerrainJob::new(
        TerrainGenerator::Planar(PlanarGenerator::new(1.0)),
        TerrainMeshMetadata::default(),
        RasterInput::Path(PathBuf::new()),
    );
    match terrain_task(job, dir.path()).execute_in_current_thread() {
        Err(TaskError::Generation(err)) => assert_eq!(err.kind(), ErrorKind::FileNotSpecified),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn rescale_matches_regeneration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bumps.tif");
    let samples: Vec<f32> = (0..64).map(|i| (i % 5) as f32).collect();
    write_f32_tiff(&path, 8, 8, &samples);

    let reference_meta = TerrainMeshMetadata::new(10.0, 1.0, 1, 0, -1);
    let target_meta = reference_meta.with_height_scale(4.0);
    let generate = |metadata| {
        terrain_task(
            TerrainJob::new(
                TerrainGenerator::Globe(GlobeGenerator),
                metadata,
                RasterInput::Path(path.clone()),
            ),
            dir.path(),
        )
        .execute_in_current_thread()
        .unwrap()
    };
    let reference = generate(reference_meta);
    let expected = generate(target_meta);

    let rescaled = GenerationTask::rescale(reference, target_meta, 1.0, RescaleFrame::Globe)
        .execute_in_current_thread()
        .unwrap();
    for (a, b) in rescaled.iter().zip(&expected) {
        assert_eq!(a.indices, b.indices);
        for (x, y) in a.vertices.iter().zip(&b.vertices) {
            assert!((*x - *y).length() < 1e-3);
        }
    }
}
