//! Per-mesh summary of a finished run.

use orbis_mesh::MeshData;
use orbis_terrain::TerrainMeshMetadata;
use tracing::{info, warn};

/// What mesh `index` is used for: a render LOD, the physics mesh, or both
/// when the physics downsample coincides with a render LOD.
pub fn mesh_role(index: usize, metadata: &TerrainMeshMetadata) -> &'static str {
    let render = index <= metadata.lod_levels as usize;
    let physics = metadata.physics_lod_mesh_index() == Some(index);
    match (render, physics) {
        (true, true) => "lod+physics",
        (true, false) => "lod",
        (false, true) => "physics",
        (false, false) => "extra",
    }
}

/// Log each mesh and print one tab-separated line per mesh to stdout:
/// index, role, vertices, triangles.
pub fn report(meshes: &[MeshData], metadata: &TerrainMeshMetadata) {
    for (i, mesh) in meshes.iter().enumerate() {
        let role = mesh_role(i, metadata);
        match mesh.bounds() {
            Some((min, max)) => info!(
                "Mesh {i} ({role}): {} vertices, {} triangles, bounds {min} .. {max}",
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
            None => warn!("Mesh {i} ({role}) is empty"),
        }
        println!(
            "{i}\t{role}\t{}\t{}",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }
}
