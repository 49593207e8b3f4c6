use pod::{Model, NodeId, batch::read_glob};

// Prints a summary of every POD file matching a glob pattern:
//   cargo run --example dump_pod --features batch -- "assets/**/*.pod"
//
// Set RUST_LOG=pod=trace to see every tag as it is read.

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let pattern = std::env::args().nth(1).unwrap_or_else(|| "*.pod".to_owned());

    for (path, model) in read_glob(&pattern)? {
        println!("{}", path.display());
        dump(&model);
    }

    Ok(())
}

fn dump(model: &Model) {
    println!(
        "  {} nodes ({} mesh nodes), {} meshes, {} materials, {} textures, {} lights, {} cameras",
        model.nodes().len(),
        model.num_mesh_nodes(),
        model.meshes().len(),
        model.materials().len(),
        model.textures().len(),
        model.lights().len(),
        model.cameras().len()
    );

    for animation in model.animations() {
        println!(
            "  animation \"{}\": {} keyframe channels, {} frames, {:.2}s",
            animation.name(),
            animation.key_frames().len(),
            animation.num_frames(),
            animation.duration()
        );
    }

    for (idx, node) in model.nodes().iter().enumerate() {
        let translation = model.world_matrix(NodeId(idx)).w_axis;

        println!(
            "  node {idx} \"{}\" parent {:?} at ({:.2}, {:.2}, {:.2}){}",
            node.name(),
            node.parent().map(|parent| parent.0),
            translation.x,
            translation.y,
            translation.z,
            if node.has_animation() { " animated" } else { "" }
        );
    }

    for (idx, mesh) in model.meshes().iter().enumerate() {
        let semantics = mesh
            .vertex_attributes()
            .iter()
            .map(|attribute| attribute.semantic())
            .collect::<Vec<_>>();

        println!(
            "  mesh {idx}: {} vertices, {} indices ({:?}, {:?}) [{}]{}",
            mesh.num_vertices(),
            mesh.num_indices(),
            mesh.faces().index_type(),
            mesh.topology(),
            semantics.join(", "),
            if mesh.is_skinned() { " skinned" } else { "" }
        );
    }

    for material in model.materials() {
        println!(
            "  material \"{}\": {} semantics, textures {:?}",
            material.name(),
            material.semantics().len(),
            material.texture_indices()
        );
    }
}
