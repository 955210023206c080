//! voxtext - prints a MagicaVoxel .vox file as text.
//!
//! Shows the models, layers and scene tree; with `--slices`, materializes
//! the first shape under the root transform and renders its z-slices as
//! ASCII.

use std::env;
use std::process::ExitCode;

use glam::IVec3;
use magicavox::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut slices = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-s" | "--slices" => slices = true,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => {
                if path.replace(arg).is_some() {
                    print_help();
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    let Some(path) = path else {
        print_help();
        return ExitCode::FAILURE;
    };

    match run(&path, slices) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("voxtext: {path}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    eprintln!("Usage: voxtext [-s|--slices] <file.vox>");
}

fn run(path: &str, slices: bool) -> Result<()> {
    let doc = parse_file(path)?;

    println!("models: {}", doc.models.len());
    for (i, m) in doc.models.iter().enumerate() {
        println!(
            "  [{i}] {}x{}x{}, {} voxels",
            m.size.x,
            m.size.y,
            m.size.z,
            m.voxels.len()
        );
    }

    println!("layers: {}", doc.scene.layers.len());
    for l in &doc.scene.layers {
        let hidden = if l.hidden { " (hidden)" } else { "" };
        println!("  [{}] {:?}{hidden}", l.index, l.name);
    }

    println!("scene:");
    print_transform(&doc.scene.root, 1);

    if slices {
        let root = &doc.scene.root;
        let shape = root
            .child
            .as_deref()
            .and_then(SceneNode::first_shape)
            .filter(|s| !s.models.is_empty());
        match shape {
            Some(s) => print_slices(&doc.models[s.models[0]], root.transform)?,
            None => println!("no shape to render"),
        }
    }
    Ok(())
}

fn print_node(node: &SceneNode, depth: usize) {
    let pad = "  ".repeat(depth);
    match node {
        SceneNode::Transform(t) => print_transform(t, depth),
        SceneNode::Group(g) => {
            println!("{pad}group {:?}, {} children", g.name, g.children.len());
            for c in &g.children {
                print_node(c, depth + 1);
            }
        }
        SceneNode::Shape(s) => {
            println!("{pad}shape {:?}, models {:?}", s.name, s.models);
        }
    }
}

fn print_transform(t: &TransformNode, depth: usize) {
    let pad = "  ".repeat(depth);
    println!(
        "{pad}transform {:?}, r={:#04x} t={}",
        t.name,
        t.transform.rotation.code(),
        t.transform.translation
    );
    if let Some(child) = t.child.as_deref() {
        print_node(child, depth + 1);
    }
}

fn print_slices(model: &Model, tf: Transform) -> Result<()> {
    let world = materialize(tf.rotation, tf.translation, model)?;
    let (min, max) = world.cuboid();
    for z in min.z..=max.z {
        println!("z = {z}");
        // Print rows with y increasing upward.
        for y in (min.y..=max.y).rev() {
            let mut row = String::with_capacity((max.x - min.x + 1) as usize);
            for x in min.x..=max.x {
                row.push(match world.get(IVec3::new(x, y, z)) {
                    Some(0) | None => '.',
                    Some(m) => char::from_digit(u32::from(m) % 16, 16).unwrap_or('#'),
                });
            }
            println!("  {row}");
        }
    }
    Ok(())
}
