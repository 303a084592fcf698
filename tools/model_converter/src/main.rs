//! Model converter
//!
//! Turns OBJ meshes (with their MTL libraries) into `.model` files and
//! prints the contents of existing ones.
//!
//! Usage:
//!   model_converter convert assets/models/car.obj
//!   model_converter convert car.obj -o out/car.model
//!   model_converter inspect assets/models/car.model

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};

use garage_renderer::assets::{convert, ModelFile};
use garage_renderer::foundation::logging;

fn main() -> Result<()> {
    let matches = Command::new("model_converter")
        .about("Converts OBJ meshes into the binary .model cache")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert an OBJ file")
                .arg(Arg::new("input").value_name("OBJ").required(true).help("Source OBJ file"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Destination (defaults to the input with a .model extension)"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the header, materials and objects of a .model file")
                .arg(Arg::new("file").value_name("MODEL").required(true)),
        )
        .get_matches();

    logging::init_with_level(if matches.get_flag("verbose") { "debug" } else { "info" });

    match matches.subcommand() {
        Some(("convert", args)) => run_convert(args),
        Some(("inspect", args)) => run_inspect(args),
        _ => unreachable!("clap enforces a subcommand"),
    }
}

fn run_convert(args: &ArgMatches) -> Result<()> {
    let input = PathBuf::from(args.get_one::<String>("input").context("missing input")?);
    let output = args
        .get_one::<String>("output")
        .map_or_else(|| input.with_extension("model"), PathBuf::from);

    let file = convert(&input, &output)
        .with_context(|| format!("converting {} to {}", input.display(), output.display()))?;

    println!("Converted {} -> {}", input.display(), output.display());
    print_summary(&file);
    Ok(())
}

fn run_inspect(args: &ArgMatches) -> Result<()> {
    let path = Path::new(args.get_one::<String>("file").context("missing file")?);
    let file = ModelFile::read_from_path(path).with_context(|| format!("reading {}", path.display()))?;

    println!("{}", path.display());
    println!("  flags: {:#x}", file.flags);
    print_summary(&file);

    for (i, material) in file.materials.iter().enumerate() {
        println!(
            "  material {}: diffuse [{:.3} {:.3} {:.3}], specular exponent {:.1}, alpha {:.2}",
            i,
            material.diffuse.x,
            material.diffuse.y,
            material.diffuse.z,
            material.specular_exponent,
            material.alpha
        );
    }
    for (i, object) in file.objects.iter().enumerate() {
        println!(
            "  object {}: material {}, {} triangles, bounds {:?} .. {:?}",
            i,
            object.material_index,
            object.indices.len() / 3,
            object.bounds.min.as_slice(),
            object.bounds.max.as_slice()
        );
    }
    Ok(())
}

fn print_summary(file: &ModelFile) {
    println!(
        "  {} vertices, {} materials, {} objects",
        file.vertices.len(),
        file.materials.len(),
        file.objects.len()
    );
    println!(
        "  bounds {:?} .. {:?}",
        file.bounds.min.as_slice(),
        file.bounds.max.as_slice()
    );
}
