use clap::Parser;
use karst_blocks::{BuildError, WorldConfig};
use karst_lighting::LightTable;
use log::{error, info};

/// Startup shell: builds the immutable world configuration the server
/// hands to its protocol and simulation layers, then reports on it.
#[derive(Parser)]
#[command(name = "karst", version, about = "block registry and model compiler")]
struct Args {
    /// Dump every state of one block type and exit.
    #[arg(long, value_name = "NAME")]
    describe: Option<String>,
    /// List registered tag groups.
    #[arg(long)]
    tags: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("startup failed: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), BuildError> {
    let (builder, state_bits) = karst_blocks::vanilla::build()?;
    let config = builder.finalize(state_bits)?;
    let light = LightTable::compute(&config.models);

    info!(
        "world ready: {} block types, {} states, {} properties, {} models, {} propagation masks",
        config.type_count(),
        config.state_count(),
        config.props.len(),
        config.models.len(),
        light.model_count() * light.model_count(),
    );

    if let Some(name) = &args.describe {
        describe_block(&config, name);
    }
    if args.tags {
        for (tag, members) in config.names.tags() {
            println!("{tag}: {} members", members.len());
        }
    }
    Ok(())
}

fn describe_block(config: &WorldConfig, name: &str) {
    let Some(type_id) = config.names.id(name) else {
        error!("unknown block `{name}`");
        return;
    };
    let ty = config.block_type(type_id);
    let count: usize = ty
        .schema()
        .iter()
        .map(|e| config.props.get(e.property).value_count())
        .product();
    println!("{name}: base state {}, {count} states", ty.base_state());
    for offset in 0..count {
        let state = ty.base_state() + offset as u16;
        let info = config.describe_state(state);
        let values: Vec<String> = info
            .entries()
            .iter()
            .map(|e| {
                let spec = config.props.get(e.property);
                format!("{}={}", spec.name(), spec.value(e.value_index).unwrap_or("?"))
            })
            .collect();
        println!(
            "  {state}: [{}] collision={} light_blocking={} reduction={} emitted={}",
            values.join(", "),
            config.collision_model(state),
            config.light_blocking_model(state),
            config.light_reduction(state),
            config.emitted_light(state),
        );
    }
}
