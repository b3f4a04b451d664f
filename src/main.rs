use anyhow::{bail, Context, Result};
use bvh_anim_io::{
    load_bvh_from_file, save_bvh_to_file, set_channel_mode, split_motion_part, ChannelMode,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bvh_anim_io")]
#[command(about = "Inspect and rewrite .bvh motion capture files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the joint hierarchy and motion header
    Info {
        /// Input .bvh file
        input: PathBuf,
    },

    /// Parse a file and write it back, optionally keeping only position or rotation channels
    Convert {
        /// Input .bvh file
        input: PathBuf,

        /// Output .bvh file (default: <input>.out.bvh)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep only these channels (every joint must have 6)
        #[arg(short, long)]
        mode: Option<Half>,

        /// Leave the root joint's 6 channels untouched
        #[arg(long)]
        root_has_both: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Half {
    Position,
    Rotation,
}

impl From<Half> for ChannelMode {
    fn from(half: Half) -> Self {
        match half {
            Half::Position => ChannelMode::Position,
            Half::Rotation => ChannelMode::Rotation,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            let bvh = load_bvh_from_file(&input)
                .with_context(|| format!("Failed to load {:?}", input))?;
            tracing::info!(
                "{:?}: {} frames, frame time {}s ({} fps), {} channels",
                input,
                bvh.num_frames,
                bvh.frame_time,
                bvh.fps(),
                bvh.num_channels()
            );
            for joint in bvh.root.node_list() {
                tracing::info!(
                    "  [{}] '{}' column {}{}: {}",
                    joint.index,
                    joint.name,
                    joint.frame_offset,
                    if joint.has_end_site() { " (end site)" } else { "" },
                    joint.channels.join(" ")
                );
            }
        }

        Commands::Convert {
            input,
            output,
            mode,
            root_has_both,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("out.bvh"));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let mut bvh = load_bvh_from_file(&input)
                .with_context(|| format!("Failed to load {:?}", input))?;

            if let Some(half) = mode {
                if let Some(joint) = bvh
                    .root
                    .node_list()
                    .into_iter()
                    .find(|joint| joint.channels.len() != 6)
                {
                    bail!(
                        "Joint '{}' has {} channels, keeping only one half needs 6 on every joint",
                        joint.name,
                        joint.channels.len()
                    );
                }
                let (position, rotation) = split_motion_part(&bvh.motion, root_has_both)?;
                set_channel_mode(&mut bvh.root, half.into(), root_has_both);
                bvh.motion = match half {
                    Half::Position => position,
                    Half::Rotation => rotation,
                };
                bvh.root.recompute_frame_offsets();
            }

            save_bvh_to_file(&bvh, &output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
