//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Nano Banana image generation nodes, driven from the command line.
#[derive(Parser, Debug)]
#[command(name = "banana", version, about)]
pub struct Cli {
    /// Node to run.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an image from a prompt.
    #[command(name = "text-to-image", visible_alias = "t2i")]
    TextToImage(GenerateArgs),

    /// Generate an image from a prompt and 1-6 reference images.
    #[command(name = "image-to-image", visible_alias = "i2i")]
    ImageToImage(ImageArgs),

    /// Print the node descriptors as JSON.
    Nodes,
}

/// Inputs shared by both nodes.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Model name or alias (default from config, else nano-banana-pro-svip).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Aspect ratio, e.g. 1:1, 16:9, 9:16.
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Image size: 1K, 2K, 4K. Only sent for the pro model.
    #[arg(short = 's', long)]
    pub image_size: Option<String>,

    /// Seed; -1 lets the server choose.
    #[arg(
        long,
        default_value_t = -1,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-1..=2_147_483_647)
    )]
    pub seed: i64,

    /// API key (overrides BANANA_API_KEY and the config file).
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Inputs of the image-to-image node.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Reference image; repeat for up to six, primary first.
    #[arg(short = 'i', long = "image", required = true)]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

impl GenerateArgs {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}
