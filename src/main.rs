//! Banana - command-line host for the Nano Banana nodes.

mod cli;

use std::path::Path;
use std::process;

use clap::Parser;

use banana_nodes::config::{self, Config, API_KEY_ENV};
use banana_nodes::context::{RecordingSession, ServiceContext};
use banana_nodes::error::BananaError;
use banana_nodes::logging;
use banana_nodes::model::parse_model;
use banana_nodes::nodes::{
    registry, ImageToImage, ImageToImageInputs, TextToImage, TextToImageInputs,
    MAX_ADDITIONAL_IMAGES,
};
use banana_nodes::output::{load_image, resolve_output_path, save_image};
use banana_nodes::params::{validate_aspect_ratio, validate_image_size};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), BananaError> {
    let (args, images) = match cli.command {
        Command::Nodes => return print_nodes(),
        Command::TextToImage(args) => (args, Vec::new()),
        Command::ImageToImage(args) => (args.generate, args.images),
    };

    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(BananaError::Config)?;

    // Resolve and validate node inputs before touching the network
    let prompt = args.resolve_prompt()?;
    let model_name = args.model.as_deref().unwrap_or(&config.defaults.model);
    let model = parse_model(model_name).map_err(BananaError::InvalidArgument)?;
    let ratio_name = args.aspect_ratio.as_deref().unwrap_or(&config.defaults.aspect_ratio);
    let aspect_ratio = validate_aspect_ratio(ratio_name).map_err(BananaError::InvalidArgument)?;
    let size_name = args.image_size.as_deref().unwrap_or(&config.defaults.image_size);
    let image_size = validate_image_size(size_name).map_err(BananaError::InvalidArgument)?;
    if images.len() > MAX_ADDITIONAL_IMAGES + 1 {
        return Err(BananaError::InvalidArgument(format!(
            "At most {} reference images are supported, got {}",
            MAX_ADDITIONAL_IMAGES + 1,
            images.len()
        )));
    }

    if cli.verbose {
        eprintln!("Config: {}", config_path.display());
        eprintln!("Endpoint: {}", config.api.endpoint);
    }

    // Pick live / recording / replaying
    let replay_path = std::env::var("BANANA_REPLAY").ok();
    let is_recording = std::env::var("BANANA_REC").is_ok_and(|v| v == "true" || v == "1");

    let api_key = match config.api_key(args.api_key.as_deref()) {
        Some(key) => key,
        None if replay_path.is_some() => String::new(),
        None => return Err(BananaError::MissingApiKey { env_var: API_KEY_ENV.into() }),
    };

    let references = images.iter().map(|p| load_image(p)).collect::<Result<Vec<_>, _>>()?;

    let (ctx, recording_session) = build_context(&config, replay_path.as_deref(), is_recording)?;

    // Generate
    let image = if let Some((primary, rest)) = split_primary(references) {
        let inputs = ImageToImageInputs {
            prompt: prompt.clone(),
            api_key,
            model,
            aspect_ratio,
            image_size,
            seed: args.seed,
            ..ImageToImageInputs::new(primary)
        }
        .with_additional(rest)?;
        ImageToImage.generate_image(&ctx, inputs).await
    } else {
        let inputs = TextToImageInputs {
            prompt: prompt.clone(),
            api_key,
            model,
            aspect_ratio,
            image_size,
            seed: args.seed,
        };
        TextToImage.generate_image(&ctx, inputs).await
    };
    drop(ctx);

    // Finish recording whether or not the call succeeded
    if let Some(session) = recording_session {
        finish_recording(session);
    }

    let image = image?;
    let output_path = resolve_output_path(args.output.as_deref(), &prompt);
    save_image(&image, &output_path)?;
    eprintln!("Saved: {}", output_path.display());

    Ok(())
}

fn build_context(
    config: &Config,
    replay_path: Option<&str>,
    is_recording: bool,
) -> Result<(ServiceContext, Option<RecordingSession>), BananaError> {
    if let Some(cassette_path) = replay_path {
        tracing::debug!(cassette = cassette_path, "replaying");
        Ok((ServiceContext::replaying(Path::new(cassette_path))?, None))
    } else if is_recording {
        tracing::debug!("recording enabled");
        let (ctx, session) = ServiceContext::recording(config);
        Ok((ctx, Some(session)))
    } else {
        Ok((ServiceContext::live(config), None))
    }
}

fn finish_recording(session: RecordingSession) {
    match session.finish() {
        Ok(path) => eprintln!("Cassette saved: {}", path.display()),
        Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
    }
}

fn split_primary<T>(mut items: Vec<T>) -> Option<(T, Vec<T>)> {
    if items.is_empty() {
        None
    } else {
        let first = items.remove(0);
        Some((first, items))
    }
}

fn print_nodes() -> Result<(), BananaError> {
    let json = serde_json::to_string_pretty(&registry()).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}
