//! CLI for GenStudio - Gemini image studio.

use clap::{Args, Parser, Subcommand, ValueEnum};
use genstudio::controller::{FeatureError, ResultSlot};
use genstudio::{
    AnalyzeMsg, AspectRatio, ChatMsg, EditMsg, GeminiClient, GenerateMsg, ImageReference,
    ImageSize, Intensity, Mode, Msg, SelectedFile, Studio, UpscaleMsg,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genstudio")]
#[command(about = "Upscale, chat, analyze, generate and edit images with Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// API key (defaults to GEMINI_API_KEY / GOOGLE_API_KEY / API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Unblur and upscale a photo to 4K
    Upscale(UpscaleArgs),

    /// Chat with the deep-thinking model (reads lines from stdin)
    Chat,

    /// Describe an image
    Analyze(AnalyzeArgs),

    /// Generate an image from a text prompt
    Generate(GenerateArgs),

    /// Edit an image with an instruction
    Edit(EditArgs),

    /// Check that the API key and chat model work
    Check,
}

#[derive(Args)]
struct UpscaleArgs {
    /// Image to enhance
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Enhancement intensity in percent (0-100)
    #[arg(long, default_value_t = 75, value_parser = clap::value_parser!(u32).range(0..=100))]
    intensity: u32,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Image to describe
    input: PathBuf,

    /// What to look for
    #[arg(short, long)]
    prompt: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Output resolution
    #[arg(long, value_enum, default_value = "1k")]
    size: ImageSizeArg,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit
    input: PathBuf,

    /// What to change
    instruction: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "2:3")]
    Portrait2x3,
    #[value(name = "3:2")]
    Landscape3x2,
    #[value(name = "3:4")]
    Portrait3x4,
    #[value(name = "4:3")]
    Landscape4x3,
    #[value(name = "9:16")]
    Portrait9x16,
    #[value(name = "16:9")]
    Landscape16x9,
    #[value(name = "21:9")]
    Cinematic,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Portrait2x3 => AspectRatio::Portrait2x3,
            AspectRatioArg::Landscape3x2 => AspectRatio::Landscape3x2,
            AspectRatioArg::Portrait3x4 => AspectRatio::Portrait3x4,
            AspectRatioArg::Landscape4x3 => AspectRatio::Landscape4x3,
            AspectRatioArg::Portrait9x16 => AspectRatio::Portrait9x16,
            AspectRatioArg::Landscape16x9 => AspectRatio::Landscape16x9,
            AspectRatioArg::Cinematic => AspectRatio::Cinematic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImageSizeArg {
    #[value(name = "1k")]
    Size1K,
    #[value(name = "2k")]
    Size2K,
    #[value(name = "4k")]
    Size4K,
}

impl From<ImageSizeArg> for ImageSize {
    fn from(arg: ImageSizeArg) -> Self {
        match arg {
            ImageSizeArg::Size1K => ImageSize::Size1K,
            ImageSizeArg::Size2K => ImageSize::Size2K,
            ImageSizeArg::Size4K => ImageSize::Size4K,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = GeminiClient::builder();
    if let Some(key) = cli.api_key.clone() {
        builder = builder.api_key(key);
    }
    let client = builder.build()?;

    match cli.command {
        Commands::Upscale(args) => upscale(&client, args, cli.json).await?,
        Commands::Chat => chat(&client, cli.json).await?,
        Commands::Analyze(args) => analyze(&client, args, cli.json).await?,
        Commands::Generate(args) => generate(&client, args, cli.json).await?,
        Commands::Edit(args) => edit(&client, args, cli.json).await?,
        Commands::Check => check(&client, cli.json).await?,
    }

    Ok(())
}

fn fail(feature: &str, err: &FeatureError, json_output: bool) -> anyhow::Error {
    if json_output {
        let result = serde_json::json!({
            "type": feature,
            "success": false,
            "error": err.message,
            "detail": err.detail,
        });
        println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    }
    anyhow::anyhow!("{} ({})", err.message, err.detail)
}

fn save_image(
    feature: &str,
    slot: &ResultSlot<ImageReference>,
    output: &Path,
    started: Instant,
    json_output: bool,
) -> anyhow::Result<()> {
    if let Some(err) = slot.error() {
        return Err(fail(feature, err, json_output));
    }
    let Some(image) = slot.result() else {
        anyhow::bail!("{feature} produced no result");
    };

    let bytes = image.decode()?;
    std::fs::write(output, &bytes)?;
    let duration_ms = started.elapsed().as_millis() as u64;

    if json_output {
        let result = serde_json::json!({
            "type": feature,
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": bytes.len(),
            "duration_ms": duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved {} image: {} ({} bytes)",
            feature,
            output.display(),
            bytes.len()
        );
        println!("Duration: {}ms", duration_ms);
    }
    Ok(())
}

async fn upscale(client: &GeminiClient, args: UpscaleArgs, json_output: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut studio = Studio::new();
    let file = SelectedFile::from_path(&args.input)?;

    studio.update(Msg::Upscale(UpscaleMsg::SelectFile(file)));
    studio.update(Msg::Upscale(UpscaleMsg::SetIntensity(Intensity::new(
        args.intensity,
    ))));
    studio.dispatch(client, Msg::Upscale(UpscaleMsg::Run)).await;

    save_image("upscale", studio.upscale().slot(), &args.output, started, json_output)
}

async fn generate(
    client: &GeminiClient,
    args: GenerateArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut studio = Studio::new();

    studio.update(Msg::SelectMode(Mode::Generate));
    studio.update(Msg::Generate(GenerateMsg::SetPrompt(args.prompt)));
    studio.update(Msg::Generate(GenerateMsg::SetAspectRatio(
        args.aspect_ratio.into(),
    )));
    studio.update(Msg::Generate(GenerateMsg::SetImageSize(args.size.into())));
    studio.dispatch(client, Msg::Generate(GenerateMsg::Run)).await;

    save_image("generate", studio.generate().slot(), &args.output, started, json_output)
}

async fn edit(client: &GeminiClient, args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut studio = Studio::new();
    let file = SelectedFile::from_path(&args.input)?;

    studio.update(Msg::SelectMode(Mode::Edit));
    studio.update(Msg::Edit(EditMsg::SelectFile(file)));
    studio.update(Msg::Edit(EditMsg::SetInstruction(args.instruction)));
    studio.dispatch(client, Msg::Edit(EditMsg::Run)).await;

    save_image("edit", studio.edit().slot(), &args.output, started, json_output)
}

async fn analyze(
    client: &GeminiClient,
    args: AnalyzeArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut studio = Studio::new();
    let file = SelectedFile::from_path(&args.input)?;

    studio.update(Msg::SelectMode(Mode::Analyze));
    studio.update(Msg::Analyze(AnalyzeMsg::SelectFile(file)));
    if let Some(prompt) = args.prompt {
        studio.update(Msg::Analyze(AnalyzeMsg::SetPrompt(prompt)));
    }
    studio.dispatch(client, Msg::Analyze(AnalyzeMsg::Run)).await;

    let slot = studio.analyze().slot();
    if let Some(err) = slot.error() {
        return Err(fail("analyze", err, json_output));
    }
    let text = slot.result().cloned().unwrap_or_default();

    if json_output {
        let result = serde_json::json!({
            "type": "analyze",
            "success": true,
            "prompt": studio.analyze().prompt(),
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

async fn chat(client: &GeminiClient, json_output: bool) -> anyhow::Result<()> {
    let mut studio = Studio::new();
    studio.dispatch(client, Msg::SelectMode(Mode::Chat)).await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !json_output {
        stdout
            .write_all(b"Ask something complex. /exit or Ctrl-D to quit.\n> ")
            .await?;
        stdout.flush().await?;
    }

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/exit" {
            break;
        }
        if line.trim().is_empty() {
            if !json_output {
                stdout.write_all(b"> ").await?;
                stdout.flush().await?;
            }
            continue;
        }

        studio.update(Msg::Chat(ChatMsg::SetInput(line)));
        studio.dispatch(client, Msg::Chat(ChatMsg::Send)).await;

        let reply = studio
            .result(Mode::Chat)
            .and_then(|r| r.as_text())
            .unwrap_or_default()
            .to_string();

        if json_output {
            let result = serde_json::json!({
                "role": "model",
                "text": reply,
                "error": studio.chat().last_error().map(|e| e.detail.clone()),
            });
            println!("{}", serde_json::to_string(&result)?);
        } else {
            stdout
                .write_all(format!("\n{reply}\n\n> ").as_bytes())
                .await?;
            stdout.flush().await?;
        }
    }

    studio.update(Msg::Chat(ChatMsg::Close));
    Ok(())
}

async fn check(client: &GeminiClient, json_output: bool) -> anyhow::Result<()> {
    let outcome = client.health_check().await;

    if json_output {
        let result = serde_json::json!({
            "success": outcome.is_ok(),
            "chat_model": client.models().chat,
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match &outcome {
            Ok(()) => println!("✓ {} reachable", client.models().chat),
            Err(e) => println!("✗ {}: {}", client.models().chat, e),
        }
    }

    outcome.map_err(Into::into)
}
