//! Podforge CLI: trigger a pipeline run and write its outputs to disk.

use std::path::PathBuf;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::EnvFilter,
};

use {
    podforge_config::AppConfig,
    podforge_gemini::GeminiError,
    podforge_pipeline::{ContentSource, PipelineError, PipelineResult, PodcastGenerator},
};

/// Default user prompt for the dialogue model.
const DEFAULT_PROMPT: &str =
    "Turn the provided material into a natural, engaging podcast conversation \
     with clear speaker roles, keeping the tone informative and accessible for \
     a general audience.";

/// Default system instruction. Fixes the script format the parser expects.
const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
Your task is to transform the provided input into an engaging, informative \
podcast dialogue between two hosts. The input may be messy or unstructured; \
extract the key topics, main points, and interesting facts worth discussing, \
and ignore formatting noise.

Guidelines:
- Keep the tone conversational and accessible; explain any necessary jargon \
in plain terms.
- Use analogies, storytelling, and the occasional natural filler word so the \
exchange sounds like a real conversation.
- Revisit the key takeaways organically toward the end without an explicit \
recap.
- Make the discussion as detailed as the material supports while staying on \
topic.

Format every line of your response exactly as:
male-1: ...
female-1: ...
male-1: ...

Start directly with the dialogue. Do not include music cues, sound effects, \
bracketed stage directions, or anything outside the speaker-tagged lines.";

const AUDIO_FILENAME: &str = "podcast.mp3";
const TRANSCRIPT_FILENAME: &str = "podcast_transcript.txt";

#[derive(Parser)]
#[command(
    name = "podforge",
    about = "Podforge — turn documents, web pages, and notes into a two-voice podcast"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Prompt for the dialogue model (replaces the built-in default).
    #[arg(long, global = true)]
    prompt: Option<String>,

    /// File whose contents replace the built-in system instruction.
    #[arg(long, global = true)]
    system_file: Option<PathBuf>,

    /// Directory for the audio and transcript outputs.
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a podcast from a local PDF document.
    Pdf { path: PathBuf },
    /// Generate a podcast from a web page.
    Url { url: String },
    /// Generate a podcast about a company.
    Company { name: String },
    /// Generate a podcast from a plain-text file.
    Text { path: PathBuf },
}

impl Commands {
    fn into_source(self) -> anyhow::Result<ContentSource> {
        Ok(match self {
            Self::Pdf { path } => ContentSource::Pdf(path),
            Self::Url { url } => ContentSource::Url(url),
            Self::Company { name } => ContentSource::CompanyName(name),
            Self::Text { path } => {
                let body = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                ContentSource::RawText(body)
            },
        })
    }
}

fn init_telemetry(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// User-facing message for a failed run, distinguishing failure kinds the
/// user can act on differently.
fn describe_failure(err: &PipelineError) -> String {
    match err {
        PipelineError::MissingSpeechCredential => {
            "ELEVENLABS_API_KEY is not set; configure the speech provider credential".into()
        },
        PipelineError::Generation(GeminiError::MissingApiKey) => {
            "GEMINI_API_KEY is not set; configure the generative model credential".into()
        },
        PipelineError::Generation(GeminiError::Unauthorized { .. }) => {
            "the generative model rejected the API key; check GEMINI_API_KEY".into()
        },
        PipelineError::Generation(GeminiError::RateLimited { .. }) => {
            "the generative model is rate limiting requests; wait a little and retry".into()
        },
        PipelineError::InputNotFound(path) => {
            format!("input file does not exist: {}", path.display())
        },
        PipelineError::ContentExtraction { url } => format!(
            "could not extract readable content from {url}; try a different page or paste \
             the text directly"
        ),
        PipelineError::NoDialogue => {
            "the model response contained no recognizable dialogue; try re-running or \
             adjusting the prompt"
                .into()
        },
        PipelineError::SynthesisFailed => {
            "speech synthesis failed for every turn; check the transcript and retry".into()
        },
        other => other.to_string(),
    }
}

fn print_summary(result: &PipelineResult, output_dir: &std::path::Path) {
    let duration = result.duration_estimate().as_secs();
    println!(
        "Generated {} of {} turns ({} KiB, ~{}m{:02}s)",
        result.processed_items,
        result.total_items,
        result.file_size() / 1024,
        duration / 60,
        duration % 60,
    );
    if !result.is_complete() {
        println!("Some turns failed; see the [ERROR] markers in the transcript.");
    }
    println!("Audio:      {}", output_dir.join(AUDIO_FILENAME).display());
    println!(
        "Transcript: {}",
        output_dir.join(TRANSCRIPT_FILENAME).display()
    );
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let generator = PodcastGenerator::from_config(&config);

    let prompt = cli.prompt.unwrap_or_else(|| DEFAULT_PROMPT.into());
    let system_instruction = match &cli.system_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => DEFAULT_SYSTEM_INSTRUCTION.into(),
    };

    let source = cli.command.into_source()?;
    info!(source = source.kind(), "starting pipeline run");

    let result = generator
        .run(&prompt, &system_instruction, &source)
        .await
        .map_err(|err| anyhow::anyhow!(describe_failure(&err)))?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    result.write_audio(&cli.output_dir.join(AUDIO_FILENAME))?;
    result.write_transcript(&cli.output_dir.join(TRANSCRIPT_FILENAME))?;

    print_summary(&result, &cli.output_dir);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
