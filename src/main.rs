use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

use audio_translator::config::Config;
use audio_translator::history::HistoryStore;
use audio_translator::languages;
use audio_translator::pipeline::RequestPipeline;
use audio_translator::synthesis::SpeechSynthesizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("audio_translator=info,warn")
        .init();

    let matches = Command::new("Audio/Video Translator")
        .version("0.1.0")
        .about("Transcribe audio/video files and translate the transcript")
        .subcommand_required(true)
        .subcommand(
            Command::new("process")
                .about("Transcribe and translate an uploaded file")
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .help("Audio or video file (wav/flac/mp3/m4a/mp4/avi/mov)")
                        .required(true)
                )
                .arg(
                    Arg::new("language")
                        .short('l')
                        .long("language")
                        .value_name("NAME")
                        .help("Target language display name")
                        .default_value("French")
                )
        )
        .subcommand(
            Command::new("speak")
                .about("Synthesize speech from text")
                .arg(
                    Arg::new("text")
                        .value_name("TEXT")
                        .help("Text to synthesize")
                        .required(true)
                )
                .arg(
                    Arg::new("language")
                        .short('l')
                        .long("language")
                        .value_name("NAME")
                        .help("Language of the text")
                        .default_value("English")
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the audio clip")
                )
                .arg(
                    Arg::new("play")
                        .long("play")
                        .help("Play the clip after synthesis")
                        .action(clap::ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("history")
                .about("Inspect and manage past results")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List all history records"))
                .subcommand(
                    Command::new("show")
                        .about("Print one record in full")
                        .arg(Arg::new("index").value_name("INDEX").required(true))
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete one record")
                        .arg(Arg::new("index").value_name("INDEX").required(true))
                )
                .subcommand(Command::new("clear").about("Delete all records"))
                .subcommand(
                    Command::new("export")
                        .about("Write a record's transcript and translation as text files")
                        .arg(Arg::new("index").value_name("INDEX").required(true))
                )
        )
        .subcommand(Command::new("languages").about("List supported target languages"))
        .get_matches();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::from_env()
    });
    config.validate()?;

    match matches.subcommand() {
        Some(("process", sub)) => run_process(&config, sub).await,
        Some(("speak", sub)) => run_speak(&config, sub).await,
        Some(("history", sub)) => run_history(&config, sub).await,
        Some(("languages", _)) => {
            for name in languages::names() {
                println!("{}", name);
            }
            Ok(())
        }
        _ => unreachable!(),
    }
}

async fn run_process(config: &Config, matches: &ArgMatches) -> Result<()> {
    let file = PathBuf::from(matches.get_one::<String>("file").unwrap());
    let language = matches.get_one::<String>("language").unwrap();

    if !file.exists() {
        error!("Input file does not exist: {}", file.display());
        return Err(anyhow!("input file not found"));
    }

    let mut history = HistoryStore::load(config.history.file.clone()).await;
    let pipeline = RequestPipeline::new(config.clone())?;

    let outcome = pipeline.process(&file, language, &mut history).await?;

    info!(
        "Processed {} in {:.2}s ({} chunks, {} failed)",
        outcome.filename,
        outcome.processing_time.as_secs_f64(),
        outcome.chunk_count,
        outcome.failed_chunks
    );

    println!("Transcription:\n{}\n", outcome.transcript);
    println!("(saved to {})", outcome.transcript_path.display());

    if outcome.translation_skipped {
        println!("\nTranslation skipped: target language is {}.", outcome.language);
    } else if let Some(ref translated) = outcome.translation {
        println!("\nTranslation ({}):\n{}", outcome.language, translated);
        if let Some(ref path) = outcome.translation_path {
            println!("(saved to {})", path.display());
        }
    } else if let Some(ref message) = outcome.translation_error {
        println!("\nAn error occurred during translation: {}", message);
    }

    Ok(())
}

async fn run_speak(config: &Config, matches: &ArgMatches) -> Result<()> {
    let text = matches.get_one::<String>("text").unwrap();
    let language = matches.get_one::<String>("language").unwrap();
    let play = matches.get_flag("play");

    let code = languages::code_for(language)
        .ok_or_else(|| anyhow!("unknown language: {}", language))?;

    let synthesizer = SpeechSynthesizer::new(config.synthesis.clone())?;

    // Clip goes to the requested path, or to a temp file kept alive
    // until the command finishes.
    let (clip_path, _scratch) = match matches.get_one::<String>("output") {
        Some(path) => (PathBuf::from(path), None),
        None => {
            let dir = tempfile::tempdir()?;
            (dir.path().join(format!("speech_{}.wav", code)), Some(dir))
        }
    };

    synthesizer.synthesize(text, code, &clip_path).await?;
    println!("Audio written to {}", clip_path.display());

    if play {
        synthesizer.play(&clip_path).await?;
    }

    Ok(())
}

async fn run_history(config: &Config, matches: &ArgMatches) -> Result<()> {
    let mut history = HistoryStore::load(config.history.file.clone()).await;

    match matches.subcommand() {
        Some(("list", _)) => {
            if history.is_empty() {
                println!("No history yet.");
            }
            for (i, record) in history.records().iter().enumerate() {
                println!("{}: {} -> {}", i, record.filename, record.language);
            }
            Ok(())
        }
        Some(("show", sub)) => {
            let index = parse_index(sub)?;
            let record = history
                .get(index)
                .ok_or_else(|| anyhow!("no history record at index {}", index))?;
            println!("{} -> {}\n", record.filename, record.language);
            println!("Transcription:\n{}\n", record.transcription);
            println!("Translation ({}):\n{}", record.language, record.translation);
            Ok(())
        }
        Some(("delete", sub)) => {
            let index = parse_index(sub)?;
            if history.delete(index).await? {
                println!("Deleted record {}.", index);
            } else {
                println!("No record at index {}; nothing deleted.", index);
            }
            Ok(())
        }
        Some(("clear", _)) => {
            history.clear().await?;
            println!("History cleared.");
            Ok(())
        }
        Some(("export", sub)) => {
            let index = parse_index(sub)?;
            let record = history
                .get(index)
                .ok_or_else(|| anyhow!("no history record at index {}", index))?;

            tokio::fs::create_dir_all(&config.output.dir).await?;

            let transcript_path = config
                .output
                .dir
                .join(format!("transcription_{}.txt", index + 1));
            tokio::fs::write(&transcript_path, &record.transcription).await?;

            let translation_path = config
                .output
                .dir
                .join(format!("translation_{}_{}.txt", record.language, index + 1));
            tokio::fs::write(&translation_path, &record.translation).await?;

            println!("Exported {} and {}", transcript_path.display(), translation_path.display());
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn parse_index(matches: &ArgMatches) -> Result<usize> {
    matches
        .get_one::<String>("index")
        .unwrap()
        .parse()
        .map_err(|_| anyhow!("index must be a non-negative integer"))
}
