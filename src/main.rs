use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::EnvFilter;

use orion::assistant::BREAK_REMINDER;
use orion::providers::{OpenAiChat, SiteDirectory, WeatherApi, Wikipedia, http_client};
use orion::voice::{
    AudioPlayback, DegradingInput, Delivery, ElevenLabsVoice, EndpointConfig, Endpointer,
    KeyboardListener, ListenSettings, LocalVoice, Microphone, MicrophoneListener, Muted,
    SpeechInput, SpeechOutput, SpeechToText, Speaker, rms,
};
use orion::{Assistant, CommandRouter, Config, Conversation};

/// Orion - Voice command assistant
#[derive(Parser)]
#[command(name = "orion", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type commands instead of speaking them
    #[arg(long, env = "ORION_KEYBOARD")]
    keyboard: bool,

    /// Print replies without speaking them
    #[arg(long, env = "ORION_MUTE")]
    mute: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Route a single command and speak the reply
    Ask {
        /// The command, as it would be spoken
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,orion=info",
        1 => "info,orion=debug",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so the transcript on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&text),
            Command::Ask { utterance } => ask(&utterance.join(" "), cli.mute),
        };
    }

    tracing::info!(keyboard = cli.keyboard, mute = cli.mute, "starting orion");

    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let client = http_client()?;
    let router = build_router(&config, &client);
    let output = build_output(&config, &client, cli.mute);

    // Typed input waits as long as a spoken listen so jobs still run while idle
    let keyboard = || KeyboardListener::new("You", config.voice.listen_timeout);

    let input: Box<dyn SpeechInput> = if cli.keyboard {
        Box::new(keyboard())
    } else {
        let stt = SpeechToText::new(
            client.clone(),
            share(config.api_keys.openai.as_ref()),
            &config.voice.stt_model,
        );
        let settings = ListenSettings {
            endpoint: EndpointConfig {
                listen_timeout: config.voice.listen_timeout,
                phrase_limit: config.voice.phrase_limit,
                ..EndpointConfig::default()
            },
            ..ListenSettings::default()
        };
        Box::new(DegradingInput::new(
            MicrophoneListener::new(stt, settings),
            keyboard(),
        ))
    };

    let mut assistant = Assistant::new(
        config.name.clone(),
        router,
        Conversation::new(config.history_limit),
        input,
        output,
    )
    .with_loop_interval(config.loop_interval);

    if let Some(period) = config.reminder_interval {
        assistant
            .scheduler_mut()
            .every(period)
            .named("break-reminder")
            .run(|output| output.speak(BREAK_REMINDER));
    }

    tracing::info!(name = %config.name, "orion ready");
    assistant.run();

    Ok(())
}

/// Second owner of a key, for clients that share it
fn share(key: Option<&SecretString>) -> Option<SecretString> {
    key.map(|k| SecretString::from(k.expose_secret().to_owned()))
}

fn build_router(config: &Config, client: &Client) -> CommandRouter {
    let mut sites = SiteDirectory::new();
    sites.extend(config.sites.clone());

    CommandRouter::new(
        Box::new(Wikipedia::new(client.clone())),
        Box::new(WeatherApi::new(
            client.clone(),
            share(config.api_keys.weather.as_ref()),
        )),
        Box::new(sites),
        Box::new(OpenAiChat::new(
            client.clone(),
            share(config.api_keys.openai.as_ref()),
            &config.chat_model,
        )),
    )
}

fn build_output(config: &Config, client: &Client, mute: bool) -> Box<dyn SpeechOutput> {
    if mute {
        return Box::new(Muted);
    }

    Box::new(Speaker::new(elevenlabs(config, client), LocalVoice::detect()))
}

fn elevenlabs(config: &Config, client: &Client) -> ElevenLabsVoice {
    ElevenLabsVoice::new(
        client.clone(),
        share(config.api_keys.elevenlabs.as_ref()),
        config.voice.elevenlabs_voice_id.clone(),
        &config.voice.tts_model,
    )
}

/// Route one command without the listen loop
fn ask(utterance: &str, mute: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = http_client()?;

    let router = build_router(&config, &client);
    let output = build_output(&config, &client, mute);

    let mut assistant = Assistant::new(
        config.name.clone(),
        router,
        Conversation::new(config.history_limit),
        KeyboardListener::default(),
        output,
    );
    assistant.handle(utterance);

    Ok(())
}

/// Show microphone levels against the speech threshold
fn test_mic(duration: u64) -> anyhow::Result<()> {
    let mut microphone = Microphone::open()?;
    microphone.start()?;
    let sample_rate = microphone.sample_rate();

    println!("Measuring background noise, stay quiet...");
    std::thread::sleep(ListenSettings::default().calibration);

    let mut endpointer = Endpointer::new(sample_rate, EndpointConfig::default());
    endpointer.calibrate(&microphone.take_samples());
    let threshold = endpointer.threshold();

    println!("Microphone at {sample_rate} Hz, speech threshold {threshold:.4}");
    println!("Now say something.\n");

    let mut speaking = 0;
    for second in 1..=duration {
        std::thread::sleep(Duration::from_secs(1));

        let level = rms(&microphone.take_samples());
        let label = if level > threshold {
            speaking += 1;
            "speech"
        } else {
            "quiet"
        };
        println!("{second:>3}s  level {level:.4}  {label}");
    }

    microphone.stop();

    if speaking == 0 {
        println!("\nNo speech detected. Orion falls back to typed input without a working mic.");
    } else {
        println!("\nSpeech detected in {speaking} of {duration} seconds.");
    }

    Ok(())
}

/// Play a short chime through the default output device
fn test_speaker() -> anyhow::Result<()> {
    const RATE: u32 = 24_000;
    const NOTES: [f32; 3] = [523.25, 659.25, 783.99];

    let playback = AudioPlayback::new()?;
    let samples: Vec<f32> = NOTES.iter().flat_map(|&note| tone(note, RATE, 300)).collect();

    println!("Playing a three-note chime...");
    playback.play(&samples, RATE)?;
    println!("Done. If nothing was audible, replies can still be read with --mute.");

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn tone(frequency: f32, sample_rate: u32, millis: u32) -> impl Iterator<Item = f32> {
    let count = sample_rate * millis / 1000;
    (0..count).map(move |i| {
        let t = i as f32 / sample_rate as f32;
        0.3 * (std::f32::consts::TAU * frequency * t).sin()
    })
}

/// Test TTS output, falling back to the local voice
fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let client = http_client()?;

    let mut speaker = Speaker::new(elevenlabs(&config, &client), LocalVoice::detect());
    if let Some(engine) = speaker.fallback().engine() {
        println!("Local fallback engine: {}", engine.display());
    }

    println!("Synthesizing speech...");
    match speaker.deliver(text) {
        Delivery::Primary => println!("\nSpoken with ElevenLabs, TTS is working!"),
        Delivery::Fallback => {
            println!("\nElevenLabs failed, spoken with the local voice instead");
            println!("Check ELEVENLABS_API_KEY and ELEVENLABS_VOICE_ID (run with -v for details)");
        }
        Delivery::Lost => anyhow::bail!("neither ElevenLabs nor the local voice could speak"),
    }

    Ok(())
}
