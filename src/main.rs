use anyhow::{Context, Result};
use clap::Parser;
use interview_client::{
    ChannelSink, Config, HttpTurnService, InputMode, MicrophoneCapture, Profile, RodioPlayer,
    Severity, SpeakerRole, TurnController, UiEvent, UserIntent,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "interview-client", about = "Voice/text technical interview client")]
struct Args {
    /// Config file (extension inferred), overridable via INTERVIEW__* env vars
    #[arg(long, default_value = "config/interview-client")]
    config: String,

    /// Override the backend base URL from the config
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config).context("failed to load configuration")?;
    if let Some(url) = args.backend_url {
        cfg.backend.base_url = url;
    }

    info!("{} starting", cfg.service.name);
    info!("backend: {}", cfg.backend.base_url);

    let service = Arc::new(
        HttpTurnService::from_config(&cfg.backend).context("failed to build backend client")?,
    );
    let capture = Box::new(MicrophoneCapture::new());
    let player = Arc::new(RodioPlayer::new());
    let (sink, mut events) = ChannelSink::new();

    let controller = TurnController::new(service, capture, player, Arc::new(sink));

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            render_event(event);
        }
    });

    let default_profile: Profile = cfg
        .interview
        .default_profile
        .parse()
        .unwrap_or_default();
    let default_stack = cfg.interview.default_stack.clone();

    println!("Commands: start [profile] [stack], rec, code <text>, eval, mode voice|code, reset, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        let intent = match command {
            "start" => {
                let mut parts = rest.split_whitespace();
                let profile = parts
                    .next()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(default_profile);
                let rest: Vec<&str> = parts.collect();
                let stack = if rest.is_empty() {
                    default_stack.clone()
                } else {
                    rest.join(" ")
                };
                UserIntent::StartInterview { profile, stack }
            }
            "rec" => UserIntent::ToggleRecord,
            "code" => UserIntent::SubmitCode(rest.to_string()),
            "eval" => UserIntent::RequestEvaluation,
            "reset" => UserIntent::ResetSession,
            "mode" => match rest {
                "voice" => UserIntent::SwitchInputMode(InputMode::Voice),
                "code" => UserIntent::SwitchInputMode(InputMode::Code),
                _ => {
                    println!("usage: mode voice|code");
                    continue;
                }
            },
            "quit" | "exit" => break,
            "help" => {
                println!("start [profile] [stack] | rec | code <text> | eval | mode voice|code | reset | quit");
                continue;
            }
            other => {
                println!("unknown command: {} (try 'help')", other);
                continue;
            }
        };
        controller.dispatch(intent).await;
    }

    info!("shutting down");
    Ok(())
}

fn render_event(event: UiEvent) {
    match event {
        UiEvent::TurnRendered(turn) => {
            let who = match turn.speaker {
                SpeakerRole::User => "you",
                SpeakerRole::Assistant => "interviewer",
            };
            if let Some(text) = &turn.spoken_text {
                println!("[{}] {}", who, text);
            }
            if let Some(code) = &turn.code_block {
                println!("[{}]\n{}", who, code);
            }
        }
        UiEvent::StatusChanged { status, .. } => {
            println!("-- {} --", status.label());
        }
        UiEvent::Notify { message, severity } => match severity {
            Severity::Info => println!("({})", message),
            _ => println!("({}: {})", severity.label(), message),
        },
        UiEvent::EvaluationReady { report } => {
            println!("=== evaluation ===\n{}\n==================", report);
        }
        UiEvent::TranscriptCleared => {
            println!("-- transcript cleared --");
        }
    }
}
