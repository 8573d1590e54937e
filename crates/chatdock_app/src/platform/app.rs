use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chatdock_core::VoiceControl;
use chatdock_engine::{
    BackendSettings, DiscardPlayer, HtmlPage, ReqwestBackend, ScriptedCaptureDevice,
    WidgetHandle, WidgetRuntime,
};
use chatdock_logging::{dock_info, dock_warn};
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use super::config::{self, AppConfig, DEFAULT_CONFIG_FILE};
use super::logging;
use super::surface::TerminalSurface;

/// 20 ms of silence per fragment stands in for a microphone.
const SILENCE_FRAGMENT: [u8; 320] = [0; 320];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Gesture {
    Submit(String),
    ToggleVoice(VoiceControl),
    Quit,
}

fn parse_gesture(line: &str) -> Gesture {
    match line.trim() {
        "/voice" => Gesture::ToggleVoice(VoiceControl::Dock),
        "/mic" => Gesture::ToggleVoice(VoiceControl::Composer),
        "/quit" | "/exit" => Gesture::Quit,
        _ => Gesture::Submit(line.to_string()),
    }
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = config::load(&config_path)?;
    config::apply_env(&mut config, |name| std::env::var(name).ok());

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log, level);
    dock_info!("Loaded configuration from {}", config_path.display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(run_widget(config))
}

async fn run_widget(config: AppConfig) -> anyhow::Result<()> {
    let location = Url::parse(&config.page_url)
        .with_context(|| format!("page_url {:?} is not a URL", config.page_url))?;
    let html = match &config.page_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading page file {}", path.display()))?,
        None => String::new(),
    };
    let page = Arc::new(HtmlPage::new(location, html));

    let backend = Arc::new(ReqwestBackend::new(BackendSettings::from_config(
        &config.widget,
    ))?);
    let microphone = ScriptedCaptureDevice::new(
        vec![SILENCE_FRAGMENT.to_vec()],
        Duration::from_millis(20),
    )
    .repeating();

    let widget = WidgetRuntime::new(
        config.widget,
        backend,
        page,
        Arc::new(TerminalSurface::stdout()),
    )
    .with_voice(Arc::new(microphone), Arc::new(DiscardPlayer));

    println!("Type a message and press enter. /voice or /mic toggles recording, /quit exits.");
    tokio::spawn(read_gestures(widget.handle()));
    widget.run().await;
    Ok(())
}

async fn read_gestures(handle: WidgetHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_gesture(&line) {
                Gesture::Submit(text) => handle.submit(text),
                Gesture::ToggleVoice(control) => handle.toggle_voice(control),
                Gesture::Quit => break,
            },
            Ok(None) => break,
            Err(err) => {
                dock_warn!("Reading stdin failed: {}", err);
                break;
            }
        }
    }
    handle.shutdown();
}

#[cfg(test)]
mod tests {
    use chatdock_core::VoiceControl;

    use super::{parse_gesture, Gesture};

    #[test]
    fn slash_commands_map_to_gestures() {
        assert_eq!(
            parse_gesture("/voice"),
            Gesture::ToggleVoice(VoiceControl::Dock)
        );
        assert_eq!(
            parse_gesture(" /mic "),
            Gesture::ToggleVoice(VoiceControl::Composer)
        );
        assert_eq!(parse_gesture("/quit"), Gesture::Quit);
    }

    #[test]
    fn anything_else_is_submitted_verbatim() {
        assert_eq!(
            parse_gesture("  What are your hours? "),
            Gesture::Submit("  What are your hours? ".to_string())
        );
        assert_eq!(parse_gesture(""), Gesture::Submit(String::new()));
    }
}
