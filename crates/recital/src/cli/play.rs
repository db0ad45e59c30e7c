//! Interactive playback command.

use recital::{
    DurationManifest, LineCursor, NarrationHandle, NarrationSession, PlaybackCommand,
    PlaybackConfig, PlaybackMachine, PlaybackNotification, PlaybackPhase, RecitalResult,
    SceneCatalog, SceneTable, Script, SimulatedSpeech, SystemClock, Voice,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  p            play / pause
  n            next line
  b            previous line
  j S L        jump to line L of section S (zero-based)
  s S          jump to section S
  t SECS       seek to SECS seconds
  r            restart from the top
  r RATE       set playback rate
  v VOICE      switch voice
  ?            print the player state
  h            this help
  q            quit";

/// Everything `recital play` needs.
#[derive(Debug)]
pub struct PlayOptions {
    pub config: PlaybackConfig,
    pub script: PathBuf,
    pub scenes: Option<PathBuf>,
    pub scene_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub fail_voices: Vec<String>,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(PlaybackCommand),
    Status,
    Help,
    Quit,
}

/// Parses one line typed at the player prompt.
pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Input::Help);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("p", []) => PlaybackCommand::TogglePlay,
        ("n", []) => PlaybackCommand::NextLine,
        ("b", []) => PlaybackCommand::PrevLine,
        ("r", []) => PlaybackCommand::StartNarration,
        ("j", [section, line]) => PlaybackCommand::JumpToLine {
            section: parse_number(section)?,
            line: parse_number(line)?,
        },
        ("s", [section]) => PlaybackCommand::JumpToSection(parse_number(section)?),
        ("t", [secs]) => {
            let secs: f64 = secs.parse().map_err(|_| format!("not a time: {}", secs))?;
            let time = Duration::try_from_secs_f64(secs)
                .map_err(|_| format!("not a time: {}", secs))?;
            PlaybackCommand::Seek(time)
        }
        ("r", [rate]) => {
            PlaybackCommand::SetPlaybackRate(rate.parse().map_err(|_| format!("not a rate: {}", rate))?)
        }
        ("v", [voice]) => PlaybackCommand::SetVoice(Voice::new(*voice)),
        ("?", []) => return Ok(Input::Status),
        ("h", []) => return Ok(Input::Help),
        ("q", []) => return Ok(Input::Quit),
        _ => return Err(format!("unknown command: {}", line.trim())),
    };
    Ok(Input::Command(command))
}

fn parse_number(word: &str) -> Result<usize, String> {
    word.parse().map_err(|_| format!("not an index: {}", word))
}

/// Plays a script until the user quits.
///
/// When standard input closes, playback continues to the end of the script.
#[tracing::instrument(skip_all, fields(script = %options.script.display()))]
pub async fn play(options: PlayOptions) -> RecitalResult<()> {
    let script = Script::from_file(&options.script)?;
    let table = options.scenes.as_ref().map(SceneTable::from_file).transpose()?;
    let catalog = options
        .scene_dir
        .as_ref()
        .map(SceneCatalog::load_dir)
        .transpose()?;
    let manifest = options
        .manifest
        .as_ref()
        .map(DurationManifest::from_file)
        .transpose()?;

    let (events, events_rx) = mpsc::unbounded_channel();
    let speech =
        SimulatedSpeech::new(events, &options.config).with_failing_voices(options.fail_voices);
    let mut machine =
        PlaybackMachine::new(speech, options.config, Arc::new(SystemClock::new()))?;
    if let Some(catalog) = catalog {
        machine = machine.with_catalog(catalog);
    }

    let (handle, session) = NarrationSession::spawn(machine, events_rx);
    let notifications = handle.subscribe();

    handle.load(script.clone(), table, manifest).await?;
    if let Some(voice) = options.voice {
        handle.send(PlaybackCommand::SetVoice(Voice::new(voice))).await?;
    }
    if let Some(rate) = options.rate {
        handle.send(PlaybackCommand::SetPlaybackRate(rate)).await?;
    }

    println!("▶ {}", script.title());
    println!("{}", HELP);
    handle.send(PlaybackCommand::StartNarration).await?;

    let input = BufReader::new(tokio::io::stdin());
    run_console(&handle, &script, notifications, input).await?;

    // The session may already have stopped on its own.
    let _ = handle.shutdown().await;
    if let Err(e) = session.await {
        warn!(error = %e, "Narration session ended abnormally");
    }
    Ok(())
}

/// Prints notifications and forwards typed commands until the user quits.
///
/// Once input closes, the console stays until narration has ended.
pub async fn run_console<R>(
    handle: &NarrationHandle,
    script: &Script,
    mut notifications: broadcast::Receiver<PlaybackNotification>,
    input: R,
) -> RecitalResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let mut shown = None;

    loop {
        tokio::select! {
            notification = notifications.recv() => match notification {
                Ok(PlaybackNotification::Ended) => {
                    println!("■ Narration finished");
                    if !input_open {
                        break;
                    }
                }
                Ok(PlaybackNotification::Exited) => break,
                Ok(notification) => {
                    if let Some(text) = describe(script, &notification, &mut shown) {
                        println!("{}", text);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped notifications"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => match parse_input(&line) {
                        Ok(Input::Command(command)) => handle.send(command).await?,
                        Ok(Input::Status) => {
                            let snapshot = handle.snapshot();
                            println!(
                                "{}",
                                serde_json::to_string_pretty(&snapshot).unwrap_or_default()
                            );
                        }
                        Ok(Input::Help) => println!("{}", HELP),
                        Ok(Input::Quit) => break,
                        Err(message) => println!("? {}", message),
                    },
                    Ok(None) => {
                        debug!("Input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Cannot read input");
                        input_open = false;
                    }
                }
                if !input_open && *handle.snapshot().phase() == PlaybackPhase::Ended {
                    break;
                }
            },
        }
    }
    Ok(())
}

// Text for a notification; a line already on screen is not repeated.
fn describe(
    script: &Script,
    notification: &PlaybackNotification,
    shown: &mut Option<LineCursor>,
) -> Option<String> {
    match notification {
        PlaybackNotification::LineChanged { cursor, .. } => {
            if *shown == Some(*cursor) {
                return None;
            }
            *shown = Some(*cursor);
            let line = script.line(*cursor)?;
            let scene = line.scene().as_deref().unwrap_or("-");
            Some(format!(
                "[{}.{}] ({}) {}",
                cursor.section,
                cursor.line,
                scene,
                line.text()
            ))
        }
        PlaybackNotification::Paused { .. } => Some("‖ paused".to_string()),
        PlaybackNotification::Resumed { .. } => Some("▶ playing".to_string()),
        PlaybackNotification::SectionCompleted { section } => {
            let section = script.section(*section)?;
            Some(format!("✓ section '{}' complete", section.id()))
        }
        PlaybackNotification::Cue { cue, .. } => Some(format!(
            "✦ {} {}",
            cue.action(),
            serde_json::Value::Object(cue.params().clone())
        )),
        PlaybackNotification::SpeechStarted { .. }
        | PlaybackNotification::Ended
        | PlaybackNotification::Exited => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recital::{Generation, LineBuilder, ScriptBuilder, SectionBuilder};
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn one_line_script() -> Script {
        let line = LineBuilder::default()
            .id("only-1")
            .text("hi")
            .scene("title")
            .build()
            .unwrap();
        let section = SectionBuilder::default()
            .id("only")
            .lines(vec![line])
            .build()
            .unwrap();
        ScriptBuilder::default()
            .id("one-line")
            .title("One line")
            .sections(vec![section])
            .build()
            .unwrap()
    }

    async fn start_console(
        script: Script,
    ) -> (NarrationHandle, tokio::io::DuplexStream, JoinHandle<RecitalResult<()>>) {
        let config = PlaybackConfig {
            chars_per_second: 10_000.0,
            min_line_secs: 0.0,
            tick_ms: 5,
            ..PlaybackConfig::default()
        };
        let (events, events_rx) = mpsc::unbounded_channel();
        let speech = SimulatedSpeech::new(events, &config);
        let machine =
            PlaybackMachine::new(speech, config, Arc::new(SystemClock::new())).unwrap();
        let (handle, _session) = NarrationSession::spawn(machine, events_rx);
        let notifications = handle.subscribe();
        handle.load(script.clone(), None, None).await.unwrap();

        let (writer, reader) = tokio::io::duplex(64);
        let console = tokio::spawn({
            let handle = handle.clone();
            async move { run_console(&handle, &script, notifications, BufReader::new(reader)).await }
        });
        (handle, writer, console)
    }

    #[tokio::test]
    async fn test_console_exits_when_input_closes_after_the_end() {
        let (handle, writer, console) = start_console(one_line_script()).await;
        handle.send(PlaybackCommand::StartNarration).await.unwrap();

        let mut snapshots = handle.watch();
        timeout(WAIT, snapshots.wait_for(|s| *s.phase() == PlaybackPhase::Ended))
            .await
            .expect("narration did not end")
            .unwrap();
        drop(writer);

        timeout(WAIT, console)
            .await
            .expect("console kept waiting after input closed")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_console_plays_to_the_end_after_input_closes() {
        let (handle, writer, console) = start_console(one_line_script()).await;
        drop(writer);
        handle.send(PlaybackCommand::StartNarration).await.unwrap();

        timeout(WAIT, console)
            .await
            .expect("console did not stop at the end")
            .unwrap()
            .unwrap();
        assert_eq!(*handle.snapshot().phase(), PlaybackPhase::Ended);
    }

    #[tokio::test]
    async fn test_console_quits_on_request() {
        use tokio::io::AsyncWriteExt;

        let (_handle, mut writer, console) = start_console(one_line_script()).await;
        writer.write_all(b"q\n").await.unwrap();

        timeout(WAIT, console).await.unwrap().unwrap().unwrap();
    }

    #[test]
    fn test_describe_skips_a_line_already_shown() {
        let script = one_line_script();
        let changed = |generation| PlaybackNotification::LineChanged {
            cursor: LineCursor::new(0, 0),
            generation,
        };
        let mut shown = None;

        let first = describe(&script, &changed(Generation::new(1)), &mut shown);
        assert_eq!(first.as_deref(), Some("[0.0] (title) hi"));
        assert_eq!(describe(&script, &changed(Generation::new(2)), &mut shown), None);

        let paused = PlaybackNotification::Paused {
            cursor: LineCursor::new(0, 0),
        };
        assert_eq!(
            describe(&script, &paused, &mut shown).as_deref(),
            Some("‖ paused")
        );
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_input("p"), Ok(Input::Command(PlaybackCommand::TogglePlay)));
        assert_eq!(parse_input(" n "), Ok(Input::Command(PlaybackCommand::NextLine)));
        assert_eq!(
            parse_input("j 1 2"),
            Ok(Input::Command(PlaybackCommand::JumpToLine { section: 1, line: 2 }))
        );
        assert_eq!(
            parse_input("s 3"),
            Ok(Input::Command(PlaybackCommand::JumpToSection(3)))
        );
        assert_eq!(
            parse_input("t 4.5"),
            Ok(Input::Command(PlaybackCommand::Seek(Duration::from_millis(4_500))))
        );
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            parse_input("r 1.5"),
            Ok(Input::Command(PlaybackCommand::SetPlaybackRate(1.5)))
        );
        assert_eq!(parse_input("r"), Ok(Input::Command(PlaybackCommand::StartNarration)));
        assert_eq!(
            parse_input("v xiaoxiao"),
            Ok(Input::Command(PlaybackCommand::SetVoice(Voice::new("xiaoxiao"))))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_input("j 1").is_err());
        assert!(parse_input("j a b").is_err());
        assert!(parse_input("t -3").is_err());
        assert!(parse_input("x").is_err());
        assert_eq!(parse_input(""), Ok(Input::Help));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
    }
}
