use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::chat::{ChatSession, Role, TranscriptEvent, Turn};
use crate::core::AppConfig;

const LOGOUT_COMMAND: &str = "/logout";

fn render_turn(turn: &Turn) -> String {
    match turn.role {
        Role::User => format!("you> {}", turn.content),
        Role::Assistant => format!("mrt> {}", turn.content),
    }
}

/// Text to print for a transcript event. The user's own input is
/// already on screen so only assistant turns are shown.
fn render(event: &TranscriptEvent) -> Option<String> {
    match event {
        TranscriptEvent::Appended { turn, .. } if turn.role == Role::Assistant => {
            Some(render_turn(turn))
        }
        TranscriptEvent::Appended { .. } => None,
    }
}

pub async fn run() -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let config = AppConfig::default();
    let session = ChatSession::from_config(&config);
    let mut events = session.subscribe();

    for turn in session.snapshot().iter() {
        println!("{}", render_turn(turn));
    }

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim() == LOGOUT_COMMAND {
                    break;
                }
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                    println!("...");
                }
                let outcome = session.submit(&line).await;
                tracing::debug!("Submission finished: {:?}", outcome);

                while let Ok(event) = events.try_recv() {
                    if let Some(text) = render(&event) {
                        println!("{}", text);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
