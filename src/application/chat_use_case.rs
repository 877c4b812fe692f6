// ============================================================
// Layer 2 — Chat Use Case
// ============================================================
// Interactive dialog with a restored model over stdin/stdout.
// The running conversation becomes the story: each user line is
// the query, the predicted candidate is printed, and both turns
// join the memory with their speaker and turn tags — the same
// shape the transcripts train on. The profile line is fixed for
// the whole session via a flag.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::application::session::DialogSession;
use crate::application::train_use_case::TrainConfig;
use crate::data::loader::{tag_turn, tokenize};
use crate::infra::checkpoint::CheckpointManager;

const QUIT: &str = ":q";

pub struct ChatUseCase {
    config: TrainConfig,
    profile: Vec<String>,
}

impl ChatUseCase {
    pub fn new(model_dir: String, data_dir: Option<String>, profile: String) -> Result<Self> {
        let ckpt = CheckpointManager::new(&model_dir);
        let mut config = ckpt.load_config()?;

        config.model_dir = model_dir;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }

        Ok(Self { config, profile: tokenize(&profile) })
    }

    pub fn execute(&self) -> Result<()> {
        let session = DialogSession::restore(&self.config)?;
        println!(
            "Chatting as profile '{}' — type a message, {} to quit.",
            self.profile.join(" "),
            QUIT,
        );

        let stdin = io::stdin();
        let mut story: Vec<Vec<String>> = Vec::new();
        let mut turn = 0usize;
        let mut input = String::new();

        loop {
            print!("> ");
            io::stdout().flush()?;

            input.clear();
            if stdin.lock().read_line(&mut input)? == 0 {
                break; // EOF
            }
            let line = input.trim();
            if line.is_empty() {
                continue;
            }
            if line == QUIT {
                break;
            }

            let reply = session.predict_reply(&self.profile, &story, line)?;
            println!("{reply}");

            turn += 1;
            story.push(tag_turn(tokenize(line), "$u", turn));
            story.push(tag_turn(tokenize(&reply), "$r", turn));
        }

        Ok(())
    }
}
