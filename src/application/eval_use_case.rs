// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a trained model against a test directory. The run
// configuration comes from the train_config.json saved next to
// the checkpoint, with the data directory, task and OOV switch
// overridable from the command line.

use anyhow::Result;

use crate::application::session::DialogSession;
use crate::application::train_use_case::TrainConfig;
use crate::infra::checkpoint::CheckpointManager;

pub struct EvalUseCase {
    config: TrainConfig,
}

impl EvalUseCase {
    pub fn new(
        model_dir: String,
        data_dir: Option<String>,
        task_id: Option<usize>,
        oov: bool,
    ) -> Result<Self> {
        let ckpt = CheckpointManager::new(&model_dir);
        let mut config = ckpt.load_config()?;

        config.model_dir = model_dir;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        if let Some(task) = task_id {
            config.task_id = task;
        }
        config.oov = oov;

        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let session = DialogSession::restore(&self.config)?;
        let accuracy = session.test_accuracy(&self.config.data_dir)?;
        println!("Testing accuracy: {:.5}", accuracy);
        Ok(())
    }
}
