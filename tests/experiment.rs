// End-to-end tests over a tiny synthetic corpus: the full
// restore-or-train experiment cycle, and a train-then-score
// session. Model dimensions are kept small so the whole run
// takes well under a second on the CPU backend.

use std::fs;
use std::path::Path;

use memnet_dialog::application::experiment::run_experiment;
use memnet_dialog::application::session::DialogSession;
use memnet_dialog::application::train_use_case::TrainConfig;

const CANDIDATES: &str = "\
1 hello what can i help you with today
2 i'm on it
3 here it is
4 you're welcome
";

fn dialog(profile: &str) -> String {
    format!(
        "1 {profile}\n\
         2 hi\thello what can i help you with today\n\
         3 may i have a table\ti'm on it\n\
         4 show me the menu\there it is\n\
         5 thanks\tyou're welcome\n"
    )
}

/// Write a complete tiny corpus: 4 train dialogs, 2 dev, 2 tst,
/// each dialog contributing 4 examples.
fn write_corpus(dir: &Path) {
    let trn = [
        dialog("female middle-aged"),
        dialog("male young"),
        dialog("female middle-aged"),
        dialog("male young"),
    ]
    .join("\n");
    let dev = [dialog("female middle-aged"), dialog("male young")].join("\n");
    let tst = [dialog("male young"), dialog("female middle-aged")].join("\n");

    fs::write(dir.join("dialog-candidates.txt"), CANDIDATES).unwrap();
    fs::write(dir.join("dialog-task5-trn.txt"), trn).unwrap();
    fs::write(dir.join("dialog-task5-dev.txt"), dev).unwrap();
    fs::write(dir.join("dialog-task5-tst.txt"), tst).unwrap();
}

fn tiny_config(data_dir: &Path, model_dir: &Path) -> TrainConfig {
    TrainConfig {
        data_dir: data_dir.display().to_string(),
        model_dir: model_dir.display().to_string(),
        task_id: 5,
        epochs: 2,
        evaluation_interval: 1,
        batch_size: 4,
        hops: 1,
        embedding_size: 8,
        memory_size: 20,
        learning_rate: 0.01,
        random_state: Some(7),
        ..TrainConfig::default()
    }
}

#[test]
fn experiment_without_checkpoint_trains_and_reports_every_test_dir() {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("corpus");
    fs::create_dir_all(&data_dir).unwrap();
    write_corpus(&data_dir);

    let experiment_dir = root.path().join("experiments/smoke");
    let cfg = tiny_config(&data_dir, &experiment_dir);

    let test_dirs = vec![data_dir.display().to_string()];
    let report =
        run_experiment(&experiment_dir.display().to_string(), &test_dirs, &cfg).unwrap();

    // One accuracy per supplied test directory, all in range
    assert_eq!(report.len(), test_dirs.len());
    for (dir, accuracy) in &report {
        assert_eq!(dir, &test_dirs[0]);
        assert!((0.0..=1.0).contains(accuracy), "accuracy out of range: {accuracy}");
    }

    // The fresh-train path persisted the paired artifacts
    assert!(experiment_dir.join("vocabulary.json").exists());
    assert!(experiment_dir.join("profiles.json").exists());
    assert!(experiment_dir.join("attributes.json").exists());
    assert!(experiment_dir.join("train_config.json").exists());
    assert!(experiment_dir.join("metrics.csv").exists());
}

#[test]
fn experiment_runs_twice_against_the_same_directory() {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("corpus");
    fs::create_dir_all(&data_dir).unwrap();
    write_corpus(&data_dir);

    let experiment_dir = root.path().join("experiments/repeat");
    let cfg = tiny_config(&data_dir, &experiment_dir);
    let test_dirs = vec![data_dir.display().to_string()];
    let experiment_path = experiment_dir.display().to_string();

    let first = run_experiment(&experiment_path, &test_dirs, &cfg).unwrap();
    // Second invocation restores if a checkpoint was saved and
    // retrains otherwise; both paths must report again.
    let second = run_experiment(&experiment_path, &test_dirs, &cfg).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn trained_session_scores_a_foreign_directory_with_its_own_vocabulary() {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("corpus");
    fs::create_dir_all(&data_dir).unwrap();
    write_corpus(&data_dir);

    // A second directory with an utterance the vocabulary never saw
    let foreign_dir = root.path().join("foreign");
    fs::create_dir_all(&foreign_dir).unwrap();
    write_corpus(&foreign_dir);
    fs::write(
        foreign_dir.join("dialog-task5-tst.txt"),
        "1 male young\n2 something entirely unseen\ti'm on it\n",
    )
    .unwrap();

    let model_dir = root.path().join("model");
    let cfg = tiny_config(&data_dir, &model_dir);

    let session = DialogSession::train(&cfg).unwrap();
    let accuracy = session.test_accuracy(&foreign_dir.display().to_string()).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}
