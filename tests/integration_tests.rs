use std::fs;
use std::path::Path;

use chat_responder::{
    ArtifactStore, DatasetLoader, MultinomialNb, TfidfVectorizer, TrainingConfig,
    TrainingPipeline,
};
use env_logger::{Builder, Env};
use tempfile::TempDir;

// Initialize test logger
fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

const CHAT_DATA: &str = "\
message,response
hello,Hi! How can I help you today?
hi there,Hi! How can I help you today?
hey,Hi! How can I help you today?
good morning,Good morning! How are you?
morning,Good morning! How are you?
how are you,\"I'm doing well, thanks for asking.\"
how are you doing,\"I'm doing well, thanks for asking.\"
what is your name,I'm a simple chatbot.
who are you,I'm a simple chatbot.
tell me a joke,Why did the robot go on vacation? To recharge!
make me laugh,Why did the robot go on vacation? To recharge!
thank you,You're welcome!
thanks a lot,You're welcome!
bye,Goodbye! Have a great day.
see you later,Goodbye! Have a great day.
goodbye,Goodbye! Have a great day.
what can you do,I can answer simple questions.
help me,I can answer simple questions.
";

fn write_dataset(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("chat_data.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn config_for(dir: &TempDir, data: &str) -> TrainingConfig {
    TrainingConfig {
        data_path: write_dataset(dir.path(), data),
        output_dir: dir.path().join("artifacts"),
        ..Default::default()
    }
}

#[test]
fn test_training_run_from_csv() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = TempDir::new()?;
    let summary = TrainingPipeline::new(config_for(&dir, CHAT_DATA)).run()?;

    assert_eq!(summary.n_records, 18);
    assert_eq!(summary.n_dropped, 0);
    assert_eq!(summary.n_test, 4);
    assert_eq!(summary.n_train, 14);
    assert_eq!(summary.report.total_support, 4);
    assert!(summary.vocabulary_size > 0 && summary.vocabulary_size <= 500);

    let correct = (summary.accuracy * summary.n_test as f64).round();
    assert!((summary.accuracy - correct / summary.n_test as f64).abs() < 1e-12);

    assert_eq!(summary.sanity.message, "Hello");
    assert!(summary.classes.contains(&summary.sanity.predicted));
    assert!(summary.vectorizer_path.ends_with("vectorizer.bin"));
    assert!(summary.classifier_path.ends_with("chatbot_model.bin"));
    assert!(summary.report.to_string().contains("weighted avg"));
    Ok(())
}

#[test]
fn test_rows_with_missing_response_are_excluded() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = TempDir::new()?;
    let data = format!("{}orphaned message,\n,orphaned response\n", CHAT_DATA);
    let config = config_for(&dir, &data);

    let dataset = DatasetLoader::new().load(&config.data_path)?;
    assert_eq!(dataset.len(), 18);
    assert_eq!(dataset.dropped(), 2);
    assert!(dataset.messages().iter().all(|m| *m != "orphaned message"));
    assert!(dataset.responses().iter().all(|r| *r != "orphaned response"));

    let summary = TrainingPipeline::new(config).run()?;
    assert_eq!(summary.n_records, 18);
    assert_eq!(summary.n_dropped, 2);
    assert_eq!(summary.n_train + summary.n_test, 18);
    assert!(summary.report.class("orphaned response").is_none());
    Ok(())
}

#[test]
fn test_runs_are_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let first_dir = TempDir::new()?;
    let second_dir = TempDir::new()?;

    let first = TrainingPipeline::new(config_for(&first_dir, CHAT_DATA)).run()?;
    let second = TrainingPipeline::new(config_for(&second_dir, CHAT_DATA)).run()?;

    assert_eq!(first.test_indices, second.test_indices);
    assert_eq!(first.report, second.report);
    assert_eq!(first.accuracy, second.accuracy);
    assert_eq!(first.sanity, second.sanity);
    assert_eq!(
        fs::read(&first.vectorizer_path)?,
        fs::read(&second.vectorizer_path)?
    );
    assert_eq!(
        fs::read(&first.classifier_path)?,
        fs::read(&second.classifier_path)?
    );
    Ok(())
}

#[test]
fn test_single_response_dataset_scores_perfectly() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = TempDir::new()?;
    let data = "message,response\nhello,ok\nhow are you,ok\nbye,ok\nwhat now,ok\nreally,ok\n";
    let summary = TrainingPipeline::new(config_for(&dir, data)).run()?;

    assert_eq!(summary.accuracy, 1.0);
    assert_eq!(summary.classes, vec!["ok".to_string()]);
    assert_eq!(summary.sanity.predicted, "ok");
    Ok(())
}

#[test]
fn test_reloaded_artifacts_predict_identically() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = TempDir::new()?;
    let dataset = DatasetLoader::new().load(write_dataset(dir.path(), CHAT_DATA))?;

    let (vectorizer, rows) = TfidfVectorizer::builder()
        .with_max_features(500)
        .fit_transform(&dataset.messages())?;
    let model = MultinomialNb::builder().fit(&rows, &dataset.responses())?;

    let store = ArtifactStore::new(dir.path().join("model"))?;
    store.save_vectorizer(&vectorizer)?;
    store.save_classifier(&model)?;
    let reloaded = store.load_predictor()?;

    let inputs = ["Hello", "thanks!", "who are you?", "tell me something funny", "zzz"];
    for input in inputs {
        let in_process_row = vectorizer.transform_one(input)?;
        let reloaded_row = reloaded.vectorizer().transform_one(input)?;
        assert_eq!(in_process_row, reloaded_row);

        let in_process = model.predict_proba(&in_process_row)?;
        let (label, scores) = reloaded.predict(input)?;
        assert_eq!(label, model.predict(&in_process_row)?);
        for (class, p) in &in_process {
            assert_eq!(p.to_bits(), scores[class].to_bits());
        }
    }
    Ok(())
}

#[test]
fn test_semicolon_delimited_input() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = TempDir::new()?;
    let data = CHAT_DATA.replace("\"I'm doing well, thanks for asking.\"", "Doing well")
        .replace(',', ";");
    let config = TrainingConfig {
        delimiter: b';',
        ..config_for(&dir, &data)
    };
    let summary = TrainingPipeline::new(config).run()?;
    assert_eq!(summary.n_records, 18);
    Ok(())
}
