use chat_responder::{
    classification_report, ArtifactStore, ClassifierError, DatasetLoader, FeatureVector,
    MultinomialNb, ResponsePredictor, TfidfVectorizer, TrainingConfig, TrainingPipeline,
};

#[test]
fn test_empty_vocabulary() {
    let result = TfidfVectorizer::builder().fit(&["?", "a b c", "!!"]);
    assert!(matches!(result.unwrap_err(), ClassifierError::Validation(_)));
}

#[test]
fn test_labels_and_rows_must_align() -> Result<(), ClassifierError> {
    let (_, rows) = TfidfVectorizer::builder().fit_transform(&["hello", "bye"])?;
    let result = MultinomialNb::builder().fit(&rows, &["only one label"]);
    assert!(matches!(result.unwrap_err(), ClassifierError::Validation(_)));
    Ok(())
}

#[test]
fn test_vector_from_another_feature_space() -> Result<(), ClassifierError> {
    let (vectorizer, rows) = TfidfVectorizer::builder().fit_transform(&["hello there", "bye now"])?;
    let model = MultinomialNb::builder().fit(&rows, &["hi", "bye"])?;

    let foreign = FeatureVector::zeros(vectorizer.vocabulary_size() + 1);
    let result = model.predict(&foreign);
    assert!(matches!(
        result.unwrap_err(),
        ClassifierError::DimensionMismatch { expected, actual } if actual == expected + 1
    ));
    Ok(())
}

#[test]
fn test_predictor_rejects_mismatched_parts() -> Result<(), ClassifierError> {
    let vectorizer = TfidfVectorizer::builder().fit(&["one two three four"])?;
    let (_, rows) = TfidfVectorizer::builder().fit_transform(&["five"])?;
    let model = MultinomialNb::builder().fit(&rows, &["x"])?;
    assert!(matches!(
        ResponsePredictor::new(vectorizer, model),
        Err(ClassifierError::DimensionMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_report_length_mismatch() {
    let result = classification_report(&["a", "b", "c"], &["a", "b"]);
    assert!(matches!(result.unwrap_err(), ClassifierError::Validation(_)));
}

#[test]
fn test_missing_dataset_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        data_path: dir.path().join("missing.csv"),
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let result = TrainingPipeline::new(config).run();
    assert!(matches!(result.unwrap_err(), ClassifierError::DataAccess(_)));
}

#[test]
fn test_dataset_without_response_column() {
    let result = DatasetLoader::new().load_from_reader("message,answer\nhi,hello\n".as_bytes());
    assert!(matches!(
        result.unwrap_err(),
        ClassifierError::MissingColumn(column) if column == "response"
    ));
}

#[test]
fn test_loading_from_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();
    assert!(matches!(
        store.load_predictor().unwrap_err(),
        ClassifierError::DataAccess(_)
    ));
}
