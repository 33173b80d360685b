mod common;

use common::{init_tracing, noisy_series};
use stockcast::application::ml::dataset::DatasetBuilder;
use stockcast::application::ml::predictor::Predictor;
use stockcast::application::workflow::{AnalysisMode, AnalysisWorkflow};
use stockcast::config::ModelEnvConfig;
use stockcast::domain::ml::artifact::ModelArtifact;
use stockcast::domain::ml::classifier::Classifier;
use stockcast::domain::ports::ArtifactStore;
use stockcast::infrastructure::JsonFileArtifactStore;

fn config_for(path: &std::path::Path) -> ModelEnvConfig {
    ModelEnvConfig {
        model_path: path.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_artifact_survives_reload() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ml").join("model.json");
    let config = config_for(&path);

    let wf = AnalysisWorkflow::new(JsonFileArtifactStore::new(&path), &config);
    let rows = wf.labeled_rows(&noisy_series(900, 17)).unwrap();
    let trained = wf.train(&rows).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded: ModelArtifact = JsonFileArtifactStore::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded, trained);

    // The most confident training sample scores identically after the reload
    let set = DatasetBuilder::new(config.seed).build(&rows).unwrap();
    let (best, _) = set
        .samples
        .iter()
        .map(|s| {
            let p = trained.model.predict_proba(&s.features).unwrap();
            (s, p[0].max(p[1]))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert_eq!(
        trained.model.predict_proba(&best.features).unwrap(),
        reloaded.model.predict_proba(&best.features).unwrap()
    );

    let before = Predictor::new(trained).unwrap().predict_rows(&rows).unwrap();
    let after = Predictor::load(&JsonFileArtifactStore::new(&path))
        .unwrap()
        .predict_rows(&rows)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_retraining_overwrites_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let records = noisy_series(900, 4);
    AnalysisWorkflow::new(JsonFileArtifactStore::new(&path), &config_for(&path))
        .run(&records, AnalysisMode::Train);
    let first = JsonFileArtifactStore::new(&path).load().unwrap().unwrap();

    let reseeded = ModelEnvConfig {
        seed: 7,
        ..config_for(&path)
    };
    AnalysisWorkflow::new(JsonFileArtifactStore::new(&path), &reseeded)
        .run(&records, AnalysisMode::Train);
    let second = JsonFileArtifactStore::new(&path).load().unwrap().unwrap();

    assert_eq!(first.seed, 42);
    assert_eq!(second.seed, 7);
    assert_ne!(first.model, second.model);
}

#[test]
fn test_published_output_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let wf = AnalysisWorkflow::new(JsonFileArtifactStore::new(&path), &config_for(&path));

    let entries = wf.run(&noisy_series(900, 2), AnalysisMode::TrainAndPredict);
    let json = serde_json::to_value(&entries).unwrap();
    let array = json.as_array().unwrap();
    assert_eq!(array.len(), 901);

    assert_eq!(array[0]["Date"], "2018-01-01 00:00:00");
    assert!(array[0]["MA10"].is_null());
    assert!(array[899]["Label"].is_null());

    let prediction = &array[900]["prediction"];
    let signal = prediction["recommendation"].as_str().unwrap();
    assert!(signal == "BUY" || signal == "SELL");
    assert_eq!(prediction["date"], "2020-06-18 00:00:00");
    assert_eq!(prediction["features_used"].as_array().unwrap().len(), 16);
}

#[test]
fn test_predict_without_artifact_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let wf = AnalysisWorkflow::new(JsonFileArtifactStore::new(&path), &config_for(&path));

    let entries = wf.run(&noisy_series(300, 2), AnalysisMode::Predict);
    let json = serde_json::to_value(entries.last().unwrap()).unwrap();
    assert_eq!(json["status"], "model_not_found");
    assert!(json["message"].as_str().unwrap().contains("missing.json"));
}
