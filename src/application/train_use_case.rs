// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates the full pipeline in order:
//
//   Step 1: Load the CSV table             (Layer 4 - data)
//   Step 2: Split by year                  (Layer 4 - data)
//   Step 3: Encode labels                  (Layer 4 - data)
//   Step 4: Scale features                 (Layer 4 - data)
//   Step 5: Build datasets                 (Layer 4 - data)
//   Step 6: Train                          (Layer 5 - ml)
//   Step 7: Final test evaluation          (Layer 5 - ml)
//   Step 8: Confusion matrix               (Layer 5 - ml)
//   Step 9: Permutation importance         (Layer 5 - ml)
//   Step 10: Write artifacts (optional)    (Layer 6 - infra)
//
// Any failure aborts the run; nothing is retried.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    batcher::TabularBatcher,
    dataset::{ClassificationSample, TabularDataset},
    loader::CsvLoader,
    preprocessor::{LabelEncoder, StandardScaler},
    splitter::{split_by_year, TEST_YEAR},
};
use crate::domain::{
    error::DataError,
    record::{AccidentRecord, LoadedTable},
    traits::{Accuracy, RecordSource},
};
use crate::infra::{
    metrics::{MetricsLogger, TrainingHistory},
    report::ReportWriter,
};
use crate::ml::{
    backend::{self, TrainBackend},
    evaluator::{evaluate, ConfusionMatrix, ModelPredictor},
    importance::{permutation_importance, ranked, FeatureImportance, ImportanceSettings},
    model::ClassifierConfig,
    trainer::run_training,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a run. The defaults are the tuned settings, so
// `train --data step1.csv` alone reproduces the reference run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:          String,
    pub output_dir:         Option<String>,
    pub epochs:             usize,
    pub batch_size:         usize,
    pub lr:                 f64,
    pub hidden_sizes:       Vec<usize>,
    pub dropout:            f64,
    pub importance_repeats: usize,
    pub seed:               u64,
    pub top_k:              usize,
    pub skip_importance:    bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:          "step1.csv".to_string(),
            output_dir:         None,
            epochs:             15,
            batch_size:         100,
            lr:                 1e-3,
            hidden_sizes:       vec![512, 256, 128],
            dropout:            0.5,
            importance_repeats: 30,
            seed:               42,
            top_k:              20,
            skip_importance:    false,
        }
    }
}

impl TrainConfig {
    fn importance_settings(&self) -> ImportanceSettings {
        ImportanceSettings {
            n_repeats: self.importance_repeats,
            seed:      self.seed,
        }
    }
}

// ─── RunReport ────────────────────────────────────────────────────────────────
/// Everything a run produces, kept in memory for the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub train_size:    usize,
    pub test_size:     usize,
    pub class_labels:  Vec<String>,
    pub feature_names: Vec<String>,
    pub history:       TrainingHistory,
    pub test_loss:     f64,
    pub test_accuracy: f64,
    pub confusion:     ConfusionMatrix,
    /// In column order; empty when importance was skipped
    pub importances:   Vec<FeatureImportance>,
}

impl RunReport {
    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    /// Importances from most to least important.
    pub fn ranked_importances(&self) -> Vec<FeatureImportance> {
        ranked(&self.importances)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Execute the full pipeline end to end on the compiled-in backend.
    pub fn execute(&self) -> Result<RunReport> {
        // ── Step 1: Load the table ────────────────────────────────────────────
        let table = CsvLoader::new(&self.config.data_path).load_all()?;
        println!("Data load -> OK");

        let device = backend::default_device();
        println!("Using device: {:?}", device);

        run_on_table::<TrainBackend>(&self.config, table, &device)
    }
}

/// Steps 2 to 10 on an already-loaded table.
pub fn run_on_table<B: AutodiffBackend>(
    cfg:    &TrainConfig,
    table:  LoadedTable,
    device: &B::Device,
) -> Result<RunReport> {
    let LoadedTable { feature_names, records } = table;

    // ── Step 2: Split by year ─────────────────────────────────────────────────
    let (train, test) = split_by_year(records, TEST_YEAR);
    if train.is_empty() {
        return Err(DataError::EmptySplit { split: "training" }.into());
    }
    if test.is_empty() {
        return Err(DataError::EmptySplit { split: "test" }.into());
    }
    tracing::info!("Split: {} train, {} test (year {})", train.len(), test.len(), TEST_YEAR);

    let (mut train_x, train_labels) = unzip_records(train);
    let (mut test_x,  test_labels)  = unzip_records(test);

    // ── Step 3: Encode labels (fit on train only) ─────────────────────────────
    let encoder = LabelEncoder::fit(train_labels.iter().map(String::as_str))?;
    let train_y = encoder.transform_all(train_labels.iter().map(String::as_str))?;
    let test_y  = encoder.transform_all(test_labels.iter().map(String::as_str))?;
    tracing::info!("{} classes in the training data", encoder.num_classes());

    // ── Step 4: Scale features (fit on train only) ────────────────────────────
    let scaler = StandardScaler::fit(&train_x)?;
    scaler.transform(&mut train_x)?;
    scaler.transform(&mut test_x)?;

    // ── Step 5: Build datasets ────────────────────────────────────────────────
    let train_samples = to_samples(train_x, train_y);
    let test_samples  = to_samples(test_x, test_y);
    let train_size    = train_samples.len();
    let test_size     = test_samples.len();

    // ── Step 6: Train ─────────────────────────────────────────────────────────
    // Both sizes come from the data rather than from constants.
    let model_cfg = ClassifierConfig::new(feature_names.len(), encoder.num_classes())
        .with_hidden_sizes(cfg.hidden_sizes.clone())
        .with_dropout(cfg.dropout);

    let outcome = run_training::<B>(
        cfg,
        &model_cfg,
        TabularDataset::new(train_samples),
        TabularDataset::new(test_samples.clone()),
        device,
    )?;
    let model = outcome.model;

    // ── Step 7: Final test evaluation ─────────────────────────────────────────
    let batcher = TabularBatcher::<B::InnerBackend>::new(device.clone());
    let batch_size = cfg.batch_size.max(1);
    let test_eval = evaluate(
        &model,
        test_samples
            .chunks(batch_size)
            .map(|chunk| batcher.batch(chunk.to_vec())),
    );
    println!("Test Loss: {:.4}, Test Accuracy: {:.4}", test_eval.loss, test_eval.accuracy);

    // ── Step 8: Confusion matrix ──────────────────────────────────────────────
    let confusion = ConfusionMatrix::from_predictions(
        encoder.num_classes(),
        &test_eval.targets,
        &test_eval.predictions,
    );

    // ── Step 9: Permutation importance ────────────────────────────────────────
    let importances = if cfg.skip_importance {
        tracing::info!("Permutation importance skipped");
        Vec::new()
    } else {
        let predictor = ModelPredictor::new(&model, device.clone(), batch_size);
        permutation_importance(
            &predictor,
            &Accuracy,
            &test_samples,
            &feature_names,
            cfg.importance_settings(),
        )
    };

    let report = RunReport {
        train_size,
        test_size,
        class_labels: encoder.classes().to_vec(),
        feature_names,
        history: outcome.history,
        test_loss: test_eval.loss,
        test_accuracy: test_eval.accuracy,
        confusion,
        importances,
    };

    // ── Step 10: Artifacts ────────────────────────────────────────────────────
    if let Some(dir) = &cfg.output_dir {
        write_artifacts(cfg, &report, PathBuf::from(dir))?;
    }

    Ok(report)
}

fn unzip_records(records: Vec<AccidentRecord>) -> (Vec<Vec<f32>>, Vec<String>) {
    records
        .into_iter()
        .map(|r| (r.features, r.label))
        .unzip()
}

fn to_samples(features: Vec<Vec<f32>>, labels: Vec<usize>) -> Vec<ClassificationSample> {
    features
        .into_iter()
        .zip(labels)
        .map(|(f, l)| ClassificationSample::new(f, l))
        .collect()
}

fn write_artifacts(cfg: &TrainConfig, report: &RunReport, dir: PathBuf) -> Result<()> {
    let writer = ReportWriter::new(&dir)?;
    writer.save_config(cfg)?;

    MetricsLogger::new(&dir)?.log_history(&report.history)?;
    writer.write_confusion_matrix(&report.confusion, &report.class_labels)?;
    if !report.importances.is_empty() {
        writer.write_importances(&report.ranked_importances())?;
    }
    writer.write_json("report.json", report)?;

    tracing::info!("Artifacts written to '{}'", writer.dir().display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type B = Autodiff<NdArray>;

    /// 10 rows, 3 features, 2 classes; 3 rows fall in the held-out year.
    fn tiny_table() -> LoadedTable {
        let rows = [
            ([0.1, 1.0, 5.0], "A", 2018),
            ([0.2, 0.9, 4.0], "A", 2019),
            ([0.9, 0.1, 6.0], "B", 2018),
            ([0.8, 0.2, 5.5], "B", 2019),
            ([0.15, 1.1, 4.5], "A", 2017),
            ([0.85, 0.05, 6.5], "B", 2017),
            ([0.3, 0.8, 5.2], "A", 2019),
            ([0.2, 1.0, 4.8], "A", 2020),
            ([0.9, 0.1, 6.1], "B", 2020),
            ([0.7, 0.3, 5.9], "B", 2020),
        ];
        LoadedTable {
            feature_names: vec!["f0".into(), "f1".into(), "f2".into()],
            records: rows
                .iter()
                .map(|(f, l, y)| AccidentRecord::new(f.to_vec(), *l, *y))
                .collect(),
        }
    }

    fn tiny_config() -> TrainConfig {
        TrainConfig {
            epochs:             1,
            batch_size:         2,
            importance_repeats: 3,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_tiny_end_to_end_run() {
        let device = Default::default();
        let report = run_on_table::<B>(&tiny_config(), tiny_table(), &device).unwrap();

        assert_eq!(report.train_size + report.test_size, 10);
        assert_eq!(report.test_size, 3);
        assert_eq!(report.num_classes(), 2);
        assert_eq!(report.history.len(), 1);
        assert!((0.0..=1.0).contains(&report.test_accuracy));
        assert_eq!(report.confusion.shape(), (2, 2));
        assert_eq!(report.confusion.total(), 3);
        assert_eq!(report.importances.len(), 3);
    }

    #[test]
    fn test_unseen_test_label_aborts() {
        let mut table = tiny_table();
        table.records[9].label = "C".into();

        let device = Default::default();
        let err = run_on_table::<B>(&tiny_config(), table, &device).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnseenLabel { label }) if label == "C"
        ));
    }

    #[test]
    fn test_missing_test_year_aborts() {
        let mut table = tiny_table();
        table.records.retain(|r| r.year != TEST_YEAR);

        let device = Default::default();
        let err = run_on_table::<B>(&tiny_config(), table, &device).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::EmptySplit { split: "test" })
        ));
    }

    #[test]
    fn test_only_test_year_aborts() {
        let mut table = tiny_table();
        table.records.retain(|r| r.year == TEST_YEAR);
        assert!(!table.records.is_empty());

        let device = Default::default();
        let err = run_on_table::<B>(&tiny_config(), table, &device).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::EmptySplit { split: "training" })
        ));
    }

    #[test]
    fn test_artifacts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            output_dir:      Some(dir.path().to_string_lossy().into_owned()),
            skip_importance: true,
            ..tiny_config()
        };

        let device = Default::default();
        let report = run_on_table::<B>(&cfg, tiny_table(), &device).unwrap();
        assert!(report.importances.is_empty());

        for name in ["train_config.json", "metrics.csv", "confusion_matrix.csv", "report.json"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert!(!dir.path().join("feature_importance.csv").exists());
    }

    #[test]
    fn test_execute_reads_csv_from_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("step1.csv");

        let mut csv = String::from("f0,f1,year,cause_code_individual\n");
        for r in tiny_table().records {
            csv.push_str(&format!("{},{},{},{}\n", r.features[0], r.features[1], r.year, r.label));
        }
        std::fs::write(&path, csv).unwrap();

        let cfg = TrainConfig {
            data_path: path.to_string_lossy().into_owned(),
            ..tiny_config()
        };
        let report = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.feature_names, vec!["f0", "f1"]);
        assert_eq!(report.confusion.total() as usize, report.test_size);
    }
}
