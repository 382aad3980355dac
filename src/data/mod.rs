// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from the raw CSV file to tensor batches:
//
//   step1.csv
//       │
//       ▼
//   CsvLoader         → parses rows into AccidentRecords
//       │
//       ▼
//   split_by_year     → held-out year becomes the test set
//       │
//       ▼
//   LabelEncoder      → cause code text → class id
//   StandardScaler    → features → zero mean, unit variance
//       │
//       ▼
//   TabularDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   TabularBatcher    → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the accident table from CSV
pub mod loader;

/// Partitions rows into train/test by year
pub mod splitter;

/// Label encoding and feature standardisation
pub mod preprocessor;

/// Implements Burn's Dataset trait for scaled samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
