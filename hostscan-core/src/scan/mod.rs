mod executor;

pub use executor::{
    filter_errors_only, DelayRange, ProgressCallback, ScanConfig, ScanOutcome, Scanner,
};
