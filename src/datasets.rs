use crate::bench::{BenchResults, Observation};
use crate::error::{Error, Result};
use crate::lmul::Lmul;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CSV: &str = "lmul_benchmark_results.csv";

/// (operation, [time_ms; 4], [throughput MPix/sec; 4]), LMUL ascending.
const SAMPLE: [(&str, [f64; 4], [f64; 4]); 5] = [
    (
        "Image Addition",
        [0.538, 0.374, 0.292, 0.251],
        [487.2, 701.3, 898.6, 1044.6],
    ),
    (
        "Horizontal Flip",
        [1.810, 1.532, 1.392, 1.323],
        [144.8, 171.1, 188.2, 198.0],
    ),
    (
        "Vertical Flip",
        [0.435, 0.320, 0.263, 0.234],
        [602.3, 819.2, 996.2, 1119.7],
    ),
    (
        "Gaussian Filter",
        [1.182, 0.774, 0.570, 0.468],
        [221.7, 338.5, 459.6, 559.7],
    ),
    (
        "Box Filter",
        [1.101, 0.734, 0.550, 0.458],
        [238.2, 357.4, 476.7, 572.2],
    ),
];

/// Measured results of the five image processing kernels on the reference board.
pub fn sample() -> Vec<Observation> {
    SAMPLE
        .iter()
        .flat_map(|&(operation, times, throughputs)| {
            Lmul::ALL
                .iter()
                .map(move |&lmul| {
                    Observation::new(
                        operation,
                        lmul,
                        times[lmul.index()],
                        throughputs[lmul.index()],
                    )
                })
        })
        .collect()
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a table with a header row naming `Operation`, `LMUL`, `Time_ms` and
/// `Throughput_MPix_sec`. Other columns are ignored.
pub fn load_csv(path: &Path) -> Result<Vec<Observation>> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let observations = reader
        .deserialize()
        .collect::<std::result::Result<Vec<Observation>, csv::Error>>()
        .map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), rows = observations.len(), "loaded benchmark table");
    Ok(observations)
}

pub fn load_json(path: &Path) -> Result<BenchResults> {
    let file = open(path)?;
    let results: BenchResults =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some(machine) = &results.machine {
        info!(machine = %machine.name, arch = %machine.cpu_arch, "benchmark machine");
    }
    info!(path = %path.display(), rows = results.observations.len(), "loaded benchmark results");
    Ok(results)
}

/// JSON for `.json` paths, CSV for everything else.
pub fn load(path: &Path) -> Result<Vec<Observation>> {
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_json(path).map(|results| results.observations)
    } else {
        load_csv(path)
    }
}
