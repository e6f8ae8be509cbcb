use crate::lmul::Lmul;
use serde::{Deserialize, Serialize};

/// A results document as written by the benchmark harness.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BenchResults {
    #[serde(default)]
    pub machine: Option<Machine>,
    pub observations: Vec<Observation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Machine {
    pub name: String,
    pub cpu_arch: String,
    /// VLEN in bits, if the harness could read it.
    #[serde(default)]
    pub vlen: Option<u32>,
}

/// One (operation, LMUL) measurement. Field names double as CSV column headers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Observation {
    #[serde(rename = "Operation")]
    pub operation: String,
    #[serde(rename = "LMUL")]
    pub lmul: Lmul,
    #[serde(rename = "Time_ms")]
    pub time_ms: f64,
    /// MPix/sec
    #[serde(rename = "Throughput_MPix_sec", alias = "Throughput_MPix_per_sec")]
    pub throughput: f64,
    /// Speedup precomputed by the harness. Only used as a cross-check.
    #[serde(
        rename = "Speedup_vs_m1",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reported_speedup: Option<f64>,
}

impl Observation {
    pub fn new(operation: &str, lmul: Lmul, time_ms: f64, throughput: f64) -> Observation {
        Observation {
            operation: operation.to_string(),
            lmul,
            time_ms,
            throughput,
            reported_speedup: None,
        }
    }
}
