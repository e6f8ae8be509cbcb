use crate::bench::Observation;
use crate::error::DataError;
use crate::lmul::Lmul;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Reported speedups further than this from the value recomputed from the times are flagged.
const REPORTED_SPEEDUP_TOLERANCE: f64 = 0.01;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub lmul: Lmul,
    pub time_ms: f64,
    pub speedup: f64,
    /// percent of linear scaling
    pub efficiency: f64,
    pub throughput: f64,
}

/// One row per LMUL, ascending.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OperationSeries {
    pub operation: String,
    pub rows: Vec<Row>,
}

impl OperationSeries {
    pub fn row(&self, lmul: Lmul) -> &Row {
        &self.rows[lmul.index()]
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub operation: String,
    pub best_lmul: Lmul,
    pub best_speedup: f64,
    pub best_time_ms: f64,
    pub best_throughput: f64,
    pub worst_lmul: Lmul,
    pub worst_speedup: f64,
    pub worst_time_ms: f64,
    pub range_ratio: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Spread {
    fn of<I: Iterator<Item = f64>>(values: I) -> Option<Spread> {
        let (n, spread) = values.fold(
            (
                0usize,
                Spread {
                    min: f64::INFINITY,
                    max: f64::NEG_INFINITY,
                    mean: 0f64,
                },
            ),
            |(n, acc), v| {
                (
                    n + 1,
                    Spread {
                        min: acc.min.min(v),
                        max: acc.max.max(v),
                        mean: acc.mean + v,
                    },
                )
            },
        );
        if n == 0 {
            return None;
        }
        Some(Spread {
            mean: spread.mean / n as f64,
            ..spread
        })
    }
}

/// Everything the report and the dashboard draw from.
/// Operations keep the order in which they first appear in the input.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub series: Vec<OperationSeries>,
    pub records: Vec<SummaryRecord>,
    pub mean_efficiency: BTreeMap<Lmul, f64>,
    pub mean_speedup: BTreeMap<Lmul, f64>,
}

fn check_value(obs: &Observation, field: &'static str, value: f64) -> Result<(), DataError> {
    if value.is_finite() && value > 0f64 {
        Ok(())
    } else {
        Err(DataError::InvalidValue {
            operation: obs.operation.clone(),
            lmul: obs.lmul,
            field,
            value,
        })
    }
}

/// Groups observations by operation, keeping first-appearance order.
fn group(
    observations: &[Observation],
) -> Result<Vec<(&str, [Option<&Observation>; 4])>, DataError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, [Option<&Observation>; 4])> = Vec::new();
    for obs in observations {
        check_value(obs, "time", obs.time_ms)?;
        check_value(obs, "throughput", obs.throughput)?;
        let g = *index.entry(obs.operation.as_str()).or_insert_with(|| {
            groups.push((obs.operation.as_str(), [None; 4]));
            groups.len() - 1
        });
        let slot = &mut groups[g].1[obs.lmul.index()];
        if slot.is_some() {
            return Err(DataError::DuplicateObservation {
                operation: obs.operation.clone(),
                lmul: obs.lmul,
            });
        }
        *slot = Some(obs);
    }
    Ok(groups)
}

fn build_series(
    operation: &str,
    by_lmul: &[Option<&Observation>; 4],
) -> Result<OperationSeries, DataError> {
    let present = Lmul::ALL
        .iter()
        .map(|&lmul| {
            by_lmul[lmul.index()].ok_or_else(|| DataError::MissingData {
                operation: operation.to_string(),
                lmul,
            })
        })
        .collect::<Result<Vec<&Observation>, DataError>>()?;
    let base_time = present[Lmul::BASELINE.index()].time_ms;

    let rows = Lmul::ALL
        .iter()
        .zip(present.iter())
        .map(|(&lmul, obs)| {
            let speedup = if lmul == Lmul::BASELINE {
                1f64
            } else {
                base_time / obs.time_ms
            };
            if let Some(reported) = obs.reported_speedup {
                if (reported - speedup).abs() > REPORTED_SPEEDUP_TOLERANCE {
                    warn!(
                        operation,
                        lmul = %lmul,
                        reported,
                        computed = speedup,
                        "reported speedup disagrees with measured times"
                    );
                }
            }
            Row {
                lmul,
                time_ms: obs.time_ms,
                speedup,
                efficiency: speedup / lmul.theoretical_scaling() * 100f64,
                throughput: obs.throughput,
            }
        })
        .collect();
    Ok(OperationSeries {
        operation: operation.to_string(),
        rows,
    })
}

/// Best and worst LMUL by speedup. Rows are ascending, and a row only replaces the
/// current pick when strictly better (or worse), so ties go to the smaller LMUL.
fn record(series: &OperationSeries) -> SummaryRecord {
    let first = &series.rows[0];
    let (best, worst) = series.rows[1..]
        .iter()
        .fold((first, first), |(best, worst), row| {
            (
                if row.speedup > best.speedup { row } else { best },
                if row.speedup < worst.speedup { row } else { worst },
            )
        });
    SummaryRecord {
        operation: series.operation.clone(),
        best_lmul: best.lmul,
        best_speedup: best.speedup,
        best_time_ms: best.time_ms,
        best_throughput: best.throughput,
        worst_lmul: worst.lmul,
        worst_speedup: worst.speedup,
        worst_time_ms: worst.time_ms,
        range_ratio: best.speedup / worst.speedup,
    }
}

fn mean_by_lmul<F: Fn(&Row) -> f64>(series: &[OperationSeries], metric: F) -> BTreeMap<Lmul, f64> {
    if series.is_empty() {
        return BTreeMap::new();
    }
    Lmul::ALL
        .iter()
        .map(|&lmul| {
            let sum: f64 = series.iter().map(|s| metric(s.row(lmul))).sum();
            (lmul, sum / series.len() as f64)
        })
        .collect()
}

/// Computes speedup, efficiency and best/worst LMUL for every operation.
/// Fails as a whole if any operation is incomplete; no partial summary is produced.
pub fn summarize(observations: &[Observation]) -> Result<Summary, DataError> {
    let series = group(observations)?
        .iter()
        .map(|(operation, by_lmul)| build_series(operation, by_lmul))
        .collect::<Result<Vec<OperationSeries>, DataError>>()?;
    let records: Vec<SummaryRecord> = series.iter().map(record).collect();
    let mean_efficiency = mean_by_lmul(&series, |row| row.efficiency);
    let mean_speedup = mean_by_lmul(&series, |row| row.speedup);
    debug!(
        operations = series.len(),
        observations = observations.len(),
        "summarized benchmark table"
    );
    Ok(Summary {
        series,
        records,
        mean_efficiency,
        mean_speedup,
    })
}

impl Summary {
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.operation.as_str())
    }
    pub fn series_for(&self, operation: &str) -> Option<&OperationSeries> {
        self.series.iter().find(|s| s.operation == operation)
    }
    pub fn record_for(&self, operation: &str) -> Option<&SummaryRecord> {
        self.records.iter().find(|r| r.operation == operation)
    }
    /// Largest LMUL whose mean efficiency is still above `threshold` percent.
    pub fn balanced_lmul(&self, threshold: f64) -> Option<Lmul> {
        self.mean_efficiency
            .iter()
            .filter(|(_, &eff)| eff > threshold)
            .map(|(&lmul, _)| lmul)
            .max()
    }
    /// LMUL that is best for the most operations; ties go to the smaller LMUL.
    pub fn max_performance_lmul(&self) -> Option<Lmul> {
        let mut counts = [0usize; 4];
        self.records
            .iter()
            .for_each(|r| counts[r.best_lmul.index()] += 1);
        Lmul::ALL
            .iter()
            .filter(|lmul| counts[lmul.index()] > 0)
            .fold(None, |acc: Option<Lmul>, &lmul| match acc {
                Some(cur) if counts[cur.index()] >= counts[lmul.index()] => Some(cur),
                _ => Some(lmul),
            })
    }
    /// True when one LMUL is the best for every operation.
    pub fn unanimous_best(&self) -> Option<Lmul> {
        let first = self.records.first()?.best_lmul;
        if self.records.iter().all(|r| r.best_lmul == first) {
            Some(first)
        } else {
            None
        }
    }
    fn scalability(&self) -> impl Iterator<Item = (&str, f64)> {
        self.series
            .iter()
            .map(|s| (s.operation.as_str(), s.row(Lmul::LARGEST).speedup))
    }
    /// Operation with the highest speedup at the largest LMUL. Ties go to the earlier operation.
    pub fn most_scalable(&self) -> Option<(&str, f64)> {
        self.scalability().fold(None, |acc, (op, s)| match acc {
            Some((_, best)) if best >= s => acc,
            _ => Some((op, s)),
        })
    }
    pub fn least_scalable(&self) -> Option<(&str, f64)> {
        self.scalability().fold(None, |acc, (op, s)| match acc {
            Some((_, worst)) if worst <= s => acc,
            _ => Some((op, s)),
        })
    }
    pub fn speedup_spread(&self, lmul: Lmul) -> Option<Spread> {
        Spread::of(self.series.iter().map(|s| s.row(lmul).speedup))
    }
    pub fn throughput_spread(&self, lmul: Lmul) -> Option<Spread> {
        Spread::of(self.series.iter().map(|s| s.row(lmul).throughput))
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize, Spread};
    use crate::bench::Observation;
    use crate::datasets;
    use crate::error::DataError;
    use crate::lmul::Lmul;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_hc::Hc128Rng;

    fn round2(x: f64) -> f64 {
        (x * 100f64).round() / 100f64
    }

    fn op(name: &str, times: [f64; 4]) -> Vec<Observation> {
        Lmul::ALL
            .iter()
            .zip(times.iter())
            .map(|(&lmul, &t)| Observation::new(name, lmul, t, 100f64 / t))
            .collect()
    }

    #[test]
    fn image_addition() {
        let summary = summarize(&datasets::sample()).unwrap();
        let series = summary.series_for("Image Addition").unwrap();
        let speedups: Vec<f64> = series.rows.iter().map(|r| round2(r.speedup)).collect();
        assert_eq!(speedups, vec![1.00, 1.44, 1.84, 2.14]);

        let record = summary.record_for("Image Addition").unwrap();
        assert_eq!(record.best_lmul, Lmul::M8);
        assert_eq!(record.worst_lmul, Lmul::M1);
        assert_eq!(round2(record.range_ratio), 2.14);
        assert_eq!(record.best_time_ms, 0.251);
        assert_eq!(record.best_throughput, 1044.6);
    }
    #[test]
    fn baseline_is_exact() {
        let summary = summarize(&datasets::sample()).unwrap();
        for series in &summary.series {
            assert_eq!(series.row(Lmul::M1).speedup, 1.0);
            assert_eq!(series.row(Lmul::M1).efficiency, 100.0);
            for row in &series.rows[1..] {
                assert!(row.efficiency > 0f64 && row.efficiency <= 100f64);
            }
        }
    }
    #[test]
    fn operations_keep_input_order() {
        let summary = summarize(&datasets::sample()).unwrap();
        let ops: Vec<&str> = summary.operations().collect();
        assert_eq!(
            ops,
            vec![
                "Image Addition",
                "Horizontal Flip",
                "Vertical Flip",
                "Gaussian Filter",
                "Box Filter"
            ]
        );
        for series in &summary.series {
            let lmuls: Vec<Lmul> = series.rows.iter().map(|r| r.lmul).collect();
            assert_eq!(lmuls, Lmul::ALL.to_vec());
        }
    }
    #[test]
    fn input_order_within_operation_is_irrelevant() {
        let mut obs = op("Shuffled", [4.0, 2.5, 1.5, 1.0]);
        obs.reverse();
        let summary = summarize(&obs).unwrap();
        let speedups: Vec<f64> = summary.series[0].rows.iter().map(|r| r.speedup).collect();
        assert_eq!(speedups, vec![1.0, 1.6, 4.0 / 1.5, 4.0]);
    }
    #[test]
    fn sample_aggregates() {
        let summary = summarize(&datasets::sample()).unwrap();
        let m8 = summary.mean_efficiency[&Lmul::M8];
        assert!(m8 > 15f64 && m8 < 35f64, "{}", m8);
        assert_eq!(summary.mean_efficiency[&Lmul::M1], 100f64);
        assert_eq!(summary.balanced_lmul(40f64), Some(Lmul::M4));
        assert_eq!(summary.balanced_lmul(60f64), Some(Lmul::M2));
        assert_eq!(summary.balanced_lmul(100f64), None);
        assert_eq!(summary.max_performance_lmul(), Some(Lmul::M8));
        assert_eq!(summary.unanimous_best(), Some(Lmul::M8));
        assert_eq!(summary.most_scalable().map(|(op, _)| op), Some("Gaussian Filter"));
        assert_eq!(summary.least_scalable().map(|(op, _)| op), Some("Horizontal Flip"));

        let spread = summary.throughput_spread(Lmul::M8).unwrap();
        assert_eq!(spread.min, 198.0);
        assert_eq!(spread.max, 1119.7);
    }
    #[test]
    fn missing_lmul() {
        let mut obs = datasets::sample();
        obs.retain(|o| !(o.operation == "Vertical Flip" && o.lmul == Lmul::M4));
        assert_eq!(
            summarize(&obs),
            Err(DataError::MissingData {
                operation: "Vertical Flip".to_string(),
                lmul: Lmul::M4
            })
        );
    }
    #[test]
    fn duplicate_lmul() {
        let mut obs = op("Add", [1.0, 0.8, 0.6, 0.5]);
        obs.push(Observation::new("Add", Lmul::M2, 0.7, 1.0));
        assert_eq!(
            summarize(&obs),
            Err(DataError::DuplicateObservation {
                operation: "Add".to_string(),
                lmul: Lmul::M2
            })
        );
    }
    #[test]
    fn invalid_time() {
        let obs = op("Add", [1.0, 0.0, 0.6, 0.5]);
        match summarize(&obs) {
            Err(DataError::InvalidValue { lmul, field, .. }) => {
                assert_eq!(lmul, Lmul::M2);
                assert_eq!(field, "time");
            }
            other => panic!("{:?}", other),
        }
        let obs = op("Add", [1.0, f64::NAN, 0.6, 0.5]);
        assert!(summarize(&obs).is_err());
    }
    #[test]
    fn ties_prefer_smaller_lmul() {
        let summary = summarize(&op("Flat", [1.0, 1.0, 1.0, 1.0])).unwrap();
        let record = &summary.records[0];
        assert_eq!(record.best_lmul, Lmul::M1);
        assert_eq!(record.worst_lmul, Lmul::M1);
        assert_eq!(record.range_ratio, 1.0);

        let summary = summarize(&op("Plateau", [2.0, 1.0, 1.0, 2.0])).unwrap();
        let record = &summary.records[0];
        assert_eq!(record.best_lmul, Lmul::M2);
        assert_eq!(record.worst_lmul, Lmul::M1);
    }
    #[test]
    fn superlinear_efficiency() {
        let summary = summarize(&op("Cache", [8.0, 2.0, 1.0, 0.5])).unwrap();
        assert_eq!(summary.series[0].row(Lmul::M8).efficiency, 200.0);
    }
    #[test]
    fn reported_speedup_is_ignored() {
        let mut obs = op("Stale", [2.0, 1.0, 0.8, 0.5]);
        obs[1].reported_speedup = Some(5.0);
        obs[3].reported_speedup = Some(4.0);
        obs[0].reported_speedup = Some(0.5);
        let summary = summarize(&obs).unwrap();
        let series = &summary.series[0];
        assert_eq!(series.row(Lmul::M1).speedup, 1.0);
        assert_eq!(series.row(Lmul::M2).speedup, 2.0);
        assert_eq!(series.row(Lmul::M2).efficiency, 100.0);
        assert_eq!(series.row(Lmul::M8).speedup, 4.0);

        let record = &summary.records[0];
        assert_eq!(record.best_lmul, Lmul::M8);
        assert_eq!(record.best_speedup, 4.0);
        assert_eq!(record.worst_lmul, Lmul::M1);
    }
    #[test]
    fn empty_input() {
        let summary = summarize(&[]).unwrap();
        assert!(summary.records.is_empty());
        assert!(summary.mean_efficiency.is_empty());
        assert_eq!(summary.balanced_lmul(40f64), None);
        assert_eq!(summary.max_performance_lmul(), None);
        assert_eq!(summary.most_scalable(), None);
        assert_eq!(summary.speedup_spread(Lmul::M8), None);
    }
    #[test]
    fn spread() {
        let s = Spread::of(vec![2.0, 4.0, 6.0].into_iter()).unwrap();
        assert_eq!(s, Spread { min: 2.0, max: 6.0, mean: 4.0 });
    }
    #[test]
    fn rand_tables() {
        let mut rng = Hc128Rng::seed_from_u64(0);
        (0..1000).for_each(|_| {
            let n_ops = rng.gen_range(1..8);
            let obs: Vec<Observation> = (0..n_ops)
                .flat_map(|i| {
                    let times = [
                        rng.gen_range(0.01..10.0),
                        rng.gen_range(0.01..10.0),
                        rng.gen_range(0.01..10.0),
                        rng.gen_range(0.01..10.0),
                    ];
                    op(&format!("op{}", i), times)
                })
                .collect();
            let summary = summarize(&obs).unwrap();
            assert_eq!(summary.records.len(), n_ops);
            for (series, record) in summary.series.iter().zip(summary.records.iter()) {
                assert_eq!(series.row(Lmul::M1).speedup, 1.0);
                assert!(record.best_speedup >= record.worst_speedup);
                assert!(record.range_ratio >= 1.0);
                assert_eq!(record.range_ratio, record.best_speedup / record.worst_speedup);
                for row in &series.rows {
                    assert!(row.speedup <= record.best_speedup);
                    assert!(row.speedup >= record.worst_speedup);
                }
            }
        });
    }
}
