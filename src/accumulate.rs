use std::collections::HashMap;
use std::io;
use std::path::Path;

use log::{info, trace};
use petgraph::graph::NodeIndex;

use crate::error::{RecordError, RecordErrorKind};
use crate::filter::{RecordFilter, Rejection};
use crate::graph::{StationGraph, Weight};
use crate::paths::PathIndex;
use crate::ridership::RidershipRow;
use crate::stations::StationDirectory;

/// What edge weights count from before the first record is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Every edge starts at zero, so weights end up as pure traffic.
    Zero,
    /// Weights from the input file are kept and traffic is added on top.
    Original,
}

impl Baseline {
    pub fn keep_original(keep: bool) -> Self {
        if keep {
            Baseline::Original
        } else {
            Baseline::Zero
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationReport {
    pub records: u64,
    pub applied: u64,
    pub filtered: HashMap<Rejection, u64>,
    pub passengers: u64,
}

impl AccumulationReport {
    pub fn filtered_total(&self) -> u64 {
        self.filtered.values().sum()
    }

    pub fn filtered_by(&self, rejection: Rejection) -> u64 {
        self.filtered.get(&rejection).copied().unwrap_or_default()
    }
}

/// Adds the passengers of every accepted ridership record to each edge along the
/// record's shortest path.
///
/// Paths come from a [`PathIndex`] computed on the base topology beforehand;
/// the accumulator only ever changes edge weights.
pub struct WeightAccumulator<'a> {
    graph: &'a mut StationGraph,
    paths: &'a PathIndex,
    directory: &'a StationDirectory,
    filter: &'a RecordFilter,
    report: AccumulationReport,
}

impl<'a> WeightAccumulator<'a> {
    pub fn new(
        graph: &'a mut StationGraph,
        paths: &'a PathIndex,
        directory: &'a StationDirectory,
        filter: &'a RecordFilter,
        baseline: Baseline,
    ) -> Self {
        if baseline == Baseline::Zero {
            graph.reset_weights();
        }

        Self {
            graph,
            paths,
            directory,
            filter,
            report: AccumulationReport::default(),
        }
    }

    /// Applies one row. Returns the reason if the filter left it out.
    pub fn apply(&mut self, row: &RidershipRow) -> Result<Option<Rejection>, RecordErrorKind> {
        let record = row.parse(self.directory)?;
        self.report.records += 1;

        if let Err(rejection) = self.filter.check(record.date, record.hour) {
            trace!(target: "accumulate", "Skipping {:?}: {:?}", row, rejection);
            *self.report.filtered.entry(rejection).or_default() += 1;
            return Ok(Some(rejection));
        }

        let origin = self.vertex(record.origin)?;
        let destination = self.vertex(record.destination)?;
        let path = self
            .paths
            .path(origin, destination)
            .ok_or_else(|| self.no_path(origin, destination))?;

        self.graph
            .add_along(&path, record.passengers as Weight)
            .map_err(|(from, to)| self.no_path(from, to))?;

        self.report.applied += 1;
        self.report.passengers = self.report.passengers.saturating_add(record.passengers);

        Ok(None)
    }

    /// Consumes every row of `reader`. The first bad row aborts with its line number.
    pub fn run<R: io::Read>(
        mut self,
        reader: &mut csv::Reader<R>,
        source: &Path,
    ) -> Result<AccumulationReport, RecordError> {
        let mut line = 0;

        for result in reader.records() {
            let fail = |line: u64, kind: RecordErrorKind| RecordError {
                line,
                file: source.to_path_buf(),
                kind,
            };

            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    let at = err.position().map_or(line + 1, |pos| pos.line());
                    return Err(fail(at, err.into()));
                }
            };
            line = record.position().map_or(line + 1, |pos| pos.line());

            let row = record
                .deserialize::<RidershipRow>(None)
                .map_err(|err| fail(line, err.into()))?;
            self.apply(&row).map_err(|kind| fail(line, kind))?;
        }

        info!(
            target: "accumulate",
            "Read {} records: {} applied ({} passengers), {} filtered out (hour {}, weekday {}, before start {}, after end {})",
            self.report.records,
            self.report.applied,
            self.report.passengers,
            self.report.filtered_total(),
            self.report.filtered_by(Rejection::Hour),
            self.report.filtered_by(Rejection::Weekday),
            self.report.filtered_by(Rejection::BeforeStart),
            self.report.filtered_by(Rejection::AfterEnd),
        );

        Ok(self.report)
    }

    fn vertex(&self, name: &str) -> Result<NodeIndex, RecordErrorKind> {
        self.graph
            .node(name)
            .ok_or_else(|| RecordErrorKind::UnknownVertex(name.to_owned()))
    }

    fn no_path(&self, from: NodeIndex, to: NodeIndex) -> RecordErrorKind {
        RecordErrorKind::NoPath {
            from: self.graph.name(from).to_owned(),
            to: self.graph.name(to).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;
    use crate::filter::{NumberSet, HOURS, WEEKDAYS};
    use crate::graph::tests::raw;
    use crate::ridership;

    fn directory() -> StationDirectory {
        StationDirectory::from_iter([
            ("AAAA", "A"),
            ("BBBB", "B"),
            ("CCCC", "C"),
            ("DDDD", "D"),
            ("GONE", "Not in graph"),
        ])
    }

    /// A - B - C, plus an unconnected D.
    fn line_graph(directed: bool, weight: Option<Weight>) -> StationGraph {
        StationGraph::from_raw(
            raw(&["A", "B", "C", "D"], &[("A", "B", weight), ("B", "C", weight)]),
            directed,
        )
        .unwrap()
    }

    fn accumulate(
        graph: &mut StationGraph,
        filter: &RecordFilter,
        baseline: Baseline,
        csv: &str,
    ) -> Result<AccumulationReport, RecordError> {
        let paths = PathIndex::compute(graph);
        let directory = directory();
        let accumulator = WeightAccumulator::new(graph, &paths, &directory, filter, baseline);
        accumulator.run(
            &mut ridership::from_reader(csv.as_bytes()),
            &PathBuf::from("test.csv"),
        )
    }

    #[test]
    fn single_record_weights_its_path() {
        let mut graph = line_graph(false, None);
        let report = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,CCCC,10\n",
        )
        .unwrap();

        assert_eq!(graph.edge_weight("A", "B"), Some(10.0));
        assert_eq!(graph.edge_weight("B", "C"), Some(10.0));
        assert_eq!(report.applied, 1);
        assert_eq!(report.passengers, 10);
    }

    #[test]
    fn original_weights_are_kept_on_request() {
        let mut graph = line_graph(false, Some(1.0));
        accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Original,
            "2019-01-07,8,AAAA,CCCC,10\n",
        )
        .unwrap();

        assert_eq!(graph.edge_weight("A", "B"), Some(11.0));
        assert_eq!(graph.edge_weight("B", "C"), Some(11.0));
    }

    #[test]
    fn records_sharing_a_path_add_up() {
        let mut graph = line_graph(false, None);
        accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,CCCC,5\n2019-01-07,9,AAAA,CCCC,5\n2019-01-07,9,BBBB,CCCC,1\n",
        )
        .unwrap();

        assert_eq!(graph.edge_weight("A", "B"), Some(10.0));
        assert_eq!(graph.edge_weight("B", "C"), Some(11.0));
    }

    #[test]
    fn empty_or_filtered_stream_leaves_zero_weights() {
        for csv in ["", "2019-01-07,3,AAAA,CCCC,10\n"] {
            let mut graph = line_graph(false, Some(4.0));
            let filter = RecordFilter::new(
                NumberSet::parse("8-9", HOURS).unwrap(),
                NumberSet::full(WEEKDAYS),
                None,
                None,
            )
            .unwrap();
            accumulate(&mut graph, &filter, Baseline::Zero, csv).unwrap();

            assert!(graph.edges().all(|(_, _, weight)| weight == 0.0), "{csv:?}");
        }
    }

    #[test]
    fn order_does_not_matter() {
        let rows = [
            "2019-01-07,8,AAAA,CCCC,3",
            "2019-01-08,8,CCCC,BBBB,7",
            "2019-01-09,8,BBBB,AAAA,11",
            "2019-01-10,8,AAAA,BBBB,13",
        ];
        let mut forward = line_graph(false, None);
        let mut backward = line_graph(false, None);

        accumulate(&mut forward, &RecordFilter::default(), Baseline::Zero, &rows.join("\n")).unwrap();
        let reversed = rows.iter().rev().copied().collect::<Vec<_>>().join("\n");
        accumulate(&mut backward, &RecordFilter::default(), Baseline::Zero, &reversed).unwrap();

        assert_eq!(
            forward.edges().collect::<Vec<_>>(),
            backward.edges().collect::<Vec<_>>()
        );
        assert_eq!(forward.edge_weight("A", "B"), Some(27.0));
        assert_eq!(forward.edge_weight("B", "C"), Some(10.0));
    }

    #[test]
    fn filters_contribute_nothing() {
        let mut graph = line_graph(false, None);
        // 2019-01-07 is a Monday
        let filter = RecordFilter::new(
            NumberSet::parse("6-9", HOURS).unwrap(),
            NumberSet::parse("0-4", WEEKDAYS).unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 7),
            NaiveDate::from_ymd_opt(2019, 1, 11),
        )
        .unwrap();

        let report = accumulate(
            &mut graph,
            &filter,
            Baseline::Zero,
            "2019-01-07,5,AAAA,BBBB,100\n\
             2019-01-12,8,AAAA,BBBB,100\n\
             2019-01-06,8,AAAA,BBBB,100\n\
             2019-01-14,8,AAAA,BBBB,100\n\
             2019-01-11,9,AAAA,BBBB,1\n",
        )
        .unwrap();

        assert_eq!(graph.edge_weight("A", "B"), Some(1.0));
        assert_eq!(report.records, 5);
        assert_eq!(report.filtered_by(Rejection::Hour), 1);
        // Saturday and Sunday fail the weekday test before any date bound
        assert_eq!(report.filtered_by(Rejection::Weekday), 2);
        assert_eq!(report.filtered_by(Rejection::AfterEnd), 1);
    }

    #[test]
    fn unknown_station_aborts_with_line_number() {
        let mut graph = line_graph(false, None);
        let err = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,CCCC,10\n2019-01-07,3,AAAA,ZZZZ,10\n",
        )
        .unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.file, PathBuf::from("test.csv"));
        assert!(matches!(err.kind, RecordErrorKind::UnknownStation(ref code) if code == "ZZZZ"));
    }

    #[test]
    fn unreachable_destination_aborts() {
        let mut graph = line_graph(false, None);
        let err = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,DDDD,10\n",
        )
        .unwrap_err();

        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, RecordErrorKind::NoPath { .. }));
    }

    #[test]
    fn against_the_arcs_there_is_no_path() {
        let mut graph = line_graph(true, None);
        let err = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,CCCC,1\n2019-01-07,8,CCCC,AAAA,1\n",
        )
        .unwrap_err();

        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, RecordErrorKind::NoPath { .. }));
    }

    #[test]
    fn station_missing_from_graph_aborts() {
        let mut graph = line_graph(false, None);
        let err = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,GONE,CCCC,1\n",
        )
        .unwrap_err();

        assert!(matches!(err.kind, RecordErrorKind::UnknownVertex(_)));
    }

    #[test]
    fn malformed_fields_abort() {
        for (csv, line) in [
            ("2019-01-07,8,AAAA,CCCC,1\n07/01/2019,8,AAAA,CCCC,1\n", 2),
            ("2019-01-07,noon,AAAA,CCCC,1\n", 1),
            ("2019-01-07,8,AAAA,CCCC,many\n", 1),
            ("2019-01-07,8,AAAA,CCCC,1\n2019-01-07,8,AAAA\n", 2),
        ] {
            let mut graph = line_graph(false, None);
            let err = accumulate(&mut graph, &RecordFilter::default(), Baseline::Zero, csv)
                .unwrap_err();
            assert_eq!(err.line, line, "{csv:?}");
            assert!(
                !matches!(
                    err.kind,
                    RecordErrorKind::UnknownStation(_)
                        | RecordErrorKind::UnknownVertex(_)
                        | RecordErrorKind::NoPath { .. }
                ),
                "{csv:?}"
            );
        }
    }

    #[test]
    fn out_of_range_hour_is_skipped_not_fatal() {
        let mut graph = line_graph(false, None);
        let report = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,24,AAAA,CCCC,10\n",
        )
        .unwrap();

        assert_eq!(report.filtered_by(Rejection::Hour), 1);
        assert_eq!(graph.edge_weight("A", "B"), Some(0.0));
    }

    #[test]
    fn passenger_total_saturates() {
        let mut graph = line_graph(false, None);
        let report = accumulate(
            &mut graph,
            &RecordFilter::default(),
            Baseline::Zero,
            "2019-01-07,8,AAAA,BBBB,18446744073709551615\n2019-01-07,8,AAAA,BBBB,1\n",
        )
        .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.passengers, u64::MAX);
        assert!(graph.edge_weight("A", "B").unwrap() > 1.8e19);
    }
}
