//! Collecting a synthetic contig in shards gives the same report as collecting it
//! in one pass.

use covstrat_core::CoverageAggregator;
use covstrat_stratifiers::{
    AlignedRead, CoverageCollector, Feature, Locus, PileupElement, ReferenceWindow,
    StratificationConfig,
};
use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::tempdir;

const CONTIG: &[u8] = b"ACGTTGCAAGGCCTTANNACGTGCGCATATGCCGTAAACGTTTGCAGCATGCNACGTAGCTAGGCTTACG";

#[fixture]
fn config() -> StratificationConfig {
    "[gc]\nbin = 5.0\nleading = 4\ntrailing = 6\n[collector]\ncoverage_cap = 8\n"
        .parse()
        .unwrap()
}

fn pileup(position: usize) -> Vec<PileupElement> {
    let depth = (position * 7) % 6;
    (0..depth)
        .map(|i| PileupElement {
            read: AlignedRead {
                name: format!("read{}", (position + i) / 3),
                read_group: Some(if i % 2 == 0 { "lane1" } else { "lane2" }.to_string()),
                fragment_length: 150 + 40 * i as i64,
                reverse_strand: i % 3 == 0,
                first_of_pair: true,
            },
            base_quality: if i == 4 { 10 } else { 35 },
        })
        .collect()
}

fn features(position: usize) -> Vec<Feature> {
    if position % 4 == 0 {
        vec![]
    } else {
        vec![Feature::new("mappability").with_score(0.25 * (position % 4) as f32)]
    }
}

fn collect(config: &StratificationConfig, positions: std::ops::Range<usize>) -> CoverageAggregator {
    let mut collector = CoverageCollector::from_config(config).unwrap();
    let window = collector.panel().reference_window();
    for position in positions {
        let reference = ReferenceWindow::from_contig(CONTIG, position, window).unwrap();
        let features = features(position);
        let pileup = pileup(position);
        let locus = Locus {
            contig: "chrT",
            position: position as u64,
            reference: &reference,
            features: &features,
            pileup: &pileup,
        };
        collector.apply(&locus).unwrap();
    }
    collector.finish().unwrap()
}

fn written(aggregator: &CoverageAggregator) -> String {
    let mut buffer = Vec::new();
    aggregator.to_report().write_to(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[rstest]
fn test_sharded_collection_matches_single_pass(config: StratificationConfig) {
    let whole = collect(&config, 0..CONTIG.len());

    let dir = tempdir().unwrap();
    let split = CONTIG.len() / 3;
    let shards = [0..split, split..2 * split, 2 * split..CONTIG.len()];
    let paths: Vec<_> = shards
        .into_iter()
        .enumerate()
        .map(|(i, positions)| {
            let path = dir.path().join(format!("shard{}.txt.gz", i));
            collect(&config, positions).write(&path).unwrap();
            path
        })
        .collect();

    let mut merged = CoverageAggregator::read(&paths[2]).unwrap();
    merged.merge(&CoverageAggregator::read(&paths[0]).unwrap()).unwrap();
    merged.merge(&CoverageAggregator::read(&paths[1]).unwrap()).unwrap();
    merged.derive_statistics().unwrap();

    assert_eq!(written(&merged), written(&whole));
}

#[rstest]
fn test_reference_counts_cover_defined_positions(config: StratificationConfig) {
    let whole = collect(&config, 0..CONTIG.len());
    let defined = CONTIG.iter().filter(|base| **base != b'N').count() as i64;

    let table = whole.reference_counts();
    let count_column = table.column_index("count").unwrap();
    let total: i64 = (0..table.row_count())
        .map(|row| table.get_count(row, count_column).unwrap())
        .sum();
    assert_eq!(total, defined);

    // every group's buckets add up to its reference stratum
    for stats in whole.group_statistics().unwrap() {
        assert!(stats.reference_count > 0);
        assert!(stats.average >= 0.0);
    }
}

#[rstest]
fn test_fine_gc_bins_merge_with_their_reload() {
    let config: StratificationConfig = "[gc]\nbin = 0.1\nleading = 4\ntrailing = 6\n".parse().unwrap();
    let mut aggregator = collect(&config, 0..CONTIG.len());
    let rows = aggregator.reference_counts().row_count();

    let dir = tempdir().unwrap();
    let path = dir.path().join("fine.txt");
    aggregator.write(&path).unwrap();
    let reloaded = CoverageAggregator::read(&path).unwrap();

    aggregator.merge(&reloaded).unwrap();
    assert_eq!(aggregator.reference_counts().row_count(), rows);
    assert_eq!(aggregator.read_counts().row_count(), reloaded.read_counts().row_count());
}
