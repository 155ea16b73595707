//! Batch normalizer
//!
//! Drives [`parse_row`] over a whole uploaded document. The first
//! `preamble_lines` lines are dropped without inspection; every later line is
//! parsed in order and either kept or counted as rejected. Nothing is
//! reordered or deduplicated, and an empty result is a valid batch.

use tracing::debug;

use crate::models::{BatchStats, NormalizedBatch};
use crate::options::IngestOptions;
use crate::row::parse_row;

#[derive(Debug, Clone, Default)]
pub struct BatchNormalizer {
    options: IngestOptions,
}

impl BatchNormalizer {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Normalize a full document
    ///
    /// Lines are split on `\n` (a trailing `\r` is tolerated). At most
    /// `total_lines - preamble_lines` records come out.
    pub fn normalize(&self, document: &str) -> NormalizedBatch {
        let mut records = Vec::new();
        let mut stats = BatchStats::default();

        for (index, line) in document.lines().enumerate() {
            stats.total_lines += 1;

            if index < self.options.preamble_lines {
                stats.preamble_skipped += 1;
                continue;
            }

            match parse_row(line, &self.options.labels) {
                Ok(record) => records.push(record),
                Err(rejection) => {
                    debug!(line = index + 1, %rejection, "Discarding line");
                    stats.count_rejection(&rejection);
                },
            }
        }

        stats.accepted = records.len();

        debug!(
            total_lines = stats.total_lines,
            accepted = stats.accepted,
            rejected = stats.rejected(),
            "Normalized document"
        );

        NormalizedBatch { records, stats }
    }

    /// Normalize raw upload bytes
    ///
    /// Invalid UTF-8 sequences become U+FFFD instead of failing the upload;
    /// a damaged line then fails row parsing on its own.
    pub fn normalize_bytes(&self, content: &[u8]) -> NormalizedBatch {
        self.normalize(&String::from_utf8_lossy(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferment_common::types::PumpLabels;

    fn normalizer() -> BatchNormalizer {
        BatchNormalizer::new(
            IngestOptions::default().with_labels(PumpLabels::new("Glucose", "Base")),
        )
    }

    #[test]
    fn test_single_pump_line() {
        let batch = normalizer().normalize("h1\nh2\n1.0,x,Pump1,y,2.5,z,mg/L\n");

        assert_eq!(batch.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.time_stamp, 1.0);
        assert_eq!(record.parameter, "Glucose");
        assert_eq!(record.process_value, 2.5);
        assert_eq!(record.unit, "mg/L");
    }

    #[test]
    fn test_non_numeric_timestamp_yields_nothing() {
        let batch = normalizer().normalize("h1\nh2\nabc,x,pH,y,7.2,z,pH\n");
        assert!(batch.is_empty());
        assert_eq!(batch.stats.invalid_timestamp, 1);
    }

    #[test]
    fn test_bad_value_kept_as_zero() {
        let batch = normalizer().normalize("h1\nh2\n3.0,x,pH,y,notanumber,z,pH\n");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].process_value, 0.0);
        assert_eq!(batch.records[0].parameter, "pH");
        assert_eq!(batch.records[0].unit, "pH");
    }

    #[test]
    fn test_preamble_is_skipped_even_when_it_looks_like_data() {
        let doc = "0.5,x,pH,y,7.0,z,pH\n1.0,x,pH,y,7.1,z,pH\n1.5,x,pH,y,7.2,z,pH\n";
        let batch = normalizer().normalize(doc);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].time_stamp, 1.5);
        assert_eq!(batch.stats.preamble_skipped, 2);
    }

    #[test]
    fn test_order_is_preserved_and_duplicates_kept() {
        let doc = "h1\nh2\n3,x,pH,y,7,z,pH\n1,x,pH,y,7,z,pH\n3,x,pH,y,7,z,pH\n";
        let batch = normalizer().normalize(doc);

        let times: Vec<f64> = batch.records.iter().map(|r| r.time_stamp).collect();
        assert_eq!(times, vec![3.0, 1.0, 3.0]);
    }

    #[test]
    fn test_mixed_document_stats() {
        let doc = "Run R001002\nTime,,Name,,Value,,Unit\n\
                   0,a,Pump1,b,1.0,c,mL\n\
                   \n\
                   short,line\n\
                   bad,a,pH,b,7,c,pH\n\
                   1,a,Pump2,b,oops,c,mL\r\n";
        let batch = normalizer().normalize(doc);

        assert_eq!(batch.stats.total_lines, 7);
        assert_eq!(batch.stats.preamble_skipped, 2);
        assert_eq!(batch.stats.accepted, 2);
        assert_eq!(batch.stats.too_few_fields, 2);
        assert_eq!(batch.stats.invalid_timestamp, 1);
        assert_eq!(batch.stats.rejected(), 3);

        assert_eq!(batch.records[0].parameter, "Glucose");
        assert_eq!(batch.records[1].parameter, "Base");
        assert_eq!(batch.records[1].process_value, 0.0);
        assert_eq!(batch.records[1].unit, "mL");
    }

    #[test]
    fn test_empty_and_preamble_only_documents() {
        assert!(normalizer().normalize("").is_empty());
        assert!(normalizer().normalize("only header\n").is_empty());
        assert!(normalizer().normalize("h1\nh2\n").is_empty());
    }

    #[test]
    fn test_invalid_utf8_only_spoils_its_own_line() {
        let mut doc = b"h1\nh2\n1.0,x,pH,y,7.0,z,pH\n".to_vec();
        doc.extend_from_slice(b"\xff\xfe,x,pH,y,7.1,z,pH\n2.0,x,pH,y,7.2,z,pH\n");

        let batch = normalizer().normalize_bytes(&doc);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.stats.invalid_timestamp, 1);
        assert_eq!(batch.records[1].time_stamp, 2.0);
    }

    #[test]
    fn test_custom_preamble_size() {
        let normalizer = BatchNormalizer::new(IngestOptions::default().with_preamble_lines(0));
        let batch = normalizer.normalize("1,x,pH,y,7,z,pH\n2,x,pH,y,7,z,pH\n");
        assert_eq!(batch.len(), 2);
    }
}
