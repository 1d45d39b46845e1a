use std::collections::BTreeMap;
use std::io::Read;

use pit_core::TaxBracket;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::RegimeLoadError;

/// A single row of the bracket CSV file.
///
/// - `regime`: code of the regime the row belongs to (e.g. `from2026`)
/// - `from`: lower bound of the bracket, inclusive
/// - `to`: upper bound, exclusive (empty for the unbounded top bracket)
/// - `rate`: marginal rate as a percentage (e.g. `10` for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub regime: String,
    pub from: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub to: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reads bracket tables from CSV.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket rows from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, RegimeLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups rows by regime code and validates each row as a bracket.
    ///
    /// Rows keep their file order within a regime.
    pub fn group(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<String, Vec<TaxBracket>>, RegimeLoadError> {
        let mut groups: BTreeMap<String, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            let bracket = TaxBracket::new(record.from, record.to, record.rate).map_err(|source| {
                RegimeLoadError::InvalidBracket {
                    regime: record.regime.clone(),
                    source,
                }
            })?;
            groups
                .entry(record.regime.clone())
                .or_default()
                .push(bracket);
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use pit_core::BracketError;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = "regime,from,to,rate
before2026,0,5000000,5
before2026,5000000,10000000,10
from2026,0,10000000,5
before2026,10000000,,15
from2026,10000000,,10
";

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "regime,from,to,rate\nfrom2026,0,10000000,5";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![BracketRecord {
                regime: "from2026".to_string(),
                from: dec!(0),
                to: Some(dec!(10000000)),
                rate: dec!(5),
            }]
        );
    }

    #[test]
    fn test_parse_csv_unbounded_bracket() {
        let csv = "regime,from,to,rate\nfrom2026,100000000,,35";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].to, None);
        assert_eq!(records[0].rate, dec!(35));
    }

    #[test]
    fn test_parse_csv_fractional_rate() {
        let csv = "regime,from,to,rate\ncustom,0, 1000 ,7.5";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].to, Some(dec!(1000)));
        assert_eq!(records[0].rate, dec!(7.5));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "regime,from\nfrom2026,0";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail");

        let RegimeLoadError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {}", msg);
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "regime,from,to,rate\nfrom2026,abc,10000000,5";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail");

        assert!(matches!(err, RegimeLoadError::CsvParse(_)), "got: {:?}", err);
    }

    // =========================================================================
    // group tests
    // =========================================================================

    #[test]
    fn test_group_by_regime_preserves_row_order() {
        let records = BracketTableLoader::parse(TEST_CSV.as_bytes()).unwrap();

        let groups = BracketTableLoader::group(&records).unwrap();

        assert_eq!(groups.len(), 2);
        let before: Vec<_> = groups["before2026"].iter().map(|bracket| bracket.from()).collect();
        assert_eq!(before, vec![dec!(0), dec!(5000000), dec!(10000000)]);
        assert!(groups["before2026"][2].is_unbounded());
        assert_eq!(groups["from2026"].len(), 2);
    }

    #[test]
    fn test_group_reports_invalid_row_with_regime() {
        let csv = "regime,from,to,rate\nbroken,0,5000000,120";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let err = BracketTableLoader::group(&records).unwrap_err();

        let RegimeLoadError::InvalidBracket { regime, source } = err else {
            panic!("Expected InvalidBracket error, got: {:?}", err);
        };
        assert_eq!(regime, "broken");
        assert_eq!(source, BracketError::InvalidRate(dec!(120)));
    }
}
