//! History views: filtering, sorting and counts over stored records

use chrono::{DateTime, Duration, Local, Utc};
use paperscope_common::store::{parse_timestamp, sort_key};
use paperscope_common::PaperRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sort orders offered by the history view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    /// Case-insensitive title
    TitleAsc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest_first" | "newest" => Ok(SortOrder::NewestFirst),
            "oldest_first" | "oldest" => Ok(SortOrder::OldestFirst),
            "title_asc" | "title" => Ok(SortOrder::TitleAsc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Filter, order and limit applied to the full record set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Case-insensitive text matched against title, abstract and summary
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Apply to records in store order
    pub fn apply(&self, records: Vec<PaperRecord>) -> Vec<PaperRecord> {
        let needle = self
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        let mut view: Vec<PaperRecord> = match needle {
            Some(needle) => records
                .into_iter()
                .filter(|r| searchable_text(r).contains(&needle))
                .collect(),
            None => records,
        };

        sort_records(&mut view, self.sort);
        if let Some(limit) = self.limit {
            view.truncate(limit);
        }
        view
    }
}

fn searchable_text(record: &PaperRecord) -> String {
    format!("{}{}{}", record.title, record.abstract_or_empty(), record.summary).to_lowercase()
}

/// Stable sort in place
pub fn sort_records(records: &mut [PaperRecord], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => records.sort_by(|a, b| {
            sort_key(b.timestamp.as_deref()).cmp(&sort_key(a.timestamp.as_deref()))
        }),
        SortOrder::OldestFirst => {
            records.sort_by_key(|r| sort_key(r.timestamp.as_deref()))
        }
        SortOrder::TitleAsc => records.sort_by_key(|r| r.title.to_lowercase()),
    }
}

/// Counts shown above the history list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    /// Timestamp falls on the local calendar day of `now`
    pub added_today: usize,
    /// Timestamp later than `now` minus seven days
    pub last_7_days: usize,
}

impl HistoryStats {
    pub fn compute(records: &[PaperRecord], now: DateTime<Local>) -> Self {
        let today = now.date_naive();
        let week_ago = now.with_timezone(&Utc) - Duration::days(7);

        let parsed: Vec<DateTime<Utc>> = records
            .iter()
            .filter_map(|r| r.timestamp.as_deref().and_then(parse_timestamp))
            .collect();

        Self {
            total: records.len(),
            added_today: parsed
                .iter()
                .filter(|ts| ts.with_timezone(&Local).date_naive() == today)
                .count(),
            last_7_days: parsed.iter().filter(|ts| **ts > week_ago).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(days_ago: i64, now: DateTime<Local>) -> String {
        (now - Duration::days(days_ago)).to_rfc3339()
    }

    fn records(now: DateTime<Local>) -> Vec<PaperRecord> {
        vec![
            PaperRecord::new("1", "beta", "graph methods").with_timestamp(at(3, now)),
            PaperRecord::new("2", "Alpha", "contrastive learning").with_timestamp(at(0, now)),
            PaperRecord::new("3", "gamma", "robots")
                .with_abstract("Contrastive pretraining for robots")
                .with_timestamp(at(30, now)),
            PaperRecord::new("4", "delta", "no timestamp"),
        ]
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn ids(records: &[PaperRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let now = noon();
        let newest = HistoryQuery::default().apply(records(now));
        assert_eq!(ids(&newest), vec!["2", "1", "3", "4"]);

        let oldest = HistoryQuery {
            sort: SortOrder::OldestFirst,
            ..Default::default()
        }
        .apply(records(now));
        assert_eq!(ids(&oldest), vec!["4", "3", "1", "2"]);

        let by_title = HistoryQuery {
            sort: SortOrder::TitleAsc,
            ..Default::default()
        }
        .apply(records(now));
        assert_eq!(ids(&by_title), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn test_filter_covers_title_abstract_and_summary() {
        let now = noon();
        let query = HistoryQuery {
            filter: Some("  CONTRASTIVE ".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(records(now))), vec!["2", "3"]);

        let by_title = HistoryQuery {
            filter: Some("gamma".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_title.apply(records(now))), vec!["3"]);

        let blank = HistoryQuery {
            filter: Some("   ".to_string()),
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(blank.apply(records(now)).len(), 2);
    }

    #[test]
    fn test_stats() {
        let now = noon();
        let stats = HistoryStats::compute(&records(now), now);
        assert_eq!(
            stats,
            HistoryStats {
                total: 4,
                added_today: 1,
                last_7_days: 2,
            }
        );
        assert_eq!(HistoryStats::compute(&[], now), HistoryStats::default());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("newest_first".parse::<SortOrder>().unwrap(), SortOrder::NewestFirst);
        assert_eq!("Title".parse::<SortOrder>().unwrap(), SortOrder::TitleAsc);
        assert!("random".parse::<SortOrder>().is_err());
    }
}
