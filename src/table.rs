use std::collections::BTreeSet;

use itertools::Itertools;

use crate::scanner::items::ItemRecord;
use crate::scanner::names::NameRecord;

const ITEM_HEADERS: [&str; 7] = [
    "dbid",
    "reftype",
    "reftypeminor",
    "description0",
    "description1",
    "description2",
    "description3",
];
const NAME_HEADERS: [&str; 3] = ["dbid", "jp_name", "en_name"];

/// Equipment sits in the 10000..30000 reftype band; wands are 56000.
/// Records with an empty or non-numeric reftype count as 0 and are dropped.
pub fn keep_item(record: &ItemRecord) -> bool {
    let reftype = record.reftype.parse::<i64>().unwrap_or(0);
    (10000..30000).contains(&reftype) || reftype == 56000
}

/// Apply the reftype filter, preserving scan order.
pub fn filter_items(records: &[ItemRecord]) -> Vec<&ItemRecord> {
    records.iter().filter(|r| keep_item(r)).collect()
}

/// Render the item table. Columns are the fixed headers followed by one
/// `inv<N>` column per discovered index in ascending order; the index set
/// comes from the whole scan, so records missing an index emit an empty
/// cell rather than shifting the row.
pub fn render_items(records: &[&ItemRecord], inv_indices: &BTreeSet<u32>) -> String {
    let header = ITEM_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(inv_indices.iter().map(|i| format!("inv{}", i)))
        .join(",");

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header);
    for rec in records {
        let row = [
            rec.dbid.as_str(),
            rec.reftype.as_str(),
            rec.reftypeminor.as_str(),
            rec.descriptions[0].as_str(),
            rec.descriptions[1].as_str(),
            rec.descriptions[2].as_str(),
            rec.descriptions[3].as_str(),
        ]
        .into_iter()
        .map(str::to_string)
        .chain(
            inv_indices
                .iter()
                .map(|i| rec.inv.get(i).cloned().unwrap_or_default()),
        )
        .map(|cell| quote_minimal(&cell))
        .join(",");
        rows.push(row);
    }
    rows.join("\n")
}

/// Render the name table. Every cell is wrapped in quotes unconditionally
/// and embedded quotes are left as-is; ids and names in this table never
/// contain them, and the simpler rule matches the established output format.
pub fn render_names(records: &[NameRecord]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(NAME_HEADERS.join(","));
    for rec in records {
        rows.push(format!(
            "\"{}\",\"{}\",\"{}\"",
            rec.dbid, rec.jp_name, rec.en_name
        ));
    }
    rows.join("\n")
}

/// Quote only when the value needs it: a comma or quote anywhere wraps the
/// cell in quotes and doubles every embedded quote.
fn quote_minimal(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn item(dbid: &str, reftype: &str) -> ItemRecord {
        ItemRecord {
            dbid: dbid.to_string(),
            reftype: reftype.to_string(),
            reftypeminor: String::new(),
            descriptions: Default::default(),
            inv: Default::default(),
        }
    }

    #[test]
    fn filter_boundaries_are_exact() {
        assert!(keep_item(&item("1", "10000")));
        assert!(keep_item(&item("2", "15000")));
        assert!(keep_item(&item("3", "29999")));
        assert!(keep_item(&item("4", "56000")));
        assert!(!keep_item(&item("5", "9999")));
        assert!(!keep_item(&item("6", "30000")));
        assert!(!keep_item(&item("7", "56001")));
    }

    #[test]
    fn blank_or_malformed_reftype_is_dropped() {
        assert!(!keep_item(&item("1", "")));
        assert!(!keep_item(&item("2", "junk")));
    }

    #[test]
    fn quote_minimal_rules() {
        assert_eq!(quote_minimal("plain123"), "plain123");
        assert_eq!(quote_minimal("a,b"), "\"a,b\"");
        assert_eq!(quote_minimal("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_minimal(""), "");
    }

    #[test]
    fn item_header_includes_sorted_inv_columns() {
        let indices: BTreeSet<u32> = [30, 2, 9].into_iter().collect();
        let csv = render_items(&[], &indices);
        assert_eq!(
            csv,
            "dbid,reftype,reftypeminor,description0,description1,description2,description3,inv2,inv9,inv30"
        );
    }

    #[test]
    fn missing_inv_cells_render_empty() {
        let mut rec = item("1001", "10000");
        rec.inv.insert(9, "charged".to_string());
        let indices: BTreeSet<u32> = [2, 9].into_iter().collect();
        let csv = render_items(&[&rec], &indices);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "1001,10000,,,,,,,charged");
    }

    #[test]
    fn item_cells_quoted_only_when_needed() {
        let mut rec = item("1", "10000");
        rec.descriptions[0] = "swift, deadly".to_string();
        rec.descriptions[1] = "the \"fang\"".to_string();
        let csv = render_items(&[&rec], &BTreeSet::new());
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "1,10000,,\"swift, deadly\",\"the \"\"fang\"\"\",,");
    }

    #[test]
    fn name_cells_always_quoted() {
        let records = vec![NameRecord {
            dbid: "42".to_string(),
            jp_name: "長剣".to_string(),
            en_name: String::new(),
        }];
        let csv = render_names(&records);
        assert_eq!(csv, "dbid,jp_name,en_name\n\"42\",\"長剣\",\"\"");
    }

    #[test]
    fn row_order_follows_input_order() {
        let a = item("900", "10000");
        let b = item("3", "56000");
        let csv = render_items(&[&a, &b], &BTreeSet::new());
        let dbids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(dbids, vec!["900", "3"]);
    }
}
