use std::sync::LazyLock;

use regex::Regex;

use crate::store::RecordStore;

static JP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^if\s*\(\s*jp\s*\)").unwrap());
static NAMEREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ioriginalnameref\((\d+)\)\s*=\s*"(.*)""#).unwrap());

/// One localized-name entry, keyed by the reference id.
#[derive(Debug, Clone)]
pub struct NameRecord {
    pub dbid: String,
    pub jp_name: String,
    pub en_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lang {
    None,
    Local,
    Foreign,
}

/// Scan a name-table script. The grammar is flat: `if ( jp )` / `else`
/// toggle the active language, and every `ioriginalnameref(id) = "name"`
/// line writes the matching field of its record, last write winning.
pub fn scan(text: &str) -> Vec<NameRecord> {
    let mut store: RecordStore<NameRecord> = RecordStore::new();
    let mut lang = Lang::None;

    for raw in text.lines() {
        let line = raw.trim();

        if JP_RE.is_match(line) {
            lang = Lang::Local;
            continue;
        }
        if line.starts_with("else") {
            lang = Lang::Foreign;
            continue;
        }

        if let Some(caps) = NAMEREF_RE.captures(line) {
            let id = caps[1].to_string();
            let name = &caps[2];
            let rec = store.get_or_create(&id, || NameRecord {
                dbid: id.clone(),
                jp_name: String::new(),
                en_name: String::new(),
            });
            match lang {
                Lang::Local => rec.jp_name = name.to_string(),
                Lang::Foreign => rec.en_name = name.to_string(),
                Lang::None => {}
            }
        }
    }

    store.into_records()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_branches_merge_into_one_record() {
        let src = concat!(
            "if ( jp ) {\n",
            "ioriginalnameref(42) = \"長剣\"\n",
            "}\n",
            "else {\n",
            "ioriginalnameref(42) = \"long sword\"\n",
            "}\n",
        );
        let records = scan(src);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dbid, "42");
        assert_eq!(records[0].jp_name, "長剣");
        assert_eq!(records[0].en_name, "long sword");
    }

    #[test]
    fn records_keep_first_seen_order() {
        let src = concat!(
            "if ( jp )\n",
            "ioriginalnameref(90) = \"c\"\n",
            "ioriginalnameref(3) = \"a\"\n",
            "else\n",
            "ioriginalnameref(90) = \"c2\"\n",
            "ioriginalnameref(7) = \"b\"\n",
        );
        let order: Vec<String> = scan(src).into_iter().map(|r| r.dbid).collect();
        assert_eq!(order, vec!["90", "3", "7"]);
    }

    #[test]
    fn last_write_wins_per_field() {
        let src = concat!(
            "if ( jp )\n",
            "ioriginalnameref(1) = \"old\"\n",
            "ioriginalnameref(1) = \"new\"\n",
        );
        let records = scan(src);
        assert_eq!(records[0].jp_name, "new");
    }

    #[test]
    fn assignment_before_any_branch_creates_empty_record() {
        let records = scan("ioriginalnameref(5) = \"orphan\"");
        assert_eq!(records.len(), 1);
        assert!(records[0].jp_name.is_empty());
        assert!(records[0].en_name.is_empty());
    }

    #[test]
    fn unclosed_quote_is_ignored() {
        let records = scan("if ( jp )\nioriginalnameref(5) = \"broken");
        assert!(records.is_empty());
    }

    #[test]
    fn names_fixture() {
        let src = std::fs::read_to_string("tests/fixtures/names.hsp").unwrap();
        let records = scan(&src);
        let order: Vec<&str> = records.iter().map(|r| r.dbid.as_str()).collect();
        assert_eq!(order, vec!["42", "43", "760"]);

        assert_eq!(records[0].jp_name, "長剣");
        assert_eq!(records[0].en_name, "long sword");
        assert_eq!(records[2].jp_name, "魔力の杖");
        assert_eq!(records[2].en_name, "wand of magic");
    }
}
