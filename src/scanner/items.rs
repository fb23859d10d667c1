use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::store::RecordStore;

static DBID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^if\s*\(\s*dbid\s*==\s*(\d+)\s*\)").unwrap());
static DBMODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^if\s*\(\s*dbmode\s*==\s*(\d+)\s*(?:\|\s*dbmode\s*==\s*(\d+))?").unwrap());
static REFTYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"reftype\s*=\s*(\d+)").unwrap());
static REFTYPEMINOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"reftypeminor\s*=\s*(\d+)").unwrap());
static INV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"inv\((\d+),\s*ci\)\s*=\s*(.+)").unwrap());
static INV9_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"inv\(9,\s*ci\)\s*=\s*(.+)").unwrap());
static JP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^if\s*\(\s*jp\s*\)").unwrap());
static DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"description\((\d+)\)\s*=\s*"(.*)"#).unwrap());

/// Two-character literal stored in place of a real line break inside
/// accumulated description text.
pub const NEWLINE_ESCAPE: &str = "\\n";

/// One `dbid` block's worth of extracted data. `inv` holds the sparse,
/// dynamically-discovered attributes; the full column set is only known
/// once the whole input has been scanned (see [`ItemScan::inv_indices`]).
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub dbid: String,
    pub reftype: String,
    pub reftypeminor: String,
    pub descriptions: [String; 4],
    pub inv: BTreeMap<u32, String>,
}

impl ItemRecord {
    fn new(dbid: &str) -> Self {
        Self {
            dbid: dbid.to_string(),
            reftype: String::new(),
            reftypeminor: String::new(),
            descriptions: Default::default(),
            inv: BTreeMap::new(),
        }
    }
}

/// Result of a full Pipeline A scan: records in first-seen order plus the
/// union of every `inv` index observed anywhere in the input.
pub struct ItemScan {
    pub records: Vec<ItemRecord>,
    pub inv_indices: BTreeSet<u32>,
}

/// Which `inv(...)` assignments the current `dbmode` block accepts.
/// `Wand` (dbmode 3) is a superset of `Equip` (dbmode 10): both take the
/// generic rule, and `Wand` additionally binds the specific `inv(9, ci)`
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvScope {
    Outside,
    Equip,
    Wand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lang {
    None,
    Local,
    Foreign,
}

/// Description scope: language branches only exist inside a `dbmode == 17`
/// block, so the flag is carried by the scope itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescScope {
    Outside,
    Inside(Lang),
}

/// A `description(n) = "...` whose closing quote has not been seen yet.
struct DescBuffer {
    slot: usize,
    parts: Vec<String>,
}

struct ItemScanner {
    store: RecordStore<ItemRecord>,
    inv_indices: BTreeSet<u32>,
    current: Option<String>,
    inv_scope: InvScope,
    desc_scope: DescScope,
    pending_desc: Option<DescBuffer>,
}

/// Scan an item-definition script. Lines are trimmed and dispatched through
/// a fixed-precedence rule chain; the first matching rule consumes the
/// line, and unmatched lines are ignored.
pub fn scan(text: &str) -> ItemScan {
    let mut scanner = ItemScanner::new();
    for line in text.lines() {
        scanner.step(line.trim());
    }
    scanner.finish()
}

impl ItemScanner {
    fn new() -> Self {
        Self {
            store: RecordStore::new(),
            inv_indices: BTreeSet::new(),
            current: None,
            inv_scope: InvScope::Outside,
            desc_scope: DescScope::Outside,
            pending_desc: None,
        }
    }

    fn step(&mut self, line: &str) {
        // ── An open multi-line description has absolute priority ──
        if self.pending_desc.is_some() {
            self.continue_description(line);
            return;
        }

        // ── Record entry: if ( dbid == N ) ──
        if let Some(caps) = DBID_RE.captures(line) {
            let dbid = caps[1].to_string();
            self.store.get_or_create(&dbid, || ItemRecord::new(&dbid));
            self.current = Some(dbid);
            self.inv_scope = InvScope::Outside;
            self.desc_scope = DescScope::Outside;
            return;
        }

        // Everything below needs an open record.
        let Some(dbid) = self.current.clone() else {
            return;
        };

        // ── Sub-context entry: if ( dbmode == N [| dbmode == M] ) ──
        if let Some(caps) = DBMODE_RE.captures(line) {
            let first = caps[1].parse::<u32>().ok();
            let second = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            let has = |v| first == Some(v) || second == Some(v);

            self.inv_scope = if has(3) {
                InvScope::Wand
            } else if has(10) {
                InvScope::Equip
            } else {
                InvScope::Outside
            };
            // Entering any dbmode block re-arms the language branch.
            self.desc_scope = if has(17) {
                DescScope::Inside(Lang::None)
            } else {
                DescScope::Outside
            };
            return;
        }

        // ── Sub-context exit. A bare `}` closes the inv scope only; the
        // description scope stays open until the next dbmode or dbid line. ──
        if line == "}" {
            self.inv_scope = InvScope::Outside;
            return;
        }

        // ── Scalar fields, first write wins, any sub-context ──
        if let Some(caps) = REFTYPE_RE.captures(line) {
            let rec = self.record_mut(&dbid);
            if rec.reftype.is_empty() {
                rec.reftype = caps[1].to_string();
            }
            return;
        }
        if let Some(caps) = REFTYPEMINOR_RE.captures(line) {
            let rec = self.record_mut(&dbid);
            if rec.reftypeminor.is_empty() {
                rec.reftypeminor = caps[1].to_string();
            }
            return;
        }

        // ── inv(N, ci) = value, equipment and wand blocks ──
        if self.inv_scope != InvScope::Outside {
            if let Some(caps) = INV_RE.captures(line) {
                if let Ok(index) = caps[1].parse::<u32>() {
                    let value = caps[2].trim().to_string();
                    self.set_inv(&dbid, index, value);
                    return;
                }
            }
        }

        // ── inv(9, ci) = value, wand blocks. The generic rule above already
        // consumes these lines whenever it is active; checked second. ──
        if self.inv_scope == InvScope::Wand {
            if let Some(caps) = INV9_RE.captures(line) {
                let value = caps[1].trim().to_string();
                self.set_inv(&dbid, 9, value);
                return;
            }
        }

        // ── Language branches, dbmode 17 only ──
        if let DescScope::Inside(_) = self.desc_scope {
            if JP_RE.is_match(line) {
                self.desc_scope = DescScope::Inside(Lang::Local);
                return;
            }
            if line.starts_with("else") {
                self.desc_scope = DescScope::Inside(Lang::Foreign);
                return;
            }
        }

        // ── description(n) = "text, dbmode 17 + local language only ──
        if self.desc_scope == DescScope::Inside(Lang::Local) {
            if let Some(caps) = DESC_RE.captures(line) {
                let Ok(slot) = caps[1].parse::<usize>() else {
                    return;
                };
                if slot > 3 {
                    return;
                }
                let rest = &caps[2];
                match rest.strip_suffix('"') {
                    Some(text) => self.append_description(&dbid, slot, text),
                    None => {
                        self.pending_desc = Some(DescBuffer {
                            slot,
                            parts: vec![rest.to_string()],
                        });
                    }
                }
            }
        }
    }

    /// Consume one raw line of an open multi-line description. A trailing
    /// quote closes the string; anything else is buffered verbatim.
    fn continue_description(&mut self, line: &str) {
        let Some(text) = line.strip_suffix('"') else {
            if let Some(buf) = self.pending_desc.as_mut() {
                buf.parts.push(line.to_string());
            }
            return;
        };
        let Some(mut buf) = self.pending_desc.take() else {
            return;
        };
        buf.parts.push(text.to_string());
        let joined = buf.parts.join(NEWLINE_ESCAPE);
        if let Some(dbid) = self.current.clone() {
            self.append_description(&dbid, buf.slot, &joined);
        }
    }

    /// Append to a description slot; an occupied slot gains a literal `\n`
    /// separator rather than being replaced.
    fn append_description(&mut self, dbid: &str, slot: usize, text: &str) {
        let rec = self.record_mut(dbid);
        let cell = &mut rec.descriptions[slot];
        if cell.is_empty() {
            cell.push_str(text);
        } else {
            cell.push_str(NEWLINE_ESCAPE);
            cell.push_str(text);
        }
    }

    fn set_inv(&mut self, dbid: &str, index: u32, value: String) {
        self.inv_indices.insert(index);
        self.record_mut(dbid).inv.insert(index, value);
    }

    fn record_mut(&mut self, dbid: &str) -> &mut ItemRecord {
        self.store.get_or_create(dbid, || ItemRecord::new(dbid))
    }

    fn finish(self) -> ItemScan {
        if self.pending_desc.is_some() {
            tracing::debug!("input ended inside an unterminated description; buffer dropped");
        }
        ItemScan {
            records: self.store.into_records(),
            inv_indices: self.inv_indices,
        }
    }
}

// ── Tests ──
