pub mod items;
pub mod names;

use crate::table;

pub struct ItemsOutput {
    pub csv: String,
    pub total: usize,
    pub kept: usize,
    pub indices: usize,
}

pub struct NamesOutput {
    pub csv: String,
    pub total: usize,
}

/// Pipeline A: scan → filter by reftype → project inv columns → CSV.
pub fn process_items(text: &str) -> ItemsOutput {
    let scan = items::scan(text);
    let kept = table::filter_items(&scan.records);
    let csv = table::render_items(&kept, &scan.inv_indices);
    ItemsOutput {
        csv,
        total: scan.records.len(),
        kept: kept.len(),
        indices: scan.inv_indices.len(),
    }
}

/// Pipeline B: scan → CSV, no filtering.
pub fn process_names(text: &str) -> NamesOutput {
    let records = names::scan(text);
    let csv = table::render_names(&records);
    NamesOutput {
        csv,
        total: records.len(),
    }
}

// ── Tests ──
