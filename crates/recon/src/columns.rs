use crate::normalize::normalize_header;

/// Resolve one semantic field against a header.
///
/// `candidates` must already be normalized and are tried in priority order;
/// the first header entry equal to, or containing, a candidate wins.
/// `None` means the field is unavailable for every row of this source.
pub fn find_column_index<S: AsRef<str>>(header: &[String], candidates: &[S]) -> Option<usize> {
    let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    find_in_normalized(&normalized, candidates)
}

fn find_in_normalized<S: AsRef<str>>(normalized: &[String], candidates: &[S]) -> Option<usize> {
    candidates.iter().find_map(|cand| {
        let cand = cand.as_ref();
        if cand.is_empty() {
            return None;
        }
        normalized
            .iter()
            .position(|h| h == cand || h.contains(cand))
    })
}

/// Header normalized once, then queried per field.
pub struct HeaderIndex {
    normalized: Vec<String>,
}

impl HeaderIndex {
    pub fn new(header: &[String]) -> Self {
        Self {
            normalized: header.iter().map(|h| normalize_header(h)).collect(),
        }
    }

    pub fn resolve<S: AsRef<str>>(&self, field: &str, candidates: &[S]) -> Option<usize> {
        let idx = find_in_normalized(&self.normalized, candidates);
        match idx {
            Some(i) => log::debug!("column '{field}' resolved to #{i} ('{}')", self.normalized[i]),
            None => log::debug!("column '{field}' not found"),
        }
        idx
    }
}
