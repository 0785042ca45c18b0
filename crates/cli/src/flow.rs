// Multi-step preview before a batch is persisted

use std::fmt;

use propostas_recon::model::StagingRow;
use propostas_recon::{ReconciliationResult, SourceKind};
use propostas_store::{Batch, BatchStore, Competencia, KeyValueStore};

use crate::error::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Parsed, staged and joined; nothing shown yet.
    Staged,
    /// Showing the i-th selected source.
    Previewing(usize),
    /// Every preview accepted.
    Confirmed,
    Persisted,
    /// Abandoned before persisting.
    Cancelled,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => write!(f, "staged"),
            Self::Previewing(i) => write!(f, "previewing source {}", i + 1),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Persisted => write!(f, "persisted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One staged row as shown in a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRow<'a> {
    pub line: usize,
    pub codigo_proposta: Option<&'a str>,
    pub cols: &'a [String],
}

/// Header and staged rows of the source under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePreview<'a> {
    pub kind: SourceKind,
    /// 0-based position among the selected sources.
    pub step: usize,
    pub steps: usize,
    pub header: &'a [String],
    pub rows: Vec<PreviewRow<'a>>,
}

fn preview_rows<F>(rows: &[StagingRow<F>]) -> Vec<PreviewRow<'_>> {
    rows.iter()
        .map(|r| PreviewRow {
            line: r.line,
            codigo_proposta: r.codigo_proposta.as_deref(),
            cols: &r.cols,
        })
        .collect()
}

/// External go/no-go for each preview step.
pub trait Confirm {
    fn confirm(&mut self, preview: &SourcePreview<'_>) -> bool;
}

/// Accepts every step (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _preview: &SourcePreview<'_>) -> bool {
        true
    }
}

/// A finished reconciliation waiting for confirmation.
///
/// Holds the only copy of the result; dropping or cancelling the flow
/// leaves the store exactly as it was.
#[derive(Debug)]
pub struct ImportFlow {
    result: ReconciliationResult,
    period: Competencia,
    sources: Vec<SourceKind>,
    state: FlowState,
}

impl ImportFlow {
    /// `sources` are the selected sources; they are previewed in join order.
    pub fn new(result: ReconciliationResult, period: Competencia, mut sources: Vec<SourceKind>) -> Self {
        sources.sort();
        sources.dedup();
        Self {
            result,
            period,
            sources,
            state: FlowState::Staged,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn result(&self) -> &ReconciliationResult {
        &self.result
    }

    pub fn period(&self) -> &Competencia {
        &self.period
    }

    pub fn sources(&self) -> &[SourceKind] {
        &self.sources
    }

    /// Move one step forward. Terminal states stay put.
    pub fn advance(&mut self) -> FlowState {
        self.state = match self.state {
            FlowState::Staged if self.sources.is_empty() => FlowState::Confirmed,
            FlowState::Staged => FlowState::Previewing(0),
            FlowState::Previewing(i) if i + 1 < self.sources.len() => FlowState::Previewing(i + 1),
            FlowState::Previewing(_) => FlowState::Confirmed,
            other => other,
        };
        self.state
    }

    /// The source under review, if previewing.
    pub fn preview(&self) -> Option<SourcePreview<'_>> {
        let FlowState::Previewing(step) = self.state else {
            return None;
        };
        let kind = *self.sources.get(step)?;
        let r = &self.result;
        let (header, rows) = match kind {
            SourceKind::Sales => (&r.headers.vendas, preview_rows(&r.vendas_raw)),
            SourceKind::Items => (&r.headers.itens, preview_rows(&r.itens_raw)),
            SourceKind::Insurance => (&r.headers.totalseg, preview_rows(&r.totalseg_raw)),
        };
        Some(SourcePreview {
            kind,
            step,
            steps: self.sources.len(),
            header,
            rows,
        })
    }

    /// Walk every preview through `confirm`. Returns false at the first
    /// refusal, leaving the flow on that step.
    pub fn run_previews(&mut self, confirm: &mut impl Confirm) -> bool {
        if self.state == FlowState::Staged {
            self.advance();
        }
        loop {
            let accepted = match self.preview() {
                Some(preview) => {
                    let ok = confirm.confirm(&preview);
                    if !ok {
                        log::info!("import declined at {}", preview.kind);
                    }
                    ok
                }
                None => break,
            };
            if !accepted {
                return false;
            }
            self.advance();
        }
        self.state == FlowState::Confirmed
    }

    /// Save the result as the batch for this period. Only valid once
    /// confirmed; persisting twice is refused.
    pub fn persist<S: KeyValueStore>(&mut self, store: &mut BatchStore<S>) -> Result<Batch, ImportError> {
        if self.state != FlowState::Confirmed {
            return Err(ImportError::NotConfirmed(self.state));
        }
        let batch = store.save(self.result.clone(), &self.period)?;
        self.state = FlowState::Persisted;
        Ok(batch)
    }

    /// Abandon the import. Nothing is written; a persisted flow stays
    /// persisted.
    pub fn cancel(&mut self) -> FlowState {
        if self.state != FlowState::Persisted {
            log::info!("import for {} cancelled ({})", self.period, self.state);
            self.state = FlowState::Cancelled;
        }
        self.state
    }
}
