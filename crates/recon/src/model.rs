use std::fmt;

use serde::{Deserialize, Serialize};

/// Message attached to every row whose business key could not be read.
pub const MISSING_KEY_MESSAGE: &str = "business key missing, required for cross-referencing";
pub const PENDING_ITEM_MESSAGE: &str = "item has no matching sale in this batch (pending)";
pub const PENDING_INSURANCE_MESSAGE: &str = "insurance record has no matching sale in this batch (pending)";

/// Commission placeholder used when the sales source has no commission column.
pub const ZERO_COMMISSION: &str = "R$ 0,00";

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    /// Sales ledger (delimited text).
    #[serde(rename = "Vendas")]
    Sales,
    /// Line-item detail ledger (delimited text).
    #[serde(rename = "Itens")]
    Items,
    /// Insurance-product ledger (spreadsheet).
    #[serde(rename = "Totalseg")]
    Insurance,
}

impl SourceKind {
    /// Join order: sales first, then items, then insurance.
    pub const ALL: [SourceKind; 3] = [SourceKind::Sales, SourceKind::Items, SourceKind::Insurance];

    /// Conventional file name, used in previews and prompts.
    pub fn file_label(&self) -> &'static str {
        match self {
            Self::Sales => "Vendas.csv",
            Self::Items => "Itens.csv",
            Self::Insurance => "Totalseg.xlsx",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "Vendas"),
            Self::Items => write!(f, "Itens"),
            Self::Insurance => write!(f, "Totalseg"),
        }
    }
}

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

/// One parsed row of a source, projected into typed fields.
///
/// Rows without a key are kept so previews stay complete; they are
/// reported separately as [`StructuralError`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingRow<F> {
    pub kind: SourceKind,
    pub line: usize,
    pub codigo_proposta: Option<String>,
    pub cols: Vec<String>,
    #[serde(flatten)]
    pub fields: F,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFields {
    pub chassi: Option<String>,
    pub loja: Option<String>,
    pub cnpj_loja: Option<String>,
    pub banco: Option<String>,
    pub valor_financiado: Option<String>,
    pub status: Option<String>,
    pub data: Option<String>,
    pub vendedor_responsavel: Option<String>,
    pub valor_comissao: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub chassi: Option<String>,
    pub tipo: Option<String>,
    pub codigo_item: Option<String>,
    pub fornecedor: Option<String>,
    pub descricao: Option<String>,
    pub quantidade: Option<f64>,
    pub valor_unitario: Option<f64>,
    pub cortesia: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceFields {
    pub produto: Option<String>,
    pub valor_seguro: Option<f64>,
    pub status: Option<String>,
    pub cpf: Option<String>,
    pub nome_cliente: Option<String>,
}

pub type SaleRow = StagingRow<SaleFields>;
pub type ItemRow = StagingRow<ItemFields>;
pub type InsuranceRow = StagingRow<InsuranceFields>;

// ---------------------------------------------------------------------------
// Row-scoped problems
// ---------------------------------------------------------------------------

/// A row whose business key is missing. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralError {
    pub kind: SourceKind,
    pub line: usize,
    pub message: String,
}

/// A child row whose key is present but matches no sale in this join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReference {
    pub kind: SourceKind,
    pub line: usize,
    pub codigo_proposta: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub codigo_proposta: String,
    pub loja: Option<String>,
    pub cnpj_loja: Option<String>,
    pub banco: Option<String>,
    pub valor_financiado: Option<String>,
    pub status: Option<String>,
    pub data: Option<String>,
    pub vendedor_responsavel: Option<String>,
    pub valor_comissao: Option<String>,
    pub itens: Vec<Item>,
    pub seguros: Vec<InsuranceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub codigo_proposta: String,
    pub tipo: Option<String>,
    pub codigo_item: Option<String>,
    pub fornecedor: Option<String>,
    pub descricao: Option<String>,
    pub quantidade: Option<f64>,
    pub valor_unitario: Option<f64>,
    pub cortesia: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceRecord {
    pub codigo_proposta: String,
    pub produto: Option<String>,
    pub valor_seguro: Option<f64>,
    pub status: Option<String>,
    pub cpf: Option<String>,
    pub nome_cliente: Option<String>,
    pub line: usize,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Trimmed header of each source, kept for previews after reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHeaders {
    pub vendas: Vec<String>,
    pub itens: Vec<String>,
    pub totalseg: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub encoding: String,
    pub vendas_raw: Vec<SaleRow>,
    pub itens_raw: Vec<ItemRow>,
    pub totalseg_raw: Vec<InsuranceRow>,
    #[serde(default)]
    pub headers: SourceHeaders,
    pub errors: Vec<StructuralError>,
    pub pending: Vec<PendingReference>,
    pub propostas: Vec<Proposal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconSummary {
    pub vendas_lines: usize,
    pub itens_lines: usize,
    pub totalseg_lines: usize,
    pub errors: usize,
    pub pending: usize,
    pub propostas: usize,
    pub propostas_com_seguro: usize,
}
