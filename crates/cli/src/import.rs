// Import pipeline: selected files -> staged, joined result in a preview flow

use std::path::{Path, PathBuf};

use propostas_io::source::read_all;
use propostas_io::{IoError, SourceFormat, SourceReader, SourceRequest};
use propostas_recon::staging::{stage_insurance, stage_items, stage_sales};
use propostas_recon::{run, ReconInput, ReconciliationResult, SchemaConfig, SourceKind, StagingTable, TabularData};
use propostas_store::{BatchStore, Competencia, KeyValueStore};

use crate::error::ImportError;
use crate::flow::ImportFlow;

/// Everything one import needs from the caller.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub mes: Option<String>,
    pub ano: Option<String>,
    pub vendas: Option<PathBuf>,
    pub itens: Option<PathBuf>,
    pub totalseg: Option<PathBuf>,
    /// Encoding label for the delimited sources.
    pub encoding: String,
    /// Fill unselected sources from the latest stored batch.
    pub carry_over: bool,
}

impl ImportRequest {
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            mes: None,
            ano: None,
            vendas: None,
            itens: None,
            totalseg: None,
            encoding: encoding.into(),
            carry_over: true,
        }
    }

    /// Selected sources in join order.
    pub fn selected(&self) -> Vec<(SourceKind, &Path)> {
        [
            (SourceKind::Sales, &self.vendas),
            (SourceKind::Items, &self.itens),
            (SourceKind::Insurance, &self.totalseg),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.as_deref().map(|p| (kind, p)))
        .collect()
    }

    pub fn period(&self) -> Result<Competencia, ImportError> {
        match (self.mes.as_deref(), self.ano.as_deref()) {
            (Some(mes), Some(ano)) => Ok(Competencia::parse(mes, ano)?),
            _ => Err(ImportError::MissingPeriod),
        }
    }
}

/// Load a column schema file, or the built-in schema when none is given.
pub fn load_schema(path: Option<&Path>) -> Result<SchemaConfig, ImportError> {
    let Some(path) = path else {
        return Ok(SchemaConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        ImportError::Read(IoError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })?;
    Ok(SchemaConfig::from_toml(&text)?)
}

/// Read, parse, stage and join the selected sources.
///
/// Every fatal condition is checked before anything is staged; the store is
/// only read (for carry-over), never written. The returned flow must be
/// confirmed before it can be persisted.
pub fn import<R: SourceReader, S: KeyValueStore>(
    request: &ImportRequest,
    schema: &SchemaConfig,
    reader: &R,
    store: &BatchStore<S>,
) -> Result<ImportFlow, ImportError> {
    let selected = request.selected();
    if selected.is_empty() {
        return Err(ImportError::NoSourceSelected);
    }
    let period = request.period()?;
    if selected
        .iter()
        .any(|(kind, _)| !SourceFormat::for_kind(*kind).is_available())
    {
        return Err(ImportError::SpreadsheetUnavailable);
    }

    let requests: Vec<SourceRequest> = selected
        .iter()
        .map(|(kind, path)| SourceRequest::new(*kind, *path, request.encoding.as_str()))
        .collect();
    let contents = read_all(reader, &requests)?;

    let mut tables: Vec<(SourceKind, TabularData)> = Vec::with_capacity(requests.len());
    for (req, content) in requests.iter().zip(&contents) {
        tables.push((req.kind, req.format().parse(content)?));
    }

    let kinds: Vec<SourceKind> = tables.iter().map(|(kind, _)| *kind).collect();
    let previous = if request.carry_over && kinds.len() < SourceKind::ALL.len() {
        store.load()?
    } else {
        None
    };

    let mut input = ReconInput::new(request.encoding.as_str());
    for (kind, data) in &tables {
        match kind {
            SourceKind::Sales => input.vendas = stage_sales(data, &schema.vendas),
            SourceKind::Items => input.itens = stage_items(data, &schema.itens),
            SourceKind::Insurance => input.totalseg = stage_insurance(data, &schema.totalseg),
        }
        log::debug!("staged {kind}: {} row(s)", data.rows.len());
    }
    if let Some(previous) = previous {
        carry_over(&mut input, previous, &kinds);
    }

    let result = run(input);
    Ok(ImportFlow::new(result, period, kinds))
}

/// Replace the tables of unselected sources with the ones from `previous`.
fn carry_over(input: &mut ReconInput, previous: ReconciliationResult, selected: &[SourceKind]) {
    let ReconciliationResult {
        vendas_raw,
        itens_raw,
        totalseg_raw,
        headers,
        ..
    } = previous;

    if !selected.contains(&SourceKind::Sales) {
        log::info!("carrying over {} sales row(s)", vendas_raw.len());
        input.vendas = StagingTable::from_rows(SourceKind::Sales, headers.vendas, vendas_raw);
    }
    if !selected.contains(&SourceKind::Items) {
        log::info!("carrying over {} item row(s)", itens_raw.len());
        input.itens = StagingTable::from_rows(SourceKind::Items, headers.itens, itens_raw);
    }
    if !selected.contains(&SourceKind::Insurance) {
        log::info!("carrying over {} insurance row(s)", totalseg_raw.len());
        input.totalseg = StagingTable::from_rows(SourceKind::Insurance, headers.totalseg, totalseg_raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propostas_io::SourceContent;
    use propostas_store::MemoryStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves delimited text from memory and counts reads.
    #[derive(Default)]
    struct Files {
        text: HashMap<PathBuf, String>,
        reads: AtomicUsize,
    }

    impl Files {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.text.insert(PathBuf::from(path), text.to_string());
            self
        }
    }

    impl SourceReader for Files {
        fn read(&self, request: &SourceRequest) -> Result<SourceContent, IoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.text
                .get(&request.path)
                .map(|t| SourceContent::Text(t.clone()))
                .ok_or_else(|| IoError::Read {
                    path: request.path.display().to_string(),
                    message: "no such file".to_string(),
                })
        }
    }

    fn request(vendas: Option<&str>, itens: Option<&str>) -> ImportRequest {
        let mut r = ImportRequest::new("utf-8");
        r.mes = Some("3".into());
        r.ano = Some("2024".into());
        r.vendas = vendas.map(PathBuf::from);
        r.itens = itens.map(PathBuf::from);
        r
    }

    const VENDAS: &str = "Cód. da Proposta;Loja\nP1;Centro\nP2;Sul\n";
    const ITENS: &str = "Cód. da Proposta;Descrição;Quantidade\nP1;tapete;2\nP9;engate;1\n";

    #[test]
    fn nothing_selected_is_fatal_before_any_read() {
        let files = Files::default();
        let store = BatchStore::new(MemoryStore::new());
        let err = import(&request(None, None), &SchemaConfig::default(), &files, &store).unwrap_err();
        assert!(matches!(err, ImportError::NoSourceSelected));
        assert_eq!(files.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_period_is_fatal_before_any_read() {
        let files = Files::default().with("v", VENDAS);
        let store = BatchStore::new(MemoryStore::new());
        let mut req = request(Some("v"), None);
        req.ano = None;
        let err = import(&req, &SchemaConfig::default(), &files, &store).unwrap_err();
        assert!(matches!(err, ImportError::MissingPeriod));
        assert_eq!(files.reads.load(Ordering::SeqCst), 0);

        req.ano = Some("  ".into());
        let err = import(&req, &SchemaConfig::default(), &files, &store).unwrap_err();
        assert!(matches!(err, ImportError::MissingPeriod));
    }

    // cargo test -p propostas-cli --no-default-features
    #[cfg(not(feature = "xlsx"))]
    #[test]
    fn insurance_without_decoder_is_fatal_before_any_read() {
        let files = Files::default().with("v", VENDAS);
        let store = BatchStore::new(MemoryStore::new());
        let mut req = request(Some("v"), None);
        req.totalseg = Some(PathBuf::from("/no/such.xlsx"));
        let err = import(&req, &SchemaConfig::default(), &files, &store).unwrap_err();
        assert!(matches!(err, ImportError::SpreadsheetUnavailable));
        assert_eq!(files.reads.load(Ordering::SeqCst), 0);

        // the period is still checked first
        req.mes = None;
        let err = import(&req, &SchemaConfig::default(), &files, &store).unwrap_err();
        assert!(matches!(err, ImportError::MissingPeriod));
    }

    #[test]
    fn one_failed_read_aborts_everything() {
        let files = Files::default().with("v", VENDAS);
        let store = BatchStore::new(MemoryStore::new());
        let err = import(&request(Some("v"), Some("missing")), &SchemaConfig::default(), &files, &store)
            .unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn stages_and_joins_selected_sources() {
        let files = Files::default().with("v", VENDAS).with("i", ITENS);
        let store = BatchStore::new(MemoryStore::new());
        let flow = import(&request(Some("v"), Some("i")), &SchemaConfig::default(), &files, &store).unwrap();

        assert_eq!(flow.sources(), [SourceKind::Sales, SourceKind::Items]);
        assert_eq!(flow.period().key(), "2024-03");
        let r = flow.result();
        assert_eq!(r.propostas.len(), 2);
        assert_eq!(r.propostas[0].itens[0].quantidade, Some(2.0));
        assert_eq!(r.pending.len(), 1);
        assert_eq!(r.pending[0].codigo_proposta, "P9");
        assert_eq!(r.encoding, "utf-8");
        // import alone never writes
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn carry_over_rejoins_items_from_latest_batch() {
        let files = Files::default().with("v", VENDAS).with("i", ITENS);
        let mut store = BatchStore::new(MemoryStore::new());

        // first upload: items only, everything pending
        let mut flow = import(&request(None, Some("i")), &SchemaConfig::default(), &files, &store).unwrap();
        assert_eq!(flow.result().pending.len(), 2);
        assert!(flow.run_previews(&mut crate::flow::AutoConfirm));
        flow.persist(&mut store).unwrap();

        // second upload: sales only, items come from the stored batch
        let flow = import(&request(Some("v"), None), &SchemaConfig::default(), &files, &store).unwrap();
        let r = flow.result();
        assert_eq!(r.itens_raw.len(), 2);
        assert_eq!(r.headers.itens[0], "Cód. da Proposta");
        assert_eq!(r.propostas[0].codigo_proposta, "P1");
        assert_eq!(r.propostas[0].itens.len(), 1);
        assert_eq!(r.pending.len(), 1);
        assert_eq!(flow.sources(), [SourceKind::Sales]);
    }

    #[test]
    fn carry_over_disabled_leaves_unselected_sources_empty() {
        let files = Files::default().with("v", VENDAS).with("i", ITENS);
        let mut store = BatchStore::new(MemoryStore::new());
        let mut flow = import(&request(None, Some("i")), &SchemaConfig::default(), &files, &store).unwrap();
        flow.run_previews(&mut crate::flow::AutoConfirm);
        flow.persist(&mut store).unwrap();

        let mut req = request(Some("v"), None);
        req.carry_over = false;
        let flow = import(&req, &SchemaConfig::default(), &files, &store).unwrap();
        assert!(flow.result().itens_raw.is_empty());
        assert!(flow.result().pending.is_empty());
    }

    #[test]
    fn schema_file_overrides_candidates() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        std::fs::write(&path, "[vendas]\ncodigo_proposta = [\"Numero Contrato\"]\n").unwrap();
        let schema = load_schema(Some(&path)).unwrap();

        let files = Files::default().with("v", "Número Contrato;Loja\nC-1;Centro\n");
        let store = BatchStore::new(MemoryStore::new());
        let flow = import(&request(Some("v"), None), &schema, &files, &store).unwrap();
        assert_eq!(flow.result().propostas[0].codigo_proposta, "C-1");
    }

    #[test]
    fn missing_schema_file_is_a_read_error() {
        let err = load_schema(Some(Path::new("/no/such/schema.toml"))).unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
        assert!(load_schema(None).is_ok());
    }
}
