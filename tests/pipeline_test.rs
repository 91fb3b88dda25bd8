use async_trait::async_trait;
use dataset_agent::classifier::classify_files;
use dataset_agent::join_key::resolve_join_key;
use dataset_agent::merge::merge_tables;
use dataset_agent::responder::{response_pool, CasualResponder};
use dataset_agent::workspace::MERGED_FILE_NAME;
use dataset_agent::{
    Agent, AgentError, CasualKind, DatasetContext, DatasetKind, Reply, Result, Session, Table, Workspace,
};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

const CABECALHO: &str = "\
CHAVE DE ACESSO,NUMERO,DATA EMISSAO,RAZAO SOCIAL EMITENTE,VALOR NOTA FISCAL
A1,101,2024-01-02,Papelaria Alfa,150.00
A2,102,2024-01-05,Distribuidora Beta,80.50
A3,103,2024-01-09,Comercial Gama,42.00
";

const ITENS: &str = "\
CHAVE DE ACESSO,NUMERO,NUMERO PRODUTO,DESCRICAO DO PRODUTO,QUANTIDADE,VALOR TOTAL
A1,101,1,CANETA,10,50.00
A1,101,2,CADERNO,5,100.00
A2,102,1,PAPEL A4,1,80.50
A9,109,1,GRAMPO,3,9.00
";

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Answers with the shape it was given and keeps every prompt
struct EchoAgent {
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Agent for EchoAgent {
    async fn run(&self, prompt: &str, dataset: &DatasetContext) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!(
            "Analisados {} registros de {} total",
            dataset.table.row_count(),
            dataset.total_rows
        ))
    }
}

#[tokio::test]
async fn test_invoice_archive_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let zip = tmp.path().join("202401_NFs.zip");
    write_zip(
        &zip,
        &[("202401_NFs_Cabecalho.csv", CABECALHO), ("202401_NFs_Itens.csv", ITENS)],
    );

    let workspace = Workspace::open(tmp.path().join("temp_data")).unwrap();
    let mut session = Session::with_responder(workspace, CasualResponder::seeded(1));
    let report = session.load(&zip).unwrap();

    // both "CHAVE DE ACESSO" and "NUMERO" are shared; "numero" outranks "chave"
    let plan = report.join_plan.clone().unwrap();
    assert_eq!(plan.key.as_deref(), Some("NUMERO"));
    assert_eq!(report.merged_rows, Some(3));
    assert!(session.workspace().path_of(MERGED_FILE_NAME).exists());

    let dataset = session.dataset().unwrap();
    assert_eq!(dataset.kind, DatasetKind::MergedInvoices);
    assert_eq!(dataset.total_rows, 3);
    // 5 header columns + 4 item-only columns + suffixed shared "CHAVE DE ACESSO"
    assert_eq!(dataset.total_cols, 10);

    let prompts = Arc::new(Mutex::new(Vec::new()));
    session.set_agent(Box::new(EchoAgent {
        prompts: Arc::clone(&prompts),
    }));

    let reply = session.ask("Qual o valor total das notas?").await.unwrap();
    assert_eq!(reply, Reply::Answer("Analisados 3 registros de 3 total".to_string()));
    assert!(prompts.lock().unwrap()[0].contains("Qual o valor total das notas?"));

    let reply = session.ask("obrigado").await.unwrap();
    assert!(response_pool(CasualKind::Thanks).contains(&reply.text()));
    assert_eq!(prompts.lock().unwrap().len(), 1);

    assert!(session.cleanup().unwrap());
    assert!(!tmp.path().join("temp_data").exists());
}

#[test]
fn test_wrong_archive_layout_lists_files_and_columns() {
    let tmp = tempfile::tempdir().unwrap();
    let zip = tmp.path().join("outros.zip");
    write_zip(&zip, &[("vendas.csv", CABECALHO), ("clientes.csv", ITENS)]);

    let mut session = Session::new(Workspace::open(tmp.path().join("work")).unwrap());
    match session.load(&zip) {
        Err(AgentError::ClassificationFailure { files, columns }) => {
            assert_eq!(files, vec!["vendas.csv", "clientes.csv"]);
            assert_eq!(columns.len(), 2);
            assert_eq!(columns["clientes.csv"][0], "CHAVE DE ACESSO");
            assert!(columns["vendas.csv"].contains(&"VALOR NOTA FISCAL".to_string()));
            assert!(columns["clientes.csv"].contains(&"QUANTIDADE".to_string()));
        }
        other => panic!("expected ClassificationFailure, got {:?}", other),
    }
    assert!(session.dataset().is_none());
}

#[test]
fn test_components_compose_without_session() {
    let tmp = tempfile::tempdir().unwrap();
    let header_path = tmp.path().join("cabecalho.csv");
    let items_path = tmp.path().join("itens.csv");
    std::fs::write(&header_path, CABECALHO).unwrap();
    std::fs::write(&items_path, ITENS).unwrap();

    let classified = classify_files(&["itens.csv", "cabecalho.csv"]);
    assert_eq!(classified.header.as_deref(), Some("cabecalho.csv"));
    assert_eq!(classified.items.as_deref(), Some("itens.csv"));

    let header = Table::load_csv(&header_path).unwrap();
    let items = Table::load_csv(&items_path).unwrap();
    let plan = resolve_join_key(&header.column_set(), &items.column_set());
    let key = plan.key.unwrap();

    let ab = merge_tables(&header, &items, &key).unwrap();
    let ba = merge_tables(&items, &header, &key).unwrap();
    assert_eq!(ab.row_count, ba.row_count);

    let merged_columns = ab.table.column_set();
    for column in header.column_set().union(&items.column_set()) {
        assert!(merged_columns.contains(column));
    }
}
