use dataset_agent::agent::SqlAgent;
use dataset_agent::config::AgentConfig;
use dataset_agent::dataset::AssemblyReport;
use dataset_agent::error::AgentError;
use dataset_agent::session::{Reply, Session};
use dataset_agent::workspace::{remove_work_dir, Workspace};

use anyhow::Result;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_WORDS: [&str; 3] = ["sair", "exit", "quit"];

#[derive(Parser)]
#[command(name = "dataset-agent")]
#[command(about = "Agente Autônomo de Análise de Dados - pergunte sobre um CSV ou um ZIP de notas fiscais")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV (or a ZIP with cabeçalho + itens CSVs) and answer questions about it
    Analyze {
        /// CSV or ZIP file
        file: PathBuf,

        /// Working directory for extracted and merged files (or set AGENT_WORK_DIR)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,

        /// API key (or set GOOGLE_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Model name (or set LLM_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// OpenAI-compatible base URL (or set LLM_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Ask these questions and exit instead of reading from stdin
        #[arg(short, long)]
        question: Vec<String>,
    },
    /// Remove the working directory (limpar arquivos temporários)
    Clean {
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AgentConfig::from_env()?;

    match args.command {
        Commands::Analyze { file, work_dir, api_key, model, base_url, question } => {
            if let Some(dir) = work_dir {
                config.work_dir = dir;
            }
            if api_key.is_some() {
                config.api_key = api_key;
            }
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(url) = base_url {
                config.base_url = url;
            }
            analyze(file, config, question).await
        }
        Commands::Clean { work_dir } => {
            let dir = work_dir.unwrap_or(config.work_dir);
            if remove_work_dir(&dir)? {
                println!("🗑️  Arquivos temporários removidos!");
            } else {
                println!("Nenhum arquivo temporário encontrado.");
            }
            Ok(())
        }
    }
}

async fn analyze(file: PathBuf, config: AgentConfig, questions: Vec<String>) -> Result<()> {
    info!("Config: {}", serde_json::to_string(&config)?);

    let workspace = Workspace::open(&config.work_dir)?;
    let mut session = Session::new(workspace);

    let report = match session.load(&file) {
        Ok(report) => report,
        Err(e) => {
            print_assembly_error(&e);
            return Err(e.into());
        }
    };
    print_report(&report, &session);

    // Credential is checked before the agent is built
    match SqlAgent::from_config(&config) {
        Ok(agent) => session.set_agent(Box::new(agent)),
        Err(e) => {
            println!("❌ {}", e);
            if let Some(hint) = e.user_hint() {
                println!("💡 {}", hint);
            }
            return Err(e.into());
        }
    }

    if !questions.is_empty() {
        for q in &questions {
            println!("\n👉 {}", q);
            answer(&mut session, q).await;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    loop {
        print!("\n👉 Pergunte alguma coisa sobre os dados (ou 'sair'): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let q = line.trim();
        if EXIT_WORDS.contains(&q.to_lowercase().as_str()) {
            break;
        }
        answer(&mut session, q).await;
    }

    Ok(())
}

async fn answer(session: &mut Session, question: &str) {
    println!("🔍 Analisando...");
    match session.ask(question).await {
        Ok(Reply::Answer(text)) => println!("💡 Resposta:\n{}", text),
        Ok(Reply::Casual { text, .. }) => println!("💬 Resposta:\n{}", text),
        Err(e) => {
            if !e.is_recoverable() {
                error!("Unrecoverable error: {}", e);
            }
            match e {
                AgentError::EmptyQuestion => println!("⚠️  Por favor, pergunte alguma coisa antes!"),
                other => {
                    println!("❌ Erro: {}", other);
                    if let Some(hint) = other.user_hint() {
                        println!("💡 {}", hint);
                    }
                }
            }
        }
    }
}

fn print_report(report: &AssemblyReport, session: &Session) {
    println!("\n{}", "=".repeat(80));
    println!(" Agente Autônomo de Análise de Dados");
    println!("{}", "=".repeat(80));
    println!("🆔 Sessão: {}", session.id());
    println!("📁 Arquivos encontrados: {}", report.files.iter().join(", "));

    if let Some(header) = &report.header {
        println!("\n📋 Cabeçalho: {} ({} notas fiscais)", header.name, header.rows);
        println!("   Colunas: {}", header.columns.iter().join(", "));
    }
    if let Some(items) = &report.items {
        println!("📝 Itens: {} ({} itens)", items.name, items.rows);
        println!("   Colunas: {}", items.columns.iter().join(", "));
    }
    if let Some(plan) = &report.join_plan {
        println!("\n🔗 Colunas comuns: {}", plan.common_columns.iter().join(", "));
        if let Some(key) = &plan.key {
            println!("🔑 Chave de mesclagem: {}", key);
        }
    }
    if let (Some(rows), Some(path)) = (report.merged_rows, &report.merged_path) {
        println!("✅ Registros mesclados: {} (salvo em {})", rows, path.display());
    }

    if let Some(dataset) = session.dataset() {
        println!("\n{}", dataset.table.preview());
        println!("📊 Total de registros: {}", dataset.total_rows);
    }
}

fn print_assembly_error(e: &AgentError) {
    match e {
        AgentError::ClassificationFailure { files, columns } => {
            println!("❌ Não foram encontrados os arquivos de cabeçalho e itens esperados.");
            println!("💡 Arquivos encontrados: {}", files.iter().join(", "));
            for (name, cols) in columns {
                println!("   {}: {}", name, cols.iter().join(", "));
            }
        }
        AgentError::JoinKeyFailure { header_columns, items_columns } => {
            println!("❌ Não foi possível identificar uma chave comum para mesclagem.");
            println!("💡 Colunas do Cabeçalho: {}", header_columns.iter().join(", "));
            println!("💡 Colunas dos Itens: {}", items_columns.iter().join(", "));
        }
        other => println!("❌ Erro ao carregar os dados: {}", other),
    }
}
