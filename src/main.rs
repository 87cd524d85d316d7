//! Interactive terminal front-end for the case workspace.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use avukat::api::ApiClient;
use avukat::api::types::{DocumentUpload, TemplateType};
use avukat::config::ClientConfig;
use avukat::workspace::{
    AskOutcome, CaseWorkspace, DeleteOutcome, DraftOutcome, UploadOutcome, WorkspaceTab,
};

/// Extensions the upload affordance accepts; the ingestion pipeline handles
/// document and text formats only.
const SUPPORTED_UPLOAD_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// Disclaimer shown under answers and drafts that did not carry one of their
/// own (stored history rows do not).
const FALLBACK_COMPLIANCE_NOTICE: &str = "Bu yanıt yalnızca yüklenen dokümanlara dayanmaktadır. \
     Kişisel verilerin korunmasına ilişkin KVKK mevzuatına uygun hareket edilmesi gerekmektedir.";

#[derive(Debug, Parser)]
#[command(
    name = "avukat",
    about = "Case workspace client for the Avukat AI assistant"
)]
struct Cli {
    /// Case to open on startup.
    #[arg(long)]
    case: i64,

    /// Base URL of the case API server.
    #[arg(long, env = "AVUKAT_SERVER_URL")]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("avukat=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env(cli.server_url.as_deref())?;
    let api = Arc::new(ApiClient::new(&config)?);
    let workspace = Arc::new(CaseWorkspace::new(api));

    workspace
        .open_case(cli.case)
        .await
        .with_context(|| format!("could not open case {}", cli.case))?;
    print_case_header(&workspace);
    drain_notices(&workspace);

    run_repl(&workspace).await
}

async fn run_repl(workspace: &CaseWorkspace) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Type 'help' for commands.");

    loop {
        let line = match editor.readline("avukat> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "case" => print_case_header(workspace),
            "open" => handle_open(workspace, rest).await,
            "tab" => handle_tab(workspace, rest),
            "ask" => handle_ask(workspace, rest).await,
            "chat" => print_chat(workspace),
            "docs" => handle_docs(workspace).await,
            "upload" => handle_upload(workspace, rest).await,
            "delete" => handle_delete(workspace, rest, &mut editor).await,
            "type" => handle_type(workspace, rest),
            "draft" => handle_draft(workspace, rest).await,
            other => println!("unknown command '{other}'; type 'help'"),
        }

        drain_notices(workspace);
    }

    workspace.close_case();
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  case               show the open case");
    println!("  open <id>          open another case (discards this session)");
    println!("  tab <name>         switch tab: chat, docs or templates");
    println!("  ask <question>     ask a question about the case documents");
    println!("  chat               show the conversation");
    println!("  docs               show the document list (refreshes)");
    println!("  upload <path>      upload a PDF, DOC, DOCX or TXT file");
    println!("  delete <id>        delete a document (asks for confirmation)");
    println!("  type <name>        select draft type: dilekce, sozlesme or tutanak");
    println!("  draft [context]    generate a draft of the selected type");
    println!("  quit               leave the workspace");
}

fn print_case_header(workspace: &CaseWorkspace) {
    match workspace.case() {
        Some(case) => {
            println!("Case #{}: {} [{}]", case.id, case.title, case.status.as_str());
            if let Some(client_name) = case.client_name.as_deref() {
                println!("  Client: {client_name}");
            }
            if let Some(case_number) = case.case_number.as_deref() {
                println!("  Case no: {case_number}");
            }
        }
        None => println!("No case is open."),
    }
}

async fn handle_open(workspace: &CaseWorkspace, rest: &str) {
    let Ok(case_id) = rest.parse::<i64>() else {
        println!("usage: open <case-id>");
        return;
    };
    match workspace.open_case(case_id).await {
        Ok(_) => print_case_header(workspace),
        Err(err) => println!("Could not open case {case_id}: {err}"),
    }
}

fn handle_tab(workspace: &CaseWorkspace, rest: &str) {
    let tab = match rest {
        "chat" => WorkspaceTab::Chat,
        "docs" | "documents" => WorkspaceTab::Documents,
        "templates" => WorkspaceTab::Templates,
        _ => {
            println!("usage: tab <chat|docs|templates>");
            return;
        }
    };
    if let Err(err) = workspace.switch_tab(tab) {
        println!("{err}");
    }
}

async fn handle_ask(workspace: &CaseWorkspace, question: &str) {
    match workspace.submit_question(question).await {
        Ok(AskOutcome::Answered) => {
            let entries = workspace.chat_entries();
            if let Some(entry) = entries.last() {
                print_answer(
                    &entry.answer,
                    &entry.sources,
                    entry.compliance_notice.as_deref(),
                );
            }
        }
        Ok(AskOutcome::RolledBack { question }) => {
            println!("The question was not sent; you can retry it: {question}");
        }
        Ok(AskOutcome::Superseded) => {}
        Err(err) => println!("{err}"),
    }
}

fn print_chat(workspace: &CaseWorkspace) {
    let entries = workspace.chat_entries();
    if entries.is_empty() {
        println!("No messages yet for this case. Answers come from the uploaded documents only.");
        return;
    }
    for entry in entries {
        println!("Sen: {}", entry.question);
        if entry.is_pending() {
            println!("AI:  (yanıtlanıyor...)");
        } else {
            print_answer(
                &entry.answer,
                &entry.sources,
                entry.compliance_notice.as_deref(),
            );
        }
    }
}

fn print_answer(answer: &str, sources: &[String], notice: Option<&str>) {
    println!("AI:  {answer}");
    if !sources.is_empty() {
        println!("     Kaynaklar: {}", sources.join(", "));
    }
    println!("     ⚠ {}", notice.unwrap_or(FALLBACK_COMPLIANCE_NOTICE));
}

async fn handle_docs(workspace: &CaseWorkspace) {
    if let Err(err) = workspace.switch_tab(WorkspaceTab::Documents) {
        println!("{err}");
        return;
    }
    if let Err(err) = workspace.refresh_documents().await {
        println!("{err}");
        return;
    }

    let documents = workspace.documents();
    if documents.is_empty() {
        println!("No documents uploaded yet.");
        return;
    }
    for document in documents {
        let size = document
            .file_size
            .map(|bytes| format!("{:.2} KB", bytes as f64 / 1024.0))
            .unwrap_or_else(|| "-".to_string());
        let indexed = if document.is_indexed {
            "indexed"
        } else {
            "indexing..."
        };
        println!(
            "  [{}] {} ({size}, {indexed}, {})",
            document.id,
            document.filename,
            document.uploaded_at.format("%Y-%m-%d")
        );
    }
}

async fn handle_upload(workspace: &CaseWorkspace, rest: &str) {
    if rest.is_empty() {
        println!("usage: upload <path>");
        return;
    }
    let path = Path::new(rest);

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        println!(
            "Unsupported file type '{extension}'; expected one of: {}",
            SUPPORTED_UPLOAD_EXTENSIONS.join(", ")
        );
        return;
    }

    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        println!("'{rest}' has no usable file name");
        return;
    };

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("Could not read '{rest}': {err}");
            return;
        }
    };

    let upload = DocumentUpload {
        filename: filename.to_string(),
        content_type: mime_guess::from_path(path).first_raw().map(str::to_string),
        bytes,
    };

    match workspace.upload_document(upload).await {
        Ok(UploadOutcome::Uploaded { document_id }) => {
            println!("Uploaded '{filename}' (document {document_id}); indexing runs in the background.");
        }
        Ok(UploadOutcome::Failed) | Ok(UploadOutcome::Superseded) => {}
        Err(err) => println!("{err}"),
    }
}

async fn handle_delete(workspace: &CaseWorkspace, rest: &str, editor: &mut DefaultEditor) {
    let Ok(document_id) = rest.parse::<i64>() else {
        println!("usage: delete <document-id>");
        return;
    };

    let confirmed = matches!(
        editor.readline(&format!(
            "Delete document {document_id}? This cannot be undone. [y/N] "
        )),
        Ok(reply) if reply.trim().eq_ignore_ascii_case("y")
    );

    match workspace.delete_document(document_id, confirmed).await {
        Ok(DeleteOutcome::NotConfirmed) => println!("Delete cancelled."),
        Ok(DeleteOutcome::Deleted) => println!("Document {document_id} deleted."),
        Ok(DeleteOutcome::Failed) | Ok(DeleteOutcome::Superseded) => {}
        Err(err) => println!("{err}"),
    }
}

fn handle_type(workspace: &CaseWorkspace, rest: &str) {
    match rest.parse::<TemplateType>() {
        Ok(template_type) => {
            workspace.select_template_type(template_type);
            println!("Draft type: {}", template_type.as_str());
        }
        Err(err) => println!("{err}"),
    }
}

async fn handle_draft(workspace: &CaseWorkspace, rest: &str) {
    if let Err(err) = workspace.switch_tab(WorkspaceTab::Templates) {
        println!("{err}");
        return;
    }

    let context = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };

    match workspace.generate_draft(context).await {
        Ok(DraftOutcome::Generated) => {
            if let Some(draft) = workspace.draft() {
                println!("--- {} taslağı ---", workspace.template_type().as_str());
                println!("{}", draft.draft);
                if !draft.sources.is_empty() {
                    println!("Kaynaklar: {}", draft.sources.join(", "));
                }
                println!("⚠ {FALLBACK_COMPLIANCE_NOTICE}");
            }
        }
        Ok(DraftOutcome::AlreadyGenerating) => {
            println!("A draft is already being generated for this case.");
        }
        Ok(DraftOutcome::Failed) | Ok(DraftOutcome::Superseded) => {}
        Err(err) => println!("{err}"),
    }
}

fn drain_notices(workspace: &CaseWorkspace) {
    for notice in workspace.take_notices() {
        println!("! {}", notice.message);
    }
}
