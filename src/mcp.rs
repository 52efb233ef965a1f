use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::batch::{self, Operation, RunOptions};
use crate::pdf::PdfDocument;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitTreeRequest {
    #[schemars(description = "Root directory to scan recursively")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeTreeRequest {
    #[schemars(description = "Root directory to scan recursively")]
    pub path: String,
    #[schemars(description = "Stamp running page numbers on merged output (default: true)")]
    #[serde(default = "default_number_pages")]
    pub number_pages: bool,
}

fn default_number_pages() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    fn run_tree(&self, path: &str, operation: Operation, options: RunOptions) -> String {
        let result = batch::parse_root(Some(path))
            .and_then(|root| batch::run(&root, operation, &options));
        match result {
            Ok(report) => {
                serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Split every multi-page PDF under a directory (recursively) into one PDF per page, written next to the source as NAME_paginaN.pdf. Returns the run report.")]
    fn pdf_split_tree(&self, Parameters(req): Parameters<SplitTreeRequest>) -> String {
        self.run_tree(&req.path, Operation::Split, RunOptions::default())
    }

    #[tool(description = "Merge the PDFs directly inside each directory under a root (recursively) into DIRNAME_NNN.pdf in that directory, optionally stamping page numbers. Returns the run report.")]
    fn pdf_merge_tree(&self, Parameters(req): Parameters<MergeTreeRequest>) -> String {
        let options = RunOptions {
            number_pages: req.number_pages,
        };
        self.run_tree(&req.path, Operation::Merge, options)
    }

    #[tool(description = "Get the page count of a single PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let result = PageCountResult {
                    page_count: doc.page_count(),
                    encryption_ignored: doc.encryption_ignored,
                    path,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
    pub encryption_ignored: bool,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Batch PDF tools. Use pdf_split_tree to burst every multi-page PDF under a \
                 directory into single pages, pdf_merge_tree to combine the PDFs of each \
                 directory into one numbered document, and pdf_page_count to inspect a file."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
