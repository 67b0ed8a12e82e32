use crate::config::Config;
use crate::error::TkError;
use crate::lock::FileLock;
use crate::session::Session;
use crate::storage::Storage;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_handler, tool_router, ServerHandler, ServiceExt};
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunCommandParams {
    /// One command line, e.g. "deadline submit report /by 2024-01-31"
    pub command: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindParams {
    /// Keyword matched case-insensitively against task descriptions
    pub keyword: String,
}

#[derive(Clone)]
pub struct TkMcpServer {
    config: Config,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TkMcpServer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Open the task file under lock, run one line, release.
    fn run_line(&self, line: &str) -> String {
        let run = || -> crate::error::Result<String> {
            let _lock = FileLock::acquire(&self.config.lock_path())?;
            let mut session = Session::open(Storage::new(self.config.resolved_data_path()));
            let response = session.execute(line);
            Ok(match session.take_warning() {
                Some(warning) => format!("{}\n{}", warning, response),
                None => response,
            })
        };
        run().unwrap_or_else(|e| format!("Error: {}", e))
    }

    /// Run any task command: list, todo, deadline, event, mark, delete, find, upcoming.
    #[tool(description = "Run one task command line: list | todo DESC | deadline DESC /by DATE | event DESC /from DATE /to DATE | mark N | delete N | find KEYWORD | upcoming. Dates: yyyy-MM-dd or d/M/yyyy, optional HHmm.")]
    fn run_command(&self, Parameters(params): Parameters<RunCommandParams>) -> String {
        self.run_line(&params.command)
    }

    /// List all tasks with their 1-based numbers.
    #[tool(description = "List all tasks with their 1-based numbers.")]
    fn list_tasks(&self) -> String {
        self.run_line("list")
    }

    /// Find tasks whose description contains a keyword.
    #[tool(description = "Find tasks whose description contains a keyword (case-insensitive).")]
    fn find_tasks(&self, Parameters(params): Parameters<FindParams>) -> String {
        self.run_line(&format!("find {}", params.keyword))
    }

    /// Not-done deadlines and events dated today or later, earliest first.
    #[tool(description = "List not-done deadlines and events dated today or later, earliest first.")]
    fn upcoming_tasks(&self) -> String {
        self.run_line("upcoming")
    }
}

#[tool_handler]
impl ServerHandler for TkMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "tk".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Task tracker. Use run_command with todo/deadline/event to add tasks, mark N to complete, delete N to remove; list_tasks, find_tasks and upcoming_tasks to read.".to_string(),
            ),
        }
    }
}

pub fn run_mcp_server(config: Config) -> crate::error::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| TkError::Other(format!("failed to build tokio runtime: {}", e)))?
        .block_on(async {
            let server = TkMcpServer::new(config);
            let transport = rmcp::transport::io::stdio();
            let running = server
                .serve(transport)
                .await
                .map_err(|e| TkError::Other(format!("MCP server error: {}", e)))?;
            running
                .waiting()
                .await
                .map_err(|e| TkError::Other(format!("MCP server error: {}", e)))?;
            Ok(())
        })
}
