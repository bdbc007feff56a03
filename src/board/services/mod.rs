//! Application services for the pipeline board.

mod assistant;
mod board;
mod export;

pub use assistant::{
    AssistantBody, AssistantError, AssistantRequest, AssistantResponse, AssistantResult,
    TaskAssistantService, render_system_prompt,
};
pub use board::{BoardError, BoardResult, BoardService, CompletionOutcome, CreateTaskRequest};
pub use export::{
    ExportError, ExportRequest, ExportResult, ReportService, ReportStatus, TaskReport, render_csv,
};
