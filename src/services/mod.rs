pub mod csv_exporter;
pub mod deduplicator;
pub mod draw_engine;
pub mod duplicate_analyzer;
pub mod group_partitioner;
pub mod llm_service;
pub mod name_assistant;
pub mod name_parser;

pub use csv_exporter::CsvExporter;
pub use draw_engine::{CycleSchedule, DrawEngine, DrawPhase};
pub use duplicate_analyzer::DuplicateReport;
pub use llm_service::LlmService;
pub use name_assistant::NameAssistant;
