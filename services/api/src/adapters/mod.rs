pub mod coach_llm;
pub mod scan_llm;

pub use coach_llm::OpenAiCoachAdapter;
pub use scan_llm::OpenAiScanAdapter;
