//! Ports: interfaces the application layer depends on.

pub mod analysis_queue;
pub mod archive;
pub mod callback;
pub mod image_analyzer;
pub mod question_service;
pub mod session_store;

pub use analysis_queue::{AnalysisQueue, AnalysisTask, QueueError};
pub use archive::{ArchiveError, ArchiveRecord, ArchiveSink};
pub use callback::{CallbackError, CallbackSender};
pub use image_analyzer::{AllergyReport, AllergyReportAnalyzer, ImageAnalysisError};
pub use question_service::{QuestionError, QuestionService};
pub use session_store::{InvalidUserKey, SessionStore, StoreError, UserKey};
