pub mod attempt_timer;
pub mod auth_service;
pub mod crop;
pub mod curriculum_filter;
pub mod list_reorder;
pub mod playlist;
pub mod preferences;
pub mod problem_form;
pub mod solve_attempt;

pub use attempt_timer::{AttemptTimer, SharedAttempt};
pub use auth_service::{AuthService, RememberedLogin};
pub use crop::ImageSize;
pub use curriculum_filter::CurriculumFilter;
pub use list_reorder::{DragEnd, ListReorder, ReorderBackend};
pub use playlist::{PlaylistStore, SolvePlaylist};
pub use preferences::{LastSelection, Preferences};
pub use problem_form::ProblemDraft;
pub use solve_attempt::{AttemptState, SolveAttempt};
