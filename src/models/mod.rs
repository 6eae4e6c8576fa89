pub mod auth;
pub mod crop;
pub mod curriculum;
pub mod folder;
pub mod image;
pub mod problem;
pub mod reorder;
pub mod session;
pub mod statistics;

pub use auth::{Token, UserCreate};
pub use crop::CropRect;
pub use curriculum::{Curriculum, CurriculumCreate};
pub use folder::{Folder, FolderName};
pub use image::ImageFile;
pub use problem::{
    Hint, LatestStatus, NewProblem, Problem, ProblemSort, ProblemUpdate, ProblemWithHints, SolveSubmission,
    StatusFilter,
};
pub use reorder::{Rankable, ReorderItem, ReorderResource};
pub use session::{StudySession, StudySessionCreate};
pub use statistics::{BreakdownItem, StatisticsResponse};
