pub mod attachment;
pub mod card;
pub mod column;
pub mod comment;

pub use attachment::AttachmentRepository;
pub use card::CardRepository;
pub use column::ColumnRepository;
pub use comment::CommentRepository;
