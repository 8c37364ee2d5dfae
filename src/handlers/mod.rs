pub mod attachments;
pub mod cards;
pub mod columns;
pub mod comments;
