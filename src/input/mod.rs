mod reader;

pub use reader::QuestionReader;
