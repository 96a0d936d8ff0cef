/// Longest question accepted from any front end, in bytes.
pub const MAX_QUESTION_BYTES: usize = 64 * 1024;

/// A line of user input, classified before it reaches the model.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// Blank or whitespace-only input; never submitted.
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        Input::Empty
    } else {
        Input::Text(input.to_string())
    }
}
