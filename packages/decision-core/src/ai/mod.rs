//! Oracle implementations backed by hosted models.

pub mod openai;
pub mod schema;

pub use openai::OpenAIOracle;
pub use schema::StructuredOutput;
