pub mod ingest;
pub mod resolver;
pub mod validator;
pub mod genome_merger;
pub mod summary;
